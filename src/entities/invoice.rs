use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer invoice.
///
/// Status lifecycle: "draft" -> "sent" -> "paid", with "overdue" applied by
/// the scheduled rule when a sent invoice passes its due date.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub customer_id: i32,

    pub amount: f64,

    pub date: DateTime<Utc>,

    pub due_date: Option<DateTime<Utc>>,

    pub status: String,

    /// Set when the invoice was materialized from a recurring schedule
    pub recurring_invoice_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::recurring_invoice::Entity",
        from = "Column::RecurringInvoiceId",
        to = "super::recurring_invoice::Column::Id"
    )]
    RecurringInvoice,
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::recurring_invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringInvoice.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
