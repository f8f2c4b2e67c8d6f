use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Named email template with `{{placeholder}}` markers in subject and body.
/// `variables` holds the JSON-encoded list of accepted placeholder names.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    pub subject: String,

    pub body: String,

    pub variables: String,

    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
