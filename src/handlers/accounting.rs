use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use super::common::{fmt_date, month_label, month_start_ago, parse_date};
use crate::auth::AuthUser;
use crate::entities::{customer, invoice, transaction};
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionDto {
    id: i32,
    amount: f64,
    #[serde(rename = "type")]
    transaction_type: String,
    date: String,
    description: String,
    category: String,
    status: String,
    reference: String,
}

impl TransactionDto {
    fn from_model(tx: transaction::Model, description: Option<String>, category: Option<String>) -> Self {
        let (default_description, reference) = match tx.invoice_id {
            Some(invoice_id) => (
                format!("Invoice #{}", invoice_id),
                format!("INV-{}", invoice_id),
            ),
            None => ("Manual transaction".to_string(), format!("TXN-{}", tx.id)),
        };
        let default_category = if tx.transaction_type == "income" {
            "Revenue"
        } else {
            "Expense"
        };

        Self {
            id: tx.id,
            amount: tx.amount,
            transaction_type: tx.transaction_type,
            date: fmt_date(tx.date),
            description: description.unwrap_or(default_description),
            category: category.unwrap_or_else(|| default_category.to_string()),
            status: "completed".to_string(),
            reference,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct TransactionRequest {
    amount: f64,
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    transaction_type: String,
    date: String,
    description: Option<String>,
    category: Option<String>,
}

async fn list_transactions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = transaction::Entity::find()
        .order_by_desc(transaction::Column::Date)
        .all(&*state.db)
        .await?;

    let transactions: Vec<TransactionDto> = rows
        .into_iter()
        .map(|tx| TransactionDto::from_model(tx, None, None))
        .collect();
    Ok(Json(transactions))
}

async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let tx = transaction::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Transaction not found".to_string()))?;
    Ok(Json(TransactionDto::from_model(tx, None, None)))
}

async fn create_transaction(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<TransactionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    let created = transaction::ActiveModel {
        amount: Set(req.amount),
        transaction_type: Set(req.transaction_type),
        date: Set(parse_date(&req.date)?),
        invoice_id: Set(None),
        ..Default::default()
    }
    .insert(&*state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionDto::from_model(created, req.description, req.category)),
    ))
}

async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(req): Json<TransactionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    let existing = transaction::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Transaction not found".to_string()))?;

    let mut active: transaction::ActiveModel = existing.into();
    active.amount = Set(req.amount);
    active.transaction_type = Set(req.transaction_type);
    active.date = Set(parse_date(&req.date)?);
    let updated = active.update(&*state.db).await?;

    Ok(Json(TransactionDto::from_model(updated, req.description, req.category)))
}

async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let existing = transaction::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Transaction not found".to_string()))?;
    existing.delete(&*state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
struct MonthlySummary {
    month: String,
    income: f64,
    expenses: f64,
    profit: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FinancialSummary {
    total_income: f64,
    total_expenses: f64,
    net_profit: f64,
    monthly_data: Vec<MonthlySummary>,
    transaction_count: usize,
}

/// All-time totals plus a 6-month breakdown, oldest month first.
async fn get_summary(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let transactions = transaction::Entity::find().all(&*state.db).await?;

    let total_income: f64 = transactions
        .iter()
        .filter(|t| t.transaction_type == "income")
        .map(|t| t.amount)
        .sum();
    let total_expenses: f64 = transactions
        .iter()
        .filter(|t| t.transaction_type == "expense")
        .map(|t| t.amount)
        .sum();

    let mut monthly_data = Vec::with_capacity(6);
    for offset in (0..6).rev() {
        let month_start = month_start_ago(offset);
        let (start, next) = super::common::month_window(month_start);

        let income: f64 = transactions
            .iter()
            .filter(|t| t.transaction_type == "income" && t.date >= start && t.date < next)
            .map(|t| t.amount)
            .sum();
        let expenses: f64 = transactions
            .iter()
            .filter(|t| t.transaction_type == "expense" && t.date >= start && t.date < next)
            .map(|t| t.amount)
            .sum();

        monthly_data.push(MonthlySummary {
            month: month_label(month_start),
            income,
            expenses,
            profit: income - expenses,
        });
    }

    Ok(Json(FinancialSummary {
        total_income,
        total_expenses,
        net_profit: total_income - total_expenses,
        monthly_data,
        transaction_count: transactions.len(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceDto {
    id: i32,
    customer_name: String,
    amount: f64,
    date: String,
    status: String,
    reference: String,
    paid: bool,
}

async fn list_invoices(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let customers = customer::Entity::find().all(&*state.db).await?;
    let names: HashMap<i32, String> = customers.into_iter().map(|c| (c.id, c.name)).collect();

    let rows = invoice::Entity::find()
        .order_by_desc(invoice::Column::Date)
        .find_with_related(transaction::Entity)
        .all(&*state.db)
        .await?;

    let invoices: Vec<InvoiceDto> = rows
        .into_iter()
        .map(|(inv, transactions)| InvoiceDto {
            reference: format!("INV-{}", inv.id),
            id: inv.id,
            customer_name: names.get(&inv.customer_id).cloned().unwrap_or_default(),
            amount: inv.amount,
            date: fmt_date(inv.date),
            status: inv.status,
            paid: !transactions.is_empty(),
        })
        .collect();

    Ok(Json(invoices))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct InvoiceRequest {
    customer_id: i32,
    amount: f64,
    date: String,
    status: Option<String>,
}

async fn create_invoice(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<InvoiceRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    let cust = customer::Entity::find_by_id(req.customer_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;

    let created = invoice::ActiveModel {
        customer_id: Set(req.customer_id),
        amount: Set(req.amount),
        date: Set(parse_date(&req.date)?),
        status: Set(req.status.unwrap_or_else(|| "pending".to_string())),
        ..Default::default()
    }
    .insert(&*state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(InvoiceDto {
            reference: format!("INV-{}", created.id),
            id: created.id,
            customer_name: cust.name,
            amount: created.amount,
            date: fmt_date(created.date),
            status: created.status,
            paid: false,
        }),
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions", post(create_transaction))
        .route("/transactions/:id", get(get_transaction))
        .route("/transactions/:id", put(update_transaction))
        .route("/transactions/:id", delete(delete_transaction))
        .route("/summary", get(get_summary))
        .route("/invoices", get(list_invoices))
        .route("/invoices", post(create_invoice))
}
