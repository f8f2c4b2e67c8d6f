use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::parse_date;
use crate::auth::AuthUser;
use crate::entities::{customer, recurring_invoice};
use crate::errors::ServiceError;
use crate::services::automation::RuleOutcome;
use crate::AppState;

async fn list_alerts(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let alerts = state.services.automation.list_alerts().await?;
    Ok(Json(alerts))
}

async fn resolve_alert(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let alert = state
        .services
        .automation
        .resolve_alert(id, Some(user.user_id))
        .await?;
    Ok(Json(alert))
}

#[derive(Debug, Serialize)]
struct TriggerResponse {
    message: String,
    outcome: RuleOutcome,
}

async fn trigger_payroll(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state.services.automation.generate_monthly_payroll().await?;
    Ok(Json(TriggerResponse {
        message: "Payroll generation triggered successfully".to_string(),
        outcome,
    }))
}

async fn trigger_recurring_invoices(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state
        .services
        .automation
        .process_recurring_invoices()
        .await?;
    Ok(Json(TriggerResponse {
        message: "Recurring invoices processed successfully".to_string(),
        outcome,
    }))
}

async fn trigger_attendance_check(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state.services.automation.check_attendance().await?;
    Ok(Json(TriggerResponse {
        message: "Attendance check triggered successfully".to_string(),
        outcome,
    }))
}

async fn trigger_low_stock_check(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state.services.automation.check_low_stock().await?;
    Ok(Json(TriggerResponse {
        message: "Low stock check triggered successfully".to_string(),
        outcome,
    }))
}

async fn list_email_templates(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let templates = state.services.email.list_templates().await?;
    Ok(Json(templates))
}

#[derive(Debug, Deserialize, Validate)]
struct TemplateRequest {
    #[validate(length(min = 1, max = 255))]
    name: String,
    #[validate(length(min = 1))]
    subject: String,
    #[validate(length(min = 1))]
    body: String,
    #[serde(default)]
    variables: Vec<String>,
}

async fn upsert_email_template(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<TemplateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    let template = state
        .services
        .email
        .upsert_template(&req.name, &req.subject, &req.body, req.variables, true)
        .await?;
    Ok(Json(template))
}

async fn list_email_logs(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let logs = state.services.email.recent_logs().await?;
    Ok(Json(logs))
}

#[derive(Debug, Serialize)]
struct RecurringInvoiceDto {
    #[serde(flatten)]
    invoice: recurring_invoice::Model,
    customer_name: String,
}

async fn list_recurring_invoices(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = recurring_invoice::Entity::find()
        .order_by_desc(recurring_invoice::Column::CreatedAt)
        .find_also_related(customer::Entity)
        .all(&*state.db)
        .await?;

    let out: Vec<RecurringInvoiceDto> = rows
        .into_iter()
        .map(|(inv, cust)| RecurringInvoiceDto {
            invoice: inv,
            customer_name: cust.map(|c| c.name).unwrap_or_default(),
        })
        .collect();
    Ok(Json(out))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct RecurringInvoiceRequest {
    customer_id: i32,
    amount: f64,
    /// "monthly", "quarterly" or "yearly"
    #[validate(length(min = 1))]
    frequency: String,
    start_date: String,
    end_date: Option<String>,
}

async fn create_recurring_invoice(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<RecurringInvoiceRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    let cust = customer::Entity::find_by_id(req.customer_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;

    let start = parse_date(&req.start_date)?;
    let end = match &req.end_date {
        Some(value) => Some(parse_date(value)?),
        None => None,
    };

    let created = recurring_invoice::ActiveModel {
        customer_id: Set(req.customer_id),
        amount: Set(req.amount),
        frequency: Set(req.frequency),
        start_date: Set(start),
        end_date: Set(end),
        next_due_date: Set(start),
        status: Set("active".to_string()),
        ..Default::default()
    }
    .insert(&*state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RecurringInvoiceDto {
            invoice: created,
            customer_name: cust.name,
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecurringInvoiceUpdate {
    status: Option<String>,
    next_due_date: Option<String>,
}

async fn update_recurring_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(req): Json<RecurringInvoiceUpdate>,
) -> Result<impl IntoResponse, ServiceError> {
    let existing = recurring_invoice::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Recurring invoice not found".to_string()))?;

    let mut active: recurring_invoice::ActiveModel = existing.into();
    if let Some(status) = req.status {
        active.status = Set(status);
    }
    if let Some(next_due) = req.next_due_date {
        active.next_due_date = Set(parse_date(&next_due)?);
    }
    let updated = active.update(&*state.db).await?;

    let customer_name = customer::Entity::find_by_id(updated.customer_id)
        .one(&*state.db)
        .await?
        .map(|c| c.name)
        .unwrap_or_default();

    Ok(Json(RecurringInvoiceDto {
        invoice: updated,
        customer_name,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(list_alerts))
        .route("/alerts/:id/resolve", patch(resolve_alert))
        .route("/trigger/payroll", post(trigger_payroll))
        .route("/trigger/recurring-invoices", post(trigger_recurring_invoices))
        .route("/trigger/attendance-check", post(trigger_attendance_check))
        .route("/trigger/low-stock-check", post(trigger_low_stock_check))
        .route("/email-templates", get(list_email_templates))
        .route("/email-templates", post(upsert_email_template))
        .route("/email-logs", get(list_email_logs))
        .route("/recurring-invoices", get(list_recurring_invoices))
        .route("/recurring-invoices", post(create_recurring_invoice))
        .route("/recurring-invoices/:id", patch(update_recurring_invoice))
}
