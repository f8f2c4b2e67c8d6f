use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use super::common::fmt_naive_date;
use crate::auth::AuthUser;
use crate::entities::{customer, invoice, project, task};
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerDto {
    id: i32,
    name: String,
    email: String,
    phone: String,
    company: String,
    status: String,
    total_projects: usize,
    total_invoices: usize,
    total_revenue: f64,
    last_contact: String,
    notes: String,
}

impl CustomerDto {
    fn from_model(
        cust: customer::Model,
        projects: usize,
        invoices: &[invoice::Model],
        status: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: cust.id,
            company: cust.name.clone(),
            name: cust.name,
            email: cust.email,
            phone: cust.phone.unwrap_or_default(),
            status: status.unwrap_or_else(|| "active".to_string()),
            total_projects: projects,
            total_invoices: invoices.len(),
            total_revenue: invoices.iter().map(|i| i.amount).sum(),
            last_contact: fmt_naive_date(Utc::now().date_naive()),
            notes: notes.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CustomerRequest {
    #[validate(length(min = 1, max = 255))]
    name: String,
    #[validate(email)]
    email: String,
    phone: Option<String>,
    company: Option<String>,
    status: Option<String>,
    notes: Option<String>,
}

async fn customer_relations(
    state: &AppState,
    customer_id: i32,
) -> Result<(usize, Vec<invoice::Model>), ServiceError> {
    let projects = project::Entity::find()
        .filter(project::Column::CustomerId.eq(customer_id))
        .all(&*state.db)
        .await?
        .len();
    let invoices = invoice::Entity::find()
        .filter(invoice::Column::CustomerId.eq(customer_id))
        .all(&*state.db)
        .await?;
    Ok((projects, invoices))
}

async fn list_customers(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let customers = customer::Entity::find().all(&*state.db).await?;

    let mut out = Vec::with_capacity(customers.len());
    for cust in customers {
        let (projects, invoices) = customer_relations(&state, cust.id).await?;
        out.push(CustomerDto::from_model(cust, projects, &invoices, None, None));
    }
    Ok(Json(out))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let cust = customer::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;
    let (projects, invoices) = customer_relations(&state, cust.id).await?;
    Ok(Json(CustomerDto::from_model(cust, projects, &invoices, None, None)))
}

async fn create_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<CustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    // The CRM form sends both; the company name wins when present
    let name = req.company.clone().unwrap_or(req.name);

    let created = customer::ActiveModel {
        name: Set(name),
        email: Set(req.email),
        phone: Set(req.phone),
        ..Default::default()
    }
    .insert(&*state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CustomerDto::from_model(created, 0, &[], req.status, req.notes)),
    ))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(req): Json<CustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    let existing = customer::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;

    let name = req.company.clone().unwrap_or(req.name);
    let mut active: customer::ActiveModel = existing.into();
    active.name = Set(name);
    active.email = Set(req.email);
    active.phone = Set(req.phone);
    let updated = active.update(&*state.db).await?;

    let (projects, invoices) = customer_relations(&state, updated.id).await?;
    Ok(Json(CustomerDto::from_model(
        updated, projects, &invoices, req.status, req.notes,
    )))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let existing = customer::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;
    existing.delete(&*state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LeadDto {
    id: i32,
    name: String,
    email: String,
    phone: String,
    company: String,
    status: String,
    source: String,
    assigned_to: String,
    created_at: String,
}

/// Customers double as leads; anyone with a project counts as converted.
async fn list_leads(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let customers = customer::Entity::find().all(&*state.db).await?;

    let mut leads = Vec::with_capacity(customers.len());
    for cust in customers {
        let projects = project::Entity::find()
            .filter(project::Column::CustomerId.eq(cust.id))
            .all(&*state.db)
            .await?
            .len();

        leads.push(LeadDto {
            id: cust.id,
            company: cust.name.clone(),
            name: cust.name,
            email: cust.email,
            phone: cust.phone.unwrap_or_default(),
            status: if projects > 0 { "converted" } else { "prospect" }.to_string(),
            source: "website".to_string(),
            assigned_to: String::new(),
            created_at: fmt_naive_date(Utc::now().date_naive()),
        });
    }
    Ok(Json(leads))
}

#[derive(Debug, Serialize)]
struct PipelineDto {
    prospects: usize,
    qualified: usize,
    proposal: usize,
    negotiation: usize,
    closed: usize,
}

/// Buckets projects into pipeline stages by task count.
async fn get_pipeline(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let projects = project::Entity::find().all(&*state.db).await?;

    let mut pipeline = PipelineDto {
        prospects: 0,
        qualified: 0,
        proposal: 0,
        negotiation: 0,
        closed: 0,
    };
    for proj in &projects {
        let tasks = task::Entity::find()
            .filter(task::Column::ProjectId.eq(proj.id))
            .all(&*state.db)
            .await?
            .len();
        match tasks {
            0 => pipeline.prospects += 1,
            1..=2 => pipeline.qualified += 1,
            3..=4 => pipeline.proposal += 1,
            5..=6 => pipeline.negotiation += 1,
            _ => pipeline.closed += 1,
        }
    }
    Ok(Json(pipeline))
}

#[derive(Debug, Deserialize)]
struct StatusUpdateRequest {
    #[allow(dead_code)]
    status: String,
}

/// Customers carry no status column; acknowledged for frontend compatibility.
async fn update_customer_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(_req): Json<StatusUpdateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    customer::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;
    Ok(Json(json!({
        "success": true,
        "message": "Status updated successfully"
    })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers))
        .route("/customers", post(create_customer))
        .route("/customers/:id", get(get_customer))
        .route("/customers/:id", put(update_customer))
        .route("/customers/:id", delete(delete_customer))
        .route("/customers/:id/status", patch(update_customer_status))
        .route("/leads", get(list_leads))
        .route("/pipeline", get(get_pipeline))
}
