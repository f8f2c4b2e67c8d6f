use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use super::common::{fmt_date, fmt_naive_date, parse_naive_date};
use crate::auth::AuthUser;
use crate::entities::{attendance, department, employee};
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeDto {
    id: i32,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    position: String,
    role: String,
    department: String,
    hire_date: String,
    salary: f64,
    status: String,
    avatar: Option<String>,
}

impl EmployeeDto {
    fn from_model(emp: employee::Model, department: String) -> Self {
        let position = emp.position.unwrap_or_default();
        Self {
            id: emp.id,
            first_name: emp.first_name,
            last_name: emp.last_name,
            email: emp.email,
            phone: emp.phone.unwrap_or_default(),
            role: emp.role.clone().unwrap_or_else(|| position.clone()),
            position,
            department,
            hire_date: fmt_naive_date(emp.hire_date),
            salary: emp.salary.unwrap_or(0.0),
            status: emp.status,
            avatar: None,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct EmployeeRequest {
    #[validate(length(min = 1, max = 100))]
    first_name: String,
    #[validate(length(min = 1, max = 100))]
    last_name: String,
    #[validate(email)]
    email: String,
    phone: Option<String>,
    position: Option<String>,
    role: Option<String>,
    salary: Option<f64>,
    status: Option<String>,
    hire_date: Option<String>,
    /// Department name; created on the fly if it does not exist yet
    #[validate(length(min = 1, max = 255))]
    department: String,
}

async fn find_or_create_department(
    state: &AppState,
    name: &str,
) -> Result<department::Model, ServiceError> {
    let existing = department::Entity::find()
        .filter(department::Column::Name.eq(name))
        .one(&*state.db)
        .await?;
    if let Some(dept) = existing {
        return Ok(dept);
    }

    let created = department::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(&*state.db)
    .await?;
    Ok(created)
}

async fn list_employees(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let rows = employee::Entity::find()
        .find_also_related(department::Entity)
        .all(&*state.db)
        .await?;

    let employees: Vec<EmployeeDto> = rows
        .into_iter()
        .map(|(emp, dept)| {
            let department = dept.map(|d| d.name).unwrap_or_default();
            EmployeeDto::from_model(emp, department)
        })
        .collect();

    Ok(Json(employees))
}

async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let (emp, dept) = employee::Entity::find_by_id(id)
        .find_also_related(department::Entity)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Employee not found".to_string()))?;

    let department = dept.map(|d| d.name).unwrap_or_default();
    Ok(Json(EmployeeDto::from_model(emp, department)))
}

async fn create_employee(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<EmployeeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    let dept = find_or_create_department(&state, &req.department).await?;

    let hire_date = match &req.hire_date {
        Some(value) => parse_naive_date(value)?,
        None => Utc::now().date_naive(),
    };

    let created = employee::ActiveModel {
        first_name: Set(req.first_name),
        last_name: Set(req.last_name),
        email: Set(req.email),
        phone: Set(req.phone),
        role: Set(req.role.clone().or_else(|| req.position.clone())),
        position: Set(req.position),
        salary: Set(req.salary),
        hourly_rate: Set(None),
        status: Set(req.status.unwrap_or_else(|| "active".to_string())),
        hire_date: Set(hire_date),
        department_id: Set(dept.id),
        ..Default::default()
    }
    .insert(&*state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(EmployeeDto::from_model(created, dept.name)),
    ))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(req): Json<EmployeeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    let existing = employee::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Employee not found".to_string()))?;

    let dept = find_or_create_department(&state, &req.department).await?;
    let hire_date = match &req.hire_date {
        Some(value) => parse_naive_date(value)?,
        None => existing.hire_date,
    };

    let mut active: employee::ActiveModel = existing.into();
    active.first_name = Set(req.first_name);
    active.last_name = Set(req.last_name);
    active.email = Set(req.email);
    active.phone = Set(req.phone);
    active.role = Set(req.role.clone().or_else(|| req.position.clone()));
    active.position = Set(req.position);
    active.salary = Set(req.salary);
    active.status = Set(req.status.unwrap_or_else(|| "active".to_string()));
    active.hire_date = Set(hire_date);
    active.department_id = Set(dept.id);
    let updated = active.update(&*state.db).await?;

    Ok(Json(EmployeeDto::from_model(updated, dept.name)))
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let existing = employee::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Employee not found".to_string()))?;
    existing.delete(&*state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Department names only, as the HR form consumes them.
async fn list_departments(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let departments = department::Entity::find().all(&*state.db).await?;
    let names: Vec<String> = departments.into_iter().map(|d| d.name).collect();
    Ok(Json(names))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttendanceDto {
    id: i32,
    employee_id: i32,
    employee_name: String,
    date: String,
    check_in: Option<String>,
    check_out: Option<String>,
    hours_worked: Option<f64>,
}

async fn list_attendance(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let employees = employee::Entity::find().all(&*state.db).await?;
    let names: HashMap<i32, String> = employees
        .iter()
        .map(|e| (e.id, e.full_name()))
        .collect();

    let rows = attendance::Entity::find().all(&*state.db).await?;
    let attendance: Vec<AttendanceDto> = rows
        .into_iter()
        .map(|row| AttendanceDto {
            id: row.id,
            employee_id: row.employee_id,
            employee_name: names.get(&row.employee_id).cloned().unwrap_or_default(),
            date: fmt_naive_date(row.date),
            check_in: row.check_in.map(fmt_date),
            check_out: row.check_out.map(fmt_date),
            hours_worked: row.hours_worked,
        })
        .collect();

    Ok(Json(attendance))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees))
        .route("/employees", post(create_employee))
        .route("/employees/:id", get(get_employee))
        .route("/employees/:id", put(update_employee))
        .route("/employees/:id", delete(delete_employee))
        .route("/departments", get(list_departments))
        .route("/attendance", get(list_attendance))
}
