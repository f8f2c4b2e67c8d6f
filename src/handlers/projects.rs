use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use super::common::{fmt_date, fmt_naive_date, parse_date};
use crate::auth::AuthUser;
use crate::entities::{customer, employee, project, task};
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectDto {
    id: i32,
    name: String,
    customer: String,
    status: String,
    progress: i32,
    start_date: String,
    end_date: String,
    budget: f64,
    spent: f64,
    team: Vec<String>,
    priority: String,
    description: String,
}

/// Status/progress are derived from the project's task completion; projects
/// themselves carry no dates or budget, so the list view shows placeholders.
fn project_dto(
    proj: project::Model,
    customer: String,
    tasks: &[task::Model],
    assignee_names: &HashMap<i32, String>,
) -> ProjectDto {
    let completed = tasks.iter().filter(|t| t.status == "completed").count();
    let total = tasks.len();
    let progress = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as i32
    } else {
        0
    };
    let status = if total == 0 {
        "planning"
    } else if progress == 100 {
        "completed"
    } else if progress > 50 {
        "in-progress"
    } else {
        "active"
    };

    let team: Vec<String> = tasks
        .iter()
        .filter_map(|t| t.assigned_to_id)
        .filter_map(|id| assignee_names.get(&id).cloned())
        .take(3)
        .collect();

    let today = Utc::now().date_naive();
    ProjectDto {
        id: proj.id,
        name: proj.name,
        customer,
        status: status.to_string(),
        progress,
        start_date: fmt_naive_date(today),
        end_date: fmt_naive_date(today + Duration::days(30)),
        budget: 0.0,
        spent: 0.0,
        team,
        priority: "medium".to_string(),
        description: String::new(),
    }
}

async fn load_context(
    state: &AppState,
) -> Result<(HashMap<i32, String>, HashMap<i32, String>), ServiceError> {
    let customers = customer::Entity::find().all(&*state.db).await?;
    let customer_names: HashMap<i32, String> =
        customers.into_iter().map(|c| (c.id, c.name)).collect();

    let employees = employee::Entity::find().all(&*state.db).await?;
    let employee_names: HashMap<i32, String> =
        employees.iter().map(|e| (e.id, e.full_name())).collect();

    Ok((customer_names, employee_names))
}

async fn list_projects(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let (customer_names, employee_names) = load_context(&state).await?;
    let rows = project::Entity::find()
        .find_with_related(task::Entity)
        .all(&*state.db)
        .await?;

    let projects: Vec<ProjectDto> = rows
        .into_iter()
        .map(|(proj, tasks)| {
            let customer = customer_names
                .get(&proj.customer_id)
                .cloned()
                .unwrap_or_default();
            project_dto(proj, customer, &tasks, &employee_names)
        })
        .collect();
    Ok(Json(projects))
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let proj = project::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

    let (customer_names, employee_names) = load_context(&state).await?;
    let tasks = task::Entity::find()
        .filter(task::Column::ProjectId.eq(proj.id))
        .all(&*state.db)
        .await?;
    let customer = customer_names
        .get(&proj.customer_id)
        .cloned()
        .unwrap_or_default();

    Ok(Json(project_dto(proj, customer, &tasks, &employee_names)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ProjectRequest {
    #[validate(length(min = 1, max = 255))]
    name: String,
    customer_id: i32,
}

async fn create_project(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<ProjectRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    let cust = customer::Entity::find_by_id(req.customer_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;

    let created = project::ActiveModel {
        name: Set(req.name),
        customer_id: Set(req.customer_id),
        ..Default::default()
    }
    .insert(&*state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(project_dto(created, cust.name, &[], &HashMap::new())),
    ))
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(req): Json<ProjectRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    let existing = project::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;
    let cust = customer::Entity::find_by_id(req.customer_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;

    let mut active: project::ActiveModel = existing.into();
    active.name = Set(req.name);
    active.customer_id = Set(req.customer_id);
    let updated = active.update(&*state.db).await?;

    let (_, employee_names) = load_context(&state).await?;
    let tasks = task::Entity::find()
        .filter(task::Column::ProjectId.eq(updated.id))
        .all(&*state.db)
        .await?;

    Ok(Json(project_dto(updated, cust.name, &tasks, &employee_names)))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let existing = project::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;
    existing.delete(&*state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskDto {
    id: i32,
    name: String,
    status: String,
    assigned_to: String,
    due_date: String,
    priority: String,
    description: String,
}

fn task_dto(t: task::Model, assignee_names: &HashMap<i32, String>) -> TaskDto {
    let assigned_to = t
        .assigned_to_id
        .and_then(|id| assignee_names.get(&id).cloned())
        .unwrap_or_else(|| "Unassigned".to_string());
    TaskDto {
        id: t.id,
        name: t.name,
        status: t.status,
        assigned_to,
        due_date: t
            .due_date
            .map(fmt_date)
            .unwrap_or_else(|| fmt_naive_date(Utc::now().date_naive())),
        priority: t.priority.unwrap_or_else(|| "medium".to_string()),
        description: t.description.unwrap_or_default(),
    }
}

async fn list_project_tasks(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let (_, employee_names) = load_context(&state).await?;
    let tasks = task::Entity::find()
        .filter(task::Column::ProjectId.eq(id))
        .all(&*state.db)
        .await?;

    let out: Vec<TaskDto> = tasks
        .into_iter()
        .map(|t| task_dto(t, &employee_names))
        .collect();
    Ok(Json(out))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct TaskRequest {
    #[validate(length(min = 1, max = 255))]
    name: String,
    assigned_to_id: Option<i32>,
    status: Option<String>,
    description: Option<String>,
    due_date: Option<String>,
    priority: Option<String>,
}

async fn create_project_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(req): Json<TaskRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    project::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

    let due_date = match &req.due_date {
        Some(value) => Some(parse_date(value)?),
        None => None,
    };

    let created = task::ActiveModel {
        name: Set(req.name),
        description: Set(req.description),
        status: Set(req.status.unwrap_or_else(|| "pending".to_string())),
        priority: Set(req.priority),
        due_date: Set(due_date),
        project_id: Set(id),
        assigned_to_id: Set(req.assigned_to_id),
        ..Default::default()
    }
    .insert(&*state.db)
    .await?;

    let (_, employee_names) = load_context(&state).await?;
    Ok((StatusCode::CREATED, Json(task_dto(created, &employee_names))))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects))
        .route("/", post(create_project))
        .route("/:id", get(get_project))
        .route("/:id", put(update_project))
        .route("/:id", delete(delete_project))
        .route("/:id/tasks", get(list_project_tasks))
        .route("/:id/tasks", post(create_project_task))
}
