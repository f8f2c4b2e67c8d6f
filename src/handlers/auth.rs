use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::auth::AuthUser;
use crate::entities::{employee, role, user};
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Serialize)]
struct UserInfo {
    id: i32,
    email: String,
    role: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    user: UserInfo,
}

#[derive(Debug, Deserialize, Validate)]
struct LoginRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 1))]
    password: String,
}

async fn display_name(state: &AppState, u: &user::Model) -> Result<String, ServiceError> {
    if let Some(employee_id) = u.employee_id {
        if let Some(emp) = employee::Entity::find_by_id(employee_id)
            .one(&*state.db)
            .await?
        {
            return Ok(emp.full_name());
        }
    }
    Ok(u.email.clone())
}

async fn role_name(state: &AppState, role_id: i32) -> Result<String, ServiceError> {
    let r = role::Entity::find_by_id(role_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::InternalError("Role not found".to_string()))?;
    Ok(r.name)
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    let found = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::AuthError("Invalid credentials".to_string()))?;

    if !state.auth.verify_password(&req.password, &found.password_hash)? {
        return Err(ServiceError::AuthError("Invalid credentials".to_string()));
    }

    let role = role_name(&state, found.role_id).await?;
    let token = state.auth.create_token(found.id, &found.email, &role)?;
    let name = display_name(&state, &found).await?;

    info!(user_id = found.id, "User logged in");
    Ok(Json(AuthResponse {
        token,
        user: UserInfo {
            id: found.id,
            email: found.email,
            role,
            name,
        },
    }))
}

#[derive(Debug, Deserialize, Validate)]
struct RegisterRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 8))]
    password: String,
    name: Option<String>,
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(&*state.db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::BadRequest("User already exists".to_string()));
    }

    // Default role, created on first use
    let default_role = match role::Entity::find()
        .filter(role::Column::Name.eq("user"))
        .one(&*state.db)
        .await?
    {
        Some(r) => r,
        None => {
            role::ActiveModel {
                name: Set("user".to_string()),
                ..Default::default()
            }
            .insert(&*state.db)
            .await?
        }
    };

    let password_hash = state.auth.hash_password(&req.password)?;
    let created = user::ActiveModel {
        email: Set(req.email),
        password_hash: Set(password_hash),
        role_id: Set(default_role.id),
        employee_id: Set(None),
        ..Default::default()
    }
    .insert(&*state.db)
    .await?;

    let token = state
        .auth
        .create_token(created.id, &created.email, &default_role.name)?;

    info!(user_id = created.id, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserInfo {
                id: created.id,
                email: created.email.clone(),
                role: default_role.name,
                name: req.name.unwrap_or(created.email),
            },
            token,
        }),
    ))
}

async fn profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let found = user::Entity::find_by_id(auth_user.user_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

    let role = role_name(&state, found.role_id).await?;
    let name = display_name(&state, &found).await?;
    Ok(Json(UserInfo {
        id: found.id,
        email: found.email,
        role,
        name,
    }))
}

/// Token invalidation happens client-side.
async fn logout() -> impl IntoResponse {
    Json(json!({ "message": "Logged out successfully" }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/profile", get(profile))
        .route("/logout", post(logout))
}
