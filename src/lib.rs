//! Small-business ERP backend: HR, accounting, inventory, CRM, projects,
//! reports, automation rules and insights behind a JSON API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::{extract::FromRef, response::Json, routing::get, Router};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::handlers::AppServices;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub services: AppServices,
    pub auth: Arc<AuthService>,
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Full API surface under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .nest("/hr", handlers::hr::routes())
        .nest("/accounting", handlers::accounting::routes())
        .nest("/inventory", handlers::inventory::routes())
        .nest("/crm", handlers::crm::routes())
        .nest("/projects", handlers::projects::routes())
        .nest("/reports", handlers::reports::routes())
        .nest("/auth", handlers::auth::routes())
        .nest("/automation", handlers::automation::routes())
        .nest("/insights", handlers::insights::routes())
        .nest("/search", handlers::search::routes())
}

/// Top-level router with the `/api` prefix applied.
pub fn app_router(state: AppState) -> Router {
    Router::new().nest("/api", api_routes()).with_state(state)
}
