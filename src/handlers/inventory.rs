use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Router,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use super::common::total_stock;
use crate::auth::AuthUser;
use crate::entities::{product, stock, warehouse};
use crate::errors::ServiceError;
use crate::AppState;

/// Fixed threshold the stock-alerts view uses, independent of the
/// per-product low_stock_threshold the automation rules consult.
const STOCK_ALERT_THRESHOLD: i64 = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductDto {
    id: i32,
    name: String,
    sku: String,
    price: f64,
    stock: i64,
    category: String,
    status: String,
    description: String,
    image: Option<String>,
}

impl ProductDto {
    fn from_model(prod: product::Model, stock: i64, category: Option<String>) -> Self {
        Self {
            id: prod.id,
            name: prod.name,
            sku: prod.sku,
            price: prod.price,
            stock,
            category: category.unwrap_or_else(|| "General".to_string()),
            status: if stock > 0 { "in-stock" } else { "out-of-stock" }.to_string(),
            description: String::new(),
            image: None,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ProductRequest {
    #[validate(length(min = 1, max = 255))]
    name: String,
    #[validate(length(min = 1, max = 100))]
    sku: String,
    price: f64,
    stock: Option<i32>,
    category: Option<String>,
}

async fn default_warehouse(state: &AppState) -> Result<warehouse::Model, ServiceError> {
    let existing = warehouse::Entity::find().one(&*state.db).await?;
    if let Some(wh) = existing {
        return Ok(wh);
    }

    let created = warehouse::ActiveModel {
        name: Set("Main Warehouse".to_string()),
        ..Default::default()
    }
    .insert(&*state.db)
    .await?;
    Ok(created)
}

/// Sets a product's stock level in the default warehouse, creating the
/// stock row if none exists yet.
async fn set_stock(state: &AppState, product_id: i32, quantity: i32) -> Result<(), ServiceError> {
    let wh = default_warehouse(state).await?;

    let existing = stock::Entity::find()
        .filter(stock::Column::ProductId.eq(product_id))
        .one(&*state.db)
        .await?;

    match existing {
        Some(row) => {
            let mut active: stock::ActiveModel = row.into();
            active.quantity = Set(quantity);
            active.update(&*state.db).await?;
        }
        None => {
            stock::ActiveModel {
                product_id: Set(product_id),
                warehouse_id: Set(wh.id),
                quantity: Set(quantity),
                ..Default::default()
            }
            .insert(&*state.db)
            .await?;
        }
    }
    Ok(())
}

async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let products = product::Entity::find().all(&*state.db).await?;

    let mut out = Vec::with_capacity(products.len());
    for prod in products {
        let stock = total_stock(&state.db, prod.id).await?;
        out.push(ProductDto::from_model(prod, stock, None));
    }
    Ok(Json(out))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let prod = product::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;
    let stock = total_stock(&state.db, prod.id).await?;
    Ok(Json(ProductDto::from_model(prod, stock, None)))
}

async fn create_product(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<ProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    let created = product::ActiveModel {
        name: Set(req.name),
        sku: Set(req.sku),
        price: Set(req.price),
        cost: Set(None),
        ..Default::default()
    }
    .insert(&*state.db)
    .await?;

    let quantity = req.stock.unwrap_or(0);
    if quantity > 0 {
        set_stock(&state, created.id, quantity).await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(ProductDto::from_model(created, quantity as i64, req.category)),
    ))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(req): Json<ProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;
    let existing = product::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

    let mut active: product::ActiveModel = existing.into();
    active.name = Set(req.name);
    active.sku = Set(req.sku);
    active.price = Set(req.price);
    let updated = active.update(&*state.db).await?;

    if let Some(quantity) = req.stock {
        set_stock(&state, updated.id, quantity).await?;
    }

    let stock = total_stock(&state.db, updated.id).await?;
    Ok(Json(ProductDto::from_model(updated, stock, req.category)))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let existing = product::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;
    existing.delete(&*state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Static category list; products carry no category column.
async fn list_categories() -> impl IntoResponse {
    Json(json!([
        "Electronics",
        "Clothing",
        "Books",
        "Home & Garden",
        "Sports"
    ]))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StockAlertDto {
    id: i32,
    name: String,
    sku: String,
    current_stock: i64,
    threshold: i64,
    status: String,
}

async fn list_stock_alerts(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = product::Entity::find().all(&*state.db).await?;

    let mut alerts = Vec::new();
    for prod in products {
        let current = total_stock(&state.db, prod.id).await?;
        if current <= STOCK_ALERT_THRESHOLD {
            alerts.push(StockAlertDto {
                id: prod.id,
                name: prod.name,
                sku: prod.sku,
                current_stock: current,
                threshold: STOCK_ALERT_THRESHOLD,
                status: "low".to_string(),
            });
        }
    }
    Ok(Json(alerts))
}

#[derive(Debug, Deserialize)]
struct StockUpdateRequest {
    quantity: i32,
}

async fn update_stock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(req): Json<StockUpdateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    product::Entity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

    set_stock(&state, id, req.quantity).await?;
    Ok(Json(json!({ "success": true })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products", post(create_product))
        .route("/products/:id", get(get_product))
        .route("/products/:id", put(update_product))
        .route("/products/:id", delete(delete_product))
        .route("/products/:id/stock", patch(update_stock))
        .route("/categories", get(list_categories))
        .route("/stock-alerts", get(list_stock_alerts))
}
