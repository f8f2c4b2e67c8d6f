use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::common::total_stock;
use crate::entities::{customer, employee, product, project, task};
use crate::errors::ServiceError;
use crate::AppState;

const MAX_RESULTS: usize = 20;
const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    #[serde(rename = "type")]
    kind: &'static str,
    id: i32,
    title: String,
    subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stock_quantity: Option<i64>,
}

impl SearchResult {
    fn new(kind: &'static str, id: i32, title: String, subtitle: String) -> Self {
        Self {
            kind,
            id,
            title,
            subtitle,
            email: None,
            description: None,
            status: None,
            stock_quantity: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

/// Global substring search across employees, customers, tasks, products
/// and projects. Rows whose title or subtitle contain the term sort first;
/// the merged list is capped at 20.
async fn global_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let term = params.q.unwrap_or_default().to_lowercase();
    if term.len() < MIN_QUERY_LEN {
        return Ok(Json(Vec::<SearchResult>::new()));
    }

    let db = &*state.db;
    let mut results = Vec::new();

    let employees = employee::Entity::find()
        .filter(
            Condition::any()
                .add(employee::Column::FirstName.contains(&term))
                .add(employee::Column::LastName.contains(&term))
                .add(employee::Column::Email.contains(&term)),
        )
        .all(db)
        .await?;
    for emp in employees {
        let title = emp.full_name();
        results.push(SearchResult::new("Employee", emp.id, title, emp.email));
    }

    let customers = customer::Entity::find()
        .filter(
            Condition::any()
                .add(customer::Column::Name.contains(&term))
                .add(customer::Column::Email.contains(&term)),
        )
        .all(db)
        .await?;
    for cust in customers {
        let mut result =
            SearchResult::new("Customer", cust.id, cust.name.clone(), cust.name);
        result.email = Some(cust.email);
        results.push(result);
    }

    let project_names: HashMap<i32, String> = project::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    let tasks = task::Entity::find()
        .filter(
            Condition::any()
                .add(task::Column::Name.contains(&term))
                .add(task::Column::Description.contains(&term)),
        )
        .all(db)
        .await?;
    for t in tasks {
        let subtitle = project_names
            .get(&t.project_id)
            .cloned()
            .unwrap_or_else(|| "No Project".to_string());
        let mut result = SearchResult::new("Task", t.id, t.name, subtitle);
        result.description = t.description;
        results.push(result);
    }

    let products = product::Entity::find()
        .filter(
            Condition::any()
                .add(product::Column::Name.contains(&term))
                .add(product::Column::Sku.contains(&term)),
        )
        .all(db)
        .await?;
    for prod in products {
        let quantity = total_stock(db, prod.id).await?;
        let mut result = SearchResult::new("Product", prod.id, prod.name, prod.sku);
        result.status = Some(if quantity > 0 { "In Stock" } else { "Out of Stock" }.to_string());
        result.stock_quantity = Some(quantity);
        results.push(result);
    }

    let customer_names: HashMap<i32, String> = customer::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let projects = project::Entity::find()
        .filter(project::Column::Name.contains(&term))
        .all(db)
        .await?;
    for proj in projects {
        let subtitle = customer_names
            .get(&proj.customer_id)
            .cloned()
            .unwrap_or_else(|| "Internal Project".to_string());
        results.push(SearchResult::new("Project", proj.id, proj.name, subtitle));
    }

    results.sort_by_key(|r| {
        let direct = r.title.to_lowercase().contains(&term)
            || r.subtitle.to_lowercase().contains(&term);
        !direct
    });
    results.truncate(MAX_RESULTS);

    Ok(Json(results))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(global_search))
}
