use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct ForecastParams {
    months: Option<u32>,
}

async fn cash_flow_forecast(
    State(state): State<AppState>,
    Query(params): Query<ForecastParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let months = params.months.unwrap_or(6);
    let forecast = state.services.insights.cash_flow_forecast(months).await?;
    Ok(Json(forecast))
}

#[derive(Debug, Deserialize)]
struct ProfitabilityParams {
    limit: Option<usize>,
}

async fn profitable_customers(
    State(state): State<AppState>,
    Query(params): Query<ProfitabilityParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let limit = params.limit.unwrap_or(10);
    let customers = state
        .services
        .insights
        .most_profitable_customers(limit)
        .await?;
    Ok(Json(customers))
}

async fn kpi_analysis(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let kpis = state.services.insights.kpi_analysis().await?;
    Ok(Json(kpis))
}

async fn employee_performance(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let performance = state.services.insights.employee_performance().await?;
    Ok(Json(performance))
}

async fn inventory_insights(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let insights = state.services.insights.inventory_insights().await?;
    Ok(Json(insights))
}

async fn recommendations(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let recommendations = state.services.insights.recommendations().await?;
    Ok(Json(recommendations))
}

async fn trend_analysis(
    State(state): State<AppState>,
    Path(metric): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let analysis = state.services.insights.trend_analysis(&metric).await?;
    Ok(Json(analysis))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cash-flow-forecast", get(cash_flow_forecast))
        .route("/profitable-customers", get(profitable_customers))
        .route("/kpi-analysis", get(kpi_analysis))
        .route("/employee-performance", get(employee_performance))
        .route("/inventory", get(inventory_insights))
        .route("/recommendations", get(recommendations))
        .route("/trends/:metric", get(trend_analysis))
}
