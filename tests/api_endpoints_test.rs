mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{assert_json, TestApp};
use serde_json::json;

async fn admin_token(app: &TestApp) -> String {
    let role = app.seed_role("admin").await;
    let user = app
        .seed_user("admin@example.com", "password123", role.id, None)
        .await;
    app.token_for(user.id, &user.email, "admin")
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = TestApp::new().await;
    let body = assert_json(app.get("/api/health").await, StatusCode::OK).await;
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn employee_crud_with_department_autocreation() {
    let app = TestApp::new().await;
    let token = admin_token(&app).await;

    let created = assert_json(
        app.post_json(
            "/api/hr/employees",
            json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "position": "Engineer",
                "salary": 4800.0,
                "department": "Engineering"
            }),
            Some(&token),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(created["department"], "Engineering");
    // No explicit role, so the position doubles as one
    assert_eq!(created["role"], "Engineer");
    assert_eq!(created["status"], "active");
    assert!(created["avatar"].is_null());
    let id = created["id"].as_i64().unwrap();

    let fetched = assert_json(
        app.get(&format!("/api/hr/employees/{id}")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(fetched["firstName"], "Ada");
    assert_eq!(fetched["salary"], 4800.0);

    let departments = assert_json(app.get("/api/hr/departments").await, StatusCode::OK).await;
    assert_eq!(departments, json!(["Engineering"]));

    let response = app.get("/api/hr/employees/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mutating_hr_routes_require_authentication() {
    let app = TestApp::new().await;
    let response = app
        .post_json(
            "/api/hr/employees",
            json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "department": "Engineering"
            }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn attendance_listing_resolves_employee_names() {
    let app = TestApp::new().await;
    let dept = app.seed_department("Engineering").await;
    let emp = app
        .seed_employee("Ada", "Lovelace", "ada@example.com", dept.id, None)
        .await;
    app.seed_attendance(emp.id, Utc::now().date_naive(), Some(7.5))
        .await;

    let body = assert_json(app.get("/api/hr/attendance").await, StatusCode::OK).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["employeeName"], "Ada Lovelace");
    assert_eq!(rows[0]["hoursWorked"], 7.5);
}

#[tokio::test]
async fn product_lifecycle_and_stock_alerts() {
    let app = TestApp::new().await;
    let token = admin_token(&app).await;

    let created = assert_json(
        app.post_json(
            "/api/inventory/products",
            json!({ "name": "Widget", "sku": "WID-1", "price": 9.99, "stock": 50 }),
            Some(&token),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(created["status"], "in-stock");
    assert_eq!(created["category"], "General");
    let id = created["id"].as_i64().unwrap();

    // PATCH the stock level below the alert threshold
    let patched = assert_json(
        app.patch_json(
            &format!("/api/inventory/products/{id}/stock"),
            json!({ "quantity": 3 }),
            Some(&token),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(patched["success"], true);

    let alerts = assert_json(app.get("/api/inventory/stock-alerts").await, StatusCode::OK).await;
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["currentStock"], 3);
    assert_eq!(alerts[0]["threshold"], 10);
    assert_eq!(alerts[0]["status"], "low");

    let categories = assert_json(app.get("/api/inventory/categories").await, StatusCode::OK).await;
    assert_eq!(
        categories,
        json!(["Electronics", "Clothing", "Books", "Home & Garden", "Sports"])
    );
}

#[tokio::test]
async fn customer_listing_aggregates_projects_and_revenue() {
    let app = TestApp::new().await;
    let cust = app.seed_customer("Acme Corp", "sales@acme.test").await;
    app.seed_project("Rollout", cust.id).await;
    app.seed_invoice(cust.id, 100.0, "paid", None).await;
    app.seed_invoice(cust.id, 50.0, "sent", None).await;

    let body = assert_json(app.get("/api/crm/customers").await, StatusCode::OK).await;
    let customers = body.as_array().unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0]["company"], "Acme Corp");
    assert_eq!(customers[0]["totalProjects"], 1);
    assert_eq!(customers[0]["totalInvoices"], 2);
    assert_eq!(customers[0]["totalRevenue"], 150.0);
}

#[tokio::test]
async fn leads_mark_customers_with_projects_as_converted() {
    let app = TestApp::new().await;
    let converted = app.seed_customer("Acme Corp", "sales@acme.test").await;
    app.seed_project("Rollout", converted.id).await;
    app.seed_customer("Fresh Co", "hello@fresh.test").await;

    let body = assert_json(app.get("/api/crm/leads").await, StatusCode::OK).await;
    let leads = body.as_array().unwrap();
    assert_eq!(leads.len(), 2);
    let acme = leads.iter().find(|l| l["name"] == "Acme Corp").unwrap();
    assert_eq!(acme["status"], "converted");
    let fresh = leads.iter().find(|l| l["name"] == "Fresh Co").unwrap();
    assert_eq!(fresh["status"], "prospect");
    assert_eq!(fresh["source"], "website");
}

#[tokio::test]
async fn pipeline_buckets_projects_by_task_count() {
    let app = TestApp::new().await;
    let cust = app.seed_customer("Acme Corp", "sales@acme.test").await;
    app.seed_project("Empty", cust.id).await;
    let busy = app.seed_project("Busy", cust.id).await;
    for i in 0..3 {
        app.seed_task(&format!("Task {i}"), busy.id, "todo", None, None)
            .await;
    }

    let body = assert_json(app.get("/api/crm/pipeline").await, StatusCode::OK).await;
    assert_eq!(body["prospects"], 1);
    assert_eq!(body["proposal"], 1);
    assert_eq!(body["qualified"], 0);
}

#[tokio::test]
async fn customer_status_patch_acknowledges_or_404s() {
    let app = TestApp::new().await;
    let token = admin_token(&app).await;
    let cust = app.seed_customer("Acme Corp", "sales@acme.test").await;

    let body = assert_json(
        app.patch_json(
            &format!("/api/crm/customers/{}/status", cust.id),
            json!({ "status": "inactive" }),
            Some(&token),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Status updated successfully");

    let response = app
        .patch_json(
            "/api/crm/customers/9999/status",
            json!({ "status": "inactive" }),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn transactions_carry_derived_descriptions_and_references() {
    let app = TestApp::new().await;
    let cust = app.seed_customer("Acme Corp", "sales@acme.test").await;
    let inv = app.seed_invoice(cust.id, 200.0, "paid", None).await;
    app.seed_transaction(200.0, "income", Utc::now(), Some(inv.id))
        .await;
    let manual = app
        .seed_transaction(75.0, "expense", Utc::now(), None)
        .await;

    let body = assert_json(app.get("/api/accounting/transactions").await, StatusCode::OK).await;
    let txs = body.as_array().unwrap();
    assert_eq!(txs.len(), 2);

    let linked = txs.iter().find(|t| t["type"] == "income").unwrap();
    assert_eq!(linked["description"], format!("Invoice #{}", inv.id));
    assert_eq!(linked["reference"], format!("INV-{}", inv.id));
    assert_eq!(linked["category"], "Revenue");
    assert_eq!(linked["status"], "completed");

    let standalone = txs.iter().find(|t| t["type"] == "expense").unwrap();
    assert_eq!(standalone["description"], "Manual transaction");
    assert_eq!(standalone["reference"], format!("TXN-{}", manual.id));
    assert_eq!(standalone["category"], "Expense");
}

#[tokio::test]
async fn summary_totals_and_six_month_breakdown() {
    let app = TestApp::new().await;
    app.seed_transaction(1000.0, "income", Utc::now(), None).await;
    app.seed_transaction(400.0, "expense", Utc::now(), None).await;
    // Old enough to fall outside the 6-month window but still in the totals
    app.seed_transaction(50.0, "income", Utc::now() - Duration::days(400), None)
        .await;

    let body = assert_json(app.get("/api/accounting/summary").await, StatusCode::OK).await;
    assert_eq!(body["totalIncome"], 1050.0);
    assert_eq!(body["totalExpenses"], 400.0);
    assert_eq!(body["netProfit"], 650.0);
    assert_eq!(body["transactionCount"], 3);

    let monthly = body["monthlyData"].as_array().unwrap();
    assert_eq!(monthly.len(), 6);
    // Oldest first; the current month carries this month's figures
    let current = &monthly[5];
    assert_eq!(current["income"], 1000.0);
    assert_eq!(current["expenses"], 400.0);
    assert_eq!(current["profit"], 600.0);
}

#[tokio::test]
async fn invoices_expose_customer_name_and_paid_flag() {
    let app = TestApp::new().await;
    let token = admin_token(&app).await;
    let cust = app.seed_customer("Acme Corp", "sales@acme.test").await;
    let settled = app.seed_invoice(cust.id, 100.0, "paid", None).await;
    app.seed_transaction(100.0, "income", Utc::now(), Some(settled.id))
        .await;
    app.seed_invoice(cust.id, 50.0, "sent", None).await;

    let body = assert_json(app.get("/api/accounting/invoices").await, StatusCode::OK).await;
    let invoices = body.as_array().unwrap();
    assert_eq!(invoices.len(), 2);
    let paid = invoices
        .iter()
        .find(|i| i["id"] == settled.id)
        .unwrap();
    assert_eq!(paid["customerName"], "Acme Corp");
    assert_eq!(paid["reference"], format!("INV-{}", settled.id));
    assert_eq!(paid["paid"], true);
    let open = invoices.iter().find(|i| i["id"] != settled.id).unwrap();
    assert_eq!(open["paid"], false);

    let created = assert_json(
        app.post_json(
            "/api/accounting/invoices",
            json!({ "customerId": cust.id, "amount": 75.0, "date": "2026-08-01" }),
            Some(&token),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(created["status"], "pending");

    let response = app
        .post_json(
            "/api/accounting/invoices",
            json!({ "customerId": 9999, "amount": 75.0, "date": "2026-08-01" }),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn project_progress_derives_from_task_completion() {
    let app = TestApp::new().await;
    let cust = app.seed_customer("Acme Corp", "sales@acme.test").await;
    let proj = app.seed_project("Rollout", cust.id).await;
    app.seed_task("Done A", proj.id, "completed", None, None).await;
    app.seed_task("Done B", proj.id, "completed", None, None).await;
    app.seed_task("Open", proj.id, "todo", None, None).await;

    let body = assert_json(app.get("/api/projects").await, StatusCode::OK).await;
    let projects = body.as_array().unwrap();
    assert_eq!(projects.len(), 1);
    // 2 of 3 done: 67% rounds to in-progress
    assert_eq!(projects[0]["progress"], 67);
    assert_eq!(projects[0]["status"], "in-progress");
    assert_eq!(projects[0]["customer"], "Acme Corp");
}

#[tokio::test]
async fn empty_project_is_in_planning() {
    let app = TestApp::new().await;
    let token = admin_token(&app).await;
    let cust = app.seed_customer("Acme Corp", "sales@acme.test").await;

    let created = assert_json(
        app.post_json(
            "/api/projects",
            json!({ "name": "Greenfield", "customerId": cust.id }),
            Some(&token),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(created["status"], "planning");
    assert_eq!(created["progress"], 0);

    let tasks = assert_json(
        app.get(&format!("/api/projects/{}/tasks", created["id"])).await,
        StatusCode::OK,
    )
    .await;
    assert!(tasks.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn dashboard_report_counts_and_totals() {
    let app = TestApp::new().await;
    let dept = app.seed_department("Engineering").await;
    app.seed_employee("Ada", "Lovelace", "ada@example.com", dept.id, Some(4800.0))
        .await;
    let cust = app.seed_customer("Acme Corp", "sales@acme.test").await;
    app.seed_project("Rollout", cust.id).await;
    app.seed_product("Widget", "WID-1", 9.99, 10).await;
    app.seed_transaction(500.0, "income", Utc::now(), None).await;
    app.seed_transaction(120.0, "expense", Utc::now(), None).await;

    let body = assert_json(app.get("/api/reports/dashboard").await, StatusCode::OK).await;
    assert_eq!(body["summary"]["employees"], 1);
    assert_eq!(body["summary"]["customers"], 1);
    assert_eq!(body["summary"]["projects"], 1);
    assert_eq!(body["summary"]["products"], 1);
    assert_eq!(body["summary"]["revenue"], 500.0);
    assert_eq!(body["summary"]["expenses"], 120.0);
    assert_eq!(body["summary"]["profit"], 380.0);
    assert_eq!(body["monthlyData"].as_array().unwrap().len(), 12);
    assert!(body["recentActivities"].is_object());
    assert!(body["recentActivities"]["employees"].is_array());
    assert!(body["recentActivities"]["projects"].is_array());
    assert!(body["recentActivities"]["transactions"].is_array());
}

#[tokio::test]
async fn inventory_report_values_stock_at_price() {
    let app = TestApp::new().await;
    let warehouse = app.seed_warehouse("Main Warehouse").await;
    let prod = app.seed_product("Widget", "WID-1", 10.0, 10).await;
    app.set_stock(prod.id, warehouse.id, 30).await;

    let body = assert_json(app.get("/api/reports/inventory").await, StatusCode::OK).await;
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["stock"], 30);
    assert_eq!(products[0]["value"], 300.0);
    assert_eq!(body["summary"]["totalValue"], 300.0);
    assert_eq!(body["summary"]["lowStock"], 0);
}

#[tokio::test]
async fn insights_recommendations_flag_low_stock_and_overdue_invoices() {
    let app = TestApp::new().await;
    app.seed_product("Widget", "WID-1", 9.99, 10).await;
    let cust = app.seed_customer("Acme Corp", "sales@acme.test").await;
    app.seed_invoice(cust.id, 100.0, "sent", Some(Utc::now() - Duration::days(10)))
        .await;

    let body = assert_json(app.get("/api/insights/recommendations").await, StatusCode::OK).await;
    let recs = body.as_array().unwrap();
    let titles: Vec<&str> = recs.iter().map(|r| r["title"].as_str().unwrap()).collect();
    assert!(titles.contains(&"Low Stock Alert"));
    assert!(titles.contains(&"Overdue Invoices"));
}

#[tokio::test]
async fn cash_flow_forecast_produces_requested_horizon() {
    let app = TestApp::new().await;
    app.seed_transaction(1000.0, "income", Utc::now(), None).await;
    app.seed_transaction(300.0, "expense", Utc::now(), None).await;

    let body = assert_json(
        app.get("/api/insights/cash-flow-forecast?months=3").await,
        StatusCode::OK,
    )
    .await;
    let forecast = body.as_array().unwrap();
    assert_eq!(forecast.len(), 3);
    // Confidence decays with the horizon but never below 0.5
    let confidences: Vec<f64> = forecast
        .iter()
        .map(|p| p["confidence"].as_f64().unwrap())
        .collect();
    assert!(confidences.windows(2).all(|w| w[0] >= w[1]));
    assert!(confidences.iter().all(|c| *c >= 0.5));
}
