mod common;

use axum::http::StatusCode;
use common::{assert_json, TestApp};

#[tokio::test]
async fn short_queries_return_nothing() {
    let app = TestApp::new().await;
    let dept = app.seed_department("Engineering").await;
    app.seed_employee("Ada", "Lovelace", "ada@example.com", dept.id, None)
        .await;

    let body = assert_json(app.get("/api/search?q=a").await, StatusCode::OK).await;
    assert!(body.as_array().unwrap().is_empty());

    let body = assert_json(app.get("/api/search").await, StatusCode::OK).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn matches_across_entity_kinds() {
    let app = TestApp::new().await;
    let dept = app.seed_department("Engineering").await;
    app.seed_employee("Orion", "Vance", "orion@example.com", dept.id, None)
        .await;
    let cust = app.seed_customer("Orion Industries", "sales@orion.test").await;
    let proj = app.seed_project("Orion Rollout", cust.id).await;
    app.seed_task("Ship Orion batch", proj.id, "todo", None, None)
        .await;
    app.seed_product("Orion Cable", "ORN-1", 5.0, 10).await;

    let body = assert_json(app.get("/api/search?q=orion").await, StatusCode::OK).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 5);

    let kinds: Vec<&str> = results
        .iter()
        .map(|r| r["type"].as_str().unwrap())
        .collect();
    for kind in ["Employee", "Customer", "Task", "Product", "Project"] {
        assert!(kinds.contains(&kind), "missing {kind} in {kinds:?}");
    }

    let product = results.iter().find(|r| r["type"] == "Product").unwrap();
    assert_eq!(product["status"], "Out of Stock");
    assert_eq!(product["stockQuantity"], 0);
}

#[tokio::test]
async fn title_matches_sort_before_description_matches() {
    let app = TestApp::new().await;
    let cust = app.seed_customer("Acme Corp", "sales@acme.test").await;
    let proj = app.seed_project("Internal", cust.id).await;

    // Matches only in the description, so it should come last
    {
        use bizcore_api::entities::task;
        use sea_orm::{ActiveModelTrait, Set};
        task::ActiveModel {
            name: Set("Wire the rack".to_string()),
            description: Set(Some("Run the fiber cable through B2".to_string())),
            status: Set("todo".to_string()),
            project_id: Set(proj.id),
            ..Default::default()
        }
        .insert(&*app.db)
        .await
        .unwrap();
    }
    app.seed_product("Fiber Cable", "FIB-1", 12.0, 10).await;

    let body = assert_json(app.get("/api/search?q=cable").await, StatusCode::OK).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["type"], "Product");
    assert_eq!(results[1]["type"], "Task");
}

#[tokio::test]
async fn results_are_capped_at_twenty() {
    let app = TestApp::new().await;
    for i in 0..25 {
        app.seed_product(&format!("Widget {i}"), &format!("WID-{i}"), 1.0, 10)
            .await;
    }

    let body = assert_json(app.get("/api/search?q=widget").await, StatusCode::OK).await;
    assert_eq!(body.as_array().unwrap().len(), 20);
}
