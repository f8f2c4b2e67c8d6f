mod common;

use std::collections::HashMap;

use axum::http::StatusCode;
use common::{assert_json, TestApp};
use sea_orm::EntityTrait;

use bizcore_api::entities::email_log;
use bizcore_api::services::email::render_template;

#[test]
fn render_replaces_known_markers_and_keeps_unknown_ones() {
    let vars = HashMap::from([
        ("name".to_string(), "Ada".to_string()),
        ("amount".to_string(), "120.00".to_string()),
    ]);
    let out = render_template("Hi {{name}}, you are owed ${{amount}} ({{missing}})", &vars);
    assert_eq!(out, "Hi Ada, you are owed $120.00 ({{missing}})");
}

#[tokio::test]
async fn successful_send_logs_rendered_subject_and_body() {
    let app = TestApp::new().await;
    let vars = HashMap::from([("employeeName".to_string(), "Ada Lovelace".to_string())]);

    let sent = app
        .state
        .services
        .email
        .send_email("ada@example.com", "attendance_reminder", &vars)
        .await;
    assert!(sent);

    let delivered = app.mailer.sent();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].subject, "Attendance Reminder");
    assert!(delivered[0].body.contains("Dear Ada Lovelace"));

    let logs = email_log::Entity::find().all(&*app.db).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].recipient, "ada@example.com");
    assert_eq!(logs[0].status, "sent");
    assert!(logs[0].body.contains("Dear Ada Lovelace"));
    assert!(logs[0].error.is_none());
}

#[tokio::test]
async fn failed_delivery_logs_error_with_empty_body() {
    let app = TestApp::new().await;
    app.mailer.set_failing(true);
    let vars = HashMap::from([("employeeName".to_string(), "Ada Lovelace".to_string())]);

    let sent = app
        .state
        .services
        .email
        .send_email("ada@example.com", "attendance_reminder", &vars)
        .await;
    assert!(!sent);

    let logs = email_log::Entity::find().all(&*app.db).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, "failed");
    assert_eq!(logs[0].body, "");
    assert!(logs[0].error.as_deref().unwrap().contains("smtp"));
}

#[tokio::test]
async fn missing_template_is_logged_as_failed() {
    let app = TestApp::new().await;

    let sent = app
        .state
        .services
        .email
        .send_email("ada@example.com", "no_such_template", &HashMap::new())
        .await;
    assert!(!sent);
    assert_eq!(app.mailer.sent_count(), 0);

    let logs = email_log::Entity::find().all(&*app.db).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, "failed");
    assert_eq!(
        logs[0].error.as_deref(),
        Some("Template no_such_template not found")
    );
}

#[tokio::test]
async fn builtin_templates_are_reset_on_startup() {
    let app = TestApp::new().await;

    // Simulate an operator editing a shipped template
    app.state
        .services
        .email
        .upsert_template("attendance_reminder", "Edited", "Edited body", vec![], false)
        .await
        .unwrap();

    app.state
        .services
        .email
        .ensure_builtin_templates()
        .await
        .unwrap();

    let templates = app.state.services.email.list_templates().await.unwrap();
    let attendance = templates
        .iter()
        .find(|t| t.name == "attendance_reminder")
        .unwrap();
    assert_eq!(attendance.subject, "Attendance Reminder");
    assert!(attendance.is_active);
    assert!(attendance.body.contains("haven't checked in today"));
}

#[tokio::test]
async fn template_endpoints_upsert_and_list_active_only() {
    let app = TestApp::new().await;
    let role = app.seed_role("admin").await;
    let user = app
        .seed_user("admin@example.com", "password123", role.id, None)
        .await;
    let token = app.token_for(user.id, &user.email, "admin");

    let created = assert_json(
        app.post_json(
            "/api/automation/email-templates",
            serde_json::json!({
                "name": "welcome",
                "subject": "Welcome {{name}}",
                "body": "<p>Hello {{name}}</p>",
                "variables": ["name"]
            }),
            Some(&token),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(created["name"], "welcome");

    // Deactivate a builtin directly through the service
    app.state
        .services
        .email
        .upsert_template("task_reminder", "x", "y", vec![], false)
        .await
        .unwrap();

    let body = assert_json(app.get("/api/automation/email-templates").await, StatusCode::OK).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"welcome"));
    assert!(!names.contains(&"task_reminder"));
}

#[tokio::test]
async fn email_log_endpoint_returns_recent_attempts() {
    let app = TestApp::new().await;
    let vars = HashMap::from([("employeeName".to_string(), "Ada".to_string())]);
    app.state
        .services
        .email
        .send_email("ada@example.com", "attendance_reminder", &vars)
        .await;

    let body = assert_json(app.get("/api/automation/email-logs").await, StatusCode::OK).await;
    let logs = body.as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["recipient"], "ada@example.com");
    assert_eq!(logs[0]["status"], "sent");
}
