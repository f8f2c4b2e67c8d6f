mod common;

use chrono::{Duration, Months, Utc};
use common::{assert_json, TestApp};
use sea_orm::EntityTrait;

use axum::http::StatusCode;
use bizcore_api::entities::{alert, invoice, payroll, recurring_invoice};
use bizcore_api::services::automation::prior_month_range;

#[tokio::test]
async fn attendance_check_reminds_only_absent_employees() {
    let app = TestApp::new().await;
    let dept = app.seed_department("Engineering").await;
    let present = app
        .seed_employee("Ada", "Lovelace", "ada@example.com", dept.id, Some(4800.0))
        .await;
    let absent = app
        .seed_employee("Grace", "Hopper", "grace@example.com", dept.id, Some(4800.0))
        .await;
    app.seed_attendance(present.id, Utc::now().date_naive(), Some(8.0))
        .await;

    let outcome = app
        .state
        .services
        .automation
        .check_attendance()
        .await
        .unwrap();

    assert_eq!(outcome.matched, 1);
    assert_eq!(outcome.notified, 1);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "grace@example.com");
    assert!(sent[0].body.contains("Grace Hopper"));

    let alerts = alert::Entity::find().all(&*app.db).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, "missed_attendance");
    assert_eq!(alerts[0].severity, "medium");
    assert_eq!(alerts[0].status, "active");
    assert_eq!(alerts[0].target_id, Some(absent.id));
}

#[tokio::test]
async fn low_stock_severity_depends_on_remaining_quantity() {
    let app = TestApp::new().await;
    let warehouse = app.seed_warehouse("Main Warehouse").await;

    let empty = app.seed_product("Widget", "WID-1", 9.99, 10).await;
    let low = app.seed_product("Gadget", "GAD-1", 19.99, 10).await;
    let healthy = app.seed_product("Gizmo", "GIZ-1", 29.99, 10).await;
    app.set_stock(low.id, warehouse.id, 5).await;
    app.set_stock(healthy.id, warehouse.id, 50).await;

    let outcome = app
        .state
        .services
        .automation
        .check_low_stock()
        .await
        .unwrap();
    assert_eq!(outcome.matched, 2);

    let alerts = alert::Entity::find().all(&*app.db).await.unwrap();
    assert_eq!(alerts.len(), 2);

    let for_empty = alerts.iter().find(|a| a.target_id == Some(empty.id)).unwrap();
    assert_eq!(for_empty.severity, "critical");
    let for_low = alerts.iter().find(|a| a.target_id == Some(low.id)).unwrap();
    assert_eq!(for_low.severity, "high");
    assert!(!alerts.iter().any(|a| a.target_id == Some(healthy.id)));
}

#[tokio::test]
async fn low_stock_notifies_linked_admins() {
    let app = TestApp::new().await;
    let dept = app.seed_department("Operations").await;
    let emp = app
        .seed_employee("Olive", "Ops", "olive@example.com", dept.id, None)
        .await;
    let admin_role = app.seed_role("admin").await;
    app.seed_user("olive@example.com", "password123", admin_role.id, Some(emp.id))
        .await;

    app.seed_product("Widget", "WID-1", 9.99, 10).await;

    let outcome = app
        .state
        .services
        .automation
        .check_low_stock()
        .await
        .unwrap();

    assert_eq!(outcome.matched, 1);
    assert_eq!(outcome.notified, 1);
    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "olive@example.com");
    assert!(sent[0].subject.contains("Widget"));
}

#[tokio::test]
async fn low_stock_with_no_admins_still_counts_as_notified() {
    let app = TestApp::new().await;
    app.seed_product("Widget", "WID-1", 9.99, 10).await;

    let outcome = app
        .state
        .services
        .automation
        .check_low_stock()
        .await
        .unwrap();

    assert_eq!(outcome.matched, 1);
    assert_eq!(outcome.notified, 1);
    assert_eq!(app.mailer.sent_count(), 0);
}

#[tokio::test]
async fn late_task_check_reminds_assignee_and_creates_alert() {
    let app = TestApp::new().await;
    let dept = app.seed_department("Engineering").await;
    let emp = app
        .seed_employee("Ada", "Lovelace", "ada@example.com", dept.id, None)
        .await;
    let cust = app.seed_customer("Acme Corp", "sales@acme.test").await;
    let proj = app.seed_project("Rollout", cust.id).await;

    let overdue = Utc::now() - Duration::days(2);
    let late = app
        .seed_task("Ship release", proj.id, "in_progress", Some(emp.id), Some(overdue))
        .await;
    app.seed_task("Orphaned chore", proj.id, "in_progress", None, Some(overdue))
        .await;
    app.seed_task("Done already", proj.id, "completed", Some(emp.id), Some(overdue))
        .await;
    app.seed_task("Not due yet", proj.id, "in_progress", Some(emp.id), Some(Utc::now() + Duration::days(2)))
        .await;

    let outcome = app
        .state
        .services
        .automation
        .check_late_tasks()
        .await
        .unwrap();

    assert_eq!(outcome.matched, 1);
    assert_eq!(outcome.notified, 1);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ada@example.com");
    assert!(sent[0].body.contains("Ship release"));

    let alerts = alert::Entity::find().all(&*app.db).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, "late_task");
    assert_eq!(alerts[0].severity, "high");
    assert_eq!(alerts[0].target_id, Some(late.id));
    assert!(alerts[0].message.contains("Ada Lovelace"));
}

#[tokio::test]
async fn overdue_invoice_is_flipped_even_when_reminder_fails() {
    let app = TestApp::new().await;
    let cust = app.seed_customer("Acme Corp", "billing@acme.test").await;
    let inv = app
        .seed_invoice(cust.id, 250.0, "sent", Some(Utc::now() - Duration::days(5)))
        .await;
    app.mailer.set_failing(true);

    let outcome = app
        .state
        .services
        .automation
        .check_overdue_invoices()
        .await
        .unwrap();

    assert_eq!(outcome.matched, 1);
    assert_eq!(outcome.notified, 0);

    let reloaded = invoice::Entity::find_by_id(inv.id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, "overdue");

    let alerts = alert::Entity::find().all(&*app.db).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, "overdue_invoice");
    assert!(alerts[0].message.contains("Acme Corp"));
}

#[tokio::test]
async fn paid_and_future_invoices_are_left_alone() {
    let app = TestApp::new().await;
    let cust = app.seed_customer("Acme Corp", "billing@acme.test").await;
    app.seed_invoice(cust.id, 100.0, "paid", Some(Utc::now() - Duration::days(5)))
        .await;
    app.seed_invoice(cust.id, 100.0, "sent", Some(Utc::now() + Duration::days(5)))
        .await;

    let outcome = app
        .state
        .services
        .automation
        .check_overdue_invoices()
        .await
        .unwrap();
    assert_eq!(outcome.matched, 0);
    assert_eq!(app.mailer.sent_count(), 0);
}

#[tokio::test]
async fn recurring_invoice_materializes_draft_and_advances_schedule() {
    let app = TestApp::new().await;
    let cust = app.seed_customer("Acme Corp", "billing@acme.test").await;
    let due = Utc::now() - Duration::days(1);
    let rec = app
        .seed_recurring_invoice(cust.id, 99.0, "monthly", due)
        .await;

    let outcome = app
        .state
        .services
        .automation
        .process_recurring_invoices()
        .await
        .unwrap();
    assert_eq!(outcome.matched, 1);
    assert_eq!(outcome.created, 1);

    let invoices = invoice::Entity::find().all(&*app.db).await.unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].status, "draft");
    assert_eq!(invoices[0].amount, 99.0);
    assert_eq!(invoices[0].recurring_invoice_id, Some(rec.id));
    assert!(invoices[0].due_date.is_some());

    let reloaded = recurring_invoice::Entity::find_by_id(rec.id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        reloaded.next_due_date,
        due.checked_add_months(Months::new(1)).unwrap()
    );
}

#[tokio::test]
async fn paused_schedules_are_skipped() {
    let app = TestApp::new().await;
    let cust = app.seed_customer("Acme Corp", "billing@acme.test").await;
    let rec = app
        .seed_recurring_invoice(cust.id, 99.0, "monthly", Utc::now() - Duration::days(1))
        .await;
    {
        use sea_orm::{ActiveModelTrait, Set};
        let mut active: recurring_invoice::ActiveModel = rec.into();
        active.status = Set("paused".to_string());
        active.update(&*app.db).await.unwrap();
    }

    let outcome = app
        .state
        .services
        .automation
        .process_recurring_invoices()
        .await
        .unwrap();
    assert_eq!(outcome.matched, 0);
    assert!(invoice::Entity::find().all(&*app.db).await.unwrap().is_empty());
}

#[tokio::test]
async fn monthly_payroll_includes_overtime_for_prior_month_hours() {
    let app = TestApp::new().await;
    let dept = app.seed_department("Engineering").await;
    let emp = app
        .seed_employee("Ada", "Lovelace", "ada@example.com", dept.id, Some(4800.0))
        .await;

    // 170h in the prior month: 10h overtime at (4800/160)*1.5 = 45/h
    let (start, end) = prior_month_range(Utc::now().date_naive());
    let mut day = start;
    let mut remaining = 170.0_f64;
    while remaining > 0.0 && day <= end {
        let hours = remaining.min(10.0);
        app.seed_attendance(emp.id, day, Some(hours)).await;
        remaining -= hours;
        day = day.succ_opt().unwrap();
    }

    let outcome = app
        .state
        .services
        .automation
        .generate_monthly_payroll()
        .await
        .unwrap();
    assert_eq!(outcome.matched, 1);
    assert_eq!(outcome.created, 1);
    assert_eq!(outcome.notified, 1);

    let records = payroll::Entity::find().all(&*app.db).await.unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.employee_id, emp.id);
    assert_eq!(record.period, "monthly");
    assert_eq!(record.status, "pending");
    assert_eq!(record.start_date, start);
    assert_eq!(record.end_date, end);
    assert!((record.base_salary - 4800.0).abs() < 1e-9);
    assert!((record.overtime - 450.0).abs() < 1e-9);
    assert!((record.amount - 5250.0).abs() < 1e-9);
}

#[tokio::test]
async fn alerts_endpoint_lists_active_and_resolve_flips_status() {
    let app = TestApp::new().await;
    let dept = app.seed_department("Engineering").await;
    app.seed_employee("Grace", "Hopper", "grace@example.com", dept.id, None)
        .await;
    app.state
        .services
        .automation
        .check_attendance()
        .await
        .unwrap();

    let body = assert_json(app.get("/api/automation/alerts").await, StatusCode::OK).await;
    let alerts = body.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    let alert_id = alerts[0]["id"].as_i64().unwrap();

    let role = app.seed_role("admin").await;
    let user = app
        .seed_user("admin@example.com", "password123", role.id, None)
        .await;
    let token = app.token_for(user.id, &user.email, "admin");

    let resolved = assert_json(
        app.patch_json(
            &format!("/api/automation/alerts/{}/resolve", alert_id),
            serde_json::json!({}),
            Some(&token),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(resolved["status"], "resolved");
    assert_eq!(resolved["resolved_by"], user.id);

    let body = assert_json(app.get("/api/automation/alerts").await, StatusCode::OK).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn trigger_endpoints_require_authentication() {
    let app = TestApp::new().await;
    let response = app
        .post_json("/api/automation/trigger/payroll", serde_json::json!({}), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn trigger_endpoint_reports_rule_outcome() {
    let app = TestApp::new().await;
    let role = app.seed_role("admin").await;
    let user = app
        .seed_user("admin@example.com", "password123", role.id, None)
        .await;
    let token = app.token_for(user.id, &user.email, "admin");

    app.seed_product("Widget", "WID-1", 9.99, 10).await;

    let body = assert_json(
        app.post_json(
            "/api/automation/trigger/low-stock-check",
            serde_json::json!({}),
            Some(&token),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["message"], "Low stock check triggered successfully");
    assert_eq!(body["outcome"]["matched"], 1);
}
