//! Shared harness for integration tests: a full application state backed by
//! a throwaway SQLite database and a recording mail transport.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use bizcore_api::auth::AuthService;
use bizcore_api::config::AppConfig;
use bizcore_api::db::{self, DbPool};
use bizcore_api::entities::{
    attendance, customer, department, employee, invoice, product, project, recurring_invoice,
    role, stock, task, transaction, user, warehouse,
};
use bizcore_api::handlers::AppServices;
use bizcore_api::services::email::MailTransport;
use bizcore_api::{app_router, AppState};

/// One delivered message, as handed to the transport.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records every delivery instead of talking SMTP. Flip `fail` to make
/// every subsequent delivery error out.
#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: AtomicBool,
}

impl MockMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl MailTransport for MockMailer {
    async fn deliver(&self, to: &str, subject: &str, html_body: &str) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("smtp connection refused");
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub db: Arc<DbPool>,
    pub mailer: Arc<MockMailer>,
    // Holds the sqlite file alive for the duration of the test
    _db_dir: TempDir,
}

impl TestApp {
    /// Builds a fully wired application against a fresh, migrated database.
    /// Built-in email templates are seeded exactly like a production boot.
    pub async fn new() -> Self {
        let db_dir = TempDir::new().expect("failed to create temp dir");
        let db_path = db_dir.path().join("bizcore_test.db");
        let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let mut cfg = AppConfig::new(
            database_url,
            "test_secret_that_is_long_enough".to_string(),
            3600,
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;

        let db = Arc::new(
            db::establish_connection_from_app_config(&cfg)
                .await
                .expect("failed to connect to test database"),
        );
        db::run_migrations(&db).await.expect("migrations failed");

        let mailer = Arc::new(MockMailer::default());
        let services = AppServices::new(db.clone(), mailer.clone());
        services
            .email
            .ensure_builtin_templates()
            .await
            .expect("failed to seed templates");

        let auth = Arc::new(AuthService::new(&cfg.jwt_secret, cfg.jwt_expiration));

        let state = AppState {
            db: db.clone(),
            config: cfg,
            services,
            auth,
        };

        Self {
            state,
            db,
            mailer,
            _db_dir: db_dir,
        }
    }

    pub fn router(&self) -> Router {
        app_router(self.state.clone())
    }

    pub fn token_for(&self, user_id: i32, email: &str, role: &str) -> String {
        self.state
            .auth
            .create_token(user_id, email, role)
            .expect("failed to create token")
    }

    pub async fn get(&self, path: &str) -> Response<Body> {
        let request = Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.router().oneshot(request).await.unwrap()
    }

    pub async fn post_json(&self, path: &str, body: Value, token: Option<&str>) -> Response<Body> {
        self.request_json("POST", path, body, token).await
    }

    pub async fn patch_json(&self, path: &str, body: Value, token: Option<&str>) -> Response<Body> {
        self.request_json("PATCH", path, body, token).await
    }

    pub async fn get_authed(&self, path: &str, token: &str) -> Response<Body> {
        let request = Request::builder()
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.router().oneshot(request).await.unwrap()
    }

    async fn request_json(
        &self,
        method: &str,
        path: &str,
        body: Value,
        token: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.router().oneshot(request).await.unwrap()
    }

    // --- seed helpers ---

    pub async fn seed_department(&self, name: &str) -> department::Model {
        department::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed department")
    }

    pub async fn seed_employee(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        department_id: i32,
        salary: Option<f64>,
    ) -> employee::Model {
        employee::ActiveModel {
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            email: Set(email.to_string()),
            salary: Set(salary),
            status: Set("active".to_string()),
            hire_date: Set(Utc::now().date_naive()),
            department_id: Set(department_id),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed employee")
    }

    pub async fn seed_attendance(
        &self,
        employee_id: i32,
        date: NaiveDate,
        hours_worked: Option<f64>,
    ) -> attendance::Model {
        attendance::ActiveModel {
            employee_id: Set(employee_id),
            date: Set(date),
            hours_worked: Set(hours_worked),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed attendance")
    }

    pub async fn seed_customer(&self, name: &str, email: &str) -> customer::Model {
        customer::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed customer")
    }

    pub async fn seed_product(
        &self,
        name: &str,
        sku: &str,
        price: f64,
        low_stock_threshold: i32,
    ) -> product::Model {
        product::ActiveModel {
            name: Set(name.to_string()),
            sku: Set(sku.to_string()),
            price: Set(price),
            low_stock_threshold: Set(low_stock_threshold),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed product")
    }

    pub async fn seed_warehouse(&self, name: &str) -> warehouse::Model {
        warehouse::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed warehouse")
    }

    pub async fn set_stock(&self, product_id: i32, warehouse_id: i32, quantity: i32) -> stock::Model {
        stock::ActiveModel {
            product_id: Set(product_id),
            warehouse_id: Set(warehouse_id),
            quantity: Set(quantity),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed stock")
    }

    pub async fn seed_invoice(
        &self,
        customer_id: i32,
        amount: f64,
        status: &str,
        due_date: Option<DateTime<Utc>>,
    ) -> invoice::Model {
        invoice::ActiveModel {
            customer_id: Set(customer_id),
            amount: Set(amount),
            date: Set(Utc::now()),
            due_date: Set(due_date),
            status: Set(status.to_string()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed invoice")
    }

    pub async fn seed_transaction(
        &self,
        amount: f64,
        transaction_type: &str,
        date: DateTime<Utc>,
        invoice_id: Option<i32>,
    ) -> transaction::Model {
        transaction::ActiveModel {
            amount: Set(amount),
            transaction_type: Set(transaction_type.to_string()),
            date: Set(date),
            invoice_id: Set(invoice_id),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed transaction")
    }

    pub async fn seed_recurring_invoice(
        &self,
        customer_id: i32,
        amount: f64,
        frequency: &str,
        next_due_date: DateTime<Utc>,
    ) -> recurring_invoice::Model {
        recurring_invoice::ActiveModel {
            customer_id: Set(customer_id),
            amount: Set(amount),
            frequency: Set(frequency.to_string()),
            start_date: Set(next_due_date),
            next_due_date: Set(next_due_date),
            status: Set("active".to_string()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed recurring invoice")
    }

    pub async fn seed_project(&self, name: &str, customer_id: i32) -> project::Model {
        project::ActiveModel {
            name: Set(name.to_string()),
            customer_id: Set(customer_id),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed project")
    }

    pub async fn seed_task(
        &self,
        name: &str,
        project_id: i32,
        status: &str,
        assigned_to_id: Option<i32>,
        due_date: Option<DateTime<Utc>>,
    ) -> task::Model {
        task::ActiveModel {
            name: Set(name.to_string()),
            status: Set(status.to_string()),
            project_id: Set(project_id),
            assigned_to_id: Set(assigned_to_id),
            due_date: Set(due_date),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed task")
    }

    pub async fn seed_role(&self, name: &str) -> role::Model {
        role::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed role")
    }

    pub async fn seed_user(
        &self,
        email: &str,
        password: &str,
        role_id: i32,
        employee_id: Option<i32>,
    ) -> user::Model {
        let hash = self
            .state
            .auth
            .hash_password(password)
            .expect("failed to hash password");
        user::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(hash),
            role_id: Set(role_id),
            employee_id: Set(employee_id),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed user")
    }
}

/// Reads the full response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("response was not valid JSON")
}

/// Asserts the status and returns the parsed body.
pub async fn assert_json(response: Response<Body>, expected: StatusCode) -> Value {
    assert_eq!(response.status(), expected);
    body_json(response).await
}
