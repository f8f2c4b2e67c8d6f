use async_trait::async_trait;
use chrono::Utc;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::config::SmtpConfig;
use crate::db::DbPool;
use crate::entities::{email_log, email_template};
use crate::errors::ServiceError;

/// Delivery backend for outgoing mail. Production uses SMTP via lettre;
/// tests inject a recording implementation.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, to: &str, subject: &str, html_body: &str) -> anyhow::Result<()>;
}

/// SMTP relay transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(cfg: &SmtpConfig) -> anyhow::Result<Self> {
        let mut builder = if cfg.user.is_empty() {
            // Local relay without TLS/auth (development)
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)?
                .credentials(Credentials::new(cfg.user.clone(), cfg.pass.clone()))
        };
        builder = builder.port(cfg.port);

        Ok(Self {
            transport: builder.build(),
            from: cfg.from.clone(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn deliver(&self, to: &str, subject: &str, html_body: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())?;

        self.transport.send(message).await?;
        Ok(())
    }
}

/// A built-in template definition, upserted into the database at startup.
struct BuiltinTemplate {
    name: &'static str,
    subject: &'static str,
    body: &'static str,
    variables: &'static [&'static str],
}

const BUILTIN_TEMPLATES: &[BuiltinTemplate] = &[
    BuiltinTemplate {
        name: "payroll_notification",
        subject: "Your Payroll Statement - {{month}} {{year}}",
        body: r#"
          <h2>Payroll Statement</h2>
          <p>Dear {{employeeName}},</p>
          <p>Your payroll for {{month}} {{year}} has been processed.</p>
          <div style="background: #f5f5f5; padding: 20px; border-radius: 8px; margin: 20px 0;">
            <h3>Payroll Summary</h3>
            <p><strong>Base Salary:</strong> ${{baseSalary}}</p>
            <p><strong>Overtime:</strong> ${{overtime}}</p>
            <p><strong>Bonuses:</strong> ${{bonuses}}</p>
            <p><strong>Deductions:</strong> ${{deductions}}</p>
            <hr>
            <p><strong>Net Pay:</strong> ${{netPay}}</p>
          </div>
          <p>Thank you for your hard work!</p>
        "#,
        variables: &[
            "employeeName",
            "month",
            "year",
            "baseSalary",
            "overtime",
            "bonuses",
            "deductions",
            "netPay",
            "amount",
        ],
    },
    BuiltinTemplate {
        name: "invoice_reminder",
        subject: "Invoice Reminder - {{invoiceNumber}}",
        body: r#"
          <h2>Invoice Reminder</h2>
          <p>Dear {{customerName}},</p>
          <p>This is a friendly reminder about your outstanding invoice.</p>
          <div style="background: #f5f5f5; padding: 20px; border-radius: 8px; margin: 20px 0;">
            <h3>Invoice Details</h3>
            <p><strong>Invoice #:</strong> {{invoiceNumber}}</p>
            <p><strong>Amount:</strong> ${{amount}}</p>
            <p><strong>Due Date:</strong> {{dueDate}}</p>
            <p><strong>Days Overdue:</strong> {{daysOverdue}}</p>
          </div>
          <p>Please process this payment at your earliest convenience.</p>
        "#,
        variables: &["customerName", "invoiceNumber", "amount", "dueDate", "daysOverdue"],
    },
    BuiltinTemplate {
        name: "low_stock_alert",
        subject: "Low Stock Alert - {{productName}}",
        body: r#"
          <h2>Low Stock Alert</h2>
          <p>The following product is running low on stock:</p>
          <div style="background: #fff3cd; padding: 20px; border-radius: 8px; margin: 20px 0; border-left: 4px solid #ffc107;">
            <h3>{{productName}}</h3>
            <p><strong>Current Stock:</strong> {{currentStock}}</p>
            <p><strong>Minimum Threshold:</strong> {{minThreshold}}</p>
            <p><strong>SKU:</strong> {{sku}}</p>
          </div>
          <p>Please reorder this item soon to avoid stockouts.</p>
        "#,
        variables: &["productName", "currentStock", "minThreshold", "sku"],
    },
    BuiltinTemplate {
        name: "task_reminder",
        subject: "Task Reminder - {{taskName}}",
        body: r#"
          <h2>Task Reminder</h2>
          <p>Dear {{employeeName}},</p>
          <p>This is a reminder about your upcoming task:</p>
          <div style="background: #f5f5f5; padding: 20px; border-radius: 8px; margin: 20px 0;">
            <h3>{{taskName}}</h3>
            <p><strong>Project:</strong> {{projectName}}</p>
            <p><strong>Due Date:</strong> {{dueDate}}</p>
            <p><strong>Priority:</strong> {{priority}}</p>
            <p><strong>Description:</strong> {{description}}</p>
          </div>
          <p>Please ensure this task is completed on time.</p>
        "#,
        variables: &[
            "employeeName",
            "taskName",
            "projectName",
            "dueDate",
            "priority",
            "description",
        ],
    },
    BuiltinTemplate {
        name: "attendance_reminder",
        subject: "Attendance Reminder",
        body: r#"
          <h2>Attendance Reminder</h2>
          <p>Dear {{employeeName}},</p>
          <p>We noticed you haven't checked in today. Please remember to:</p>
          <ul>
            <li>Check in when you arrive at work</li>
            <li>Check out when you leave</li>
            <li>Update your time entries for any breaks</li>
          </ul>
          <p>If you're having trouble with the system, please contact HR.</p>
        "#,
        variables: &["employeeName"],
    },
];

/// Replaces every `{{name}}` marker with the matching value from `vars`.
/// Unknown markers are left in place.
pub fn render_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{}}}}}", key), value);
    }
    out
}

/// Sends templated notifications and records every attempt in email_logs.
pub struct EmailService {
    db: Arc<DbPool>,
    mailer: Arc<dyn MailTransport>,
}

impl EmailService {
    pub fn new(db: Arc<DbPool>, mailer: Arc<dyn MailTransport>) -> Self {
        Self { db, mailer }
    }

    /// Upserts the built-in templates by name, resetting subject, body,
    /// variable list and the active flag to their shipped values.
    pub async fn ensure_builtin_templates(&self) -> Result<(), ServiceError> {
        for template in BUILTIN_TEMPLATES {
            let variables = serde_json::to_string(template.variables)
                .map_err(|e| ServiceError::InternalError(e.to_string()))?;

            let existing = email_template::Entity::find()
                .filter(email_template::Column::Name.eq(template.name))
                .one(&*self.db)
                .await?;

            match existing {
                Some(model) => {
                    let mut active: email_template::ActiveModel = model.into();
                    active.subject = Set(template.subject.to_string());
                    active.body = Set(template.body.to_string());
                    active.variables = Set(variables);
                    active.is_active = Set(true);
                    active.update(&*self.db).await?;
                }
                None => {
                    let active = email_template::ActiveModel {
                        name: Set(template.name.to_string()),
                        subject: Set(template.subject.to_string()),
                        body: Set(template.body.to_string()),
                        variables: Set(variables),
                        is_active: Set(true),
                        ..Default::default()
                    };
                    active.insert(&*self.db).await?;
                }
            }
        }

        info!("Built-in email templates are up to date");
        Ok(())
    }

    /// Renders the named template and attempts delivery. Returns whether the
    /// message went out; delivery problems are logged, never propagated.
    #[instrument(skip(self, variables))]
    pub async fn send_email(
        &self,
        to: &str,
        template_name: &str,
        variables: &HashMap<String, String>,
    ) -> bool {
        let template = match self.find_active_template(template_name).await {
            Ok(Some(t)) => t,
            Ok(None) => {
                let err = format!("Template {} not found", template_name);
                warn!(template = template_name, "{}", err);
                self.log_attempt(to, template_name, "", "failed", Some(&err))
                    .await;
                return false;
            }
            Err(e) => {
                error!(template = template_name, error = %e, "Failed to load template");
                self.log_attempt(to, template_name, "", "failed", Some(&e.to_string()))
                    .await;
                return false;
            }
        };

        let subject = render_template(&template.subject, variables);
        let body = render_template(&template.body, variables);

        match self.mailer.deliver(to, &subject, &body).await {
            Ok(()) => {
                info!(recipient = to, template = template_name, "Email sent");
                self.log_attempt(to, &subject, &body, "sent", None).await;
                true
            }
            Err(e) => {
                error!(recipient = to, template = template_name, error = %e, "Email delivery failed");
                self.log_attempt(to, &subject, "", "failed", Some(&e.to_string()))
                    .await;
                false
            }
        }
    }

    pub async fn send_payroll_notification(
        &self,
        to: &str,
        employee_name: &str,
        base_salary: f64,
        overtime: f64,
        bonuses: f64,
        deductions: f64,
        net_pay: f64,
    ) -> bool {
        let now = Utc::now();
        let vars = HashMap::from([
            ("employeeName".to_string(), employee_name.to_string()),
            ("month".to_string(), now.format("%B").to_string()),
            ("year".to_string(), now.format("%Y").to_string()),
            ("baseSalary".to_string(), format!("{:.2}", base_salary)),
            ("overtime".to_string(), format!("{:.2}", overtime)),
            ("bonuses".to_string(), format!("{:.2}", bonuses)),
            ("deductions".to_string(), format!("{:.2}", deductions)),
            ("netPay".to_string(), format!("{:.2}", net_pay)),
            ("amount".to_string(), format!("{:.2}", net_pay)),
        ]);
        self.send_email(to, "payroll_notification", &vars).await
    }

    pub async fn send_invoice_reminder(
        &self,
        to: &str,
        customer_name: &str,
        invoice_id: i32,
        amount: f64,
        due_date: Option<chrono::DateTime<Utc>>,
    ) -> bool {
        let days_overdue = due_date
            .map(|d| (Utc::now() - d).num_days().max(0))
            .unwrap_or(0);
        let vars = HashMap::from([
            ("customerName".to_string(), customer_name.to_string()),
            ("invoiceNumber".to_string(), format!("INV-{}", invoice_id)),
            ("amount".to_string(), format!("{:.2}", amount)),
            (
                "dueDate".to_string(),
                due_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
            ("daysOverdue".to_string(), days_overdue.to_string()),
        ]);
        self.send_email(to, "invoice_reminder", &vars).await
    }

    pub async fn send_low_stock_alert(
        &self,
        to: &str,
        product_name: &str,
        sku: &str,
        current_stock: i64,
        min_threshold: i32,
    ) -> bool {
        let vars = HashMap::from([
            ("productName".to_string(), product_name.to_string()),
            ("currentStock".to_string(), current_stock.to_string()),
            ("minThreshold".to_string(), min_threshold.to_string()),
            ("sku".to_string(), sku.to_string()),
        ]);
        self.send_email(to, "low_stock_alert", &vars).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn send_task_reminder(
        &self,
        to: &str,
        employee_name: &str,
        task_name: &str,
        project_name: &str,
        due_date: Option<chrono::DateTime<Utc>>,
        priority: &str,
        description: &str,
    ) -> bool {
        let vars = HashMap::from([
            ("employeeName".to_string(), employee_name.to_string()),
            ("taskName".to_string(), task_name.to_string()),
            ("projectName".to_string(), project_name.to_string()),
            (
                "dueDate".to_string(),
                due_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
            ("priority".to_string(), priority.to_string()),
            ("description".to_string(), description.to_string()),
        ]);
        self.send_email(to, "task_reminder", &vars).await
    }

    pub async fn send_attendance_reminder(&self, to: &str, employee_name: &str) -> bool {
        let vars = HashMap::from([("employeeName".to_string(), employee_name.to_string())]);
        self.send_email(to, "attendance_reminder", &vars).await
    }

    /// Active templates, alphabetical.
    pub async fn list_templates(&self) -> Result<Vec<email_template::Model>, ServiceError> {
        email_template::Entity::find()
            .filter(email_template::Column::IsActive.eq(true))
            .order_by_asc(email_template::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn upsert_template(
        &self,
        name: &str,
        subject: &str,
        body: &str,
        variables: Vec<String>,
        is_active: bool,
    ) -> Result<email_template::Model, ServiceError> {
        let encoded = serde_json::to_string(&variables)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let existing = email_template::Entity::find()
            .filter(email_template::Column::Name.eq(name))
            .one(&*self.db)
            .await?;

        let model = match existing {
            Some(model) => {
                let mut active: email_template::ActiveModel = model.into();
                active.subject = Set(subject.to_string());
                active.body = Set(body.to_string());
                active.variables = Set(encoded);
                active.is_active = Set(is_active);
                active.update(&*self.db).await?
            }
            None => {
                let active = email_template::ActiveModel {
                    name: Set(name.to_string()),
                    subject: Set(subject.to_string()),
                    body: Set(body.to_string()),
                    variables: Set(encoded),
                    is_active: Set(is_active),
                    ..Default::default()
                };
                active.insert(&*self.db).await?
            }
        };
        Ok(model)
    }

    /// Last 100 send attempts, newest first.
    pub async fn recent_logs(&self) -> Result<Vec<email_log::Model>, ServiceError> {
        email_log::Entity::find()
            .order_by_desc(email_log::Column::SentAt)
            .limit(100)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn find_active_template(
        &self,
        name: &str,
    ) -> Result<Option<email_template::Model>, ServiceError> {
        email_template::Entity::find()
            .filter(email_template::Column::Name.eq(name))
            .filter(email_template::Column::IsActive.eq(true))
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn log_attempt(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        status: &str,
        error_message: Option<&str>,
    ) {
        let log = email_log::ActiveModel {
            recipient: Set(recipient.to_string()),
            subject: Set(subject.to_string()),
            body: Set(body.to_string()),
            status: Set(status.to_string()),
            error: Set(error_message.map(|s| s.to_string())),
            sent_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Err(e) = log.insert(&*self.db).await {
            warn!(error = %e, "Failed to record email log entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_known_placeholders() {
        let vars = HashMap::from([
            ("employeeName".to_string(), "Ada Lovelace".to_string()),
            ("month".to_string(), "July".to_string()),
        ]);
        let out = render_template("Dear {{employeeName}}, payroll for {{month}}", &vars);
        assert_eq!(out, "Dear Ada Lovelace, payroll for July");
    }

    #[test]
    fn render_leaves_unknown_placeholders_in_place() {
        let vars = HashMap::from([("a".to_string(), "1".to_string())]);
        let out = render_template("{{a}} and {{missing}}", &vars);
        assert_eq!(out, "1 and {{missing}}");
    }

    #[test]
    fn builtin_templates_cover_all_rules() {
        let names: Vec<&str> = BUILTIN_TEMPLATES.iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "payroll_notification",
                "invoice_reminder",
                "low_stock_alert",
                "task_reminder",
                "attendance_reminder"
            ]
        );
        for template in BUILTIN_TEMPLATES {
            assert!(!template.variables.is_empty());
        }
    }
}
