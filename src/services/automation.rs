use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::db::DbPool;
use crate::entities::{
    alert, attendance, customer, employee, invoice, payroll, product, project, recurring_invoice,
    role, stock, task, user,
};
use crate::errors::ServiceError;
use crate::services::email::EmailService;

/// Hours per month before overtime kicks in (40h/week * 4 weeks).
const STANDARD_MONTHLY_HOURS: f64 = 160.0;
const OVERTIME_MULTIPLIER: f64 = 1.5;

/// Counters returned by each rule, surfaced by the manual trigger endpoints.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RuleOutcome {
    /// Rows that matched the rule condition
    pub matched: u64,
    /// Emails that went out successfully
    pub notified: u64,
    /// Records created (payrolls, invoices)
    pub created: u64,
}

/// Net pay breakdown for one employee-month.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollBreakdown {
    pub base_salary: f64,
    pub overtime_pay: f64,
    pub deductions: f64,
    pub bonuses: f64,
    pub net_pay: f64,
}

/// Overtime is everything past 160 hours, paid at 1.5x the hourly rate.
/// Salaried employees without an explicit rate fall back to salary/160.
pub fn compute_payroll(total_hours: f64, salary: f64, hourly_rate: Option<f64>) -> PayrollBreakdown {
    let overtime_hours = (total_hours - STANDARD_MONTHLY_HOURS).max(0.0);
    let rate = hourly_rate.unwrap_or(salary / STANDARD_MONTHLY_HOURS);
    let overtime_pay = overtime_hours * rate * OVERTIME_MULTIPLIER;
    let deductions = 0.0;
    let bonuses = 0.0;

    PayrollBreakdown {
        base_salary: salary,
        overtime_pay,
        deductions,
        bonuses,
        net_pay: salary + overtime_pay + bonuses - deductions,
    }
}

/// Advances a recurring schedule by one period. Unrecognized frequencies
/// advance monthly.
pub fn advance_due_date(current: DateTime<Utc>, frequency: &str) -> DateTime<Utc> {
    let months = match frequency {
        "quarterly" => 3,
        "yearly" => 12,
        _ => 1,
    };
    current
        .checked_add_months(Months::new(months))
        .unwrap_or(current + Duration::days(30 * months as i64))
}

/// Zero on-hand is critical; anything else at or under the threshold is high.
pub fn stock_severity(total_stock: i64) -> &'static str {
    if total_stock == 0 {
        "critical"
    } else {
        "high"
    }
}

/// First and last day of the calendar month before `today`.
pub fn prior_month_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first_of_current = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .unwrap_or(today);
    let last_of_prior = first_of_current.pred_opt().unwrap_or(first_of_current);
    let first_of_prior =
        NaiveDate::from_ymd_opt(last_of_prior.year(), last_of_prior.month(), 1)
            .unwrap_or(last_of_prior);
    (first_of_prior, last_of_prior)
}

/// Evaluates the scheduled business rules: attendance reminders, low-stock
/// alerts, overdue invoices, late tasks, monthly payroll and recurring
/// invoice materialization.
///
/// Every rule isolates per-row failures: a bad row is logged and skipped so
/// the rest of the batch still runs.
pub struct AutomationService {
    db: Arc<DbPool>,
    email: Arc<EmailService>,
}

impl AutomationService {
    pub fn new(db: Arc<DbPool>, email: Arc<EmailService>) -> Self {
        Self { db, email }
    }

    /// Reminds every active employee with no attendance row for today.
    #[instrument(skip(self))]
    pub async fn check_attendance(&self) -> Result<RuleOutcome, ServiceError> {
        let today = Utc::now().date_naive();
        let mut outcome = RuleOutcome::default();

        let employees = employee::Entity::find()
            .filter(employee::Column::Status.eq("active"))
            .all(&*self.db)
            .await?;

        for emp in employees {
            let checked_in = attendance::Entity::find()
                .filter(attendance::Column::EmployeeId.eq(emp.id))
                .filter(attendance::Column::Date.eq(today))
                .one(&*self.db)
                .await?;

            if checked_in.is_some() {
                continue;
            }
            outcome.matched += 1;

            if self
                .email
                .send_attendance_reminder(&emp.email, &emp.full_name())
                .await
            {
                outcome.notified += 1;
            }

            self.create_alert(
                "missed_attendance",
                "Missed Attendance",
                &format!("{} hasn't checked in today", emp.full_name()),
                "medium",
                Some(emp.id),
                Some("employee"),
            )
            .await;
        }

        info!(matched = outcome.matched, "Attendance check complete");
        Ok(outcome)
    }

    /// Alerts on every product whose summed stock is at or below its
    /// threshold. Notifications fan out to all admin users with a linked
    /// employee email; one failed send does not stop the rest.
    #[instrument(skip(self))]
    pub async fn check_low_stock(&self) -> Result<RuleOutcome, ServiceError> {
        let mut outcome = RuleOutcome::default();
        let admin_emails = self.admin_recipient_emails().await?;

        let products = product::Entity::find().all(&*self.db).await?;
        for prod in products {
            let levels = stock::Entity::find()
                .filter(stock::Column::ProductId.eq(prod.id))
                .all(&*self.db)
                .await?;
            let total: i64 = levels.iter().map(|s| s.quantity as i64).sum();

            if total > prod.low_stock_threshold as i64 {
                continue;
            }
            outcome.matched += 1;

            let mut all_sent = true;
            for to in &admin_emails {
                let sent = self
                    .email
                    .send_low_stock_alert(to, &prod.name, &prod.sku, total, prod.low_stock_threshold)
                    .await;
                all_sent = all_sent && sent;
            }
            if all_sent {
                outcome.notified += 1;
            }

            self.create_alert(
                "low_stock",
                "Low Stock Alert",
                &format!("{} is running low on stock ({} remaining)", prod.name, total),
                stock_severity(total),
                Some(prod.id),
                Some("product"),
            )
            .await;
        }

        info!(matched = outcome.matched, "Low stock check complete");
        Ok(outcome)
    }

    /// Flips sent invoices past their due date to "overdue" and reminds the
    /// customer. The status change happens even when the reminder fails.
    #[instrument(skip(self))]
    pub async fn check_overdue_invoices(&self) -> Result<RuleOutcome, ServiceError> {
        let now = Utc::now();
        let mut outcome = RuleOutcome::default();

        let overdue = invoice::Entity::find()
            .filter(invoice::Column::Status.eq("sent"))
            .filter(invoice::Column::DueDate.lt(now))
            .all(&*self.db)
            .await?;

        for inv in overdue {
            outcome.matched += 1;

            let cust = customer::Entity::find_by_id(inv.customer_id)
                .one(&*self.db)
                .await?;
            let customer_name = cust.as_ref().map(|c| c.name.clone()).unwrap_or_default();

            if let Some(cust) = &cust {
                if self
                    .email
                    .send_invoice_reminder(&cust.email, &cust.name, inv.id, inv.amount, inv.due_date)
                    .await
                {
                    outcome.notified += 1;
                }
            }

            let invoice_id = inv.id;
            let mut active: invoice::ActiveModel = inv.into();
            active.status = Set("overdue".to_string());
            if let Err(e) = active.update(&*self.db).await {
                warn!(invoice_id, error = %e, "Failed to mark invoice overdue");
                continue;
            }

            self.create_alert(
                "overdue_invoice",
                "Overdue Invoice",
                &format!("Invoice #{} for {} is overdue", invoice_id, customer_name),
                "high",
                Some(invoice_id),
                Some("invoice"),
            )
            .await;
        }

        info!(matched = outcome.matched, "Overdue invoice check complete");
        Ok(outcome)
    }

    /// Reminds assignees about incomplete tasks past their due date.
    /// Unassigned tasks are skipped.
    #[instrument(skip(self))]
    pub async fn check_late_tasks(&self) -> Result<RuleOutcome, ServiceError> {
        let now = Utc::now();
        let mut outcome = RuleOutcome::default();

        let late = task::Entity::find()
            .filter(task::Column::Status.ne("completed"))
            .filter(task::Column::DueDate.lt(now))
            .all(&*self.db)
            .await?;

        for t in late {
            let Some(assignee_id) = t.assigned_to_id else {
                continue;
            };
            let Some(assignee) = employee::Entity::find_by_id(assignee_id)
                .one(&*self.db)
                .await?
            else {
                continue;
            };
            outcome.matched += 1;

            let project_name = project::Entity::find_by_id(t.project_id)
                .one(&*self.db)
                .await?
                .map(|p| p.name)
                .unwrap_or_default();

            if self
                .email
                .send_task_reminder(
                    &assignee.email,
                    &assignee.full_name(),
                    &t.name,
                    &project_name,
                    t.due_date,
                    t.priority.as_deref().unwrap_or(""),
                    t.description.as_deref().unwrap_or(""),
                )
                .await
            {
                outcome.notified += 1;
            }

            self.create_alert(
                "late_task",
                "Late Task",
                &format!(
                    "Task \"{}\" assigned to {} is overdue",
                    t.name,
                    assignee.full_name()
                ),
                "high",
                Some(t.id),
                Some("task"),
            )
            .await;
        }

        info!(matched = outcome.matched, "Late task check complete");
        Ok(outcome)
    }

    /// Creates a pending payroll record per active employee for the prior
    /// calendar month and notifies them.
    #[instrument(skip(self))]
    pub async fn generate_monthly_payroll(&self) -> Result<RuleOutcome, ServiceError> {
        let (start_date, end_date) = prior_month_range(Utc::now().date_naive());
        let mut outcome = RuleOutcome::default();

        let employees = employee::Entity::find()
            .filter(employee::Column::Status.eq("active"))
            .all(&*self.db)
            .await?;

        for emp in employees {
            outcome.matched += 1;

            let attendances = attendance::Entity::find()
                .filter(attendance::Column::EmployeeId.eq(emp.id))
                .filter(attendance::Column::Date.gte(start_date))
                .filter(attendance::Column::Date.lte(end_date))
                .all(&*self.db)
                .await?;

            let total_hours: f64 = attendances.iter().filter_map(|a| a.hours_worked).sum();
            let breakdown = compute_payroll(total_hours, emp.salary.unwrap_or(0.0), emp.hourly_rate);

            let record = payroll::ActiveModel {
                employee_id: Set(emp.id),
                amount: Set(breakdown.net_pay),
                base_salary: Set(breakdown.base_salary),
                overtime: Set(breakdown.overtime_pay),
                deductions: Set(breakdown.deductions),
                bonuses: Set(breakdown.bonuses),
                period: Set("monthly".to_string()),
                start_date: Set(start_date),
                end_date: Set(end_date),
                status: Set("pending".to_string()),
                ..Default::default()
            };
            if let Err(e) = record.insert(&*self.db).await {
                warn!(employee_id = emp.id, error = %e, "Failed to create payroll record");
                continue;
            }
            outcome.created += 1;

            if self
                .email
                .send_payroll_notification(
                    &emp.email,
                    &emp.full_name(),
                    breakdown.base_salary,
                    breakdown.overtime_pay,
                    breakdown.bonuses,
                    breakdown.deductions,
                    breakdown.net_pay,
                )
                .await
            {
                outcome.notified += 1;
            }

            info!(
                employee_id = emp.id,
                net_pay = breakdown.net_pay,
                "Payroll generated"
            );
        }

        Ok(outcome)
    }

    /// Materializes a draft invoice for every active recurring schedule whose
    /// next due date has passed, then advances the schedule by one period.
    #[instrument(skip(self))]
    pub async fn process_recurring_invoices(&self) -> Result<RuleOutcome, ServiceError> {
        let now = Utc::now();
        let mut outcome = RuleOutcome::default();

        let due = recurring_invoice::Entity::find()
            .filter(recurring_invoice::Column::Status.eq("active"))
            .filter(recurring_invoice::Column::NextDueDate.lte(now))
            .all(&*self.db)
            .await?;

        for rec in due {
            outcome.matched += 1;

            let new_invoice = invoice::ActiveModel {
                customer_id: Set(rec.customer_id),
                amount: Set(rec.amount),
                date: Set(now),
                due_date: Set(Some(now + Duration::days(30))),
                status: Set("draft".to_string()),
                recurring_invoice_id: Set(Some(rec.id)),
                ..Default::default()
            };
            let created = match new_invoice.insert(&*self.db).await {
                Ok(inv) => inv,
                Err(e) => {
                    warn!(recurring_invoice_id = rec.id, error = %e, "Failed to materialize invoice");
                    continue;
                }
            };
            outcome.created += 1;

            let next = advance_due_date(rec.next_due_date, &rec.frequency);
            let rec_id = rec.id;
            let mut active: recurring_invoice::ActiveModel = rec.into();
            active.next_due_date = Set(next);
            if let Err(e) = active.update(&*self.db).await {
                warn!(recurring_invoice_id = rec_id, error = %e, "Failed to advance schedule");
            }

            info!(invoice_id = created.id, recurring_invoice_id = rec_id, "Recurring invoice created");
        }

        Ok(outcome)
    }

    /// Runs one rule from a cron tick, logging instead of propagating errors
    /// so a failing rule never takes down a sibling job.
    pub async fn run_rule(&self, name: &str) {
        let result = match name {
            "attendance" => self.check_attendance().await,
            "low_stock" => self.check_low_stock().await,
            "overdue_invoices" => self.check_overdue_invoices().await,
            "late_tasks" => self.check_late_tasks().await,
            "payroll" => self.generate_monthly_payroll().await,
            "recurring_invoices" => self.process_recurring_invoices().await,
            other => {
                error!(rule = other, "Unknown automation rule");
                return;
            }
        };

        if let Err(e) = result {
            error!(rule = name, error = %e, "Automation rule failed");
        }
    }

    /// Active alerts, newest first.
    pub async fn list_alerts(&self) -> Result<Vec<alert::Model>, ServiceError> {
        alert::Entity::find()
            .filter(alert::Column::Status.eq("active"))
            .order_by_desc(alert::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    pub async fn resolve_alert(
        &self,
        alert_id: i32,
        resolved_by: Option<i32>,
    ) -> Result<alert::Model, ServiceError> {
        let existing = alert::Entity::find_by_id(alert_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Alert {} not found", alert_id)))?;

        let mut active: alert::ActiveModel = existing.into();
        active.status = Set("resolved".to_string());
        active.resolved_at = Set(Some(Utc::now()));
        active.resolved_by = Set(resolved_by);
        active.update(&*self.db).await.map_err(ServiceError::DatabaseError)
    }

    /// Emails of admin-role users that are linked to an employee record.
    async fn admin_recipient_emails(&self) -> Result<Vec<String>, ServiceError> {
        let Some(admin_role) = role::Entity::find()
            .filter(role::Column::Name.eq("admin"))
            .one(&*self.db)
            .await?
        else {
            return Ok(Vec::new());
        };

        let admins = user::Entity::find()
            .filter(user::Column::RoleId.eq(admin_role.id))
            .filter(Condition::all().add(user::Column::EmployeeId.is_not_null()))
            .all(&*self.db)
            .await?;

        let mut emails = Vec::new();
        for admin in admins {
            if let Some(employee_id) = admin.employee_id {
                if let Some(emp) = employee::Entity::find_by_id(employee_id)
                    .one(&*self.db)
                    .await?
                {
                    emails.push(emp.email);
                }
            }
        }
        Ok(emails)
    }

    async fn create_alert(
        &self,
        alert_type: &str,
        title: &str,
        message: &str,
        severity: &str,
        target_id: Option<i32>,
        target_type: Option<&str>,
    ) {
        let record = alert::ActiveModel {
            alert_type: Set(alert_type.to_string()),
            title: Set(title.to_string()),
            message: Set(message.to_string()),
            severity: Set(severity.to_string()),
            target_id: Set(target_id),
            target_type: Set(target_type.map(|s| s.to_string())),
            status: Set("active".to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Err(e) = record.insert(&*self.db).await {
            warn!(alert_type, error = %e, "Failed to create alert");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn payroll_without_overtime() {
        let breakdown = compute_payroll(150.0, 4800.0, None);
        assert_eq!(breakdown.base_salary, 4800.0);
        assert_eq!(breakdown.overtime_pay, 0.0);
        assert_eq!(breakdown.net_pay, 4800.0);
    }

    #[test]
    fn payroll_overtime_uses_salary_derived_rate() {
        // 170h: 10h over at (4800/160)*1.5 = 45/h
        let breakdown = compute_payroll(170.0, 4800.0, None);
        assert!((breakdown.overtime_pay - 450.0).abs() < 1e-9);
        assert!((breakdown.net_pay - 5250.0).abs() < 1e-9);
    }

    #[test]
    fn payroll_overtime_prefers_explicit_hourly_rate() {
        let breakdown = compute_payroll(170.0, 4800.0, Some(20.0));
        assert!((breakdown.overtime_pay - 300.0).abs() < 1e-9);
    }

    #[rstest]
    #[case("monthly", 1)]
    #[case("quarterly", 3)]
    #[case("yearly", 12)]
    #[case("biweekly", 1)]
    fn due_date_advance_by_frequency(#[case] frequency: &str, #[case] months: u32) {
        let current = Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap();
        let next = advance_due_date(current, frequency);
        assert_eq!(next, current.checked_add_months(Months::new(months)).unwrap());
    }

    #[rstest]
    #[case(0, "critical")]
    #[case(1, "high")]
    #[case(9, "high")]
    fn severity_by_total_stock(#[case] total: i64, #[case] expected: &str) {
        assert_eq!(stock_severity(total), expected);
    }

    #[test]
    fn prior_month_range_spans_full_month() {
        let (start, end) = prior_month_range(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    }

    #[test]
    fn prior_month_range_handles_january() {
        let (start, end) = prior_month_range(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }
}
