//! Cron scheduler driving the automation rules.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::info;

use crate::errors::ServiceError;
use crate::services::automation::AutomationService;

/// Daily attendance check at 09:00.
const ATTENDANCE_SCHEDULE: &str = "0 0 9 * * *";
/// Daily low-stock scan at 10:00.
const LOW_STOCK_SCHEDULE: &str = "0 0 10 * * *";
/// Daily overdue-invoice scan at 11:00.
const OVERDUE_INVOICES_SCHEDULE: &str = "0 0 11 * * *";
/// Daily late-task scan at 14:00.
const LATE_TASKS_SCHEDULE: &str = "0 0 14 * * *";
/// Monthly payroll run on the 1st at 06:00.
const PAYROLL_SCHEDULE: &str = "0 0 6 1 * *";
/// Daily recurring-invoice materialization at 08:00.
const RECURRING_INVOICES_SCHEDULE: &str = "0 0 8 * * *";

/// Cron-based scheduler that fires the automation rules on fixed schedules.
pub struct RuleScheduler {
    scheduler: JobScheduler,
    automation: Arc<AutomationService>,
}

impl std::fmt::Debug for RuleScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleScheduler").finish()
    }
}

impl RuleScheduler {
    pub async fn new(automation: Arc<AutomationService>) -> Result<Self, ServiceError> {
        let scheduler = JobScheduler::new().await.map_err(|e| {
            ServiceError::SchedulerError(format!("Failed to create scheduler: {}", e))
        })?;

        Ok(Self {
            scheduler,
            automation,
        })
    }

    /// Register every rule on its schedule.
    pub async fn register_rules(&self) -> Result<(), ServiceError> {
        self.register_rule("attendance", ATTENDANCE_SCHEDULE).await?;
        self.register_rule("low_stock", LOW_STOCK_SCHEDULE).await?;
        self.register_rule("overdue_invoices", OVERDUE_INVOICES_SCHEDULE)
            .await?;
        self.register_rule("late_tasks", LATE_TASKS_SCHEDULE).await?;
        self.register_rule("payroll", PAYROLL_SCHEDULE).await?;
        self.register_rule("recurring_invoices", RECURRING_INVOICES_SCHEDULE)
            .await?;

        info!("All automation schedules registered");
        Ok(())
    }

    pub async fn start(&self) -> Result<(), ServiceError> {
        self.scheduler.start().await.map_err(|e| {
            ServiceError::SchedulerError(format!("Failed to start scheduler: {}", e))
        })?;

        info!("Automation scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), ServiceError> {
        self.scheduler.shutdown().await.map_err(|e| {
            ServiceError::SchedulerError(format!("Failed to shutdown scheduler: {}", e))
        })?;

        info!("Automation scheduler shut down");
        Ok(())
    }

    async fn register_rule(
        &self,
        rule: &'static str,
        schedule: &str,
    ) -> Result<(), ServiceError> {
        let automation = Arc::clone(&self.automation);
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let automation = Arc::clone(&automation);
            Box::pin(async move {
                info!(rule, "Running scheduled automation rule");
                automation.run_rule(rule).await;
            })
        })
        .map_err(|e| {
            ServiceError::SchedulerError(format!("Failed to create {} schedule: {}", rule, e))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            ServiceError::SchedulerError(format!("Failed to add {} schedule: {}", rule, e))
        })?;

        info!(rule, schedule, "Registered automation schedule");
        Ok(())
    }
}
