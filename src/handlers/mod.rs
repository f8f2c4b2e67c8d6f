pub mod accounting;
pub mod auth;
pub mod automation;
pub mod common;
pub mod crm;
pub mod hr;
pub mod insights;
pub mod inventory;
pub mod projects;
pub mod reports;
pub mod search;

use std::sync::Arc;

use crate::db::DbPool;
use crate::services::automation::AutomationService;
use crate::services::email::{EmailService, MailTransport};
use crate::services::insights::InsightsService;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
/// and the scheduler.
#[derive(Clone)]
pub struct AppServices {
    pub email: Arc<EmailService>,
    pub automation: Arc<AutomationService>,
    pub insights: Arc<InsightsService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, mailer: Arc<dyn MailTransport>) -> Self {
        let email = Arc::new(EmailService::new(db.clone(), mailer));
        let automation = Arc::new(AutomationService::new(db.clone(), email.clone()));
        let insights = Arc::new(InsightsService::new(db));

        Self {
            email,
            automation,
            insights,
        }
    }
}
