pub mod automation;
pub mod email;
pub mod insights;
pub mod scheduler;
