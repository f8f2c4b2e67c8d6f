pub mod alert;
pub mod attendance;
pub mod customer;
pub mod department;
pub mod email_log;
pub mod email_template;
pub mod employee;
pub mod invoice;
pub mod payroll;
pub mod product;
pub mod project;
pub mod recurring_invoice;
pub mod role;
pub mod stock;
pub mod task;
pub mod transaction;
pub mod user;
pub mod warehouse;
