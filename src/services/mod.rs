pub mod aggregate;
pub mod calendar;
pub mod db_init;
pub mod exchange_rate;

pub mod auth_service;
pub mod user_service;
pub mod announcement_service;
pub mod expense_service;
pub mod tax_service;
pub mod profit_service;
