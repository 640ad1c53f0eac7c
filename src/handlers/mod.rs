//! Command Handlers module
//!
//! Orchestration of the business flows over the store traits: payments,
//! reports and authentication.

mod auth_handler;
mod commands;
mod payment_handler;
mod report_handler;


pub use auth_handler::{AuthService, Authenticator};
pub use commands::*;
pub use payment_handler::{PaymentEngine, Payments};
pub use report_handler::{ReportAssembler, Reports};
