//! API layer
//!
//! HTTP handlers for:
//! - Accounts (register, fetch, update, delete, login, friends)
//! - Posts (create, list, delete)
//! - Metrics (Prometheus)

mod accounts;
mod dto;
pub mod metrics;
mod posts;

pub use dto::*;

pub use accounts::accounts_router;
pub use metrics::metrics_router;
pub use posts::posts_router;
