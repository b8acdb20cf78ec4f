//! Application state and external service wiring.

mod config;
mod state;

pub use config::ServiceConfig;
pub use state::{AuthKeys, ServiceState};
