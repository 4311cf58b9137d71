//! Multi-chain wallet balance checker library

pub mod aggregate;
pub mod api;
pub mod config;
pub mod model;
pub mod observability;
pub mod orchestrator;
pub mod pool;
pub mod resilience;
pub mod signing;

pub use config::schema::CheckerConfig;
pub use orchestrator::{Orchestrator, OrchestratorError, RunReport};
