//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CheckerConfig (validated, immutable)
//!     → CLI overrides applied in main
//!     → handed by value/Arc to orchestrator, workers and clients
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a run starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    ApiConfig, CheckerConfig, ObservabilityConfig, RetryConfig, SelectionConfig, SelectionMode,
    SignerConfig, WorkerConfig,
};
