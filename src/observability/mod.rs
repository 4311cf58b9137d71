//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (wallet, chain, worker, ...)
//!     → logging.rs (stderr + optional log file, filtered by level)
//!
//! The orchestrator produces:
//!     → progress.rs (one bar per phase, advanced per drained result)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - Progress output is hidden off-terminal so piped runs stay clean

pub mod logging;
pub mod progress;

pub use progress::Progress;
