//! chatread core library
//!
//! Foundational utilities shared by every chatread crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Layered configuration

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, LlmSettings, SearchSettings};
pub use error::{AppError, AppResult};
