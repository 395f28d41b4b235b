//! medialib core library
//!
//! This crate provides the domain models, error types, configuration, validation and
//! repository contracts shared by the API client, the library/playback controllers and
//! the CLI.

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod session;
pub mod validation;

// Re-export commonly used types
pub use config::{ClientConfig, LogFormat};
pub use error::{ClientError, ClientResult, LogLevel};
pub use repository::{AccountRepository, MediaRepository, Page};
pub use session::Session;
