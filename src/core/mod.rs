pub mod config;
pub mod error;
pub mod types;

pub use config::WarSettings;
pub use error::{Result, ServiceError, WarError};
