pub mod config;
pub mod error;
pub mod security;
pub mod store;
pub mod traits;
pub mod types;

pub use config::{AuthConfig, LoggingConfig, ServerConfig, Settings};
pub use error::*;
pub use security::*;
pub use store::*;
pub use traits::*;
pub use types::*;
