//! Herald Runtime - configuration, logging and the message client.
//!
//! This crate provides:
//! - Layered configuration loading ([`config`])
//! - Logging setup driven by that configuration ([`logging`])
//! - [`ClientBuilder`] / [`Client`], which freeze the command engine and
//!   dispatch incoming messages concurrently
//!
//! # Example
//!
//! ```rust,ignore
//! use herald_runtime::ClientBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ClientBuilder::load()?
//!         .register(my_command)?
//!         .register_default_commands()?
//!         .build();
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     platform::connect(tx);
//!     client.run(rx).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;

// Re-exports
pub use client::{Client, ClientBuilder, ClientStats};
pub use config::{ConfigError, ConfigLoader, ConfigResult, HeraldConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros, for `use herald_runtime::prelude::*`.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
