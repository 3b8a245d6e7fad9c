//! # Herald
//!
//! A typed, prefix-driven command dispatch engine for text bots.
//!
//! ## Overview
//!
//! Herald turns a raw line of chat text into a validated, typed invocation
//! of a registered command. Transport, gateways and rendering stay with the
//! platform integration, which only has to implement
//! [`IncomingMessage`](core::IncomingMessage).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────────────┐   ┌────────────────┐   ┌─────────┐
//! │ Platform │──▶│ Tokenizer │──▶│ CommandRegistry  │──▶│ ArgumentBinder │──▶│ Command │
//! │ message  │   │ (prefix)  │   │ (name / alias)   │   │ (typed args)   │   │  run()  │
//! └──────────┘   └───────────┘   └──────────────────┘   └────────────────┘   └─────────┘
//!                      └──────────────── Dispatcher state machine ─────────────────┘
//! ```
//!
//! - **Core**: message and scope contracts implemented by platforms
//! - **Framework**: registries, tokenizer, binder, dispatcher, built-in commands
//! - **Runtime**: configuration, logging and the concurrent message client
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let add = CommandDefinition::new("add-numbers")
//!         .alias("add")
//!         .argument(ArgumentSpec::new("numbers", ArgumentType::String))
//!         .handler(|_ctx: CommandContext, args: BoundArgs| async move {
//!             let sum: f64 = args
//!                 .text("numbers")
//!                 .unwrap_or_default()
//!                 .split(' ')
//!                 .filter_map(|n| n.parse::<f64>().ok())
//!                 .sum();
//!             format!("Sum: {sum}")
//!         });
//!
//!     let client = ClientBuilder::load()?
//!         .register(add)?
//!         .register_default_commands()?
//!         .build();
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     my_platform::forward_messages(tx);
//!     client.run(rx).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use herald_core as core;
pub use herald_framework as framework;
pub use herald_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use herald_runtime::{Client, ClientBuilder, ConfigLoader, HeraldConfig};

    // Defining commands
    pub use herald_framework::{
        ArgValue, ArgumentSpec, ArgumentType, BoundArgs, BoxError, Command, CommandContext,
        CommandDefinition, IntoReply, Permission,
    };

    // Observing dispatch
    pub use herald_framework::{DispatchEvent, DispatchOutcome};

    // Platform contracts
    pub use herald_core::{
        Author, BoxedMessage, ChannelKind, IncomingMessage, Member, ReplyError, ReplyResult, Scope,
    };
}
