//! # Herald Framework
//!
//! The command engine: turns a line of user text into a validated, typed
//! invocation of a registered command.
//!
//! This layer provides:
//! - [`ArgumentTypeRegistry`] mapping type names to resolvers
//! - [`CommandDefinition`], the [`Command`] trait and the [`CommandRegistry`]
//! - [`Tokenizer`] for prefix stripping and token splitting
//! - [`ArgumentBinder`] for arity reshaping, type resolution and defaults
//! - [`Dispatcher`], the per-message state machine
//! - the built-in `help` and `unknown` commands
//!
//! Everything here is platform-neutral; messages arrive through the
//! [`herald_core::IncomingMessage`] contract.

pub mod argument;
pub mod binder;
pub mod builtin;
pub mod command;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod tokenizer;

#[cfg(test)]
mod mock;

pub use argument::{ArgValue, ArgumentSpec, ArgumentType, ArgumentTypeRegistry, TypeResolver};
pub use binder::{ArgumentBinder, BoundArgs};
pub use builtin::{DefaultCommands, HelpCommand, UnknownCommand, register_defaults};
pub use command::{
    BoxedCommand, Command, CommandDefinition, CommandRegistry, FnCommand, IntoReply, Permission,
};
pub use context::{CommandContext, DispatchContext, DispatchSettings, DispatchState};
pub use dispatcher::{DispatchEvent, DispatchOutcome, Dispatcher, IgnoreReason};
pub use error::{BindError, BindResult, BoxError, MalformedReason, RegistrationError, RegistrationResult};
pub use tokenizer::{Prefixes, Tokenizer, Tokens};
