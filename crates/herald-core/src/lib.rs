//! # Herald Core
//!
//! Platform-neutral contracts between the Herald command engine and the
//! chat platform it is attached to.
//!
//! The engine owns no transport, gateway or rendering code. A platform
//! integration provides:
//!
//! - [`IncomingMessage`] - the text, author, channel kind, scope and reply
//!   capability of one message
//! - [`Scope`] - the guild-like handle used to resolve member mentions
//!
//! Everything else (registries, binding, dispatch) lives in
//! `herald-framework`.

pub mod error;
pub mod message;
pub mod scope;

pub use error::{ReplyError, ReplyResult};
pub use message::{Author, BoxedMessage, ChannelKind, IncomingMessage};
pub use scope::{BoxedScope, Member, Scope, StaticScope};
