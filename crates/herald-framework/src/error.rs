//! Error types for the Herald framework.
//!
//! Errors fall into two families with very different lifetimes:
//!
//! - [`RegistrationError`] is raised while commands are registered. It always
//!   points at a mistake in command authoring and is meant to abort startup.
//! - [`BindError`] is raised per dispatch while binding user input. The
//!   dispatcher recovers from it locally by replying to the invoker; it never
//!   escapes a dispatch.
//!
//! Errors raised by command handlers themselves are plain [`BoxError`]s.

use std::fmt;

use thiserror::Error;

pub use tower::BoxError;

/// Why a command definition was rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// The command name is empty.
    EmptyName,
    /// One of the aliases is empty.
    EmptyAlias,
    /// The same name or alias appears twice in one definition.
    RepeatedName {
        /// The repeated name.
        name: String,
    },
    /// A required argument follows an optional one.
    RequiredAfterOptional {
        /// Key of the offending required argument.
        key: String,
    },
    /// Two arguments share a key.
    DuplicateKey {
        /// The duplicated key.
        key: String,
    },
    /// An argument declares no type at all.
    NoTypes {
        /// Key of the offending argument.
        key: String,
    },
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "command name is empty"),
            Self::EmptyAlias => write!(f, "an alias is empty"),
            Self::RepeatedName { name } => {
                write!(f, "name or alias '{name}' is listed more than once")
            }
            Self::RequiredAfterOptional { key } => {
                write!(f, "required argument '{key}' is after an optional argument")
            }
            Self::DuplicateKey { key } => {
                write!(f, "argument key '{key}' is used at least twice")
            }
            Self::NoTypes { key } => write!(f, "argument '{key}' declares no type"),
        }
    }
}

/// Errors raised by [`CommandRegistry::register`](crate::CommandRegistry::register).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// The name or an alias is already taken by a non-default command.
    #[error(
        "unable to register command '{command}': command '{existing}' already uses the same name or shares an alias"
    )]
    DuplicateCommand {
        /// The command being registered.
        command: String,
        /// The registered command holding the name.
        existing: String,
    },

    /// Another non-default unknown-command fallback is already registered.
    #[error(
        "command '{existing}' is already the unknown command, '{command}' cannot also be it"
    )]
    DuplicateFallback {
        /// The command being registered.
        command: String,
        /// The current fallback.
        existing: String,
    },

    /// The definition violates an argument or naming invariant.
    #[error("malformed command '{command}': {reason}")]
    MalformedCommand {
        /// The command being registered.
        command: String,
        /// What is wrong with it.
        reason: MalformedReason,
    },
}

impl RegistrationError {
    pub(crate) fn malformed(command: impl Into<String>, reason: MalformedReason) -> Self {
        Self::MalformedCommand {
            command: command.into(),
            reason,
        }
    }
}

/// Errors raised while binding raw tokens to declared arguments.
///
/// The `Display` output is the text relayed to the invoker.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindError {
    /// Fewer tokens than required arguments were supplied.
    #[error("Insufficient arguments. Expected at least {required}.")]
    InsufficientArguments {
        /// Number of required arguments.
        required: usize,
    },

    /// No declared type accepted the token.
    #[error("Argument type mismatch at '{token}'")]
    ArgumentTypeMismatch {
        /// Key of the argument being bound.
        key: String,
        /// The offending raw token.
        token: String,
    },
}

/// Result type for registration operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Result type for binding operations.
pub type BindResult<T> = Result<T, BindError>;
