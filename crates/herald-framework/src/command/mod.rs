//! Commands: descriptors, the [`Command`] trait and the registry.
//!
//! A command is a [`CommandDefinition`] paired with the code that runs it.
//! Implement [`Command`] directly when the permission check needs to await
//! something, or build one from a closure with
//! [`CommandDefinition::handler`]:
//!
//! ```rust,ignore
//! use herald_framework::{BoundArgs, CommandContext, CommandDefinition, Permission};
//!
//! let echo = CommandDefinition::new("echo")
//!     .argument(ArgumentSpec::new("phrase", ArgumentType::String))
//!     .handler(|_ctx: CommandContext, args: BoundArgs| async move {
//!         args.text("phrase").map(str::to_string)
//!     })
//!     .permission(|ctx: &CommandContext| Permission::from(!ctx.author().bot));
//! ```

pub mod definition;
pub mod function;
pub mod registry;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::binder::BoundArgs;
use crate::context::CommandContext;
use crate::error::BoxError;

pub use definition::{CommandDefinition, DEFAULT_GROUP};
pub use function::{FnCommand, IntoReply, PermissionFn};
pub use registry::CommandRegistry;

// ============================================================================
// Permission
// ============================================================================

/// Outcome of a command's permission check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Permission {
    /// The invoker may run the command.
    #[default]
    Granted,
    /// Denied; the invoker gets the generic denial reply.
    Denied,
    /// Denied; the invoker gets this text instead.
    DeniedWith(String),
}

impl Permission {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl From<bool> for Permission {
    fn from(allowed: bool) -> Self {
        if allowed { Self::Granted } else { Self::Denied }
    }
}

impl From<String> for Permission {
    fn from(reason: String) -> Self {
        Self::DeniedWith(reason)
    }
}

impl From<&str> for Permission {
    fn from(reason: &str) -> Self {
        Self::DeniedWith(reason.to_string())
    }
}

// ============================================================================
// Command trait
// ============================================================================

/// A runnable command.
#[async_trait]
pub trait Command: Send + Sync + 'static {
    /// The command's descriptor.
    fn definition(&self) -> &CommandDefinition;

    /// Decides whether the invoker may run this command.
    ///
    /// Called before arguments are bound. Grants by default.
    async fn has_permission(&self, _ctx: &CommandContext) -> Permission {
        Permission::Granted
    }

    /// Runs the command with its bound arguments.
    ///
    /// An error is contained by the dispatcher and reported to the invoker
    /// as a generic failure naming this command.
    async fn run(&self, ctx: &CommandContext, args: BoundArgs) -> Result<(), BoxError>;
}

/// A shared, type-erased command.
pub type BoxedCommand = Arc<dyn Command>;

impl fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.definition().name())
            .finish_non_exhaustive()
    }
}
