//! Commands backed by async closures.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::binder::BoundArgs;
use crate::context::CommandContext;
use crate::error::BoxError;

use super::{Command, CommandDefinition, Permission};

// ============================================================================
// IntoReply - Handle closure return values
// ============================================================================

/// Types a command closure may return.
///
/// Text is sent back to the invoker; `Err` values become handler failures.
#[async_trait]
pub trait IntoReply: Send {
    /// Delivers this value to the invoker.
    async fn into_reply(self, ctx: &CommandContext) -> Result<(), BoxError>;
}

#[async_trait]
impl IntoReply for () {
    async fn into_reply(self, _ctx: &CommandContext) -> Result<(), BoxError> {
        Ok(())
    }
}

#[async_trait]
impl IntoReply for String {
    async fn into_reply(self, ctx: &CommandContext) -> Result<(), BoxError> {
        if let Err(e) = ctx.reply(&self).await {
            warn!(command = ctx.command_name(), error = %e, "Failed to deliver reply");
        }
        Ok(())
    }
}

#[async_trait]
impl IntoReply for &'static str {
    async fn into_reply(self, ctx: &CommandContext) -> Result<(), BoxError> {
        self.to_string().into_reply(ctx).await
    }
}

#[async_trait]
impl<T: IntoReply> IntoReply for Option<T> {
    async fn into_reply(self, ctx: &CommandContext) -> Result<(), BoxError> {
        match self {
            Some(t) => t.into_reply(ctx).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<BoxError> + Send,
{
    async fn into_reply(self, ctx: &CommandContext) -> Result<(), BoxError> {
        match self {
            Ok(t) => t.into_reply(ctx).await,
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// FnCommand
// ============================================================================

/// A synchronous permission predicate.
pub type PermissionFn = Arc<dyn Fn(&CommandContext) -> Permission + Send + Sync>;

/// A command whose body is an async closure.
///
/// Created by [`CommandDefinition::handler`].
pub struct FnCommand<F> {
    definition: CommandDefinition,
    handler: F,
    permission: Option<PermissionFn>,
}

impl<F> FnCommand<F> {
    pub(crate) fn new(definition: CommandDefinition, handler: F) -> Self {
        Self {
            definition,
            handler,
            permission: None,
        }
    }

    /// Attaches a permission predicate.
    ///
    /// The predicate may return a `bool`, a denial reason, or a
    /// [`Permission`] directly.
    pub fn permission<P, R>(mut self, predicate: P) -> Self
    where
        P: Fn(&CommandContext) -> R + Send + Sync + 'static,
        R: Into<Permission>,
    {
        self.permission = Some(Arc::new(move |ctx| predicate(ctx).into()));
        self
    }
}

impl<F> fmt::Debug for FnCommand<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand")
            .field("definition", &self.definition)
            .field("has_permission_check", &self.permission.is_some())
            .finish()
    }
}

#[async_trait]
impl<F, Fut, R> Command for FnCommand<F>
where
    F: Fn(CommandContext, BoundArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply + 'static,
{
    fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    async fn has_permission(&self, ctx: &CommandContext) -> Permission {
        match &self.permission {
            Some(check) => check(ctx),
            None => Permission::Granted,
        }
    }

    async fn run(&self, ctx: &CommandContext, args: BoundArgs) -> Result<(), BoxError> {
        let reply = (self.handler)(ctx.clone(), args).await;
        reply.into_reply(ctx).await
    }
}
