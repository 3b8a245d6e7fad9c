//! Per-dispatch context types.
//!
//! - [`DispatchSettings`] - the frozen engine configuration shared by every
//!   dispatch (prefixes and owner identity).
//! - [`DispatchContext`] - the record one dispatch builds up as it moves
//!   through the state machine. Created per message, dropped afterwards.
//! - [`CommandContext`] - the read-only snapshot handed to permission
//!   checks and command bodies once a command has been resolved.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use herald_core::{Author, BoxedMessage, ChannelKind, IncomingMessage, ReplyResult, Scope};

use crate::binder::BoundArgs;
use crate::command::{BoxedCommand, CommandDefinition, CommandRegistry};
use crate::tokenizer::Prefixes;

// =============================================================================
// DispatchSettings
// =============================================================================

/// Engine-wide settings consulted during dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSettings {
    prefixes: Prefixes,
    owner_id: Option<String>,
}

impl DispatchSettings {
    pub fn new(prefixes: impl Into<Prefixes>) -> Self {
        Self {
            prefixes: prefixes.into(),
            owner_id: None,
        }
    }

    /// Sets the identity allowed to run owner-only commands.
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn prefixes(&self) -> &Prefixes {
        &self.prefixes
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    /// Returns `true` if `user_id` is the configured owner.
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }

    /// Whether `message` may reach the command described by `def`.
    ///
    /// Guild-only commands need a scope and owner-only commands need the
    /// owner. Unavailable commands are treated as if they did not exist.
    pub fn is_available(&self, def: &CommandDefinition, message: &dyn IncomingMessage) -> bool {
        if def.is_guild_only() && message.scope().is_none() {
            return false;
        }
        if def.is_owner_only() && !self.is_owner(&message.author().id) {
            return false;
        }
        true
    }
}

// =============================================================================
// DispatchState / DispatchContext
// =============================================================================

/// Stages of a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    PrefixMatched,
    CommandResolved,
    UnknownCommand,
    PermissionChecked,
    ArgumentsBound,
    Invoked,
    Completed,
    Failed,
}

impl DispatchState {
    /// Returns `true` for states a dispatch ends in.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Everything one dispatch has learned about its message so far.
#[derive(Debug)]
pub struct DispatchContext {
    state: DispatchState,
    content: String,
    prefix: Option<String>,
    command: Option<BoxedCommand>,
    raw_args: Vec<String>,
    args: Option<BoundArgs>,
}

impl DispatchContext {
    pub(crate) fn new(content: impl Into<String>) -> Self {
        Self {
            state: DispatchState::Idle,
            content: content.into(),
            prefix: None,
            command: None,
            raw_args: Vec::new(),
            args: None,
        }
    }

    pub(crate) fn advance(&mut self, next: DispatchState) {
        trace!(from = %self.state, to = %next, "Dispatch state transition");
        self.state = next;
    }

    pub(crate) fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = Some(prefix.into());
    }

    pub(crate) fn set_command(&mut self, command: BoxedCommand, raw_args: Vec<String>) {
        self.command = Some(command);
        self.raw_args = raw_args;
    }

    pub(crate) fn set_args(&mut self, args: BoundArgs) {
        self.args = Some(args);
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// The original message text.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn command(&self) -> Option<&BoxedCommand> {
        self.command.as_ref()
    }

    pub fn raw_args(&self) -> &[String] {
        &self.raw_args
    }

    pub fn args(&self) -> Option<&BoundArgs> {
        self.args.as_ref()
    }
}

// =============================================================================
// CommandContext
// =============================================================================

/// The snapshot a resolved command sees.
///
/// Cheap to clone: the message, command, registry and settings are shared.
#[derive(Clone)]
pub struct CommandContext {
    message: BoxedMessage,
    prefix: String,
    command_token: String,
    raw_args: Vec<String>,
    command: BoxedCommand,
    registry: Arc<CommandRegistry>,
    settings: Arc<DispatchSettings>,
}

impl CommandContext {
    pub(crate) fn new(
        message: BoxedMessage,
        prefix: impl Into<String>,
        command_token: impl Into<String>,
        raw_args: Vec<String>,
        command: BoxedCommand,
        registry: Arc<CommandRegistry>,
        settings: Arc<DispatchSettings>,
    ) -> Self {
        Self {
            message,
            prefix: prefix.into(),
            command_token: command_token.into(),
            raw_args,
            command,
            registry,
            settings,
        }
    }

    pub fn message(&self) -> &BoxedMessage {
        &self.message
    }

    pub fn content(&self) -> &str {
        self.message.content()
    }

    pub fn author(&self) -> &Author {
        self.message.author()
    }

    pub fn channel_kind(&self) -> ChannelKind {
        self.message.channel_kind()
    }

    pub fn scope(&self) -> Option<&dyn Scope> {
        self.message.scope()
    }

    /// The prefix the invoker used; empty for unprefixed private messages.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The token the invoker typed as the command name.
    pub fn command_token(&self) -> &str {
        &self.command_token
    }

    /// Argument tokens as typed, before binding.
    pub fn raw_args(&self) -> &[String] {
        &self.raw_args
    }

    pub fn command(&self) -> &BoxedCommand {
        &self.command
    }

    pub fn command_name(&self) -> &str {
        self.command.definition().name()
    }

    /// The frozen registry, for commands that list other commands.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Returns `true` if the invoker is the configured owner.
    pub fn is_owner(&self) -> bool {
        self.settings.is_owner(&self.author().id)
    }

    /// Whether the invoker may reach the command described by `def`.
    pub fn can_use(&self, def: &CommandDefinition) -> bool {
        self.settings.is_available(def, self.message.as_ref())
    }

    /// Replies in the channel the message came from.
    pub async fn reply(&self, text: &str) -> ReplyResult<()> {
        self.message.reply(text).await
    }

    /// Sends `text` to the invoker privately.
    pub async fn send_direct(&self, text: &str) -> ReplyResult<()> {
        self.message.send_direct(text).await
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("command", &self.command_name())
            .field("prefix", &self.prefix)
            .field("raw_args", &self.raw_args)
            .field("author", &self.author().id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_match() {
        let settings = DispatchSettings::new("!").with_owner("1");
        assert!(settings.is_owner("1"));
        assert!(!settings.is_owner("2"));
        assert!(!DispatchSettings::new("!").is_owner("1"));
    }

    #[test]
    fn test_dispatch_context_tracks_state() {
        let mut ctx = DispatchContext::new("!ping");
        assert_eq!(ctx.state(), DispatchState::Idle);
        ctx.advance(DispatchState::PrefixMatched);
        ctx.set_prefix("!");
        assert_eq!(ctx.prefix(), Some("!"));
        assert!(!ctx.state().is_terminal());
        ctx.advance(DispatchState::Completed);
        assert!(ctx.state().is_terminal());
    }
}
