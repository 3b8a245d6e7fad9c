//! The command dispatcher.
//!
//! [`Dispatcher`] drives one message through the dispatch state machine:
//!
//! ```text
//! Idle -> PrefixMatched -> CommandResolved -> PermissionChecked
//!      -> ArgumentsBound -> Invoked -> Completed | Failed
//!                        \-> UnknownCommand -> (fallback) ...
//! ```
//!
//! 1. Messages written by bots are dropped.
//! 2. The tokenizer strips a prefix; no prefix outside a private
//!    conversation stops silently.
//! 3. The first token is looked up. Unknown names, guild-only commands
//!    outside a guild and owner-only commands invoked by someone else are
//!    routed to the unknown-command fallback with the token as its only
//!    argument. Without a fallback the dispatch stops silently.
//! 4. The permission check may deny with a generic or a custom reply. A
//!    check that panics is reported like a failed command.
//! 5. Raw tokens are bound to the declared arguments; a binding failure is
//!    reported to the invoker.
//! 6. The command runs. Errors and panics are contained, reported to the
//!    invoker generically and logged.
//!
//! Every dispatch is independent. The dispatcher only holds frozen shared
//! state, so clones can serve any number of messages concurrently.
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::new(registry, ArgumentTypeRegistry::new(), settings);
//! let mut events = dispatcher.subscribe();
//!
//! match dispatcher.dispatch(message).await {
//!     DispatchOutcome::Completed { command } => println!("ran {command}"),
//!     other => println!("{other:?}"),
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::broadcast;
use tower::Service;
use tracing::{Instrument, debug, debug_span, error, warn};

use herald_core::BoxedMessage;

use crate::argument::ArgumentTypeRegistry;
use crate::binder::{ArgumentBinder, BoundArgs};
use crate::command::{BoxedCommand, CommandDefinition, CommandRegistry, Permission};
use crate::context::{CommandContext, DispatchContext, DispatchSettings, DispatchState};
use crate::error::{BindError, BoxError};
use crate::tokenizer::{Tokenizer, Tokens};

/// Capacity of the lifecycle event channel.
const EVENT_CAPACITY: usize = 256;

// ============================================================================
// Outcomes and events
// ============================================================================

/// Why a message was not treated as a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The author is a bot.
    BotAuthor,
    /// No configured prefix, outside a private conversation.
    NoPrefix,
    /// Nothing matched and no fallback is registered.
    UnknownCommand,
}

/// How a dispatch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The message was not a command invocation.
    Ignored(IgnoreReason),
    /// The permission check refused the invoker.
    Denied { command: String },
    /// The arguments could not be bound.
    Rejected { command: String, error: BindError },
    /// The command ran to completion.
    Completed { command: String },
    /// The command returned an error or panicked.
    Failed { command: String, error: String },
}

impl DispatchOutcome {
    /// The name of the command involved, if one was resolved.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Ignored(_) => None,
            Self::Denied { command }
            | Self::Rejected { command, .. }
            | Self::Completed { command }
            | Self::Failed { command, .. } => Some(command),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Lifecycle notifications published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    /// A command was resolved by name and is about to be checked and run.
    CommandRun {
        command: String,
        prefix: String,
        author: String,
    },
    /// The command token did not resolve to an available command.
    InvalidCommand { token: String, author: String },
    /// A command returned an error or panicked.
    CommandFailed { command: String, error: String },
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Turns incoming messages into command invocations.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    types: Arc<ArgumentTypeRegistry>,
    settings: Arc<DispatchSettings>,
    tokenizer: Tokenizer,
    events: broadcast::Sender<DispatchEvent>,
}

impl Dispatcher {
    /// Freezes the registries and settings into a dispatcher.
    pub fn new(
        registry: CommandRegistry,
        types: ArgumentTypeRegistry,
        settings: DispatchSettings,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tokenizer: Tokenizer::new(settings.prefixes().clone()),
            registry: Arc::new(registry),
            types: Arc::new(types),
            settings: Arc::new(settings),
            events,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn types(&self) -> &ArgumentTypeRegistry {
        &self.types
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Subscribes to lifecycle events.
    ///
    /// Events published while nobody is subscribed are dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.events.subscribe()
    }

    /// Dispatches one message.
    pub async fn dispatch(&self, message: BoxedMessage) -> DispatchOutcome {
        let span = debug_span!(
            "dispatch",
            author = %message.author().id,
            channel = %message.channel_kind(),
        );
        self.run_state_machine(message).instrument(span).await
    }

    async fn run_state_machine(&self, message: BoxedMessage) -> DispatchOutcome {
        let mut record = DispatchContext::new(message.content());

        if message.author().bot {
            debug!("Ignoring message from bot author");
            return DispatchOutcome::Ignored(IgnoreReason::BotAuthor);
        }

        let private = message.channel_kind().is_private();
        let Some(Tokens {
            prefix,
            command: token,
            args,
        }) = self.tokenizer.tokenize(message.content(), private)
        else {
            return DispatchOutcome::Ignored(IgnoreReason::NoPrefix);
        };
        record.set_prefix(prefix.as_str());
        record.advance(DispatchState::PrefixMatched);

        let resolved = self
            .registry
            .find(&token)
            .filter(|c| self.settings.is_available(c.definition(), message.as_ref()));

        let (command, raw_args) = match resolved {
            Some(command) => {
                record.advance(DispatchState::CommandResolved);
                self.publish(DispatchEvent::CommandRun {
                    command: command.definition().name().to_string(),
                    prefix: prefix.clone(),
                    author: message.author().id.clone(),
                });
                (Arc::clone(command), args)
            }
            None => {
                record.advance(DispatchState::UnknownCommand);
                debug!(token = %token, "Unknown command");
                self.publish(DispatchEvent::InvalidCommand {
                    token: token.clone(),
                    author: message.author().id.clone(),
                });
                match self.registry.unknown_fallback() {
                    Some(fallback) => (Arc::clone(fallback), vec![token.clone()]),
                    None => return DispatchOutcome::Ignored(IgnoreReason::UnknownCommand),
                }
            }
        };
        record.set_command(Arc::clone(&command), raw_args.clone());

        let ctx = CommandContext::new(
            Arc::clone(&message),
            prefix,
            token,
            raw_args,
            Arc::clone(&command),
            Arc::clone(&self.registry),
            Arc::clone(&self.settings),
        );
        let name = command.definition().name().to_string();

        let permission = match AssertUnwindSafe(command.has_permission(&ctx))
            .catch_unwind()
            .await
        {
            Ok(permission) => permission,
            Err(panic) => {
                let error = panic_message(panic.as_ref());
                return self.fail(&mut record, &ctx, name, error).await;
            }
        };
        match permission {
            Permission::Granted => record.advance(DispatchState::PermissionChecked),
            Permission::Denied => {
                debug!(command = %name, "Permission denied");
                let text = format!("You do not have permission to use the `{name}` command.");
                self.send_reply(&ctx, &text).await;
                return DispatchOutcome::Denied { command: name };
            }
            Permission::DeniedWith(reason) => {
                debug!(command = %name, reason = %reason, "Permission denied");
                self.send_reply(&ctx, &reason).await;
                return DispatchOutcome::Denied { command: name };
            }
        }

        let args = match self.bind(&command, &ctx) {
            Ok(args) => args,
            Err(error) => {
                debug!(command = %name, error = %error, "Argument binding failed");
                let text = rejection_text(command.definition(), &error);
                self.send_reply(&ctx, &text).await;
                return DispatchOutcome::Rejected {
                    command: name,
                    error,
                };
            }
        };
        record.set_args(args.clone());
        record.advance(DispatchState::ArgumentsBound);

        record.advance(DispatchState::Invoked);
        let result = AssertUnwindSafe(command.run(&ctx, args))
            .catch_unwind()
            .await;

        let failure = match result {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(panic) => Some(panic_message(panic.as_ref())),
        };

        match failure {
            None => {
                record.advance(DispatchState::Completed);
                debug!(command = %name, "Command completed");
                DispatchOutcome::Completed { command: name }
            }
            Some(error) => self.fail(&mut record, &ctx, name, error).await,
        }
    }

    /// Reports a command that errored or panicked, in its run or its
    /// permission check.
    async fn fail(
        &self,
        record: &mut DispatchContext,
        ctx: &CommandContext,
        name: String,
        error: String,
    ) -> DispatchOutcome {
        record.advance(DispatchState::Failed);
        error!(
            command = %name,
            content = record.content(),
            error = %error,
            "Command failed"
        );
        let text = self.failure_text(&name, &error);
        self.send_reply(ctx, &text).await;
        self.publish(DispatchEvent::CommandFailed {
            command: name.clone(),
            error: error.clone(),
        });
        DispatchOutcome::Failed {
            command: name,
            error,
        }
    }

    fn bind(&self, command: &BoxedCommand, ctx: &CommandContext) -> Result<BoundArgs, BindError> {
        let specs = command.definition().argument_specs();
        if specs.is_empty() {
            return Ok(BoundArgs::new());
        }
        ArgumentBinder::new(&self.types).bind(specs, ctx.raw_args(), ctx.scope())
    }

    fn failure_text(&self, command: &str, error: &str) -> String {
        let owner = match self.settings.owner_id() {
            Some(id) => format!("<@{id}>"),
            None => "the bot owner".to_string(),
        };
        format!(
            "An error occurred during the execution of the `{command}` command: {error}\n\n\
             You should never see this. Please contact {owner}."
        )
    }

    async fn send_reply(&self, ctx: &CommandContext, text: &str) {
        if let Err(e) = ctx.reply(text).await {
            warn!(command = ctx.command_name(), error = %e, "Failed to deliver reply");
        }
    }

    fn publish(&self, event: DispatchEvent) {
        // Fails only when nobody is subscribed.
        let _ = self.events.send(event);
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.registry.names())
            .field("types", &self.types)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Reply text for a binding failure, followed by the argument's prompt.
fn rejection_text(def: &CommandDefinition, error: &BindError) -> String {
    let prompt = match error {
        BindError::ArgumentTypeMismatch { key, .. } => def
            .argument_specs()
            .iter()
            .find(|s| s.key() == key)
            .and_then(|s| s.prompt_text()),
        BindError::InsufficientArguments { .. } => None,
    };
    match prompt {
        Some(prompt) => format!("{error}\n{prompt}"),
        None => error.to_string(),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "command panicked".to_string()
    }
}

// ============================================================================
// tower integration
// ============================================================================

impl Service<BoxedMessage> for Dispatcher {
    type Response = DispatchOutcome;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<DispatchOutcome, BoxError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, message: BoxedMessage) -> Self::Future {
        let dispatcher = self.clone();
        async move { Ok(dispatcher.dispatch(message).await) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use herald_core::Author;
    use tower::ServiceExt;

    use super::*;
    use crate::argument::{ArgumentSpec, ArgumentType};
    use crate::mock::MockMessage;

    fn add_numbers() -> impl crate::command::Command {
        CommandDefinition::new("add-numbers")
            .alias("add")
            .argument(ArgumentSpec::new("numbers", ArgumentType::String))
            .handler(|_ctx: CommandContext, args: BoundArgs| async move {
                let sum: f64 = args
                    .text("numbers")
                    .unwrap_or_default()
                    .split(' ')
                    .filter_map(|n| n.parse::<f64>().ok())
                    .sum();
                format!("Sum: {sum}")
            })
    }

    fn throw() -> impl crate::command::Command {
        CommandDefinition::new("throw").handler(|_ctx: CommandContext, _args: BoundArgs| async {
            Err::<(), BoxError>("boom".into())
        })
    }

    fn dispatcher_with(commands: Vec<BoxedCommand>, settings: DispatchSettings) -> Dispatcher {
        let mut registry = CommandRegistry::new();
        for command in commands {
            registry.register_boxed(command).unwrap();
        }
        Dispatcher::new(registry, ArgumentTypeRegistry::new(), settings)
    }

    fn dispatcher(commands: Vec<BoxedCommand>) -> Dispatcher {
        dispatcher_with(commands, DispatchSettings::new(["c.", "c!"]).with_owner("1"))
    }

    #[tokio::test]
    async fn test_add_with_second_prefix() {
        let d = dispatcher(vec![Arc::new(add_numbers())]);
        let msg = MockMessage::guild("c!add 1 2 3").shared();

        let outcome = d.dispatch(msg.clone()).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Completed {
                command: "add-numbers".into()
            }
        );
        assert_eq!(msg.replies(), ["Sum: 6"]);
    }

    #[tokio::test]
    async fn test_bot_author_is_dropped() {
        let d = dispatcher(vec![Arc::new(add_numbers())]);
        let msg = MockMessage::guild("c!add 1").by(Author::bot("9", "other-bot")).shared();

        assert_eq!(
            d.dispatch(msg.clone()).await,
            DispatchOutcome::Ignored(IgnoreReason::BotAuthor)
        );
        assert!(msg.replies().is_empty());
    }

    #[tokio::test]
    async fn test_missing_prefix_is_silent() {
        let d = dispatcher(vec![Arc::new(add_numbers())]);
        let msg = MockMessage::guild("add 1 2").shared();

        assert_eq!(
            d.dispatch(msg.clone()).await,
            DispatchOutcome::Ignored(IgnoreReason::NoPrefix)
        );
        assert!(msg.replies().is_empty());
    }

    #[tokio::test]
    async fn test_private_message_needs_no_prefix() {
        let d = dispatcher(vec![Arc::new(add_numbers())]);
        let msg = MockMessage::private("add 2 2").shared();

        assert!(d.dispatch(msg.clone()).await.is_completed());
        assert_eq!(msg.replies(), ["Sum: 4"]);
    }

    #[tokio::test]
    async fn test_unknown_without_fallback_is_silent() {
        let d = dispatcher(vec![]);
        let mut events = d.subscribe();
        let msg = MockMessage::guild("c.nope").shared();

        assert_eq!(
            d.dispatch(msg.clone()).await,
            DispatchOutcome::Ignored(IgnoreReason::UnknownCommand)
        );
        assert!(msg.replies().is_empty());
        assert_eq!(
            events.try_recv().unwrap(),
            DispatchEvent::InvalidCommand {
                token: "nope".into(),
                author: "7".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_fallback_receives_token() {
        let fallback = CommandDefinition::new("unknown")
            .unknown_fallback()
            .argument(ArgumentSpec::new("commandName", ArgumentType::String))
            .handler(|_ctx: CommandContext, args: BoundArgs| async move {
                format!("no such command: {}", args.text("commandName").unwrap_or_default())
            });
        let d = dispatcher(vec![Arc::new(fallback)]);
        let msg = MockMessage::guild("c.dance now please").shared();

        assert_eq!(
            d.dispatch(msg.clone()).await,
            DispatchOutcome::Completed {
                command: "unknown".into()
            }
        );
        assert_eq!(msg.replies(), ["no such command: dance"]);
    }

    #[tokio::test]
    async fn test_fallback_is_not_invoked_by_name() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let fallback = CommandDefinition::new("unknown")
            .unknown_fallback()
            .argument(ArgumentSpec::new("commandName", ArgumentType::String))
            .handler(move |_ctx: CommandContext, args: BoundArgs| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(args.text("commandName"), Some("unknown"));
                }
            });
        let d = dispatcher(vec![Arc::new(fallback)]);

        let outcome = d.dispatch(MockMessage::guild("c.unknown extra").shared()).await;
        assert!(outcome.is_completed());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generic_and_custom_denials() {
        let locked = CommandDefinition::new("no-permission")
            .handler(|_ctx: CommandContext, _args: BoundArgs| async {})
            .permission(|_ctx: &CommandContext| false);
        let moderated = CommandDefinition::new("ban")
            .handler(|_ctx: CommandContext, _args: BoundArgs| async {})
            .permission(|_ctx: &CommandContext| "Only moderators may ban.");
        let d = dispatcher(vec![Arc::new(locked), Arc::new(moderated)]);

        let msg = MockMessage::guild("c!no-permission").shared();
        assert_eq!(
            d.dispatch(msg.clone()).await,
            DispatchOutcome::Denied {
                command: "no-permission".into()
            }
        );
        assert_eq!(
            msg.replies(),
            ["You do not have permission to use the `no-permission` command."]
        );

        let msg = MockMessage::guild("c!ban").shared();
        d.dispatch(msg.clone()).await;
        assert_eq!(msg.replies(), ["Only moderators may ban."]);
    }

    #[tokio::test]
    async fn test_permission_runs_before_binding() {
        let locked = CommandDefinition::new("kick")
            .argument(ArgumentSpec::new("target", ArgumentType::User))
            .handler(|_ctx: CommandContext, _args: BoundArgs| async {})
            .permission(|_ctx: &CommandContext| false);
        let d = dispatcher(vec![Arc::new(locked)]);

        let outcome = d.dispatch(MockMessage::guild("c!kick").shared()).await;
        assert!(matches!(outcome, DispatchOutcome::Denied { .. }));
    }

    #[tokio::test]
    async fn test_insufficient_arguments_reply() {
        let d = dispatcher(vec![Arc::new(add_numbers())]);
        let msg = MockMessage::guild("c!add").shared();

        assert_eq!(
            d.dispatch(msg.clone()).await,
            DispatchOutcome::Rejected {
                command: "add-numbers".into(),
                error: BindError::InsufficientArguments { required: 1 },
            }
        );
        assert_eq!(msg.replies(), ["Insufficient arguments. Expected at least 1."]);
    }

    #[tokio::test]
    async fn test_type_mismatch_reply_includes_prompt() {
        let multiply = CommandDefinition::new("multiply")
            .argument(
                ArgumentSpec::new("factor", ArgumentType::Number).prompt("Give me a number."),
            )
            .handler(|_ctx: CommandContext, _args: BoundArgs| async {});
        let d = dispatcher(vec![Arc::new(multiply)]);
        let msg = MockMessage::guild("c!multiply lots").shared();

        assert!(matches!(
            d.dispatch(msg.clone()).await,
            DispatchOutcome::Rejected {
                error: BindError::ArgumentTypeMismatch { .. },
                ..
            }
        ));
        assert_eq!(
            msg.replies(),
            ["Argument type mismatch at 'lots'\nGive me a number."]
        );
    }

    #[tokio::test]
    async fn test_handler_error_is_contained() {
        let d = dispatcher(vec![Arc::new(throw()), Arc::new(add_numbers())]);
        let mut events = d.subscribe();

        let msg = MockMessage::guild("c!throw").shared();
        let outcome = d.dispatch(msg.clone()).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Failed {
                command: "throw".into(),
                error: "boom".into(),
            }
        );
        let reply = msg.replies().remove(0);
        assert!(reply.starts_with(
            "An error occurred during the execution of the `throw` command: boom"
        ));
        assert!(reply.ends_with("Please contact <@1>."));

        // The registry and later dispatches are unaffected.
        assert_eq!(d.registry().len(), 2);
        assert!(d.dispatch(MockMessage::guild("c!add 1").shared()).await.is_completed());

        let published: Vec<_> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        assert!(published.contains(&DispatchEvent::CommandFailed {
            command: "throw".into(),
            error: "boom".into(),
        }));
    }

    #[tokio::test]
    async fn test_failure_without_owner() {
        let d = dispatcher_with(vec![Arc::new(throw())], DispatchSettings::new("!"));
        let msg = MockMessage::guild("!throw").shared();
        d.dispatch(msg.clone()).await;
        assert!(msg.replies()[0].ends_with("Please contact the bot owner."));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let explode = CommandDefinition::new("explode")
            .handler(|_ctx: CommandContext, args: BoundArgs| async move {
                if args.is_empty() {
                    panic!("kaboom");
                }
            });
        let d = dispatcher(vec![Arc::new(explode)]);
        let msg = MockMessage::guild("c!explode").shared();

        assert_eq!(
            d.dispatch(msg.clone()).await,
            DispatchOutcome::Failed {
                command: "explode".into(),
                error: "kaboom".into(),
            }
        );
        assert_eq!(msg.replies().len(), 1);
    }

    #[tokio::test]
    async fn test_permission_panic_is_contained() {
        let fragile = CommandDefinition::new("fragile")
            .handler(|_ctx: CommandContext, _args: BoundArgs| async { "ran" })
            .permission(|ctx: &CommandContext| -> bool {
                if ctx.raw_args().is_empty() {
                    panic!("predicate exploded");
                }
                true
            });
        let d = dispatcher(vec![Arc::new(fragile)]);
        let msg = MockMessage::guild("c!fragile").shared();

        assert_eq!(
            d.dispatch(msg.clone()).await,
            DispatchOutcome::Failed {
                command: "fragile".into(),
                error: "predicate exploded".into(),
            }
        );
        assert!(msg.replies()[0].contains("predicate exploded"));

        let msg = MockMessage::guild("c!fragile x").shared();
        assert!(d.dispatch(msg.clone()).await.is_completed());
        assert_eq!(msg.replies(), ["ran"]);
    }

    #[tokio::test]
    async fn test_guild_only_outside_guild_is_unknown() {
        let guild_only = CommandDefinition::new("whois")
            .guild_only()
            .handler(|_ctx: CommandContext, _args: BoundArgs| async { "in guild" });
        let d = dispatcher(vec![Arc::new(guild_only)]);

        assert_eq!(
            d.dispatch(MockMessage::private("whois").shared()).await,
            DispatchOutcome::Ignored(IgnoreReason::UnknownCommand)
        );
        assert!(d.dispatch(MockMessage::guild("c.whois").shared()).await.is_completed());
    }

    #[tokio::test]
    async fn test_owner_only() {
        let shutdown = CommandDefinition::new("shutdown")
            .owner_only()
            .handler(|_ctx: CommandContext, _args: BoundArgs| async {});
        let d = dispatcher(vec![Arc::new(shutdown)]);

        let stranger = MockMessage::guild("c.shutdown").shared();
        assert_eq!(
            d.dispatch(stranger).await,
            DispatchOutcome::Ignored(IgnoreReason::UnknownCommand)
        );

        let owner = MockMessage::guild("c.shutdown").by(Author::new("1", "owner")).shared();
        assert!(d.dispatch(owner).await.is_completed());
    }

    #[tokio::test]
    async fn test_reply_failure_does_not_escalate() {
        let d = dispatcher(vec![Arc::new(add_numbers())]);
        let msg = MockMessage::guild("c!add 1 2").failing().shared();
        assert!(d.dispatch(msg).await.is_completed());
    }

    #[tokio::test]
    async fn test_command_run_event() {
        let d = dispatcher(vec![Arc::new(add_numbers())]);
        let mut events = d.subscribe();
        d.dispatch(MockMessage::guild("c.add 5").shared()).await;

        assert_eq!(
            events.try_recv().unwrap(),
            DispatchEvent::CommandRun {
                command: "add-numbers".into(),
                prefix: "c.".into(),
                author: "7".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_slow_handler_does_not_block_others() {
        let slow = CommandDefinition::new("slow").handler(
            |_ctx: CommandContext, _args: BoundArgs| async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                "done"
            },
        );
        let d = dispatcher(vec![Arc::new(slow), Arc::new(add_numbers())]);

        let slow_msg = MockMessage::guild("c!slow").shared();
        let fast_msg = MockMessage::guild("c!add 1 1").shared();
        let (slow_outcome, fast_outcome) = tokio::join!(
            d.dispatch(slow_msg.clone()),
            async {
                let outcome = d.dispatch(fast_msg.clone()).await;
                // Finished while the slow command is still sleeping.
                assert!(slow_msg.replies().is_empty());
                outcome
            }
        );
        assert!(slow_outcome.is_completed());
        assert!(fast_outcome.is_completed());
    }

    #[tokio::test]
    async fn test_tower_service() {
        let d = dispatcher(vec![Arc::new(add_numbers())]);
        let msg = MockMessage::guild("c!add 3").shared();

        let outcome = d.oneshot(msg.clone() as BoxedMessage).await.unwrap();
        assert!(outcome.is_completed());
        assert_eq!(msg.replies(), ["Sum: 3"]);
    }
}
