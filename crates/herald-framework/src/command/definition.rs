//! Command descriptors.

use std::collections::HashSet;
use std::future::Future;

use crate::argument::ArgumentSpec;
use crate::binder::BoundArgs;
use crate::context::CommandContext;
use crate::error::{MalformedReason, RegistrationError, RegistrationResult};

use super::function::{FnCommand, IntoReply};

/// Group assigned to commands that do not name one.
pub const DEFAULT_GROUP: &str = "default";

/// The immutable descriptor of a command.
///
/// Built with chained setters and handed to the registry together with the
/// code that runs it, either through a [`Command`](super::Command)
/// implementation or via [`handler`](Self::handler).
///
/// ```rust,ignore
/// let add = CommandDefinition::new("add-numbers")
///     .alias("add")
///     .description("Adds numbers together.")
///     .argument(ArgumentSpec::new("numbers", ArgumentType::String))
///     .handler(|_ctx, args: BoundArgs| async move {
///         let sum: f64 = args
///             .text("numbers")
///             .unwrap_or_default()
///             .split(' ')
///             .filter_map(|n| n.parse::<f64>().ok())
///             .sum();
///         format!("Sum: {sum}")
///     });
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDefinition {
    name: String,
    aliases: Vec<String>,
    description: String,
    group: String,
    arguments: Vec<ArgumentSpec>,
    unknown_fallback: bool,
    replaceable: bool,
    guild_only: bool,
    owner_only: bool,
    hidden: bool,
}

impl CommandDefinition {
    /// Creates a definition with the given name and no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: String::new(),
            group: DEFAULT_GROUP.to_string(),
            arguments: Vec::new(),
            unknown_fallback: false,
            replaceable: false,
            guild_only: false,
            owner_only: false,
            hidden: false,
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    /// Adds an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds several aliases.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Sets the description shown by help.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Appends an argument.
    pub fn argument(mut self, spec: ArgumentSpec) -> Self {
        self.arguments.push(spec);
        self
    }

    /// Appends several arguments in order.
    pub fn arguments(mut self, specs: impl IntoIterator<Item = ArgumentSpec>) -> Self {
        self.arguments.extend(specs);
        self
    }

    /// Marks this command as the unknown-command fallback.
    ///
    /// A fallback is never resolved by name. It receives the unmatched
    /// command token as its only raw argument.
    pub fn unknown_fallback(mut self) -> Self {
        self.unknown_fallback = true;
        self
    }

    /// Lets a later registration sharing a name or alias evict this command.
    pub fn replaceable(mut self) -> Self {
        self.replaceable = true;
        self
    }

    /// Restricts the command to messages sent inside a scope.
    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }

    /// Restricts the command to the configured owner.
    pub fn owner_only(mut self) -> Self {
        self.owner_only = true;
        self
    }

    /// Hides the command from help listings.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Pairs this definition with an async closure, producing a command.
    pub fn handler<F, Fut, R>(self, handler: F) -> FnCommand<F>
    where
        F: Fn(CommandContext, BoundArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoReply + 'static,
    {
        FnCommand::new(self, handler)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias_list(&self) -> &[String] {
        &self.aliases
    }

    pub fn description_text(&self) -> &str {
        &self.description
    }

    pub fn group_name(&self) -> &str {
        &self.group
    }

    pub fn argument_specs(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    pub fn is_unknown_fallback(&self) -> bool {
        self.unknown_fallback
    }

    /// Whether a later registration may replace this command.
    pub fn is_default(&self) -> bool {
        self.replaceable
    }

    pub fn is_guild_only(&self) -> bool {
        self.guild_only
    }

    pub fn is_owner_only(&self) -> bool {
        self.owner_only
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// The name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Returns `true` if `token` equals the name or an alias. Case-sensitive.
    pub fn matches(&self, token: &str) -> bool {
        self.names().any(|n| n == token)
    }

    /// Renders the argument list, `<key>` for required and `[key]` otherwise.
    pub fn usage(&self) -> String {
        self.arguments
            .iter()
            .map(|spec| {
                if spec.is_required() {
                    format!("<{}>", spec.key())
                } else {
                    format!("[{}]", spec.key())
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Checks naming and argument invariants.
    pub fn validate(&self) -> RegistrationResult<()> {
        let fail = |reason| Err(RegistrationError::malformed(&self.name, reason));

        if self.name.is_empty() {
            return fail(MalformedReason::EmptyName);
        }
        if self.aliases.iter().any(String::is_empty) {
            return fail(MalformedReason::EmptyAlias);
        }

        let mut seen_names = HashSet::new();
        for name in self.names() {
            if !seen_names.insert(name) {
                return fail(MalformedReason::RepeatedName {
                    name: name.to_string(),
                });
            }
        }

        let mut seen_keys = HashSet::new();
        let mut optional_seen = false;
        for spec in &self.arguments {
            if spec.types().is_empty() {
                return fail(MalformedReason::NoTypes {
                    key: spec.key().to_string(),
                });
            }
            if !seen_keys.insert(spec.key()) {
                return fail(MalformedReason::DuplicateKey {
                    key: spec.key().to_string(),
                });
            }
            if spec.is_optional() {
                optional_seen = true;
            } else if optional_seen {
                return fail(MalformedReason::RequiredAfterOptional {
                    key: spec.key().to_string(),
                });
            }
        }

        Ok(())
    }
}
