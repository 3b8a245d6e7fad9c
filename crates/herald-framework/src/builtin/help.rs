//! The default help command.
//!
//! `help <command>` describes one command; plain `help` lists the commands
//! the invoker may run, and `help all` lists every visible command. Output
//! is plain text sent to the invoker privately.

use std::fmt::Write as _;

use async_trait::async_trait;
use tracing::warn;

use crate::argument::{ArgumentSpec, ArgumentType};
use crate::binder::BoundArgs;
use crate::command::{Command, CommandDefinition};
use crate::context::CommandContext;
use crate::error::BoxError;

/// Argument value that lists commands regardless of permissions.
const LIST_ALL: &str = "all";

#[derive(Debug, Clone)]
pub struct HelpCommand {
    definition: CommandDefinition,
}

impl Default for HelpCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpCommand {
    pub fn new() -> Self {
        Self {
            definition: CommandDefinition::new("help")
                .aliases(["h", "commands", "cmds"])
                .description("Lists commands, or describes the one given.")
                .replaceable()
                .argument(ArgumentSpec::new("command", ArgumentType::String).optional()),
        }
    }

    /// Details for a single command.
    fn describe(prefix: &str, def: &CommandDefinition) -> String {
        let mut out = format!("Command {}: {}", def.name(), def.description_text());
        if def.is_guild_only() {
            out.push_str(" (usable only in guilds)");
        }

        let usage = def.usage();
        let format_line = if usage.is_empty() {
            format!("{prefix}{}", def.name())
        } else {
            format!("{prefix}{} {usage}", def.name())
        };
        let _ = write!(out, "\nFormat: {format_line}");

        let aliases = if def.alias_list().is_empty() {
            "None".to_string()
        } else {
            def.alias_list().join(", ")
        };
        let _ = write!(out, "\nAliases: {aliases}");
        out
    }

    /// The listing of commands visible to the invoker.
    async fn list(ctx: &CommandContext, everything: bool) -> String {
        let prefix = ctx.settings().prefixes().primary();
        let guild = ctx.scope().map(|s| s.name().to_string());

        let mut out = format!(
            "To run a command in {}, use {prefix}command. For example, {prefix}help.\n",
            guild.as_deref().unwrap_or("a guild")
        );
        out.push_str("In a private conversation the prefix can be left out.\n\n");
        out.push_str("Use help all to list every command, not just the available ones.\n\n");
        match &guild {
            Some(name) => {
                let _ = writeln!(out, "Available commands in {name}:");
            }
            None => out.push_str("Available commands:\n"),
        }

        for command in ctx.registry().iter() {
            let def = command.definition();
            if def.is_unknown_fallback() || def.is_hidden() {
                continue;
            }
            if def.is_owner_only() && !ctx.is_owner() {
                continue;
            }
            if !everything && !command.has_permission(ctx).await.is_granted() {
                continue;
            }
            let _ = writeln!(out, "{}: {}", def.name(), def.description_text());
        }
        out
    }
}

#[async_trait]
impl Command for HelpCommand {
    fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    async fn run(&self, ctx: &CommandContext, args: BoundArgs) -> Result<(), BoxError> {
        let requested = args.text("command");

        let described = requested
            .and_then(|name| ctx.registry().find(name))
            .filter(|c| !c.definition().is_hidden() && ctx.can_use(c.definition()));

        let text = match described {
            Some(command) => {
                Self::describe(ctx.settings().prefixes().primary(), command.definition())
            }
            None => Self::list(ctx, requested == Some(LIST_ALL)).await,
        };

        if let Err(e) = ctx.send_direct(&text).await {
            warn!(error = %e, "Failed to deliver help text");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::ArgumentTypeRegistry;
    use crate::builtin::UnknownCommand;
    use crate::command::CommandRegistry;
    use crate::context::DispatchSettings;
    use crate::dispatcher::Dispatcher;
    use crate::mock::MockMessage;
    use herald_core::Author;

    fn dispatcher() -> Dispatcher {
        let mut registry = CommandRegistry::new();
        registry.register(HelpCommand::new()).unwrap();
        registry.register(UnknownCommand::new()).unwrap();
        registry
            .register(
                CommandDefinition::new("add-numbers")
                    .alias("add")
                    .description("Adds numbers together.")
                    .guild_only()
                    .argument(ArgumentSpec::new("numbers", ArgumentType::String))
                    .argument(ArgumentSpec::new("note", ArgumentType::String).optional())
                    .handler(|_ctx: CommandContext, _args: BoundArgs| async {}),
            )
            .unwrap();
        registry
            .register(
                CommandDefinition::new("secret")
                    .hidden()
                    .handler(|_ctx: CommandContext, _args: BoundArgs| async {}),
            )
            .unwrap();
        registry
            .register(
                CommandDefinition::new("shutdown")
                    .description("Stops the bot.")
                    .owner_only()
                    .handler(|_ctx: CommandContext, _args: BoundArgs| async {}),
            )
            .unwrap();
        registry
            .register(
                CommandDefinition::new("no-permission")
                    .description("You cannot run this.")
                    .handler(|_ctx: CommandContext, _args: BoundArgs| async {})
                    .permission(|_ctx: &CommandContext| false),
            )
            .unwrap();
        Dispatcher::new(
            registry,
            ArgumentTypeRegistry::new(),
            DispatchSettings::new(["?", "!"]).with_owner("1"),
        )
    }

    #[tokio::test]
    async fn test_describe_one_command() {
        let d = dispatcher();
        let msg = MockMessage::guild("?help add").shared();
        assert!(d.dispatch(msg.clone()).await.is_completed());

        assert!(msg.replies().is_empty());
        assert_eq!(
            msg.directs(),
            ["Command add-numbers: Adds numbers together. (usable only in guilds)\n\
              Format: ?add-numbers <numbers> [note]\n\
              Aliases: add"]
        );
    }

    #[tokio::test]
    async fn test_listing_filters_by_permission() {
        let d = dispatcher();
        let msg = MockMessage::guild("!h").shared();
        d.dispatch(msg.clone()).await;

        let text = msg.directs().remove(0);
        assert!(text.contains("Available commands in Test Guild:"));
        assert!(text.contains("help: "));
        assert!(text.contains("add-numbers: Adds numbers together."));
        assert!(!text.contains("secret"));
        assert!(!text.contains("unknown:"));
        assert!(!text.contains("no-permission:"));
    }

    #[tokio::test]
    async fn test_listing_all_skips_permission_filter() {
        let d = dispatcher();
        let msg = MockMessage::private("commands all").shared();
        d.dispatch(msg.clone()).await;

        let text = msg.directs().remove(0);
        assert!(text.contains("Available commands:\n"));
        assert!(text.contains("no-permission: You cannot run this."));
        assert!(!text.contains("secret"));
    }

    #[tokio::test]
    async fn test_unknown_name_falls_back_to_listing() {
        let d = dispatcher();
        let msg = MockMessage::guild("?help nothing-here").shared();
        d.dispatch(msg.clone()).await;
        assert!(msg.directs()[0].starts_with("To run a command in Test Guild"));
    }

    #[tokio::test]
    async fn test_unreachable_commands_are_not_described() {
        let d = dispatcher();

        for content in ["?help shutdown", "?help secret"] {
            let msg = MockMessage::guild(content).shared();
            d.dispatch(msg.clone()).await;
            let text = msg.directs().remove(0);
            assert!(text.starts_with("To run a command in Test Guild"));
            assert!(!text.contains("shutdown"));
            assert!(!text.contains("secret"));
        }

        let msg = MockMessage::private("help add-numbers").shared();
        d.dispatch(msg.clone()).await;
        assert!(!msg.directs()[0].contains("Format: ?add-numbers"));

        let msg = MockMessage::guild("?help shutdown")
            .by(Author::new("1", "owner"))
            .shared();
        d.dispatch(msg.clone()).await;
        assert_eq!(
            msg.directs(),
            ["Command shutdown: Stops the bot.\nFormat: ?shutdown\nAliases: None"]
        );
    }

    #[tokio::test]
    async fn test_help_is_replaceable() {
        let mut registry = CommandRegistry::new();
        registry.register(HelpCommand::new()).unwrap();
        registry
            .register(
                CommandDefinition::new("help")
                    .handler(|_ctx: CommandContext, _args: BoundArgs| async { "custom help" }),
            )
            .unwrap();
        let d = Dispatcher::new(registry, ArgumentTypeRegistry::new(), DispatchSettings::new("?"));

        let msg = MockMessage::guild("?help").shared();
        d.dispatch(msg.clone()).await;
        assert_eq!(msg.replies(), ["custom help"]);
        assert!(d.registry().find("cmds").is_none());
    }
}
