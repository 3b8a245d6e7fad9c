//! The default unknown-command fallback.

use async_trait::async_trait;
use tracing::warn;

use crate::argument::{ArgumentSpec, ArgumentType};
use crate::binder::BoundArgs;
use crate::command::{Command, CommandDefinition};
use crate::context::CommandContext;
use crate::error::BoxError;

/// Replies ``Unknown command `name`.`` to anything that did not resolve.
#[derive(Debug, Clone)]
pub struct UnknownCommand {
    definition: CommandDefinition,
}

impl Default for UnknownCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl UnknownCommand {
    pub fn new() -> Self {
        Self {
            definition: CommandDefinition::new("unknown")
                .description("Acts as a response to unknown commands.")
                .unknown_fallback()
                .replaceable()
                .argument(
                    ArgumentSpec::new("commandName", ArgumentType::String)
                        .prompt("What command are you wanting to run?"),
                ),
        }
    }
}

#[async_trait]
impl Command for UnknownCommand {
    fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    async fn run(&self, ctx: &CommandContext, args: BoundArgs) -> Result<(), BoxError> {
        let name = args.text("commandName").unwrap_or(ctx.command_token());
        if let Err(e) = ctx.reply(&format!("Unknown command `{name}`.")).await {
            warn!(error = %e, "Failed to deliver unknown command reply");
        }
        Ok(())
    }
}
