//! Console Bot Example
//!
//! Every line typed on stdin is treated as a chat message from one user and
//! run through the Herald command engine. Replies are printed to stdout.
//!
//! # Usage
//!
//! ```bash
//! # private conversation: the prefix is optional
//! cargo run --package console-bot
//!
//! # pretend to be in a guild with a couple of members
//! cargo run --package console-bot -- --guild --prefix c. --prefix c!
//! ```
//!
//! Then try `help`, `c.add 1 2 3`, `c!whois <@42>`, `throw` or `nope`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use herald::core::StaticScope;
use herald::prelude::*;
use herald::runtime::config::LogLevel;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Parser)]
#[command(about = "Talk to a Herald bot from the terminal")]
struct Args {
    /// Configuration file (defaults to herald.toml / config.toml lookup).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Command prefix; repeat for several. Overrides the configuration.
    #[arg(short, long)]
    prefix: Vec<String>,

    /// Owner user id. Overrides the configuration.
    #[arg(long)]
    owner: Option<String>,

    /// Your user id.
    #[arg(long, default_value = "1")]
    user: String,

    /// Your display name.
    #[arg(long, default_value = "console")]
    name: String,

    /// Post messages in a simulated guild instead of a private conversation.
    #[arg(long)]
    guild: bool,

    /// Log at debug level.
    #[arg(short, long)]
    debug: bool,
}

// ============================================================================
// Console message
// ============================================================================

struct ConsoleMessage {
    content: String,
    author: Author,
    scope: Option<Arc<StaticScope>>,
}

#[async_trait]
impl IncomingMessage for ConsoleMessage {
    fn content(&self) -> &str {
        &self.content
    }

    fn author(&self) -> &Author {
        &self.author
    }

    fn channel_kind(&self) -> ChannelKind {
        if self.scope.is_some() {
            ChannelKind::Guild
        } else {
            ChannelKind::Private
        }
    }

    fn scope(&self) -> Option<&dyn Scope> {
        self.scope.as_deref().map(|s| s as &dyn Scope)
    }

    async fn reply(&self, text: &str) -> ReplyResult<()> {
        println!("{text}");
        Ok(())
    }

    async fn send_direct(&self, text: &str) -> ReplyResult<()> {
        println!("[dm to {}]\n{text}", self.author.name);
        Ok(())
    }
}

fn demo_guild(user: &Author) -> StaticScope {
    StaticScope::new("demo", "Console Guild")
        .with_member(Member::new(user.id.clone(), user.name.clone()))
        .with_member(Member::new("42", "alice"))
        .with_member(Member::new("43", "bob"))
}

// ============================================================================
// Commands
// ============================================================================

fn numbers(args: &BoundArgs) -> Vec<f64> {
    args.text("numbers")
        .unwrap_or_default()
        .split(' ')
        .filter_map(|n| n.parse().ok())
        .collect()
}

fn add_numbers() -> impl Command {
    CommandDefinition::new("add-numbers")
        .aliases(["add", "sum"])
        .description("Adds numbers together.")
        .group("math")
        .argument(ArgumentSpec::new("numbers", ArgumentType::String).prompt("Which numbers?"))
        .handler(|_ctx: CommandContext, args: BoundArgs| async move {
            let sum: f64 = numbers(&args).iter().sum();
            format!("Sum: {sum}")
        })
}

fn multiply_numbers() -> impl Command {
    CommandDefinition::new("multiply-numbers")
        .aliases(["multiply", "mul"])
        .description("Multiplies numbers together.")
        .group("math")
        .argument(ArgumentSpec::new("numbers", ArgumentType::String))
        .handler(|_ctx: CommandContext, args: BoundArgs| async move {
            let product: f64 = numbers(&args).iter().product();
            format!("Product: {product}")
        })
}

fn echo() -> impl Command {
    CommandDefinition::new("echo")
        .description("Repeats what you said.")
        .argument(
            ArgumentSpec::new("text", ArgumentType::String)
                .default_value("...")
                .prompt("What should I repeat?"),
        )
        .handler(|_ctx: CommandContext, args: BoundArgs| async move {
            args.text("text").unwrap_or("...").to_string()
        })
}

fn whois() -> impl Command {
    CommandDefinition::new("whois")
        .description("Looks up a guild member by mention, or echoes a number.")
        .guild_only()
        .argument(
            ArgumentSpec::union("target", [ArgumentType::User, ArgumentType::Number])
                .prompt("Mention someone, e.g. <@42>."),
        )
        .handler(|_ctx: CommandContext, args: BoundArgs| async move {
            match (args.user("target"), args.number("target")) {
                (Some(member), _) => format!("That is {member}."),
                (None, Some(n)) => format!("{n} is a number, not a member."),
                (None, None) => "Nobody.".to_string(),
            }
        })
}

fn throw() -> impl Command {
    CommandDefinition::new("throw")
        .description("Always fails, to show error containment.")
        .handler(|_ctx: CommandContext, _args: BoundArgs| async {
            Err::<(), _>("this command always fails")
        })
}

fn no_permission() -> impl Command {
    CommandDefinition::new("no-permission")
        .description("Nobody may run this.")
        .handler(|_ctx: CommandContext, _args: BoundArgs| async { "unreachable" })
        .permission(|_ctx: &CommandContext| "You will never be allowed to run this.")
}

fn whoami() -> impl Command {
    CommandDefinition::new("whoami")
        .description("Shows who the bot thinks you are.")
        .owner_only()
        .handler(|ctx: CommandContext, _args: BoundArgs| async move {
            format!("You are {} ({}), the owner.", ctx.author().name, ctx.author().id)
        })
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    let mut config = loader.load()?;
    if !args.prefix.is_empty() {
        config.commands.prefix = args.prefix.clone().into();
    }
    if args.owner.is_some() {
        config.commands.owner_id.clone_from(&args.owner);
    }
    if args.debug {
        config.logging.level = LogLevel::Debug;
    }

    let client = ClientBuilder::from_config(&config)
        .register(add_numbers())?
        .register(multiply_numbers())?
        .register(echo())?
        .register(whois())?
        .register(throw())?
        .register(no_permission())?
        .register(whoami())?
        .register_default_commands()?
        .build();

    let mut events = client.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                DispatchEvent::CommandFailed { command, error } => {
                    warn!(%command, %error, "Command failed");
                }
                other => debug!(?other, "Dispatch event"),
            }
        }
    });

    let author = Author::new(args.user.clone(), args.name.clone());
    let scope = args.guild.then(|| Arc::new(demo_guild(&author)));

    info!(
        prefixes = %config.commands.prefix,
        guild = args.guild,
        commands = ?client.registry().names(),
        "Console bot ready, type a message"
    );

    let (tx, rx) = mpsc::channel::<BoxedMessage>(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let message = ConsoleMessage {
                        content: line,
                        author: author.clone(),
                        scope: scope.clone(),
                    };
                    if tx.send(Arc::new(message)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
    });

    client.run(rx).await?;
    info!(stats = %client.stats(), "Bye");
    Ok(())
}
