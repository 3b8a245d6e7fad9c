//! The incoming-message contract.
//!
//! Everything the engine needs from a platform message is expressed by
//! [`IncomingMessage`]: the raw text, who wrote it, where it was written and
//! a way to answer. Platform integrations implement this trait once; the
//! engine never sees the platform's own message type.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ReplyResult;
use crate::scope::Scope;

/// The kind of conversation a message was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// One-to-one conversation with the bot.
    Private,
    /// Multi-user conversation outside any guild.
    Group,
    /// Channel inside a guild.
    Guild,
}

impl ChannelKind {
    /// Returns `true` for one-to-one conversations, where the prefix is optional.
    pub fn is_private(self) -> bool {
        matches!(self, Self::Private)
    }

    /// Returns the kind as a lowercase string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Group => "group",
            Self::Guild => "guild",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The author of an incoming message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    /// Platform user id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the author is an automated account.
    #[serde(default)]
    pub bot: bool,
}

impl Author {
    /// Creates a human author.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bot: false,
        }
    }

    /// Creates an automated author.
    pub fn bot(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bot: true,
            ..Self::new(id, name)
        }
    }
}

/// A message received from a platform, as seen by the engine.
///
/// # Example
///
/// ```rust,ignore
/// struct ConsoleMessage { text: String, author: Author }
///
/// #[async_trait]
/// impl IncomingMessage for ConsoleMessage {
///     fn content(&self) -> &str { &self.text }
///     fn author(&self) -> &Author { &self.author }
///     fn channel_kind(&self) -> ChannelKind { ChannelKind::Private }
///     fn scope(&self) -> Option<&dyn Scope> { None }
///
///     async fn reply(&self, text: &str) -> ReplyResult<()> {
///         println!("{text}");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait IncomingMessage: Send + Sync {
    /// The raw text of the message.
    fn content(&self) -> &str;

    /// Who wrote the message.
    fn author(&self) -> &Author;

    /// Where the message was written.
    fn channel_kind(&self) -> ChannelKind;

    /// The guild-like scope the message belongs to, if any.
    fn scope(&self) -> Option<&dyn Scope>;

    /// Replies in the conversation the message came from.
    async fn reply(&self, text: &str) -> ReplyResult<()>;

    /// Sends a message straight to the author.
    ///
    /// Platforms without direct messages can keep the default, which replies
    /// in place.
    async fn send_direct(&self, text: &str) -> ReplyResult<()> {
        self.reply(text).await
    }
}

impl fmt::Debug for dyn IncomingMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingMessage")
            .field("content", &self.content())
            .field("author", self.author())
            .field("channel_kind", &self.channel_kind())
            .field("scope", &self.scope().map(|s| s.id()))
            .finish()
    }
}

/// Type alias for a shared, type-erased message.
pub type BoxedMessage = Arc<dyn IncomingMessage>;
