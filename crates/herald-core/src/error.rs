//! Error types shared by the Herald collaborator contracts.
//!
//! Engine-level errors (registration and binding failures) live in
//! `herald-framework`; this module only covers what a platform integration
//! can report back through [`IncomingMessage`](crate::IncomingMessage).

use thiserror::Error;

/// Errors that can occur while delivering a reply or direct message.
#[derive(Debug, Clone, Error)]
pub enum ReplyError {
    /// The platform connection is gone.
    #[error("not connected")]
    NotConnected,

    /// The target channel or user cannot receive messages.
    #[error("cannot deliver to '{target}': {reason}")]
    Undeliverable {
        /// The channel or user the message was addressed to.
        target: String,
        /// Reason reported by the platform.
        reason: String,
    },

    /// The platform rejected the message.
    #[error("failed to send message: {0}")]
    SendFailed(String),
}

impl ReplyError {
    /// Creates a send failure from any displayable error.
    pub fn send_failed(msg: impl Into<String>) -> Self {
        Self::SendFailed(msg.into())
    }
}

/// Result type for reply operations.
pub type ReplyResult<T> = Result<T, ReplyError>;
