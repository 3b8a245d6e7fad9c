//! In-memory message double shared by the framework's tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use herald_core::{
    Author, ChannelKind, IncomingMessage, Member, ReplyError, ReplyResult, Scope, StaticScope,
};

pub(crate) struct MockMessage {
    content: String,
    author: Author,
    kind: ChannelKind,
    scope: Option<StaticScope>,
    fail_replies: bool,
    replies: Mutex<Vec<String>>,
    directs: Mutex<Vec<String>>,
}

impl MockMessage {
    /// A message posted in a guild holding member `42` ("alice").
    pub(crate) fn guild(content: &str) -> Self {
        Self {
            content: content.to_string(),
            author: Author::new("7", "bob"),
            kind: ChannelKind::Guild,
            scope: Some(StaticScope::new("g1", "Test Guild").with_member(Member::new("42", "alice"))),
            fail_replies: false,
            replies: Mutex::new(Vec::new()),
            directs: Mutex::new(Vec::new()),
        }
    }

    /// A one-to-one message with no scope.
    pub(crate) fn private(content: &str) -> Self {
        Self {
            kind: ChannelKind::Private,
            scope: None,
            ..Self::guild(content)
        }
    }

    pub(crate) fn by(mut self, author: Author) -> Self {
        self.author = author;
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail_replies = true;
        self
    }

    pub(crate) fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub(crate) fn replies(&self) -> Vec<String> {
        self.replies.lock().clone()
    }

    pub(crate) fn directs(&self) -> Vec<String> {
        self.directs.lock().clone()
    }
}

#[async_trait]
impl IncomingMessage for MockMessage {
    fn content(&self) -> &str {
        &self.content
    }

    fn author(&self) -> &Author {
        &self.author
    }

    fn channel_kind(&self) -> ChannelKind {
        self.kind
    }

    fn scope(&self) -> Option<&dyn Scope> {
        self.scope.as_ref().map(|s| s as &dyn Scope)
    }

    async fn reply(&self, text: &str) -> ReplyResult<()> {
        if self.fail_replies {
            return Err(ReplyError::NotConnected);
        }
        self.replies.lock().push(text.to_string());
        Ok(())
    }

    async fn send_direct(&self, text: &str) -> ReplyResult<()> {
        if self.fail_replies {
            return Err(ReplyError::NotConnected);
        }
        self.directs.lock().push(text.to_string());
        Ok(())
    }
}
