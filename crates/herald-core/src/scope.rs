//! Resolution scopes.
//!
//! A [`Scope`] is the opaque handle a platform hands the engine alongside a
//! message, typically the guild or server the message was posted in. The
//! engine never inspects it beyond the methods below: argument resolvers use
//! it to look members up, and the dispatcher uses its presence to decide
//! whether a message came from inside a guild.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A member of a scope, as resolved from a mention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    /// Platform user id.
    pub id: String,
    /// Name shown in the scope.
    pub display_name: String,
    /// Whether this member is an automated account.
    #[serde(default)]
    pub bot: bool,
}

impl Member {
    /// Creates a human member.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            bot: false,
        }
    }

    /// Returns the platform mention syntax for this member.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id)
    }
}

/// The contextual handle passed to type resolvers and permission checks.
pub trait Scope: Send + Sync {
    /// Stable identifier of the scope.
    fn id(&self) -> &str;

    /// Human readable name of the scope.
    fn name(&self) -> &str;

    /// Looks a member up by user id.
    fn member(&self, user_id: &str) -> Option<Member>;
}

impl fmt::Debug for dyn Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Type alias for a shared scope handle.
pub type BoxedScope = Arc<dyn Scope>;

/// A fixed, in-memory scope.
///
/// Useful for tests and for platforms that ship a member snapshot with every
/// message.
#[derive(Debug, Clone, Default)]
pub struct StaticScope {
    id: String,
    name: String,
    members: Vec<Member>,
}

impl StaticScope {
    /// Creates an empty scope.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Adds a member (builder pattern).
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }
}

impl Scope for StaticScope {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn member(&self, user_id: &str) -> Option<Member> {
        self.members.iter().find(|m| m.id == user_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_scope_lookup() {
        let scope = StaticScope::new("g1", "Guild").with_member(Member::new("42", "alice"));
        assert_eq!(scope.member("42").unwrap().display_name, "alice");
        assert!(scope.member("43").is_none());
    }

    #[test]
    fn test_member_mention() {
        assert_eq!(Member::new("7", "bob").mention(), "<@7>");
    }
}
