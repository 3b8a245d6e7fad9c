//! Prefix stripping and token splitting.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered list of command prefixes.
///
/// Prefixes are tested in order and the first match wins, so list more
/// specific prefixes before their own prefixes (`"!!"` before `"!"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PrefixSetting", into = "Vec<String>")]
pub struct Prefixes(Vec<String>);

/// Accepts either a single prefix string or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum PrefixSetting {
    One(String),
    Many(Vec<String>),
}

impl From<PrefixSetting> for Prefixes {
    fn from(setting: PrefixSetting) -> Self {
        match setting {
            PrefixSetting::One(p) => Self(vec![p]),
            PrefixSetting::Many(ps) => Self(ps),
        }
    }
}

impl From<Prefixes> for Vec<String> {
    fn from(prefixes: Prefixes) -> Self {
        prefixes.0
    }
}

impl Prefixes {
    /// Creates a prefix list from anything yielding strings.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(prefixes.into_iter().map(Into::into).collect())
    }

    /// The first configured prefix, used when showing usage.
    pub fn primary(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or_default()
    }

    /// Iterates over prefixes in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of configured prefixes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no prefix is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the first prefix `content` starts with.
    pub fn matching(&self, content: &str) -> Option<&str> {
        self.iter().find(|p| content.starts_with(p))
    }
}

impl From<&str> for Prefixes {
    fn from(prefix: &str) -> Self {
        Self(vec![prefix.to_string()])
    }
}

impl From<String> for Prefixes {
    fn from(prefix: String) -> Self {
        Self(vec![prefix])
    }
}

impl From<Vec<String>> for Prefixes {
    fn from(prefixes: Vec<String>) -> Self {
        Self(prefixes)
    }
}

impl<const N: usize> From<[&str; N]> for Prefixes {
    fn from(prefixes: [&str; N]) -> Self {
        Self::new(prefixes)
    }
}

impl fmt::Display for Prefixes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// A message split into prefix, command token and raw argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    /// The prefix that was stripped; empty for unprefixed private messages.
    pub prefix: String,
    /// The first token after the prefix.
    pub command: String,
    /// Every remaining token, in order.
    pub args: Vec<String>,
}

/// Splits message text into [`Tokens`] using a prefix list.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    prefixes: Prefixes,
}

impl Tokenizer {
    /// Creates a tokenizer for the given prefixes.
    pub fn new(prefixes: impl Into<Prefixes>) -> Self {
        Self {
            prefixes: prefixes.into(),
        }
    }

    /// The configured prefixes.
    pub fn prefixes(&self) -> &Prefixes {
        &self.prefixes
    }

    /// Tokenizes `content`.
    ///
    /// Returns `None` when the message carries no prefix outside a private
    /// conversation, or when nothing follows the prefix. In private
    /// conversations a configured prefix is still stripped when present.
    ///
    /// The text after the prefix is trimmed and split on single spaces;
    /// repeated spaces yield empty tokens.
    pub fn tokenize(&self, content: &str, private: bool) -> Option<Tokens> {
        let prefix = match self.prefixes.matching(content) {
            Some(p) => p,
            None if private => "",
            None => return None,
        };

        let body = content[prefix.len()..].trim();
        if body.is_empty() {
            return None;
        }

        let mut parts = body.split(' ');
        let command = parts.next().unwrap_or_default().to_string();

        Some(Tokens {
            prefix: prefix.to_string(),
            command,
            args: parts.map(str::to_string).collect(),
        })
    }
}
