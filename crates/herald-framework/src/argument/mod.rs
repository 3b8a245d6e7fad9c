//! Argument declarations and resolved argument values.
//!
//! A command declares its arguments as an ordered list of [`ArgumentSpec`]s.
//! Each spec names one or more [`ArgumentType`]s; during binding the types
//! are tried in declared order and the first one whose resolver accepts the
//! raw token produces the [`ArgValue`] stored under the spec's key.
//!
//! ```rust,ignore
//! use herald_framework::{ArgumentSpec, ArgumentType};
//!
//! // `target` accepts a mention first, then falls back to a raw number.
//! let target = ArgumentSpec::union("target", [ArgumentType::User, ArgumentType::Number])
//!     .prompt("Who should I look up?");
//!
//! // `reason` may be left out entirely.
//! let reason = ArgumentSpec::new("reason", ArgumentType::String).optional();
//! ```

pub mod registry;

use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use herald_core::Member;

pub use registry::{ArgumentTypeRegistry, BoxedResolver, TypeResolver, parse_mention};

/// The declared type of an argument.
///
/// The three built-in types are closed variants; anything else is a
/// [`Custom`](Self::Custom) name that must be registered on the
/// [`ArgumentTypeRegistry`] before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgumentType {
    /// Accepts any token unchanged.
    String,
    /// Accepts tokens that parse as a finite number.
    Number,
    /// Accepts a member mention (`<@id>` or `<@!id>`) resolvable in the scope.
    User,
    /// A caller-registered type.
    Custom(Cow<'static, str>),
}

impl ArgumentType {
    /// Creates a custom type reference.
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(name.into())
    }

    /// Returns the registry name of this type.
    pub fn name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::User => "user",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArgumentType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "string" => Self::String,
            "number" => Self::Number,
            "user" => Self::User,
            other => Self::Custom(Cow::Owned(other.to_string())),
        })
    }
}

/// The declaration of one command argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentSpec {
    key: String,
    types: Vec<ArgumentType>,
    optional: bool,
    default: Option<String>,
    prompt: Option<String>,
}

impl ArgumentSpec {
    /// Creates a required argument of a single type.
    pub fn new(key: impl Into<String>, ty: ArgumentType) -> Self {
        Self::union(key, [ty])
    }

    /// Creates a required argument accepting several types, tried in order.
    pub fn union(key: impl Into<String>, types: impl IntoIterator<Item = ArgumentType>) -> Self {
        Self {
            key: key.into(),
            types: types.into_iter().collect(),
            optional: false,
            default: None,
            prompt: None,
        }
    }

    /// Marks the argument as optional.
    ///
    /// Optional arguments may only be followed by other optional arguments.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Sets the literal used when the argument is not supplied.
    ///
    /// The literal goes through the same type resolution as user input.
    pub fn default_value(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Sets the text shown to the invoker when binding this argument fails.
    pub fn prompt(mut self, text: impl Into<String>) -> Self {
        self.prompt = Some(text.into());
        self
    }

    /// The key the bound value is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Declared types in trial order.
    pub fn types(&self) -> &[ArgumentType] {
        &self.types
    }

    /// Whether the argument was marked optional.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// The default literal, if any.
    pub fn default_literal(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// The prompt text, if any.
    pub fn prompt_text(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// An argument is required when it is neither optional nor defaulted.
    pub fn is_required(&self) -> bool {
        !self.optional && self.default.is_none()
    }
}

/// A resolved argument value.
///
/// Serializes untagged, so a bound argument set renders as a plain JSON
/// object for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// Output of the `string` type.
    Text(String),
    /// Output of the `number` type.
    Number(f64),
    /// Output of the `user` type.
    User(Member),
    /// Output of custom resolvers.
    Json(serde_json::Value),
    /// An optional argument that was not supplied and has no default.
    Empty,
}

impl ArgValue {
    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number, if this is a numeric value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the member, if this is a user value.
    pub fn as_user(&self) -> Option<&Member> {
        match self {
            Self::User(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the JSON payload, if this came from a custom resolver.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` for [`ArgValue::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::User(m) => f.write_str(&m.mention()),
            Self::Json(v) => write!(f, "{v}"),
            Self::Empty => Ok(()),
        }
    }
}
