//! Argument binding.
//!
//! Binding turns the raw tokens that followed a command name into a
//! [`BoundArgs`] set, in two stages:
//!
//! 1. **Reformatting** - when more tokens than declared slots were supplied,
//!    everything from the last slot onward is rejoined with single spaces so
//!    the final argument swallows the rest of the message. Too few tokens for
//!    the required arguments fails with
//!    [`BindError::InsufficientArguments`].
//! 2. **Resolution** - each spec is resolved in declared order by trying its
//!    types one after another. The first optional (or defaulted) argument
//!    left unsupplied ends validation: it and every later argument are bound
//!    without type checks.

use serde::Serialize;
use tracing::trace;

use herald_core::{Member, Scope};

use crate::argument::{ArgValue, ArgumentSpec, ArgumentTypeRegistry};
use crate::error::{BindError, BindResult};

/// The bound arguments of one invocation, keyed by argument key.
///
/// Keeps declaration order; serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    values: Vec<(String, ArgValue)>,
}

impl BoundArgs {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing an earlier value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: ArgValue) {
        let key = key.into();
        match self.values.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((key, value)),
        }
    }

    /// Returns the value bound to `key`.
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the text bound to `key`.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ArgValue::as_text)
    }

    /// Returns the number bound to `key`.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ArgValue::as_number)
    }

    /// Returns the member bound to `key`.
    pub fn user(&self, key: &str) -> Option<&Member> {
        self.get(key).and_then(ArgValue::as_user)
    }

    /// Returns `true` if `key` is bound to a non-empty value.
    pub fn is_present(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }

    /// Iterates over `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of bound keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Renders the set as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl Serialize for BoundArgs {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (k, v) in &self.values {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Number of arguments the invoker must supply.
pub fn required_count(specs: &[ArgumentSpec]) -> usize {
    specs.iter().filter(|s| s.is_required()).count()
}

/// Reshapes `raw` so it has at most one token per declared slot.
///
/// Surplus tokens are joined onto the last slot with single spaces. Commands
/// declaring no arguments get their tokens back untouched.
pub fn reformat(specs: &[ArgumentSpec], raw: &[String]) -> Vec<String> {
    if specs.is_empty() || raw.len() <= specs.len() {
        return raw.to_vec();
    }

    let last = specs.len() - 1;
    let mut tokens = raw[..last].to_vec();
    tokens.push(raw[last..].join(" "));
    tokens
}

/// Binds raw tokens to argument specs using a type registry.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentBinder<'a> {
    types: &'a ArgumentTypeRegistry,
}

impl<'a> ArgumentBinder<'a> {
    /// Creates a binder resolving through `types`.
    pub fn new(types: &'a ArgumentTypeRegistry) -> Self {
        Self { types }
    }

    /// Binds `raw` against `specs`.
    ///
    /// Every spec receives a value on success: the resolved token, the
    /// resolved default, or [`ArgValue::Empty`].
    pub fn bind(
        &self,
        specs: &[ArgumentSpec],
        raw: &[String],
        scope: Option<&dyn Scope>,
    ) -> BindResult<BoundArgs> {
        let required = required_count(specs);
        if raw.len() < required {
            return Err(BindError::InsufficientArguments { required });
        }

        let tokens = reformat(specs, raw);
        let mut bound = BoundArgs::new();
        let mut validating = true;

        for (index, spec) in specs.iter().enumerate() {
            let token = tokens.get(index).map(String::as_str);
            let supplied = token.filter(|t| !t.is_empty());

            if !validating {
                let value = match supplied {
                    Some(t) => self
                        .types
                        .resolve_first(spec.types(), t, scope)
                        .unwrap_or(ArgValue::Empty),
                    None => self.fallback(spec, scope),
                };
                bound.insert(spec.key(), value);
                continue;
            }

            if supplied.is_none() && !spec.is_required() {
                trace!(key = spec.key(), "Unsupplied optional argument ends validation");
                validating = false;
                bound.insert(spec.key(), self.fallback(spec, scope));
                continue;
            }

            // A required slot can only be short here when a defaulted
            // argument sits in front of it.
            let Some(token) = token else {
                return Err(BindError::InsufficientArguments { required });
            };

            match self.types.resolve_first(spec.types(), token, scope) {
                Some(value) => bound.insert(spec.key(), value),
                None => {
                    return Err(BindError::ArgumentTypeMismatch {
                        key: spec.key().to_string(),
                        token: token.to_string(),
                    });
                }
            }
        }

        Ok(bound)
    }

    /// Value for an argument that was not supplied.
    fn fallback(&self, spec: &ArgumentSpec, scope: Option<&dyn Scope>) -> ArgValue {
        match spec.default_literal() {
            Some(literal) => self
                .types
                .resolve_first(spec.types(), literal, scope)
                .unwrap_or_else(|| ArgValue::Text(literal.to_string())),
            None => ArgValue::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::ArgumentType;
    use herald_core::StaticScope;

    fn raw(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn bind(specs: &[ArgumentSpec], tokens: &[&str]) -> BindResult<BoundArgs> {
        let types = ArgumentTypeRegistry::new();
        ArgumentBinder::new(&types).bind(specs, &raw(tokens), None)
    }

    #[test]
    fn test_trailing_tokens_are_rejoined() {
        let specs = [ArgumentSpec::new("numbers", ArgumentType::String)];
        let bound = bind(&specs, &["1", "2", "3"]).unwrap();
        assert_eq!(bound.text("numbers"), Some("1 2 3"));
    }

    #[test]
    fn test_reformat_only_touches_last_slot() {
        let specs = [
            ArgumentSpec::new("target", ArgumentType::String),
            ArgumentSpec::new("reason", ArgumentType::String),
        ];
        assert_eq!(
            reformat(&specs, &raw(&["bob", "being", "rude"])),
            raw(&["bob", "being rude"])
        );
        assert_eq!(reformat(&specs, &raw(&["bob"])), raw(&["bob"]));
        assert_eq!(reformat(&[], &raw(&["a", "b"])), raw(&["a", "b"]));
    }

    #[test]
    fn test_reformat_keeps_empty_tokens() {
        let specs = [ArgumentSpec::new("phrase", ArgumentType::String)];
        assert_eq!(reformat(&specs, &raw(&["a", "", "b"])), raw(&["a  b"]));
    }

    #[test]
    fn test_insufficient_reports_required_count() {
        let specs = [
            ArgumentSpec::new("a", ArgumentType::Number),
            ArgumentSpec::new("b", ArgumentType::Number),
            ArgumentSpec::new("c", ArgumentType::Number).optional(),
        ];
        assert_eq!(
            bind(&specs, &["1"]),
            Err(BindError::InsufficientArguments { required: 2 })
        );
    }

    #[test]
    fn test_type_mismatch_names_token() {
        let specs = [ArgumentSpec::new("count", ArgumentType::Number)];
        assert_eq!(
            bind(&specs, &["many"]),
            Err(BindError::ArgumentTypeMismatch {
                key: "count".into(),
                token: "many".into(),
            })
        );
    }

    #[test]
    fn test_union_falls_through_to_number() {
        let types = ArgumentTypeRegistry::new();
        let scope = StaticScope::new("g1", "Guild");
        let specs = [ArgumentSpec::union(
            "target",
            [ArgumentType::User, ArgumentType::Number],
        )];
        let bound = ArgumentBinder::new(&types)
            .bind(&specs, &raw(&["42"]), Some(&scope))
            .unwrap();
        assert_eq!(bound.number("target"), Some(42.0));
    }

    #[test]
    fn test_union_prefers_user_when_mention_resolves() {
        let types = ArgumentTypeRegistry::new();
        let scope = StaticScope::new("g1", "Guild").with_member(Member::new("42", "alice"));
        let specs = [ArgumentSpec::union(
            "target",
            [ArgumentType::User, ArgumentType::Number],
        )];
        let bound = ArgumentBinder::new(&types)
            .bind(&specs, &raw(&["<@42>"]), Some(&scope))
            .unwrap();
        assert_eq!(bound.user("target").unwrap().id, "42");
    }

    #[test]
    fn test_missing_optional_binds_empty() {
        let specs = [ArgumentSpec::new("command", ArgumentType::String).optional()];
        let bound = bind(&specs, &[]).unwrap();
        assert_eq!(bound.get("command"), Some(&ArgValue::Empty));
        assert!(!bound.is_present("command"));
        assert_eq!(bound.len(), 1);
    }

    #[test]
    fn test_default_literal_is_resolved() {
        let specs = [
            ArgumentSpec::new("sides", ArgumentType::Number).default_value("6"),
        ];
        let bound = bind(&specs, &[]).unwrap();
        assert_eq!(bound.number("sides"), Some(6.0));
    }

    #[test]
    fn test_unresolvable_default_is_kept_as_text() {
        let specs = [
            ArgumentSpec::new("sides", ArgumentType::Number).default_value("six"),
        ];
        let bound = bind(&specs, &[]).unwrap();
        assert_eq!(bound.text("sides"), Some("six"));
    }

    #[test]
    fn test_first_unmet_optional_halts_validation() {
        let specs = [
            ArgumentSpec::new("first", ArgumentType::Number).optional(),
            ArgumentSpec::new("second", ArgumentType::Number).optional(),
        ];
        // A doubled space leaves the first slot empty; the second token would
        // fail the number check but is no longer validated.
        let bound = bind(&specs, &["", "abc"]).unwrap();
        assert_eq!(bound.get("first"), Some(&ArgValue::Empty));
        assert_eq!(bound.get("second"), Some(&ArgValue::Empty));

        let bound = bind(&specs, &["", "7"]).unwrap();
        assert_eq!(bound.number("second"), Some(7.0));
    }

    #[test]
    fn test_required_empty_token_still_type_checked() {
        let specs = [
            ArgumentSpec::new("a", ArgumentType::Number),
            ArgumentSpec::new("b", ArgumentType::Number),
        ];
        assert!(matches!(
            bind(&specs, &["", "1"]),
            Err(BindError::ArgumentTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_required_after_default_without_token() {
        let specs = [
            ArgumentSpec::new("count", ArgumentType::Number).default_value("1"),
            ArgumentSpec::new("item", ArgumentType::String),
        ];
        assert_eq!(
            bind(&specs, &["apple"]).unwrap_err(),
            BindError::ArgumentTypeMismatch {
                key: "count".into(),
                token: "apple".into(),
            }
        );
        assert_eq!(
            bind(&specs, &["3"]).unwrap_err(),
            BindError::InsufficientArguments { required: 1 }
        );
    }

    #[test]
    fn test_bound_args_json() {
        let specs = [
            ArgumentSpec::new("n", ArgumentType::Number),
            ArgumentSpec::new("note", ArgumentType::String).optional(),
        ];
        let bound = bind(&specs, &["0"]).unwrap();
        assert_eq!(bound.to_json(), serde_json::json!({ "n": 0.0, "note": null }));
    }
}
