//! The argument type registry.
//!
//! Maps a type name to a [`TypeResolver`]. The registry is seeded with the
//! `string`, `number` and `user` resolvers; callers may add their own or
//! replace any of them before the engine is frozen. Registration is last
//! write wins, unlike command names.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use herald_core::Scope;

use super::{ArgValue, ArgumentType};

/// Resolves a raw token into a typed value.
///
/// Returning `None` means "this token is not of my type"; it is not an
/// error. Resolvers must not mutate external state.
pub trait TypeResolver: Send + Sync {
    /// Attempts to resolve `raw` within the optional `scope`.
    fn resolve(&self, raw: &str, scope: Option<&dyn Scope>) -> Option<ArgValue>;
}

impl<F> TypeResolver for F
where
    F: Fn(&str, Option<&dyn Scope>) -> Option<ArgValue> + Send + Sync,
{
    fn resolve(&self, raw: &str, scope: Option<&dyn Scope>) -> Option<ArgValue> {
        self(raw, scope)
    }
}

/// A shared, type-erased resolver.
pub type BoxedResolver = Arc<dyn TypeResolver>;

/// Identity resolver backing the `string` type.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringResolver;

impl TypeResolver for StringResolver {
    fn resolve(&self, raw: &str, _scope: Option<&dyn Scope>) -> Option<ArgValue> {
        Some(ArgValue::Text(raw.to_string()))
    }
}

/// Numeric resolver backing the `number` type.
///
/// `"0"` resolves to `0.0`; only input that fails to parse, or parses to a
/// non-finite value, is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberResolver;

impl TypeResolver for NumberResolver {
    fn resolve(&self, raw: &str, _scope: Option<&dyn Scope>) -> Option<ArgValue> {
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(ArgValue::Number)
    }
}

/// Mention resolver backing the `user` type.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserResolver;

impl TypeResolver for UserResolver {
    fn resolve(&self, raw: &str, scope: Option<&dyn Scope>) -> Option<ArgValue> {
        let scope = scope?;
        let id = parse_mention(raw)?;
        scope.member(id).map(ArgValue::User)
    }
}

/// Extracts the user id from `<@id>` or `<@!id>`.
///
/// ```rust,ignore
/// assert_eq!(parse_mention("<@!42>"), Some("42"));
/// assert_eq!(parse_mention("42"), None);
/// ```
pub fn parse_mention(raw: &str) -> Option<&str> {
    let inner = raw.strip_prefix("<@")?.strip_suffix('>')?;
    let id = inner.strip_prefix('!').unwrap_or(inner);
    (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then_some(id)
}

/// Registry of named argument type resolvers.
#[derive(Clone)]
pub struct ArgumentTypeRegistry {
    resolvers: HashMap<String, BoxedResolver>,
}

impl Default for ArgumentTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ArgumentTypeRegistry {
    /// Creates a registry holding the built-in `string`, `number` and `user` types.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_resolver(ArgumentType::String.name(), Arc::new(StringResolver));
        registry.register_resolver(ArgumentType::Number.name(), Arc::new(NumberResolver));
        registry.register_resolver(ArgumentType::User.name(), Arc::new(UserResolver));
        registry
    }

    /// Creates a registry with no types at all.
    pub fn empty() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    /// Registers a resolver function under `name`, replacing any previous one.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// types.register("color", |raw: &str, _scope: Option<&dyn Scope>| {
    ///     let hex = raw.strip_prefix('#')?;
    ///     u32::from_str_radix(hex, 16).ok().map(|c| ArgValue::Json(c.into()))
    /// });
    /// ```
    pub fn register<F>(&mut self, name: impl Into<String>, resolver: F) -> Option<BoxedResolver>
    where
        F: Fn(&str, Option<&dyn Scope>) -> Option<ArgValue> + Send + Sync + 'static,
    {
        self.register_resolver(name, Arc::new(resolver))
    }

    /// Registers a pre-built resolver under `name`, returning the replaced one.
    pub fn register_resolver(
        &mut self,
        name: impl Into<String>,
        resolver: BoxedResolver,
    ) -> Option<BoxedResolver> {
        let name = name.into();
        let previous = self.resolvers.insert(name.clone(), resolver);
        if previous.is_some() {
            debug!(type_name = %name, "Replaced argument type resolver");
        }
        previous
    }

    /// Looks up the resolver registered for `name`.
    pub fn resolver(&self, name: &str) -> Option<&BoxedResolver> {
        self.resolvers.get(name)
    }

    /// Returns `true` if a resolver is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.resolvers.contains_key(name)
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Returns `true` if no type is registered.
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolves `raw` against a single type.
    ///
    /// A type with no registered resolver never matches.
    pub fn resolve(
        &self,
        ty: &ArgumentType,
        raw: &str,
        scope: Option<&dyn Scope>,
    ) -> Option<ArgValue> {
        match self.resolvers.get(ty.name()) {
            Some(resolver) => resolver.resolve(raw, scope),
            None => {
                warn!(type_name = %ty, "No resolver registered for argument type");
                None
            }
        }
    }

    /// Tries each type in order and returns the first successful resolution.
    pub fn resolve_first(
        &self,
        types: &[ArgumentType],
        raw: &str,
        scope: Option<&dyn Scope>,
    ) -> Option<ArgValue> {
        types.iter().find_map(|ty| self.resolve(ty, raw, scope))
    }
}

impl fmt::Debug for ArgumentTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.resolvers.keys().collect();
        names.sort();
        f.debug_struct("ArgumentTypeRegistry")
            .field("types", &names)
            .finish()
    }
}
