//! The command registry.
//!
//! Holds every registered command in registration order. Names and aliases
//! share one namespace: a new command may not reuse a name or alias already
//! held by another command, unless that command was registered as
//! replaceable, in which case it is evicted.
//!
//! The registry is filled during startup and then frozen behind an `Arc`;
//! nothing mutates it during dispatch.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{RegistrationError, RegistrationResult};

use super::{BoxedCommand, Command};

/// Name and alias lookup for registered commands.
#[derive(Debug, Default, Clone)]
pub struct CommandRegistry {
    commands: Vec<BoxedCommand>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command.
    ///
    /// Either the command is inserted (evicting any replaceable command it
    /// collides with) or an error is returned and the registry is left
    /// untouched.
    pub fn register<C: Command>(&mut self, command: C) -> RegistrationResult<()> {
        self.register_boxed(Arc::new(command))
    }

    /// Registers an already shared command.
    pub fn register_boxed(&mut self, command: BoxedCommand) -> RegistrationResult<()> {
        let def = command.definition();

        let mut evicted: Vec<usize> = Vec::new();
        for name in def.names() {
            let Some(index) = self.position_of(name) else {
                continue;
            };
            let existing = self.commands[index].definition();
            if !existing.is_default() {
                return Err(RegistrationError::DuplicateCommand {
                    command: def.name().to_string(),
                    existing: existing.name().to_string(),
                });
            }
            if !evicted.contains(&index) {
                evicted.push(index);
            }
        }

        def.validate()?;

        if def.is_unknown_fallback() {
            let current = self
                .commands
                .iter()
                .enumerate()
                .find(|(_, c)| c.definition().is_unknown_fallback());
            if let Some((index, existing)) = current {
                if !existing.definition().is_default() {
                    return Err(RegistrationError::DuplicateFallback {
                        command: def.name().to_string(),
                        existing: existing.definition().name().to_string(),
                    });
                }
                if !evicted.contains(&index) {
                    evicted.push(index);
                }
            }
        }

        evicted.sort_unstable();
        for index in evicted.into_iter().rev() {
            let removed = self.commands.remove(index);
            debug!(
                command = def.name(),
                replaced = removed.definition().name(),
                "Replaced default command"
            );
        }

        info!(
            command = def.name(),
            aliases = ?def.alias_list(),
            group = def.group_name(),
            "Registered command"
        );
        self.commands.push(command);
        Ok(())
    }

    /// Finds a command by name or alias.
    ///
    /// The unknown-command fallback is never returned here.
    pub fn find(&self, token: &str) -> Option<&BoxedCommand> {
        self.commands.iter().find(|c| {
            let def = c.definition();
            !def.is_unknown_fallback() && def.matches(token)
        })
    }

    /// Finds a command by name or alias, the fallback included.
    pub fn lookup(&self, token: &str) -> Option<&BoxedCommand> {
        self.position_of(token).map(|i| &self.commands[i])
    }

    /// The registered unknown-command fallback, if any.
    pub fn unknown_fallback(&self) -> Option<&BoxedCommand> {
        self.commands
            .iter()
            .find(|c| c.definition().is_unknown_fallback())
    }

    /// Iterates over commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &BoxedCommand> {
        self.commands.iter()
    }

    /// Names of all registered commands, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.definition().name()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn position_of(&self, token: &str) -> Option<usize> {
        self.commands
            .iter()
            .position(|c| c.definition().matches(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::{ArgumentSpec, ArgumentType};
    use crate::binder::BoundArgs;
    use crate::command::CommandDefinition;
    use crate::context::CommandContext;
    use crate::error::MalformedReason;

    fn command(def: CommandDefinition) -> impl Command {
        def.handler(|_ctx: CommandContext, _args: BoundArgs| async {})
    }

    fn named(name: &str) -> CommandDefinition {
        CommandDefinition::new(name)
    }

    #[test]
    fn test_find_by_name_and_alias() {
        let mut registry = CommandRegistry::new();
        registry
            .register(command(named("add-numbers").alias("add")))
            .unwrap();

        assert_eq!(
            registry.find("add").unwrap().definition().name(),
            "add-numbers"
        );
        assert!(registry.find("add-numbers").is_some());
        assert!(registry.find("sub").is_none());
    }

    #[test]
    fn test_alias_collision_fails() {
        let mut registry = CommandRegistry::new();
        registry.register(command(named("add").alias("plus"))).unwrap();

        let err = registry
            .register(command(named("sum").alias("plus")))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateCommand {
                command: "sum".into(),
                existing: "add".into(),
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_name_colliding_with_alias_fails() {
        let mut registry = CommandRegistry::new();
        registry.register(command(named("help").alias("h"))).unwrap();
        assert!(matches!(
            registry.register(command(named("h"))),
            Err(RegistrationError::DuplicateCommand { .. })
        ));
    }

    #[test]
    fn test_default_is_replaced_then_collision_fails() {
        let mut registry = CommandRegistry::new();
        registry
            .register(command(named("help").alias("h").replaceable()))
            .unwrap();
        registry
            .register(command(named("help").description("custom")))
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.find("help").unwrap().definition().description_text(),
            "custom"
        );
        // The evicted default's alias is free again.
        assert!(registry.find("h").is_none());

        assert!(matches!(
            registry.register(command(named("help"))),
            Err(RegistrationError::DuplicateCommand { .. })
        ));
    }

    #[test]
    fn test_one_registration_may_evict_several_defaults() {
        let mut registry = CommandRegistry::new();
        registry.register(command(named("a").replaceable())).unwrap();
        registry.register(command(named("b").replaceable())).unwrap();
        registry.register(command(named("c"))).unwrap();

        registry.register(command(named("a").alias("b"))).unwrap();
        assert_eq!(registry.names(), ["c", "a"]);
    }

    #[test]
    fn test_failed_registration_leaves_registry_untouched() {
        let mut registry = CommandRegistry::new();
        registry.register(command(named("help").replaceable())).unwrap();
        registry.register(command(named("ping"))).unwrap();

        // Would evict `help`, but `ping` is not replaceable.
        assert!(registry
            .register(command(named("help").alias("ping")))
            .is_err());
        assert_eq!(registry.names(), ["help", "ping"]);

        // Would evict `help`, but the definition is malformed.
        let malformed = named("help")
            .argument(ArgumentSpec::new("a", ArgumentType::String).optional())
            .argument(ArgumentSpec::new("b", ArgumentType::String));
        assert!(matches!(
            registry.register(command(malformed)),
            Err(RegistrationError::MalformedCommand {
                reason: MalformedReason::RequiredAfterOptional { .. },
                ..
            })
        ));
        assert_eq!(registry.names(), ["help", "ping"]);
    }

    #[test]
    fn test_fallback_is_hidden_from_find() {
        let mut registry = CommandRegistry::new();
        registry
            .register(command(named("unknown").unknown_fallback()))
            .unwrap();

        assert!(registry.find("unknown").is_none());
        assert!(registry.lookup("unknown").is_some());
        assert_eq!(
            registry.unknown_fallback().unwrap().definition().name(),
            "unknown"
        );
    }

    #[test]
    fn test_second_fallback_fails() {
        let mut registry = CommandRegistry::new();
        registry
            .register(command(named("missing").unknown_fallback()))
            .unwrap();

        assert_eq!(
            registry
                .register(command(named("what").unknown_fallback()))
                .unwrap_err(),
            RegistrationError::DuplicateFallback {
                command: "what".into(),
                existing: "missing".into(),
            }
        );
    }

    #[test]
    fn test_fallback_replaces_default_fallback() {
        let mut registry = CommandRegistry::new();
        registry
            .register(command(named("unknown").unknown_fallback().replaceable()))
            .unwrap();
        registry
            .register(command(named("not-found").unknown_fallback()))
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.unknown_fallback().unwrap().definition().name(),
            "not-found"
        );
    }

    #[test]
    fn test_iter_keeps_registration_order() {
        let mut registry = CommandRegistry::new();
        for name in ["b", "a", "c"] {
            registry.register(command(named(name))).unwrap();
        }
        let names: Vec<_> = registry.iter().map(|c| c.definition().name()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }
}
