//! Built-in commands shipped with the Herald framework.
//!
//! Both are registered as replaceable, so registering a command with the
//! same name (or another unknown-command fallback) swaps them out.
//!
//! | Command | Aliases | Description |
//! |---------|---------|-------------|
//! | [`HelpCommand`] | `h`, `commands`, `cmds` | Lists commands or describes one |
//! | [`UnknownCommand`] | - | Fallback replying to unrecognised commands |
//!
//! # Registering
//!
//! ```rust,ignore
//! use herald_framework::builtin::{DefaultCommands, register_defaults};
//!
//! register_defaults(&mut registry, &DefaultCommands::default())?;
//! ```

pub mod help;
pub mod unknown;

use serde::{Deserialize, Serialize};

use crate::command::CommandRegistry;
use crate::error::RegistrationResult;

pub use help::HelpCommand;
pub use unknown::UnknownCommand;

/// Toggles for the built-in commands. Both are on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultCommands {
    pub help: bool,
    pub unknown: bool,
}

impl Default for DefaultCommands {
    fn default() -> Self {
        Self {
            help: true,
            unknown: true,
        }
    }
}

impl DefaultCommands {
    /// Both commands disabled.
    pub fn none() -> Self {
        Self {
            help: false,
            unknown: false,
        }
    }
}

/// Registers the enabled built-in commands.
pub fn register_defaults(
    registry: &mut CommandRegistry,
    toggles: &DefaultCommands,
) -> RegistrationResult<()> {
    if toggles.help {
        registry.register(HelpCommand::new())?;
    }
    if toggles.unknown {
        registry.register(UnknownCommand::new())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggles() {
        let mut registry = CommandRegistry::new();
        register_defaults(
            &mut registry,
            &DefaultCommands {
                help: false,
                unknown: true,
            },
        )
        .unwrap();
        assert_eq!(registry.names(), ["unknown"]);
        assert!(registry.unknown_fallback().is_some());

        let mut registry = CommandRegistry::new();
        register_defaults(&mut registry, &DefaultCommands::none()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_partial_toggle_deserializes_with_defaults() {
        let toggles: DefaultCommands = serde_json::from_str(r#"{ "help": false }"#).unwrap();
        assert!(!toggles.help);
        assert!(toggles.unknown);
    }
}
