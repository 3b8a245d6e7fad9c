//! The message client: owns the frozen engine and feeds it messages.
//!
//! Registration happens on a [`ClientBuilder`]. [`ClientBuilder::build`]
//! freezes the registries into a [`Client`], which can then be cloned freely
//! and shared between platform integrations.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use herald_runtime::{ClientBuilder, config::load_config};
//!
//! let config = load_config()?;
//! let client = ClientBuilder::from_config(&config)
//!     .register(ping)?
//!     .register_default_commands()?
//!     .build();
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! // hand `tx` to the platform integration
//! client.run(rx).await?;
//! ```

use std::fmt;
use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::signal;
use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use herald_core::{BoxedMessage, Scope};
use herald_framework::{
    ArgValue, ArgumentTypeRegistry, Command, CommandRegistry, DefaultCommands, DispatchEvent,
    DispatchOutcome, DispatchSettings, Dispatcher, IgnoreReason, Prefixes, register_defaults,
};

use crate::config::{ConfigLoader, HeraldConfig};
use crate::error::RuntimeResult;
use crate::logging;

// =============================================================================
// ClientBuilder
// =============================================================================

/// Collects commands, argument types and settings before dispatch starts.
pub struct ClientBuilder {
    registry: CommandRegistry,
    types: ArgumentTypeRegistry,
    settings: DispatchSettings,
    default_commands: DefaultCommands,
}

impl ClientBuilder {
    /// Creates a builder with the built-in argument types and no commands.
    pub fn new(prefixes: impl Into<Prefixes>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            types: ArgumentTypeRegistry::new(),
            settings: DispatchSettings::new(prefixes),
            default_commands: DefaultCommands::default(),
        }
    }

    /// Creates a builder from loaded configuration and installs its logging.
    pub fn from_config(config: &HeraldConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            prefixes = %config.commands.prefix,
            owner = config.commands.owner_id.as_deref().unwrap_or("-"),
            log_level = %config.logging.level,
            "Client configured"
        );

        Self {
            registry: CommandRegistry::new(),
            types: ArgumentTypeRegistry::new(),
            settings: config.commands.to_settings(),
            default_commands: config.commands.default_commands,
        }
    }

    /// Loads configuration from the default locations, then calls
    /// [`from_config`](Self::from_config).
    pub fn load() -> RuntimeResult<Self> {
        Self::load_with(ConfigLoader::new())
    }

    /// Like [`load`](Self::load) with a customised loader.
    pub fn load_with(loader: ConfigLoader) -> RuntimeResult<Self> {
        let config = loader.load()?;
        Ok(Self::from_config(&config))
    }

    /// Sets the user allowed to run owner-only commands.
    pub fn owner(mut self, owner_id: impl Into<String>) -> Self {
        self.settings = self.settings.with_owner(owner_id);
        self
    }

    /// Overrides which built-in commands
    /// [`register_default_commands`](Self::register_default_commands) installs.
    pub fn default_commands(mut self, toggles: DefaultCommands) -> Self {
        self.default_commands = toggles;
        self
    }

    /// Registers a command.
    pub fn register<C: Command>(mut self, command: C) -> RuntimeResult<Self> {
        self.registry.register(command)?;
        Ok(self)
    }

    /// Registers several commands, stopping at the first rejection.
    pub fn register_all<I, C>(mut self, commands: I) -> RuntimeResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: Command,
    {
        for command in commands {
            self.registry.register(command)?;
        }
        Ok(self)
    }

    /// Registers the enabled built-in commands.
    ///
    /// Both are replaceable, so commands registered afterwards may take
    /// over their names.
    pub fn register_default_commands(mut self) -> RuntimeResult<Self> {
        register_defaults(&mut self.registry, &self.default_commands)?;
        Ok(self)
    }

    /// Registers or replaces an argument type resolver.
    pub fn register_type<F>(mut self, name: impl Into<String>, resolver: F) -> Self
    where
        F: Fn(&str, Option<&dyn Scope>) -> Option<ArgValue> + Send + Sync + 'static,
    {
        self.types.register(name, resolver);
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Freezes everything registered so far.
    pub fn build(self) -> Client {
        debug!(
            commands = self.registry.len(),
            types = self.types.len(),
            "Building client"
        );
        Client {
            dispatcher: Dispatcher::new(self.registry, self.types, self.settings),
            counters: Arc::new(Counters::default()),
        }
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("commands", &self.registry.names())
            .field("settings", &self.settings)
            .field("default_commands", &self.default_commands)
            .finish()
    }
}

// =============================================================================
// Client
// =============================================================================

#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    ignored: AtomicU64,
    denied: AtomicU64,
    rejected: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn record(&self, outcome: &DispatchOutcome) {
        let counter = match outcome {
            DispatchOutcome::Ignored(_) => &self.ignored,
            DispatchOutcome::Denied { .. } => &self.denied,
            DispatchOutcome::Rejected { .. } => &self.rejected,
            DispatchOutcome::Completed { .. } => &self.completed,
            DispatchOutcome::Failed { .. } => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Counts of dispatched messages by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub received: u64,
    pub ignored: u64,
    pub denied: u64,
    pub rejected: u64,
    pub completed: u64,
    pub failed: u64,
}

impl fmt::Display for ClientStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Messages: {} received ({} ignored, {} denied, {} rejected, {} completed, {} failed)",
            self.received, self.ignored, self.denied, self.rejected, self.completed, self.failed
        )
    }
}

/// A frozen command engine plus the loop that feeds it.
///
/// Cloning is cheap and every clone shares the registry and statistics.
#[derive(Clone)]
pub struct Client {
    dispatcher: Dispatcher,
    counters: Arc<Counters>,
}

impl Client {
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn registry(&self) -> &CommandRegistry {
        self.dispatcher.registry()
    }

    /// Subscribes to dispatch lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.dispatcher.subscribe()
    }

    /// Dispatches one message on the current task.
    pub async fn dispatch(&self, message: BoxedMessage) -> DispatchOutcome {
        self.counters.received.fetch_add(1, Ordering::Relaxed);
        let outcome = self.dispatcher.dispatch(message).await;
        self.counters.record(&outcome);
        outcome
    }

    /// Dispatches one message on its own task.
    pub fn spawn_dispatch(&self, message: BoxedMessage) -> JoinHandle<DispatchOutcome> {
        let client = self.clone();
        tokio::spawn(async move { client.dispatch(message).await })
    }

    pub fn stats(&self) -> ClientStats {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        ClientStats {
            received: load(&self.counters.received),
            ignored: load(&self.counters.ignored),
            denied: load(&self.counters.denied),
            rejected: load(&self.counters.rejected),
            completed: load(&self.counters.completed),
            failed: load(&self.counters.failed),
        }
    }

    /// Dispatches messages from `messages` until the channel closes or a
    /// shutdown signal (Ctrl+C, or SIGTERM on unix) arrives.
    pub async fn run(&self, messages: mpsc::Receiver<BoxedMessage>) -> RuntimeResult<()> {
        info!("Herald client is running. Press Ctrl+C to stop.");
        self.run_until(messages, wait_for_shutdown()).await
    }

    /// Dispatches messages until the channel closes or `shutdown` completes.
    ///
    /// Every message runs on its own task. Dispatches still in flight when
    /// the loop stops are awaited before returning.
    pub async fn run_until<F>(
        &self,
        mut messages: mpsc::Receiver<BoxedMessage>,
        shutdown: F,
    ) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let mut shutdown = pin!(shutdown);
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("Shutdown requested");
                    break;
                }
                received = messages.recv() => match received {
                    Some(message) => {
                        let client = self.clone();
                        tasks.spawn(async move { client.dispatch(message).await });
                    }
                    None => {
                        debug!("Message channel closed");
                        break;
                    }
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    log_join(joined);
                }
            }
        }

        if !tasks.is_empty() {
            debug!(in_flight = tasks.len(), "Waiting for in-flight dispatches");
        }
        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }

        info!(stats = %self.stats(), "Herald client stopped");
        Ok(())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("dispatcher", &self.dispatcher)
            .field("stats", &self.stats())
            .finish()
    }
}

fn log_join(joined: Result<DispatchOutcome, tokio::task::JoinError>) {
    match joined {
        Ok(DispatchOutcome::Ignored(IgnoreReason::UnknownCommand)) => {
            debug!("Message named no known command");
        }
        Ok(_) => {}
        Err(e) if e.is_panic() => error!(error = %e, "Dispatch task panicked"),
        Err(e) => warn!(error = %e, "Dispatch task cancelled"),
    }
}

/// Waits for Ctrl+C, or SIGTERM on unix.
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                ctrl_c.await;
                info!("Received Ctrl+C, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        info!("Received Ctrl+C, shutting down");
    }
}
