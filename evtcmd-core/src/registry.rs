//! Command registry.
//!
//! Registrations are kept in insertion order and searched linearly. Names are
//! not de-duplicated: the first registration for a name always wins, and any
//! later registration with the same name is never reached.
//!
//! A one-shot registration (`when`) fires once. After that it is spent but
//! keeps its slot, so it still shadows later duplicates and a matching frame
//! dispatches to nothing. Repeating registrations (`whenever`) fire on every
//! matching frame.

use crate::error::CoreError;
use crate::handler::{CommandHandler, ListenerGate};
use crate::DEFAULT_MAX_COMMANDS;
use evtcmd_protocol::Frame;

/// Result of dispatching a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran. `terminal` is the handler's return value.
    Handled { terminal: bool },
    /// The command matched a one-shot registration that already fired.
    Spent,
    /// No registration matched the command.
    Unmatched,
}

impl DispatchOutcome {
    /// Returns true if a handler ran.
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Handled { .. })
    }

    /// Returns true if a handler ran and reported the frame as terminally handled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DispatchOutcome::Handled { terminal: true })
    }
}

struct Registration<C> {
    command: String,
    handler: Box<dyn CommandHandler<C>>,
    repeat: bool,
    spent: bool,
}

/// Ordered table of command handlers with a fixed capacity.
pub struct CommandRegistry<C> {
    entries: Vec<Registration<C>>,
    capacity: usize,
}

impl<C> CommandRegistry<C> {
    /// Creates a registry holding up to [`DEFAULT_MAX_COMMANDS`] registrations.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_COMMANDS)
    }

    /// Creates a registry holding up to `capacity` registrations.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a registration.
    ///
    /// Fails with [`CoreError::CapacityExceeded`] once the registry is full.
    pub fn register<H>(
        &mut self,
        command: impl Into<String>,
        handler: H,
        repeat: bool,
    ) -> Result<(), CoreError>
    where
        H: CommandHandler<C> + 'static,
    {
        let command = command.into();
        if self.entries.len() >= self.capacity {
            return Err(CoreError::CapacityExceeded {
                command,
                capacity: self.capacity,
            });
        }

        if self.contains(&command) {
            tracing::warn!(
                command = %command,
                "duplicate registration is shadowed by an earlier one"
            );
        }
        tracing::debug!(command = %command, repeat, "registered command");

        self.entries.push(Registration {
            command,
            handler: Box::new(handler),
            repeat,
            spent: false,
        });
        Ok(())
    }

    /// Registers a handler that fires once.
    pub fn when<H>(&mut self, command: impl Into<String>, handler: H) -> Result<(), CoreError>
    where
        H: CommandHandler<C> + 'static,
    {
        self.register(command, handler, false)
    }

    /// Registers a handler that fires on every matching frame.
    pub fn whenever<H>(&mut self, command: impl Into<String>, handler: H) -> Result<(), CoreError>
    where
        H: CommandHandler<C> + 'static,
    {
        self.register(command, handler, true)
    }

    /// Runs the first registration whose name equals the frame's command.
    ///
    /// A frame that is not complete never matches. When a handler runs the
    /// frame is cleared afterwards. Otherwise the frame is left untouched.
    pub fn dispatch(
        &mut self,
        frame: &mut Frame,
        gate: &mut ListenerGate,
        ctx: &mut C,
    ) -> DispatchOutcome {
        if !frame.is_complete() {
            tracing::debug!(command = %frame.command_str(), "frame not complete");
            return DispatchOutcome::Unmatched;
        }

        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.command.as_bytes() == frame.command())
        else {
            tracing::debug!(command = %frame.command_str(), "no handler for command");
            return DispatchOutcome::Unmatched;
        };

        if entry.spent {
            tracing::debug!(command = %entry.command, "one-shot command already fired");
            return DispatchOutcome::Spent;
        }

        let terminal = entry.handler.handle(gate, ctx, &frame.data_str());
        if !entry.repeat {
            entry.spent = true;
        }
        tracing::debug!(command = %entry.command, terminal, "dispatched command");

        frame.clear();
        DispatchOutcome::Handled { terminal }
    }

    /// Returns true if any registration uses this name.
    pub fn contains(&self, command: &str) -> bool {
        self.entries.iter().any(|e| e.command == command)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<C> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}
