//! Command listener.
//!
//! Ties a [`Scanner`] to a [`CommandRegistry`] behind a [`ListenerGate`].
//! A polling loop asks [`CommandListener::is_event_triggered`] and, when it
//! reports a complete frame, calls [`CommandListener::perform_trigger_action`].
//! [`CommandListener::poll`] does both in one step.

use crate::error::CoreError;
use crate::handler::{CommandHandler, ListenerGate};
use crate::registry::{CommandRegistry, DispatchOutcome};
use evtcmd_protocol::{ByteSource, Pacer, Scanner, ThreadPacer};

/// Listens on a byte source and dispatches completed frames.
pub struct CommandListener<S, C, P = ThreadPacer> {
    scanner: Scanner<S, P>,
    registry: CommandRegistry<C>,
    gate: ListenerGate,
}

impl<S: ByteSource, C> CommandListener<S, C> {
    /// Creates an enabled listener with default scanner and registry settings.
    pub fn new(source: S) -> Self {
        Self::from_parts(Scanner::new(source), CommandRegistry::new())
    }
}

impl<S: ByteSource, C, P: Pacer> CommandListener<S, C, P> {
    /// Creates an enabled listener from a configured scanner and registry.
    pub fn from_parts(scanner: Scanner<S, P>, registry: CommandRegistry<C>) -> Self {
        Self {
            scanner,
            registry,
            gate: ListenerGate::new(),
        }
    }

    /// See [`CommandRegistry::register`].
    pub fn register<H>(
        &mut self,
        command: impl Into<String>,
        handler: H,
        repeat: bool,
    ) -> Result<(), CoreError>
    where
        H: CommandHandler<C> + 'static,
    {
        self.registry.register(command, handler, repeat)
    }

    /// Registers a handler that fires once.
    pub fn when<H>(&mut self, command: impl Into<String>, handler: H) -> Result<(), CoreError>
    where
        H: CommandHandler<C> + 'static,
    {
        self.registry.when(command, handler)
    }

    /// Registers a handler that fires on every matching frame.
    pub fn whenever<H>(&mut self, command: impl Into<String>, handler: H) -> Result<(), CoreError>
    where
        H: CommandHandler<C> + 'static,
    {
        self.registry.whenever(command, handler)
    }

    /// Returns true once a complete frame has been scanned.
    ///
    /// A disabled listener reports false without reading from its source.
    pub fn is_event_triggered(&mut self) -> Result<bool, CoreError> {
        if !self.gate.is_enabled() {
            return Ok(false);
        }
        Ok(self.scanner.scan()?)
    }

    /// Dispatches the current frame.
    ///
    /// Only meaningful right after [`Self::is_event_triggered`] returned true.
    /// A partial frame matches nothing and is left for the scanner to finish.
    pub fn perform_trigger_action(&mut self, ctx: &mut C) -> DispatchOutcome {
        self.registry
            .dispatch(self.scanner.frame_mut(), &mut self.gate, ctx)
    }

    /// Runs one polling step.
    ///
    /// Returns `Ok(None)` when no frame completed, otherwise the dispatch
    /// outcome for the completed frame.
    pub fn poll(&mut self, ctx: &mut C) -> Result<Option<DispatchOutcome>, CoreError> {
        if !self.is_event_triggered()? {
            return Ok(None);
        }
        let outcome = self.perform_trigger_action(ctx);
        if outcome == DispatchOutcome::Unmatched {
            tracing::warn!(
                command = %self.scanner.frame().command_str(),
                "unknown command"
            );
        }
        Ok(Some(outcome))
    }

    pub fn enable(&mut self) {
        self.gate.enable();
    }

    pub fn disable(&mut self) {
        self.gate.disable();
    }

    pub fn is_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    /// Drops any partial frame.
    pub fn reset(&mut self) {
        self.scanner.reset();
    }

    pub fn scanner(&self) -> &Scanner<S, P> {
        &self.scanner
    }

    pub fn scanner_mut(&mut self) -> &mut Scanner<S, P> {
        &mut self.scanner
    }

    pub fn registry(&self) -> &CommandRegistry<C> {
        &self.registry
    }
}
