//! Command handler abstraction.

/// Enablement switch of a listener.
///
/// A disabled listener does not read from its source. Handlers receive the
/// gate of the listener that dispatched them, so a command can switch its
/// own listener off (or back on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerGate {
    enabled: bool,
}

impl ListenerGate {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for ListenerGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Handles one command.
///
/// `ctx` is application state passed through untouched by the dispatcher.
/// The return value tells the caller whether the frame was terminally
/// handled, i.e. whether other listeners should be skipped this cycle.
pub trait CommandHandler<C> {
    fn handle(&mut self, gate: &mut ListenerGate, ctx: &mut C, data: &str) -> bool;
}

impl<C, F> CommandHandler<C> for F
where
    F: FnMut(&mut ListenerGate, &mut C, &str) -> bool,
{
    fn handle(&mut self, gate: &mut ListenerGate, ctx: &mut C, data: &str) -> bool {
        self(gate, ctx, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Accumulate;

    impl CommandHandler<Vec<String>> for Accumulate {
        fn handle(
            &mut self,
            _gate: &mut ListenerGate,
            ctx: &mut Vec<String>,
            data: &str,
        ) -> bool {
            ctx.push(data.to_string());
            false
        }
    }

    fn call<C>(
        handler: &mut dyn CommandHandler<C>,
        ctx: &mut C,
        data: &str,
    ) -> (bool, ListenerGate) {
        let mut gate = ListenerGate::new();
        let terminal = handler.handle(&mut gate, ctx, data);
        (terminal, gate)
    }

    #[test]
    fn test_gate_toggles() {
        let mut gate = ListenerGate::default();
        assert!(gate.is_enabled());
        gate.disable();
        assert!(!gate.is_enabled());
        gate.enable();
        assert!(gate.is_enabled());
    }

    #[test]
    fn test_struct_handler() {
        let mut ctx = Vec::new();
        let (terminal, _) = call::<Vec<String>>(&mut Accumulate, &mut ctx, "42");
        assert!(!terminal);
        assert_eq!(ctx, vec!["42".to_string()]);
    }

    #[test]
    fn test_closure_handler_can_disable_listener() {
        let mut calls = 0u32;
        let mut handler = |gate: &mut ListenerGate, ctx: &mut u32, _data: &str| {
            *ctx += 1;
            gate.disable();
            true
        };
        let (terminal, gate) = call::<u32>(&mut handler, &mut calls, "");
        assert!(terminal);
        assert!(!gate.is_enabled());
        assert_eq!(calls, 1);
    }
}
