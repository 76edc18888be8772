//! Poll loop.

use crate::channel::ChannelSource;
use crate::commands::{register_builtins, DeviceContext};
use crate::config::Config;
use crate::error::HostError;
use evtcmd_core::{CommandListener, CommandRegistry, DispatchOutcome};
use evtcmd_protocol::{ByteSource, Pacer, Scanner};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Counters collected by [`run_poll_loop`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Frames completed by the scanner.
    pub frames: u64,
    /// Frames that ran a handler.
    pub handled: u64,
    /// Frames whose command matched no registration.
    pub unmatched: u64,
    /// Frames that matched an already-fired one-shot command.
    pub spent: u64,
    /// Frames dropped by the scanner.
    pub dropped: u64,
}

impl PollStats {
    fn record(&mut self, outcome: DispatchOutcome) {
        self.frames += 1;
        match outcome {
            DispatchOutcome::Handled { .. } => self.handled += 1,
            DispatchOutcome::Unmatched => self.unmatched += 1,
            DispatchOutcome::Spent => self.spent += 1,
        }
    }
}

/// Builds a listener over `source` with the built-in commands registered.
pub fn build_listener<S: ByteSource>(
    config: &Config,
    source: S,
) -> Result<CommandListener<S, DeviceContext>, HostError> {
    let scanner = Scanner::new(source)
        .with_read_delay(config.scanner.read_delay())
        .with_max_field_len(config.scanner.max_field_len);
    let registry = CommandRegistry::with_capacity(config.registry.max_commands);
    let mut listener = CommandListener::from_parts(scanner, registry);
    register_builtins(&mut listener)?;
    Ok(listener)
}

/// Polls `listener` until its input is exhausted, it is disabled, or
/// `shutdown` is set. Replies are written to `out` one per line.
pub fn run_poll_loop<P, W>(
    listener: &mut CommandListener<ChannelSource, DeviceContext, P>,
    ctx: &mut DeviceContext,
    out: &mut W,
    shutdown: &AtomicBool,
    idle: Duration,
) -> Result<PollStats, HostError>
where
    P: Pacer,
    W: Write,
{
    let mut stats = PollStats::default();

    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("Shutdown requested, leaving poll loop");
            break;
        }
        if !listener.is_enabled() {
            tracing::info!("Listener disabled, leaving poll loop");
            break;
        }

        match listener.poll(ctx) {
            Ok(Some(outcome)) => stats.record(outcome),
            Ok(None) => {
                if listener.scanner().source().is_exhausted() {
                    tracing::info!("Input closed");
                    break;
                }
                std::thread::sleep(idle);
            }
            Err(e) if e.is_recoverable() => {
                stats.dropped += 1;
                tracing::warn!("Dropped frame: {}", e);
                ctx.reply(format!("error: {}", e.error_code()));
            }
            Err(e) => return Err(e.into()),
        }

        for line in ctx.drain_replies() {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use evtcmd_core::CoreError;
    use tokio::sync::mpsc;

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.scanner.read_delay_ms = 0;
        config.poll.idle_ms = 1;
        config
    }

    fn feed(chunks: &[&'static [u8]]) -> (mpsc::Sender<Bytes>, ChannelSource) {
        let (tx, source) = ChannelSource::channel(chunks.len().max(1));
        for chunk in chunks {
            tx.try_send(Bytes::from_static(chunk)).unwrap();
        }
        (tx, source)
    }

    fn run(config: &Config, source: ChannelSource) -> (Result<PollStats, HostError>, String) {
        let mut listener = build_listener(config, source).unwrap();
        let mut ctx = DeviceContext::new();
        let mut out = Vec::new();
        let shutdown = AtomicBool::new(false);
        let result = run_poll_loop(
            &mut listener,
            &mut ctx,
            &mut out,
            &shutdown,
            config.poll.idle(),
        );
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_build_listener_applies_config() {
        let mut config = fast_config();
        config.scanner.max_field_len = 12;
        let (_tx, source) = ChannelSource::channel(1);
        let listener = build_listener(&config, source).unwrap();

        assert_eq!(listener.scanner().read_delay(), Duration::ZERO);
        assert_eq!(listener.scanner().max_field_len(), 12);
        assert_eq!(listener.registry().capacity(), 10);
        assert!(listener.registry().contains("ping"));
    }

    #[test]
    fn test_build_listener_fails_when_registry_too_small() {
        let mut config = fast_config();
        config.registry.max_commands = 2;
        let (_tx, source) = ChannelSource::channel(1);
        let err = build_listener(&config, source).err().unwrap();
        assert!(matches!(err, HostError::Core(_)));
    }

    #[test]
    fn test_too_small_registry_passes_validation_but_fails_before_input() {
        let mut config = fast_config();
        config.registry.max_commands = 3;
        assert!(config.validate().is_ok());

        let (tx, rx) = mpsc::channel(1);
        let err = build_listener(&config, ChannelSource::new(rx)).err().unwrap();
        assert!(matches!(
            err,
            HostError::Core(CoreError::CapacityExceeded { capacity: 3, .. })
        ));
        // The receiver is dropped with the listener, so no input is forwarded
        assert!(tx.is_closed());
    }

    #[test]
    fn test_runs_until_input_closed() {
        let (tx, source) = feed(&[b"noise>pi", b"ng!>set:", b"35!>get!>nope!"]);
        drop(tx);
        let (result, out) = run(&fast_config(), source);
        let stats = result.unwrap();

        assert_eq!(out, "pong\nok\n35\n");
        assert_eq!(
            stats,
            PollStats {
                frames: 4,
                handled: 3,
                unmatched: 1,
                spent: 0,
                dropped: 0,
            }
        );
    }

    #[test]
    fn test_stop_ends_loop_with_input_still_open() {
        let (_tx, source) = feed(&[b">hello!>hello!>stop!>ping!"]);
        let (result, out) = run(&fast_config(), source);
        let stats = result.unwrap();

        assert_eq!(out, "hello\nbye\n");
        assert_eq!(stats.spent, 1);
        assert_eq!(stats.handled, 2);
    }

    #[test]
    fn test_overflow_is_reported_and_polling_continues() {
        let mut config = fast_config();
        config.scanner.max_field_len = 4;
        let (tx, source) = feed(&[b">echo:toolong!>ping!"]);
        drop(tx);
        let (result, out) = run(&config, source);
        let stats = result.unwrap();

        assert_eq!(out, "error: FIELD_TOO_LONG\npong\n");
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.handled, 1);
    }

    #[test]
    fn test_shutdown_flag_stops_loop() {
        let config = fast_config();
        let (_tx, source) = ChannelSource::channel(1);
        let mut listener = build_listener(&config, source).unwrap();
        let mut ctx = DeviceContext::new();
        let mut out = Vec::new();
        let shutdown = AtomicBool::new(true);

        let stats = run_poll_loop(
            &mut listener,
            &mut ctx,
            &mut out,
            &shutdown,
            config.poll.idle(),
        )
        .unwrap();
        assert_eq!(stats, PollStats::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_bytes_arriving_later_are_picked_up() {
        let config = fast_config();
        let (tx, rx) = mpsc::channel(4);
        let mut listener = build_listener(&config, ChannelSource::new(rx)).unwrap();

        let feeder = std::thread::spawn(move || {
            for chunk in [&b">se"[..], &b"t:-4"[..], &b"!>get!"[..]] {
                tx.blocking_send(Bytes::from_static(chunk)).unwrap();
                std::thread::sleep(Duration::from_millis(5));
            }
        });

        let mut ctx = DeviceContext::new();
        let mut out = Vec::new();
        let shutdown = AtomicBool::new(false);
        let stats = run_poll_loop(
            &mut listener,
            &mut ctx,
            &mut out,
            &shutdown,
            config.poll.idle(),
        )
        .unwrap();
        feeder.join().unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "ok\n-4\n");
        assert_eq!(stats.handled, 2);
        assert_eq!(ctx.value, -4);
    }
}
