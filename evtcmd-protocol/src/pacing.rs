//! Inter-byte pacing.
//!
//! Slow or bursty sources can hand out a byte before the rest of a frame has
//! landed. The scanner pauses before each read to give the source time to
//! catch up.

use std::time::Duration;

/// Pause primitive used between byte reads.
pub trait Pacer {
    fn pause(&mut self, delay: Duration);
}

/// Blocks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Never pauses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

impl Pacer for NoPacing {
    fn pause(&mut self, _delay: Duration) {}
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn pause(&mut self, delay: Duration) {
        (**self).pause(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_thread_pacer_sleeps() {
        let start = Instant::now();
        ThreadPacer.pause(Duration::from_millis(2));
        assert!(start.elapsed() >= Duration::from_millis(2));
    }

    #[test]
    fn test_no_pacing_returns_immediately() {
        let start = Instant::now();
        NoPacing.pause(Duration::from_secs(60));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
