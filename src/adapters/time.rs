//! Time adapters.
//!
//! - [`HostDelay`]: real sleeping through `std::thread::sleep`, used with
//!   serial lines.
//! - [`HostClock`]: monotonic milliseconds since start, drives the poller.
//! - [`VirtualDelay`]: records requested delays without sleeping; clones
//!   share one counter, so a test can hand one copy to a session and keep
//!   another to inspect elapsed time.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

/// Blocking delay on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostDelay;

impl DelayNs for HostDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// Monotonic clock anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct HostClock {
    start: Instant,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since construction (saturates at `u64::MAX`).
    pub fn uptime_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Virtual time for tests and simulation.
#[derive(Debug, Clone, Default)]
pub struct VirtualDelay {
    elapsed_ns: Arc<AtomicU64>,
}

impl VirtualDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time requested so far across all clones.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_ns.load(Ordering::Relaxed))
    }

    /// Virtual milliseconds, for feeding a poller.
    pub fn now_ms(&self) -> u64 {
        self.elapsed_ns.load(Ordering::Relaxed) / 1_000_000
    }

    /// Move time forward without a session asking for it.
    pub fn advance(&self, by: Duration) {
        let ns = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_ns.fetch_add(ns, Ordering::Relaxed);
    }
}

impl DelayNs for VirtualDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns.fetch_add(u64::from(ns), Ordering::Relaxed);
    }
}
