//! Periodic poll driver.
//!
//! Holds a set of [`DeviceSession`]s, each with its own interval, and runs
//! `update()` on every session that is due when [`Poller::tick`] is
//! called.  The caller owns the clock: it passes monotonic milliseconds in
//! and sleeps for [`Poller::until_next_due`] between ticks.
//!
//! ```text
//!   now_ms ──▶ tick() ──▶ due? ──yes──▶ session.update()
//!                              │               │
//!                              no              ▼
//!                              └──────▶ next_due = now + interval
//! ```
//!
//! Single-threaded: a session is never re-entered before its `update()`
//! returns.

use core::time::Duration;

use log::{info, warn};

use crate::app::ports::DeviceSession;
use crate::device::DeviceKind;

struct PollEntry {
    session: Box<dyn DeviceSession>,
    interval_ms: u64,
    next_due_ms: u64,
}

#[derive(Default)]
pub struct Poller {
    entries: Vec<PollEntry>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session.  It is due on the first tick.  Returns its slot.
    pub fn add(&mut self, session: Box<dyn DeviceSession>, interval: Duration) -> usize {
        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX).max(1);
        info!(
            "Poller: added {} every {} ms at slot {}",
            session.kind(),
            interval_ms,
            self.entries.len()
        );
        self.entries.push(PollEntry {
            session,
            interval_ms,
            next_due_ms: 0,
        });
        self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = DeviceKind> + '_ {
        self.entries.iter().map(|e| e.session.kind())
    }

    pub fn session_mut(&mut self, slot: usize) -> Option<&mut (dyn DeviceSession + 'static)> {
        self.entries.get_mut(slot).map(|e| e.session.as_mut())
    }

    /// Open every session.  A session that fails to open stays closed and
    /// is skipped by its polls.  Returns how many lines are open.
    pub fn open_all(&mut self) -> usize {
        let mut open = 0;
        for entry in &mut self.entries {
            match entry.session.open() {
                Ok(()) => open += 1,
                Err(e) => warn!("Poller: {} left closed: {}", entry.session.kind(), e),
            }
        }
        open
    }

    /// Update every due session.  Returns how many were updated.
    pub fn tick(&mut self, now_ms: u64) -> usize {
        let mut ran = 0;
        for entry in &mut self.entries {
            if now_ms < entry.next_due_ms {
                continue;
            }
            entry.session.update();
            entry.next_due_ms = now_ms.saturating_add(entry.interval_ms);
            ran += 1;
        }
        ran
    }

    /// Time until the earliest session is due, `None` with no sessions.
    pub fn until_next_due(&self, now_ms: u64) -> Option<Duration> {
        self.entries
            .iter()
            .map(|e| e.next_due_ms.saturating_sub(now_ms))
            .min()
            .map(Duration::from_millis)
    }

    pub fn close_all(&mut self) {
        for entry in &mut self.entries {
            if let Err(e) = entry.session.close() {
                warn!("Poller: closing {} failed: {}", entry.session.kind(), e);
            }
        }
    }
}
