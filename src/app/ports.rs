//! Port traits: the hexagonal boundary between the protocol core and the
//! outside world.
//!
//! ```text
//!   Poller / UI ──▶ DeviceSession ──▶ Transport ──▶ board
//!                        │
//!                        └──▶ EventSink ──▶ log / channel / test recorder
//! ```
//!
//! Delays go through [`embedded_hal::delay::DelayNs`], so settle timing is
//! injected the same way on real hardware and in tests.

use crate::device::DeviceKind;
use crate::error::LinkError;

use super::events::LinkEvent;

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: core → logging / UI)
// ───────────────────────────────────────────────────────────────

/// Sessions emit structured [`LinkEvent`]s through this port.  Adapters
/// decide where they go (log records, a channel to a UI thread, a test
/// recorder).
pub trait EventSink {
    fn emit(&mut self, event: &LinkEvent);
}

/// Records every event in order.
impl EventSink for Vec<LinkEvent> {
    fn emit(&mut self, event: &LinkEvent) {
        self.push(event.clone());
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&mut self, event: &LinkEvent) {
        (**self).emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Session capability (driving port: poller → core)
// ───────────────────────────────────────────────────────────────

/// What every board session offers a scheduler, independent of which
/// board it talks to.
///
/// Board-specific commands (`set_desired_temperature`, `set_position`, ...)
/// live on the concrete session types.
pub trait DeviceSession {
    fn kind(&self) -> DeviceKind;

    /// Open the owned transport.
    fn open(&mut self) -> Result<(), LinkError>;

    /// Release the owned transport.
    fn close(&mut self) -> Result<(), LinkError>;

    fn is_open(&self) -> bool;

    /// Run one full poll sequence.  Never fails: a failed exchange keeps
    /// the previous value and is reported through the event sink.
    fn update(&mut self);
}
