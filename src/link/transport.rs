//! Transport abstraction: one exclusively owned byte channel to a board.
//!
//! Concrete implementations:
//! - [`SerialTransport`](crate::adapters::serial::SerialTransport): a real
//!   serial line via the `serialport` crate
//! - [`SimulatedBoard`](crate::adapters::sim::SimulatedBoard): in-process
//!   firmware emulator
//!
//! Sessions are generic over `Transport`, so adding a new line type
//! requires zero changes to the protocol logic.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::error::LinkError;

/// Sentinel returned by [`Transport::read_raw`] when no byte arrived.
pub const NO_DATA: i16 = -1;

/// Bounded wait for a single response byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTiming {
    /// Interval between two checks for pending input.
    pub poll_step: Duration,
    /// Total time a read may wait.
    pub timeout: Duration,
}

impl Default for ReadTiming {
    fn default() -> Self {
        Self {
            poll_step: Duration::from_millis(10),
            timeout: Duration::from_millis(500),
        }
    }
}

impl ReadTiming {
    /// Number of poll steps that fit in the timeout.
    pub fn steps(&self) -> u32 {
        let step = self.poll_step.as_micros().max(1);
        u32::try_from(self.timeout.as_micros() / step).unwrap_or(u32::MAX)
    }
}

/// Byte-oriented, half-duplex link to one board.
///
/// Implementations never block longer than their [`ReadTiming`] and never
/// perform I/O while closed.
pub trait Transport {
    /// Record the line identity.  Does not open anything and never fails;
    /// an unusable name simply fails the next [`open`](Self::open).
    fn configure(&mut self, port: &str, baud_rate: u32);

    /// Name of the configured line, for diagnostics.
    fn port_name(&self) -> &str;

    /// Open the line and discard stale buffers.  Opening an open line is a
    /// no-op success; a failed open leaves the line closed and retryable.
    fn open(&mut self) -> Result<(), LinkError>;

    /// Close the line.  Closing a closed line is a no-op success.
    fn close(&mut self) -> Result<(), LinkError>;

    fn is_open(&self) -> bool;

    /// Write one byte.
    fn send_byte(&mut self, byte: u8) -> Result<(), LinkError>;

    /// Wait (bounded) for one byte.
    fn read_byte(&mut self) -> Result<u8, LinkError>;

    /// Drop any input already buffered.
    fn discard_input(&mut self) -> Result<(), LinkError>;

    /// [`read_byte`](Self::read_byte) folded into the `-1` sentinel form.
    fn read_raw(&mut self) -> i16 {
        self.read_byte().map_or(NO_DATA, i16::from)
    }
}

/// Poll `ready` every `timing.poll_step` until it reports `true` or the
/// timeout elapses.
///
/// `ready` is checked once more after the last step, so a byte landing
/// during the final sleep is still collected.  Errors from `ready` end the
/// wait immediately.
pub fn poll_until_ready<D, F>(delay: &mut D, timing: &ReadTiming, mut ready: F) -> Result<(), LinkError>
where
    D: DelayNs + ?Sized,
    F: FnMut() -> Result<bool, LinkError>,
{
    let step_us = u32::try_from(timing.poll_step.as_micros()).unwrap_or(u32::MAX);
    let mut remaining = timing.steps();

    loop {
        if ready()? {
            return Ok(());
        }
        if remaining == 0 {
            return Err(LinkError::Timeout);
        }
        delay.delay_us(step_us);
        remaining -= 1;
    }
}
