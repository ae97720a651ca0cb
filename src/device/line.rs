//! Shared exchange plumbing for board sessions.
//!
//! Bundles the owned transport, delay provider and event sink, and turns
//! raw transport results into events.  Session types add the per-board
//! sequence on top.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::app::events::LinkEvent;
use crate::app::ports::EventSink;
use crate::error::LinkError;
use crate::link::channels::PairedChannel;
use crate::link::codec::{Setpoint, decode_pair};
use crate::link::transport::Transport;

use super::{DeviceKind, SessionState};

/// Delays wrapped around each request of a paired read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pacing {
    /// Between the fractional and integer request of one pair.
    pub gap: Duration,
    /// Between a request and reading its response.
    pub settle: Duration,
}

impl Pacing {
    pub const NONE: Self = Self {
        gap: Duration::ZERO,
        settle: Duration::ZERO,
    };
}

pub(crate) struct Line<T, D, S> {
    kind: DeviceKind,
    state: SessionState,
    transport: T,
    delay: D,
    sink: S,
}

impl<T, D, S> Line<T, D, S>
where
    T: Transport,
    D: DelayNs,
    S: EventSink,
{
    pub fn new(kind: DeviceKind, transport: T, delay: D, sink: S) -> Self {
        Self {
            kind,
            state: SessionState::Idle,
            transport,
            delay,
            sink,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn open(&mut self) -> Result<(), LinkError> {
        if self.transport.is_open() {
            return Ok(());
        }
        let port = self.transport.port_name().to_owned();
        match self.transport.open() {
            Ok(()) => {
                self.state = SessionState::Open;
                self.emit(LinkEvent::Opened {
                    device: self.kind,
                    port,
                });
                Ok(())
            }
            Err(error) => {
                self.emit(LinkEvent::OpenFailed {
                    device: self.kind,
                    port,
                    error,
                });
                Err(error)
            }
        }
    }

    pub fn close(&mut self) -> Result<(), LinkError> {
        if !self.transport.is_open() {
            return Ok(());
        }
        let result = self.transport.close();
        if result.is_ok() {
            self.state = SessionState::Closed;
            self.emit(LinkEvent::Closed { device: self.kind });
        }
        result
    }

    /// Start a poll cycle.  Returns `false` when the line is not open and
    /// the cycle must be skipped.
    pub fn begin_poll(&mut self) -> bool {
        if !self.transport.is_open() {
            return false;
        }
        self.state = SessionState::Polling;
        true
    }

    // ── Reads ─────────────────────────────────────────────────

    pub fn pause(&mut self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        self.delay
            .delay_us(u32::try_from(duration.as_micros()).unwrap_or(u32::MAX));
    }

    /// One request byte, an optional settle, one response byte.
    pub fn request(&mut self, code: u8, settle: Duration) -> Result<u8, LinkError> {
        self.transport.send_byte(code)?;
        self.pause(settle);
        self.transport.read_byte()
    }

    /// Fractional request, then integer request; both must answer.
    pub fn read_pair(&mut self, channel: &PairedChannel, pacing: Pacing) -> Result<f32, LinkError> {
        let fractional = self.request(channel.fractional, pacing.settle);
        self.pause(pacing.gap);
        let integer = self.request(channel.integer, pacing.settle);
        decode_pair(channel, fractional, integer)
    }

    /// Drop leftovers from a previous cycle (late answers to timed-out
    /// requests would otherwise be read as the next response).
    pub fn discard_input(&mut self) {
        if let Err(e) = self.transport.discard_input() {
            debug!("{}: discard failed: {}", self.kind, e);
        }
    }

    /// Report a failed read; the caller keeps its previous value.
    pub fn stale(&mut self, channel: &'static str, error: LinkError) {
        self.emit(LinkEvent::ExchangeFailed {
            device: self.kind,
            channel,
            error,
        });
    }

    // ── Writes ────────────────────────────────────────────────

    /// Integer packet, settle delay, fractional packet.
    pub fn send_setpoint(
        &mut self,
        channel: &'static str,
        setpoint: Setpoint,
        settle: Duration,
    ) -> Result<(), LinkError> {
        let [int, frac] = setpoint.bytes();
        let result = self.write_two(int, frac, settle);
        match result {
            Ok(()) => {
                self.emit(LinkEvent::SetpointSent {
                    device: self.kind,
                    channel,
                    bytes: [int, frac],
                });
            }
            Err(error) => self.command_failed(channel, error),
        }
        result
    }

    pub fn send_command(&mut self, channel: &'static str, byte: u8) -> Result<(), LinkError> {
        let result = self.transport.send_byte(byte);
        match result {
            Ok(()) => {
                self.emit(LinkEvent::CommandSent {
                    device: self.kind,
                    channel,
                    byte,
                });
            }
            Err(error) => self.command_failed(channel, error),
        }
        result
    }

    pub fn command_failed(&mut self, channel: &'static str, error: LinkError) {
        self.emit(LinkEvent::CommandFailed {
            device: self.kind,
            channel,
            error,
        });
    }

    pub fn emit(&mut self, event: LinkEvent) {
        self.sink.emit(&event);
    }

    fn write_two(&mut self, first: u8, second: u8, settle: Duration) -> Result<(), LinkError> {
        self.transport.send_byte(first)?;
        self.pause(settle);
        self.transport.send_byte(second)
    }
}
