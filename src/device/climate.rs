//! Climate board session (air conditioner controller).
//!
//! Poll sequence per `update()`:
//! ```text
//!  0x03 → frac ┐
//!  0x04 → int  ┴─ ambient temperature = int + frac / 10
//!  0x05 → raw     fan speed
//! ```
//! No pacing delays between reads; the board answers each request
//! before accepting the next.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::app::events::LinkEvent;
use crate::app::ports::{DeviceSession, EventSink};
use crate::error::LinkError;
use crate::link::channels::{AMBIENT_TEMPERATURE, DESIRED_TEMPERATURE, FAN};
use crate::link::codec::{CLIMATE_SETPOINT, Setpoint, encode_setpoint};
use crate::link::transport::Transport;

use super::line::{Line, Pacing};
use super::{DeviceKind, SessionState};

/// Protocol delays for the climate board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClimateTiming {
    /// Gap between the integer and fractional setpoint packets; the board
    /// polls its UART and needs this window to latch the first packet.
    pub packet_settle: Duration,
}

impl Default for ClimateTiming {
    fn default() -> Self {
        Self {
            packet_settle: Duration::from_millis(40),
        }
    }
}

/// Last known climate board state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClimateSnapshot {
    pub ambient_c: f32,
    pub fan_speed: u8,
    /// Most recently *requested* setpoint, not a confirmed one.
    pub desired_c: f32,
}

pub struct ClimateSession<T, D, S> {
    line: Line<T, D, S>,
    timing: ClimateTiming,
    snapshot: ClimateSnapshot,
}

impl<T, D, S> ClimateSession<T, D, S>
where
    T: Transport,
    D: DelayNs,
    S: EventSink,
{
    pub fn new(transport: T, delay: D, sink: S, timing: ClimateTiming) -> Self {
        Self {
            line: Line::new(DeviceKind::Climate, transport, delay, sink),
            timing,
            snapshot: ClimateSnapshot::default(),
        }
    }

    /// Request a new target temperature.
    ///
    /// The value is recorded as desired before transmission, so
    /// [`desired_temperature`](Self::desired_temperature) reflects the latest
    /// request even if the write fails.  A closed line is rejected without
    /// recording anything.
    ///
    /// The value is not range-checked: the integer part is masked to the
    /// packet's six bits, so integrators must keep requests within 0-63 °C
    /// themselves.  The shading session, by contrast, clamps its input.
    pub fn set_desired_temperature(&mut self, celsius: f32) -> Result<Setpoint, LinkError> {
        if !self.line.is_open() {
            self.line.command_failed(DESIRED_TEMPERATURE, LinkError::NotOpen);
            return Err(LinkError::NotOpen);
        }

        self.snapshot.desired_c = celsius;
        let setpoint = encode_setpoint(celsius, &CLIMATE_SETPOINT);
        self.line
            .send_setpoint(DESIRED_TEMPERATURE, setpoint, self.timing.packet_settle)?;
        Ok(setpoint)
    }

    pub fn ambient_temperature(&self) -> f32 {
        self.snapshot.ambient_c
    }

    pub fn fan_speed(&self) -> u8 {
        self.snapshot.fan_speed
    }

    pub fn desired_temperature(&self) -> f32 {
        self.snapshot.desired_c
    }

    pub fn snapshot(&self) -> ClimateSnapshot {
        self.snapshot
    }

    pub fn state(&self) -> SessionState {
        self.line.state()
    }

    pub fn transport(&self) -> &T {
        self.line.transport()
    }

    /// Direct access to the owned line, e.g. for fault injection.
    pub fn transport_mut(&mut self) -> &mut T {
        self.line.transport_mut()
    }

    pub fn sink(&self) -> &S {
        self.line.sink()
    }
}

impl<T, D, S> DeviceSession for ClimateSession<T, D, S>
where
    T: Transport,
    D: DelayNs,
    S: EventSink,
{
    fn kind(&self) -> DeviceKind {
        DeviceKind::Climate
    }

    fn open(&mut self) -> Result<(), LinkError> {
        self.line.open()
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.line.close()
    }

    fn is_open(&self) -> bool {
        self.line.is_open()
    }

    /// Unlike the shading board, no input is discarded at the start of a
    /// cycle: a byte that arrives after its read timed out is taken as the
    /// answer to the next request.
    fn update(&mut self) {
        if !self.line.begin_poll() {
            return;
        }

        match self.line.read_pair(&AMBIENT_TEMPERATURE, Pacing::NONE) {
            Ok(celsius) => self.snapshot.ambient_c = celsius,
            Err(e) => self.line.stale(AMBIENT_TEMPERATURE.label, e),
        }

        match self.line.request(FAN.code, Duration::ZERO) {
            Ok(speed) => self.snapshot.fan_speed = speed,
            Err(e) => self.line.stale(FAN.label, e),
        }

        let snapshot = self.snapshot;
        self.line.emit(LinkEvent::Climate(snapshot));
    }
}
