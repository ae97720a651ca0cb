//! Outbound diagnostic events.
//!
//! Sessions emit these through the [`EventSink`](super::ports::EventSink)
//! port handed to them at construction.  Adapters on the other side decide
//! what to do with them.

use crate::device::DeviceKind;
use crate::device::climate::ClimateSnapshot;
use crate::device::shading::ShadingSnapshot;
use crate::error::LinkError;

/// Structured events emitted by the protocol core.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// The session's line was opened.
    Opened { device: DeviceKind, port: String },

    /// Opening the line failed; the session stays closed.
    OpenFailed { device: DeviceKind, port: String, error: LinkError },

    /// The session's line was closed.
    Closed { device: DeviceKind },

    /// A read exchange failed; the cached value for `channel` is stale.
    ExchangeFailed {
        device: DeviceKind,
        channel: &'static str,
        error: LinkError,
    },

    /// A two-packet setpoint was written.
    SetpointSent {
        device: DeviceKind,
        channel: &'static str,
        bytes: [u8; 2],
    },

    /// A single command byte was written.
    CommandSent {
        device: DeviceKind,
        channel: &'static str,
        byte: u8,
    },

    /// A setpoint or command could not be written.
    CommandFailed {
        device: DeviceKind,
        channel: &'static str,
        error: LinkError,
    },

    /// Climate board state after a poll.
    Climate(ClimateSnapshot),

    /// Shading board state after a poll.
    Shading(ShadingSnapshot),
}
