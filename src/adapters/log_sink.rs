//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by rendering each [`LinkEvent`] as one `log`
//! record.  Where the records end up is the logger's business (the binary
//! installs `env_logger`).

use log::{debug, info, warn};

use crate::app::events::LinkEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`LinkEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &LinkEvent) {
        match event {
            LinkEvent::Climate(c) => {
                info!(
                    "CLIMATE | ambient={:.1}\u{00b0}C | fan={} | desired={:.1}\u{00b0}C",
                    c.ambient_c, c.fan_speed, c.desired_c,
                );
            }
            LinkEvent::Shading(s) => {
                let target = s
                    .target_position
                    .map_or_else(|| "-".to_owned(), |t| format!("{t:.1}%"));
                info!(
                    "SHADING | light={:.1} | p={:.1}hPa | T={:.1}\u{00b0}C | \
                     pos={:.1}% target={} | mode={:?}",
                    s.light_intensity,
                    s.outdoor_pressure,
                    s.outdoor_c,
                    s.position,
                    target,
                    s.mode,
                );
            }
            LinkEvent::Opened { device, port } => info!("LINK | {device} opened {port}"),
            LinkEvent::OpenFailed {
                device,
                port,
                error,
            } => warn!("LINK | {device} cannot open {port}: {error}"),
            LinkEvent::Closed { device } => info!("LINK | {device} closed"),
            LinkEvent::ExchangeFailed {
                device,
                channel,
                error,
            } => debug!("STALE | {device}.{channel}: {error}"),
            LinkEvent::SetpointSent {
                device,
                channel,
                bytes,
            } => info!(
                "CMD | {device}.{channel} <- [0x{:02X}, 0x{:02X}]",
                bytes[0], bytes[1]
            ),
            LinkEvent::CommandSent {
                device,
                channel,
                byte,
            } => info!("CMD | {device}.{channel} <- [0x{byte:02X}]"),
            LinkEvent::CommandFailed {
                device,
                channel,
                error,
            } => warn!("CMD | {device}.{channel} failed: {error}"),
        }
    }
}
