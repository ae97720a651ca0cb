//! Board sessions: one stateful coordinator per controller board.
//!
//! Each session exclusively owns its [`Transport`](crate::link::transport::Transport),
//! its delay provider and its event sink.  All operations take `&mut self`,
//! so a poll and a setpoint write on the same session can never interleave
//! their request bytes.  Sharing a session across threads means wrapping
//! it in a `Mutex`, which then guards the whole exchange including the
//! settle delays.

pub mod climate;
mod line;
pub mod shading;

use core::fmt;

pub use climate::ClimateSession;
pub use shading::ShadingSession;

/// Which board a session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Climate,
    Shading,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Climate => write!(f, "climate"),
            Self::Shading => write!(f, "shading"),
        }
    }
}

/// Session lifecycle.
///
/// ```text
///  Idle ──open──▶ Open ──update──▶ Polling ──close──▶ Closed
///                  ▲                                   │
///                  └───────────────open────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, never opened.
    Idle,
    /// Line open, no poll yet.
    Open,
    /// At least one poll ran on the open line.
    Polling,
    /// Line released.
    Closed,
}
