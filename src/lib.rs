//! HomeLink host driver library.
//!
//! Talks to the two home-automation controller boards (climate and
//! shading) over their byte-oriented serial protocol.  Everything above
//! the [`link::transport::Transport`] trait is pure logic and runs the same
//! against a real serial line or the in-process simulator.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Adapters: SerialTransport · SimulatedBoard · LogEventSink│
//! │            HostDelay · VirtualDelay · mpsc::Sender         │
//! │  ───────────────── Port trait boundary ────────────────── │
//! │  Sessions: ClimateSession · ShadingSession (DeviceSession) │
//! │  Link:     channels · codec · transport                    │
//! │  Poller:   interval-driven update()                        │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod device;
pub mod error;
pub mod link;
pub mod poller;

pub use error::{Error, LinkError, Result};
