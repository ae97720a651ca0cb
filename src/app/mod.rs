//! Application boundary: the ports the protocol core is driven through
//! and the events it emits.
//!
//! Nothing in here touches a serial line; concrete I/O lives in
//! [`crate::adapters`].

pub mod events;
pub mod ports;
