//! Byte-level protocol shared by both controller boards.
//!
//! ```text
//!   Session ──▶ codec (packets, paired decode) ──▶ Transport ──▶ board
//! ```
//!
//! The link is strictly half-duplex: one request byte, then at most one
//! response byte, before the next request.

pub mod channels;
pub mod codec;
pub mod transport;
