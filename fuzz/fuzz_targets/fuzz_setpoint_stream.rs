//! Fuzz target: arbitrary host byte streams into the emulated firmware
//!
//! Any sequence of packets and command codes must leave the shading
//! board at a position within 0-100, and the raw reader must only ever
//! report a byte or the `-1` sentinel.
//!
//! cargo fuzz run fuzz_setpoint_stream

#![no_main]

use homelink::adapters::sim::{BoardKind, SimulatedBoard};
use homelink::link::transport::{NO_DATA, Transport};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut board = SimulatedBoard::new(BoardKind::Shading);
    if board.open().is_err() {
        return;
    }
    for &byte in data {
        let _ = board.send_byte(byte);
        let raw = board.read_raw();
        assert!(raw == NO_DATA || (0..=255).contains(&raw));
    }
    let p = board.registers().position;
    assert!((0.0..=100.0).contains(&p), "position {p} out of range");
});
