//! Fuzz target: session decoding of arbitrary board responses
//!
//! The first bytes become the raw answer to each read code (a zero-length
//! tail mutes the rest), then both sessions poll once.  Decoding must
//! never panic and the shade position must stay within 0-100.
//!
//! cargo fuzz run fuzz_board_responses

#![no_main]

use homelink::adapters::sim::{BoardKind, SimulatedBoard};
use homelink::adapters::time::VirtualDelay;
use homelink::app::ports::DeviceSession;
use homelink::device::climate::{ClimateSession, ClimateTiming};
use homelink::device::shading::{ShadingSession, ShadingTiming};
use libfuzzer_sys::fuzz_target;

fn board(kind: BoardKind, data: &[u8]) -> SimulatedBoard {
    let mut b = SimulatedBoard::new(kind);
    for code in 0x01..=0x08u8 {
        match data.get(usize::from(code - 1)) {
            Some(&byte) => b.force_response(code, byte),
            None => b.mute(code),
        }
    }
    b
}

fuzz_target!(|data: &[u8]| {
    let mut shading = ShadingSession::new(
        board(BoardKind::Shading, data),
        VirtualDelay::new(),
        Vec::new(),
        ShadingTiming::default(),
    );
    let _ = shading.open();
    shading.update();
    let p = shading.position();
    assert!((0.0..=100.0).contains(&p), "position {p} out of range");

    let mut climate = ClimateSession::new(
        board(BoardKind::Climate, data),
        VirtualDelay::new(),
        Vec::new(),
        ClimateTiming::default(),
    );
    let _ = climate.open();
    climate.update();
    assert!(climate.ambient_temperature().is_finite());
});
