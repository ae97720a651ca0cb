//! Shading session against a scripted line: order, pacing, clamping.

use std::time::Duration;

use homelink::LinkError;
use homelink::app::events::LinkEvent;
use homelink::app::ports::DeviceSession;
use homelink::device::DeviceKind;
use homelink::device::shading::{ControlMode, ShadingSession, ShadingTiming};

use crate::mock_link::{FakeDelay, Reply, ScriptedLink};

type Session = ShadingSession<ScriptedLink, FakeDelay, Vec<LinkEvent>>;

fn open_session(setup: impl FnOnce(&mut ScriptedLink)) -> (Session, FakeDelay) {
    let clock = FakeDelay::new();
    let mut link = ScriptedLink::new(clock.clone());
    setup(&mut link);
    let mut s = ShadingSession::new(link, clock.clone(), Vec::new(), ShadingTiming::default());
    s.open().unwrap();
    (s, clock)
}

fn healthy_board(l: &mut ScriptedLink) {
    l.answer(0x07, 3, 1)
        .answer(0x08, 42, 1)
        .answer(0x05, 2, 1)
        .answer(0x06, 13, 1)
        .answer(0x03, 5, 1)
        .answer(0x04, 8, 1)
        .answer(0x01, 0, 1)
        .answer(0x02, 60, 1);
}

#[test]
fn poll_order_and_values() {
    let (mut s, _) = open_session(healthy_board);

    s.update();

    assert_eq!(
        s.transport().written(),
        vec![0x07, 0x08, 0x05, 0x06, 0x03, 0x04, 0x01, 0x02]
    );
    assert!((s.light_intensity() - 42.3).abs() < 1e-3);
    assert!((s.outdoor_pressure() - 1013.2).abs() < 1e-3);
    assert!((s.outdoor_temperature() - 8.5).abs() < 1e-4);
    assert!((s.position() - 60.0).abs() < 1e-4);
    assert!(matches!(s.sink().last(), Some(LinkEvent::Shading(_))));
}

#[test]
fn every_request_after_the_first_waits_for_the_gap() {
    let (mut s, _) = open_session(healthy_board);

    s.update();

    // settle 30 ms after each request, gap 20 ms before the next one.
    let expected: Vec<_> = (0..8u64).map(|i| Duration::from_millis(i * 50)).collect();
    assert_eq!(s.transport().write_times(), expected);
}

#[test]
fn stale_input_is_flushed_each_cycle() {
    let (mut s, _) = open_session(healthy_board);
    s.transport_mut().preload(0x77);

    s.update();

    assert_eq!(s.transport().discards, 1);
    assert!((s.light_intensity() - 42.3).abs() < 1e-3);
}

#[test]
fn position_above_range_is_clamped() {
    let (mut s, _) = open_session(|l| {
        l.answer(0x01, 9, 1).answer(0x02, 200, 1);
    });

    s.update();

    assert_eq!(s.position(), 100.0);
}

#[test]
fn lost_pressure_integer_keeps_old_pressure_only() {
    let (mut s, _) = open_session(|l| {
        healthy_board(l);
        l.answer(0x07, 1, 1)
            .answer(0x08, 50, 1)
            .answer(0x05, 9, 1)
            .script(0x06, &[Reply::Silent])
            .answer(0x03, 0, 1)
            .answer(0x04, 10, 1)
            .answer(0x01, 0, 1)
            .answer(0x02, 20, 1);
    });
    s.update();

    s.update();

    assert!((s.outdoor_pressure() - 1013.2).abs() < 1e-3);
    assert!((s.light_intensity() - 50.1).abs() < 1e-3);
    assert!((s.outdoor_temperature() - 10.0).abs() < 1e-4);
    assert!((s.position() - 20.0).abs() < 1e-4);
    assert!(s.sink().contains(&LinkEvent::ExchangeFailed {
        device: DeviceKind::Shading,
        channel: "outdoor_pressure",
        error: LinkError::Timeout,
    }));
}

#[test]
fn set_position_full_scale() {
    let (mut s, clock) = open_session(|_| {});

    s.set_position(150.0).unwrap();

    assert_eq!(s.transport().written(), vec![0xC0 | 50, 0x80]);
    assert_eq!(
        s.transport().write_times(),
        vec![Duration::ZERO, Duration::from_millis(20)]
    );
    assert_eq!(clock.now(), Duration::from_millis(20));
    assert_eq!(s.target_position(), Some(100.0));
    assert_eq!(s.mode(), ControlMode::Manual);
}

#[test]
fn set_position_half_value_with_digit() {
    let (mut s, _) = open_session(|_| {});

    s.set_position(37.0).unwrap();

    // 37 / 2 = 18.5
    assert_eq!(s.transport().written(), vec![0xC0 | 18, 0x80 | 5]);
}

#[test]
fn failed_position_write_keeps_previous_target() {
    let (mut s, _) = open_session(|_| {});
    s.set_position(40.0).unwrap();
    s.transport_mut().set_fail_writes(true);

    assert!(s.set_position(80.0).is_err());

    assert_eq!(s.target_position(), Some(40.0));
    assert!(matches!(
        s.sink().last(),
        Some(LinkEvent::CommandFailed {
            channel: "target_position",
            ..
        })
    ));
}

#[test]
fn auto_mode_twice_equals_once() {
    let (mut s, _) = open_session(|_| {});

    s.set_auto_mode().unwrap();
    let after_one = (s.mode(), s.transport().written());
    s.set_auto_mode().unwrap();

    assert_eq!(s.mode(), after_one.0);
    assert_eq!(s.transport().written(), vec![0x09, 0x09]);
    assert_eq!(after_one.1, vec![0x09]);
}

#[test]
fn closed_session_skips_poll() {
    let (mut s, clock) = open_session(healthy_board);
    s.close().unwrap();

    s.update();

    assert!(s.transport().writes.is_empty());
    assert_eq!(clock.now(), Duration::ZERO);
    assert_eq!(s.kind(), DeviceKind::Shading);
}
