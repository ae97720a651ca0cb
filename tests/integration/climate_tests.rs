//! Climate session against a scripted line.

use std::time::Duration;

use homelink::LinkError;
use homelink::app::events::LinkEvent;
use homelink::app::ports::DeviceSession;
use homelink::device::climate::{ClimateSession, ClimateTiming};
use homelink::device::{DeviceKind, SessionState};

use crate::mock_link::{FakeDelay, Reply, ScriptedLink};

type Session = ClimateSession<ScriptedLink, FakeDelay, Vec<LinkEvent>>;

fn open_session(setup: impl FnOnce(&mut ScriptedLink)) -> (Session, FakeDelay) {
    let clock = FakeDelay::new();
    let mut link = ScriptedLink::new(clock.clone());
    setup(&mut link);
    let mut s = ClimateSession::new(link, clock.clone(), Vec::new(), ClimateTiming::default());
    s.open().unwrap();
    (s, clock)
}

#[test]
fn poll_decodes_ambient_and_fan() {
    let (mut s, _) = open_session(|l| {
        l.answer(0x03, 5, 1).answer(0x04, 21, 1).answer(0x05, 2, 1);
    });

    s.update();

    assert!((s.ambient_temperature() - 21.5).abs() < 1e-4);
    assert_eq!(s.fan_speed(), 2);
    assert_eq!(s.transport().written(), vec![0x03, 0x04, 0x05]);
    assert_eq!(s.state(), SessionState::Polling);
    assert_eq!(
        s.sink().last(),
        Some(&LinkEvent::Climate(s.snapshot())),
        "snapshot is emitted after every poll"
    );
}

#[test]
fn missing_integer_byte_keeps_previous_temperature() {
    let (mut s, _) = open_session(|l| {
        l.answer(0x03, 5, 2)
            .script(0x04, &[Reply::Byte(21), Reply::Silent])
            .answer(0x05, 1, 2);
    });

    s.update();
    s.update();

    assert!((s.ambient_temperature() - 21.5).abs() < 1e-4);
    let failures: Vec<_> = s
        .sink()
        .iter()
        .filter(|e| matches!(e, LinkEvent::ExchangeFailed { .. }))
        .collect();
    assert_eq!(
        failures,
        vec![&LinkEvent::ExchangeFailed {
            device: DeviceKind::Climate,
            channel: "ambient_temperature",
            error: LinkError::Timeout,
        }]
    );
}

#[test]
fn missing_fraction_byte_is_never_half_decoded() {
    let (mut s, _) = open_session(|l| {
        l.script(0x03, &[Reply::Silent]).answer(0x04, 30, 1).answer(0x05, 1, 1);
    });

    s.update();

    // The integer byte alone must not become 30.0.
    assert_eq!(s.ambient_temperature(), 0.0);
}

#[test]
fn silent_board_times_out_every_channel() {
    let (mut s, clock) = open_session(|_| {});

    s.update();

    // Three bounded waits of 500 ms each.
    assert_eq!(clock.now(), Duration::from_millis(1500));
    assert_eq!(
        s.sink()
            .iter()
            .filter(|e| matches!(e, LinkEvent::ExchangeFailed { .. }))
            .count(),
        2
    );
}

#[test]
fn setpoint_packets_are_separated_by_settle() {
    let (mut s, _) = open_session(|_| {});

    s.set_desired_temperature(22.5).unwrap();

    let link = s.transport();
    assert_eq!(link.written(), vec![0xD6, 0x85]);
    assert_eq!(
        link.write_times(),
        vec![Duration::ZERO, Duration::from_millis(40)]
    );
    assert!(s.sink().contains(&LinkEvent::SetpointSent {
        device: DeviceKind::Climate,
        channel: "desired_temperature",
        bytes: [0xD6, 0x85],
    }));
}

#[test]
fn custom_settle_is_honoured() {
    let clock = FakeDelay::new();
    let mut s = ClimateSession::new(
        ScriptedLink::new(clock.clone()),
        clock,
        Vec::new(),
        ClimateTiming {
            packet_settle: Duration::from_millis(75),
        },
    );
    s.open().unwrap();

    s.set_desired_temperature(18.0).unwrap();

    assert_eq!(s.transport().write_times()[1], Duration::from_millis(75));
}

#[test]
fn rounding_carry_reaches_the_wire() {
    let (mut s, _) = open_session(|_| {});

    let sp = s.set_desired_temperature(21.96).unwrap();

    assert_eq!((sp.integer, sp.fractional), (22, 0));
    assert_eq!(s.transport().written(), vec![0xC0 | 22, 0x80]);
}

#[test]
fn unclamped_setpoint_is_masked() {
    let (mut s, _) = open_session(|_| {});

    s.set_desired_temperature(70.0).unwrap();

    assert_eq!(s.transport().written()[0], 0xC0 | (70 & 0x3F));
    assert_eq!(s.desired_temperature(), 70.0);
}

#[test]
fn closed_session_rejects_setpoint_without_side_effects() {
    let (mut s, _) = open_session(|_| {});
    s.close().unwrap();

    assert_eq!(s.set_desired_temperature(19.0), Err(LinkError::NotOpen));
    assert_eq!(s.desired_temperature(), 0.0);
    assert!(s.transport().writes.is_empty());
    assert!(matches!(
        s.sink().last(),
        Some(LinkEvent::CommandFailed {
            error: LinkError::NotOpen,
            ..
        })
    ));
}

#[test]
fn failed_write_reports_io_error() {
    let (mut s, _) = open_session(|l| l.set_fail_writes(true));

    let res = s.set_desired_temperature(20.0);

    assert_eq!(res, Err(LinkError::Io(std::io::ErrorKind::BrokenPipe)));
    assert_eq!(s.desired_temperature(), 20.0);
}

#[test]
fn lifecycle_events() {
    let (mut s, _) = open_session(|_| {});
    s.close().unwrap();
    s.close().unwrap();

    assert_eq!(
        s.sink().as_slice(),
        &[
            LinkEvent::Opened {
                device: DeviceKind::Climate,
                port: "mock0".into(),
            },
            LinkEvent::Closed {
                device: DeviceKind::Climate
            },
        ]
    );
    assert!(!s.is_open());
    assert_eq!(s.kind(), DeviceKind::Climate);
}
