//! Poller driving both simulated boards, events collected over a channel.

use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use homelink::adapters::sim::{BoardKind, SimulatedBoard};
use homelink::adapters::time::VirtualDelay;
use homelink::app::events::LinkEvent;
use homelink::config::LinkConfig;
use homelink::device::{ClimateSession, DeviceKind, ShadingSession};
use homelink::poller::Poller;

fn rig(config: &LinkConfig) -> (Poller, VirtualDelay, Receiver<LinkEvent>) {
    let (tx, rx) = mpsc::channel::<LinkEvent>();
    let delay = VirtualDelay::new();

    let mut climate_board = SimulatedBoard::new(BoardKind::Climate);
    climate_board.registers_mut().ambient_c = 23.4;
    let mut shading_board = SimulatedBoard::new(BoardKind::Shading);
    shading_board.registers_mut().position = 70.0;

    let climate = ClimateSession::new(climate_board, delay.clone(), tx.clone(), config.climate.timing());
    let shading = ShadingSession::new(shading_board, delay.clone(), tx, config.shading.timing());

    let mut poller = Poller::new();
    poller.add(
        Box::new(climate),
        Duration::from_millis(config.climate.line.poll_interval_ms.into()),
    );
    poller.add(
        Box::new(shading),
        Duration::from_millis(config.shading.line.poll_interval_ms.into()),
    );
    (poller, delay, rx)
}

#[test]
fn default_cadence_over_two_seconds() {
    let (mut poller, delay, rx) = rig(&LinkConfig::default());
    assert_eq!(poller.open_all(), 2);

    let mut now = 0;
    while now <= 2000 {
        poller.tick(now);
        now += 100;
    }

    let events: Vec<_> = rx.try_iter().collect();
    let climate = events.iter().filter(|e| matches!(e, LinkEvent::Climate(_))).count();
    let shading = events.iter().filter(|e| matches!(e, LinkEvent::Shading(_))).count();
    // 700 ms: 0, 700, 1400.  900 ms: 0, 900, 1800.
    assert_eq!(climate, 3);
    assert_eq!(shading, 3);
    // Only the shading board pauses: 380 ms per cycle.
    assert_eq!(delay.elapsed(), Duration::from_millis(3 * 380));
}

#[test]
fn snapshots_carry_simulated_values() {
    let (mut poller, _, rx) = rig(&LinkConfig::default());
    poller.open_all();
    poller.tick(0);

    let mut saw = (false, false);
    for event in rx.try_iter() {
        match event {
            LinkEvent::Climate(c) => {
                assert!((c.ambient_c - 23.4).abs() < 1e-3);
                saw.0 = true;
            }
            LinkEvent::Shading(s) => {
                assert!((s.position - 70.0).abs() < 1e-3);
                saw.1 = true;
            }
            _ => {}
        }
    }
    assert_eq!(saw, (true, true));
}

#[test]
fn closed_sessions_emit_nothing_on_tick() {
    let (mut poller, _, rx) = rig(&LinkConfig::default());
    poller.open_all();
    poller.close_all();
    let _ = rx.try_iter().count();

    assert_eq!(poller.tick(0), 2);
    assert_eq!(rx.try_iter().count(), 0);
}

#[test]
fn session_lookup_by_slot() {
    let (mut poller, _, _rx) = rig(&LinkConfig::default());
    assert_eq!(
        poller.kinds().collect::<Vec<_>>(),
        vec![DeviceKind::Climate, DeviceKind::Shading]
    );
    let shading = poller.session_mut(1).unwrap();
    shading.open().unwrap();
    assert!(shading.is_open());
    assert!(poller.session_mut(2).is_none());
}
