mod common;

use std::time::Duration;

use common::Rig;
use lift_core::{DoorCfg, ElevatorState, StandardElevator};
use proptest::prelude::*;
use rstest::rstest;

/// Elevator at floor 0 with the door just opened.
fn door_open(rig: &Rig) -> StandardElevator {
    let mut e = rig.elevator();
    e.request_floor(0);
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::DoorOpening);
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::DoorOpen);
    e
}

#[rstest]
#[case(3000)]
#[case(1200)]
#[case(100)]
fn closes_exactly_at_hold_duration(#[case] hold_ms: u64) {
    let mut rig = Rig::new(4, 0.0);
    rig.door_cfg = DoorCfg {
        hold_ms,
        ..DoorCfg::default()
    };
    let mut e = door_open(&rig);
    let t0 = e.door_opened_at().expect("timer armed");
    assert_eq!(e.now_ms(), t0);

    rig.clock.advance(Duration::from_millis(hold_ms - 1));
    e.process();
    assert_eq!(e.state(), ElevatorState::DoorOpen, "closed before hold elapsed");

    rig.clock.advance(Duration::from_millis(1));
    e.process();
    assert_eq!(e.state(), ElevatorState::DoorClosing);
}

#[test]
fn never_closes_early_at_tick_granularity() {
    let rig = Rig::new(4, 0.0);
    let mut e = door_open(&rig);
    let t0 = e.door_opened_at().expect("timer armed");
    loop {
        rig.step(&mut e);
        let elapsed = e.now_ms() - t0;
        if e.state() == ElevatorState::DoorClosing {
            assert!(elapsed >= 3000);
            break;
        }
        assert!(elapsed < 3000, "still open after hold: {elapsed}ms");
    }
}

#[test]
fn overload_rearms_until_max_open_timeout() {
    let rig = Rig::new(4, 0.0);
    let mut e = door_open(&rig);
    let t0 = e.door_opened_at().expect("timer armed");
    rig.load.set_raw(600); // 600 kg against a 500 kg threshold

    let mut rearmed = false;
    loop {
        rig.step(&mut e);
        assert!(e.overloaded());
        let elapsed = e.now_ms() - t0;
        if e.door_opened_at() != Some(t0) {
            rearmed = true;
        }
        if elapsed < 30_000 {
            assert_eq!(e.state(), ElevatorState::DoorOpen, "at {elapsed}ms");
        } else {
            assert_eq!(e.state(), ElevatorState::DoorClosing);
            break;
        }
    }
    assert!(rearmed, "hold timer never re-armed");
}

#[test]
fn overload_clearing_lets_door_close() {
    let rig = Rig::new(4, 0.0);
    let mut e = door_open(&rig);
    rig.load.set_raw(600);
    for _ in 0..50 {
        rig.step(&mut e);
    }
    assert_eq!(e.state(), ElevatorState::DoorOpen);
    rig.load.set_raw(100);
    rig.step_until(&mut e, 40, |e| e.state() == ElevatorState::DoorClosing);
}

#[test]
fn obstruction_while_closing_reopens() {
    let rig = Rig::new(4, 0.0);
    let mut e = door_open(&rig);
    rig.step_until(&mut e, 100, |e| e.state() == ElevatorState::DoorClosing);

    rig.obstruction.set(true);
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::DoorOpening);
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::DoorOpen);

    // Held open while the beam is blocked
    for _ in 0..60 {
        rig.step(&mut e);
        assert_eq!(e.state(), ElevatorState::DoorOpen);
    }
    rig.obstruction.set(false);
    rig.step_until(&mut e, 10, |e| e.state() == ElevatorState::Idle);
    assert_eq!(rig.door.last_angle(), Some(0));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn obstruction_during_closing_always_routes_to_opening(
        blocked in proptest::collection::vec(any::<bool>(), 50..400)
    ) {
        let rig = Rig::new(4, 0.0);
        let mut e = rig.elevator();
        e.request_floor(0);
        for b in blocked {
            rig.obstruction.set(b);
            let before = e.state();
            rig.step(&mut e);
            if before == ElevatorState::DoorClosing && b {
                prop_assert_eq!(e.state(), ElevatorState::DoorOpening);
            }
            prop_assert_ne!(e.state(), ElevatorState::Error);
            if before == ElevatorState::DoorClosing && e.state() == ElevatorState::Idle {
                prop_assert!(!b);
            }
        }
    }
}
