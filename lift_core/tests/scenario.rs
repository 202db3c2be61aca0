mod common;

use common::Rig;
use lift_core::{ElevatorState, MotorState, ActuatorGateway};
use rstest::rstest;

#[test]
fn car_at_ground_serves_call_to_floor_two() {
    let rig = Rig::new(4, 0.0);
    let mut e = rig.elevator();
    assert_eq!(e.current_floor(), 0);
    assert!(e.pending_calls().is_empty());

    e.request_floor(2);
    assert!(rig.indicators[2].get(), "indicator lit on request");

    let mut seen = vec![e.state()];
    for _ in 0..200 {
        rig.step(&mut e);
        if seen.last() != Some(&e.state()) {
            seen.push(e.state());
        }
        if e.state() == ElevatorState::Idle && seen.len() > 1 {
            break;
        }
    }

    assert_eq!(
        seen,
        vec![
            ElevatorState::Idle,
            ElevatorState::MovingUp,
            ElevatorState::DoorOpening,
            ElevatorState::DoorOpen,
            ElevatorState::DoorClosing,
            ElevatorState::Idle,
        ]
    );
    assert_eq!(e.current_floor(), 2);
    assert!(e.pending_calls().is_empty());
    assert!(!rig.indicators[2].get(), "indicator cleared on arrival");
    assert_eq!(e.actuators().motor_state(), MotorState::Stopped);
    assert_eq!(rig.door.history(), vec![90, 0]);
    assert!((rig.shaft.position() - 2.0).abs() <= lift_hardware::sim::SENSOR_HALF_WIDTH);
}

#[test]
fn serves_downward_call() {
    let rig = Rig::new(4, 3.0);
    let mut e = rig.elevator();
    assert_eq!(e.current_floor(), 3);
    e.request_floor(1);
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::MovingDown);
    assert_eq!(e.target_floor(), Some(1));
    rig.step_until(&mut e, 100, |e| e.state() == ElevatorState::DoorOpening);
    assert_eq!(e.current_floor(), 1);
    assert_eq!(e.target_floor(), None);
}

#[test]
fn call_at_current_floor_opens_without_moving() {
    let rig = Rig::new(4, 1.0);
    let mut e = rig.elevator();
    e.request_floor(1);
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::DoorOpening);
    assert!(!e.is_pending(1));
    assert_eq!(e.actuators().motor_state(), MotorState::Stopped);
    rig.step_until(&mut e, 100, |e| e.state() == ElevatorState::Idle);
    assert!(e.pending_calls().is_empty());
}

#[rstest]
#[case(4)]
#[case(99)]
#[case(usize::MAX)]
fn out_of_range_request_is_ignored(#[case] floor: usize) {
    let rig = Rig::new(4, 0.0);
    let mut e = rig.elevator();
    e.request_floor(floor);
    assert!(e.pending_calls().is_empty());
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::Idle);
}

#[test]
fn repeated_request_is_idempotent() {
    let rig = Rig::new(4, 0.0);
    let mut e = rig.elevator();
    e.request_floor(3);
    e.request_floor(3);
    assert_eq!(e.pending_calls().len(), 1);
}

#[test]
fn pending_calls_are_served_closest_first() {
    let rig = Rig::new(4, 1.0);
    let mut e = rig.elevator();
    e.request_floor(3);
    e.request_floor(0);
    rig.step(&mut e);
    assert_eq!(e.target_floor(), Some(0));
    rig.step_until(&mut e, 400, |e| e.current_floor() == 0 && e.state() == ElevatorState::Idle);
    rig.step(&mut e);
    assert_eq!(e.target_floor(), Some(3));
    rig.step_until(&mut e, 400, |e| e.pending_calls().is_empty() && e.state() == ElevatorState::Idle);
    assert_eq!(e.current_floor(), 3);
}

#[test]
fn unknown_start_position_homes_to_ground() {
    let rig = Rig::new(4, 0.5);
    let mut e = rig.elevator();
    assert_eq!(e.current_floor(), 0);
    assert!(e.is_pending(0), "ground floor requested at startup");
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::MovingDown);
    rig.step_until(&mut e, 100, |e| e.state() == ElevatorState::DoorOpening);
    assert!(rig.shaft.position() <= lift_hardware::sim::SENSOR_HALF_WIDTH);
    assert!(e.pending_calls().is_empty());
}

#[test]
fn auto_mode_off_keeps_calls_queued() {
    let mut rig = Rig::new(4, 0.0);
    rig.auto_mode = false;
    let mut e = rig.elevator();
    e.request_floor(2);
    for _ in 0..10 {
        rig.step(&mut e);
    }
    assert_eq!(e.state(), ElevatorState::Idle);
    assert!(e.is_pending(2));
    e.set_auto_mode(true);
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::MovingUp);
}

#[test]
fn call_after_manual_descent_between_floors_goes_back_up() {
    let rig = Rig::new(4, 2.0);
    let mut e = rig.elevator();
    assert_eq!(e.current_floor(), 2);

    e.set_auto_mode(false);
    e.actuators_mut().move_down(50).expect("manual down");
    rig.step_until(&mut e, 200, |_| rig.shaft.position() <= 0.5);
    e.actuators_mut().stop().expect("manual stop");
    rig.step(&mut e);
    assert_eq!(e.current_floor(), 1, "floor 1 passed on the way down");

    e.request_floor(1);
    e.set_auto_mode(true);
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::MovingUp, "car sits below floor 1");
    rig.step_until(&mut e, 50, |e| e.state() == ElevatorState::DoorOpening);
    assert_eq!(e.current_floor(), 1);
    assert!((rig.shaft.position() - 1.0).abs() < 0.2);
    assert_eq!(rig.shaft.direction(), None);
}

#[test]
fn passing_the_target_stops_and_replans() {
    let rig = Rig::new(4, 0.0).with_manual_floors();
    let lines = rig.floor_lines.clone().expect("manual floors");
    lines[0].set(true);
    let mut e = rig.elevator();
    e.request_floor(2);
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::MovingUp);

    // Floor 2 switch never fires; the next one up does
    lines[0].set(false);
    rig.step(&mut e);
    lines[3].set(true);
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::Idle);
    assert_eq!(e.current_floor(), 3);
    assert_eq!(e.target_floor(), None);
    assert_eq!(e.actuators().motor_state(), MotorState::Stopped);
    assert!(e.is_pending(2), "call kept for the return trip");

    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::MovingDown);
    assert_eq!(e.target_floor(), Some(2));
}

#[test]
fn manual_drive_below_bottom_floor_is_stopped() {
    let rig = Rig::new(4, 0.0).with_manual_floors();
    let lines = rig.floor_lines.clone().expect("manual floors");
    lines[0].set(true);
    let mut e = rig.elevator();
    e.set_auto_mode(false);

    e.actuators_mut().move_down(50).expect("manual down");
    lines[0].set(false);
    rig.step(&mut e);
    assert_eq!(e.actuators().motor_state(), MotorState::Stopped);
    assert_eq!(rig.shaft.direction(), None);
    assert_eq!(e.state(), ElevatorState::Idle);
}
