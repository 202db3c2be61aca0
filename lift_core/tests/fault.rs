mod common;

use common::Rig;
use lift_core::{ElevatorState, FaultReason, LiftError, MotorState, ActuatorGateway};

#[test]
fn two_active_floor_sensors_enter_error() {
    let rig = Rig::new(4, 0.0).with_manual_floors();
    let lines = rig.floor_lines.clone().expect("manual floors");
    lines[1].set(true);
    let mut e = rig.elevator();
    assert_eq!(e.current_floor(), 1);

    e.request_floor(3);
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::MovingUp);

    lines[2].set(true);
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::Error);
    assert_eq!(e.fault(), Some(&FaultReason::MultipleFloorsActive(vec![1, 2])));
    assert_eq!(e.actuators().motor_state(), MotorState::Stopped);
    assert_eq!(rig.shaft.direction(), None);

    // No automatic exit, even once the sensors agree again
    lines[1].set(false);
    for _ in 0..10 {
        rig.step(&mut e);
        assert_eq!(e.state(), ElevatorState::Error);
    }
    assert!(e.is_pending(3));
}

#[test]
fn reset_fault_requires_consistent_sensors() {
    let rig = Rig::new(4, 0.0).with_manual_floors();
    let lines = rig.floor_lines.clone().expect("manual floors");
    lines[0].set(true);
    lines[3].set(true);
    let mut e = rig.elevator();
    assert_eq!(e.state(), ElevatorState::Error, "conflict at startup");

    match e.reset_fault() {
        Err(LiftError::State(msg)) => assert!(msg.contains("still active"), "{msg}"),
        other => panic!("expected refusal, got {other:?}"),
    }

    lines[0].set(false);
    assert_eq!(e.reset_fault(), Ok(3));
    assert_eq!(e.state(), ElevatorState::Idle);
    assert_eq!(e.current_floor(), 3);
    assert!(e.fault().is_none());
}

#[test]
fn reset_fault_between_floors_is_refused() {
    let rig = Rig::new(4, 0.0).with_manual_floors();
    let lines = rig.floor_lines.clone().expect("manual floors");
    lines[1].set(true);
    lines[2].set(true);
    let mut e = rig.elevator();
    lines[1].set(false);
    lines[2].set(false);
    assert!(matches!(e.reset_fault(), Err(LiftError::State(_))));
    assert_eq!(e.state(), ElevatorState::Error);
}

#[test]
fn reset_fault_outside_error_is_an_error() {
    let rig = Rig::new(4, 0.0);
    let mut e = rig.elevator();
    assert!(e.reset_fault().is_err());
    assert_eq!(e.state(), ElevatorState::Idle);
}

#[test]
fn emergency_does_not_clear_a_fault() {
    let rig = Rig::new(4, 0.0).with_manual_floors();
    let lines = rig.floor_lines.clone().expect("manual floors");
    lines[0].set(true);
    lines[1].set(true);
    let mut e = rig.elevator();
    assert_eq!(e.state(), ElevatorState::Error);

    rig.emergency.set(true);
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::Error);
    assert!(e.emergency_active());
    rig.emergency.set(false);
    rig.step(&mut e);
    assert_eq!(e.state(), ElevatorState::Error);
    assert!(!e.emergency_active());
}
