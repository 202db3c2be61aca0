use lift_config::{MotorDriver, load_toml};
use rstest::rstest;

#[test]
fn empty_file_is_a_valid_simulator_config() {
    let cfg = load_toml("").expect("parse TOML");
    cfg.validate().expect("defaults should pass");
    assert_eq!(cfg.elevator.floors, 4);
    assert_eq!(cfg.elevator.tick_ms, 100);
    assert_eq!(cfg.door.hold_ms, 3000);
    assert_eq!(cfg.door.max_open_ms, 30_000);
    assert_eq!(cfg.buttons.debounce_ms, 50);
    assert_eq!(cfg.motor.driver, MotorDriver::Hbridge);
    assert_eq!(cfg.motor.serial.address, 0x32);
    assert!((cfg.load_cell.overload_threshold_kg - 500.0).abs() < f32::EPSILON);
    assert!(cfg.monitor.auto_mode);
}

#[test]
fn parses_full_hardware_config() {
    let toml = r#"
[pins]
floor_sensors = [4, 17, 27, 22]
call_buttons = [5, 6, 13, 19]
indicators = [12, 16, 20, 21]
emergency = 26
hx711_dt = 23
hx711_sck = 24
motor_dir = 25
door_servo = 18

[elevator]
floors = 4
tick_ms = 100

[motor]
driver = "serial"
speed_percent = 70

[motor.serial]
port = "/dev/ttyAMA0"
baud = 9600
address = 50

[load_cell]
overload_threshold_kg = 450.0
scale = 2280.0
offset = 8421
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.motor.driver, MotorDriver::Serial);
    assert_eq!(cfg.pins.floor_sensors, vec![4, 17, 27, 22]);
    assert_eq!(cfg.pins.obstruction, None);
    assert_eq!(cfg.load_cell.offset, 8421);
}

#[rstest]
#[case("[elevator]\nfloors = 1", "elevator.floors must be >= 2")]
#[case("[elevator]\nground_floor = 4", "ground_floor must be < elevator.floors")]
#[case("[elevator]\ntick_ms = 0", "tick_ms must be >= 1")]
#[case("[door]\nhold_ms = 5000\nmax_open_ms = 4000", "max_open_ms must be >= door.hold_ms")]
#[case("[door]\nopen_angle = 0", "open_angle must differ")]
#[case("[motor]\nspeed_percent = 0", "speed_percent must be in [1, 100]")]
#[case("[motor]\nspeed_percent = 101", "speed_percent must be in [1, 100]")]
#[case("[load_cell]\nscale = 0.0", "scale must be finite and non-zero")]
#[case("[load_cell]\nwindow = 0", "window must be >= 1")]
#[case("[load_cell]\ngain_pulses = 24", "gain_pulses must be 25, 26 or 27")]
#[case("[load_cell]\noverload_threshold_kg = -1.0", "overload_threshold_kg must be > 0")]
#[case("[pins]\nfloor_sensors = [1, 2]", "pins.floor_sensors must list exactly 4 pins")]
#[case("[sim]\nstart_floor = 7", "start_floor must be < elevator.floors")]
#[case("[logging]\nrotation = \"weekly\"", "rotation must be one of")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "error `{err}` does not mention `{needle}`"
    );
}

#[test]
fn unknown_driver_is_a_parse_error() {
    let err = load_toml("[motor]\ndriver = \"stepper\"").expect_err("unknown variant");
    assert!(format!("{err}").contains("stepper"));
}

#[test]
fn load_file_reads_and_validates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("lift.toml");
    std::fs::write(&path, "[elevator]\nfloors = 6\n").expect("write");
    let cfg = lift_config::load_file(&path).expect("load");
    assert_eq!(cfg.elevator.floors, 6);

    std::fs::write(&path, "[elevator]\nfloors = 0\n").expect("write");
    assert!(lift_config::load_file(&path).is_err());
}
