//! Modbus-RTU framing for the register-based serial motor driver.
//!
//! Every command is a fixed 8-byte frame:
//! `[address][function][reg_hi][reg_lo][value_hi][value_lo][crc_lo][crc_hi]`
//! with a CRC-16/Modbus over the first six bytes, low byte first.

/// Write-single-register function code.
pub const FUNC_WRITE_SINGLE: u8 = 0x06;

/// PWM duty register, 0..=1000 (tenths of a percent).
pub const REG_DUTY: u16 = 0x0006;
/// PWM frequency register, 1..=1000 Hz.
pub const REG_FREQUENCY: u16 = 0x0007;
/// Output enable register.
pub const REG_ENABLE: u16 = 0x0008;

/// Maximum value accepted by the duty register.
pub const DUTY_MAX: u16 = 1000;

pub const FRAME_LEN: usize = 8;

/// CRC-16/Modbus: reflected polynomial 0xA001, initial value 0xFFFF.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Build a complete frame for `function` on `register` with `value`.
pub fn encode_frame(address: u8, function: u8, register: u16, value: u16) -> [u8; FRAME_LEN] {
    let [reg_hi, reg_lo] = register.to_be_bytes();
    let [val_hi, val_lo] = value.to_be_bytes();
    let mut frame = [address, function, reg_hi, reg_lo, val_hi, val_lo, 0, 0];
    let [crc_lo, crc_hi] = crc16(&frame[..6]).to_le_bytes();
    frame[6] = crc_lo;
    frame[7] = crc_hi;
    frame
}

/// Shorthand for a write-single-register frame.
#[inline]
pub fn write_register(address: u8, register: u16, value: u16) -> [u8; FRAME_LEN] {
    encode_frame(address, FUNC_WRITE_SINGLE, register, value)
}

/// True when the trailing checksum matches the first six bytes.
pub fn frame_is_valid(frame: &[u8; FRAME_LEN]) -> bool {
    let expected = crc16(&frame[..6]).to_le_bytes();
    frame[6] == expected[0] && frame[7] == expected[1]
}

/// Map a normalized speed (percent, clamped to 100) onto the duty register.
#[inline]
pub fn duty_for_percent(speed_percent: u8) -> u16 {
    u16::from(speed_percent.min(100)) * (DUTY_MAX / 100)
}
