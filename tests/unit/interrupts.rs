//! Tests for interrupt pin configuration, bypass and status

use crate::common::*;
use mpu6xxx::{Error, Sensors};

#[test]
fn test_int_level_and_latch() {
    let (mut driver, interface, _delay) = create_awake_driver();

    driver.set_int_level(false).unwrap();
    driver.set_int_latched(true).unwrap();

    assert_eq!(interface.writes_to(0x37), vec![vec![0x02], vec![0x32]]);
}

#[test]
fn test_bypass_off_with_compass_enables_aux_master() {
    let (mut driver, interface, delay) = create_awake_driver();
    driver
        .set_sensors(Sensors::GYRO | Sensors::ACCEL | Sensors::COMPASS)
        .unwrap();
    interface.clear_operations();
    delay.clear();

    driver.set_bypass(false).unwrap();

    assert_eq!(
        interface.writes(),
        vec![(0x6A, vec![0x20]), (0x37, vec![0x80])]
    );
    assert_eq!(delay.history(), vec![3]);
}

#[test]
fn test_bypass_toggle() {
    let (mut driver, interface, _delay) = create_awake_driver();

    driver.set_bypass(false).unwrap();
    driver.set_bypass(true).unwrap();

    assert_eq!(interface.writes_to(0x37), vec![vec![0x80], vec![0x82]]);
    assert_eq!(interface.writes_to(0x6A), vec![vec![0x00], vec![0x00]]);
}

#[test]
fn test_bypass_keeps_other_user_ctrl_bits() {
    let (mut driver, interface, _delay) = create_awake_driver();
    driver
        .set_sensors(Sensors::GYRO | Sensors::COMPASS)
        .unwrap();
    interface.set_register(0x6A, 0x40);

    driver.set_bypass(false).unwrap();

    assert_eq!(interface.writes_to(0x6A), vec![vec![0x60]]);
}

#[test]
fn test_int_status() {
    let (mut driver, interface, _delay) = create_awake_driver();
    interface.set_register(0x39, 0x01);
    interface.set_register(0x3A, 0x11);

    let status = driver.int_status().unwrap();

    assert_eq!(status.raw, 0x0111);
    assert!(status.data_ready);
    assert!(status.fifo_overflow);
    assert!(!status.dmp);
    assert!(!status.motion);
}

#[test]
fn test_int_status_motion_bit() {
    let (mut driver, interface, _delay) = create_awake_driver();
    interface.set_register(0x3A, 0x40);

    assert!(driver.int_status().unwrap().motion);
}

#[test]
fn test_int_status_needs_awake_chip() {
    let (mut driver, _interface, _delay) = create_mock_driver();
    driver.init().unwrap();

    assert!(matches!(driver.int_status(), Err(Error::SensorsAsleep)));
}
