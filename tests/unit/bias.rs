//! Tests for factory-trim bias reads and corrections

use crate::common::*;
use mpu6xxx::{AxisBias, HardwareProfile};

#[test]
fn test_read_gyro_bias() {
    let (mut driver, interface, _delay) = create_awake_driver();
    interface.set_register_pair(0x13, 100);
    interface.set_register_pair(0x15, -20);
    interface.set_register_pair(0x17, 0);

    let bias = driver.read_gyro_bias().unwrap();

    assert_eq!(bias, AxisBias { x: 100, y: -20, z: 0 });
}

#[test]
fn test_gyro_corrections_accumulate() {
    let (mut driver, interface, _delay) = create_awake_driver();
    interface.set_register_pair(0x13, 100);

    let bias = driver.apply_gyro_bias_correction([10, 0, 0]).unwrap();
    assert_eq!(bias.x, 90);
    assert_eq!(interface.register_pair(0x13), 90);

    let bias = driver.apply_gyro_bias_correction([-4, 0, 0]).unwrap();
    assert_eq!(bias.x, 94);
    assert_eq!(interface.register_pair(0x13), 94);
}

#[test]
fn test_gyro_correction_writes_all_axes() {
    let (mut driver, interface, _delay) = create_awake_driver();

    driver.apply_gyro_bias_correction([1, 2, 3]).unwrap();

    assert_eq!(
        interface.writes(),
        vec![
            (0x13, vec![0xFF, 0xFF]),
            (0x15, vec![0xFF, 0xFE]),
            (0x17, vec![0xFF, 0xFD]),
        ]
    );
}

#[test]
fn test_accel_correction_keeps_low_bit() {
    let (mut driver, interface, _delay) = create_awake_driver();
    interface.set_register_pair(0x06, 1000);

    let bias = driver.apply_accel_bias_correction([11, 0, 0]).unwrap();
    assert_eq!(bias.x, 990);

    let bias = driver.apply_accel_bias_correction([-5, 0, 0]).unwrap();
    assert_eq!(bias.x, 996);
    assert_eq!(interface.register_pair(0x06), 996);
}

#[test]
fn test_corrections_net_out_on_both_channels() {
    let (mut driver, interface, _delay) = create_awake_driver();
    interface.set_register_pair(0x13, 100);
    interface.set_register_pair(0x06, 100);

    driver.apply_gyro_bias_correction([10, 10, 10]).unwrap();
    let gyro = driver.apply_gyro_bias_correction([-4, -4, -4]).unwrap();
    driver.apply_accel_bias_correction([10, 10, 10]).unwrap();
    let accel = driver.apply_accel_bias_correction([-4, -4, -4]).unwrap();

    // +10 then -4 nets -6 on every axis
    assert_eq!(gyro, AxisBias { x: 94, y: -6, z: -6 });
    assert_eq!(accel, AxisBias { x: 94, y: -6, z: -6 });
    assert_eq!(interface.register_pair(0x13), 94);
    assert_eq!(interface.register_pair(0x06), 94);
}

#[test]
fn test_accel_bias_registers_on_mpu6500() {
    let (mut driver, interface, _delay) = create_awake_driver_for(HardwareProfile::MPU6500);
    interface.set_register_pair(0x7A, -200);

    let bias = driver.apply_accel_bias_correction([0, 4, 0]).unwrap();

    assert_eq!(bias.y, -204);
    assert_eq!(interface.register_pair(0x7A), -204);
    let written: Vec<u8> = interface.writes().iter().map(|(a, _)| *a).collect();
    assert_eq!(written, vec![0x77, 0x7A, 0x7D]);
}

#[test]
fn test_accel_bias_read_on_mpu6050() {
    let (mut driver, interface, _delay) = create_awake_driver();
    interface.set_register_pair(0x06, -1);
    interface.set_register_pair(0x08, 2);
    interface.set_register_pair(0x0A, 1234);

    let bias = driver.read_accel_bias().unwrap();

    assert_eq!(bias, AxisBias { x: -1, y: 2, z: 1234 });
}
