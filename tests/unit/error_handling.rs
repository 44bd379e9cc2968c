//! Tests for error codes and bus failure propagation

use crate::common::*;
use mpu6xxx::{Error, GyroFullScale, HardwareProfile, InitStep, Sensors};

#[test]
fn test_error_codes_are_distinct() {
    let errors: Vec<Error<MockError>> = vec![
        Error::Bus(MockError::Communication),
        Error::InvalidDevice(0),
        Error::InvalidConfig,
        Error::SensorsAsleep,
        Error::FifoDisabled,
        Error::FifoOverflow,
        Error::DmpActive,
        Error::DmpInactive,
        Error::DmpNotLoaded,
        Error::DmpAlreadyLoaded,
        Error::EmptyFirmware,
        Error::BankBoundary,
        Error::FirmwareMismatch { address: 0 },
        Error::InvalidRegister(0),
        Error::NoMotionSnapshot,
        Error::Unsupported,
        Error::Init(InitStep::Reset),
        Error::Init(InitStep::Wake),
        Error::Init(InitStep::FifoSize),
        Error::Init(InitStep::Bypass),
        Error::Init(InitStep::Sensors),
        Error::Init(InitStep::GyroRange),
        Error::Init(InitStep::AccelRange),
        Error::Init(InitStep::Filter),
        Error::Init(InitStep::SampleRate),
        Error::Init(InitStep::Fifo),
    ];

    let mut codes: Vec<i8> = errors.iter().map(Error::code).collect();
    assert!(codes.iter().all(|code| *code < 0));
    let total = codes.len();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), total);
}

#[test]
fn test_init_reports_failing_step() {
    let (mut driver, interface, _delay) = create_mock_driver();
    interface.fail_next_write();

    let result = driver.init();

    assert!(matches!(result, Err(Error::Init(InitStep::Reset))));
    assert_eq!(result.unwrap_err().code(), -1);
}

#[test]
fn test_init_reports_range_step() {
    let (mut driver, interface, _delay) = create_mock_driver();
    interface.fail_write_to(0x1B);

    let result = driver.init();

    assert!(matches!(result, Err(Error::Init(InitStep::GyroRange))));
    assert_eq!(result.unwrap_err().code(), -30);
}

#[test]
fn test_init_reports_fifo_size_step_on_mpu6500() {
    let (mut driver, interface, _delay) = create_mock_driver_for(HardwareProfile::MPU6500);
    interface.fail_write_to(0x1D);

    let result = driver.init();

    assert!(matches!(result, Err(Error::Init(InitStep::FifoSize))));
}

#[test]
fn test_init_reports_sensor_step() {
    let (mut driver, interface, _delay) = create_mock_driver();
    interface.fail_write_to(0x6C);

    let result = driver.init();

    assert!(matches!(result, Err(Error::Init(InitStep::Sensors))));
}

#[test]
fn test_bus_error_leaves_cache_unchanged() {
    let (mut driver, interface, _delay) = create_awake_driver();
    interface.fail_next_write();

    let result = driver.set_gyro_fsr(GyroFullScale::Dps250);

    assert!(matches!(result, Err(Error::Bus(MockError::Communication))));
    assert_eq!(driver.gyro_fsr(), Some(GyroFullScale::Dps2000));

    // The next attempt goes to the bus again
    driver.set_gyro_fsr(GyroFullScale::Dps250).unwrap();
    assert_eq!(interface.writes_to(0x1B), vec![vec![0x00]]);
}

#[test]
fn test_read_failure_propagates() {
    let (mut driver, interface, _delay) = create_awake_driver();
    driver.configure_fifo(Sensors::ACCEL).unwrap();
    interface.fail_next_read();

    assert!(matches!(
        driver.read_fifo(),
        Err(Error::Bus(MockError::Communication))
    ));
    assert!(matches!(
        driver.read_who_am_i(),
        Ok(0x68)
    ));
}

#[test]
fn test_release_returns_parts() {
    let (driver, interface, _delay) = create_mock_driver();
    interface.set_register(0x75, 0x42);

    let (released, _delay) = driver.release();

    assert_eq!(released.register(0x75), 0x42);
}
