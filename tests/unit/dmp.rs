//! Tests for DMP memory access, firmware loading and DMP state changes

use crate::common::*;
use mpu6xxx::{DmpFirmware, Error, FifoConfigStatus, Sensors};

fn test_image() -> Vec<u8> {
    (0..40u8).map(|i| i.wrapping_mul(7).wrapping_add(3)).collect()
}

fn firmware(image: &[u8]) -> DmpFirmware<'_> {
    DmpFirmware {
        image,
        start_address: 0x0400,
        sample_rate: 200,
    }
}

#[test]
fn test_load_firmware_in_verified_chunks() {
    let (mut driver, interface, _delay) = create_awake_driver();
    let image = test_image();

    driver.load_firmware(&firmware(&image)).unwrap();

    let chunk_lengths: Vec<usize> = interface
        .writes_to(0x6F)
        .iter()
        .map(Vec::len)
        .collect();
    assert_eq!(chunk_lengths, vec![16, 16, 8]);
    assert_eq!(
        interface.writes_to(0x6D),
        vec![
            vec![0, 0],
            vec![0, 0],
            vec![0, 16],
            vec![0, 16],
            vec![0, 32],
            vec![0, 32],
        ]
    );
    assert_eq!(interface.writes_to(0x70), vec![vec![0x04, 0x00]]);
    for (address, byte) in image.iter().enumerate() {
        assert_eq!(interface.dmp_memory_at(address as u16), *byte);
    }
    assert!(driver.dmp_loaded());
    assert!(!driver.dmp_enabled());
}

#[test]
fn test_load_firmware_only_once() {
    let (mut driver, interface, _delay) = create_awake_driver();
    let image = test_image();
    driver.load_firmware(&firmware(&image)).unwrap();
    interface.clear_operations();

    let result = driver.load_firmware(&firmware(&image));

    assert!(matches!(result, Err(Error::DmpAlreadyLoaded)));
    assert!(interface.operations().is_empty());
}

#[test]
fn test_load_firmware_detects_mismatch() {
    let (mut driver, interface, _delay) = create_awake_driver();
    interface.corrupt_memory_at(20);
    let image = test_image();

    let result = driver.load_firmware(&firmware(&image));

    assert!(matches!(
        result,
        Err(Error::FirmwareMismatch { address: 16 })
    ));
    assert!(!driver.dmp_loaded());
    // Loading stopped at the bad chunk
    assert_eq!(interface.writes_to(0x6F).len(), 2);
    assert!(interface.writes_to(0x70).is_empty());
}

#[test]
fn test_load_empty_firmware() {
    let (mut driver, interface, _delay) = create_awake_driver();

    let result = driver.load_firmware(&firmware(&[]));

    assert!(matches!(result, Err(Error::EmptyFirmware)));
    assert!(interface.operations().is_empty());
}

#[test]
fn test_load_firmware_needs_awake_chip() {
    let (mut driver, _interface, _delay) = create_mock_driver();
    driver.init().unwrap();
    let image = test_image();

    assert!(matches!(
        driver.load_firmware(&firmware(&image)),
        Err(Error::SensorsAsleep)
    ));
}

#[test]
fn test_memory_access_rejects_bank_crossing() {
    let (mut driver, interface, _delay) = create_awake_driver();

    let result = driver.write_memory(0x01F8, &[0xAA; 16]);

    assert!(matches!(result, Err(Error::BankBoundary)));
    assert!(interface.operations().is_empty());

    let mut buffer = [0u8; 9];
    assert!(matches!(
        driver.read_memory(0x01F8, &mut buffer),
        Err(Error::BankBoundary)
    ));
}

#[test]
fn test_memory_access_up_to_bank_end() {
    let (mut driver, interface, _delay) = create_awake_driver();

    driver.write_memory(0x01F8, &[0xAA; 8]).unwrap();

    assert_eq!(interface.writes_to(0x6D), vec![vec![0x01, 0xF8]]);
    assert_eq!(interface.dmp_memory_at(0x01FF), 0xAA);

    let mut buffer = [0u8; 8];
    driver.read_memory(0x01F8, &mut buffer).unwrap();
    assert_eq!(buffer, [0xAA; 8]);
}

#[test]
fn test_enable_dmp_without_firmware() {
    let (mut driver, interface, _delay) = create_awake_driver();

    assert!(matches!(
        driver.set_dmp_state(true),
        Err(Error::DmpNotLoaded)
    ));
    assert!(interface.operations().is_empty());
}

#[test]
fn test_enable_dmp_sequence() {
    let (mut driver, interface, delay) = create_awake_driver();
    let image = test_image();
    driver.load_firmware(&firmware(&image)).unwrap();
    interface.clear_operations();

    driver.set_dmp_state(true).unwrap();

    assert_eq!(
        interface.writes(),
        vec![
            (0x38, vec![0x00]), // interrupts off
            (0x6A, vec![0x00]), // aux master off
            (0x37, vec![0x80]), // bypass off
            (0x19, vec![4]),    // 200 Hz
            (0x1A, vec![0x02]), // 98 Hz
            (0x23, vec![0x00]), // FIFO belongs to the DMP
            (0x38, vec![0x02]), // DMP interrupt
            (0x38, vec![0x00]), // reset
            (0x23, vec![0x00]),
            (0x6A, vec![0x00]),
            (0x6A, vec![0x0C]), // FIFO_RST | DMP_RST
            (0x6A, vec![0xC0]), // DMP_EN | FIFO_EN
            (0x38, vec![0x02]),
            (0x23, vec![0x00]),
        ]
    );
    assert_eq!(delay.history(), vec![3, 50]);
    assert!(driver.dmp_enabled());
    assert_eq!(driver.sample_rate(), None);
}

#[test]
fn test_dmp_owns_fifo() {
    let (mut driver, interface, _delay) = create_awake_driver();
    let image = test_image();
    driver.load_firmware(&firmware(&image)).unwrap();
    driver.set_dmp_state(true).unwrap();
    interface.clear_operations();

    assert_eq!(
        driver.configure_fifo(Sensors::GYRO).unwrap(),
        FifoConfigStatus::Complete
    );
    assert!(interface.operations().is_empty());
    assert!(matches!(driver.read_fifo(), Err(Error::DmpActive)));
    assert!(matches!(
        driver.set_sample_rate(100),
        Err(Error::DmpActive)
    ));
}

#[test]
fn test_read_fifo_stream() {
    let (mut driver, interface, _delay) = create_awake_driver();
    let image = test_image();
    driver.load_firmware(&firmware(&image)).unwrap();
    driver.set_dmp_state(true).unwrap();

    let mut buffer = [0u8; 16];
    assert_eq!(driver.read_fifo_stream(&mut buffer).unwrap(), None);

    let data: Vec<u8> = (0..32u8).collect();
    interface.push_fifo(&data);

    assert_eq!(driver.read_fifo_stream(&mut buffer).unwrap(), Some(1));
    assert_eq!(&buffer[..], &data[..16]);
    assert_eq!(driver.read_fifo_stream(&mut buffer).unwrap(), Some(0));
    assert_eq!(&buffer[..], &data[16..]);

    let mut empty: [u8; 0] = [];
    assert!(matches!(
        driver.read_fifo_stream(&mut empty),
        Err(Error::InvalidConfig)
    ));
}

#[test]
fn test_read_fifo_stream_overflow() {
    let (mut driver, interface, _delay) = create_awake_driver();
    let image = test_image();
    driver.load_firmware(&firmware(&image)).unwrap();
    driver.set_dmp_state(true).unwrap();
    interface.set_fifo_count(1000);
    interface.set_register(0x3A, 0x10);
    interface.clear_operations();

    let mut buffer = [0u8; 16];
    let result = driver.read_fifo_stream(&mut buffer);

    assert!(matches!(result, Err(Error::FifoOverflow)));
    // DMP reset path
    assert!(interface.writes_to(0x6A).contains(&vec![0x0C]));
}

#[test]
fn test_disable_dmp_restores_fifo() {
    let (mut driver, interface, _delay) = create_awake_driver();
    let image = test_image();
    driver.load_firmware(&firmware(&image)).unwrap();
    driver.set_dmp_state(true).unwrap();
    interface.clear_operations();

    driver.set_dmp_state(false).unwrap();

    assert!(!driver.dmp_enabled());
    assert_eq!(driver.sample_rate(), Some(200));
    // DMP interrupt off, then the non-DMP reset
    assert_eq!(interface.writes()[0], (0x38, vec![0x00]));
    assert!(interface.writes_to(0x6A).contains(&vec![0x40]));
    assert!(!interface.writes_to(0x6A).contains(&vec![0x0C]));
}

#[test]
fn test_dmp_state_unchanged_is_noop() {
    let (mut driver, interface, _delay) = create_awake_driver();

    driver.set_dmp_state(false).unwrap();

    assert!(interface.operations().is_empty());
}

#[test]
fn test_init_forgets_loaded_firmware() {
    let (mut driver, _interface, _delay) = create_awake_driver();
    let image = test_image();
    driver.load_firmware(&firmware(&image)).unwrap();

    driver.init().unwrap();

    assert!(!driver.dmp_loaded());
}
