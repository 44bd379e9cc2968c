//! Bus interface for the MPU6050 / MPU6500
//!
//! This module implements the `device-driver` register interface on top of an
//! `embedded-hal` I2C bus.

use crate::profile::HardwareProfile;
use device_driver::RegisterInterface;

/// I2C interface for the MPU6050 / MPU6500
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Create a new I2C interface with a custom device address
    ///
    /// # Arguments
    /// * `i2c` - The I2C peripheral
    /// * `address` - The 7-bit device address
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Create a new I2C interface at the address carried by `profile`
    ///
    /// # Example
    /// ```ignore
    /// let profile = HardwareProfile::MPU6500;
    /// let interface = I2cInterface::from_profile(i2c, &profile);
    /// let mut imu = MpuDriver::new(interface, delay, profile);
    /// ```
    pub const fn from_profile(i2c: I2C, profile: &HardwareProfile) -> Self {
        Self {
            i2c,
            address: profile.address,
        }
    }

    /// Bus address in use
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Consume the interface and return the I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> RegisterInterface for I2cInterface<I2C>
where
    I2C: embedded_hal::i2c::I2c<Error = E>,
{
    type Error = E;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in read_data.len() for I2C
        self.i2c.write_read(self.address, &[address], read_data)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        use embedded_hal::i2c::Operation;

        let _ = size_bits; // Size is implicit in write_data.len() for I2C
        // Register address and payload go out as one write without a repeated start
        self.i2c.transaction(
            self.address,
            &mut [Operation::Write(&[address]), Operation::Write(write_data)],
        )
    }
}
