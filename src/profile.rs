//! Hardware profiles for the supported chip variants
//!
//! A [`HardwareProfile`] is chosen once when the driver is constructed and is
//! never mutated afterwards. It carries everything that differs between the
//! MPU6050 and MPU6500 silicon: bus address, register count, FIFO capacity,
//! temperature calibration and the accelerometer offset register set.

/// Chip family member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipVariant {
    /// MPU6050 (and MPU9150, which is an MPU6050 plus compass)
    Mpu6050,
    /// MPU6500 (and MPU9250, which is an MPU6500 plus compass)
    Mpu6500,
}

/// Immutable description of one device variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HardwareProfile {
    /// Chip family member
    pub variant: ChipVariant,
    /// 7-bit bus address
    pub address: u8,
    /// Expected `WHO_AM_I` value
    pub who_am_i: u8,
    /// Number of addressable registers
    pub num_registers: u8,
    /// FIFO capacity in bytes
    pub max_fifo: u16,
    /// Temperature sensitivity in LSB/°C
    pub temp_sens: u16,
    /// Raw temperature reading at 35 °C
    pub temp_offset: i16,
    /// DMP memory bank size in bytes
    pub bank_size: u16,
    /// High-byte addresses of the X/Y/Z accelerometer offset registers
    pub accel_offset_registers: [u8; 3],
}

impl HardwareProfile {
    /// MPU6050 at the default address (AD0 low)
    pub const MPU6050: Self = Self {
        variant: ChipVariant::Mpu6050,
        address: crate::I2C_ADDRESS_AD0_LOW,
        who_am_i: 0x68,
        num_registers: 118,
        max_fifo: 1024,
        temp_sens: 340,
        temp_offset: -521,
        bank_size: 256,
        accel_offset_registers: [0x06, 0x08, 0x0A],
    };

    /// MPU6500 at the default address (AD0 low)
    pub const MPU6500: Self = Self {
        variant: ChipVariant::Mpu6500,
        address: crate::I2C_ADDRESS_AD0_LOW,
        who_am_i: 0x70,
        num_registers: 128,
        max_fifo: 1024,
        temp_sens: 321,
        temp_offset: 0,
        bank_size: 256,
        accel_offset_registers: [0x77, 0x7A, 0x7D],
    };

    /// Profile for `variant` at the default address
    #[must_use]
    pub const fn for_variant(variant: ChipVariant) -> Self {
        match variant {
            ChipVariant::Mpu6050 => Self::MPU6050,
            ChipVariant::Mpu6500 => Self::MPU6500,
        }
    }

    /// Same profile with a different bus address (e.g. AD0 pulled high)
    #[must_use]
    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Convert a raw temperature reading to degrees Celsius in Q16 fixed point
    ///
    /// `round((35 + (raw - temp_offset) / temp_sens) * 65536)`, computed in
    /// integer arithmetic with halves rounded away from zero.
    #[must_use]
    pub fn temperature_q16(&self, raw: i16) -> i32 {
        let numerator = (i64::from(raw) - i64::from(self.temp_offset)) << 16;
        let sens = i64::from(self.temp_sens);
        let half = sens / 2;
        let scaled = if numerator >= 0 {
            (numerator + half) / sens
        } else {
            (numerator - half) / sens
        };
        #[allow(clippy::cast_possible_truncation)]
        let q16 = (scaled + (35 << 16)) as i32;
        q16
    }

    /// Convert a raw temperature reading to degrees Celsius
    #[must_use]
    pub fn temperature_celsius(&self, raw: i16) -> f32 {
        35.0 + (f32::from(raw) - f32::from(self.temp_offset)) / f32::from(self.temp_sens)
    }

    /// Whether the variant has the MPU6500 wake-on-motion block
    #[must_use]
    pub const fn has_wake_on_motion(&self) -> bool {
        matches!(self.variant, ChipVariant::Mpu6500)
    }
}
