//! Power management and low-power modes
//!
//! Sensors are woken and put to standby through a [`Sensors`] mask. The mask
//! uses the same bit positions as the `FIFO_EN` register, so the same value
//! describes both which channels are awake and which are streamed.
//!
//! The chip can also run in low-power accel mode: it sleeps and wakes
//! periodically to take a single accelerometer sample. The available wake
//! frequencies depend on the variant, see [`LpAccelRate`].
//!
//! # Example
//!
//! ```ignore
//! # use mpu6xxx::{MpuDriver, Sensors};
//! # let mut imu: MpuDriver<_, _> = todo!();
//! // Wake the gyroscope and accelerometer
//! imu.set_sensors(Sensors::GYRO | Sensors::ACCEL)?;
//!
//! // Later, drop to a 5 Hz accel-only wake cycle
//! imu.lp_accel_mode(5)?;
//! # Ok::<(), mpu6xxx::Error<()>>(())
//! ```

use crate::profile::ChipVariant;

bitflags::bitflags! {
    /// Sensor channel mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Sensors: u8 {
        /// Gyroscope X axis
        const GYRO_X = 0x40;
        /// Gyroscope Y axis
        const GYRO_Y = 0x20;
        /// Gyroscope Z axis
        const GYRO_Z = 0x10;
        /// All gyroscope axes
        const GYRO = Self::GYRO_X.bits() | Self::GYRO_Y.bits() | Self::GYRO_Z.bits();
        /// Accelerometer (all axes)
        const ACCEL = 0x08;
        /// Compass on the auxiliary bus
        const COMPASS = 0x01;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Sensors {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Sensors({=u8:#04x})", self.bits());
    }
}

impl Sensors {
    /// Size in bytes of one FIFO packet carrying these channels
    ///
    /// 2 bytes per gyroscope axis, 6 bytes for the accelerometer. The compass
    /// never goes through the FIFO.
    #[must_use]
    pub const fn fifo_packet_size(self) -> usize {
        let mut size = 0;
        if self.contains(Self::GYRO_X) {
            size += 2;
        }
        if self.contains(Self::GYRO_Y) {
            size += 2;
        }
        if self.contains(Self::GYRO_Z) {
            size += 2;
        }
        if self.contains(Self::ACCEL) {
            size += 6;
        }
        size
    }

    /// Clock source (and sleep state) needed to run these channels
    #[must_use]
    pub const fn clock_source(self) -> ClockSource {
        if self.intersects(Self::GYRO) {
            ClockSource::Pll
        } else if self.is_empty() {
            ClockSource::Sleep
        } else {
            ClockSource::Internal
        }
    }
}

/// Clock source selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Internal 8 MHz oscillator
    Internal,
    /// Gyroscope X PLL
    Pll,
    /// Chip asleep
    Sleep,
}

impl ClockSource {
    /// Value of the `CLKSEL` field
    #[must_use]
    pub const fn clksel(self) -> u8 {
        match self {
            Self::Pll => 1,
            Self::Internal | Self::Sleep => 0,
        }
    }
}

/// Standby bits for `PWR_MGMT_2`
///
/// Gyroscope axes are put to standby individually, the accelerometer as a
/// group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct Standby {
    /// Gyroscope X standby
    pub gyro_x: bool,
    /// Gyroscope Y standby
    pub gyro_y: bool,
    /// Gyroscope Z standby
    pub gyro_z: bool,
    /// Accelerometer standby
    pub accel: bool,
}

impl Standby {
    /// Standby bits that leave exactly `sensors` running
    #[must_use]
    pub const fn for_sensors(sensors: Sensors) -> Self {
        Self {
            gyro_x: !sensors.contains(Sensors::GYRO_X),
            gyro_y: !sensors.contains(Sensors::GYRO_Y),
            gyro_z: !sensors.contains(Sensors::GYRO_Z),
            accel: !sensors.contains(Sensors::ACCEL),
        }
    }
}

/// Low-power accel wake frequencies
///
/// MPU6050 supports 1.25, 5, 20 and 40 Hz. MPU6500 supports 0.3125 Hz up to
/// 640 Hz in doubling steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LpAccelRate {
    /// 0.3125 Hz (MPU6500)
    Hz0_3125,
    /// 0.625 Hz (MPU6500)
    Hz0_625,
    /// 1.25 Hz
    Hz1_25,
    /// 2.5 Hz (MPU6500)
    Hz2_5,
    /// 5 Hz
    Hz5,
    /// 10 Hz (MPU6500)
    Hz10,
    /// 20 Hz
    Hz20,
    /// 40 Hz
    Hz40,
    /// 80 Hz (MPU6500)
    Hz80,
    /// 160 Hz (MPU6500)
    Hz160,
    /// 320 Hz (MPU6500)
    Hz320,
    /// 640 Hz (MPU6500)
    Hz640,
}

impl LpAccelRate {
    /// Slowest supported wake frequency not below `hz`
    ///
    /// `hz` is a minimum rate; round a fractional rate down before passing it
    /// in. Returns `None` for 0 or for a rate above the variant's maximum.
    #[must_use]
    pub const fn select(variant: ChipVariant, hz: u16) -> Option<Self> {
        match variant {
            ChipVariant::Mpu6050 => match hz {
                0 => None,
                1 => Some(Self::Hz1_25),
                2..=5 => Some(Self::Hz5),
                6..=20 => Some(Self::Hz20),
                21..=40 => Some(Self::Hz40),
                _ => None,
            },
            ChipVariant::Mpu6500 => match hz {
                0 => None,
                1 => Some(Self::Hz1_25),
                2 => Some(Self::Hz2_5),
                3..=5 => Some(Self::Hz5),
                6..=10 => Some(Self::Hz10),
                11..=20 => Some(Self::Hz20),
                21..=40 => Some(Self::Hz40),
                41..=80 => Some(Self::Hz80),
                81..=160 => Some(Self::Hz160),
                161..=320 => Some(Self::Hz320),
                321..=640 => Some(Self::Hz640),
                _ => None,
            },
        }
    }

    /// `LP_WAKE_CTRL` value on the MPU6050
    ///
    /// Only meaningful for the four MPU6050 rates.
    #[must_use]
    pub const fn lp_wake_ctrl(self) -> u8 {
        match self {
            Self::Hz0_3125 | Self::Hz0_625 | Self::Hz1_25 | Self::Hz2_5 => 0,
            Self::Hz5 | Self::Hz10 => 1,
            Self::Hz20 => 2,
            _ => 3,
        }
    }

    /// `LPOSC_CLKSEL` value on the MPU6500
    #[must_use]
    pub const fn lposc_clksel(self) -> u8 {
        self as u8
    }

    /// Filter bandwidth used alongside this wake rate on the MPU6050
    #[must_use]
    pub const fn filter_hz(self) -> u16 {
        match self {
            Self::Hz0_3125 | Self::Hz0_625 | Self::Hz1_25 | Self::Hz2_5 | Self::Hz5 => 5,
            Self::Hz10 | Self::Hz20 => 10,
            _ => 20,
        }
    }
}
