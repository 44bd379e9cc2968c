//! Sensor types for the MPU6050 / MPU6500
//!
//! This module provides the types shared by the configuration engine, the FIFO
//! decoder and bias calibration:
//! - Accelerometer and gyroscope full-scale ranges and raw samples
//! - Digital low pass filter tiers
//! - Factory-trim offset (bias) values
//!
//! All sensor operations are performed through methods on `MpuDriver`.

pub mod accelerometer;
pub mod gyroscope;

pub use accelerometer::{AccelData, AccelDataG, AccelFullScale};
pub use gyroscope::{GyroData, GyroDataDps, GyroFullScale};

/// Digital low pass filter bandwidth tier
///
/// The filter is shared by gyroscope and accelerometer. Discriminants are the
/// `DLPF_CFG` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dlpf {
    /// 188 Hz bandwidth
    Hz188 = 1,
    /// 98 Hz bandwidth
    Hz98 = 2,
    /// 42 Hz bandwidth
    Hz42 = 3,
    /// 20 Hz bandwidth
    Hz20 = 4,
    /// 10 Hz bandwidth
    Hz10 = 5,
    /// 5 Hz bandwidth
    Hz5 = 6,
}

impl Dlpf {
    /// Highest tier not above `hz`, never lower than 5 Hz
    #[must_use]
    pub const fn from_hz(hz: u16) -> Self {
        match hz {
            188.. => Self::Hz188,
            98.. => Self::Hz98,
            42.. => Self::Hz42,
            20.. => Self::Hz20,
            10.. => Self::Hz10,
            _ => Self::Hz5,
        }
    }

    /// Get the 3dB bandwidth in Hz
    #[must_use]
    pub const fn bandwidth_hz(self) -> u16 {
        match self {
            Self::Hz188 => 188,
            Self::Hz98 => 98,
            Self::Hz42 => 42,
            Self::Hz20 => 20,
            Self::Hz10 => 10,
            Self::Hz5 => 5,
        }
    }

    /// Value of the `DLPF_CFG` field
    #[must_use]
    pub const fn dlpf_cfg(self) -> u8 {
        self as u8
    }
}

/// Factory-trim offset register contents for three axes
///
/// Gyro offsets are in LSB at ±1000°/s, accel offsets in LSB at ±8g.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisBias {
    /// X-axis offset
    pub x: i16,
    /// Y-axis offset
    pub y: i16,
    /// Z-axis offset
    pub z: i16,
}

impl AxisBias {
    pub(crate) const fn from_array(values: [i16; 3]) -> Self {
        Self {
            x: values[0],
            y: values[1],
            z: values[2],
        }
    }

    pub(crate) const fn to_array(self) -> [i16; 3] {
        [self.x, self.y, self.z]
    }
}
