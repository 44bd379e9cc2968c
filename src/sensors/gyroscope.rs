//! Gyroscope types
//!
//! Provides the full-scale range enum, raw sample type and unit conversion for
//! the 3-axis gyroscope.

/// Gyroscope full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroFullScale {
    /// ±250°/s range
    Dps250 = 0,
    /// ±500°/s range
    Dps500 = 1,
    /// ±1000°/s range
    Dps1000 = 2,
    /// ±2000°/s range
    Dps2000 = 3,
}

impl GyroFullScale {
    /// Look up a range from its span in °/s
    ///
    /// Only the four hardware steps are accepted.
    #[must_use]
    pub const fn from_dps(dps: u16) -> Option<Self> {
        match dps {
            250 => Some(Self::Dps250),
            500 => Some(Self::Dps500),
            1000 => Some(Self::Dps1000),
            2000 => Some(Self::Dps2000),
            _ => None,
        }
    }

    /// Get the sensitivity in LSB/(°/s)
    #[must_use]
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::Dps250 => 131.0,
            Self::Dps500 => 65.5,
            Self::Dps1000 => 32.8,
            Self::Dps2000 => 16.4,
        }
    }

    /// Get the span in °/s
    #[must_use]
    pub const fn dps(self) -> u16 {
        match self {
            Self::Dps250 => 250,
            Self::Dps500 => 500,
            Self::Dps1000 => 1000,
            Self::Dps2000 => 2000,
        }
    }

    /// Value of the `FS_SEL` field
    #[must_use]
    pub const fn fs_sel(self) -> u8 {
        self as u8
    }
}

/// Gyroscope data (raw 16-bit values)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroData {
    /// X-axis rotation (raw)
    pub x: i16,
    /// Y-axis rotation (raw)
    pub y: i16,
    /// Z-axis rotation (raw)
    pub z: i16,
}

impl GyroData {
    /// Convert to degrees per second
    #[must_use]
    pub fn to_dps(&self, full_scale: GyroFullScale) -> GyroDataDps {
        let sensitivity = full_scale.sensitivity();
        GyroDataDps {
            x: f32::from(self.x) / sensitivity,
            y: f32::from(self.y) / sensitivity,
            z: f32::from(self.z) / sensitivity,
        }
    }
}

/// Gyroscope data in degrees per second
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroDataDps {
    /// X-axis rotation rate in °/s
    pub x: f32,
    /// Y-axis rotation rate in °/s
    pub y: f32,
    /// Z-axis rotation rate in °/s
    pub z: f32,
}
