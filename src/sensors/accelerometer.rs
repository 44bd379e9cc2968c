//! Accelerometer types
//!
//! Provides the full-scale range enum, raw sample type and unit conversion for
//! the 3-axis accelerometer.

/// Accelerometer full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelFullScale {
    /// ±2g range
    G2 = 0,
    /// ±4g range
    G4 = 1,
    /// ±8g range
    G8 = 2,
    /// ±16g range
    G16 = 3,
}

impl AccelFullScale {
    /// Look up a range from its span in g
    ///
    /// Only the four hardware steps are accepted.
    #[must_use]
    pub const fn from_g(g: u8) -> Option<Self> {
        match g {
            2 => Some(Self::G2),
            4 => Some(Self::G4),
            8 => Some(Self::G8),
            16 => Some(Self::G16),
            _ => None,
        }
    }

    /// Get the sensitivity in LSB/g
    #[must_use]
    pub const fn sensitivity(self) -> u16 {
        match self {
            Self::G2 => 16384,
            Self::G4 => 8192,
            Self::G8 => 4096,
            Self::G16 => 2048,
        }
    }

    /// Get the span in g
    #[must_use]
    pub const fn g(self) -> u8 {
        match self {
            Self::G2 => 2,
            Self::G4 => 4,
            Self::G8 => 8,
            Self::G16 => 16,
        }
    }

    /// Value of the `AFS_SEL` field
    #[must_use]
    pub const fn afs_sel(self) -> u8 {
        self as u8
    }
}

/// Accelerometer data (raw 16-bit values)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelData {
    /// X-axis acceleration (raw)
    pub x: i16,
    /// Y-axis acceleration (raw)
    pub y: i16,
    /// Z-axis acceleration (raw)
    pub z: i16,
}

impl AccelData {
    /// Convert to g using a sensitivity in LSB/g
    ///
    /// Use the driver's `accel_sensitivity()`, which accounts for
    /// half-sensitivity parts.
    #[must_use]
    pub fn to_g(&self, sensitivity: u16) -> AccelDataG {
        let sensitivity = f32::from(sensitivity);
        AccelDataG {
            x: f32::from(self.x) / sensitivity,
            y: f32::from(self.y) / sensitivity,
            z: f32::from(self.z) / sensitivity,
        }
    }
}

/// Accelerometer data in g
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelDataG {
    /// X-axis acceleration in g
    pub x: f32,
    /// Y-axis acceleration in g
    pub y: f32,
    /// Z-axis acceleration in g
    pub z: f32,
}
