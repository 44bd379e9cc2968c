//! Cached chip configuration
//!
//! [`ChipConfig`] mirrors what has been written to the hardware so that
//! setters can skip redundant bus traffic. Fields that have never been written
//! since reset are `None` and always force a real write.

use crate::interrupt::InterruptPinConfig;
use crate::power::{ClockSource, Sensors};
use crate::sensors::{AccelFullScale, Dlpf, GyroFullScale};

/// Snapshot taken when entering motion-interrupt mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionIntCache {
    pub(crate) gyro_fsr: Option<GyroFullScale>,
    pub(crate) accel_fsr: Option<AccelFullScale>,
    pub(crate) lpf: Option<Dlpf>,
    pub(crate) sample_rate: Option<u16>,
    pub(crate) sensors: Sensors,
    pub(crate) fifo_enable: Sensors,
    pub(crate) dmp_on: bool,
}

/// Local mirror of the chip configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct ChipConfig {
    pub(crate) gyro_fsr: Option<GyroFullScale>,
    pub(crate) accel_fsr: Option<AccelFullScale>,
    pub(crate) sensors: Option<Sensors>,
    pub(crate) lpf: Option<Dlpf>,
    pub(crate) clk_src: ClockSource,
    pub(crate) sample_rate: Option<u16>,
    pub(crate) fifo_enable: Option<Sensors>,
    pub(crate) int_enable: bool,
    pub(crate) bypass_mode: Option<bool>,
    pub(crate) accel_half: bool,
    pub(crate) lp_accel_mode: bool,
    pub(crate) int_motion_only: bool,
    pub(crate) active_low_int: bool,
    pub(crate) latched_int: bool,
    pub(crate) dmp_on: bool,
    pub(crate) dmp_loaded: bool,
    pub(crate) dmp_sample_rate: u16,
    pub(crate) motion_int_cache: Option<MotionIntCache>,
}

impl ChipConfig {
    /// Everything unknown, as after power-up
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            gyro_fsr: None,
            accel_fsr: None,
            sensors: None,
            lpf: None,
            clk_src: ClockSource::Pll,
            sample_rate: None,
            fifo_enable: None,
            int_enable: false,
            bypass_mode: None,
            accel_half: false,
            lp_accel_mode: false,
            int_motion_only: false,
            active_low_int: true,
            latched_int: false,
            dmp_on: false,
            dmp_loaded: false,
            dmp_sample_rate: 0,
            motion_int_cache: None,
        }
    }

    /// Awake channels; an unknown mask counts as everything awake
    #[must_use]
    pub fn awake(&self) -> Sensors {
        self.sensors.unwrap_or(Sensors::all())
    }

    /// FIFO channels; an unknown mask counts as nothing streamed
    #[must_use]
    pub fn fifo(&self) -> Sensors {
        self.fifo_enable.unwrap_or(Sensors::empty())
    }

    pub(crate) fn pin_config(&self) -> InterruptPinConfig {
        InterruptPinConfig {
            bypass: self.bypass_mode.unwrap_or(false),
            active_low: self.active_low_int,
            latched: self.latched_int,
        }
    }

    pub(crate) fn snapshot(&self) -> MotionIntCache {
        MotionIntCache {
            gyro_fsr: self.gyro_fsr,
            accel_fsr: self.accel_fsr,
            lpf: self.lpf,
            sample_rate: self.sample_rate,
            sensors: self.awake(),
            fifo_enable: self.fifo(),
            dmp_on: self.dmp_on,
        }
    }
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self::unknown()
    }
}
