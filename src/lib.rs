#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod device;
pub mod dmp;
pub mod fifo;
pub mod interface;
pub mod interrupt;
pub mod power;
pub mod profile;
pub mod registers;
pub mod sensors;

// Re-export main types
pub use config::{ChipConfig, MotionIntCache};
pub use device::{MAX_SAMPLE_RATE_HZ, MIN_SAMPLE_RATE_HZ, MpuDriver};
pub use dmp::{DmpFirmware, MemoryAddress};
pub use fifo::{FifoConfigStatus, FifoPacket};
pub use interface::I2cInterface;
pub use interrupt::{InterruptPinConfig, InterruptStatus};
pub use power::{ClockSource, LpAccelRate, Sensors};
pub use profile::{ChipVariant, HardwareProfile};
pub use sensors::{
    AccelData, AccelDataG, AccelFullScale, AxisBias, Dlpf, GyroData, GyroDataDps, GyroFullScale,
};

/// I2C address when the AD0 pin is low (default: 0x68)
pub const I2C_ADDRESS_AD0_LOW: u8 = 0x68;

/// I2C address when the AD0 pin is high (alternative: 0x69)
pub const I2C_ADDRESS_AD0_HIGH: u8 = 0x69;

/// Step of [`MpuDriver::init`] that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStep {
    /// Soft reset
    Reset,
    /// Wake from sleep
    Wake,
    /// FIFO memory split (MPU6500)
    FifoSize,
    /// Default gyroscope range
    GyroRange,
    /// Default accelerometer range
    AccelRange,
    /// Default filter
    Filter,
    /// Default sample rate
    SampleRate,
    /// FIFO off
    Fifo,
    /// Auxiliary bus bypass
    Bypass,
    /// Sensors to sleep
    Sensors,
}

impl InitStep {
    /// Status code of this step
    #[must_use]
    pub const fn code(self) -> i8 {
        match self {
            Self::Reset => -1,
            Self::Wake => -2,
            Self::FifoSize => -3,
            Self::Bypass => -4,
            Self::Sensors => -5,
            Self::GyroRange => -30,
            Self::AccelRange => -31,
            Self::Filter => -32,
            Self::SampleRate => -33,
            Self::Fifo => -34,
        }
    }
}

/// Driver errors
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with the device
    Bus(E),
    /// Invalid `WHO_AM_I` register value (contains the actual value read)
    InvalidDevice(u8),
    /// Invalid configuration parameter
    InvalidConfig,
    /// Operation needs at least one awake sensor
    SensorsAsleep,
    /// No channels are streamed to the FIFO
    FifoDisabled,
    /// FIFO overflowed; it has been reset
    FifoOverflow,
    /// Operation not allowed while the DMP runs
    DmpActive,
    /// Operation needs the DMP running
    DmpInactive,
    /// DMP firmware has not been loaded
    DmpNotLoaded,
    /// DMP firmware is already loaded
    DmpAlreadyLoaded,
    /// DMP firmware image is empty
    EmptyFirmware,
    /// DMP memory transfer would cross a bank boundary
    BankBoundary,
    /// DMP memory read back differently than written
    FirmwareMismatch {
        /// DMP address of the first differing chunk
        address: u16,
    },
    /// Register cannot be read directly
    InvalidRegister(u8),
    /// Motion interrupt mode was never entered
    NoMotionSnapshot,
    /// Not available on this chip variant
    Unsupported,
    /// Initialization failed at the given step
    Init(InitStep),
}

impl<E> Error<E> {
    /// Distinct negative status code for this error
    ///
    /// Initialization failures report the code of the failing step.
    #[must_use]
    pub const fn code(&self) -> i8 {
        match self {
            Self::Init(step) => step.code(),
            Self::Bus(_) => -10,
            Self::InvalidDevice(_) => -11,
            Self::InvalidConfig => -12,
            Self::SensorsAsleep => -13,
            Self::FifoDisabled => -14,
            Self::FifoOverflow => -15,
            Self::DmpActive => -16,
            Self::DmpInactive => -17,
            Self::DmpNotLoaded => -18,
            Self::DmpAlreadyLoaded => -19,
            Self::EmptyFirmware => -20,
            Self::BankBoundary => -21,
            Self::FirmwareMismatch { .. } => -22,
            Self::InvalidRegister(_) => -23,
            Self::NoMotionSnapshot => -24,
            Self::Unsupported => -25,
        }
    }
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}
