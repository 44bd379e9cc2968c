//! Interrupt pin configuration and status
//!
//! The chip has a single INT pin. Its electrical behaviour and the auxiliary
//! bus bypass switch share one register (`INT_PIN_CFG`), so the three flags
//! the driver manages are always written together:
//! - bypass (auxiliary bus connected to the host bus)
//! - active-low signalling
//! - latched mode, cleared by any register read
//!
//! # Example
//!
//! ```ignore
//! # use mpu6xxx::MpuDriver;
//! # let mut imu: MpuDriver<_, _> = todo!();
//! // Hold the INT pin until the host reads any register
//! imu.set_int_latched(true)?;
//!
//! let status = imu.int_status()?;
//! if status.fifo_overflow {
//!     imu.reset_fifo()?;
//! }
//! # Ok::<(), mpu6xxx::Error<()>>(())
//! ```

/// Cached contents of `INT_PIN_CFG`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptPinConfig {
    /// Auxiliary bus bypass enabled
    pub bypass: bool,
    /// INT pin active low
    pub active_low: bool,
    /// INT pin latched until any register read
    pub latched: bool,
}

/// Decoded `DMP_INT_STATUS` / `INT_STATUS` pair
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct InterruptStatus {
    /// Raw value, `DMP_INT_STATUS` in the high byte
    pub raw: u16,
    /// New sample available
    pub data_ready: bool,
    /// DMP raised an interrupt
    pub dmp: bool,
    /// FIFO overflowed
    pub fifo_overflow: bool,
    /// Motion threshold exceeded
    pub motion: bool,
}

impl InterruptStatus {
    /// Decode the two status bytes read from `DMP_INT_STATUS`
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 2]) -> Self {
        let status = bytes[1];
        Self {
            raw: u16::from_be_bytes(bytes),
            data_ready: status & 0x01 != 0,
            dmp: status & 0x02 != 0,
            fifo_overflow: status & 0x10 != 0,
            motion: status & 0x40 != 0,
        }
    }
}
