//! FIFO packet layout and decoding
//!
//! With the DMP off, the FIFO holds fixed-size packets whose layout follows
//! from the channels enabled in `FIFO_EN`. The chip always emits them in
//! physical register order: accelerometer X/Y/Z first (6 bytes), then
//! gyroscope X, Y and Z (2 bytes each, each present only when enabled). All
//! fields are big-endian `i16`.
//!
//! With the DMP on, the layout is owned by the DMP firmware and the driver
//! only hands out raw bytes (see `read_fifo_stream`).
//!
//! # Example
//!
//! ```ignore
//! # use mpu6xxx::{MpuDriver, Sensors};
//! # let mut imu: MpuDriver<_, _> = todo!();
//! imu.set_sensors(Sensors::GYRO | Sensors::ACCEL)?;
//! imu.configure_fifo(Sensors::GYRO | Sensors::ACCEL)?;
//!
//! loop {
//!     let packet = imu.read_fifo()?;
//!     if packet.sensors.is_empty() {
//!         break; // nothing buffered yet
//!     }
//!     // packet.accel / packet.gyro hold the oldest sample
//!     if packet.more == 0 {
//!         break;
//!     }
//! }
//! # Ok::<(), mpu6xxx::Error<()>>(())
//! ```

use crate::power::Sensors;
use crate::sensors::{AccelData, GyroData};

/// Largest packet the FIFO can hold with the DMP off (accel + 3 gyro axes)
pub const MAX_PACKET_LENGTH: usize = 12;

/// One decoded FIFO packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoPacket {
    /// Channels present in this packet; empty when nothing was buffered
    pub sensors: Sensors,
    /// Accelerometer sample (zero unless `sensors` contains `ACCEL`)
    pub accel: AccelData,
    /// Gyroscope sample (axes not in `sensors` are zero)
    pub gyro: GyroData,
    /// Complete packets still waiting in the FIFO
    pub more: u16,
}

impl FifoPacket {
    /// Packet reporting that no complete sample was buffered
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            sensors: Sensors::empty(),
            accel: AccelData { x: 0, y: 0, z: 0 },
            gyro: GyroData { x: 0, y: 0, z: 0 },
            more: 0,
        }
    }
}

/// Outcome of `configure_fifo`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FifoConfigStatus {
    /// Every requested channel is streamed
    Complete,
    /// Some requested channels are asleep; only `enabled` is streamed
    Partial {
        /// Channels actually streamed
        enabled: Sensors,
    },
}

/// Decode one packet laid out for `sensors`
///
/// `data` must hold at least `sensors.fifo_packet_size()` bytes. Channels
/// not in `sensors` are left at zero. The `more` field is left at zero for
/// the caller to fill in.
#[must_use]
pub fn decode_packet(sensors: Sensors, data: &[u8]) -> FifoPacket {
    let mut packet = FifoPacket::empty();
    packet.sensors = sensors & (Sensors::GYRO | Sensors::ACCEL);

    let mut words = data
        .chunks_exact(2)
        .map(|pair| i16::from_be_bytes([pair[0], pair[1]]));
    let mut next = || words.next().unwrap_or(0);

    if sensors.contains(Sensors::ACCEL) {
        packet.accel.x = next();
        packet.accel.y = next();
        packet.accel.z = next();
    }
    if sensors.contains(Sensors::GYRO_X) {
        packet.gyro.x = next();
    }
    if sensors.contains(Sensors::GYRO_Y) {
        packet.gyro.y = next();
    }
    if sensors.contains(Sensors::GYRO_Z) {
        packet.gyro.z = next();
    }

    packet
}

/// Whether a FIFO byte count is high enough that overflow must be checked
#[must_use]
pub const fn needs_overflow_check(count: u16, max_fifo: u16) -> bool {
    count > max_fifo / 2
}
