//! Digital Motion Processor (DMP) memory and firmware
//!
//! The DMP has no firmware in ROM. The host uploads an opaque image into the
//! DMP's on-chip memory on every power-up, then points the DMP at its entry
//! address. The image itself is supplied by the application; this crate only
//! transfers and verifies it.
//!
//! ## Memory layout
//!
//! DMP memory is addressed by a 16-bit address whose high byte selects a
//! 256-byte bank and whose low byte is the offset inside that bank. A single
//! transfer never crosses a bank boundary.
//!
//! ## Loading
//!
//! The image is written in 16-byte chunks. Each chunk is read back and
//! compared before the next one is written, so a bad bus or a bad image is
//! caught at the first differing chunk.
//!
//! ```ignore
//! # use mpu6xxx::{MpuDriver, dmp::DmpFirmware};
//! # let mut imu: MpuDriver<_, _> = todo!();
//! # static IMAGE: [u8; 3062] = [0; 3062];
//! let firmware = DmpFirmware {
//!     image: &IMAGE,
//!     start_address: 0x0400,
//!     sample_rate: 200,
//! };
//! imu.load_firmware(&firmware)?;
//! imu.set_dmp_state(true)?;
//!
//! let mut packet = [0u8; 32];
//! if let Some(more) = imu.read_fifo_stream(&mut packet)? {
//!     // hand `packet` to the DMP packet parser
//!     let _ = more;
//! }
//! # Ok::<(), mpu6xxx::Error<()>>(())
//! ```

/// Bytes written (and verified) per transfer while loading firmware
pub const LOAD_CHUNK_SIZE: usize = 16;

/// A firmware image and the parameters it runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmpFirmware<'a> {
    /// Raw image, loaded at DMP address 0
    pub image: &'a [u8],
    /// Program entry address written to `PRGM_START`
    pub start_address: u16,
    /// Output rate the image is built for; the only valid sample rate while
    /// the DMP runs
    pub sample_rate: u16,
}

/// Bank and offset of a DMP memory address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryAddress {
    /// Bank number
    pub bank: u8,
    /// Offset inside the bank
    pub offset: u8,
}

impl MemoryAddress {
    /// Split a 16-bit DMP address
    #[must_use]
    pub const fn new(address: u16) -> Self {
        let [bank, offset] = address.to_be_bytes();
        Self { bank, offset }
    }

    /// Whether `len` bytes starting here stay inside one bank of `bank_size`
    #[must_use]
    pub const fn fits(self, len: usize, bank_size: u16) -> bool {
        self.offset as usize + len <= bank_size as usize
    }

    /// `BANK_SEL`, `MEM_START_ADDR` register pair
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 2] {
        [self.bank, self.offset]
    }
}

/// Iterate over `(address, chunk)` pairs of an image in load order
pub fn chunks(image: &[u8]) -> impl Iterator<Item = (u16, &[u8])> {
    image
        .chunks(LOAD_CHUNK_SIZE)
        .enumerate()
        .map(|(index, chunk)| {
            #[allow(clippy::cast_possible_truncation)]
            let address = (index * LOAD_CHUNK_SIZE) as u16;
            (address, chunk)
        })
}
