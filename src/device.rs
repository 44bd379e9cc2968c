//! High-level driver API for the MPU6050 / MPU6500
//!
//! [`MpuDriver`] owns the register device, a delay provider, the hardware
//! profile chosen at construction and the [`ChipConfig`] cache. Every setter
//! compares against the cache first and only touches the bus when the value
//! actually changes.

use device_driver::RegisterInterface;
use embedded_hal::delay::DelayNs;

use crate::config::ChipConfig;
use crate::dmp::{self, DmpFirmware, MemoryAddress, LOAD_CHUNK_SIZE};
use crate::fifo::{self, FifoConfigStatus, FifoPacket, MAX_PACKET_LENGTH};
use crate::interrupt::{InterruptPinConfig, InterruptStatus};
use crate::power::{ClockSource, LpAccelRate, Sensors, Standby};
use crate::profile::{ChipVariant, HardwareProfile};
use crate::registers::{
    Mpu6xxx as RegisterDevice, ACCEL_XOUT_H, BANK_SEL, DMP_INT_STATUS, FIFO_COUNT_H, FIFO_R_W,
    GYRO_XOUT_H, MEM_R_W, PRGM_START_H, PWR_MGMT_1, TEMP_OUT_H, USER_CTRL, XG_OFFS_USR_H,
};
use crate::sensors::{AccelData, AccelFullScale, AxisBias, Dlpf, GyroData, GyroFullScale};
use crate::{Error, InitStep};

/// Time the chip needs after a soft reset
const RESET_DELAY_MS: u32 = 500;
/// Settling time after a sensor power change or FIFO reset
const SETTLE_DELAY_MS: u32 = 50;
/// Settling time after toggling the auxiliary bus
const BYPASS_DELAY_MS: u32 = 3;

/// Slowest sample rate reachable with the 8-bit divider
pub const MIN_SAMPLE_RATE_HZ: u16 = 4;
/// Fastest sample rate with the DLPF enabled
pub const MAX_SAMPLE_RATE_HZ: u16 = 1000;
/// Highest rate `set_sample_rate` keeps in low-power accel mode
const LP_ACCEL_MAX_RATE_HZ: u16 = 40;

/// `PWR_MGMT_1.CYCLE`
const BIT_CYCLE: u8 = 0x20;
/// `PWR_MGMT_2` standby bits for all three gyro axes
const BIT_STBY_XYZG: u8 = 0x07;

/// Main driver for the MPU6050 / MPU6500
pub struct MpuDriver<I, D> {
    device: RegisterDevice<I>,
    delay: D,
    profile: HardwareProfile,
    config: ChipConfig,
}

impl<I, D> MpuDriver<I, D>
where
    I: RegisterInterface<AddressType = u8>,
    D: DelayNs,
{
    /// Create a new driver instance
    ///
    /// No bus traffic happens here. Call
    /// [`verify_identity`](Self::verify_identity) to check the chip identity
    /// and [`init`](Self::init) to bring it into a known state.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let profile = HardwareProfile::MPU6050;
    /// let interface = I2cInterface::from_profile(i2c, &profile);
    /// let mut imu = MpuDriver::new(interface, delay, profile);
    /// imu.init()?;
    /// ```
    pub fn new(interface: I, delay: D, profile: HardwareProfile) -> Self {
        Self {
            device: RegisterDevice::new(interface),
            delay,
            profile,
            config: ChipConfig::unknown(),
        }
    }

    /// Consume the driver and return the interface and delay provider
    pub fn release(self) -> (I, D) {
        (self.device.interface, self.delay)
    }

    /// Hardware profile selected at construction
    pub const fn profile(&self) -> &HardwareProfile {
        &self.profile
    }

    /// Current configuration cache
    pub const fn config(&self) -> &ChipConfig {
        &self.config
    }

    /// Reset the chip and apply the default configuration
    ///
    /// Defaults: gyro ±2000°/s, accel ±2g, 50 Hz sample rate, FIFO off,
    /// auxiliary bus bypass on, interrupts active low and unlatched, all
    /// sensors asleep. The filter is first set to 42 Hz and then follows the
    /// sample rate down to 20 Hz.
    ///
    /// Any DMP firmware loaded earlier is lost.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Init`] naming the step that failed.
    pub fn init(&mut self) -> Result<(), Error<I::Error>> {
        let reset = self.device.pwr_mgmt_1().write(|w| {
            w.set_device_reset(true);
        });
        init_step(InitStep::Reset, reset.map_err(Error::Bus))?;
        self.delay.delay_ms(RESET_DELAY_MS);

        let wake = self.device.pwr_mgmt_1().write(|_| {});
        init_step(InitStep::Wake, wake.map_err(Error::Bus))?;

        if self.profile.variant == ChipVariant::Mpu6500 {
            // DMP and FIFO share 4 kB; the last 1 kB goes to the FIFO
            let fifo_size = self.device.accel_config_two().write(|w| {
                w.set_fifo_size(1);
                w.set_accel_fchoice_b(true);
            });
            init_step(InitStep::FifoSize, fifo_size.map_err(Error::Bus))?;
        }

        self.config = ChipConfig::unknown();

        let result = self.set_gyro_fsr(GyroFullScale::Dps2000);
        init_step(InitStep::GyroRange, result)?;
        let result = self.set_accel_fsr(AccelFullScale::G2);
        init_step(InitStep::AccelRange, result)?;
        let result = self.set_lpf(42);
        init_step(InitStep::Filter, result)?;
        let result = self.set_sample_rate(50);
        init_step(InitStep::SampleRate, result)?;
        let result = self.configure_fifo(Sensors::empty());
        init_step(InitStep::Fifo, result)?;
        let result = self.set_bypass(true);
        init_step(InitStep::Bypass, result)?;
        let result = self.set_sensors(Sensors::empty());
        init_step(InitStep::Sensors, result)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("{} initialized", self.profile.variant);

        Ok(())
    }

    /// Read the `WHO_AM_I` register
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_who_am_i(&mut self) -> Result<u8, Error<I::Error>> {
        Ok(self.device.who_am_i().read()?.who_am_i())
    }

    /// Check that the chip answers with the profile's identity
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDevice`] with the value read if it does not
    /// match the profile.
    pub fn verify_identity(&mut self) -> Result<(), Error<I::Error>> {
        let who_am_i = self.read_who_am_i()?;
        if who_am_i != self.profile.who_am_i {
            return Err(Error::InvalidDevice(who_am_i));
        }
        Ok(())
    }

    // ----- Full-scale ranges, filter and sample rate -----

    /// Set the gyroscope full-scale range
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorsAsleep`] if no sensor is awake.
    pub fn set_gyro_fsr(&mut self, fsr: GyroFullScale) -> Result<(), Error<I::Error>> {
        self.ensure_awake()?;
        if self.config.gyro_fsr == Some(fsr) {
            return Ok(());
        }
        self.device.gyro_config().write(|w| {
            w.set_fs_sel(fsr.fs_sel());
        })?;
        self.config.gyro_fsr = Some(fsr);
        Ok(())
    }

    /// Set the accelerometer full-scale range
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorsAsleep`] if no sensor is awake.
    pub fn set_accel_fsr(&mut self, fsr: AccelFullScale) -> Result<(), Error<I::Error>> {
        self.ensure_awake()?;
        if self.config.accel_fsr == Some(fsr) {
            return Ok(());
        }
        self.device.accel_config().write(|w| {
            w.set_afs_sel(fsr.afs_sel());
        })?;
        self.config.accel_fsr = Some(fsr);
        Ok(())
    }

    /// Set the gyroscope range from its span in °/s (250, 500, 1000 or 2000)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for any other span.
    pub fn set_gyro_fsr_dps(&mut self, dps: u16) -> Result<(), Error<I::Error>> {
        let fsr = GyroFullScale::from_dps(dps).ok_or(Error::InvalidConfig)?;
        self.set_gyro_fsr(fsr)
    }

    /// Set the accelerometer range from its span in g (2, 4, 8 or 16)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for any other span.
    pub fn set_accel_fsr_g(&mut self, g: u8) -> Result<(), Error<I::Error>> {
        let fsr = AccelFullScale::from_g(g).ok_or(Error::InvalidConfig)?;
        self.set_accel_fsr(fsr)
    }

    /// Set the digital low pass filter
    ///
    /// `hz` is snapped down to the nearest supported tier (188, 98, 42, 20,
    /// 10 or 5 Hz), never below 5 Hz.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorsAsleep`] if no sensor is awake.
    pub fn set_lpf(&mut self, hz: u16) -> Result<(), Error<I::Error>> {
        self.ensure_awake()?;
        self.apply_lpf(Dlpf::from_hz(hz))
    }

    fn apply_lpf(&mut self, lpf: Dlpf) -> Result<(), Error<I::Error>> {
        if self.config.lpf == Some(lpf) {
            return Ok(());
        }
        self.device.lpf_config().write(|w| {
            w.set_dlpf_cfg(lpf.dlpf_cfg());
        })?;
        self.config.lpf = Some(lpf);
        Ok(())
    }

    /// Set the sampling rate
    ///
    /// The rate is clamped to 4..=1000 Hz and rounded to what the divider can
    /// produce; read [`sample_rate`](Self::sample_rate) for the achieved
    /// value. The filter is moved to half the achieved rate.
    ///
    /// In low-power accel mode a rate of 40 Hz or less only changes the wake
    /// frequency. A faster rate leaves low-power mode first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DmpActive`] while the DMP runs (it has its own fixed
    /// rate), or [`Error::SensorsAsleep`] if no sensor is awake.
    pub fn set_sample_rate(&mut self, rate: u16) -> Result<(), Error<I::Error>> {
        if self.config.dmp_on {
            return Err(Error::DmpActive);
        }
        self.ensure_awake()?;

        if self.config.lp_accel_mode {
            if (1..=LP_ACCEL_MAX_RATE_HZ).contains(&rate) {
                return self.lp_accel_mode(rate);
            }
            self.lp_accel_mode(0)?;
        }

        let rate = rate.clamp(MIN_SAMPLE_RATE_HZ, MAX_SAMPLE_RATE_HZ);
        #[allow(clippy::cast_possible_truncation)]
        let divider = (MAX_SAMPLE_RATE_HZ / rate - 1) as u8;
        self.device.smplrt_div().write(|w| {
            w.set_smplrt_div(divider);
        })?;

        let actual = MAX_SAMPLE_RATE_HZ / (1 + u16::from(divider));
        self.config.sample_rate = Some(actual);
        self.apply_lpf(Dlpf::from_hz(actual / 2))
    }

    /// Mark the accelerometer as a half-sensitivity part
    ///
    /// Some early MPU6050 revisions report half the nominal accel sensitivity.
    /// The flag only changes the reported range and sensitivity and is
    /// cleared by [`init`](Self::init).
    pub fn set_half_sensitivity_accel(&mut self, half: bool) {
        self.config.accel_half = half;
    }

    // ----- Sensor power -----

    /// Wake the sensors in `sensors` and put the rest to standby
    ///
    /// Selects the gyro PLL as clock when any gyro axis runs, the internal
    /// oscillator otherwise, and sleeps the chip when `sensors` is empty.
    /// Leaves low-power accel mode. Always waits 50 ms for the sensors to
    /// settle.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails. In that case
    /// the cached mask is cleared and the chip is treated as asleep.
    pub fn set_sensors(&mut self, sensors: Sensors) -> Result<(), Error<I::Error>> {
        let clock = sensors.clock_source();
        if let Err(e) = self.write_power(clock, Standby::for_sensors(sensors)) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Sensor power change to {} failed, treating chip as asleep", sensors);
            self.config.sensors = Some(Sensors::empty());
            return Err(e);
        }

        self.config.clk_src = match clock {
            ClockSource::Sleep => ClockSource::Internal,
            clock => clock,
        };
        self.config.sensors = Some(sensors);
        self.config.lp_accel_mode = false;
        self.delay.delay_ms(SETTLE_DELAY_MS);

        // Latched interrupts are only used in low-power accel mode
        if !sensors.is_empty() && sensors != Sensors::ACCEL {
            self.set_int_latched(false)?;
        }
        Ok(())
    }

    fn write_power(&mut self, clock: ClockSource, standby: Standby) -> Result<(), Error<I::Error>> {
        self.device.pwr_mgmt_1().write(|w| {
            w.set_clksel(clock.clksel());
            w.set_sleep(clock == ClockSource::Sleep);
        })?;
        self.device.pwr_mgmt_2().write(|w| {
            w.set_stby_xg(standby.gyro_x);
            w.set_stby_yg(standby.gyro_y);
            w.set_stby_zg(standby.gyro_z);
            w.set_stby_xa(standby.accel);
            w.set_stby_ya(standby.accel);
            w.set_stby_za(standby.accel);
        })?;
        Ok(())
    }

    /// Enter or leave low-power accel mode
    ///
    /// A `rate_hz` of 0 leaves the mode and does nothing outside it. Otherwise the chip sleeps between
    /// single accelerometer samples taken at the slowest supported wake rate
    /// not below `rate_hz` (MPU6050: 1.25/5/20/40 Hz, MPU6500: up to 640 Hz).
    /// Interrupts are latched while the mode is active.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `rate_hz` is above the variant's
    /// fastest wake rate.
    pub fn lp_accel_mode(&mut self, rate_hz: u16) -> Result<(), Error<I::Error>> {
        if rate_hz == 0 {
            if !self.config.lp_accel_mode {
                return Ok(());
            }
            self.set_int_latched(false)?;
            self.write_bytes(PWR_MGMT_1, &[0x00, BIT_STBY_XYZG])?;
            self.config.lp_accel_mode = false;
            return Ok(());
        }

        let rate =
            LpAccelRate::select(self.profile.variant, rate_hz).ok_or(Error::InvalidConfig)?;

        self.set_int_latched(true)?;
        match self.profile.variant {
            ChipVariant::Mpu6050 => {
                self.apply_lpf(Dlpf::from_hz(rate.filter_hz()))?;
                let pwr_mgmt_2 = (rate.lp_wake_ctrl() << 6) | BIT_STBY_XYZG;
                self.write_bytes(PWR_MGMT_1, &[BIT_CYCLE, pwr_mgmt_2])?;
            }
            ChipVariant::Mpu6500 => {
                self.device.lp_accel_odr().write(|w| {
                    w.set_lposc_clksel(rate.lposc_clksel());
                })?;
                self.device.pwr_mgmt_1().write(|w| {
                    w.set_cycle(true);
                })?;
            }
        }

        self.config.sensors = Some(Sensors::ACCEL);
        self.config.clk_src = ClockSource::Internal;
        self.config.lp_accel_mode = true;
        self.configure_fifo(Sensors::empty())?;
        Ok(())
    }

    // ----- Interrupts and bypass -----

    fn set_int_enable(&mut self, enable: bool) -> Result<(), Error<I::Error>> {
        if self.config.dmp_on {
            self.device.int_enable().write(|w| {
                w.set_dmp_int_en(enable);
            })?;
        } else {
            self.ensure_awake()?;
            if enable && self.config.int_enable {
                return Ok(());
            }
            self.device.int_enable().write(|w| {
                w.set_data_rdy_en(enable);
            })?;
        }
        self.config.int_enable = enable;
        Ok(())
    }

    fn write_pin_config(&mut self, pin: InterruptPinConfig) -> Result<(), Error<I::Error>> {
        self.device.int_pin_cfg().write(|w| {
            w.set_bypass_en(pin.bypass);
            w.set_int_level(pin.active_low);
            w.set_latch_int_en(pin.latched);
            w.set_int_rd_clear(pin.latched);
        })?;
        Ok(())
    }

    /// Connect or disconnect the auxiliary bus from the host bus
    ///
    /// When disconnecting, the auxiliary I2C master is enabled if the compass
    /// is awake.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_bypass(&mut self, bypass: bool) -> Result<(), Error<I::Error>> {
        if self.config.bypass_mode == Some(bypass) {
            return Ok(());
        }

        let aux_master = !bypass && self.config.awake().contains(Sensors::COMPASS);
        self.device.user_ctrl().modify(|w| {
            w.set_aux_if_en(aux_master);
        })?;
        self.delay.delay_ms(BYPASS_DELAY_MS);

        self.write_pin_config(InterruptPinConfig {
            bypass,
            ..self.config.pin_config()
        })?;
        self.config.bypass_mode = Some(bypass);
        Ok(())
    }

    /// Hold the INT pin until any register is read
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_int_latched(&mut self, latched: bool) -> Result<(), Error<I::Error>> {
        if self.config.latched_int == latched {
            return Ok(());
        }
        self.write_pin_config(InterruptPinConfig {
            latched,
            ..self.config.pin_config()
        })?;
        self.config.latched_int = latched;
        Ok(())
    }

    /// Select active-low (`true`) or active-high INT signalling
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_int_level(&mut self, active_low: bool) -> Result<(), Error<I::Error>> {
        if self.config.active_low_int == active_low {
            return Ok(());
        }
        self.write_pin_config(InterruptPinConfig {
            active_low,
            ..self.config.pin_config()
        })?;
        self.config.active_low_int = active_low;
        Ok(())
    }

    /// Read `DMP_INT_STATUS` and `INT_STATUS`
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorsAsleep`] if no sensor is awake.
    pub fn int_status(&mut self) -> Result<InterruptStatus, Error<I::Error>> {
        self.ensure_awake()?;
        let mut bytes = [0u8; 2];
        self.read_bytes(DMP_INT_STATUS, &mut bytes)?;
        Ok(InterruptStatus::from_bytes(bytes))
    }

    // ----- Motion interrupt (MPU6500) -----

    /// Switch to accel-only wake-on-motion
    ///
    /// The current configuration is saved (once, on the first call) and the
    /// DMP is stopped if it was running. The chip then cycles at the wake rate
    /// picked from `wake_rate_hz` and raises the motion interrupt when any
    /// axis changes by more than `threshold_mg` (4 mg steps, 4..=1020 mg).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] on the MPU6050 and
    /// [`Error::InvalidConfig`] for an unsupported wake rate.
    pub fn enable_motion_interrupt(
        &mut self,
        threshold_mg: u16,
        wake_rate_hz: u16,
    ) -> Result<(), Error<I::Error>> {
        if !self.profile.has_wake_on_motion() {
            return Err(Error::Unsupported);
        }
        let rate =
            LpAccelRate::select(self.profile.variant, wake_rate_hz).ok_or(Error::InvalidConfig)?;

        if !self.config.int_motion_only {
            self.config.motion_int_cache = Some(self.config.snapshot());
            if self.config.dmp_on {
                self.set_dmp_state(false)?;
            }
        }

        self.set_int_enable(false)?;

        // USER_CTRL, PWR_MGMT_1, PWR_MGMT_2: FIFO and DMP off, accel only
        self.write_bytes(USER_CTRL, &[0x00, 0x00, BIT_STBY_XYZG])?;

        #[allow(clippy::cast_possible_truncation)]
        let threshold = (threshold_mg >> 2).clamp(1, 255) as u8;
        self.device.mot_thr().write(|w| {
            w.set_mot_thr(threshold);
        })?;
        self.device.lp_accel_odr().write(|w| {
            w.set_lposc_clksel(rate.lposc_clksel());
        })?;
        self.device.accel_intel_ctrl().write(|w| {
            w.set_accel_intel_en(true);
            w.set_accel_intel_mode(true);
        })?;
        self.device.pwr_mgmt_1().write(|w| {
            w.set_cycle(true);
        })?;
        self.device.int_enable().write(|w| {
            w.set_mot_en(true);
        })?;

        self.config.sensors = Some(Sensors::ACCEL);
        self.config.clk_src = ClockSource::Internal;
        self.config.fifo_enable = Some(Sensors::empty());
        self.config.lp_accel_mode = false;
        self.config.int_motion_only = true;
        Ok(())
    }

    /// Leave wake-on-motion and restore the saved configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMotionSnapshot`] if motion mode was never entered,
    /// [`Error::Unsupported`] on the MPU6050.
    pub fn disable_motion_interrupt(&mut self) -> Result<(), Error<I::Error>> {
        if !self.profile.has_wake_on_motion() {
            return Err(Error::Unsupported);
        }
        let snapshot = self
            .config
            .motion_int_cache
            .ok_or(Error::NoMotionSnapshot)?;

        self.config.gyro_fsr = None;
        self.config.accel_fsr = None;
        self.config.lpf = None;
        self.config.sample_rate = None;
        self.config.sensors = None;
        self.config.fifo_enable = None;
        self.config.clk_src = ClockSource::Pll;

        self.set_sensors(snapshot.sensors)?;
        if !snapshot.sensors.is_empty() {
            if let Some(fsr) = snapshot.gyro_fsr {
                self.set_gyro_fsr(fsr)?;
            }
            if let Some(fsr) = snapshot.accel_fsr {
                self.set_accel_fsr(fsr)?;
            }
            if let Some(rate) = snapshot.sample_rate {
                self.set_sample_rate(rate)?;
            }
            // After the rate, which moves the filter on its own
            if let Some(lpf) = snapshot.lpf {
                self.apply_lpf(lpf)?;
            }
            self.configure_fifo(snapshot.fifo_enable)?;
            if snapshot.dmp_on {
                self.set_dmp_state(true)?;
            }
        }

        self.device.accel_intel_ctrl().write(|_| {})?;
        self.config.int_motion_only = false;
        self.config.motion_int_cache = None;
        Ok(())
    }

    // ----- FIFO -----

    /// Select which channels are streamed to the FIFO
    ///
    /// The compass bit is ignored. Channels that are asleep are dropped and
    /// reported through [`FifoConfigStatus::Partial`]. While the DMP runs it
    /// owns the FIFO and this call does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorsAsleep`] if no sensor is awake. If the FIFO
    /// reset fails the previous channel selection is kept.
    pub fn configure_fifo(&mut self, sensors: Sensors) -> Result<FifoConfigStatus, Error<I::Error>> {
        let requested = sensors.difference(Sensors::COMPASS);
        if self.config.dmp_on {
            return Ok(FifoConfigStatus::Complete);
        }
        self.ensure_awake()?;

        let previous = self.config.fifo_enable;
        let enabled = requested & self.config.awake();
        self.config.fifo_enable = Some(enabled);

        if let Err(e) = self.apply_fifo_enable(enabled, requested) {
            self.config.fifo_enable = previous;
            return Err(e);
        }

        if enabled == requested {
            Ok(FifoConfigStatus::Complete)
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("FIFO: requested {} but only {} awake", requested, enabled);
            Ok(FifoConfigStatus::Partial { enabled })
        }
    }

    fn apply_fifo_enable(
        &mut self,
        enabled: Sensors,
        requested: Sensors,
    ) -> Result<(), Error<I::Error>> {
        self.set_int_enable(!enabled.is_empty() || self.config.lp_accel_mode)?;
        if !requested.is_empty() {
            self.reset_fifo()?;
        }
        Ok(())
    }

    fn write_fifo_enable(&mut self, fifo: Sensors) -> Result<(), Error<I::Error>> {
        self.device.fifo_en().write(|w| {
            w.set_xg_fifo_en(fifo.contains(Sensors::GYRO_X));
            w.set_yg_fifo_en(fifo.contains(Sensors::GYRO_Y));
            w.set_zg_fifo_en(fifo.contains(Sensors::GYRO_Z));
            w.set_accel_fifo_en(fifo.contains(Sensors::ACCEL));
        })?;
        Ok(())
    }

    /// Empty the FIFO and restart streaming
    ///
    /// With the DMP on, the DMP is reset as well and its interrupt restored;
    /// otherwise the data-ready interrupt and the cached channel selection
    /// are restored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorsAsleep`] if no sensor is awake.
    pub fn reset_fifo(&mut self) -> Result<(), Error<I::Error>> {
        self.ensure_awake()?;

        self.device.int_enable().write(|_| {})?;
        self.device.fifo_en().write(|_| {})?;
        self.device.user_ctrl().write(|_| {})?;

        let compass = self.config.awake().contains(Sensors::COMPASS);
        let int_enable = self.config.int_enable;

        if self.config.dmp_on {
            self.device.user_ctrl().write(|w| {
                w.set_fifo_rst(true);
                w.set_dmp_rst(true);
            })?;
            self.delay.delay_ms(SETTLE_DELAY_MS);
            self.device.user_ctrl().write(|w| {
                w.set_dmp_en(true);
                w.set_fifo_en(true);
                w.set_aux_if_en(compass);
            })?;
            self.device.int_enable().write(|w| {
                w.set_dmp_int_en(int_enable);
            })?;
            self.device.fifo_en().write(|_| {})?;
        } else {
            self.device.user_ctrl().write(|w| {
                w.set_fifo_rst(true);
            })?;
            let aux_master = compass && !self.config.bypass_mode.unwrap_or(true);
            self.device.user_ctrl().write(|w| {
                w.set_fifo_en(true);
                w.set_aux_if_en(aux_master);
            })?;
            self.delay.delay_ms(SETTLE_DELAY_MS);
            self.device.int_enable().write(|w| {
                w.set_data_rdy_en(int_enable);
            })?;
            let fifo = self.config.fifo();
            self.write_fifo_enable(fifo)?;
        }
        Ok(())
    }

    /// Read one packet from the FIFO
    ///
    /// Returns a packet with an empty `sensors` mask if no complete packet is
    /// buffered yet. `more` tells how many complete packets remain.
    ///
    /// # Errors
    ///
    /// - [`Error::DmpActive`] while the DMP owns the FIFO
    /// - [`Error::SensorsAsleep`] / [`Error::FifoDisabled`] if there is
    ///   nothing to stream
    /// - [`Error::FifoOverflow`] if the FIFO overflowed; it has been reset
    ///   and no data is returned
    pub fn read_fifo(&mut self) -> Result<FifoPacket, Error<I::Error>> {
        if self.config.dmp_on {
            return Err(Error::DmpActive);
        }
        self.ensure_awake()?;
        let fifo = self.config.fifo();
        let packet_size = fifo.fifo_packet_size();
        if packet_size == 0 {
            return Err(Error::FifoDisabled);
        }

        let count = self.fifo_count()?;
        if usize::from(count) < packet_size {
            return Ok(FifoPacket::empty());
        }
        self.check_overflow(count)?;

        let mut data = [0u8; MAX_PACKET_LENGTH];
        self.read_bytes(FIFO_R_W, &mut data[..packet_size])?;

        let mut packet = fifo::decode_packet(fifo, &data[..packet_size]);
        #[allow(clippy::cast_possible_truncation)]
        let more = (usize::from(count) / packet_size - 1) as u16;
        packet.more = more;
        Ok(packet)
    }

    /// Read `buffer.len()` raw bytes from the FIFO while the DMP runs
    ///
    /// Returns `None` if fewer bytes are buffered, otherwise the number of
    /// further complete packets of the same length.
    ///
    /// # Errors
    ///
    /// - [`Error::DmpInactive`] if the DMP is off
    /// - [`Error::InvalidConfig`] for an empty buffer
    /// - [`Error::FifoOverflow`] if the FIFO overflowed; it has been reset
    pub fn read_fifo_stream(&mut self, buffer: &mut [u8]) -> Result<Option<u16>, Error<I::Error>> {
        if !self.config.dmp_on {
            return Err(Error::DmpInactive);
        }
        self.ensure_awake()?;
        if buffer.is_empty() {
            return Err(Error::InvalidConfig);
        }

        let count = self.fifo_count()?;
        if usize::from(count) < buffer.len() {
            return Ok(None);
        }
        self.check_overflow(count)?;

        self.read_bytes(FIFO_R_W, buffer)?;
        #[allow(clippy::cast_possible_truncation)]
        let more = (usize::from(count) / buffer.len() - 1) as u16;
        Ok(Some(more))
    }

    fn fifo_count(&mut self) -> Result<u16, Error<I::Error>> {
        let mut count = [0u8; 2];
        self.read_bytes(FIFO_COUNT_H, &mut count)?;
        Ok(u16::from_be_bytes(count))
    }

    fn check_overflow(&mut self, count: u16) -> Result<(), Error<I::Error>> {
        if !fifo::needs_overflow_check(count, self.profile.max_fifo) {
            return Ok(());
        }
        if self.device.int_status().read()?.fifo_oflow_int() {
            #[cfg(feature = "defmt")]
            defmt::warn!("FIFO overflow at {} bytes, resetting", count);
            self.reset_fifo()?;
            return Err(Error::FifoOverflow);
        }
        Ok(())
    }

    // ----- DMP -----

    /// Write `data` to DMP memory at `address` (bank in the high byte)
    ///
    /// # Errors
    ///
    /// Returns [`Error::BankBoundary`] without touching the bus if the
    /// transfer would cross into the next bank, [`Error::SensorsAsleep`] if
    /// the chip is asleep.
    pub fn write_memory(&mut self, address: u16, data: &[u8]) -> Result<(), Error<I::Error>> {
        let location = self.memory_location(address, data.len())?;
        self.write_bytes(BANK_SEL, &location.to_bytes())?;
        self.write_bytes(MEM_R_W, data)
    }

    /// Read DMP memory at `address` into `data`
    ///
    /// # Errors
    ///
    /// Same as [`write_memory`](Self::write_memory).
    pub fn read_memory(&mut self, address: u16, data: &mut [u8]) -> Result<(), Error<I::Error>> {
        let location = self.memory_location(address, data.len())?;
        self.write_bytes(BANK_SEL, &location.to_bytes())?;
        self.read_bytes(MEM_R_W, data)
    }

    fn memory_location(&self, address: u16, len: usize) -> Result<MemoryAddress, Error<I::Error>> {
        self.ensure_awake()?;
        let location = MemoryAddress::new(address);
        if !location.fits(len, self.profile.bank_size) {
            return Err(Error::BankBoundary);
        }
        Ok(location)
    }

    /// Upload and verify a DMP firmware image
    ///
    /// Each 16-byte chunk is read back and compared before the next one is
    /// written. Loading succeeds at most once per [`init`](Self::init).
    ///
    /// # Errors
    ///
    /// - [`Error::DmpAlreadyLoaded`] without any bus traffic on a second call
    /// - [`Error::EmptyFirmware`] for an empty image
    /// - [`Error::FirmwareMismatch`] with the address of the first chunk that
    ///   read back differently
    pub fn load_firmware(&mut self, firmware: &DmpFirmware<'_>) -> Result<(), Error<I::Error>> {
        if self.config.dmp_loaded {
            return Err(Error::DmpAlreadyLoaded);
        }
        if firmware.image.is_empty() {
            return Err(Error::EmptyFirmware);
        }
        if firmware.image.len() > usize::from(u16::MAX) + 1 {
            return Err(Error::InvalidConfig);
        }

        let mut readback = [0u8; LOAD_CHUNK_SIZE];
        for (address, chunk) in dmp::chunks(firmware.image) {
            self.write_memory(address, chunk)?;
            let readback = &mut readback[..chunk.len()];
            self.read_memory(address, readback)?;
            if readback != chunk {
                #[cfg(feature = "defmt")]
                defmt::warn!("DMP firmware verification failed at {=u16:#x}", address);
                return Err(Error::FirmwareMismatch { address });
            }
        }

        self.write_bytes(PRGM_START_H, &firmware.start_address.to_be_bytes())?;

        self.config.dmp_loaded = true;
        self.config.dmp_sample_rate = firmware.sample_rate;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "DMP firmware loaded: {} bytes, start {=u16:#x}",
            firmware.image.len(),
            firmware.start_address
        );
        Ok(())
    }

    /// Start or stop the DMP
    ///
    /// Starting disables bypass, pins the sample rate to the firmware's rate
    /// and hands the FIFO to the DMP. Stopping gives the FIFO back with the
    /// cached channel selection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DmpNotLoaded`] when starting without firmware.
    pub fn set_dmp_state(&mut self, enable: bool) -> Result<(), Error<I::Error>> {
        if self.config.dmp_on == enable {
            return Ok(());
        }

        if enable {
            if !self.config.dmp_loaded {
                return Err(Error::DmpNotLoaded);
            }
            self.set_int_enable(false)?;
            self.set_bypass(false)?;
            self.set_sample_rate(self.config.dmp_sample_rate)?;
            self.device.fifo_en().write(|_| {})?;
            self.config.dmp_on = true;
            self.set_int_enable(true)?;
            self.reset_fifo()?;
        } else {
            self.set_int_enable(false)?;
            let fifo = self.config.fifo();
            self.write_fifo_enable(fifo)?;
            self.config.dmp_on = false;
            self.reset_fifo()?;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("DMP {}", if enable { "on" } else { "off" });
        Ok(())
    }

    // ----- Bias calibration -----

    /// Read the gyroscope offset registers
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_gyro_bias(&mut self) -> Result<AxisBias, Error<I::Error>> {
        self.read_bias_registers(gyro_offset_registers())
    }

    /// Read the accelerometer offset registers
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_accel_bias(&mut self) -> Result<AxisBias, Error<I::Error>> {
        self.read_bias_registers(self.profile.accel_offset_registers)
    }

    /// Subtract `delta` (LSB at ±1000°/s) from the gyroscope offsets
    ///
    /// Corrections accumulate onto whatever the chip holds. Returns the new
    /// register contents.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn apply_gyro_bias_correction(
        &mut self,
        delta: [i32; 3],
    ) -> Result<AxisBias, Error<I::Error>> {
        let registers = gyro_offset_registers();
        let current = self.read_bias_registers(registers)?;
        let updated = subtract_bias(current, delta);
        self.write_bias_registers(registers, updated)?;
        Ok(updated)
    }

    /// Subtract `delta` (LSB at ±8g) from the accelerometer offsets
    ///
    /// Bit 0 of each delta is cleared first so the low bit of the factory
    /// value is kept. Returns the new register contents.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn apply_accel_bias_correction(
        &mut self,
        delta: [i32; 3],
    ) -> Result<AxisBias, Error<I::Error>> {
        let registers = self.profile.accel_offset_registers;
        let current = self.read_bias_registers(registers)?;
        let updated = subtract_bias(current, delta.map(|d| d & !1));
        self.write_bias_registers(registers, updated)?;
        Ok(updated)
    }

    fn read_bias_registers(&mut self, registers: [u8; 3]) -> Result<AxisBias, Error<I::Error>> {
        let mut values = [0i16; 3];
        for (value, register) in values.iter_mut().zip(registers) {
            let mut bytes = [0u8; 2];
            self.read_bytes(register, &mut bytes)?;
            *value = i16::from_be_bytes(bytes);
        }
        Ok(AxisBias::from_array(values))
    }

    fn write_bias_registers(
        &mut self,
        registers: [u8; 3],
        bias: AxisBias,
    ) -> Result<(), Error<I::Error>> {
        for (value, register) in bias.to_array().into_iter().zip(registers) {
            self.write_bytes(register, &value.to_be_bytes())?;
        }
        Ok(())
    }

    // ----- Raw reads -----

    /// Read the die temperature in °C, Q16 fixed point
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorsAsleep`] if no sensor is awake.
    pub fn read_temperature(&mut self) -> Result<i32, Error<I::Error>> {
        let raw = self.read_temperature_raw()?;
        Ok(self.profile.temperature_q16(raw))
    }

    /// Read the die temperature in °C
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorsAsleep`] if no sensor is awake.
    pub fn read_temperature_celsius(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_temperature_raw()?;
        Ok(self.profile.temperature_celsius(raw))
    }

    fn read_temperature_raw(&mut self) -> Result<i16, Error<I::Error>> {
        self.ensure_awake()?;
        let mut bytes = [0u8; 2];
        self.read_bytes(TEMP_OUT_H, &mut bytes)?;
        Ok(i16::from_be_bytes(bytes))
    }

    /// Read the gyroscope data registers directly
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorsAsleep`] unless a gyro axis is awake.
    pub fn read_gyro_reg(&mut self) -> Result<GyroData, Error<I::Error>> {
        if !self.config.awake().intersects(Sensors::GYRO) {
            return Err(Error::SensorsAsleep);
        }
        let [x, y, z] = self.read_axes(GYRO_XOUT_H)?;
        Ok(GyroData { x, y, z })
    }

    /// Read the accelerometer data registers directly
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorsAsleep`] unless the accelerometer is awake.
    pub fn read_accel_reg(&mut self) -> Result<AccelData, Error<I::Error>> {
        if !self.config.awake().contains(Sensors::ACCEL) {
            return Err(Error::SensorsAsleep);
        }
        let [x, y, z] = self.read_axes(ACCEL_XOUT_H)?;
        Ok(AccelData { x, y, z })
    }

    fn read_axes(&mut self, address: u8) -> Result<[i16; 3], Error<I::Error>> {
        // Read all 6 bytes at once to prevent torn reads
        let mut buffer = [0u8; 6];
        self.read_bytes(address, &mut buffer)?;
        Ok([
            i16::from_be_bytes([buffer[0], buffer[1]]),
            i16::from_be_bytes([buffer[2], buffer[3]]),
            i16::from_be_bytes([buffer[4], buffer[5]]),
        ])
    }

    /// Read a single register
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegister`] for the FIFO and DMP memory data
    /// ports (reading them consumes data) and for addresses past the end of
    /// the register map.
    pub fn read_register(&mut self, address: u8) -> Result<u8, Error<I::Error>> {
        if address == FIFO_R_W || address == MEM_R_W || address >= self.profile.num_registers {
            return Err(Error::InvalidRegister(address));
        }
        let mut value = [0u8; 1];
        self.read_bytes(address, &mut value)?;
        Ok(value[0])
    }

    // ----- Cached state -----

    /// Gyroscope full-scale range, if configured
    pub fn gyro_fsr(&self) -> Option<GyroFullScale> {
        self.config.gyro_fsr
    }

    /// Accelerometer full-scale range in g, doubled on half-sensitivity parts
    pub fn accel_fsr_g(&self) -> Option<u8> {
        let g = self.config.accel_fsr?.g();
        Some(if self.config.accel_half { g << 1 } else { g })
    }

    /// Gyroscope sensitivity in LSB/(°/s)
    pub fn gyro_sensitivity(&self) -> Option<f32> {
        self.config.gyro_fsr.map(GyroFullScale::sensitivity)
    }

    /// Accelerometer sensitivity in LSB/g, halved on half-sensitivity parts
    pub fn accel_sensitivity(&self) -> Option<u16> {
        let sensitivity = self.config.accel_fsr?.sensitivity();
        Some(if self.config.accel_half {
            sensitivity >> 1
        } else {
            sensitivity
        })
    }

    /// Filter tier, if configured
    pub fn lpf(&self) -> Option<Dlpf> {
        self.config.lpf
    }

    /// Achieved sample rate in Hz; `None` while the DMP runs or if unknown
    pub fn sample_rate(&self) -> Option<u16> {
        if self.config.dmp_on {
            None
        } else {
            self.config.sample_rate
        }
    }

    /// Channels streamed to the FIFO
    pub fn fifo_config(&self) -> Sensors {
        self.config.fifo()
    }

    /// Awake channels, `None` until first set after reset
    pub fn sensors(&self) -> Option<Sensors> {
        self.config.sensors
    }

    /// Whether the DMP is running
    pub const fn dmp_enabled(&self) -> bool {
        self.config.dmp_on
    }

    /// Whether DMP firmware has been loaded
    pub const fn dmp_loaded(&self) -> bool {
        self.config.dmp_loaded
    }

    /// Whether low-power accel mode is active
    pub const fn lp_accel_enabled(&self) -> bool {
        self.config.lp_accel_mode
    }

    // ----- Helpers -----

    fn ensure_awake(&self) -> Result<(), Error<I::Error>> {
        if self.config.awake().is_empty() {
            return Err(Error::SensorsAsleep);
        }
        Ok(())
    }

    fn read_bytes(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Error<I::Error>> {
        #[allow(clippy::cast_possible_truncation)]
        let size_bits = (buffer.len() * 8) as u32;
        self.device
            .interface
            .read_register(address, size_bits, buffer)?;
        Ok(())
    }

    fn write_bytes(&mut self, address: u8, data: &[u8]) -> Result<(), Error<I::Error>> {
        #[allow(clippy::cast_possible_truncation)]
        let size_bits = (data.len() * 8) as u32;
        self.device
            .interface
            .write_register(address, size_bits, data)?;
        Ok(())
    }
}

/// Map any failure inside `init` to the step it happened in
fn init_step<T, E>(step: InitStep, result: Result<T, Error<E>>) -> Result<T, Error<E>> {
    result.map_err(|_| {
        #[cfg(feature = "defmt")]
        defmt::warn!("init failed at {}", step);
        Error::Init(step)
    })
}

const fn gyro_offset_registers() -> [u8; 3] {
    [XG_OFFS_USR_H, XG_OFFS_USR_H + 2, XG_OFFS_USR_H + 4]
}

fn subtract_bias(current: AxisBias, delta: [i32; 3]) -> AxisBias {
    let current = current.to_array();
    let mut updated = [0i16; 3];
    for ((out, value), delta) in updated.iter_mut().zip(current).zip(delta) {
        // Offset registers are 16 bits wide; wrap like the hardware does
        #[allow(clippy::cast_possible_truncation)]
        let wrapped = i32::from(value).wrapping_sub(delta) as i16;
        *out = wrapped;
    }
    AxisBias::from_array(updated)
}
