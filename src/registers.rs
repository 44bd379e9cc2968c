//! Register definitions for the MPU6050 / MPU6500 family
//!
//! The register map is flat (no user banks). Both variants share the bulk of
//! the map; the MPU6500-only registers (`ACCEL_CONFIG_2`, `LP_ACCEL_ODR`,
//! `ACCEL_INTEL_CTRL`) are declared here as well and are only touched when the
//! active [`HardwareProfile`](crate::profile::HardwareProfile) says so.
//!
//! Multi-byte data ports are not modelled as registers. They are accessed with
//! raw transfers on the register interface using the addresses below:
//! - `FIFO_COUNT_H` (0x72, 2 bytes big-endian)
//! - `FIFO_R_W` (0x74, stream)
//! - `BANK_SEL` + `MEM_START_ADDR` (0x6D-0x6E, written together)
//! - `MEM_R_W` (0x6F, stream)
//! - `PRGM_START_H` (0x70-0x71, 2 bytes big-endian)

/// `XG_OFFS_USR` high byte; gyro offsets occupy 0x13-0x18
pub const XG_OFFS_USR_H: u8 = 0x13;
/// `ACCEL_XOUT_H`; accel data occupies 0x3B-0x40
pub const ACCEL_XOUT_H: u8 = 0x3B;
/// `TEMP_OUT_H`; temperature occupies 0x41-0x42
pub const TEMP_OUT_H: u8 = 0x41;
/// `GYRO_XOUT_H`; gyro data occupies 0x43-0x48
pub const GYRO_XOUT_H: u8 = 0x43;
/// `DMP_INT_STATUS`, read together with `INT_STATUS`
pub const DMP_INT_STATUS: u8 = 0x39;
/// `USER_CTRL`, followed by `PWR_MGMT_1` and `PWR_MGMT_2`
pub const USER_CTRL: u8 = 0x6A;
/// `PWR_MGMT_1`, followed by `PWR_MGMT_2`
pub const PWR_MGMT_1: u8 = 0x6B;
/// `BANK_SEL`, followed by `MEM_START_ADDR`
pub const BANK_SEL: u8 = 0x6D;
/// `MEM_START_ADDR`
pub const MEM_START_ADDR: u8 = 0x6E;
/// `MEM_R_W` - DMP memory data port
pub const MEM_R_W: u8 = 0x6F;
/// `PRGM_START_H`, followed by `PRGM_START_L`
pub const PRGM_START_H: u8 = 0x70;
/// `FIFO_COUNT_H`, followed by `FIFO_COUNT_L`
pub const FIFO_COUNT_H: u8 = 0x72;
/// `FIFO_R_W` - FIFO data port
pub const FIFO_R_W: u8 = 0x74;

device_driver::create_device!(
    device_name: Mpu6xxx,
    dsl: {
        config {
            type RegisterAddressType = u8;
            type DefaultByteOrder = BE;
        }

        /// SMPLRT_DIV - Sample Rate Divider (0x19)
        /// Sample rate = 1 kHz / (1 + divider) while the DLPF is active
        register SmplrtDiv {
            const ADDRESS = 0x19;
            const SIZE_BITS = 8;

            /// Divider
            smplrt_div: uint = 0..8,
        },

        /// CONFIG - Digital low pass filter and FSYNC (0x1A)
        register LpfConfig {
            const ADDRESS = 0x1A;
            const SIZE_BITS = 8;

            /// DLPF bandwidth tier (1=188Hz ... 6=5Hz)
            dlpf_cfg: uint = 0..3,
            /// FSYNC sampling location
            ext_sync_set: uint = 3..6,
            reserved_7_6: uint = 6..8,
        },

        /// GYRO_CONFIG - Gyroscope Configuration (0x1B)
        register GyroConfig {
            const ADDRESS = 0x1B;
            const SIZE_BITS = 8;

            reserved_2_0: uint = 0..3,
            /// Full-scale select (0=250dps, 1=500dps, 2=1000dps, 3=2000dps)
            fs_sel: uint = 3..5,
            /// Z-axis self test
            zg_st: bool = 5,
            /// Y-axis self test
            yg_st: bool = 6,
            /// X-axis self test
            xg_st: bool = 7,
        },

        /// ACCEL_CONFIG - Accelerometer Configuration (0x1C)
        register AccelConfig {
            const ADDRESS = 0x1C;
            const SIZE_BITS = 8;

            /// Digital high pass filter (MPU6050 only)
            accel_hpf: uint = 0..3,
            /// Full-scale select (0=2g, 1=4g, 2=8g, 3=16g)
            afs_sel: uint = 3..5,
            /// Z-axis self test
            za_st: bool = 5,
            /// Y-axis self test
            ya_st: bool = 6,
            /// X-axis self test
            xa_st: bool = 7,
        },

        /// ACCEL_CONFIG_2 - Accelerometer Configuration 2 (0x1D, MPU6500 only)
        register AccelConfigTwo {
            const ADDRESS = 0x1D;
            const SIZE_BITS = 8;

            /// Accelerometer DLPF bandwidth
            a_dlpf_cfg: uint = 0..3,
            /// Bypass the accelerometer DLPF
            accel_fchoice_b: bool = 3,
            reserved_5_4: uint = 4..6,
            /// Shared DMP/FIFO memory split (1 = 1 kB FIFO)
            fifo_size: uint = 6..8,
        },

        /// LP_ACCEL_ODR - Low Power Accelerometer ODR (0x1E, MPU6500 only)
        register LpAccelOdr {
            const ADDRESS = 0x1E;
            const SIZE_BITS = 8;

            /// Wake-up frequency select
            lposc_clksel: uint = 0..4,
            reserved_7_4: uint = 4..8,
        },

        /// MOT_THR / WOM_THR - Motion detection threshold (0x1F)
        register MotThr {
            const ADDRESS = 0x1F;
            const SIZE_BITS = 8;

            /// Threshold (MPU6500: 4 mg/LSB)
            mot_thr: uint = 0..8,
        },

        /// FIFO_EN - FIFO Enable (0x23)
        /// Bit positions match the driver's sensor mask.
        register FifoEn {
            const ADDRESS = 0x23;
            const SIZE_BITS = 8;

            /// Auxiliary slave 0 data to FIFO
            slv_zero_fifo_en: bool = 0,
            /// Auxiliary slave 1 data to FIFO
            slv_one_fifo_en: bool = 1,
            /// Auxiliary slave 2 data to FIFO
            slv_two_fifo_en: bool = 2,
            /// Accelerometer X/Y/Z to FIFO
            accel_fifo_en: bool = 3,
            /// Gyroscope Z to FIFO
            zg_fifo_en: bool = 4,
            /// Gyroscope Y to FIFO
            yg_fifo_en: bool = 5,
            /// Gyroscope X to FIFO
            xg_fifo_en: bool = 6,
            /// Temperature to FIFO
            temp_fifo_en: bool = 7,
        },

        /// INT_PIN_CFG - Interrupt Pin / Bypass Enable Configuration (0x37)
        register IntPinCfg {
            const ADDRESS = 0x37;
            const SIZE_BITS = 8;

            reserved_0: uint = 0..1,
            /// Connect the auxiliary bus to the host bus
            bypass_en: bool = 1,
            /// FSYNC as interrupt input
            fsync_int_en: bool = 2,
            /// FSYNC active low
            fsync_int_level: bool = 3,
            /// Clear interrupt status on any read
            int_rd_clear: bool = 4,
            /// Hold the INT pin until cleared
            latch_int_en: bool = 5,
            /// INT pin open drain
            int_open: bool = 6,
            /// INT pin active low
            int_level: bool = 7,
        },

        /// INT_ENABLE - Interrupt Enable (0x38)
        register IntEnable {
            const ADDRESS = 0x38;
            const SIZE_BITS = 8;

            /// Data ready interrupt
            data_rdy_en: bool = 0,
            /// DMP interrupt
            dmp_int_en: bool = 1,
            reserved_2: uint = 2..3,
            /// Auxiliary I2C master interrupt
            i_two_c_mst_int_en: bool = 3,
            /// FIFO overflow interrupt
            fifo_oflow_en: bool = 4,
            reserved_5: uint = 5..6,
            /// Motion interrupt
            mot_en: bool = 6,
            reserved_7: uint = 7..8,
        },

        /// INT_STATUS - Interrupt Status (0x3A)
        register IntStatus {
            const ADDRESS = 0x3A;
            const SIZE_BITS = 8;

            /// Data ready
            data_rdy_int: bool = 0,
            /// DMP interrupt
            dmp_int: bool = 1,
            reserved_2: uint = 2..3,
            /// Auxiliary I2C master interrupt
            i_two_c_mst_int: bool = 3,
            /// FIFO overflowed
            fifo_oflow_int: bool = 4,
            reserved_5: uint = 5..6,
            /// Motion detected
            mot_int: bool = 6,
            reserved_7: uint = 7..8,
        },

        /// ACCEL_INTEL_CTRL - Wake-on-motion logic (0x69, MPU6500 only)
        register AccelIntelCtrl {
            const ADDRESS = 0x69;
            const SIZE_BITS = 8;

            reserved_5_0: uint = 0..6,
            /// Compare against the previous sample
            accel_intel_mode: bool = 6,
            /// Enable wake-on-motion logic
            accel_intel_en: bool = 7,
        },

        /// USER_CTRL - User Control (0x6A)
        register UserCtrl {
            const ADDRESS = 0x6A;
            const SIZE_BITS = 8;

            /// Reset signal paths
            sig_cond_rst: bool = 0,
            /// Reset the auxiliary I2C master
            i_two_c_mst_rst: bool = 1,
            /// Reset the FIFO
            fifo_rst: bool = 2,
            /// Reset the DMP
            dmp_rst: bool = 3,
            /// Disable the primary I2C interface (SPI only)
            i_two_c_if_dis: bool = 4,
            /// Auxiliary I2C master enable
            aux_if_en: bool = 5,
            /// FIFO enable
            fifo_en: bool = 6,
            /// DMP enable
            dmp_en: bool = 7,
        },

        /// PWR_MGMT_1 - Power Management 1 (0x6B)
        register PwrMgmt1 {
            const ADDRESS = 0x6B;
            const SIZE_BITS = 8;

            /// Clock source (0=internal, 1=gyro PLL)
            clksel: uint = 0..3,
            /// Temperature sensor disable
            temp_dis: bool = 3,
            /// Gyro standby (MPU6500 only)
            gyro_standby: bool = 4,
            /// Low-power accel cycle
            cycle: bool = 5,
            /// Sleep mode
            sleep: bool = 6,
            /// Device reset
            device_reset: bool = 7,
        },

        /// PWR_MGMT_2 - Power Management 2 (0x6C)
        register PwrMgmt2 {
            const ADDRESS = 0x6C;
            const SIZE_BITS = 8;

            /// Gyroscope Z standby
            stby_zg: bool = 0,
            /// Gyroscope Y standby
            stby_yg: bool = 1,
            /// Gyroscope X standby
            stby_xg: bool = 2,
            /// Accelerometer Z standby
            stby_za: bool = 3,
            /// Accelerometer Y standby
            stby_ya: bool = 4,
            /// Accelerometer X standby
            stby_xa: bool = 5,
            /// Low-power accel wake frequency (MPU6050 only)
            lp_wake_ctrl: uint = 6..8,
        },

        /// WHO_AM_I - Device identity (0x75)
        register WhoAmI {
            const ADDRESS = 0x75;
            const SIZE_BITS = 8;

            /// 0x68 on MPU6050, 0x70 on MPU6500
            who_am_i: uint = 0..8,
        }
    }
);
