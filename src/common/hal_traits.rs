// src/common/hal_traits.rs

//! The transport driver interface.
//!
//! Each trait mirrors one Sensirion driver family: one method per logical
//! command, blocking, no retries. A method returns `Err(status)` with the raw
//! nonzero driver code when the command fails; the capability machines turn
//! that into a [`SensorError`](crate::SensorError) with context.

use super::record::{ParticulateMeasurement, VersionInfo};

/// Raw driver status code. `0` is success and never appears in an `Err`.
pub type Status = i16;

/// Result of a single driver command.
pub type DriverResult<T> = Result<T, Status>;

/// Status returned by `sps30_read_measurement` when no new measurement has
/// been buffered yet.
pub const SPS30_ERR_NOT_ENOUGH_DATA: Status = -1;

/// Size of the buffer `sps30_get_serial` writes its NUL-terminated ASCII into.
pub const SPS30_MAX_SERIAL_LEN: usize = 32;

/// STC3x driver (STC31-C CO₂ sensor over I²C).
pub trait Stc3xDriver {
    /// Bring up the I²C HAL (`sensirion_i2c_hal_init`).
    fn i2c_hal_init(&mut self) -> DriverResult<()>;

    /// Bind the driver to the sensor address (`stc3x_init`).
    fn init(&mut self, address: u8) -> DriverResult<()>;

    fn set_binary_gas(&mut self, gas: u16) -> DriverResult<()>;

    /// Relative humidity compensation in %RH.
    fn set_relative_humidity(&mut self, humidity: f32) -> DriverResult<()>;

    /// Temperature compensation in °C.
    fn set_temperature(&mut self, temperature: f32) -> DriverResult<()>;

    /// Returns `(gas concentration in vol%, sensor temperature in °C)`.
    fn measure_gas_concentration(&mut self) -> DriverResult<(f32, f32)>;

    /// Returns `(product id, 64-bit serial number)`.
    fn get_product_id(&mut self) -> DriverResult<(u32, u64)>;

    /// Reference concentration in vol%.
    fn forced_recalibration(&mut self, reference_concentration: u16) -> DriverResult<()>;

    fn enable_automatic_self_calibration(&mut self) -> DriverResult<()>;

    fn disable_automatic_self_calibration(&mut self) -> DriverResult<()>;

    fn enter_sleep_mode(&mut self) -> DriverResult<()>;

    fn exit_sleep_mode(&mut self) -> DriverResult<()>;
}

/// SHT4x driver (used for the SHTC3 temperature/humidity sensor over I²C).
///
/// Measurement commands return `(temperature in °C, relative humidity in %RH)`.
pub trait Sht4xDriver {
    fn init(&mut self, address: u8) -> DriverResult<()>;

    fn measure_high_precision(&mut self) -> DriverResult<(f32, f32)>;

    fn measure_medium_precision(&mut self) -> DriverResult<(f32, f32)>;

    fn measure_lowest_precision(&mut self) -> DriverResult<(f32, f32)>;

    fn serial_number(&mut self) -> DriverResult<u32>;

    fn soft_reset(&mut self) -> DriverResult<()>;
}

/// SPS30 driver over UART (SHDLC framing lives below this trait).
pub trait Sps30Driver {
    fn uart_open(&mut self) -> DriverResult<()>;

    fn uart_close(&mut self) -> DriverResult<()>;

    fn probe(&mut self) -> DriverResult<()>;

    fn read_version(&mut self) -> DriverResult<VersionInfo>;

    /// NUL-terminated ASCII serial number.
    fn get_serial(&mut self) -> DriverResult<[u8; SPS30_MAX_SERIAL_LEN]>;

    fn set_fan_auto_cleaning_interval_days(&mut self, days: u8) -> DriverResult<()>;

    fn get_fan_auto_cleaning_interval_days(&mut self) -> DriverResult<u8>;

    fn start_measurement(&mut self) -> DriverResult<()>;

    fn stop_measurement(&mut self) -> DriverResult<()>;

    /// May fail with [`SPS30_ERR_NOT_ENOUGH_DATA`] shortly after start.
    fn read_measurement(&mut self) -> DriverResult<ParticulateMeasurement>;

    fn start_manual_fan_cleaning(&mut self) -> DriverResult<()>;

    fn sleep(&mut self) -> DriverResult<()>;

    fn wake_up(&mut self) -> DriverResult<()>;

    fn reset(&mut self) -> DriverResult<()>;
}

/// Blocking delay backed by `std::thread::sleep`.
#[cfg(feature = "std")]
#[derive(Debug, Copy, Clone, Default)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(ns.into()));
    }
}
