// src/test_support.rs

// Mock drivers shared by the unit tests. Every driver call and every delay is
// appended to one shared `Bus` log so tests can assert on command order across
// sensors.

use crate::common::hal_traits::{
    DriverResult, Sht4xDriver, Sps30Driver, Status, Stc3xDriver, SPS30_MAX_SERIAL_LEN,
};
use crate::common::record::{ParticulateMeasurement, VersionInfo};
use crate::coordinator::TransportProvider;
use embedded_hal::delay::DelayNs;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

// --- Shared call log ---
#[derive(Clone, Default, Debug)]
pub struct Bus(Rc<RefCell<Vec<String>>>);

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|c| c.as_str() == entry).count()
    }

    pub fn has(&self, entry: &str) -> bool {
        self.count(entry) > 0
    }

    /// Position of the first matching entry.
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.borrow().iter().position(|c| c.as_str() == entry)
    }

    /// Calls whose name starts with `prefix` (e.g. `"sps30."`).
    pub fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }
}

// --- Mock delay ---
#[derive(Clone, Default, Debug)]
pub struct MockDelay {
    bus: Bus,
    total_ns: Rc<Cell<u64>>,
}

impl MockDelay {
    pub fn new(bus: &Bus) -> Self {
        MockDelay {
            bus: bus.clone(),
            total_ns: Rc::new(Cell::new(0)),
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns.get() / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + u64::from(ns));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.bus.record(std::format!("delay.{}ms", ms));
        self.total_ns.set(self.total_ns.get() + u64::from(ms) * 1_000_000);
    }
}

// --- Failure injection ---
#[derive(Clone, Default, Debug)]
struct Failures(BTreeMap<&'static str, Status>);

impl Failures {
    fn check(&self, op: &'static str) -> DriverResult<()> {
        match self.0.get(op) {
            Some(&status) => Err(status),
            None => Ok(()),
        }
    }
}

// --- STC3x ---
#[derive(Debug)]
pub struct MockStc3x {
    bus: Bus,
    failures: Failures,
    pub gas_vol_percent: f32,
    pub sensor_temperature: f32,
    pub product_id: u32,
    pub serial: u64,
    pub address: Option<u8>,
    pub binary_gas: Option<u16>,
    pub humidity_written: Option<f32>,
    pub temperature_written: Option<f32>,
    pub frc_reference: Option<u16>,
}

impl MockStc3x {
    pub fn new(bus: &Bus) -> Self {
        MockStc3x {
            bus: bus.clone(),
            failures: Failures::default(),
            gas_vol_percent: 0.1,
            sensor_temperature: 25.0,
            product_id: 0x0801_0301,
            serial: 0x00AB_CDEF_0123_4567,
            address: None,
            binary_gas: None,
            humidity_written: None,
            temperature_written: None,
            frc_reference: None,
        }
    }

    pub fn failing(mut self, op: &'static str, status: Status) -> Self {
        self.failures.0.insert(op, status);
        self
    }

    fn call(&mut self, op: &'static str) -> DriverResult<()> {
        self.bus.record(std::format!("stc3x.{}", op));
        self.failures.check(op)
    }
}

impl Stc3xDriver for MockStc3x {
    fn i2c_hal_init(&mut self) -> DriverResult<()> {
        self.call("i2c_hal_init")
    }

    fn init(&mut self, address: u8) -> DriverResult<()> {
        self.call("init")?;
        self.address = Some(address);
        Ok(())
    }

    fn set_binary_gas(&mut self, gas: u16) -> DriverResult<()> {
        self.call("set_binary_gas")?;
        self.binary_gas = Some(gas);
        Ok(())
    }

    fn set_relative_humidity(&mut self, humidity: f32) -> DriverResult<()> {
        self.call("set_relative_humidity")?;
        self.humidity_written = Some(humidity);
        Ok(())
    }

    fn set_temperature(&mut self, temperature: f32) -> DriverResult<()> {
        self.call("set_temperature")?;
        self.temperature_written = Some(temperature);
        Ok(())
    }

    fn measure_gas_concentration(&mut self) -> DriverResult<(f32, f32)> {
        self.call("measure_gas_concentration")?;
        Ok((self.gas_vol_percent, self.sensor_temperature))
    }

    fn get_product_id(&mut self) -> DriverResult<(u32, u64)> {
        self.call("get_product_id")?;
        Ok((self.product_id, self.serial))
    }

    fn forced_recalibration(&mut self, reference_concentration: u16) -> DriverResult<()> {
        self.call("forced_recalibration")?;
        self.frc_reference = Some(reference_concentration);
        Ok(())
    }

    fn enable_automatic_self_calibration(&mut self) -> DriverResult<()> {
        self.call("enable_automatic_self_calibration")
    }

    fn disable_automatic_self_calibration(&mut self) -> DriverResult<()> {
        self.call("disable_automatic_self_calibration")
    }

    fn enter_sleep_mode(&mut self) -> DriverResult<()> {
        self.call("enter_sleep_mode")
    }

    fn exit_sleep_mode(&mut self) -> DriverResult<()> {
        self.call("exit_sleep_mode")
    }
}

// --- SHT4x ---
#[derive(Debug)]
pub struct MockSht4x {
    bus: Bus,
    failures: Failures,
    pub temperature: f32,
    pub humidity: f32,
    pub serial: u32,
    pub address: Option<u8>,
}

impl MockSht4x {
    pub fn new(bus: &Bus) -> Self {
        MockSht4x {
            bus: bus.clone(),
            failures: Failures::default(),
            temperature: 25.0,
            humidity: 50.0,
            serial: 0x1234_5678,
            address: None,
        }
    }

    pub fn failing(mut self, op: &'static str, status: Status) -> Self {
        self.failures.0.insert(op, status);
        self
    }

    fn call(&mut self, op: &'static str) -> DriverResult<()> {
        self.bus.record(std::format!("sht4x.{}", op));
        self.failures.check(op)
    }

    fn measure(&mut self, op: &'static str) -> DriverResult<(f32, f32)> {
        self.call(op)?;
        Ok((self.temperature, self.humidity))
    }
}

impl Sht4xDriver for MockSht4x {
    fn init(&mut self, address: u8) -> DriverResult<()> {
        self.call("init")?;
        self.address = Some(address);
        Ok(())
    }

    fn measure_high_precision(&mut self) -> DriverResult<(f32, f32)> {
        self.measure("measure_high_precision")
    }

    fn measure_medium_precision(&mut self) -> DriverResult<(f32, f32)> {
        self.measure("measure_medium_precision")
    }

    fn measure_lowest_precision(&mut self) -> DriverResult<(f32, f32)> {
        self.measure("measure_lowest_precision")
    }

    fn serial_number(&mut self) -> DriverResult<u32> {
        self.call("serial_number")?;
        Ok(self.serial)
    }

    fn soft_reset(&mut self) -> DriverResult<()> {
        self.call("soft_reset")
    }
}

// --- SPS30 ---
#[derive(Debug)]
pub struct MockSps30 {
    bus: Bus,
    failures: Failures,
    pub version: VersionInfo,
    pub serial: [u8; SPS30_MAX_SERIAL_LEN],
    pub measurement: ParticulateMeasurement,
    pub auto_clean_days: Option<u8>,
}

impl MockSps30 {
    pub fn new(bus: &Bus) -> Self {
        let mut serial = [0u8; SPS30_MAX_SERIAL_LEN];
        serial[..16].copy_from_slice(b"A1B2C3D4E5F6A7B8");
        MockSps30 {
            bus: bus.clone(),
            failures: Failures::default(),
            version: VersionInfo {
                firmware_major: 2,
                firmware_minor: 2,
                hardware_revision: 7,
                shdlc_major: 2,
                shdlc_minor: 0,
            },
            serial,
            measurement: sample_particulate(),
            auto_clean_days: None,
        }
    }

    pub fn with_firmware_major(mut self, major: u8) -> Self {
        self.version.firmware_major = major;
        self
    }

    pub fn failing(mut self, op: &'static str, status: Status) -> Self {
        self.failures.0.insert(op, status);
        self
    }

    pub fn clear_failure(&mut self, op: &'static str) {
        self.failures.0.remove(op);
    }

    fn call(&mut self, op: &'static str) -> DriverResult<()> {
        self.bus.record(std::format!("sps30.{}", op));
        self.failures.check(op)
    }
}

/// Particulate values used by the SPS30 mock.
pub fn sample_particulate() -> ParticulateMeasurement {
    ParticulateMeasurement {
        mc_1p0: 10.0,
        mc_2p5: 25.0,
        mc_4p0: 40.0,
        mc_10p0: 100.0,
        nc_0p5: 5.0,
        nc_1p0: 10.0,
        nc_2p5: 25.0,
        nc_4p0: 40.0,
        nc_10p0: 100.0,
        typical_particle_size: 2.5,
    }
}

impl Sps30Driver for MockSps30 {
    fn uart_open(&mut self) -> DriverResult<()> {
        self.call("uart_open")
    }

    fn uart_close(&mut self) -> DriverResult<()> {
        self.call("uart_close")
    }

    fn probe(&mut self) -> DriverResult<()> {
        self.call("probe")
    }

    fn read_version(&mut self) -> DriverResult<VersionInfo> {
        self.call("read_version")?;
        Ok(self.version)
    }

    fn get_serial(&mut self) -> DriverResult<[u8; SPS30_MAX_SERIAL_LEN]> {
        self.call("get_serial")?;
        Ok(self.serial)
    }

    fn set_fan_auto_cleaning_interval_days(&mut self, days: u8) -> DriverResult<()> {
        self.call("set_fan_auto_cleaning_interval_days")?;
        self.auto_clean_days = Some(days);
        Ok(())
    }

    fn get_fan_auto_cleaning_interval_days(&mut self) -> DriverResult<u8> {
        self.call("get_fan_auto_cleaning_interval_days")?;
        Ok(self.auto_clean_days.unwrap_or(4))
    }

    fn start_measurement(&mut self) -> DriverResult<()> {
        self.call("start_measurement")
    }

    fn stop_measurement(&mut self) -> DriverResult<()> {
        self.call("stop_measurement")
    }

    fn read_measurement(&mut self) -> DriverResult<ParticulateMeasurement> {
        self.call("read_measurement")?;
        Ok(self.measurement)
    }

    fn start_manual_fan_cleaning(&mut self) -> DriverResult<()> {
        self.call("start_manual_fan_cleaning")
    }

    fn sleep(&mut self) -> DriverResult<()> {
        self.call("sleep")
    }

    fn wake_up(&mut self) -> DriverResult<()> {
        self.call("wake_up")
    }

    fn reset(&mut self) -> DriverResult<()> {
        self.call("reset")
    }
}

// --- Transport provider ---
/// Hands out pre-configured mocks, or default ones sharing `bus`.
pub struct MockTransports {
    bus: Bus,
    pub co2: Option<MockStc3x>,
    pub temp_humidity: Option<MockSht4x>,
    pub particulate: Option<MockSps30>,
}

impl MockTransports {
    pub fn new(bus: &Bus) -> Self {
        MockTransports {
            bus: bus.clone(),
            co2: None,
            temp_humidity: None,
            particulate: None,
        }
    }

    pub fn with_co2(mut self, driver: MockStc3x) -> Self {
        self.co2 = Some(driver);
        self
    }

    pub fn with_temp_humidity(mut self, driver: MockSht4x) -> Self {
        self.temp_humidity = Some(driver);
        self
    }

    pub fn with_particulate(mut self, driver: MockSps30) -> Self {
        self.particulate = Some(driver);
        self
    }
}

impl TransportProvider for MockTransports {
    type Co2 = MockStc3x;
    type TempHumidity = MockSht4x;
    type Particulate = MockSps30;

    fn co2_driver(&mut self) -> MockStc3x {
        self.bus.record("provider.co2");
        self.co2.take().unwrap_or_else(|| MockStc3x::new(&self.bus))
    }

    fn temp_humidity_driver(&mut self) -> MockSht4x {
        self.bus.record("provider.temp_humidity");
        self.temp_humidity
            .take()
            .unwrap_or_else(|| MockSht4x::new(&self.bus))
    }

    fn particulate_driver(&mut self) -> MockSps30 {
        self.bus.record("provider.particulate");
        self.particulate
            .take()
            .unwrap_or_else(|| MockSps30::new(&self.bus))
    }
}
