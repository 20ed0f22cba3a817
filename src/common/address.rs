// src/common/address.rs

use super::error::{ErrorContext, SensorError};
use super::types::SensorKind;
use core::fmt;

/// A 7-bit I²C device address outside the reserved ranges.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct I2cAddr(u8);

impl I2cAddr {
    /// STC31-C fixed address.
    pub const STC31C: I2cAddr = I2cAddr(0x29);
    /// SHTC3 default address (SHT4x command set).
    pub const SHTC3: I2cAddr = I2cAddr(0x44);

    /// Creates a new `I2cAddr` for `sensor` if `address` is a usable 7-bit
    /// address (0x08..=0x77).
    pub fn new(sensor: SensorKind, address: u8) -> Result<Self, SensorError> {
        if Self::is_valid(address) {
            Ok(I2cAddr(address))
        } else {
            Err(SensorError::Argument {
                argument: "address",
                context: ErrorContext::new(sensor, "i2c_address")
                    .with_detail("address", address),
            })
        }
    }

    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_valid(address: u8) -> bool {
        matches!(address, 0x08..=0x77)
    }
}

impl From<I2cAddr> for u8 {
    fn from(value: I2cAddr) -> Self {
        value.0
    }
}

impl fmt::Display for I2cAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
