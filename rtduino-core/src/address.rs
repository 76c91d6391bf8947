//! 7-bit I2C addresses

use core::fmt;

use crate::error::ConfigError;

/// A validated 7-bit I2C slave address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address(u8);

impl Address {
    /// Highest 7-bit address
    pub const MAX: u8 = 0x7F;

    /// Validate `raw` as a 7-bit address
    pub const fn new(raw: u8) -> Result<Self, ConfigError> {
        if raw > Self::MAX {
            Err(ConfigError::InvalidAddress(raw))
        } else {
            Ok(Self(raw))
        }
    }

    /// The raw address
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Address {
    type Error = ConfigError;

    fn try_from(raw: u8) -> Result<Self, ConfigError> {
        Self::new(raw)
    }
}

impl From<Address> for u8 {
    fn from(address: Address) -> u8 {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
