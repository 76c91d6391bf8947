//! Error types
//!
//! Transport failures are propagated with the bus driver's own error
//! rather than collapsed into a boolean.

use core::fmt;

/// Error from an [`I2cDevice`](crate::device::I2cDevice) operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError<E> {
    /// The configured bus name is not registered
    BusNotFound,
    /// Address probe was not acknowledged
    NotDetected,
    /// Operation on a device that has not been begun (or was ended)
    NotOpen,
    /// Transfer exceeds the device's maximum buffer size
    BufferTooLarge,
    /// Capability not supported by this platform
    Unsupported,
    /// Error reported by the bus driver
    Bus(E),
}

impl<E> DeviceError<E> {
    /// The bus driver error, if this is a transport failure
    pub fn bus_error(&self) -> Option<&E> {
        match self {
            DeviceError::Bus(e) => Some(e),
            _ => None,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for DeviceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::BusNotFound => f.write_str("i2c bus not found"),
            DeviceError::NotDetected => f.write_str("device did not acknowledge its address"),
            DeviceError::NotOpen => f.write_str("device not open"),
            DeviceError::BufferTooLarge => f.write_str("transfer exceeds max buffer size"),
            DeviceError::Unsupported => f.write_str("operation not supported"),
            DeviceError::Bus(e) => write!(f, "bus error: {:?}", e),
        }
    }
}

/// Invalid device or console configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Address does not fit in 7 bits
    InvalidAddress(u8),
    /// Bus name longer than [`MAX_BUS_NAME_LEN`](crate::device::MAX_BUS_NAME_LEN)
    BusNameTooLong,
    /// Device label longer than [`MAX_LABEL_LEN`](crate::config::MAX_LABEL_LEN)
    LabelTooLong,
    /// Unrecognized serial frame format
    InvalidFormat,
    /// Configuration text could not be parsed
    Parse,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidAddress(a) => write!(f, "invalid 7-bit address {:#04x}", a),
            ConfigError::BusNameTooLong => f.write_str("bus name too long"),
            ConfigError::LabelTooLong => f.write_str("device label too long"),
            ConfigError::InvalidFormat => f.write_str("invalid serial format"),
            ConfigError::Parse => f.write_str("configuration parse error"),
        }
    }
}
