//! Shim configuration
//!
//! Board wiring (which bus each device sits on, console framing) kept out
//! of driver code. With the `config` feature the structure loads from
//! TOML:
//!
//! ```toml
//! [console]
//! baudrate = 115200
//! format = "8N1"
//!
//! [[i2c]]
//! name = "mpu6050"
//! bus = "i2c4"
//! address = 0x68
//! detect = true
//! ```

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rtduino_hal::{ConsoleSink, SerialConfig};

use crate::address::Address;
use crate::device::{BusName, I2cDevice};
#[cfg(feature = "serde")]
use crate::device::DEFAULT_I2C_BUS;
use crate::error::ConfigError;
use crate::serial::ConsoleSerial;

/// Maximum I2C devices per config
pub const MAX_DEVICES: usize = 8;

/// Maximum device label length
pub const MAX_LABEL_LEN: usize = 16;

/// Console baud rate when none is given
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShimConfig {
    /// Console serial settings
    #[cfg_attr(feature = "serde", serde(default))]
    pub console: ConsoleConfig,
    /// I2C devices (`[[i2c]]` tables)
    #[cfg_attr(feature = "serde", serde(default, rename = "i2c"))]
    pub devices: Vec<DeviceConfig, MAX_DEVICES>,
}

impl ShimConfig {
    /// Parse a TOML document
    #[cfg(feature = "config")]
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|_e| {
            warn!("config parse error");
            ConfigError::Parse
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every entry without building anything
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.console.serial_config()?;
        for device in &self.devices {
            Address::new(device.address)?;
        }
        Ok(())
    }

    /// Look up a device by label
    pub fn device(&self, name: &str) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.name == name)
    }
}

/// Console serial settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConsoleConfig {
    /// Baud rate in bits per second
    #[cfg_attr(feature = "serde", serde(default = "default_baudrate"))]
    pub baudrate: u32,
    /// Frame format in `8N1` notation
    #[cfg_attr(feature = "serde", serde(default = "default_format"))]
    pub format: String<4>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
            format: String::try_from("8N1").unwrap_or_default(),
        }
    }
}

impl ConsoleConfig {
    /// Decode the frame format
    pub fn serial_config(&self) -> Result<SerialConfig, ConfigError> {
        SerialConfig::parse(&self.format).ok_or(ConfigError::InvalidFormat)
    }

    /// Start `serial` with these settings
    pub fn apply<S: ConsoleSink>(&self, serial: &mut ConsoleSerial<S>) -> Result<(), ConfigError> {
        let config = self.serial_config()?;
        serial.begin_with_config(self.baudrate, config);
        Ok(())
    }
}

/// One I2C device
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// Label used to look the device up
    pub name: String<MAX_LABEL_LEN>,
    /// Bus the device is wired to
    #[cfg_attr(feature = "serde", serde(default = "default_bus"))]
    pub bus: BusName,
    /// 7-bit address
    pub address: u8,
    /// Probe the address on `begin`
    #[cfg_attr(feature = "serde", serde(default))]
    pub detect: bool,
    /// Per-transfer byte limit
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_buffer_size: Option<usize>,
}

impl DeviceConfig {
    /// Create a config with probing off and no buffer limit
    pub fn new(name: &str, bus: &str, address: u8) -> Result<Self, ConfigError> {
        Ok(Self {
            name: String::try_from(name).map_err(|_| ConfigError::LabelTooLong)?,
            bus: BusName::try_from(bus).map_err(|_| ConfigError::BusNameTooLong)?,
            address,
            detect: false,
            max_buffer_size: None,
        })
    }
}

impl<B> I2cDevice<B> {
    /// Build a closed device from its configuration
    ///
    /// `detect` takes effect through
    /// [`begin_configured`](I2cDevice::begin_configured).
    pub fn from_config(config: &DeviceConfig) -> Result<Self, ConfigError> {
        let device =
            Self::new(Address::new(config.address)?, &config.bus)?.with_detect(config.detect);
        Ok(match config.max_buffer_size {
            Some(max) => device.with_max_buffer_size(max),
            None => device,
        })
    }
}

#[cfg(feature = "serde")]
fn default_baudrate() -> u32 {
    DEFAULT_BAUDRATE
}

#[cfg(feature = "serde")]
fn default_format() -> String<4> {
    ConsoleConfig::default().format
}

#[cfg(feature = "serde")]
fn default_bus() -> BusName {
    BusName::try_from(DEFAULT_I2C_BUS).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    use rtduino_hal::console::{DataBits, Parity};
    use rtduino_hal::{Framing, I2cMaster, StaticRegistry};

    #[derive(Debug)]
    struct Nack;

    impl embedded_hal::i2c::Error for Nack {
        fn kind(&self) -> ErrorKind {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        }
    }

    /// Acknowledges zero-length writes and records the addressed slave
    #[derive(Clone, Copy)]
    struct ProbeLog<'a>(&'a RefCell<heapless::Vec<u8, 4>>);

    impl I2cMaster for ProbeLog<'_> {
        type Error = Nack;

        fn send(&mut self, address: u8, framing: Framing, data: &[u8]) -> Result<(), Nack> {
            if framing != Framing::NORMAL || !data.is_empty() {
                return Err(Nack);
            }
            self.0.borrow_mut().push(address).map_err(|_| Nack)
        }

        fn recv(&mut self, _address: u8, _framing: Framing, _buf: &mut [u8]) -> Result<(), Nack> {
            Err(Nack)
        }
    }

    #[test]
    fn test_console_defaults() {
        let console = ConsoleConfig::default();
        assert_eq!(console.baudrate, 115_200);
        assert_eq!(console.serial_config(), Ok(SerialConfig::SERIAL_8N1));
    }

    #[test]
    fn test_console_apply() {
        let mut serial = ConsoleSerial::new(heapless::Vec::<u8, 8>::new());
        let mut console = ConsoleConfig::default();
        assert!(console.apply(&mut serial).is_ok());

        console.format = String::try_from("8Z1").unwrap();
        assert_eq!(console.apply(&mut serial), Err(ConfigError::InvalidFormat));
        assert!(serial.sink().is_empty());
    }

    #[test]
    fn test_device_from_config() {
        let mut config = DeviceConfig::new("mpu6050", "i2c1", 0x68).unwrap();
        config.max_buffer_size = Some(32);

        let device: I2cDevice<()> = I2cDevice::from_config(&config).unwrap();
        assert_eq!(device.address(), 0x68);
        assert_eq!(device.bus_name(), "i2c1");
        assert_eq!(device.max_buffer_size(), 32);
        assert!(!device.detect());
        assert!(!device.is_open());
    }

    #[test]
    fn test_device_from_config_detect_probes_on_begin() {
        let bus = core::cell::RefCell::new(heapless::Vec::<u8, 4>::new());
        let mut registry: StaticRegistry<ProbeLog<'_>, 1> = StaticRegistry::new();
        assert!(registry.register("i2c1", ProbeLog(&bus)).is_ok());

        let mut config = DeviceConfig::new("bme280", "i2c1", 0x76).unwrap();
        config.detect = true;
        let mut device = I2cDevice::from_config(&config).unwrap();
        assert!(device.detect());

        device.begin_configured(&registry).unwrap();
        assert!(device.is_open());
        assert_eq!(bus.borrow().as_slice(), &[0x76]);
    }

    #[test]
    fn test_device_from_config_rejects_wide_address() {
        let config = DeviceConfig::new("bad", "i2c1", 0x90).unwrap();
        let result = I2cDevice::<()>::from_config(&config);
        assert!(matches!(result, Err(ConfigError::InvalidAddress(0x90))));
    }

    #[test]
    fn test_validate_and_lookup() {
        let mut config = ShimConfig::default();
        config
            .devices
            .push(DeviceConfig::new("bme280", "i2c1", 0x76).unwrap())
            .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.device("bme280").map(|d| d.address), Some(0x76));
        assert!(config.device("mpu6050").is_none());

        config.console.format = String::try_from("7E1").unwrap();
        let serial = config.console.serial_config().unwrap();
        assert_eq!(serial.data_bits, DataBits::Seven);
        assert_eq!(serial.parity, Parity::Even);
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_from_toml() {
        let input = r#"
            [console]
            baudrate = 9600
            format = "8E1"

            [[i2c]]
            name = "mpu6050"
            address = 0x68
            detect = true

            [[i2c]]
            name = "oled"
            bus = "i2c1"
            address = 0x3C
            max_buffer_size = 32
        "#;

        let config = ShimConfig::from_toml(input).unwrap();
        assert_eq!(config.console.baudrate, 9600);
        assert_eq!(config.console.serial_config(), Ok(SerialConfig::SERIAL_8E1));
        assert_eq!(config.devices.len(), 2);

        let imu = config.device("mpu6050").unwrap();
        assert_eq!(imu.bus.as_str(), DEFAULT_I2C_BUS);
        assert_eq!(imu.address, 0x68);
        assert!(imu.detect);
        assert_eq!(imu.max_buffer_size, None);

        let oled = config.device("oled").unwrap();
        assert_eq!(oled.bus.as_str(), "i2c1");
        assert_eq!(oled.max_buffer_size, Some(32));
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_from_toml_defaults_and_errors() {
        let config = ShimConfig::from_toml("").unwrap();
        assert_eq!(config, ShimConfig::default());

        let wide = "[[i2c]]\nname = \"x\"\naddress = 0x80\n";
        assert_eq!(
            ShimConfig::from_toml(wide),
            Err(ConfigError::InvalidAddress(0x80))
        );

        assert_eq!(ShimConfig::from_toml("[[i2c]]\nname = 3"), Err(ConfigError::Parse));
        assert_eq!(
            ShimConfig::from_toml("[console]\nformat = \"9Q9\""),
            Err(ConfigError::InvalidFormat)
        );
    }
}
