//! Arduino-style serial and I2C device primitives
//!
//! This crate provides the pieces Arduino sensor libraries expect, built
//! on the driver-model traits in `rtduino-hal`:
//!
//! - [`serial::ConsoleSerial`] - `Serial` on the system console
//! - [`device::I2cDevice`] - BusIO-style I2C device: prefixed writes,
//!   reads and write-then-read composed from framed bus segments
//! - [`shared::SharedBus`] - mutex-guarded bus handle for devices that
//!   share one physical bus
//! - [`config`] - board wiring, loadable from TOML with the `config`
//!   feature
//!
//! # Example
//!
//! ```ignore
//! let mut imu = I2cDevice::new(Address::new(0x68)?, "i2c1")?;
//! imu.begin(&registry, true)?;
//! imu.write_register(0x6B, &[0x00])?;
//!
//! let mut accel = [0u8; 6];
//! imu.read_register(0x3B, &mut accel)?;
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod address;
pub mod config;
pub mod device;
pub mod error;
pub mod serial;
pub mod shared;

pub use address::Address;
pub use config::{ConsoleConfig, DeviceConfig, ShimConfig};
pub use device::{I2cDevice, DEFAULT_I2C_BUS};
pub use error::{ConfigError, DeviceError};
pub use serial::{ConsoleError, ConsoleSerial};
pub use shared::SharedBus;

#[cfg(feature = "std")]
pub use serial::StdoutSink;
