//! rtduino Hardware Abstraction Layer
//!
//! This crate defines the driver-model traits the rtduino shim is layered
//! on. An RTOS port (or a host-side mock) implements them; `rtduino-core`
//! builds the Arduino-style `ConsoleSerial` and `I2cDevice` on top.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Sensor drivers (MPU6050, BME280, ...)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  rtduino-core (ConsoleSerial, I2cDevice)│
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  rtduino-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  RTOS driver  │       │ embedded-hal  │
//! │     port      │       │  I2c adapter  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cMaster`] - Framed I2C master send/receive
//! - [`registry::BusRegistry`] - Bus lookup by name
//! - [`console::ConsoleSink`] - Console device output

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod console;
pub mod eh;
pub mod i2c;
pub mod registry;

// Re-export key traits at crate root for convenience
pub use console::{ConsoleSink, SerialConfig};
pub use eh::{AdapterError, EmbeddedHalBus};
pub use i2c::{Direction, Framing, I2cMaster, Segment};
pub use registry::{BusRegistry, StaticRegistry};
