//! I2C device transactions
//!
//! [`I2cDevice`] binds a 7-bit address to a named bus and composes the
//! bus's framed send/receive into the operations sensor drivers use:
//!
//! - `write` with an optional prefix (typically a register pointer). The
//!   prefix goes out with STOP suppressed and the payload follows with
//!   START suppressed, so the slave sees one transaction even though the
//!   driver is handed two buffers.
//! - `read`, optionally leaving the bus held.
//! - `write_then_read`, the register-read pattern.
//!
//! Multi-segment operations go to the bus as a single
//! [`I2cMaster::transfer`] call; a [`SharedBus`](crate::shared::SharedBus)
//! holds its lock across the whole call.
//!
//! # State
//!
//! ```text
//!   ┌────────┐   begin()   ┌──────┐
//!   │ Closed │ ──────────► │ Open │
//!   │        │ ◄────────── │      │
//!   └────────┘    end()    └──────┘
//! ```
//!
//! Every transfer on a closed device fails with [`DeviceError::NotOpen`].

use embedded_hal::i2c::{Error as _, ErrorKind};
use heapless::String;

use rtduino_hal::{BusRegistry, Framing, I2cMaster, Segment};

use crate::address::Address;
use crate::error::{ConfigError, DeviceError};

/// Bus used by boards that wire their sensor header to the fourth I2C
/// controller. Never applied implicitly; pass it to [`I2cDevice::new`].
pub const DEFAULT_I2C_BUS: &str = "i2c4";

/// Maximum bus name length
pub const MAX_BUS_NAME_LEN: usize = 16;

/// Bus identifier as stored by a device
pub type BusName = String<MAX_BUS_NAME_LEN>;

/// An I2C slave on a named bus
#[derive(Debug)]
pub struct I2cDevice<B> {
    /// Address given at construction, restored by `begin`
    configured: Address,
    /// Address in use; cleared by `end`
    address: u8,
    bus_name: BusName,
    /// Resolved bus handle; `Some` exactly while open
    bus: Option<B>,
    max_buffer_size: usize,
    /// Probe on [`begin_configured`](I2cDevice::begin_configured)
    detect: bool,
}

impl<B> I2cDevice<B> {
    /// Create a closed device at `address` on the bus named `bus_name`
    pub fn new(address: Address, bus_name: &str) -> Result<Self, ConfigError> {
        let bus_name = BusName::try_from(bus_name).map_err(|_| ConfigError::BusNameTooLong)?;

        Ok(Self {
            configured: address,
            address: address.get(),
            bus_name,
            bus: None,
            max_buffer_size: usize::MAX,
            detect: false,
        })
    }

    /// Limit the bytes moved by a single write or read
    pub fn with_max_buffer_size(mut self, max: usize) -> Self {
        self.max_buffer_size = max;
        self
    }

    /// Probe the address when opened with
    /// [`begin_configured`](I2cDevice::begin_configured)
    pub fn with_detect(mut self, detect: bool) -> Self {
        self.detect = detect;
        self
    }

    /// Whether `begin_configured` probes the address
    pub fn detect(&self) -> bool {
        self.detect
    }

    /// The 7-bit address, or 0 after [`end`](Self::end)
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Name of the bus this device resolves on `begin`
    pub fn bus_name(&self) -> &str {
        &self.bus_name
    }

    /// Whether the device has a resolved bus
    pub fn is_open(&self) -> bool {
        self.bus.is_some()
    }

    /// Largest transfer accepted by `write` and `read`
    pub fn max_buffer_size(&self) -> usize {
        self.max_buffer_size
    }

    /// Release the bus and clear the address
    ///
    /// Idempotent. A later [`begin`](I2cDevice::begin) reopens the device
    /// at its configured address.
    pub fn end(&mut self) {
        if self.bus.take().is_some() {
            debug!("i2c {=u8:#x}: closed", self.address);
        }
        self.address = 0;
    }
}

impl<B: I2cMaster> I2cDevice<B> {
    /// Resolve the bus and open the device
    ///
    /// With `addr_detect`, the address is probed first. Any failure
    /// leaves the device closed, including one that was already open.
    pub fn begin<R>(&mut self, registry: &R, addr_detect: bool) -> Result<(), DeviceError<B::Error>>
    where
        R: BusRegistry<Bus = B>,
    {
        self.bus = None;

        let Some(mut bus) = registry.find(&self.bus_name) else {
            warn!("i2c bus {=str} not found", self.bus_name.as_str());
            return Err(DeviceError::BusNotFound);
        };

        let address = self.configured.get();
        if addr_detect && !probe(&mut bus, address)? {
            warn!("i2c {=u8:#x}: no device on {=str}", address, self.bus_name.as_str());
            return Err(DeviceError::NotDetected);
        }

        self.address = address;
        self.bus = Some(bus);
        debug!("i2c {=u8:#x}: open on {=str}", address, self.bus_name.as_str());
        Ok(())
    }

    /// [`begin`](Self::begin), probing only if the device was built with
    /// detection on
    pub fn begin_configured<R>(&mut self, registry: &R) -> Result<(), DeviceError<B::Error>>
    where
        R: BusRegistry<Bus = B>,
    {
        self.begin(registry, self.detect)
    }

    /// Probe the address with a zero-length write
    ///
    /// `Ok(false)` when the address is not acknowledged; other bus
    /// failures are returned as errors. A bus without pull-ups can read
    /// as a false positive.
    pub fn detected(&mut self) -> Result<bool, DeviceError<B::Error>> {
        let (bus, address) = self.open_bus()?;
        probe(bus, address)
    }

    /// Write `buffer`, preceded by `prefix` in the same transaction
    ///
    /// `stop` controls whether the bus is released after `buffer`. With a
    /// non-empty prefix exactly two segments are sent: the prefix with
    /// STOP suppressed, then `buffer` with START suppressed. An empty
    /// prefix sends `buffer` alone.
    ///
    /// Over an [`EmbeddedHalBus`](rtduino_hal::EmbeddedHalBus) a trailing
    /// `stop = false` is closed with STOP, so a following `read` starts a
    /// new transaction. Use [`write_then_read`](Self::write_then_read)
    /// when the repeated START matters.
    pub fn write(
        &mut self,
        buffer: &[u8],
        stop: bool,
        prefix: &[u8],
    ) -> Result<(), DeviceError<B::Error>> {
        self.check_transfer(prefix.len() + buffer.len())?;
        let (bus, address) = self.open_bus()?;

        trace!(
            "i2c {=u8:#x}: write {=usize}+{=usize} bytes stop={=bool}",
            address,
            prefix.len(),
            buffer.len(),
            stop
        );

        let result = if prefix.is_empty() {
            bus.send(address, Framing::with_stop(stop), buffer)
        } else {
            let mut segments = [
                Segment::write(prefix, Framing::NO_STOP),
                Segment::write(buffer, Framing::NO_START | Framing::with_stop(stop)),
            ];
            bus.transfer(address, &mut segments)
        };

        result.map_err(DeviceError::Bus)
    }

    /// Read into `buffer`, releasing the bus afterwards if `stop`
    ///
    /// `stop = false` has no effect over an
    /// [`EmbeddedHalBus`](rtduino_hal::EmbeddedHalBus); see [`write`](Self::write).
    pub fn read(&mut self, buffer: &mut [u8], stop: bool) -> Result<(), DeviceError<B::Error>> {
        self.check_transfer(buffer.len())?;
        let (bus, address) = self.open_bus()?;

        trace!(
            "i2c {=u8:#x}: read {=usize} bytes stop={=bool}",
            address,
            buffer.len(),
            stop
        );

        bus.recv(address, Framing::with_stop(stop), buffer)
            .map_err(DeviceError::Bus)
    }

    /// Write `write_buffer`, then read into `read_buffer`
    ///
    /// `stop` applies between the write and the read; the read always
    /// ends with STOP. A failed write skips the read.
    pub fn write_then_read(
        &mut self,
        write_buffer: &[u8],
        read_buffer: &mut [u8],
        stop: bool,
    ) -> Result<(), DeviceError<B::Error>> {
        self.check_transfer(write_buffer.len().max(read_buffer.len()))?;
        let (bus, address) = self.open_bus()?;

        trace!(
            "i2c {=u8:#x}: write {=usize} then read {=usize} stop={=bool}",
            address,
            write_buffer.len(),
            read_buffer.len(),
            stop
        );

        let mut segments = [
            Segment::write(write_buffer, Framing::with_stop(stop)),
            Segment::read(read_buffer, Framing::NORMAL),
        ];
        bus.transfer(address, &mut segments)
            .map_err(DeviceError::Bus)
    }

    /// Write `data` to register `reg`
    pub fn write_register(&mut self, reg: u8, data: &[u8]) -> Result<(), DeviceError<B::Error>> {
        self.write(data, true, &[reg])
    }

    /// Read `buffer.len()` bytes starting at register `reg`
    pub fn read_register(
        &mut self,
        reg: u8,
        buffer: &mut [u8],
    ) -> Result<(), DeviceError<B::Error>> {
        self.write_then_read(&[reg], buffer, false)
    }

    /// Change the SCL clock
    ///
    /// Clock rate belongs to the bus driver's configuration; this layer
    /// cannot change it and always reports [`DeviceError::Unsupported`].
    pub fn set_speed(&mut self, desired_clock: u32) -> Result<(), DeviceError<B::Error>> {
        debug!(
            "i2c {=u8:#x}: set_speed({=u32}) unsupported",
            self.address,
            desired_clock
        );
        Err(DeviceError::Unsupported)
    }

    fn open_bus(&mut self) -> Result<(&mut B, u8), DeviceError<B::Error>> {
        let address = self.address;
        match self.bus.as_mut() {
            Some(bus) => Ok((bus, address)),
            None => Err(DeviceError::NotOpen),
        }
    }

    /// Closed devices fail before oversized transfers
    fn check_transfer(&self, len: usize) -> Result<(), DeviceError<B::Error>> {
        if self.bus.is_none() {
            return Err(DeviceError::NotOpen);
        }
        if len > self.max_buffer_size {
            warn!(
                "i2c {=u8:#x}: {=usize} bytes exceeds max buffer size {=usize}",
                self.address,
                len,
                self.max_buffer_size
            );
            return Err(DeviceError::BufferTooLarge);
        }
        Ok(())
    }
}

/// Zero-length write; NACK means absent
fn probe<B: I2cMaster>(bus: &mut B, address: u8) -> Result<bool, DeviceError<B::Error>> {
    match bus.send(address, Framing::NORMAL, &[]) {
        Ok(()) => Ok(true),
        Err(e) if matches!(e.kind(), ErrorKind::NoAcknowledge(_)) => Ok(false),
        Err(e) => Err(DeviceError::Bus(e)),
    }
}
