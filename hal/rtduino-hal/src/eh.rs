//! embedded-hal adapter
//!
//! Drives framed segments through any [`embedded_hal::i2c::I2c`]
//! implementation. embedded-hal has no flag word; instead a transaction
//! is a list of operations where adjacent operations of the same
//! direction are merged without a repeated START, and the whole list ends
//! with STOP. Framing maps onto that as follows:
//!
//! - segments accumulate into one transaction until a segment issues STOP
//! - a NO_START segment must follow a segment of the same direction
//! - a START segment may only follow a segment of the other direction
//!   (repeated START)
//! - a trailing NO_STOP is closed with STOP, since embedded-hal cannot
//!   leave the bus held between calls

use core::fmt;

use embedded_hal::i2c::{ErrorKind, I2c, Operation};
use heapless::Vec;

use crate::i2c::{Direction, Framing, I2cMaster, Segment};

/// Maximum segments folded into one embedded-hal transaction
pub const MAX_OPERATIONS: usize = 8;

/// Error from the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdapterError<E> {
    /// Error reported by the wrapped bus
    Bus(E),
    /// Framing sequence embedded-hal cannot express
    UnsupportedFraming,
    /// More than [`MAX_OPERATIONS`] segments without a STOP
    TooManySegments,
}

impl<E: embedded_hal::i2c::Error> embedded_hal::i2c::Error for AdapterError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::Bus(e) => e.kind(),
            AdapterError::UnsupportedFraming | AdapterError::TooManySegments => ErrorKind::Other,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for AdapterError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterError::Bus(e) => write!(f, "bus error: {:?}", e),
            AdapterError::UnsupportedFraming => f.write_str("framing not expressible as a transaction"),
            AdapterError::TooManySegments => f.write_str("too many segments in one transaction"),
        }
    }
}

/// [`I2cMaster`] over an embedded-hal I2C bus
#[derive(Debug)]
pub struct EmbeddedHalBus<I> {
    inner: I,
}

impl<I: I2c> EmbeddedHalBus<I> {
    /// Wrap an embedded-hal bus
    pub const fn new(inner: I) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped bus
    pub fn inner(&self) -> &I {
        &self.inner
    }

    /// Mutably borrow the wrapped bus
    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.inner
    }

    /// Release the wrapped bus
    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: I2c> I2cMaster for EmbeddedHalBus<I> {
    type Error = AdapterError<I::Error>;

    fn send(&mut self, address: u8, framing: Framing, data: &[u8]) -> Result<(), Self::Error> {
        self.transfer(address, &mut [Segment::write(data, framing)])
    }

    fn recv(
        &mut self,
        address: u8,
        framing: Framing,
        buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.transfer(address, &mut [Segment::read(buf, framing)])
    }

    fn transfer(&mut self, address: u8, segments: &mut [Segment<'_>]) -> Result<(), Self::Error> {
        let mut ops: Vec<Operation<'_>, MAX_OPERATIONS> = Vec::new();
        let mut previous: Option<Direction> = None;

        for segment in segments.iter_mut() {
            let framing = segment.framing();
            let direction = segment.direction();

            match (framing.issues_start(), previous) {
                // Continuation needs a same-direction predecessor to merge with
                (false, Some(prev)) if prev == direction => {}
                (false, _) => return Err(AdapterError::UnsupportedFraming),
                // Repeated START only happens on a direction change
                (true, Some(prev)) if prev == direction => {
                    return Err(AdapterError::UnsupportedFraming)
                }
                (true, _) => {}
            }

            let op = match segment {
                Segment::Write { data, .. } => Operation::Write(data),
                Segment::Read { buf, .. } => Operation::Read(buf),
            };
            if ops.push(op).is_err() {
                return Err(AdapterError::TooManySegments);
            }

            if framing.issues_stop() {
                self.inner
                    .transaction(address, &mut ops)
                    .map_err(AdapterError::Bus)?;
                ops.clear();
                previous = None;
            } else {
                previous = Some(direction);
            }
        }

        if !ops.is_empty() {
            debug!(
                "i2c {=u8:#x}: trailing no-stop segment closed with STOP",
                address
            );
            self.inner
                .transaction(address, &mut ops)
                .map_err(AdapterError::Bus)?;
        }

        Ok(())
    }
}
