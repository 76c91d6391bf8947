//! I2C bus abstractions
//!
//! Provides the framed master interface an RTOS I2C core exposes: every
//! physical send or receive carries flags that can suppress the START
//! condition (and address byte) or the STOP condition. Chaining segments
//! with suppressed framing lets several physical transfers appear to the
//! slave as one uninterrupted transaction.

use core::ops::BitOr;

/// Driver flag word bit suppressing START and the address byte
pub const RT_I2C_NO_START: u16 = 1 << 4;

/// Driver flag word bit suppressing STOP
pub const RT_I2C_NO_STOP: u16 = 1 << 7;

/// Start/stop framing of one physical segment
///
/// The three named constants cover the single-suppression cases; a
/// segment that both continues a transaction and leaves it open is
/// `Framing::NO_START | Framing::NO_STOP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Framing {
    no_start: bool,
    no_stop: bool,
}

impl Framing {
    /// START + address + data + STOP
    pub const NORMAL: Self = Self {
        no_start: false,
        no_stop: false,
    };

    /// Leave the bus held after the data
    pub const NO_STOP: Self = Self {
        no_start: false,
        no_stop: true,
    };

    /// Continue the current transaction without START or address byte
    pub const NO_START: Self = Self {
        no_start: true,
        no_stop: false,
    };

    /// Framing for a standalone transfer honoring a caller's `stop` flag
    pub const fn with_stop(stop: bool) -> Self {
        if stop {
            Self::NORMAL
        } else {
            Self::NO_STOP
        }
    }

    /// Combine the suppressions of both framings
    pub const fn union(self, other: Self) -> Self {
        Self {
            no_start: self.no_start || other.no_start,
            no_stop: self.no_stop || other.no_stop,
        }
    }

    /// Whether the segment opens with START + address
    pub const fn issues_start(self) -> bool {
        !self.no_start
    }

    /// Whether the segment ends with STOP
    pub const fn issues_stop(self) -> bool {
        !self.no_stop
    }

    /// Encode as an RTOS driver flag word
    pub const fn to_rt_flags(self) -> u16 {
        let mut flags = 0;
        if self.no_start {
            flags |= RT_I2C_NO_START;
        }
        if self.no_stop {
            flags |= RT_I2C_NO_STOP;
        }
        flags
    }

    /// Decode from an RTOS driver flag word, ignoring unrelated bits
    pub const fn from_rt_flags(flags: u16) -> Self {
        Self {
            no_start: flags & RT_I2C_NO_START != 0,
            no_stop: flags & RT_I2C_NO_STOP != 0,
        }
    }
}

impl BitOr for Framing {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Transfer direction of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Write,
    Read,
}

/// One physical send or receive
#[derive(Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Bytes sent to the slave
    Write { data: &'a [u8], framing: Framing },
    /// Buffer filled from the slave
    Read { buf: &'a mut [u8], framing: Framing },
}

impl<'a> Segment<'a> {
    /// Create a write segment
    pub fn write(data: &'a [u8], framing: Framing) -> Self {
        Segment::Write { data, framing }
    }

    /// Create a read segment
    pub fn read(buf: &'a mut [u8], framing: Framing) -> Self {
        Segment::Read { buf, framing }
    }

    /// Framing of this segment
    pub fn framing(&self) -> Framing {
        match self {
            Segment::Write { framing, .. } | Segment::Read { framing, .. } => *framing,
        }
    }

    /// Direction of this segment
    pub fn direction(&self) -> Direction {
        match self {
            Segment::Write { .. } => Direction::Write,
            Segment::Read { .. } => Direction::Read,
        }
    }

    /// Number of data bytes moved by this segment
    pub fn len(&self) -> usize {
        match self {
            Segment::Write { data, .. } => data.len(),
            Segment::Read { buf, .. } => buf.len(),
        }
    }

    /// Whether the segment moves no data
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// I2C bus master
///
/// Blocking, framed master operations. Any timeout or arbitration
/// handling belongs to the implementation; callers see only the result.
pub trait I2cMaster {
    /// Error type for I2C operations
    ///
    /// Bound to [`embedded_hal::i2c::Error`] so callers can tell a NACK
    /// from other bus failures.
    type Error: embedded_hal::i2c::Error;

    /// Send `data` to the device at `address`
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `framing` - Start/stop suppression for this segment
    /// * `data` - Bytes to write
    fn send(&mut self, address: u8, framing: Framing, data: &[u8]) -> Result<(), Self::Error>;

    /// Receive into `buf` from the device at `address`
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `framing` - Start/stop suppression for this segment
    /// * `buf` - Buffer to read into
    fn recv(&mut self, address: u8, framing: Framing, buf: &mut [u8])
        -> Result<(), Self::Error>;

    /// Issue `segments` back to back
    ///
    /// Stops at the first failing segment; later segments are never put
    /// on the bus. Implementations guarding a shared bus hold their lock
    /// for the whole call.
    fn transfer(&mut self, address: u8, segments: &mut [Segment<'_>]) -> Result<(), Self::Error> {
        for segment in segments.iter_mut() {
            match segment {
                Segment::Write { data, framing } => self.send(address, *framing, data)?,
                Segment::Read { buf, framing } => self.recv(address, *framing, buf)?,
            }
        }
        Ok(())
    }
}

impl<T: I2cMaster + ?Sized> I2cMaster for &mut T {
    type Error = T::Error;

    fn send(&mut self, address: u8, framing: Framing, data: &[u8]) -> Result<(), Self::Error> {
        T::send(self, address, framing, data)
    }

    fn recv(
        &mut self,
        address: u8,
        framing: Framing,
        buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        T::recv(self, address, framing, buf)
    }

    fn transfer(&mut self, address: u8, segments: &mut [Segment<'_>]) -> Result<(), Self::Error> {
        T::transfer(self, address, segments)
    }
}
