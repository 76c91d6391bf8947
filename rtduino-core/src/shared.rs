//! Shared bus handles
//!
//! Several [`I2cDevice`](crate::device::I2cDevice)s on one physical bus
//! each hold a [`SharedBus`]. The bus lives in a blocking mutex and every
//! call, including a whole multi-segment `transfer`, runs under the lock,
//! so a prefixed write cannot be split by another device's transaction.
//!
//! Pick the raw mutex for the context the bus is used from:
//! `CriticalSectionRawMutex` when devices live in different interrupt
//! priorities or threads, `NoopRawMutex` for single-context use.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use rtduino_hal::{Framing, I2cMaster, Segment};

/// Mutex-guarded bus owned outside the devices
pub type BusMutex<M, B> = Mutex<M, RefCell<B>>;

/// Copyable handle to a mutex-guarded bus
pub struct SharedBus<'a, M: RawMutex, B> {
    bus: &'a BusMutex<M, B>,
}

impl<'a, M: RawMutex, B> SharedBus<'a, M, B> {
    pub const fn new(bus: &'a BusMutex<M, B>) -> Self {
        Self { bus }
    }
}

impl<M: RawMutex, B> Clone for SharedBus<'_, M, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: RawMutex, B> Copy for SharedBus<'_, M, B> {}

impl<M: RawMutex, B: I2cMaster> I2cMaster for SharedBus<'_, M, B> {
    type Error = B::Error;

    fn send(&mut self, address: u8, framing: Framing, data: &[u8]) -> Result<(), Self::Error> {
        self.bus
            .lock(|bus| bus.borrow_mut().send(address, framing, data))
    }

    fn recv(
        &mut self,
        address: u8,
        framing: Framing,
        buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.bus
            .lock(|bus| bus.borrow_mut().recv(address, framing, buf))
    }

    fn transfer(&mut self, address: u8, segments: &mut [Segment<'_>]) -> Result<(), Self::Error> {
        self.bus
            .lock(|bus| bus.borrow_mut().transfer(address, segments))
    }
}
