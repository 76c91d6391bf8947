//! Bus registry
//!
//! Resolves a bus identifier (`"i2c1"`, `"i2c4"`, ...) to a handle the
//! way an RTOS device table does. Handles are cheap clones: references,
//! shared-bus guards or driver indices.

use heapless::Vec;

use crate::i2c::I2cMaster;

/// Bus lookup by name
pub trait BusRegistry {
    /// Handle returned for a registered bus
    type Bus: I2cMaster;

    /// Resolve `name`, or `None` if no such bus is registered
    fn find(&self, name: &str) -> Option<Self::Bus>;
}

impl<R: BusRegistry + ?Sized> BusRegistry for &R {
    type Bus = R::Bus;

    fn find(&self, name: &str) -> Option<Self::Bus> {
        R::find(self, name)
    }
}

/// Fixed-capacity registry of named bus handles
#[derive(Debug)]
pub struct StaticRegistry<B, const N: usize> {
    entries: Vec<(&'static str, B), N>,
}

impl<B, const N: usize> Default for StaticRegistry<B, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, const N: usize> StaticRegistry<B, N> {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register `bus` under `name`
    ///
    /// A later registration under the same name replaces the earlier one.
    /// Returns the handle back if the registry is full.
    pub fn register(&mut self, name: &'static str, bus: B) -> Result<(), B> {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = bus;
            return Ok(());
        }

        self.entries.push((name, bus)).map_err(|(_, bus)| bus)?;
        trace!("bus registered: {=str}", name);
        Ok(())
    }

    /// Number of registered buses
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no bus is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered bus names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl<B: I2cMaster + Clone, const N: usize> BusRegistry for StaticRegistry<B, N> {
    type Bus = B;

    fn find(&self, name: &str) -> Option<B> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, bus)| bus.clone())
    }
}
