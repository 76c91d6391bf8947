//! Console output abstractions
//!
//! The console is a write-only device that is always ready once the
//! system is up; it may accept fewer bytes than offered when its buffer
//! is full.

/// Console device
pub trait ConsoleSink {
    /// Write data to the console device
    ///
    /// Returns the number of bytes accepted, which may be fewer than
    /// `data.len()`. Never retries.
    fn write(&mut self, data: &[u8]) -> usize;
}

impl<T: ConsoleSink + ?Sized> ConsoleSink for &mut T {
    fn write(&mut self, data: &[u8]) -> usize {
        T::write(self, data)
    }
}

/// Captures output up to capacity
impl<const N: usize> ConsoleSink for heapless::Vec<u8, N> {
    fn write(&mut self, data: &[u8]) -> usize {
        let accepted = data.len().min(N - self.len());
        // Cannot fail: `accepted` fits the remaining capacity
        let _ = self.extend_from_slice(&data[..accepted]);
        accepted
    }
}

/// Serial frame format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialConfig {
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::SERIAL_8N1
    }
}

impl SerialConfig {
    /// 8 data bits, no parity, 1 stop bit
    pub const SERIAL_8N1: Self = Self::new(DataBits::Eight, Parity::None, StopBits::One);
    /// 8 data bits, no parity, 2 stop bits
    pub const SERIAL_8N2: Self = Self::new(DataBits::Eight, Parity::None, StopBits::Two);
    /// 8 data bits, even parity, 1 stop bit
    pub const SERIAL_8E1: Self = Self::new(DataBits::Eight, Parity::Even, StopBits::One);
    /// 8 data bits, odd parity, 1 stop bit
    pub const SERIAL_8O1: Self = Self::new(DataBits::Eight, Parity::Odd, StopBits::One);
    /// 7 data bits, even parity, 1 stop bit
    pub const SERIAL_7E1: Self = Self::new(DataBits::Seven, Parity::Even, StopBits::One);

    pub const fn new(data_bits: DataBits, parity: Parity, stop_bits: StopBits) -> Self {
        Self {
            data_bits,
            parity,
            stop_bits,
        }
    }

    /// Parse the conventional three-character notation (`"8N1"`, `"7E1"`)
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 3 {
            return None;
        }

        let data_bits = match bytes[0] {
            b'7' => DataBits::Seven,
            b'8' => DataBits::Eight,
            b'9' => DataBits::Nine,
            _ => return None,
        };
        let parity = match bytes[1].to_ascii_uppercase() {
            b'N' => Parity::None,
            b'E' => Parity::Even,
            b'O' => Parity::Odd,
            _ => return None,
        };
        let stop_bits = match bytes[2] {
            b'1' => StopBits::One,
            b'2' => StopBits::Two,
            _ => return None,
        };

        Some(Self::new(data_bits, parity, stop_bits))
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    #[test]
    fn test_vec_sink_accepts_until_full() {
        let mut sink: Vec<u8, 4> = Vec::new();

        assert_eq!(sink.write(b"ab"), 2);
        assert_eq!(sink.write(b"cdef"), 2);
        assert_eq!(sink.write(b"g"), 0);
        assert_eq!(sink.as_slice(), b"abcd");
    }

    #[test]
    fn test_parse_serial_config() {
        assert_eq!(SerialConfig::parse("8N1"), Some(SerialConfig::SERIAL_8N1));
        assert_eq!(SerialConfig::parse("7e1"), Some(SerialConfig::SERIAL_7E1));
        assert_eq!(SerialConfig::parse("8O1"), Some(SerialConfig::SERIAL_8O1));
        assert_eq!(SerialConfig::parse("8N2"), Some(SerialConfig::SERIAL_8N2));
        assert_eq!(SerialConfig::parse("6N1"), None);
        assert_eq!(SerialConfig::parse("8X1"), None);
        assert_eq!(SerialConfig::parse("8N"), None);
    }

    #[test]
    fn test_default_is_8n1() {
        let config = SerialConfig::default();
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
    }
}
