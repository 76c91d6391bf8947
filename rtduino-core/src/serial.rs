//! Console serial port
//!
//! Arduino's `Serial` mapped onto the system console. The console is up
//! before application code runs, so `begin` has nothing to configure;
//! writes go straight to the console device and report what it accepted.

use core::fmt;

use rtduino_hal::{ConsoleSink, SerialConfig};

/// Error from the `embedded_io` interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError {
    /// Console accepted nothing from a non-empty buffer
    NotReady,
}

impl embedded_io::Error for ConsoleError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("console not ready")
    }
}

/// Serial port backed by the console device
pub struct ConsoleSerial<S> {
    sink: S,
}

impl<S: ConsoleSink> ConsoleSerial<S> {
    pub const fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Start the port at `baud` with 8N1 framing
    pub fn begin(&mut self, baud: u32) {
        self.begin_with_config(baud, SerialConfig::SERIAL_8N1);
    }

    /// Start the port with explicit framing
    ///
    /// The console is already running; nothing is reconfigured.
    pub fn begin_with_config(&mut self, baud: u32, config: SerialConfig) {
        trace!("console begin: {=u32} baud {}", baud, config);
    }

    /// Write one byte; always reports 1
    pub fn write_byte(&mut self, byte: u8) -> usize {
        self.sink.write(&[byte]);
        1
    }

    /// Write `buffer` verbatim
    ///
    /// Returns the number of bytes the console accepted, which is short
    /// when the console is not ready. The remainder is not retried.
    pub fn write(&mut self, buffer: &[u8]) -> usize {
        self.sink.write(buffer)
    }

    /// Write a string; returns bytes accepted
    pub fn print(&mut self, s: &str) -> usize {
        self.write(s.as_bytes())
    }

    /// Write a string followed by CR LF; returns bytes accepted
    pub fn println(&mut self, s: &str) -> usize {
        let n = self.print(s);
        n + self.write(b"\r\n")
    }

    /// Borrow the console device
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutably borrow the console device
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Release the console device
    pub fn into_inner(self) -> S {
        self.sink
    }
}

/// A short write is reported as an error
impl<S: ConsoleSink> fmt::Write for ConsoleSerial<S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.print(s) == s.len() {
            Ok(())
        } else {
            Err(fmt::Error)
        }
    }
}

impl<S> embedded_io::ErrorType for ConsoleSerial<S> {
    type Error = ConsoleError;
}

impl<S: ConsoleSink> embedded_io::Write for ConsoleSerial<S> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, ConsoleError> {
        match self.sink.write(buf) {
            0 if !buf.is_empty() => Err(ConsoleError::NotReady),
            n => Ok(n),
        }
    }

    fn flush(&mut self) -> Result<(), ConsoleError> {
        Ok(())
    }
}

/// Console on the host's standard output
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

#[cfg(feature = "std")]
impl ConsoleSink for StdoutSink {
    fn write(&mut self, data: &[u8]) -> usize {
        use std::io::Write;
        let mut out = std::io::stdout().lock();
        let n = out.write(data).unwrap_or(0);
        let _ = out.flush();
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;
    use proptest::prelude::*;

    /// Accepts at most `limit` bytes per call
    struct ThrottledSink {
        received: std::vec::Vec<u8>,
        limit: usize,
        calls: usize,
    }

    impl ThrottledSink {
        fn new(limit: usize) -> Self {
            Self {
                received: std::vec::Vec::new(),
                limit,
                calls: 0,
            }
        }
    }

    impl ConsoleSink for ThrottledSink {
        fn write(&mut self, data: &[u8]) -> usize {
            self.calls += 1;
            let n = data.len().min(self.limit);
            self.received.extend_from_slice(&data[..n]);
            n
        }
    }

    #[test]
    fn test_begin_is_noop() {
        let mut serial = ConsoleSerial::new(ThrottledSink::new(usize::MAX));
        serial.begin(115_200);
        serial.begin_with_config(9600, SerialConfig::SERIAL_7E1);
        assert_eq!(serial.sink().calls, 0);
    }

    #[test]
    fn test_write_byte() {
        let mut serial = ConsoleSerial::new(ThrottledSink::new(usize::MAX));
        assert_eq!(serial.write_byte(b'A'), 1);
        assert_eq!(serial.write_byte(0), 1);
        assert_eq!(serial.sink().received, [b'A', 0]);
    }

    #[test]
    fn test_write_is_verbatim() {
        let mut serial = ConsoleSerial::new(ThrottledSink::new(usize::MAX));
        assert_eq!(serial.write(b"hi\0there"), 8);
        assert_eq!(serial.sink().received, b"hi\0there");
    }

    #[test]
    fn test_short_write_not_retried() {
        let mut serial = ConsoleSerial::new(ThrottledSink::new(3));
        assert_eq!(serial.write(b"hello"), 3);
        assert_eq!(serial.sink().calls, 1);
        assert_eq!(serial.sink().received, b"hel");
    }

    #[test]
    fn test_println() {
        let mut serial = ConsoleSerial::new(Vec::<u8, 32>::new());
        assert_eq!(serial.println("ok"), 4);
        assert_eq!(serial.sink().as_slice(), b"ok\r\n");
    }

    #[test]
    fn test_fmt_write() {
        use core::fmt::Write;

        let mut serial = ConsoleSerial::new(Vec::<u8, 32>::new());
        write!(serial, "ax={} ay={}", -12, 7).unwrap();
        assert_eq!(serial.into_inner().as_slice(), b"ax=-12 ay=7");

        let mut full = ConsoleSerial::new(Vec::<u8, 4>::new());
        assert!(write!(full, "too long").is_err());
    }

    #[test]
    fn test_embedded_io_write() {
        let mut serial = ConsoleSerial::new(ThrottledSink::new(2));

        assert_eq!(embedded_io::Write::write(&mut serial, b"abc"), Ok(2));
        assert_eq!(embedded_io::Write::write(&mut serial, b""), Ok(0));
        assert_eq!(embedded_io::Write::flush(&mut serial), Ok(()));

        // write_all keeps going across short writes
        embedded_io::Write::write_all(&mut serial, b"defg").unwrap();
        assert_eq!(serial.sink().received, b"abdefg");
    }

    #[test]
    fn test_embedded_io_not_ready() {
        let mut serial = ConsoleSerial::new(ThrottledSink::new(0));
        assert_eq!(
            embedded_io::Write::write(&mut serial, b"x"),
            Err(ConsoleError::NotReady)
        );
    }

    proptest! {
        #[test]
        fn prop_write_forwards_prefix_and_reports_accepted(
            buf in proptest::collection::vec(any::<u8>(), 0..64),
            size in 0usize..64,
            limit in 0usize..80,
        ) {
            let size = size.min(buf.len());
            let mut serial = ConsoleSerial::new(ThrottledSink::new(limit));

            let n = serial.write(&buf[..size]);

            prop_assert_eq!(n, size.min(limit));
            prop_assert_eq!(&serial.sink().received[..], &buf[..n]);
        }
    }
}
