use std::io;
use std::time::Duration;

pub mod script;

/// Duplex byte stream that images arrive on.
pub trait Transport {
    /// Bytes that can be read right now without waiting
    fn available(&mut self) -> usize;

    /// Fill `buf` until it is full or `timeout` passes without a new byte.
    ///
    /// Returns the number of bytes read; 0 means the sender went quiet.
    fn read_bytes(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;

    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        let n = self.read_bytes(&mut byte, timeout)?;
        Ok((n == 1).then_some(byte[0]))
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}
