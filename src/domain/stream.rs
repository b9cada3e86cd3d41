// src/domain/stream.rs
use std::fmt;
use std::io::{self, BufRead, Read};

/// How a locator is turned into bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessStrategy {
    /// Open a low-level file handle; only works inside the default access scope
    DirectDescriptor,
    /// Open a generic input stream; reaches shared external storage
    StreamCopy,
}

impl fmt::Display for AccessStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessStrategy::DirectDescriptor => write!(f, "direct-descriptor"),
            AccessStrategy::StreamCopy => write!(f, "stream-copy"),
        }
    }
}

/// Exclusively owned, buffered readable stream.
///
/// Consumed once by the codec; the underlying handle is closed on drop.
pub struct ByteStream {
    inner: Box<dyn BufRead + Send>,
}

impl ByteStream {
    pub fn new<R: BufRead + Send + 'static>(reader: R) -> Self {
        Self {
            inner: Box::new(reader),
        }
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream").finish_non_exhaustive()
    }
}

impl Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for ByteStream {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}
