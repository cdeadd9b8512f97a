//! Error types for channel and protocol failures.
//!
//! Buffer overflow is not an error: `send` reports it as `Ok(false)` and the
//! caller decides whether to retry, drop, or escalate. Errors here mean the
//! underlying channel itself failed.

use core::fmt;

/// Errors produced by the channel capability and the protocol engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The peer end of the channel is gone.
    Disconnected,

    /// The channel delivered an item of the wrong kind, e.g. a data word
    /// where a control token was expected. The channel contract guarantees
    /// ordered delivery, so this indicates mixed-up protocol variants or a
    /// broken channel implementation.
    Desync,

    /// A scripted test channel ran out of scripted items.
    Starved,

    /// Wire-level I/O failure in a stream-backed channel.
    Io,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Disconnected => write!(f, "channel peer disconnected"),
            Error::Desync => write!(f, "unexpected item kind on channel"),
            Error::Starved => write!(f, "scripted channel has no more items"),
            Error::Io => write!(f, "channel I/O error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl From<Error> for std::io::Error {
    fn from(err: Error) -> std::io::Error {
        let kind = match err {
            Error::Disconnected => std::io::ErrorKind::ConnectionReset,
            Error::Desync => std::io::ErrorKind::InvalidData,
            Error::Starved => std::io::ErrorKind::WouldBlock,
            Error::Io => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
