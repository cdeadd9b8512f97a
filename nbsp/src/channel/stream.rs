//! Byte-stream adapter for the channel capability.
//!
//! Carries tokens and words over any `std::io` stream (Unix socket, TCP)
//! with a one-byte kind prefix per item, so the receiving side can tell a
//! control token from a data word before committing to a read.

use std::io::{Read, Write};

use super::WireChannel;
use crate::error::{Error, Result};
use crate::{Token, Word};

/// Kind prefix for a control token.
const KIND_TOKEN: u8 = 0x00;

/// Kind prefix for a data word.
const KIND_WORD: u8 = 0x01;

/// Adapts a byte stream to the token/word channel capability.
///
/// The stream must deliver bytes reliably and in order; the adapter adds
/// no checksums or retransmission of its own.
#[derive(Debug)]
pub struct StreamChannel<T> {
    inner: T,
}

impl<T> StreamChannel<T> {
    /// Creates a channel over the given stream.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Returns a reference to the inner stream.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Returns a mutable reference to the inner stream.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consumes the channel and returns the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

fn map_io(err: std::io::Error) -> Error {
    match err.kind() {
        std::io::ErrorKind::UnexpectedEof
        | std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::BrokenPipe => Error::Disconnected,
        _ => Error::Io,
    }
}

impl<T: Read + Write> StreamChannel<T> {
    fn read_kind(&mut self, expected: u8) -> Result<()> {
        let mut kind = [0u8; 1];
        self.inner.read_exact(&mut kind).map_err(map_io)?;
        if kind[0] != expected {
            return Err(Error::Desync);
        }
        Ok(())
    }
}

impl<T: Read + Write> WireChannel for StreamChannel<T> {
    fn send_token(&mut self, token: Token) -> Result<()> {
        self.inner
            .write_all(&[KIND_TOKEN, token])
            .map_err(map_io)?;
        self.inner.flush().map_err(map_io)?;
        log::trace!("sent token {token:#04x}");
        Ok(())
    }

    fn send_word(&mut self, word: Word) -> Result<()> {
        let mut frame = [KIND_WORD, 0, 0, 0, 0];
        frame[1..].copy_from_slice(&word.to_be_bytes());
        self.inner.write_all(&frame).map_err(map_io)?;
        self.inner.flush().map_err(map_io)?;
        log::trace!("sent word {word}");
        Ok(())
    }

    fn receive_token(&mut self) -> Result<Token> {
        self.read_kind(KIND_TOKEN)?;
        let mut token = [0u8; 1];
        self.inner.read_exact(&mut token).map_err(map_io)?;
        log::trace!("received token {:#04x}", token[0]);
        Ok(token[0])
    }

    fn receive_word(&mut self) -> Result<Word> {
        self.read_kind(KIND_WORD)?;
        let mut bytes = [0u8; 4];
        self.inner.read_exact(&mut bytes).map_err(map_io)?;
        let word = Word::from_be_bytes(bytes);
        log::trace!("received word {word}");
        Ok(word)
    }
}
