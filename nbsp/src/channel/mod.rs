//! Channel capability abstraction.
//!
//! This module provides the `WireChannel` trait that describes the narrow,
//! ordered, reliable channel primitive the protocol runs on, along with the
//! implementations shipped with the crate:
//!
//! - `ScriptedChannel`: no_std test double with scripted input and captured
//!   output
//! - `ThreadChannel`: blocking in-process channel pair (requires `std`)
//! - `StreamChannel`: adapts any byte stream such as a Unix or TCP socket
//!   (requires `std`)
//!
//! # Example
//!
//! ```rust,ignore
//! use nbsp::channel::{WireChannel, channel_pair};
//!
//! let (mut a, mut b) = channel_pair();
//! a.send_token(nbsp::TOKEN_ACK)?;
//! assert_eq!(b.receive_token()?, nbsp::TOKEN_ACK);
//! ```

use crate::error::Result;
use crate::{Token, Word};

mod scripted;

#[cfg(feature = "std")]
mod stream;
#[cfg(feature = "std")]
mod thread;

pub use scripted::ScriptedChannel;

#[cfg(feature = "std")]
pub use stream::StreamChannel;
#[cfg(feature = "std")]
pub use thread::{ThreadChannel, channel_pair};

/// One value carried by a single channel exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireItem {
    /// A control token.
    Token(Token),

    /// A data word.
    Word(Word),
}

/// The channel capability the protocol requires.
///
/// A send on one end is matched, in order, by the corresponding receive on
/// the other end. Receives may suspend the calling task until the peer
/// performs the matching send; physical-layer backpressure on sends is
/// acceptable, reordering is not. The protocol provides no defense against
/// a channel that violates this contract.
pub trait WireChannel {
    /// Sends one control token.
    fn send_token(&mut self, token: Token) -> Result<()>;

    /// Sends one data word.
    fn send_word(&mut self, word: Word) -> Result<()>;

    /// Receives one control token, suspending until one is available.
    fn receive_token(&mut self) -> Result<Token>;

    /// Receives one data word, suspending until one is available.
    fn receive_word(&mut self) -> Result<Word>;
}
