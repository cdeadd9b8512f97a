//! # NBSP - A Non-Blocking Small-Package Protocol
//!
//! NBSP is a `no_std` compatible bidirectional protocol for exchanging
//! single 32-bit words over a narrow, ordered, reliable channel. It
//! provides:
//!
//! - **Non-blocking sends**: A send while the peer is busy lands in a
//!   local queue instead of stalling the caller
//! - **Flow control**: A send that finds the queue full is rejected and
//!   changes nothing, so the caller can throttle
//! - **Automatic acknowledgement**: Received data is acknowledged without
//!   caller involvement, and each ack releases the next queued word
//! - **Streaming variant**: A one-way paired-word fast path that halves
//!   per-word channel traffic for bulk transfer
//! - **Custom channel support**: Works over anything implementing the
//!   `WireChannel` capability
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Application Layer                     │
//! ├─────────────────────────────────────────────────────────┤
//! │                    Protocol Layer                        │
//! │  ┌─────────────┐ ┌──────────────┐ ┌─────────────────┐   │
//! │  │  Endpoint   │ │ PairedSender │ │ PairedReceiver  │   │
//! │  └─────────────┘ └──────────────┘ └─────────────────┘   │
//! │  ┌─────────────┐ ┌──────────────┐                       │
//! │  │  WordQueue  │ │    Clock     │                       │
//! │  └─────────────┘ └──────────────┘                       │
//! ├─────────────────────────────────────────────────────────┤
//! │                    Channel Layer                         │
//! │  ┌─────────────────────────────────────────────────┐    │
//! │  │       WireChannel (tokens and data words)       │    │
//! │  └─────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use nbsp::{Endpoint, Message};
//!
//! let mut endpoint: Endpoint<_, 16> = Endpoint::new(channel);
//!
//! // Send a word; a `false` return means the queue is full
//! let accepted = endpoint.send(0xCAFE)?;
//!
//! // React to whatever the peer sent
//! if endpoint.receive_and_handle()? {
//!     let word = endpoint.received_data();
//! }
//! ```

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

pub mod buffer;
pub mod channel;
pub mod clock;
pub mod error;
pub mod protocol;
pub mod streaming;

// Re-export commonly used types
pub use buffer::WordQueue;
pub use channel::{WireChannel, WireItem};
pub use clock::Clock;
pub use error::{Error, Result};
pub use protocol::{Endpoint, EndpointStats, Message};
pub use streaming::{PairedReceiver, PairedSender};

/// One unit of protocol payload.
pub type Word = u32;

/// One channel control token.
pub type Token = u8;

/// Token announcing that a data word follows.
///
/// The value is the smallest token code left free for applications by the
/// channel conventions this protocol grew up on.
pub const TOKEN_DATA: Token = 0x05;

/// Token acknowledging receipt of a data word or word pair.
pub const TOKEN_ACK: Token = 0x01;
