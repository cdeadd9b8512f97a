//! Buffer management for the protocol.
//!
//! This module provides the word queue:
//! - WordQueue: power-of-two ring of data words used for send buffering

mod queue;

pub use queue::WordQueue;
