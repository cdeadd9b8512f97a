//! A blocking in-process channel pair built on `std::sync::mpsc`.

use std::sync::mpsc;

use super::{WireChannel, WireItem};
use crate::error::{Error, Result};
use crate::{Token, Word};

/// One end of a cross-connected in-process channel pair.
///
/// Each end is owned by exactly one task; receives block the calling thread
/// until the peer end performs the matching send, which is the suspension
/// semantics the protocol is written against.
#[derive(Debug)]
pub struct ThreadChannel {
    tx: mpsc::Sender<WireItem>,
    rx: mpsc::Receiver<WireItem>,
}

/// Creates a connected pair of channel ends.
pub fn channel_pair() -> (ThreadChannel, ThreadChannel) {
    let (a_tx, b_rx) = mpsc::channel();
    let (b_tx, a_rx) = mpsc::channel();

    (
        ThreadChannel { tx: a_tx, rx: a_rx },
        ThreadChannel { tx: b_tx, rx: b_rx },
    )
}

impl ThreadChannel {
    fn send(&mut self, item: WireItem) -> Result<()> {
        self.tx.send(item).map_err(|_| Error::Disconnected)
    }

    fn receive(&mut self) -> Result<WireItem> {
        self.rx.recv().map_err(|_| Error::Disconnected)
    }
}

impl WireChannel for ThreadChannel {
    fn send_token(&mut self, token: Token) -> Result<()> {
        self.send(WireItem::Token(token))
    }

    fn send_word(&mut self, word: Word) -> Result<()> {
        self.send(WireItem::Word(word))
    }

    fn receive_token(&mut self) -> Result<Token> {
        match self.receive()? {
            WireItem::Token(token) => Ok(token),
            WireItem::Word(_) => Err(Error::Desync),
        }
    }

    fn receive_word(&mut self) -> Result<Word> {
        match self.receive()? {
            WireItem::Word(word) => Ok(word),
            WireItem::Token(_) => Err(Error::Desync),
        }
    }
}
