//! A scripted channel for driving one endpoint in isolation.

use heapless::Deque;

use super::{WireChannel, WireItem};
use crate::error::{Error, Result};
use crate::{TOKEN_ACK, TOKEN_DATA, Token, Word};

/// Item capacity of the script and capture rings.
const SCRIPT_CAPACITY: usize = 64;

/// A test channel that replays a scripted sequence of incoming items and
/// captures everything the endpoint sends.
///
/// Receiving past the end of the script is `Error::Starved` rather than a
/// block: a test that underfills its script is broken, not waiting.
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    incoming: Deque<WireItem, SCRIPT_CAPACITY>,
    outgoing: Deque<WireItem, SCRIPT_CAPACITY>,
}

impl ScriptedChannel {
    /// Creates a channel with an empty script.
    pub fn new() -> Self {
        Self {
            incoming: Deque::new(),
            outgoing: Deque::new(),
        }
    }

    /// Appends one incoming item to the script.
    pub fn script(&mut self, item: WireItem) {
        self.incoming
            .push_back(item)
            .expect("script ring overflow");
    }

    /// Scripts an incoming acknowledgement token.
    pub fn script_ack(&mut self) {
        self.script(WireItem::Token(TOKEN_ACK));
    }

    /// Scripts an incoming data message: the data token followed by `word`.
    pub fn script_data(&mut self, word: Word) {
        self.script(WireItem::Token(TOKEN_DATA));
        self.script(WireItem::Word(word));
    }

    /// Removes and returns the oldest captured outgoing item.
    pub fn take_outgoing(&mut self) -> Option<WireItem> {
        self.outgoing.pop_front()
    }

    /// Returns the number of captured outgoing items.
    pub fn outgoing_len(&self) -> usize {
        self.outgoing.len()
    }

    /// Returns the number of scripted items not yet consumed.
    pub fn remaining_script(&self) -> usize {
        self.incoming.len()
    }
}

impl WireChannel for ScriptedChannel {
    fn send_token(&mut self, token: Token) -> Result<()> {
        self.outgoing
            .push_back(WireItem::Token(token))
            .map_err(|_| Error::Starved)
    }

    fn send_word(&mut self, word: Word) -> Result<()> {
        self.outgoing
            .push_back(WireItem::Word(word))
            .map_err(|_| Error::Starved)
    }

    fn receive_token(&mut self) -> Result<Token> {
        match self.incoming.pop_front() {
            Some(WireItem::Token(token)) => Ok(token),
            Some(WireItem::Word(_)) => Err(Error::Desync),
            None => Err(Error::Starved),
        }
    }

    fn receive_word(&mut self) -> Result<Word> {
        match self.incoming.pop_front() {
            Some(WireItem::Word(word)) => Ok(word),
            Some(WireItem::Token(_)) => Err(Error::Desync),
            None => Err(Error::Starved),
        }
    }
}
