//! The streaming paired-word variant.
//!
//! A one-way fast path for bulk transfer: words travel in pairs with no
//! token in the forward direction, and the receiver acknowledges each pair
//! with a single token. Skipping the per-word token roughly halves the
//! channel traffic per payload word compared to the standard engine.
//!
//! The variant is asymmetric. [`PairedSender`] carries the queue and the
//! flow-control state; [`PairedReceiver`] is stateless. A channel carrying
//! this variant must not also carry standard-engine traffic, since the
//! receiver commits to reading bare words.

use crate::buffer::WordQueue;
use crate::channel::WireChannel;
use crate::error::Result;
use crate::{TOKEN_ACK, Word};

/// Channel-word cost of one in-flight pair.
const PAIR_WORDS: usize = 2;

/// The sending half of a paired-word stream.
///
/// `N` sizes the queue in words and must be zero or a power of two of at
/// least 2. Accounting is in words throughout, so one unacknowledged pair
/// counts as two pending words and a buffered pair occupies two queue
/// slots.
#[derive(Debug)]
pub struct PairedSender<C, const N: usize> {
    channel: C,
    queue: WordQueue<N>,
    words_unacknowledged: usize,
}

impl<C: WireChannel, const N: usize> PairedSender<C, N> {
    /// Creates a sender over the given channel.
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            queue: WordQueue::new(),
            words_unacknowledged: 0,
        }
    }

    /// Sends a pair of words, or buffers both if a pair is already
    /// awaiting acknowledgement.
    ///
    /// Returns `Ok(false)` when the queue lacks room for both words, in
    /// which case neither is accepted; a pair is never split.
    pub fn send_pair(&mut self, first: Word, second: Word) -> Result<bool> {
        if self.words_unacknowledged == 0 {
            self.channel.send_word(first)?;
            self.channel.send_word(second)?;
            self.words_unacknowledged = PAIR_WORDS;
            return Ok(true);
        }

        if self.queue.room() < PAIR_WORDS {
            log::trace!("pair ({first}, {second}) rejected, queue lacks room");
            return Ok(false);
        }
        let pushed = self.queue.push(first) && self.queue.push(second);
        debug_assert!(pushed);
        Ok(true)
    }

    /// Receives one acknowledgement, suspending until it arrives, and
    /// releases the next buffered pair onto the wire if one is queued.
    ///
    /// An acknowledgement with nothing unacknowledged is logged and
    /// ignored.
    pub fn handle_ack(&mut self) -> Result<()> {
        self.channel.receive_token()?;

        if self.words_unacknowledged == 0 {
            log::warn!("pair acknowledgement received with nothing in flight");
            return Ok(());
        }

        if self.queue.len() >= PAIR_WORDS {
            let first = self.queue.pop();
            let second = self.queue.pop();
            self.channel.send_word(first)?;
            self.channel.send_word(second)?;
        } else {
            self.words_unacknowledged = 0;
        }
        Ok(())
    }

    /// Returns the number of words accepted but not yet acknowledged.
    pub fn pending_words_to_send(&self) -> usize {
        self.queue.len() + self.words_unacknowledged
    }

    /// Returns the queue's free room in words, the same accounting the
    /// standard engine uses.
    ///
    /// Pairs are never split, so a trailing odd word of room cannot be
    /// used; [`send_pair`] succeeds whenever this is at least 2, and also
    /// whenever nothing is unacknowledged (the immediate path bypasses
    /// the queue).
    ///
    /// [`send_pair`]: PairedSender::send_pair
    pub fn sending_capacity(&self) -> usize {
        self.queue.room()
    }

    /// Blocks until the peer has acknowledged every accepted pair.
    pub fn flush(&mut self) -> Result<()> {
        while self.pending_words_to_send() > 0 {
            self.handle_ack()?;
        }
        Ok(())
    }

    /// Returns a reference to the underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Returns a mutable reference to the underlying channel.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Consumes the sender and returns the underlying channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}

/// The receiving half of a paired-word stream.
#[derive(Debug)]
pub struct PairedReceiver<C> {
    channel: C,
}

impl<C: WireChannel> PairedReceiver<C> {
    /// Creates a receiver over the given channel.
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Receives one pair of words, suspending until both arrive, and
    /// acknowledges the pair.
    pub fn receive_pair(&mut self) -> Result<(Word, Word)> {
        let first = self.channel.receive_word()?;
        let second = self.channel.receive_word()?;
        self.channel.send_token(TOKEN_ACK)?;
        Ok((first, second))
    }

    /// Returns a reference to the underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Returns a mutable reference to the underlying channel.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Consumes the receiver and returns the underlying channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ScriptedChannel, WireItem};

    fn sender<const N: usize>() -> PairedSender<ScriptedChannel, N> {
        PairedSender::new(ScriptedChannel::new())
    }

    fn assert_sent_pair(channel: &mut ScriptedChannel, first: Word, second: Word) {
        assert_eq!(channel.take_outgoing(), Some(WireItem::Word(first)));
        assert_eq!(channel.take_outgoing(), Some(WireItem::Word(second)));
    }

    #[test]
    fn test_idle_pair_goes_straight_to_the_wire() {
        let mut tx = sender::<4>();

        assert!(tx.send_pair(1, 2).unwrap());
        assert_eq!(tx.pending_words_to_send(), 2);
        assert_sent_pair(tx.channel_mut(), 1, 2);
        assert_eq!(tx.channel_mut().take_outgoing(), None);
    }

    #[test]
    fn test_busy_pair_is_buffered_whole() {
        let mut tx = sender::<8>();

        tx.send_pair(1, 2).unwrap();
        assert!(tx.send_pair(3, 4).unwrap());

        assert_eq!(tx.pending_words_to_send(), 4);
        assert_sent_pair(tx.channel_mut(), 1, 2);
        assert_eq!(tx.channel_mut().take_outgoing(), None);
    }

    #[test]
    fn test_pair_is_rejected_when_one_slot_remains() {
        let mut tx = sender::<4>();

        tx.send_pair(1, 2).unwrap();
        tx.send_pair(3, 4).unwrap();

        // Queue has 3 usable slots, 2 occupied; one free slot cannot
        // hold a pair.
        let before = tx.pending_words_to_send();
        assert!(!tx.send_pair(5, 6).unwrap());
        assert_eq!(tx.pending_words_to_send(), before);
    }

    #[test]
    fn test_ack_releases_the_next_buffered_pair() {
        let mut tx = sender::<8>();

        tx.send_pair(1, 2).unwrap();
        tx.send_pair(3, 4).unwrap();
        assert_sent_pair(tx.channel_mut(), 1, 2);

        tx.channel_mut().script_ack();
        tx.handle_ack().unwrap();
        assert_sent_pair(tx.channel_mut(), 3, 4);
        assert_eq!(tx.pending_words_to_send(), 2);

        tx.channel_mut().script_ack();
        tx.handle_ack().unwrap();
        assert_eq!(tx.pending_words_to_send(), 0);
    }

    #[test]
    fn test_unexpected_ack_is_ignored() {
        let mut tx = sender::<4>();

        tx.channel_mut().script_ack();
        tx.handle_ack().unwrap();
        assert_eq!(tx.pending_words_to_send(), 0);
    }

    #[test]
    fn test_capacity_counts_words() {
        let mut tx = sender::<8>();
        assert_eq!(tx.sending_capacity(), 7);

        // The immediate send occupies the wire, not the queue.
        tx.send_pair(1, 2).unwrap();
        assert_eq!(tx.sending_capacity(), 7);

        tx.send_pair(3, 4).unwrap();
        assert_eq!(tx.sending_capacity(), 5);
    }

    #[test]
    fn test_flush_drains_every_pair() {
        let mut tx = sender::<8>();

        tx.send_pair(1, 2).unwrap();
        tx.send_pair(3, 4).unwrap();
        tx.send_pair(5, 6).unwrap();
        tx.channel_mut().script_ack();
        tx.channel_mut().script_ack();
        tx.channel_mut().script_ack();

        tx.flush().unwrap();
        assert_eq!(tx.pending_words_to_send(), 0);
        assert_eq!(tx.channel_mut().remaining_script(), 0);
    }

    #[test]
    fn test_receiver_acknowledges_each_pair() {
        let mut rx = PairedReceiver::new(ScriptedChannel::new());
        rx.channel_mut().script(WireItem::Word(10));
        rx.channel_mut().script(WireItem::Word(20));

        assert_eq!(rx.receive_pair().unwrap(), (10, 20));
        assert_eq!(
            rx.channel_mut().take_outgoing(),
            Some(WireItem::Token(TOKEN_ACK))
        );
    }
}
