//! The standard protocol engine.
//!
//! An [`Endpoint`] owns one end of a channel and runs the full protocol on
//! it: non-blocking sends with overflow into a local word queue, automatic
//! acknowledgement of received data, and ack-driven draining of the queue.
//! Both ends of a connection run the same engine; the protocol is
//! symmetric.
//!
//! At most one word is in flight per direction. A send while a word is
//! awaiting acknowledgement lands in the queue instead; each arriving ack
//! releases the oldest queued word onto the wire. A send that finds the
//! queue full is rejected with `Ok(false)` and has no effect, which is the
//! flow-control signal callers throttle on.

use core::time::Duration;

use crate::buffer::WordQueue;
use crate::channel::WireChannel;
use crate::clock::Clock;
use crate::error::Result;
use crate::{TOKEN_ACK, TOKEN_DATA, Word};

/// One protocol message, as read off the wire by [`Endpoint::receive_msg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// The peer acknowledged our oldest in-flight word.
    Ack,

    /// The peer sent us a data word.
    Data(Word),
}

/// Running counters kept by an [`Endpoint`].
///
/// Counters are cumulative over the endpoint's lifetime and saturate
/// rather than wrap.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EndpointStats {
    /// Words put on the wire, whether directly or from the queue.
    pub words_sent: u64,

    /// Sends that were deferred into the queue.
    pub words_buffered: u64,

    /// Sends rejected because the queue was full.
    pub sends_rejected: u64,

    /// Data words received from the peer.
    pub words_received: u64,

    /// Acknowledgements sent to the peer.
    pub acks_sent: u64,

    /// Acknowledgements received from the peer.
    pub acks_received: u64,

    /// Acks that arrived with nothing in flight.
    pub unexpected_acks: u64,
}

/// One end of a protocol connection.
///
/// `N` sizes the send queue and must be zero or a power of two of at
/// least 2; `N - 1` words can be buffered. `N = 0` makes a pure receiver
/// whose every send while busy is rejected.
#[derive(Debug)]
pub struct Endpoint<C, const N: usize> {
    channel: C,
    queue: WordQueue<N>,
    in_flight: bool,
    received_word: Word,
    has_received: bool,
    stats: EndpointStats,
}

impl<C: WireChannel, const N: usize> Endpoint<C, N> {
    /// Creates an endpoint over the given channel.
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            queue: WordQueue::new(),
            in_flight: false,
            received_word: 0,
            has_received: false,
            stats: EndpointStats::default(),
        }
    }

    /// Sends `word`, or buffers it if a word is already awaiting
    /// acknowledgement.
    ///
    /// Returns `Ok(true)` when the word was accepted (sent or queued) and
    /// `Ok(false)` when the queue was full, in which case nothing changed
    /// and the caller should drain acknowledgements before retrying.
    pub fn send(&mut self, word: Word) -> Result<bool> {
        if self.in_flight {
            let accepted = self.queue.push(word);
            if accepted {
                self.stats.words_buffered = self.stats.words_buffered.saturating_add(1);
            } else {
                self.stats.sends_rejected = self.stats.sends_rejected.saturating_add(1);
                log::trace!("send of {word} rejected, queue full");
            }
            return Ok(accepted);
        }

        self.transmit(word)?;
        self.in_flight = true;
        Ok(true)
    }

    fn transmit(&mut self, word: Word) -> Result<()> {
        self.channel.send_token(TOKEN_DATA)?;
        self.channel.send_word(word)?;
        self.stats.words_sent = self.stats.words_sent.saturating_add(1);
        Ok(())
    }

    /// Receives the next message from the peer, suspending until one
    /// arrives.
    ///
    /// This only reads the wire; pass the result to [`handle_msg`] to run
    /// the protocol reaction. Splitting the two lets a caller multiplex
    /// the channel receive with other event sources.
    ///
    /// [`handle_msg`]: Endpoint::handle_msg
    pub fn receive_msg(&mut self) -> Result<Message> {
        let token = self.channel.receive_token()?;
        if token == TOKEN_DATA {
            let word = self.channel.receive_word()?;
            Ok(Message::Data(word))
        } else {
            Ok(Message::Ack)
        }
    }

    /// Runs the protocol reaction to a received message.
    ///
    /// For a data message the word is stored for [`received_data`] and an
    /// acknowledgement goes back to the peer; returns `Ok(true)`. For an
    /// ack the oldest queued word (if any) goes out on the wire; returns
    /// `Ok(false)`. An ack with nothing in flight is counted and ignored.
    ///
    /// [`received_data`]: Endpoint::received_data
    pub fn handle_msg(&mut self, msg: Message) -> Result<bool> {
        match msg {
            Message::Data(word) => {
                self.received_word = word;
                self.has_received = true;
                self.stats.words_received = self.stats.words_received.saturating_add(1);
                self.channel.send_token(TOKEN_ACK)?;
                self.stats.acks_sent = self.stats.acks_sent.saturating_add(1);
                Ok(true)
            }
            Message::Ack => {
                if !self.in_flight {
                    self.stats.unexpected_acks = self.stats.unexpected_acks.saturating_add(1);
                    log::warn!("acknowledgement received with no word in flight");
                    return Ok(false);
                }
                self.stats.acks_received = self.stats.acks_received.saturating_add(1);
                if self.queue.is_empty() {
                    self.in_flight = false;
                } else {
                    let word = self.queue.pop();
                    self.transmit(word)?;
                }
                Ok(false)
            }
        }
    }

    /// Receives one message and handles it.
    ///
    /// Returns `Ok(true)` when the message carried data, which is now
    /// readable through [`received_data`].
    ///
    /// [`received_data`]: Endpoint::received_data
    pub fn receive_and_handle(&mut self) -> Result<bool> {
        let msg = self.receive_msg()?;
        self.handle_msg(msg)
    }

    /// Returns the most recently received word.
    ///
    /// Only meaningful after a receive reported data; the value persists
    /// until the next data message overwrites it.
    pub fn received_data(&self) -> Word {
        debug_assert!(self.has_received, "no data received yet");
        self.received_word
    }

    /// Returns the number of words accepted but not yet acknowledged.
    ///
    /// Counts the in-flight word and everything in the queue. Zero means
    /// the peer has acknowledged every word we ever accepted.
    pub fn pending_words_to_send(&self) -> usize {
        self.queue.len() + usize::from(self.in_flight)
    }

    /// Returns the number of further [`send`] calls guaranteed to succeed.
    ///
    /// This is the queue's free room, independent of whether a word is in
    /// flight; the in-flight word occupies the wire, not a queue slot. An
    /// idle endpoint can accept one word beyond this figure, since its
    /// first send bypasses the queue.
    ///
    /// [`send`]: Endpoint::send
    pub fn sending_capacity(&self) -> usize {
        self.queue.room()
    }

    /// Returns whether a word is on the wire awaiting acknowledgement.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Discards every queued word.
    ///
    /// The in-flight word, if any, is beyond recall and its
    /// acknowledgement is still expected; only the words not yet on the
    /// wire are dropped.
    pub fn drop_buffered(&mut self) {
        self.queue.clear();
    }

    /// Blocks until the peer has acknowledged every accepted word.
    ///
    /// Incoming data messages are handled (and acknowledged) along the
    /// way but their words are overwritten by later arrivals; a caller
    /// that cares about received data should drain with
    /// [`receive_and_handle`] instead.
    ///
    /// [`receive_and_handle`]: Endpoint::receive_and_handle
    pub fn flush(&mut self) -> Result<()> {
        while self.pending_words_to_send() > 0 {
            self.receive_and_handle()?;
        }
        Ok(())
    }

    /// Drains acknowledgements for at most `budget` of wall-clock time.
    ///
    /// Returns once everything pending is acknowledged or the budget is
    /// spent, whichever comes first. Individual receives still block, so
    /// the budget is checked between messages rather than cutting one
    /// short.
    pub fn handle_outgoing_traffic(&mut self, clock: &impl Clock, budget: Duration) -> Result<()> {
        let deadline = clock.now() + budget;
        while self.pending_words_to_send() > 0 && clock.now() < deadline {
            self.receive_and_handle()?;
        }
        Ok(())
    }

    /// Returns the endpoint's counters.
    pub fn stats(&self) -> &EndpointStats {
        &self.stats
    }

    /// Returns a reference to the underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Returns a mutable reference to the underlying channel.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Consumes the endpoint and returns the underlying channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ScriptedChannel, WireItem};
    use crate::clock::ManualClock;

    fn endpoint<const N: usize>() -> Endpoint<ScriptedChannel, N> {
        Endpoint::new(ScriptedChannel::new())
    }

    fn assert_sent_data(channel: &mut ScriptedChannel, word: Word) {
        assert_eq!(channel.take_outgoing(), Some(WireItem::Token(TOKEN_DATA)));
        assert_eq!(channel.take_outgoing(), Some(WireItem::Word(word)));
    }

    #[test]
    fn test_idle_send_goes_straight_to_the_wire() {
        let mut ep = endpoint::<4>();

        assert!(ep.send(11).unwrap());
        assert!(ep.in_flight());
        assert_eq!(ep.pending_words_to_send(), 1);
        assert_sent_data(ep.channel_mut(), 11);
        assert_eq!(ep.channel_mut().take_outgoing(), None);
    }

    #[test]
    fn test_busy_send_is_buffered() {
        let mut ep = endpoint::<4>();

        assert!(ep.send(1).unwrap());
        assert!(ep.send(2).unwrap());
        assert!(ep.send(3).unwrap());

        assert_eq!(ep.pending_words_to_send(), 3);
        assert_sent_data(ep.channel_mut(), 1);
        assert_eq!(ep.channel_mut().take_outgoing(), None);
        assert_eq!(ep.stats().words_sent, 1);
        assert_eq!(ep.stats().words_buffered, 2);
    }

    #[test]
    fn test_overflowing_send_is_rejected_without_effect() {
        let mut ep = endpoint::<2>();

        assert!(ep.send(1).unwrap());
        assert!(ep.send(2).unwrap());

        let before = ep.pending_words_to_send();
        assert!(!ep.send(3).unwrap());
        assert_eq!(ep.pending_words_to_send(), before);
        assert_eq!(ep.stats().sends_rejected, 1);
    }

    #[test]
    fn test_zero_sized_endpoint_rejects_any_busy_send() {
        let mut ep = endpoint::<0>();
        assert_eq!(ep.sending_capacity(), 0);

        assert!(ep.send(1).unwrap());
        assert!(!ep.send(2).unwrap());
    }

    #[test]
    fn test_ack_releases_the_oldest_queued_word() {
        let mut ep = endpoint::<4>();

        ep.send(1).unwrap();
        ep.send(2).unwrap();
        ep.send(3).unwrap();
        assert_sent_data(ep.channel_mut(), 1);

        ep.channel_mut().script_ack();
        assert!(!ep.receive_and_handle().unwrap());
        assert_sent_data(ep.channel_mut(), 2);
        assert!(ep.in_flight());
        assert_eq!(ep.pending_words_to_send(), 2);

        ep.channel_mut().script_ack();
        ep.receive_and_handle().unwrap();
        assert_sent_data(ep.channel_mut(), 3);

        ep.channel_mut().script_ack();
        ep.receive_and_handle().unwrap();
        assert!(!ep.in_flight());
        assert_eq!(ep.pending_words_to_send(), 0);
        assert_eq!(ep.stats().words_sent, 3);
        assert_eq!(ep.stats().acks_received, 3);
    }

    #[test]
    fn test_received_data_is_acknowledged_automatically() {
        let mut ep = endpoint::<4>();

        ep.channel_mut().script_data(99);
        assert!(ep.receive_and_handle().unwrap());
        assert_eq!(ep.received_data(), 99);
        assert_eq!(ep.channel_mut().take_outgoing(), Some(WireItem::Token(TOKEN_ACK)));
        assert_eq!(ep.stats().words_received, 1);
        assert_eq!(ep.stats().acks_sent, 1);
    }

    #[test]
    fn test_later_data_overwrites_earlier() {
        let mut ep = endpoint::<4>();

        ep.channel_mut().script_data(1);
        ep.channel_mut().script_data(2);
        ep.receive_and_handle().unwrap();
        ep.receive_and_handle().unwrap();

        assert_eq!(ep.received_data(), 2);
    }

    #[test]
    fn test_unexpected_ack_is_counted_and_ignored() {
        let mut ep = endpoint::<4>();

        ep.channel_mut().script_ack();
        assert!(!ep.receive_and_handle().unwrap());
        assert!(!ep.in_flight());
        assert_eq!(ep.stats().unexpected_acks, 1);
        assert_eq!(ep.stats().acks_received, 0);
    }

    #[test]
    fn test_drop_buffered_spares_the_in_flight_word() {
        let mut ep = endpoint::<4>();

        ep.send(1).unwrap();
        ep.send(2).unwrap();
        ep.send(3).unwrap();

        ep.drop_buffered();
        assert_eq!(ep.pending_words_to_send(), 1);
        assert!(ep.in_flight());

        ep.channel_mut().script_ack();
        ep.receive_and_handle().unwrap();
        assert_eq!(ep.pending_words_to_send(), 0);
    }

    #[test]
    fn test_capacity_accounting_is_conserved() {
        let mut ep = endpoint::<8>();
        assert_eq!(ep.sending_capacity(), 7);

        // Occupancy conservation: free room plus queued words is a
        // constant; the in-flight word lives on the wire, not in a slot.
        for word in 0..5 {
            ep.send(word).unwrap();
            let queued = ep.pending_words_to_send() - usize::from(ep.in_flight());
            assert_eq!(ep.sending_capacity() + queued, 7, "after sending {word}");
        }
    }

    #[test]
    fn test_flush_drains_everything_pending() {
        let mut ep = endpoint::<4>();

        ep.send(1).unwrap();
        ep.send(2).unwrap();
        ep.channel_mut().script_ack();
        ep.channel_mut().script_ack();

        ep.flush().unwrap();
        assert_eq!(ep.pending_words_to_send(), 0);
        assert_eq!(ep.channel_mut().remaining_script(), 0);
    }

    #[test]
    fn test_flush_handles_interleaved_data() {
        let mut ep = endpoint::<4>();

        ep.send(1).unwrap();
        ep.channel_mut().script_data(42);
        ep.channel_mut().script_ack();

        ep.flush().unwrap();
        assert_eq!(ep.received_data(), 42);
        assert_eq!(ep.stats().acks_sent, 1);
    }

    #[test]
    fn test_budgeted_drain_stops_at_the_deadline() {
        let mut ep = endpoint::<8>();

        for word in 0..5 {
            ep.send(word).unwrap();
        }
        for _ in 0..5 {
            ep.channel_mut().script_ack();
        }

        // Reading the deadline consumes one 10 ms step; two iterations fit
        // inside the 25 ms budget before the third check sees 30 ms.
        let clock = ManualClock::with_step(Duration::from_millis(10));
        ep.handle_outgoing_traffic(&clock, Duration::from_millis(25))
            .unwrap();

        assert_eq!(ep.pending_words_to_send(), 3);
        assert_eq!(ep.channel_mut().remaining_script(), 3);
    }

    #[test]
    fn test_budgeted_drain_returns_early_when_done() {
        let mut ep = endpoint::<4>();

        ep.send(7).unwrap();
        ep.channel_mut().script_ack();

        let clock = ManualClock::new();
        ep.handle_outgoing_traffic(&clock, Duration::from_secs(1))
            .unwrap();
        assert_eq!(ep.pending_words_to_send(), 0);
    }
}
