//! Paired-word streaming example.
//!
//! This example shows how to:
//! - Stream word pairs one way with the paired-word fast path
//! - Throttle the sender on acknowledgements when its queue fills
//! - Receive and acknowledge pairs with a stateless receiver
//!
//! Run with: cargo run --example paired_stream --features std

use std::thread;

use nbsp::channel::channel_pair;
use nbsp::{PairedReceiver, PairedSender, Word};

const PAIR_COUNT: Word = 1000;

fn main() {
    println!("=== NBSP Paired Stream Example ===\n");

    let (forward, backward) = channel_pair();
    let mut sender: PairedSender<_, 16> = PairedSender::new(forward);
    let mut receiver = PairedReceiver::new(backward);

    println!("Streaming {} pairs (index, index squared)...", PAIR_COUNT);

    let handle = thread::spawn(move || {
        let mut index: Word = 0;
        while index < PAIR_COUNT {
            if sender
                .send_pair(index, index.wrapping_mul(index))
                .expect("send failed")
            {
                index += 1;
            } else {
                sender.handle_ack().expect("ack failed");
            }
        }
        sender.flush().expect("flush failed");
    });

    let mut valid = 0;
    for expected in 0..PAIR_COUNT {
        let (first, second) = receiver.receive_pair().expect("receive failed");
        if first == expected && second == expected.wrapping_mul(expected) {
            valid += 1;
        }
    }

    handle.join().expect("sender panicked");

    println!("Received {} pairs, {} valid.", PAIR_COUNT, valid);
    println!("\nDone.");
}
