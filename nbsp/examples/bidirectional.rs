//! Bidirectional exchange example.
//!
//! This example shows how to:
//! - Connect two endpoints with an in-process channel pair
//! - Send from both sides at once without blocking on the peer
//! - Drain acknowledgements and incoming data with one receive loop
//!
//! Run with: cargo run --example bidirectional --features std

use std::thread;

use nbsp::channel::{ThreadChannel, channel_pair};
use nbsp::{Endpoint, Result, Word};

const WORDS_PER_SIDE: Word = 100;

/// Sends `WORDS_PER_SIDE` words starting at `base` while collecting the
/// words the peer sends, and returns the collected words in order.
fn run_side(mut endpoint: Endpoint<ThreadChannel, 8>, base: Word) -> Result<Vec<Word>> {
    let mut received = Vec::new();
    let mut sent: Word = 0;

    while sent < WORDS_PER_SIDE {
        if endpoint.send(base + sent)? {
            sent += 1;
        } else if endpoint.receive_and_handle()? {
            received.push(endpoint.received_data());
        }
    }

    while (received.len() as Word) < WORDS_PER_SIDE || endpoint.pending_words_to_send() > 0 {
        if endpoint.receive_and_handle()? {
            received.push(endpoint.received_data());
        }
    }

    Ok(received)
}

fn main() {
    println!("=== NBSP Bidirectional Example ===\n");

    let (left, right) = channel_pair();
    let left_endpoint: Endpoint<_, 8> = Endpoint::new(left);
    let right_endpoint: Endpoint<_, 8> = Endpoint::new(right);

    println!(
        "Each side sends {} words while receiving the peer's {}.",
        WORDS_PER_SIDE, WORDS_PER_SIDE
    );

    let handle = thread::spawn(move || run_side(right_endpoint, 1000));
    let left_received = run_side(left_endpoint, 0).expect("left side failed");
    let right_received = handle
        .join()
        .expect("right side panicked")
        .expect("right side failed");

    let left_ok = left_received == (1000..1000 + WORDS_PER_SIDE).collect::<Vec<_>>();
    let right_ok = right_received == (0..WORDS_PER_SIDE).collect::<Vec<_>>();

    println!("Left received {} words, in order: {}", left_received.len(), left_ok);
    println!("Right received {} words, in order: {}", right_received.len(), right_ok);
    println!("\nDone.");
}
