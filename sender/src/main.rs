use log::info;
use std::os::unix::net::UnixStream;
use std::time::Instant;

use nbsp::channel::StreamChannel;
use nbsp::{Endpoint, Word};

const DEFAULT_WORD_COUNT: Word = 65536;
const DEFAULT_SOCKET_PATH: &str = "/tmp/nbsp.sock";

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let socket_path = args.next().unwrap_or_else(|| DEFAULT_SOCKET_PATH.to_string());
    let word_count: Word = match args.next() {
        Some(count) => count.parse().expect("word count must be a number"),
        None => DEFAULT_WORD_COUNT,
    };

    info!("Connecting to receiver at {}...", socket_path);
    let stream = UnixStream::connect(&socket_path).expect("Failed to connect to receiver");
    info!("Connected!");

    let mut endpoint: Endpoint<_, 256> = Endpoint::new(StreamChannel::new(stream));

    info!("Sending {} words and collecting echoes...", word_count);
    let start = Instant::now();

    let mut next_word: Word = 0;
    let mut echoes_seen: Word = 0;
    let mut mismatches: u64 = 0;

    while next_word < word_count {
        if endpoint.send(next_word).expect("Failed to send word") {
            next_word += 1;
        } else {
            // Queue full: drain acknowledgements and echoes, then retry.
            if endpoint
                .receive_and_handle()
                .expect("Failed to receive from receiver")
            {
                if endpoint.received_data() != echoes_seen {
                    mismatches += 1;
                }
                echoes_seen += 1;
            }
        }
    }

    // Everything is accepted; wait for the remaining echoes and acks.
    while echoes_seen < word_count || endpoint.pending_words_to_send() > 0 {
        if endpoint
            .receive_and_handle()
            .expect("Failed to receive from receiver")
        {
            if endpoint.received_data() != echoes_seen {
                mismatches += 1;
            }
            echoes_seen += 1;
        }
    }

    let elapsed = start.elapsed();
    let speed = (word_count as f64) / elapsed.as_secs_f64();

    if mismatches == 0 {
        info!("All {} echoes match", echoes_seen);
    } else {
        info!("{} of {} echoes did not match", mismatches, echoes_seen);
    }

    let stats = endpoint.stats();
    info!("=== Transfer Complete ===");
    info!("Words sent: {}", stats.words_sent);
    info!("Words buffered: {}", stats.words_buffered);
    info!("Sends rejected: {}", stats.sends_rejected);
    info!("Time: {:.2} seconds", elapsed.as_secs_f64());
    info!("Speed: {:.0} round-tripped words/s", speed);
}
