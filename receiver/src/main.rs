use log::info;
use std::collections::VecDeque;
use std::os::unix::net::UnixListener;
use std::time::Instant;

use nbsp::channel::StreamChannel;
use nbsp::{Endpoint, Error, Word};

const DEFAULT_SOCKET_PATH: &str = "/tmp/nbsp.sock";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let socket_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SOCKET_PATH.to_string());

    let _ = std::fs::remove_file(&socket_path);
    info!("Starting receiver on {}...", socket_path);
    let listener = UnixListener::bind(&socket_path).expect("Failed to bind to socket");
    info!("Receiver listening on {}", socket_path);

    let (stream, _) = listener.accept().expect("Failed to accept connection");
    info!("Sender connected");

    let mut endpoint: Endpoint<_, 256> = Endpoint::new(StreamChannel::new(stream));
    let mut backlog: VecDeque<Word> = VecDeque::new();
    let start = Instant::now();

    loop {
        match endpoint.receive_and_handle() {
            Ok(true) => backlog.push_back(endpoint.received_data()),
            Ok(false) => {}
            Err(Error::Disconnected) => {
                info!("Sender disconnected");
                break;
            }
            Err(err) => panic!("Channel failure: {}", err),
        }

        // Echo as much of the backlog as the send queue will take.
        while let Some(&word) = backlog.front() {
            if endpoint.send(word).expect("Failed to echo word") {
                backlog.pop_front();
            } else {
                break;
            }
        }
    }

    let elapsed = start.elapsed();
    let stats = endpoint.stats();
    let speed = (stats.words_received as f64) / elapsed.as_secs_f64();

    info!("=== Session Complete ===");
    info!("Words received: {}", stats.words_received);
    info!("Words echoed: {}", stats.words_sent);
    info!("Acks sent: {}", stats.acks_sent);
    info!("Time: {:.2} seconds", elapsed.as_secs_f64());
    info!("Speed: {:.0} words/s", speed);
}
