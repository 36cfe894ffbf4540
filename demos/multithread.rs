//! Thread-paired sender and receiver over an `mpsc`-backed channel.
//! Grounded on the teacher's `examples/multithread.rs`, which pairs two
//! `min::Context`s across `std::sync::mpsc::channel` the same way.

use std::thread;

use log::LevelFilter;

use rdt::mpsc_channel::pair;
use rdt::session::{Mode, Session, SessionConfig};

fn main() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .init();

    let (a, b) = pair::<1>();
    let data = b"hello from the sender thread".to_vec();
    let expected = data.clone();

    let config = SessionConfig {
        mode: Mode::SelectiveRepeat,
        timeout_ms: 50,
        handshake_attempts: Some(10_000),
        baud: 9600,
    };

    let sender = thread::Builder::new()
        .name("sender".into())
        .spawn(move || {
            let mut session: Session<_, 1, 4, 8> = Session::new(a, config).unwrap();
            session.send(&data).unwrap();
        })
        .unwrap();

    let mut receiver: Session<_, 1, 4, 8> = Session::new(b, config).unwrap();
    let received = receiver.recv(expected.len()).unwrap();

    sender.join().unwrap();

    println!("received: {}", String::from_utf8_lossy(&received));
    assert_eq!(received, expected);
}
