//! Hardware-free demo: a sender and a receiver sharing an in-memory
//! loopback channel, stepped by hand on a single thread. Grounded on the
//! teacher's `examples/no_transport.rs`, which wires a loopback `Uart`
//! fixture straight into a single-process demo the same way.

use log::LevelFilter;

use rdt::engine::Engine;
use rdt::loopback::pair;
use rdt::sr;
use rdt::window::{AppIo, WindowState};

const MAX_SEQ: u8 = 7;
const WINDOW_SIZE: usize = 4;
const QUEUE_SIZE: usize = 8;

fn main() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .init();

    let (sender_chan, receiver_chan) = pair::<1>();
    let mut sender_engine: Engine<_, 1, WINDOW_SIZE, QUEUE_SIZE> =
        Engine::new(sender_chan, 100, MAX_SEQ, "rdt::demo::sender");
    let mut receiver_engine: Engine<_, 1, WINDOW_SIZE, QUEUE_SIZE> =
        Engine::new(receiver_chan, 100, MAX_SEQ, "rdt::demo::receiver");

    let data = b"hello, rdt".to_vec();
    println!("sending {} bytes: {data:?}", data.len());

    let mut sender_state: WindowState<1, WINDOW_SIZE> = WindowState::new(data.len());
    let mut receiver_state: WindowState<1, WINDOW_SIZE> = WindowState::new(data.len());
    let mut sender_app = AppIo::new(&data);
    let mut receiver_app = AppIo::new(&[]);

    sender_engine.set_send_ready(sender_state.send_window_open());

    while !(sender_state.end && receiver_state.end) {
        sr::step(&mut sender_engine, &mut sender_state, &mut sender_app, MAX_SEQ);
        sender_engine.set_send_ready(sender_state.send_window_open());
        sr::step(&mut receiver_engine, &mut receiver_state, &mut receiver_app, MAX_SEQ);
    }

    let received = receiver_app.into_output();
    println!("received {} bytes: {received:?}", received.len());
    assert_eq!(received, data);
}
