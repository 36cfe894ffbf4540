//! Send a fixed payload out a real serial device. Grounded on the
//! teacher's `examples/real_uart_on_linux.rs`, which opens a hardware
//! UART and drives it the same way this opens a [`SerialChannel`].

use log::LevelFilter;

use rdt::serial_channel::SerialChannel;
use rdt::session::{Mode, Session, SessionConfig};

const SERIAL_PORT: &str = "/dev/ttyUSB0";
const BAUD_RATE: u32 = 115_200;

fn main() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Debug)
        .init();

    let channel: SerialChannel<1> = SerialChannel::open(SERIAL_PORT, BAUD_RATE)
        .expect("failed to open serial port");

    let config = SessionConfig {
        mode: Mode::SelectiveRepeat,
        timeout_ms: 1000,
        handshake_attempts: Some(10_000),
        baud: BAUD_RATE,
    };
    let mut session: Session<_, 1, 4, 8> =
        Session::new(channel, config).expect("session setup failed");

    session.send(b"ping").expect("send failed");
    println!("sent ping");
}
