//! Command-line driver for the `rdt` library: open a serial device, pick a
//! protocol variant, and send or receive a file.
//!
//! Grounded on `original_source/pc/test.cpp`'s `main` (device/baud/protocol
//! selection, then a blocking `send`/`recv` call) and the CLI shape of
//! `devcexx-dxkb`'s `dxkb-split-link-tester`.

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, LevelFilter};

use rdt::error::SessionError;
use rdt::serial_channel::SerialChannel;
use rdt::session::{Mode, Session, SessionConfig};

const PKT_SIZE: usize = 4;
const WINDOW_SIZE: usize = 4;
const QUEUE_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProtocolArg {
    Sr,
    Gbn,
}

impl From<ProtocolArg> for Mode {
    fn from(p: ProtocolArg) -> Mode {
        match p {
            ProtocolArg::Sr => Mode::SelectiveRepeat,
            ProtocolArg::Gbn => Mode::GoBackN,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "rdt", about = "Reliable data transfer over a serial link")]
struct Args {
    /// Serial device path, e.g. /dev/ttyACM0.
    device: String,

    /// Baud rate.
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// Window protocol variant.
    #[arg(long, value_enum, default_value_t = ProtocolArg::Sr)]
    protocol: ProtocolArg,

    /// Base retransmission timeout, milliseconds.
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a file's contents.
    Send {
        /// Path to the file to send; `-` reads stdin.
        path: String,
    },
    /// Receive `len` bytes and write them out.
    Recv {
        /// Number of bytes to receive.
        len: usize,
        /// Path to write the received bytes to; `-` writes stdout.
        #[arg(default_value = "-")]
        path: String,
    },
}

fn run() -> Result<(), SessionError> {
    let args = Args::parse();

    let channel: SerialChannel<PKT_SIZE> = SerialChannel::open(&args.device, args.baud)?;
    let config = SessionConfig {
        mode: args.protocol.into(),
        timeout_ms: args.timeout_ms,
        handshake_attempts: Some(10_000),
        baud: args.baud,
    };
    let mut session: Session<_, PKT_SIZE, WINDOW_SIZE, QUEUE_SIZE> = Session::new(channel, config)?;

    match args.command {
        Command::Send { path } => {
            let data = if path == "-" {
                let mut buf = Vec::new();
                io::stdin().read_to_end(&mut buf).map_err(SessionError::Io)?;
                buf
            } else {
                fs::read(&path).map_err(SessionError::Io)?
            };
            session.send(&data)?;
        }
        Command::Recv { len, path } => {
            let data = session.recv(len)?;
            if path == "-" {
                io::stdout().write_all(&data).map_err(SessionError::Io)?;
            } else {
                fs::write(&path, &data).map_err(SessionError::Io)?;
            }
        }
    }

    session.close()
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: "rdt::cli", "{err}");
            ExitCode::FAILURE
        }
    }
}
