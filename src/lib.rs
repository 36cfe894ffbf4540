//! Reliable data transfer over an unreliable, frame-oriented serial link.
//!
//! This crate implements two sliding-window ARQ protocols, Selective
//! Repeat and Go-Back-N, on top of a small trait boundary
//! ([`physical::PhysicalChannel`]) that stands in for a real serial port.
//! A [`session::Session`] owns one channel, runs the connect handshake,
//! and drives whichever window state machine [`session::Mode`] selects
//! until the requested bytes have been transferred.
//!
//! ```no_run
//! use rdt::session::{Mode, Session, SessionConfig};
//! use rdt::serial_channel::SerialChannel;
//!
//! # fn main() -> Result<(), rdt::error::SessionError> {
//! let channel: SerialChannel<1> = SerialChannel::open("/dev/ttyUSB0", 9600)?;
//! let mut session: Session<_, 1, 4, 8> = Session::new(channel, SessionConfig::default())?;
//! session.send(b"hello")?;
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod fault;
pub mod gbn;
pub mod loopback;
pub mod mpsc_channel;
pub mod physical;
pub mod queue;
pub mod serial_channel;
pub mod session;
pub mod sr;
pub mod timer;
pub mod window;
pub mod wire;

pub use error::SessionError;
pub use session::{Mode, Session, SessionConfig};
