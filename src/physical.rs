//! The physical-channel boundary: framed byte transport, specified only by
//! the interface the protocol engine uses. Real hardware, an in-memory
//! loopback, and a fault-injecting test wrapper all implement this trait.

use std::io;
use std::time::Duration;

use crate::wire::Frame;

/// Role used during the connect handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Sender,
    Receiver,
}

/// A framed, non-blocking, point-to-point byte transport.
pub trait PhysicalChannel<const PKT_SIZE: usize> {
    /// Initialize the channel at the given baud rate.
    fn init(&mut self, baud: u32) -> io::Result<()>;

    /// Run one attempt of the connect handshake. Returns `true` once the
    /// handshake has completed; the caller spins until it does.
    fn connect(&mut self, role: Role) -> io::Result<bool>;

    /// Transmit one frame. Short writes are a channel-level error.
    fn send(&mut self, frame: &Frame<PKT_SIZE>) -> io::Result<()>;

    /// Non-blocking receive: fill as many whole frames as are available
    /// into `frames`, returning how many were written. A transient
    /// read failure is reported as `Ok(0)`, not an error (non-fatal,
    /// per the engine's enqueue contract).
    fn recv(&mut self, frames: &mut [Frame<PKT_SIZE>]) -> usize;

    /// Monotonic millisecond tick source shared by the timer subsystem.
    fn tick(&self) -> u64;

    /// Discard any buffered input for up to `timeout`.
    fn flush(&mut self, timeout: Duration);

    /// Release the channel.
    fn close(&mut self) -> io::Result<()>;
}

/// Handshake sentinel byte exchanged once, receiver -> sender.
pub const CONNECT: u8 = 73;
