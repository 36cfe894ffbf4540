//! A [`PhysicalChannel`] over a pair of `std::sync::mpsc` byte channels,
//! for running sender and receiver on separate threads without real
//! hardware. Grounded on the teacher's `examples/multithread.rs`, which
//! wires two `min::Context`s together the same way.

use std::io;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

use crate::physical::{PhysicalChannel, Role, CONNECT};
use crate::wire::Frame;

pub struct MpscChannel<const PKT_SIZE: usize> {
    tx: Sender<u8>,
    rx: Receiver<u8>,
    /// Bytes pulled off `rx` that don't yet add up to a whole frame.
    pending: Vec<u8>,
    origin: Instant,
}

impl<const PKT_SIZE: usize> MpscChannel<PKT_SIZE> {
    pub fn new(tx: Sender<u8>, rx: Receiver<u8>) -> Self {
        MpscChannel {
            tx,
            rx,
            pending: Vec::new(),
            origin: Instant::now(),
        }
    }
}

impl<const PKT_SIZE: usize> PhysicalChannel<PKT_SIZE> for MpscChannel<PKT_SIZE> {
    fn init(&mut self, _baud: u32) -> io::Result<()> {
        Ok(())
    }

    fn connect(&mut self, role: Role) -> io::Result<bool> {
        match role {
            Role::Sender => match self.rx.try_recv() {
                Ok(byte) if byte == CONNECT => Ok(true),
                Ok(_) | Err(TryRecvError::Empty) => Ok(false),
                Err(TryRecvError::Disconnected) => {
                    Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer disconnected"))
                }
            },
            Role::Receiver => {
                let _ = self.tx.send(CONNECT);
                Ok(true)
            }
        }
    }

    fn send(&mut self, frame: &Frame<PKT_SIZE>) -> io::Result<()> {
        let mut buf = vec![0u8; Frame::<PKT_SIZE>::WIRE_SIZE];
        frame.to_bytes(&mut buf);
        for byte in buf {
            self.tx
                .send(byte)
                .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))?;
        }
        Ok(())
    }

    fn recv(&mut self, frames: &mut [Frame<PKT_SIZE>]) -> usize {
        while let Ok(byte) = self.rx.try_recv() {
            self.pending.push(byte);
        }
        let wire_size = Frame::<PKT_SIZE>::WIRE_SIZE;
        let mut n = 0;
        let mut consumed = 0;
        while n < frames.len() && self.pending.len() - consumed >= wire_size {
            if let Some(f) = Frame::<PKT_SIZE>::from_bytes(&self.pending[consumed..consumed + wire_size]) {
                frames[n] = f;
                n += 1;
            }
            // An unparseable frame kind is dropped and scanning continues,
            // matching the loopback channel's discard-on-decode-failure
            // contract.
            consumed += wire_size;
        }
        self.pending.drain(..consumed);
        n
    }

    fn tick(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn flush(&mut self, _timeout: Duration) {
        while self.rx.try_recv().is_ok() {}
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Build a connected pair sharing two `mpsc` byte channels, one per
/// direction.
pub fn pair<const PKT_SIZE: usize>() -> (MpscChannel<PKT_SIZE>, MpscChannel<PKT_SIZE>) {
    let (tx1, rx2) = std::sync::mpsc::channel();
    let (tx2, rx1) = std::sync::mpsc::channel();
    (MpscChannel::new(tx1, rx1), MpscChannel::new(tx2, rx2))
}
