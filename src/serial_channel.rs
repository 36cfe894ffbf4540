//! Real hardware: a [`PhysicalChannel`] backed by [`serialport`], a
//! crates.io serial library used the way `PhysicalLayer.cpp`'s raw-termios
//! setup is used there. The boot-time settle and connect handshake are
//! carried over; the `termios` flag twiddling itself is replaced by
//! `serialport`'s portable `8N1`/no-flow-control builder.

use std::io::{self, ErrorKind, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use serialport::SerialPort;

use crate::physical::{PhysicalChannel, Role, CONNECT};
use crate::wire::Frame;

/// Arduino-class boards reset on DTR toggle when a serial connection
/// opens; the original hardcodes a 1.7s sleep after `tcsetattr` to ride
/// that out.
const BOOT_SETTLE: Duration = Duration::from_millis(1700);

pub struct SerialChannel<const PKT_SIZE: usize> {
    port: Box<dyn SerialPort>,
    pending: Vec<u8>,
    origin: Instant,
}

impl<const PKT_SIZE: usize> SerialChannel<PKT_SIZE> {
    /// Open `device` at `baud`, 8N1, no flow control, and wait out the
    /// board's boot-reset window.
    pub fn open(device: &str, baud: u32) -> io::Result<Self> {
        let port = serialport::new(device, baud)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(10))
            .open()
            .map_err(|e| io::Error::new(ErrorKind::Other, e))?;

        thread::sleep(BOOT_SETTLE);

        Ok(SerialChannel {
            port,
            pending: Vec::new(),
            origin: Instant::now(),
        })
    }
}

impl<const PKT_SIZE: usize> PhysicalChannel<PKT_SIZE> for SerialChannel<PKT_SIZE> {
    fn init(&mut self, baud: u32) -> io::Result<()> {
        self.port.set_baud_rate(baud).map_err(|e| io::Error::new(ErrorKind::Other, e))
    }

    fn connect(&mut self, role: Role) -> io::Result<bool> {
        match role {
            Role::Sender => {
                let mut byte = [0u8; 1];
                match self.port.read(&mut byte) {
                    Ok(1) => Ok(byte[0] == CONNECT),
                    Ok(_) => Ok(false),
                    Err(e) if e.kind() == ErrorKind::TimedOut => Ok(false),
                    Err(e) => Err(e),
                }
            }
            Role::Receiver => {
                self.port.write_all(&[CONNECT])?;
                Ok(true)
            }
        }
    }

    fn send(&mut self, frame: &Frame<PKT_SIZE>) -> io::Result<()> {
        let mut buf = vec![0u8; Frame::<PKT_SIZE>::WIRE_SIZE];
        frame.to_bytes(&mut buf);
        self.port.write_all(&buf)
    }

    fn recv(&mut self, frames: &mut [Frame<PKT_SIZE>]) -> usize {
        // Only read whole frames' worth at a time, matching the
        // original's `bytes - (bytes % sizeof(frame))` rounding so a
        // partial frame is never split across two reads unnecessarily.
        let wire_size = Frame::<PKT_SIZE>::WIRE_SIZE;
        if let Ok(available) = self.port.bytes_to_read() {
            let available = available as usize;
            if available >= wire_size {
                let to_read = available - (available % wire_size);
                let mut buf = vec![0u8; to_read];
                match self.port.read_exact(&mut buf) {
                    Ok(()) => self.pending.extend(buf),
                    Err(_) => return 0,
                }
            }
        }

        let mut n = 0;
        let mut consumed = 0;
        while n < frames.len() && self.pending.len() - consumed >= wire_size {
            if let Some(f) = Frame::<PKT_SIZE>::from_bytes(&self.pending[consumed..consumed + wire_size]) {
                frames[n] = f;
                n += 1;
            }
            consumed += wire_size;
        }
        self.pending.drain(..consumed);
        n
    }

    fn tick(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn flush(&mut self, timeout: Duration) {
        thread::sleep(timeout);
        let mut trash = [0u8; 16];
        let _ = self.port.read(&mut trash);
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}
