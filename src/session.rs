//! The session driver: handshake, mode dispatch, and the `send`/`recv`
//! loops that run the chosen window state machine to completion.
//!
//! Grounded on `ReliableDataTransfer::send`/`recv`/`init` in
//! `ReliableDataTransfer.cpp`. The original dispatches between variants
//! through a bound member-function pointer (`run`); Rust has no direct
//! equivalent with a single monomorphic `Engine`, so dispatch is a tagged
//! `enum Mode` match inside the driver loop instead.

use log::info;

use crate::engine::Engine;
use crate::error::SessionError;
use crate::physical::{PhysicalChannel, Role};
use crate::window::{frame_count, AppIo, WindowState};
use crate::{gbn, sr};

/// Which window state machine a [`Session`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    SelectiveRepeat,
    GoBackN,
}

/// Tunable session parameters. `WINDOW_SIZE`/`QUEUE_SIZE`/`PKT_SIZE` are
/// compile-time constants (see [`Session`]); everything that can
/// reasonably vary at runtime lives here instead.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub mode: Mode,
    /// Base retransmission timeout, milliseconds.
    pub timeout_ms: u64,
    /// Bound on handshake retries. `None` spins forever, matching the
    /// original's `while (connect(...) < 1);`.
    pub handshake_attempts: Option<u32>,
    /// Baud rate passed to [`PhysicalChannel::init`].
    pub baud: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            mode: Mode::SelectiveRepeat,
            timeout_ms: 100,
            handshake_attempts: Some(10_000),
            baud: 9600,
        }
    }
}

/// A reliable-transfer session bound to one physical channel. `MAX_SEQ` is
/// derived from `WINDOW_SIZE` (`MAX_SEQ = 2 * WINDOW_SIZE - 1`), matching
/// `WINDOW_SIZE = (MAX_SEQ + 1) / 2` in the original; `QUEUE_SIZE` should
/// be `2 * WINDOW_SIZE` so the inbound queue can never overflow under the
/// window discipline.
pub struct Session<C, const PKT_SIZE: usize, const WINDOW_SIZE: usize, const QUEUE_SIZE: usize> {
    engine: Engine<C, PKT_SIZE, WINDOW_SIZE, QUEUE_SIZE>,
    config: SessionConfig,
    max_seq: u8,
}

impl<C, const PKT_SIZE: usize, const WINDOW_SIZE: usize, const QUEUE_SIZE: usize>
    Session<C, PKT_SIZE, WINDOW_SIZE, QUEUE_SIZE>
where
    C: PhysicalChannel<PKT_SIZE>,
{
    pub fn new(mut channel: C, config: SessionConfig) -> Result<Self, SessionError> {
        channel.init(config.baud)?;
        let max_seq = (2 * WINDOW_SIZE - 1) as u8;
        let name = match config.mode {
            Mode::SelectiveRepeat => "rdt::sr",
            Mode::GoBackN => "rdt::gbn",
        };
        let engine = Engine::new(channel, config.timeout_ms, max_seq, name);
        Ok(Session {
            engine,
            config,
            max_seq,
        })
    }

    fn handshake(&mut self, role: Role) -> Result<(), SessionError> {
        let mut attempt = 0u32;
        loop {
            if self.engine.channel().connect(role)? {
                info!(target: "rdt::session", "handshake complete as {role:?}");
                return Ok(());
            }
            attempt += 1;
            if let Some(limit) = self.config.handshake_attempts {
                if attempt >= limit {
                    return Err(SessionError::HandshakeTimeout(limit));
                }
            }
        }
    }

    /// Send `data` to completion, splitting it into `PKT_SIZE` packets.
    /// Returns once every frame has been acknowledged.
    pub fn send(&mut self, data: &[u8]) -> Result<(), SessionError> {
        self.handshake(Role::Sender)?;

        let nframes = frame_count(data.len(), PKT_SIZE);
        let mut state: WindowState<PKT_SIZE, WINDOW_SIZE> = WindowState::new(nframes);
        let mut app = AppIo::new(data);
        self.engine.set_send_ready(state.send_window_open());

        while !state.end {
            match self.config.mode {
                Mode::SelectiveRepeat => {
                    sr::step(&mut self.engine, &mut state, &mut app, self.max_seq);
                }
                Mode::GoBackN => {
                    gbn::step(&mut self.engine, &mut state, &mut app, self.max_seq);
                }
            }
            self.engine.set_send_ready(state.send_window_open());
        }
        Ok(())
    }

    /// Receive `len` bytes, returning the reassembled buffer once every
    /// expected frame has arrived.
    pub fn recv(&mut self, len: usize) -> Result<Vec<u8>, SessionError> {
        self.handshake(Role::Receiver)?;

        let nframes = frame_count(len, PKT_SIZE);
        let mut state: WindowState<PKT_SIZE, WINDOW_SIZE> = WindowState::new(nframes);
        let mut app = AppIo::new(&[]);
        // The receive side never originates DATA frames of its own.
        self.engine.set_send_ready(false);

        while !state.end {
            match self.config.mode {
                Mode::SelectiveRepeat => {
                    sr::step(&mut self.engine, &mut state, &mut app, self.max_seq);
                }
                Mode::GoBackN => {
                    gbn::step(&mut self.engine, &mut state, &mut app, self.max_seq);
                }
            }
        }
        Ok(app.into_output())
    }

    pub fn close(mut self) -> Result<(), SessionError> {
        self.engine.channel().close()?;
        Ok(())
    }

    pub fn into_channel(self) -> C {
        self.engine.into_channel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpsc_channel::pair;
    use std::thread;

    #[test]
    fn session_round_trip_selective_repeat() {
        let (a, b) = pair::<1>();
        let data = b"hello".to_vec();
        let expected = data.clone();

        let sender = thread::spawn(move || {
            let mut session: Session<_, 1, 4, 8> = Session::new(
                a,
                SessionConfig {
                    mode: Mode::SelectiveRepeat,
                    timeout_ms: 50,
                    handshake_attempts: Some(10_000),
                    baud: 9600,
                },
            )
            .unwrap();
            session.send(&data).unwrap();
        });

        let mut receiver: Session<_, 1, 4, 8> = Session::new(
            b,
            SessionConfig {
                mode: Mode::SelectiveRepeat,
                timeout_ms: 50,
                handshake_attempts: Some(10_000),
                baud: 9600,
            },
        )
        .unwrap();
        let received = receiver.recv(expected.len()).unwrap();

        sender.join().unwrap();
        assert_eq!(received, expected);
    }
}
