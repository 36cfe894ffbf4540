//! Go-Back-N: a single sender window, strictly in-order receive, and
//! bulk retransmission of the whole outstanding window on timeout.
//!
//! Grounded on `ReliableDataTransfer::go_back_n` in
//! `ReliableDataTransfer.cpp`. Two redesigns relative to the original:
//! the ACK-delay timer is armed the same way Selective Repeat arms it
//! (the original only ever sent ACKs piggybacked or on a window-boundary
//! frame, so an isolated final frame could stall); and the termination
//! check is the same single post-event test used by [`crate::sr`].

use crate::engine::{Engine, Event};
use crate::physical::PhysicalChannel;
use crate::window::{AppIo, WindowState};
use crate::wire::{between, inc, FrameKind};

/// Run one iteration of the Go-Back-N state machine.
///
/// Does not touch `engine`'s send-ready gate; see [`crate::sr::step`] for
/// why that stays the caller's responsibility.
pub fn step<C, const PKT_SIZE: usize, const WINDOW_SIZE: usize, const QUEUE_SIZE: usize>(
    engine: &mut Engine<C, PKT_SIZE, WINDOW_SIZE, QUEUE_SIZE>,
    state: &mut WindowState<PKT_SIZE, WINDOW_SIZE>,
    app: &mut AppIo,
    max_seq: u8,
) -> bool
where
    C: PhysicalChannel<PKT_SIZE>,
{
    let event = engine.wait_for_event();

    match event {
        Event::SendReady => {
            state.nbuffered += 1;
            let packet = app.fetch::<PKT_SIZE>();
            state.out_buf[(state.next_frame_to_send as usize) % WINDOW_SIZE] = packet;
            engine.send_frame(
                FrameKind::Data,
                state.next_frame_to_send,
                state.frame_expected,
                &packet,
            );
            state.next_frame_to_send = inc(state.next_frame_to_send, max_seq);
            state.last_frame_send += 1;
        }

        Event::FrameArrival(r) => {
            if r.kind == FrameKind::Data && r.seq == state.frame_expected {
                state.in_buf[(r.seq as usize) % WINDOW_SIZE] = r.info;
                app.deliver(&state.in_buf[(state.frame_expected as usize) % WINDOW_SIZE]);
                state.frame_expected = inc(state.frame_expected, max_seq);
                state.last_frame_recv += 1;

                if (r.seq as usize) % WINDOW_SIZE == WINDOW_SIZE - 1 {
                    engine.send_frame(FrameKind::Ack, 0, state.frame_expected, &state.out_buf[0]);
                } else {
                    engine.start_ack_timer();
                }
            }

            while between(state.ack_expected, r.ack, state.next_frame_to_send) {
                state.nbuffered -= 1;
                engine.stop_timer(state.ack_expected);
                state.ack_expected = inc(state.ack_expected, max_seq);
                state.last_frame_recv += 1;
            }
        }

        Event::ChecksumError(_) => {}

        Event::Timeout(_) => {
            state.next_frame_to_send = state.ack_expected;
            for _ in 0..state.nbuffered {
                let seq = state.next_frame_to_send;
                engine.send_frame(
                    FrameKind::Data,
                    seq,
                    state.frame_expected,
                    &state.out_buf[(seq as usize) % WINDOW_SIZE],
                );
                state.next_frame_to_send = inc(state.next_frame_to_send, max_seq);
            }
        }

        Event::AckTimeout => {
            engine.send_frame(FrameKind::Ack, 0, state.frame_expected, &state.out_buf[0]);
        }

        Event::NoEvent => {}
    }

    if !state.end && state.last_frame_recv == state.nframes && state.last_frame_recv > 0 {
        state.end = true;
    }

    state.end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::pair;

    const MAX_SEQ: u8 = 7;
    const W: usize = 4;
    const Q: usize = 8;

    #[test]
    fn multi_frame_transfer_completes_in_order() {
        let (sender_chan, receiver_chan) = pair::<1>();
        let mut sender_engine: Engine<_, 1, W, Q> = Engine::new(sender_chan, 100, MAX_SEQ, "snd");
        let mut receiver_engine: Engine<_, 1, W, Q> =
            Engine::new(receiver_chan, 100, MAX_SEQ, "rcv");

        let data = [1u8, 2, 3, 4, 5];
        let mut sender_state: WindowState<1, W> = WindowState::new(data.len());
        let mut receiver_state: WindowState<1, W> = WindowState::new(data.len());
        let mut sender_app = AppIo::new(&data);
        let mut receiver_app = AppIo::new(&[]);

        sender_engine.set_send_ready(sender_state.send_window_open());

        let mut rounds = 0;
        while !(sender_state.end && receiver_state.end) {
            step(
                &mut sender_engine,
                &mut sender_state,
                &mut sender_app,
                MAX_SEQ,
            );
            sender_engine.set_send_ready(sender_state.send_window_open());
            step(
                &mut receiver_engine,
                &mut receiver_state,
                &mut receiver_app,
                MAX_SEQ,
            );
            rounds += 1;
            assert!(rounds < 5000, "protocol failed to converge");
        }

        assert_eq!(receiver_app.into_output(), data.to_vec());
    }
}
