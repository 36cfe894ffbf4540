//! Sender/receiver window state shared by both [`crate::sr`] and
//! [`crate::gbn`], plus the application-layer byte cursors that slice a
//! flat buffer into `PKT_SIZE` packets and reassemble it on the other end.
//!
//! Grounded on `ReliableDataTransfer.h`'s private fields (`ack_expected`,
//! `next_frame_to_send`, `frame_expected`, `too_far`, `out_buf`/`in_buf`,
//! `arrived`, `nbuffered`) and `ReliableDataTransfer.cpp`'s `set_up`,
//! `from_application_layer`/`to_application_layer`.

use crate::wire::Packet;

/// Application-layer byte cursors. The original indexed a fixed-size
/// buffer with a single byte, capping a session at 256 packets; these
/// cursors are widened to `usize` so a session is bounded only by memory.
pub struct AppIo<'a> {
    input: &'a [u8],
    next_pkt_fetch: usize,
    output: Vec<u8>,
}

impl<'a> AppIo<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        AppIo {
            input,
            next_pkt_fetch: 0,
            output: Vec::new(),
        }
    }

    /// Split off the next `PKT_SIZE` bytes of outbound user data.
    pub fn fetch<const PKT_SIZE: usize>(&mut self) -> Packet<PKT_SIZE> {
        let mut data = [0u8; PKT_SIZE];
        for slot in data.iter_mut() {
            *slot = self.input.get(self.next_pkt_fetch).copied().unwrap_or(0);
            self.next_pkt_fetch += 1;
        }
        Packet { data }
    }

    /// Append one delivered packet's payload to the reassembled output.
    pub fn deliver<const PKT_SIZE: usize>(&mut self, packet: &Packet<PKT_SIZE>) {
        self.output.extend_from_slice(&packet.data);
    }

    pub fn into_output(self) -> Vec<u8> {
        self.output
    }
}

/// How many frames a buffer of `len` bytes splits into, matching the
/// original's `len < PKT_SIZE ? 1 : len / PKT_SIZE` truncation: a trailing
/// partial packet is never sent on its own.
pub fn frame_count(len: usize, pkt_size: usize) -> usize {
    if len < pkt_size {
        1
    } else {
        len / pkt_size
    }
}

/// Shared sliding-window bookkeeping for both protocol variants.
pub struct WindowState<const PKT_SIZE: usize, const WINDOW_SIZE: usize> {
    pub no_nak: bool,
    pub not_expected: bool,
    pub end: bool,

    pub ack_expected: u8,
    pub next_frame_to_send: u8,
    pub frame_expected: u8,
    pub too_far: u8,

    pub out_buf: [Packet<PKT_SIZE>; WINDOW_SIZE],
    pub in_buf: [Packet<PKT_SIZE>; WINDOW_SIZE],
    pub arrived: [bool; WINDOW_SIZE],
    pub nbuffered: usize,

    pub nframes: usize,
    pub last_frame_recv: usize,
    pub last_frame_send: usize,
}

impl<const PKT_SIZE: usize, const WINDOW_SIZE: usize> WindowState<PKT_SIZE, WINDOW_SIZE> {
    pub fn new(nframes: usize) -> Self {
        WindowState {
            no_nak: true,
            not_expected: false,
            end: false,
            ack_expected: 0,
            next_frame_to_send: 0,
            frame_expected: 0,
            too_far: WINDOW_SIZE as u8,
            out_buf: [Packet::default(); WINDOW_SIZE],
            in_buf: [Packet::default(); WINDOW_SIZE],
            arrived: [false; WINDOW_SIZE],
            nbuffered: 0,
            nframes,
            last_frame_recv: 0,
            last_frame_send: 0,
        }
    }

    /// Whether a send-ready event should currently be allowed to occur:
    /// mirrors `enable_protocol`/`disable_protocol`'s gating condition.
    pub fn send_window_open(&self) -> bool {
        self.nbuffered < WINDOW_SIZE && self.last_frame_send < self.nframes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_matches_truncating_division() {
        assert_eq!(frame_count(0, 4), 1);
        assert_eq!(frame_count(3, 4), 1);
        assert_eq!(frame_count(4, 4), 1);
        assert_eq!(frame_count(9, 4), 2);
    }

    #[test]
    fn app_io_round_trips_whole_packets() {
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut io = AppIo::new(&data);
        let mut out = AppIo::new(&[]);
        for _ in 0..2 {
            let pkt: Packet<4> = io.fetch();
            out.deliver(&pkt);
        }
        assert_eq!(out.into_output(), data.to_vec());
    }
}
