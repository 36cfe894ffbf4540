//! The protocol engine: owns the physical channel, the inbound frame
//! queue, and both timer subsystems, and exposes the fixed-priority event
//! selector that the window state machines drive.
//!
//! Grounded on `Protocol.h`/`Protocol.cpp`'s `wait_for_event`/`pick_event`
//! and the `start_timer`/`stop_timer`/`start_ack_timer`/`stop_ack_timer`
//! family.

use log::{debug, trace};

use crate::physical::PhysicalChannel;
use crate::queue::{DequeueEvent, FrameQueue};
use crate::timer::{AckTimer, RetransmitTimers};
use crate::wire::{compute_checksum, Frame, FrameKind, Packet};

/// One of the five outcomes `pick_event` can settle on. Priority order is
/// significant: `ack_timeout` beats frame arrival, which beats `send_ready`,
/// which beats a retransmission `timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<const PKT_SIZE: usize> {
    AckTimeout,
    FrameArrival(Frame<PKT_SIZE>),
    ChecksumError(Frame<PKT_SIZE>),
    SendReady,
    Timeout(u8),
    NoEvent,
}

pub struct Engine<C, const PKT_SIZE: usize, const WINDOW_SIZE: usize, const QUEUE_SIZE: usize> {
    channel: C,
    queue: FrameQueue<PKT_SIZE, QUEUE_SIZE>,
    timers: RetransmitTimers<WINDOW_SIZE>,
    ack_timer: AckTimer,
    /// Whether a `send_ready` event is currently allowed to occur, set by
    /// the window state machine via [`Engine::set_send_ready`].
    status: bool,
    max_seq: u8,
    name: &'static str,
}

impl<C, const PKT_SIZE: usize, const WINDOW_SIZE: usize, const QUEUE_SIZE: usize>
    Engine<C, PKT_SIZE, WINDOW_SIZE, QUEUE_SIZE>
where
    C: PhysicalChannel<PKT_SIZE>,
{
    pub fn new(channel: C, timeout_interval: u64, max_seq: u8, name: &'static str) -> Self {
        Engine {
            channel,
            queue: FrameQueue::new(),
            timers: RetransmitTimers::new(timeout_interval),
            ack_timer: AckTimer::new(timeout_interval),
            status: false,
            max_seq,
            name,
        }
    }

    pub fn channel(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn set_send_ready(&mut self, ready: bool) {
        self.status = ready;
    }

    pub fn start_timer(&mut self, seq: u8) {
        self.timers.start(seq, self.channel.tick());
    }

    pub fn stop_timer(&mut self, seq: u8) {
        self.timers.stop(seq);
    }

    pub fn start_ack_timer(&mut self) {
        self.ack_timer.start(self.channel.tick());
    }

    pub fn stop_ack_timer(&mut self) {
        self.ack_timer.stop();
    }

    /// Construct, send, and start any side-effect timers for a DATA, ACK,
    /// or NAK frame. Mirrors `ReliableDataTransfer::send_frame`.
    pub fn send_frame(
        &mut self,
        kind: FrameKind,
        frame_nr: u8,
        frame_expected: u8,
        payload: &Packet<PKT_SIZE>,
    ) {
        let ack = (frame_expected + self.max_seq) % (self.max_seq + 1);
        let checksum = compute_checksum(&payload.data);
        let frame = Frame {
            kind,
            seq: frame_nr,
            ack,
            info: *payload,
            checksum,
        };

        if let Err(err) = self.channel.send(&frame) {
            debug!(target: self.name, "send error: {err}");
        }

        if kind == FrameKind::Data {
            self.start_timer(frame_nr);
            trace!(target: self.name, "sent data seq={frame_nr}");
        } else {
            trace!(target: self.name, "sent {kind} ack={ack}");
        }
        self.stop_ack_timer();
    }

    /// Block (by spinning the event loop) until some event is possible,
    /// then return it. Resets the timer-tiebreak `offset` at the top of
    /// the cycle so simultaneous timer starts within one cycle still sort
    /// deterministically.
    pub fn wait_for_event(&mut self) -> Event<PKT_SIZE> {
        self.timers.reset_offset();
        loop {
            self.queue.enqueue(&mut self.channel);
            let event = self.pick_event();
            if event != Event::NoEvent {
                return event;
            }
        }
    }

    fn pick_event(&mut self) -> Event<PKT_SIZE> {
        let now = self.channel.tick();

        if self.ack_timer.check(now) {
            return Event::AckTimeout;
        }

        if !self.queue.is_empty() {
            return match self.queue.dequeue() {
                DequeueEvent::FrameArrival(f) => Event::FrameArrival(f),
                DequeueEvent::ChecksumError(f) => Event::ChecksumError(f),
                DequeueEvent::NoEvent => Event::NoEvent,
            };
        }

        if self.status {
            return Event::SendReady;
        }

        if let Some(seq) = self.timers.check(now) {
            return Event::Timeout(seq);
        }

        Event::NoEvent
    }

    pub fn tick(&self) -> u64 {
        self.channel.tick()
    }

    pub fn into_channel(self) -> C {
        self.channel
    }
}
