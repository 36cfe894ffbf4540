//! Frame layout, checksum, and the modular sequence-number arithmetic used
//! throughout the engine and window state machines.

use std::fmt;

/// Frame kind, matching the wire values of the original protocol
/// (`DATA = 3`, `ACK = 1`, `NAK = 2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameKind {
    Ack = 1,
    Nak = 2,
    Data = 3,
}

impl FrameKind {
    fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(FrameKind::Ack),
            2 => Some(FrameKind::Nak),
            3 => Some(FrameKind::Data),
            _ => None,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FrameKind::Ack => "ack",
            FrameKind::Nak => "nak",
            FrameKind::Data => "data",
        };
        f.write_str(s)
    }
}

/// The application-level payload carried by a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<const PKT_SIZE: usize> {
    pub data: [u8; PKT_SIZE],
}

impl<const PKT_SIZE: usize> Default for Packet<PKT_SIZE> {
    fn default() -> Self {
        Packet { data: [0u8; PKT_SIZE] }
    }
}

/// Wire record: `kind`, `seq`, `ack`, `info`, `checksum`. Fixed size,
/// unpadded; both peers must agree on `PKT_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<const PKT_SIZE: usize> {
    pub kind: FrameKind,
    pub seq: u8,
    pub ack: u8,
    pub info: Packet<PKT_SIZE>,
    pub checksum: u8,
}

impl<const PKT_SIZE: usize> Frame<PKT_SIZE> {
    /// Size of one frame on the wire, in bytes.
    pub const WIRE_SIZE: usize = 4 + PKT_SIZE;

    pub fn to_bytes(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= Self::WIRE_SIZE);
        buf[0] = self.kind as u8;
        buf[1] = self.seq;
        buf[2] = self.ack;
        buf[3..3 + PKT_SIZE].copy_from_slice(&self.info.data);
        buf[3 + PKT_SIZE] = self.checksum;
    }

    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::WIRE_SIZE {
            return None;
        }
        let kind = FrameKind::from_u8(buf[0])?;
        let mut data = [0u8; PKT_SIZE];
        data.copy_from_slice(&buf[3..3 + PKT_SIZE]);
        Some(Frame {
            kind,
            seq: buf[1],
            ack: buf[2],
            info: Packet { data },
            checksum: buf[3 + PKT_SIZE],
        })
    }
}

/// Single-byte two's-complement checksum: `compute(data) = !sum(data) + 1`.
/// Checksum is computed over `info.data` only; `kind`/`seq`/`ack` are
/// trusted (they're interpreted only through exhaustive case analysis over
/// a small tag space).
pub fn compute_checksum(data: &[u8]) -> u8 {
    let sum: u8 = data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    (!sum).wrapping_add(1)
}

/// Verification recomputes `sum(data) + checksum`; a valid frame has
/// residue 0.
pub fn verify_checksum(data: &[u8], checksum: u8) -> u8 {
    let sum: u8 = data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    sum.wrapping_add(checksum)
}

/// Modular membership in the half-open circular arc `[a, c)`, over the
/// sequence space `0..=max_seq`.
///
/// `(a <= b < c) || (c < a && a <= b) || (b < c && c < a)`; when `a == c`
/// the arc is empty.
pub fn between(a: u8, b: u8, c: u8) -> bool {
    ((a <= b) && (b < c)) || ((c < a) && (a <= b)) || ((b < c) && (c < a))
}

/// Increment `k` circularly within `0..=max_seq`.
pub fn inc(k: u8, max_seq: u8) -> u8 {
    if k < max_seq {
        k + 1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_round_trips_to_zero_residue() {
        for data in [&[0u8][..], &[1, 2, 3], &[255, 255, 255], &[]] {
            let c = compute_checksum(data);
            assert_eq!(verify_checksum(data, c), 0);
        }
    }

    #[test]
    fn between_matches_modular_distance_definition() {
        const MAX_SEQ: u8 = 7;
        for a in 0..=MAX_SEQ {
            for b in 0..=MAX_SEQ {
                for c in 0..=MAX_SEQ {
                    if a == c {
                        assert!(!between(a, b, c), "a={a} b={b} c={c}");
                        continue;
                    }
                    let modulus = (MAX_SEQ as u16) + 1;
                    let db = (b as i16 - a as i16).rem_euclid(modulus as i16) as u16;
                    let dc = (c as i16 - a as i16).rem_euclid(modulus as i16) as u16;
                    assert_eq!(between(a, b, c), db < dc, "a={a} b={b} c={c}");
                }
            }
        }
    }

    #[test]
    fn between_empty_arc_when_a_equals_c() {
        for a in 0..=7u8 {
            for b in 0..=7u8 {
                assert!(!between(a, b, a));
            }
        }
    }

    #[test]
    fn inc_wraps_at_max_seq() {
        assert_eq!(inc(6, 7), 7);
        assert_eq!(inc(7, 7), 0);
    }

    #[test]
    fn frame_encode_decode_round_trip() {
        let f = Frame::<1> {
            kind: FrameKind::Data,
            seq: 3,
            ack: 5,
            info: Packet { data: [42] },
            checksum: 9,
        };
        let mut buf = [0u8; Frame::<1>::WIRE_SIZE];
        f.to_bytes(&mut buf);
        let g = Frame::<1>::from_bytes(&buf).unwrap();
        assert_eq!(f, g);
    }

    #[test]
    fn frame_decode_rejects_unknown_kind() {
        let buf = [0u8; Frame::<1>::WIRE_SIZE];
        assert!(Frame::<1>::from_bytes(&buf).is_none());
    }
}
