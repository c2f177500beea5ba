//! The command envelope: the fixed header in front of every message.
//!
//! ```text
//! ┌──────────────┬─────────────────────┬───────────────┐
//! │ command: u16 │ sequence: i64       │ payload …     │
//! │ little-end.  │ little-endian       │ rest of frame │
//! └──────────────┴─────────────────────┴───────────────┘
//!   2 bytes        8 bytes
//! ```
//!
//! The payload runs to the end of the frame; its layout is chosen by the
//! command id. Length framing on the transport is somebody else's job.

use std::sync::atomic::{AtomicI64, Ordering};

use bytes::{BufMut, Bytes};
use vlwire_codec::{CodecError, Reader};

use crate::CommandId;

/// Size of the envelope header in bytes.
pub const HEADER_LEN: usize = 2 + 8;

/// A framed message with its payload still undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub command: CommandId,
    pub sequence: i64,
    pub payload: Bytes,
}

impl Envelope {
    pub fn new(command: impl Into<CommandId>, sequence: i64, payload: impl Into<Bytes>) -> Self {
        Self {
            command: command.into(),
            sequence,
            payload: payload.into(),
        }
    }

    /// Splits a frame into header fields and payload.
    ///
    /// # Errors
    /// [`CodecError::TruncatedBuffer`] if `frame` is shorter than
    /// [`HEADER_LEN`]. An empty payload is fine.
    pub fn parse(frame: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(frame);
        let (command, sequence) = read_header(&mut r)?;
        Ok(Self {
            command,
            sequence,
            payload: Bytes::copy_from_slice(r.take_rest()),
        })
    }

    /// Serializes header and payload into one frame.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len());
        put_header(&mut out, self.command, self.sequence);
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Writes the 10-byte header.
pub fn put_header(dst: &mut impl BufMut, command: CommandId, sequence: i64) {
    dst.put_u16_le(command.0);
    dst.put_i64_le(sequence);
}

/// Reads the 10-byte header, leaving `src` at the start of the payload.
pub fn read_header(src: &mut Reader<'_>) -> Result<(CommandId, i64), CodecError> {
    let available = src.remaining();
    if available < HEADER_LEN {
        return Err(CodecError::TruncatedBuffer {
            needed: HEADER_LEN,
            available,
        });
    }
    let command = CommandId(src.read_u16_le()?);
    let sequence = src.read_i64_le()?;
    Ok((command, sequence))
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

/// Hands out request sequence numbers.
///
/// The server echoes the sequence number back in the matching response,
/// so each outgoing request needs a fresh one. Safe to share between
/// threads.
#[derive(Debug)]
pub struct Sequencer {
    next: AtomicI64,
}

impl Sequencer {
    /// A sequencer whose first number is 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }

    /// Returns the next sequence number.
    pub fn next_sequence(&self) -> i64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// The number the next call to [`next_sequence`](Self::next_sequence) will return.
    pub fn peek(&self) -> i64 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_header_layout() {
        let env = Envelope::new(CommandId(4113), 7, vec![0xAAu8, 0xBB]);
        assert_eq!(
            env.encode(),
            vec![0x11, 0x10, 7, 0, 0, 0, 0, 0, 0, 0, 0xAA, 0xBB]
        );
    }

    #[test]
    fn test_parse_splits_header_and_payload() {
        let frame = [0x90, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 1, 2, 3];
        let env = Envelope::parse(&frame).unwrap();
        assert_eq!(env.command, CommandId(144));
        assert_eq!(env.sequence, -1);
        assert_eq!(&env.payload[..], &[1, 2, 3]);
    }

    #[test]
    fn test_header_only_frame_has_empty_payload() {
        let env = Envelope::parse(&Envelope::new(CommandId(1), 2, Bytes::new()).encode()).unwrap();
        assert!(env.payload.is_empty());
    }

    #[test]
    fn test_short_header_is_truncated() {
        assert_eq!(
            Envelope::parse(&[0x11, 0x10, 0x01]),
            Err(CodecError::TruncatedBuffer {
                needed: HEADER_LEN,
                available: 3
            })
        );
    }

    #[test]
    fn test_sequencer_starts_at_one_and_increments() {
        let seq = Sequencer::new();
        assert_eq!(seq.next_sequence(), 1);
        assert_eq!(seq.next_sequence(), 2);
        assert_eq!(seq.peek(), 3);
    }

    #[test]
    fn test_sequencer_is_unique_across_threads() {
        let seq = Arc::new(Sequencer::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let seq = Arc::clone(&seq);
                thread::spawn(move || (0..250).map(|_| seq.next_sequence()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 1000);
        assert_eq!(all.first(), Some(&1));
        assert_eq!(all.last(), Some(&1000));
    }
}
