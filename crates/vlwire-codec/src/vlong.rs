//! VLong: the protocol's variable-length signed integer.
//!
//! This is *not* LEB128 or zigzag. The layout is:
//!
//! ```text
//! byte 0      : S  s  m5 m4 m3 m2 m1 m0     S = stop bit, s = sign flag
//! byte 1..=8  : S  m6 m5 m4 m3 m2 m1 m0     7 magnitude bits each
//! byte 9      : S  0  0  0  0  0  0  m0     the single remaining bit (62)
//! ```
//!
//! Negative numbers are stored as their ones' complement (`!v`) with the
//! sign flag set, so `-1` becomes magnitude `0` and encodes to the single
//! byte `0xC0`. Only the last byte carries the stop bit; the encoder always
//! emits the shortest form, the decoder accepts any form up to 10 bytes.

use bytes::BufMut;

use crate::{CodecError, Reader};

/// The longest possible VLong encoding.
pub const MAX_VLONG_LEN: usize = 10;

const STOP: u8 = 0x80;
const SIGN: u8 = 0x40;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Lays out the 10 candidate bytes and returns them with the index of the
/// terminating byte already marked.
fn layout(value: i64) -> ([u8; MAX_VLONG_LEN], usize) {
    let (mag, sign) = if value < 0 { (!value, SIGN) } else { (value, 0) };

    let mut out = [0u8; MAX_VLONG_LEN];
    out[0] = (mag & 0x3f) as u8 | sign;
    for (i, slot) in out.iter_mut().enumerate().take(9).skip(1) {
        *slot = ((mag >> (6 + 7 * (i - 1))) & 0x7f) as u8;
    }
    out[9] = ((mag >> 62) & 0x01) as u8;

    // Byte 0 never takes part in the scan: even when it is zero it is the
    // terminator of last resort.
    let tail = (1..MAX_VLONG_LEN).rev().find(|&i| out[i] != 0).unwrap_or(0);
    out[tail] |= STOP;
    (out, tail)
}

/// Appends the VLong encoding of `value` to `dst`.
pub fn put_vlong(dst: &mut impl BufMut, value: i64) {
    let (bytes, tail) = layout(value);
    dst.put_slice(&bytes[..=tail]);
}

/// Encodes `value` as a 1–10 byte VLong.
///
/// ```
/// use vlwire_codec::encode_vlong;
///
/// assert_eq!(encode_vlong(0), [0x80]);
/// assert_eq!(encode_vlong(-1), [0xC0]);
/// assert_eq!(encode_vlong(64), [0x00, 0x81]);
/// ```
pub fn encode_vlong(value: i64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VLONG_LEN);
    put_vlong(&mut out, value);
    out
}

/// Length in bytes of the encoding of `value`, without encoding it.
pub fn vlong_len(value: i64) -> usize {
    layout(value).1 + 1
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Reads one VLong from `src`, advancing it past the encoding.
///
/// Stops after the first byte with the stop bit set, or after
/// [`MAX_VLONG_LEN`] bytes, whichever comes first. Running out of input
/// before either happens is [`CodecError::MalformedVarint`].
pub fn read_vlong(src: &mut Reader<'_>) -> Result<i64, CodecError> {
    let mut chunk = [0u8; MAX_VLONG_LEN];
    let mut tail = 0;
    loop {
        let Some(b) = src.peek_u8() else {
            return Err(CodecError::MalformedVarint { read: tail });
        };
        src.read_u8()?;
        chunk[tail] = b;
        tail += 1;
        if b & STOP != 0 || tail == MAX_VLONG_LEN {
            break;
        }
    }

    let mut mag: i64 = 0;
    if tail > 1 {
        // Highest chunk first. The terminator's stop bit is masked off;
        // the middle bytes are < 0x80 by construction.
        mag = i64::from(chunk[tail - 1] & 0x7f);
        for &b in chunk[1..tail - 1].iter().rev() {
            mag = (mag << 7) | i64::from(b & 0x7f);
        }
        mag <<= 6;
    }
    mag += i64::from(chunk[0] & 0x3f);

    if chunk[0] & SIGN != 0 {
        mag = !mag;
    }
    Ok(mag)
}

/// Decodes one VLong from the start of `buf`.
///
/// Returns the value and the number of bytes consumed. Never reads past
/// the terminator or past the end of `buf`.
pub fn decode_vlong(buf: &[u8]) -> Result<(i64, usize), CodecError> {
    let mut r = Reader::new(buf);
    let value = read_vlong(&mut r)?;
    Ok((value, r.position()))
}

/// Reads a VLong that is used as a length or element count.
pub(crate) fn read_len(src: &mut Reader<'_>) -> Result<usize, CodecError> {
    let raw = read_vlong(src)?;
    usize::try_from(raw).map_err(|_| CodecError::InvalidLength(raw))
}

/// Appends a length or element count.
pub(crate) fn put_len(dst: &mut impl BufMut, len: usize) {
    // Lengths of in-memory buffers always fit in an i64.
    put_vlong(dst, len as i64);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(v: i64) {
        let enc = encode_vlong(v);
        assert!(!enc.is_empty() && enc.len() <= MAX_VLONG_LEN, "{v}: {enc:?}");
        assert_eq!(decode_vlong(&enc).unwrap(), (v, enc.len()), "value {v}");
        assert_eq!(vlong_len(v), enc.len());
    }

    // =====================================================================
    // Fixed encodings
    // =====================================================================

    #[test]
    fn test_zero_is_single_stop_byte() {
        assert_eq!(encode_vlong(0), vec![0x80]);
    }

    #[test]
    fn test_minus_one_is_sign_plus_stop() {
        assert_eq!(encode_vlong(-1), vec![0xC0]);
    }

    #[test]
    fn test_six_bit_magnitudes_fit_in_one_byte() {
        assert_eq!(encode_vlong(63), vec![0xBF]);
        assert_eq!(encode_vlong(-64), vec![0xFF]);
        for v in -64..=63 {
            assert_eq!(encode_vlong(v).len(), 1, "value {v}");
        }
    }

    #[test]
    fn test_seven_bit_boundary_needs_two_bytes() {
        assert_eq!(encode_vlong(64), vec![0x00, 0x81]);
        assert_eq!(encode_vlong(-65), vec![0x40, 0x81]);
    }

    #[test]
    fn test_extremes_use_all_ten_bytes() {
        let max = encode_vlong(i64::MAX);
        assert_eq!(max.len(), 10);
        assert_eq!(max[9], 0x81);
        assert!(max[..9].iter().all(|b| b & STOP == 0));

        let min = encode_vlong(i64::MIN);
        assert_eq!(min.len(), 10);
        assert_eq!(min[0] & SIGN, SIGN);
    }

    #[test]
    fn test_only_last_byte_has_stop_bit() {
        for v in [1_000, -1_000, 1 << 40, -(1 << 40)] {
            let enc = encode_vlong(v);
            let (last, rest) = enc.split_last().unwrap();
            assert_ne!(last & STOP, 0);
            assert!(rest.iter().all(|b| b & STOP == 0));
        }
    }

    // =====================================================================
    // Round trips
    // =====================================================================

    #[test]
    fn test_boundary_values_round_trip() {
        for v in [0, 63, 64, -1, -64, -65, i64::MIN, i64::MAX, 8191, 8192, -8193] {
            round_trip(v);
        }
    }

    #[test]
    fn test_every_bit_length_round_trips() {
        for shift in 0..63 {
            let v = 1i64 << shift;
            round_trip(v);
            round_trip(v - 1);
            round_trip(-v);
            round_trip(-v - 1);
        }
    }

    #[test]
    fn test_length_is_non_decreasing_in_bit_length() {
        let mut prev = 0;
        for shift in 0..63 {
            let len = encode_vlong(1i64 << shift).len();
            assert!(len >= prev, "shrunk at bit {shift}");
            prev = len;
        }
    }

    // =====================================================================
    // Decoder tolerance and failures
    // =====================================================================

    #[test]
    fn test_decoder_accepts_non_minimal_forms() {
        // 5 with two redundant zero chunks.
        assert_eq!(decode_vlong(&[0x05, 0x00, 0x80]).unwrap(), (5, 3));
    }

    #[test]
    fn test_decoder_stops_at_terminator() {
        assert_eq!(decode_vlong(&[0x81, 0xff, 0xff]).unwrap(), (1, 1));
    }

    #[test]
    fn test_decoder_stops_after_ten_bytes_without_stop_bit() {
        let buf = [0x01u8; 12];
        let (_, used) = decode_vlong(&buf).unwrap();
        assert_eq!(used, MAX_VLONG_LEN);
    }

    #[test]
    fn test_exhausted_buffer_is_malformed() {
        assert_eq!(
            decode_vlong(&[0x01, 0x02]),
            Err(CodecError::MalformedVarint { read: 2 })
        );
        assert_eq!(
            decode_vlong(&[]),
            Err(CodecError::MalformedVarint { read: 0 })
        );
    }

    #[test]
    fn test_negative_length_is_rejected() {
        let enc = encode_vlong(-3);
        let mut r = Reader::new(&enc);
        assert_eq!(read_len(&mut r), Err(CodecError::InvalidLength(-3)));
    }
}
