//! The [`Wire`] trait and its implementations for the protocol's value types.
//!
//! Every field of every payload is one of a handful of shapes:
//!
//! | Rust type      | On the wire                                   |
//! |----------------|-----------------------------------------------|
//! | `u8` … `i64`   | fixed width, little-endian                    |
//! | `bool`         | one byte, non-zero is `true`                  |
//! | [`VLong`]      | variable length, see [`crate::vlong`]         |
//! | `String`       | VLong byte length + UTF-8 bytes               |
//! | [`Uuid`]       | 16 bytes, first three groups byte-swapped     |
//! | `[u8; N]`      | `N` raw bytes                                 |
//! | `Vec<T>`       | VLong element count + each element in order   |
//!
//! Payload types compose these by calling `encode`/`decode` field by field,
//! in declaration order. There is no padding and no field tagging.

use bytes::BufMut;
use uuid::Uuid;

use crate::vlong::{put_len, put_vlong, read_len, read_vlong};
use crate::{CodecError, Reader};

/// A value with a fixed binary representation in this protocol.
pub trait Wire: Sized {
    /// Appends the encoding of `self` to `dst`.
    fn encode(&self, dst: &mut impl BufMut);

    /// Reads one value from `src`, advancing it past the encoding.
    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError>;

    /// Convenience: encodes into a fresh buffer.
    fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }

    /// Convenience: decodes from the start of `buf`, returning the value and
    /// the number of bytes consumed.
    fn from_wire(buf: &[u8]) -> Result<(Self, usize), CodecError> {
        let mut r = Reader::new(buf);
        let value = Self::decode(&mut r)?;
        Ok((value, r.position()))
    }
}

// ---------------------------------------------------------------------------
// Fixed-width integers
// ---------------------------------------------------------------------------

macro_rules! fixed_le {
    ($($ty:ty => $put:ident, $read:ident;)*) => {
        $(
            impl Wire for $ty {
                fn encode(&self, dst: &mut impl BufMut) {
                    dst.$put(*self);
                }

                fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
                    src.$read()
                }
            }
        )*
    };
}

fixed_le! {
    u16 => put_u16_le, read_u16_le;
    i16 => put_i16_le, read_i16_le;
    i32 => put_i32_le, read_i32_le;
    i64 => put_i64_le, read_i64_le;
}

impl Wire for u8 {
    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(*self);
    }

    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
        src.read_u8()
    }
}

impl Wire for i8 {
    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_i8(*self);
    }

    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
        src.read_i8()
    }
}

impl Wire for bool {
    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(u8::from(*self));
    }

    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(src.read_u8()? != 0)
    }
}

impl<const N: usize> Wire for [u8; N] {
    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_slice(self);
    }

    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
        src.take_array()
    }
}

// ---------------------------------------------------------------------------
// VLong
// ---------------------------------------------------------------------------

/// An `i64` that travels as a VLong instead of 8 fixed bytes.
///
/// Plain `i64` fields are fixed-width; wrap them in `VLong` where the
/// protocol uses the variable-length form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct VLong(pub i64);

impl From<i64> for VLong {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl From<VLong> for i64 {
    fn from(v: VLong) -> Self {
        v.0
    }
}

impl Wire for VLong {
    fn encode(&self, dst: &mut impl BufMut) {
        put_vlong(dst, self.0);
    }

    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
        read_vlong(src).map(Self)
    }
}

// ---------------------------------------------------------------------------
// String
// ---------------------------------------------------------------------------

impl Wire for String {
    fn encode(&self, dst: &mut impl BufMut) {
        put_len(dst, self.len());
        dst.put_slice(self.as_bytes());
    }

    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
        let len = read_len(src)?;
        let raw = src.take(len)?;
        Ok(std::str::from_utf8(raw)?.to_owned())
    }
}

/// Encodes `s` as a VLong byte length followed by its UTF-8 bytes.
pub fn encode_string(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() + 2);
    put_len(&mut out, s.len());
    out.put_slice(s.as_bytes());
    out
}

/// Decodes a string from the start of `buf`, returning it with the number
/// of bytes consumed (length prefix included).
pub fn decode_string(buf: &[u8]) -> Result<(String, usize), CodecError> {
    String::from_wire(buf)
}

// ---------------------------------------------------------------------------
// UUID
// ---------------------------------------------------------------------------

/// Position `i` of the wire form holds byte `UUID_ORDER[i]` of the
/// big-endian (textual) form. The permutation is its own inverse.
const UUID_ORDER: [usize; 16] = [3, 2, 1, 0, 5, 4, 7, 6, 8, 9, 10, 11, 12, 13, 14, 15];

fn permute(src: &[u8; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (slot, &from) in out.iter_mut().zip(UUID_ORDER.iter()) {
        *slot = src[from];
    }
    out
}

/// Encodes a UUID into its 16-byte wire layout.
///
/// The first three groups (4, 2 and 2 bytes) are byte-reversed relative to
/// the canonical text form; the last 8 bytes are copied verbatim.
///
/// ```
/// use uuid::Uuid;
/// use vlwire_codec::encode_uuid;
///
/// let id = Uuid::parse_str("01020304-0506-0708-090a-0b0c0d0e0f10").unwrap();
/// assert_eq!(
///     encode_uuid(&id),
///     [4, 3, 2, 1, 6, 5, 8, 7, 9, 10, 11, 12, 13, 14, 15, 16],
/// );
/// ```
pub fn encode_uuid(id: &Uuid) -> [u8; 16] {
    permute(id.as_bytes())
}

/// Decodes a UUID from the first 16 bytes of `buf`.
pub fn decode_uuid(buf: &[u8]) -> Result<(Uuid, usize), CodecError> {
    Uuid::from_wire(buf)
}

impl Wire for Uuid {
    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_slice(&encode_uuid(self));
    }

    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
        let raw: [u8; 16] = src.take_array()?;
        Ok(Uuid::from_bytes(permute(&raw)))
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

impl<T: Wire> Wire for Vec<T> {
    fn encode(&self, dst: &mut impl BufMut) {
        put_len(dst, self.len());
        for item in self {
            item.encode(dst);
        }
    }

    fn decode(src: &mut Reader<'_>) -> Result<Self, CodecError> {
        let count = read_len(src)?;
        // Capacity is capped by the remaining input. Zero-width elements
        // such as `[u8; 0]` still decode past the cap.
        let mut out = Vec::with_capacity(count.min(src.remaining()));
        for _ in 0..count {
            out.push(T::decode(src)?);
        }
        Ok(out)
    }
}

/// Encodes a list as a VLong count followed by each element.
pub fn encode_list<T: Wire>(items: &[T]) -> Vec<u8> {
    let mut out = Vec::new();
    put_len(&mut out, items.len());
    for item in items {
        item.encode(&mut out);
    }
    out
}

/// Decodes a list from the start of `buf`, returning it with the number of
/// bytes consumed (count prefix included).
pub fn decode_list<T: Wire>(buf: &[u8]) -> Result<(Vec<T>, usize), CodecError> {
    Vec::<T>::from_wire(buf)
}
