//! Fixed-width struct fields described by a compact format string.
//!
//! Some payloads are a run of plain integers ("a byte, then two ints")
//! and are easier to describe with a descriptor than field by field:
//!
//! | char | width | type  |
//! |------|-------|-------|
//! | `b`  | 1     | `i8`  |
//! | `h`  | 2     | `i16` |
//! | `i`  | 4     | `i32` |
//! | `q`  | 8     | `i64` |
//!
//! Fields are packed back to back in descriptor order: no padding, no
//! alignment, little-endian. A descriptor is validated once by
//! [`StructFormat::parse`]; an unknown character is a programming error and
//! is reported as [`CodecError::UnsupportedFieldDescriptor`] before any
//! bytes are touched.

use std::fmt;

use bytes::BufMut;

use crate::{CodecError, Reader};

/// The width class of one field in a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Byte,
    Short,
    Int,
    Long,
}

impl FieldKind {
    /// Maps a descriptor character to its field kind.
    pub fn from_char(c: char) -> Result<Self, CodecError> {
        match c {
            'b' => Ok(Self::Byte),
            'h' => Ok(Self::Short),
            'i' => Ok(Self::Int),
            'q' => Ok(Self::Long),
            other => Err(CodecError::UnsupportedFieldDescriptor(other)),
        }
    }

    /// The descriptor character for this kind.
    pub fn as_char(self) -> char {
        match self {
            Self::Byte => 'b',
            Self::Short => 'h',
            Self::Int => 'i',
            Self::Long => 'q',
        }
    }

    /// Width on the wire, in bytes.
    pub fn width(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Short => 2,
            Self::Int => 4,
            Self::Long => 8,
        }
    }
}

/// One decoded field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
}

impl Field {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Byte(_) => FieldKind::Byte,
            Self::Short(_) => FieldKind::Short,
            Self::Int(_) => FieldKind::Int,
            Self::Long(_) => FieldKind::Long,
        }
    }

    /// The value widened to `i64`, whatever its width.
    pub fn as_i64(&self) -> i64 {
        match *self {
            Self::Byte(v) => i64::from(v),
            Self::Short(v) => i64::from(v),
            Self::Int(v) => i64::from(v),
            Self::Long(v) => v,
        }
    }
}

/// A validated struct descriptor such as `"bhiq"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructFormat {
    kinds: Vec<FieldKind>,
}

impl StructFormat {
    /// Parses and validates a descriptor.
    ///
    /// # Errors
    /// [`CodecError::UnsupportedFieldDescriptor`] for the first character
    /// outside `b`, `h`, `i`, `q`.
    pub fn parse(descriptor: &str) -> Result<Self, CodecError> {
        let kinds = descriptor
            .chars()
            .map(FieldKind::from_char)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { kinds })
    }

    /// The field kinds in order.
    pub fn kinds(&self) -> &[FieldKind] {
        &self.kinds
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Total packed size in bytes.
    pub fn size(&self) -> usize {
        self.kinds.iter().map(|k| k.width()).sum()
    }

    /// Reads one value per field from `src`.
    pub fn read(&self, src: &mut Reader<'_>) -> Result<Vec<Field>, CodecError> {
        // Check the whole struct up front so a short buffer fails with the
        // struct's size rather than whichever field happened to run out.
        let available = src.remaining();
        if self.size() > available {
            return Err(CodecError::TruncatedBuffer {
                needed: self.size(),
                available,
            });
        }
        self.kinds
            .iter()
            .map(|kind| -> Result<Field, CodecError> {
                Ok(match kind {
                    FieldKind::Byte => Field::Byte(src.read_i8()?),
                    FieldKind::Short => Field::Short(src.read_i16_le()?),
                    FieldKind::Int => Field::Int(src.read_i32_le()?),
                    FieldKind::Long => Field::Long(src.read_i64_le()?),
                })
            })
            .collect()
    }

    /// Decodes the fields from the start of `buf`, returning them with the
    /// number of bytes consumed (always [`size`](Self::size)).
    pub fn unpack(&self, buf: &[u8]) -> Result<(Vec<Field>, usize), CodecError> {
        let mut r = Reader::new(buf);
        let fields = self.read(&mut r)?;
        Ok((fields, r.position()))
    }

    /// Appends `values` to `dst` in descriptor order.
    ///
    /// # Errors
    /// [`CodecError::FieldMismatch`] if the number of values differs from the
    /// descriptor, or a value's width does not match its position. Nothing
    /// is written in that case.
    pub fn write(&self, values: &[Field], dst: &mut impl BufMut) -> Result<(), CodecError> {
        if let Some(index) = self.first_mismatch(values) {
            let expected = self.kinds.get(index).map_or('\0', |k| k.as_char());
            return Err(CodecError::FieldMismatch { index, expected });
        }
        for value in values {
            match *value {
                Field::Byte(v) => dst.put_i8(v),
                Field::Short(v) => dst.put_i16_le(v),
                Field::Int(v) => dst.put_i32_le(v),
                Field::Long(v) => dst.put_i64_le(v),
            }
        }
        Ok(())
    }

    /// Packs `values` into a fresh buffer of exactly [`size`](Self::size) bytes.
    pub fn pack(&self, values: &[Field]) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(self.size());
        self.write(values, &mut out)?;
        Ok(out)
    }

    fn first_mismatch(&self, values: &[Field]) -> Option<usize> {
        let paired = self.kinds.iter().zip(values);
        for (index, (kind, value)) in paired.enumerate() {
            if value.kind() != *kind {
                return Some(index);
            }
        }
        (values.len() != self.kinds.len()).then(|| self.kinds.len().min(values.len()))
    }
}

impl fmt::Display for StructFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in &self.kinds {
            write!(f, "{}", kind.as_char())?;
        }
        Ok(())
    }
}

/// Total packed size of a descriptor.
pub fn struct_size(descriptor: &str) -> Result<usize, CodecError> {
    StructFormat::parse(descriptor).map(|f| f.size())
}

/// Parses `descriptor` and unpacks it from the start of `buf`.
pub fn unpack(descriptor: &str, buf: &[u8]) -> Result<(Vec<Field>, usize), CodecError> {
    StructFormat::parse(descriptor)?.unpack(buf)
}

/// Parses `descriptor` and packs `values` with it.
pub fn pack(descriptor: &str, values: &[Field]) -> Result<Vec<u8>, CodecError> {
    StructFormat::parse(descriptor)?.pack(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BHIQ: [u8; 15] = [
        0x01, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00, 0x04, 0, 0, 0, 0, 0, 0, 0,
    ];

    #[test]
    fn test_bhiq_unpacks_to_one_two_three_four() {
        let (fields, used) = unpack("bhiq", &BHIQ).unwrap();
        assert_eq!(
            fields,
            vec![Field::Byte(1), Field::Short(2), Field::Int(3), Field::Long(4)]
        );
        assert_eq!(used, 15);
    }

    #[test]
    fn test_bhiq_packs_back_to_the_same_bytes() {
        let values = [Field::Byte(1), Field::Short(2), Field::Int(3), Field::Long(4)];
        assert_eq!(pack("bhiq", &values).unwrap(), BHIQ.to_vec());
    }

    #[test]
    fn test_size_is_sum_of_widths() {
        assert_eq!(struct_size("bhiq").unwrap(), 15);
        assert_eq!(struct_size("").unwrap(), 0);
        assert_eq!(struct_size("qqb").unwrap(), 17);
    }

    #[test]
    fn test_fields_are_signed() {
        let (fields, _) = unpack("bh", &[0xff, 0xfe, 0xff]).unwrap();
        assert_eq!(fields, vec![Field::Byte(-1), Field::Short(-2)]);
        assert_eq!(fields[1].as_i64(), -2);
    }

    #[test]
    fn test_unsupported_descriptor_char_is_rejected() {
        assert_eq!(
            StructFormat::parse("bhx"),
            Err(CodecError::UnsupportedFieldDescriptor('x'))
        );
        assert_eq!(
            struct_size("I"),
            Err(CodecError::UnsupportedFieldDescriptor('I'))
        );
    }

    #[test]
    fn test_short_buffer_reports_whole_struct_size() {
        assert_eq!(
            unpack("bhiq", &BHIQ[..10]),
            Err(CodecError::TruncatedBuffer {
                needed: 15,
                available: 10
            })
        );
    }

    #[test]
    fn test_unpack_ignores_bytes_after_struct() {
        let mut buf = BHIQ.to_vec();
        buf.push(0xEE);
        let (_, used) = unpack("bhiq", &buf).unwrap();
        assert_eq!(used, 15);
    }

    #[test]
    fn test_pack_rejects_wrong_width() {
        let err = pack("bi", &[Field::Byte(1), Field::Short(2)]).unwrap_err();
        assert_eq!(
            err,
            CodecError::FieldMismatch {
                index: 1,
                expected: 'i'
            }
        );
    }

    #[test]
    fn test_pack_rejects_wrong_count() {
        let err = pack("bb", &[Field::Byte(1)]).unwrap_err();
        assert_eq!(
            err,
            CodecError::FieldMismatch {
                index: 1,
                expected: 'b'
            }
        );
    }

    #[test]
    fn test_display_round_trips_descriptor() {
        assert_eq!(StructFormat::parse("qihb").unwrap().to_string(), "qihb");
    }
}
