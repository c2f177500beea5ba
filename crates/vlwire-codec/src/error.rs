//! Error types for the codec layer.
//!
//! Every decoder in this crate works on a bounded byte slice, so the
//! failures fall into two groups: the *data* is wrong (truncated, bad
//! varint, bad UTF-8, negative length) or the *caller's configuration* is
//! wrong (a struct descriptor this codec does not know). Both propagate to
//! the immediate caller; nothing here is ever defaulted or retried.

/// Errors that can occur while encoding or decoding wire values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A VLong never set its stop bit, or the buffer ended mid-field.
    ///
    /// The stop bit is the high bit of the last byte. A VLong is at most
    /// 10 bytes long, so a buffer that runs out before the stop bit is
    /// seen is malformed rather than merely short.
    #[error("malformed varint: stop bit not found in {read} byte(s)")]
    MalformedVarint { read: usize },

    /// A fixed-width or length-prefixed read needs more bytes than remain.
    #[error("truncated buffer: needed {needed} byte(s), {available} available")]
    TruncatedBuffer { needed: usize, available: usize },

    /// String bytes are not valid UTF-8.
    #[error("invalid utf-8 in string field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A VLong used as a length or element count was negative.
    #[error("invalid length prefix: {0}")]
    InvalidLength(i64),

    /// A struct format descriptor contains a character outside `b`, `h`, `i`, `q`.
    ///
    /// This is a configuration error: the descriptor is written by the
    /// programmer, not received from the network.
    #[error("unsupported field descriptor: {0:?}")]
    UnsupportedFieldDescriptor(char),

    /// A value handed to [`StructFormat::pack`](crate::StructFormat::pack)
    /// does not have the width the descriptor asks for at that position.
    #[error("field {index} does not match descriptor {expected:?}")]
    FieldMismatch { index: usize, expected: char },

    /// A body decoded successfully but left unread bytes behind.
    ///
    /// Only produced when the caller asks for strict length checking.
    #[error("{extra} trailing byte(s) after payload")]
    TrailingBytes { extra: usize },
}
