//! Unified error type for the vlwire crates.

use vlwire_codec::CodecError;
use vlwire_protocol::ProtocolError;

/// Top-level error that wraps every crate-specific error.
///
/// Code that uses the `vlwire` meta crate can return this one type and let
/// `?` convert sub-crate errors through the generated `From` impls.
#[derive(Debug, thiserror::Error)]
pub enum VlwireError {
    /// A value-level error (varint, string, truncated buffer, …).
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A message-level error (unknown command, payload failure).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Rendering a decoded value as JSON failed.
    #[cfg(feature = "json")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl VlwireError {
    /// `true` when the error concerns a single malformed message and the
    /// caller can move on to the next one.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Protocol(err) => err.is_recoverable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlwire_protocol::CommandId;

    #[test]
    fn test_from_codec_error() {
        let err = CodecError::MalformedVarint { read: 10 };
        let vlwire_err: VlwireError = err.into();
        assert!(matches!(vlwire_err, VlwireError::Codec(_)));
        assert!(vlwire_err.to_string().contains("stop bit"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::UnknownCommand(CommandId(0xFFFF));
        let vlwire_err: VlwireError = err.into();
        assert!(matches!(vlwire_err, VlwireError::Protocol(_)));
        assert!(vlwire_err.to_string().contains("65535"));
        assert!(!vlwire_err.is_recoverable());
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<u8>("not json").unwrap_err();
        let vlwire_err: VlwireError = err.into();
        assert!(matches!(vlwire_err, VlwireError::Json(_)));
    }
}
