//! Error types for the protocol layer.
//!
//! Codec failures bubble up unchanged through [`ProtocolError::Codec`].
//! The two errors that only make sense once a command id is known (an id
//! nobody registered, and a payload that did not decode) get their own
//! variants so callers can tell them apart without string matching.

use bytes::Bytes;
use vlwire_codec::CodecError;

use crate::{Command, CommandId, CommonResponse};

/// Errors that can occur while framing or dispatching a message.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProtocolError {
    /// A value-level failure: truncated header, bad varint, bad UTF-8, …
    ///
    /// For requests this also carries payload failures, unmasked. A
    /// request is built by our own code, so a bad one is a bug to surface,
    /// not external data to tolerate.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The command id is not in the registry.
    ///
    /// Never replaced by a default or empty message: an id we don't know
    /// is always an error.
    #[error("unknown command id {0}")]
    UnknownCommand(CommandId),

    /// A response header parsed and its command is known, but the payload
    /// did not decode.
    ///
    /// The failure is logged and returned as a value; the caller's session
    /// can carry on with the next packet.
    #[error("failed to decode payload of {}: {}", .0.command, .0.source)]
    PayloadDecodeFailure(Box<PayloadFailure>),
}

impl ProtocolError {
    /// `true` for errors that concern one malformed message and leave the
    /// surrounding session usable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PayloadDecodeFailure(_))
    }

    /// The diagnostics attached to a payload failure, if this is one.
    pub fn payload_failure(&self) -> Option<&PayloadFailure> {
        match self {
            Self::PayloadDecodeFailure(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Everything known about a response that failed to decode.
#[derive(Debug, Clone)]
pub struct PayloadFailure {
    /// The command id from the header.
    pub command: CommandId,

    /// The sequence number from the header.
    pub sequence: i64,

    /// The complete packet as received, header included.
    pub packet: Bytes,

    /// The common response prefix, if it decoded before the failure.
    pub common: Option<CommonResponse>,

    /// What went wrong inside the payload.
    pub source: CodecError,
}

/// A command with a typed layout was offered where only commands without
/// one may travel as opaque bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} has a typed layout and cannot be sent as opaque bytes")]
pub struct TypedCommandError(pub Command);
