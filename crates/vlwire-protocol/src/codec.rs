//! The [`Message`] trait and the [`Frame`] that pairs a message with its
//! sequence number.
//!
//! [`Request`](crate::Request) and [`Response`](crate::Response) both know
//! which command they belong to and how to write their own payload. That is
//! all [`Frame::encode`] needs to put a complete packet together, so the
//! envelope code is written once and shared by both directions.
//!
//! Decoding is not part of the trait: which layout to use is decided by the
//! command id in the header, so it goes through the
//! [`Registry`](crate::Registry) instead.

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use crate::envelope::{HEADER_LEN, put_header};
use crate::Command;

/// A typed payload that knows its command and how to encode itself.
pub trait Message {
    /// The command this payload is sent under.
    fn command(&self) -> Command;

    /// Appends the payload bytes (everything after the header) to `dst`.
    fn encode_body(&self, dst: &mut impl BufMut);
}

impl<T: Message> Message for &T {
    fn command(&self) -> Command {
        (**self).command()
    }

    fn encode_body(&self, dst: &mut impl BufMut) {
        (**self).encode_body(dst)
    }
}

/// A decoded message together with the sequence number from its header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame<T> {
    pub sequence: i64,
    pub message: T,
}

impl<T: Message> Frame<T> {
    pub fn new(sequence: i64, message: T) -> Self {
        Self { sequence, message }
    }

    /// The command the message is sent under.
    pub fn command(&self) -> Command {
        self.message.command()
    }

    /// Serializes header and payload into one packet.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + 16);
        put_header(&mut out, self.message.command().id(), self.sequence);
        self.message.encode_body(&mut out);
        out
    }
}
