//! Packet-level encode and decode.
//!
//! The [`Dispatcher`] turns a whole packet into a typed [`Frame`] and back:
//!
//! 1. Read the 10-byte header. A short packet is a codec error.
//! 2. Look the command id up in the [`Registry`]. No entry means
//!    [`ProtocolError::UnknownCommand`], always.
//! 3. Decode the payload with the entry's decoder.
//!
//! The two directions treat a failure in step 3 differently. Requests are
//! produced by our own code, so a bad request payload propagates as the
//! underlying [`CodecError`]. Responses come from the server; a bad one is
//! logged with a hex dump and reported as
//! [`ProtocolError::PayloadDecodeFailure`], which carries everything needed
//! to look at the packet later and leaves the caller free to carry on.

use std::fmt::Write as _;

use bytes::Bytes;
use tracing::{debug, trace, warn};
use vlwire_codec::{CodecError, Reader, Wire};

use crate::codec::{Frame, Message};
use crate::envelope::read_header;
use crate::error::PayloadFailure;
use crate::{
    CommonResponse, DispatchConfig, ProtocolError, Registry, RegistryEntry, Request, Response,
};

/// Encodes and decodes whole packets against a [`Registry`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: DispatchConfig,
    registry: &'static Registry,
}

impl Dispatcher {
    /// A dispatcher over the global registry.
    pub fn new(config: DispatchConfig) -> Self {
        Self::with_registry(config, Registry::global())
    }

    pub fn with_registry(config: DispatchConfig, registry: &'static Registry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    /// Builds a request packet: header followed by the encoded payload.
    pub fn encode_request(&self, sequence: i64, request: &Request) -> Vec<u8> {
        let packet = Frame::new(sequence, request).encode();
        trace!(command = %request.command(), sequence, len = packet.len(), "encoded request");
        packet
    }

    /// Parses a request packet.
    ///
    /// # Errors
    /// - [`ProtocolError::Codec`] for a short header or a payload that does
    ///   not match its command's layout.
    /// - [`ProtocolError::UnknownCommand`] for an unregistered id.
    pub fn parse_request(&self, packet: &[u8]) -> Result<Frame<Request>, ProtocolError> {
        let mut r = Reader::new(packet);
        let (id, sequence) = read_header(&mut r)?;
        let entry = self
            .registry
            .lookup(id)
            .ok_or(ProtocolError::UnknownCommand(id))?;

        let request = entry.decode_request(&mut r)?;
        self.check_trailing(&r)?;
        debug!(command = %id, sequence, "parsed request");
        Ok(Frame::new(sequence, request))
    }

    // -----------------------------------------------------------------------
    // Responses
    // -----------------------------------------------------------------------

    /// Builds a response packet: header, common prefix, then the body.
    pub fn encode_response(&self, sequence: i64, response: &Response) -> Vec<u8> {
        Frame::new(sequence, response).encode()
    }

    /// Parses a response packet.
    ///
    /// # Errors
    /// - [`ProtocolError::Codec`] for a short header.
    /// - [`ProtocolError::UnknownCommand`] for an unregistered id.
    /// - [`ProtocolError::PayloadDecodeFailure`] when the header is fine
    ///   but the payload is not. A warning with a hex dump of the packet is
    ///   logged before returning.
    pub fn parse_response(&self, packet: &[u8]) -> Result<Frame<Response>, ProtocolError> {
        let mut r = Reader::new(packet);
        let (id, sequence) = read_header(&mut r)?;
        let entry = self
            .registry
            .lookup(id)
            .ok_or(ProtocolError::UnknownCommand(id))?;

        let mut common = None;
        match self.decode_response_payload(&mut r, entry, &mut common) {
            Ok(response) => {
                debug!(command = %id, sequence, "parsed response");
                Ok(Frame::new(sequence, response))
            }
            Err(source) => {
                warn!(
                    command = %id,
                    sequence,
                    len = packet.len(),
                    packet = %hex_dump(packet, self.config.hex_dump_limit),
                    error = %source,
                    "failed to decode response payload"
                );
                Err(ProtocolError::PayloadDecodeFailure(Box::new(PayloadFailure {
                    command: id,
                    sequence,
                    packet: Bytes::copy_from_slice(packet),
                    common,
                    source,
                })))
            }
        }
    }

    /// Decodes prefix and body. `common` is filled in as soon as the prefix
    /// decodes, so it survives a failure further on.
    fn decode_response_payload(
        &self,
        r: &mut Reader<'_>,
        entry: &RegistryEntry,
        common: &mut Option<CommonResponse>,
    ) -> Result<Response, CodecError> {
        let prefix = common.insert(CommonResponse::decode(r)?).clone();
        let body = entry.decode_response(r)?;
        self.check_trailing(r)?;
        Ok(Response::new(prefix, body))
    }

    fn check_trailing(&self, r: &Reader<'_>) -> Result<(), CodecError> {
        if self.config.reject_trailing_bytes {
            r.finish()
        } else {
            Ok(())
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Free functions over the default configuration
// ---------------------------------------------------------------------------

/// [`Dispatcher::encode_request`] with the default configuration.
pub fn encode_request(sequence: i64, request: &Request) -> Vec<u8> {
    Dispatcher::default().encode_request(sequence, request)
}

/// [`Dispatcher::encode_response`] with the default configuration.
pub fn encode_response(sequence: i64, response: &Response) -> Vec<u8> {
    Dispatcher::default().encode_response(sequence, response)
}

/// [`Dispatcher::parse_request`] with the default configuration.
pub fn parse_request(packet: &[u8]) -> Result<Frame<Request>, ProtocolError> {
    Dispatcher::default().parse_request(packet)
}

/// [`Dispatcher::parse_response`] with the default configuration.
pub fn parse_response(packet: &[u8]) -> Result<Frame<Response>, ProtocolError> {
    Dispatcher::default().parse_response(packet)
}

/// Renders up to `limit` bytes as space-separated hex, noting how many
/// bytes were left out.
pub fn hex_dump(bytes: &[u8], limit: usize) -> String {
    let shown = &bytes[..bytes.len().min(limit)];
    let mut out = String::with_capacity(shown.len() * 3 + 16);
    for b in shown {
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "{b:02x}");
    }
    let omitted = bytes.len() - shown.len();
    if omitted > 0 {
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "… (+{omitted} bytes)");
    }
    out
}
