//! # vlwire
//!
//! Client-side codec for a binary game protocol built around a
//! variable-length signed integer ("VLong").
//!
//! This crate re-exports the two layers underneath it and adds the glue a
//! program needs:
//!
//! - [`codec`] — value encodings (VLong, strings, UUIDs, lists, struct
//!   fields).
//! - [`protocol`] — command ids, the envelope, typed payloads and the
//!   dispatcher.
//! - [`VlwireError`] — one error type over both.
//! - [`init_tracing`] — installs a `tracing` subscriber for binaries.
//!
//! ## Quick Start
//!
//! ```rust
//! use vlwire::prelude::*;
//!
//! let seq = Sequencer::new();
//! let packet = encode_request(seq.next_sequence(), &Request::CheckNewDay(Nonce { nonce: 0 }));
//! assert_eq!(packet.len(), HEADER_LEN + 8);
//!
//! match parse_request(&packet) {
//!     Ok(frame) => assert_eq!(frame.sequence, 1),
//!     Err(err) => panic!("{err}"),
//! }
//! ```

mod error;

pub use error::VlwireError;

pub use vlwire_codec as codec;
pub use vlwire_protocol as protocol;

use tracing_subscriber::EnvFilter;

/// Common imports for working with vlwire.
pub mod prelude {
    pub use crate::VlwireError;
    pub use vlwire_codec::{CodecError, Reader, VLong, Wire};
    pub use vlwire_protocol::{
        Command, CommandId, CommonResponse, DispatchConfig, Dispatcher, Envelope, Frame,
        HEADER_LEN, Message, MissionInfo, Nonce, Page, ProtocolError, Request, Response,
        ResponseBody, Sequencer, encode_request, encode_response, parse_request, parse_response,
    };
}

/// Installs a `fmt` subscriber on stderr, filtered by `RUST_LOG`.
///
/// Falls back to `default_directive` (e.g. `"warn"`) when `RUST_LOG` is
/// unset or invalid. Libraries should never call this; it is for binaries.
/// Calling it twice is harmless: the second call does nothing.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Renders any decoded value as pretty-printed JSON.
#[cfg(feature = "json")]
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, VlwireError> {
    Ok(serde_json::to_string_pretty(value)?)
}
