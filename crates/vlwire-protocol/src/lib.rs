//! Command envelopes, typed payloads and dispatch for vlwire.
//!
//! This crate knows what the *messages* are. The value encodings it builds
//! on live one layer down in `vlwire-codec`.
//!
//! - **Commands** ([`CommandId`], [`Command`]) — the 16-bit ids that pick
//!   a payload layout.
//! - **Envelope** ([`Envelope`], [`Sequencer`]) — the 10-byte header in
//!   front of every message.
//! - **Payloads** ([`Request`], [`Response`], [`CommonResponse`]) — what
//!   each command carries.
//! - **Dispatch** ([`Registry`], [`Dispatcher`], [`parse_request`],
//!   [`parse_response`]) — turning a packet into a typed [`Frame`] and back.
//! - **Errors** ([`ProtocolError`]) — unknown commands and payloads that
//!   fail to decode.
//!
//! ```text
//! Packet → Envelope header → Registry lookup → Request / Response
//! ```
//!
//! ## Example
//!
//! ```rust
//! use vlwire_protocol::{Page, Request, Sequencer, encode_request, parse_request};
//!
//! let seq = Sequencer::new();
//! let packet = encode_request(seq.next_sequence(), &Request::GetPresentBox(Page { page: 0 }));
//!
//! let frame = parse_request(&packet).unwrap();
//! assert_eq!(frame.sequence, 1);
//! assert_eq!(frame.message, Request::GetPresentBox(Page { page: 0 }));
//! ```

#[macro_use]
mod macros;

mod codec;
mod command;
mod config;
mod dispatch;
mod envelope;
mod error;
mod registry;
mod request;
mod response;

pub use codec::{Frame, Message};
pub use command::{Command, CommandId};
pub use config::DispatchConfig;
pub use dispatch::{
    Dispatcher, encode_request, encode_response, hex_dump, parse_request, parse_response,
};
pub use envelope::{Envelope, HEADER_LEN, Sequencer, put_header, read_header};
pub use error::{PayloadFailure, ProtocolError, TypedCommandError};
pub use registry::{Registry, RegistryEntry, RequestDecoder, ResponseDecoder};
pub use request::{
    GetValue, Hello, LimitedLoginBonus, LoginUser, MissionInfo, Nonce, Page, PersonalMessage,
    ReceivePresentBox, Request, RequestLogin, SetNextLoginBonusItem, UntypedRequest,
};
pub use response::{
    CommonResponse, MissionSetInfoPage, NewDayStatus, PresentBoxPage, ReceivedPresents, Response,
    ResponseBody, UntypedResponse,
};
