//! Binary value codecs for vlwire.
//!
//! This crate knows how single *values* look on the wire. It has no idea
//! what a command is; that lives one layer up in `vlwire-protocol`.
//!
//! - **VLong** ([`encode_vlong`], [`decode_vlong`], [`VLong`]) — the
//!   protocol's own variable-length signed integer, 1 to 10 bytes.
//! - **Composites** ([`encode_string`], [`encode_uuid`], [`encode_list`]
//!   and their decoders) — length-prefixed UTF-8, the byte-swapped UUID
//!   layout, and count-prefixed homogeneous lists.
//! - **Struct fields** ([`StructFormat`]) — runs of fixed-width integers
//!   described by a `"bhiq"`-style descriptor.
//! - **[`Wire`]** — the trait that ties these together so payload types can
//!   be encoded and decoded field by field.
//!
//! Every decoder takes a bounded slice (directly or through a [`Reader`])
//! and reports how many bytes it consumed. No decoder reads past the slice
//! it was handed.
//!
//! ```text
//! Protocol (commands, envelopes) → Codec (values) → bytes
//! ```

mod error;
mod fields;
mod reader;
mod vlong;
mod wire;

pub use error::CodecError;
pub use fields::{Field, FieldKind, StructFormat, pack, struct_size, unpack};
pub use reader::Reader;
pub use vlong::{MAX_VLONG_LEN, decode_vlong, encode_vlong, put_vlong, read_vlong, vlong_len};
pub use wire::{
    VLong, Wire, decode_list, decode_string, decode_uuid, encode_list, encode_string,
    encode_uuid,
};
