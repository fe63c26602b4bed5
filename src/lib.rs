//! `omnipack` — a schema-evolving structured-data serialization engine.
//!
//! The crate exchanges user-defined aggregate values over a compact
//! positional wire format, in two renderings that share one data model:
//! a binary codec ([`pack`] / [`unpack`]) and a textual table-literal
//! codec ([`text::parse`] / [`text::format`]). Schemas evolve without
//! breaking peers of other versions: fields append, retire into
//! [`Deprecated`] tombstones, or hide behind [`Omit`]; the
//! backwards-compatible tail frame lets old readers skip fields they
//! have never heard of. [`fingerprint`] digests a type's structure into
//! a stable 32-bit identifier for out-of-band skew detection.
//!
//! Aggregates are declared through [`codec_struct!`], sum types through
//! [`codec_variant!`], integer constant sets through [`codec_enum!`],
//! and opaque user codecs through [`codec_custom!`].
//!
//! ```
//! use omnipack::{codec_struct, pack, unpack};
//!
//! codec_struct! {
//!     #[derive(Debug, Clone, Default, PartialEq)]
//!     pub struct Endpoint {
//!         pub host: String,
//!         pub port: u16,
//!     }
//!     traits = backwards_compatible;
//! }
//!
//! let ep = Endpoint { host: "relay".into(), port: 9000 };
//! let bytes = pack(&ep);
//! assert_eq!(unpack::<Endpoint>(&bytes).unwrap(), ep);
//! ```

pub mod aggregate;
pub mod buffer;
pub mod codec;
pub mod error;
pub mod fingerprint;
pub mod text;
pub mod util;
pub mod wire;

pub use crate::aggregate::{Deprecated, Omit, Traits};
pub use crate::buffer::{ReadCursor, SizeMarker, WriteBuffer};
pub use crate::codec::{
    pack, pack_into, pack_with, unpack, unpack_with, Codec, MAX_DECODE_ELEMENTS,
};
pub use crate::error::{Error, Result};
pub use crate::fingerprint::{fingerprint, type_name, Tag, TypeList};
pub use crate::wire::{Mode, Packer, Unpacker};
