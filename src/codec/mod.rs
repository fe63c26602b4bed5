//! Type-driven dispatch: the [`Codec`] trait and the `pack`/`unpack`
//! entry points.
//!
//! Every supported shape — primitive, aggregate, container, optional,
//! owned box, pair, tuple, sum, enum, custom, and the deprecation and
//! omission wrappers — implements `Codec`. Dispatch is purely on the
//! static type: the wire carries no per-field descriptors and no names,
//! only the framing each shape's rules call for.
//!
//! # The predecode protocol
//!
//! A shape whose framing *starts with a prefix fixed by the type alone*
//! (non-immutable aggregates, tuples, and deprecation wrappers around
//! them) advertises that prefix in [`Codec::PREDECODE`]. Containers
//! exploit it: instead of repeating the prefix in front of every
//! element, they hoist it once after their own count and then write each
//! element in *predecoded* form ([`Codec::pack_predecoded`] /
//! [`Codec::unpack_predecoded`]). Readers must produce identical results
//! whether or not the writer hoisted; the prefix value is the same
//! either way.
//!
//! # Early-stop decoding
//!
//! Aggregate and tuple decoding stops early — leaving remaining fields
//! default-initialized — when the stored field count runs out or the
//! stream ends at a field boundary. This is what lets an old writer talk
//! to a new reader without any framing at all; the backwards-compatible
//! tail frame (see [`crate::aggregate`]) covers the opposite direction.

use crate::buffer::WriteBuffer;
use crate::error::{Error, Result};
use crate::fingerprint::TypeList;
use crate::wire::{Mode, Packer, Unpacker};

mod adt;
mod prim;
mod seq;

/// Decoded container counts above this cap are rejected with
/// `OutOfMemory` before any allocation.
pub const MAX_DECODE_ELEMENTS: usize = 1_000_000;

/// A shape the binary codec knows how to frame.
pub trait Codec: Sized {
    /// Static framing prefix, present exactly when the shape is
    /// predecode-eligible.
    const PREDECODE: Option<u64> = None;

    /// True when the shape's present encoding begins with a size prefix
    /// that is never zero, letting `Option`/`Box` reuse the literal `0`
    /// byte as their absence marker instead of spending a flag byte.
    const INLINE_OPTION: bool = false;

    /// Wire slots this shape occupies as an aggregate field: `1` for
    /// everything except the omission wrapper's `0`.
    const VISIBLE: u64 = 1;

    fn pack(&self, out: &mut Packer<'_>);

    fn unpack(r: &mut Unpacker<'_>) -> Result<Self>;

    /// Encoding with the [`PREDECODE`](Self::PREDECODE) prefix omitted
    /// (a container wrote it once for every element).
    fn pack_predecoded(&self, out: &mut Packer<'_>) {
        self.pack(out);
    }

    /// Decoding against a hoisted prefix value.
    fn unpack_predecoded(r: &mut Unpacker<'_>, pd: u64) -> Result<Self> {
        let _ = pd;
        Self::unpack(r)
    }

    /// Appends this shape's contribution to the canonical type-shape
    /// sequence hashed by [`fingerprint`](crate::fingerprint::fingerprint).
    fn shape(list: &mut TypeList);
}

/// Packs `value` into a fresh buffer in [`Mode::Fixed`].
pub fn pack<T: Codec>(value: &T) -> Vec<u8> {
    pack_with(value, Mode::Fixed)
}

/// Packs `value` into a fresh buffer in the given mode.
pub fn pack_with<T: Codec>(value: &T, mode: Mode) -> Vec<u8> {
    let mut buf = WriteBuffer::new();
    pack_into(value, &mut buf, mode);
    buf.into_bytes()
}

/// Packs `value` onto the end of a caller-owned buffer.
pub fn pack_into<T: Codec>(value: &T, out: &mut WriteBuffer, mode: Mode) {
    let mut p = Packer::new(out, mode);
    value.pack(&mut p);
}

/// Unpacks a `T` from `bytes` in [`Mode::Fixed`].
pub fn unpack<T: Codec>(bytes: &[u8]) -> Result<T> {
    unpack_with(bytes, Mode::Fixed)
}

/// Unpacks a `T` from `bytes` in the given mode. Bytes trailing a
/// complete top-level value are ignored.
pub fn unpack_with<T: Codec>(bytes: &[u8], mode: Mode) -> Result<T> {
    let mut r = Unpacker::new(bytes, mode);
    T::unpack(&mut r)
}

/// Decodes one aggregate field slot, honoring the early-stop rule: once
/// the stored count is exhausted or the stream has ended, every
/// remaining slot keeps its default. Omission-wrapped slots consume
/// neither bytes nor count.
pub fn unpack_field<T: Codec + Default>(r: &mut Unpacker<'_>, remaining: &mut u64) -> Result<T> {
    if T::VISIBLE == 0 {
        return Ok(T::default());
    }
    if *remaining == 0 || r.at_end() {
        return Ok(T::default());
    }
    *remaining -= 1;
    T::unpack(r)
}

/// Validates a decoded element count against [`MAX_DECODE_ELEMENTS`].
pub(crate) fn checked_count(stored: u64) -> Result<usize> {
    let n = usize::try_from(stored).map_err(|_| Error::OutOfMemory {
        requested: usize::MAX,
        limit: MAX_DECODE_ELEMENTS,
    })?;
    if n > MAX_DECODE_ELEMENTS {
        return Err(Error::OutOfMemory {
            requested: n,
            limit: MAX_DECODE_ELEMENTS,
        });
    }
    Ok(n)
}
