//! Algebraic shapes: optionals, owned boxes, pairs, and framed tuples.
//!
//! An optional of a shape whose present encoding starts with a nonzero
//! size prefix spends no flag byte: the prefix itself is the presence
//! flag and the literal `0` marks absence. Every other optional writes
//! an explicit one-byte flag. `Box<T>` is an allocation detail, wire
//! identical to its payload; absence on the wire (a tombstone or an
//! inline null produced by a peer) decodes to the boxed default, which
//! is the cycle-breaking rule for recursive aggregates.
//!
//! Pairs are unframed — two encodings back to back — which is exactly
//! why map bytes decode into a list of pairs. Wider tuples carry a
//! `arity + 1` predecode prefix and evolve like aggregates: a reader
//! with more positions than the stream fills the tail with defaults,
//! while a stream with more positions than the reader is incompatible.

use crate::codec::{unpack_field, Codec};
use crate::error::{Error, Result};
use crate::fingerprint::{Tag, TypeList};
use crate::wire::{Packer, Unpacker};

impl<T: Codec> Codec for Option<T> {
    fn pack(&self, out: &mut Packer<'_>) {
        if T::INLINE_OPTION {
            match self {
                Some(v) => v.pack(out),
                None => out.write_u8(0),
            }
        } else {
            match self {
                Some(v) => {
                    out.write_u8(1);
                    v.pack(out);
                }
                None => out.write_u8(0),
            }
        }
    }

    fn unpack(r: &mut Unpacker<'_>) -> Result<Self> {
        if T::INLINE_OPTION {
            if r.peek_u8()? != 0 {
                Ok(Some(T::unpack(r)?))
            } else {
                r.read_u8()?;
                Ok(None)
            }
        } else if r.read_u8()? != 0 {
            Ok(Some(T::unpack(r)?))
        } else {
            Ok(None)
        }
    }

    fn shape(list: &mut TypeList) {
        list.tag(Tag::Optional);
        T::shape(list);
    }
}

impl<T: Codec> Codec for Box<T> {
    const PREDECODE: Option<u64> = T::PREDECODE;
    const INLINE_OPTION: bool = T::INLINE_OPTION;

    fn pack(&self, out: &mut Packer<'_>) {
        (**self).pack(out);
    }

    fn unpack(r: &mut Unpacker<'_>) -> Result<Self> {
        Ok(Box::new(T::unpack(r)?))
    }

    fn pack_predecoded(&self, out: &mut Packer<'_>) {
        (**self).pack_predecoded(out);
    }

    fn unpack_predecoded(r: &mut Unpacker<'_>, pd: u64) -> Result<Self> {
        Ok(Box::new(T::unpack_predecoded(r, pd)?))
    }

    fn shape(list: &mut TypeList) {
        list.tag(Tag::OwnedBox);
        T::shape(list);
    }
}

impl<A: Codec, B: Codec> Codec for (A, B) {
    fn pack(&self, out: &mut Packer<'_>) {
        self.0.pack(out);
        self.1.pack(out);
    }

    fn unpack(r: &mut Unpacker<'_>) -> Result<Self> {
        let a = A::unpack(r)?;
        let b = B::unpack(r)?;
        Ok((a, b))
    }

    fn shape(list: &mut TypeList) {
        list.tag(Tag::Pair);
        A::shape(list);
        B::shape(list);
    }
}

macro_rules! impl_tuple_codec {
    ( $arity:expr => $( $T:ident . $idx:tt ),+ ) => {
        impl<$( $T: Codec + Default ),+> Codec for ($( $T, )+) {
            const PREDECODE: Option<u64> = Some($arity + 1);

            fn pack(&self, out: &mut Packer<'_>) {
                out.write_sz($arity + 1);
                self.pack_predecoded(out);
            }

            fn pack_predecoded(&self, out: &mut Packer<'_>) {
                $( self.$idx.pack(out); )+
            }

            fn unpack(r: &mut Unpacker<'_>) -> Result<Self> {
                let pd = r.read_sz()?;
                Self::unpack_predecoded(r, pd)
            }

            fn unpack_predecoded(r: &mut Unpacker<'_>, pd: u64) -> Result<Self> {
                if pd == 0 {
                    return Ok(Default::default());
                }
                let mut remaining = pd - 1;
                if remaining > $arity {
                    return Err(Error::Incompatible {
                        expected: $arity,
                        actual: remaining as usize,
                    });
                }
                Ok(($( unpack_field::<$T>(r, &mut remaining)?, )+))
            }

            fn shape(list: &mut TypeList) {
                list.tag(Tag::Tuple);
                $( $T::shape(list); )+
            }
        }
    };
}

impl_tuple_codec!(3 => A.0, B.1, C.2);
impl_tuple_codec!(4 => A.0, B.1, C.2, D.3);
impl_tuple_codec!(5 => A.0, B.1, C.2, D.3, E.4);
impl_tuple_codec!(6 => A.0, B.1, C.2, D.3, E.4, F.5);
impl_tuple_codec!(7 => A.0, B.1, C.2, D.3, E.4, F.5, G.6);
impl_tuple_codec!(8 => A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);
impl_tuple_codec!(9 => A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8);
impl_tuple_codec!(10 => A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9);
impl_tuple_codec!(11 => A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9, K.10);
impl_tuple_codec!(12 => A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9, K.10, L.11);
