//! Aggregate declaration: traits, the deprecation and omission
//! wrappers, and the `codec_*!` macros that generate codec impls from a
//! type declaration.
//!
//! The binary format is positional: an aggregate is its fields in
//! declaration order, nothing else. Schema evolution rests on four
//! rules the macros enforce by construction:
//!
//! * new fields append — arity never shrinks;
//! * a retired field becomes [`Deprecated<T>`], which keeps its wire
//!   slot alive with a zero tombstone;
//! * an [`Omit<T>`] field is locally derived state and never touches
//!   the wire, in either codec, in either direction;
//! * reordering or changing a field's shape is a new type (and a new
//!   fingerprint), not an evolution.
//!
//! # Framing
//!
//! A default-trait aggregate opens with the predecode prefix
//! `visible * 4 + 2 | bc`. The constant `2` bit keeps every live
//! predecode nonzero, which is what distinguishes it from a deprecation
//! tombstone; `bc` announces a four-byte tail-size frame that lets an
//! older reader skip trailing fields it has never heard of. An
//! `immutable` aggregate promises never to evolve and drops the prefix
//! entirely, concatenating bare fields.

use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use crate::codec::Codec;
use crate::error::Result;
use crate::fingerprint::TypeList;
use crate::wire::{Packer, Unpacker};

/// Compile-time traits of an aggregate, composable with
/// [`with`](Traits::with).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traits(u8);

impl Traits {
    pub const NONE: Traits = Traits(0);
    /// The aggregate carries a four-byte tail-size frame so readers can
    /// skip unknown trailing fields.
    pub const BACKWARDS_COMPATIBLE: Traits = Traits(1);
    /// The aggregate's schema may never change; fields are concatenated
    /// without a predecode prefix.
    pub const IMMUTABLE: Traits = Traits(2);

    pub const fn with(self, other: Traits) -> Traits {
        Traits(self.0 | other.0)
    }

    pub const fn contains(self, other: Traits) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for Traits {
    fn default() -> Self {
        Traits::NONE
    }
}

/// Predecode prefix of an aggregate with the given visible field count
/// and traits.
pub const fn predecode_info(visible: u64, traits: Traits) -> u64 {
    visible * 4
        + 2
        + if traits.contains(Traits::BACKWARDS_COMPATIBLE) {
            1
        } else {
            0
        }
}

/// Field wrapper invisible to both codecs: never emitted, never
/// consumed, never counted toward arity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Omit<T>(pub T);

impl<T> Deref for Omit<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Omit<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> From<T> for Omit<T> {
    fn from(v: T) -> Self {
        Omit(v)
    }
}

impl<T: Default> Codec for Omit<T> {
    const VISIBLE: u64 = 0;

    fn pack(&self, _out: &mut Packer<'_>) {}

    fn unpack(_r: &mut Unpacker<'_>) -> Result<Self> {
        Ok(Omit(T::default()))
    }

    fn shape(_list: &mut TypeList) {}
}

/// Placeholder for a retired field: preserves the wire slot, carries no
/// value.
///
/// Encoding writes the single tombstone byte `0`. Decoding still
/// understands peers that carry the live field — a nonzero lookahead
/// byte means a full legacy payload follows, which is read and
/// discarded.
pub struct Deprecated<T>(PhantomData<T>);

impl<T> Deprecated<T> {
    pub fn new() -> Self {
        Deprecated(PhantomData)
    }
}

impl<T> Default for Deprecated<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Deprecated<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Copy for Deprecated<T> {}

impl<T> Debug for Deprecated<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Deprecated")
    }
}

impl<T> PartialEq for Deprecated<T> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T> Eq for Deprecated<T> {}

impl<T: Codec> Codec for Deprecated<T> {
    // predecode-eligible exactly when the retired shape was, so that
    // containers of tombstones still hoist
    const PREDECODE: Option<u64> = if T::PREDECODE.is_some() {
        Some(0)
    } else {
        None
    };

    fn pack(&self, out: &mut Packer<'_>) {
        out.write_u8(0);
    }

    fn pack_predecoded(&self, _out: &mut Packer<'_>) {}

    fn unpack(r: &mut Unpacker<'_>) -> Result<Self> {
        if r.peek_u8()? != 0 {
            let _ = T::unpack(r)?;
        } else {
            r.read_u8()?;
        }
        Ok(Self::new())
    }

    fn unpack_predecoded(r: &mut Unpacker<'_>, pd: u64) -> Result<Self> {
        if pd != 0 {
            let _ = T::unpack_predecoded(r, pd)?;
        }
        Ok(Self::new())
    }

    fn shape(list: &mut TypeList) {
        T::shape(list);
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __codec_trait {
    (backwards_compatible) => {
        $crate::Traits::BACKWARDS_COMPATIBLE
    };
    (immutable) => {
        $crate::Traits::IMMUTABLE
    };
}

/// Declares an aggregate and generates its binary and text codec impls.
///
/// ```
/// use omnipack::codec_struct;
///
/// codec_struct! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct Endpoint {
///         pub host: String,
///         pub port: u16,
///     }
///     traits = backwards_compatible;
/// }
/// ```
///
/// The struct must also derive (or implement) `Default`; decoding
/// leaves unstored fields default-initialized. Optional trailing
/// clauses:
///
/// * `traits = backwards_compatible | immutable;` — compile-time
///   aggregate traits (default none);
/// * `post_decode;` — names an inherent
///   `fn post_decode(&mut self) -> omnipack::Result<()>` to run as a
///   validation hook after every successful binary or text decode.
#[macro_export]
macro_rules! codec_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ftype:ty ),* $(,)?
        }
        traits = $($tr:ident)|+ ;
        post_decode ;
    ) => {
        $crate::__codec_struct_impl! {
            $(#[$meta])*
            $vis struct $Name {
                $( $(#[$fmeta])* $fvis $field : $ftype ),*
            }
            traits = [ $($tr)+ ]
            hook = [ post_decode ]
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ftype:ty ),* $(,)?
        }
        traits = $($tr:ident)|+ ;
    ) => {
        $crate::__codec_struct_impl! {
            $(#[$meta])*
            $vis struct $Name {
                $( $(#[$fmeta])* $fvis $field : $ftype ),*
            }
            traits = [ $($tr)+ ]
            hook = [ ]
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ftype:ty ),* $(,)?
        }
        post_decode ;
    ) => {
        $crate::__codec_struct_impl! {
            $(#[$meta])*
            $vis struct $Name {
                $( $(#[$fmeta])* $fvis $field : $ftype ),*
            }
            traits = [ ]
            hook = [ post_decode ]
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ftype:ty ),* $(,)?
        }
    ) => {
        $crate::__codec_struct_impl! {
            $(#[$meta])*
            $vis struct $Name {
                $( $(#[$fmeta])* $fvis $field : $ftype ),*
            }
            traits = [ ]
            hook = [ ]
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __codec_struct_impl {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ftype:ty ),* $(,)?
        }
        traits = [ $($tr:ident)* ]
        hook = [ $($hook:ident)? ]
    ) => {
        $(#[$meta])*
        $vis struct $Name {
            $( $(#[$fmeta])* $fvis $field : $ftype, )*
        }

        impl $Name {
            /// Field names in declaration order; consumed by the text
            /// codec only.
            pub const FIELD_NAMES: &'static [&'static str] = &[ $( stringify!($field) ),* ];

            #[doc(hidden)]
            pub const __TRAITS: $crate::Traits =
                $crate::Traits::NONE $( .with($crate::__codec_trait!($tr)) )*;

            #[doc(hidden)]
            pub const __VISIBLE: u64 = 0 $( + <$ftype as $crate::Codec>::VISIBLE )*;
        }

        const _: () = {
            let arity = 0usize $( + { let _ = stringify!($field); 1 } )*;
            assert!(arity < 250, "aggregates are limited to 249 fields");
        };

        impl $crate::Codec for $Name {
            const PREDECODE: ::core::option::Option<u64> =
                if Self::__TRAITS.contains($crate::Traits::IMMUTABLE) {
                    ::core::option::Option::None
                } else {
                    ::core::option::Option::Some($crate::aggregate::predecode_info(
                        Self::__VISIBLE,
                        Self::__TRAITS,
                    ))
                };

            fn pack(&self, out: &mut $crate::Packer<'_>) {
                if let ::core::option::Option::Some(pd) = Self::PREDECODE {
                    out.write_sz(pd);
                }
                $crate::Codec::pack_predecoded(self, out);
            }

            fn pack_predecoded(&self, out: &mut $crate::Packer<'_>) {
                let marker = if Self::__TRAITS.contains($crate::Traits::BACKWARDS_COMPATIBLE) {
                    ::core::option::Option::Some(out.push())
                } else {
                    ::core::option::Option::None
                };
                $( $crate::Codec::pack(&self.$field, out); )*
                if let ::core::option::Option::Some(m) = marker {
                    out.pop(m);
                }
            }

            fn unpack(r: &mut $crate::Unpacker<'_>) -> $crate::Result<Self> {
                let pd = match Self::PREDECODE {
                    ::core::option::Option::Some(_) => r.read_sz()?,
                    ::core::option::Option::None => $crate::aggregate::predecode_info(
                        Self::__VISIBLE,
                        Self::__TRAITS,
                    ),
                };
                <Self as $crate::Codec>::unpack_predecoded(r, pd)
            }

            fn unpack_predecoded(r: &mut $crate::Unpacker<'_>, pd: u64) -> $crate::Result<Self> {
                #[allow(unused_mut)]
                let mut value = <Self as ::core::default::Default>::default();
                if pd == 0 {
                    return ::core::result::Result::Ok(value);
                }
                let bc = pd & 1 != 0;
                #[allow(unused_mut)]
                let mut remaining = pd >> 2;
                let frame_end = if bc {
                    ::core::option::Option::Some(r.enter()?)
                } else {
                    if remaining > Self::__VISIBLE {
                        return ::core::result::Result::Err($crate::Error::Incompatible {
                            expected: Self::__VISIBLE as usize,
                            actual: remaining as usize,
                        });
                    }
                    ::core::option::Option::None
                };
                $( value.$field = $crate::codec::unpack_field(r, &mut remaining)?; )*
                if let ::core::option::Option::Some(end) = frame_end {
                    r.leave(end)?;
                }
                $( $Name::$hook(&mut value)?; )?
                ::core::result::Result::Ok(value)
            }

            fn shape(list: &mut $crate::TypeList) {
                list.tag($crate::Tag::Struct);
                if list.intern(stringify!($Name)) {
                    $( <$ftype as $crate::Codec>::shape(list); )*
                }
            }
        }

        impl $crate::text::TextCodec for $Name {
            fn parse_text(p: &mut $crate::text::TextParser<'_>) -> $crate::Result<Self> {
                p.descend()?;
                #[allow(unused_mut)]
                let mut value = <Self as ::core::default::Default>::default();
                let skip = p.take_skip_initial_scope();
                if !skip {
                    p.table_begin()?;
                    if p.maybe(b'}') {
                        p.ascend();
                        $( $Name::$hook(&mut value)?; )?
                        return ::core::result::Result::Ok(value);
                    }
                }
                match p.table_literal_key()? {
                    $crate::text::KeyToken::Key(first) => {
                        #[allow(unused_mut)]
                        let mut key = first;
                        loop {
                            if !value.__parse_keyed(key, p)? {
                                if !p.options().allow_unknown_keys {
                                    return ::core::result::Result::Err($crate::Error::UnknownKey {
                                        offset: p.offset(),
                                    });
                                }
                                p.skip_value()?;
                            }
                            if !p.table_next() {
                                if !skip {
                                    p.table_end()?;
                                }
                                break;
                            }
                            match p.table_literal_key()? {
                                $crate::text::KeyToken::Key(k) => key = k,
                                $crate::text::KeyToken::End => break,
                                $crate::text::KeyToken::NotKey => {
                                    return ::core::result::Result::Err($crate::Error::BadFormat {
                                        offset: p.offset(),
                                    })
                                }
                            }
                        }
                    }
                    $crate::text::KeyToken::End => {}
                    $crate::text::KeyToken::NotKey => {
                        #[allow(unused_mut)]
                        let mut done = false;
                        $( value.$field = $crate::text::parse_positional_field(p, &mut done, skip)?; )*
                        if !done && !skip {
                            p.table_end()?;
                        }
                    }
                }
                p.ascend();
                $( $Name::$hook(&mut value)?; )?
                ::core::result::Result::Ok(value)
            }

            fn format_text(&self, w: &mut $crate::text::TextWriter) {
                let skip = w.take_skip_initial_scope();
                let at = w.len();
                if !skip {
                    w.begin_table();
                }
                #[allow(unused_mut)]
                let mut wrote = 0u32;
                $( $crate::text::format_field(&self.$field, stringify!($field), w, &mut wrote); )*
                if !skip {
                    w.end_table();
                }
                if wrote == 0 && w.options().omit_default {
                    w.truncate(at);
                }
            }

            fn precheck(c: u8) -> bool {
                c == b'{'
            }

            fn is_default(&self) -> bool {
                true $( && $crate::text::TextCodec::is_default(&self.$field) )*
            }
        }

        impl $Name {
            #[doc(hidden)]
            pub fn __parse_keyed(
                &mut self,
                key: &str,
                p: &mut $crate::text::TextParser<'_>,
            ) -> $crate::Result<bool> {
                $(
                    if key == stringify!($field) {
                        $crate::text::parse_keyed_field(&mut self.$field, p)?;
                        return ::core::result::Result::Ok(true);
                    }
                )*
                let _ = p;
                let _ = key;
                ::core::result::Result::Ok(false)
            }
        }
    };
}

/// Declares a sum type and generates its codec impls. The first
/// alternative (with its payload's default) is the `Default`; binary
/// framing is `sz(active_index + 1)` followed by the active payload.
///
/// ```
/// use omnipack::codec_variant;
///
/// codec_variant! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub enum Setting {
///         Flag(bool),
///         Limit(u16),
///         Path(String),
///     }
/// }
/// ```
#[macro_export]
macro_rules! codec_variant {
    (
        $(#[$meta:meta])*
        $vis:vis enum $Name:ident {
            $(#[$vmeta0:meta])* $var0:ident ( $vty0:ty )
            $( , $(#[$vmeta:meta])* $var:ident ( $vty:ty ) )* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $Name {
            $(#[$vmeta0])* $var0($vty0),
            $( $(#[$vmeta])* $var($vty), )*
        }

        impl ::core::default::Default for $Name {
            fn default() -> Self {
                Self::$var0(<$vty0 as ::core::default::Default>::default())
            }
        }

        impl $crate::Codec for $Name {
            #[allow(irrefutable_let_patterns)]
            fn pack(&self, out: &mut $crate::Packer<'_>) {
                let mut index: u64 = 0;
                if let Self::$var0(v) = self {
                    out.write_sz(index + 1);
                    return $crate::Codec::pack(v, out);
                }
                index += 1;
                $(
                    if let Self::$var(v) = self {
                        out.write_sz(index + 1);
                        return $crate::Codec::pack(v, out);
                    }
                    index += 1;
                )*
                let _ = index;
            }

            fn unpack(r: &mut $crate::Unpacker<'_>) -> $crate::Result<Self> {
                let stored = r.read_sz()?;
                if stored == 0 {
                    return ::core::result::Result::Ok(<Self as ::core::default::Default>::default());
                }
                let want = stored - 1;
                let mut index: u64 = 0;
                if index == want {
                    return ::core::result::Result::Ok(Self::$var0($crate::Codec::unpack(r)?));
                }
                index += 1;
                $(
                    if index == want {
                        return ::core::result::Result::Ok(Self::$var($crate::Codec::unpack(r)?));
                    }
                    index += 1;
                )*
                ::core::result::Result::Err($crate::Error::Incompatible {
                    expected: index as usize,
                    actual: want as usize,
                })
            }

            fn shape(list: &mut $crate::TypeList) {
                list.tag($crate::Tag::Variant);
                <$vty0 as $crate::Codec>::shape(list);
                $( <$vty as $crate::Codec>::shape(list); )*
            }
        }

        impl $crate::text::TextCodec for $Name {
            fn parse_text(p: &mut $crate::text::TextParser<'_>) -> $crate::Result<Self> {
                let c = p.peek_significant()?;
                if <$vty0 as $crate::text::TextCodec>::precheck(c) {
                    let save = p.save();
                    match <$vty0 as $crate::text::TextCodec>::parse_text(p) {
                        ::core::result::Result::Ok(v) => {
                            return ::core::result::Result::Ok(Self::$var0(v))
                        }
                        ::core::result::Result::Err(_) => p.restore(save),
                    }
                }
                $(
                    if <$vty as $crate::text::TextCodec>::precheck(c) {
                        let save = p.save();
                        match <$vty as $crate::text::TextCodec>::parse_text(p) {
                            ::core::result::Result::Ok(v) => {
                                return ::core::result::Result::Ok(Self::$var(v))
                            }
                            ::core::result::Result::Err(_) => p.restore(save),
                        }
                    }
                )*
                if p.options().allow_unknown_variant_values {
                    p.skip_value()?;
                    ::core::result::Result::Ok(<Self as ::core::default::Default>::default())
                } else {
                    ::core::result::Result::Err($crate::Error::BadVariantValue {
                        offset: p.offset(),
                    })
                }
            }

            fn format_text(&self, w: &mut $crate::text::TextWriter) {
                match self {
                    Self::$var0(v) => $crate::text::TextCodec::format_text(v, w),
                    $( Self::$var(v) => $crate::text::TextCodec::format_text(v, w), )*
                }
            }

            fn precheck(c: u8) -> bool {
                <$vty0 as $crate::text::TextCodec>::precheck(c)
                    $( || <$vty as $crate::text::TextCodec>::precheck(c) )*
            }

            #[allow(irrefutable_let_patterns)]
            fn is_default(&self) -> bool {
                if let Self::$var0(v) = self {
                    $crate::text::TextCodec::is_default(v)
                } else {
                    false
                }
            }
        }

        impl $crate::text::TextKey for $Name {
            fn parse_key(
                p: &mut $crate::text::TextParser<'_>,
                _auto: &mut u64,
            ) -> $crate::Result<::core::option::Option<Self>> {
                $crate::text::parse_bracketed_key(p)
            }

            fn format_key(&self, w: &mut $crate::text::TextWriter) {
                $crate::text::format_bracketed_key(self, w);
            }
        }
    };
}

/// Declares a closed integer-backed constant set and generates its
/// codec impls. The wire form is the underlying integer; a decoded
/// value outside the declared set is `Incompatible` in binary and
/// `BadVariantValue` in text.
///
/// ```
/// use omnipack::codec_enum;
///
/// codec_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum Compression : u8 {
///         Off = 0,
///         Fast = 1,
///         Best = 9,
///     }
/// }
/// ```
#[macro_export]
macro_rules! codec_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $Name:ident : $repr:ident {
            $(#[$vmeta0:meta])* $var0:ident = $val0:expr
            $( , $(#[$vmeta:meta])* $var:ident = $val:expr )* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr($repr)]
        $vis enum $Name {
            $(#[$vmeta0])* $var0 = $val0,
            $( $(#[$vmeta])* $var = $val, )*
        }

        impl ::core::default::Default for $Name {
            fn default() -> Self {
                Self::$var0
            }
        }

        impl $Name {
            fn __from_repr(v: $repr) -> ::core::option::Option<Self> {
                if v == $val0 {
                    return ::core::option::Option::Some(Self::$var0);
                }
                $(
                    if v == $val {
                        return ::core::option::Option::Some(Self::$var);
                    }
                )*
                ::core::option::Option::None
            }

            const __COUNT: usize = 1 $( + { let _ = $val; 1 } )*;
        }

        impl $crate::Codec for $Name {
            fn pack(&self, out: &mut $crate::Packer<'_>) {
                $crate::Codec::pack(&(*self as $repr), out);
            }

            fn unpack(r: &mut $crate::Unpacker<'_>) -> $crate::Result<Self> {
                let v = <$repr as $crate::Codec>::unpack(r)?;
                Self::__from_repr(v).ok_or($crate::Error::Incompatible {
                    expected: Self::__COUNT,
                    actual: v as usize,
                })
            }

            fn shape(list: &mut $crate::TypeList) {
                list.tag($crate::Tag::Enum);
            }
        }

        impl $crate::text::TextCodec for $Name {
            fn parse_text(p: &mut $crate::text::TextParser<'_>) -> $crate::Result<Self> {
                let at = p.offset();
                let v = <$repr as $crate::text::TextCodec>::parse_text(p)?;
                Self::__from_repr(v)
                    .ok_or($crate::Error::BadVariantValue { offset: at })
            }

            fn format_text(&self, w: &mut $crate::text::TextWriter) {
                $crate::text::TextCodec::format_text(&(*self as $repr), w);
            }

            fn precheck(c: u8) -> bool {
                <$repr as $crate::text::TextCodec>::precheck(c)
            }

            fn is_default(&self) -> bool {
                ::core::matches!(self, Self::$var0)
            }
        }

        impl $crate::text::TextKey for $Name {
            fn parse_key(
                p: &mut $crate::text::TextParser<'_>,
                _auto: &mut u64,
            ) -> $crate::Result<::core::option::Option<Self>> {
                $crate::text::parse_bracketed_key(p)
            }

            fn format_key(&self, w: &mut $crate::text::TextWriter) {
                $crate::text::format_bracketed_key(self, w);
            }
        }
    };
}

/// Wires a user type with inherent `pack_bytes`/`unpack_bytes` routines
/// (operating directly on the byte-stream adapters) into the binary
/// codec, under a user-chosen fingerprint tag of at least
/// [`FIRST_USER_TAG`](crate::fingerprint::FIRST_USER_TAG).
#[macro_export]
macro_rules! codec_custom {
    ( $Name:ident, tag = $tag:expr ) => {
        impl $crate::Codec for $Name {
            fn pack(&self, out: &mut $crate::Packer<'_>) {
                self.pack_bytes(out.raw());
            }

            fn unpack(r: &mut $crate::Unpacker<'_>) -> $crate::Result<Self> {
                Self::unpack_bytes(r.raw())
            }

            fn shape(list: &mut $crate::TypeList) {
                list.custom_tag($tag);
                list.intern(stringify!($Name));
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{pack, unpack, Deprecated, Omit};

    crate::codec_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct TwoInts {
            a: i32,
            b: i32,
        }
    }

    crate::codec_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Shell {
            inner: Deprecated<TwoInts>,
        }
    }

    crate::codec_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct WithOmit {
            scratch: Omit<String>,
            a: i32,
            b: i32,
        }
    }

    #[test]
    fn predecode_counts_visible_fields_only() {
        use crate::Codec;
        assert_eq!(TwoInts::PREDECODE, Some(10));
        assert_eq!(WithOmit::PREDECODE, Some(10));
        assert_eq!(Shell::PREDECODE, Some(6));
    }

    #[test]
    fn omitted_fields_leave_no_bytes() {
        let plain = TwoInts { a: -1, b: 1000 };
        let omitted = WithOmit {
            scratch: Omit(String::from("runtime-only")),
            a: -1,
            b: 1000,
        };
        assert_eq!(pack(&plain), pack(&omitted));
        let back: WithOmit = unpack(&pack(&plain)).unwrap();
        assert_eq!(back.a, -1);
        assert_eq!(back.b, 1000);
        assert_eq!(*back.scratch, "");
    }

    #[test]
    fn deprecated_writes_tombstone_and_eats_legacy_payloads() {
        let bytes = pack(&Shell::default());
        assert_eq!(bytes, vec![6, 0]);
        // a peer that still carries the live struct
        crate::codec_struct! {
            #[derive(Debug, Clone, Default, PartialEq)]
            struct LiveShell {
                inner: TwoInts,
            }
        }
        let live = pack(&LiveShell {
            inner: TwoInts { a: -1, b: 1000 },
        });
        let dead: Shell = unpack(&live).unwrap();
        assert_eq!(dead, Shell::default());
        // and the tombstone decodes into the live reader as defaults
        let back: LiveShell = unpack(&bytes).unwrap();
        assert_eq!(back.inner, TwoInts::default());
    }
}
