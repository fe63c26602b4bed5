//! The textual codec: a table-literal rendering of the same value
//! graph the binary codec frames.
//!
//! Unlike the binary side, text is keyed — aggregates may spell their
//! fields as `name = value` entries in any order, or positionally.
//! Scalars are plain literals, strings are quoted or long-bracketed,
//! `nil` marks absence, `--` starts a comment. [`parse`] and [`format`]
//! are the entry points; [`prettyprint`] reflows compact output for
//! human eyes.
//!
//! Sum types carry no alternative names in text either: parsing tries
//! each alternative in declaration order, guarded by a one-byte prefix
//! precheck so that obviously hopeless alternatives never run, and the
//! cursor backtracks after each failed attempt.

mod parse;
mod write;

pub use parse::{KeyToken, SavePoint, TextParser};
pub use write::{prettyprint, TextWriter};

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};

use crate::aggregate::{Deprecated, Omit};
use crate::error::{Error, Result};

/// Knobs for [`parse`]. The permissive defaults mirror the decoder's
/// schema-evolution posture: unknown keys and unmatched variant values
/// are skipped, extra positional entries are tolerated.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Recursion cap; exceeding it reports `StackOverflow`.
    pub max_depth: u32,
    /// Tolerate keys that name no declared field (the value is
    /// skipped); strict mode reports `UnknownKey`.
    pub allow_unknown_keys: bool,
    /// Leave a sum type default-constructed when no alternative parses;
    /// strict mode reports `BadVariantValue`.
    pub allow_unknown_variant_values: bool,
    /// Tolerate positional entries beyond a tuple's arity.
    pub allow_unknown_tuple_elements: bool,
    /// Tolerate positional entries beyond a fixed array's length.
    pub allow_extra_array_entries: bool,
    /// Parse a brace-less field list at top level.
    pub skip_initial_scope: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: 256,
            allow_unknown_keys: true,
            allow_unknown_variant_values: true,
            allow_unknown_tuple_elements: true,
            allow_extra_array_entries: true,
            skip_initial_scope: false,
        }
    }
}

/// Knobs for [`format`].
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    /// Omit fields that hold their default value.
    pub omit_default: bool,
    /// Emit aggregates positionally, without field names.
    pub omit_names: bool,
    /// Emit a brace-less field list at top level.
    pub skip_initial_scope: bool,
}

/// A shape the text codec can spell and read back.
pub trait TextCodec: Sized {
    /// Wrappers invisible to the codec set this; their entries are
    /// neither written nor consumed.
    const HIDDEN: bool = false;

    fn parse_text(p: &mut TextParser<'_>) -> Result<Self>;

    fn format_text(&self, w: &mut TextWriter);

    /// One-byte prefix test: could a value of this shape start with
    /// `c`? Sum types use this to prune hopeless alternatives before
    /// attempting a full parse.
    fn precheck(c: u8) -> bool;

    /// Whether this value equals its default, for `omit_default`.
    fn is_default(&self) -> bool {
        false
    }
}

/// Key policy for map-like tables. String keys enjoy the ident sugar,
/// integer keys may be bracketed or auto-assigned positionally, and
/// every other key shape is always bracket-quoted and read by its own
/// parser.
pub trait TextKey: Sized {
    /// Parses one key and its `=`; `Ok(None)` means the closing brace
    /// was consumed instead. `auto` is the running index for key shapes
    /// that support positional auto-assignment.
    fn parse_key(p: &mut TextParser<'_>, auto: &mut u64) -> Result<Option<Self>>;

    fn format_key(&self, w: &mut TextWriter);
}

/// Parses `text` as a `T`.
pub fn parse<T: TextCodec>(text: &str, opts: ParseOptions) -> Result<T> {
    let mut p = TextParser::new(text, opts);
    T::parse_text(&mut p)
}

/// Formats `value` compactly; see [`prettyprint`] for the readable
/// rendering.
pub fn format<T: TextCodec>(value: &T, opts: FormatOptions) -> String {
    let mut w = TextWriter::new(opts);
    value.format_text(&mut w);
    w.into_string()
}

/// Parses one keyed aggregate entry into `slot`; hidden slots skip the
/// value instead.
pub fn parse_keyed_field<T: TextCodec>(slot: &mut T, p: &mut TextParser<'_>) -> Result<()> {
    if T::HIDDEN {
        return p.skip_value();
    }
    *slot = T::parse_text(p)?;
    Ok(())
}

/// Parses one positional aggregate entry, honoring the early-stop rule
/// and skipping hidden slots without consuming an entry.
pub fn parse_positional_field<T: TextCodec + Default>(
    p: &mut TextParser<'_>,
    done: &mut bool,
    bare: bool,
) -> Result<T> {
    if T::HIDDEN || *done {
        return Ok(T::default());
    }
    let v = T::parse_text(p)?;
    if !p.table_next() {
        if !bare {
            p.table_end()?;
        }
        *done = true;
    }
    Ok(v)
}

/// Formats one aggregate entry, honoring `omit_default` and
/// `omit_names`.
pub fn format_field<T: TextCodec>(v: &T, name: &str, w: &mut TextWriter, wrote: &mut u32) {
    if T::HIDDEN {
        return;
    }
    if w.options().omit_default && v.is_default() {
        return;
    }
    *wrote += 1;
    if !w.options().omit_names {
        w.key(name);
    }
    v.format_text(w);
    w.sep();
}

/// The always-bracketed key policy used by non-string, non-integer key
/// shapes.
pub fn parse_bracketed_key<K: TextCodec>(p: &mut TextParser<'_>) -> Result<Option<K>> {
    if p.maybe(b'}') {
        return Ok(None);
    }
    p.expect(b'[')?;
    let k = K::parse_text(p)?;
    p.expect(b']')?;
    p.expect(b'=')?;
    Ok(Some(k))
}

pub fn format_bracketed_key<K: TextCodec>(k: &K, w: &mut TextWriter) {
    w.raw("[");
    k.format_text(w);
    w.raw("]");
}

macro_rules! impl_int_text {
    ( $( $t:ty ),* ) => {
        $(
            impl TextCodec for $t {
                fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
                    let at = p.offset();
                    let v = p.parse_integer()?;
                    <$t>::try_from(v).map_err(|_| Error::BadFormat { offset: at })
                }

                fn format_text(&self, w: &mut TextWriter) {
                    w.display(self);
                }

                fn precheck(c: u8) -> bool {
                    c == b'-' || c.is_ascii_digit()
                }

                fn is_default(&self) -> bool {
                    *self == 0
                }
            }

            impl TextKey for $t {
                fn parse_key(p: &mut TextParser<'_>, auto: &mut u64) -> Result<Option<Self>> {
                    if p.maybe(b'}') {
                        return Ok(None);
                    }
                    if p.maybe(b'[') {
                        let k = Self::parse_text(p)?;
                        p.expect(b']')?;
                        p.expect(b'=')?;
                        return Ok(Some(k));
                    }
                    // bare entries auto-assign ascending integer keys
                    let k = <$t>::try_from(*auto).map_err(|_| Error::BadFormat {
                        offset: p.offset(),
                    })?;
                    *auto += 1;
                    Ok(Some(k))
                }

                fn format_key(&self, w: &mut TextWriter) {
                    w.raw("[");
                    w.display(self);
                    w.raw("]");
                }
            }
        )*
    };
}

impl_int_text!(u8, i8, u16, i16, u32, i32, u64, i64);

macro_rules! impl_float_text {
    ( $( $t:ty ),* ) => {
        $(
            impl TextCodec for $t {
                fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
                    let at = p.offset();
                    p.float_token()?
                        .parse::<$t>()
                        .map_err(|_| Error::BadFormat { offset: at })
                }

                fn format_text(&self, w: &mut TextWriter) {
                    w.display(self);
                }

                fn precheck(c: u8) -> bool {
                    c == b'-' || c == b'.' || c.is_ascii_digit()
                }

                fn is_default(&self) -> bool {
                    *self == 0.0
                }
            }
        )*
    };
}

impl_float_text!(f32, f64);

impl TextCodec for bool {
    fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
        let at = p.offset();
        match p.parse_ident()? {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(Error::BadFormat { offset: at }),
        }
    }

    fn format_text(&self, w: &mut TextWriter) {
        w.raw(if *self { "true" } else { "false" });
    }

    fn precheck(c: u8) -> bool {
        c == b't' || c == b'f'
    }

    fn is_default(&self) -> bool {
        !*self
    }
}

impl TextKey for bool {
    fn parse_key(p: &mut TextParser<'_>, _auto: &mut u64) -> Result<Option<Self>> {
        parse_bracketed_key(p)
    }

    fn format_key(&self, w: &mut TextWriter) {
        format_bracketed_key(self, w);
    }
}

impl TextCodec for String {
    fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
        Ok(p.parse_string()?.to_owned())
    }

    fn format_text(&self, w: &mut TextWriter) {
        w.string_literal(self);
    }

    fn precheck(c: u8) -> bool {
        matches!(c, b'"' | b'\'' | b'[')
    }

    fn is_default(&self) -> bool {
        self.is_empty()
    }
}

impl TextKey for String {
    fn parse_key(p: &mut TextParser<'_>, _auto: &mut u64) -> Result<Option<Self>> {
        if p.maybe(b'}') {
            return Ok(None);
        }
        let key = match p.peek_significant()? {
            b'"' | b'\'' | b'[' => p.parse_string()?.to_owned(),
            _ => p.parse_ident()?.to_owned(),
        };
        p.expect(b'=')?;
        Ok(Some(key))
    }

    fn format_key(&self, w: &mut TextWriter) {
        w.string_literal(self);
    }
}

fn parse_list_body<T: TextCodec>(
    p: &mut TextParser<'_>,
    mut emit: impl FnMut(T),
) -> Result<()> {
    p.descend()?;
    p.table_begin()?;
    while p.table_array_entry() {
        emit(T::parse_text(p)?);
        if !p.table_next() {
            p.table_end()?;
            break;
        }
    }
    p.ascend();
    Ok(())
}

fn format_list_body<'x, T: TextCodec + 'x>(
    elements: impl Iterator<Item = &'x T>,
    w: &mut TextWriter,
) {
    w.begin_table();
    for v in elements {
        v.format_text(w);
        w.sep();
    }
    w.end_table();
}

impl<T: TextCodec> TextCodec for Vec<T> {
    fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
        let mut out = Vec::new();
        parse_list_body(p, |v| out.push(v))?;
        Ok(out)
    }

    fn format_text(&self, w: &mut TextWriter) {
        format_list_body(self.iter(), w);
    }

    fn precheck(c: u8) -> bool {
        c == b'{'
    }

    fn is_default(&self) -> bool {
        self.is_empty()
    }
}

impl<T: TextCodec> TextCodec for VecDeque<T> {
    fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
        let mut out = VecDeque::new();
        parse_list_body(p, |v| out.push_back(v))?;
        Ok(out)
    }

    fn format_text(&self, w: &mut TextWriter) {
        format_list_body(self.iter(), w);
    }

    fn precheck(c: u8) -> bool {
        c == b'{'
    }

    fn is_default(&self) -> bool {
        self.is_empty()
    }
}

impl<T: TextCodec + Ord> TextCodec for BTreeSet<T> {
    fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
        let mut out = BTreeSet::new();
        parse_list_body(p, |v| {
            out.insert(v);
        })?;
        Ok(out)
    }

    fn format_text(&self, w: &mut TextWriter) {
        format_list_body(self.iter(), w);
    }

    fn precheck(c: u8) -> bool {
        c == b'{'
    }

    fn is_default(&self) -> bool {
        self.is_empty()
    }
}

impl<T, S> TextCodec for HashSet<T, S>
where
    T: TextCodec + Eq + Hash,
    S: BuildHasher + Default,
{
    fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
        let mut out = HashSet::default();
        parse_list_body(p, |v| {
            out.insert(v);
        })?;
        Ok(out)
    }

    fn format_text(&self, w: &mut TextWriter) {
        format_list_body(self.iter(), w);
    }

    fn precheck(c: u8) -> bool {
        c == b'{'
    }

    fn is_default(&self) -> bool {
        self.is_empty()
    }
}

impl<T: TextCodec + Default, const N: usize> TextCodec for [T; N] {
    fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
        p.descend()?;
        let mut out: [T; N] = std::array::from_fn(|_| T::default());
        p.table_begin()?;
        let mut i = 0;
        while p.table_array_entry() {
            if i < N {
                out[i] = T::parse_text(p)?;
                i += 1;
            } else if p.options().allow_extra_array_entries {
                p.skip_value()?;
            } else {
                return Err(Error::BadFormat { offset: p.offset() });
            }
            if !p.table_next() {
                p.table_end()?;
                break;
            }
        }
        p.ascend();
        Ok(out)
    }

    fn format_text(&self, w: &mut TextWriter) {
        format_list_body(self.iter(), w);
    }

    fn precheck(c: u8) -> bool {
        c == b'{'
    }

    fn is_default(&self) -> bool {
        self.iter().all(TextCodec::is_default)
    }
}

fn parse_map_body<K: TextKey, V: TextCodec>(
    p: &mut TextParser<'_>,
    mut emit: impl FnMut(K, V),
) -> Result<()> {
    p.descend()?;
    p.table_begin()?;
    let mut auto = 0u64;
    while let Some(k) = K::parse_key(p, &mut auto)? {
        let v = V::parse_text(p)?;
        emit(k, v);
        p.table_next();
    }
    p.ascend();
    Ok(())
}

fn format_map_body<'x, K: TextKey + 'x, V: TextCodec + 'x>(
    entries: impl Iterator<Item = (&'x K, &'x V)>,
    w: &mut TextWriter,
) {
    w.begin_table();
    for (k, v) in entries {
        k.format_key(w);
        w.raw("=");
        v.format_text(w);
        w.sep();
    }
    w.end_table();
}

impl<K: TextKey + Ord, V: TextCodec> TextCodec for BTreeMap<K, V> {
    fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
        let mut out = BTreeMap::new();
        parse_map_body(p, |k, v| {
            out.insert(k, v);
        })?;
        Ok(out)
    }

    fn format_text(&self, w: &mut TextWriter) {
        format_map_body(self.iter(), w);
    }

    fn precheck(c: u8) -> bool {
        c == b'{'
    }

    fn is_default(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> TextCodec for HashMap<K, V, S>
where
    K: TextKey + Eq + Hash,
    V: TextCodec,
    S: BuildHasher + Default,
{
    fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
        let mut out = HashMap::default();
        parse_map_body(p, |k, v| {
            out.insert(k, v);
        })?;
        Ok(out)
    }

    fn format_text(&self, w: &mut TextWriter) {
        format_map_body(self.iter(), w);
    }

    fn precheck(c: u8) -> bool {
        c == b'{'
    }

    fn is_default(&self) -> bool {
        self.is_empty()
    }
}

impl<T: TextCodec> TextCodec for Option<T> {
    fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
        if p.maybe_nil() {
            Ok(None)
        } else {
            Ok(Some(T::parse_text(p)?))
        }
    }

    fn format_text(&self, w: &mut TextWriter) {
        match self {
            None => w.raw("nil"),
            Some(v) => v.format_text(w),
        }
    }

    fn precheck(c: u8) -> bool {
        c == b'n' || T::precheck(c)
    }

    fn is_default(&self) -> bool {
        self.is_none()
    }
}

impl<T: TextCodec + Default> TextCodec for Box<T> {
    fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
        if p.maybe_nil() {
            Ok(Box::default())
        } else {
            Ok(Box::new(T::parse_text(p)?))
        }
    }

    fn format_text(&self, w: &mut TextWriter) {
        (**self).format_text(w);
    }

    fn precheck(c: u8) -> bool {
        c == b'n' || T::precheck(c)
    }

    fn is_default(&self) -> bool {
        (**self).is_default()
    }
}

impl<A: TextCodec, B: TextCodec> TextCodec for (A, B) {
    fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
        p.descend()?;
        p.table_begin()?;
        if !p.table_array_entry() {
            return Err(Error::BadFormat { offset: p.offset() });
        }
        let a = A::parse_text(p)?;
        if !p.table_next() {
            return Err(Error::BadFormat { offset: p.offset() });
        }
        if !p.table_array_entry() {
            return Err(Error::BadFormat { offset: p.offset() });
        }
        let b = B::parse_text(p)?;
        p.table_next();
        p.table_end()?;
        p.ascend();
        Ok((a, b))
    }

    fn format_text(&self, w: &mut TextWriter) {
        w.begin_table();
        self.0.format_text(w);
        w.sep();
        self.1.format_text(w);
        w.end_table();
    }

    fn precheck(c: u8) -> bool {
        c == b'{'
    }

    fn is_default(&self) -> bool {
        self.0.is_default() && self.1.is_default()
    }
}

macro_rules! impl_tuple_text {
    ( $( $T:ident . $idx:tt ),+ ) => {
        impl<$( $T: TextCodec + Default ),+> TextCodec for ($( $T, )+) {
            fn parse_text(p: &mut TextParser<'_>) -> Result<Self> {
                p.descend()?;
                p.table_begin()?;
                let mut value: Self = Default::default();
                let mut done = false;
                $(
                    if !done {
                        if p.table_array_entry() {
                            value.$idx = $T::parse_text(p)?;
                            if !p.table_next() {
                                p.table_end()?;
                                done = true;
                            }
                        } else {
                            done = true;
                        }
                    }
                )+
                if !done {
                    if !p.options().allow_unknown_tuple_elements {
                        return Err(Error::BadFormat { offset: p.offset() });
                    }
                    loop {
                        if !p.table_array_entry() {
                            break;
                        }
                        p.skip_value()?;
                        if !p.table_next() {
                            p.table_end()?;
                            break;
                        }
                    }
                }
                p.ascend();
                Ok(value)
            }

            fn format_text(&self, w: &mut TextWriter) {
                w.begin_table();
                $(
                    self.$idx.format_text(w);
                    w.sep();
                )+
                w.end_table();
            }

            fn precheck(c: u8) -> bool {
                c == b'{'
            }

            fn is_default(&self) -> bool {
                true $( && self.$idx.is_default() )+
            }
        }
    };
}

impl_tuple_text!(A.0, B.1, C.2);
impl_tuple_text!(A.0, B.1, C.2, D.3);
impl_tuple_text!(A.0, B.1, C.2, D.3, E.4);
impl_tuple_text!(A.0, B.1, C.2, D.3, E.4, F.5);
impl_tuple_text!(A.0, B.1, C.2, D.3, E.4, F.5, G.6);
impl_tuple_text!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);
impl_tuple_text!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8);
impl_tuple_text!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9);
impl_tuple_text!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9, K.10);
impl_tuple_text!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9, K.10, L.11);

impl<T: Default> TextCodec for Omit<T> {
    const HIDDEN: bool = true;

    fn parse_text(_p: &mut TextParser<'_>) -> Result<Self> {
        Ok(Omit(T::default()))
    }

    fn format_text(&self, _w: &mut TextWriter) {}

    fn precheck(_c: u8) -> bool {
        false
    }

    fn is_default(&self) -> bool {
        true
    }
}

impl<T> TextCodec for Deprecated<T> {
    const HIDDEN: bool = true;

    fn parse_text(_p: &mut TextParser<'_>) -> Result<Self> {
        Ok(Deprecated::new())
    }

    fn format_text(&self, _w: &mut TextWriter) {}

    fn precheck(_c: u8) -> bool {
        false
    }

    fn is_default(&self) -> bool {
        true
    }
}
