//! Sequence shapes: strings, fixed arrays, list-likes, set-likes, and
//! map-likes.
//!
//! All counted shapes share the `sz(count + 1)` prefix, keeping the
//! zero byte free as the null marker. List-likes and set-likes hoist a
//! predecode-eligible element's prefix in front of the element run; maps
//! frame every key/value pair fully. The wire form does not distinguish
//! between container flavors of the same class: any list-like decodes
//! bytes produced by any other, and a map decodes into a list of pairs.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};

use crate::codec::{checked_count, Codec};
use crate::error::{Error, Result};
use crate::fingerprint::{Tag, TypeList};
use crate::wire::{Packer, Unpacker};

fn pack_run<'x, T, I>(elements: I, count: usize, out: &mut Packer<'_>)
where
    T: Codec + 'x,
    I: Iterator<Item = &'x T>,
{
    out.write_sz(count as u64 + 1);
    if let Some(pd) = T::PREDECODE {
        out.write_sz(pd);
        for v in elements {
            v.pack_predecoded(out);
        }
    } else {
        for v in elements {
            v.pack(out);
        }
    }
}

/// Reads a run's element count and hoisted predecode prefix, if any.
/// `None` means the null marker was stored (an absent or empty run).
fn unpack_run_header<T: Codec>(r: &mut Unpacker<'_>) -> Result<Option<(usize, Option<u64>)>> {
    let stored = r.read_sz()?;
    if stored == 0 {
        return Ok(None);
    }
    let count = checked_count(stored - 1)?;
    let pd = if T::PREDECODE.is_some() {
        Some(r.read_sz()?)
    } else {
        None
    };
    Ok(Some((count, pd)))
}

#[inline]
fn unpack_element<T: Codec>(r: &mut Unpacker<'_>, pd: Option<u64>) -> Result<T> {
    match pd {
        Some(pd) => T::unpack_predecoded(r, pd),
        None => T::unpack(r),
    }
}

impl Codec for String {
    const INLINE_OPTION: bool = true;

    fn pack(&self, out: &mut Packer<'_>) {
        out.write_sz(self.len() as u64 + 1);
        out.raw().write_bytes(self.as_bytes());
    }

    fn unpack(r: &mut Unpacker<'_>) -> Result<Self> {
        let stored = r.read_sz()?;
        if stored == 0 {
            return Ok(String::new());
        }
        let n = checked_count(stored - 1)?;
        let at = r.offset();
        let bytes = r.raw().read_bytes(n)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::BadData { offset: at })
    }

    fn shape(list: &mut TypeList) {
        list.tag(Tag::String);
        list.tag(Tag::U8);
    }
}

impl<T: Codec> Codec for Vec<T> {
    const INLINE_OPTION: bool = true;

    fn pack(&self, out: &mut Packer<'_>) {
        pack_run(self.iter(), self.len(), out);
    }

    fn unpack(r: &mut Unpacker<'_>) -> Result<Self> {
        match unpack_run_header::<T>(r)? {
            None => Ok(Vec::new()),
            Some((count, pd)) => {
                let mut out = Vec::with_capacity(count);
                for _ in 0..count {
                    out.push(unpack_element(r, pd)?);
                }
                Ok(out)
            }
        }
    }

    fn shape(list: &mut TypeList) {
        list.tag(Tag::List);
        T::shape(list);
    }
}

impl<T: Codec> Codec for VecDeque<T> {
    const INLINE_OPTION: bool = true;

    fn pack(&self, out: &mut Packer<'_>) {
        pack_run(self.iter(), self.len(), out);
    }

    fn unpack(r: &mut Unpacker<'_>) -> Result<Self> {
        match unpack_run_header::<T>(r)? {
            None => Ok(VecDeque::new()),
            Some((count, pd)) => {
                let mut out = VecDeque::with_capacity(count);
                for _ in 0..count {
                    out.push_back(unpack_element(r, pd)?);
                }
                Ok(out)
            }
        }
    }

    fn shape(list: &mut TypeList) {
        list.tag(Tag::List);
        T::shape(list);
    }
}

impl<T: Codec + Default, const N: usize> Codec for [T; N] {
    const INLINE_OPTION: bool = true;

    fn pack(&self, out: &mut Packer<'_>) {
        out.write_sz(N as u64 + 1);
        for v in self {
            v.pack(out);
        }
    }

    fn unpack(r: &mut Unpacker<'_>) -> Result<Self> {
        let mut out: [T; N] = std::array::from_fn(|_| T::default());
        let stored = r.read_sz()?;
        if stored == 0 {
            return Ok(out);
        }
        let n = checked_count(stored - 1)?;
        if n > N {
            return Err(Error::Incompatible {
                expected: N,
                actual: n,
            });
        }
        for slot in out.iter_mut().take(n) {
            *slot = T::unpack(r)?;
        }
        Ok(out)
    }

    fn shape(list: &mut TypeList) {
        list.tag(Tag::Array);
        list.array_len(N);
        T::shape(list);
    }
}

impl<T: Codec + Ord> Codec for BTreeSet<T> {
    const INLINE_OPTION: bool = true;

    fn pack(&self, out: &mut Packer<'_>) {
        pack_run(self.iter(), self.len(), out);
    }

    fn unpack(r: &mut Unpacker<'_>) -> Result<Self> {
        match unpack_run_header::<T>(r)? {
            None => Ok(BTreeSet::new()),
            Some((count, pd)) => {
                let mut out = BTreeSet::new();
                for _ in 0..count {
                    out.insert(unpack_element(r, pd)?);
                }
                Ok(out)
            }
        }
    }

    fn shape(list: &mut TypeList) {
        list.tag(Tag::Set);
        T::shape(list);
    }
}

impl<T, S> Codec for HashSet<T, S>
where
    T: Codec + Eq + Hash,
    S: BuildHasher + Default,
{
    const INLINE_OPTION: bool = true;

    fn pack(&self, out: &mut Packer<'_>) {
        pack_run(self.iter(), self.len(), out);
    }

    fn unpack(r: &mut Unpacker<'_>) -> Result<Self> {
        match unpack_run_header::<T>(r)? {
            None => Ok(HashSet::default()),
            Some((count, pd)) => {
                let mut out = HashSet::with_capacity_and_hasher(count, S::default());
                for _ in 0..count {
                    out.insert(unpack_element(r, pd)?);
                }
                Ok(out)
            }
        }
    }

    fn shape(list: &mut TypeList) {
        list.tag(Tag::Set);
        T::shape(list);
    }
}

impl<K: Codec + Ord, V: Codec> Codec for BTreeMap<K, V> {
    const INLINE_OPTION: bool = true;

    fn pack(&self, out: &mut Packer<'_>) {
        out.write_sz(self.len() as u64 + 1);
        for (k, v) in self {
            k.pack(out);
            v.pack(out);
        }
    }

    fn unpack(r: &mut Unpacker<'_>) -> Result<Self> {
        let stored = r.read_sz()?;
        if stored == 0 {
            return Ok(BTreeMap::new());
        }
        let count = checked_count(stored - 1)?;
        let mut out = BTreeMap::new();
        for _ in 0..count {
            let k = K::unpack(r)?;
            let v = V::unpack(r)?;
            out.insert(k, v);
        }
        Ok(out)
    }

    fn shape(list: &mut TypeList) {
        list.tag(Tag::Map);
        K::shape(list);
        V::shape(list);
    }
}

impl<K, V, S> Codec for HashMap<K, V, S>
where
    K: Codec + Eq + Hash,
    V: Codec,
    S: BuildHasher + Default,
{
    const INLINE_OPTION: bool = true;

    fn pack(&self, out: &mut Packer<'_>) {
        out.write_sz(self.len() as u64 + 1);
        for (k, v) in self {
            k.pack(out);
            v.pack(out);
        }
    }

    fn unpack(r: &mut Unpacker<'_>) -> Result<Self> {
        let stored = r.read_sz()?;
        if stored == 0 {
            return Ok(HashMap::default());
        }
        let count = checked_count(stored - 1)?;
        let mut out = HashMap::with_capacity_and_hasher(count, S::default());
        for _ in 0..count {
            let k = K::unpack(r)?;
            let v = V::unpack(r)?;
            out.insert(k, v);
        }
        Ok(out)
    }

    fn shape(list: &mut TypeList) {
        list.tag(Tag::Map);
        K::shape(list);
        V::shape(list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Mode;
    use crate::{pack, pack_with, unpack, unpack_with};

    #[test]
    fn string_round_trip_and_null_marker() {
        let s = String::from("hello world");
        let bytes = pack(&s);
        assert_eq!(bytes[0], 12); // len + 1
        assert_eq!(unpack::<String>(&bytes).unwrap(), s);
        assert_eq!(unpack::<String>(&[0]).unwrap(), "");
        assert_eq!(pack(&String::new()), vec![1]);
    }

    #[test]
    fn string_invalid_utf8_is_bad_data() {
        let bytes = [3, 0xFF, 0xFE];
        assert!(matches!(
            unpack::<String>(&bytes),
            Err(Error::BadData { .. })
        ));
    }

    #[test]
    fn container_shapes_share_one_wire_form() {
        let bytes = [5, 1, 2, 3, 4];
        let list: Vec<i32> = unpack_with(&bytes, Mode::Variable).unwrap();
        assert_eq!(list, vec![-1, 1, -2, 2]);
        let deque: VecDeque<i32> = unpack_with(&bytes, Mode::Variable).unwrap();
        assert_eq!(deque, VecDeque::from(vec![-1, 1, -2, 2]));
        let set: BTreeSet<i32> = unpack_with(&bytes, Mode::Variable).unwrap();
        assert_eq!(set, BTreeSet::from([-1, 1, -2, 2]));
        let hset: HashSet<i32> = unpack_with(&bytes, Mode::Variable).unwrap();
        assert_eq!(hset, HashSet::from([-1, 1, -2, 2]));
    }

    #[test]
    fn arrays_accept_fewer_elements_but_not_more() {
        let bytes = [5, 1, 2, 3, 4];
        let larger: [i32; 9] = unpack_with(&bytes, Mode::Variable).unwrap();
        assert_eq!(&larger[..4], [-1, 1, -2, 2]);
        assert_eq!(larger[4], 0);
        assert!(matches!(
            unpack_with::<[i32; 3]>(&bytes, Mode::Variable),
            Err(Error::Incompatible {
                expected: 3,
                actual: 4
            })
        ));
    }

    #[test]
    fn map_decodes_as_pair_list() {
        let map = BTreeMap::from([(-1i32, 1i32), (-2, 2)]);
        let bytes = pack_with(&map, Mode::Variable);
        assert_eq!(bytes, [3, 1, 2, 3, 4]);
        let pairs: Vec<(i32, i32)> = unpack_with(&bytes, Mode::Variable).unwrap();
        assert_eq!(pairs, vec![(-1, 1), (-2, 2)]);
        let back: HashMap<i32, i32> = unpack_with(&bytes, Mode::Variable).unwrap();
        assert_eq!(back, HashMap::from([(-1, 1), (-2, 2)]));
    }

    #[test]
    fn oversized_count_is_rejected_before_allocation() {
        // a declared count of five billion elements in a tiny buffer
        let mut buf = crate::WriteBuffer::new();
        Packer::new(&mut buf, Mode::Fixed).write_sz(5_000_000_000);
        assert!(matches!(
            unpack::<Vec<u8>>(buf.as_slice()),
            Err(Error::OutOfMemory { .. })
        ));
    }

    #[test]
    fn empty_vec_is_not_null() {
        let bytes = pack(&Vec::<u32>::new());
        assert_eq!(bytes, vec![1]);
        assert_eq!(unpack::<Vec<u32>>(&bytes).unwrap(), Vec::<u32>::new());
    }
}
