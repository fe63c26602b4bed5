//! Primitive shapes: integers, floats, booleans.

use crate::codec::Codec;
use crate::error::Result;
use crate::fingerprint::{Tag, TypeList};
use crate::wire::{Packer, Unpacker};

macro_rules! impl_primitive_codec {
    ( $( $t:ty => $write:ident, $read:ident, $tag:ident ; )* ) => {
        $(
            impl Codec for $t {
                fn pack(&self, out: &mut Packer<'_>) {
                    out.$write(*self);
                }

                fn unpack(r: &mut Unpacker<'_>) -> Result<Self> {
                    r.$read()
                }

                fn shape(list: &mut TypeList) {
                    list.tag(Tag::$tag);
                }
            }
        )*
    };
}

impl_primitive_codec! {
    u8  => write_u8,  read_u8,  U8;
    i8  => write_i8,  read_i8,  I8;
    u16 => write_u16, read_u16, U16;
    i16 => write_i16, read_i16, I16;
    u32 => write_u32, read_u32, U32;
    i32 => write_i32, read_i32, I32;
    u64 => write_u64, read_u64, U64;
    i64 => write_i64, read_i64, I64;
    f32 => write_f32, read_f32, F32;
    f64 => write_f64, read_f64, F64;
    bool => write_bool, read_bool, Bool;
}

#[cfg(test)]
mod tests {
    use crate::wire::Mode;
    use crate::{pack_with, unpack_with};

    fn round_trip<T>(v: T)
    where
        T: crate::Codec + PartialEq + std::fmt::Debug + Copy,
    {
        for mode in [Mode::Fixed, Mode::Variable] {
            let bytes = pack_with(&v, mode);
            assert_eq!(unpack_with::<T>(&bytes, mode).unwrap(), v);
        }
    }

    #[test]
    fn integer_limits_round_trip() {
        round_trip(u8::MAX);
        round_trip(i8::MIN);
        round_trip(u16::MAX);
        round_trip(i16::MIN);
        round_trip(u32::MAX);
        round_trip(i32::MIN);
        round_trip(u64::MAX);
        round_trip(i64::MIN);
    }

    #[test]
    fn float_bits_round_trip() {
        round_trip(std::f32::consts::PI);
        round_trip(std::f64::consts::PI);
        round_trip(f64::NEG_INFINITY);
        // NaN payload bits survive because floats travel as raw bits
        let weird = f64::from_bits(0x7FF8_0000_DEAD_BEEF);
        for mode in [Mode::Fixed, Mode::Variable] {
            let bytes = crate::pack_with(&weird, mode);
            let back: f64 = crate::unpack_with(&bytes, mode).unwrap();
            assert_eq!(back.to_bits(), weird.to_bits());
        }
    }

    #[test]
    fn bool_decodes_any_nonzero() {
        assert!(crate::unpack::<bool>(&[1]).unwrap());
        assert!(crate::unpack::<bool>(&[0xFF]).unwrap());
        assert!(!crate::unpack::<bool>(&[0]).unwrap());
    }
}
