//! Schema-evolution guarantees: appended fields, deprecation, and the
//! backwards-compatible tail frame, across reader/writer version skew.

use omnipack::{codec_struct, pack, unpack, Deprecated};

codec_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct SubV1 {
        pub x: i32,
        pub y: i32,
    }
}

codec_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct SubV2 {
        pub x: i32,
        pub y: i32,
        pub z: f32,
    }
}

codec_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct RootV1 {
        pub a: String,
        pub b: Vec<String>,
        pub c: SubV1,
        pub d: i32,
    }
}

// one version later: the nested struct grew a field, the root grew one
codec_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct RootV2 {
        pub a: String,
        pub b: Vec<String>,
        pub c: SubV2,
        pub d: i32,
        pub e: i32,
    }
}

// one version later still: the nested struct was retired outright
codec_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct RootV3 {
        pub a: String,
        pub b: Vec<String>,
        pub c: Deprecated<SubV2>,
        pub d: i32,
        pub e: i32,
    }
}

#[test]
fn newer_readers_accept_older_writers() {
    let v1 = RootV1 {
        a: String::from("a"),
        b: vec![String::from("b1"), String::from("b1")],
        c: SubV1 { x: 1, y: 2 },
        d: 99,
    };
    let bytes = pack(&v1);

    let v2: RootV2 = unpack(&bytes).unwrap();
    assert_eq!(v2.a, v1.a);
    assert_eq!(v2.b, v1.b);
    assert_eq!(v2.c.x, v1.c.x);
    assert_eq!(v2.c.y, v1.c.y);
    assert_eq!(v2.c.z, 0.0); // default initialized
    assert_eq!(v2.d, v1.d);
    assert_eq!(v2.e, 0);
}

#[test]
fn deprecation_preserves_the_slot_in_both_directions() {
    let v2 = RootV2 {
        a: String::from("a"),
        b: vec![String::from("b1"), String::from("b1")],
        c: SubV2 { x: 1, y: 2, z: 0.0 },
        d: 99,
        e: 100,
    };
    let v2_bytes = pack(&v2);

    // the retiring reader eats the live payload
    let v3: RootV3 = unpack(&v2_bytes).unwrap();
    assert_eq!(v3.a, v2.a);
    assert_eq!(v3.b, v2.b);
    assert_eq!(v3.d, v2.d);
    assert_eq!(v3.e, v2.e);

    // and the still-live reader accepts the tombstone
    let v3_bytes = pack(&v3);
    let v2b: RootV2 = unpack(&v3_bytes).unwrap();
    assert_eq!(v2b.a, v2.a);
    assert_eq!(v2b.b, v2.b);
    assert_eq!(v2b.c, SubV2::default());
    assert_eq!(v2b.d, v2.d);
    assert_eq!(v2b.e, v2.e);
}

codec_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct BackV1 {
        pub a: i32,
        pub b: i32,
    }
    traits = backwards_compatible;
}

codec_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct BackV2 {
        pub a: i32,
        pub b: i32,
        pub c: i32,
    }
    traits = backwards_compatible;
}

codec_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct HolderV1 {
        pub w: i32,
        pub x: BackV1,
        pub y: i32,
    }
}

codec_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct HolderV2 {
        pub w: i32,
        pub x: BackV2,
        pub y: i32,
    }
}

#[test]
fn older_readers_skip_unknown_tail_fields() {
    let v2 = HolderV2 {
        w: 98,
        x: BackV2 { a: 1, b: 2, c: 3 },
        y: 99,
    };
    let bytes = pack(&v2);

    let v1: HolderV1 = unpack(&bytes).unwrap();
    assert_eq!(v1.w, v2.w);
    assert_eq!(v1.x.a, v2.x.a);
    assert_eq!(v1.x.b, v2.x.b);
    assert_eq!(v1.y, v2.y);
}

#[test]
fn without_the_frame_extra_fields_are_incompatible() {
    codec_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct PlainV2 {
            a: i32,
            b: i32,
            c: i32,
        }
    }
    codec_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct PlainV1 {
            a: i32,
            b: i32,
        }
    }
    let bytes = pack(&PlainV2 { a: 1, b: 2, c: 3 });
    assert!(matches!(
        unpack::<PlainV1>(&bytes),
        Err(omnipack::Error::Incompatible {
            expected: 2,
            actual: 3
        })
    ));
}

#[test]
fn bc_aggregate_may_close_the_stream() {
    let v = BackV2 { a: 1, b: 2, c: 3 };
    let bytes = pack(&v);
    let back: BackV1 = unpack(&bytes).unwrap();
    assert_eq!(back, BackV1 { a: 1, b: 2 });
}

#[test]
fn variants_reject_unknown_alternatives() {
    omnipack::codec_variant! {
        #[derive(Debug, Clone, PartialEq)]
        enum Narrow {
            A(u8),
        }
    }
    omnipack::codec_variant! {
        #[derive(Debug, Clone, PartialEq)]
        enum Wide {
            A(u8),
            B(u16),
        }
    }
    let bytes = pack(&Wide::B(7));
    assert!(matches!(
        unpack::<Narrow>(&bytes),
        Err(omnipack::Error::Incompatible { .. })
    ));
    // the reserved zero keeps a default escape hatch
    assert_eq!(unpack::<Wide>(&[0]).unwrap(), Wide::A(0));
}

#[test]
fn post_decode_hook_runs_after_the_field_loop() {
    codec_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Ranged {
            limit: u32,
        }
        post_decode;
    }
    impl Ranged {
        fn post_decode(&mut self) -> omnipack::Result<()> {
            if self.limit > 100 {
                return Err(omnipack::Error::BadData { offset: 0 });
            }
            Ok(())
        }
    }
    let ok = pack(&Ranged { limit: 5 });
    assert_eq!(unpack::<Ranged>(&ok).unwrap().limit, 5);
    let bad = pack(&Ranged { limit: 500 });
    assert!(matches!(
        unpack::<Ranged>(&bad),
        Err(omnipack::Error::BadData { .. })
    ));
}
