//! Text codec suite: the table-literal grammar, option strictness, and
//! round-trips through format and prettyprint.

mod common;

use common::{sample_config, Config, Setting};
use omnipack::codec_struct;
use omnipack::text::{format, parse, prettyprint, FormatOptions, ParseOptions};
use omnipack::Error;

const CONFIG_TEXT: &str = r#"{
    device = "/dev/video0",
    resolution = {640, 480},
    -- intrinsics, row major
    k_matrix = {223.28249888247538, 0.0, 152.30570853111396, 0.0, 223.8756535707556, 124.5606000035353, 0.0, 0.0, 1.0},
    distortion_coefficients = {-0.44158343539568284, 0.23861463831967872, 0.0016338407443826572, 0.0034950038632981604, -0.05239245892096022},
    parameters = {start_server = true, max_depth = 5, model_path = "foo/bar.pt"},
}"#;

#[test]
fn known_good_text_matches_the_hardcoded_value() {
    let parsed: Config = parse(CONFIG_TEXT, ParseOptions::default()).unwrap();
    assert_eq!(parsed, sample_config());
}

#[test]
fn format_parse_round_trip() {
    let config = sample_config();
    let text = format(&config, FormatOptions::default());
    let back: Config = parse(&text, ParseOptions::default()).unwrap();
    assert_eq!(back, config);
}

#[test]
fn prettyprinted_output_still_parses() {
    let config = sample_config();
    let pretty = prettyprint(&format(&config, FormatOptions::default()));
    assert!(pretty.contains('\n'));
    let back: Config = parse(&pretty, ParseOptions::default()).unwrap();
    assert_eq!(back, config);
}

#[test]
fn unknown_keys_are_skipped_or_rejected_by_option() {
    let text = "{ device = \"x\", future_knob = { 1, \"two\", { nested = true } } }";
    let tolerant: Config = parse(text, ParseOptions::default()).unwrap();
    assert_eq!(tolerant.device, "x");

    let strict = ParseOptions {
        allow_unknown_keys: false,
        ..ParseOptions::default()
    };
    assert!(matches!(
        parse::<Config>(text, strict),
        Err(Error::UnknownKey { .. })
    ));
}

#[test]
fn variant_dispatch_uses_prefix_prechecks() {
    // declaration order: bool would never be reached if the string
    // alternative claimed identifier starts
    omnipack::codec_variant! {
        #[derive(Debug, Clone, PartialEq)]
        enum Scalar {
            Num(u16),
            Text(String),
            Flag(bool),
        }
    }
    assert_eq!(
        parse::<Scalar>("true", ParseOptions::default()).unwrap(),
        Scalar::Flag(true)
    );
    assert_eq!(
        parse::<Scalar>("512", ParseOptions::default()).unwrap(),
        Scalar::Num(512)
    );
    assert_eq!(
        parse::<Scalar>("'who'", ParseOptions::default()).unwrap(),
        Scalar::Text(String::from("who"))
    );

    // nothing matches: tolerant mode leaves the default, strict rejects
    assert_eq!(
        parse::<Scalar>("{1,2}", ParseOptions::default()).unwrap(),
        Scalar::Num(0)
    );
    let strict = ParseOptions {
        allow_unknown_variant_values: false,
        ..ParseOptions::default()
    };
    assert!(matches!(
        parse::<Scalar>("{1,2}", strict),
        Err(Error::BadVariantValue { .. })
    ));
}

#[test]
fn positional_aggregates_parse_without_names() {
    codec_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Point {
            x: f32,
            y: f32,
            z: f32,
        }
    }
    let p: Point = parse("{1.1, 2.0, 3.0}", ParseOptions::default()).unwrap();
    assert_eq!(
        p,
        Point {
            x: 1.1,
            y: 2.0,
            z: 3.0
        }
    );
    // trailing fields default when entries run out
    let p: Point = parse("{1.1}", ParseOptions::default()).unwrap();
    assert_eq!(p.y, 0.0);

    // nameless formatting mirrors it
    let text = format(
        &Point {
            x: 1.1,
            y: 2.0,
            z: 3.0
        },
        FormatOptions {
            omit_names: true,
            ..FormatOptions::default()
        },
    );
    assert_eq!(text, "{1.1,2,3,}");
    let back: Point = parse(&text, ParseOptions::default()).unwrap();
    assert_eq!(back.x, 1.1);
    assert_eq!(back.z, 3.0);
}

#[test]
fn omit_default_drops_settled_fields() {
    codec_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Pair2 {
            a: u32,
            b: String,
        }
    }
    let v = Pair2 {
        a: 0,
        b: String::from("kept"),
    };
    let text = format(
        &v,
        FormatOptions {
            omit_default: true,
            ..FormatOptions::default()
        },
    );
    assert_eq!(text, "{b=\"kept\",}");
    let back: Pair2 = parse(&text, ParseOptions::default()).unwrap();
    assert_eq!(back, v);

    // a fully defaulted value collapses to nothing at top level
    let empty = format(
        &Pair2::default(),
        FormatOptions {
            omit_default: true,
            ..FormatOptions::default()
        },
    );
    assert_eq!(empty, "");
}

#[test]
fn skip_initial_scope_reads_bare_field_lists() {
    codec_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Bare {
            name: String,
            level: u8,
        }
    }
    let opts = ParseOptions {
        skip_initial_scope: true,
        ..ParseOptions::default()
    };
    let v: Bare = parse("name = 'svc', level = 3", opts).unwrap();
    assert_eq!(v.name, "svc");
    assert_eq!(v.level, 3);

    let text = format(
        &v,
        FormatOptions {
            skip_initial_scope: true,
            ..FormatOptions::default()
        },
    );
    assert_eq!(text, "name=\"svc\",level=3,");
}

#[test]
fn long_bracket_strings_choose_a_safe_level() {
    let nasty = String::from("contains ']=]' and \" and ' quotes");
    let text = format(&nasty, FormatOptions::default());
    let back: String = parse(&text, ParseOptions::default()).unwrap();
    assert_eq!(back, nasty);
}

#[test]
fn comments_and_separators_are_flexible() {
    let v: Vec<u8> = parse(
        "{ 1; 2, --[[ mid-table comment ]] 3 -- trailing\n , 4 }",
        ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(v, vec![1, 2, 3, 4]);
}

#[test]
fn map_with_variant_keys_uses_bracket_quoting() {
    use std::collections::BTreeMap;
    omnipack::codec_variant! {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
        enum Key {
            Index(u16),
            Name(String),
        }
    }
    let m = BTreeMap::from([
        (Key::Index(3), 30u32),
        (Key::Name(String::from("x")), 7u32),
    ]);
    let text = format(&m, FormatOptions::default());
    assert_eq!(text, "{[3]=30,[\"x\"]=7,}");
    let back: BTreeMap<Key, u32> = parse(&text, ParseOptions::default()).unwrap();
    assert_eq!(back, m);
}

#[test]
fn enum_constants_parse_as_their_integer() {
    omnipack::codec_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Compression : u8 {
            Off = 0,
            Fast = 1,
            Best = 9,
        }
    }
    assert_eq!(
        parse::<Compression>("9", ParseOptions::default()).unwrap(),
        Compression::Best
    );
    assert!(matches!(
        parse::<Compression>("2", ParseOptions::default()),
        Err(Error::BadVariantValue { .. })
    ));
    assert_eq!(format(&Compression::Fast, FormatOptions::default()), "1");
}

#[test]
fn setting_values_take_their_shape_from_content() {
    use std::collections::BTreeMap;
    let m: BTreeMap<String, Setting> = parse(
        "{ a = true, b = 12, c = 'path' }",
        ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(m["a"], Setting::Flag(true));
    assert_eq!(m["b"], Setting::Depth(12));
    assert_eq!(m["c"], Setting::Path(String::from("path")));
}
