//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use std::collections::BTreeMap;

use omnipack::{codec_struct, codec_variant};

codec_variant! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum Setting {
        Flag(bool),
        Depth(u16),
        Path(String),
    }
}

codec_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Config {
        pub device: String,
        pub resolution: (u16, u16),
        pub k_matrix: [f64; 9],
        pub distortion_coefficients: [f64; 5],
        pub parameters: BTreeMap<String, Setting>,
    }
    traits = backwards_compatible;
}

pub fn sample_config() -> Config {
    Config {
        device: String::from("/dev/video0"),
        resolution: (640, 480),
        k_matrix: [
            223.28249888247538,
            0.0,
            152.30570853111396,
            0.0,
            223.8756535707556,
            124.5606000035353,
            0.0,
            0.0,
            1.0,
        ],
        distortion_coefficients: [
            -0.44158343539568284,
            0.23861463831967872,
            0.0016338407443826572,
            0.0034950038632981604,
            -0.05239245892096022,
        ],
        parameters: BTreeMap::from([
            (String::from("start_server"), Setting::Flag(true)),
            (String::from("max_depth"), Setting::Depth(5)),
            (String::from("model_path"), Setting::Path(String::from("foo/bar.pt"))),
        ]),
    }
}
