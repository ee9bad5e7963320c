use std::fmt;

use palette::{LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Gradient stops
// ---------------------------------------------------------------------------

type Stop = (u8, u8, u8);

const BLUE_RED: &[Stop] = &[
    (0x05, 0x30, 0x61),
    (0x21, 0x66, 0xac),
    (0x43, 0x93, 0xc3),
    (0x92, 0xc5, 0xde),
    (0xd1, 0xe5, 0xf0),
    (0xf7, 0xf7, 0xf7),
    (0xfd, 0xdb, 0xc7),
    (0xf4, 0xa5, 0x82),
    (0xd6, 0x60, 0x4d),
    (0xb2, 0x18, 0x2b),
    (0x67, 0x00, 0x1f),
];

const RAINBOW: &[Stop] = &[
    (0x00, 0x00, 0x7f),
    (0x00, 0x00, 0xff),
    (0x00, 0x7f, 0xff),
    (0x00, 0xff, 0xff),
    (0x7f, 0xff, 0x7f),
    (0xff, 0xff, 0x00),
    (0xff, 0x7f, 0x00),
    (0xff, 0x00, 0x00),
    (0x7f, 0x00, 0x00),
];

const MAGMA: &[Stop] = &[
    (0x00, 0x00, 0x04),
    (0x1c, 0x10, 0x44),
    (0x4f, 0x12, 0x7b),
    (0x81, 0x25, 0x81),
    (0xb5, 0x36, 0x7a),
    (0xe5, 0x50, 0x64),
    (0xfb, 0x87, 0x61),
    (0xfe, 0xc2, 0x87),
    (0xfc, 0xfd, 0xbf),
];

const VIRIDIS: &[Stop] = &[
    (0x44, 0x01, 0x54),
    (0x48, 0x28, 0x78),
    (0x3e, 0x4a, 0x89),
    (0x31, 0x68, 0x8e),
    (0x26, 0x82, 0x8e),
    (0x1f, 0x9e, 0x89),
    (0x35, 0xb7, 0x79),
    (0x6e, 0xce, 0x58),
    (0xb5, 0xde, 0x2b),
    (0xfd, 0xe7, 0x25),
];

const GRAYSCALE: &[Stop] = &[(0xff, 0xff, 0xff), (0x00, 0x00, 0x00)];

/// Colour used for cells without a value (NaN).
pub const MISSING: Srgb<u8> = Srgb::new(0x80, 0x80, 0x80);

// ---------------------------------------------------------------------------
// Colour map: 0..=1 → colour
// ---------------------------------------------------------------------------

/// Sequential / diverging colour maps offered for 2D plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMap {
    #[default]
    BlueRed,
    Rainbow,
    Magma,
    Viridis,
    Grayscale,
}

impl ColorMap {
    pub const ALL: [ColorMap; 5] = [
        ColorMap::BlueRed,
        ColorMap::Rainbow,
        ColorMap::Magma,
        ColorMap::Viridis,
        ColorMap::Grayscale,
    ];

    fn stops(self) -> &'static [Stop] {
        match self {
            ColorMap::BlueRed => BLUE_RED,
            ColorMap::Rainbow => RAINBOW,
            ColorMap::Magma => MAGMA,
            ColorMap::Viridis => VIRIDIS,
            ColorMap::Grayscale => GRAYSCALE,
        }
    }

    /// Colour at position `t` (clamped to `0..=1`), interpolated in linear RGB.
    pub fn sample(self, t: f64) -> Srgb<u8> {
        if t.is_nan() {
            return MISSING;
        }
        let stops = self.stops();
        let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        let factor = (scaled - lower as f64) as f32;

        let a = linear(stops[lower]);
        let b = linear(stops[lower + 1]);
        Srgb::<f32>::from_linear(a.mix(b, factor)).into_format()
    }

    /// Pre-computed lookup table of `n` evenly spaced colours.
    pub fn lut(self, n: usize) -> Vec<Srgb<u8>> {
        match n {
            0 => Vec::new(),
            1 => vec![self.sample(0.0)],
            _ => (0..n)
                .map(|i| self.sample(i as f64 / (n - 1) as f64))
                .collect(),
        }
    }
}

fn linear((r, g, b): Stop) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

impl fmt::Display for ColorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorMap::BlueRed => "Blue Red",
            ColorMap::Rainbow => "Rainbow",
            ColorMap::Magma => "Magma",
            ColorMap::Viridis => "Viridis",
            ColorMap::Grayscale => "Grayscale",
        };
        f.write_str(name)
    }
}
