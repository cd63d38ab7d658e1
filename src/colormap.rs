//! Named colormaps.
//!
//! Sequential and diverging maps come from `colorous`. The cmocean, CARTO and
//! Crameri scientific maps are stored as colour stops and interpolated
//! linearly between them. The single channel maps
//! `R`, `G`, `B` (black to full channel) and `C`, `M`, `Y` (channel colour to
//! white) are used to display the channels of colour images. Appending `_r`
//! to any name reverses the map.

use std::fmt;
use std::str::FromStr;

use crate::ConfigError;

/// Colormap used when nothing else is configured.
pub const DEFAULT_COLORMAP: &str = "viridis";

const GRADIENTS: &[(&str, colorous::Gradient, bool)] = &[
    ("viridis", colorous::VIRIDIS, false),
    ("magma", colorous::MAGMA, false),
    ("inferno", colorous::INFERNO, false),
    ("plasma", colorous::PLASMA, false),
    ("cividis", colorous::CIVIDIS, false),
    ("turbo", colorous::TURBO, false),
    ("cubehelix", colorous::CUBEHELIX, false),
    ("warm", colorous::WARM, false),
    ("cool", colorous::COOL, false),
    ("rainbow", colorous::RAINBOW, false),
    ("sinebow", colorous::SINEBOW, false),
    // colorous greys run white to black
    ("grey", colorous::GREYS, true),
    ("greys", colorous::GREYS, false),
    ("blues", colorous::BLUES, false),
    ("greens", colorous::GREENS, false),
    ("oranges", colorous::ORANGES, false),
    ("purples", colorous::PURPLES, false),
    ("reds", colorous::REDS, false),
    ("blue", colorous::BLUES, true),
    ("green", colorous::GREENS, true),
    ("orange", colorous::ORANGES, true),
    ("purple", colorous::PURPLES, true),
    ("red", colorous::REDS, true),
    ("bugn", colorous::BLUE_GREEN, false),
    ("bupu", colorous::BLUE_PURPLE, false),
    ("gnbu", colorous::GREEN_BLUE, false),
    ("orrd", colorous::ORANGE_RED, false),
    ("pubugn", colorous::PURPLE_BLUE_GREEN, false),
    ("pubu", colorous::PURPLE_BLUE, false),
    ("purd", colorous::PURPLE_RED, false),
    ("rdpu", colorous::RED_PURPLE, false),
    ("ylgnbu", colorous::YELLOW_GREEN_BLUE, false),
    ("ylgn", colorous::YELLOW_GREEN, false),
    ("ylorbr", colorous::YELLOW_ORANGE_BROWN, false),
    ("ylorrd", colorous::YELLOW_ORANGE_RED, false),
    ("brbg", colorous::BROWN_GREEN, false),
    ("prgn", colorous::PURPLE_GREEN, false),
    ("piyg", colorous::PINK_GREEN, false),
    ("puor", colorous::PURPLE_ORANGE, false),
    ("rdbu", colorous::RED_BLUE, false),
    ("rdgy", colorous::RED_GREY, false),
    ("rdylbu", colorous::RED_YELLOW_BLUE, false),
    ("rdylgn", colorous::RED_YELLOW_GREEN, false),
    ("spectral", colorous::SPECTRAL, false),
];

const CHANNEL_MAPS: &[(&str, [u8; 3], [u8; 3])] = &[
    ("R", [0, 0, 0], [255, 0, 0]),
    ("G", [0, 0, 0], [0, 255, 0]),
    ("B", [0, 0, 0], [0, 0, 255]),
    ("C", [0, 255, 255], [255, 255, 255]),
    ("M", [255, 0, 255], [255, 255, 255]),
    ("Y", [255, 255, 0], [255, 255, 255]),
];

const fn rgb(hex: u32) -> [u8; 3] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8]
}

macro_rules! stops {
    ($($hex:expr),+ $(,)?) => {
        &[$(rgb($hex)),+]
    };
}

// Listed from the low to the high end of each palette.
const ACTON: &[[u8; 3]] = stops![
    0x260d40, 0x3d2257, 0x54356e, 0x6c4585, 0x8a4f94, 0xa95a9c, 0xc2679f, 0xd07ea9, 0xd495bb,
    0xd7aecd, 0xdbc4dc, 0xe6e6f0,
];
const DAVOS: &[[u8; 3]] = stops![
    0x2c1a4c, 0x29306b, 0x2a4584, 0x34598f, 0x456c93, 0x577d95, 0x6a8e97, 0x80a19b, 0x9bb6a1,
    0xbacdac, 0xdde5c4, 0xfefefe,
];
const DEVON: &[[u8; 3]] = stops![
    0x2c1a4c, 0x2b2e68, 0x2c4281, 0x325896, 0x4866b5, 0x6d74d1, 0x9786e1, 0xb29ee5, 0xc6b4e8,
    0xd8cbee, 0xebe3f6, 0xfffeff,
];
const OSLO: &[[u8; 3]] = stops![
    0x010101, 0x0c1520, 0x12263c, 0x173a5a, 0x1f4f7b, 0x2c649a, 0x4478b2, 0x6a8cbd, 0x8d9fc1,
    0xafb5c8, 0xd4d6de, 0xfefefe,
];
const TOKYO: &[[u8; 3]] = stops![
    0x1a0e34, 0x3b1e43, 0x5b344f, 0x6e4c5c, 0x776366, 0x7d786d, 0x838c74, 0x89a07b, 0x93b583,
    0xa4ce8e, 0xc4e7a9, 0xfefed8,
];
const NUUK: &[[u8; 3]] = stops![
    0x05598c, 0x1d6185, 0x386b82, 0x557685, 0x71828b, 0x8b8f90, 0xa1a090, 0xb0b18c, 0xbbbf86,
    0xcbcc84, 0xe3e28e, 0xfefeb2,
];
const LAPAZ: &[[u8; 3]] = stops![
    0x1a0c64, 0x1f2875, 0x243f83, 0x2c568f, 0x3a6c97, 0x4f809c, 0x6c929d, 0x8e9e9a, 0xb1a898,
    0xd2b9a3, 0xf0d3c4, 0xfef2f3,
];
const LAJOLLA: &[[u8; 3]] = stops![
    0xfefecb, 0xfbec99, 0xf4cc68, 0xeba646, 0xe2833e, 0xd46039, 0xb2443a, 0x8a3636, 0x632b2b,
    0x3f1f1d, 0x1a1a01,
];
const IMOLA: &[[u8; 3]] = stops![
    0x1a33b3, 0x213ead, 0x2849a6, 0x2f559f, 0x366198, 0x3d6e92, 0x46798c, 0x588a86, 0x6ea280,
    0x86ba78, 0xa6d66f, 0xd0f070, 0xfefe66,
];
const DEEP: &[[u8; 3]] = stops![
    0xfdfecc, 0xc7eeab, 0x8fdaa2, 0x63c5a3, 0x4aaea4, 0x3f97a1, 0x3b7f9b, 0x3a6792, 0x3f4f85,
    0x413b6b, 0x362b48, 0x281a2c,
];
const DENSE: &[[u8; 3]] = stops![
    0xe6f1f1, 0xc2dde6, 0x9cc9e1, 0x7fb2df, 0x7199dc, 0x6d7fd3, 0x6c64c0, 0x6a4ba6, 0x643688,
    0x5a2369, 0x4a164a, 0x360e24,
];
const GRAY: &[[u8; 3]] = stops![0x000000, 0xffffff];
const ICE: &[[u8; 3]] = stops![
    0x040613, 0x1a1b34, 0x2a2e5a, 0x353f80, 0x3b53a2, 0x3f69b3, 0x4f7fba, 0x6895c2, 0x85abcb,
    0xa4c0d5, 0xc4d5e1, 0xe3eaef, 0xeafdfd,
];
const HALINE: &[[u8; 3]] = stops![
    0x2a186c, 0x1b2c94, 0x0f4f8f, 0x265f8d, 0x3b6f8c, 0x4c808b, 0x5b918b, 0x6aa28a, 0x7ab386,
    0x8fc27e, 0xb1d071, 0xd8dd6b, 0xfdef9a,
];
const SOLAR: &[[u8; 3]] = stops![
    0x331418, 0x4c1c25, 0x66232a, 0x7f2c28, 0x952f1f, 0xa63d18, 0xb45014, 0xbf6516, 0xc97c1d,
    0xd09428, 0xd5ad37, 0xd8c84b, 0xe0fd4a,
];
const THERMAL: &[[u8; 3]] = stops![
    0x042333, 0x13306d, 0x3e2f94, 0x64339b, 0x8a3e96, 0xb04a89, 0xd65c73, 0xef7855, 0xfa9f3b,
    0xf8cb3a, 0xe8fa5b,
];
const TEMPO: &[[u8; 3]] = stops![
    0xfff6f4, 0xdbe1cd, 0xb5cdae, 0x8fbb96, 0x66a986, 0x3e967d, 0x178276, 0x0d6b6c, 0x115560,
    0x143e52, 0x151d44,
];
const SPEED: &[[u8; 3]] = stops![
    0xfffdcd, 0xe7e09d, 0xcbc270, 0xa9a84c, 0x83902e, 0x5f7a1d, 0x3c6419, 0x1e4c1c, 0x11331a,
    0x172313,
];
const TURBID: &[[u8; 3]] = stops![
    0xe9f6ab, 0xdcd68d, 0xd1b875, 0xc49b61, 0xb27f52, 0x9b6648, 0x80533e, 0x644232, 0x473124,
    0x2f1e14, 0x221e1b,
];
const BLUGRN: &[[u8; 3]] = stops![0xc4e6c3, 0x96d2a4, 0x6dbc90, 0x4da284, 0x36877a, 0x266b6e, 0x1d4f60];
const MINT: &[[u8; 3]] = stops![0xe4f1e1, 0xb4d9cc, 0x89c0b6, 0x63a6a0, 0x448c8a, 0x287274, 0x0d585f];
const DARKMINT: &[[u8; 3]] =
    stops![0xd2fbd4, 0xa5dbc2, 0x7bbcb0, 0x559c9e, 0x3a7c89, 0x235d72, 0x123f5a];
const EMRLD: &[[u8; 3]] = stops![0xd3f2a3, 0x97e196, 0x6cc08b, 0x4c9b82, 0x217a79, 0x105965, 0x074050];
const MAGENTA: &[[u8; 3]] =
    stops![0xf3cbd3, 0xeaa9bd, 0xdd88ac, 0xca699d, 0xb14d8e, 0x91357d, 0x6c2167];
const TEAL: &[[u8; 3]] = stops![0xd1eeea, 0xa8dbd9, 0x85c4c9, 0x68abb8, 0x4f90a6, 0x3b738f, 0x2a5674];
const TEALGRN: &[[u8; 3]] =
    stops![0xb0f2bc, 0x89e8ac, 0x67dba5, 0x4cc8a3, 0x38b2a3, 0x2c98a0, 0x257d98];
const SUNSET: &[[u8; 3]] = stops![0xf3e79b, 0xfac484, 0xf8a07e, 0xeb7f86, 0xce6693, 0xa059a0, 0x5c53a5];
const SUNSET_DARK: &[[u8; 3]] =
    stops![0xfcde9c, 0xfaa476, 0xf0746e, 0xe34f6f, 0xdc3977, 0xb9257a, 0x7c1d6f];

const STOP_MAPS: &[(&str, &[[u8; 3]], bool)] = &[
    ("acton", ACTON, false),
    ("davos", DAVOS, false),
    ("devon", DEVON, false),
    ("oslo", OSLO, false),
    ("tokyo", TOKYO, false),
    ("nuuk", NUUK, false),
    ("lapaz", LAPAZ, false),
    ("lajolla", LAJOLLA, false),
    ("imola", IMOLA, false),
    ("deep", DEEP, true),
    ("dense", DENSE, true),
    ("gray", GRAY, false),
    ("ice", ICE, false),
    ("haline", HALINE, false),
    ("solar", SOLAR, false),
    ("thermal", THERMAL, false),
    ("tempo", TEMPO, true),
    ("ocean", TEMPO, true),
    ("speed", SPEED, true),
    ("ocean-green", SPEED, true),
    ("brown", TURBID, true),
    ("blugrn", BLUGRN, false),
    ("grnblu", BLUGRN, true),
    ("mint", MINT, true),
    ("darkmint", DARKMINT, true),
    ("emerald", EMRLD, true),
    ("magenta", MAGENTA, true),
    ("teal", TEAL, true),
    ("teal-green", TEALGRN, true),
    ("sunset-dark", SUNSET_DARK, true),
    ("sunset", SUNSET, true),
];

#[derive(Clone, Copy)]
enum Source {
    Gradient(colorous::Gradient),
    Stops(&'static [[u8; 3]]),
    Linear { from: [u8; 3], to: [u8; 3] },
}

/// A colormap mapping `[0, 1]` onto RGB colours.
#[derive(Clone)]
pub struct Colormap {
    name: String,
    source: Source,
    reversed: bool,
}

impl Colormap {
    /// Looks up a colormap by name.
    ///
    /// Gradient names are case-insensitive; the channel maps (`R`, `G`, `B`,
    /// `C`, `M`, `Y`) are matched exactly. A trailing `_r` reverses the map.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        let (base, flip) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };

        if let Some((_, from, to)) = CHANNEL_MAPS.iter().find(|(n, _, _)| *n == base) {
            return Ok(Self {
                name: name.to_string(),
                source: Source::Linear {
                    from: *from,
                    to: *to,
                },
                reversed: flip,
            });
        }

        let lower = base.to_ascii_lowercase();
        if let Some((_, stops, reversed)) = STOP_MAPS.iter().find(|(n, _, _)| *n == lower) {
            return Ok(Self {
                name: name.to_string(),
                source: Source::Stops(stops),
                reversed: *reversed ^ flip,
            });
        }
        GRADIENTS
            .iter()
            .find(|(n, _, _)| *n == lower)
            .map(|(_, gradient, reversed)| Self {
                name: name.to_string(),
                source: Source::Gradient(*gradient),
                reversed: *reversed ^ flip,
            })
            .ok_or_else(|| ConfigError::UnknownColormap {
                name: name.to_string(),
            })
    }

    /// Names accepted by [`Colormap::from_name`], without the `_r` variants.
    pub fn available() -> Vec<&'static str> {
        GRADIENTS
            .iter()
            .map(|(n, _, _)| *n)
            .chain(STOP_MAPS.iter().map(|(n, _, _)| *n))
            .chain(CHANNEL_MAPS.iter().map(|(n, _, _)| *n))
            .collect()
    }

    /// The name this colormap was created from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the colour at position `t`, clamped to `[0, 1]`.
    pub fn color_at(&self, t: f64) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };
        match self.source {
            Source::Gradient(g) => {
                let (r, g, b) = g.eval_continuous(t).as_tuple();
                [r, g, b]
            }
            Source::Linear { from, to } => lerp(from, to, t),
            Source::Stops(stops) => {
                let segments = stops.len().saturating_sub(1);
                if segments == 0 {
                    return stops.first().copied().unwrap_or([0, 0, 0]);
                }
                let pos = t * segments as f64;
                let i = (pos.floor() as usize).min(segments - 1);
                lerp(stops[i], stops[i + 1], pos - i as f64)
            }
        }
    }

    /// Samples `n` evenly spaced colours from the map.
    pub fn sample(&self, n: usize) -> Vec<[u8; 3]> {
        match n {
            0 => Vec::new(),
            1 => vec![self.color_at(0.5)],
            _ => (0..n)
                .map(|i| self.color_at(i as f64 / (n - 1) as f64))
                .collect(),
        }
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self {
            name: DEFAULT_COLORMAP.to_string(),
            source: Source::Gradient(colorous::VIRIDIS),
            reversed: false,
        }
    }
}

impl fmt::Debug for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Colormap").field(&self.name).finish()
    }
}

impl PartialEq for Colormap {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl FromStr for Colormap {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

fn lerp(from: [u8; 3], to: [u8; 3], t: f64) -> [u8; 3] {
    let mut out = [0u8; 3];
    for (i, o) in out.iter_mut().enumerate() {
        let a = from[i] as f64;
        let b = to[i] as f64;
        *o = (a + (b - a) * t).round() as u8;
    }
    out
}

/// Parses a colour given as a basic name or `#rrggbb`.
pub fn parse_color(s: &str) -> Option<[u8; 3]> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some([channel(0)?, channel(2)?, channel(4)?]);
    }
    let rgb = match s.to_ascii_lowercase().as_str() {
        "white" | "w" => [255, 255, 255],
        "black" | "k" => [0, 0, 0],
        "red" | "r" => [255, 0, 0],
        "green" | "g" => [0, 128, 0],
        "blue" | "b" => [0, 0, 255],
        "yellow" | "y" => [255, 255, 0],
        "cyan" | "c" => [0, 255, 255],
        "magenta" | "m" => [255, 0, 255],
        "gray" | "grey" => [128, 128, 128],
        "orange" => [255, 165, 0],
        _ => return None,
    };
    Some(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive_for_gradients() {
        assert!(Colormap::from_name("Viridis").is_ok());
        assert!(Colormap::from_name("YlGnBu_r").is_ok());
        assert!(matches!(
            Colormap::from_name("not-a-map"),
            Err(ConfigError::UnknownColormap { .. })
        ));
    }

    #[test]
    fn test_reversed_map_mirrors_colors() {
        let cmap = Colormap::from_name("magma").unwrap();
        let rev = Colormap::from_name("magma_r").unwrap();
        assert_eq!(cmap.color_at(0.0), rev.color_at(1.0));
        assert_eq!(cmap.color_at(1.0), rev.color_at(0.0));
    }

    #[test]
    fn test_gray_runs_black_to_white() {
        let gray = Colormap::from_name("gray").unwrap();
        let low = gray.color_at(0.0);
        let high = gray.color_at(1.0);
        assert!(low.iter().all(|&c| c < 32));
        assert!(high.iter().all(|&c| c > 223));
    }

    #[test]
    fn test_stop_maps_and_reversal() {
        let thermal = Colormap::from_name("thermal").unwrap();
        assert_eq!(thermal.color_at(0.0), [0x04, 0x23, 0x33]);
        assert_eq!(thermal.color_at(1.0), [0xe8, 0xfa, 0x5b]);
        assert_eq!(thermal.color_at(0.1), [0x13, 0x30, 0x6d]);

        // stored light to dark, shown dark to light
        let deep = Colormap::from_name("deep").unwrap();
        assert_eq!(deep.color_at(0.0), [0x28, 0x1a, 0x2c]);
        let deep_r = Colormap::from_name("Deep_r").unwrap();
        assert_eq!(deep_r.color_at(0.0), [0xfd, 0xfe, 0xcc]);

        let sunset = Colormap::from_name("sunset-dark").unwrap();
        let sunset_r = Colormap::from_name("sunset-dark_r").unwrap();
        assert_eq!(sunset.color_at(0.0), [0x7c, 0x1d, 0x6f]);
        assert_eq!(sunset.color_at(0.25), sunset_r.color_at(0.75));

        assert_eq!(Colormap::from_name("gray").unwrap().color_at(0.5), [128, 128, 128]);
        for name in ["acton", "ocean", "teal", "mint", "haline", "ice", "dense", "speed"] {
            assert!(Colormap::available().contains(&name));
        }
    }

    #[test]
    fn test_channel_maps() {
        let red = Colormap::from_name("R").unwrap();
        assert_eq!(red.color_at(0.0), [0, 0, 0]);
        assert_eq!(red.color_at(1.0), [255, 0, 0]);
        assert_eq!(red.color_at(2.0), [255, 0, 0]);
        assert_eq!(red.sample(3)[1], [128, 0, 0]);
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("white"), Some([255, 255, 255]));
        assert_eq!(parse_color("#ff8000"), Some([255, 128, 0]));
        assert_eq!(parse_color("#ff80"), None);
        assert_eq!(parse_color("chartreuse-ish"), None);
    }
}
