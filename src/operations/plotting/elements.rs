//! Overlay elements drawn on top of image panels.
//!
//! The scalebar picks a "nice" length close to a fraction of the image width,
//! switching unit prefixes so the label stays readable: 450 nm becomes a
//! 200 nm bar, 0.45 um becomes the same 200 nm bar.

use std::fmt;
use std::str::FromStr;

use crate::ConfigError;
use crate::settings::{ScaleLabelPosition, ScalebarDefaults, ScalebarLocation};

/// Lengths a scalebar may show, in the chosen unit.
const PREFERRED_VALUES: [f64; 15] = [
    1.0, 2.0, 5.0, 10.0, 15.0, 20.0, 25.0, 50.0, 75.0, 100.0, 125.0, 150.0, 200.0, 500.0, 750.0,
];

const SI_PREFIXES: [(&str, f64, bool); 22] = [
    ("Y", 1e24, true),
    ("Z", 1e21, true),
    ("E", 1e18, true),
    ("P", 1e15, true),
    ("T", 1e12, true),
    ("G", 1e9, true),
    ("M", 1e6, true),
    ("k", 1e3, true),
    ("h", 1e2, false),
    ("da", 1e1, false),
    ("", 1.0, true),
    ("d", 1e-1, false),
    ("c", 1e-2, false),
    ("m", 1e-3, true),
    ("µ", 1e-6, true),
    ("u", 1e-6, false),
    ("n", 1e-9, true),
    ("p", 1e-12, true),
    ("f", 1e-15, true),
    ("a", 1e-18, true),
    ("z", 1e-21, true),
    ("y", 1e-24, true),
];

const IMPERIAL_UNITS: [(&str, f64, bool); 8] = [
    ("lea", 190_080.0, true),
    ("mi", 63_360.0, true),
    ("fur", 7_920.0, false),
    ("ch", 792.0, false),
    ("yd", 36.0, true),
    ("ft", 12.0, true),
    ("in", 1.0, true),
    ("th", 0.001, true),
];

const ANGLE_UNITS: [(&str, f64, bool); 6] = [
    ("°", 1.0, true),
    ("deg", 1.0, false),
    ("′", 1.0 / 60.0, true),
    ("arcmin", 1.0 / 60.0, false),
    ("″", 1.0 / 3600.0, true),
    ("arcsec", 1.0 / 3600.0, false),
];

/// Physical dimension of the pixel size given to a scalebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dimension {
    /// SI lengths (`m` with any prefix).
    #[default]
    Si,
    /// Reciprocal SI lengths (`1/m`, `1/nm`, ...).
    SiReciprocal,
    /// Imperial lengths (`in`, `ft`, `yd`, `mi`, ...).
    Imperial,
    /// Angles (degrees, arc minutes, arc seconds).
    Angle,
    /// Pixels (`px`, `kpx`, `Mpx`).
    Pixel,
}

impl Dimension {
    /// Every dimension.
    pub const ALL: [Self; 5] = [
        Self::Si,
        Self::SiReciprocal,
        Self::Imperial,
        Self::Angle,
        Self::Pixel,
    ];

    /// Name accepted by [`Dimension::from_str`].
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Si => "si",
            Self::SiReciprocal => "si-reciprocal",
            Self::Imperial => "imperial",
            Self::Angle => "angle",
            Self::Pixel => "pixel",
        }
    }

    /// Units of this dimension: symbol, factor to the base unit, and whether
    /// the unit may be chosen for display.
    fn units(&self) -> Vec<(String, f64, bool)> {
        match self {
            Self::Si => SI_PREFIXES
                .iter()
                .map(|(p, f, d)| (format!("{p}m"), *f, *d))
                .collect(),
            Self::SiReciprocal => SI_PREFIXES
                .iter()
                .rev()
                .map(|(p, f, d)| (format!("1/{p}m"), 1.0 / f, *d))
                .collect(),
            Self::Imperial => IMPERIAL_UNITS
                .iter()
                .map(|(u, f, d)| (u.to_string(), *f, *d))
                .collect(),
            Self::Angle => ANGLE_UNITS
                .iter()
                .map(|(u, f, d)| (u.to_string(), *f, *d))
                .collect(),
            Self::Pixel => [("Mpx", 1e6), ("kpx", 1e3), ("px", 1.0)]
                .iter()
                .map(|(u, f)| (u.to_string(), *f, true))
                .collect(),
        }
    }

    /// Factor converting `units` to the base unit of this dimension.
    pub fn unit_factor(&self, units: &str) -> Option<f64> {
        self.units()
            .into_iter()
            .find(|(u, _, _)| u == units)
            .map(|(_, f, _)| f)
    }

    /// Display unit for a length given in base units: the largest unit in
    /// which the value is at least 1, or the smallest unit otherwise.
    fn preferred_unit(&self, base_value: f64) -> (String, f64) {
        let mut display: Vec<(String, f64)> = self
            .units()
            .into_iter()
            .filter(|(_, _, d)| *d)
            .map(|(u, f, _)| (u, f))
            .collect();
        display.sort_by(|a, b| b.1.total_cmp(&a.1));
        let fallback = display.last().cloned();
        display
            .into_iter()
            .find(|(_, f)| base_value / f >= 1.0)
            .or(fallback)
            .unwrap_or_else(|| (String::new(), 1.0))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownDimension {
                name: s.to_string(),
                available: Self::ALL
                    .iter()
                    .map(Self::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Where and how long the scalebar is for a given image width.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalebarLayout {
    /// Bar length in image pixels.
    pub length_px: f64,
    /// Bar length in `unit`.
    pub value: f64,
    /// Display unit.
    pub unit: String,
    /// Text drawn next to the bar, e.g. `"200 nm"`.
    pub label: String,
}

/// A scalebar overlay: physical size `dx` of one pixel in `units`.
#[derive(Debug, Clone, PartialEq)]
pub struct Scalebar {
    /// Size of one pixel.
    pub dx: f64,
    /// Unit of `dx`.
    pub units: String,
    /// Dimension of `units`.
    pub dimension: Dimension,
    /// Bar and label colour.
    pub color: [u8; 3],
    /// Anchor inside the image.
    pub location: ScalebarLocation,
    /// Bar thickness as a fraction of the image height.
    pub height_fraction: f64,
    /// Target bar length as a fraction of the image width.
    pub length_fraction: f64,
    /// Label placement.
    pub scale_loc: ScaleLabelPosition,
    /// Opacity of the background box.
    pub box_alpha: f64,
}

impl Scalebar {
    /// Builds a scalebar styled with `defaults`.
    ///
    /// Fails when `dx` is not a positive number or `units` does not belong to
    /// `dimension`.
    pub fn new(
        dx: f64,
        units: &str,
        dimension: Dimension,
        defaults: &ScalebarDefaults,
    ) -> Result<Self, ConfigError> {
        if !(dx.is_finite() && dx > 0.0) {
            return Err(ConfigError::invalid_value("dx", dx, "must be a positive number"));
        }
        if dimension.unit_factor(units).is_none() {
            let allowed: Vec<String> = dimension.units().into_iter().map(|(u, _, _)| u).collect();
            return Err(ConfigError::invalid_value(
                "units",
                units,
                format!(
                    "not a unit of dimension '{dimension}'; expected one of {}",
                    allowed.join(", ")
                ),
            ));
        }
        Ok(Self {
            dx,
            units: units.to_string(),
            dimension,
            color: defaults.color,
            location: defaults.location,
            height_fraction: defaults.height_fraction,
            length_fraction: defaults.length_fraction,
            scale_loc: defaults.scale_loc,
            box_alpha: defaults.box_alpha,
        })
    }

    /// Chooses the bar length for an image `width_px` pixels wide.
    pub fn layout(&self, width_px: usize) -> ScalebarLayout {
        // unit_factor was checked in `new`
        let factor = self.dimension.unit_factor(&self.units).unwrap_or(1.0);
        let target = self.length_fraction * width_px as f64 * self.dx * factor;

        let (unit, unit_factor) = self.dimension.preferred_unit(target);
        let in_unit = target / unit_factor;
        let value = PREFERRED_VALUES
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= in_unit)
            .unwrap_or(PREFERRED_VALUES[0]);

        let length_px = value * unit_factor / (self.dx * factor);
        ScalebarLayout {
            length_px,
            value,
            label: format!("{value} {unit}"),
            unit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    fn bar(dx: f64, units: &str, dimension: Dimension) -> Scalebar {
        Scalebar::new(dx, units, dimension, &ScalebarDefaults::default()).unwrap()
    }

    #[test]
    fn test_equivalent_pixel_sizes_give_equivalent_bars() {
        let nm = bar(15.0, "nm", Dimension::Si).layout(100);
        let um = bar(0.015, "um", Dimension::Si).layout(100);
        assert_eq!(nm.label, "200 nm");
        assert_eq!(um.label, "200 nm");
        assert_approx_eq!(nm.length_px, 200.0 / 15.0, 1e-9);
        assert_approx_eq!(um.length_px, nm.length_px, 1e-9);
    }

    #[test]
    fn test_prefix_switches_up() {
        // 0.3 * 200 px * 100 nm = 6000 nm -> 6 µm -> 5 µm bar
        let layout = bar(100.0, "nm", Dimension::Si).layout(200);
        assert_eq!(layout.label, "5 µm");
        assert_approx_eq!(layout.length_px, 50.0, 1e-9);
    }

    #[test]
    fn test_other_dimensions() {
        let px = bar(1.0, "px", Dimension::Pixel).layout(100);
        assert_eq!(px.label, "25 px");

        // 0.3 * 100 * 1 in = 30 in -> 2.5 ft -> 2 ft bar
        let imperial = bar(1.0, "in", Dimension::Imperial).layout(100);
        assert_eq!(imperial.label, "2 ft");
        assert_approx_eq!(imperial.length_px, 24.0, 1e-9);

        // 0.3 * 100 * 0.01 1/nm = 0.3 1/nm = 300 1/µm
        let recip = bar(0.01, "1/nm", Dimension::SiReciprocal).layout(100);
        assert_eq!(recip.unit, "1/µm");
        assert_eq!(recip.value, 200.0);
    }

    #[test]
    fn test_rejects_bad_units_and_dx() {
        let defaults = ScalebarDefaults::default();
        assert!(matches!(
            Scalebar::new(1.0, "ft", Dimension::Si, &defaults),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(Scalebar::new(0.0, "nm", Dimension::Si, &defaults).is_err());
        assert!(matches!(
            "metric".parse::<Dimension>(),
            Err(ConfigError::UnknownDimension { .. })
        ));
    }
}
