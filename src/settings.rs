//! Style and default-option registry.
//!
//! [`Settings`] holds the current context (theme), the default image options,
//! the default scalebar options and the save defaults. It is an explicit value
//! rather than process-wide state: plot calls borrow it and copy what they need,
//! so a figure never changes when the settings are mutated afterwards.
//!
//! Every setter validates all of its input before touching the registry, so a
//! failed call leaves the settings exactly as they were.
//!
//! ```rust
//! use imageplot::Settings;
//!
//! let mut settings = Settings::default();
//! settings.set_context("notebook", None)?;
//! settings.set_image(&[("cmap", "magma"), ("origin", "upper")])?;
//! settings.set_scalebar(&[("color", "red")])?;
//! assert_eq!(settings.style().font_size, 15.0);
//! # Ok::<(), imageplot::ImagePlotError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::colormap::{Colormap, DEFAULT_COLORMAP, parse_color};
use crate::{ConfigError, ImagePlotResult};

/// Named bundles of cosmetic defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Small fonts and thin lines for printed figures.
    Paper,
    /// Medium sizes for notebooks.
    Notebook,
    /// Same sizes as [`Context::Notebook`].
    Talk,
    /// Same sizes as [`Context::Notebook`].
    Presentation,
    /// Large fonts and thick lines.
    Poster,
}

impl Context {
    /// Every context, in declaration order.
    pub const ALL: [Context; 5] = [
        Context::Paper,
        Context::Notebook,
        Context::Talk,
        Context::Presentation,
        Context::Poster,
    ];

    /// Lower case name of the context.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Context::Paper => "paper",
            Context::Notebook => "notebook",
            Context::Talk => "talk",
            Context::Presentation => "presentation",
            Context::Poster => "poster",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Context {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Context::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| ConfigError::UnknownContext {
                name: s.to_string(),
                available: Context::ALL.map(|c| c.as_str()).join(", "),
            })
    }
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    /// Regular weight.
    Normal,
    /// Bold weight.
    Bold,
}

impl FromStr for FontWeight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" | "regular" => Ok(FontWeight::Normal),
            "bold" => Ok(FontWeight::Bold),
            other => Err(format!("'{other}' is not one of: normal, bold")),
        }
    }
}

/// Cosmetic sizes derived from a [`Context`], optionally overridden with rc keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextStyle {
    /// The context these values were derived from.
    pub context: Context,
    /// Width of axes spines and colorbar outlines, in points.
    pub axes_linewidth: f64,
    /// Panel title size, in points.
    pub title_size: f64,
    /// Panel title weight.
    pub title_weight: FontWeight,
    /// Axis and colorbar label size, in points.
    pub label_size: f64,
    /// Axis and colorbar label weight.
    pub label_weight: FontWeight,
    /// Base font size (tick labels, scalebar labels), in points.
    pub font_size: f64,
    /// Font family name.
    pub font_family: String,
    /// Base font weight.
    pub font_weight: FontWeight,
}

impl ContextStyle {
    /// Preset values for a context.
    pub fn for_context(context: Context) -> Self {
        let (axes_linewidth, title_size, font_size) = match context {
            Context::Paper => (1.5, 15.0, 10.0),
            Context::Notebook | Context::Talk | Context::Presentation => (2.5, 20.0, 15.0),
            Context::Poster => (3.5, 25.0, 20.0),
        };
        Self {
            context,
            axes_linewidth,
            title_size,
            title_weight: FontWeight::Bold,
            label_size: title_size,
            label_weight: FontWeight::Bold,
            font_size,
            font_family: "arial".to_string(),
            font_weight: FontWeight::Bold,
        }
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "axes.linewidth" => self.axes_linewidth = parse_positive(key, value)?,
            "axes.titlesize" => self.title_size = parse_positive(key, value)?,
            "axes.labelsize" => self.label_size = parse_positive(key, value)?,
            "font.size" => self.font_size = parse_positive(key, value)?,
            "axes.titleweight" => self.title_weight = parse_weight(key, value)?,
            "axes.labelweight" => self.label_weight = parse_weight(key, value)?,
            "font.weight" => self.font_weight = parse_weight(key, value)?,
            "font.family" => {
                if value.trim().is_empty() {
                    return Err(ConfigError::invalid_value(key, value, "must not be empty"));
                }
                self.font_family = value.trim().to_string();
            }
            _ => return Err(ConfigError::unknown_option("context rc", key, &RC_KEYS)),
        }
        Ok(())
    }
}

impl Default for ContextStyle {
    fn default() -> Self {
        Self::for_context(Context::Paper)
    }
}

/// Image origin: which corner pixel `[0, 0]` is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Row 0 at the top.
    Upper,
    /// Row 0 at the bottom.
    Lower,
}

impl FromStr for Origin {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upper" => Ok(Origin::Upper),
            "lower" => Ok(Origin::Lower),
            other => Err(ConfigError::invalid_value(
                "origin",
                other,
                "must be 'upper' or 'lower'",
            )),
        }
    }
}

/// Pixel resampling used when an image is drawn at a different size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Nearest neighbour.
    Nearest,
    /// Bilinear.
    Bilinear,
}

impl FromStr for Interpolation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" | "none" => Ok(Interpolation::Nearest),
            "bilinear" => Ok(Interpolation::Bilinear),
            other => Err(ConfigError::invalid_value(
                "interpolation",
                other,
                "must be 'nearest' or 'bilinear'",
            )),
        }
    }
}

/// Default options for image panels.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDefaults {
    /// Colormap name.
    pub cmap: String,
    /// Image origin.
    pub origin: Origin,
    /// Resampling method.
    pub interpolation: Interpolation,
    /// Hide the axes frame and colorbar outline.
    pub despine: bool,
}

impl Default for ImageDefaults {
    fn default() -> Self {
        Self {
            cmap: DEFAULT_COLORMAP.to_string(),
            origin: Origin::Lower,
            interpolation: Interpolation::Nearest,
            despine: false,
        }
    }
}

/// Anchor of the scalebar inside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalebarLocation {
    /// Top left corner.
    UpperLeft,
    /// Top edge, centred.
    UpperCenter,
    /// Top right corner.
    UpperRight,
    /// Centre of the image.
    Center,
    /// Bottom left corner.
    LowerLeft,
    /// Bottom edge, centred.
    LowerCenter,
    /// Bottom right corner.
    LowerRight,
}

impl FromStr for ScalebarLocation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "upper left" => ScalebarLocation::UpperLeft,
            "upper center" => ScalebarLocation::UpperCenter,
            "upper right" => ScalebarLocation::UpperRight,
            "center" => ScalebarLocation::Center,
            "lower left" => ScalebarLocation::LowerLeft,
            "lower center" => ScalebarLocation::LowerCenter,
            "lower right" => ScalebarLocation::LowerRight,
            other => {
                return Err(ConfigError::invalid_value(
                    "location",
                    other,
                    "expected e.g. 'lower right', 'upper left' or 'center'",
                ));
            }
        })
    }
}

/// Where the scalebar label goes relative to the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleLabelPosition {
    /// Above the bar.
    Top,
    /// Below the bar.
    Bottom,
    /// No label.
    None,
}

impl FromStr for ScaleLabelPosition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(ScaleLabelPosition::Top),
            "bottom" => Ok(ScaleLabelPosition::Bottom),
            "none" => Ok(ScaleLabelPosition::None),
            other => Err(ConfigError::invalid_value(
                "scale_loc",
                other,
                "must be 'top', 'bottom' or 'none'",
            )),
        }
    }
}

/// Default scalebar appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalebarDefaults {
    /// Bar and label colour.
    pub color: [u8; 3],
    /// Anchor inside the image.
    pub location: ScalebarLocation,
    /// Bar height as a fraction of the image height.
    pub height_fraction: f64,
    /// Target bar length as a fraction of the image width.
    pub length_fraction: f64,
    /// Label position.
    pub scale_loc: ScaleLabelPosition,
    /// Opacity of the box behind the bar; 0 draws no box.
    pub box_alpha: f64,
}

impl Default for ScalebarDefaults {
    fn default() -> Self {
        Self {
            color: [255, 255, 255],
            location: ScalebarLocation::LowerRight,
            height_fraction: 0.05,
            length_fraction: 0.3,
            scale_loc: ScaleLabelPosition::Top,
            box_alpha: 0.0,
        }
    }
}

/// Defaults used when saving figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveDefaults {
    /// Dots per inch; font sizes in points scale with it.
    pub dpi: u32,
}

impl Default for SaveDefaults {
    fn default() -> Self {
        Self { dpi: 300 }
    }
}

/// Keys accepted in the `rc` overrides of [`Settings::set_context`].
pub const RC_KEYS: [&str; 8] = [
    "axes.linewidth",
    "axes.titlesize",
    "axes.titleweight",
    "axes.labelsize",
    "axes.labelweight",
    "font.size",
    "font.family",
    "font.weight",
];

/// Keys accepted by [`Settings::set_image`].
pub const IMAGE_KEYS: [&str; 4] = ["cmap", "origin", "interpolation", "despine"];

/// Keys accepted by [`Settings::set_scalebar`].
pub const SCALEBAR_KEYS: [&str; 6] = [
    "color",
    "location",
    "height_fraction",
    "length_fraction",
    "scale_loc",
    "box_alpha",
];

/// The settings registry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    style: ContextStyle,
    image: ImageDefaults,
    scalebar: ScalebarDefaults,
    save: SaveDefaults,
}

impl Settings {
    /// Fresh settings with the library defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to the named context, then applies `rc` overrides.
    ///
    /// Fails with [`ConfigError::UnknownContext`] for unknown names and with
    /// [`ConfigError::UnknownOption`] / [`ConfigError::InvalidValue`] for bad
    /// overrides. Nothing changes on failure.
    pub fn set_context(&mut self, name: &str, rc: Option<&[(&str, &str)]>) -> ImagePlotResult<()> {
        let context: Context = name.parse()?;
        let mut style = ContextStyle::for_context(context);
        for (key, value) in rc.unwrap_or_default() {
            style.apply(key, value)?;
        }
        debug!(context = %context, "context updated");
        self.style = style;
        Ok(())
    }

    /// Updates the default image options.
    ///
    /// Keys: `cmap`, `origin`, `interpolation`, `despine`.
    pub fn set_image(&mut self, opts: &[(&str, &str)]) -> ImagePlotResult<()> {
        let mut image = self.image.clone();
        for &(key, value) in opts {
            match key {
                "cmap" => {
                    Colormap::from_name(value)?;
                    image.cmap = value.to_string();
                }
                "origin" => image.origin = value.parse()?,
                "interpolation" => image.interpolation = value.parse()?,
                "despine" => image.despine = parse_bool(key, value)?,
                _ => return Err(ConfigError::unknown_option("image", key, &IMAGE_KEYS).into()),
            }
        }
        debug!(?image, "image defaults updated");
        self.image = image;
        Ok(())
    }

    /// Resets the scalebar defaults, then applies `opts`.
    ///
    /// Keys: `color`, `location`, `height_fraction`, `length_fraction`,
    /// `scale_loc`, `box_alpha`.
    pub fn set_scalebar(&mut self, opts: &[(&str, &str)]) -> ImagePlotResult<()> {
        let mut scalebar = ScalebarDefaults::default();
        for &(key, value) in opts {
            match key {
                "color" => {
                    scalebar.color = parse_color(value).ok_or_else(|| {
                        ConfigError::invalid_value(key, value, "expected a colour name or #rrggbb")
                    })?
                }
                "location" => scalebar.location = value.parse()?,
                "height_fraction" => scalebar.height_fraction = parse_fraction(key, value)?,
                "length_fraction" => scalebar.length_fraction = parse_fraction(key, value)?,
                "scale_loc" => scalebar.scale_loc = value.parse()?,
                "box_alpha" => scalebar.box_alpha = parse_fraction(key, value)?,
                _ => {
                    return Err(
                        ConfigError::unknown_option("scalebar", key, &SCALEBAR_KEYS).into(),
                    );
                }
            }
        }
        debug!(?scalebar, "scalebar defaults updated");
        self.scalebar = scalebar;
        Ok(())
    }

    /// Sets the resolution used when saving figures.
    pub fn set_save_context(&mut self, dpi: u32) -> ImagePlotResult<()> {
        if dpi == 0 {
            return Err(ConfigError::invalid_value("dpi", dpi, "must be positive").into());
        }
        self.save.dpi = dpi;
        Ok(())
    }

    /// Restores every category to the library defaults.
    pub fn reset_defaults(&mut self) {
        *self = Self::default();
    }

    /// Current context.
    pub const fn context(&self) -> Context {
        self.style.context
    }

    /// Current context style.
    pub const fn style(&self) -> &ContextStyle {
        &self.style
    }

    /// Current image defaults.
    pub const fn image(&self) -> &ImageDefaults {
        &self.image
    }

    /// Current scalebar defaults.
    pub const fn scalebar(&self) -> &ScalebarDefaults {
        &self.scalebar
    }

    /// Current save defaults.
    pub const fn save(&self) -> SaveDefaults {
        self.save
    }

    /// Independent copy of the current settings.
    pub fn snapshot(&self) -> Settings {
        self.clone()
    }
}

fn parse_positive(key: &str, value: &str) -> Result<f64, ConfigError> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(ConfigError::invalid_value(key, value, "expected a positive number")),
    }
}

fn parse_fraction(key: &str, value: &str) -> Result<f64, ConfigError> {
    match value.trim().parse::<f64>() {
        Ok(v) if (0.0..=1.0).contains(&v) => Ok(v),
        _ => Err(ConfigError::invalid_value(key, value, "expected a number in [0, 1]")),
    }
}

fn parse_weight(key: &str, value: &str) -> Result<FontWeight, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|reason: String| ConfigError::invalid_value(key, value, reason))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::invalid_value(key, value, "expected true or false")),
    }
}
