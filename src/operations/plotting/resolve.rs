//! Per-call plot options and their resolution against [`Settings`].
//!
//! Precedence is explicit argument, then the settings registry, then the
//! library default. Resolution is pure: the same options and settings always
//! give the same result, and all validation happens here, before any pixel
//! is touched.

use tracing::debug;

use super::core::Orientation;
use super::elements::{Dimension, Scalebar};
use crate::colormap::Colormap;
use crate::settings::{Interpolation, Origin, Settings};
use crate::ConfigError;

/// Percentiles used for robust colour limits when none are given.
pub const DEFAULT_PERC: (f64, f64) = (2.0, 98.0);

/// Cosmetic options for one image panel; `None` means "use the default".
///
/// ```rust
/// use imageplot::ImageOptions;
///
/// let opts = ImageOptions::new()
///     .with_cmap("magma")
///     .with_scalebar(15.0, "nm")
///     .with_robust(true)
///     .with_title("Polymer");
/// assert_eq!(opts.units.as_deref(), Some("nm"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageOptions {
    /// Colormap name.
    pub cmap: Option<String>,
    /// Lower colour limit.
    pub vmin: Option<f64>,
    /// Upper colour limit.
    pub vmax: Option<f64>,
    /// Opacity in `[0, 1]`.
    pub alpha: Option<f64>,
    /// Image origin.
    pub origin: Option<Origin>,
    /// Resampling method.
    pub interpolation: Option<Interpolation>,
    /// Logarithmic colour scale.
    pub cbar_log: bool,
    /// Take missing limits from percentiles of the data.
    pub robust: bool,
    /// Percentiles used when `robust` is set.
    pub perc: Option<(f64, f64)>,
    /// Pixel size for the scalebar; requires `units`.
    pub dx: Option<f64>,
    /// Unit of `dx`; requires `dx`.
    pub units: Option<String>,
    /// Scalebar dimension name, `si` by default.
    pub dimension: Option<String>,
    /// Draw a colorbar (default `true`).
    pub cbar: Option<bool>,
    /// Colorbar orientation: `v`/`vertical` or `h`/`horizontal`.
    pub orientation: Option<String>,
    /// Colorbar label.
    pub cbar_label: Option<String>,
    /// Explicit colorbar ticks.
    pub cbar_ticks: Option<Vec<f64>>,
    /// Show axis ticks.
    pub showticks: bool,
    /// Hide the frame; defaults to the image settings.
    pub despine: Option<bool>,
    /// Panel title.
    pub title: Option<String>,
    /// Compute and attach summary statistics.
    pub describe: bool,
}

impl ImageOptions {
    /// Options with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the colormap.
    pub fn with_cmap(mut self, cmap: impl Into<String>) -> Self {
        self.cmap = Some(cmap.into());
        self
    }

    /// Sets the lower colour limit.
    pub const fn with_vmin(mut self, vmin: f64) -> Self {
        self.vmin = Some(vmin);
        self
    }

    /// Sets the upper colour limit.
    pub const fn with_vmax(mut self, vmax: f64) -> Self {
        self.vmax = Some(vmax);
        self
    }

    /// Sets the opacity.
    pub const fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Sets the origin.
    pub const fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Sets the resampling method.
    pub const fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = Some(interpolation);
        self
    }

    /// Uses a logarithmic colour scale.
    pub const fn with_cbar_log(mut self, cbar_log: bool) -> Self {
        self.cbar_log = cbar_log;
        self
    }

    /// Enables robust limits.
    pub const fn with_robust(mut self, robust: bool) -> Self {
        self.robust = robust;
        self
    }

    /// Sets the robust percentiles.
    pub const fn with_perc(mut self, low: f64, high: f64) -> Self {
        self.perc = Some((low, high));
        self
    }

    /// Adds a scalebar: `dx` is the size of one pixel in `units`.
    pub fn with_scalebar(mut self, dx: f64, units: impl Into<String>) -> Self {
        self.dx = Some(dx);
        self.units = Some(units.into());
        self
    }

    /// Sets the scalebar dimension.
    pub fn with_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.dimension = Some(dimension.into());
        self
    }

    /// Shows or hides the colorbar.
    pub const fn with_cbar(mut self, cbar: bool) -> Self {
        self.cbar = Some(cbar);
        self
    }

    /// Sets the colorbar orientation.
    pub fn with_orientation(mut self, orientation: impl Into<String>) -> Self {
        self.orientation = Some(orientation.into());
        self
    }

    /// Sets the colorbar label.
    pub fn with_cbar_label(mut self, label: impl Into<String>) -> Self {
        self.cbar_label = Some(label.into());
        self
    }

    /// Sets explicit colorbar ticks.
    pub fn with_cbar_ticks(mut self, ticks: Vec<f64>) -> Self {
        self.cbar_ticks = Some(ticks);
        self
    }

    /// Shows or hides axis ticks.
    pub const fn with_showticks(mut self, showticks: bool) -> Self {
        self.showticks = showticks;
        self
    }

    /// Hides or shows the frame.
    pub const fn with_despine(mut self, despine: bool) -> Self {
        self.despine = Some(despine);
        self
    }

    /// Sets the panel title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Enables summary statistics.
    pub const fn with_describe(mut self, describe: bool) -> Self {
        self.describe = describe;
        self
    }

    /// Merges these options with `settings` and validates the result.
    pub fn resolve(&self, settings: &Settings) -> Result<ResolvedImageOptions, ConfigError> {
        let image = settings.image();

        let cmap = Colormap::from_name(self.cmap.as_deref().unwrap_or(&image.cmap))?;

        if let (Some(lo), Some(hi)) = (self.vmin, self.vmax) {
            if !(lo < hi) {
                return Err(ConfigError::invalid_value(
                    "vmin",
                    lo,
                    format!("must be smaller than vmax ({hi})"),
                ));
            }
        }
        for (key, value) in [("vmin", self.vmin), ("vmax", self.vmax)] {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                return Err(ConfigError::invalid_value(key, v, "must be finite"));
            }
        }
        if self.cbar_log {
            if let Some(v) = [self.vmin, self.vmax].into_iter().flatten().find(|v| *v <= 0.0) {
                return Err(ConfigError::invalid_value(
                    "cbar_log",
                    v,
                    "a logarithmic colour scale needs positive limits",
                ));
            }
        }

        let alpha = self.alpha.unwrap_or(1.0);
        if !(0.0..=1.0).contains(&alpha) {
            return Err(ConfigError::invalid_value("alpha", alpha, "must lie in [0, 1]"));
        }

        let perc = self.perc.unwrap_or(DEFAULT_PERC);
        if !(0.0 <= perc.0 && perc.0 < perc.1 && perc.1 <= 100.0) {
            return Err(ConfigError::invalid_value(
                "perc",
                format!("({}, {})", perc.0, perc.1),
                "percentiles must satisfy 0 <= low < high <= 100",
            ));
        }

        let dimension: Dimension = match &self.dimension {
            Some(name) => name.parse()?,
            None => Dimension::default(),
        };
        let scalebar = match (self.dx, self.units.as_deref()) {
            (Some(dx), Some(units)) => Some(Scalebar::new(dx, units, dimension, settings.scalebar())?),
            (Some(_), None) => {
                return Err(ConfigError::ScalebarPairing(
                    "'units' must be specified when 'dx' (scalebar) is used".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::ScalebarPairing(
                    "'dx' must be specified when 'units' (scalebar) is used".to_string(),
                ));
            }
            (None, None) => None,
        };

        let orientation: Orientation = match &self.orientation {
            Some(o) => o.parse()?,
            None => Orientation::default(),
        };

        let resolved = ResolvedImageOptions {
            cmap,
            vmin: self.vmin,
            vmax: self.vmax,
            alpha,
            origin: self.origin.unwrap_or(image.origin),
            interpolation: self.interpolation.unwrap_or(image.interpolation),
            cbar_log: self.cbar_log,
            robust: self.robust,
            perc,
            scalebar,
            cbar: self.cbar.unwrap_or(true),
            orientation,
            cbar_label: self.cbar_label.clone(),
            cbar_ticks: self.cbar_ticks.clone(),
            showticks: self.showticks,
            despine: self.despine.unwrap_or(image.despine),
            title: self.title.clone(),
            describe: self.describe,
        };
        debug!(
            cmap = resolved.cmap.name(),
            robust = resolved.robust,
            scalebar = resolved.scalebar.is_some(),
            "resolved image options"
        );
        Ok(resolved)
    }
}

/// Fully resolved options; every field is concrete.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImageOptions {
    /// Colormap.
    pub cmap: Colormap,
    /// Explicit lower limit.
    pub vmin: Option<f64>,
    /// Explicit upper limit.
    pub vmax: Option<f64>,
    /// Opacity.
    pub alpha: f64,
    /// Image origin.
    pub origin: Origin,
    /// Resampling method.
    pub interpolation: Interpolation,
    /// Logarithmic colour scale.
    pub cbar_log: bool,
    /// Robust limits.
    pub robust: bool,
    /// Robust percentiles.
    pub perc: (f64, f64),
    /// Scalebar, when `dx` and `units` were given.
    pub scalebar: Option<Scalebar>,
    /// Draw a colorbar.
    pub cbar: bool,
    /// Colorbar orientation.
    pub orientation: Orientation,
    /// Colorbar label.
    pub cbar_label: Option<String>,
    /// Explicit colorbar ticks.
    pub cbar_ticks: Option<Vec<f64>>,
    /// Show axis ticks.
    pub showticks: bool,
    /// Hide the frame.
    pub despine: bool,
    /// Panel title.
    pub title: Option<String>,
    /// Compute summary statistics.
    pub describe: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_come_from_settings() {
        let mut settings = Settings::default();
        let resolved = ImageOptions::new().resolve(&settings).unwrap();
        assert_eq!(resolved.cmap.name(), "viridis");
        assert_eq!(resolved.origin, Origin::Lower);
        assert!(resolved.cbar);
        assert_eq!(resolved.perc, DEFAULT_PERC);

        settings
            .set_image(&[("cmap", "magma"), ("despine", "true")])
            .unwrap();
        let resolved = ImageOptions::new().resolve(&settings).unwrap();
        assert_eq!(resolved.cmap.name(), "magma");
        assert!(resolved.despine);

        // explicit beats registry
        let resolved = ImageOptions::new()
            .with_cmap("gray")
            .with_despine(false)
            .resolve(&settings)
            .unwrap();
        assert_eq!(resolved.cmap.name(), "gray");
        assert!(!resolved.despine);
    }

    #[test]
    fn test_scalebar_pairing() {
        let settings = Settings::default();
        let mut opts = ImageOptions::new();
        opts.dx = Some(15.0);
        assert!(matches!(
            opts.resolve(&settings),
            Err(ConfigError::ScalebarPairing(_))
        ));

        let mut opts = ImageOptions::new();
        opts.units = Some("nm".to_string());
        assert!(matches!(
            opts.resolve(&settings),
            Err(ConfigError::ScalebarPairing(_))
        ));

        let resolved = ImageOptions::new()
            .with_scalebar(15.0, "nm")
            .resolve(&settings)
            .unwrap();
        let bar = resolved.scalebar.unwrap();
        assert_eq!(bar.color, [255, 255, 255]);
        assert_eq!(bar.dimension, Dimension::Si);
    }

    #[test]
    fn test_validation_errors() {
        let settings = Settings::default();
        let cases = [
            ImageOptions::new().with_cmap("nope"),
            ImageOptions::new().with_vmin(2.0).with_vmax(1.0),
            ImageOptions::new().with_perc(50.0, 10.0),
            ImageOptions::new().with_alpha(1.5),
            ImageOptions::new().with_orientation("diagonal"),
            ImageOptions::new().with_scalebar(1.0, "nm").with_dimension("metric"),
            ImageOptions::new().with_cbar_log(true).with_vmin(0.0),
        ];
        for opts in cases {
            assert!(opts.resolve(&settings).is_err(), "{opts:?} should fail");
        }
    }
}
