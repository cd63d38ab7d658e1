//! Core types of the figure model.
//!
//! A [`Figure`] is a grid of [`Panel`]s plus a copy of the style it was built
//! with. It is plain data: building one never touches a drawing backend, and
//! rendering happens only when the caller asks for it.

use std::fmt;
use std::str::FromStr;

use super::elements::Scalebar;
use crate::colormap::Colormap;
use crate::operations::statistics::{Histogram, ImageSummary};
use crate::settings::{ContextStyle, Interpolation, Origin, Settings};
use crate::{ConfigError, ImageData};

/// Orientation of a colorbar, or of the histogram next to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Right of the image.
    #[default]
    Vertical,
    /// Below the image.
    Horizontal,
}

impl FromStr for Orientation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v" | "vertical" => Ok(Self::Vertical),
            "h" | "horizontal" => Ok(Self::Horizontal),
            other => Err(ConfigError::invalid_value(
                "orientation",
                other,
                "must be either 'horizontal' or 'h' / 'vertical' or 'v'",
            )),
        }
    }
}

/// Which ends of a colorbar get a triangular extension marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extend {
    /// No markers.
    #[default]
    Neither,
    /// Below `vmin`.
    Min,
    /// Above `vmax`.
    Max,
    /// Both ends.
    Both,
}

impl Extend {
    /// Combines the two ends.
    pub const fn from_ends(min: bool, max: bool) -> Self {
        match (min, max) {
            (true, true) => Self::Both,
            (true, false) => Self::Min,
            (false, true) => Self::Max,
            (false, false) => Self::Neither,
        }
    }

    /// Whether the low end is extended.
    pub const fn has_min(&self) -> bool {
        matches!(self, Self::Min | Self::Both)
    }

    /// Whether the high end is extended.
    pub const fn has_max(&self) -> bool {
        matches!(self, Self::Max | Self::Both)
    }
}

/// Maps data values onto `[0, 1]` before the colormap lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorNorm {
    /// Linear between the limits.
    Linear {
        /// Value drawn with the lowest colour.
        vmin: f64,
        /// Value drawn with the highest colour.
        vmax: f64,
    },
    /// Linear in `log10` between the limits; both must be positive.
    Log {
        /// Value drawn with the lowest colour.
        vmin: f64,
        /// Value drawn with the highest colour.
        vmax: f64,
    },
}

impl ColorNorm {
    /// Lower limit.
    pub const fn vmin(&self) -> f64 {
        match self {
            Self::Linear { vmin, .. } | Self::Log { vmin, .. } => *vmin,
        }
    }

    /// Upper limit.
    pub const fn vmax(&self) -> f64 {
        match self {
            Self::Linear { vmax, .. } | Self::Log { vmax, .. } => *vmax,
        }
    }

    /// Position of `value` between the limits, not clamped.
    ///
    /// NaN stays NaN; so do non-positive values under a log norm.
    pub fn normalize(&self, value: f64) -> f64 {
        if value.is_nan() {
            return f64::NAN;
        }
        match *self {
            Self::Linear { vmin, vmax } => {
                if vmax > vmin {
                    (value - vmin) / (vmax - vmin)
                } else {
                    0.0
                }
            }
            Self::Log { vmin, vmax } => {
                if value <= 0.0 {
                    return f64::NAN;
                }
                let (lo, hi) = (vmin.log10(), vmax.log10());
                if hi > lo {
                    (value.log10() - lo) / (hi - lo)
                } else {
                    0.0
                }
            }
        }
    }
}

/// Colorbar attached to an image panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Colorbar {
    /// Axis label.
    pub label: Option<String>,
    /// Tick positions in data units.
    pub ticks: Vec<f64>,
    /// Side of the image the bar is drawn on.
    pub orientation: Orientation,
    /// Extension markers.
    pub extend: Extend,
    /// Draw the outline.
    pub outline: bool,
}

/// An image drawn with a colormap (gray data) or as is (RGB data).
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePanel {
    /// Pixel data.
    pub image: ImageData,
    /// Colormap for gray data.
    pub cmap: Colormap,
    /// Value to colour mapping.
    pub norm: ColorNorm,
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
    /// Where row 0 is drawn.
    pub origin: Origin,
    /// Resampling when the panel is not pixel aligned.
    pub interpolation: Interpolation,
    /// Title above the panel.
    pub title: Option<String>,
    /// Draw axis ticks.
    pub showticks: bool,
    /// Hide the frame.
    pub despine: bool,
    /// Optional colorbar.
    pub colorbar: Option<Colorbar>,
    /// Optional scalebar.
    pub scalebar: Option<Scalebar>,
    /// Summary statistics when requested.
    pub summary: Option<ImageSummary>,
}

impl ImagePanel {
    /// RGB colour of the pixel at `(row, col)`.
    ///
    /// Gray data goes through the norm and colormap. RGB data is scaled from
    /// `[0, vmax]` to bytes. `None` for missing pixels.
    pub fn pixel_color(&self, row: usize, col: usize) -> Option<[u8; 3]> {
        match &self.image {
            ImageData::Gray(a) => {
                let t = self.norm.normalize(a[[row, col]]);
                if t.is_nan() {
                    None
                } else {
                    Some(self.cmap.color_at(t))
                }
            }
            ImageData::Rgb(a) => {
                let scale = 255.0 / self.norm.vmax().max(f64::EPSILON);
                let mut out = [0u8; 3];
                for (c, o) in out.iter_mut().enumerate() {
                    let v = a[[row, col, c]];
                    if v.is_nan() {
                        return None;
                    }
                    *o = (v * scale).round().clamp(0.0, 255.0) as u8;
                }
                Some(out)
            }
        }
    }
}

/// A histogram of pixel values, bars coloured like the image.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramPanel {
    /// Bin edges and counts.
    pub histogram: Histogram,
    /// Colormap shared with the image.
    pub cmap: Colormap,
    /// Norm shared with the image.
    pub norm: ColorNorm,
    /// `Vertical` draws horizontal bars next to the image.
    pub orientation: Orientation,
    /// Title above the panel.
    pub title: Option<String>,
}

impl HistogramPanel {
    /// Colour of every bar: the colormap at the bin centre.
    pub fn bar_colors(&self) -> Vec<[u8; 3]> {
        self.histogram
            .centers()
            .into_iter()
            .map(|c| {
                let t = self.norm.normalize(c);
                self.cmap.color_at(if t.is_nan() { 0.0 } else { t })
            })
            .collect()
    }
}

/// One cell of a figure.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    /// Image panel.
    Image(Box<ImagePanel>),
    /// Histogram panel.
    Histogram(HistogramPanel),
}

impl Panel {
    /// The image panel, if this is one.
    pub fn as_image(&self) -> Option<&ImagePanel> {
        match self {
            Self::Image(p) => Some(p),
            Self::Histogram(_) => None,
        }
    }

    /// The histogram panel, if this is one.
    pub const fn as_histogram(&self) -> Option<&HistogramPanel> {
        match self {
            Self::Histogram(p) => Some(p),
            Self::Image(_) => None,
        }
    }

    /// Panel title.
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Image(p) => p.title.as_deref(),
            Self::Histogram(p) => p.title.as_deref(),
        }
    }
}

impl From<ImagePanel> for Panel {
    fn from(p: ImagePanel) -> Self {
        Self::Image(Box::new(p))
    }
}

impl From<HistogramPanel> for Panel {
    fn from(p: HistogramPanel) -> Self {
        Self::Histogram(p)
    }
}

/// A composed figure: panels laid out row-major on an `nrows` x `ncols` grid.
///
/// Cells past the last panel stay empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    panels: Vec<Panel>,
    nrows: usize,
    ncols: usize,
    figsize: (f64, f64),
    dpi: u32,
    style: ContextStyle,
    title: Option<String>,
}

impl Figure {
    /// An empty figure; `figsize` is in inches.
    ///
    /// Style and dpi are copied from `settings`.
    pub fn new(nrows: usize, ncols: usize, figsize: (f64, f64), settings: &Settings) -> Self {
        Self {
            panels: Vec::with_capacity(nrows * ncols),
            nrows: nrows.max(1),
            ncols: ncols.max(1),
            figsize,
            dpi: settings.save().dpi,
            style: settings.style().clone(),
            title: None,
        }
    }

    pub(crate) fn push(&mut self, panel: impl Into<Panel>) {
        self.panels.push(panel.into());
    }

    /// Sets the figure title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Overrides the dpi used when rendering.
    pub const fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Overrides the figure size in inches.
    pub const fn with_figsize(mut self, figsize: (f64, f64)) -> Self {
        self.figsize = figsize;
        self
    }

    /// All panels in row-major order.
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Panel `index`, row-major.
    pub fn panel(&self, index: usize) -> Option<&Panel> {
        self.panels.get(index)
    }

    /// Mutable access to the panels, e.g. to retitle them.
    pub fn panels_mut(&mut self) -> &mut [Panel] {
        &mut self.panels
    }

    /// The image panels, skipping histograms.
    pub fn image_panels(&self) -> impl Iterator<Item = &ImagePanel> {
        self.panels.iter().filter_map(Panel::as_image)
    }

    /// Number of panels.
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Whether the figure has no panels.
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Grid rows.
    pub const fn nrows(&self) -> usize {
        self.nrows
    }

    /// Grid columns.
    pub const fn ncols(&self) -> usize {
        self.ncols
    }

    /// `(row, col)` of panel `index`.
    pub const fn cell(&self, index: usize) -> (usize, usize) {
        (index / self.ncols, index % self.ncols)
    }

    /// Size in inches.
    pub const fn figsize(&self) -> (f64, f64) {
        self.figsize
    }

    /// Render resolution.
    pub const fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Size in pixels at the figure dpi.
    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |inches: f64| ((inches * self.dpi as f64).round() as u32).max(1);
        (px(self.figsize.0), px(self.figsize.1))
    }

    /// Style snapshot taken when the figure was built.
    pub const fn style(&self) -> &ContextStyle {
        &self.style
    }

    /// Figure title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Figure({}x{} grid, {} panels, {:.1}x{:.1} in @ {} dpi)",
            self.nrows,
            self.ncols,
            self.panels.len(),
            self.figsize.0,
            self.figsize.1,
            self.dpi
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_linear_and_log_norm() {
        let lin = ColorNorm::Linear { vmin: 0.0, vmax: 10.0 };
        assert_approx_eq!(lin.normalize(5.0), 0.5, 1e-12);
        assert_approx_eq!(lin.normalize(20.0), 2.0, 1e-12);
        assert!(lin.normalize(f64::NAN).is_nan());

        let log = ColorNorm::Log { vmin: 1.0, vmax: 100.0 };
        assert_approx_eq!(log.normalize(10.0), 0.5, 1e-12);
        assert!(log.normalize(-1.0).is_nan());

        let flat = ColorNorm::Linear { vmin: 3.0, vmax: 3.0 };
        assert_eq!(flat.normalize(3.0), 0.0);
    }

    #[test]
    fn test_orientation_and_extend() {
        assert_eq!("h".parse::<Orientation>().unwrap(), Orientation::Horizontal);
        assert_eq!("vertical".parse::<Orientation>().unwrap(), Orientation::Vertical);
        assert!("diagonal".parse::<Orientation>().is_err());

        assert_eq!(Extend::from_ends(true, false), Extend::Min);
        assert!(Extend::Both.has_min() && Extend::Both.has_max());
        assert!(!Extend::Neither.has_max());
    }

    #[test]
    fn test_figure_cells_and_pixel_size() {
        let settings = Settings::default();
        let fig = Figure::new(2, 3, (6.0, 4.0), &settings).with_dpi(10);
        assert_eq!(fig.cell(4), (1, 1));
        assert_eq!(fig.pixel_size(), (60, 40));
        assert!(fig.is_empty());
        assert_eq!(fig.style().font_size, 10.0);
    }
}
