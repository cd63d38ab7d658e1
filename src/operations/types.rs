//! Supporting types and enums for image operations.
//!
//! This module contains the configuration types shared by the filters, the
//! FFT routines and the grid composers.

use std::fmt;
use std::str::FromStr;

use crate::{ImagePlotError, ImagePlotResult};

/// How a filter extends the image past its borders.
///
/// The names and semantics follow `scipy.ndimage`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BoundaryMode {
    /// `d c b a | a b c d | d c b a`, the edge value is repeated.
    #[default]
    Reflect,
    /// `c b | a b c d | c b`, reflection about the edge pixel centre.
    Mirror,
    /// `a a a | a b c d | d d d`.
    Nearest,
    /// `b c d | a b c d | a b c`.
    Wrap,
    /// Pixels outside the image take the given value.
    Constant(f64),
}

impl BoundaryMode {
    /// Mode names accepted by [`BoundaryMode::parse`].
    pub const NAMES: [&'static str; 5] = ["reflect", "mirror", "nearest", "wrap", "constant"];

    /// Parses a mode name; `cval` is used by `constant` only.
    pub fn parse(name: &str, cval: f64) -> ImagePlotResult<Self> {
        match name {
            "reflect" => Ok(Self::Reflect),
            "mirror" => Ok(Self::Mirror),
            "nearest" => Ok(Self::Nearest),
            "wrap" => Ok(Self::Wrap),
            "constant" => Ok(Self::Constant(cval)),
            other => Err(ImagePlotError::invalid_parameter(
                "mode",
                format!(
                    "unknown boundary mode '{other}', expected one of {}",
                    Self::NAMES.join(", ")
                ),
            )),
        }
    }

    /// Short name of the mode.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reflect => "reflect",
            Self::Mirror => "mirror",
            Self::Nearest => "nearest",
            Self::Wrap => "wrap",
            Self::Constant(_) => "constant",
        }
    }
}

impl fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of the built-in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Sobel derivative along one axis.
    Sobel,
    /// Gaussian smoothing.
    Gaussian,
    /// Median over a square window.
    Median,
    /// Maximum over a square window.
    Max,
    /// Minimum over a square window.
    Min,
    /// Mean over a square window.
    Uniform,
    /// Arbitrary percentile over a square window.
    Percentile,
    /// Discrete Laplacian.
    Laplace,
    /// Laplacian of a Gaussian.
    GaussianLaplace,
    /// Gradient magnitude of a Gaussian.
    GaussianGradientMagnitude,
    /// Prewitt derivative along one axis.
    Prewitt,
    /// Band-pass by subtracting two Gaussian blurs.
    DiffOfGaussians,
}

impl FilterKind {
    /// Every built-in filter, in registry order.
    pub const ALL: [Self; 12] = [
        Self::Sobel,
        Self::Gaussian,
        Self::Median,
        Self::Max,
        Self::Min,
        Self::Uniform,
        Self::Percentile,
        Self::Laplace,
        Self::GaussianLaplace,
        Self::GaussianGradientMagnitude,
        Self::Prewitt,
        Self::DiffOfGaussians,
    ];

    /// Registry name of the filter.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sobel => "sobel",
            Self::Gaussian => "gaussian",
            Self::Median => "median",
            Self::Max => "max",
            Self::Min => "min",
            Self::Uniform => "uniform",
            Self::Percentile => "percentile",
            Self::Laplace => "laplace",
            Self::GaussianLaplace => "gaussian_laplace",
            Self::GaussianGradientMagnitude => "gaussian_gradient_magnitude",
            Self::Prewitt => "prewitt",
            Self::DiffOfGaussians => "diff_of_gaussians",
        }
    }

    /// Comma separated list of all filter names.
    pub fn supported() -> String {
        Self::ALL
            .iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = ImagePlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ImagePlotError::UnsupportedFilter {
                name: s.to_string(),
                supported: Self::supported(),
            })
    }
}

/// A loosely typed filter parameter, as passed by name.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Integer value (`size`, `axis`).
    Int(i64),
    /// Floating point value (`sigma`, `cval`, ...).
    Float(f64),
    /// String value (`mode`).
    Str(String),
    /// Boolean flag.
    Bool(bool),
}

impl ParamValue {
    /// Numeric value as `f64`.
    pub fn as_f64(&self, param: &str) -> ImagePlotResult<f64> {
        match self {
            Self::Int(v) => Ok(*v as f64),
            Self::Float(v) => Ok(*v),
            other => Err(type_error(param, "a number", other)),
        }
    }

    /// Non-negative integer value; integral floats are accepted.
    pub fn as_usize(&self, param: &str) -> ImagePlotResult<usize> {
        match self {
            Self::Int(v) if *v >= 0 => Ok(*v as usize),
            Self::Float(v) if *v >= 0.0 && v.fract() == 0.0 => Ok(*v as usize),
            other => Err(type_error(param, "a non-negative integer", other)),
        }
    }

    /// Signed integer value.
    pub fn as_isize(&self, param: &str) -> ImagePlotResult<isize> {
        match self {
            Self::Int(v) => Ok(*v as isize),
            Self::Float(v) if v.fract() == 0.0 => Ok(*v as isize),
            other => Err(type_error(param, "an integer", other)),
        }
    }

    /// String value.
    pub fn as_str(&self, param: &str) -> ImagePlotResult<&str> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(type_error(param, "a string", other)),
        }
    }
}

fn type_error(param: &str, expected: &str, got: &ParamValue) -> ImagePlotError {
    ImagePlotError::invalid_parameter(param, format!("expected {expected}, got {got}"))
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Window applied to an image before its Fourier transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    /// Separable 2-D Hann window, reduces edge leakage.
    #[default]
    Hann,
    /// No windowing.
    Rectangular,
}

impl FromStr for WindowType {
    type Err = ImagePlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hann" => Ok(Self::Hann),
            "none" | "rectangular" | "boxcar" => Ok(Self::Rectangular),
            other => Err(ImagePlotError::invalid_parameter(
                "window_type",
                format!("unknown window '{other}', expected 'hann' or 'none'"),
            )),
        }
    }
}

/// Options for the magnitude spectrum shown by [`crate::fftplot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FftOptions {
    /// Window applied before the transform.
    pub window: WindowType,
    /// Move the zero frequency to the centre.
    pub shift: bool,
    /// Show the natural log of the magnitude.
    pub log: bool,
}

impl Default for FftOptions {
    fn default() -> Self {
        Self {
            window: WindowType::Hann,
            shift: true,
            log: true,
        }
    }
}

impl FftOptions {
    /// Sets the window.
    pub const fn with_window(mut self, window: WindowType) -> Self {
        self.window = window;
        self
    }

    /// Enables or disables the centring shift.
    pub const fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    /// Enables or disables the log scale.
    pub const fn with_log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_mode_default_and_parse() {
        assert_eq!(BoundaryMode::default(), BoundaryMode::Reflect);
        assert_eq!(BoundaryMode::parse("constant", 2.5).unwrap(), BoundaryMode::Constant(2.5));
        assert!(BoundaryMode::parse("edge", 0.0).is_err());
    }

    #[test]
    fn test_filter_kind_round_trip_and_error_message() {
        for kind in FilterKind::ALL {
            assert_eq!(kind.as_str().parse::<FilterKind>().unwrap(), kind);
        }
        let err = "does_not_exist".parse::<FilterKind>().unwrap_err();
        match err {
            ImagePlotError::UnsupportedFilter { name, supported } => {
                assert_eq!(name, "does_not_exist");
                assert!(supported.starts_with("sobel, gaussian"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_param_value_conversions() {
        assert_eq!(ParamValue::from(3).as_usize("size").unwrap(), 3);
        assert_eq!(ParamValue::from(3.0).as_usize("size").unwrap(), 3);
        assert!(ParamValue::from(-1).as_usize("size").is_err());
        assert_eq!(ParamValue::from(-1).as_isize("axis").unwrap(), -1);
        assert_eq!(ParamValue::from(2).as_f64("sigma").unwrap(), 2.0);
        assert!(ParamValue::from("reflect").as_f64("sigma").is_err());
        assert_eq!(ParamValue::from(2).to_string(), "2");
        assert_eq!(ParamValue::from(0.5).to_string(), "0.5");
    }

    #[test]
    fn test_boundary_mode_parse() {
        assert_eq!(BoundaryMode::parse("constant", 2.0).unwrap(), BoundaryMode::Constant(2.0));
        assert_eq!(BoundaryMode::parse("wrap", 0.0).unwrap(), BoundaryMode::Wrap);
        assert!(BoundaryMode::parse("edge", 0.0).is_err());
        assert_eq!(BoundaryMode::default().as_str(), "reflect");
    }
}
