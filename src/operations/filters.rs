//! Image filters with `scipy.ndimage` compatible boundary handling.
//!
//! Every filter works on one 2-D plane. Colour images are filtered channel by
//! channel through [`Filter::apply_image`].
//!
//! ```rust
//! use imageplot::{Filter, ParamValue};
//! use ndarray::Array2;
//!
//! # fn example() -> imageplot::ImagePlotResult<()> {
//! let image = Array2::from_shape_fn((16, 16), |(r, c)| (r * c) as f64);
//! let filter = Filter::from_name("gaussian", &[("sigma", ParamValue::from(2.0))])?;
//! let smoothed = filter.apply(&image)?;
//! assert_eq!(smoothed.dim(), image.dim());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2, Axis};

use super::types::{BoundaryMode, FilterKind, ParamValue};
use crate::{ConfigError, ImageData, ImagePlotError, ImagePlotResult};

/// Parameter names understood by [`Filter::from_name`].
pub const FILTER_PARAMS: [&str; 10] = [
    "sigma",
    "size",
    "axis",
    "mode",
    "cval",
    "truncate",
    "percentile",
    "low_sigma",
    "high_sigma",
    "order",
];

const DEFAULT_SIZE: usize = 5;
const DEFAULT_SIGMA: f64 = 1.0;
const DEFAULT_TRUNCATE: f64 = 4.0;
const DEFAULT_AXIS: isize = -1;
const DOG_HIGH_SIGMA_RATIO: f64 = 1.6;

/// A 2-D image filter.
///
/// Built-in filters mirror the `scipy.ndimage` functions of the same name.
/// `Custom` wraps any plain function.
#[derive(Clone, PartialEq)]
pub enum Filter {
    /// Sobel derivative along `axis`, smoothing along the other axis.
    Sobel {
        /// Derivative axis, negative values count from the end.
        axis: isize,
        /// Border handling.
        mode: BoundaryMode,
    },
    /// Prewitt derivative along `axis`.
    Prewitt {
        /// Derivative axis, negative values count from the end.
        axis: isize,
        /// Border handling.
        mode: BoundaryMode,
    },
    /// Sum of second differences along both axes.
    Laplace {
        /// Border handling.
        mode: BoundaryMode,
    },
    /// Gaussian smoothing, or a derivative of a Gaussian when `order > 0`.
    Gaussian {
        /// Standard deviation in pixels.
        sigma: f64,
        /// Derivative order applied along both axes.
        order: usize,
        /// Kernel radius in standard deviations.
        truncate: f64,
        /// Border handling.
        mode: BoundaryMode,
    },
    /// Laplacian of a Gaussian.
    GaussianLaplace {
        /// Standard deviation in pixels.
        sigma: f64,
        /// Kernel radius in standard deviations.
        truncate: f64,
        /// Border handling.
        mode: BoundaryMode,
    },
    /// Gradient magnitude computed with Gaussian derivatives.
    GaussianGradientMagnitude {
        /// Standard deviation in pixels.
        sigma: f64,
        /// Kernel radius in standard deviations.
        truncate: f64,
        /// Border handling.
        mode: BoundaryMode,
    },
    /// Median over a `size` x `size` window.
    Median {
        /// Window side length.
        size: usize,
        /// Border handling.
        mode: BoundaryMode,
    },
    /// Maximum over a `size` x `size` window.
    Maximum {
        /// Window side length.
        size: usize,
        /// Border handling.
        mode: BoundaryMode,
    },
    /// Minimum over a `size` x `size` window.
    Minimum {
        /// Window side length.
        size: usize,
        /// Border handling.
        mode: BoundaryMode,
    },
    /// Percentile over a `size` x `size` window.
    Percentile {
        /// Percentile in `[-100, 100]`; negative values count from the top.
        percentile: f64,
        /// Window side length.
        size: usize,
        /// Border handling.
        mode: BoundaryMode,
    },
    /// Mean over a `size` x `size` window.
    Uniform {
        /// Window side length.
        size: usize,
        /// Border handling.
        mode: BoundaryMode,
    },
    /// Gaussian blur with `low_sigma` minus blur with `high_sigma`.
    DiffOfGaussians {
        /// Sigma of the narrow blur.
        low_sigma: f64,
        /// Sigma of the wide blur, `1.6 * low_sigma` when `None`.
        high_sigma: Option<f64>,
        /// Kernel radius in standard deviations.
        truncate: f64,
        /// Border handling.
        mode: BoundaryMode,
    },
    /// A user supplied function.
    Custom {
        /// Name shown in titles and logs.
        name: String,
        /// The filter itself; must preserve the shape.
        func: fn(&Array2<f64>) -> Array2<f64>,
    },
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
            Self::Sobel { axis, mode } | Self::Prewitt { axis, mode } => f
                .debug_struct(self.name())
                .field("axis", axis)
                .field("mode", mode)
                .finish(),
            Self::Laplace { mode } => f.debug_struct("laplace").field("mode", mode).finish(),
            Self::Gaussian {
                sigma,
                order,
                truncate,
                mode,
            } => f
                .debug_struct("gaussian")
                .field("sigma", sigma)
                .field("order", order)
                .field("truncate", truncate)
                .field("mode", mode)
                .finish(),
            Self::GaussianLaplace {
                sigma,
                truncate,
                mode,
            }
            | Self::GaussianGradientMagnitude {
                sigma,
                truncate,
                mode,
            } => f
                .debug_struct(self.name())
                .field("sigma", sigma)
                .field("truncate", truncate)
                .field("mode", mode)
                .finish(),
            Self::Median { size, mode }
            | Self::Maximum { size, mode }
            | Self::Minimum { size, mode }
            | Self::Uniform { size, mode } => f
                .debug_struct(self.name())
                .field("size", size)
                .field("mode", mode)
                .finish(),
            Self::Percentile {
                percentile,
                size,
                mode,
            } => f
                .debug_struct("percentile")
                .field("percentile", percentile)
                .field("size", size)
                .field("mode", mode)
                .finish(),
            Self::DiffOfGaussians {
                low_sigma,
                high_sigma,
                truncate,
                mode,
            } => f
                .debug_struct("diff_of_gaussians")
                .field("low_sigma", low_sigma)
                .field("high_sigma", high_sigma)
                .field("truncate", truncate)
                .field("mode", mode)
                .finish(),
        }
    }
}

impl Filter {
    /// Gaussian smoothing with the default truncation and `reflect` borders.
    pub const fn gaussian(sigma: f64) -> Self {
        Self::Gaussian {
            sigma,
            order: 0,
            truncate: DEFAULT_TRUNCATE,
            mode: BoundaryMode::Reflect,
        }
    }

    /// Median filter with `reflect` borders.
    pub const fn median(size: usize) -> Self {
        Self::Median {
            size,
            mode: BoundaryMode::Reflect,
        }
    }

    /// Sobel derivative along `axis` with `reflect` borders.
    pub const fn sobel(axis: isize) -> Self {
        Self::Sobel {
            axis,
            mode: BoundaryMode::Reflect,
        }
    }

    /// Wraps a plain function as a filter.
    pub fn custom(name: impl Into<String>, func: fn(&Array2<f64>) -> Array2<f64>) -> Self {
        Self::Custom {
            name: name.into(),
            func,
        }
    }

    /// Builds a built-in filter from its registry name and named parameters.
    ///
    /// Missing parameters take their defaults: `sigma = 1`, `size = 5`,
    /// `axis = -1`, `mode = "reflect"` (`"nearest"` for `diff_of_gaussians`),
    /// `cval = 0`, `truncate = 4`, `percentile = 50`, `low_sigma = 1`.
    /// Parameters a filter does not use are ignored; names outside
    /// [`FILTER_PARAMS`] are rejected.
    pub fn from_name(name: &str, params: &[(&str, ParamValue)]) -> ImagePlotResult<Self> {
        let kind: FilterKind = name.parse()?;
        let args = FilterArgs::parse(params)?;

        let mode = args.mode(match kind {
            FilterKind::DiffOfGaussians => "nearest",
            _ => "reflect",
        })?;
        let sigma = args.f64("sigma", DEFAULT_SIGMA)?;
        let truncate = args.f64("truncate", DEFAULT_TRUNCATE)?;
        let size = args.usize("size", DEFAULT_SIZE)?;
        let axis = args.isize("axis", DEFAULT_AXIS)?;

        let filter = match kind {
            FilterKind::Sobel => Self::Sobel { axis, mode },
            FilterKind::Prewitt => Self::Prewitt { axis, mode },
            FilterKind::Laplace => Self::Laplace { mode },
            FilterKind::Gaussian => Self::Gaussian {
                sigma,
                order: args.usize("order", 0)?,
                truncate,
                mode,
            },
            FilterKind::GaussianLaplace => Self::GaussianLaplace {
                sigma,
                truncate,
                mode,
            },
            FilterKind::GaussianGradientMagnitude => Self::GaussianGradientMagnitude {
                sigma,
                truncate,
                mode,
            },
            FilterKind::Median => Self::Median { size, mode },
            FilterKind::Max => Self::Maximum { size, mode },
            FilterKind::Min => Self::Minimum { size, mode },
            FilterKind::Uniform => Self::Uniform { size, mode },
            FilterKind::Percentile => Self::Percentile {
                percentile: args.f64("percentile", 50.0)?,
                size,
                mode,
            },
            FilterKind::DiffOfGaussians => Self::DiffOfGaussians {
                low_sigma: args.f64("low_sigma", DEFAULT_SIGMA)?,
                high_sigma: args.get("high_sigma").map(|v| v.as_f64("high_sigma")).transpose()?,
                truncate,
                mode,
            },
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Registry name, or the user given name of a custom filter.
    pub fn name(&self) -> &str {
        match self {
            Self::Custom { name, .. } => name,
            other => other.kind().map_or("", |k| k.as_str()),
        }
    }

    /// The built-in kind, `None` for custom filters.
    pub const fn kind(&self) -> Option<FilterKind> {
        Some(match self {
            Self::Sobel { .. } => FilterKind::Sobel,
            Self::Prewitt { .. } => FilterKind::Prewitt,
            Self::Laplace { .. } => FilterKind::Laplace,
            Self::Gaussian { .. } => FilterKind::Gaussian,
            Self::GaussianLaplace { .. } => FilterKind::GaussianLaplace,
            Self::GaussianGradientMagnitude { .. } => FilterKind::GaussianGradientMagnitude,
            Self::Median { .. } => FilterKind::Median,
            Self::Maximum { .. } => FilterKind::Max,
            Self::Minimum { .. } => FilterKind::Min,
            Self::Uniform { .. } => FilterKind::Uniform,
            Self::Percentile { .. } => FilterKind::Percentile,
            Self::DiffOfGaussians { .. } => FilterKind::DiffOfGaussians,
            Self::Custom { .. } => return None,
        })
    }

    /// Checks the numeric parameters.
    pub fn validate(&self) -> ImagePlotResult<()> {
        match self {
            Self::Sobel { axis, .. } | Self::Prewitt { axis, .. } => {
                resolve_axis(*axis)?;
            }
            Self::Gaussian {
                sigma, truncate, ..
            }
            | Self::GaussianLaplace {
                sigma, truncate, ..
            }
            | Self::GaussianGradientMagnitude {
                sigma, truncate, ..
            } => {
                check_non_negative("sigma", *sigma)?;
                check_non_negative("truncate", *truncate)?;
            }
            Self::Median { size, .. }
            | Self::Maximum { size, .. }
            | Self::Minimum { size, .. }
            | Self::Uniform { size, .. } => check_size(*size)?,
            Self::Percentile {
                percentile, size, ..
            } => {
                check_size(*size)?;
                if !(-100.0..=100.0).contains(percentile) {
                    return Err(ImagePlotError::invalid_parameter(
                        "percentile",
                        format!("must lie in [-100, 100], got {percentile}"),
                    ));
                }
            }
            Self::DiffOfGaussians {
                low_sigma,
                high_sigma,
                truncate,
                ..
            } => {
                check_non_negative("low_sigma", *low_sigma)?;
                check_non_negative("truncate", *truncate)?;
                if let Some(high) = high_sigma {
                    check_non_negative("high_sigma", *high)?;
                    if high < low_sigma {
                        return Err(ImagePlotError::invalid_parameter(
                            "high_sigma",
                            format!("must be >= low_sigma ({low_sigma}), got {high}"),
                        ));
                    }
                }
            }
            Self::Laplace { .. } | Self::Custom { .. } => {}
        }
        Ok(())
    }

    /// Filters a single 2-D plane.
    pub fn apply(&self, data: &Array2<f64>) -> ImagePlotResult<Array2<f64>> {
        self.validate()?;
        let out = match self {
            Self::Sobel { axis, mode } => {
                derivative(data, resolve_axis(*axis)?, &[1.0, 2.0, 1.0], *mode)
            }
            Self::Prewitt { axis, mode } => {
                derivative(data, resolve_axis(*axis)?, &[1.0, 1.0, 1.0], *mode)
            }
            Self::Laplace { mode } => {
                let second = [1.0, -2.0, 1.0];
                correlate1d(data, Axis(0), &second, *mode)
                    + correlate1d(data, Axis(1), &second, *mode)
            }
            Self::Gaussian {
                sigma,
                order,
                truncate,
                mode,
            } => gaussian_filter(data, *sigma, [*order, *order], *truncate, *mode),
            Self::GaussianLaplace {
                sigma,
                truncate,
                mode,
            } => {
                gaussian_filter(data, *sigma, [2, 0], *truncate, *mode)
                    + gaussian_filter(data, *sigma, [0, 2], *truncate, *mode)
            }
            Self::GaussianGradientMagnitude {
                sigma,
                truncate,
                mode,
            } => {
                let d0 = gaussian_filter(data, *sigma, [1, 0], *truncate, *mode);
                let d1 = gaussian_filter(data, *sigma, [0, 1], *truncate, *mode);
                ndarray::Zip::from(&d0)
                    .and(&d1)
                    .map_collect(|a, b| (a * a + b * b).sqrt())
            }
            Self::Median { size, mode } => {
                let n = size * size;
                rank_filter(data, *size, n / 2, *mode)
            }
            Self::Maximum { size, mode } => rank_filter(data, *size, size * size - 1, *mode),
            Self::Minimum { size, mode } => rank_filter(data, *size, 0, *mode),
            Self::Percentile {
                percentile,
                size,
                mode,
            } => {
                let n = size * size;
                let p = if *percentile < 0.0 {
                    percentile + 100.0
                } else {
                    *percentile
                };
                let rank = ((n as f64 * p / 100.0) as usize).min(n - 1);
                rank_filter(data, *size, rank, *mode)
            }
            Self::Uniform { size, mode } => {
                let weights = vec![1.0 / *size as f64; *size];
                let rows = correlate1d(data, Axis(0), &weights, *mode);
                correlate1d(&rows, Axis(1), &weights, *mode)
            }
            Self::DiffOfGaussians {
                low_sigma,
                high_sigma,
                truncate,
                mode,
            } => {
                let high = high_sigma.unwrap_or(low_sigma * DOG_HIGH_SIGMA_RATIO);
                gaussian_filter(data, *low_sigma, [0, 0], *truncate, *mode)
                    - gaussian_filter(data, high, [0, 0], *truncate, *mode)
            }
            Self::Custom { name, func } => {
                let out = func(data);
                if out.dim() != data.dim() {
                    return Err(ImagePlotError::shape(format!(
                        "custom filter '{name}' changed the shape from {:?} to {:?}",
                        data.dim(),
                        out.dim()
                    )));
                }
                out
            }
        };
        Ok(out)
    }

    /// Filters every channel of an image.
    pub fn apply_image(&self, image: &ImageData) -> ImagePlotResult<ImageData> {
        tracing::debug!(filter = ?self, shape = ?(image.height(), image.width()), "applying filter");
        image.map_planes(|plane| self.apply(plane))
    }
}

impl FromStr for Filter {
    type Err = ImagePlotError;

    /// Parses a registry name with default parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s, &[])
    }
}

struct FilterArgs<'a> {
    params: &'a [(&'a str, ParamValue)],
}

impl<'a> FilterArgs<'a> {
    fn parse(params: &'a [(&'a str, ParamValue)]) -> ImagePlotResult<Self> {
        if let Some((key, _)) = params.iter().find(|(k, _)| !FILTER_PARAMS.contains(k)) {
            return Err(ConfigError::unknown_option("filter", key, &FILTER_PARAMS).into());
        }
        Ok(Self { params })
    }

    fn get(&self, key: &str) -> Option<&'a ParamValue> {
        // later entries win, so combinations can override base parameters
        self.params.iter().rev().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    fn f64(&self, key: &str, default: f64) -> ImagePlotResult<f64> {
        self.get(key).map_or(Ok(default), |v| v.as_f64(key))
    }

    fn usize(&self, key: &str, default: usize) -> ImagePlotResult<usize> {
        self.get(key).map_or(Ok(default), |v| v.as_usize(key))
    }

    fn isize(&self, key: &str, default: isize) -> ImagePlotResult<isize> {
        self.get(key).map_or(Ok(default), |v| v.as_isize(key))
    }

    fn mode(&self, default: &str) -> ImagePlotResult<BoundaryMode> {
        let cval = self.f64("cval", 0.0)?;
        let name = match self.get("mode") {
            Some(v) => v.as_str("mode")?,
            None => default,
        };
        BoundaryMode::parse(name, cval)
    }
}

fn resolve_axis(axis: isize) -> ImagePlotResult<Axis> {
    match axis {
        0 | -2 => Ok(Axis(0)),
        1 | -1 => Ok(Axis(1)),
        _ => Err(ImagePlotError::IndexOutOfBounds {
            index: axis,
            len: 2,
            what: "filter axes".to_string(),
        }),
    }
}

fn check_non_negative(param: &str, value: f64) -> ImagePlotResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ImagePlotError::invalid_parameter(
            param,
            format!("must be a non-negative number, got {value}"),
        ))
    }
}

fn check_size(size: usize) -> ImagePlotResult<()> {
    if size == 0 {
        return Err(ImagePlotError::invalid_parameter(
            "size",
            "must be a positive integer",
        ));
    }
    Ok(())
}

/// Maps an index that may lie outside `[0, n)` back into the image.
///
/// Returns `None` for `Constant` borders outside the image.
fn boundary_index(i: isize, n: usize, mode: BoundaryMode) -> Option<usize> {
    let n_i = n as isize;
    if (0..n_i).contains(&i) {
        return Some(i as usize);
    }
    let idx = match mode {
        BoundaryMode::Constant(_) => return None,
        BoundaryMode::Nearest => i.clamp(0, n_i - 1),
        BoundaryMode::Wrap => i.rem_euclid(n_i),
        BoundaryMode::Reflect => {
            let m = i.rem_euclid(2 * n_i);
            if m < n_i { m } else { 2 * n_i - 1 - m }
        }
        BoundaryMode::Mirror => {
            if n == 1 {
                0
            } else {
                let period = 2 * n_i - 2;
                let m = i.rem_euclid(period);
                if m < n_i { m } else { period - m }
            }
        }
    };
    Some(idx as usize)
}

fn cval(mode: BoundaryMode) -> f64 {
    match mode {
        BoundaryMode::Constant(v) => v,
        _ => 0.0,
    }
}

/// One dimensional correlation along `axis`.
///
/// The kernel centre is `weights.len() / 2`, as in `scipy.ndimage.correlate1d`.
pub fn correlate1d(
    data: &Array2<f64>,
    axis: Axis,
    weights: &[f64],
    mode: BoundaryMode,
) -> Array2<f64> {
    let mut out = Array2::zeros(data.dim());
    let center = (weights.len() / 2) as isize;
    let fill = cval(mode);

    for (src, mut dst) in data.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        let n = src.len();
        for (i, o) in dst.iter_mut().enumerate() {
            *o = weights
                .iter()
                .enumerate()
                .map(|(j, w)| {
                    let idx = i as isize + j as isize - center;
                    let v = boundary_index(idx, n, mode).map_or(fill, |k| src[k]);
                    w * v
                })
                .sum();
        }
    }
    out
}

fn derivative(data: &Array2<f64>, axis: Axis, smooth: &[f64], mode: BoundaryMode) -> Array2<f64> {
    let other = Axis(1 - axis.index());
    let diff = correlate1d(data, axis, &[-1.0, 0.0, 1.0], mode);
    correlate1d(&diff, other, smooth, mode)
}

/// Discrete Gaussian kernel of the given derivative `order`.
///
/// The kernel has `2 * radius + 1` taps and is returned in convolution order.
pub fn gaussian_kernel1d(sigma: f64, order: usize, radius: usize) -> Array1<f64> {
    let sigma2 = sigma * sigma;
    let r = radius as isize;
    let x: Vec<f64> = (-r..=r).map(|v| v as f64).collect();
    let phi: Vec<f64> = x.iter().map(|v| (-0.5 / sigma2 * v * v).exp()).collect();
    let total: f64 = phi.iter().sum();
    let phi: Vec<f64> = phi.iter().map(|p| p / total).collect();

    if order == 0 {
        return Array1::from(phi);
    }

    // q holds polynomial coefficients; each pass differentiates q(x) * phi(x)
    let mut q = vec![0.0; order + 1];
    q[0] = 1.0;
    for _ in 0..order {
        let prev = q.clone();
        for (i, qi) in q.iter_mut().enumerate() {
            let from_d = if i < order { (i + 1) as f64 * prev[i + 1] } else { 0.0 };
            let from_p = if i > 0 { -prev[i - 1] / sigma2 } else { 0.0 };
            *qi = from_d + from_p;
        }
    }

    x.iter()
        .zip(phi.iter())
        .map(|(&xv, &p)| {
            let poly: f64 = q
                .iter()
                .enumerate()
                .map(|(e, c)| c * xv.powi(e as i32))
                .sum();
            poly * p
        })
        .collect()
}

fn gaussian_filter1d(
    data: &Array2<f64>,
    axis: Axis,
    sigma: f64,
    order: usize,
    truncate: f64,
    mode: BoundaryMode,
) -> Array2<f64> {
    let radius = (truncate * sigma + 0.5) as usize;
    let mut weights = gaussian_kernel1d(sigma, order, radius).to_vec();
    weights.reverse();
    correlate1d(data, axis, &weights, mode)
}

fn gaussian_filter(
    data: &Array2<f64>,
    sigma: f64,
    orders: [usize; 2],
    truncate: f64,
    mode: BoundaryMode,
) -> Array2<f64> {
    if sigma <= 1e-15 {
        return data.clone();
    }
    let rows = gaussian_filter1d(data, Axis(0), sigma, orders[0], truncate, mode);
    gaussian_filter1d(&rows, Axis(1), sigma, orders[1], truncate, mode)
}

fn rank_filter(data: &Array2<f64>, size: usize, rank: usize, mode: BoundaryMode) -> Array2<f64> {
    let (rows, cols) = data.dim();
    let half = (size / 2) as isize;
    let fill = cval(mode);
    let mut window = Vec::with_capacity(size * size);

    Array2::from_shape_fn((rows, cols), |(r, c)| {
        window.clear();
        for dr in 0..size as isize {
            let rr = boundary_index(r as isize + dr - half, rows, mode);
            for dc in 0..size as isize {
                let cc = boundary_index(c as isize + dc - half, cols, mode);
                window.push(match (rr, cc) {
                    (Some(i), Some(j)) => data[[i, j]],
                    _ => fill,
                });
            }
        }
        let (_, value, _) = window.select_nth_unstable_by(rank, f64::total_cmp);
        *value
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use ndarray::array;

    fn assert_array_approx(actual: &Array2<f64>, expected: &Array2<f64>) {
        assert_eq!(actual.dim(), expected.dim());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_approx_eq!(*a, *e, 1e-9);
        }
    }

    #[test]
    fn test_boundary_modes() {
        // reflect: d c b a | a b c d | d c b a
        assert_eq!(boundary_index(-1, 4, BoundaryMode::Reflect), Some(0));
        assert_eq!(boundary_index(-2, 4, BoundaryMode::Reflect), Some(1));
        assert_eq!(boundary_index(4, 4, BoundaryMode::Reflect), Some(3));
        // mirror: c b | a b c d | c b
        assert_eq!(boundary_index(-1, 4, BoundaryMode::Mirror), Some(1));
        assert_eq!(boundary_index(4, 4, BoundaryMode::Mirror), Some(2));
        assert_eq!(boundary_index(-3, 1, BoundaryMode::Mirror), Some(0));
        assert_eq!(boundary_index(-5, 4, BoundaryMode::Nearest), Some(0));
        assert_eq!(boundary_index(5, 4, BoundaryMode::Wrap), Some(1));
        assert_eq!(boundary_index(-1, 4, BoundaryMode::Wrap), Some(3));
        assert_eq!(boundary_index(-1, 4, BoundaryMode::Constant(1.0)), None);
    }

    #[test]
    fn test_sobel_matches_ndimage() {
        let data = array![[0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0]];
        let out = Filter::sobel(-1).apply(&data).unwrap();
        // ndimage.sobel(a, axis=-1) with reflect borders
        let expected = array![[0.0, 4.0, 4.0], [0.0, 4.0, 4.0], [0.0, 4.0, 4.0]];
        assert_array_approx(&out, &expected);

        let out0 = Filter::sobel(0).apply(&data).unwrap();
        assert!(out0.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_gaussian_kernel_sums_to_one() {
        let kernel = gaussian_kernel1d(1.0, 0, 4);
        assert_eq!(kernel.len(), 9);
        assert_approx_eq!(kernel.sum(), 1.0, 1e-12);
        assert_approx_eq!(kernel[0], kernel[8], 1e-15);

        // first derivative is odd and negative on the right of centre
        let d1 = gaussian_kernel1d(1.0, 1, 4);
        assert_approx_eq!(d1[4], 0.0, 1e-15);
        assert!(d1[5] < 0.0);
        assert_approx_eq!(d1[3], -d1[5], 1e-15);
    }

    #[test]
    fn test_gaussian_preserves_constant_and_mean() {
        let flat = Array2::from_elem((6, 7), 3.0);
        let out = Filter::gaussian(1.5).apply(&flat).unwrap();
        for v in out.iter() {
            assert_approx_eq!(*v, 3.0, 1e-9);
        }

        let mut impulse = Array2::zeros((21, 21));
        impulse[[10, 10]] = 1.0;
        let out = Filter::gaussian(1.0).apply(&impulse).unwrap();
        assert_approx_eq!(out.sum(), 1.0, 1e-9);
        assert!(out[[10, 10]] > out[[10, 11]]);
        assert_approx_eq!(out[[10, 11]], out[[11, 10]], 1e-12);

        let same = Filter::gaussian(0.0).apply(&impulse).unwrap();
        assert_eq!(same, impulse);
    }

    #[test]
    fn test_rank_filters() {
        let data = array![
            [1.0, 2.0, 3.0],
            [4.0, 100.0, 6.0],
            [7.0, 8.0, 9.0]
        ];
        let median = Filter::median(3).apply(&data).unwrap();
        assert_eq!(median[[1, 1]], 6.0);

        let max = Filter::Maximum {
            size: 3,
            mode: BoundaryMode::Constant(0.0),
        }
        .apply(&data)
        .unwrap();
        assert_eq!(max[[0, 0]], 100.0);

        let min = Filter::Minimum {
            size: 3,
            mode: BoundaryMode::Constant(0.0),
        }
        .apply(&data)
        .unwrap();
        assert_eq!(min[[1, 1]], 1.0);
        assert_eq!(min[[0, 0]], 0.0);

        let p100 = Filter::Percentile {
            percentile: 100.0,
            size: 3,
            mode: BoundaryMode::Reflect,
        }
        .apply(&data)
        .unwrap();
        assert_eq!(p100[[1, 1]], 100.0);
    }

    #[test]
    fn test_uniform_and_laplace() {
        let data = array![[0.0, 0.0, 0.0], [0.0, 9.0, 0.0], [0.0, 0.0, 0.0]];
        let mean = Filter::Uniform {
            size: 3,
            mode: BoundaryMode::Constant(0.0),
        }
        .apply(&data)
        .unwrap();
        assert_array_approx(&mean, &Array2::from_elem((3, 3), 1.0));

        let lap = Filter::Laplace {
            mode: BoundaryMode::Constant(0.0),
        }
        .apply(&data)
        .unwrap();
        assert_approx_eq!(lap[[1, 1]], -36.0, 1e-12);
        assert_approx_eq!(lap[[0, 1]], 9.0, 1e-12);
        assert_approx_eq!(lap[[0, 0]], 0.0, 1e-12);
    }

    #[test]
    fn test_from_name_defaults_and_errors() {
        let dog = Filter::from_name("diff_of_gaussians", &[]).unwrap();
        assert!(matches!(
            dog,
            Filter::DiffOfGaussians {
                low_sigma,
                high_sigma: None,
                mode: BoundaryMode::Nearest,
                ..
            } if low_sigma == 1.0
        ));

        let median = Filter::from_name("median", &[("size", 3.into())]).unwrap();
        assert_eq!(median, Filter::median(3));

        let constant = Filter::from_name(
            "max",
            &[("mode", "constant".into()), ("cval", 2.5.into())],
        )
        .unwrap();
        assert!(matches!(
            constant,
            Filter::Maximum {
                size: 5,
                mode: BoundaryMode::Constant(c)
            } if c == 2.5
        ));

        assert!(matches!(
            Filter::from_name("does_not_exist", &[]),
            Err(ImagePlotError::UnsupportedFilter { .. })
        ));
        assert!(matches!(
            Filter::from_name("gaussian", &[("sigma", (-1.0).into())]),
            Err(ImagePlotError::InvalidParameter { .. })
        ));
        assert!(matches!(
            Filter::from_name("gaussian", &[("colour", 1.into())]),
            Err(ImagePlotError::Config(ConfigError::UnknownOption { .. }))
        ));
        assert!(matches!(
            Filter::from_name("sobel", &[("axis", 2.into())]),
            Err(ImagePlotError::IndexOutOfBounds { .. })
        ));
        assert!(Filter::from_name("median", &[("size", 0.into())]).is_err());
    }

    #[test]
    fn test_later_params_override_earlier() {
        let filter =
            Filter::from_name("gaussian", &[("sigma", 1.0.into()), ("sigma", 3.0.into())]).unwrap();
        assert!(matches!(filter, Filter::Gaussian { sigma, .. } if sigma == 3.0));
    }

    #[test]
    fn test_gradient_magnitude_is_non_negative_and_dog_is_zero_mean_on_flat() {
        let ramp = Array2::from_shape_fn((9, 9), |(_, c)| c as f64);
        let grad = Filter::from_name("gaussian_gradient_magnitude", &[])
            .unwrap()
            .apply(&ramp)
            .unwrap();
        assert!(grad.iter().all(|v| *v >= 0.0));
        // truncating the kernel at 4 sigma loses a little of its variance
        assert!((grad[[4, 4]] - 1.0).abs() < 1e-3);

        let flat = Array2::from_elem((8, 8), 5.0);
        let dog = Filter::from_name("diff_of_gaussians", &[]).unwrap().apply(&flat).unwrap();
        assert!(dog.iter().all(|v| v.abs() < 1e-9));

        let log = Filter::from_name("gaussian_laplace", &[]).unwrap().apply(&ramp).unwrap();
        assert!(log[[4, 4]].abs() < 1e-2);
    }

    #[test]
    fn test_custom_filter_and_rgb_planes() {
        fn negate(a: &Array2<f64>) -> Array2<f64> {
            a.mapv(|v| -v)
        }
        let filter = Filter::custom("negate", negate);
        assert_eq!(filter.name(), "negate");
        assert!(filter.kind().is_none());

        let rgb = ImageData::rgb(&ndarray::Array3::from_elem((2, 2, 3), 1.0)).unwrap();
        let out = filter.apply_image(&rgb).unwrap();
        assert!(out.values().all(|v| v == -1.0));
    }
}
