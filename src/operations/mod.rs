//! Numeric operations behind the plots.
//!
//! ## Module Organization
//!
//! - [`types`] - Filter names, boundary modes, parameter values and FFT options
//! - [`filters`] - 2-D image filters with scipy-style boundary handling
//! - [`statistics`] - Percentiles, summaries, histograms and tick selection
//! - [`transforms`] - 2-D FFT and magnitude spectra
//! - [`plotting`] - Figures, panels and their rendering
//!
//! ## Quick Start
//!
//! ```rust
//! use imageplot::operations::*;
//! use imageplot::ImageData;
//! use ndarray::Array2;
//!
//! # fn example() -> imageplot::ImagePlotResult<()> {
//! let data = ImageData::gray(&Array2::from_shape_fn((32, 32), |(r, c)| (r * c) as f64))?;
//!
//! let smoothed = Filter::gaussian(2.0).apply_image(&data)?;
//! let summary = describe(&smoothed.finite_values());
//! assert!(summary.is_some());
//!
//! let spectrum = magnitude_spectrum(smoothed.require_gray("fft")?, &FftOptions::default());
//! assert_eq!(spectrum.dim(), (32, 32));
//! # Ok(())
//! # }
//! ```

pub mod filters;
pub mod plotting;
pub mod statistics;
pub mod transforms;
pub mod types;

pub use filters::Filter;
pub use statistics::{Histogram, ImageSummary, describe, nan_min_max, nan_percentile};
pub use transforms::{fft2, fftshift, magnitude_spectrum};
pub use types::{BoundaryMode, FftOptions, FilterKind, ParamValue, WindowType};
