// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)]
// Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::large_stack_arrays)] // Helps avoid stack overflows
#![warn(clippy::box_collection)] // Warns on boxed `Vec`, `String`, etc.
#![warn(clippy::vec_box)] // Avoids using `Vec<Box<T>>` when unnecessary
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::identity_op)] // e.g., `x + 0`, `x * 1`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::let_unit_value)] // Avoids binding `()` to variables
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_safety_doc)] // Docs for `unsafe` functions
#![warn(clippy::missing_const_for_fn)] // Suggests making eligible functions `const`
#![allow(clippy::too_many_arguments)]
#![deny(missing_docs)] // Documentation is a must for release

//! # imageplot
//!
//! Image plots for scientific data with sensible defaults: colormaps,
//! colorbars, physical scalebars, robust colour limits, histograms, filters,
//! FFT panels and small multiples.
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! imageplot = "0.1.0"
//! ```
//!
//! ## Features
//!
//! - `download` (default): fetch sample datasets over HTTPS with `reqwest`
//! - `parallel-processing`: compute grid panels on the `rayon` thread pool
//!
//! ## Error Handling
//!
//! Every fallible call returns [`ImagePlotResult`]. Option and settings
//! problems are grouped under [`ConfigError`]:
//!
//! ```rust
//! use imageplot::{ConfigError, ImageData, ImageOptions, ImagePlotError, Settings, imgplot};
//! use ndarray::Array2;
//!
//! let data = ImageData::gray(&Array2::<f64>::zeros((8, 8))).unwrap();
//! let opts = ImageOptions::new().with_cmap("not-a-colormap");
//!
//! match imgplot(&data, &opts, &Settings::default()) {
//!     Ok(_) => {}
//!     Err(ImagePlotError::Config(ConfigError::UnknownColormap { name })) => {
//!         eprintln!("no colormap called {name}")
//!     }
//!     Err(other) => eprintln!("plot failed: {other}"),
//! }
//! ```
//!
//! ## Quick Start
//!
//! ### A single image
//!
//! ```rust
//! use imageplot::{ImageData, ImageOptions, Settings, imgplot};
//! use ndarray::Array2;
//!
//! # fn example() -> imageplot::ImagePlotResult<()> {
//! let mut settings = Settings::default();
//! settings.set_context("notebook", None)?;
//!
//! let data = ImageData::gray(&Array2::from_shape_fn((128, 128), |(r, c)| {
//!     ((r as f64) / 10.0).sin() * ((c as f64) / 10.0).cos()
//! }))?;
//! let fig = imgplot(
//!     &data,
//!     &ImageOptions::new().with_scalebar(15.0, "nm").with_cbar_label("height (nm)"),
//!     &settings,
//! )?;
//! fig.save("image.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Filters
//!
//! ```rust
//! use imageplot::{Filter, ImageData, ImageOptions, Settings, filterplot};
//! use ndarray::Array2;
//!
//! # fn example() -> imageplot::ImagePlotResult<()> {
//! let data = ImageData::gray(&Array2::from_shape_fn((64, 64), |(r, c)| (r * c) as f64))?;
//! let filter: Filter = "sobel".parse()?;
//! let (fig, filtered) = filterplot(&data, &filter, &ImageOptions::new(), true, &Settings::default())?;
//! assert_eq!(fig.len(), 4);
//! assert_eq!(filtered.height(), 64);
//! # Ok(())
//! # }
//! ```
//!
//! ### Small multiples
//!
//! ```rust
//! use imageplot::{ImageData, ParamGrid, Settings};
//! use ndarray::Array2;
//!
//! # fn example() -> imageplot::ImagePlotResult<()> {
//! let data = ImageData::gray(&Array2::from_shape_fn((64, 64), |(r, c)| (r ^ c) as f64))?;
//! let fig = ParamGrid::new(data, "median")?
//!     .col("size", [3, 5, 9])
//!     .build(&Settings::default())?;
//! fig.save("median.svg")?;
//! # Ok(())
//! # }
//! ```

mod colormap;
mod error;
mod image;

pub mod datasets;
pub mod operations;
pub mod settings;

pub use crate::colormap::{Colormap, DEFAULT_COLORMAP};
pub use crate::datasets::{DataLoader, Dataset, load_image};
pub use crate::error::{ConfigError, ImagePlotError, ImagePlotResult};
pub use crate::image::{CHANNEL_SIZES, ImageData, ImageStack};
pub use crate::operations::filters::Filter;
pub use crate::operations::plotting::{
    Figure, GridInput, ImageGrid, ImageOptions, PanelParam, ParamGrid, fftplot, filterplot,
    imghist, imgplot, rgbplot,
};
pub use crate::operations::types::{BoundaryMode, FftOptions, ParamValue, WindowType};
pub use crate::settings::Settings;
