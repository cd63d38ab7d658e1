//! Figures made of image, histogram and colorbar panels.
//!
//! Plot functions resolve their options against the [`Settings`](crate::Settings)
//! registry, compute everything numeric up front and return a [`Figure`]:
//! a plain description of panels on a grid. Nothing touches a backend until
//! the figure is saved or drawn.
//!
//! ```rust
//! use imageplot::{ImageData, ImageOptions, Settings, imgplot};
//! use ndarray::Array2;
//!
//! # fn example() -> imageplot::ImagePlotResult<()> {
//! let data = ImageData::gray(&Array2::from_shape_fn((64, 64), |(r, c)| (r + c) as f64))?;
//! let opts = ImageOptions::new()
//!     .with_cmap("magma")
//!     .with_scalebar(15.0, "nm")
//!     .with_robust(true);
//! let fig = imgplot(&data, &opts, &Settings::default())?;
//! fig.save("polymer.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **resolve**: per-call options merged with the settings registry
//! - **builders**: single figures (`imgplot`, `imghist`, `filterplot`, `fftplot`, `rgbplot`)
//! - **composer**: grids of panels (`ImageGrid`, `ParamGrid`)
//! - **elements**: scalebar overlay
//! - **core**: figure and panel types
//! - **render**: plotters backends

pub mod builders;
pub mod composer;
pub mod core;
pub mod elements;
pub mod render;
pub mod resolve;

pub use builders::*;
pub use composer::*;
pub use core::*;
pub use elements::*;
pub use resolve::*;
