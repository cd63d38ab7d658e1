//! Image buffers accepted by the plotting functions.
//!
//! [`ImageData`] is a single displayable image: either a 2-D gray image or a
//! 3-D RGB(A) image with the channel on the last axis. [`ImageStack`] is the
//! N-D input accepted by [`crate::ImageGrid`], a stack of images that gets
//! sliced into panels.
//!
//! Both types convert from any `ndarray` whose element type implements
//! [`num_traits::ToPrimitive`] and validate shape and values up front.

use ndarray::{Array2, Array3, ArrayBase, ArrayD, ArrayView2, Axis, Data, Dimension, Ix2, Ix3};
use num_traits::ToPrimitive;

use crate::{ImagePlotError, ImagePlotResult};

/// Allowed sizes of a trailing channel axis.
pub const CHANNEL_SIZES: [usize; 2] = [3, 4];

/// A single image ready to be plotted.
///
/// Values are stored as `f64`. NaN marks a missing pixel and is ignored by
/// statistics and drawn as background; infinities are rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    /// Single channel image, shape `(rows, cols)`.
    Gray(Array2<f64>),
    /// Colour image, shape `(rows, cols, 3 | 4)`.
    Rgb(Array3<f64>),
}

impl ImageData {
    /// Builds a gray image from any numeric 2-D array.
    pub fn gray<T, S>(arr: &ArrayBase<S, Ix2>) -> ImagePlotResult<Self>
    where
        T: ToPrimitive + Copy,
        S: Data<Elem = T>,
    {
        let data = cast_array(arr)?;
        check_values(data.iter().copied(), data.len())?;
        Ok(Self::Gray(data))
    }

    /// Builds an RGB(A) image from any numeric 3-D array.
    ///
    /// The last axis must have 3 or 4 entries.
    pub fn rgb<T, S>(arr: &ArrayBase<S, Ix3>) -> ImagePlotResult<Self>
    where
        T: ToPrimitive + Copy,
        S: Data<Elem = T>,
    {
        let channels = arr.shape()[2];
        if !CHANNEL_SIZES.contains(&channels) {
            return Err(ImagePlotError::shape(format!(
                "RGB image must have 3 or 4 channels on the last axis, got shape {:?}",
                arr.shape()
            )));
        }
        let data = cast_array(arr)?;
        check_values(data.iter().copied(), data.len())?;
        Ok(Self::Rgb(data))
    }

    /// Interprets a dynamically shaped array.
    ///
    /// 2-D arrays become gray images, 3-D arrays with a channel axis of size
    /// 3 or 4 become RGB images. Anything else is a shape error.
    pub fn from_dyn(arr: ArrayD<f64>) -> ImagePlotResult<Self> {
        match arr.ndim() {
            2 => {
                let arr = arr
                    .into_dimensionality::<Ix2>()
                    .map_err(|e| ImagePlotError::shape(e.to_string()))?;
                check_values(arr.iter().copied(), arr.len())?;
                Ok(Self::Gray(arr))
            }
            3 => {
                let arr = arr
                    .into_dimensionality::<Ix3>()
                    .map_err(|e| ImagePlotError::shape(e.to_string()))?;
                Self::rgb(&arr)
            }
            n => Err(ImagePlotError::shape(format!(
                "expected a 2-D gray or 3-D RGB image, got {n}-D data of shape {:?}",
                arr.shape()
            ))),
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        match self {
            Self::Gray(a) => a.nrows(),
            Self::Rgb(a) => a.shape()[0],
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        match self {
            Self::Gray(a) => a.ncols(),
            Self::Rgb(a) => a.shape()[1],
        }
    }

    /// Number of channels (1 for gray images).
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray(_) => 1,
            Self::Rgb(a) => a.shape()[2],
        }
    }

    /// Returns `true` for colour images.
    pub const fn is_rgb(&self) -> bool {
        matches!(self, Self::Rgb(_))
    }

    /// Borrows the gray buffer, if this is a gray image.
    pub const fn as_gray(&self) -> Option<&Array2<f64>> {
        match self {
            Self::Gray(a) => Some(a),
            Self::Rgb(_) => None,
        }
    }

    /// Borrows the gray buffer or fails with a shape error naming `op`.
    pub fn require_gray(&self, op: &str) -> ImagePlotResult<&Array2<f64>> {
        self.as_gray().ok_or_else(|| {
            ImagePlotError::shape(format!(
                "{op} expects a 2-D gray image, got RGB data of shape ({}, {}, {})",
                self.height(),
                self.width(),
                self.channels()
            ))
        })
    }

    /// Returns one channel as a 2-D view. Channel 0 of a gray image is the image itself.
    pub fn channel(&self, index: usize) -> ImagePlotResult<ArrayView2<'_, f64>> {
        if index >= self.channels() {
            return Err(ImagePlotError::IndexOutOfBounds {
                index: index as isize,
                len: self.channels(),
                what: "channels".to_string(),
            });
        }
        Ok(match self {
            Self::Gray(a) => a.view(),
            Self::Rgb(a) => a.index_axis(Axis(2), index),
        })
    }

    /// Applies a 2-D operation to every channel and reassembles the result.
    ///
    /// The operation must preserve the plane shape.
    pub fn map_planes<F>(&self, mut f: F) -> ImagePlotResult<Self>
    where
        F: FnMut(&Array2<f64>) -> ImagePlotResult<Array2<f64>>,
    {
        match self {
            Self::Gray(a) => Ok(Self::Gray(f(a)?)),
            Self::Rgb(a) => {
                let mut out = a.clone();
                for c in 0..a.shape()[2] {
                    let plane = a.index_axis(Axis(2), c).to_owned();
                    let mapped = f(&plane)?;
                    if mapped.dim() != plane.dim() {
                        return Err(ImagePlotError::shape(format!(
                            "channel operation changed the plane shape from {:?} to {:?}",
                            plane.dim(),
                            mapped.dim()
                        )));
                    }
                    out.index_axis_mut(Axis(2), c).assign(&mapped);
                }
                Ok(Self::Rgb(out))
            }
        }
    }

    /// Iterates over every stored value, all channels included.
    pub fn values(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        match self {
            Self::Gray(a) => Box::new(a.iter().copied()),
            Self::Rgb(a) => Box::new(a.iter().copied()),
        }
    }

    /// Finite (non-NaN) values, all channels included.
    pub fn finite_values(&self) -> Vec<f64> {
        self.values().filter(|v| v.is_finite()).collect()
    }
}

impl TryFrom<Array2<f64>> for ImageData {
    type Error = ImagePlotError;

    fn try_from(value: Array2<f64>) -> Result<Self, Self::Error> {
        check_values(value.iter().copied(), value.len())?;
        Ok(Self::Gray(value))
    }
}

impl TryFrom<Array3<f64>> for ImageData {
    type Error = ImagePlotError;

    fn try_from(value: Array3<f64>) -> Result<Self, Self::Error> {
        Self::rgb(&value)
    }
}

/// A stack of images, sliced into panels by [`crate::ImageGrid`].
///
/// Rank 2 is a single image, rank 3 a stack of gray images sliceable along any
/// axis, rank 4 a stack of RGB(A) images with the channel on the last axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageStack {
    data: ArrayD<f64>,
}

impl ImageStack {
    /// Validates and wraps an N-D numeric array.
    pub fn new<T, S, D>(arr: &ArrayBase<S, D>) -> ImagePlotResult<Self>
    where
        T: ToPrimitive + Copy,
        S: Data<Elem = T>,
        D: Dimension,
    {
        let ndim = arr.ndim();
        if !(2..=4).contains(&ndim) {
            return Err(ImagePlotError::shape(format!(
                "image stacks must be 2-D, 3-D or 4-D, got {ndim}-D data of shape {:?}",
                arr.shape()
            )));
        }
        if ndim == 4 && !CHANNEL_SIZES.contains(&arr.shape()[3]) {
            return Err(ImagePlotError::shape(format!(
                "4-D stacks must have 3 or 4 channels on the last axis, got shape {:?}",
                arr.shape()
            )));
        }
        let data = cast_array(&arr.view().into_dyn())?;
        check_values(data.iter().copied(), data.len())?;
        Ok(Self { data })
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Shape of the underlying array.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Borrows the underlying array.
    pub const fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// Normalises a possibly negative axis and checks that it can be sliced.
    ///
    /// The channel axis of a 4-D stack cannot be sliced.
    pub fn slice_axis(&self, axis: isize) -> ImagePlotResult<usize> {
        let ndim = self.ndim();
        let resolved = normalize_index(axis, ndim).ok_or_else(|| {
            ImagePlotError::IndexOutOfBounds {
                index: axis,
                len: ndim,
                what: "axes".to_string(),
            }
        })?;
        if ndim == 4 && resolved == 3 {
            return Err(ImagePlotError::shape(
                "cannot slice a 4-D stack along its channel axis",
            ));
        }
        Ok(resolved)
    }

    /// Extracts slice `index` along `axis` as an image.
    pub fn slice(&self, axis: usize, index: isize) -> ImagePlotResult<ImageData> {
        let len = self.data.len_of(Axis(axis));
        let i = normalize_index(index, len).ok_or_else(|| ImagePlotError::IndexOutOfBounds {
            index,
            len,
            what: format!("axis {axis}"),
        })?;
        ImageData::from_dyn(self.data.index_axis(Axis(axis), i).to_owned())
    }

    /// Interprets the whole stack as one image (rank 2 only).
    pub fn as_single_image(&self) -> Option<ImageData> {
        if self.ndim() != 2 {
            return None;
        }
        ImageData::from_dyn(self.data.clone()).ok()
    }
}

/// Python style index normalisation: negative indices count from the end.
pub(crate) fn normalize_index(index: isize, len: usize) -> Option<usize> {
    let len = len as isize;
    let resolved = if index < 0 { index + len } else { index };
    (0..len).contains(&resolved).then_some(resolved as usize)
}

fn cast_array<T, S, D>(arr: &ArrayBase<S, D>) -> ImagePlotResult<ndarray::Array<f64, D>>
where
    T: ToPrimitive + Copy,
    S: Data<Elem = T>,
    D: Dimension,
{
    let mut failed = false;
    let out = arr.mapv(|v| {
        v.to_f64().unwrap_or_else(|| {
            failed = true;
            f64::NAN
        })
    });
    if failed {
        return Err(ImagePlotError::shape(
            "image contains values that cannot be represented as f64",
        ));
    }
    Ok(out)
}

fn check_values(values: impl Iterator<Item = f64>, len: usize) -> ImagePlotResult<()> {
    if len == 0 {
        return Err(ImagePlotError::shape("image is empty"));
    }
    let mut any_finite = false;
    for v in values {
        if v.is_infinite() {
            return Err(ImagePlotError::shape("image contains infinite values"));
        }
        any_finite |= v.is_finite();
    }
    if !any_finite {
        return Err(ImagePlotError::shape("image contains no finite values"));
    }
    Ok(())
}
