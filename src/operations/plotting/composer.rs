//! Small multiples: grids of image panels.
//!
//! [`ImageGrid`] lays out a list of images, or slices of an N-D stack, one
//! panel per image, optionally passing every image through one or more
//! filters. [`ParamGrid`] applies one filter over a grid of parameter values.
//!
//! ```rust
//! use imageplot::{ImageGrid, ImageStack, Settings};
//! use ndarray::Array3;
//!
//! # fn example() -> imageplot::ImagePlotResult<()> {
//! let stack = ImageStack::new(&Array3::<f64>::from_shape_fn((5, 50, 8), |(a, b, c)| {
//!     (a + b + c) as f64
//! }))?;
//! let fig = ImageGrid::new(stack)
//!     .with_slices(vec![10, 20, 30, 40])
//!     .with_axis(1)
//!     .build(&Settings::default())?;
//! assert_eq!(fig.len(), 4);
//! # Ok(())
//! # }
//! ```

use tracing::{debug, warn};

use super::builders::image_panel;
use super::core::Figure;
use super::resolve::{ImageOptions, ResolvedImageOptions};
use crate::operations::filters::Filter;
use crate::operations::types::{FilterKind, ParamValue};
use crate::settings::Settings;
use crate::{ConfigError, ImageData, ImagePlotError, ImagePlotResult, ImageStack};

const DEFAULT_COL_WRAP: usize = 3;
const DEFAULT_HEIGHT: f64 = 3.0;
const DEFAULT_ASPECT: f64 = 1.0;

/// Images accepted by [`ImageGrid`].
#[derive(Debug, Clone, PartialEq)]
pub enum GridInput {
    /// One N-D array, sliced along an axis.
    Stack(ImageStack),
    /// Independent images; gray and RGB may be mixed.
    List(Vec<ImageData>),
}

impl From<ImageStack> for GridInput {
    fn from(stack: ImageStack) -> Self {
        Self::Stack(stack)
    }
}

impl From<Vec<ImageData>> for GridInput {
    fn from(images: Vec<ImageData>) -> Self {
        Self::List(images)
    }
}

impl From<ImageData> for GridInput {
    fn from(image: ImageData) -> Self {
        Self::List(vec![image])
    }
}

/// A panel option: one value for every panel, or one value per input image.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelParam<T> {
    /// Same value everywhere.
    Shared(T),
    /// One value per input image, in input order.
    PerImage(Vec<T>),
}

impl<T: Clone> PanelParam<T> {
    /// Shorthand for [`PanelParam::Shared`].
    pub const fn shared(value: T) -> Self {
        Self::Shared(value)
    }

    /// Shorthand for [`PanelParam::PerImage`].
    pub const fn per_image(values: Vec<T>) -> Self {
        Self::PerImage(values)
    }

    /// One value per image; fails when a per-image list has the wrong length.
    pub fn expand(&self, param: &str, n: usize) -> Result<Vec<T>, ConfigError> {
        match self {
            Self::Shared(v) => Ok(vec![v.clone(); n]),
            Self::PerImage(values) if values.len() == n => Ok(values.clone()),
            Self::PerImage(values) => Err(ConfigError::PanelCount {
                param: param.to_string(),
                expected: n,
                actual: values.len(),
            }),
        }
    }
}

fn apply_param<T: Clone>(
    out: &mut [ImageOptions],
    param: &Option<PanelParam<T>>,
    name: &str,
    set: impl Fn(&mut ImageOptions, T),
) -> Result<(), ConfigError> {
    if let Some(p) = param {
        let values = p.expand(name, out.len())?;
        for (opts, value) in out.iter_mut().zip(values) {
            set(opts, value);
        }
    }
    Ok(())
}

/// Runs each `(image index, filter)` job; jobs run on the rayon pool when the
/// `parallel-processing` feature is enabled.
fn run_jobs(
    jobs: &[(usize, Option<&Filter>)],
    images: &[ImageData],
) -> ImagePlotResult<Vec<ImageData>> {
    let run = |job| run_job(job, images);

    #[cfg(feature = "parallel-processing")]
    {
        use rayon::prelude::*;
        jobs.par_iter().map(run).collect()
    }
    #[cfg(not(feature = "parallel-processing"))]
    {
        jobs.iter().map(run).collect()
    }
}

fn run_job(job: &(usize, Option<&Filter>), images: &[ImageData]) -> ImagePlotResult<ImageData> {
    let (index, filter) = *job;
    match filter {
        Some(f) => f.apply_image(&images[index]),
        None => Ok(images[index].clone()),
    }
}

fn grid_shape(n: usize, col_wrap: usize) -> (usize, usize) {
    let ncol = col_wrap.min(n).max(1);
    (n.div_ceil(ncol).max(1), ncol)
}

/// A grid of images, one panel per image or stack slice.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGrid {
    input: GridInput,
    slices: Option<Vec<isize>>,
    axis: isize,
    start: Option<isize>,
    stop: Option<isize>,
    step: usize,
    col_wrap: usize,
    height: f64,
    aspect: f64,
    map_func: Vec<Filter>,
    options: ImageOptions,
    cmap: Option<PanelParam<String>>,
    vmin: Option<PanelParam<f64>>,
    vmax: Option<PanelParam<f64>>,
    robust: Option<PanelParam<bool>>,
    perc: Option<PanelParam<(f64, f64)>>,
    dx: Option<PanelParam<f64>>,
    units: Option<PanelParam<String>>,
    cbar_label: Option<PanelParam<String>>,
    title: Option<PanelParam<String>>,
}

impl ImageGrid {
    /// A grid over `input` with default options: every slice along axis 0,
    /// three columns.
    pub fn new(input: impl Into<GridInput>) -> Self {
        Self {
            input: input.into(),
            slices: None,
            axis: 0,
            start: None,
            stop: None,
            step: 1,
            col_wrap: DEFAULT_COL_WRAP,
            height: DEFAULT_HEIGHT,
            aspect: DEFAULT_ASPECT,
            map_func: Vec::new(),
            options: ImageOptions::default(),
            cmap: None,
            vmin: None,
            vmax: None,
            robust: None,
            perc: None,
            dx: None,
            units: None,
            cbar_label: None,
            title: None,
        }
    }

    /// Slice indices along the slicing axis; negative indices count from the end.
    pub fn with_slices(mut self, slices: Vec<isize>) -> Self {
        self.slices = Some(slices);
        self
    }

    /// Slicing axis; negative values count from the last axis.
    pub const fn with_axis(mut self, axis: isize) -> Self {
        self.axis = axis;
        self
    }

    /// Range of slices used when no explicit slices are given.
    pub const fn with_range(mut self, start: Option<isize>, stop: Option<isize>, step: usize) -> Self {
        self.start = start;
        self.stop = stop;
        self.step = step;
        self
    }

    /// Maximum number of columns.
    pub const fn with_col_wrap(mut self, col_wrap: usize) -> Self {
        self.col_wrap = col_wrap;
        self
    }

    /// Height of one panel in inches.
    pub const fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Width to height ratio of one panel.
    pub const fn with_aspect(mut self, aspect: f64) -> Self {
        self.aspect = aspect;
        self
    }

    /// Filters applied to every image; one block of panels per filter.
    pub fn with_map_func(mut self, filters: Vec<Filter>) -> Self {
        self.map_func = filters;
        self
    }

    /// Options shared by all panels.
    pub fn with_options(mut self, options: ImageOptions) -> Self {
        self.options = options;
        self
    }

    /// Colormap, shared or per image.
    pub fn with_cmap(mut self, cmap: PanelParam<String>) -> Self {
        self.cmap = Some(cmap);
        self
    }

    /// Lower colour limit, shared or per image.
    pub fn with_vmin(mut self, vmin: PanelParam<f64>) -> Self {
        self.vmin = Some(vmin);
        self
    }

    /// Upper colour limit, shared or per image.
    pub fn with_vmax(mut self, vmax: PanelParam<f64>) -> Self {
        self.vmax = Some(vmax);
        self
    }

    /// Robust limits, shared or per image.
    pub fn with_robust(mut self, robust: PanelParam<bool>) -> Self {
        self.robust = Some(robust);
        self
    }

    /// Robust percentiles, shared or per image.
    pub fn with_perc(mut self, perc: PanelParam<(f64, f64)>) -> Self {
        self.perc = Some(perc);
        self
    }

    /// Scalebar pixel size and unit, each shared or per image.
    pub fn with_scalebar(mut self, dx: PanelParam<f64>, units: PanelParam<String>) -> Self {
        self.dx = Some(dx);
        self.units = Some(units);
        self
    }

    /// Colorbar label, shared or per image.
    pub fn with_cbar_label(mut self, label: PanelParam<String>) -> Self {
        self.cbar_label = Some(label);
        self
    }

    /// Panel titles, shared or per image.
    pub fn with_title(mut self, title: PanelParam<String>) -> Self {
        self.title = Some(title);
        self
    }

    /// Resolves every option, computes the panels and lays them out.
    pub fn build(&self, settings: &Settings) -> ImagePlotResult<Figure> {
        if self.col_wrap == 0 {
            return Err(ImagePlotError::invalid_parameter(
                "col_wrap",
                "must be a positive integer",
            ));
        }
        let images = self.select_images()?;
        let n_images = images.len();

        let resolved = self
            .per_image_options(n_images)?
            .iter()
            .map(|o| o.resolve(settings))
            .collect::<Result<Vec<ResolvedImageOptions>, ConfigError>>()?;
        for filter in &self.map_func {
            filter.validate()?;
        }

        let jobs: Vec<(usize, Option<&Filter>)> = if self.map_func.is_empty() {
            (0..n_images).map(|i| (i, None)).collect()
        } else {
            self.map_func
                .iter()
                .flat_map(|f| (0..n_images).map(move |i| (i, Some(f))))
                .collect()
        };
        let outputs = run_jobs(&jobs, &images)?;

        let n = outputs.len();
        if self.col_wrap > n {
            warn!(col_wrap = self.col_wrap, panels = n, "col_wrap is larger than the number of panels");
        }
        let (nrows, ncols) = grid_shape(n, self.col_wrap);
        debug!(panels = n, nrows, ncols, "image grid layout");

        let figsize = (
            ncols as f64 * self.height * self.aspect,
            nrows as f64 * self.height,
        );
        let mut fig = Figure::new(nrows, ncols, figsize, settings);
        for ((index, _), image) in jobs.iter().zip(outputs.iter()) {
            fig.push(image_panel(image, &resolved[*index])?);
        }
        Ok(fig)
    }

    fn select_images(&self) -> ImagePlotResult<Vec<ImageData>> {
        match &self.input {
            GridInput::List(items) => {
                if items.is_empty() {
                    return Err(ImagePlotError::shape("ImageGrid needs at least one image"));
                }
                if self.slices.is_some() {
                    warn!("'slices' only applies to stacked input and is ignored for a list of images");
                }
                Ok(items.clone())
            }
            GridInput::Stack(stack) if stack.ndim() == 2 => {
                let image = stack
                    .as_single_image()
                    .ok_or_else(|| ImagePlotError::shape("invalid 2-D image"))?;
                Ok(vec![image])
            }
            GridInput::Stack(stack) => {
                let axis = stack.slice_axis(self.axis)?;
                let len = stack.shape()[axis];
                let indices = match &self.slices {
                    Some(slices) => slices.clone(),
                    None => self.slice_range(len)?,
                };
                if indices.is_empty() {
                    return Err(ImagePlotError::shape(format!(
                        "no slices selected along axis {axis} of length {len}"
                    )));
                }
                indices.iter().map(|&i| stack.slice(axis, i)).collect()
            }
        }
    }

    fn slice_range(&self, len: usize) -> ImagePlotResult<Vec<isize>> {
        if self.step == 0 {
            return Err(ImagePlotError::invalid_parameter(
                "step",
                "must be a positive integer",
            ));
        }
        let len = len as isize;
        let clamp = |v: isize| if v < 0 { (v + len).max(0) } else { v.min(len) };
        let start = self.start.map_or(0, clamp);
        let stop = self.stop.map_or(len, clamp);
        Ok((start..stop).step_by(self.step).collect())
    }

    fn per_image_options(&self, n: usize) -> Result<Vec<ImageOptions>, ConfigError> {
        let mut out = vec![self.options.clone(); n];
        apply_param(&mut out, &self.cmap, "cmap", |o, v| o.cmap = Some(v))?;
        apply_param(&mut out, &self.vmin, "vmin", |o, v| o.vmin = Some(v))?;
        apply_param(&mut out, &self.vmax, "vmax", |o, v| o.vmax = Some(v))?;
        apply_param(&mut out, &self.robust, "robust", |o, v| o.robust = v)?;
        apply_param(&mut out, &self.perc, "perc", |o, v| o.perc = Some(v))?;
        apply_param(&mut out, &self.dx, "dx", |o, v| o.dx = Some(v))?;
        apply_param(&mut out, &self.units, "units", |o, v| o.units = Some(v))?;
        apply_param(&mut out, &self.cbar_label, "cbar_label", |o, v| {
            o.cbar_label = Some(v)
        })?;
        apply_param(&mut out, &self.title, "title", |o, v| o.title = Some(v))?;
        Ok(out)
    }
}

/// One set of filter parameters.
pub type ParamCombination = Vec<(String, ParamValue)>;

/// One filter applied over a grid of parameter values.
///
/// Row values vary slowest, column values fastest; every panel is titled with
/// its parameters, e.g. `"sigma : 2, mode : reflect"`.
///
/// ```rust
/// use imageplot::{ImageData, ParamGrid, Settings};
/// use ndarray::Array2;
///
/// # fn example() -> imageplot::ImagePlotResult<()> {
/// let data = ImageData::gray(&Array2::from_shape_fn((16, 16), |(r, c)| (r * c) as f64))?;
/// let fig = ParamGrid::new(data, "gaussian")?
///     .row("sigma", [1.0, 2.0, 3.0])
///     .col("mode", ["reflect", "nearest"])
///     .build(&Settings::default())?;
/// assert_eq!(fig.len(), 6);
/// assert_eq!(fig.panel(1).and_then(|p| p.title()), Some("sigma : 1, mode : nearest"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    data: ImageData,
    filter: FilterKind,
    base: ParamCombination,
    row: Option<(String, Vec<ParamValue>)>,
    col: Option<(String, Vec<ParamValue>)>,
    combinations: Option<Vec<ParamCombination>>,
    col_wrap: usize,
    height: f64,
    aspect: f64,
    options: ImageOptions,
}

/// Former name of [`ParamGrid`].
#[deprecated(note = "use ParamGrid")]
pub type FilterGrid = ParamGrid;

impl ParamGrid {
    /// A grid for the built-in filter `filter_name`.
    pub fn new(data: ImageData, filter_name: &str) -> ImagePlotResult<Self> {
        Ok(Self {
            data,
            filter: filter_name.parse()?,
            base: Vec::new(),
            row: None,
            col: None,
            combinations: None,
            col_wrap: DEFAULT_COL_WRAP,
            height: DEFAULT_HEIGHT,
            aspect: DEFAULT_ASPECT,
            options: ImageOptions::default(),
        })
    }

    /// A parameter shared by every panel.
    pub fn with_param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.base.push((name.to_string(), value.into()));
        self
    }

    /// Parameter varied along the rows.
    pub fn row<V: Into<ParamValue>>(mut self, name: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.row = Some((name.to_string(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Parameter varied along the columns.
    pub fn col<V: Into<ParamValue>>(mut self, name: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.col = Some((name.to_string(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// An explicit list of parameter sets, one panel each, instead of
    /// `row` / `col`.
    pub fn combinations(mut self, combinations: Vec<ParamCombination>) -> Self {
        self.combinations = Some(combinations);
        self
    }

    /// Maximum number of columns for explicit combinations.
    pub const fn with_col_wrap(mut self, col_wrap: usize) -> Self {
        self.col_wrap = col_wrap;
        self
    }

    /// Height of one panel in inches.
    pub const fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Width to height ratio of one panel.
    pub const fn with_aspect(mut self, aspect: f64) -> Self {
        self.aspect = aspect;
        self
    }

    /// Options shared by all panels.
    pub fn with_options(mut self, options: ImageOptions) -> Self {
        self.options = options;
        self
    }

    /// The parameter sets in panel order, with the grid shape.
    fn layout(&self) -> ImagePlotResult<(Vec<ParamCombination>, usize, usize)> {
        let axis_values = |axis: &Option<(String, Vec<ParamValue>)>, which: &str| {
            match axis {
                Some((_, values)) if values.is_empty() => Err(ImagePlotError::invalid_parameter(
                    which,
                    "needs at least one value",
                )),
                Some((name, values)) => Ok(values
                    .iter()
                    .map(|v| (name.clone(), v.clone()))
                    .collect::<Vec<_>>()),
                None => Ok(Vec::new()),
            }
        };
        let rows = axis_values(&self.row, "row")?;
        let cols = axis_values(&self.col, "col")?;

        if let Some(combinations) = &self.combinations {
            if !rows.is_empty() || !cols.is_empty() {
                return Err(ImagePlotError::invalid_parameter(
                    "combinations",
                    "cannot be combined with 'row' or 'col'",
                ));
            }
            if combinations.is_empty() {
                return Err(ImagePlotError::invalid_parameter(
                    "combinations",
                    "needs at least one parameter set",
                ));
            }
            let (nrows, ncols) = grid_shape(combinations.len(), self.col_wrap.max(1));
            return Ok((combinations.clone(), nrows, ncols));
        }

        let combos: Vec<ParamCombination> = match (rows.is_empty(), cols.is_empty()) {
            (true, true) => Vec::new(),
            (false, true) => rows.into_iter().map(|r| vec![r]).collect(),
            (true, false) => cols.into_iter().map(|c| vec![c]).collect(),
            (false, false) => rows
                .iter()
                .flat_map(|r| cols.iter().map(move |c| vec![r.clone(), c.clone()]))
                .collect(),
        };
        let nrows = self.row.as_ref().map_or(1, |(_, v)| v.len());
        let ncols = self.col.as_ref().map_or(1, |(_, v)| v.len());
        Ok((combos, nrows, ncols))
    }

    /// Filters the image for every parameter set and lays out the panels.
    pub fn build(&self, settings: &Settings) -> ImagePlotResult<Figure> {
        let (combos, nrows, ncols) = self.layout()?;
        let resolved = self.options.resolve(settings)?;
        let figsize = (
            ncols as f64 * self.height * self.aspect,
            nrows as f64 * self.height,
        );
        let mut fig = Figure::new(nrows, ncols, figsize, settings);

        if combos.is_empty() {
            fig.push(image_panel(&self.data, &resolved)?);
            return Ok(fig);
        }

        let filters = combos
            .iter()
            .map(|combo| {
                let params: Vec<(&str, ParamValue)> = self
                    .base
                    .iter()
                    .chain(combo.iter())
                    .map(|(k, v)| (k.as_str(), v.clone()))
                    .collect();
                Filter::from_name(self.filter.as_str(), &params)
            })
            .collect::<ImagePlotResult<Vec<Filter>>>()?;
        debug!(filter = %self.filter, panels = filters.len(), nrows, ncols, "parameter grid layout");

        let jobs: Vec<(usize, Option<&Filter>)> = filters.iter().map(|f| (0, Some(f))).collect();
        let outputs = run_jobs(&jobs, std::slice::from_ref(&self.data))?;

        for (combo, image) in combos.iter().zip(outputs.iter()) {
            let title = combo
                .iter()
                .map(|(k, v)| format!("{k} : {v}"))
                .collect::<Vec<_>>()
                .join(", ");
            let opts = ResolvedImageOptions {
                title: Some(title),
                ..resolved.clone()
            };
            fig.push(image_panel(image, &opts)?);
        }
        Ok(fig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3, Array4, Axis};

    fn stack3() -> ImageStack {
        ImageStack::new(&Array3::from_shape_fn((5, 50, 6), |(a, b, c)| {
            (a * 1000 + b * 10 + c) as f64
        }))
        .unwrap()
    }

    fn gray(v: f64) -> ImageData {
        ImageData::gray(&Array2::from_shape_fn((4, 4), |(r, c)| v + (r + c) as f64)).unwrap()
    }

    #[test]
    fn test_slices_along_axis_in_order() {
        let stack = stack3();
        let fig = ImageGrid::new(stack.clone())
            .with_slices(vec![10, 20, 30, 40])
            .with_axis(1)
            .build(&Settings::default())
            .unwrap();
        assert_eq!(fig.len(), 4);
        assert_eq!((fig.nrows(), fig.ncols()), (2, 3));
        for (panel, index) in fig.image_panels().zip([10, 20, 30, 40]) {
            let expected = stack.data().index_axis(Axis(1), index).to_owned();
            let gray = panel.image.as_gray().unwrap();
            assert_eq!(gray.shape(), &[5, 6]);
            assert_eq!(gray.iter().copied().collect::<Vec<_>>(), expected.iter().copied().collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_slice_errors() {
        let settings = Settings::default();
        assert!(matches!(
            ImageGrid::new(stack3()).with_slices(vec![5]).build(&settings),
            Err(ImagePlotError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            ImageGrid::new(stack3()).with_axis(3).build(&settings),
            Err(ImagePlotError::IndexOutOfBounds { .. })
        ));
        // negative indices and axes count from the end
        let fig = ImageGrid::new(stack3())
            .with_axis(-3)
            .with_slices(vec![-1])
            .build(&settings)
            .unwrap();
        assert_eq!(fig.len(), 1);
    }

    #[test]
    fn test_automatic_range() {
        let settings = Settings::default();
        let all = ImageGrid::new(stack3()).build(&settings).unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!((all.nrows(), all.ncols()), (2, 3));

        let stepped = ImageGrid::new(stack3())
            .with_axis(2)
            .with_range(Some(1), Some(-1), 2)
            .build(&settings)
            .unwrap();
        assert_eq!(stepped.len(), 2);
    }

    #[test]
    fn test_rgb_stack_and_mixed_list() {
        let settings = Settings::default();
        let rgb = ImageStack::new(&Array4::<u8>::zeros((2, 4, 4, 3))).unwrap();
        let fig = ImageGrid::new(rgb).build(&settings).unwrap();
        assert_eq!(fig.len(), 2);
        assert!(fig.image_panels().all(|p| p.image.is_rgb()));

        let mixed = vec![
            gray(0.0),
            ImageData::rgb(&Array3::from_elem((4, 4, 3), 0.5)).unwrap(),
        ];
        let fig = ImageGrid::new(mixed).build(&settings).unwrap();
        assert_eq!((fig.nrows(), fig.ncols()), (1, 2));
    }

    #[test]
    fn test_per_image_params_and_map_func_order() {
        let settings = Settings::default();
        let images = vec![gray(0.0), gray(100.0)];
        let fig = ImageGrid::new(images.clone())
            .with_cmap(PanelParam::per_image(vec!["magma".into(), "gray".into()]))
            .with_map_func(vec![Filter::gaussian(1.0), Filter::median(3)])
            .build(&settings)
            .unwrap();
        assert_eq!(fig.len(), 4);
        let cmaps: Vec<_> = fig.image_panels().map(|p| p.cmap.name().to_string()).collect();
        assert_eq!(cmaps, vec!["magma", "gray", "magma", "gray"]);
        // func0(img0), func0(img1), func1(img0), func1(img1)
        let means: Vec<f64> = fig
            .image_panels()
            .map(|p| p.image.values().sum::<f64>() / 16.0)
            .collect();
        assert!(means[0] < 50.0 && means[1] > 50.0 && means[2] < 50.0 && means[3] > 50.0);

        let err = ImageGrid::new(images)
            .with_cmap(PanelParam::per_image(vec!["magma".into()]))
            .build(&settings)
            .unwrap_err();
        assert!(matches!(
            err,
            ImagePlotError::Config(ConfigError::PanelCount { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_param_grid_product_and_titles() {
        let settings = Settings::default();
        let fig = ParamGrid::new(gray(0.0), "gaussian")
            .unwrap()
            .row("sigma", [1, 2])
            .col("mode", ["reflect", "nearest", "wrap"])
            .build(&settings)
            .unwrap();
        assert_eq!((fig.nrows(), fig.ncols()), (2, 3));
        let titles: Vec<_> = fig.panels().iter().filter_map(|p| p.title()).collect();
        assert_eq!(titles[0], "sigma : 1, mode : reflect");
        assert_eq!(titles[2], "sigma : 1, mode : wrap");
        assert_eq!(titles[3], "sigma : 2, mode : reflect");

        let single = ParamGrid::new(gray(0.0), "median")
            .unwrap()
            .col("size", [3])
            .build(&settings)
            .unwrap();
        assert_eq!(single.panel(0).and_then(|p| p.title()), Some("size : 3"));

        let plain = ParamGrid::new(gray(0.0), "median").unwrap().build(&settings).unwrap();
        assert_eq!(plain.len(), 1);
        assert_eq!(plain.panel(0).unwrap().as_image().unwrap().image, gray(0.0));
    }

    #[test]
    fn test_param_grid_explicit_combinations_and_errors() {
        let settings = Settings::default();
        let combos = vec![
            vec![("size".to_string(), ParamValue::from(3))],
            vec![("size".to_string(), ParamValue::from(5)), ("mode".to_string(), "wrap".into())],
        ];
        let fig = ParamGrid::new(gray(0.0), "max")
            .unwrap()
            .combinations(combos)
            .build(&settings)
            .unwrap();
        assert_eq!(fig.len(), 2);
        assert_eq!(fig.panel(1).and_then(|p| p.title()), Some("size : 5, mode : wrap"));

        assert!(matches!(
            ParamGrid::new(gray(0.0), "does_not_exist"),
            Err(ImagePlotError::UnsupportedFilter { .. })
        ));
        let bad = ParamGrid::new(gray(0.0), "gaussian")
            .unwrap()
            .row("sigma", [-1.0])
            .build(&settings);
        assert!(matches!(bad, Err(ImagePlotError::InvalidParameter { .. })));
    }

    #[test]
    #[allow(deprecated)]
    fn test_filter_grid_alias() {
        let fig = FilterGrid::new(gray(0.0), "sobel")
            .unwrap()
            .col("axis", [0, 1])
            .build(&Settings::default())
            .unwrap();
        assert_eq!(fig.len(), 2);
    }
}
