//! Plot builders: one function per kind of figure.
//!
//! Each builder resolves its options against the [`Settings`] it is given,
//! runs any numeric work (filters, FFT, statistics) and returns a [`Figure`].
//! Nothing is drawn until the figure is rendered.

use tracing::{info, warn};

use super::core::{
    ColorNorm, Colorbar, Extend, Figure, HistogramPanel, ImagePanel, Orientation,
};
use super::resolve::{ImageOptions, ResolvedImageOptions};
use crate::colormap::Colormap;
use crate::operations::filters::Filter;
use crate::operations::statistics::{
    Histogram, describe, log_ticks, nan_min_max, nan_percentile, nice_ticks,
};
use crate::operations::transforms::magnitude_spectrum;
use crate::operations::types::FftOptions;
use crate::settings::Settings;
use crate::{ImageData, ImagePlotError, ImagePlotResult};

/// Number of histogram bins used by [`imghist`] when none is given.
pub const DEFAULT_BINS: usize = 500;

/// Colormap of the spectrum panels drawn by [`filterplot`].
pub const FFT_COLORMAP: &str = "sunset-dark";

/// Target number of colorbar tick intervals.
const CBAR_TICKS: usize = 3;

const SINGLE_FIGSIZE: (f64, f64) = (6.4, 4.8);

/// Builds one image panel from resolved options.
///
/// Gray data gets colour limits (explicit, robust or data range), a norm and
/// optionally a colorbar. RGB data is drawn as is, without colorbar.
pub fn image_panel(image: &ImageData, opts: &ResolvedImageOptions) -> ImagePlotResult<ImagePanel> {
    let values = image.finite_values();

    let summary = if opts.describe {
        let summary = describe(&values);
        if let Some(s) = &summary {
            info!(title = opts.title.as_deref().unwrap_or(""), "\n{s}");
        }
        summary
    } else {
        None
    };

    if image.is_rgb() {
        let vmax = if values.iter().any(|v| *v > 1.0) { 255.0 } else { 1.0 };
        return Ok(ImagePanel {
            image: image.clone(),
            cmap: opts.cmap.clone(),
            norm: ColorNorm::Linear { vmin: 0.0, vmax },
            alpha: opts.alpha,
            origin: opts.origin,
            interpolation: opts.interpolation,
            title: opts.title.clone(),
            showticks: opts.showticks,
            despine: opts.despine,
            colorbar: None,
            scalebar: opts.scalebar.clone(),
            summary,
        });
    }

    let (data_min, data_max) = nan_min_max(values.iter().copied())
        .ok_or_else(|| ImagePlotError::shape("image contains no finite values"))?;

    let (mut vmin, mut vmax) = (opts.vmin, opts.vmax);
    let mut extend = Extend::Neither;
    if opts.robust {
        let robust_min = vmin.is_none();
        let robust_max = vmax.is_none();
        if robust_min {
            vmin = nan_percentile(&values, opts.perc.0);
        }
        if robust_max {
            vmax = nan_percentile(&values, opts.perc.1);
        }
        extend = Extend::from_ends(robust_min, robust_max);
    }
    let vmin = vmin.unwrap_or(data_min);
    let vmax = vmax.unwrap_or(data_max);
    if vmin > vmax {
        return Err(ImagePlotError::invalid_parameter(
            "vmin",
            format!("colour limits are inverted: vmin={vmin}, vmax={vmax}"),
        ));
    }

    let norm = if opts.cbar_log {
        let lo = if vmin > 0.0 {
            vmin
        } else {
            let positive = values.iter().copied().filter(|v| *v > 0.0);
            let smallest = nan_min_max(positive).map(|(lo, _)| lo).ok_or_else(|| {
                ImagePlotError::invalid_parameter(
                    "cbar_log",
                    "a logarithmic colour scale needs positive data",
                )
            })?;
            warn!(vmin, smallest, "non-positive data under a log norm; clipping the lower limit");
            smallest
        };
        ColorNorm::Log {
            vmin: lo,
            vmax: vmax.max(lo),
        }
    } else {
        ColorNorm::Linear { vmin, vmax }
    };

    let colorbar = opts.cbar.then(|| Colorbar {
        label: opts.cbar_label.clone(),
        ticks: opts.cbar_ticks.clone().unwrap_or_else(|| match norm {
            ColorNorm::Log { vmin, vmax } => log_ticks(vmin, vmax),
            ColorNorm::Linear { vmin, vmax } => nice_ticks(vmin, vmax, CBAR_TICKS),
        }),
        orientation: opts.orientation,
        extend,
        outline: !opts.despine,
    });

    Ok(ImagePanel {
        image: image.clone(),
        cmap: opts.cmap.clone(),
        norm,
        alpha: opts.alpha,
        origin: opts.origin,
        interpolation: opts.interpolation,
        title: opts.title.clone(),
        showticks: opts.showticks,
        despine: opts.despine,
        colorbar,
        scalebar: opts.scalebar.clone(),
        summary,
    })
}

/// Plots a single image.
///
/// ```rust
/// use imageplot::{ImageData, ImageOptions, Settings, imgplot};
/// use ndarray::Array2;
///
/// # fn example() -> imageplot::ImagePlotResult<()> {
/// let data = ImageData::gray(&Array2::from_shape_fn((32, 32), |(r, c)| (r + c) as f64))?;
/// let opts = ImageOptions::new().with_scalebar(15.0, "nm").with_describe(true);
/// let fig = imgplot(&data, &opts, &Settings::default())?;
/// assert_eq!(fig.len(), 1);
/// # Ok(())
/// # }
/// ```
pub fn imgplot(data: &ImageData, opts: &ImageOptions, settings: &Settings) -> ImagePlotResult<Figure> {
    let resolved = opts.resolve(settings)?;
    let mut fig = Figure::new(1, 1, SINGLE_FIGSIZE, settings);
    fig.push(image_panel(data, &resolved)?);
    Ok(fig)
}

/// Plots a gray image next to the histogram of its values.
///
/// `bins` defaults to [`DEFAULT_BINS`] and must be positive. With a vertical
/// orientation the histogram is drawn to the right of the image, with a
/// horizontal one below it. Bars take the colour of the colormap at their
/// centre.
pub fn imghist(
    data: &ImageData,
    bins: Option<usize>,
    opts: &ImageOptions,
    settings: &Settings,
) -> ImagePlotResult<Figure> {
    let bins = bins.unwrap_or(DEFAULT_BINS);
    if bins == 0 {
        return Err(ImagePlotError::invalid_parameter(
            "bins",
            "must be a positive integer",
        ));
    }
    let gray = data.require_gray("imghist")?;
    let resolved = opts.resolve(settings)?;
    let panel = image_panel(data, &resolved)?;

    let values: Vec<f64> = gray.iter().copied().collect();
    let range = nan_min_max(values.iter().copied())
        .ok_or_else(|| ImagePlotError::shape("image contains no finite values"))?;
    let histogram = HistogramPanel {
        histogram: Histogram::new(&values, bins, range)?,
        cmap: panel.cmap.clone(),
        norm: panel.norm,
        orientation: resolved.orientation,
        title: None,
    };

    let (nrows, ncols, figsize) = match resolved.orientation {
        Orientation::Vertical => (1, 2, (10.0, 5.0)),
        Orientation::Horizontal => (2, 1, (5.0, 10.0)),
    };
    let mut fig = Figure::new(nrows, ncols, figsize, settings);
    fig.push(panel);
    fig.push(histogram);
    Ok(fig)
}

/// Filters an image and plots it next to the original.
///
/// With `fft` set, a second row shows the log magnitude spectra of both
/// images. Returns the figure and the filtered data.
///
/// ```rust
/// use imageplot::{Filter, ImageData, ImageOptions, Settings, filterplot};
/// use ndarray::Array2;
///
/// # fn example() -> imageplot::ImagePlotResult<()> {
/// let data = ImageData::gray(&Array2::from_shape_fn((16, 16), |(r, c)| (r * c) as f64))?;
/// let filter: Filter = "median".parse()?;
/// let (fig, filtered) = filterplot(&data, &filter, &ImageOptions::new(), true, &Settings::default())?;
/// assert_eq!(fig.len(), 4);
/// assert_eq!(filtered.width(), 16);
/// # Ok(())
/// # }
/// ```
pub fn filterplot(
    data: &ImageData,
    filter: &Filter,
    opts: &ImageOptions,
    fft: bool,
    settings: &Settings,
) -> ImagePlotResult<(Figure, ImageData)> {
    if fft {
        data.require_gray("filterplot with fft")?;
    }
    let resolved = opts.resolve(settings)?;
    let filtered = filter.apply_image(data)?;

    let titled = |title: &str| ResolvedImageOptions {
        title: Some(title.to_string()),
        ..resolved.clone()
    };
    let original_panel = image_panel(data, &titled("Original Image"))?;
    let filtered_panel = image_panel(&filtered, &titled("Filtered Image"))?;

    let mut fig = if fft {
        let spectrum_opts = |title: &str| -> ImagePlotResult<ResolvedImageOptions> {
            Ok(ResolvedImageOptions {
                cmap: Colormap::from_name(FFT_COLORMAP)?,
                vmin: None,
                vmax: None,
                robust: false,
                cbar_log: false,
                cbar_label: None,
                cbar_ticks: None,
                scalebar: None,
                describe: false,
                title: Some(title.to_string()),
                ..resolved.clone()
            })
        };
        let fft_options = FftOptions::default();
        let spectrum = |img: &ImageData| -> ImagePlotResult<ImageData> {
            let gray = img.require_gray("fft")?;
            Ok(ImageData::Gray(magnitude_spectrum(gray, &fft_options)))
        };

        let mut fig = Figure::new(2, 2, (8.0, 8.0), settings);
        fig.push(original_panel);
        fig.push(filtered_panel);
        fig.push(image_panel(
            &spectrum(data)?,
            &spectrum_opts("Original FFT Magnitude (log)")?,
        )?);
        fig.push(image_panel(
            &spectrum(&filtered)?,
            &spectrum_opts("Filtered FFT Magnitude (log)")?,
        )?);
        fig
    } else {
        let mut fig = Figure::new(1, 2, (10.0, 5.0), settings);
        fig.push(original_panel);
        fig.push(filtered_panel);
        fig
    };
    if let Some(title) = &opts.title {
        fig = fig.with_title(title.clone());
    }
    Ok((fig, filtered))
}

/// Plots the magnitude spectrum of a gray image.
pub fn fftplot(
    data: &ImageData,
    opts: &ImageOptions,
    fft_options: &FftOptions,
    settings: &Settings,
) -> ImagePlotResult<Figure> {
    let gray = data.require_gray("fftplot")?;
    let resolved = opts.resolve(settings)?;
    let spectrum = ImageData::Gray(magnitude_spectrum(gray, fft_options));
    let mut fig = Figure::new(1, 1, SINGLE_FIGSIZE, settings);
    fig.push(image_panel(&spectrum, &resolved)?);
    Ok(fig)
}

/// Plots the three channels of an RGB image with `R`, `G` and `B` colormaps.
///
/// The last axis must have exactly 3 entries. With `composite` set, a fourth
/// panel shows the colour image itself. Colour options in `opts` apply to
/// each channel panel; `cmap` is ignored.
pub fn rgbplot(
    data: &ImageData,
    opts: &ImageOptions,
    composite: bool,
    settings: &Settings,
) -> ImagePlotResult<Figure> {
    if data.channels() != 3 {
        return Err(ImagePlotError::shape(format!(
            "rgbplot expects data with exactly 3 channels on the last axis, got {}",
            data.channels()
        )));
    }
    let resolved = opts.resolve(settings)?;

    let npanels = if composite { 4 } else { 3 };
    let mut fig = Figure::new(1, npanels, (4.0 * npanels as f64, 4.0), settings);
    for (index, name) in ["R", "G", "B"].into_iter().enumerate() {
        let channel = ImageData::Gray(data.channel(index)?.to_owned());
        let channel_opts = ResolvedImageOptions {
            cmap: Colormap::from_name(name)?,
            title: Some(name.to_string()),
            ..resolved.clone()
        };
        fig.push(image_panel(&channel, &channel_opts)?);
    }
    if composite {
        fig.push(image_panel(data, &resolved)?);
    }
    Ok(fig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use approx_eq::assert_approx_eq;
    use ndarray::{Array2, Array3};

    fn ramp(rows: usize, cols: usize) -> ImageData {
        ImageData::gray(&Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f64))
            .unwrap()
    }

    #[test]
    fn test_imgplot_single_panel_with_defaults() {
        let fig = imgplot(&ramp(10, 10), &ImageOptions::new(), &Settings::default()).unwrap();
        assert_eq!(fig.len(), 1);
        let panel = fig.panel(0).unwrap().as_image().unwrap();
        assert_eq!(panel.norm, ColorNorm::Linear { vmin: 0.0, vmax: 99.0 });
        let cbar = panel.colorbar.as_ref().unwrap();
        assert_eq!(cbar.extend, Extend::Neither);
        assert!(!cbar.ticks.is_empty());
        assert!(panel.scalebar.is_none());
    }

    #[test]
    fn test_imgplot_scalebar_pairing_is_checked() {
        let mut opts = ImageOptions::new();
        opts.dx = Some(15.0);
        assert!(matches!(
            imgplot(&ramp(4, 4), &opts, &Settings::default()),
            Err(ImagePlotError::Config(ConfigError::ScalebarPairing(_)))
        ));

        let nm = imgplot(
            &ramp(100, 100),
            &ImageOptions::new().with_scalebar(15.0, "nm"),
            &Settings::default(),
        )
        .unwrap();
        let um = imgplot(
            &ramp(100, 100),
            &ImageOptions::new().with_scalebar(0.015, "um"),
            &Settings::default(),
        )
        .unwrap();
        let layout = |fig: &Figure| {
            let bar = fig.panel(0).unwrap().as_image().unwrap().scalebar.clone().unwrap();
            bar.layout(100)
        };
        assert_eq!(layout(&nm).label, layout(&um).label);
        assert_approx_eq!(layout(&nm).length_px, layout(&um).length_px, 1e-9);
    }

    #[test]
    fn test_robust_limits_and_extend() {
        let mut data = Array2::from_shape_fn((10, 10), |(r, c)| (r * 10 + c) as f64);
        data[[5, 5]] = 1e6;
        let image = ImageData::gray(&data).unwrap();
        let opts = ImageOptions::new().with_robust(true).with_vmin(0.0);
        let fig = imgplot(&image, &opts, &Settings::default()).unwrap();
        let panel = fig.panel(0).unwrap().as_image().unwrap();
        assert_eq!(panel.norm.vmin(), 0.0);
        assert!(panel.norm.vmax() < 1e6);
        assert_eq!(panel.colorbar.as_ref().unwrap().extend, Extend::Max);
    }

    #[test]
    fn test_fft_panels_of_flat_images() {
        let settings = Settings::default();
        let flat = ImageData::gray(&Array2::from_elem((8, 8), 3.0)).unwrap();
        let (fig, filtered) =
            filterplot(&flat, &Filter::sobel(-1), &ImageOptions::new(), true, &settings).unwrap();
        assert_eq!(fig.len(), 4);
        assert!(filtered.as_gray().unwrap().iter().all(|v| *v == 0.0));
        let spectrum = fig.panel(3).unwrap().as_image().unwrap();
        assert_eq!(spectrum.norm, ColorNorm::Linear { vmin: 0.0, vmax: 0.0 });
        assert_eq!(spectrum.image.finite_values().len(), 64);

        let zeros = ImageData::gray(&Array2::<f64>::zeros((8, 8))).unwrap();
        let fig = fftplot(&zeros, &ImageOptions::new(), &FftOptions::default(), &settings).unwrap();
        let panel = fig.panel(0).unwrap().as_image().unwrap();
        assert!(panel.image.as_gray().unwrap().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_describe_attaches_summary() {
        let fig = imgplot(
            &ramp(2, 2),
            &ImageOptions::new().with_describe(true),
            &Settings::default(),
        )
        .unwrap();
        let summary = fig.panel(0).unwrap().as_image().unwrap().summary.unwrap();
        assert_eq!(summary.count, 4);
        assert_approx_eq!(summary.mean, 1.5, 1e-12);
    }

    #[test]
    fn test_context_snapshot_is_per_figure() {
        let mut settings = Settings::default();
        settings.set_context("notebook", None).unwrap();
        let notebook = imgplot(&ramp(3, 3), &ImageOptions::new(), &settings).unwrap();
        settings.set_context("paper", None).unwrap();
        let paper = imgplot(&ramp(3, 3), &ImageOptions::new(), &settings).unwrap();
        assert_eq!(notebook.style().font_size, 15.0);
        assert_eq!(paper.style().font_size, 10.0);
    }

    #[test]
    fn test_imghist() {
        let fig = imghist(&ramp(8, 8), Some(4), &ImageOptions::new(), &Settings::default())
            .unwrap();
        assert_eq!((fig.nrows(), fig.ncols()), (1, 2));
        let hist = fig.panel(1).unwrap().as_histogram().unwrap();
        assert_eq!(hist.histogram.counts, vec![16, 16, 16, 16]);
        assert_eq!(hist.bar_colors().len(), 4);

        let horizontal = imghist(
            &ramp(8, 8),
            None,
            &ImageOptions::new().with_orientation("h"),
            &Settings::default(),
        )
        .unwrap();
        assert_eq!((horizontal.nrows(), horizontal.ncols()), (2, 1));

        assert!(matches!(
            imghist(&ramp(8, 8), Some(0), &ImageOptions::new(), &Settings::default()),
            Err(ImagePlotError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_filterplot_layouts() {
        let settings = Settings::default();
        let filter = Filter::gaussian(1.0);
        let (fig, filtered) =
            filterplot(&ramp(8, 8), &filter, &ImageOptions::new(), false, &settings).unwrap();
        assert_eq!(fig.len(), 2);
        assert_eq!(fig.panel(0).unwrap().title(), Some("Original Image"));
        assert_eq!(fig.panel(1).unwrap().title(), Some("Filtered Image"));
        assert_eq!(filtered.height(), 8);

        let (fig, _) =
            filterplot(&ramp(8, 8), &filter, &ImageOptions::new(), true, &settings).unwrap();
        assert_eq!((fig.nrows(), fig.ncols()), (2, 2));
        assert_eq!(fig.panel(3).unwrap().title(), Some("Filtered FFT Magnitude (log)"));
        assert_eq!(fig.panel(2).unwrap().as_image().unwrap().cmap.name(), FFT_COLORMAP);
    }

    #[test]
    fn test_fftplot_requires_gray() {
        let rgb = ImageData::rgb(&Array3::from_elem((4, 4, 3), 0.5)).unwrap();
        assert!(matches!(
            fftplot(&rgb, &ImageOptions::new(), &FftOptions::default(), &Settings::default()),
            Err(ImagePlotError::Shape(_))
        ));
        let fig = fftplot(
            &ramp(8, 8),
            &ImageOptions::new(),
            &FftOptions::default(),
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(fig.len(), 1);
    }

    #[test]
    fn test_rgbplot() {
        let settings = Settings::default();
        let rgb = ImageData::rgb(&Array3::from_shape_fn((4, 4, 3), |(r, c, k)| {
            (r + c + k) as f64
        }))
        .unwrap();
        let fig = rgbplot(&rgb, &ImageOptions::new(), true, &settings).unwrap();
        assert_eq!(fig.len(), 4);
        let titles: Vec<_> = fig.panels().iter().take(3).map(|p| p.title()).collect();
        assert_eq!(titles, vec![Some("R"), Some("G"), Some("B")]);
        assert_eq!(fig.panel(0).unwrap().as_image().unwrap().cmap.name(), "R");
        assert!(fig.panel(3).unwrap().as_image().unwrap().colorbar.is_none());

        let rgba = ImageData::rgb(&Array3::from_elem((4, 4, 4), 0.5)).unwrap();
        assert!(matches!(
            rgbplot(&rgba, &ImageOptions::new(), false, &settings),
            Err(ImagePlotError::Shape(_))
        ));
        assert!(rgbplot(&ramp(4, 4), &ImageOptions::new(), false, &settings).is_err());
    }
}
