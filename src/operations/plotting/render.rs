//! Drawing [`Figure`]s with plotters.
//!
//! Panels are laid out with `split_evenly` on the root drawing area. Each
//! image is rasterized at device resolution and blitted as one bitmap; axes,
//! colorbars and scalebars are plain shapes on top. Any
//! plotters backend works; [`Figure::save`] picks PNG or SVG from the file
//! extension.

use std::path::Path;

use ndarray::Array2;
use plotters::coord::Shift;
use plotters::element::BitMapElement;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform, TextStyle};
use tracing::{debug, info};

use super::core::{Colorbar, ColorNorm, Figure, HistogramPanel, ImagePanel, Orientation, Panel};
use super::elements::Scalebar;
use crate::operations::statistics::nice_ticks;
use crate::settings::{
    ContextStyle, FontWeight, Interpolation, Origin, ScaleLabelPosition, ScalebarLocation,
};
use crate::{Colormap, ImageData, ImagePlotError, ImagePlotResult};

const PANEL_MARGIN: i32 = 6;
const COLORBAR_FRACTION: f64 = 0.15;
const TICK_LENGTH: i32 = 4;
const POINTS_PER_INCH: f64 = 72.0;

type Area<DB> = DrawingArea<DB, Shift>;

/// Image placement inside a panel, in area pixels.
#[derive(Debug, Clone, Copy)]
struct Placement {
    x0: i32,
    y0: i32,
    width: i32,
    height: i32,
    scale: f64,
}

/// Text styles for one figure, sized for its dpi.
struct Fonts<'a> {
    style: &'a ContextStyle,
    dpi: u32,
}

impl Fonts<'_> {
    fn family(&self) -> FontFamily<'static> {
        match self.style.font_family.to_ascii_lowercase().as_str() {
            "serif" | "times" | "times new roman" => FontFamily::Serif,
            "monospace" | "courier" => FontFamily::Monospace,
            _ => FontFamily::SansSerif,
        }
    }

    fn text(&self, size_pt: f64, weight: FontWeight) -> TextStyle<'static> {
        let font_style = match weight {
            FontWeight::Bold => FontStyle::Bold,
            FontWeight::Normal => FontStyle::Normal,
        };
        FontDesc::new(self.family(), size_pt * self.dpi as f64 / POINTS_PER_INCH, font_style)
            .color(&BLACK)
    }

    fn title(&self) -> TextStyle<'static> {
        self.text(self.style.title_size, self.style.title_weight)
    }

    fn label(&self) -> TextStyle<'static> {
        self.text(self.style.label_size, self.style.label_weight)
    }

    fn tick(&self) -> TextStyle<'static> {
        self.text(self.style.font_size, self.style.font_weight)
    }

    fn line_width(&self) -> u32 {
        (self.style.axes_linewidth * self.dpi as f64 / POINTS_PER_INCH)
            .round()
            .max(1.0) as u32
    }
}

fn rgb([r, g, b]: [u8; 3]) -> RGBColor {
    RGBColor(r, g, b)
}

fn format_tick(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let a = v.abs();
    if !(1e-3..1e4).contains(&a) {
        return format!("{v:.1e}");
    }
    let s = format!("{v:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

impl Figure {
    /// Renders the figure to `path`.
    ///
    /// The format follows the extension: `.png` or `.svg`.
    pub fn save(&self, path: impl AsRef<Path>) -> ImagePlotResult<()> {
        let path = path.as_ref();
        let size = self.pixel_size();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => {
                let root = BitMapBackend::new(path, size).into_drawing_area();
                self.draw_on(&root)?;
                root.present().map_err(ImagePlotError::render)?;
            }
            Some("svg") => {
                let root = SVGBackend::new(path, size).into_drawing_area();
                self.draw_on(&root)?;
                root.present().map_err(ImagePlotError::render)?;
            }
            other => {
                return Err(ImagePlotError::Render(format!(
                    "unsupported output format {:?}; use .png or .svg",
                    other.unwrap_or("")
                )));
            }
        }
        info!(path = %path.display(), width = size.0, height = size.1, "saved figure");
        Ok(())
    }

    /// Renders the figure as an SVG document.
    pub fn to_svg_string(&self) -> ImagePlotResult<String> {
        let mut out = String::new();
        {
            let root = SVGBackend::with_string(&mut out, self.pixel_size()).into_drawing_area();
            self.draw_on(&root)?;
            root.present().map_err(ImagePlotError::render)?;
        }
        Ok(out)
    }

    /// Renders the figure into a packed RGB buffer of [`Figure::pixel_size`].
    pub fn to_rgb_buffer(&self) -> ImagePlotResult<Vec<u8>> {
        let (w, h) = self.pixel_size();
        let mut buf = vec![0u8; w as usize * h as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
            self.draw_on(&root)?;
            root.present().map_err(ImagePlotError::render)?;
        }
        Ok(buf)
    }

    /// Draws every panel onto `root`.
    pub fn draw_on<DB: DrawingBackend>(&self, root: &Area<DB>) -> ImagePlotResult<()> {
        root.fill(&WHITE).map_err(ImagePlotError::render)?;
        let fonts = Fonts {
            style: self.style(),
            dpi: self.dpi(),
        };
        let grid = (self.nrows(), self.ncols());
        let cells = match self.title() {
            Some(title) => root
                .titled(title, fonts.title())
                .map_err(ImagePlotError::render)?
                .split_evenly(grid),
            None => root.split_evenly(grid),
        };
        debug!(panels = self.len(), nrows = grid.0, ncols = grid.1, "drawing figure");

        for (panel, cell) in self.panels().iter().zip(cells.iter()) {
            let cell = cell.margin(PANEL_MARGIN, PANEL_MARGIN, PANEL_MARGIN, PANEL_MARGIN);
            let titled;
            let area = match panel.title() {
                Some(title) => {
                    titled = cell
                        .titled(title, fonts.label())
                        .map_err(ImagePlotError::render)?;
                    &titled
                }
                None => &cell,
            };
            match panel {
                Panel::Image(p) => draw_image_panel(area, p, &fonts)?,
                Panel::Histogram(p) => draw_histogram(area, p, &fonts)?,
            }
        }
        Ok(())
    }
}

fn draw_image_panel<DB: DrawingBackend>(
    area: &Area<DB>,
    panel: &ImagePanel,
    fonts: &Fonts<'_>,
) -> ImagePlotResult<()> {
    let (w, h) = area.dim_in_pixel();
    let split;
    let (image_area, cbar_area) = match &panel.colorbar {
        Some(cb) => {
            split = match cb.orientation {
                Orientation::Vertical => {
                    area.split_horizontally((w as f64 * (1.0 - COLORBAR_FRACTION)) as i32)
                }
                Orientation::Horizontal => {
                    area.split_vertically((h as f64 * (1.0 - COLORBAR_FRACTION)) as i32)
                }
            };
            (&split.0, Some((&split.1, cb)))
        }
        None => (area, None),
    };

    let place = draw_pixels(image_area, panel)?;
    if !panel.despine {
        draw_frame(image_area, place, fonts)?;
    }
    if panel.showticks {
        draw_axis_ticks(image_area, place, panel, fonts)?;
    }
    if let Some(bar) = &panel.scalebar {
        draw_scalebar(image_area, place, bar, panel.image.width(), fonts)?;
    }
    if let Some((cbar_area, cb)) = cbar_area {
        draw_colorbar(cbar_area, cb, panel, fonts)?;
    }
    Ok(())
}

fn placement(area_size: (u32, u32), rows: usize, cols: usize) -> Placement {
    let (aw, ah) = (area_size.0 as f64, area_size.1 as f64);
    let scale = (aw / cols as f64).min(ah / rows as f64);
    let width = (cols as f64 * scale).floor().max(1.0) as i32;
    let height = (rows as f64 * scale).floor().max(1.0) as i32;
    Placement {
        x0: (aw as i32 - width) / 2,
        y0: (ah as i32 - height) / 2,
        width,
        height,
        scale,
    }
}

/// Bilinear sample of `a` at continuous pixel coordinates; NaN if any
/// neighbour is missing.
fn bilinear(a: &Array2<f64>, y: f64, x: f64) -> f64 {
    let (rows, cols) = a.dim();
    let fy = (y - 0.5).clamp(0.0, (rows - 1) as f64);
    let fx = (x - 0.5).clamp(0.0, (cols - 1) as f64);
    let (r0, c0) = (fy.floor() as usize, fx.floor() as usize);
    let (r1, c1) = ((r0 + 1).min(rows - 1), (c0 + 1).min(cols - 1));
    let (ty, tx) = (fy - r0 as f64, fx - c0 as f64);
    let top = a[[r0, c0]] * (1.0 - tx) + a[[r0, c1]] * tx;
    let bottom = a[[r1, c0]] * (1.0 - tx) + a[[r1, c1]] * tx;
    top * (1.0 - ty) + bottom * ty
}

/// Packed RGB pixels of `panel` at `place` resolution. Missing values stay
/// white and `alpha` blends towards white.
fn rasterize(panel: &ImagePanel, place: Placement) -> Vec<u8> {
    let (rows, cols) = (panel.image.height(), panel.image.width());
    let (w, h) = (place.width as usize, place.height as usize);
    let mut buf = vec![255u8; w * h * 3];
    let blend = |c: u8| (c as f64 * panel.alpha + 255.0 * (1.0 - panel.alpha)).round() as u8;

    for (py, line) in buf.chunks_exact_mut(w * 3).enumerate() {
        let y = (py as f64 + 0.5) / place.scale;
        let y = match panel.origin {
            Origin::Upper => y,
            Origin::Lower => rows as f64 - y,
        };
        for (px, pixel) in line.chunks_exact_mut(3).enumerate() {
            let x = (px as f64 + 0.5) / place.scale;
            let color = match (&panel.image, panel.interpolation) {
                (ImageData::Gray(a), Interpolation::Bilinear) => {
                    panel.norm.color(bilinear(a, y, x), &panel.cmap)
                }
                _ => {
                    let row = (y.floor().max(0.0) as usize).min(rows - 1);
                    let col = (x.floor() as usize).min(cols - 1);
                    panel.pixel_color(row, col)
                }
            };
            if let Some(c) = color {
                for (out, v) in pixel.iter_mut().zip(c) {
                    *out = blend(v);
                }
            }
        }
    }
    buf
}

fn draw_pixels<DB: DrawingBackend>(area: &Area<DB>, panel: &ImagePanel) -> ImagePlotResult<Placement> {
    let (rows, cols) = (panel.image.height(), panel.image.width());
    let place = placement(area.dim_in_pixel(), rows, cols);
    let size = (place.width as u32, place.height as u32);
    let bitmap: BitMapElement<'_, (i32, i32)> =
        BitMapElement::with_owned_buffer((place.x0, place.y0), size, rasterize(panel, place))
            .ok_or_else(|| ImagePlotError::Render("image raster has the wrong size".to_string()))?;
    area.draw(&bitmap).map_err(ImagePlotError::render)?;
    Ok(place)
}

fn draw_frame<DB: DrawingBackend>(
    area: &Area<DB>,
    place: Placement,
    fonts: &Fonts<'_>,
) -> ImagePlotResult<()> {
    area.draw(&Rectangle::new(
        [
            (place.x0 - 1, place.y0 - 1),
            (place.x0 + place.width, place.y0 + place.height),
        ],
        BLACK.stroke_width(fonts.line_width()),
    ))
    .map_err(ImagePlotError::render)
}

fn draw_axis_ticks<DB: DrawingBackend>(
    area: &Area<DB>,
    place: Placement,
    panel: &ImagePanel,
    fonts: &Fonts<'_>,
) -> ImagePlotResult<()> {
    let (rows, cols) = (panel.image.height() as f64, panel.image.width() as f64);
    let style = fonts.tick();
    let bottom = place.y0 + place.height;

    for t in nice_ticks(0.0, cols, 5) {
        let x = place.x0 + (t * place.scale).round() as i32;
        area.draw(&PathElement::new(vec![(x, bottom), (x, bottom + TICK_LENGTH)], BLACK))
            .map_err(ImagePlotError::render)?;
        area.draw_text(
            &format_tick(t),
            &style.pos(Pos::new(HPos::Center, VPos::Top)),
            (x, bottom + TICK_LENGTH + 1),
        )
        .map_err(ImagePlotError::render)?;
    }
    for t in nice_ticks(0.0, rows, 5) {
        let offset = (t * place.scale).round() as i32;
        let y = match panel.origin {
            Origin::Upper => place.y0 + offset,
            Origin::Lower => bottom - offset,
        };
        area.draw(&PathElement::new(
            vec![(place.x0 - TICK_LENGTH, y), (place.x0, y)],
            BLACK,
        ))
        .map_err(ImagePlotError::render)?;
        area.draw_text(
            &format_tick(t),
            &style.pos(Pos::new(HPos::Right, VPos::Center)),
            (place.x0 - TICK_LENGTH - 1, y),
        )
        .map_err(ImagePlotError::render)?;
    }
    Ok(())
}

fn draw_scalebar<DB: DrawingBackend>(
    area: &Area<DB>,
    place: Placement,
    bar: &Scalebar,
    image_width: usize,
    fonts: &Fonts<'_>,
) -> ImagePlotResult<()> {
    let layout = bar.layout(image_width);
    let length = (layout.length_px * place.scale).round().max(1.0) as i32;
    let thickness = (bar.height_fraction * place.height as f64).round().max(1.0) as i32;
    let text_height = (fonts.style.font_size * fonts.dpi as f64 / POINTS_PER_INCH).round() as i32;
    let label_space = match bar.scale_loc {
        ScaleLabelPosition::None => 0,
        _ => text_height + 2,
    };
    let pad = (0.05 * place.height.min(place.width) as f64).round() as i32;
    let block_height = thickness + label_space;

    let x = match bar.location {
        ScalebarLocation::UpperLeft | ScalebarLocation::LowerLeft => place.x0 + pad,
        ScalebarLocation::UpperRight | ScalebarLocation::LowerRight => {
            place.x0 + place.width - pad - length
        }
        _ => place.x0 + (place.width - length) / 2,
    };
    let block_top = match bar.location {
        ScalebarLocation::UpperLeft | ScalebarLocation::UpperCenter | ScalebarLocation::UpperRight => {
            place.y0 + pad
        }
        ScalebarLocation::Center => place.y0 + (place.height - block_height) / 2,
        _ => place.y0 + place.height - pad - block_height,
    };
    let bar_top = match bar.scale_loc {
        ScaleLabelPosition::Top => block_top + label_space,
        _ => block_top,
    };

    if bar.box_alpha > 0.0 {
        area.draw(&Rectangle::new(
            [(x - 2, block_top - 2), (x + length + 2, block_top + block_height + 2)],
            WHITE.mix(bar.box_alpha).filled(),
        ))
        .map_err(ImagePlotError::render)?;
    }
    let color = rgb(bar.color);
    area.draw(&Rectangle::new(
        [(x, bar_top), (x + length, bar_top + thickness)],
        color.filled(),
    ))
    .map_err(ImagePlotError::render)?;

    let label_pos = match bar.scale_loc {
        ScaleLabelPosition::None => return Ok(()),
        ScaleLabelPosition::Top => (x + length / 2, block_top),
        ScaleLabelPosition::Bottom => (x + length / 2, bar_top + thickness + 2),
    };
    area.draw_text(
        &layout.label,
        &fonts
            .tick()
            .color(&color)
            .pos(Pos::new(HPos::Center, VPos::Top)),
        label_pos,
    )
    .map_err(ImagePlotError::render)
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &Area<DB>,
    cb: &Colorbar,
    panel: &ImagePanel,
    fonts: &Fonts<'_>,
) -> ImagePlotResult<()> {
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);
    let vertical = cb.orientation == Orientation::Vertical;
    // strip thickness and length along the colour axis
    let thickness = if vertical { w / 3 } else { h / 3 }.max(2);
    let full = if vertical { h } else { w };
    let tri = if cb.extend.has_min() || cb.extend.has_max() {
        thickness
    } else {
        0
    };
    let start = PANEL_MARGIN + if cb.extend.has_min() { tri } else { 0 };
    let end = full - PANEL_MARGIN - if cb.extend.has_max() { tri } else { 0 };
    let length = (end - start).max(2);

    // colour axis runs bottom to top when vertical, left to right otherwise
    let to_device = |along: i32, across: i32| {
        if vertical {
            (PANEL_MARGIN + across, full - along)
        } else {
            (along, PANEL_MARGIN + across)
        }
    };

    for i in 0..length {
        let t = i as f64 / (length - 1) as f64;
        let color = rgb(panel.cmap.color_at(t));
        area.draw(&PathElement::new(
            vec![to_device(start + i, 0), to_device(start + i, thickness)],
            color,
        ))
        .map_err(ImagePlotError::render)?;
    }
    if cb.extend.has_max() {
        let tip = vec![
            to_device(end, 0),
            to_device(end, thickness),
            to_device(end + tri, thickness / 2),
        ];
        area.draw(&Polygon::new(tip, rgb(panel.cmap.color_at(1.0)).filled()))
            .map_err(ImagePlotError::render)?;
    }
    if cb.extend.has_min() {
        let tip = vec![
            to_device(start, 0),
            to_device(start, thickness),
            to_device(start - tri, thickness / 2),
        ];
        area.draw(&Polygon::new(tip, rgb(panel.cmap.color_at(0.0)).filled()))
            .map_err(ImagePlotError::render)?;
    }
    if cb.outline {
        let (a, b) = (to_device(start, 0), to_device(end, thickness));
        area.draw(&Rectangle::new([a, b], BLACK.stroke_width(fonts.line_width())))
            .map_err(ImagePlotError::render)?;
    }

    let style = fonts.tick();
    let label_pos = if vertical {
        Pos::new(HPos::Left, VPos::Center)
    } else {
        Pos::new(HPos::Center, VPos::Top)
    };
    for &tick in &cb.ticks {
        let t = panel.norm.normalize(tick);
        if !(0.0..=1.0).contains(&t) {
            continue;
        }
        let along = start + (t * (length - 1) as f64).round() as i32;
        area.draw(&PathElement::new(
            vec![to_device(along, thickness), to_device(along, thickness + TICK_LENGTH)],
            BLACK,
        ))
        .map_err(ImagePlotError::render)?;
        area.draw_text(
            &format_tick(tick),
            &style.pos(label_pos),
            to_device(along, thickness + TICK_LENGTH + 2),
        )
        .map_err(ImagePlotError::render)?;
    }

    if let Some(label) = &cb.label {
        let text_height = (fonts.style.label_size * fonts.dpi as f64 / POINTS_PER_INCH) as i32;
        if vertical {
            let font = FontDesc::new(
                fonts.family(),
                fonts.style.label_size * fonts.dpi as f64 / POINTS_PER_INCH,
                FontStyle::Normal,
            )
            .transform(FontTransform::Rotate90)
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
            area.draw_text(label, &font, (w - text_height / 2 - 1, h / 2))
                .map_err(ImagePlotError::render)?;
        } else {
            area.draw_text(
                label,
                &fonts.label().pos(Pos::new(HPos::Center, VPos::Bottom)),
                (w / 2, h - 1),
            )
            .map_err(ImagePlotError::render)?;
        }
    }
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    area: &Area<DB>,
    panel: &HistogramPanel,
    fonts: &Fonts<'_>,
) -> ImagePlotResult<()> {
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);
    let hist = &panel.histogram;
    let (Some(&lo), Some(&hi)) = (hist.edges.first(), hist.edges.last()) else {
        return Ok(());
    };
    let max_count = hist.max_count().max(1) as f64;
    let span = (hi - lo).max(f64::EPSILON);
    let vertical = panel.orientation == Orientation::Vertical;

    // value axis along y for vertical panels, along x otherwise
    let (value_len, count_len) = if vertical { (h, w) } else { (w, h) };
    let value_at = |v: f64| ((v - lo) / span * value_len as f64).round() as i32;
    let count_at = |c: usize| (c as f64 / max_count * count_len as f64).round() as i32;
    let to_device = |value: i32, count: i32| {
        if vertical {
            (count, h - value)
        } else {
            (value, h - count)
        }
    };

    for ((edge, &count), color) in hist
        .edges
        .windows(2)
        .zip(hist.counts.iter())
        .zip(panel.bar_colors())
    {
        if count == 0 {
            continue;
        }
        let a = to_device(value_at(edge[0]), 0);
        let b = to_device(value_at(edge[1]).max(value_at(edge[0]) + 1), count_at(count));
        area.draw(&Rectangle::new([a, b], rgb(color).filled()))
            .map_err(ImagePlotError::render)?;
    }

    let axis = vec![to_device(0, 0), to_device(value_len, 0)];
    area.draw(&PathElement::new(axis, BLACK.stroke_width(fonts.line_width())))
        .map_err(ImagePlotError::render)?;

    let style = fonts.tick();
    let pos = if vertical {
        Pos::new(HPos::Left, VPos::Center)
    } else {
        Pos::new(HPos::Center, VPos::Bottom)
    };
    for tick in nice_ticks(lo, hi, 3) {
        let (x, y) = to_device(value_at(tick), 0);
        let (x, y) = if vertical { (x + TICK_LENGTH, y) } else { (x, y - TICK_LENGTH) };
        area.draw_text(&format_tick(tick), &style.pos(pos), (x, y))
            .map_err(ImagePlotError::render)?;
    }
    Ok(())
}

impl ColorNorm {
    /// Colour of `value` under this norm and `cmap`, `None` for missing values.
    pub fn color(&self, value: f64, cmap: &Colormap) -> Option<[u8; 3]> {
        let t = self.normalize(value);
        (!t.is_nan()).then(|| cmap.color_at(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::plotting::{ImageOptions, imgplot};
    use crate::Settings;

    fn bare_options() -> ImageOptions {
        ImageOptions::new()
            .with_cbar(false)
            .with_despine(true)
            .with_cmap("gray")
    }

    fn low_dpi() -> Settings {
        let mut settings = Settings::default();
        settings.set_save_context(10).unwrap();
        settings
    }

    #[test]
    fn test_rgb_buffer_has_figure_size_and_draws_pixels() {
        let data = ImageData::gray(&Array2::from_shape_fn((8, 8), |(r, _)| r as f64)).unwrap();
        let fig = imgplot(&data, &bare_options(), &low_dpi()).unwrap();
        let (w, h) = fig.pixel_size();
        let buf = fig.to_rgb_buffer().unwrap();
        assert_eq!(buf.len(), (w * h * 3) as usize);
        // the gray ramp leaves some pixels neither white nor black
        assert!(buf.chunks(3).any(|p| p[0] > 0 && p[0] < 255));
    }

    #[test]
    fn test_svg_output_and_unknown_format() {
        let data = ImageData::gray(&Array2::from_elem((4, 4), 1.0)).unwrap();
        let fig = imgplot(&data, &bare_options(), &low_dpi()).unwrap();
        let svg = fig.to_svg_string().unwrap();
        assert!(svg.contains("<svg"));
        let path = std::env::temp_dir().join("imageplot-render-test.gif");
        assert!(matches!(fig.save(&path), Err(ImagePlotError::Render(_))));
    }

    #[test]
    fn test_svg_embeds_one_raster_per_image() {
        let data =
            ImageData::gray(&Array2::from_shape_fn((64, 64), |(r, c)| (r * 64 + c) as f64)).unwrap();
        let mut settings = Settings::default();
        settings.set_save_context(100).unwrap();
        let fig = imgplot(&data, &bare_options(), &settings).unwrap();
        let svg = fig.to_svg_string().unwrap();
        assert!(svg.len() < 2_000_000, "svg is {} bytes", svg.len());
        assert!(svg.matches("<rect").count() < 10);
        assert!(svg.contains("<image"));
    }

    #[test]
    fn test_rasterize_leaves_missing_values_white() {
        let data = ImageData::gray(&Array2::from_shape_vec((1, 2), vec![f64::NAN, 1.0]).unwrap())
            .unwrap();
        let fig = imgplot(&data, &bare_options(), &low_dpi()).unwrap();
        let panel = fig.panel(0).unwrap().as_image().unwrap();
        let place = placement((4, 2), 1, 2);
        let buf = rasterize(panel, place);
        assert_eq!(buf.len(), 4 * 2 * 3);
        // left half missing, right half the single value at the bottom of the map
        assert_eq!(&buf[0..3], &[255, 255, 255]);
        assert_eq!(&buf[9..12], &[0, 0, 0]);

        let faded = ImagePanel { alpha: 0.5, ..panel.clone() };
        assert_eq!(&rasterize(&faded, place)[9..12], &[128, 128, 128]);
    }

    #[test]
    fn test_placement_keeps_aspect() {
        let place = placement((200, 100), 10, 40);
        assert_eq!((place.width, place.height), (200, 50));
        assert_eq!((place.x0, place.y0), (0, 25));
    }

    #[test]
    fn test_bilinear_and_tick_format() {
        let a = Array2::from_shape_vec((2, 2), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        assert!((bilinear(&a, 1.0, 1.0) - 1.5).abs() < 1e-12);
        assert_eq!(bilinear(&a, 0.5, 0.5), 0.0);
        assert_eq!(format_tick(0.5), "0.5");
        assert_eq!(format_tick(100.0), "100");
        assert_eq!(format_tick(1e6), "1.0e6");

        let gray = Colormap::from_name("gray").unwrap();
        let norm = ColorNorm::Linear { vmin: 0.0, vmax: 1.0 };
        assert_eq!(norm.color(f64::NAN, &gray), None);
        assert!(norm.color(0.5, &gray).is_some());
    }
}
