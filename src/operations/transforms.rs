//! Two dimensional Fourier transforms of images.
//!
//! The transform is computed with `rustfft`, rows first and then columns.
//! Only the magnitude is exposed to the plotting layer.

use std::f64::consts::PI;

use ndarray::{Array1, Array2, Axis};
use num_complex::Complex;
use rustfft::FftPlanner;

use super::types::{FftOptions, WindowType};

/// Generates a symmetric 1-D window of `size` samples.
pub fn generate_window(size: usize, window: WindowType) -> Array1<f64> {
    match (window, size) {
        (_, 0) => Array1::zeros(0),
        (WindowType::Rectangular, _) | (_, 1) => Array1::ones(size),
        (WindowType::Hann, _) => (0..size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / (size - 1) as f64).cos()))
            .collect(),
    }
}

/// Radially symmetric 2-D window.
///
/// A 1-D window of `max(shape)` samples is rotated about the image centre:
/// each pixel takes the window value at its distance from the centre, with
/// axes rescaled so non-square images get an elliptical footprint. Pixels
/// beyond the window radius are zero.
pub fn window_2d(shape: (usize, usize), window: WindowType) -> Array2<f64> {
    let size = shape.0.max(shape.1);
    if window == WindowType::Rectangular || size <= 1 {
        return Array2::ones(shape);
    }
    let center = size as f64 / 2.0 - 0.5;
    let scale = |n: usize| size as f64 / n as f64;
    let (sr, sc) = (scale(shape.0), scale(shape.1));
    Array2::from_shape_fn(shape, |(r, c)| {
        let dr = r as f64 * sr - center;
        let dc = c as f64 * sc - center;
        window_value((dr * dr + dc * dc).sqrt() + center, size, window)
    })
}

/// Continuous form of [`generate_window`] at position `x` in `[0, size - 1]`.
fn window_value(x: f64, size: usize, window: WindowType) -> f64 {
    let last = (size - 1) as f64;
    if !(0.0..=last).contains(&x) {
        return 0.0;
    }
    match window {
        WindowType::Rectangular => 1.0,
        WindowType::Hann => 0.5 * (1.0 - (2.0 * PI * x / last).cos()),
    }
}

/// Complex 2-D discrete Fourier transform of a real image.
pub fn fft2(data: &Array2<f64>) -> Array2<Complex<f64>> {
    let mut spectrum = data.mapv(|v| Complex::new(v, 0.0));
    let mut planner = FftPlanner::new();

    for axis in [Axis(1), Axis(0)] {
        let len = spectrum.len_of(axis);
        let fft = planner.plan_fft_forward(len);
        let mut buffer = vec![Complex::new(0.0, 0.0); len];
        for mut lane in spectrum.lanes_mut(axis) {
            for (b, v) in buffer.iter_mut().zip(lane.iter()) {
                *b = *v;
            }
            fft.process(&mut buffer);
            for (v, b) in lane.iter_mut().zip(buffer.iter()) {
                *v = *b;
            }
        }
    }
    spectrum
}

/// Moves the zero frequency component to the centre of the array.
///
/// Every axis is rolled by `n / 2`, matching `numpy.fft.fftshift`.
pub fn fftshift<T: Clone>(data: &Array2<T>) -> Array2<T> {
    let (rows, cols) = data.dim();
    let (dr, dc) = (rows / 2, cols / 2);
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        data[[(r + rows - dr) % rows, (c + cols - dc) % cols]].clone()
    })
}

/// Magnitude spectrum of a gray image.
///
/// With `log` enabled the natural log is taken. Exact zeros are raised to the
/// smallest non-zero magnitude first, and an all-zero spectrum becomes a
/// constant zero image.
pub fn magnitude_spectrum(data: &Array2<f64>, options: &FftOptions) -> Array2<f64> {
    let windowed = match options.window {
        WindowType::Rectangular => data.clone(),
        window => data * &window_2d(data.dim(), window),
    };
    // missing pixels contribute nothing to the transform
    let windowed = windowed.mapv(|v| if v.is_nan() { 0.0 } else { v });

    let mut magnitude = fft2(&windowed).mapv(|c| c.norm());
    if options.shift {
        magnitude = fftshift(&magnitude);
    }
    if options.log {
        let floor = magnitude
            .iter()
            .copied()
            .filter(|m| *m > 0.0)
            .fold(f64::INFINITY, f64::min);
        let floor = if floor.is_finite() { floor } else { 1.0 };
        magnitude.mapv_inplace(|m| m.max(floor).ln());
    }
    magnitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use ndarray::array;

    #[test]
    fn test_hann_window_is_symmetric_and_zero_at_edges() {
        let w = generate_window(5, WindowType::Hann);
        assert_approx_eq!(w[0], 0.0, 1e-12);
        assert_approx_eq!(w[2], 1.0, 1e-12);
        assert_approx_eq!(w[1], w[3], 1e-12);
        assert_eq!(generate_window(1, WindowType::Hann)[0], 1.0);
    }

    #[test]
    fn test_fft2_of_constant_concentrates_in_dc() {
        let data = Array2::from_elem((4, 6), 2.0);
        let spectrum = fft2(&data);
        assert_approx_eq!(spectrum[[0, 0]].re, 48.0, 1e-9);
        for ((r, c), v) in spectrum.indexed_iter() {
            if (r, c) != (0, 0) {
                assert!(v.norm() < 1e-9);
            }
        }
    }

    #[test]
    fn test_fft2_of_impulse_is_flat() {
        let mut data = Array2::zeros((3, 5));
        data[[0, 0]] = 1.0;
        let spectrum = fft2(&data);
        for v in spectrum.iter() {
            assert_approx_eq!(v.norm(), 1.0, 1e-9);
        }
    }

    #[test]
    fn test_fftshift_moves_origin_to_centre() {
        let data = array![[0, 1, 2], [3, 4, 5]];
        let shifted = fftshift(&data);
        assert_eq!(shifted, array![[5, 3, 4], [2, 0, 1]]);
        assert_eq!(shifted[[1, 1]], 0);
    }

    #[test]
    fn test_log_magnitude_stays_finite() {
        let data = Array2::from_elem((4, 4), 1.0);
        let options = FftOptions::default()
            .with_window(WindowType::Rectangular)
            .with_shift(false);
        let mag = magnitude_spectrum(&data, &options);
        assert_approx_eq!(mag[[0, 0]], 16f64.ln(), 1e-9);
        assert!(mag.iter().all(|v| v.is_finite()));
        assert!(mag[[1, 1]] < mag[[0, 0]]);

        let zeros = magnitude_spectrum(&Array2::zeros((5, 3)), &FftOptions::default());
        assert!(zeros.iter().all(|v| *v == 0.0));

        let shifted = magnitude_spectrum(&data, &options.with_shift(true).with_log(false));
        assert_approx_eq!(shifted[[2, 2]], 16.0, 1e-9);
    }

    #[test]
    fn test_radial_hann_window() {
        let w = window_2d((9, 9), WindowType::Hann);
        // peak at the centre, zero in the corners beyond the radius
        assert!(w[[4, 4]] > 0.95);
        assert_eq!(w[[0, 0]], 0.0);
        assert_eq!(w[[8, 8]], 0.0);
        // same value at equal distance along both axes
        assert_approx_eq!(w[[4, 1]], w[[1, 4]], 1e-12);
        assert_approx_eq!(w[[4, 2]], w[[6, 4]], 1e-12);
        // a separable window would give w[2, 2] = w[4, 2]^2
        assert!(w[[2, 2]] < w[[4, 2]]);
        assert!(window_2d((3, 4), WindowType::Rectangular).iter().all(|v| *v == 1.0));
    }
}
