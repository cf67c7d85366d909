//! Spectral images and the operations the PSF engine needs on them
//!
//! Images are `ndarray` arrays indexed `[row, col]`, i.e. `[y, x]`.

use image::{GrayImage, Luma};
use ndarray::{Array2, Zip};
use num_traits::Float;

use crate::photometry::spectral::{cast, widen};
use crate::photometry::Spectral;

/// A 2D grid of spectral values
pub type SpectralImage<T, const N: usize> = Array2<Spectral<T, N>>;

/// Scale every band of `image` so that it sums to one.
///
/// Bands whose total is zero (or not finite) are left untouched.
pub fn normalize_bands<T: Float, const N: usize>(image: &mut SpectralImage<T, N>) {
    let totals: Spectral<T, N> = image
        .iter()
        .fold(Spectral::zeros(), |acc, value| acc + *value);

    let scale = totals.map(|total| {
        if total > T::zero() && total.is_finite() {
            T::one() / total
        } else {
            T::one()
        }
    });

    image.mapv_inplace(|value| value * scale);
}

/// Per-band sum over all pixels
pub fn band_totals<T: Float, const N: usize>(image: &SpectralImage<T, N>) -> Spectral<T, N> {
    image
        .iter()
        .fold(Spectral::zeros(), |acc, value| acc + *value)
}

/// Per-band maximum over the border pixels of `image`.
///
/// A 1x1 image is its own border. An empty image yields zeros.
pub fn edge_max<T: Float, const N: usize>(image: &SpectralImage<T, N>) -> Spectral<T, N> {
    let (rows, cols) = image.dim();
    if rows == 0 || cols == 0 {
        return Spectral::zeros();
    }

    let mut max = Spectral::splat(T::neg_infinity());
    for ((row, col), value) in image.indexed_iter() {
        if row == 0 || col == 0 || row == rows - 1 || col == cols - 1 {
            max = max.max(value);
        }
    }
    max
}

/// Box-average `image` down by an integer `factor` along both axes.
///
/// Trailing rows/columns that do not fill a whole block are dropped.
pub fn box_downsample<T: Float + Send + Sync, const N: usize>(
    image: &SpectralImage<T, N>,
    factor: usize,
) -> SpectralImage<T, N> {
    if factor <= 1 {
        return image.clone();
    }

    let (rows, cols) = image.dim();
    let mut out = SpectralImage::<T, N>::zeros((rows / factor, cols / factor));
    let inv_count = 1.0 / (factor * factor) as f64;

    Zip::indexed(&mut out).par_for_each(|(row, col), value| {
        let block = image.slice(ndarray::s![
            row * factor..(row + 1) * factor,
            col * factor..(col + 1) * factor
        ]);
        let total = block
            .iter()
            .fold(Spectral::<T, N>::zeros(), |acc, v| acc + *v);
        *value = total * cast::<T>(inv_count);
    });

    out
}

/// Scale every pixel by a per-band factor
pub fn scale_by<T: Float, const N: usize>(
    image: &SpectralImage<T, N>,
    factor: &Spectral<T, N>,
) -> SpectralImage<T, N> {
    image.mapv(|value| value * *factor)
}

/// Extract a single band as a scalar image
///
/// # Panics
/// Panics if `band >= N`.
pub fn band_to_array<T: Float, const N: usize>(
    image: &SpectralImage<T, N>,
    band: usize,
) -> Array2<f64> {
    image.mapv(|value| widen(value[band]))
}

/// Adds a response kernel to a frame, centered on pixel `(x, y)`.
///
/// Kernel pixels that fall outside the frame are skipped. The kernel center is
/// at `(size - 1) / 2` along each axis.
///
/// # Arguments
/// * `frame` - Image receiving the contribution
/// * `response` - Kernel to add (typically from `get_response`)
/// * `x` - Column of the source in the frame
/// * `y` - Row of the source in the frame
pub fn add_response_to_image<T: Float, const N: usize>(
    frame: &mut SpectralImage<T, N>,
    response: &SpectralImage<T, N>,
    x: i64,
    y: i64,
) {
    let (frame_rows, frame_cols) = frame.dim();
    let (kernel_rows, kernel_cols) = response.dim();
    let half_rows = ((kernel_rows as i64) - 1) / 2;
    let half_cols = ((kernel_cols as i64) - 1) / 2;

    for ((k_row, k_col), value) in response.indexed_iter() {
        let row = y - half_rows + k_row as i64;
        let col = x - half_cols + k_col as i64;

        // Bounds check x/y - Skip out of bounds pixels
        if row < 0 || col < 0 || row >= frame_rows as i64 || col >= frame_cols as i64 {
            continue;
        }

        frame[[row as usize, col as usize]] += *value;
    }
}

/// Converts an ndarray Array2<u8> to an image::GrayImage
///
/// Array indices [y, x] map to pixel coordinates (x, y).
pub fn array2_to_gray_image(arr: &Array2<u8>) -> GrayImage {
    let (height, width) = arr.dim();
    let mut img = GrayImage::new(width as u32, height as u32);

    for ((y, x), value) in arr.indexed_iter() {
        img.put_pixel(x as u32, y as u32, Luma([*value]));
    }

    img
}

/// Render one band of a spectral image as 8-bit grayscale, scaled so the
/// brightest pixel maps to 255.
///
/// # Panics
/// Panics if `band >= N`.
pub fn band_to_gray_image<T: Float, const N: usize>(
    image: &SpectralImage<T, N>,
    band: usize,
) -> GrayImage {
    let values = band_to_array(image, band);
    let peak = values.iter().copied().fold(0.0_f64, f64::max);
    let scale = if peak > 0.0 { 255.0 / peak } else { 0.0 };

    let bytes = values.mapv(|v| (v * scale).clamp(0.0, 255.0).round() as u8);
    array2_to_gray_image(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    type Img = SpectralImage<f64, 2>;

    fn ramp(size: usize) -> Img {
        Img::from_shape_fn((size, size), |(r, c)| {
            Spectral::new([(r * size + c) as f64, 1.0])
        })
    }

    #[test]
    fn test_normalize_bands() {
        let mut img = ramp(3);
        normalize_bands(&mut img);
        let totals = band_totals(&img);
        assert_relative_eq!(totals[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(totals[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_zero_band_untouched() {
        let mut img = Img::from_elem((2, 2), Spectral::new([0.0, 2.0]));
        normalize_bands(&mut img);
        assert_eq!(img[[0, 0]][0], 0.0);
        assert_relative_eq!(img[[0, 0]][1], 0.25);
    }

    #[test]
    fn test_edge_max_skips_interior() {
        let mut img = Img::from_elem((3, 3), Spectral::new([1.0, 1.0]));
        img[[1, 1]] = Spectral::new([100.0, 100.0]);
        img[[0, 2]] = Spectral::new([5.0, 0.5]);

        let edge = edge_max(&img);
        assert_eq!(edge.values(), &[5.0, 1.0]);
    }

    #[test]
    fn test_edge_max_single_pixel() {
        let img = Img::from_elem((1, 1), Spectral::new([3.0, 4.0]));
        assert_eq!(edge_max(&img).values(), &[3.0, 4.0]);
    }

    #[test]
    fn test_box_downsample_averages() {
        let img = ramp(4);
        let small = box_downsample(&img, 2);
        assert_eq!(small.dim(), (2, 2));
        // Top-left block holds 0, 1, 4, 5
        assert_relative_eq!(small[[0, 0]][0], 2.5);
        assert_relative_eq!(small[[1, 1]][0], 12.5);
        assert_relative_eq!(small[[1, 1]][1], 1.0);
    }

    #[test]
    fn test_add_response_clips_at_border() {
        let mut frame = Img::zeros((5, 5));
        let kernel = Img::from_elem((3, 3), Spectral::new([1.0, 2.0]));

        add_response_to_image(&mut frame, &kernel, 2, 2);
        assert_relative_eq!(band_totals(&frame)[0], 9.0);

        let mut corner = Img::zeros((5, 5));
        add_response_to_image(&mut corner, &kernel, 0, 0);
        assert_relative_eq!(band_totals(&corner)[0], 4.0);
        assert_relative_eq!(band_totals(&corner)[1], 8.0);

        let mut outside = Img::zeros((5, 5));
        add_response_to_image(&mut outside, &kernel, 10, -4);
        assert_relative_eq!(band_totals(&outside)[0], 0.0);
    }

    #[test]
    fn test_band_to_gray_image_peak() {
        let img = ramp(3);
        let gray = band_to_gray_image(&img, 0);
        assert_eq!(gray.dimensions(), (3, 3));
        assert_eq!(gray.get_pixel(2, 2)[0], 255);
        assert_eq!(gray.get_pixel(0, 0)[0], 0);
    }

    #[test]
    #[should_panic]
    fn test_band_to_array_out_of_range() {
        band_to_array(&ramp(2), 2);
    }

    #[test]
    #[should_panic]
    fn test_band_to_gray_image_out_of_range() {
        band_to_gray_image(&ramp(2), 5);
    }
}
