//! Elliptical, rotated 2D Gaussian PSF
//!
//! Models optical blur and astigmatism without any diffraction physics. Each
//! spectral band may have its own width along each axis, and the ellipse can
//! be rotated by an arbitrary angle.
//!
//! The response is a normalized bivariate Gaussian:
//!
//! ```text
//! p' = R(θ) · p
//! I(p) = exp(-0.5 * ((p'.x / σx)² + (p'.y / σy)²)) / (2π σx σy)
//! ```

use std::f64::consts::PI;

use nalgebra::Matrix2;
use num_traits::Float;

use super::airy::AiryDiskPsfConfig;
use super::{Pixel, PsfError, PsfModel};
use crate::photometry::spectral::{cast, widen};
use crate::photometry::{Spectral, SpectralBands};

/// Ratio of the best-fit Gaussian sigma to `λ f / D` for an Airy core
pub const AIRY_GAUSSIAN_SIGMA_FACTOR: f64 = 0.42;

#[derive(Debug, Clone)]
pub struct GaussianPsf<T, const N: usize> {
    sigma_x: Spectral<T, N>,
    sigma_y: Spectral<T, N>,
    angle_deg: f64,
    rotation: Matrix2<f64>,
}

impl<T: Float, const N: usize> GaussianPsf<T, N> {
    /// Circular Gaussian, `sigma_y = sigma_x`
    pub fn circular(sigma: Spectral<T, N>, angle_deg: f64) -> Result<Self, PsfError> {
        Self::elliptical(sigma, sigma, angle_deg)
    }

    /// Elliptical Gaussian with per-band widths along each axis
    ///
    /// # Arguments
    /// * `sigma_x` - Width along the (rotated) x axis, in pixels
    /// * `sigma_y` - Width along the (rotated) y axis, in pixels
    /// * `angle_deg` - Counterclockwise rotation of the ellipse in degrees
    ///
    /// # Errors
    /// `PsfError::InvalidConfig` for non-positive or non-finite widths, or a
    /// non-finite angle.
    pub fn elliptical(
        sigma_x: Spectral<T, N>,
        sigma_y: Spectral<T, N>,
        angle_deg: f64,
    ) -> Result<Self, PsfError> {
        for (axis, sigma) in [("sigma_x", &sigma_x), ("sigma_y", &sigma_y)] {
            if sigma.iter().any(|s| !s.is_finite() || *s <= T::zero()) {
                return Err(PsfError::InvalidConfig(format!(
                    "{axis} must be positive and finite in every band, got {:?}",
                    (*sigma.values()).map(widen)
                )));
            }
        }
        if !angle_deg.is_finite() {
            return Err(PsfError::InvalidConfig(format!(
                "Gaussian angle must be finite, got {angle_deg}"
            )));
        }

        Ok(Self {
            sigma_x,
            sigma_y,
            angle_deg,
            rotation: rotation_matrix(angle_deg),
        })
    }

    /// Elliptical Gaussian with the same widths in every band
    pub fn from_scalars(sigma_x: f64, sigma_y: f64, angle_deg: f64) -> Result<Self, PsfError> {
        Self::elliptical(
            Spectral::splat(cast(sigma_x)),
            Spectral::splat(cast(sigma_y)),
            angle_deg,
        )
    }

    /// Gaussian fit to the Airy core of the given optics.
    ///
    /// Per band, `σ = 0.42 λ f / D`, converted to pixels along each axis.
    pub fn approximating_airy(
        config: &AiryDiskPsfConfig,
        bands: &SpectralBands<N>,
    ) -> Result<Self, PsfError> {
        config.validate()?;
        let f_number = config.focal_length / config.aperture_diameter;
        let sigma_m = |i: usize| AIRY_GAUSSIAN_SIGMA_FACTOR * bands.wavelength_m(i) * f_number;

        Self::elliptical(
            Spectral::from_f64_fn(|i| sigma_m(i) / config.pixel_size.x),
            Spectral::from_f64_fn(|i| sigma_m(i) / config.pixel_size.y),
            0.0,
        )
    }

    pub fn sigma_x(&self) -> &Spectral<T, N> {
        &self.sigma_x
    }

    pub fn sigma_y(&self) -> &Spectral<T, N> {
        &self.sigma_y
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }
}

/// Counterclockwise rotation by `angle_deg`
fn rotation_matrix(angle_deg: f64) -> Matrix2<f64> {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    Matrix2::new(cos, -sin, sin, cos)
}

impl<T: Float + Send + Sync, const N: usize> PsfModel<T, N> for GaussianPsf<T, N> {
    fn evaluate(&self, point: Pixel) -> Spectral<T, N> {
        let rotated = self.rotation * point;

        Spectral::from_f64_fn(|i| {
            let sigma_x = widen(self.sigma_x[i]);
            let sigma_y = widen(self.sigma_y[i]);
            let x = rotated.x / sigma_x;
            let y = rotated.y / sigma_y;

            let exponent = -0.5 * (x * x + y * y);
            let coefficient = 1.0 / (2.0 * PI * sigma_x * sigma_y);
            coefficient * exponent.exp()
        })
    }
}
