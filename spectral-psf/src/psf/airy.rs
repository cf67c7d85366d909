//! Diffraction-limited Airy disk PSF for a circular aperture.
//!
//! # Physics Background
//!
//! A plane wave through a circular aperture of diameter `D` focused at focal
//! length `f` produces the intensity pattern
//!
//! ```text
//! I(r) = [2*J₁(x)/x]²,   x = π * D * r / (λ * f)
//! ```
//!
//! where `J₁` is the first-order Bessel function of the first kind and `r` is
//! the physical distance from the optical axis in the focal plane. The pattern
//! is evaluated separately for each spectral band at the band's center
//! wavelength, so shorter wavelengths produce a tighter core.
//!
//! All Bessel and argument arithmetic runs in `f64` regardless of the spectral
//! storage type; values are narrowed only when written into the result.
//!
//! # Units
//!
//! Focal length, aperture diameter and pixel size are in meters. Band
//! wavelengths are given in nanometers and converted here.

use nalgebra::Vector2;
use num_traits::Float;
use scilib::math::bessel;

use super::{Pixel, PsfError, PsfModel};
use crate::photometry::spectral::widen;
use crate::photometry::{Spectral, SpectralBands};

/// First zero of J₁, the radius of the first dark ring in Airy units
pub const AIRY_FIRST_ZERO: f64 = 3.831_705_970_207_512;

/// Default supersampling used when building Airy kernels
pub const DEFAULT_SUPER_SAMPLING: usize = 10;

/// Below this radius (meters) the removable singularity at the center is used
const CENTER_RADIUS: f64 = 1e-20;

/// Optical parameters of a diffraction-limited camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiryDiskPsfConfig {
    /// Focal length in meters
    pub focal_length: f64,
    /// Aperture diameter in meters
    pub aperture_diameter: f64,
    /// Physical pixel pitch (x, y) in meters
    pub pixel_size: Vector2<f64>,
    /// Supersampling factor for kernel generation
    pub super_sampling: usize,
}

impl AiryDiskPsfConfig {
    /// Config with the default supersampling factor
    pub fn new(focal_length: f64, aperture_diameter: f64, pixel_size: Vector2<f64>) -> Self {
        Self {
            focal_length,
            aperture_diameter,
            pixel_size,
            super_sampling: DEFAULT_SUPER_SAMPLING,
        }
    }

    /// Radius of the first dark ring at `wavelength_m`, in meters
    pub fn first_zero_radius_m(&self, wavelength_m: f64) -> f64 {
        AIRY_FIRST_ZERO * wavelength_m * self.focal_length
            / (std::f64::consts::PI * self.aperture_diameter)
    }

    /// Check that every required parameter is present and physical.
    ///
    /// NaN marks a parameter the caller never filled in. Zero or negative
    /// lengths would make the Airy argument degenerate away from the center.
    pub fn validate(&self) -> Result<(), PsfError> {
        let required = [
            ("focal_length", self.focal_length),
            ("aperture_diameter", self.aperture_diameter),
            ("pixel_size.x", self.pixel_size.x),
            ("pixel_size.y", self.pixel_size.y),
        ];
        for (name, value) in required {
            if value.is_nan() {
                return Err(PsfError::InvalidConfig(format!(
                    "Airy disk PSF requires {name}, got NaN"
                )));
            }
        }

        for (name, value) in [
            ("focal_length", self.focal_length),
            ("aperture_diameter", self.aperture_diameter),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PsfError::InvalidConfig(format!(
                    "Airy disk PSF {name} must be positive and finite, got {value}"
                )));
            }
        }

        if self.super_sampling == 0 {
            return Err(PsfError::InvalidConfig(
                "Airy disk PSF super_sampling must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Airy disk PSF evaluated per spectral band
#[derive(Debug, Clone)]
pub struct AiryDiskPsf<T, const N: usize> {
    config: AiryDiskPsfConfig,
    bands: SpectralBands<N>,
    /// π D / f, kept in f64 to preserve small apertures and long focal lengths
    coefficient: f64,
    normalizer: Spectral<T, N>,
}

impl<T: Float, const N: usize> AiryDiskPsf<T, N> {
    /// # Errors
    /// `PsfError::InvalidConfig` if the config fails [`AiryDiskPsfConfig::validate`].
    pub fn new(config: AiryDiskPsfConfig, bands: SpectralBands<N>) -> Result<Self, PsfError> {
        config.validate()?;

        let coefficient = std::f64::consts::PI * (config.aperture_diameter / config.focal_length);

        Ok(Self {
            config,
            bands,
            coefficient,
            normalizer: Spectral::ones(),
        })
    }

    pub fn config(&self) -> &AiryDiskPsfConfig {
        &self.config
    }

    pub fn bands(&self) -> &SpectralBands<N> {
        &self.bands
    }

    /// π D / f
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Intensity at physical distance `radius` (meters) from the center.
    ///
    /// Exactly 1 in every band at the center.
    pub fn evaluate_radius(&self, radius: f64) -> Spectral<T, N> {
        if radius < CENTER_RADIUS {
            return Spectral::ones();
        }

        Spectral::from_f64_fn(|i| {
            let x = self.coefficient * radius / self.bands.wavelength_m(i);
            let bessel_j1 = bessel::j_n(1, x);
            let amplitude = 2.0 * bessel_j1 / x;
            widen(self.normalizer[i]) * amplitude * amplitude
        })
    }

    /// Radius of the first dark ring for band `index`, in meters
    pub fn first_zero_radius_m(&self, index: usize) -> f64 {
        self.config.first_zero_radius_m(self.bands.wavelength_m(index))
    }

    /// Radius of the first dark ring for band `index`, in x-axis pixels
    pub fn first_zero_radius_pixels(&self, index: usize) -> f64 {
        self.first_zero_radius_m(index) / self.config.pixel_size.x
    }
}

impl<T: Float + Send + Sync, const N: usize> PsfModel<T, N> for AiryDiskPsf<T, N> {
    fn evaluate(&self, point: Pixel) -> Spectral<T, N> {
        let radius = point.component_mul(&self.config.pixel_size).norm();
        self.evaluate_radius(radius)
    }

    fn supersample_step(&self) -> usize {
        self.config.super_sampling
    }
}
