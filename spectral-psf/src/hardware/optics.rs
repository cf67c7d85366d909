//! Camera optics and the default PSFs they produce
//!
//! A camera is described by its focal length, aperture and pixel pitch, all
//! in meters. From those it can build a diffraction-limited Airy disk PSF or
//! the Gaussian fit to its core.

use nalgebra::Vector2;
use num_traits::Float;

use crate::photometry::spectrum::NM_TO_M;
use crate::photometry::SpectralBands;
use crate::psf::{AiryDiskPsf, AiryDiskPsfConfig, GaussianPsf, PointSpreadFunction, PsfError};

/// Which PSF a camera applies by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PsfSelection {
    #[default]
    None,
    AiryDisk,
    Gaussian,
}

/// Optical layout of a simulated camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraOptics {
    /// Focal length in meters
    pub focal_length_m: f64,
    /// Clear aperture diameter in meters
    pub aperture_diameter_m: f64,
    /// Pixel pitch (x, y) in meters
    pub pixel_size_m: Vector2<f64>,
}

impl CameraOptics {
    /// Create a new camera optics description
    pub fn new(focal_length_m: f64, aperture_diameter_m: f64, pixel_size_m: Vector2<f64>) -> Self {
        Self {
            focal_length_m,
            aperture_diameter_m,
            pixel_size_m,
        }
    }

    /// Camera with square pixels of side `pixel_pitch_m`
    pub fn with_square_pixels(
        focal_length_m: f64,
        aperture_diameter_m: f64,
        pixel_pitch_m: f64,
    ) -> Self {
        Self::new(
            focal_length_m,
            aperture_diameter_m,
            Vector2::new(pixel_pitch_m, pixel_pitch_m),
        )
    }

    /// Focal ratio f/D
    pub fn f_number(&self) -> f64 {
        self.focal_length_m / self.aperture_diameter_m
    }

    /// Get the Airy disk first-zero radius in pixels (x axis)
    ///
    /// # Arguments
    /// * `wavelength_nm` - Observing wavelength in nanometers
    pub fn airy_radius_pixels(&self, wavelength_nm: f64) -> f64 {
        let radius_m = self
            .airy_disk_config()
            .first_zero_radius_m(wavelength_nm * NM_TO_M);
        radius_m / self.pixel_size_m.x
    }

    pub fn airy_disk_config(&self) -> AiryDiskPsfConfig {
        AiryDiskPsfConfig::new(
            self.focal_length_m,
            self.aperture_diameter_m,
            self.pixel_size_m,
        )
    }

    /// Diffraction-limited PSF for these optics
    pub fn default_airy_disk_psf<T: Float, const N: usize>(
        &self,
        bands: &SpectralBands<N>,
    ) -> Result<PointSpreadFunction<T, N>, PsfError> {
        Ok(AiryDiskPsf::<T, N>::new(self.airy_disk_config(), *bands)?.into())
    }

    /// Gaussian fit to the diffraction-limited PSF for these optics
    pub fn default_gaussian_psf<T: Float, const N: usize>(
        &self,
        bands: &SpectralBands<N>,
    ) -> Result<PointSpreadFunction<T, N>, PsfError> {
        Ok(GaussianPsf::<T, N>::approximating_airy(&self.airy_disk_config(), bands)?.into())
    }

    /// Build the PSF named by `selection`, or `None` for no PSF
    pub fn build_psf<T: Float, const N: usize>(
        &self,
        selection: PsfSelection,
        bands: &SpectralBands<N>,
    ) -> Result<Option<PointSpreadFunction<T, N>>, PsfError> {
        match selection {
            PsfSelection::None => Ok(None),
            PsfSelection::AiryDisk => self.default_airy_disk_psf(bands).map(Some),
            PsfSelection::Gaussian => self.default_gaussian_psf(bands).map(Some),
        }
    }
}
