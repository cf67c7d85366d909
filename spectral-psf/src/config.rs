//! Loadable PSF configuration
//!
//! Scene and camera descriptions carry their PSF as a small JSON object tagged
//! by `"model"`:
//!
//! ```json
//! { "model": "airy_disk", "focal_length": 1.0, "aperture_diameter": 0.1,
//!   "pixel_size": [1e-5, 1e-5] }
//! ```
//!
//! ```json
//! { "model": "gaussian", "sigma_x": [1.0, 1.5, 2.0], "sigma_y": 1.2, "angle": 30.0 }
//! ```
//!
//! Gaussian widths are either a single number used for every band, or one
//! number per band. `sigma_y` defaults to `sigma_x`, `angle` to 0 and
//! `super_sampling` to 10.

use std::path::Path;

use nalgebra::Vector2;
use num_traits::Float;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::photometry::{Spectral, SpectralBands};
use crate::psf::airy::DEFAULT_SUPER_SAMPLING;
use crate::psf::{AiryDiskPsf, AiryDiskPsfConfig, GaussianPsf, PointSpreadFunction, PsfError};

/// Errors that can occur while loading a PSF configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read PSF config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse PSF config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{name} has {got} bands, expected {expected}")]
    BandCount {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Psf(#[from] PsfError),
}

/// A Gaussian width, shared by all bands or given per band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SigmaSetting {
    Scalar(f64),
    PerBand(Vec<f64>),
}

impl SigmaSetting {
    fn to_spectral<T: Float, const N: usize>(
        &self,
        name: &'static str,
    ) -> Result<Spectral<T, N>, ConfigError> {
        match self {
            SigmaSetting::Scalar(sigma) => Ok(Spectral::from_f64_fn(|_| *sigma)),
            SigmaSetting::PerBand(values) if values.len() == N => {
                Ok(Spectral::from_f64_fn(|i| values[i]))
            }
            SigmaSetting::PerBand(values) => Err(ConfigError::BandCount {
                name,
                expected: N,
                got: values.len(),
            }),
        }
    }
}

fn default_super_sampling() -> usize {
    DEFAULT_SUPER_SAMPLING
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum PsfConfig {
    AiryDisk {
        /// Meters
        focal_length: f64,
        /// Meters
        aperture_diameter: f64,
        /// Meters per pixel, `[x, y]`
        pixel_size: [f64; 2],
        #[serde(default = "default_super_sampling")]
        super_sampling: usize,
    },
    Gaussian {
        /// Pixels
        sigma_x: SigmaSetting,
        #[serde(default)]
        sigma_y: Option<SigmaSetting>,
        /// Degrees, counterclockwise
        #[serde(default)]
        angle: f64,
    },
}

impl PsfConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the configured PSF for the given band table
    pub fn build<T: Float, const N: usize>(
        &self,
        bands: &SpectralBands<N>,
    ) -> Result<PointSpreadFunction<T, N>, ConfigError> {
        match self {
            PsfConfig::AiryDisk {
                focal_length,
                aperture_diameter,
                pixel_size,
                super_sampling,
            } => {
                let config = AiryDiskPsfConfig {
                    focal_length: *focal_length,
                    aperture_diameter: *aperture_diameter,
                    pixel_size: Vector2::new(pixel_size[0], pixel_size[1]),
                    super_sampling: *super_sampling,
                };
                Ok(AiryDiskPsf::<T, N>::new(config, *bands)?.into())
            }
            PsfConfig::Gaussian {
                sigma_x,
                sigma_y,
                angle,
            } => {
                let sx: Spectral<T, N> = sigma_x.to_spectral("sigma_x")?;
                let sy = match sigma_y {
                    Some(sigma_y) => sigma_y.to_spectral("sigma_y")?,
                    None => sx,
                };
                Ok(GaussianPsf::elliptical(sx, sy, *angle)?.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::psf::{Pixel, PsfKind, PsfModel};
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn test_parse_airy_with_defaults() {
        let config = PsfConfig::from_json_str(
            r#"{"model": "airy_disk", "focal_length": 1.0,
                "aperture_diameter": 0.1, "pixel_size": [1e-5, 2e-5]}"#,
        )
        .unwrap();

        assert_eq!(
            config,
            PsfConfig::AiryDisk {
                focal_length: 1.0,
                aperture_diameter: 0.1,
                pixel_size: [1e-5, 2e-5],
                super_sampling: 10,
            }
        );

        let psf = config.build::<f32, 3>(&SpectralBands::rgb()).unwrap();
        match psf.model() {
            PsfKind::AiryDisk(airy) => {
                assert_relative_eq!(airy.config().pixel_size.y, 2e-5);
                assert_eq!(airy.supersample_step(), 10);
            }
            other => panic!("Expected Airy disk, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_gaussian_scalar_and_per_band() {
        let config = PsfConfig::from_json_str(
            r#"{"model": "gaussian", "sigma_x": [1.0, 2.0, 3.0], "sigma_y": 0.5, "angle": 45}"#,
        )
        .unwrap();
        let psf = config.build::<f64, 3>(&SpectralBands::rgb()).unwrap();
        match psf.model() {
            PsfKind::Gaussian(gaussian) => {
                assert_eq!(gaussian.sigma_x().values(), &[1.0, 2.0, 3.0]);
                assert_eq!(gaussian.sigma_y().values(), &[0.5, 0.5, 0.5]);
                assert_relative_eq!(gaussian.angle_deg(), 45.0);
            }
            other => panic!("Expected Gaussian, got {other:?}"),
        }
    }

    #[test]
    fn test_gaussian_sigma_y_defaults_to_sigma_x() {
        let config =
            PsfConfig::from_json_str(r#"{"model": "gaussian", "sigma_x": 2.0}"#).unwrap();
        let psf = config.build::<f64, 2>(&SpectralBands::uniform(400.0, 800.0)).unwrap();
        let peak = psf.evaluate(Pixel::new(0.0, 0.0));
        assert_relative_eq!(peak[0], 1.0 / (8.0 * std::f64::consts::PI), epsilon = 1e-12);
    }

    #[test]
    fn test_band_count_mismatch() {
        let config =
            PsfConfig::from_json_str(r#"{"model": "gaussian", "sigma_x": [1.0, 2.0]}"#).unwrap();
        let result = config.build::<f64, 3>(&SpectralBands::rgb());
        assert!(matches!(
            result,
            Err(ConfigError::BandCount {
                expected: 3,
                got: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_values_surface_psf_error() {
        let config = PsfConfig::AiryDisk {
            focal_length: 1.0,
            aperture_diameter: 0.0,
            pixel_size: [1e-5, 1e-5],
            super_sampling: 10,
        };
        assert!(matches!(
            config.build::<f64, 3>(&SpectralBands::rgb()),
            Err(ConfigError::Psf(PsfError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_unknown_model_rejected() {
        let result = PsfConfig::from_json_str(r#"{"model": "moffat", "beta": 2.5}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_round_trip_file() {
        let config = PsfConfig::Gaussian {
            sigma_x: SigmaSetting::Scalar(1.5),
            sigma_y: None,
            angle: 10.0,
        };

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_json_string().unwrap().as_bytes())
            .unwrap();

        let loaded = PsfConfig::load(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let result = PsfConfig::load(Path::new("/nonexistent/psf.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
