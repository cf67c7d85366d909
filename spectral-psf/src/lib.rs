//! Spectral point spread function engine
//!
//! This crate turns the optical response of a simulated camera into small
//! spectral kernels that can be splatted into a rendered frame for each point
//! source. It provides a diffraction-limited Airy disk model and an elliptical
//! Gaussian model, both evaluated independently per spectral band.

pub mod config;
pub mod hardware;
pub mod image_proc;
pub mod photometry;
pub mod psf;
pub mod shared_args;

// Re-exports for easier access
pub use config::{ConfigError, PsfConfig};
pub use hardware::{CameraOptics, PsfSelection};
pub use image_proc::{add_response_to_image, SpectralImage};
pub use photometry::{Band, Rgb, Spectral, SpectralBands};
pub use psf::{
    AiryDiskPsf, AiryDiskPsfConfig, GaussianPsf, Pixel, PointSpreadFunction, PsfError, PsfKind,
    PsfModel, DEFAULT_KERNEL_SIZES,
};
