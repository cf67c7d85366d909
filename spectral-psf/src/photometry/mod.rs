//! Spectral value types and wavelength bands

pub mod spectral;
pub mod spectrum;

pub use spectral::{Rgb, Spectral};
pub use spectrum::{Band, SpectralBands};
