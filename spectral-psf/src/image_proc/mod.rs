//! Image processing module for spectral PSF kernels
//!
//! Spectral image storage plus the handful of operations kernels need:
//! normalization, border statistics, box downsampling, and compositing into a
//! larger frame.

pub mod image;

pub use image::{
    add_response_to_image, band_to_gray_image, box_downsample, edge_max, normalize_bands,
    SpectralImage,
};
