//! Point spread function evaluation and kernel generation
//!
//! A PSF model maps a pixel offset from the optical center to a spectral
//! response. [`PointSpreadFunction`] wraps a model and turns it into
//! discretized kernels of a few fixed sizes, picking the smallest one that
//! still holds the significant energy of a source at a given brightness.
//!
//! # Kernel cache
//!
//! Kernels are built once, on the first request, and kept for the lifetime of
//! the PSF. The cache is a [`OnceLock`], so a PSF can be shared between render
//! threads before any kernel has been requested; exactly one thread builds the
//! kernels and the rest wait for it.
//!
//! # Example
//!
//! ```
//! use spectral_psf::photometry::Spectral;
//! use spectral_psf::psf::{GaussianPsf, PointSpreadFunction};
//!
//! let gaussian = GaussianPsf::<f64, 3>::from_scalars(1.5, 1.5, 0.0).unwrap();
//! let psf: PointSpreadFunction<f64, 3> = gaussian.into();
//!
//! let power = Spectral::splat(1000.0);
//! let response = psf.get_response(&power, 0.01);
//! assert_eq!(response.dim().0 % 2, 1);
//! ```

pub mod airy;
pub mod gaussian;

use std::sync::OnceLock;

use log::{debug, info, warn};
use nalgebra::Vector2;
use ndarray::Axis;
use num_traits::Float;
use rayon::prelude::*;
use thiserror::Error;

use crate::image_proc::image::{box_downsample, edge_max, normalize_bands, scale_by};
use crate::image_proc::SpectralImage;
use crate::photometry::spectral::widen;
use crate::photometry::Spectral;

pub use airy::{AiryDiskPsf, AiryDiskPsfConfig};
pub use gaussian::GaussianPsf;

/// Offset from the PSF center in pixel units, `(x, y)`
pub type Pixel = Vector2<f64>;

/// Kernel sizes built when a kernel is first requested
pub const DEFAULT_KERNEL_SIZES: [usize; 4] = [3, 9, 27, 81];

/// Errors raised while configuring a PSF or building its kernels
#[derive(Debug, Error)]
pub enum PsfError {
    #[error("Invalid PSF configuration: {0}")]
    InvalidConfig(String),

    #[error("Kernel size must be odd and at least 1, got {0}")]
    InvalidKernelSize(usize),

    #[error("Kernel sizes must be strictly ascending")]
    KernelSizesNotAscending,

    #[error("At least one kernel size is required")]
    EmptyKernelSizes,
}

/// A continuous PSF response
///
/// Implementors must be pure: `evaluate` is called concurrently from kernel
/// generation and must return the same value for the same point. It must be
/// defined at the origin.
pub trait PsfModel<T: Float, const N: usize>: Send + Sync {
    /// Response at `point`, an offset from the PSF center in pixels
    fn evaluate(&self, point: Pixel) -> Spectral<T, N>;

    /// Supersampling factor used by `make_kernel` when none is given
    fn supersample_step(&self) -> usize {
        1
    }
}

/// The PSF models this crate provides
#[derive(Debug, Clone)]
pub enum PsfKind<T, const N: usize> {
    Gaussian(GaussianPsf<T, N>),
    AiryDisk(AiryDiskPsf<T, N>),
}

impl<T: Float + Send + Sync, const N: usize> PsfModel<T, N> for PsfKind<T, N> {
    fn evaluate(&self, point: Pixel) -> Spectral<T, N> {
        match self {
            PsfKind::Gaussian(psf) => psf.evaluate(point),
            PsfKind::AiryDisk(psf) => psf.evaluate(point),
        }
    }

    fn supersample_step(&self) -> usize {
        match self {
            PsfKind::Gaussian(psf) => psf.supersample_step(),
            PsfKind::AiryDisk(psf) => psf.supersample_step(),
        }
    }
}

impl<T, const N: usize> From<GaussianPsf<T, N>> for PsfKind<T, N> {
    fn from(psf: GaussianPsf<T, N>) -> Self {
        PsfKind::Gaussian(psf)
    }
}

impl<T, const N: usize> From<AiryDiskPsf<T, N>> for PsfKind<T, N> {
    fn from(psf: AiryDiskPsf<T, N>) -> Self {
        PsfKind::AiryDisk(psf)
    }
}

/// Normalized kernels of increasing size, with the border maximum of each
#[derive(Debug, Clone)]
struct KernelSet<T, const N: usize> {
    sizes: Vec<usize>,
    kernels: Vec<SpectralImage<T, N>>,
    edge_max_values: Vec<Spectral<T, N>>,
}

/// A PSF model plus its lazily built kernel cache
#[derive(Debug)]
pub struct PointSpreadFunction<T, const N: usize, M = PsfKind<T, N>> {
    model: M,
    kernels: OnceLock<KernelSet<T, N>>,
}

impl<T, const N: usize> From<GaussianPsf<T, N>> for PointSpreadFunction<T, N> {
    fn from(psf: GaussianPsf<T, N>) -> Self {
        Self::new(PsfKind::Gaussian(psf))
    }
}

impl<T, const N: usize> From<AiryDiskPsf<T, N>> for PointSpreadFunction<T, N> {
    fn from(psf: AiryDiskPsf<T, N>) -> Self {
        Self::new(PsfKind::AiryDisk(psf))
    }
}

impl<T, const N: usize, M> PointSpreadFunction<T, N, M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            kernels: OnceLock::new(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// True once `init_kernels` has run (explicitly or via `get_kernel`)
    pub fn is_initialized(&self) -> bool {
        self.kernels.get().is_some()
    }

    /// Sizes of the cached kernels, ascending
    pub fn kernel_sizes(&self) -> Option<&[usize]> {
        self.kernels.get().map(|set| set.sizes.as_slice())
    }

    /// Per-band border maximum of each cached kernel, parallel to `kernel_sizes`
    pub fn edge_max_values(&self) -> Option<&[Spectral<T, N>]> {
        self.kernels.get().map(|set| set.edge_max_values.as_slice())
    }
}

impl<T, const N: usize, M> PointSpreadFunction<T, N, M>
where
    T: Float + Send + Sync,
    M: PsfModel<T, N>,
{
    /// Response of the underlying model at `point`
    pub fn evaluate(&self, point: Pixel) -> Spectral<T, N> {
        self.model.evaluate(point)
    }

    /// Build an unnormalized square kernel of side `kernel_size`.
    ///
    /// Each pixel holds the box average of the PSF over `s × s` sub-pixel
    /// samples, where `s` is `supersample_factor`, or the model's own step
    /// when `supersample_factor` is 0.
    ///
    /// # Errors
    /// `PsfError::InvalidKernelSize` if `kernel_size` is zero or even.
    pub fn make_kernel(
        &self,
        kernel_size: usize,
        supersample_factor: usize,
    ) -> Result<SpectralImage<T, N>, PsfError> {
        validate_kernel_size(kernel_size)?;
        let step = if supersample_factor == 0 {
            self.model.supersample_step()
        } else {
            supersample_factor
        };
        Ok(self.sample_kernel(kernel_size, step))
    }

    fn sample_kernel(&self, kernel_size: usize, step: usize) -> SpectralImage<T, N> {
        let step = step.max(1);
        let half = (kernel_size - 1) as f64 / 2.0;
        let inv_step = 1.0 / step as f64;
        let fine_size = kernel_size * step;

        let mut fine = SpectralImage::<T, N>::zeros((fine_size, fine_size));
        fine.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, mut line)| {
                let y = (row as f64 + 0.5) * inv_step - 0.5 - half;
                for (col, value) in line.iter_mut().enumerate() {
                    let x = (col as f64 + 0.5) * inv_step - 0.5 - half;
                    *value = self.model.evaluate(Pixel::new(x, y));
                }
            });

        box_downsample(&fine, step)
    }

    /// Build and cache normalized kernels for each of `kernel_sizes`.
    ///
    /// Sizes must be odd and strictly ascending. Does nothing once the cache
    /// has been built, whichever sizes were used then.
    pub fn init_kernels(&self, kernel_sizes: &[usize]) -> Result<(), PsfError> {
        if self.is_initialized() {
            return Ok(());
        }
        validate_kernel_sizes(kernel_sizes)?;
        self.kernels.get_or_init(|| self.build_kernel_set(kernel_sizes));
        Ok(())
    }

    fn build_kernel_set(&self, kernel_sizes: &[usize]) -> KernelSet<T, N> {
        let step = self.model.supersample_step();
        let mut set = KernelSet {
            sizes: Vec::with_capacity(kernel_sizes.len()),
            kernels: Vec::with_capacity(kernel_sizes.len()),
            edge_max_values: Vec::with_capacity(kernel_sizes.len()),
        };

        for &size in kernel_sizes {
            let mut kernel = self.sample_kernel(size, step);
            normalize_bands(&mut kernel);
            let edge = edge_max(&kernel);
            debug!(
                "Built {size}x{size} PSF kernel (supersample {step}), edge max {:?}",
                (*edge.values()).map(widen)
            );

            set.sizes.push(size);
            set.kernels.push(kernel);
            set.edge_max_values.push(edge);
        }

        info!("Initialized PSF kernel cache with sizes {:?}", set.sizes);
        set
    }

    fn kernel_set(&self) -> &KernelSet<T, N> {
        self.kernels
            .get_or_init(|| self.build_kernel_set(&DEFAULT_KERNEL_SIZES))
    }

    /// Smallest cached kernel whose border, scaled by `received_power`, stays
    /// below `minimum_power` in every band.
    ///
    /// Falls back to the largest kernel when none qualifies. Builds the
    /// default kernel sizes on first use.
    pub fn get_kernel(
        &self,
        received_power: &Spectral<T, N>,
        minimum_power: f64,
    ) -> &SpectralImage<T, N> {
        let set = self.kernel_set();

        let index = set
            .edge_max_values
            .iter()
            .position(|edge| widen((*edge * *received_power).max_value()) < minimum_power)
            .unwrap_or_else(|| {
                if minimum_power > 0.0 {
                    warn!(
                        "No PSF kernel keeps edge power below {minimum_power}; using largest ({})",
                        set.sizes[set.sizes.len() - 1]
                    );
                }
                set.kernels.len() - 1
            });

        &set.kernels[index]
    }

    /// The kernel chosen by `get_kernel`, scaled per band by `received_power`
    pub fn get_response(
        &self,
        received_power: &Spectral<T, N>,
        minimum_power: f64,
    ) -> SpectralImage<T, N> {
        scale_by(
            self.get_kernel(received_power, minimum_power),
            received_power,
        )
    }
}

fn validate_kernel_size(kernel_size: usize) -> Result<(), PsfError> {
    if kernel_size == 0 || kernel_size % 2 == 0 {
        return Err(PsfError::InvalidKernelSize(kernel_size));
    }
    Ok(())
}

fn validate_kernel_sizes(kernel_sizes: &[usize]) -> Result<(), PsfError> {
    if kernel_sizes.is_empty() {
        return Err(PsfError::EmptyKernelSizes);
    }
    for &size in kernel_sizes {
        validate_kernel_size(size)?;
    }
    if kernel_sizes.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(PsfError::KernelSizesNotAscending);
    }
    Ok(())
}
