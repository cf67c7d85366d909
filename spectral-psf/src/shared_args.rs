//! Command line argument types shared by the PSF tools

use clap::ValueEnum;
use nalgebra::Vector2;

use crate::hardware::PsfSelection;
use crate::psf::DEFAULT_KERNEL_SIZES;

/// Parse a pixel size string in format "x,y" (meters), or a single value for
/// square pixels
pub fn parse_pixel_size(s: &str) -> Result<Vector2<f64>, String> {
    let parts: Vec<&str> = s.split(',').collect();
    let values = parts
        .iter()
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("Invalid pixel size value: {}", part.trim()))
        })
        .collect::<Result<Vec<f64>, String>>()?;

    let size = match values.as_slice() {
        [pitch] => Vector2::new(*pitch, *pitch),
        [x, y] => Vector2::new(*x, *y),
        _ => return Err("Pixel size must be in format 'x,y' or a single value".to_string()),
    };

    if size.x <= 0.0 || size.y <= 0.0 || !size.x.is_finite() || !size.y.is_finite() {
        return Err(format!("Pixel size must be positive, got {},{}", size.x, size.y));
    }

    Ok(size)
}

/// Parse a comma separated list of odd, ascending kernel sizes, e.g. "3,9,27"
pub fn parse_kernel_sizes(s: &str) -> Result<Vec<usize>, String> {
    let sizes = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("Invalid kernel size: {}", part.trim()))
        })
        .collect::<Result<Vec<usize>, String>>()?;

    if sizes.iter().any(|size| size % 2 == 0) {
        // Also rejects 0
        return Err("Kernel sizes must be odd".to_string());
    }
    if sizes.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err("Kernel sizes must be strictly ascending".to_string());
    }

    Ok(sizes)
}

/// Default kernel sizes for command line defaults, matching `DEFAULT_KERNEL_SIZES`
pub const DEFAULT_KERNEL_SIZES_ARG: &str = "3,9,27,81";

/// Wrapper for a kernel size list that implements FromStr for clap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSizesArg(pub Vec<usize>);

impl std::str::FromStr for KernelSizesArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_kernel_sizes(s).map(KernelSizesArg)
    }
}

impl std::fmt::Display for KernelSizesArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sizes: Vec<String> = self.0.iter().map(|size| size.to_string()).collect();
        write!(f, "{}", sizes.join(","))
    }
}

impl Default for KernelSizesArg {
    fn default() -> Self {
        KernelSizesArg(DEFAULT_KERNEL_SIZES.to_vec())
    }
}

/// Available PSF models for selection
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PsfModelArg {
    /// Diffraction-limited Airy disk - Default
    AiryDisk,
    /// Gaussian fit to the Airy core
    Gaussian,
}

impl std::fmt::Display for PsfModelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PsfModelArg::AiryDisk => write!(f, "airy-disk"),
            PsfModelArg::Gaussian => write!(f, "gaussian"),
        }
    }
}

impl From<PsfModelArg> for PsfSelection {
    fn from(arg: PsfModelArg) -> Self {
        match arg {
            PsfModelArg::AiryDisk => PsfSelection::AiryDisk,
            PsfModelArg::Gaussian => PsfSelection::Gaussian,
        }
    }
}
