//! PSF kernel inspection tool
//!
//! Builds an RGB point spread function either from camera optics given on the
//! command line or from a JSON PSF config, initializes its kernel cache, and
//! reports the edge power of each kernel size along with the kernel chosen for
//! a point source of the given brightness. Optionally writes each band of the
//! chosen response as a PNG.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;
use spectral_psf::image_proc::band_to_gray_image;
use spectral_psf::image_proc::image::band_totals;
use spectral_psf::shared_args::{
    parse_pixel_size, KernelSizesArg, PsfModelArg, DEFAULT_KERNEL_SIZES_ARG,
};
use spectral_psf::{CameraOptics, PointSpreadFunction, PsfConfig, Rgb, SpectralBands};

const BAND_NAMES: [&str; 3] = ["red", "green", "blue"];

#[derive(Parser, Debug)]
#[command(
    name = "PSF Kernels",
    about = "Builds spectral PSF kernels and reports kernel size selection",
    long_about = None
)]
struct Args {
    /// JSON PSF config; overrides the optics arguments when given
    #[arg(long)]
    config: Option<PathBuf>,

    /// PSF model to derive from the optics
    #[arg(long, value_enum, default_value_t = PsfModelArg::AiryDisk)]
    model: PsfModelArg,

    /// Focal length in meters
    #[arg(long, default_value_t = 1.0)]
    focal_length: f64,

    /// Aperture diameter in meters
    #[arg(long, default_value_t = 0.1)]
    aperture: f64,

    /// Pixel size in meters, "x,y" or a single value for square pixels
    #[arg(long, value_parser = parse_pixel_size, default_value = "5e-6")]
    pixel_size: nalgebra::Vector2<f64>,

    /// Kernel sizes to build, odd and ascending
    #[arg(long, default_value = DEFAULT_KERNEL_SIZES_ARG)]
    kernel_sizes: KernelSizesArg,

    /// Received power of the point source (same value in every band)
    #[arg(long, default_value_t = 1e4)]
    power: f64,

    /// Power below which kernel edges are considered negligible
    #[arg(long, default_value_t = 1.0)]
    min_power: f64,

    /// Directory to write per-band PNGs of the chosen response
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn build_psf(
    args: &Args,
    bands: &SpectralBands<3>,
) -> anyhow::Result<PointSpreadFunction<f32, 3>> {
    if let Some(path) = &args.config {
        info!("Loading PSF config from {}", path.display());
        let config = PsfConfig::load(path)
            .with_context(|| format!("Loading PSF config {}", path.display()))?;
        return Ok(config.build(bands)?);
    }

    let optics = CameraOptics::new(args.focal_length, args.aperture, args.pixel_size);
    info!(
        "Optics: f = {} m, D = {} m (f/{:.1}), pixel {:?} m, model {}",
        optics.focal_length_m,
        optics.aperture_diameter_m,
        optics.f_number(),
        (optics.pixel_size_m.x, optics.pixel_size_m.y),
        args.model
    );

    optics
        .build_psf(args.model.into(), bands)?
        .ok_or_else(|| anyhow::anyhow!("No PSF model selected"))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let bands = SpectralBands::rgb();
    let psf = build_psf(&args, &bands)?;
    psf.init_kernels(&args.kernel_sizes.0)?;

    println!("Kernel edge maxima (normalized):");
    println!(
        "{:>6} {:>12} {:>12} {:>12}",
        "size", BAND_NAMES[0], BAND_NAMES[1], BAND_NAMES[2]
    );
    let sizes = psf.kernel_sizes().unwrap_or_default();
    let edges = psf.edge_max_values().unwrap_or_default();
    for (size, edge) in sizes.iter().zip(edges) {
        println!(
            "{:>6} {:>12.4e} {:>12.4e} {:>12.4e}",
            size, edge[0], edge[1], edge[2]
        );
    }
    println!();

    let power = Rgb::splat(args.power as f32);
    let response = psf.get_response(&power, args.min_power);
    let totals = band_totals(&response);
    println!(
        "Source power {:.3e}, minimum power {:.3e}: using {}x{} kernel",
        args.power,
        args.min_power,
        response.dim().0,
        response.dim().1
    );
    println!(
        "Captured power per band: {:.3e} / {:.3e} / {:.3e}",
        totals[0], totals[1], totals[2]
    );

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Creating output directory {}", dir.display()))?;
        for (band, name) in BAND_NAMES.iter().enumerate() {
            let path = dir.join(format!("psf_response_{name}.png"));
            band_to_gray_image(&response, band)
                .save(&path)
                .with_context(|| format!("Writing {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
    }

    Ok(())
}
