use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Vector2;
use spectral_psf::{
    AiryDiskPsf, AiryDiskPsfConfig, GaussianPsf, PointSpreadFunction, Rgb, SpectralBands,
    DEFAULT_KERNEL_SIZES,
};

fn gaussian_psf() -> PointSpreadFunction<f32, 3> {
    GaussianPsf::from_scalars(1.5, 1.5, 0.0)
        .expect("valid Gaussian")
        .into()
}

fn airy_psf() -> PointSpreadFunction<f32, 3> {
    let config = AiryDiskPsfConfig::new(1.0, 0.1, Vector2::new(5e-6, 5e-6));
    AiryDiskPsf::new(config, SpectralBands::rgb())
        .expect("valid Airy disk")
        .into()
}

fn bench_make_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("make_kernel");
    let gaussian = gaussian_psf();
    let airy = airy_psf();

    for size in [9usize, 27] {
        group.bench_with_input(BenchmarkId::new("gaussian", size), &size, |b, &size| {
            b.iter(|| gaussian.make_kernel(black_box(size), 0))
        });
        group.bench_with_input(BenchmarkId::new("airy", size), &size, |b, &size| {
            b.iter(|| airy.make_kernel(black_box(size), 0))
        });
    }

    group.finish();
}

fn bench_init_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("init_kernels");
    group.sample_size(10);

    group.bench_function("gaussian_default_sizes", |b| {
        b.iter(|| {
            let psf = gaussian_psf();
            psf.init_kernels(&DEFAULT_KERNEL_SIZES).expect("valid sizes");
            psf
        })
    });
    group.bench_function("airy_default_sizes", |b| {
        b.iter(|| {
            let psf = airy_psf();
            psf.init_kernels(&DEFAULT_KERNEL_SIZES).expect("valid sizes");
            psf
        })
    });

    group.finish();
}

fn bench_get_response(c: &mut Criterion) {
    let psf = airy_psf();
    psf.init_kernels(&DEFAULT_KERNEL_SIZES).expect("valid sizes");
    let power = Rgb::splat(1e5);

    c.bench_function("get_response_airy", |b| {
        b.iter(|| psf.get_response(black_box(&power), black_box(1.0)))
    });
}

criterion_group!(
    benches,
    bench_make_kernel,
    bench_init_kernels,
    bench_get_response
);
criterion_main!(benches);
