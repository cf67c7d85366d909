//! Wavelength bands for spectral rendering
//!
//! A spectral value is a fixed-size vector of per-band intensities. This module
//! defines the bands themselves: each band covers a wavelength interval and is
//! represented by its center wavelength when a single wavelength is needed
//! (e.g. for diffraction calculations).

/// Conversion factor from nanometers to meters
pub const NM_TO_M: f64 = 1e-9;

/// A contiguous wavelength interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Lower wavelength bound in nanometers
    pub lower_nm: f64,

    /// Upper wavelength bound in nanometers
    pub upper_nm: f64,
}

impl Band {
    /// Create a new Band directly from lower and upper bounds
    ///
    /// # Arguments
    ///
    /// * `lower_nm` - Lower wavelength bound in nanometers
    /// * `upper_nm` - Upper wavelength bound in nanometers
    ///
    /// # Returns
    ///
    /// A new Band with the specified wavelength bounds
    pub fn from_nm_bounds(lower_nm: f64, upper_nm: f64) -> Self {
        // These are programming errors, so we don't return Result
        // but panic if the range is invalid
        if !lower_nm.is_finite() || !upper_nm.is_finite() {
            panic!("Wavelength range cannot contain non-finite values");
        }

        if lower_nm > upper_nm {
            panic!(
                "Invalid wavelength range: start must be less than end, got {}..{}",
                lower_nm, upper_nm,
            );
        }
        if lower_nm <= 0.0 {
            panic!("Wavelengths must be positive, got {}", lower_nm);
        }

        Self { lower_nm, upper_nm }
    }

    /// Create a zero-width band at a single wavelength
    pub fn monochromatic(wavelength_nm: f64) -> Self {
        Self::from_nm_bounds(wavelength_nm, wavelength_nm)
    }

    /// Get the width of the band in nanometers
    pub fn width(&self) -> f64 {
        self.upper_nm - self.lower_nm
    }

    /// Return the center of a band in nanometers
    pub fn center(&self) -> f64 {
        (self.lower_nm + self.upper_nm) / 2.0
    }
}

/// The wavelength table shared by every spectral value of a given shape.
///
/// Band `i` of a [`Spectral`](super::Spectral) value is tagged with
/// `bands[i]`. The table is fixed for the lifetime of whatever owns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralBands<const N: usize> {
    bands: [Band; N],
}

impl<const N: usize> SpectralBands<N> {
    /// Build a table from explicit bands
    pub fn from_bands(bands: [Band; N]) -> Self {
        Self { bands }
    }

    /// Build a table from center wavelengths, each a zero-width band
    pub fn from_wavelengths_nm(wavelengths_nm: [f64; N]) -> Self {
        Self {
            bands: wavelengths_nm.map(Band::monochromatic),
        }
    }

    /// Split `lower_nm..upper_nm` into N equal-width bands
    pub fn uniform(lower_nm: f64, upper_nm: f64) -> Self {
        let outer = Band::from_nm_bounds(lower_nm, upper_nm);
        let step = outer.width() / N as f64;
        Self {
            bands: std::array::from_fn(|i| {
                Band::from_nm_bounds(
                    lower_nm + step * i as f64,
                    lower_nm + step * (i + 1) as f64,
                )
            }),
        }
    }

    /// Number of bands
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn band(&self, index: usize) -> &Band {
        &self.bands[index]
    }

    pub fn bands(&self) -> &[Band; N] {
        &self.bands
    }

    /// Representative wavelength of band `index` in nanometers
    pub fn wavelength_nm(&self, index: usize) -> f64 {
        self.bands[index].center()
    }

    /// Representative wavelength of band `index` in meters
    pub fn wavelength_m(&self, index: usize) -> f64 {
        self.wavelength_nm(index) * NM_TO_M
    }

    pub fn wavelengths_nm(&self) -> [f64; N] {
        std::array::from_fn(|i| self.wavelength_nm(i))
    }
}

impl SpectralBands<3> {
    /// Red, green and blue bands, in that order
    pub fn rgb() -> Self {
        Self::from_bands([
            Band::from_nm_bounds(600.0, 750.0),
            Band::from_nm_bounds(500.0, 600.0),
            Band::from_nm_bounds(380.0, 500.0),
        ])
    }
}
