//! Fixed-size spectral values
//!
//! [`Spectral`] stores one intensity per band. The wavelength of each band is
//! held by a [`SpectralBands`](super::SpectralBands) table owned by whoever
//! produces the values, so two values with the same `N` from the same owner
//! always share a wavelength set.
//!
//! Arithmetic between spectral values is elementwise; arithmetic with a scalar
//! applies to every band.

use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, MulAssign, Neg, Sub};

use num_traits::{Float, Zero};

/// Narrow an `f64` into the storage precision `T`.
///
/// Every `Float` implementor can represent an `f64` (possibly rounded), so the
/// NaN fallback is unreachable for `f32`/`f64`.
pub fn cast<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

/// Widen a storage value to `f64` for internal arithmetic.
pub fn widen<T: Float>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Per-band intensities for N spectral bands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spectral<T, const N: usize> {
    values: [T; N],
}

/// Single-precision RGB spectral value
pub type Rgb = Spectral<f32, 3>;

impl<T: Float, const N: usize> Spectral<T, N> {
    pub fn new(values: [T; N]) -> Self {
        Self { values }
    }

    /// Same value in every band
    pub fn splat(value: T) -> Self {
        Self { values: [value; N] }
    }

    pub fn zeros() -> Self {
        Self::splat(T::zero())
    }

    pub fn ones() -> Self {
        Self::splat(T::one())
    }

    pub fn from_fn<F: FnMut(usize) -> T>(f: F) -> Self {
        Self {
            values: std::array::from_fn(f),
        }
    }

    /// Build from per-band `f64` results, narrowing to storage precision
    pub fn from_f64_fn<F: FnMut(usize) -> f64>(mut f: F) -> Self {
        Self::from_fn(|i| cast(f(i)))
    }

    pub fn values(&self) -> &[T; N] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    pub fn map<F: FnMut(T) -> T>(&self, f: F) -> Self {
        Self {
            values: self.values.map(f),
        }
    }

    /// Elementwise combination of two spectral values
    pub fn zip_map<F: FnMut(T, T) -> T>(&self, other: &Self, mut f: F) -> Self {
        Self::from_fn(|i| f(self.values[i], other.values[i]))
    }

    /// Elementwise square
    pub fn square(&self) -> Self {
        self.map(|v| v * v)
    }

    pub fn exp(&self) -> Self {
        self.map(Float::exp)
    }

    /// Largest band value, or `-inf` for a zero-band value
    pub fn max_value(&self) -> T {
        self.values.iter().copied().fold(T::neg_infinity(), T::max)
    }

    /// Elementwise maximum of two spectral values
    pub fn max(&self, other: &Self) -> Self {
        self.zip_map(other, T::max)
    }

    pub fn sum(&self) -> T {
        self.values.iter().copied().fold(T::zero(), |acc, v| acc + v)
    }

    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    pub fn has_nan(&self) -> bool {
        self.values.iter().any(|v| v.is_nan())
    }
}

impl<T: Float, const N: usize> Default for Spectral<T, N> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T: Float, const N: usize> From<[T; N]> for Spectral<T, N> {
    fn from(values: [T; N]) -> Self {
        Self::new(values)
    }
}

impl<T, const N: usize> Index<usize> for Spectral<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.values[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for Spectral<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.values[index]
    }
}

impl<T: Float, const N: usize> Add for Spectral<T, N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip_map(&rhs, |a, b| a + b)
    }
}

impl<T: Float, const N: usize> Sub for Spectral<T, N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip_map(&rhs, |a, b| a - b)
    }
}

impl<T: Float, const N: usize> Mul for Spectral<T, N> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.zip_map(&rhs, |a, b| a * b)
    }
}

impl<T: Float, const N: usize> Div for Spectral<T, N> {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self.zip_map(&rhs, |a, b| a / b)
    }
}

impl<T: Float, const N: usize> Mul<T> for Spectral<T, N> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        self.map(|v| v * rhs)
    }
}

impl<T: Float, const N: usize> Div<T> for Spectral<T, N> {
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        self.map(|v| v / rhs)
    }
}

impl<T: Float, const N: usize> Neg for Spectral<T, N> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|v| -v)
    }
}

impl<T: Float, const N: usize> AddAssign for Spectral<T, N> {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.values.iter_mut().zip(rhs.values) {
            *a = *a + b;
        }
    }
}

impl<T: Float, const N: usize> MulAssign for Spectral<T, N> {
    fn mul_assign(&mut self, rhs: Self) {
        for (a, b) in self.values.iter_mut().zip(rhs.values) {
            *a = *a * b;
        }
    }
}

impl<T: Float, const N: usize> MulAssign<T> for Spectral<T, N> {
    fn mul_assign(&mut self, rhs: T) {
        for a in self.values.iter_mut() {
            *a = *a * rhs;
        }
    }
}

// Lets ndarray build zero-filled spectral images and sum over them
impl<T: Float, const N: usize> Zero for Spectral<T, N> {
    fn zero() -> Self {
        Self::zeros()
    }

    fn is_zero(&self) -> bool {
        self.values.iter().all(|v| v.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_elementwise_arithmetic() {
        let a = Spectral::new([1.0_f64, 2.0, 3.0]);
        let b = Spectral::new([2.0_f64, 4.0, 6.0]);

        assert_eq!((a + b).values(), &[3.0, 6.0, 9.0]);
        assert_eq!((b - a).values(), &[1.0, 2.0, 3.0]);
        assert_eq!((a * b).values(), &[2.0, 8.0, 18.0]);
        assert_eq!((b / a).values(), &[2.0, 2.0, 2.0]);
        assert_eq!((a * 2.0).values(), &[2.0, 4.0, 6.0]);
        assert_eq!((-a).values(), &[-1.0, -2.0, -3.0]);
    }

    #[test]
    fn test_square_and_reductions() {
        let a = Spectral::new([-2.0_f32, 0.5, 3.0]);
        assert_eq!(a.square().values(), &[4.0, 0.25, 9.0]);
        assert_eq!(a.max_value(), 3.0);
        assert_relative_eq!(a.sum(), 1.5);
    }

    #[test]
    fn test_assign_ops() {
        let mut a = Rgb::ones();
        a += Rgb::splat(2.0);
        assert_eq!(a.values(), &[3.0, 3.0, 3.0]);
        a *= Rgb::new([1.0, 2.0, 3.0]);
        assert_eq!(a.values(), &[3.0, 6.0, 9.0]);
        a *= 0.5;
        assert_eq!(a.values(), &[1.5, 3.0, 4.5]);
    }

    #[test]
    fn test_from_f64_narrows() {
        let s: Spectral<f32, 2> = Spectral::from_f64_fn(|i| 0.1 * (i + 1) as f64);
        assert_relative_eq!(s[0], 0.1_f32);
        assert_relative_eq!(s[1], 0.2_f32);
    }

    #[test]
    fn test_zero_trait() {
        assert!(Spectral::<f64, 4>::zero().is_zero());
        assert!(!Spectral::<f64, 4>::ones().is_zero());
    }

    #[test]
    fn test_finite_checks() {
        let s = Spectral::new([1.0_f64, f64::NAN]);
        assert!(s.has_nan());
        assert!(!s.is_finite());
        assert!(Spectral::<f64, 2>::ones().is_finite());
    }
}
