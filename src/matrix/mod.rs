//! Dense, fixed-dimension matrix container and the scalar reference loops.
//!
//! `Matrix<T, R, C>` carries its shape in the type, so multiplying an
//! `M×K` matrix by anything other than a `K×N` matrix is a compile error
//! rather than an out-of-bounds access.

pub mod element;
pub mod naive;

use std::fmt;
use std::ops::{Index, IndexMut};

use rand::distributions::{Distribution, Uniform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::EngineConfig;
use crate::error::{MatmulError, Result};
use crate::strategy::{self, MultType};

pub use element::{DataType, Element};

/// Seed used by [`Matrix::random_fill_default`].
pub const DEFAULT_SEED: u64 = 1;

/// Lower bound used by [`Matrix::random_fill_default`].
pub const DEFAULT_FILL_MIN: u8 = 0;

/// Upper bound (inclusive) used by [`Matrix::random_fill_default`].
pub const DEFAULT_FILL_MAX: u8 = 100;

/// Row-major dense matrix with `R` rows and `C` columns.
///
/// Storage always holds exactly `R * C` elements and element `(i, j)`
/// lives at `i * C + j`. Both dimensions must exceed 1; a `Matrix` with a
/// degenerate dimension fails to compile when constructed.
///
/// # Example
///
/// ```
/// use matbench::{Matrix, MultType};
///
/// let mut a = Matrix::<i32, 4, 4>::new();
/// let mut b = Matrix::<i32, 4, 4>::new();
/// a.random_fill(0, 100, 1);
/// b.random_fill(0, 100, 1);
///
/// let naive = a.mult(&b, MultType::Naive).unwrap();
/// let simd = a.mult(&b, MultType::Simd).unwrap();
/// assert_eq!(naive, simd);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T, const R: usize, const C: usize> {
    data: Vec<T>,
}

impl<T: Element, const R: usize, const C: usize> Matrix<T, R, C> {
    pub const ROWS: usize = R;
    pub const COLUMNS: usize = C;
    pub const SIZE: usize = R * C;

    const VALID_DIMS: () = assert!(R > 1 && C > 1, "matrix dimensions must both exceed 1");

    /// Zero-filled matrix.
    pub fn new() -> Self {
        Self::filled(T::default())
    }

    /// Matrix with every element set to `value`.
    pub fn filled(value: T) -> Self {
        let () = Self::VALID_DIMS;
        Self {
            data: vec![value; R * C],
        }
    }

    /// Wraps row-major `data`, which must hold exactly `R * C` elements.
    pub fn from_vec(data: Vec<T>) -> Result<Self> {
        let () = Self::VALID_DIMS;
        if data.len() != R * C {
            return Err(MatmulError::DimensionMismatch {
                operand: "matrix",
                expected: R * C,
                actual: data.len(),
            });
        }
        Ok(Self { data })
    }

    /// Fills every element uniformly from `[min, max]` using `rng`.
    ///
    /// Integral types draw from an integer distribution, floating-point
    /// types from a real one.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`, or if `max - min` is too wide for the
    /// floating-point sampler (e.g. `f32::MIN..=f32::MAX`).
    pub fn random_fill_with<G: Rng + ?Sized>(&mut self, rng: &mut G, min: T, max: T) {
        assert!(min <= max, "random_fill: min {} exceeds max {}", min, max);
        assert!(
            max.to_f64() - min.to_f64() <= T::FILL_SPAN_MAX,
            "random_fill: range {}..={} overflows {}",
            min,
            max,
            T::DATA_TYPE
        );
        let dist = Uniform::new_inclusive(min, max);
        for value in &mut self.data {
            *value = dist.sample(rng);
        }
    }

    /// Fills every element uniformly from `[min, max]` with a fresh
    /// generator seeded by `seed`.
    ///
    /// Two matrices filled with the same seed and range are identical.
    pub fn random_fill(&mut self, min: T, max: T, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.random_fill_with(&mut rng, min, max);
    }

    /// Fills from `[0, 100]` with the given seed.
    pub fn random_fill_seeded(&mut self, seed: u64) {
        self.random_fill(
            T::from_u8(DEFAULT_FILL_MIN),
            T::from_u8(DEFAULT_FILL_MAX),
            seed,
        );
    }

    /// Fills from `[0, 100]` with [`DEFAULT_SEED`].
    pub fn random_fill_default(&mut self) {
        self.random_fill_seeded(DEFAULT_SEED);
    }

    /// Multiplies `self` (R × C) by `other` (C × N) with the chosen strategy.
    ///
    /// Operands are never mutated; the product is a newly allocated matrix.
    /// Uses [`EngineConfig::default`] for kernel paths and thread count.
    ///
    /// Inner dimensions are checked at compile time:
    ///
    /// ```compile_fail
    /// use matbench::{Matrix, MultType};
    ///
    /// let a = Matrix::<i32, 2, 3>::new();
    /// let b = Matrix::<i32, 2, 3>::new();
    /// let _ = a.mult(&b, MultType::Naive);
    /// ```
    pub fn mult<const N: usize>(
        &self,
        other: &Matrix<T, C, N>,
        mult: MultType,
    ) -> Result<Matrix<T, R, N>> {
        self.mult_with(other, mult, &EngineConfig::default())
    }

    /// Same as [`Matrix::mult`] with an explicit configuration.
    pub fn mult_with<const N: usize>(
        &self,
        other: &Matrix<T, C, N>,
        mult: MultType,
        config: &EngineConfig,
    ) -> Result<Matrix<T, R, N>> {
        let data = strategy::multiply_slices(mult, &self.data, &other.data, R, N, C, config)?;
        Matrix::from_vec(data)
    }

    /// Largest absolute elementwise difference, for tolerance checks.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.data
            .iter()
            .zip(&other.data)
            .map(|(&x, &y)| (x.to_f64() - y.to_f64()).abs())
            .fold(0.0, f64::max)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T: Element, const R: usize, const C: usize> Default for Matrix<T, R, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// `(row, col)` access. Maps to `row * C + col` without checking `col < C`.
impl<T, const R: usize, const C: usize> Index<(usize, usize)> for Matrix<T, R, C> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row * C + col]
    }
}

impl<T, const R: usize, const C: usize> IndexMut<(usize, usize)> for Matrix<T, R, C> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[row * C + col]
    }
}

/// Linear access into row-major storage.
impl<T, const R: usize, const C: usize> Index<usize> for Matrix<T, R, C> {
    type Output = T;

    #[inline]
    fn index(&self, idx: usize) -> &T {
        &self.data[idx]
    }
}

impl<T, const R: usize, const C: usize> IndexMut<usize> for Matrix<T, R, C> {
    #[inline]
    fn index_mut(&mut self, idx: usize) -> &mut T {
        &mut self.data[idx]
    }
}

/// Whitespace-separated rows, one row per line.
impl<T: fmt::Display, const R: usize, const C: usize> fmt::Display for Matrix<T, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.data.chunks(C).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero_filled() {
        let m = Matrix::<f32, 3, 5>::new();
        assert_eq!(m.as_slice().len(), 15);
        assert!(m.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_filled_and_indexing() {
        let mut m = Matrix::<i32, 2, 3>::filled(7);
        m[(1, 2)] = 9;
        assert_eq!(m[(0, 0)], 7);
        assert_eq!(m[(1, 2)], 9);
        assert_eq!(m[5], 9);
        m[0] = -1;
        assert_eq!(m[(0, 0)], -1);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Matrix::<u32, 2, 2>::from_vec(vec![1, 2, 3, 4]).is_ok());
        let err = Matrix::<u32, 2, 2>::from_vec(vec![1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            MatmulError::DimensionMismatch {
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_random_fill_is_deterministic() {
        let mut a = Matrix::<i32, 16, 16>::new();
        let mut b = Matrix::<i32, 16, 16>::new();
        a.random_fill(0, 100, 1);
        b.random_fill(0, 100, 1);
        assert_eq!(a, b);

        let mut c = Matrix::<i32, 16, 16>::new();
        c.random_fill(0, 100, 2);
        assert_ne!(a, c);
    }

    #[test]
    fn test_random_fill_default_matches_seed_one() {
        let mut a = Matrix::<f64, 8, 8>::new();
        let mut b = Matrix::<f64, 8, 8>::new();
        a.random_fill_default();
        b.random_fill(0.0, 100.0, DEFAULT_SEED);
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_fill_respects_range() {
        let mut m = Matrix::<u32, 32, 32>::new();
        m.random_fill(10, 20, 42);
        assert!(m.as_slice().iter().all(|&x| (10..=20).contains(&x)));

        let mut f = Matrix::<f32, 32, 32>::new();
        f.random_fill(-1.0, 1.0, 42);
        assert!(f.as_slice().iter().all(|&x| (-1.0..=1.0).contains(&x)));
    }

    #[test]
    #[should_panic(expected = "exceeds max")]
    fn test_random_fill_rejects_inverted_range() {
        let mut m = Matrix::<i32, 2, 2>::new();
        m.random_fill(5, 1, 0);
    }

    #[test]
    #[should_panic(expected = "random_fill: range")]
    fn test_random_fill_rejects_float_overflow() {
        let mut m = Matrix::<f32, 2, 2>::new();
        m.random_fill(f32::MIN, f32::MAX, 1);
    }

    #[test]
    fn test_random_fill_full_integer_range() {
        let mut m = Matrix::<i32, 4, 4>::new();
        m.random_fill(i32::MIN, i32::MAX, 1);
        let mut f = Matrix::<f64, 4, 4>::new();
        f.random_fill(-1e300, 1e300, 1);
        assert!(f.as_slice().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_display_rows() {
        let m = Matrix::<i32, 2, 3>::from_vec(vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(m.to_string(), "1 2 3\n4 5 6");
    }

    #[test]
    fn test_mult_rectangular() {
        let a = Matrix::<i32, 2, 3>::from_vec(vec![1, 2, 3, 4, 5, 6]).unwrap();
        let b = Matrix::<i32, 3, 2>::from_vec(vec![7, 8, 9, 10, 11, 12]).unwrap();
        let c = a.mult(&b, MultType::Naive).unwrap();
        assert_eq!(c.as_slice(), &[58, 64, 139, 154]);
    }

    #[test]
    fn test_mult_leaves_operands_untouched() {
        let mut a = Matrix::<f32, 4, 4>::new();
        a.random_fill_default();
        let before = a.clone();
        let _ = a.mult(&before, MultType::MultithreadRow).unwrap();
        assert_eq!(a, before);
    }
}
