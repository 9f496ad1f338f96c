// src/core/matrix.rs

use super::error::{ChronoError, Result};
use num_complex::Complex;
use num_traits::{One, Zero};
use std::fmt;

/// Dense square complex matrix acting on `log2(dim)` qubits, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    dim: usize,
    data: Vec<Complex<f64>>,
}

impl Matrix {
    /// Identity of the given dimension.
    pub fn identity(dim: usize) -> Self {
        let mut data: Vec<Complex<f64>> = vec![Complex::zero(); dim * dim];
        for i in 0..dim {
            data[i * dim + i] = Complex::one();
        }
        Self { dim, data }
    }

    /// Builds a matrix from rows. Every row must have as many entries as
    /// there are rows, and that count must be a power of two.
    pub fn from_rows(rows: Vec<Vec<Complex<f64>>>) -> Result<Self> {
        let dim = rows.len();
        if dim == 0 || !dim.is_power_of_two() {
            return Err(ChronoError::InvalidOperation {
                message: format!("Matrix dimension {} is not a non-zero power of two", dim),
            });
        }
        let mut data = Vec::with_capacity(dim * dim);
        for row in rows {
            if row.len() != dim {
                return Err(ChronoError::DimensionMismatch { expected: dim, actual: row.len() });
            }
            data.extend(row);
        }
        Ok(Self { dim, data })
    }

    /// Householder reflection mapping `|0...0>` onto the real unit vector `target`.
    ///
    /// `U = I - 2 v vᵀ / (vᵀ v)` with `v = e₀ - target`. The reflection is its
    /// own inverse and is orthogonal, hence unitary. When `target` already is
    /// `e₀` the identity is returned.
    pub fn state_preparation(target: &[f64]) -> Result<Self> {
        let dim = target.len();
        if dim == 0 || !dim.is_power_of_two() {
            return Err(ChronoError::NoIntegerLogarithm { length: dim });
        }
        let norm_sq: f64 = target.iter().map(|a| a * a).sum();
        if (norm_sq - 1.0).abs() > 1e-9 {
            return Err(ChronoError::Incoherence {
                message: format!("Cannot prepare a state with squared norm {}", norm_sq),
            });
        }

        let mut v: Vec<f64> = target.iter().map(|a| -a).collect();
        v[0] += 1.0;
        let v_norm_sq: f64 = v.iter().map(|x| x * x).sum();
        if v_norm_sq < 1e-15 {
            return Ok(Self::identity(dim));
        }

        let mut data = Vec::with_capacity(dim * dim);
        for (r, vr) in v.iter().enumerate() {
            for (c, vc) in v.iter().enumerate() {
                let delta = if r == c { 1.0 } else { 0.0 };
                data.push(Complex::new(delta - 2.0 * vr * vc / v_norm_sq, 0.0));
            }
        }
        Ok(Self { dim, data })
    }

    /// Number of rows (and columns).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of qubits the matrix acts on.
    pub fn num_qubits(&self) -> usize {
        self.dim.trailing_zeros() as usize
    }

    /// Entry at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Complex<f64> {
        self.data[row * self.dim + col]
    }

    /// Matrix-vector product.
    pub fn apply_to(&self, vector: &[Complex<f64>]) -> Result<Vec<Complex<f64>>> {
        if vector.len() != self.dim {
            return Err(ChronoError::DimensionMismatch { expected: self.dim, actual: vector.len() });
        }
        Ok((0..self.dim)
            .map(|r| {
                let row = &self.data[r * self.dim..(r + 1) * self.dim];
                row.iter().zip(vector).map(|(m, v)| m * v).sum()
            })
            .collect())
    }

    /// Checks `U U† ≈ I` entry-wise within `tolerance`.
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        let n = self.dim;
        for r in 0..n {
            for c in 0..n {
                let mut acc: Complex<f64> = Complex::zero();
                for k in 0..n {
                    acc += self.get(r, k) * self.get(c, k).conj();
                }
                let expected: Complex<f64> = if r == c { Complex::one() } else { Complex::zero() };
                if (acc - expected).norm() > tolerance {
                    return false;
                }
            }
        }
        true
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.dim {
            write!(f, "[")?;
            for c in 0..self.dim {
                write!(f, "{}{:.3}", if c > 0 { ", " } else { "" }, self.get(r, c))?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
