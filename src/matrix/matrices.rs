use super::Matrix2;
use crate::prelude::*;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use std::ops::{Add, Div, Index, IndexMut, Mul, RangeInclusive, Sub};

/// The weight matrices of a network, or a gradient with respect to them.
///
/// Matrix `i` connects layer `i` to layer `i + 1` and has shape
/// `(incoming + 1, outgoing)`. Its first row holds the bias weights.
#[derive(Debug, PartialEq, Clone)]
pub struct Matrices {
    matrices: Vec<Matrix2<f64>>,
}

impl Matrices {
    /// Zero-initialized matrices of the given shapes.
    pub fn new(shapes: &[(usize, usize)]) -> Self {
        Self {
            matrices: shapes
                .iter()
                .map(|&(rows, cols)| Matrix2::new(rows, cols))
                .collect(),
        }
    }

    /// Splits `values` into matrices of the given shapes, in order.
    pub fn from_flat(shapes: &[(usize, usize)], values: &[f64]) -> Result<Self> {
        let total: usize = shapes.iter().map(|(rows, cols)| rows * cols).sum();
        if values.len() != total {
            return Err(Error::ShapeMismatch {
                operation: "from_flat",
                expected: vec![total],
                actual: vec![values.len()],
            });
        }

        let mut matrices = Vec::with_capacity(shapes.len());
        let mut offset = 0;
        for &(rows, cols) in shapes {
            let end = offset + rows * cols;
            matrices.push(Matrix2::from_flat(rows, cols, values[offset..end].to_vec())?);
            offset = end;
        }

        Ok(Self { matrices })
    }

    /// Matrices with every value drawn uniformly from `range`.
    pub fn random<R: Rng + ?Sized>(
        shapes: &[(usize, usize)],
        range: RangeInclusive<f64>,
        rng: &mut R,
    ) -> Self {
        let die = Uniform::from(range);

        let mut matrices = Vec::with_capacity(shapes.len());
        for &(rows, cols) in shapes {
            let mut matrix = Matrix2::new(rows, cols);
            matrix.apply(|_| die.sample(rng));
            matrices.push(matrix);
        }

        Self { matrices }
    }

    pub fn shapes(&self) -> Vec<(usize, usize)> {
        self.matrices.iter().map(Matrix2::dim).collect()
    }

    /// Number of connections.
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Matrix2<f64>> {
        self.matrices.iter()
    }

    /// All values concatenated, connection by connection, each row-major.
    pub fn flat(&self) -> Vec<f64> {
        self.matrices
            .iter()
            .flat_map(|matrix| matrix.iter().copied())
            .collect()
    }

    /// Replaces the matrix of connection `index`, which must keep its shape.
    pub fn set(&mut self, index: usize, matrix: Matrix2<f64>) -> Result<()> {
        let current = self.matrices[index].dim();
        if current != matrix.dim() {
            return Err(Error::ShapeMismatch {
                operation: "set",
                expected: vec![current.0, current.1],
                actual: vec![matrix.rows(), matrix.cols()],
            });
        }
        self.matrices[index] = matrix;
        Ok(())
    }

    fn check_shapes(&self, other: &Matrices, operation: &'static str) -> Result<()> {
        let (lhs, rhs) = (self.shapes(), other.shapes());
        if lhs != rhs {
            return Err(Error::ShapeMismatch {
                operation,
                expected: flatten_shapes(&lhs),
                actual: flatten_shapes(&rhs),
            });
        }
        Ok(())
    }
}

/// Shapes as `[rows, cols, rows, cols, ...]` for error reporting.
pub(crate) fn flatten_shapes(shapes: &[(usize, usize)]) -> Vec<usize> {
    shapes.iter().flat_map(|&(rows, cols)| [rows, cols]).collect()
}

impl Index<usize> for Matrices {
    type Output = Matrix2<f64>;
    fn index(&self, index: usize) -> &Self::Output {
        &self.matrices[index]
    }
}

impl IndexMut<usize> for Matrices {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.matrices[index]
    }
}

impl Add for &Matrices {
    type Output = Result<Matrices>;
    fn add(self, rhs: Self) -> Self::Output {
        self.check_shapes(rhs, "add")?;
        let matrices = self
            .matrices
            .iter()
            .zip(&rhs.matrices)
            .map(|(l, r)| l + r)
            .collect::<Result<_>>()?;
        Ok(Matrices { matrices })
    }
}

impl Sub for &Matrices {
    type Output = Result<Matrices>;
    fn sub(self, rhs: Self) -> Self::Output {
        self.check_shapes(rhs, "sub")?;
        let matrices = self
            .matrices
            .iter()
            .zip(&rhs.matrices)
            .map(|(l, r)| l - r)
            .collect::<Result<_>>()?;
        Ok(Matrices { matrices })
    }
}

impl Mul<f64> for &Matrices {
    type Output = Matrices;
    fn mul(self, rhs: f64) -> Self::Output {
        let mut scaled = self.clone();
        for matrix in &mut scaled.matrices {
            matrix.apply(|x| x * rhs);
        }
        scaled
    }
}

impl Div<f64> for Matrices {
    type Output = Matrices;
    fn div(mut self, rhs: f64) -> Self::Output {
        for matrix in &mut self.matrices {
            matrix.apply(|x| x / rhs);
        }
        self
    }
}
