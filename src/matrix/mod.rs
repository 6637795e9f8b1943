use crate::prelude::*;
use std::ops::{Index, IndexMut};

mod matrices;
pub mod ops;

pub(crate) use matrices::flatten_shapes;
pub use matrices::Matrices;

/// A dense, row-major matrix.
#[derive(Debug, PartialEq, Clone)]
pub struct Matrix2<T> {
    data: Vec<T>,
    dim: (usize, usize),
}

impl<T: Default + Clone> Matrix2<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::default(); rows * cols],
            dim: (rows, cols),
        }
    }
}

impl<T> Matrix2<T> {
    pub fn from_array<const R: usize, const C: usize>(arr: [[T; C]; R]) -> Self {
        let mut data = Vec::with_capacity(R * C);

        for row in arr {
            for x in row {
                data.push(x);
            }
        }

        Self { data, dim: (R, C) }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    pub fn rows(&self) -> usize {
        self.dim.0
    }

    pub fn cols(&self) -> usize {
        self.dim.1
    }

    /// A matrix with a single row.
    pub fn from_row(row_vec: Vec<T>) -> Self {
        Self {
            dim: (1, row_vec.len()),
            data: row_vec,
        }
    }

    /// A matrix with a single column.
    pub fn from_col(col_vec: Vec<T>) -> Self {
        Self {
            dim: (col_vec.len(), 1),
            data: col_vec,
        }
    }

    /// Builds a matrix from row-major `data`.
    pub fn from_flat(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::ShapeMismatch {
                operation: "from_flat",
                expected: vec![rows * cols],
                actual: vec![data.len()],
            });
        }

        Ok(Self {
            data,
            dim: (rows, cols),
        })
    }

    pub fn to_vec(self) -> Vec<Vec<T>> {
        let (rows, cols) = self.dim;
        let mut data = self.data.into_iter();
        (0..rows)
            .map(|_| data.by_ref().take(cols).collect())
            .collect()
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl<T> Matrix2<T>
where
    T: Default,
{
    /// Applies a function to every element of the matrix
    pub fn apply<F: FnMut(T) -> T>(&mut self, mut f: F) {
        for x in &mut self.data {
            let old = std::mem::take(x);
            *x = f(old);
        }
    }
}

impl<T> Index<(usize, usize)> for Matrix2<T> {
    type Output = T;
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[i * self.cols() + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix2<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        let idx = i * self.cols() + j;
        &mut self.data[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_matrix2_from_array() {
        let matrix = Matrix2::from_array([[1, 2, 3], [4, 5, 6]]);
        assert_eq!(matrix[(0, 1)], 2);
        assert_eq!(matrix[(1, 2)], 6);
        assert_eq!(matrix[(0, 0)], 1);
        assert_eq!(matrix[(1, 1)], 5);
    }

    #[test]
    fn matrix2_from_flat() {
        let matrix = Matrix2::from_flat(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(matrix.to_vec(), [[1, 2], [3, 4]]);

        assert!(Matrix2::from_flat(2, 2, vec![1, 2, 3]).is_err());
    }

    #[test]
    fn row_and_col() {
        assert_eq!(Matrix2::from_row(vec![1, 2, 3]).dim(), (1, 3));
        assert_eq!(Matrix2::from_col(vec![1, 2, 3]).dim(), (3, 1));
    }

    #[test]
    fn matrix2_apply() {
        let mut matrix = Matrix2::from_array([[1, 2], [2, 2], [4, 8]]);

        matrix.apply(|x| x / 2);

        assert_eq!(matrix.to_vec(), [[0, 1], [1, 1], [2, 4]]);
    }
}
