use super::Matrix2;
use crate::prelude::*;
use std::ops::{Add, AddAssign, Mul, Sub};

pub trait Dot<I> {
    type Output;
    fn dot(self, rhs: I) -> Result<Self::Output>;
}

impl<'a, T> Dot<&Matrix2<T>> for &'a Matrix2<T>
where
    T: Mul<Output = T> + Default + AddAssign + Copy,
{
    type Output = Matrix2<T>;
    fn dot(self, rhs: &Matrix2<T>) -> Result<Self::Output> {
        if self.cols() != rhs.rows() {
            return Err(Error::ShapeMismatch {
                operation: "dot",
                expected: vec![self.cols()],
                actual: vec![rhs.rows()],
            });
        }

        let mut data = Vec::with_capacity(self.rows() * rhs.cols());

        for lhs_row in 0..self.rows() {
            for rhs_col in 0..rhs.cols() {
                let mut sum = T::default();
                for n in 0..self.cols() {
                    sum += self[(lhs_row, n)] * rhs[(n, rhs_col)]
                }
                data.push(sum);
            }
        }

        Ok(Matrix2 {
            data,
            dim: (self.rows(), rhs.cols()),
        })
    }
}

/// Adds two Matrix2s element-wise.
impl<'a, T> Add for &'a Matrix2<T>
where
    &'a T: Add<Output = T>,
{
    type Output = Result<Matrix2<T>>;
    fn add(self, rhs: Self) -> Self::Output {
        if self.dim != rhs.dim {
            return Err(Error::ShapeMismatch {
                operation: "add",
                expected: vec![self.rows(), self.cols()],
                actual: vec![rhs.rows(), rhs.cols()],
            });
        }

        let data = self.data.iter().zip(&rhs.data).map(|(l, r)| l + r).collect();

        Ok(Matrix2 {
            data,
            dim: self.dim,
        })
    }
}

/// Subs two Matrix2s element-wise.
impl<'a, T> Sub for &'a Matrix2<T>
where
    &'a T: Sub<Output = T>,
{
    type Output = Result<Matrix2<T>>;
    fn sub(self, rhs: Self) -> Self::Output {
        if self.dim != rhs.dim {
            return Err(Error::ShapeMismatch {
                operation: "sub",
                expected: vec![self.rows(), self.cols()],
                actual: vec![rhs.rows(), rhs.cols()],
            });
        }

        let data = self.data.iter().zip(&rhs.data).map(|(l, r)| l - r).collect();

        Ok(Matrix2 {
            data,
            dim: self.dim,
        })
    }
}
