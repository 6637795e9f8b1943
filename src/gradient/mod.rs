//! Gradients of a cost with respect to the weights of a [`Network`].
//!
//! [`Backprop`] computes the exact gradient for one example and
//! [`NumericalGradient`] approximates it with central differences.
//! [`CheckedBackprop`] runs both and reports how far apart they are.
//! [`BatchBackprop`] averages over a batch, and [`ParallelBackprop`] splits
//! that batch into shards computed on a worker pool.
//!
//! [`Network`]: crate::neural::Network

mod backprop;
mod batch;
mod checked;
mod numerical;
mod parallel;

pub use backprop::Backprop;
pub use batch::BatchBackprop;
pub use checked::{CheckedBackprop, GradientCheck};
pub use numerical::NumericalGradient;
pub use parallel::ParallelBackprop;

use crate::{matrix::Matrices, neural::Example, prelude::*};

/// Finite difference step used when none is given.
pub const DEFAULT_DISTANCE: f64 = 1e-5;

/// Largest deviation between analytic and numeric gradients that still counts
/// as a match when none is given.
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Computes the gradient of the cost of a single example.
pub trait Gradient {
    fn compute(&self, weights: &Matrices, example: &Example) -> Result<Matrices>;
}

/// Computes the mean gradient over a batch of examples.
pub trait BatchGradient {
    fn compute(&self, weights: &Matrices, examples: &[Example]) -> Result<Matrices>;
}
