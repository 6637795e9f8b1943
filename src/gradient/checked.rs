use super::{Backprop, Gradient, NumericalGradient, DEFAULT_TOLERANCE};
use crate::{
    matrix::Matrices,
    neural::{cost::Cost, Example, Network},
    prelude::*,
};
use log::{info, warn};

/// Outcome of comparing an analytic gradient with a numerical one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientCheck {
    /// Largest absolute difference between the two gradients.
    pub worst: f64,
    /// Position of `worst` in the flattened gradient.
    pub index: usize,
    pub tolerance: f64,
}

impl GradientCheck {
    pub fn passed(&self) -> bool {
        self.worst <= self.tolerance
    }
}

/// Backpropagation verified against finite differences on every call.
///
/// A mismatch is logged as a warning and does not stop the computation; the
/// analytic gradient is returned either way.
#[derive(Clone, Copy, Debug)]
pub struct CheckedBackprop<'a> {
    analytic: Backprop<'a>,
    numeric: NumericalGradient<'a>,
    tolerance: f64,
}

impl<'a> CheckedBackprop<'a> {
    pub fn new(network: &'a Network, cost: &'a dyn Cost) -> Self {
        Self {
            analytic: Backprop::new(network, cost),
            numeric: NumericalGradient::new(network, cost),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.numeric = self.numeric.with_distance(distance);
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Computes the analytic gradient along with how far it is from the
    /// numerical one.
    pub fn check(&self, weights: &Matrices, example: &Example) -> Result<(Matrices, GradientCheck)> {
        let analytic = self.analytic.compute(weights, example)?;
        let numeric = self.numeric.compute(weights, example)?;

        let mut check = GradientCheck {
            worst: 0.0,
            index: 0,
            tolerance: self.tolerance,
        };
        for (index, (a, n)) in analytic.flat().iter().zip(numeric.flat()).enumerate() {
            let distance = (a - n).abs();
            // NaN sticks once seen
            if distance > check.worst || (distance.is_nan() && !check.worst.is_nan()) {
                check.worst = distance;
                check.index = index;
            }
        }

        if check.passed() {
            info!(
                "Gradient looks good, worst deviation {:e} at weight {}",
                check.worst, check.index
            );
        } else {
            warn!(
                "Gradient differs by {:e} at weight {} (tolerance {:e})",
                check.worst, check.index, check.tolerance
            );
        }
        Ok((analytic, check))
    }
}

impl Gradient for CheckedBackprop<'_> {
    fn compute(&self, weights: &Matrices, example: &Example) -> Result<Matrices> {
        self.check(weights, example).map(|(gradient, _)| gradient)
    }
}
