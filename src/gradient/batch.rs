use super::{Backprop, BatchGradient, Gradient};
use crate::{
    matrix::Matrices,
    neural::{cost::Cost, Example, Network},
    prelude::*,
};

/// The mean gradient over a batch of examples.
#[derive(Clone, Copy, Debug)]
pub struct BatchBackprop<G> {
    gradient: G,
}

impl<'a> BatchBackprop<Backprop<'a>> {
    pub fn new(network: &'a Network, cost: &'a dyn Cost) -> Self {
        Self::with_gradient(Backprop::new(network, cost))
    }
}

impl<G: Gradient> BatchBackprop<G> {
    /// Averages the gradients `gradient` computes for every example.
    pub fn with_gradient(gradient: G) -> Self {
        Self { gradient }
    }
}

impl<G: Gradient> BatchGradient for BatchBackprop<G> {
    fn compute(&self, weights: &Matrices, examples: &[Example]) -> Result<Matrices> {
        if examples.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let mut gradient = Matrices::new(&weights.shapes());
        for example in examples {
            gradient = (&gradient + &self.gradient.compute(weights, example)?)?;
        }
        Ok(gradient / examples.len() as f64)
    }
}
