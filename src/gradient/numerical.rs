use super::{Gradient, DEFAULT_DISTANCE};
use crate::{
    matrix::Matrices,
    neural::{cost::Cost, Example, Network},
    prelude::*,
};

/// Approximates the gradient with central differences, nudging every weight
/// on its own.
///
/// Needs two forward passes per weight, so it is only useful to verify
/// [`Backprop`](super::Backprop) on small networks.
#[derive(Clone, Copy, Debug)]
pub struct NumericalGradient<'a> {
    network: &'a Network,
    cost: &'a dyn Cost,
    distance: f64,
}

impl<'a> NumericalGradient<'a> {
    pub fn new(network: &'a Network, cost: &'a dyn Cost) -> Self {
        Self {
            network,
            cost,
            distance: DEFAULT_DISTANCE,
        }
    }

    /// Sets how far every weight is moved in each direction.
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }
}

impl Gradient for NumericalGradient<'_> {
    fn compute(&self, weights: &Matrices, example: &Example) -> Result<Matrices> {
        let mut modified = weights.clone();
        let mut gradient = Matrices::new(&weights.shapes());

        for i in 0..weights.len() {
            let (rows, cols) = weights[i].dim();
            for row in 0..rows {
                for col in 0..cols {
                    let original = weights[i][(row, col)];

                    modified[i][(row, col)] = original + self.distance;
                    let above = self.network.evaluate(&modified, self.cost, example)?;
                    modified[i][(row, col)] = original - self.distance;
                    let below = self.network.evaluate(&modified, self.cost, example)?;
                    modified[i][(row, col)] = original;

                    gradient[i][(row, col)] = (above - below) / (2.0 * self.distance);
                }
            }
        }

        Ok(gradient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::fixtures;
    use crate::neural::{activations::Activations, cost::Costs};
    use approx::assert_abs_diff_eq;

    #[test]
    fn leaves_weights_untouched() {
        let net = fixtures::small_net();
        let weights = fixtures::small_weights();
        let snapshot = weights.clone();
        let example = Example::new([1.0, 0.0], [1.0]);
        let numeric = NumericalGradient::new(&net, &Costs::Squared);

        let first = numeric.compute(&weights, &example).unwrap();
        assert_eq!(weights, snapshot);
        let second = numeric.compute(&weights, &example).unwrap();
        assert_eq!(weights, snapshot);

        assert_eq!(first, second);
    }

    #[test]
    fn linear_neuron() {
        let net = Network::new(1, 1, Activations::Identity);
        let weights = Matrices::from_flat(&net.shapes(), &[0.5, 2.0]).unwrap();
        let example = Example::new([3.0], [4.0]);

        let gradient = NumericalGradient::new(&net, &Costs::Squared)
            .with_distance(1e-3)
            .compute(&weights, &example)
            .unwrap();

        // the cost is quadratic in every weight, so central differences are exact
        assert_abs_diff_eq!(gradient[0][(0, 0)], 2.5, epsilon = 1e-8);
        assert_abs_diff_eq!(gradient[0][(1, 0)], 7.5, epsilon = 1e-8);
    }

    #[test]
    fn wrong_target_length() {
        let net = fixtures::small_net();
        let weights = fixtures::small_weights();
        let example = Example::new([1.0, 0.0], Vec::<f64>::new());

        assert!(matches!(
            NumericalGradient::new(&net, &Costs::Squared).compute(&weights, &example),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
