use super::Gradient;
use crate::{
    matrix::{ops::Dot, Matrices, Matrix2},
    neural::{cost::Cost, with_bias, Example, Layer, Network, Trace},
    prelude::*,
};

/// The exact gradient of one example, by backpropagation.
#[derive(Clone, Copy, Debug)]
pub struct Backprop<'a> {
    network: &'a Network,
    cost: &'a dyn Cost,
}

impl<'a> Backprop<'a> {
    pub fn new(network: &'a Network, cost: &'a dyn Cost) -> Self {
        Self { network, cost }
    }

    /// Deltas of every layer but the input layer, so `deltas[i]` belongs to
    /// layer `i + 1`.
    fn delta_layers(&self, weights: &Matrices, trace: &Trace, target: &[f64]) -> Result<Vec<Vec<f64>>> {
        self.network.check_target(target)?;
        let layers = self.network.layers();
        let output = layers.len() - 1;

        let mut deltas = vec![self.delta_output(&layers[output], trace.layer(output), target)?];
        // Hidden layers, deepest first. Matrix `index` sits in front of layer
        // `index`.
        for index in (1..output).rev() {
            let delta = self.delta_hidden(
                &layers[index],
                trace.layer(index),
                &weights[index],
                &deltas[deltas.len() - 1],
            )?;
            deltas.push(delta);
        }
        deltas.reverse();
        Ok(deltas)
    }

    fn delta_output(&self, layer: &Layer, outgoing: &[f64], target: &[f64]) -> Result<Vec<f64>> {
        let cost = self.cost.delta(outgoing, target);
        let local = layer.delta(outgoing);
        if cost.len() != local.len() {
            return Err(Error::ShapeMismatch {
                operation: "output delta",
                expected: vec![local.len()],
                actual: vec![cost.len()],
            });
        }
        Ok(cost.iter().zip(&local).map(|(c, l)| c * l).collect())
    }

    fn delta_hidden(
        &self,
        layer: &Layer,
        outgoing: &[f64],
        weight: &Matrix2<f64>,
        delta_right: &[f64],
    ) -> Result<Vec<f64>> {
        if weight.rows() != layer.size() + 1 {
            return Err(Error::ShapeMismatch {
                operation: "hidden delta",
                expected: vec![layer.size() + 1],
                actual: vec![weight.rows()],
            });
        }
        let backward = self.network.backward(weight, delta_right)?;
        let local = layer.delta(outgoing);
        if backward.len() != layer.size() || local.len() != layer.size() {
            return Err(Error::ShapeMismatch {
                operation: "hidden delta",
                expected: vec![layer.size(), layer.size()],
                actual: vec![backward.len(), local.len()],
            });
        }
        Ok(backward.iter().zip(&local).map(|(b, l)| b * l).collect())
    }

    fn delta_weights(&self, trace: &Trace, deltas: &[Vec<f64>]) -> Result<Matrices> {
        let mut gradient = Matrices::new(&self.network.shapes());
        for (index, delta) in deltas.iter().enumerate() {
            let activations = Matrix2::from_col(with_bias(trace.layer(index)));
            let outer = activations.dot(&Matrix2::from_row(delta.clone()))?;
            gradient.set(index, outer)?;
        }
        Ok(gradient)
    }
}

impl Gradient for Backprop<'_> {
    fn compute(&self, weights: &Matrices, example: &Example) -> Result<Matrices> {
        if self.network.layers().len() < 2 {
            return Err(Error::InvalidNetwork(
                "backpropagation needs an input and an output layer".to_string(),
            ));
        }
        let trace = self.network.forward(weights, &example.data)?;
        let deltas = self.delta_layers(weights, &trace, &example.target)?;
        self.delta_weights(&trace, &deltas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::{fixtures, NumericalGradient};
    use crate::neural::{activations::Activations, cost::Costs};
    use approx::assert_abs_diff_eq;

    #[test]
    fn gradient_shapes_match_weights() {
        let net = fixtures::small_net();
        let weights = fixtures::small_weights();
        let example = Example::new([1.0, 0.0], [1.0]);

        let gradient = Backprop::new(&net, &Costs::Squared)
            .compute(&weights, &example)
            .unwrap();

        assert_eq!(gradient.shapes(), [(3, 2), (3, 1)]);
        assert_eq!(gradient.shapes(), weights.shapes());
    }

    #[test]
    fn linear_neuron() {
        // prediction = b + w * x, gradient = (p - t) * [1, x]
        let net = Network::new(1, 1, Activations::Identity);
        let weights = Matrices::from_flat(&net.shapes(), &[0.5, 2.0]).unwrap();
        let example = Example::new([3.0], [4.0]);

        let gradient = Backprop::new(&net, &Costs::Squared)
            .compute(&weights, &example)
            .unwrap();

        // p = 6.5, p - t = 2.5
        assert_eq!(gradient.flat(), [2.5, 7.5]);
    }

    #[test]
    fn matches_numerical_gradient() {
        let example = Example::new([1.0, 0.0], [1.0]);
        let net = fixtures::small_net();
        let weights = fixtures::small_weights();

        let analytic = Backprop::new(&net, &Costs::Squared)
            .compute(&weights, &example)
            .unwrap();
        let numeric = NumericalGradient::new(&net, &Costs::Squared)
            .compute(&weights, &example)
            .unwrap();

        for (a, n) in analytic.flat().iter().zip(numeric.flat()) {
            assert_abs_diff_eq!(*a, n, epsilon = 1e-4);
        }
    }

    #[test]
    fn matches_numerical_gradient_deep() {
        let net = fixtures::deep_net();
        let weights = fixtures::seeded_weights(&net, 3);

        for cost in [Costs::Squared, Costs::CrossEntropy] {
            for example in fixtures::seeded_examples(&net, 4, 11) {
                let analytic = Backprop::new(&net, &cost).compute(&weights, &example).unwrap();
                let numeric = NumericalGradient::new(&net, &cost)
                    .compute(&weights, &example)
                    .unwrap();

                for (a, n) in analytic.flat().iter().zip(numeric.flat()) {
                    assert_abs_diff_eq!(*a, n, epsilon = 1e-4);
                }
            }
        }
    }

    #[test]
    fn wrong_target_length() {
        let net = fixtures::small_net();
        let weights = fixtures::small_weights();
        let example = Example::new([1.0, 0.0], [1.0, 0.0]);

        assert_eq!(
            Backprop::new(&net, &Costs::Squared).compute(&weights, &example),
            Err(Error::ShapeMismatch {
                operation: "target",
                expected: vec![1],
                actual: vec![2],
            })
        );
    }

    #[test]
    fn wrong_weight_shapes() {
        let net = fixtures::small_net();
        let weights = Matrices::new(&[(3, 2), (2, 1)]);
        let example = Example::new([1.0, 0.0], [1.0]);

        assert!(matches!(
            Backprop::new(&net, &Costs::Squared).compute(&weights, &example),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
