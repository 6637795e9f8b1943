pub mod activations;
pub mod cost;
pub mod optimizer;

use crate::prelude::*;
use std::{iter, sync::Arc};

use crate::matrix::{flatten_shapes, ops::Dot, Matrices, Matrix2};

use self::activations::{Activation, Activations};
use self::cost::Cost;

/// A labelled training example.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub data: Vec<f64>,
    pub target: Vec<f64>,
}

impl Example {
    pub fn new(data: impl Into<Vec<f64>>, target: impl Into<Vec<f64>>) -> Self {
        Self {
            data: data.into(),
            target: target.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Layer {
    size: usize,
    activation: Arc<dyn Activation>,
}

impl Layer {
    pub fn new(size: usize, activation: impl Activation + 'static) -> Self {
        Self {
            size,
            activation: Arc::new(activation),
        }
    }

    /// Returns the amount of neurons in the layer
    pub fn size(&self) -> usize {
        self.size
    }

    /// Activates the incoming weighted sums of the layer.
    pub fn apply(&self, mut incoming: Vec<f64>) -> Vec<f64> {
        for x in &mut incoming {
            *x = self.activation.call(*x);
        }
        incoming
    }

    /// Local derivative of every neuron, given what the layer last output.
    pub fn delta(&self, outgoing: &[f64]) -> Vec<f64> {
        outgoing
            .iter()
            .map(|&y| self.activation.derivative(y))
            .collect()
    }
}

/// The activations of every layer for a single forward pass, input layer
/// first.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    outgoing: Vec<Vec<f64>>,
}

impl Trace {
    /// What layer `index` output during the pass.
    pub fn layer(&self, index: usize) -> &[f64] {
        &self.outgoing[index]
    }

    pub fn prediction(&self) -> &[f64] {
        &self.outgoing[self.outgoing.len() - 1]
    }

    pub fn into_prediction(mut self) -> Vec<f64> {
        self.outgoing.pop().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.outgoing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty()
    }
}

/// A fully connected feed-forward network.
///
/// The network only describes layer sizes and activations. Weights are passed
/// into every call, and the activations of a pass are returned as a [`Trace`],
/// so one network can be shared between threads.
#[derive(Clone, Debug)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// Creates a network with an input layer of `n_inputs` and a single layer
    /// of `n_neurons` behind it.
    pub fn new(n_inputs: usize, n_neurons: usize, activation: impl Activation + 'static) -> Self {
        Self {
            layers: vec![
                Layer::new(n_inputs, Activations::Identity),
                Layer::new(n_neurons, activation),
            ],
        }
    }

    pub fn add_layer(&mut self, n_neurons: usize, activation: impl Activation + 'static) {
        self.layers.push(Layer::new(n_neurons, activation));
    }

    /// Creates a network from explicit layers, input layer first.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self> {
        check_layers(&layers)?;
        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(Layer::size).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map(Layer::size).unwrap_or(0)
    }

    /// Shapes of the weight matrices, one per connection, bias row included.
    pub fn shapes(&self) -> Vec<(usize, usize)> {
        self.layers
            .windows(2)
            .map(|pair| (pair[0].size() + 1, pair[1].size()))
            .collect()
    }

    /// Random weights drawn uniformly from `[-scale, scale]`.
    pub fn init_weights(&self, scale: f64) -> Matrices {
        Matrices::random(&self.shapes(), -scale..=scale, &mut rand::thread_rng())
    }

    /// Propagates `input` through the network, returning the activations of
    /// every layer.
    pub fn forward(&self, weights: &Matrices, input: &[f64]) -> Result<Trace> {
        check_layers(&self.layers)?;
        self.check_weights(weights)?;
        if input.len() != self.input_size() {
            return Err(Error::ShapeMismatch {
                operation: "feed",
                expected: vec![self.input_size()],
                actual: vec![input.len()],
            });
        }

        let mut outgoing = Vec::with_capacity(self.layers.len());
        outgoing.push(self.layers[0].apply(input.to_vec()));
        for (weight, layer) in weights.iter().zip(&self.layers[1..]) {
            let incoming = weighted_sums(weight, &outgoing[outgoing.len() - 1])?;
            outgoing.push(layer.apply(incoming));
        }
        Ok(Trace { outgoing })
    }

    /// Propagates `input` through the network, returning the output layer.
    pub fn feed(&self, weights: &Matrices, input: &[f64]) -> Result<Vec<f64>> {
        Ok(self.forward(weights, input)?.into_prediction())
    }

    /// Projects the error `delta` of the layer in front of `weight` back onto
    /// the layer behind it. The bias row takes no part.
    pub fn backward(&self, weight: &Matrix2<f64>, delta: &[f64]) -> Result<Vec<f64>> {
        if weight.rows() == 0 {
            return Err(Error::ShapeMismatch {
                operation: "backward",
                expected: vec![1],
                actual: vec![0],
            });
        }
        let mut propagated = weight.dot(&Matrix2::from_col(delta.to_vec()))?.into_data();
        propagated.remove(0);
        Ok(propagated)
    }

    /// Total cost of the prediction for `example`, summed over the outputs.
    pub fn evaluate(&self, weights: &Matrices, cost: &dyn Cost, example: &Example) -> Result<f64> {
        self.check_target(&example.target)?;
        let prediction = self.feed(weights, &example.data)?;
        Ok(cost.cost(&prediction, &example.target).iter().sum())
    }

    /// Mean of [`Network::evaluate`] over `examples`.
    pub fn mean_cost(&self, weights: &Matrices, cost: &dyn Cost, examples: &[Example]) -> Result<f64> {
        if examples.is_empty() {
            return Err(Error::EmptyBatch);
        }
        let mut total = 0.0;
        for example in examples {
            total += self.evaluate(weights, cost, example)?;
        }
        Ok(total / examples.len() as f64)
    }

    pub(crate) fn check_target(&self, target: &[f64]) -> Result<()> {
        if target.len() != self.output_size() {
            return Err(Error::ShapeMismatch {
                operation: "target",
                expected: vec![self.output_size()],
                actual: vec![target.len()],
            });
        }
        Ok(())
    }

    fn check_weights(&self, weights: &Matrices) -> Result<()> {
        let (expected, actual) = (self.shapes(), weights.shapes());
        if expected != actual {
            return Err(Error::ShapeMismatch {
                operation: "weights",
                expected: flatten_shapes(&expected),
                actual: flatten_shapes(&actual),
            });
        }
        Ok(())
    }
}

/// At least an input and an output layer, none of them empty.
fn check_layers(layers: &[Layer]) -> Result<()> {
    if layers.len() < 2 {
        return Err(Error::InvalidNetwork(format!(
            "need an input and an output layer, got {} layer(s)",
            layers.len()
        )));
    }
    if let Some(index) = layers.iter().position(|layer| layer.size() == 0) {
        return Err(Error::InvalidNetwork(format!("layer {index} is empty")));
    }
    Ok(())
}

/// `activations` with the constant input of the bias neuron in front.
pub(crate) fn with_bias(activations: &[f64]) -> Vec<f64> {
    iter::once(1.0).chain(activations.iter().copied()).collect()
}

fn weighted_sums(weight: &Matrix2<f64>, activations: &[f64]) -> Result<Vec<f64>> {
    Ok(Matrix2::from_row(with_bias(activations))
        .dot(weight)?
        .into_data())
}
