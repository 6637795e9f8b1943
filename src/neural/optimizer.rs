use log::{debug, info};

use crate::{
    gradient::{BatchBackprop, BatchGradient, CheckedBackprop, ParallelBackprop},
    matrix::Matrices,
    neural::{cost::Cost, Example, Network},
    prelude::*,
};

pub enum OptimizerMethod {
    Backprop,
    /// Verifies every gradient against finite differences taken with
    /// `distance`, warning when they differ by more than `tolerance`
    CheckedBackprop { distance: f64, tolerance: f64 },
    /// Takes in the number of worker threads each batch is split across
    ParallelBackprop(usize),
}

/// Gradient descent over a set of examples.
pub struct Optimizer {
    method: OptimizerMethod,
    iterations: usize,
    iterations_per_log: Option<usize>,
    batch_size: Option<usize>,
    rate: f64,
    momentum: f64,
    weight_decay: f64,
}

impl Optimizer {
    /// Full batch, no momentum, no weight decay and no logging by default.
    pub fn new(method: OptimizerMethod, iterations: usize, rate: f64) -> Self {
        Self {
            method,
            iterations,
            iterations_per_log: None,
            batch_size: None,
            rate,
            momentum: 0.0,
            weight_decay: 0.0,
        }
    }

    pub fn with_log(mut self, iterations_per_log: Option<usize>) -> Self {
        self.iterations_per_log = iterations_per_log;
        self
    }

    /// Steps after every `batch_size` examples instead of once per pass.
    pub fn with_batches(mut self, batch_size: Option<usize>) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Adds `momentum` times the previous step to every step.
    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    /// Shrinks the weights by a factor of `1 - weight_decay` before every step.
    pub fn with_weight_decay(mut self, weight_decay: f64) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    /// Trains `weights` of `net` to minimize `cost` over `examples`.
    pub fn train(
        &self,
        net: &Network,
        cost: &dyn Cost,
        weights: &mut Matrices,
        examples: &[Example],
    ) -> Result<()> {
        if examples.is_empty() {
            return Err(Error::EmptyBatch);
        }
        let batch_size = match self.batch_size {
            Some(0) => {
                return Err(Error::InvalidConfig(
                    "batch size must be at least one".to_string(),
                ))
            }
            Some(size) => size,
            None => examples.len(),
        };

        let gradient: Box<dyn BatchGradient + '_> = match self.method {
            OptimizerMethod::Backprop => Box::new(BatchBackprop::new(net, cost)),
            OptimizerMethod::CheckedBackprop {
                distance,
                tolerance,
            } => Box::new(BatchBackprop::with_gradient(
                CheckedBackprop::new(net, cost)
                    .with_distance(distance)
                    .with_tolerance(tolerance),
            )),
            OptimizerMethod::ParallelBackprop(workers) => {
                Box::new(ParallelBackprop::new(net, cost, workers)?)
            }
        };

        let mut velocity = None;
        for i in 0..self.iterations {
            for batch in examples.chunks(batch_size) {
                let step = gradient.compute(weights, batch)?;
                self.step(weights, step, &mut velocity)?;
            }
            if self.iterations_per_log.is_some_and(|ipl| ipl > 0 && i % ipl == 0) {
                let error = net.mean_cost(weights, cost, examples)?;
                info!("Iteration {i} cost: {error}");
            }
        }
        debug!("Finished {} iterations", self.iterations);
        Ok(())
    }

    fn step(
        &self,
        weights: &mut Matrices,
        gradient: Matrices,
        velocity: &mut Option<Matrices>,
    ) -> Result<()> {
        let mut step = gradient;
        if self.momentum != 0.0 {
            if let Some(previous) = velocity.as_ref() {
                step = (&step + &(previous * self.momentum))?;
            }
            *velocity = Some(step.clone());
        }
        if self.weight_decay != 0.0 {
            *weights = &*weights * (1.0 - self.weight_decay);
        }
        *weights = (&*weights - &(&step * self.rate))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neural::{activations::Activations, cost::Costs};
    use rand::{rngs::StdRng, SeedableRng};

    fn or_examples() -> Vec<Example> {
        vec![
            Example::new([0.0, 0.0], [0.0]),
            Example::new([0.0, 1.0], [1.0]),
            Example::new([1.0, 0.0], [1.0]),
            Example::new([1.0, 1.0], [1.0]),
        ]
    }

    fn seeded(net: &Network) -> Matrices {
        Matrices::random(&net.shapes(), -0.5..=0.5, &mut StdRng::seed_from_u64(42))
    }

    #[test]
    fn train_or() {
        let _ = env_logger::builder().is_test(true).try_init();
        // Train a single neuron to compute OR
        let net = Network::new(2, 1, Activations::Sigmoid);
        let mut weights = seeded(&net);
        let examples = or_examples();

        let optim = Optimizer::new(OptimizerMethod::Backprop, 2_000, 20.0).with_log(Some(500));
        assert_eq!(Ok(()), optim.train(&net, &Costs::Squared, &mut weights, &examples));

        let fin = net.mean_cost(&weights, &Costs::Squared, &examples).unwrap();
        assert!(fin < 0.02, "final cost {fin}");

        for example in &examples {
            let out = net.feed(&weights, &example.data).unwrap();
            assert_eq!(out[0] > 0.5, example.target[0] > 0.5);
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut net = Network::new(2, 3, Activations::Tanh);
        net.add_layer(1, Activations::Sigmoid);
        let examples = or_examples();

        let mut sequential = seeded(&net);
        Optimizer::new(OptimizerMethod::Backprop, 50, 1.0)
            .train(&net, &Costs::Squared, &mut sequential, &examples)
            .unwrap();

        let mut parallel = seeded(&net);
        Optimizer::new(OptimizerMethod::ParallelBackprop(3), 50, 1.0)
            .train(&net, &Costs::Squared, &mut parallel, &examples)
            .unwrap();

        for (s, p) in sequential.flat().iter().zip(parallel.flat()) {
            assert!((s - p).abs() < 1e-9);
        }
    }

    #[test]
    fn mini_batches_with_momentum_reduce_cost() {
        let mut net = Network::new(2, 4, Activations::Sigmoid);
        net.add_layer(1, Activations::Sigmoid);
        let mut weights = seeded(&net);
        let examples = or_examples();
        let initial = net.mean_cost(&weights, &Costs::Squared, &examples).unwrap();

        Optimizer::new(OptimizerMethod::Backprop, 200, 0.5)
            .with_batches(Some(2))
            .with_momentum(0.9)
            .with_weight_decay(1e-4)
            .train(&net, &Costs::Squared, &mut weights, &examples)
            .unwrap();

        let fin = net.mean_cost(&weights, &Costs::Squared, &examples).unwrap();
        assert!(fin < initial, "cost went from {initial} to {fin}");
    }

    #[test]
    fn checked_training_step() {
        let _ = env_logger::builder().is_test(true).try_init();
        let net = Network::new(2, 1, Activations::Sigmoid);
        let examples = or_examples();

        let mut checked = seeded(&net);
        Optimizer::new(
            OptimizerMethod::CheckedBackprop {
                distance: 1e-5,
                tolerance: 1e-6,
            },
            3,
            1.0,
        )
        .train(&net, &Costs::Squared, &mut checked, &examples)
        .unwrap();

        let mut plain = seeded(&net);
        Optimizer::new(OptimizerMethod::Backprop, 3, 1.0)
            .train(&net, &Costs::Squared, &mut plain, &examples)
            .unwrap();

        assert_eq!(checked, plain);
    }

    #[test]
    fn weight_decay_shrinks_weights() {
        let net = Network::new(1, 1, Activations::Identity);
        let mut weights = Matrices::from_flat(&net.shapes(), &[1.0, 2.0]).unwrap();
        // already at the optimum, the gradient is zero
        let examples = [Example::new([1.0], [3.0])];

        Optimizer::new(OptimizerMethod::Backprop, 1, 0.1)
            .with_weight_decay(0.5)
            .train(&net, &Costs::Squared, &mut weights, &examples)
            .unwrap();

        assert_eq!(weights.flat(), [0.5, 1.0]);
    }

    #[test]
    fn invalid_training_input() {
        let net = Network::new(2, 1, Activations::Sigmoid);
        let mut weights = seeded(&net);
        let optim = Optimizer::new(OptimizerMethod::Backprop, 1, 1.0);

        assert_eq!(
            optim.train(&net, &Costs::Squared, &mut weights, &[]),
            Err(Error::EmptyBatch)
        );
        assert!(matches!(
            optim
                .with_batches(Some(0))
                .train(&net, &Costs::Squared, &mut weights, &or_examples()),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Optimizer::new(OptimizerMethod::ParallelBackprop(0), 1, 1.0).train(
                &net,
                &Costs::Squared,
                &mut weights,
                &or_examples()
            ),
            Err(Error::InvalidConfig(_))
        ));
    }
}
