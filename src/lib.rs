//! A small feed-forward neural network library.
//!
//! Networks are fully connected and layered. Weights live outside the network
//! in [`matrix::Matrices`], one matrix per connection with the bias weights in
//! the first row. The [`gradient`] module computes the derivative of a cost
//! with respect to those weights, either analytically or by finite
//! differences, for single examples, batches, or batches sharded over a
//! worker pool.
//!
//! ```
//! use layered::gradient::{Backprop, Gradient};
//! use layered::neural::{activations::Activations, cost::Costs, Example, Network};
//!
//! let mut net = Network::new(2, 3, Activations::Sigmoid);
//! net.add_layer(1, Activations::Sigmoid);
//!
//! let weights = net.init_weights(0.1);
//! let example = Example::new([1.0, 0.0], [1.0]);
//!
//! let gradient = Backprop::new(&net, &Costs::Squared)
//!     .compute(&weights, &example)
//!     .unwrap();
//! assert_eq!(gradient.shapes(), vec![(3, 3), (4, 1)]);
//! ```

pub mod gradient;
pub mod matrix;
pub mod neural;
pub mod prelude;
