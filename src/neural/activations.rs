use crate::prelude::*;
use std::{fmt::Debug, str::FromStr};

pub trait Activation: Debug + Send + Sync {
    /// Returns activation function at x
    fn call(&self, x: f64) -> f64;
    /// Returns derivative of activation function with respect to the function at x.
    /// For example, if our activation is sigmoid, then we would express the
    /// derivative as `a_x * (1-a_x)` instead of `sigmoid(a_x)(1-sigmoid(a_x))`.
    fn derivative(&self, a_x: f64) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activations {
    Identity,
    Sigmoid,
    Tanh,
    Arctan,
    ReLU,
}

impl Activation for Activations {
    fn call(&self, x: f64) -> f64 {
        use Activations::*;
        match self {
            Identity => x,
            Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Tanh => x.tanh(),
            Arctan => x.atan(),
            ReLU => x.max(0.0),
        }
    }

    fn derivative(&self, a_x: f64) -> f64 {
        use Activations::*;
        match self {
            Identity => 1.0,
            Sigmoid => a_x * (1.0 - a_x),
            Tanh => 1.0 - a_x * a_x,
            Arctan => 1.0 / (1.0 + a_x.tan() * a_x.tan()),
            ReLU => {
                if a_x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl FromStr for Activations {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        use Activations::*;
        match name.to_ascii_lowercase().as_str() {
            "identity" | "linear" => Ok(Identity),
            "sigmoid" => Ok(Sigmoid),
            "tanh" => Ok(Tanh),
            "arctan" => Ok(Arctan),
            "relu" => Ok(ReLU),
            _ => Err(Error::UnknownActivation(name.to_string())),
        }
    }
}
