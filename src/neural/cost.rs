//! Cost functions comparing a prediction against its target.

use crate::prelude::*;
use std::{fmt::Debug, str::FromStr};

/// Predictions are clipped this far away from 0 and 1 by the cross entropy.
const CROSS_ENTROPY_EPSILON: f64 = 1e-11;

pub trait Cost: Debug + Send + Sync {
    /// Per-output cost of `prediction` against `target`.
    fn cost(&self, prediction: &[f64], target: &[f64]) -> Vec<f64>;
    /// Per-output derivative of the cost with respect to `prediction`.
    fn delta(&self, prediction: &[f64], target: &[f64]) -> Vec<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Costs {
    /// Half the squared error
    Squared,
    /// Binary cross entropy, for outputs in (0, 1)
    CrossEntropy,
}

impl Cost for Costs {
    fn cost(&self, prediction: &[f64], target: &[f64]) -> Vec<f64> {
        let pairs = prediction.iter().zip(target);
        match self {
            Costs::Squared => pairs.map(|(p, t)| 0.5 * (p - t) * (p - t)).collect(),
            Costs::CrossEntropy => pairs
                .map(|(&p, &t)| {
                    let p = p.clamp(CROSS_ENTROPY_EPSILON, 1.0 - CROSS_ENTROPY_EPSILON);
                    -(t * p.ln() + (1.0 - t) * (1.0 - p).ln())
                })
                .collect(),
        }
    }

    fn delta(&self, prediction: &[f64], target: &[f64]) -> Vec<f64> {
        let pairs = prediction.iter().zip(target);
        match self {
            Costs::Squared => pairs.map(|(p, t)| p - t).collect(),
            Costs::CrossEntropy => pairs
                .map(|(&p, &t)| (p - t) / (p - p * p).max(CROSS_ENTROPY_EPSILON))
                .collect(),
        }
    }
}

impl FromStr for Costs {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "squared" | "squared_error" => Ok(Costs::Squared),
            "cross_entropy" | "crossentropy" => Ok(Costs::CrossEntropy),
            _ => Err(Error::UnknownCost(name.to_string())),
        }
    }
}
