//! Activation functions, applied to the whole pre-activation vector once per internal iteration.

use super::{
    aggregate::Aggregate,
    transform::{log_softmax, softmax, LogSoftmax, Softmax},
};
use crate::constants::EVOAI_EPSILON;
use core::{f64::consts::E, mem};
use rulinalg::vector::Vector;
use serde::{Deserialize, Serialize};

pub fn steep_sigmoid(x: f64) -> f64 {
    1. / (1. + E.powf(-4.9 * x))
}

pub fn relu(x: f64) -> f64 {
    if x < 0. {
        0.
    } else {
        x
    }
}

/// Maps a graph's pre-activation state to its next state. Takes `&mut self` so that an
/// activation may observe what passes through it, see [Tracker].
pub trait Activation {
    fn activate(&mut self, x: Vector<f64>) -> Vector<f64>;
}

/// Ramp with slope `k` and offset `d`: `max(k * x + d, 0)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelU {
    pub k: f64,
    pub d: f64,
}

impl RelU {
    pub fn new(k: f64, d: f64) -> Self {
        Self { k, d }
    }
}

impl Default for RelU {
    fn default() -> Self {
        Self { k: 1., d: 0. }
    }
}

impl Activation for RelU {
    fn activate(&mut self, x: Vector<f64>) -> Vector<f64> {
        let (k, d) = (self.k, self.d);
        x.apply(&|v| relu(k * v + d))
    }
}

/// Scale every value by the largest one. Left as is when the largest value is not positive
/// (all zero or all negative), where dividing would give NaN or flip signs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeMax;

impl Activation for NormalizeMax {
    fn activate(&mut self, x: Vector<f64>) -> Vector<f64> {
        let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max <= EVOAI_EPSILON || !max.is_finite() {
            return x;
        }
        x.apply(&|v| v / max)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Activation for Identity {
    fn activate(&mut self, x: Vector<f64>) -> Vector<f64> {
        x
    }
}

impl Activation for Softmax {
    fn activate(&mut self, x: Vector<f64>) -> Vector<f64> {
        softmax(x)
    }
}

impl Activation for LogSoftmax {
    fn activate(&mut self, x: Vector<f64>) -> Vector<f64> {
        log_softmax(x)
    }
}

/// Lift a scalar function, like [steep_sigmoid], into an elementwise activation
#[derive(Debug, Clone, Copy)]
pub struct Elementwise<F>(pub F);

impl<F: Fn(f64) -> f64> Activation for Elementwise<F> {
    fn activate(&mut self, x: Vector<f64>) -> Vector<f64> {
        x.apply(&self.0)
    }
}

/// Wraps an activation, folding each of its outputs into a per-neuron summary
#[derive(Debug, Clone)]
pub struct Tracker<A, K> {
    σ: A,
    aggregate: K,
    summary: Vector<f64>,
}

impl<A, K: Aggregate> Tracker<A, K> {
    pub fn new(σ: A, aggregate: K, neurons: usize) -> Self {
        let summary = aggregate.initial(neurons);
        Self {
            σ,
            aggregate,
            summary,
        }
    }

    #[inline]
    pub fn summary(&self) -> &Vector<f64> {
        &self.summary
    }

    #[inline]
    pub fn into_summary(self) -> Vector<f64> {
        self.summary
    }
}

impl<A: Activation, K: Aggregate> Activation for Tracker<A, K> {
    fn activate(&mut self, x: Vector<f64>) -> Vector<f64> {
        let activation = self.σ.activate(x);
        let summary = mem::replace(&mut self.summary, Vector::zeros(0));
        self.summary = self.aggregate.aggregate(summary, &activation);
        activation
    }
}
