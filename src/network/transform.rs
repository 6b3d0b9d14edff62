//! Transforms applied once to a graph's aggregated output, producing its prediction.

use rulinalg::vector::Vector;
use serde::{Deserialize, Serialize};

pub trait Transform {
    fn transform(&self, x: Vector<f64>) -> Vector<f64>;
}

#[inline]
fn max(x: &Vector<f64>) -> f64 {
    x.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

pub(crate) fn softmax(x: Vector<f64>) -> Vector<f64> {
    let max = max(&x);
    let exp = x.apply(&|v| (v - max).exp());
    let sum = exp.sum();
    exp.apply(&|v| v / sum)
}

pub(crate) fn log_softmax(x: Vector<f64>) -> Vector<f64> {
    let max = max(&x);
    let log_sum = x.iter().map(|v| (v - max).exp()).sum::<f64>().ln();
    x.apply(&|v| v - max - log_sum)
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Softmax;

impl Transform for Softmax {
    fn transform(&self, x: Vector<f64>) -> Vector<f64> {
        softmax(x)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LogSoftmax;

impl Transform for LogSoftmax {
    fn transform(&self, x: Vector<f64>) -> Vector<f64> {
        log_softmax(x)
    }
}

impl Transform for super::Identity {
    fn transform(&self, x: Vector<f64>) -> Vector<f64> {
        x
    }
}
