//! Aggregators fold a sequence of equally sized vectors into one, starting from an identity.

use crate::constants::EVOAI_EPSILON;
use rulinalg::vector::Vector;

pub trait Aggregate {
    /// The identity element, `n` wide
    fn initial(&self, n: usize) -> Vector<f64> {
        Vector::zeros(n)
    }

    fn aggregate(&self, acc: Vector<f64>, x: &Vector<f64>) -> Vector<f64>;
}

#[inline]
fn fold_with(mut acc: Vector<f64>, x: &Vector<f64>, f: impl Fn(f64) -> f64) -> Vector<f64> {
    debug_assert_eq!(acc.size(), x.size());
    for (a, v) in acc.mut_data().iter_mut().zip(x.iter()) {
        *a += f(*v);
    }
    acc
}

/// Running sum
#[derive(Debug, Clone, Copy, Default)]
pub struct Accumulator;

impl Aggregate for Accumulator {
    fn aggregate(&self, acc: Vector<f64>, x: &Vector<f64>) -> Vector<f64> {
        fold_with(acc, x, |v| v)
    }
}

/// Running count of how often each entry was active
#[derive(Debug, Clone, Copy, Default)]
pub struct Counter;

impl Aggregate for Counter {
    fn aggregate(&self, acc: Vector<f64>, x: &Vector<f64>) -> Vector<f64> {
        fold_with(acc, x, |v| if v.abs() > EVOAI_EPSILON { 1. } else { 0. })
    }
}

/// Running sum of magnitudes
#[derive(Debug, Clone, Copy, Default)]
pub struct Magnitude;

impl Aggregate for Magnitude {
    fn aggregate(&self, acc: Vector<f64>, x: &Vector<f64>) -> Vector<f64> {
        fold_with(acc, x, f64::abs)
    }
}
