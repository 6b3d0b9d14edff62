//! Loss functions comparing a prediction against a truth, lower is better.

use rulinalg::vector::Vector;
use serde::{Deserialize, Serialize};

pub trait Loss {
    fn loss(&self, predicted: &Vector<f64>, actual: &Vector<f64>) -> f64;
}

/// `|p - a|² / n`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MeanSquaredError;

impl Loss for MeanSquaredError {
    fn loss(&self, predicted: &Vector<f64>, actual: &Vector<f64>) -> f64 {
        predicted
            .iter()
            .zip(actual.iter())
            .map(|(p, a)| (p - a).powi(2))
            .sum::<f64>()
            / predicted.size() as f64
    }
}

/// `-Σ a·ln(p)`, for predictions that are probabilities
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CrossEntropy;

impl Loss for CrossEntropy {
    fn loss(&self, predicted: &Vector<f64>, actual: &Vector<f64>) -> f64 {
        -predicted
            .iter()
            .zip(actual.iter())
            .map(|(p, a)| a * p.ln())
            .sum::<f64>()
    }
}

/// `-Σ a·p`, for predictions that are already log-probabilities
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LogCrossEntropy;

impl Loss for LogCrossEntropy {
    fn loss(&self, predicted: &Vector<f64>, actual: &Vector<f64>) -> f64 {
        -predicted
            .iter()
            .zip(actual.iter())
            .map(|(p, a)| a * p)
            .sum::<f64>()
    }
}
