//! Scoring a population against one training pair, and turning losses into fitness.

use crate::{
    constants::EVOAI_EPSILON,
    error::{Error, Result},
    network::{Activation, Aggregate, Graph, Loss, Transform},
    population::{ActivationSummary, Specimen},
};
use rulinalg::vector::Vector;

/// `Sync` when scoring fans out over threads, nothing otherwise
#[cfg(feature = "parallel")]
pub trait MaybeSync: Sync {}
#[cfg(feature = "parallel")]
impl<T: Sync> MaybeSync for T {}

#[cfg(not(feature = "parallel"))]
pub trait MaybeSync {}
#[cfg(not(feature = "parallel"))]
impl<T> MaybeSync for T {}

fn score_one<A, G, T, P, L, K>(
    graph: &Graph<A, G, T>,
    specimen: &Specimen<P>,
    input: &Vector<f64>,
    truth: &Vector<f64>,
    loss: &L,
    tracking: &K,
) -> Result<(f64, Vector<f64>)>
where
    A: Activation + Clone,
    G: Aggregate,
    T: Transform,
    L: Loss,
    K: Aggregate + Clone,
{
    let (prediction, summary) = graph.predict_tracked(input, &specimen.adjacency, tracking)?;
    Ok((loss.loss(&prediction, truth), summary))
}

/// Run every specimen on `input`, returning its loss against `truth` and its activation summary
/// folded by `tracking`. Both outputs are aligned with `population`.
pub fn score<A, G, T, P, L, K>(
    graph: &Graph<A, G, T>,
    population: &[Specimen<P>],
    input: &Vector<f64>,
    truth: &Vector<f64>,
    loss: &L,
    tracking: &K,
) -> Result<(Vec<f64>, ActivationSummary)>
where
    A: Activation + Clone + MaybeSync,
    G: Aggregate + MaybeSync,
    T: Transform + MaybeSync,
    P: MaybeSync,
    L: Loss + MaybeSync,
    K: Aggregate + Clone + MaybeSync,
{
    graph.topology.check_input(input)?;
    graph.topology.check_truth(truth)?;

    #[cfg(not(feature = "parallel"))]
    let scored = population
        .iter()
        .map(|specimen| score_one(graph, specimen, input, truth, loss, tracking))
        .collect::<Result<Vec<_>>>()?;

    #[cfg(feature = "parallel")]
    let scored = {
        use rayon::prelude::*;
        population
            .par_iter()
            .map(|specimen| score_one(graph, specimen, input, truth, loss, tracking))
            .collect::<Result<Vec<_>>>()?
    };

    Ok(scored.into_iter().unzip())
}

/// `1 - loss / max(losses)`: the worst specimen gets 0, a perfect one 1.
///
/// Non-finite losses get 0 and are left out of the maximum. A finite negative loss would land
/// outside `[0, 1]`, and fails with [Error::NegativeLoss]. When the maximum is not above
/// [EVOAI_EPSILON] there is nothing to tell specimens apart by, reported as
/// [Error::DegenerateLosses].
pub fn fitness(losses: &[f64]) -> Result<Vec<f64>> {
    if losses.is_empty() {
        return Err(Error::EmptyPopulation);
    }
    if let Some((index, &loss)) = losses
        .iter()
        .enumerate()
        .find(|(_, l)| **l < 0. && l.is_finite())
    {
        return Err(Error::NegativeLoss { index, loss });
    }

    let max = losses
        .iter()
        .copied()
        .filter(|l| l.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if max <= EVOAI_EPSILON {
        return Err(Error::DegenerateLosses(max));
    }

    Ok(losses
        .iter()
        .map(|l| if l.is_finite() { 1. - l / max } else { 0. })
        .collect())
}
