//! Functions related to reproducing a scored population into the next generation.

use crate::{
    constants::EVOAI_EPSILON,
    error::{expect_len, Result},
    mutation::Mutation,
    population::{ActivationSummary, Population, Specimen},
};
use rand::Rng;
use rulinalg::vector::Vector;
use tracing::warn;

/// Stochastic universal sampling: resample `population` to the same size, each specimen copied
/// with a chance proportional to its share of the total fitness. Every copy is credited its
/// fitness, and carries its activation summary along.
///
/// A single comb of evenly spaced pointers is walked over the cumulative fitness, reading from
/// the middle of the population and wrapping past the end, so selection takes no randomness.
/// Without any fitness to share the population is copied as is.
pub fn select<P: Clone>(
    population: &[Specimen<P>],
    activations: &[Vector<f64>],
    fitness: &[f64],
) -> Result<(Population<P>, ActivationSummary)> {
    let size = population.len();
    expect_len("activations", size, activations.len())?;
    expect_len("fitness", size, fitness.len())?;

    let total = fitness.iter().sum::<f64>();
    if !(total >= EVOAI_EPSILON && total.is_finite()) {
        if size > 0 {
            warn!(total, "no fitness to select by, keeping the population");
        }
        return Ok((population.to_vec(), activations.to_vec()));
    }

    let interval = total / size as f64;
    let mut selected = Vec::with_capacity(size);
    let mut selected_activations = Vec::with_capacity(size);

    let mut idx = size / 2;
    let mut cumulative = 0.;
    let mut comb = interval;
    while selected.len() < size {
        if cumulative + fitness[idx] >= comb {
            let mut specimen = population[idx].clone();
            specimen.fitness_score += fitness[idx];
            selected.push(specimen);
            selected_activations.push(activations[idx].clone());
            comb += interval;
        } else {
            cumulative += fitness[idx];
            idx = (idx + 1) % size;
        }
    }

    Ok((selected, selected_activations))
}

/// Mutate every specimen in place with `strategy`, using its aligned activation summary
pub fn mutate<M: Mutation>(
    population: &mut [Specimen<M::Properties>],
    strategy: &M,
    activations: &[Vector<f64>],
    rng: &mut impl Rng,
) -> Result<()> {
    expect_len("activations", population.len(), activations.len())?;
    population
        .iter_mut()
        .zip(activations.iter())
        .try_for_each(|(specimen, activations)| strategy.mutate(specimen, activations, rng))
}
