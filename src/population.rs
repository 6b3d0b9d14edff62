//! Specimens, and populations of them.

use crate::{
    constants::EVOAI_EPSILON,
    error::{Error, Result},
    mutation::Mutation,
    network::Topology,
};
use rand::Rng;
use rulinalg::{
    matrix::{BaseMatrix, Matrix},
    vector::Vector,
};

/// One evolvable unit: a weighted adjacency over every neuron of the graph, plus the genes that
/// steer its own mutation. `P` holds the genes specific to a [Mutation] strategy.
#[derive(Debug, Clone)]
pub struct Specimen<P> {
    /// `[to, from]` weights. An edge whose weight is within [EVOAI_EPSILON] of 0 is dead
    pub adjacency: Matrix<f64>,
    /// How strongly weights drift on mutation
    pub mutancy: f64,
    /// Fitness credited each time this specimen's line was selected
    pub fitness_score: f64,
    pub properties: P,
}

impl<P> Specimen<P> {
    pub fn new(adjacency: Matrix<f64>, mutancy: f64, properties: P) -> Self {
        Self {
            adjacency,
            mutancy,
            fitness_score: 0.,
            properties,
        }
    }

    #[inline]
    pub fn is_alive(&self, to: usize, from: usize) -> bool {
        self.adjacency[[to, from]].abs() > EVOAI_EPSILON
    }

    pub fn live_edges(&self) -> usize {
        self.adjacency
            .data()
            .iter()
            .filter(|w| w.abs() > EVOAI_EPSILON)
            .count()
    }

    #[inline]
    pub fn neurons(&self) -> usize {
        self.adjacency.rows()
    }
}

/// Ordered specimens. Order only matters for alignment with per-specimen data produced in the
/// same pass, like an [ActivationSummary].
pub type Population<P> = Vec<Specimen<P>>;

/// Per-specimen activation summaries, aligned by index with a [Population]
pub type ActivationSummary = Vec<Vector<f64>>;

/// A population of `n` specimens created by `strategy`
pub fn create_population<M: Mutation>(
    n: usize,
    topology: &Topology,
    strategy: &M,
    rng: &mut impl Rng,
) -> Result<Population<M::Properties>> {
    if n == 0 {
        return Err(Error::EmptyPopulation);
    }

    (0..n)
        .map(|_| strategy.create_specimen(topology, rng))
        .collect()
}

/// The specimen with the most accumulated fitness credit
pub fn fittest<P>(population: &[Specimen<P>]) -> Option<&Specimen<P>> {
    population
        .iter()
        .max_by(|l, r| l.fitness_score.total_cmp(&r.fitness_score))
}
