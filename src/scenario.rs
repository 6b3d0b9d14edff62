//! The evolutionary loop: Score -> Fitness -> Select -> Mutate, one training pair per generation.

use crate::{
    config::Config,
    error::{expect_len, Error, Result},
    eval::{fitness, score, MaybeSync},
    mutation::Mutation,
    network::{Accumulator, Activation, Aggregate, Graph, Loss, NeuralGraph, Transform},
    population::{create_population, fittest, Population, Specimen},
    random::WyRng,
    reproduce::{mutate, select},
};
use core::ops::ControlFlow;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rulinalg::vector::Vector;
use tracing::{debug, info, warn};

/// What a generation looked like once scored, before selection replaced its population
#[derive(Debug)]
pub struct Stats<'a, P> {
    pub generation: usize,
    pub losses: &'a [f64],
    pub fitness: &'a [f64],
    pub population: &'a [Specimen<P>],
}

impl<P> Stats<'_, P> {
    pub fn best_loss(&self) -> f64 {
        self.losses
            .iter()
            .copied()
            .filter(|l| !l.is_nan())
            .fold(f64::INFINITY, f64::min)
    }

    pub fn mean_loss(&self) -> f64 {
        self.losses.iter().sum::<f64>() / self.losses.len() as f64
    }
}

/// Fitness that treats everyone alike, for generations whose losses can't be told apart
fn fitness_or_uniform(losses: &[f64], generation: usize) -> Result<Vec<f64>> {
    match fitness(losses) {
        Err(Error::DegenerateLosses(max)) => {
            warn!(generation, max, "degenerate losses, using uniform fitness");
            Ok(vec![1.; losses.len()])
        }
        result => result,
    }
}

/// One generation: score `population` on `input`, turn the losses into fitness, select by it
/// and mutate the survivors. Calls `hook` between scoring and selection.
#[allow(clippy::too_many_arguments)]
pub fn evolve_step<A, G, T, M, L, K>(
    graph: &Graph<A, G, T>,
    population: &Population<M::Properties>,
    strategy: &M,
    input: &Vector<f64>,
    truth: &Vector<f64>,
    loss: &L,
    tracking: &K,
    rng: &mut impl Rng,
    generation: usize,
    mut hook: impl FnMut(&Stats<M::Properties>) -> ControlFlow<()>,
) -> Result<(Population<M::Properties>, ControlFlow<()>)>
where
    A: Activation + Clone + MaybeSync,
    G: Aggregate + MaybeSync,
    T: Transform + MaybeSync,
    M: Mutation,
    M::Properties: MaybeSync,
    L: Loss + MaybeSync,
    K: Aggregate + Clone + MaybeSync,
{
    let (losses, activations) = score(graph, population, input, truth, loss, tracking)?;
    let fitness = fitness_or_uniform(&losses, generation)?;

    let flow = hook(&Stats {
        generation,
        losses: &losses,
        fitness: &fitness,
        population,
    });

    let (mut selected, activations) = select(population, &activations, &fitness)?;
    mutate(&mut selected, strategy, &activations, rng)?;
    Ok((selected, flow))
}

/// Everything that drives a run besides the graph and the training data. `K` summarizes
/// neuron activity for mutation, `R` is the single random stream the run draws from.
#[derive(Debug, Clone)]
pub struct Evolution<M, L, K = Accumulator, R = WyRng> {
    pub config: Config,
    pub strategy: M,
    pub loss: L,
    pub tracking: K,
    pub rng: R,
}

impl<M, L> Evolution<M, L> {
    /// Accumulated activity guides mutation, and randomness is seeded from `config`
    pub fn new(config: Config, strategy: M, loss: L) -> Self {
        let rng = WyRng::seed_from_u64(config.seed);
        Self {
            config,
            strategy,
            loss,
            tracking: Accumulator,
            rng,
        }
    }
}

impl<M, L, K, R> Evolution<M, L, K, R> {
    pub fn with_tracking<K2: Aggregate>(self, tracking: K2) -> Evolution<M, L, K2, R> {
        Evolution {
            config: self.config,
            strategy: self.strategy,
            loss: self.loss,
            tracking,
            rng: self.rng,
        }
    }

    pub fn with_rng<R2: Rng>(self, rng: R2) -> Evolution<M, L, K, R2> {
        Evolution {
            config: self.config,
            strategy: self.strategy,
            loss: self.loss,
            tracking: self.tracking,
            rng,
        }
    }
}

impl<M, L, K, R> Evolution<M, L, K, R>
where
    M: Mutation,
    M::Properties: MaybeSync,
    L: Loss + MaybeSync,
    K: Aggregate + Clone + MaybeSync,
    R: Rng,
{
    /// Evolve for the configured number of generations and return the specimen credited with
    /// the most fitness along the way
    pub fn evolve<A, G, T>(
        &mut self,
        graph: Graph<A, G, T>,
        inputs: &[Vector<f64>],
        truths: &[Vector<f64>],
    ) -> Result<NeuralGraph<A, G, T>>
    where
        A: Activation + Clone + MaybeSync,
        G: Aggregate + MaybeSync,
        T: Transform + MaybeSync,
    {
        self.evolve_with(graph, inputs, truths, |_| ControlFlow::Continue(()))
    }

    /// [Evolution::evolve], calling `hook` with every generation's [Stats]. The run stops early
    /// once `hook` breaks, after that generation has been selected and mutated.
    pub fn evolve_with<A, G, T>(
        &mut self,
        graph: Graph<A, G, T>,
        inputs: &[Vector<f64>],
        truths: &[Vector<f64>],
        mut hook: impl FnMut(&Stats<M::Properties>) -> ControlFlow<()>,
    ) -> Result<NeuralGraph<A, G, T>>
    where
        A: Activation + Clone + MaybeSync,
        G: Aggregate + MaybeSync,
        T: Transform + MaybeSync,
    {
        expect_len("truths", inputs.len(), truths.len())?;
        if inputs.is_empty() {
            return Err(Error::EmptyTrainingSet);
        }
        for (input, truth) in inputs.iter().zip(truths.iter()) {
            graph.topology.check_input(input)?;
            graph.topology.check_truth(truth)?;
        }
        if self.config.population_size == 0 {
            return Err(Error::EmptyPopulation);
        }

        info!(
            population = self.config.population_size,
            generations = self.config.generations,
            seed = self.config.seed,
            neurons = graph.topology.total(),
            "evolving"
        );

        let mut order = (0..inputs.len()).collect::<Vec<_>>();
        order.shuffle(&mut self.rng);

        let mut population = create_population(
            self.config.population_size,
            &graph.topology,
            &self.strategy,
            &mut self.rng,
        )?;

        let mut cursor = 0;
        for generation in 0..self.config.generations {
            let pair = order[cursor];
            cursor = (cursor + 1) % order.len();

            let (next, flow) = evolve_step(
                &graph,
                &population,
                &self.strategy,
                &inputs[pair],
                &truths[pair],
                &self.loss,
                &self.tracking,
                &mut self.rng,
                generation,
                |stats| {
                    debug!(
                        generation,
                        pair,
                        best_loss = stats.best_loss(),
                        mean_loss = stats.mean_loss(),
                        "scored"
                    );
                    hook(stats)
                },
            )?;
            population = next;

            if flow.is_break() {
                info!(generation, "stopped early");
                break;
            }
        }

        let best = fittest(&population).ok_or(Error::EmptyPopulation)?;
        info!(
            fitness_score = best.fitness_score,
            live_edges = best.live_edges(),
            "evolved"
        );
        NeuralGraph::new(graph, best.adjacency.clone())
    }
}
