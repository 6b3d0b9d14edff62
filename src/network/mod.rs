//! Fixed-topology recurrent neural graphs. A graph is a square adjacency matrix over every
//! neuron, simulated for a fixed number of internal iterations per prediction. The same input is
//! re-injected into the sensory neurons on each iteration, so recurrent edges see it repeatedly.

pub mod activate;
pub mod aggregate;
pub mod loss;
pub mod transform;

pub use activate::{Activation, Elementwise, Identity, NormalizeMax, RelU, Tracker};
pub use aggregate::{Accumulator, Aggregate, Counter, Magnitude};
pub use loss::{CrossEntropy, LogCrossEntropy, Loss, MeanSquaredError};
pub use transform::{LogSoftmax, Softmax, Transform};

use crate::error::{expect_len, Error, Result};
use core::ops::Range;
use rulinalg::{
    matrix::{BaseMatrix, Matrix},
    vector::Vector,
};
use serde::{Deserialize, Serialize};

/// Neuron counts of a graph. Neurons are laid out as `[sensory | hidden | action]`, and the
/// adjacency is indexed as `[to, from]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub sensory: usize,
    pub hidden: usize,
    pub action: usize,
    /// Internal iterations simulated per prediction
    pub iterations: usize,
}

impl Topology {
    pub const fn new(sensory: usize, hidden: usize, action: usize, iterations: usize) -> Self {
        Self {
            sensory,
            hidden,
            action,
            iterations,
        }
    }

    #[inline]
    pub const fn total(&self) -> usize {
        self.sensory + self.hidden + self.action
    }

    #[inline]
    pub fn sensory(&self) -> Range<usize> {
        0..self.sensory
    }

    #[inline]
    pub fn hidden(&self) -> Range<usize> {
        self.sensory..self.sensory + self.hidden
    }

    #[inline]
    pub fn action(&self) -> Range<usize> {
        self.total() - self.action..self.total()
    }

    pub fn check_input(&self, input: &Vector<f64>) -> Result<()> {
        expect_len("input", self.sensory, input.size())
    }

    pub fn check_truth(&self, truth: &Vector<f64>) -> Result<()> {
        expect_len("truth", self.action, truth.size())
    }

    pub fn check_adjacency(&self, adjacency: &Matrix<f64>) -> Result<()> {
        let expected = self.total();
        if adjacency.rows() == expected && adjacency.cols() == expected {
            Ok(())
        } else {
            Err(Error::Adjacency {
                expected,
                rows: adjacency.rows(),
                cols: adjacency.cols(),
            })
        }
    }
}

/// One internal iteration: activate the product of the adjacency and the current state
#[inline]
pub fn single_pass(
    state: &Vector<f64>,
    adjacency: &Matrix<f64>,
    σ: &mut impl Activation,
) -> Vector<f64> {
    σ.activate(adjacency * state)
}

/// Add `input` onto the leading neurons of `state`
fn inject(mut state: Vector<f64>, input: &Vector<f64>) -> Vector<f64> {
    for (s, i) in state.mut_data().iter_mut().zip(input.iter()) {
        *s += *i;
    }
    state
}

/// The structural hyperparameters of a run: topology, plus how neurons activate, how successive
/// outputs combine, and how the combined output is finally transformed. None of it evolves.
#[derive(Debug, Clone)]
pub struct Graph<A, G, T> {
    pub topology: Topology,
    pub σ: A,
    pub aggregate: G,
    pub transform: T,
}

impl<A: Activation + Clone, G: Aggregate, T: Transform> Graph<A, G, T> {
    pub fn new(topology: Topology, σ: A, aggregate: G, transform: T) -> Self {
        Self {
            topology,
            σ,
            aggregate,
            transform,
        }
    }

    /// Predict the output for `input` under `adjacency`
    pub fn predict(&self, input: &Vector<f64>, adjacency: &Matrix<f64>) -> Result<Vector<f64>> {
        self.predict_with(input, adjacency, &mut self.σ.clone())
    }

    /// Predict with a caller-owned activation, which observes every internal iteration
    pub fn predict_with(
        &self,
        input: &Vector<f64>,
        adjacency: &Matrix<f64>,
        σ: &mut impl Activation,
    ) -> Result<Vector<f64>> {
        self.topology.check_input(input)?;
        self.topology.check_adjacency(adjacency)?;

        let action = self.topology.action();
        let mut state = Vector::zeros(self.topology.total());
        let mut output = self.aggregate.initial(self.topology.action);
        for _ in 0..self.topology.iterations {
            state = single_pass(&inject(state, input), adjacency, σ);
            output = self
                .aggregate
                .aggregate(output, &Vector::new(state.data()[action.clone()].to_vec()));
        }

        Ok(self.transform.transform(output))
    }

    /// Predict, and summarize every neuron's activations across the internal iterations with
    /// `tracking`
    pub fn predict_tracked<K: Aggregate + Clone>(
        &self,
        input: &Vector<f64>,
        adjacency: &Matrix<f64>,
        tracking: &K,
    ) -> Result<(Vector<f64>, Vector<f64>)> {
        let mut tracker = Tracker::new(self.σ.clone(), tracking.clone(), self.topology.total());
        let prediction = self.predict_with(input, adjacency, &mut tracker)?;
        Ok((prediction, tracker.into_summary()))
    }

    /// Walk the internal iterations one at a time, without aggregating or transforming output
    pub fn steps<'a>(
        &self,
        input: &'a Vector<f64>,
        adjacency: &'a Matrix<f64>,
    ) -> Result<Steps<'a, A>> {
        self.topology.check_input(input)?;
        self.topology.check_adjacency(adjacency)?;
        Ok(Steps {
            input,
            adjacency,
            σ: self.σ.clone(),
            state: Vector::zeros(self.topology.total()),
            remaining: self.topology.iterations,
        })
    }
}

impl Graph<RelU, Accumulator, LogSoftmax> {
    /// ReLU neurons whose summed outputs are read as log-probabilities
    pub fn classification(topology: Topology) -> Self {
        Self::new(topology, RelU::default(), Accumulator, LogSoftmax)
    }
}

/// The state of every neuron around one internal iteration
#[derive(Debug, Clone)]
pub struct Step {
    /// State after the input was added onto the sensory neurons
    pub injected: Vector<f64>,
    /// State after the pass, which carries into the next iteration
    pub activated: Vector<f64>,
}

pub struct Steps<'a, A> {
    input: &'a Vector<f64>,
    adjacency: &'a Matrix<f64>,
    σ: A,
    state: Vector<f64>,
    remaining: usize,
}

impl<A: Activation> Iterator for Steps<'_, A> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let injected = inject(self.state.clone(), self.input);
        let activated = single_pass(&injected, self.adjacency, &mut self.σ);
        self.state = activated.clone();
        Some(Step {
            injected,
            activated,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// An evolved graph: the run's structural hyperparameters with one fixed adjacency
#[derive(Debug, Clone)]
pub struct NeuralGraph<A, G, T> {
    graph: Graph<A, G, T>,
    adjacency: Matrix<f64>,
}

impl<A: Activation + Clone, G: Aggregate, T: Transform> NeuralGraph<A, G, T> {
    pub fn new(graph: Graph<A, G, T>, adjacency: Matrix<f64>) -> Result<Self> {
        graph.topology.check_adjacency(&adjacency)?;
        Ok(Self { graph, adjacency })
    }

    pub fn predict(&self, input: &Vector<f64>) -> Result<Vector<f64>> {
        self.graph.predict(input, &self.adjacency)
    }

    #[inline]
    pub fn adjacency(&self) -> &Matrix<f64> {
        &self.adjacency
    }

    #[inline]
    pub fn graph(&self) -> &Graph<A, G, T> {
        &self.graph
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assert_slice_approx;

    //  I1 X  H1 -
    //  I2 X  H2 - O
    //     X  H3 -
    fn fan_adjacency() -> Matrix<f64> {
        let mut w = Matrix::zeros(6, 6);
        w[[2, 0]] = 0.2; // I1 - H1
        w[[3, 0]] = -0.4; // I1 - H2
        w[[4, 0]] = -1.2; // I1 - H3
        w[[2, 1]] = -0.5; // I2 - H1
        w[[3, 1]] = 0.9; // I2 - H2
        w[[4, 1]] = 0.8; // I2 - H3
        w[[5, 2]] = 0.2; // H1 - O
        w[[5, 3]] = -0.5; // H2 - O
        w[[5, 4]] = 0.4; // H3 - O
        w
    }

    // I1 -{1.0}> H, I2 -{1.5}> H, H -{2.0}> O
    fn chain() -> (Graph<RelU, Accumulator, Identity>, Matrix<f64>) {
        let mut w = Matrix::zeros(4, 4);
        w[[2, 0]] = 1.0;
        w[[2, 1]] = 1.5;
        w[[3, 2]] = 2.0;
        (
            Graph::new(
                Topology::new(2, 1, 1, 3),
                RelU::default(),
                Accumulator,
                Identity,
            ),
            w,
        )
    }

    #[test]
    fn test_topology_ranges() {
        let t = Topology::new(2, 3, 1, 5);
        assert_eq!(t.total(), 6);
        assert_eq!(t.sensory(), 0..2);
        assert_eq!(t.hidden(), 2..5);
        assert_eq!(t.action(), 5..6);
    }

    #[test]
    fn test_single_pass() {
        let state = Vector::new(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        let result = single_pass(&state, &fan_adjacency(), &mut RelU::default());
        assert_slice_approx!(result.data(), [0., 0., 0., 0.14, 0.04, 0.06]);
    }

    #[test]
    fn test_steps_negative_input_stays_silent() {
        let (graph, w) = chain();
        let input = Vector::new(vec![-1., -2.]);
        let steps = graph.steps(&input, &w).unwrap().collect::<Vec<_>>();

        assert_eq!(steps.len(), 3);
        for step in steps {
            assert_slice_approx!(step.injected.data(), [-1., -2., 0., 0.]);
            assert_slice_approx!(step.activated.data(), [0., 0., 0., 0.]);
        }
    }

    #[test]
    fn test_steps_chain() {
        let (graph, w) = chain();
        let input = Vector::new(vec![1., 0.]);
        let steps = graph.steps(&input, &w).unwrap().collect::<Vec<_>>();

        assert_slice_approx!(steps[0].injected.data(), [1., 0., 0., 0.]);
        assert_slice_approx!(steps[0].activated.data(), [0., 0., 1., 0.]);
        assert_slice_approx!(steps[1].injected.data(), [1., 0., 1., 0.]);
        assert_slice_approx!(steps[1].activated.data(), [0., 0., 1., 2.]);
        assert_slice_approx!(steps[2].injected.data(), [1., 0., 1., 2.]);
        assert_slice_approx!(steps[2].activated.data(), [0., 0., 1., 2.]);

        let accumulated = steps.iter().fold(vec![0.; 4], |mut acc, step| {
            acc.iter_mut()
                .zip(step.injected.iter())
                .for_each(|(a, s)| *a += s);
            acc
        });
        assert_slice_approx!(accumulated, [3., 0., 2., 2.]);
    }

    #[test]
    fn test_predict_tracked_chain() {
        let (graph, w) = chain();

        let (prediction, summary) = graph
            .predict_tracked(&Vector::new(vec![1., 0.]), &w, &Accumulator)
            .unwrap();
        assert_slice_approx!(prediction.data(), [4.]);
        assert_slice_approx!(summary.data(), [0., 0., 3., 4.]);

        let (_, counted) = graph
            .predict_tracked(&Vector::new(vec![1., 0.]), &w, &Counter)
            .unwrap();
        assert_slice_approx!(counted.data(), [0., 0., 3., 2.]);

        let (prediction, summary) = graph
            .predict_tracked(&Vector::new(vec![-1., -2.]), &w, &Counter)
            .unwrap();
        assert_slice_approx!(prediction.data(), [0.]);
        assert_slice_approx!(summary.data(), [0., 0., 0., 0.]);
    }

    #[test]
    fn test_predict_silent_graph() {
        let topology = Topology::new(2, 3, 2, 4);
        let w = Matrix::zeros(7, 7);
        let input = Vector::zeros(2);

        let graph = Graph::new(topology, RelU::default(), Accumulator, Identity);
        let (prediction, summary) = graph.predict_tracked(&input, &w, &Magnitude).unwrap();
        assert_slice_approx!(prediction.data(), [0., 0.]);
        assert_slice_approx!(summary.data(), [0.; 7]);

        let graph = Graph::classification(topology);
        let prediction = graph.predict(&input, &w).unwrap();
        let uniform = (0.5f64).ln();
        assert_slice_approx!(prediction.data(), [uniform, uniform]);
    }

    #[test]
    fn test_predict_counter_aggregation() {
        let (graph, w) = chain();
        let graph = Graph::new(graph.topology, graph.σ, Counter, Softmax);
        let prediction = graph.predict(&Vector::new(vec![1., 0.]), &w).unwrap();
        // a single output is always certain, whatever it counted
        assert_slice_approx!(prediction.data(), [1.]);
    }

    #[test]
    fn test_predict_shape_mismatch() {
        let (graph, w) = chain();
        assert!(matches!(
            graph.predict(&Vector::new(vec![1., 0., 0.]), &w),
            Err(Error::Shape {
                what: "input",
                expected: 2,
                actual: 3
            })
        ));
        assert!(matches!(
            graph.predict(&Vector::new(vec![1., 0.]), &Matrix::zeros(4, 5)),
            Err(Error::Adjacency {
                expected: 4,
                rows: 4,
                cols: 5
            })
        ));
        assert!(NeuralGraph::new(graph, Matrix::zeros(3, 3)).is_err());
    }

    #[test]
    fn test_neural_graph_predict() {
        let (graph, w) = chain();
        let nn = NeuralGraph::new(graph, w).unwrap();
        assert_slice_approx!(nn.predict(&Vector::new(vec![1., 0.])).unwrap().data(), [4.]);
        assert_eq!(nn.adjacency().rows(), 4);
        assert_eq!(nn.graph().topology.iterations, 3);
    }
}
