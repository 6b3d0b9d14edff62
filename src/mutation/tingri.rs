//! Tingri: changes weights, and spawns and kills connections, with a chance proportional to how
//! active each neuron was while the specimen was scored.
//!
//! Named after the town in Tibet that climbers use as a base before ascending Everest.

use super::Mutation;
use crate::{
    constants::*,
    error::{expect_len, Error, Result},
    network::Topology,
    population::Specimen,
};
use core::f64::consts::FRAC_1_SQRT_2;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use rulinalg::{
    matrix::{BaseMatrix, Matrix},
    vector::Vector,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TingriSettings {
    pub mutancy_change_deviation: f64,
    pub revive_change_deviation: f64,
    pub kill_change_deviation: f64,

    pub mutancy_initial_mean: f64,
    pub revive_initial_mean: f64,
    pub kill_initial_mean: f64,

    pub weight_initial_mean: f64,
    pub weight_initial_deviation: f64,

    /// Deviation of the weight given to a revived edge
    pub revive_weight_deviation: f64,
}

impl Default for TingriSettings {
    fn default() -> Self {
        Self {
            mutancy_change_deviation: EVOAI_MUTANCY_CHANGE_DEVIATION,
            revive_change_deviation: EVOAI_REVIVE_CHANGE_DEVIATION,
            kill_change_deviation: EVOAI_KILL_CHANGE_DEVIATION,
            mutancy_initial_mean: EVOAI_MUTANCY_INITIAL_MEAN,
            revive_initial_mean: EVOAI_REVIVE_INITIAL_MEAN,
            kill_initial_mean: EVOAI_KILL_INITIAL_MEAN,
            weight_initial_mean: EVOAI_WEIGHT_INITIAL_MEAN,
            weight_initial_deviation: EVOAI_WEIGHT_INITIAL_DEVIATION,
            revive_weight_deviation: EVOAI_REVIVE_WEIGHT_DEVIATION,
        }
    }
}

/// Genes steering how eagerly a specimen grows and prunes edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TingriProperties {
    pub revive_prior: f64,
    pub kill_prior: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Tingri {
    pub settings: TingriSettings,
}

impl Tingri {
    pub fn new(settings: TingriSettings) -> Self {
        Self { settings }
    }
}

/// Rejects negative and non-finite deviations, which `Normal::new` would otherwise mirror
fn normal(mean: f64, deviation: f64) -> Result<Normal<f64>> {
    if !(deviation >= 0. && deviation.is_finite()) {
        return Err(Error::Distribution { mean, deviation });
    }
    Normal::new(mean, deviation).map_err(|_| Error::Distribution { mean, deviation })
}

pub fn sample_normal(mean: f64, deviation: f64, rng: &mut impl Rng) -> Result<f64> {
    Ok(normal(mean, deviation)?.sample(rng))
}

#[inline]
fn average(v: &Vector<f64>) -> f64 {
    v.sum() / v.size() as f64
}

/// Per-neuron weight scale: `1 + mutancy * (a / mean(a) - 1)`. Neurons busier than average get
/// a factor above 1. Without any imbalance, or without any activity, every factor is 1.
pub fn weight_mutation_factors(activations: &Vector<f64>, mutancy: f64) -> Vector<f64> {
    let n = activations.size();
    let mean = average(activations);
    let uniform = activations.iter().all(|a| *a == activations[0]);
    if uniform || mean.abs() <= EVOAI_EPSILON {
        return Vector::ones(n);
    }

    activations
        .clone()
        .apply(&|a| (a / mean - 1.) * mutancy + 1.)
}

/// Scale every column of `adjacency` by the matching factor, so each edge drifts with the
/// activity of the neuron it leaves
pub fn mutate_adjacency(adjacency: &mut Matrix<f64>, factors: &Vector<f64>) {
    let cols = adjacency.cols();
    debug_assert_eq!(cols, factors.size());
    for row in adjacency.mut_data().chunks_mut(cols) {
        for (w, f) in row.iter_mut().zip(factors.iter()) {
            *w *= f;
        }
    }
}

/// Deviation of every activation from the mean, in units of mean absolute deviation. All 0
/// when there is no deviation to measure.
pub fn standard_deviations(activations: &Vector<f64>) -> Vector<f64> {
    let mean = average(activations);
    let deviations = activations.clone().apply(&|a| a - mean);
    let spread = average(&deviations.clone().apply(&f64::abs));
    if spread <= EVOAI_EPSILON || !spread.is_finite() {
        return Vector::zeros(activations.size());
    }

    deviations.apply(&|d| d / spread)
}

/// Standard normal cumulative distribution, elementwise
pub fn normal_cdf(x: &Vector<f64>) -> Vector<f64> {
    x.clone().apply(&|v| 0.5 * libm::erfc(-v * FRAC_1_SQRT_2))
}

/// `n x n` matrix whose column `j` is `f(cdf[j])`
fn broadcast_columns(cdf: &Vector<f64>, f: impl Fn(f64) -> f64) -> Matrix<f64> {
    let n = cdf.size();
    let row = cdf.iter().map(|c| f(*c)).collect::<Vec<_>>();
    Matrix::new(n, n, row.repeat(n))
}

pub fn kill_chances(cdf: &Vector<f64>, kill_prior: f64) -> Matrix<f64> {
    broadcast_columns(cdf, |c| (1. - c) * kill_prior)
}

pub fn revive_chances(cdf: &Vector<f64>, revive_prior: f64) -> Matrix<f64> {
    broadcast_columns(cdf, |c| c * revive_prior)
}

/// 0 where an edge is killed, 1 where it survives. Draws one uniform per entry, row-major.
pub fn kill_matrix(chances: &Matrix<f64>, rng: &mut impl Rng) -> Matrix<f64> {
    let data = chances
        .data()
        .iter()
        .map(|chance| {
            if rng.random::<f64>() < *chance {
                0.
            } else {
                1.
            }
        })
        .collect::<Vec<_>>();
    Matrix::new(chances.rows(), chances.cols(), data)
}

/// Fresh weights where a dead edge of `adjacency` comes alive, 0 elsewhere. Draws a uniform for
/// each dead entry, row-major, and a weight from `weights` for every revival.
pub fn revive_matrix(
    chances: &Matrix<f64>,
    adjacency: &Matrix<f64>,
    weights: &Normal<f64>,
    rng: &mut impl Rng,
) -> Matrix<f64> {
    let data = chances
        .data()
        .iter()
        .zip(adjacency.data().iter())
        .map(|(chance, w)| {
            if w.abs() <= EVOAI_EPSILON && rng.random::<f64>() < *chance {
                weights.sample(rng)
            } else {
                0.
            }
        })
        .collect::<Vec<_>>();
    Matrix::new(chances.rows(), chances.cols(), data)
}

/// Kill live edges and revive dead ones. Edges leaving neurons that deviate above the mean are
/// likelier to revive, those leaving quiet neurons likelier to die.
pub fn revive_or_kill(
    adjacency: &mut Matrix<f64>,
    deviations: &Vector<f64>,
    revive_prior: f64,
    kill_prior: f64,
    weights: &Normal<f64>,
    rng: &mut impl Rng,
) {
    let cdf = normal_cdf(deviations);
    let kill = kill_matrix(&kill_chances(&cdf, kill_prior), rng);
    let revive = revive_matrix(&revive_chances(&cdf, revive_prior), adjacency, weights, rng);

    for ((w, k), r) in adjacency
        .mut_data()
        .iter_mut()
        .zip(kill.data().iter())
        .zip(revive.data().iter())
    {
        *w = *w * k + r;
    }
}

impl Mutation for Tingri {
    type Properties = TingriProperties;

    fn create_specimen(
        &self,
        topology: &Topology,
        rng: &mut impl Rng,
    ) -> Result<Specimen<TingriProperties>> {
        let s = &self.settings;
        let mutancy = sample_normal(s.mutancy_initial_mean, s.mutancy_change_deviation, rng)?;
        let kill_prior = sample_normal(s.kill_initial_mean, s.kill_change_deviation, rng)?;
        let revive_prior = sample_normal(s.revive_initial_mean, s.revive_change_deviation, rng)?;

        let n = topology.total();
        let weights = normal(s.weight_initial_mean, s.weight_initial_deviation)?;
        let adjacency = Matrix::new(
            n,
            n,
            (0..n * n).map(|_| weights.sample(rng)).collect::<Vec<_>>(),
        );

        Ok(Specimen::new(
            adjacency,
            mutancy,
            TingriProperties {
                revive_prior,
                kill_prior,
            },
        ))
    }

    fn mutate(
        &self,
        specimen: &mut Specimen<TingriProperties>,
        activations: &Vector<f64>,
        rng: &mut impl Rng,
    ) -> Result<()> {
        expect_len("activations", specimen.neurons(), activations.size())?;
        let s = &self.settings;
        let revive_weights = normal(0., s.revive_weight_deviation)?;

        let factors = weight_mutation_factors(activations, specimen.mutancy);
        mutate_adjacency(&mut specimen.adjacency, &factors);

        let deviations = standard_deviations(activations);
        let TingriProperties {
            revive_prior,
            kill_prior,
        } = specimen.properties;
        revive_or_kill(
            &mut specimen.adjacency,
            &deviations,
            revive_prior,
            kill_prior,
            &revive_weights,
            rng,
        );

        specimen.mutancy = sample_normal(specimen.mutancy, s.mutancy_change_deviation, rng)?;
        specimen.properties.revive_prior =
            sample_normal(revive_prior, s.revive_change_deviation, rng)?;
        specimen.properties.kill_prior = sample_normal(kill_prior, s.kill_change_deviation, rng)?;

        trace!(
            mutancy = specimen.mutancy,
            revive_prior = specimen.properties.revive_prior,
            kill_prior = specimen.properties.kill_prior,
            live_edges = specimen.live_edges(),
            "mutated specimen"
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{assert_f64_approx, assert_slice_approx, new_t, random::ConstRng};
    use rand::{rngs::StdRng, SeedableRng};

    fn v(data: &[f64]) -> Vector<f64> {
        Vector::new(data.to_vec())
    }

    #[test]
    fn test_weight_mutation_factors_mutancy_one() {
        let result = weight_mutation_factors(&v(&[1., 2., 6., 0., 2., 1.]), 1.);
        assert_slice_approx!(result.data(), [0.5, 1., 3., 0., 1., 0.5]);
    }

    #[test]
    fn test_weight_mutation_factors_equal() {
        let result = weight_mutation_factors(&v(&[3.; 6]), 1.);
        assert!(result.iter().all(|f| *f == 1.));
    }

    #[test]
    fn test_weight_mutation_factors_typical() {
        let result = weight_mutation_factors(&v(&[1., 2., 6., 0., 2., 1.]), 0.1);
        assert_slice_approx!(result.data(), [0.95, 1., 1.2, 0.9, 1., 0.95]);
    }

    #[test]
    fn test_weight_mutation_factors_silent() {
        let result = weight_mutation_factors(&v(&[0.; 4]), 0.7);
        assert!(result.iter().all(|f| *f == 1.));

        // activity that cancels out is as good as none
        let result = weight_mutation_factors(&v(&[-1., 1., -2., 2.]), 0.7);
        assert!(result.iter().all(|f| *f == 1.));
    }

    #[test]
    fn test_sample_normal_mean() {
        let mut rng = StdRng::seed_from_u64(1234);
        let samples = (0..1000)
            .map(|_| sample_normal(5., 2., &mut rng).unwrap())
            .sum::<f64>();
        assert_f64_approx!(samples / 1000., 5., tolerance = 0.3);
    }

    #[test]
    fn test_sample_normal_bad_deviation() {
        assert!(matches!(
            sample_normal(0., -1., &mut StdRng::seed_from_u64(0)),
            Err(Error::Distribution { .. })
        ));
        assert!(matches!(
            sample_normal(0., f64::NAN, &mut StdRng::seed_from_u64(0)),
            Err(Error::Distribution { .. })
        ));
        assert_f64_approx!(sample_normal(1.5, 0., &mut StdRng::seed_from_u64(0)).unwrap(), 1.5);
    }

    #[test]
    fn test_negative_settings_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let topology = Topology::new(1, 1, 1, 1);
        let bad_weights = Tingri::new(new_t!(TingriSettings, weight_initial_deviation = -1.));
        assert!(matches!(
            bad_weights.create_specimen(&topology, &mut rng),
            Err(Error::Distribution { deviation, .. }) if deviation == -1.
        ));

        let bad_walk = Tingri::new(new_t!(TingriSettings, kill_change_deviation = -0.01));
        let mut specimen = Tingri::default().create_specimen(&topology, &mut rng).unwrap();
        assert!(matches!(
            bad_walk.mutate(&mut specimen, &Vector::new(vec![1., 2., 3.]), &mut rng),
            Err(Error::Distribution { .. })
        ));
    }

    #[test]
    fn test_mutate_adjacency_no_mutation() {
        let mut w = Matrix::ones(6, 6);
        mutate_adjacency(&mut w, &Vector::ones(6));
        assert!(w.data().iter().all(|w| *w == 1.));
    }

    #[test]
    fn test_mutate_adjacency_ones() {
        let factors = [0.95, 1.2, 0.9, 1.1, 0.9, 1.3];
        let mut w = Matrix::ones(6, 6);
        mutate_adjacency(&mut w, &v(&factors));
        for row in w.data().chunks(6) {
            assert_slice_approx!(row, factors);
        }
    }

    #[test]
    fn test_mutate_adjacency_typical() {
        let mut w = Matrix::new(2, 2, vec![0.7, -1.2, 0.3, -0.3]);
        mutate_adjacency(&mut w, &v(&[0.95, 1.2]));
        assert_slice_approx!(
            w.data(),
            [0.7 * 0.95, -1.2 * 1.2, 0.3 * 0.95, -0.3 * 1.2]
        );
    }

    #[test]
    fn test_normal_cdf() {
        let result = normal_cdf(&v(&[2.1, -1.2, 0.]));
        assert_slice_approx!(result.data(), [0.98213558, 0.11506967, 0.5]);
    }

    #[test]
    fn test_kill_chances() {
        let result = kill_chances(&v(&[0.1, 0.99]), 0.5);
        assert_slice_approx!(result.data(), [0.45, 0.005, 0.45, 0.005]);
    }

    #[test]
    fn test_revive_chances() {
        let result = revive_chances(&v(&[0.1, 0.99]), 0.5);
        assert_slice_approx!(result.data(), [0.05, 0.495, 0.05, 0.495]);
    }

    #[test]
    fn test_kill_matrix() {
        let chances = Matrix::new(2, 2, vec![0.1, 0.9, 0.1, 0.9]);
        let result = kill_matrix(&chances, &mut ConstRng::uniform(0.5));
        assert_slice_approx!(result.data(), [1., 0., 1., 0.]);
    }

    #[test]
    fn test_revive_matrix() {
        let chances = Matrix::new(2, 2, vec![1., 1., 0., 0.]);
        let adjacency = Matrix::new(2, 2, vec![0., 1.3, 0., 0.]);
        let weights = normal(0., 0.5).unwrap();
        let result = revive_matrix(
            &chances,
            &adjacency,
            &weights,
            &mut StdRng::seed_from_u64(1234),
        );

        assert!(result[[0, 0]].abs() > EVOAI_EPSILON); // dead, certain to revive
        assert_f64_approx!(result[[0, 1]], 0.); // alive already
        assert_f64_approx!(result[[1, 0]], 0.); // dead, no chance
        assert_f64_approx!(result[[1, 1]], 0.);
    }

    #[test]
    fn test_revive_matrix_never_draws_for_live_edges() {
        let chances = Matrix::new(1, 2, vec![0.9, 0.9]);
        let adjacency = Matrix::new(1, 2, vec![0.4, -2.]);
        let weights = normal(0., 0.5).unwrap();
        // a uniform of 0.1 would revive anything dead
        let result = revive_matrix(&chances, &adjacency, &weights, &mut ConstRng::uniform(0.1));
        assert_slice_approx!(result.data(), [0., 0.]);
    }

    #[test]
    fn test_revive_or_kill() {
        let mut w = Matrix::new(2, 2, vec![0., 1.3, 1.1, 0.]);
        let weights = normal(0., 0.5).unwrap();

        revive_or_kill(
            &mut w,
            &v(&[4.9, -5.7]),
            1.,
            1.,
            &weights,
            &mut StdRng::seed_from_u64(1234),
        );

        assert!(w[[0, 0]].abs() > EVOAI_EPSILON); // connection came alive
        assert_f64_approx!(w[[1, 0]], 1.1); // connection stays alive
        assert_f64_approx!(w[[0, 1]], 0.); // connection is killed
        assert_f64_approx!(w[[1, 1]], 0.); // connection stays dead
    }

    #[test]
    fn test_standard_deviations() {
        let result = standard_deviations(&v(&[-4., -1., 0., 1.]));
        assert_slice_approx!(result.data(), [-2., 0., 2. / 3., 4. / 3.]);
    }

    #[test]
    fn test_standard_deviations_uniform() {
        let result = standard_deviations(&v(&[2.5; 5]));
        assert!(result.iter().all(|d| *d == 0.));
    }

    #[test]
    fn test_mutate_typical() {
        let tingri = Tingri::default();
        let mut rng = StdRng::seed_from_u64(1234);
        let mut specimen = tingri
            .create_specimen(&Topology::new(2, 3, 1, 5), &mut rng)
            .unwrap();
        specimen.mutancy = 0.5;
        specimen.properties = TingriProperties {
            revive_prior: 0.5,
            kill_prior: 0.5,
        };

        tingri
            .mutate(&mut specimen, &v(&[4., 1., 0., 1., 7., 5.]), &mut rng)
            .unwrap();

        assert_f64_approx!(specimen.mutancy, 0.5, tolerance = 0.3);
        assert_f64_approx!(specimen.properties.revive_prior, 0.5, tolerance = 0.3);
        assert_f64_approx!(specimen.properties.kill_prior, 0.5, tolerance = 0.3);
        assert_eq!(specimen.adjacency.rows(), 6);
        assert_eq!(specimen.adjacency.cols(), 6);
        assert!(specimen.adjacency.data().iter().all(|w| w.is_finite()));
    }

    #[test]
    fn test_mutate_balanced_activity_leaves_weights() {
        let tingri = Tingri::new(new_t!(
            TingriSettings,
            mutancy_change_deviation = 0.,
            revive_change_deviation = 0.,
            kill_change_deviation = 0.,
        ));
        let mut rng = StdRng::seed_from_u64(99);
        let mut specimen = tingri
            .create_specimen(&Topology::new(2, 2, 1, 3), &mut rng)
            .unwrap();
        specimen.mutancy = 0.8;
        let before = specimen.adjacency.clone();

        for activations in [v(&[2.; 5]), v(&[0.; 5])] {
            tingri.mutate(&mut specimen, &activations, &mut rng).unwrap();
            assert_eq!(specimen.adjacency.data(), before.data());
            assert_f64_approx!(specimen.mutancy, 0.8);
        }
    }

    #[test]
    fn test_mutate_wrong_activation_size() {
        let tingri = Tingri::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut specimen = tingri
            .create_specimen(&Topology::new(1, 1, 1, 1), &mut rng)
            .unwrap();
        assert!(matches!(
            tingri.mutate(&mut specimen, &v(&[1., 2.]), &mut rng),
            Err(Error::Shape {
                what: "activations",
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_create_specimen() {
        let tingri = Tingri::new(new_t!(
            TingriSettings,
            kill_initial_mean = 1.,
            kill_change_deviation = 0.,
            revive_initial_mean = 2.,
            revive_change_deviation = 0.,
            mutancy_initial_mean = 3.,
            mutancy_change_deviation = 0.,
            weight_initial_mean = 4.,
            weight_initial_deviation = 0.,
        ));

        let specimen = tingri
            .create_specimen(&Topology::new(2, 3, 1, 5), &mut StdRng::seed_from_u64(7))
            .unwrap();

        assert_f64_approx!(specimen.mutancy, 3.);
        assert_f64_approx!(specimen.properties.revive_prior, 2.);
        assert_f64_approx!(specimen.properties.kill_prior, 1.);
        assert!(specimen.adjacency.data().iter().all(|w| *w == 4.));
    }
}
