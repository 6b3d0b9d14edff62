//! Mutation strategies. A strategy creates fresh specimens, and mutates survivors in place using
//! the activation summary gathered while scoring them.

pub mod tingri;

pub use tingri::{Tingri, TingriProperties, TingriSettings};

use crate::{error::Result, network::Topology, population::Specimen};
use core::fmt::Debug;
use rand::Rng;
use rulinalg::vector::Vector;

pub trait Mutation {
    /// Strategy specific genes carried by every specimen
    type Properties: Clone + Debug;

    /// A specimen with random weights and genes, sized for `topology`
    fn create_specimen(
        &self,
        topology: &Topology,
        rng: &mut impl Rng,
    ) -> Result<Specimen<Self::Properties>>;

    /// Mutate `specimen` in place. `activations` is aligned with the adjacency's rows and columns
    fn mutate(
        &self,
        specimen: &mut Specimen<Self::Properties>,
        activations: &Vector<f64>,
        rng: &mut impl Rng,
    ) -> Result<()>;
}
