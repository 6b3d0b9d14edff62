#![allow(mixed_script_confusables)]
#![allow(confusable_idents)]

pub mod config;
pub mod constants;
pub mod error;
pub mod eval;
pub mod macros;
pub mod mutation;
pub mod network;
pub mod population;
pub mod random;
pub mod reproduce;
pub mod scenario;

pub use config::Config;
pub use error::{Error, Result};
pub use mutation::{Mutation, Tingri, TingriProperties, TingriSettings};
pub use network::{Graph, NeuralGraph, Topology};
pub use population::{Population, Specimen};
pub use random::WyRng;
pub use scenario::{Evolution, Stats};
