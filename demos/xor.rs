#![allow(mixed_script_confusables)]
#![allow(confusable_idents)]

use core::ops::ControlFlow;
use evoai::{
    network::{Graph, LogCrossEntropy, Topology},
    Config, Evolution, Stats, Tingri, TingriProperties,
};
use rulinalg::vector::Vector;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn hook(stats: &Stats<'_, TingriProperties>) -> ControlFlow<()> {
    if stats.generation % 100 == 0 {
        info!(
            generation = stats.generation,
            best_loss = stats.best_loss(),
            mean_loss = stats.mean_loss(),
            "progress"
        );
    }

    ControlFlow::Continue(())
}

fn main() -> evoai::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let inputs = [[0., 0.], [0., 1.], [1., 0.], [1., 1.]]
        .map(|pair| Vector::new(pair.to_vec()))
        .to_vec();
    // one-hot: [false, true]
    let truths = [[1., 0.], [0., 1.], [0., 1.], [1., 0.]]
        .map(|pair| Vector::new(pair.to_vec()))
        .to_vec();

    let graph = Graph::classification(Topology::new(2, 5, 2, 2));
    let mut evolution = Evolution::new(Config::from_env(), Tingri::default(), LogCrossEntropy);
    let fittest = evolution.evolve_with(graph, &inputs, &truths, hook)?;

    for (input, truth) in inputs.iter().zip(truths.iter()) {
        let prediction = fittest.predict(input)?.apply(&f64::exp);
        println!(
            "{:?} -> {:.3?} (want {:?})",
            input.data(),
            prediction.data(),
            truth.data()
        );
    }

    Ok(())
}
