//! Error type shared by every stage of the evolutionary loop.

/// Everything that can go wrong while configuring or running an evolution.
///
/// Shape errors are contract violations on the caller's side: the stage refuses to run rather
/// than truncate or pad. Numeric degeneracies are reported so the caller can pick a fallback.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{what}: expected length {expected}, got {actual}")]
    Shape {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("adjacency must be {expected}x{expected}, got {rows}x{cols}")]
    Adjacency {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("population is empty")]
    EmptyPopulation,

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("largest loss {0} is too close to zero to derive fitness from")]
    DegenerateLosses(f64),

    #[error("loss {loss} of specimen {index} is negative, pair the loss with a matching transform")]
    NegativeLoss { index: usize, loss: f64 },

    #[error("invalid normal distribution (mean {mean}, deviation {deviation})")]
    Distribution { mean: f64, deviation: f64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

/// Fail with [Error::Shape] unless `actual == expected`
#[inline]
pub(crate) fn expect_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::Shape {
            what,
            expected,
            actual,
        })
    }
}
