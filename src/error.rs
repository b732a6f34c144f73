use std::path::PathBuf;

use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Two records of one join produced the same key.
    #[error("duplicate key `{key}` at data indices {first_index} and {second_index}")]
    DuplicateKey {
        key: String,
        first_index: usize,
        second_index: usize,
    },

    #[error("failed to load `{path}`: {source}")]
    LoadFailure {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
