//! Offline training job for the claims leakage classifier.
//!
//! [`pipeline::run`] performs one full run; the `leakage-train` binary wraps
//! it with argument parsing and logging.

pub mod cli;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod preprocess;
pub mod split;

#[cfg(test)]
pub(crate) mod testing;

pub use error::TrainError;
pub use pipeline::{run, Evaluation, TrainConfig, TrainSummary};
