//! Patient Segmentation Demo Library
//!
//! Serves a pre-trained patient clustering classifier behind a single
//! interactive page, with per-feature attributions for each prediction.

pub mod config;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod models;
pub mod server;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::AppConfig;
pub use encoder::FeatureEncoder;
pub use error::{Error, Result};
pub use models::inference::InferenceEngine;
pub use models::store::ArtifactStore;
pub use types::{PatientRecord, Prediction};
