//! Artifact loading and inference components

pub mod explainer;
pub mod inference;
pub mod loader;
pub mod store;

pub use explainer::OcclusionExplainer;
pub use inference::InferenceEngine;
pub use loader::ArtifactLoader;
pub use store::{ArtifactStore, AttributionModel, ClassifierModel, ClusterScores, ScalerModel};
