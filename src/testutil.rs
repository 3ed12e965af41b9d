//! Deterministic fake artifacts for tests.

use crate::error::{Error, Result};
use crate::models::explainer::OcclusionExplainer;
use crate::models::inference::InferenceEngine;
use crate::models::store::{ArtifactStore, ClassifierModel, ClusterScores, ScalerModel};
use std::sync::Arc;

/// Scaler fake: identity by default, optionally truncating to provoke
/// width mismatches.
pub struct FakeScaler {
    drop_last: bool,
}

impl FakeScaler {
    pub fn identity() -> Self {
        Self { drop_last: false }
    }

    pub fn truncating() -> Self {
        Self { drop_last: true }
    }
}

impl ScalerModel for FakeScaler {
    fn transform(&self, features: &[f32]) -> Result<Vec<f32>> {
        let mut out = features.to_vec();
        if self.drop_last {
            out.pop();
        }
        Ok(out)
    }
}

/// Linear classifier fake: the score for cluster k is feature k, squashed
/// through a stable softmax. Deterministic and ordering-sensitive, which is
/// what the tests need.
pub struct FakeClassifier {
    classes: usize,
}

impl Default for FakeClassifier {
    fn default() -> Self {
        Self { classes: 5 }
    }
}

impl ClassifierModel for FakeClassifier {
    fn predict(&self, features: &[f32]) -> Result<ClusterScores> {
        let scores: Vec<f64> = (0..self.classes)
            .map(|k| features.get(k).copied().unwrap_or(0.0) as f64)
            .collect();

        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let sum: f64 = exps.iter().sum();
        let probabilities: Vec<f64> = exps.iter().map(|e| e / sum).collect();

        let cluster = scores
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(i, _)| i)
            .unwrap_or(0);

        Ok(ClusterScores {
            cluster,
            probabilities,
        })
    }
}

/// Classifier fake that always returns the same cluster index.
pub struct FixedClassifier(pub usize);

impl ClassifierModel for FixedClassifier {
    fn predict(&self, _features: &[f32]) -> Result<ClusterScores> {
        Ok(ClusterScores {
            cluster: self.0,
            probabilities: vec![1.0; self.0 + 1],
        })
    }
}

/// Classifier fake that always fails.
pub struct FailingClassifier;

impl ClassifierModel for FailingClassifier {
    fn predict(&self, _features: &[f32]) -> Result<ClusterScores> {
        Err(Error::Inference("classifier unavailable".to_string()))
    }
}

/// Build a store over the linear fake classifier and an identity scaler.
pub fn fake_store() -> ArtifactStore {
    store_with(Arc::new(FakeClassifier::default()))
}

/// Build a store over an arbitrary classifier fake.
pub fn store_with(classifier: Arc<dyn ClassifierModel>) -> ArtifactStore {
    ArtifactStore::from_parts(
        Arc::new(FakeScaler::identity()),
        classifier.clone(),
        Arc::new(OcclusionExplainer::new(classifier)),
    )
}

/// Build an inference engine over the default fakes.
pub fn fake_engine() -> InferenceEngine {
    InferenceEngine::new(Arc::new(fake_store()))
}
