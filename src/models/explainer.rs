//! Occlusion-based feature attribution derived from the classifier.

use crate::error::Result;
use crate::models::store::{AttributionModel, ClassifierModel};
use std::sync::Arc;

/// Attribution model that scores each feature by occluding it.
///
/// For a scaled vector, each feature is replaced in turn with its baseline
/// value; the attribution is the drop in the predicted cluster's probability.
/// Positive values push the prediction toward the chosen cluster. Derived
/// from the classifier at load time, no separate artifact file.
pub struct OcclusionExplainer {
    classifier: Arc<dyn ClassifierModel>,
    /// Baseline in scaled space. Zeros correspond to the training mean for
    /// standardized features.
    baseline: Option<Vec<f32>>,
}

impl OcclusionExplainer {
    /// Create an explainer over the shared classifier with the default
    /// all-zeros baseline.
    pub fn new(classifier: Arc<dyn ClassifierModel>) -> Self {
        Self {
            classifier,
            baseline: None,
        }
    }

    /// Create an explainer with an explicit baseline vector.
    pub fn with_baseline(classifier: Arc<dyn ClassifierModel>, baseline: Vec<f32>) -> Self {
        Self {
            classifier,
            baseline: Some(baseline),
        }
    }

    fn baseline_value(&self, index: usize) -> f32 {
        self.baseline
            .as_ref()
            .and_then(|b| b.get(index).copied())
            .unwrap_or(0.0)
    }
}

impl AttributionModel for OcclusionExplainer {
    fn explain(&self, features: &[f32]) -> Result<Vec<f64>> {
        let reference = self.classifier.predict(features)?;
        let cluster = reference.cluster;
        let reference_prob = reference
            .probabilities
            .get(cluster)
            .copied()
            .unwrap_or(0.0);

        let mut attributions = Vec::with_capacity(features.len());

        for i in 0..features.len() {
            let mut occluded = features.to_vec();
            occluded[i] = self.baseline_value(i);

            let scores = self.classifier.predict(&occluded)?;
            let occluded_prob = scores.probabilities.get(cluster).copied().unwrap_or(0.0);

            attributions.push(reference_prob - occluded_prob);
        }

        Ok(attributions)
    }
}
