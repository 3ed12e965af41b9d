//! Segmentation inference engine.

use crate::encoder::{FeatureEncoder, ENCODED_DIM};
use crate::error::{Error, Result};
use crate::models::store::ArtifactStore;
use crate::types::patient::PatientRecord;
use crate::types::prediction::{cluster_label, Prediction};
use std::sync::Arc;
use tracing::debug;

/// Raw outcome of one inference pass
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    /// Predicted cluster index
    pub cluster: usize,
    /// Per-cluster probabilities from the classifier
    pub probabilities: Vec<f64>,
    /// One attribution value per encoded feature
    pub attributions: Vec<f64>,
    /// Encoded feature names, in attribution order
    pub feature_names: Vec<&'static str>,
}

impl PredictionOutcome {
    /// Resolve the cluster label and package the outcome with the raw
    /// inputs it was computed from.
    pub fn to_prediction(&self, patient: &PatientRecord) -> Result<Prediction> {
        let label = cluster_label(self.cluster)?;

        Ok(Prediction::new(
            self.cluster,
            label.to_string(),
            patient.clone(),
            self.feature_names.clone(),
            self.attributions.clone(),
        ))
    }
}

/// Engine running the fixed encode -> scale -> classify -> explain sequence
/// over the shared artifacts.
pub struct InferenceEngine {
    store: Arc<ArtifactStore>,
    encoder: FeatureEncoder,
}

impl InferenceEngine {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self {
            store,
            encoder: FeatureEncoder::new(),
        }
    }

    /// Get the number of encoded features.
    pub fn feature_count(&self) -> usize {
        self.encoder.feature_count()
    }

    /// Run one inference pass over a patient record.
    ///
    /// The record is expected to be validated already; this checks only the
    /// contract between encoder and artifacts.
    pub fn predict(&self, patient: &PatientRecord) -> Result<PredictionOutcome> {
        let raw = self.encoder.encode(patient);

        let scaled = self.store.scaler.transform(&raw)?;
        if scaled.len() != ENCODED_DIM {
            return Err(Error::DimensionMismatch {
                expected: ENCODED_DIM,
                actual: scaled.len(),
            });
        }

        let scores = self.store.classifier.predict(&scaled)?;

        let attributions = self.store.explainer.explain(&scaled)?;
        if attributions.len() != ENCODED_DIM {
            return Err(Error::DimensionMismatch {
                expected: ENCODED_DIM,
                actual: attributions.len(),
            });
        }

        debug!(
            cluster = scores.cluster,
            age = patient.age,
            admission = patient.admission.as_str(),
            "Inference complete"
        );

        Ok(PredictionOutcome {
            cluster: scores.cluster,
            probabilities: scores.probabilities,
            attributions,
            feature_names: self.encoder.feature_names(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::explainer::OcclusionExplainer;
    use crate::models::store::ArtifactStore;
    use crate::testutil::{
        fake_engine, store_with, FailingClassifier, FakeScaler, FixedClassifier,
    };
    use crate::types::patient::{AdmissionType, TestResult};

    fn sample_patient() -> PatientRecord {
        PatientRecord::new(45, 3, 2500.0, AdmissionType::Er, TestResult::Negative)
    }

    #[test]
    fn test_predict_shape() {
        let engine = fake_engine();
        let outcome = engine.predict(&sample_patient()).unwrap();

        assert!(outcome.cluster < 5);
        assert_eq!(outcome.attributions.len(), 7);
        assert_eq!(outcome.feature_names.len(), 7);
        assert_eq!(outcome.probabilities.len(), 5);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let engine = fake_engine();
        let first = engine.predict(&sample_patient()).unwrap();
        let second = engine.predict(&sample_patient()).unwrap();

        assert_eq!(first.cluster, second.cluster);
        assert_eq!(first.attributions, second.attributions);
        assert_eq!(first.probabilities, second.probabilities);
    }

    #[test]
    fn test_end_to_end_sample() {
        // (45, 3, 2500.0, ER, Negative) encodes to (45, 3, 2500, 0, 1, 0, 0);
        // the linear fake scores cluster k by feature k, so the billing
        // column wins and the prediction lands in cluster 2.
        let engine = fake_engine();
        let patient = sample_patient();

        let outcome = engine.predict(&patient).unwrap();
        assert_eq!(outcome.cluster, 2);

        let prediction = outcome.to_prediction(&patient).unwrap();
        assert_eq!(prediction.label, "Diagnostics_Monitoring");
        assert_eq!(prediction.inputs.age, 45);
        assert_eq!(prediction.attributions.len(), 7);
    }

    #[test]
    fn test_width_mismatch_is_rejected() {
        let classifier = std::sync::Arc::new(crate::testutil::FakeClassifier::default());
        let store = ArtifactStore::from_parts(
            std::sync::Arc::new(FakeScaler::truncating()),
            classifier.clone(),
            std::sync::Arc::new(OcclusionExplainer::new(classifier)),
        );
        let engine = InferenceEngine::new(std::sync::Arc::new(store));

        match engine.predict(&sample_patient()) {
            Err(Error::DimensionMismatch {
                expected: 7,
                actual: 6,
            }) => {}
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_classifier_failure_surfaces() {
        let store = store_with(std::sync::Arc::new(FailingClassifier));
        let engine = InferenceEngine::new(std::sync::Arc::new(store));

        match engine.predict(&sample_patient()) {
            Err(Error::Inference(_)) => {}
            other => panic!("expected Inference error, got {:?}", other),
        }
    }

    #[test]
    fn test_off_table_cluster_is_rejected_at_labeling() {
        let store = store_with(std::sync::Arc::new(FixedClassifier(7)));
        let engine = InferenceEngine::new(std::sync::Arc::new(store));

        let patient = sample_patient();
        let outcome = engine.predict(&patient).unwrap();

        match outcome.to_prediction(&patient) {
            Err(Error::UnknownCluster(7)) => {}
            other => panic!("expected UnknownCluster, got {:?}", other),
        }
    }
}
