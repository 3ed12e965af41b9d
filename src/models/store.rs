//! Artifact traits and the process-wide artifact store

use crate::config::ArtifactConfig;
use crate::error::{Error, Result};
use crate::models::explainer::OcclusionExplainer;
use crate::models::loader::ArtifactLoader;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::info;

/// Class scores produced by one classifier call
#[derive(Debug, Clone)]
pub struct ClusterScores {
    /// Most probable cluster index
    pub cluster: usize,
    /// Per-cluster probabilities, indexed by cluster
    pub probabilities: Vec<f64>,
}

/// Pre-fitted transform normalizing a raw feature vector.
pub trait ScalerModel: Send + Sync {
    fn transform(&self, features: &[f32]) -> Result<Vec<f32>>;
}

/// Pre-trained model mapping a normalized vector to a cluster index.
pub trait ClassifierModel: Send + Sync {
    fn predict(&self, features: &[f32]) -> Result<ClusterScores>;
}

/// Derived structure producing one attribution value per input dimension.
pub trait AttributionModel: Send + Sync {
    fn explain(&self, features: &[f32]) -> Result<Vec<f64>>;
}

/// Immutable set of loaded artifacts, shared read-only for the process
/// lifetime.
pub struct ArtifactStore {
    pub scaler: Arc<dyn ScalerModel>,
    pub classifier: Arc<dyn ClassifierModel>,
    pub explainer: Arc<dyn AttributionModel>,
}

impl ArtifactStore {
    /// Load the scaler and classifier from disk and derive the explainer
    /// from the classifier. Two disk reads; any failure is fatal.
    pub fn load(config: &ArtifactConfig) -> Result<Self> {
        let loader = ArtifactLoader::with_threads(config.onnx_threads)?;

        let scaler = Arc::new(loader.load_scaler(config.scaler_path())?);
        let classifier: Arc<dyn ClassifierModel> =
            Arc::new(loader.load_classifier(config.classifier_path())?);
        let explainer = Arc::new(OcclusionExplainer::new(classifier.clone()));

        info!(
            scaler = %config.scaler_path().display(),
            classifier = %config.classifier_path().display(),
            "Artifacts loaded"
        );

        Ok(Self {
            scaler,
            classifier,
            explainer,
        })
    }

    /// Build a store from already-constructed artifacts.
    pub fn from_parts(
        scaler: Arc<dyn ScalerModel>,
        classifier: Arc<dyn ClassifierModel>,
        explainer: Arc<dyn AttributionModel>,
    ) -> Self {
        Self {
            scaler,
            classifier,
            explainer,
        }
    }

    /// Idempotent process-wide accessor: the first call loads from disk,
    /// later calls return the same shared instance without touching storage.
    pub fn shared(config: &ArtifactConfig) -> Result<Arc<Self>> {
        Self::shared_with(|| Self::load(config))
    }

    /// Initialize-once accessor with an injectable initializer.
    ///
    /// Check-then-set under a mutex: concurrent first calls cannot run the
    /// initializer twice.
    pub fn shared_with<F>(init: F) -> Result<Arc<Self>>
    where
        F: FnOnce() -> Result<Self>,
    {
        static STORE: OnceLock<Arc<ArtifactStore>> = OnceLock::new();
        static INIT: Mutex<()> = Mutex::new(());

        if let Some(store) = STORE.get() {
            return Ok(store.clone());
        }

        let _guard = INIT
            .lock()
            .map_err(|e| Error::ArtifactLoad(format!("init lock poisoned: {}", e)))?;

        if let Some(store) = STORE.get() {
            return Ok(store.clone());
        }

        let store = Arc::new(init()?);
        let _ = STORE.set(store.clone());
        Ok(store)
    }
}
