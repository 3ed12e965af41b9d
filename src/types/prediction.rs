//! Prediction result and cluster label table

use crate::error::{Error, Result};
use crate::types::patient::PatientRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semantic names for the five patient segments, indexed by cluster.
///
/// The table and the classifier were produced by the same training run and
/// must stay in sync; lookups outside 0..5 are treated as a defect.
pub const CLUSTER_LABELS: [&str; 5] = [
    "ChronicCare_Obese_Mixed",
    "RoutineCare_Stable",
    "Diagnostics_Monitoring",
    "HighRisk_Hypertension",
    "UrgentCare_Diabetes",
];

/// Resolve a cluster index to its segment name.
pub fn cluster_label(cluster: usize) -> Result<&'static str> {
    CLUSTER_LABELS
        .get(cluster)
        .copied()
        .ok_or(Error::UnknownCluster(cluster))
}

/// Result of one segmentation inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Unique prediction identifier
    pub prediction_id: String,

    /// Predicted cluster index (0..5)
    pub cluster: usize,

    /// Segment name from the label table
    pub label: String,

    /// Echo of the raw inputs this prediction was computed from
    pub inputs: PatientRecord,

    /// Encoded feature names, in attribution order
    pub feature_names: Vec<&'static str>,

    /// One attribution value per encoded feature
    pub attributions: Vec<f64>,

    /// Prediction timestamp
    pub timestamp: DateTime<Utc>,
}

impl Prediction {
    pub fn new(
        cluster: usize,
        label: String,
        inputs: PatientRecord,
        feature_names: Vec<&'static str>,
        attributions: Vec<f64>,
    ) -> Self {
        Self {
            prediction_id: uuid::Uuid::new_v4().to_string(),
            cluster,
            label,
            inputs,
            feature_names,
            attributions,
            timestamp: Utc::now(),
        }
    }

    /// The encoded feature with the largest absolute attribution, if any.
    pub fn dominant_feature(&self) -> Option<(&'static str, f64)> {
        self.feature_names
            .iter()
            .zip(self.attributions.iter())
            .max_by(|(_, a), (_, b)| a.abs().partial_cmp(&b.abs()).unwrap())
            .map(|(name, value)| (*name, *value))
    }
}
