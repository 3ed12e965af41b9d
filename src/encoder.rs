//! Feature encoding for segmentation model inference.
//!
//! Expands a patient record into the numeric vector the models were
//! fitted on, in the exact column order used during training.

use crate::types::patient::PatientRecord;

/// Width of the encoded vector consumed by scaler, classifier and explainer.
pub const ENCODED_DIM: usize = 7;

/// Encoded feature names, matching training column order.
pub const FEATURE_NAMES: [&str; ENCODED_DIM] = [
    "Age", "Stay", "Billing", "Adm_ICU", "Adm_ER", "Adm_OP", "Test_Pos",
];

/// Encoder expanding raw patient fields into the model input vector.
///
/// Three numeric fields pass through unchanged; the two categorical fields
/// expand to four fixed-order indicator bits.
pub struct FeatureEncoder;

impl FeatureEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a patient record into the 7-wide raw feature vector.
    pub fn encode(&self, patient: &PatientRecord) -> Vec<f32> {
        let mut features = Vec::with_capacity(ENCODED_DIM);

        features.push(patient.age as f32);
        features.push(patient.stay_days as f32);
        features.push(patient.billing_amount as f32);
        features.extend_from_slice(&patient.admission.one_hot());
        features.push(patient.test_result.indicator());

        features
    }

    /// Get the number of encoded features.
    pub fn feature_count(&self) -> usize {
        ENCODED_DIM
    }

    /// Get encoded feature names in vector order.
    pub fn feature_names(&self) -> Vec<&'static str> {
        FEATURE_NAMES.to_vec()
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new()
    }
}
