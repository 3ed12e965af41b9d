//! Type definitions for the segmentation demo

pub mod patient;
pub mod prediction;

pub use patient::{AdmissionType, PatientRecord, TestResult};
pub use prediction::{cluster_label, Prediction, CLUSTER_LABELS};
