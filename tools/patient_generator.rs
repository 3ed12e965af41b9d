//! Sample Patient Generator
//!
//! Generates random patient records and runs them through the inference
//! engine, printing the predicted segment for each. Falls back to printing
//! sample JSON when the model artifacts are not available.

use anyhow::Result;
use patient_segmentation::config::AppConfig;
use patient_segmentation::models::inference::InferenceEngine;
use patient_segmentation::models::store::ArtifactStore;
use patient_segmentation::types::patient::{AdmissionType, PatientRecord, TestResult};
use rand::Rng;
use std::sync::Arc;
use tracing::{info, warn};

/// Random patient generator for demo runs
struct PatientGenerator {
    rng: rand::rngs::ThreadRng,
}

impl PatientGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Generate a routine outpatient/ER visit
    fn generate_routine(&mut self) -> PatientRecord {
        let admission = if self.rng.gen_bool(0.5) {
            AdmissionType::Er
        } else {
            AdmissionType::Op
        };
        let test_result = if self.rng.gen_bool(0.3) {
            TestResult::Positive
        } else {
            TestResult::Negative
        };

        PatientRecord::new(
            self.rng.gen_range(18..=90),
            self.rng.gen_range(0..=14),
            self.rng.gen_range(100.0..20_000.0),
            admission,
            test_result,
        )
    }

    /// Generate a high-acuity ICU admission
    fn generate_acute(&mut self) -> PatientRecord {
        PatientRecord::new(
            self.rng.gen_range(50..=120),
            self.rng.gen_range(14..=120),
            self.rng.gen_range(20_000.0..100_000.0),
            AdmissionType::Icu,
            TestResult::Positive,
        )
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("patient_generator=info".parse()?),
        )
        .init();

    info!("Starting Sample Patient Generator");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("config/config.toml");
    let count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10);
    let acute_rate: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.2);

    info!(
        config_path = %config_path,
        count = count,
        acute_rate = acute_rate,
        "Configuration loaded"
    );

    // Load artifacts; fall back to dry-run when they are not present
    let engine = AppConfig::load_from_path(config_path)
        .map_err(|e| e.to_string())
        .and_then(|config| {
            ArtifactStore::load(&config.artifacts).map_err(|e| e.to_string())
        });

    let engine = match engine {
        Ok(store) => Some(InferenceEngine::new(Arc::new(store))),
        Err(e) => {
            warn!(error = %e, "Artifacts unavailable. Running in dry-run mode.");
            None
        }
    };

    let mut generator = PatientGenerator::new();
    let mut rng = rand::thread_rng();
    let mut acute_count = 0_u64;

    for i in 0..count {
        let patient = if rng.gen_bool(acute_rate) {
            acute_count += 1;
            generator.generate_acute()
        } else {
            generator.generate_routine()
        };
        patient.validate()?;

        match &engine {
            Some(engine) => {
                let prediction = engine.predict(&patient)?.to_prediction(&patient)?;
                let dominant = prediction
                    .dominant_feature()
                    .map(|(name, value)| format!("{}={:+.3}", name, value))
                    .unwrap_or_default();

                info!(
                    patient = i + 1,
                    age = patient.age,
                    admission = patient.admission.as_str(),
                    label = %prediction.label,
                    dominant_feature = %dominant,
                    "Prediction"
                );
            }
            None => {
                let json = serde_json::to_string_pretty(&patient)?;
                info!("Sample patient {}:\n{}", i + 1, json);
            }
        }
    }

    info!(
        "Completed! Generated {} patients ({} routine, {} acute)",
        count,
        count - acute_count,
        acute_count
    );

    Ok(())
}
