//! ONNX artifact adapters.
//!
//! The only module that knows the on-disk model format. Everything else
//! sees the artifact traits.

use crate::error::{Error, Result};
use crate::models::store::{ClassifierModel, ClusterScores, ScalerModel};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::path::Path;
use std::sync::RwLock;
use tracing::{debug, info};

/// Loader for ONNX artifacts exported from the training run
pub struct ArtifactLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ArtifactLoader {
    /// Create a new loader with default settings (1 thread)
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a new loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init()
            .commit()
            .map_err(|e| Error::ArtifactLoad(format!("ONNX Runtime init failed: {}", e)))?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    fn open_session<P: AsRef<Path>>(&self, path: P) -> Result<Session> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::ArtifactLoad(format!(
                "artifact file not found: {}",
                path.display()
            )));
        }

        Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(self.onnx_threads))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| {
                Error::ArtifactLoad(format!("failed to load {}: {}", path.display(), e))
            })
    }

    /// Load the feature scaler.
    pub fn load_scaler<P: AsRef<Path>>(&self, path: P) -> Result<OnnxScaler> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading scaler artifact");

        let session = self.open_session(path)?;
        let input_name = first_input_name(&session);
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "variable".to_string());

        info!(input = %input_name, output = %output_name, "Scaler loaded");

        Ok(OnnxScaler {
            session: RwLock::new(session),
            input_name,
        })
    }

    /// Load the cluster classifier.
    pub fn load_classifier<P: AsRef<Path>>(&self, path: P) -> Result<OnnxClassifier> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading classifier artifact");

        let session = self.open_session(path)?;
        let input_name = first_input_name(&session);

        // scikit-learn exports name these "label" and "probabilities"
        let label_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .map(|o| o.name.clone());
        let prob_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone());

        info!(
            input = %input_name,
            label_output = ?label_output,
            prob_output = ?prob_output,
            "Classifier loaded"
        );

        Ok(OnnxClassifier {
            session: RwLock::new(session),
            input_name,
            label_output,
            prob_output,
        })
    }
}

impl Default for ArtifactLoader {
    fn default() -> Self {
        Self { onnx_threads: 1 }
    }
}

fn first_input_name(session: &Session) -> String {
    session
        .inputs
        .first()
        .map(|i| i.name.clone())
        .unwrap_or_else(|| "float_input".to_string())
}

fn input_tensor(features: &[f32]) -> Result<ort::value::Tensor<f32>> {
    let shape = vec![1_i64, features.len() as i64];
    ort::value::Tensor::from_array((shape, features.to_vec()))
        .map_err(|e| Error::Inference(format!("failed to create input tensor: {}", e)))
}

/// Pre-fitted scaler backed by an ONNX session
pub struct OnnxScaler {
    session: RwLock<Session>,
    input_name: String,
}

impl ScalerModel for OnnxScaler {
    fn transform(&self, features: &[f32]) -> Result<Vec<f32>> {
        let tensor = input_tensor(features)?;

        let mut session = self
            .session
            .write()
            .map_err(|e| Error::Inference(format!("scaler lock poisoned: {}", e)))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => tensor])
            .map_err(|e| Error::Inference(format!("scaler run failed: {}", e)))?;

        for (_, output) in outputs.iter() {
            if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
                if data.len() != features.len() {
                    return Err(Error::DimensionMismatch {
                        expected: features.len(),
                        actual: data.len(),
                    });
                }
                return Ok(data.to_vec());
            }
        }

        Err(Error::Inference(
            "scaler produced no float tensor output".to_string(),
        ))
    }
}

/// Pre-trained cluster classifier backed by an ONNX session
pub struct OnnxClassifier {
    session: RwLock<Session>,
    input_name: String,
    label_output: Option<String>,
    prob_output: Option<String>,
}

impl ClassifierModel for OnnxClassifier {
    fn predict(&self, features: &[f32]) -> Result<ClusterScores> {
        let tensor = input_tensor(features)?;

        let mut session = self
            .session
            .write()
            .map_err(|e| Error::Inference(format!("classifier lock poisoned: {}", e)))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => tensor])
            .map_err(|e| Error::Inference(format!("classifier run failed: {}", e)))?;

        let probabilities = extract_probabilities(&outputs, self.prob_output.as_deref())?;

        let cluster = match extract_label(&outputs, self.label_output.as_deref()) {
            Some(label) => label,
            None => argmax(&probabilities).ok_or_else(|| {
                Error::Inference("classifier produced empty probabilities".to_string())
            })?,
        };

        debug!(cluster = cluster, "Classifier inference complete");

        Ok(ClusterScores {
            cluster,
            probabilities,
        })
    }
}

fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
}

/// Extract the predicted class index from the label output, if present.
fn extract_label(outputs: &ort::session::SessionOutputs, label_name: Option<&str>) -> Option<usize> {
    let output = label_name.and_then(|name| outputs.get(name))?;
    let (_, data) = output.try_extract_tensor::<i64>().ok()?;
    data.first().and_then(|&v| usize::try_from(v).ok())
}

/// Extract per-class probabilities.
///
/// Handles both tensor outputs (zipmap disabled) and the
/// seq(map(int64, float)) layout scikit-learn exports by default.
fn extract_probabilities(
    outputs: &ort::session::SessionOutputs,
    prob_name: Option<&str>,
) -> Result<Vec<f64>> {
    if let Some(output) = prob_name.and_then(|name| outputs.get(name)) {
        let dtype = output.dtype();

        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            return Ok(data.iter().map(|&v| v as f64).collect());
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            if let Ok(probs) = extract_from_sequence_map(&output) {
                return Ok(probs);
            }
        }
    }

    // Fallback: scan all outputs, skipping the label
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }

        let dtype = output.dtype();

        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            return Ok(data.iter().map(|&v| v as f64).collect());
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            if let Ok(probs) = extract_from_sequence_map(&output) {
                return Ok(probs);
            }
        }
    }

    Err(Error::Inference(
        "classifier produced no probability output".to_string(),
    ))
}

/// Extract probabilities from the seq(map(int64, float)) layout, ordered by
/// class index.
fn extract_from_sequence_map(output: &ort::value::DynValue) -> Result<Vec<f64>> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| Error::Inference(format!("failed to downcast to sequence: {}", e)))?;

    let maps = sequence
        .try_extract_sequence::<DynMapValueType>(&allocator)
        .map_err(|e| Error::Inference(format!("failed to extract sequence: {}", e)))?;

    let map_value = maps
        .first()
        .ok_or_else(|| Error::Inference("empty probability sequence".to_string()))?;

    let mut kv_pairs = map_value
        .try_extract_key_values::<i64, f32>()
        .map_err(|e| Error::Inference(format!("failed to extract map entries: {}", e)))?;

    kv_pairs.sort_by_key(|(class_id, _)| *class_id);

    Ok(kv_pairs.into_iter().map(|(_, prob)| prob as f64).collect())
}
