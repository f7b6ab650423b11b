use crate::error::ClassifierError;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

// Initialize the global environment for ORT (only needed once)
pub fn init_ort() -> Result<(), ClassifierError> {
    ort::init().with_name("plantsafe").commit()?;
    Ok(())
}

/// Loads the ONNX model from disk and creates an inference session.
///
/// Called once at startup. A failure here is fatal: the service has no
/// purpose without its model, so `main` aborts before binding the listener.
pub fn load_model(model_path: impl AsRef<Path>) -> Result<Session, ClassifierError> {
    let path = model_path.as_ref();
    if !path.exists() {
        return Err(ClassifierError::ModelNotFound(path.display().to_string()));
    }

    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?
        .commit_from_file(path)?;

    info!(model = %path.display(), "loaded model");
    for (i, input) in session.inputs.iter().enumerate() {
        info!("  input {}: {} ({:?})", i, input.name, input.input_type);
    }

    Ok(session)
}
