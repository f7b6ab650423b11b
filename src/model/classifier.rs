use crate::error::ClassifierError;
use ndarray::{Array4, Axis};
use ort::session::Session;
use ort::value::Value;
use std::sync::Mutex;

/// A loaded classification model: maps a preprocessed image tensor to one
/// score per known category. Implementations must be safe to share across
/// request tasks.
pub trait Classifier: Send + Sync {
    fn scores(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError>;
}

/// ONNX Runtime-backed classifier.
///
/// `Session::run` takes `&mut self`, so concurrent inference calls are
/// serialized behind the mutex. The session itself is loaded once at startup
/// and never replaced.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
}

impl OnnxClassifier {
    pub fn new(session: Session) -> Result<Self, ClassifierError> {
        let input_name = session
            .inputs
            .first()
            .ok_or(ClassifierError::MissingInput)?
            .name
            .clone();

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn scores(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let shape = input.shape().to_vec();
        let data = input.clone().into_raw_vec().into_boxed_slice();
        let input_value = Value::from_array((shape, data))?;

        let input_name = self.input_name.clone();
        let mut session = self.session.lock().unwrap();
        let outputs = session.run(ort::inputs![input_name => input_value])?;

        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
        let output = ndarray::ArrayViewD::from_shape(dims.as_slice(), data)?;

        // First (and only) batch row.
        let scores = output.index_axis(Axis(0), 0).iter().copied().collect();
        Ok(scores)
    }
}
