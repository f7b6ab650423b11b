use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::histogram;
use tracing::error;

use crate::error::{PipelineError, ReduceError};
use crate::labels::LabelTable;
use crate::model::classifier::Classifier;
use crate::preprocessing::image::{decode, preprocess};

/// Top-1 result for a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub probability: f32,
}

/// Picks the arg-max entry of a score vector and resolves it against the
/// label table. Ties break to the lowest index. The probability is the raw
/// maximum score; the model's output layer is trusted to already be a
/// distribution, so nothing is renormalized here.
pub fn reduce(scores: &[f32], labels: &LabelTable) -> Result<Prediction, ReduceError> {
    if scores.is_empty() {
        return Err(ReduceError::EmptyVector);
    }

    let mut best = 0;
    for (index, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = index;
        }
    }

    let label = labels.get(best).ok_or(ReduceError::LabelMismatch {
        index: best,
        labels: labels.len(),
    })?;

    Ok(Prediction {
        label: label.to_string(),
        probability: scores[best],
    })
}

/// End-to-end prediction pipeline: decode, preprocess, classify, reduce.
///
/// Holds the process-wide model and label table behind `Arc`s; everything
/// else is per-request. Decode failures surface as `BadInput`, every other
/// fault (classifier error, timeout, label mismatch) is logged and collapsed
/// into `Internal`.
pub struct InferenceService {
    classifier: Arc<dyn Classifier>,
    labels: Arc<LabelTable>,
    timeout: Duration,
}

impl InferenceService {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        labels: Arc<LabelTable>,
        timeout: Duration,
    ) -> Self {
        Self {
            classifier,
            labels,
            timeout,
        }
    }

    pub async fn infer(&self, payload: &[u8]) -> Result<Prediction, PipelineError> {
        let decoded = decode(payload).map_err(|e| PipelineError::BadInput(e.to_string()))?;
        let tensor = preprocess(&decoded);

        // The session call is CPU-bound and serialized behind the session
        // mutex, so it runs on a blocking thread with an upper bound. A
        // request dropped by the client stops here between stages; a run
        // already handed to the runtime is not interrupted.
        let classifier = Arc::clone(&self.classifier);
        let start = Instant::now();
        let run = tokio::task::spawn_blocking(move || classifier.scores(&tensor));

        let scores = match tokio::time::timeout(self.timeout, run).await {
            Err(_) => {
                error!(timeout_ms = self.timeout.as_millis() as u64, "inference timed out");
                return Err(PipelineError::Internal);
            }
            Ok(Err(join_error)) => {
                error!(error = %join_error, "inference task failed");
                return Err(PipelineError::Internal);
            }
            Ok(Ok(Err(classifier_error))) => {
                error!(error = %classifier_error, "classifier failure");
                return Err(PipelineError::Internal);
            }
            Ok(Ok(Ok(scores))) => scores,
        };
        histogram!("inference_latency_seconds", start.elapsed().as_secs_f64());

        reduce(&scores, &self.labels).map_err(|e| {
            error!(error = %e, "score reduction failure");
            PipelineError::Internal
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassifierError;
    use image::{Rgb, RgbImage};
    use ndarray::Array4;
    use std::io::Cursor;

    struct StubClassifier {
        scores: Vec<f32>,
    }

    impl Classifier for StubClassifier {
        fn scores(&self, _input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
            Ok(self.scores.clone())
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn scores(&self, _input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
            Err(ClassifierError::MissingInput)
        }
    }

    struct SlowClassifier;

    impl Classifier for SlowClassifier {
        fn scores(&self, _input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
            std::thread::sleep(Duration::from_millis(500));
            Ok(vec![1.0])
        }
    }

    fn two_labels() -> Arc<LabelTable> {
        Arc::new(LabelTable::from_json(r#"{"0": "Healthy", "1": "Diseased"}"#).unwrap())
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(10, 10, Rgb([0, 200, 0]));
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        img.write_to(&mut cursor, image::ImageFormat::Jpeg).unwrap();
        buffer
    }

    #[test]
    fn test_reduce_picks_maximum() {
        let labels = LabelTable::from_json(r#"{"0": "a", "1": "b", "2": "c"}"#).unwrap();
        let result = reduce(&[0.1, 0.7, 0.2], &labels).unwrap();
        assert_eq!(result.label, "b");
        assert!((result.probability - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reduce_tie_breaks_to_first_occurrence() {
        let labels = LabelTable::from_json(r#"{"0": "a", "1": "b", "2": "c"}"#).unwrap();
        let result = reduce(&[0.5, 0.5, 0.2], &labels).unwrap();
        assert_eq!(result.label, "a");
    }

    #[test]
    fn test_reduce_empty_vector() {
        let labels = two_labels();
        assert_eq!(reduce(&[], &labels), Err(ReduceError::EmptyVector));
    }

    #[test]
    fn test_reduce_label_mismatch() {
        let labels = two_labels();
        let result = reduce(&[0.1, 0.2, 0.9], &labels);
        assert_eq!(
            result,
            Err(ReduceError::LabelMismatch { index: 2, labels: 2 })
        );
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let labels = two_labels();
        let scores = [0.3, 0.6];
        let first = reduce(&scores, &labels).unwrap();
        let second = reduce(&scores, &labels).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reduce_does_not_renormalize() {
        let labels = two_labels();
        let result = reduce(&[2.0, 5.0], &labels).unwrap();
        assert!((result.probability - 5.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_infer_end_to_end_with_stub_model() {
        let service = InferenceService::new(
            Arc::new(StubClassifier {
                scores: vec![0.1, 0.9],
            }),
            two_labels(),
            Duration::from_secs(5),
        );

        let prediction = service.infer(&jpeg_bytes()).await.unwrap();
        assert_eq!(prediction.label, "Diseased");
        assert!((prediction.probability - 0.9).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_infer_maps_bad_bytes_to_bad_input() {
        let service = InferenceService::new(
            Arc::new(StubClassifier { scores: vec![1.0] }),
            two_labels(),
            Duration::from_secs(5),
        );

        let result = service.infer(b"not an image").await;
        assert!(matches!(result, Err(PipelineError::BadInput(_))));
    }

    #[tokio::test]
    async fn test_infer_maps_classifier_fault_to_internal() {
        let service =
            InferenceService::new(Arc::new(FailingClassifier), two_labels(), Duration::from_secs(5));

        let result = service.infer(&jpeg_bytes()).await;
        assert!(matches!(result, Err(PipelineError::Internal)));
    }

    #[tokio::test]
    async fn test_infer_times_out_to_internal() {
        let service = InferenceService::new(
            Arc::new(SlowClassifier),
            two_labels(),
            Duration::from_millis(50),
        );

        let result = service.infer(&jpeg_bytes()).await;
        assert!(matches!(result, Err(PipelineError::Internal)));
    }

    #[tokio::test]
    async fn test_infer_maps_label_mismatch_to_internal() {
        let service = InferenceService::new(
            Arc::new(StubClassifier {
                scores: vec![0.1, 0.2, 0.9],
            }),
            two_labels(),
            Duration::from_secs(5),
        );

        let result = service.infer(&jpeg_bytes()).await;
        assert!(matches!(result, Err(PipelineError::Internal)));
    }
}
