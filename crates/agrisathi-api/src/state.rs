//! Application state for the inference service.
//!
//! Holds the configuration and the lazily-loaded classifier shared by all
//! request handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use agrisathi_ai::{Classifier, ClassifyError};
use tokio::sync::OnceCell;
use tracing::info;

/// Inference service configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Path to the classification model artifact.
    pub model_path: PathBuf,
    /// Maximum accepted request body size in bytes.
    pub body_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("/models/plant-disease-model.onnx"),
            body_limit: 10 * 1024 * 1024,
        }
    }
}

type Loader = dyn Fn() -> Result<Classifier, ClassifyError> + Send + Sync;

/// Classifier loaded on first use and kept for the life of the process.
///
/// Concurrent first callers wait on a single initialisation; the loader runs
/// at most once per successful load. Initialisation runs in its own task, so
/// a caller dropped mid-load does not abandon it. A failed load leaves the
/// cell empty so a later request can retry.
pub struct SharedClassifier {
    inner: Arc<LoadOnce>,
}

struct LoadOnce {
    cell: OnceCell<Arc<Classifier>>,
    loader: Box<Loader>,
}

impl LoadOnce {
    async fn init(self: Arc<Self>) -> Result<Arc<Classifier>, ClassifyError> {
        self.cell
            .get_or_try_init(|| async {
                info!("loading classifier");
                let this = Arc::clone(&self);
                let classifier = tokio::task::spawn_blocking(move || (this.loader)())
                    .await
                    .map_err(|e| ClassifyError::ModelLoad(format!("loader task failed: {e}")))??;
                info!(labels = classifier.labels().len(), "classifier ready");
                Ok::<_, ClassifyError>(Arc::new(classifier))
            })
            .await
            .cloned()
    }
}

impl SharedClassifier {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Classifier, ClassifyError> + Send + Sync + 'static,
    {
        Self::with_cell(OnceCell::new(), Box::new(loader))
    }

    /// Wrap an already-loaded classifier.
    pub fn ready(classifier: Classifier) -> Self {
        Self::with_cell(
            OnceCell::new_with(Some(Arc::new(classifier))),
            Box::new(|| {
                Err(ClassifyError::ModelLoad(
                    "classifier supplied pre-loaded".into(),
                ))
            }),
        )
    }

    fn with_cell(cell: OnceCell<Arc<Classifier>>, loader: Box<Loader>) -> Self {
        Self {
            inner: Arc::new(LoadOnce { cell, loader }),
        }
    }

    /// Loader for an ONNX model plus its sidecar label file.
    #[cfg(feature = "onnx")]
    pub fn for_model(model_path: PathBuf) -> Self {
        Self::new(move || Classifier::load_onnx(&model_path))
    }

    #[cfg(not(feature = "onnx"))]
    pub fn for_model(model_path: PathBuf) -> Self {
        Self::new(move || {
            Err(ClassifyError::ModelLoad(format!(
                "{}: built without ONNX Runtime support (enable the `onnx` feature)",
                model_path.display()
            )))
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.cell.initialized()
    }

    /// The classifier, loading it on the blocking pool if this is the first call.
    pub async fn get(&self) -> Result<Arc<Classifier>, ClassifyError> {
        if let Some(classifier) = self.inner.cell.get() {
            return Ok(Arc::clone(classifier));
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(inner.init())
            .await
            .map_err(|e| ClassifyError::ModelLoad(format!("loader task failed: {e}")))?
    }
}

/// Shared application state.
pub struct AppState {
    pub config: ApiConfig,
    pub classifier: SharedClassifier,
    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    /// State whose classifier loads from `config.model_path` on first request.
    pub fn new(config: ApiConfig) -> Self {
        let classifier = SharedClassifier::for_model(config.model_path.clone());
        Self::with_classifier(config, classifier)
    }

    pub fn with_classifier(config: ApiConfig, classifier: SharedClassifier) -> Self {
        Self {
            config,
            classifier,
            started_at: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;
    use agrisathi_ai::{ImageTensor, LabelTable, ScoreModel};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Uniform;

    impl ScoreModel for Uniform {
        fn num_classes(&self) -> Option<usize> {
            Some(2)
        }

        fn scores(&self, _: &ImageTensor) -> Result<Vec<f32>, ClassifyError> {
            Ok(vec![0.5, 0.5])
        }
    }

    fn counting_loader(count: Arc<AtomicUsize>) -> SharedClassifier {
        SharedClassifier::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            Ok(Classifier::new(Box::new(Uniform), LabelTable::placeholders(2)))
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_calls_load_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let shared = Arc::new(counting_loader(count.clone()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let shared = shared.clone();
                tokio::spawn(async move { shared.get().await })
            })
            .collect();
        let results: Vec<_> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .collect();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|c| Arc::ptr_eq(c, &results[0])));
        assert!(shared.is_loaded());
    }

    #[tokio::test]
    async fn failed_load_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = attempts.clone();
        let shared = SharedClassifier::new(move || {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ClassifyError::ModelLoad("disk not mounted".into()))
            } else {
                Ok(Classifier::new(Box::new(Uniform), LabelTable::default()))
            }
        });

        assert!(shared.get().await.is_err());
        assert!(!shared.is_loaded());
        assert!(shared.get().await.is_ok());
        assert!(shared.is_loaded());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn dropped_first_caller_does_not_restart_load() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let shared = Arc::new(SharedClassifier::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(300));
            Ok(Classifier::new(Box::new(Uniform), LabelTable::placeholders(2)))
        }));

        let first = {
            let shared = shared.clone();
            tokio::spawn(async move { shared.get().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = {
            let shared = shared.clone();
            tokio::spawn(async move { shared.get().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        first.abort();

        assert!(second.await.unwrap().is_ok());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(shared.is_loaded());
    }

    #[tokio::test]
    async fn ready_classifier_never_loads() {
        let shared =
            SharedClassifier::ready(Classifier::new(Box::new(Uniform), LabelTable::default()));
        assert!(shared.is_loaded());
        assert!(shared.get().await.is_ok());
    }

    #[cfg(not(feature = "onnx"))]
    #[tokio::test]
    async fn without_onnx_support_load_fails_cleanly() {
        let shared = SharedClassifier::for_model(PathBuf::from("/models/leaf.onnx"));
        let err = shared.get().await.err().unwrap();
        assert!(err.to_string().contains("onnx"));
    }
}
