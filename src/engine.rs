use anyhow::Result;
use async_trait::async_trait;

/// Seam between the web layer and the loaded model.
///
/// Implementations return the probability the model assigns to class index 1
/// of its label scheme, the score the verdict mapping consumes. The handle is
/// loaded once at startup and shared read-only for the life of the process.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn positive_probability(&self, text: &str) -> Result<f64>;
}
