// TextGenerator trait - backend-agnostic interface to a generative text model

use async_trait::async_trait;

/// A remote or local model that turns a prompt into text.
///
/// Implementations return the raw model output; prompt construction and
/// fallback handling live in the summarizer.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Generate text for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String, String>;
}
