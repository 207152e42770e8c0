use async_trait::async_trait;
use crate::Result;

/// An external language model able to condense article text.
#[async_trait]
pub trait InferenceModel: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Produce a short synopsis of `text`.
    async fn summarize(&self, text: &str) -> Result<String>;
}
