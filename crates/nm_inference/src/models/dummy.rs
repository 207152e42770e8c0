use std::fmt;
use nm_core::{InferenceModel, Result};
use crate::Config;

/// Offline stand-in that returns the leading words of the text.
pub struct DummyModel {
    max_words: usize,
}

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").field("max_words", &self.max_words).finish()
    }
}

impl DummyModel {
    pub async fn new(_config: Option<Config>) -> Result<Self> {
        Ok(Self { max_words: 60 })
    }
}

#[async_trait::async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let words: Vec<&str> = text.split_whitespace().take(self.max_words).collect();
        let mut summary = words.join(" ");
        if text.split_whitespace().count() > self.max_words {
            summary.push('…');
        }
        Ok(summary)
    }
}
