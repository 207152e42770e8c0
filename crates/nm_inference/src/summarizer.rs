//! Synopsis generation with input guards and failure containment.
//!
//! [`Summarizer::summarize`] always returns text for the report: either the
//! model's synopsis or one of the fixed explanatory messages below.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use futures::{FutureExt, StreamExt};
use futures::stream;
use nm_core::InferenceModel;
use tracing::{debug, warn};

/// Trimmed input shorter than this is not worth a model call.
pub const MIN_TEXT_CHARS: usize = 50;
/// Longer input is cut to this many characters before submission.
pub const MAX_TEXT_CHARS: usize = 15_000;

pub const INSUFFICIENT_TEXT_MESSAGE: &str =
    "No hay suficiente texto en el artículo para generar un resumen.";

const FAILURE_PREFIX: &str = "No se pudo generar un resumen para este artículo. Error:";

pub fn failure_message(detail: &str) -> String {
    format!("{} {}", FAILURE_PREFIX, detail)
}

#[derive(Debug, Clone)]
pub struct Summarizer {
    model: Arc<dyn InferenceModel>,
    min_chars: usize,
    max_chars: usize,
}

impl Summarizer {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self {
            model,
            min_chars: MIN_TEXT_CHARS,
            max_chars: MAX_TEXT_CHARS,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// The text that would be submitted for `text`, or `None` when it is too
    /// short to summarize.
    pub fn prepare<'a>(&self, text: &'a str) -> Option<&'a str> {
        if text.trim().chars().count() < self.min_chars {
            return None;
        }
        Some(truncate_chars(text, self.max_chars))
    }

    pub async fn summarize(&self, text: &str) -> String {
        let Some(input) = self.prepare(text) else {
            debug!(chars = text.trim().chars().count(), "Skipping summary, text too short");
            return INSUFFICIENT_TEXT_MESSAGE.to_string();
        };

        let call = AssertUnwindSafe(self.model.summarize(input)).catch_unwind();
        match call.await {
            Ok(Ok(summary)) => summary.trim().to_string(),
            Ok(Err(e)) => {
                warn!(model = self.model.name(), error = %e, "Summarization failed");
                failure_message(&e.to_string())
            }
            Err(_) => {
                warn!(model = self.model.name(), "Summarization panicked");
                failure_message("the model client panicked")
            }
        }
    }

    /// Summarize each text, at most `concurrency` calls in flight, keeping
    /// the input order in the output.
    pub async fn summarize_many(&self, texts: &[&str], concurrency: usize) -> Vec<String> {
        stream::iter(texts.iter().copied())
            .map(|text| self.summarize(text))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use async_trait::async_trait;
    use nm_core::{Error, Result};

    #[derive(Debug, Default)]
    struct RecordingModel {
        calls: Mutex<Vec<String>>,
        fail_with: Option<String>,
        panic: bool,
    }

    impl RecordingModel {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InferenceModel for RecordingModel {
        fn name(&self) -> &str {
            "recording"
        }

        async fn summarize(&self, text: &str) -> Result<String> {
            self.calls.lock().unwrap().push(text.to_string());
            if self.panic {
                panic!("boom");
            }
            match &self.fail_with {
                Some(msg) => Err(Error::Inference(msg.clone())),
                None => Ok(format!("  resumen de {} caracteres \n", text.chars().count())),
            }
        }
    }

    fn summarizer(model: &Arc<RecordingModel>) -> Summarizer {
        Summarizer::new(model.clone() as Arc<dyn InferenceModel>)
    }

    #[tokio::test]
    async fn test_long_text_is_truncated_to_prefix() {
        let model = Arc::new(RecordingModel::default());
        let text: String = (0..20_000).map(|i| if i % 7 == 0 { 'ñ' } else { 'a' }).collect();

        let summary = summarizer(&model).summarize(&text).await;

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].chars().count(), 15_000);
        assert_eq!(calls[0], text.chars().take(15_000).collect::<String>());
        assert_eq!(summary, "resumen de 15000 caracteres");
    }

    #[tokio::test]
    async fn test_text_at_limit_is_untouched() {
        let model = Arc::new(RecordingModel::default());
        let text = "x".repeat(MAX_TEXT_CHARS);
        summarizer(&model).summarize(&text).await;
        assert_eq!(model.calls()[0], text);
    }

    #[tokio::test]
    async fn test_short_text_never_calls_model() {
        let model = Arc::new(RecordingModel::default());
        let s = summarizer(&model);
        let padded = format!("  {}  ", "y".repeat(49));

        for text in ["", "0123456789", "   \n\t  ", padded.as_str()] {
            assert_eq!(s.summarize(text).await, INSUFFICIENT_TEXT_MESSAGE);
        }
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let model = Arc::new(RecordingModel::default());
        let text = "z".repeat(MIN_TEXT_CHARS);
        let summary = summarizer(&model).summarize(&text).await;
        assert_ne!(summary, INSUFFICIENT_TEXT_MESSAGE);
        assert_eq!(model.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_model_error_becomes_message() {
        let model = Arc::new(RecordingModel {
            fail_with: Some("quota exceeded".to_string()),
            ..Default::default()
        });
        let summary = summarizer(&model).summarize(&"texto ".repeat(20)).await;
        assert!(summary.starts_with(FAILURE_PREFIX));
        assert!(summary.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_model_panic_is_contained() {
        let model = Arc::new(RecordingModel {
            panic: true,
            ..Default::default()
        });
        let summary = summarizer(&model).summarize(&"texto ".repeat(20)).await;
        assert!(summary.starts_with(FAILURE_PREFIX));
    }

    #[tokio::test]
    async fn test_summarize_many_keeps_order() {
        let model = Arc::new(RecordingModel::default());
        let a = "a".repeat(60);
        let b = "corto";
        let c = "c".repeat(80);
        let out = summarizer(&model)
            .summarize_many(&[a.as_str(), b, c.as_str()], 3)
            .await;
        assert_eq!(
            out,
            vec![
                "resumen de 60 caracteres".to_string(),
                INSUFFICIENT_TEXT_MESSAGE.to_string(),
                "resumen de 80 caracteres".to_string(),
            ]
        );
    }
}
