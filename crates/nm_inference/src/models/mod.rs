use std::sync::Arc;
use nm_core::{InferenceModel, Result, Error};
use crate::Config;

pub mod dummy;
pub mod openai;

pub use dummy::DummyModel;
pub use openai::OpenAiModel;

/// Names accepted by [`create_model`].
pub const AVAILABLE_MODELS: &[&str] = &["openai", "dummy"];

/// Whether the named backend needs an API key to work.
pub fn requires_api_key(model: &str) -> bool {
    model == "openai"
}

pub async fn create_model(config: Option<Config>) -> Result<Arc<dyn InferenceModel>> {
    let config = config.unwrap_or_default();
    match config.model.as_str() {
        "openai" => Ok(Arc::new(OpenAiModel::new(config)?)),
        "dummy" => Ok(Arc::new(DummyModel::new(Some(config)).await?)),
        other => Err(Error::Config(format!(
            "Unknown model '{}'. Available models: {}",
            other,
            AVAILABLE_MODELS.join(", ")
        ))),
    }
}
