use std::fmt;
use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use nm_core::{InferenceModel, Result, Error};
use crate::{Config, DEFAULT_API_BASE_URL, DEFAULT_MODEL_NAME};

const SYSTEM_PROMPT: &str = "Eres un periodista profesional especializado en minería.";

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// Chat-completions client for OpenAI or any API speaking the same protocol.
pub struct OpenAiModel {
    client: Client,
    api_key: String,
    base_url: String,
    model_name: String,
}

impl OpenAiModel {
    pub fn new(config: Config) -> Result<Self> {
        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("OpenAI API key is required".to_string()))?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: config
                .base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model_name: config.model_name.unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
        })
    }

    fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.model_name.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!(
                        "Tu tarea es resumir la siguiente nota a 4 o 5 líneas. \
                         Se objetivo y no omitas nada importante:\n\n{}",
                        text
                    ),
                },
            ],
        }
    }
}

fn first_choice(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| Error::External(anyhow!("model returned no content")))
}

impl fmt::Debug for OpenAiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model_name", &self.model_name)
            .finish()
    }
}

#[async_trait]
impl InferenceModel for OpenAiModel {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let request = self.build_request(text);

        let response = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "{} {}",
                status.as_u16(),
                body.trim()
            )));
        }

        first_choice(response.json::<ChatResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> OpenAiModel {
        OpenAiModel::new(Config {
            api_key: Some("test-key".to_string()),
            base_url: Some("http://localhost:9999/v1/".to_string()),
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn test_model_requires_api_key() {
        let result = OpenAiModel::new(Config::default());
        assert!(result.is_err());

        let result = OpenAiModel::new(Config {
            api_key: Some("   ".to_string()),
            ..Config::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults_and_trailing_slash() {
        let model = model();
        assert_eq!(model.base_url, "http://localhost:9999/v1");
        assert_eq!(model.model_name, DEFAULT_MODEL_NAME);
        assert!(!format!("{:?}", model).contains("test-key"));
    }

    #[test]
    fn test_request_carries_text() {
        let request = model().build_request("Peñoles anunció una nueva mina.");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        let user = json["messages"][1]["content"].as_str().unwrap();
        assert!(user.ends_with("Peñoles anunció una nueva mina."));
    }

    #[test]
    fn test_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  Resumen.  "}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice(response).unwrap(), "Resumen.");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(first_choice(empty).is_err());

        let null: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(first_choice(null).is_err());
    }
}
