use std::env;

use async_trait::async_trait;
use literacy_core::model::{Question, QuestionDraft};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::QuestionSource;
use crate::error::GenerationError;

#[derive(Clone, Debug)]
pub struct QuestionSourceConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl QuestionSourceConfig {
    /// Read `LITERACY_AI_API_KEY`, `LITERACY_AI_BASE_URL` and `LITERACY_AI_MODEL`.
    /// Returns `None` when no API key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("LITERACY_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("LITERACY_AI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("LITERACY_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Asks an OpenAI-compatible chat completions endpoint for one exercise in JSON.
#[derive(Clone)]
pub struct HttpQuestionSource {
    client: Client,
    config: Option<QuestionSourceConfig>,
}

impl HttpQuestionSource {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(QuestionSourceConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<QuestionSourceConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    async fn fetch(&self, prompt_context: &str) -> Result<Question, GenerationError> {
        let config = self.config.as_ref().ok_or(GenerationError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(prompt_context),
                },
            ],
            temperature: 0.7,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GenerationError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        debug!(model = %config.model, "question generated");
        parse_question(&content)
    }
}

const SYSTEM_PROMPT: &str = "Você é um assistente amigável para adultos com dificuldades de leitura.\n\
    Respostas curtas e simples.";

fn build_prompt(prompt_context: &str) -> String {
    format!(
        "Gere um desafio de alfabetização: {prompt_context}\n\
         Retorne JSON EXCLUSIVAMENTE:\n\
         {{\n\
         \"question\": \"Pergunta curta e simples\",\n\
         \"options\": [\"Certa\", \"Errada1\", \"Errada2\"],\n\
         \"correctAnswer\": \"Certa\",\n\
         \"explanation\": \"Feedback positivo muito curto\"\n\
         }}"
    )
}

/// Parse model output into a validated question. Tolerates a surrounding
/// Markdown code fence.
pub(crate) fn parse_question(content: &str) -> Result<Question, GenerationError> {
    let json = strip_code_fence(content);
    let draft: QuestionDraft = serde_json::from_str(json)?;
    Ok(draft.validate()?)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
