use super::provider::{non_empty, read_json, PaletteProvider, PromptTemplate};
use super::response_parser::{ParsePolicy, ResponseParser};
use crate::error::{PaletteError, ProviderError};
use crate::palette::{Palette, ThemeDescription};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Reasoning models take this instead of `max_tokens`.
    pub max_completion_tokens: Option<u32>,
}

/// Everything that distinguishes one chat-completions model from another.
#[derive(Debug, Clone)]
pub struct ChatPreset {
    pub name: &'static str,
    pub generation: GenerationConfig,
    pub prompt: PromptTemplate,
    pub policy: ParsePolicy,
    /// Sent as the `api-version` query parameter when set.
    pub api_version: Option<&'static str>,
}

pub const O4_MINI_API_VERSION: &str = "2024-12-01-preview";

const HELPFUL_ASSISTANT: &str = "You are a helpful assistant.";

impl ChatPreset {
    pub fn o4_mini() -> Self {
        Self {
            name: "O4-Mini",
            generation: GenerationConfig {
                model: "openai/o4-mini".to_string(),
                temperature: None,
                top_p: None,
                max_tokens: None,
                max_completion_tokens: Some(4000),
            },
            prompt: PromptTemplate {
                system: Some(HELPFUL_ASSISTANT),
                instruction: "Return ONLY a JSON array of 5 visually distinct, aesthetically pleasing hex color codes (e.g. [\"#FF0000\",...]) for a color palette inspired by: {theme}. No explanation, no extra text, no trailing comma.",
                fallback_palette: None,
            },
            policy: ParsePolicy::AT_LEAST_FIVE,
            api_version: Some(O4_MINI_API_VERSION),
        }
    }

    pub fn grok_mini() -> Self {
        Self {
            name: "Grok-3-Mini",
            generation: GenerationConfig {
                model: "xai/grok-3-mini".to_string(),
                temperature: Some(1.0),
                top_p: Some(1.0),
                max_tokens: Some(200),
                max_completion_tokens: None,
            },
            prompt: PromptTemplate {
                system: Some(HELPFUL_ASSISTANT),
                instruction: "Return ONLY a JSON array of 5 valid hex color codes (e.g. [\"#FF0000\",...]) for a color palette inspired by: {theme}. No explanation, no extra text.",
                fallback_palette: Some(["#000000", "#111111", "#222222", "#333333", "#444444"]),
            },
            policy: ParsePolicy::AT_LEAST_FIVE,
            api_version: None,
        }
    }

    pub fn deepseek() -> Self {
        Self {
            name: "DeepSeek-R1",
            generation: GenerationConfig {
                model: "deepseek/DeepSeek-R1-0528".to_string(),
                temperature: None,
                top_p: None,
                max_tokens: Some(200),
                max_completion_tokens: None,
            },
            prompt: PromptTemplate {
                system: None,
                instruction: "You are a color palette generator. Given the following theme description, return ONLY a valid JSON array of 5 unique and visually distinct hex color codes (e.g. [\"#FF0000\", ...]) for a color palette. Do not repeat similar colors. Do not include any explanation, text, or formatting except the JSON array.\n\n{theme}",
                fallback_palette: Some(["#31d8da", "#bfd219", "#8da2c9", "#384171", "#0d63c1"]),
            },
            policy: ParsePolicy::EXACTLY_FIVE,
            api_version: None,
        }
    }

    pub fn openai() -> Self {
        Self {
            name: "GPT-3.5-Turbo",
            generation: GenerationConfig {
                model: "gpt-3.5-turbo".to_string(),
                temperature: Some(0.7),
                top_p: None,
                max_tokens: Some(100),
                max_completion_tokens: None,
            },
            prompt: PromptTemplate {
                system: Some("You are a helpful assistant that generates color palettes. Only return a comma-separated list of 5 hex color codes, no extra text."),
                instruction: "{theme}",
                fallback_palette: None,
            },
            policy: ParsePolicy::AT_LEAST_FIVE,
            api_version: None,
        }
    }
}

/// Adapter for any endpoint that speaks the OpenAI `/chat/completions` shape.
pub struct OpenAICompatibleProvider {
    client: Client,
    api_base: String,
    api_key: String,
    preset: ChatPreset,
    parser: ResponseParser,
}

impl OpenAICompatibleProvider {
    /// Fails when `api_key` is missing or blank.
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        preset: ChatPreset,
    ) -> Result<Self, PaletteError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| PaletteError::configuration(preset.name, "API token not set"))?;

        Ok(Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
            preset,
            parser: ResponseParser::new(),
        })
    }

    pub fn preset(&self) -> &ChatPreset {
        &self.preset
    }

    fn build_messages(&self, theme: &ThemeDescription) -> Vec<Value> {
        let mut messages = Vec::new();

        if let Some(system) = self.preset.prompt.system {
            messages.push(json!({
                "role": "system",
                "content": system
            }));
        }

        messages.push(json!({
            "role": "user",
            "content": self.preset.prompt.render(theme)
        }));

        messages
    }

    fn request_body(&self, theme: &ThemeDescription) -> Value {
        let config = &self.preset.generation;

        let mut request_body = json!({
            "model": config.model,
            "messages": self.build_messages(theme),
        });

        if let Some(temperature) = config.temperature {
            request_body["temperature"] = json!(temperature);
        }
        if let Some(top_p) = config.top_p {
            request_body["top_p"] = json!(top_p);
        }
        if let Some(max_tokens) = config.max_tokens {
            request_body["max_tokens"] = json!(max_tokens);
        }
        if let Some(max_completion_tokens) = config.max_completion_tokens {
            request_body["max_completion_tokens"] = json!(max_completion_tokens);
        }

        request_body
    }
}

#[async_trait]
impl PaletteProvider for OpenAICompatibleProvider {
    fn name(&self) -> &str {
        self.preset.name
    }

    async fn generate(&self, theme: &ThemeDescription) -> Result<Palette, ProviderError> {
        let url = format!("{}/chat/completions", self.api_base);
        let request_body = self.request_body(theme);

        tracing::debug!(
            "[{}] Sending request to {} (model: {})",
            self.name(),
            url,
            self.preset.generation.model
        );

        let mut request = self.client.post(&url).bearer_auth(&self.api_key);
        if let Some(api_version) = self.preset.api_version {
            request = request.query(&[("api-version", api_version)]);
        }

        let response = request
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::transport(self.name(), e))?;

        let response_json = read_json(self.name(), response).await?;

        let choice = response_json
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first());

        if let Some(finish_reason) = choice
            .and_then(|c| c.get("finish_reason"))
            .and_then(|fr| fr.as_str())
        {
            tracing::debug!("[{}] finish_reason: {}", self.name(), finish_reason);
        }

        let text = non_empty(
            self.name(),
            choice
                .and_then(|c| c.get("message"))
                .and_then(|m| m.get("content"))
                .and_then(|c| c.as_str()),
        )?;
        tracing::debug!("[{}] Raw completion: {}", self.name(), text);

        self.parser
            .parse(text, &self.preset.policy)
            .map_err(|e| ProviderError::parse(self.name(), e))
    }
}
