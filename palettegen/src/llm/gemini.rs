use super::provider::{non_empty, read_json, PaletteProvider, PromptTemplate};
use super::response_parser::{ParsePolicy, ResponseParser};
use crate::error::{PaletteError, ProviderError};
use crate::palette::{Palette, ThemeDescription};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

pub const GEMINI_NAME: &str = "Gemini";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";

const GEMINI_PROMPT: PromptTemplate = PromptTemplate {
    system: None,
    instruction: "Return ONLY a JSON array of 5 valid hex color codes (e.g. [\"#FF0000\",...]) for a color palette inspired by: {theme}. No explanation, no extra text.",
    fallback_palette: None,
};

/// Google Generative Language `generateContent` adapter.
pub struct GeminiProvider {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    policy: ParsePolicy,
    parser: ResponseParser,
}

impl GeminiProvider {
    pub fn new(api_base: impl Into<String>, api_key: Option<String>) -> Result<Self, PaletteError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| PaletteError::configuration(GEMINI_NAME, "Google Gemini API key not set"))?;

        Ok(Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            policy: ParsePolicy::ALL_VALID,
            parser: ResponseParser::new(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn request_body(&self, theme: &ThemeDescription) -> Value {
        json!({
            "contents": [{
                "parts": [{ "text": GEMINI_PROMPT.render(theme) }]
            }]
        })
    }
}

#[async_trait]
impl PaletteProvider for GeminiProvider {
    fn name(&self) -> &str {
        GEMINI_NAME
    }

    async fn generate(&self, theme: &ThemeDescription) -> Result<Palette, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);
        tracing::debug!("[{}] Sending request to {}", GEMINI_NAME, url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(theme))
            .send()
            .await
            .map_err(|e| ProviderError::transport(GEMINI_NAME, e))?;

        let response_json = read_json(GEMINI_NAME, response).await?;

        let text = non_empty(
            GEMINI_NAME,
            response_json
                .pointer("/candidates/0/content/parts/0/text")
                .and_then(|t| t.as_str()),
        )?;
        tracing::debug!("[{}] Raw completion: {}", GEMINI_NAME, text);

        self.parser
            .parse(text, &self.policy)
            .map_err(|e| ProviderError::parse(GEMINI_NAME, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorKind;

    fn candidate(text: &str) -> String {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }], "role": "model" }
            }]
        })
        .to_string()
    }

    #[test]
    fn test_missing_key() {
        assert!(matches!(
            GeminiProvider::new("http://localhost", None),
            Err(PaletteError::Configuration { .. })
        ));
    }

    #[test]
    fn test_request_body() {
        let provider = GeminiProvider::new("http://localhost", Some("k".into())).unwrap();
        let body = provider.request_body(&ThemeDescription::new("ocean").unwrap());
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("inspired by: Theme description: ocean."));
    }

    #[tokio::test]
    async fn test_generate_from_candidate_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-1.5-pro:generateContent")
            .match_header("x-goog-api-key", "key")
            .with_status(200)
            .with_body(candidate(
                "```json\n[\"#0B3C5D\", \"#328CC1\", \"#D9B310\", \"#1D2731\", \"#F2F2F2\", \"#AAAAAA\"]\n```",
            ))
            .create_async()
            .await;

        let provider = GeminiProvider::new(server.url(), Some("key".into())).unwrap();
        let palette = provider
            .generate(&ThemeDescription::new("ocean").unwrap())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            palette.colors(),
            ["#0B3C5D", "#328CC1", "#D9B310", "#1D2731", "#F2F2F2"]
        );
    }

    #[tokio::test]
    async fn test_http_error_keeps_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/gemini-2.0-flash:generateContent")
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let provider = GeminiProvider::new(server.url(), Some("key".into()))
            .unwrap()
            .with_model("gemini-2.0-flash");
        let err = provider
            .generate(&ThemeDescription::new("ocean").unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ProviderErrorKind::Http);
        assert_eq!(err.status, Some(503));
        assert_eq!(err.message, "HTTP 503: upstream unavailable");
    }

    #[tokio::test]
    async fn test_missing_candidates_is_empty_completion() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/gemini-1.5-pro:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let provider = GeminiProvider::new(server.url(), Some("key".into())).unwrap();
        let err = provider
            .generate(&ThemeDescription::new("ocean").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::EmptyCompletion);
    }
}
