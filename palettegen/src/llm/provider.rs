use crate::error::{ProviderError, ProviderErrorKind};
use crate::palette::{Palette, ThemeDescription, PALETTE_SIZE};
use async_trait::async_trait;
use serde_json::Value;

/// One LLM backend that turns a theme into a palette. Each call sends a
/// single request; implementations never retry.
#[async_trait]
pub trait PaletteProvider: Send + Sync {
    /// Display name used to tag results ("O4-Mini", "Gemini", ...).
    fn name(&self) -> &str;

    async fn generate(&self, theme: &ThemeDescription) -> Result<Palette, ProviderError>;
}

/// Fixed instruction wrapped around the user's theme.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub system: Option<&'static str>,
    /// Instruction text; `{theme}` is replaced by `Theme description: <text>`.
    pub instruction: &'static str,
    /// Palette the model is told to return when it cannot comply.
    pub fallback_palette: Option<[&'static str; PALETTE_SIZE]>,
}

impl PromptTemplate {
    pub fn render(&self, theme: &ThemeDescription) -> String {
        let mut prompt = self
            .instruction
            .replace("{theme}", &format!("Theme description: {}", theme));

        if let Some(fallback) = &self.fallback_palette {
            let quoted: Vec<String> = fallback.iter().map(|c| format!("\"{}\"", c)).collect();
            prompt.push_str(&format!(
                " If you cannot comply, just return [{}].",
                quoted.join(", ")
            ));
        }

        prompt
    }
}

/// Turn an HTTP response into JSON, mapping non-2xx statuses and `error`
/// payloads to provider errors.
pub(crate) async fn read_json(
    provider: &str,
    response: reqwest::Response,
) -> Result<Value, ProviderError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|json| json.get("error").map(error_text))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                } else {
                    body.trim().to_string()
                }
            });
        tracing::warn!("{} returned HTTP {}: {}", provider, status.as_u16(), detail);
        return Err(ProviderError::http(
            provider,
            status.as_u16(),
            format!("HTTP {}: {}", status.as_u16(), detail),
        ));
    }

    let json: Value = response
        .json()
        .await
        .map_err(|e| ProviderError::transport(provider, e))?;

    if let Some(error) = json.get("error") {
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::Api,
            error_text(error),
        ));
    }

    Ok(json)
}

fn error_text(error: &Value) -> String {
    error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .unwrap_or("Unknown error")
        .to_string()
}

/// Reject a missing or whitespace-only completion.
pub(crate) fn non_empty<'a>(provider: &str, text: Option<&'a str>) -> Result<&'a str, ProviderError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ProviderError::new(
            provider,
            ProviderErrorKind::EmptyCompletion,
            "Empty completion in response",
        )),
    }
}
