use super::provider::{read_json, PaletteProvider, PromptTemplate};
use super::response_parser::ParsePolicy;
use crate::error::{ParseError, ProviderError};
use crate::palette::{Palette, ThemeDescription};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

pub const HUGGINGFACE_NAME: &str = "HuggingFace";

const HUGGINGFACE_PROMPT: PromptTemplate = PromptTemplate {
    system: None,
    instruction: "Generate a JSON array of 5 hex color codes for a color palette inspired by: {theme}",
    fallback_palette: None,
};

/// Hugging Face Inference API adapter. The token is optional.
pub struct HuggingFaceProvider {
    client: Client,
    model_url: String,
    token: Option<String>,
    policy: ParsePolicy,
}

impl HuggingFaceProvider {
    pub fn new(model_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            model_url: model_url.into(),
            token: token.filter(|t| !t.trim().is_empty()),
            policy: ParsePolicy::ALL_VALID,
        }
    }

    fn request_body(&self, theme: &ThemeDescription) -> Value {
        json!({ "inputs": HUGGINGFACE_PROMPT.render(theme) })
    }
}

#[async_trait]
impl PaletteProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        HUGGINGFACE_NAME
    }

    async fn generate(&self, theme: &ThemeDescription) -> Result<Palette, ProviderError> {
        tracing::debug!("[{}] Sending request to {}", HUGGINGFACE_NAME, self.model_url);

        let mut request = self.client.post(&self.model_url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .json(&self.request_body(theme))
            .send()
            .await
            .map_err(|e| ProviderError::transport(HUGGINGFACE_NAME, e))?;

        let response_json = read_json(HUGGINGFACE_NAME, response).await?;
        tracing::debug!("[{}] Raw response: {}", HUGGINGFACE_NAME, response_json);

        extract_colors(&response_json)
            .and_then(|colors| self.policy.accept(colors))
            .and_then(|colors| Palette::new(colors).ok())
            .ok_or_else(|| ProviderError::parse(HUGGINGFACE_NAME, ParseError))
    }
}

/// Pull a list of strings out of the shapes the Inference API returns:
/// a bare array, an object keyed `"[0]"`, `"[1]"`, ..., an object with a
/// `generated_text` holding JSON, or a JSON-encoded string.
fn extract_colors(data: &Value) -> Option<Vec<String>> {
    match data {
        Value::Array(items) => {
            // Text-generation models wrap their output: [{"generated_text": ...}]
            if let [single @ Value::Object(_)] = items.as_slice() {
                return extract_colors(single);
            }
            strings(items)
        }
        Value::Object(map) if map.contains_key("[0]") => {
            let values: Vec<Value> = (0..)
                .map_while(|i| map.get(&format!("[{}]", i)).cloned())
                .collect();
            strings(&values)
        }
        Value::Object(map) => map
            .get("generated_text")
            .and_then(Value::as_str)
            .and_then(json_string_array),
        Value::String(text) => json_string_array(text),
        _ => None,
    }
}

fn strings(items: &[Value]) -> Option<Vec<String>> {
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn json_string_array(text: &str) -> Option<Vec<String>> {
    serde_json::from_str::<Vec<String>>(text.trim()).ok()
}
