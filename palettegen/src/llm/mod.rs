pub mod colormind;
pub mod gemini;
pub mod huggingface;
pub mod openai;
pub mod provider;
pub mod response_parser;

pub use provider::{PaletteProvider, PromptTemplate};
pub use response_parser::{ParsePolicy, ParseTier, ResponseParser};

use crate::config::{Config, Credentials, ProviderKind};
use crate::error::PaletteError;
use gemini::GeminiProvider;
use huggingface::HuggingFaceProvider;
use openai::{ChatPreset, OpenAICompatibleProvider};
use std::sync::Arc;

/// Construct the adapter for `kind` from static configuration.
pub fn build_provider(
    kind: ProviderKind,
    config: &Config,
    credentials: &Credentials,
) -> Result<Arc<dyn PaletteProvider>, PaletteError> {
    let endpoints = &config.endpoints;

    let provider: Arc<dyn PaletteProvider> = match kind {
        ProviderKind::O4Mini => Arc::new(OpenAICompatibleProvider::new(
            &endpoints.github_models,
            credentials.github_token.clone(),
            ChatPreset::o4_mini(),
        )?),
        ProviderKind::Grok3Mini => Arc::new(OpenAICompatibleProvider::new(
            &endpoints.github_models,
            credentials.github_token.clone(),
            ChatPreset::grok_mini(),
        )?),
        ProviderKind::DeepSeekR1 => Arc::new(OpenAICompatibleProvider::new(
            &endpoints.github_models,
            credentials.github_token.clone(),
            ChatPreset::deepseek(),
        )?),
        ProviderKind::OpenAi => Arc::new(OpenAICompatibleProvider::new(
            &endpoints.openai,
            credentials.openai_api_key.clone(),
            ChatPreset::openai(),
        )?),
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(
            &endpoints.gemini,
            credentials.gemini_api_key.clone(),
        )?),
        ProviderKind::HuggingFace => Arc::new(HuggingFaceProvider::new(
            &endpoints.huggingface,
            credentials.hf_token.clone(),
        )),
    };

    Ok(provider)
}
