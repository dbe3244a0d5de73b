use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const HF_TOKEN_ENV: &str = "HF_TOKEN";

/// Main configuration structure for palettegen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub endpoints: EndpointsConfig,

    #[serde(default)]
    pub credentials: Credentials,

    #[serde(default)]
    pub random: RandomConfig,
}

/// LLM backends the resolver knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    #[serde(rename = "o4-mini")]
    #[value(name = "o4-mini")]
    O4Mini,
    #[serde(rename = "grok-3-mini")]
    #[value(name = "grok-3-mini")]
    Grok3Mini,
    #[serde(rename = "deepseek-r1")]
    #[value(name = "deepseek-r1")]
    DeepSeekR1,
    Gemini,
    #[serde(rename = "openai")]
    #[value(name = "openai")]
    OpenAi,
    #[serde(rename = "huggingface")]
    #[value(name = "huggingface")]
    HuggingFace,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::O4Mini => "o4-mini",
            ProviderKind::Grok3Mini => "grok-3-mini",
            ProviderKind::DeepSeekR1 => "deepseek-r1",
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::HuggingFace => "huggingface",
        };
        f.write_str(name)
    }
}

/// Fallback chain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Providers in the order they are tried
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderKind>,
}

/// Base URLs for each backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// GitHub Models inference endpoint (o4-mini, grok-3-mini, deepseek-r1)
    #[serde(default = "default_github_models")]
    pub github_models: String,

    #[serde(default = "default_openai")]
    pub openai: String,

    #[serde(default = "default_gemini")]
    pub gemini: String,

    #[serde(default = "default_colormind")]
    pub colormind: String,

    /// Full Inference API model URL
    #[serde(default = "default_huggingface")]
    pub huggingface: String,
}

/// API credentials, one per backend. Environment variables win over file values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,

    /// Optional; the Inference API also serves anonymous requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hf_token: Option<String>,
}

/// Random palette settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomConfig {
    /// Number of swatches in a palette derived from a base color
    #[serde(default = "default_random_count")]
    pub count: usize,
}

// Default value functions
fn default_providers() -> Vec<ProviderKind> {
    vec![ProviderKind::O4Mini, ProviderKind::Grok3Mini]
}

fn default_github_models() -> String {
    "https://models.github.ai/inference".to_string()
}

fn default_openai() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_gemini() -> String {
    "https://generativelanguage.googleapis.com/v1".to_string()
}

fn default_colormind() -> String {
    // Colormind only serves plain http
    "http://colormind.io/api/".to_string()
}

fn default_huggingface() -> String {
    "https://api-inference.huggingface.co/models/mradermacher/mistral7b_text_to_json_v3.1-GGUF"
        .to_string()
}

fn default_random_count() -> usize {
    5
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            github_models: default_github_models(),
            openai: default_openai(),
            gemini: default_gemini(),
            colormind: default_colormind(),
            huggingface: default_huggingface(),
        }
    }
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            count: default_random_count(),
        }
    }
}

impl Credentials {
    /// Read credentials from the process environment only.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Replace file values with any non-empty environment variables.
    pub fn with_env_overrides(self) -> Self {
        Self {
            github_token: env_var(GITHUB_TOKEN_ENV).or(self.github_token),
            gemini_api_key: env_var(GEMINI_API_KEY_ENV).or(self.gemini_api_key),
            openai_api_key: env_var(OPENAI_API_KEY_ENV).or(self.openai_api_key),
            hf_token: env_var(HF_TOKEN_ENV).or(self.hf_token),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration with proper hierarchy
    ///
    /// **Config Priority (highest to lowest):**
    /// 1. `./palettegen.toml` (project-level config)
    /// 2. `~/.config/palettegen/config.toml` (global user config)
    /// 3. Hardcoded defaults
    ///
    /// Credentials from the environment are applied last and override both files.
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                tracing::info!("Loading global config from: {}", global_path.display());
                config = Self::load_from_file(&global_path)?;
            }
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            tracing::info!("Loading project config from: {}", project_path.display());
            config = Self::load_from_file(&project_path)?;
        }

        config.credentials = config.credentials.with_env_overrides();
        config.validate()?;

        tracing::debug!(
            "Final config: providers={:?}, github_models={}",
            config.resolver.providers,
            config.endpoints.github_models
        );

        Ok(config)
    }

    /// Load config from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Check that every endpoint is an http(s) URL and the chain is usable
    pub fn validate(&self) -> Result<()> {
        let endpoints = [
            ("github_models", &self.endpoints.github_models),
            ("openai", &self.endpoints.openai),
            ("gemini", &self.endpoints.gemini),
            ("colormind", &self.endpoints.colormind),
            ("huggingface", &self.endpoints.huggingface),
        ];

        for (name, endpoint) in endpoints {
            let url = Url::parse(endpoint)
                .with_context(|| format!("Invalid {} endpoint: {}", name, endpoint))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                bail!(
                    "Invalid {} endpoint scheme '{}': must be http or https",
                    name,
                    url.scheme()
                );
            }
        }

        if self.resolver.providers.is_empty() {
            bail!("resolver.providers must list at least one provider");
        }

        if self.random.count == 0 {
            bail!("random.count must be at least 1");
        }

        Ok(())
    }

    /// Get the global config path (~/.config/palettegen/config.toml)
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("palettegen").join("config.toml"))
    }

    /// Get the project config path (./palettegen.toml in current directory)
    pub fn project_config_path() -> PathBuf {
        PathBuf::from("palettegen.toml")
    }

    /// Create a default config file at the specified path
    pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Config::default();
        let toml_string =
            toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(path.as_ref(), toml_string)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.resolver.providers,
            vec![ProviderKind::O4Mini, ProviderKind::Grok3Mini]
        );
        assert_eq!(config.endpoints.github_models, "https://models.github.ai/inference");
        assert_eq!(config.endpoints.colormind, "http://colormind.io/api/");
        assert_eq!(config.random.count, 5);
        assert!(config.credentials.github_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
            [resolver]
            providers = ["deepseek-r1", "gemini", "openai", "huggingface"]

            [credentials]
            gemini_api_key = "abc"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.resolver.providers,
            vec![
                ProviderKind::DeepSeekR1,
                ProviderKind::Gemini,
                ProviderKind::OpenAi,
                ProviderKind::HuggingFace
            ]
        );
        assert_eq!(config.credentials.gemini_api_key.as_deref(), Some("abc"));
        // Other fields should use defaults
        assert_eq!(config.endpoints.openai, "https://api.openai.com/v1");
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let toml_str = r#"
            [resolver]
            providers = ["claude"]
        "#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let toml_str = r#"
            [resolver
            providers = []
        "#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_endpoints() {
        let mut config = Config::default();
        config.endpoints.gemini = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.endpoints.openai = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.resolver.providers.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_create_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        Config::create_default_config(&config_path).unwrap();
        assert!(config_path.exists());

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.resolver.providers, default_providers());
        assert!(config.credentials.openai_api_key.is_none());
    }

    #[test]
    fn test_provider_kind_display_matches_serde() {
        for kind in [
            ProviderKind::O4Mini,
            ProviderKind::Grok3Mini,
            ProviderKind::DeepSeekR1,
            ProviderKind::Gemini,
            ProviderKind::OpenAi,
            ProviderKind::HuggingFace,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_credentials() {
        std::env::set_var(GITHUB_TOKEN_ENV, "from-env");
        std::env::remove_var(GEMINI_API_KEY_ENV);
        std::env::set_var(OPENAI_API_KEY_ENV, "   ");

        let creds = Credentials {
            github_token: Some("from-file".to_string()),
            gemini_api_key: Some("gem-file".to_string()),
            openai_api_key: Some("oa-file".to_string()),
            hf_token: None,
        }
        .with_env_overrides();

        assert_eq!(creds.github_token.as_deref(), Some("from-env"));
        assert_eq!(creds.gemini_api_key.as_deref(), Some("gem-file"));
        // Blank variables are ignored
        assert_eq!(creds.openai_api_key.as_deref(), Some("oa-file"));

        std::env::remove_var(GITHUB_TOKEN_ENV);
        std::env::remove_var(OPENAI_API_KEY_ENV);
    }

    #[test]
    #[serial]
    fn test_credentials_from_env() {
        std::env::remove_var(GITHUB_TOKEN_ENV);
        std::env::set_var(GEMINI_API_KEY_ENV, "gem");
        std::env::remove_var(OPENAI_API_KEY_ENV);
        std::env::set_var(HF_TOKEN_ENV, "hf_abc");

        let creds = Credentials::from_env();
        assert!(creds.github_token.is_none());
        assert_eq!(creds.gemini_api_key.as_deref(), Some("gem"));
        assert_eq!(creds.hf_token.as_deref(), Some("hf_abc"));

        std::env::remove_var(GEMINI_API_KEY_ENV);
        std::env::remove_var(HF_TOKEN_ENV);
    }
}
