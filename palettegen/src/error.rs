use thiserror::Error;

/// Message used whenever neither parse tier yields a usable palette.
pub const PARSE_FAILURE_MESSAGE: &str = "could not parse 5 hex codes";

#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Configuration error for {provider}: {message}")]
    Configuration { provider: String, message: String },

    #[error("Theme description is empty")]
    EmptyTheme,

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("A palette resolution is already in progress")]
    Busy,

    #[error("Palette resolution was cancelled")]
    Cancelled,

    #[error("No palette providers are available")]
    NoProviders,

    /// Every provider in the chain failed. `message` is the last provider's
    /// error; `failures` holds all of them in attempt order.
    #[error("{message}")]
    Exhausted {
        message: String,
        rate_limited: bool,
        failures: Vec<ProviderError>,
    },
}

impl PaletteError {
    pub fn configuration(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Non-2xx HTTP status.
    Http,
    /// 2xx response that carried an `error` payload.
    Api,
    EmptyCompletion,
    Parse,
    /// Connection failure or undecodable body.
    Transport,
}

#[derive(Error, Debug, Clone)]
#[error("{provider}: {message}")]
pub struct ProviderError {
    pub provider: String,
    pub kind: ProviderErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn http(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(provider, ProviderErrorKind::Http, message)
        }
    }

    pub fn parse(provider: impl Into<String>, err: ParseError) -> Self {
        Self::new(provider, ProviderErrorKind::Parse, err.to_string())
    }

    pub fn transport(provider: impl Into<String>, err: reqwest::Error) -> Self {
        let message = if err.is_connect() {
            format!("Connection failed: {}", err)
        } else if err.is_decode() {
            format!("Invalid response body: {}", err)
        } else {
            format!("Network error: {}", err)
        };
        Self {
            status: err.status().map(|s| s.as_u16()),
            ..Self::new(provider, ProviderErrorKind::Transport, message)
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == Some(429)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", PARSE_FAILURE_MESSAGE)]
pub struct ParseError;
