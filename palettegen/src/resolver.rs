use crate::config::Config;
use crate::error::{PaletteError, ProviderError};
use crate::llm::{build_provider, PaletteProvider};
use crate::palette::{Palette, ThemeDescription};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const RATE_LIMIT_ADVISORY: &str =
    "AI is not responding at the moment (rate limited). Please try again in a minute.";

/// Non-fatal notice attached to a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// The primary provider answered HTTP 429.
    RateLimited { provider: String },
    /// Earlier providers failed and a later one produced the palette.
    FellBack { failed: Vec<String>, used: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::RateLimited { .. } => f.write_str(RATE_LIMIT_ADVISORY),
            Advisory::FellBack { failed, used } => {
                write!(f, "{} failed. Used {} as fallback.", failed.join(", "), used)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub palette: Palette,
    pub provider_used: String,
    pub advisories: Vec<Advisory>,
}

impl Resolution {
    /// All advisories joined into one message, if any.
    pub fn advisory(&self) -> Option<String> {
        if self.advisories.is_empty() {
            return None;
        }
        let messages: Vec<String> = self.advisories.iter().map(|a| a.to_string()).collect();
        Some(messages.join(" "))
    }
}

/// Tries each provider in order and stops at the first palette.
///
/// Only one resolution runs at a time per resolver; a concurrent call fails
/// with [`PaletteError::Busy`] instead of racing the first.
pub struct FallbackResolver {
    providers: Vec<Arc<dyn PaletteProvider>>,
    in_flight: Mutex<()>,
}

impl FallbackResolver {
    pub fn new(providers: Vec<Arc<dyn PaletteProvider>>) -> Self {
        Self {
            providers,
            in_flight: Mutex::new(()),
        }
    }

    /// Build the chain from `config.resolver.providers`. A provider whose
    /// credential is missing is skipped; the rest stay usable.
    pub fn from_config(config: &Config) -> Result<Self, PaletteError> {
        let mut providers = Vec::new();

        for kind in &config.resolver.providers {
            match build_provider(*kind, config, &config.credentials) {
                Ok(provider) => providers.push(provider),
                Err(e) => tracing::warn!("Skipping provider {}: {}", kind, e),
            }
        }

        if providers.is_empty() {
            return Err(PaletteError::NoProviders);
        }

        Ok(Self::new(providers))
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn resolve(&self, theme: &ThemeDescription) -> Result<Resolution, PaletteError> {
        let _guard = self.in_flight.try_lock().map_err(|_| PaletteError::Busy)?;

        if self.providers.is_empty() {
            return Err(PaletteError::NoProviders);
        }

        let mut failures: Vec<ProviderError> = Vec::new();

        for provider in &self.providers {
            tracing::info!("Requesting palette from {}", provider.name());

            match provider.generate(theme).await {
                Ok(palette) => {
                    tracing::info!("{} produced palette: {}", provider.name(), palette);
                    return Ok(Resolution {
                        palette,
                        provider_used: provider.name().to_string(),
                        advisories: advisories_for(&failures, provider.name()),
                    });
                }
                Err(e) => {
                    tracing::warn!("{} failed: {}", provider.name(), e.message);
                    failures.push(e);
                }
            }
        }

        // Only the primary's throttling is surfaced; later 429s are just failures
        let rate_limited = failures.first().is_some_and(ProviderError::is_rate_limited);
        let message = failures
            .last()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| "AI error".to_string());

        Err(PaletteError::Exhausted {
            message,
            rate_limited,
            failures,
        })
    }

    /// Like [`resolve`](Self::resolve), but abandons the in-flight request as
    /// soon as `cancel` completes.
    pub async fn resolve_until<F>(
        &self,
        theme: &ThemeDescription,
        cancel: F,
    ) -> Result<Resolution, PaletteError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.resolve(theme) => result,
            _ = cancel => {
                tracing::info!("Palette resolution cancelled");
                Err(PaletteError::Cancelled)
            }
        }
    }
}

fn advisories_for(failures: &[ProviderError], used: &str) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    if let Some(limited) = failures.first().filter(|e| e.is_rate_limited()) {
        advisories.push(Advisory::RateLimited {
            provider: limited.provider.clone(),
        });
    }

    if !failures.is_empty() {
        advisories.push(Advisory::FellBack {
            failed: failures.iter().map(|e| e.provider.clone()).collect(),
            used: used.to_string(),
        });
    }

    advisories
}
