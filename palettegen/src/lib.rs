// palettegen/src/lib.rs
pub mod config;
pub mod error;
pub mod llm;
pub mod palette;
pub mod resolver;

// Re-export key types
pub use config::{Config, Credentials, ProviderKind};
pub use error::{PaletteError, ParseError, ProviderError, ProviderErrorKind};
pub use palette::{Palette, ThemeDescription};
pub use resolver::{Advisory, FallbackResolver, Resolution};

use palette::Hsl;

/// Random palette, optionally built around `base_color` (`#rrggbb` or `#rgb`).
pub fn get_random_palette(base_color: Option<&str>) -> Result<Palette, PaletteError> {
    let base = base_color
        .map(|hex| Hsl::from_hex(hex).ok_or_else(|| PaletteError::InvalidColor(hex.to_string())))
        .transpose()?;
    Ok(palette::random_palette(base))
}

/// Resolve a theme through the configured provider chain.
pub async fn resolve_ai_palette(
    resolver: &FallbackResolver,
    theme_description: &str,
) -> Result<Resolution, PaletteError> {
    let theme = ThemeDescription::new(theme_description)?;
    resolver.resolve(&theme).await
}
