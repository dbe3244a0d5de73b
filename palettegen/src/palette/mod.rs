pub mod hex;
pub mod random;
pub mod snippet;

use crate::error::PaletteError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use hex::{dedupe_and_take, is_hex_color};
pub use random::{random_palette, similar_palette, Hsl};
pub use snippet::theme_snippet;

/// Number of colors in every palette.
pub const PALETTE_SIZE: usize = 5;

/// An ordered set of exactly five hex colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Palette {
    colors: [String; PALETTE_SIZE],
}

impl Palette {
    /// Build a palette from exactly five well-formed hex colors.
    pub fn new(colors: Vec<String>) -> Result<Self, PaletteError> {
        if let Some(bad) = colors.iter().find(|c| !is_hex_color(c)) {
            return Err(PaletteError::InvalidColor(bad.clone()));
        }
        let len = colors.len();
        let colors: [String; PALETTE_SIZE] = colors.try_into().map_err(|_| {
            PaletteError::InvalidColor(format!("expected {} colors, got {}", PALETTE_SIZE, len))
        })?;
        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.colors.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for Palette {
    type Error = PaletteError;

    fn try_from(colors: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}

impl From<Palette> for Vec<String> {
    fn from(palette: Palette) -> Self {
        palette.colors.into()
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.colors.join(" "))
    }
}

/// Free-text theme supplied by the user. Never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeDescription(String);

impl ThemeDescription {
    pub fn new(text: impl AsRef<str>) -> Result<Self, PaletteError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PaletteError::EmptyTheme);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThemeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
