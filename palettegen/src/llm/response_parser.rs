use crate::error::ParseError;
use crate::palette::{dedupe_and_take, is_hex_color, Palette, PALETTE_SIZE};
use regex::Regex;
use serde_json::Value;

/// Per-provider acceptance rules for model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsePolicy {
    /// Minimum array length / regex match count before truncating to five.
    pub min_matches: usize,
    /// Require the array length (or distinct match count) to equal five.
    pub require_exact_count: bool,
    /// Deduplicate (case-insensitively) before counting.
    pub require_distinct: bool,
    /// Every candidate must be a hex color, not just the five kept.
    pub validate_all: bool,
}

impl ParsePolicy {
    /// Accept five or more colors and keep the first five.
    pub const AT_LEAST_FIVE: ParsePolicy = ParsePolicy {
        min_matches: PALETTE_SIZE,
        require_exact_count: false,
        require_distinct: true,
        validate_all: false,
    };

    /// Like [`AT_LEAST_FIVE`](Self::AT_LEAST_FIVE), but a single invalid
    /// entry anywhere in the array rejects it.
    pub const ALL_VALID: ParsePolicy = ParsePolicy {
        min_matches: PALETTE_SIZE,
        require_exact_count: false,
        require_distinct: true,
        validate_all: true,
    };

    /// Accept exactly five distinct colors.
    pub const EXACTLY_FIVE: ParsePolicy = ParsePolicy {
        min_matches: PALETTE_SIZE,
        require_exact_count: true,
        require_distinct: true,
        validate_all: true,
    };

    pub(crate) fn accept(&self, candidates: Vec<String>) -> Option<Vec<String>> {
        if self.validate_all && !candidates.iter().all(|c| is_hex_color(c)) {
            return None;
        }

        let candidates = if self.require_distinct {
            let len = candidates.len();
            dedupe_and_take(candidates, len)
        } else {
            candidates
        };

        let count_ok = if self.require_exact_count {
            candidates.len() == PALETTE_SIZE
        } else {
            candidates.len() >= self.min_matches.max(PALETTE_SIZE)
        };
        if !count_ok {
            return None;
        }

        let chosen: Vec<String> = candidates.into_iter().take(PALETTE_SIZE).collect();
        chosen.iter().all(|c| is_hex_color(c)).then_some(chosen)
    }
}

impl Default for ParsePolicy {
    fn default() -> Self {
        Self::AT_LEAST_FIVE
    }
}

/// Which strategy produced the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseTier {
    Structured,
    Pattern,
}

pub struct ResponseParser {
    code_block_regex: Regex,
    hex_regex: Regex,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            code_block_regex: Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```")
                .expect("Failed to compile regex"),
            hex_regex: Regex::new(r"#[0-9a-fA-F]{6}").expect("Failed to compile regex"),
        }
    }

    pub fn parse(&self, raw: &str, policy: &ParsePolicy) -> Result<Palette, ParseError> {
        self.parse_with_tier(raw, policy).map(|(palette, _)| palette)
    }

    /// Structured JSON first, then a regex scan over the raw text.
    pub fn parse_with_tier(
        &self,
        raw: &str,
        policy: &ParsePolicy,
    ) -> Result<(Palette, ParseTier), ParseError> {
        if let Some(colors) = self.structured(raw).and_then(|arr| policy.accept(arr)) {
            tracing::debug!("Palette parsed from JSON array");
            return to_palette(colors).map(|p| (p, ParseTier::Structured));
        }

        let matches: Vec<String> = self
            .hex_regex
            .find_iter(raw)
            .map(|m| m.as_str().to_string())
            .collect();
        tracing::debug!("Extracted hex codes: {:?}", matches);

        if let Some(colors) = policy.accept(matches) {
            tracing::debug!("Palette parsed from hex pattern scan");
            return to_palette(colors).map(|p| (p, ParseTier::Pattern));
        }

        tracing::warn!("Could not parse palette from response: {}", raw);
        Err(ParseError)
    }

    /// Locate a JSON array of strings as-is, then again with single quotes
    /// turned into double quotes.
    fn structured(&self, raw: &str) -> Option<Vec<String>> {
        if let Some(arr) = self.find_array(raw.trim()) {
            return Some(arr);
        }

        let fixed = raw.replace('\'', "\"");
        if fixed == raw {
            return None;
        }
        let arr = self.find_array(fixed.trim())?;
        tracing::warn!("Auto-fixed single-quoted JSON in response");
        Some(arr)
    }

    /// The whole text, a fenced code block, or the outermost `[...]` span.
    fn find_array(&self, normalized: &str) -> Option<Vec<String>> {

        // Strategy 1: Direct parsing
        if let Some(arr) = string_array(normalized) {
            return Some(arr);
        }

        // Strategy 2: Markdown code block
        if let Some(captures) = self.code_block_regex.captures(normalized) {
            if let Some(arr) = string_array(&captures[1]) {
                tracing::debug!("JSON array extracted from code block");
                return Some(arr);
            }
        }

        // Strategy 3: Outermost brackets inside prose
        let start = normalized.find('[')?;
        let end = normalized.rfind(']')?;
        if end <= start {
            return None;
        }
        let arr = string_array(&normalized[start..=end])?;
        tracing::debug!("JSON array extracted from surrounding text");
        Some(arr)
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

fn string_array(text: &str) -> Option<Vec<String>> {
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) else {
        return None;
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

fn to_palette(colors: Vec<String>) -> Result<Palette, ParseError> {
    Palette::new(colors).map_err(|_| ParseError)
}
