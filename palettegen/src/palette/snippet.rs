pub const DEFAULT_PREFIX: &str = "custom";

/// Render colors as a CSS `@theme` block of numbered custom properties.
pub fn theme_snippet<S: AsRef<str>>(colors: &[S], prefix: &str) -> String {
    let mut lines = Vec::with_capacity(colors.len() + 2);
    lines.push("@theme {".to_string());
    for (idx, color) in colors.iter().enumerate() {
        lines.push(format!("  --{}-{}: '{}';", prefix, idx + 1, color.as_ref()));
    }
    lines.push("}".to_string());
    lines.join("\n")
}
