use super::{Palette, PALETTE_SIZE};
use rand::Rng;

/// Hue rotation between neighbouring swatches, in degrees.
const HUE_STEP: f64 = 18.0;
/// Lightness change between neighbouring swatches, in percent.
const LIGHTNESS_STEP: f64 = 7.0;
const MIN_LIGHTNESS: f64 = 20.0;
const MAX_LIGHTNESS: f64 = 85.0;

/// Hue in degrees `[0, 360)`, saturation and lightness in percent `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// Parse `#rrggbb` or the `#rgb` shorthand. The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        if !expanded.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let num = u32::from_str_radix(&expanded, 16).ok()?;
        Some(Self::from_rgb(
            (num >> 16) as u8,
            ((num >> 8) & 0xff) as u8,
            (num & 0xff) as u8,
        ))
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let r = f64::from(r) / 255.0;
        let g = f64::from(g) / 255.0;
        let b = f64::from(b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return Self::new(0.0, 0.0, l * 100.0);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Self::new(h * 60.0, s * 100.0, l * 100.0)
    }

    pub fn to_hex(self) -> String {
        let s = self.s / 100.0;
        let l = self.l / 100.0;
        let h = self.h.rem_euclid(360.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h {
            h if h < 60.0 => (c, x, 0.0),
            h if h < 120.0 => (x, c, 0.0),
            h if h < 180.0 => (0.0, c, x),
            h if h < 240.0 => (0.0, x, c),
            h if h < 300.0 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
    }
}

/// `count` colors centered on `base`: hue rotates in 18° steps and lightness
/// moves in 7% steps, clamped to `[20, 85]`. The middle swatch is `base`
/// itself (lightness clamped).
pub fn similar_hsl(base: Hsl, count: usize) -> Vec<Hsl> {
    let mid = (count / 2) as f64;
    (0..count)
        .map(|i| {
            let offset = i as f64 - mid;
            let hue = (base.h + offset * HUE_STEP).rem_euclid(360.0);
            let light = (base.l + offset * LIGHTNESS_STEP).clamp(MIN_LIGHTNESS, MAX_LIGHTNESS);
            Hsl::new(hue, base.s, light)
        })
        .collect()
}

pub fn similar_palette(base: Hsl, count: usize) -> Vec<String> {
    similar_hsl(base, count).into_iter().map(Hsl::to_hex).collect()
}

/// `count` independent uniform 24-bit colors.
pub fn random_colors<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| format!("#{:06x}", rng.gen_range(0..=0xFF_FFFFu32)))
        .collect()
}

/// Unconditioned when `base` is `None`, otherwise a similar-hue palette
/// around `base`.
pub fn random_palette(base: Option<Hsl>) -> Palette {
    let colors = match base {
        Some(base) => similar_palette(base, PALETTE_SIZE),
        None => random_colors(&mut rand::thread_rng(), PALETTE_SIZE),
    };
    Palette { colors: colors_array(colors) }
}

fn colors_array(colors: Vec<String>) -> [String; PALETTE_SIZE] {
    let mut out: [String; PALETTE_SIZE] = Default::default();
    for (slot, color) in out.iter_mut().zip(colors) {
        *slot = color;
    }
    out
}
