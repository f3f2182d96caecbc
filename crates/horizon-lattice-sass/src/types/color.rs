//! Color values and the color-space math behind the color functions.

use super::value::widen;

/// An sRGB color with 8-bit channels and a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha in `0.0..=1.0`.
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    /// Create a color with alpha. Alpha is clamped to `0.0..=1.0`.
    pub fn rgba(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self {
            r,
            g,
            b,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Parse a hex color (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`). The `#`
    /// is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !matches!(hex.len(), 3 | 4 | 6 | 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Self::from_css(&format!("#{hex}"))
    }

    /// Look up a CSS named color such as `red` or `rebeccapurple`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        Self::from_css(name)
    }

    fn from_css(input: &str) -> Option<Self> {
        let parsed: csscolorparser::Color = input.parse().ok()?;
        let [r, g, b, _] = parsed.to_rgba8();
        Some(Self::rgba(r, g, b, widen(parsed.a)))
    }

    /// Whether the color is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.alpha >= 1.0
    }

    /// Convert to HSL: hue in degrees `0.0..360.0`, saturation and lightness
    /// in `0.0..=1.0`.
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return (0.0, 0.0, l);
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

        (h * 60.0, s, l)
    }

    /// Build a color from HSL components (see [`Color::to_hsl`]).
    pub fn from_hsl(h: f64, s: f64, l: f64, alpha: f64) -> Self {
        let h = h.rem_euclid(360.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);

        if s == 0.0 {
            let v = channel(l);
            return Self::rgba(v, v, v, alpha);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let h = h / 360.0;

        Self::rgba(
            channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            channel(hue_to_rgb(p, q, h)),
            channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
            alpha,
        )
    }

    /// Increase lightness by `amount` (a fraction, `0.1` for 10%).
    pub fn lighten(self, amount: f64) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, l + amount, self.alpha)
    }

    /// Decrease lightness by `amount` (a fraction, `0.1` for 10%).
    pub fn darken(self, amount: f64) -> Self {
        self.lighten(-amount)
    }

    /// Mix with `other`. `weight` is the share of `self` in `0.0..=1.0`; both
    /// colors' alpha influence the channel weighting.
    pub fn mix(self, other: Color, weight: f64) -> Self {
        let p = weight.clamp(0.0, 1.0);
        let w = 2.0 * p - 1.0;
        let a = self.alpha - other.alpha;

        let w1 = if w * a == -1.0 {
            w
        } else {
            (w + a) / (1.0 + w * a)
        };
        let w1 = (w1 + 1.0) / 2.0;
        let w2 = 1.0 - w1;

        let blend = |x: u8, y: u8| (x as f64 * w1 + y as f64 * w2).round().clamp(0.0, 255.0) as u8;

        Self::rgba(
            blend(self.r, other.r),
            blend(self.g, other.g),
            blend(self.b, other.b),
            self.alpha * p + other.alpha * (1.0 - p),
        )
    }

    /// Lowercase `#rrggbb` form, ignoring alpha.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}
