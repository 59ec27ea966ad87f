use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque sRGB color. Serialized as a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb` or `#rgb` (leading `#` optional).
    pub fn parse_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self(r, g, b))
            }
            3 => {
                let mut channels = [0u8; 3];
                for (slot, c) in channels.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 16 + v;
                }
                Some(Self(channels[0], channels[1], channels[2]))
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Format as a CSS `rgba()` string.
    pub fn css(self, alpha: f64) -> String {
        let Rgb(r, g, b) = self;
        format!("rgba({r},{g},{b},{alpha})")
    }

    /// Brighten by a factor (1.0 = no change, >1.0 = brighter).
    pub fn brighten(self, factor: f64) -> Self {
        let scale = |c: u8| (c as f64 * factor).clamp(0.0, 255.0) as u8;
        Self(scale(self.0), scale(self.1), scale(self.2))
    }

    pub fn to_hsl(self) -> (f64, f64, f64) {
        rgb_to_hsl(self.0, self.1, self.2)
    }

    pub fn from_hsl(hsl: (f64, f64, f64)) -> Self {
        let (r, g, b) = hsl_to_rgb(hsl.0, hsl.1, hsl.2);
        Self(r, g, b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::parse_hex(&value).ok_or_else(|| format!("invalid hex color: {value:?}"))
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Deterministic fallback color for a region id: CRC32 picks the hue,
/// saturation and lightness stay fixed so every region reads on a dark map.
pub fn region_color(id: &str) -> Rgb {
    let hash = crc32fast::hash(id.as_bytes());
    let hue = (hash % 360) as f64;
    Rgb::from_hsl((hue, 0.85, 0.65))
}

/// Convert RGB to HSL. Returns (h: 0..360, s: 0..1, l: 0..1).
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if (max - r).abs() < f64::EPSILON {
        let mut h = (g - b) / d;
        if g < b {
            h += 6.0;
        }
        h
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h * 60.0, s, l)
}

/// Convert HSL to RGB.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s.abs() < f64::EPSILON {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    let h = h / 360.0;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    (
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Interpolate between two HSL colors using shortest hue path.
pub fn interpolate_hsl(from: (f64, f64, f64), to: (f64, f64, f64), t: f64) -> (f64, f64, f64) {
    // Achromatic endpoints have no meaningful hue; borrow the other side's.
    let from_h = if from.1 < f64::EPSILON { to.0 } else { from.0 };
    let to_h = if to.1 < f64::EPSILON { from_h } else { to.0 };

    let mut dh = to_h - from_h;
    if dh > 180.0 {
        dh -= 360.0;
    } else if dh < -180.0 {
        dh += 360.0;
    }

    let h = (from_h + dh * t).rem_euclid(360.0);
    let s = from.1 + (to.1 - from.1) * t;
    let l = from.2 + (to.2 - from.2) * t;

    (h, s, l)
}

#[cfg(test)]
mod tests {
    use super::{Rgb, hsl_to_rgb, interpolate_hsl, region_color, rgb_to_hsl};

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < 1e-9,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Rgb::parse_hex("#60a5fa"), Some(Rgb(0x60, 0xa5, 0xfa)));
        assert_eq!(Rgb::parse_hex("334155"), Some(Rgb(0x33, 0x41, 0x55)));
        assert_eq!(Rgb::parse_hex("#fff"), Some(Rgb(255, 255, 255)));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Rgb::parse_hex(""), None);
        assert_eq!(Rgb::parse_hex("#12345"), None);
        assert_eq!(Rgb::parse_hex("#gg0000"), None);
        assert_eq!(Rgb::parse_hex("#ÿÿ"), None);
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Rgb(0xfb, 0x92, 0x3c)).unwrap();
        assert_eq!(json, "\"#fb923c\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb(0xfb, 0x92, 0x3c));
        assert!(serde_json::from_str::<Rgb>("\"blue\"").is_err());
    }

    #[test]
    fn css_formats_rgba() {
        assert_eq!(Rgb(1, 2, 3).css(0.3), "rgba(1,2,3,0.3)");
    }

    #[test]
    fn brighten_saturates_at_white() {
        assert_eq!(Rgb(200, 100, 0).brighten(2.0), Rgb(255, 200, 0));
    }

    #[test]
    fn roundtrip_rgb_through_hsl_is_identity() {
        let samples = [
            (0, 0, 0),
            (255, 255, 255),
            (128, 128, 128),
            (255, 0, 0),
            (0, 255, 0),
            (0, 0, 255),
            (0x60, 0xa5, 0xfa),
            (0xf4, 0x72, 0xb6),
        ];

        for (r, g, b) in samples {
            let (h, s, l) = rgb_to_hsl(r, g, b);
            assert_eq!(hsl_to_rgb(h, s, l), (r, g, b));
        }
    }

    #[test]
    fn interpolate_hsl_wraps_shortest_path() {
        let from = (350.0, 0.6, 0.4);
        let to = (10.0, 0.8, 0.5);

        let mid = interpolate_hsl(from, to, 0.5);
        assert_close(mid.0, 0.0);
        assert_close(mid.1, 0.7);
        assert_close(mid.2, 0.45);
    }

    #[test]
    fn interpolate_hsl_from_gray_keeps_target_hue() {
        let gray = (0.0, 0.0, 0.5);
        let blue = (240.0, 1.0, 0.5);
        let mid = interpolate_hsl(gray, blue, 0.5);
        assert_close(mid.0, 240.0);
        assert_close(mid.1, 0.5);
    }

    #[test]
    fn region_color_is_deterministic() {
        assert_eq!(region_color("gyeonggi"), region_color("gyeonggi"));
        assert_ne!(region_color("gyeonggi"), region_color("jeju"));
    }
}
