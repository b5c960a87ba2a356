use serde::{Deserialize, Serialize};

/// Linear RGBA color with components in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// `0xRRGGBB` with full opacity.
    pub fn from_rgb_u32(rgb: u32) -> Self {
        Self::new(
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
            1.0,
        )
    }

    /// Parses `#RGB`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize, w: usize| -> Option<f32> {
            let v = u8::from_str_radix(hex.get(i..i + w)?, 16).ok()?;
            Some(if w == 1 { (v * 17) as f32 / 255.0 } else { v as f32 / 255.0 })
        };
        match hex.len() {
            3 => Some(Self::new(channel(0, 1)?, channel(1, 1)?, channel(2, 1)?, 1.0)),
            6 => Some(Self::new(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?, 1.0)),
            8 => Some(Self::new(
                channel(0, 2)?,
                channel(2, 2)?,
                channel(4, 2)?,
                channel(6, 2)?,
            )),
            _ => None,
        }
    }

    /// Parses a hex color or a CSS `rgba(r, g, b, a)` / `rgb(r, g, b)` string.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let Some(inner) = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        else {
            return Self::from_hex(s);
        };

        let parts: Vec<f32> = inner
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<Result<_, _>>()
            .ok()?;
        match parts.as_slice() {
            [r, g, b] => Some(Self::new(r / 255.0, g / 255.0, b / 255.0, 1.0)),
            [r, g, b, a] => Some(Self::new(r / 255.0, g / 255.0, b / 255.0, a.clamp(0.0, 1.0))),
            _ => None,
        }
    }

    /// Component-wise linear blend; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        Rgba::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgba::parse(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self {
        c.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::Rgba;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "expected {a} ~= {b}");
    }

    #[test]
    fn parses_hex_forms() {
        let c = Rgba::from_hex("#ffd24d").unwrap();
        assert_eq!(c.to_rgba8(), [0xff, 0xd2, 0x4d, 0xff]);
        assert_eq!(Rgba::from_hex("fff").unwrap(), Rgba::WHITE);
        assert_eq!(Rgba::from_hex("#00000080").unwrap().to_rgba8()[3], 0x80);
        assert!(Rgba::from_hex("#12345").is_none());
        assert!(Rgba::from_hex("#gggggg").is_none());
    }

    #[test]
    fn parses_css_rgba() {
        let c = Rgba::parse("rgba(132, 132, 132, 0.95)").unwrap();
        assert_close(c.r, 132.0 / 255.0);
        assert_close(c.a, 0.95);
        assert_eq!(Rgba::parse("#ffffff"), Some(Rgba::WHITE));
    }

    #[test]
    fn lerp_hits_endpoints() {
        let a = Rgba::from_hex("#D9BFD6").unwrap();
        let b = Rgba::from_hex("#3A0D3E").unwrap();
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, f32::NAN), a);
    }

    #[test]
    fn rgb_u32_matches_hex() {
        assert_eq!(
            Rgba::from_rgb_u32(0xbfc5cc).to_rgba8(),
            Rgba::from_hex("#bfc5cc").unwrap().to_rgba8()
        );
    }
}
