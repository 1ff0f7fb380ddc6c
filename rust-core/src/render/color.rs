use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RGBA colour with 8-bit channels and a float alpha in `[0, 1]`.
///
/// Serialized as a CSS string (`#rrggbb` or `rgba(r,g,b,a)`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb` or `rgba(r, g, b, a)`.
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if !hex.is_ascii() {
                anyhow::bail!("Invalid hex colour: {}", s);
            }
            let channel = |range: std::ops::Range<usize>| -> anyhow::Result<u8> {
                Ok(u8::from_str_radix(&hex[range], 16)?)
            };
            return match hex.len() {
                6 => Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
                3 => {
                    let short = |i: usize| -> anyhow::Result<u8> {
                        let v = u8::from_str_radix(&hex[i..i + 1], 16)?;
                        Ok(v * 17)
                    };
                    Ok(Color::rgb(short(0)?, short(1)?, short(2)?))
                }
                _ => Err(anyhow::anyhow!("Invalid hex colour: {}", s)),
            };
        }

        if let Some(body) = s.strip_prefix("rgba(").and_then(|rest| rest.strip_suffix(')')) {
            let parts: Vec<&str> = body.split(',').map(str::trim).collect();
            if parts.len() != 4 {
                anyhow::bail!("rgba() needs 4 components: {}", s);
            }
            let a: f64 = parts[3].parse()?;
            if !(0.0..=1.0).contains(&a) {
                anyhow::bail!("Alpha out of range in {}", s);
            }
            return Ok(Color::rgba(parts[0].parse()?, parts[1].parse()?, parts[2].parse()?, a));
        }

        Err(anyhow::anyhow!("Unsupported colour format: {}", s))
    }

    /// Channel-wise linear interpolation.
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        let mix = |a: u8, b: u8| -> u8 {
            (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
        };
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn to_css(&self) -> String {
        if (self.a - 1.0).abs() < f64::EPSILON {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_css()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!(Color::parse("#ff7f0e").unwrap(), Color::rgb(0xff, 0x7f, 0x0e));
        assert_eq!(Color::parse("#222").unwrap(), Color::rgb(0x22, 0x22, 0x22));
        assert_eq!(
            Color::parse("rgba(0, 0, 0, 0.06)").unwrap(),
            Color::rgba(0, 0, 0, 0.06)
        );
        assert!(Color::parse("tomato").is_err());
        assert!(Color::parse("#12345").is_err());
    }

    #[test]
    fn test_css_round_trip() {
        for css in ["#17becf", "rgba(0,0,0,0.15)"] {
            assert_eq!(Color::parse(css).unwrap().to_css(), css);
        }
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let a = Color::rgb(0, 100, 200);
        let b = Color::rgba(200, 100, 0, 0.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        let mid = a.lerp(&b, 0.5);
        assert_eq!((mid.r, mid.g, mid.b), (100, 100, 100));
        assert!((mid.a - 0.5).abs() < 1e-12);
    }
}
