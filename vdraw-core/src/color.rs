use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GeometryError;

/// 8 位 RGBA 颜色。文本形式为带透明通道的 `#AARRGGBB`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    /// 默认填充色，同时也是颜色解析失败时的回退值。
    pub const CORNFLOWER_BLUE: Rgba = Rgba::rgb(100, 149, 237);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// 输出 `#AARRGGBB`（大写十六进制）。
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }

    /// 解析 `#RGB`、`#ARGB`、`#RRGGBB`、`#AARRGGBB` 以及少量颜色名。
    pub fn parse(text: &str) -> Result<Self, GeometryError> {
        let trimmed = text.trim();
        let Some(digits) = trimmed.strip_prefix('#') else {
            return named_color(trimmed).ok_or_else(|| GeometryError::ColorParse(text.to_string()));
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(GeometryError::ColorParse(text.to_string()));
        }

        let nibble = |index: usize| -> u8 {
            let value = u8::from_str_radix(&digits[index..index + 1], 16).unwrap_or(0);
            value * 17
        };
        let byte = |index: usize| -> u8 { u8::from_str_radix(&digits[index..index + 2], 16).unwrap_or(0) };

        match digits.len() {
            3 => Ok(Self::rgb(nibble(0), nibble(1), nibble(2))),
            4 => Ok(Self::new(nibble(1), nibble(2), nibble(3), nibble(0))),
            6 => Ok(Self::rgb(byte(0), byte(2), byte(4))),
            8 => Ok(Self::new(byte(2), byte(4), byte(6), byte(0))),
            _ => Err(GeometryError::ColorParse(text.to_string())),
        }
    }

    /// 解析失败时返回 `fallback`，用于导入时的容错。
    #[inline]
    pub fn parse_or(text: &str, fallback: Rgba) -> Self {
        Self::parse(text).unwrap_or(fallback)
    }
}

fn named_color(name: &str) -> Option<Rgba> {
    const NAMED: [(&str, Rgba); 7] = [
        ("black", Rgba::BLACK),
        ("white", Rgba::WHITE),
        ("transparent", Rgba::TRANSPARENT),
        ("red", Rgba::rgb(255, 0, 0)),
        ("green", Rgba::rgb(0, 128, 0)),
        ("blue", Rgba::rgb(0, 0, 255)),
        ("cornflowerblue", Rgba::CORNFLOWER_BLUE),
    ];
    NAMED
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, color)| *color)
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgba {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
