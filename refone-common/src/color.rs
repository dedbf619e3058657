use log::*;
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// A team kit colour, stored as 8-bit RGB.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct KitColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl KitColor {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Reads the leading hex digits of `hex` and keeps the low 24 bits. Anything that isn't a
    /// hex number becomes black.
    pub fn from_hex_lossy(hex: &str) -> Self {
        let digits: String = strip_hex_prefix(hex)
            .chars()
            .take_while(char::is_ascii_hexdigit)
            .take(16)
            .collect();

        let rgb = u64::from_str_radix(&digits, 16).unwrap_or_else(|_| {
            warn!("Invalid kit colour {hex:?}, using black");
            0
        });

        Self::from_u32((rgb & 0xFF_FFFF) as u32)
    }

    fn from_u32(rgb: u32) -> Self {
        Self {
            r: ((rgb & 0xFF_0000) >> 16) as u8,
            g: ((rgb & 0x00_FF00) >> 8) as u8,
            b: (rgb & 0x00_00FF) as u8,
        }
    }
}

fn strip_hex_prefix(hex: &str) -> &str {
    let trimmed = hex.trim();
    trimmed.strip_prefix('#').unwrap_or(trimmed)
}

impl core::fmt::Display for KitColor {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl core::str::FromStr for KitColor {
    type Err = InvalidKitColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = strip_hex_prefix(s);
        if digits.len() != 6 {
            return Err(InvalidKitColor(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_u32)
            .map_err(|_| InvalidKitColor(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a `#RRGGBB` colour")]
pub struct InvalidKitColor(pub String);
