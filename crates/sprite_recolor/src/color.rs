use core::fmt;

/// An opaque 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `#rgb`, the `#` being optional.
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        if !digits.is_ascii() {
            return None;
        }
        match digits.len() {
            6 => Some(Self::new(
                u8::from_str_radix(&digits[0..2], 16).ok()?,
                u8::from_str_radix(&digits[2..4], 16).ok()?,
                u8::from_str_radix(&digits[4..6], 16).ok()?,
            )),
            3 => {
                let nibble = |index: usize| {
                    u8::from_str_radix(&digits[index..=index], 16)
                        .ok()
                        .map(|value| value * 17)
                };
                Some(Self::new(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            _ => None,
        }
    }

    /// Like [`Rgb::parse_hex`], but anything malformed or missing is black.
    pub fn from_hex_or_black(hex: Option<&str>) -> Self {
        hex.and_then(Self::parse_hex).unwrap_or(Self::BLACK)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Euclidean distance in RGB space.
    pub fn distance(self, other: Self) -> f32 {
        let dr = f32::from(self.r) - f32::from(other.r);
        let dg = f32::from(self.g) - f32::from(other.g);
        let db = f32::from(self.b) - f32::from(other.b);
        (dr * dr + dg * dg + db * db).sqrt()
    }

    pub const fn max_channel(self) -> u8 {
        let rg = if self.r > self.g { self.r } else { self.g };
        if rg > self.b { rg } else { self.b }
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for bevy::color::Color {
    fn from(color: Rgb) -> Self {
        Self::srgb_u8(color.r, color.g, color.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
