use crate::foundation::core::Rgba8;
use crate::foundation::error::{SnaptureError, SnaptureResult};
use serde::{Deserialize, Serialize};

/// A single gradient stop; `offset` is in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba8,
}

/// Background of the exported strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameColor {
    Solid(Rgba8),
    Gradient(Vec<GradientStop>),
}

impl Default for FrameColor {
    fn default() -> Self {
        Self::Solid(Rgba8::WHITE)
    }
}

impl FrameColor {
    /// Evenly spaced stops, the way CSS `linear-gradient(c1, c2, ...)` places them.
    pub fn even_gradient(colors: &[Rgba8]) -> SnaptureResult<Self> {
        if colors.len() < 2 {
            return Err(SnaptureError::validation(
                "gradient needs at least two color stops",
            ));
        }
        let last = (colors.len() - 1) as f32;
        Ok(Self::Gradient(
            colors
                .iter()
                .enumerate()
                .map(|(i, &color)| GradientStop {
                    offset: i as f32 / last,
                    color,
                })
                .collect(),
        ))
    }

    /// Parse a palette name, a hex color or a `linear-gradient(...)` descriptor.
    pub fn parse(s: &str) -> SnaptureResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SnaptureError::validation("frame color must be non-empty"));
        }
        if let Some(desc) = FrameColorDescriptor::by_name(s) {
            return desc.value();
        }
        if s.starts_with('#') {
            return parse_hex(s).map(Self::Solid);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(body) = lower
            .strip_prefix("linear-gradient(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let mut colors = Vec::new();
            for part in body.split(',') {
                let part = part.trim();
                // The angle is implied by the strip diagonal.
                if part.ends_with("deg") || part.starts_with("to ") {
                    continue;
                }
                colors.push(parse_hex(part)?);
            }
            return Self::even_gradient(&colors);
        }
        Err(SnaptureError::validation(format!(
            "unrecognized frame color '{s}'"
        )))
    }

    /// Sample the color at `t` in `[0, 1]`.
    pub fn sample(&self, t: f32) -> Rgba8 {
        match self {
            Self::Solid(c) => *c,
            Self::Gradient(stops) => sample_stops(stops, t),
        }
    }

    pub fn is_gradient(&self) -> bool {
        matches!(self, Self::Gradient(_))
    }
}

fn sample_stops(stops: &[GradientStop], t: f32) -> Rgba8 {
    let Some(first) = stops.first() else {
        return Rgba8::rgba(0, 0, 0, 0);
    };
    let t = t.clamp(0.0, 1.0);
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            if span <= f32::EPSILON {
                return b.color;
            }
            return a.color.lerp(b.color, (t - a.offset) / span);
        }
    }
    stops[stops.len() - 1].color
}

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_hex(s: &str) -> SnaptureResult<Rgba8> {
    let hex = s
        .trim()
        .strip_prefix('#')
        .ok_or_else(|| SnaptureError::validation(format!("color '{s}' must start with '#'")))?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SnaptureError::validation(format!(
            "color '{s}' has non-hex digits"
        )));
    }
    let byte = |i: usize| -> SnaptureResult<u8> {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| SnaptureError::validation(format!("invalid hex color '{s}'")))
    };
    let nibble = |i: usize| -> SnaptureResult<u8> {
        let v = u8::from_str_radix(&hex[i..i + 1], 16)
            .map_err(|_| SnaptureError::validation(format!("invalid hex color '{s}'")))?;
        Ok(v * 17)
    };
    match hex.len() {
        3 => Ok(Rgba8::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        6 => Ok(Rgba8::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Ok(Rgba8::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => Err(SnaptureError::validation(format!(
            "hex color '{s}' must have 3, 6 or 8 digits"
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameCategory {
    Basic,
    Metallic,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaletteValue {
    Solid(u32),
    Gradient(&'static [u32]),
}

/// Named entry in the frame palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameColorDescriptor {
    pub name: &'static str,
    pub category: FrameCategory,
    value: PaletteValue,
}

const fn solid(name: &'static str, rgb: u32) -> FrameColorDescriptor {
    FrameColorDescriptor {
        name,
        category: FrameCategory::Basic,
        value: PaletteValue::Solid(rgb),
    }
}

const fn gradient(
    name: &'static str,
    category: FrameCategory,
    stops: &'static [u32],
) -> FrameColorDescriptor {
    FrameColorDescriptor {
        name,
        category,
        value: PaletteValue::Gradient(stops),
    }
}

pub const FRAME_COLORS: &[FrameColorDescriptor] = &[
    solid("White", 0xFFFFFF),
    solid("Black", 0x000000),
    solid("Pink", 0xFF69B4),
    solid("Light Blue", 0x87CEEB),
    solid("Yellow", 0xFFFF00),
    solid("Light Green", 0x90EE90),
    solid("Purple", 0x9370DB),
    solid("Orange", 0xFFA500),
    solid("Red", 0xFF0000),
    solid("Navy", 0x000080),
    gradient("Gold", FrameCategory::Metallic, &[0xFFD700, 0xFFA500]),
    gradient("Silver", FrameCategory::Metallic, &[0xC0C0C0, 0x808080]),
    gradient("Rose Gold", FrameCategory::Metallic, &[0xE8B4CB, 0xD4AF37]),
    gradient("Bronze", FrameCategory::Metallic, &[0xCD7F32, 0x8B4513]),
    gradient(
        "Rainbow",
        FrameCategory::Special,
        &[
            0xFF0000, 0xFF8000, 0xFFFF00, 0x80FF00, 0x00FF00, 0x00FF80, 0x00FFFF, 0x0080FF,
            0x0000FF, 0x8000FF, 0xFF00FF, 0xFF0080,
        ],
    ),
    gradient(
        "Sunset",
        FrameCategory::Special,
        &[0xFF6B6B, 0xFF8E53, 0xFF6B9D],
    ),
    gradient("Ocean", FrameCategory::Special, &[0x00C9FF, 0x92FE9D]),
    gradient("Forest", FrameCategory::Special, &[0x134E5E, 0x71B280]),
];

impl FrameColorDescriptor {
    /// Case-insensitive lookup; `-` and `_` match spaces (`rose-gold`).
    pub fn by_name(name: &str) -> Option<&'static Self> {
        let wanted = name.trim().replace(['-', '_'], " ");
        FRAME_COLORS
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(&wanted))
    }

    pub fn in_category(category: FrameCategory) -> impl Iterator<Item = &'static Self> {
        FRAME_COLORS.iter().filter(move |d| d.category == category)
    }

    pub fn value(&self) -> SnaptureResult<FrameColor> {
        match self.value {
            PaletteValue::Solid(rgb) => Ok(FrameColor::Solid(Rgba8::hex(rgb))),
            PaletteValue::Gradient(stops) => {
                let colors: Vec<Rgba8> = stops.iter().map(|&c| Rgba8::hex(c)).collect();
                FrameColor::even_gradient(&colors)
            }
        }
    }

    /// CSS form used by the live preview.
    pub fn css(&self) -> String {
        match self.value {
            PaletteValue::Solid(rgb) => Rgba8::hex(rgb).to_hex_string(),
            PaletteValue::Gradient(stops) => {
                let parts: Vec<String> = stops
                    .iter()
                    .map(|&c| Rgba8::hex(c).to_hex_string())
                    .collect();
                format!("linear-gradient(45deg, {})", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_forms() {
        assert_eq!(parse_hex("#000000").unwrap(), Rgba8::BLACK);
        assert_eq!(parse_hex("#fff").unwrap(), Rgba8::WHITE);
        assert_eq!(
            parse_hex("#11223380").unwrap(),
            Rgba8::rgba(0x11, 0x22, 0x33, 0x80)
        );
        assert!(parse_hex("000000").is_err());
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#zzzzzz").is_err());
    }

    #[test]
    fn palette_has_expected_categories() {
        assert_eq!(FRAME_COLORS.len(), 18);
        assert_eq!(
            FrameColorDescriptor::in_category(FrameCategory::Basic).count(),
            10
        );
        assert_eq!(
            FrameColorDescriptor::in_category(FrameCategory::Metallic).count(),
            4
        );
        assert_eq!(
            FrameColorDescriptor::in_category(FrameCategory::Special).count(),
            4
        );
    }

    #[test]
    fn parse_by_name_and_css_agree() {
        let gold = FrameColor::parse("gold").unwrap();
        let desc = FrameColorDescriptor::by_name("Gold").unwrap();
        assert_eq!(FrameColor::parse(&desc.css()).unwrap(), gold);
        assert_eq!(
            FrameColor::parse("rose-gold").unwrap(),
            FrameColorDescriptor::by_name("Rose Gold")
                .unwrap()
                .value()
                .unwrap()
        );
        assert_eq!(
            FrameColor::parse("#000000").unwrap(),
            FrameColor::Solid(Rgba8::BLACK)
        );
    }

    #[test]
    fn gradient_offsets_are_even() {
        let FrameColor::Gradient(stops) = FrameColor::parse("Sunset").unwrap() else {
            panic!("sunset must be a gradient");
        };
        let offsets: Vec<f32> = stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn sample_interpolates_between_stops() {
        let g = FrameColor::even_gradient(&[Rgba8::BLACK, Rgba8::WHITE]).unwrap();
        assert_eq!(g.sample(0.0), Rgba8::BLACK);
        assert_eq!(g.sample(1.0), Rgba8::WHITE);
        assert_eq!(g.sample(2.0), Rgba8::WHITE);
        assert_eq!(g.sample(0.5), Rgba8::rgb(128, 128, 128));
        assert_eq!(FrameColor::Solid(Rgba8::BLACK).sample(0.7), Rgba8::BLACK);
    }

    #[test]
    fn rejects_garbage() {
        assert!(FrameColor::parse("").is_err());
        assert!(FrameColor::parse("chartreuse-ish").is_err());
        assert!(FrameColor::parse("linear-gradient(45deg, #fff)").is_err());
    }
}
