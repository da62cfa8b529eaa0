//! Photo filters.
//!
//! Every filter is a fixed list of [`Adjustment`]s with the semantics of the CSS filter
//! functions of the same name. The same table feeds the live preview (as a CSS string or a
//! downscaled raster) and the exported strip, so both show identical parameters.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::effects::blur::blur_rgba8_premul;
use crate::foundation::core::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};
use crate::foundation::error::{SnaptureError, SnaptureResult};

/// One image adjustment step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Adjustment {
    /// Amount in `[0, 1]`.
    Grayscale(f32),
    /// Amount in `[0, 1]`.
    Sepia(f32),
    /// Multiplier; `1.0` is identity.
    Saturate(f32),
    /// Degrees.
    HueRotate(f32),
    /// Multiplier; `1.0` is identity.
    Brightness(f32),
    /// Multiplier around mid-grey; `1.0` is identity.
    Contrast(f32),
    /// Gaussian standard deviation in base (unscaled) pixels.
    Blur(f32),
}

/// Row-major 3x3 color matrix plus offset column.
type ColorMatrix = [[f32; 4]; 3];

impl Adjustment {
    fn css(&self) -> String {
        match *self {
            Self::Grayscale(v) => format!("grayscale({v})"),
            Self::Sepia(v) => format!("sepia({v})"),
            Self::Saturate(v) => format!("saturate({v})"),
            Self::HueRotate(v) => format!("hue-rotate({v}deg)"),
            Self::Brightness(v) => format!("brightness({v})"),
            Self::Contrast(v) => format!("contrast({v})"),
            Self::Blur(v) => format!("blur({v}px)"),
        }
    }

    fn matrix(&self) -> Option<ColorMatrix> {
        let m = match *self {
            Self::Grayscale(amount) => {
                let a = 1.0 - amount.clamp(0.0, 1.0);
                [
                    [0.2126 + 0.7874 * a, 0.7152 - 0.7152 * a, 0.0722 - 0.0722 * a, 0.0],
                    [0.2126 - 0.2126 * a, 0.7152 + 0.2848 * a, 0.0722 - 0.0722 * a, 0.0],
                    [0.2126 - 0.2126 * a, 0.7152 - 0.7152 * a, 0.0722 + 0.9278 * a, 0.0],
                ]
            }
            Self::Sepia(amount) => {
                let a = 1.0 - amount.clamp(0.0, 1.0);
                [
                    [0.393 + 0.607 * a, 0.769 - 0.769 * a, 0.189 - 0.189 * a, 0.0],
                    [0.349 - 0.349 * a, 0.686 + 0.314 * a, 0.168 - 0.168 * a, 0.0],
                    [0.272 - 0.272 * a, 0.534 - 0.534 * a, 0.131 + 0.869 * a, 0.0],
                ]
            }
            Self::Saturate(s) => {
                let s = s.max(0.0);
                [
                    [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s, 0.0],
                    [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s, 0.0],
                    [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s, 0.0],
                ]
            }
            Self::HueRotate(deg) => {
                let (sin, cos) = deg.to_radians().sin_cos();
                [
                    [
                        0.213 + cos * 0.787 - sin * 0.213,
                        0.715 - cos * 0.715 - sin * 0.715,
                        0.072 - cos * 0.072 + sin * 0.928,
                        0.0,
                    ],
                    [
                        0.213 - cos * 0.213 + sin * 0.143,
                        0.715 + cos * 0.285 + sin * 0.140,
                        0.072 - cos * 0.072 - sin * 0.283,
                        0.0,
                    ],
                    [
                        0.213 - cos * 0.213 - sin * 0.787,
                        0.715 - cos * 0.715 + sin * 0.715,
                        0.072 + cos * 0.928 + sin * 0.072,
                        0.0,
                    ],
                ]
            }
            Self::Brightness(b) => {
                let b = b.max(0.0);
                [[b, 0.0, 0.0, 0.0], [0.0, b, 0.0, 0.0], [0.0, 0.0, b, 0.0]]
            }
            Self::Contrast(c) => {
                let c = c.max(0.0);
                let o = 0.5 - 0.5 * c;
                [[c, 0.0, 0.0, o], [0.0, c, 0.0, o], [0.0, 0.0, c, o]]
            }
            Self::Blur(_) => return None,
        };
        Some(m)
    }
}

macro_rules! filters {
    ($( $variant:ident => $id:literal, $name:literal, [$($adj:expr),* $(,)?] );+ $(;)?) => {
        /// Closed set of filters offered by the booth.
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum FilterId {
            #[default]
            $( $variant ),+
        }

        /// Static filter table, in display order.
        pub const FILTERS: &[FilterDescriptor] = &[
            $( FilterDescriptor {
                id: FilterId::$variant,
                key: $id,
                display_name: $name,
                effect: &[$($adj),*],
            } ),+
        ];
    };
}

use Adjustment::*;

filters! {
    None => "none", "Original", [];
    Vintage => "vintage", "Vintage", [Sepia(0.8), Contrast(1.2), Brightness(1.1)];
    Bw => "bw", "B&W", [Grayscale(1.0)];
    Sepia => "sepia", "Sepia", [Adjustment::Sepia(1.0)];
    Vibrant => "vibrant", "Vibrant", [Contrast(1.4), Saturate(1.8)];
    Cool => "cool", "Cool", [HueRotate(180.0), Saturate(1.2)];
    Warm => "warm", "Warm", [HueRotate(30.0), Saturate(1.3), Brightness(1.1)];
    Crosshatch => "crosshatch", "Crosshatch", [Contrast(1.3), Brightness(0.9)];
    Noir => "noir", "Noir", [Grayscale(1.0), Contrast(1.5), Brightness(0.8)];
    Retro => "retro", "Retro", [Adjustment::Sepia(0.5), Saturate(1.5), HueRotate(20.0)];
    Dreamy => "dreamy", "Dreamy", [Blur(0.5), Brightness(1.2), Saturate(0.8)];
    Neon => "neon", "Neon", [Saturate(2.0), Contrast(1.3), HueRotate(90.0)];
    Sunset => "sunset", "Sunset", [Adjustment::Sepia(0.3), Saturate(1.4), HueRotate(350.0)];
    Arctic => "arctic", "Arctic", [Saturate(0.8), Brightness(1.1), HueRotate(200.0)];
    Dramatic => "dramatic", "Dramatic", [Contrast(1.8), Saturate(0.9), Brightness(0.9)];
}

/// Table entry for a filter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterDescriptor {
    pub id: FilterId,
    pub key: &'static str,
    pub display_name: &'static str,
    pub effect: &'static [Adjustment],
}

impl FilterId {
    pub fn descriptor(self) -> &'static FilterDescriptor {
        // Table order follows declaration order.
        &FILTERS[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.descriptor().key
    }

    pub fn effect(self) -> &'static [Adjustment] {
        self.descriptor().effect
    }

    /// CSS `filter` value for display-only previews.
    pub fn css(self) -> String {
        let effect = self.effect();
        if effect.is_empty() {
            return "none".to_string();
        }
        effect
            .iter()
            .map(Adjustment::css)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::str::FromStr for FilterId {
    type Err = SnaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FILTERS
            .iter()
            .find(|d| d.key.eq_ignore_ascii_case(wanted) || d.display_name == wanted)
            .map(|d| d.id)
            .ok_or_else(|| SnaptureError::validation(format!("unknown filter '{wanted}'")))
    }
}

impl std::fmt::Display for FilterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Bake `filter` into `image`. `scale` multiplies spatial parameters (blur radius) so that
/// high-resolution exports look like the base-size preview.
pub fn apply_filter(
    image: &mut image::RgbaImage,
    filter: FilterId,
    scale: f32,
) -> SnaptureResult<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(SnaptureError::validation(
            "filter scale must be finite and > 0",
        ));
    }
    let mut pending: Vec<ColorMatrix> = Vec::new();
    for adj in filter.effect() {
        match adj.matrix() {
            Some(m) => pending.push(m),
            None => {
                apply_matrices(image, &pending);
                pending.clear();
                if let Adjustment::Blur(sigma) = *adj {
                    apply_blur(image, sigma * scale)?;
                }
            }
        }
    }
    apply_matrices(image, &pending);
    Ok(())
}

/// Downscaled preview with the same adjustments as the export path.
pub fn preview(
    image: &image::RgbaImage,
    filter: FilterId,
    max_edge: u32,
) -> SnaptureResult<image::RgbaImage> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 || max_edge == 0 {
        return Err(SnaptureError::validation("preview needs a non-empty image"));
    }
    let ratio = (max_edge as f32 / w.max(h) as f32).min(1.0);
    let mut out = if ratio < 1.0 {
        let pw = ((w as f32 * ratio).round() as u32).max(1);
        let ph = ((h as f32 * ratio).round() as u32).max(1);
        image::imageops::resize(image, pw, ph, image::imageops::FilterType::Triangle)
    } else {
        image.clone()
    };
    apply_filter(&mut out, filter, ratio)?;
    Ok(out)
}

fn apply_matrices(image: &mut image::RgbaImage, matrices: &[ColorMatrix]) {
    if matrices.is_empty() {
        return;
    }
    let buf: &mut [u8] = image;
    buf.par_chunks_mut(4).for_each(|px| {
        let mut rgb = [
            f32::from(px[0]) / 255.0,
            f32::from(px[1]) / 255.0,
            f32::from(px[2]) / 255.0,
        ];
        for m in matrices {
            let mut next = [0.0f32; 3];
            for (row, out) in m.iter().zip(next.iter_mut()) {
                let v = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2] + row[3];
                *out = v.clamp(0.0, 1.0);
            }
            rgb = next;
        }
        for (c, v) in px.iter_mut().zip(rgb) {
            *c = (v * 255.0).round() as u8;
        }
    });
}

fn apply_blur(image: &mut image::RgbaImage, sigma: f32) -> SnaptureResult<()> {
    let (w, h) = image.dimensions();
    let buf: &mut [u8] = image;
    premultiply_rgba8_in_place(buf);
    let mut blurred = blur_rgba8_premul(buf, w, h, sigma)?;
    unpremultiply_rgba8_in_place(&mut blurred);
    buf.copy_from_slice(&blurred);
    Ok(())
}
