use kurbo::Rect;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{SnaptureError, SnaptureResult};

/// Base-unit measurements of the exported strip. Every value is multiplied by the export
/// scale before drawing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripGeometry {
    pub width: f64,
    pub height: f64,
    pub outer_margin: f64,
    pub photo_margin: f64,
    pub photo_spacing: f64,
    /// Vertical space kept free below the photos for the footer.
    pub footer_reserve: f64,
    pub footer_height: f64,
    /// Extra size of the white card drawn behind each photo, per side.
    pub card_border: f64,
    pub corner_radius: f64,
    pub footer_radius: f64,
    pub brand_font_size: f32,
    pub stamp_font_size: f32,
}

impl Default for StripGeometry {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 600.0,
            outer_margin: 10.0,
            photo_margin: 20.0,
            photo_spacing: 10.0,
            footer_reserve: 60.0,
            footer_height: 40.0,
            card_border: 2.0,
            corner_radius: 8.0,
            footer_radius: 6.0,
            brand_font_size: 16.0,
            stamp_font_size: 12.0,
        }
    }
}

/// Pixel layout of one strip at a concrete scale and photo count.
#[derive(Clone, Debug, PartialEq)]
pub struct StripLayout {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    /// Photo slots, top to bottom, snapped to whole pixels.
    pub slots: Vec<Rect>,
    pub footer: Rect,
    pub card_border: f64,
    pub corner_radius: f64,
    pub footer_radius: f64,
    /// Baselines of the brand and timestamp lines.
    pub brand_baseline: f64,
    pub stamp_baseline: f64,
    pub brand_font_size: f32,
    pub stamp_font_size: f32,
}

impl StripGeometry {
    pub fn validate(&self) -> SnaptureResult<()> {
        let values = [
            self.width,
            self.height,
            self.outer_margin,
            self.photo_margin,
            self.photo_spacing,
            self.footer_reserve,
            self.footer_height,
            self.card_border,
            self.corner_radius,
            self.footer_radius,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(SnaptureError::validation(
                "strip geometry values must be finite and >= 0",
            ));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(SnaptureError::validation("strip size must be > 0"));
        }
        if !(self.brand_font_size > 0.0 && self.stamp_font_size > 0.0) {
            return Err(SnaptureError::validation("footer font sizes must be > 0"));
        }
        if self.photo_width() <= 0.0 {
            return Err(SnaptureError::validation(
                "margins leave no horizontal room for photos",
            ));
        }
        if self.footer_height > self.footer_reserve + self.photo_margin {
            return Err(SnaptureError::validation(
                "footer band does not fit below the photos",
            ));
        }
        Ok(())
    }

    fn inner_width(&self) -> f64 {
        self.width - self.outer_margin * 2.0
    }

    fn photo_width(&self) -> f64 {
        self.inner_width() - self.photo_margin * 2.0
    }

    fn available_height(&self) -> f64 {
        self.height - self.outer_margin * 2.0 - self.photo_margin * 2.0 - self.footer_reserve
    }

    /// Lay out `photo_count` slots at `scale`.
    pub fn layout(&self, photo_count: usize, scale: f64) -> SnaptureResult<StripLayout> {
        self.validate()?;
        if photo_count == 0 {
            return Err(SnaptureError::validation("strip needs at least one photo"));
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(SnaptureError::validation(
                "export scale must be finite and > 0",
            ));
        }

        let n = photo_count as f64;
        let slot_h = (self.available_height() - self.photo_spacing * (n - 1.0)) / n;
        if slot_h < 1.0 {
            return Err(SnaptureError::validation(format!(
                "{photo_count} photos do not fit in a {}x{} strip",
                self.width, self.height
            )));
        }

        let s = scale;
        let x = (self.outer_margin + self.photo_margin) * s;
        let w = self.photo_width() * s;
        let slots: Vec<Rect> = (0..photo_count)
            .map(|i| {
                let y = (self.outer_margin
                    + self.photo_margin
                    + i as f64 * (slot_h + self.photo_spacing))
                    * s;
                snap(Rect::new(x, y, x + w, y + slot_h * s))
            })
            .collect();
        if slots.iter().any(|r| r.width() < 1.0 || r.height() < 1.0) {
            return Err(SnaptureError::validation(format!(
                "photo slots are under one pixel at scale {scale}"
            )));
        }

        let footer_y = (self.height - self.outer_margin - self.footer_height) * s;
        let footer = snap(Rect::new(
            self.outer_margin * s,
            footer_y,
            (self.outer_margin + self.inner_width()) * s,
            footer_y + self.footer_height * s,
        ));

        let width = (self.width * s).round();
        let height = (self.height * s).round();
        if width < 1.0 || height < 1.0 || footer.width() < 1.0 || footer.height() < 1.0 {
            return Err(SnaptureError::validation(format!(
                "scaled strip is under one pixel at scale {scale}"
            )));
        }
        if width > f64::from(u16::MAX) || height > f64::from(u16::MAX) {
            return Err(SnaptureError::validation(
                "scaled strip exceeds 65535 pixels per side",
            ));
        }

        Ok(StripLayout {
            width: width as u32,
            height: height as u32,
            scale: s,
            slots,
            footer,
            card_border: self.card_border * s,
            corner_radius: self.corner_radius * s,
            footer_radius: self.footer_radius * s,
            brand_baseline: footer_y + self.footer_height * s * 0.45,
            stamp_baseline: footer_y + self.footer_height * s * 0.8,
            brand_font_size: self.brand_font_size * s as f32,
            stamp_font_size: self.stamp_font_size * s as f32,
        })
    }
}

fn snap(r: Rect) -> Rect {
    Rect::new(r.x0.round(), r.y0.round(), r.x1.round(), r.y1.round())
}
