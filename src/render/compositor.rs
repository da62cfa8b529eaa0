//! Offscreen strip compositing.
//!
//! The compositor is stateless between calls: every [`StripCompositor::composite`] decodes
//! its inputs, rasterizes into a fresh `vello_cpu` context and returns the finished strip.

use std::sync::Arc;

use image::ImageEncoder as _;
use kurbo::{Rect, RoundedRect};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assets::color::FrameColor;
use crate::assets::decode::decode_all;
use crate::assets::photo::Photo;
use crate::effects::filter::{FilterId, apply_filter};
use crate::foundation::clock::{Clock, format_timestamp};
use crate::foundation::core::{Rgba8, premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};
use crate::foundation::error::{SnaptureError, SnaptureResult};
use crate::render::geometry::{StripGeometry, StripLayout};
use crate::render::text::{FooterFont, TextLayoutEngine, fill_centered};

const CARD_COLOR: Rgba8 = Rgba8::WHITE;
const FOOTER_TOP: Rgba8 = Rgba8::hex(0x8B5CF6);
const FOOTER_BOTTOM: Rgba8 = Rgba8::hex(0xEC4899);
const FOOTER_TEXT: Rgba8 = Rgba8::WHITE;

/// How a photo fills its slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoFit {
    /// Center-crop to the slot aspect ratio.
    #[default]
    Cover,
    /// Scale non-uniformly to the slot.
    Stretch,
}

/// Finished strip, straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Strip {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

impl Strip {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.rgba8.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn encode_png(&self) -> SnaptureResult<Vec<u8>> {
        let mut buf = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buf)
            .write_image(
                &self.rgba8,
                self.width,
                self.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| SnaptureError::export(format!("encode strip png: {e}")))?;
        Ok(buf)
    }
}

/// Renders photo strips at a fixed geometry and export scale.
#[derive(Clone, Debug)]
pub struct StripCompositor {
    geometry: StripGeometry,
    scale: f64,
    fit: PhotoFit,
    brand: String,
    timestamp_format: String,
    font: Option<FooterFont>,
}

impl Default for StripCompositor {
    fn default() -> Self {
        Self::new(StripGeometry::default(), 1.0)
    }
}

impl StripCompositor {
    pub fn new(geometry: StripGeometry, scale: f64) -> Self {
        Self {
            geometry,
            scale,
            fit: PhotoFit::default(),
            brand: crate::config::DEFAULT_BRAND.to_string(),
            timestamp_format: crate::config::DEFAULT_TIMESTAMP_FORMAT.to_string(),
            font: FooterFont::bundled(),
        }
    }

    pub fn with_fit(mut self, fit: PhotoFit) -> Self {
        self.fit = fit;
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_timestamp_format(mut self, fmt: impl Into<String>) -> Self {
        self.timestamp_format = fmt.into();
        self
    }

    /// Replace the footer font. `None` draws the footer band without text.
    pub fn with_font(mut self, font: Option<FooterFont>) -> Self {
        self.font = font;
        self
    }

    pub fn geometry(&self) -> &StripGeometry {
        &self.geometry
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn font(&self) -> Option<&FooterFont> {
        self.font.as_ref()
    }

    /// Composite `photos` top to bottom into one strip.
    ///
    /// Fails without drawing anything if any photo does not decode.
    #[tracing::instrument(skip_all, fields(photos = photos.len(), filter = %filter))]
    pub fn composite(
        &self,
        photos: &[Photo],
        filter: FilterId,
        frame: &FrameColor,
        clock: &dyn Clock,
    ) -> SnaptureResult<Strip> {
        let layout = self.geometry.layout(photos.len(), self.scale)?;
        let decoded = decode_all(photos)?;

        let scale = self.scale as f32;
        let fit = self.fit;
        let prepared: Vec<SlotImage> = decoded
            .par_iter()
            .zip(layout.slots.par_iter())
            .map(|(img, slot)| prepare_slot(img, slot, fit, filter, scale))
            .collect::<SnaptureResult<_>>()?;

        let w: u16 = layout
            .width
            .try_into()
            .map_err(|_| SnaptureError::render("strip width exceeds u16"))?;
        let h: u16 = layout
            .height
            .try_into()
            .map_err(|_| SnaptureError::render("strip height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        fill_background(&mut ctx, frame, layout.width, layout.height)?;
        for (slot, image) in layout.slots.iter().zip(&prepared) {
            draw_photo(&mut ctx, &layout, slot, image);
        }
        draw_footer(&mut ctx, &layout)?;
        self.draw_footer_text(&mut ctx, &layout, clock)?;

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        let mut rgba8 = pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut rgba8);
        tracing::debug!(width = layout.width, height = layout.height, "strip composited");
        Ok(Strip {
            width: layout.width,
            height: layout.height,
            rgba8,
        })
    }

    fn draw_footer_text(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &StripLayout,
        clock: &dyn Clock,
    ) -> SnaptureResult<()> {
        let stamp = format_timestamp(&clock.now(), &self.timestamp_format)?;
        let Some(font) = &self.font else {
            tracing::warn!("no footer font; footer band drawn without text");
            return Ok(());
        };

        let mut engine = TextLayoutEngine::new(font)?;
        let center_x = f64::from(layout.width) / 2.0;
        let brand = engine.layout_line(&self.brand, layout.brand_font_size, FOOTER_TEXT)?;
        fill_centered(ctx, &brand, font, center_x, layout.brand_baseline);
        let stamp = engine.layout_line(&stamp, layout.stamp_font_size, FOOTER_TEXT)?;
        fill_centered(ctx, &stamp, font, center_x, layout.stamp_baseline);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

struct SlotImage {
    paint: vello_cpu::Image,
    width: u32,
    height: u32,
}

fn prepare_slot(
    img: &image::RgbaImage,
    slot: &Rect,
    fit: PhotoFit,
    filter: FilterId,
    scale: f32,
) -> SnaptureResult<SlotImage> {
    let w = (slot.width().round() as u32).max(1);
    let h = (slot.height().round() as u32).max(1);
    let mut fitted = fit_to_slot(img, w, h, fit);
    apply_filter(&mut fitted, filter, scale)?;

    let mut bytes = fitted.into_raw();
    premultiply_rgba8_in_place(&mut bytes);
    let pixmap = pixmap_from_premul(&bytes, w, h)?;
    Ok(SlotImage {
        paint: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        width: w,
        height: h,
    })
}

fn fit_to_slot(img: &image::RgbaImage, w: u32, h: u32, fit: PhotoFit) -> image::RgbaImage {
    use image::imageops::{FilterType, crop_imm, resize};

    let (iw, ih) = img.dimensions();
    let source = match fit {
        PhotoFit::Stretch => None,
        PhotoFit::Cover => {
            let s = (f64::from(w) / f64::from(iw)).max(f64::from(h) / f64::from(ih));
            let cw = ((f64::from(w) / s).round() as u32).clamp(1, iw);
            let ch = ((f64::from(h) / s).round() as u32).clamp(1, ih);
            Some(crop_imm(img, (iw - cw) / 2, (ih - ch) / 2, cw, ch).to_image())
        }
    };
    let source = source.as_ref().unwrap_or(img);
    if source.dimensions() == (w, h) {
        return source.clone();
    }
    resize(source, w, h, FilterType::Triangle)
}

fn fill_background(
    ctx: &mut vello_cpu::RenderContext,
    frame: &FrameColor,
    width: u32,
    height: u32,
) -> SnaptureResult<()> {
    let full = vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(width), f64::from(height));
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    match frame {
        FrameColor::Solid(c) => {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
        }
        FrameColor::Gradient(_) => {
            ctx.set_paint(diagonal_gradient(frame, width, height)?);
        }
    }
    ctx.fill_rect(&full);
    Ok(())
}

fn draw_photo(
    ctx: &mut vello_cpu::RenderContext,
    layout: &StripLayout,
    slot: &Rect,
    image: &SlotImage,
) {
    let b = layout.card_border;
    let card = RoundedRect::from_rect(slot.inflate(b, b), layout.corner_radius + b);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        CARD_COLOR.r,
        CARD_COLOR.g,
        CARD_COLOR.b,
        CARD_COLOR.a,
    ));
    ctx.fill_path(&shape_to_cpu(&card));

    let clip = RoundedRect::new(
        0.0,
        0.0,
        f64::from(image.width),
        f64::from(image.height),
        layout.corner_radius,
    );
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((slot.x0, slot.y0)));
    ctx.set_paint(image.paint.clone());
    ctx.fill_path(&shape_to_cpu(&clip));
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
}

fn draw_footer(ctx: &mut vello_cpu::RenderContext, layout: &StripLayout) -> SnaptureResult<()> {
    let footer = layout.footer;
    let fw = (footer.width().round() as u32).max(1);
    let fh = (footer.height().round() as u32).max(1);
    let band = RoundedRect::new(0.0, 0.0, f64::from(fw), f64::from(fh), layout.footer_radius);

    ctx.set_transform(vello_cpu::kurbo::Affine::translate((footer.x0, footer.y0)));
    ctx.set_paint(vertical_gradient(FOOTER_TOP, FOOTER_BOTTOM, fw, fh)?);
    ctx.fill_path(&shape_to_cpu(&band));
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    Ok(())
}

/// Rasterized linear gradient from the top-left to the bottom-right corner.
fn diagonal_gradient(frame: &FrameColor, w: u32, h: u32) -> SnaptureResult<vello_cpu::Image> {
    let (wf, hf) = (f64::from(w), f64::from(h));
    let len2 = wf * wf + hf * hf;
    let row_len = w as usize * 4;
    let mut bytes = vec![0u8; row_len * h as usize];
    bytes.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| {
        let py = y as f64 + 0.5;
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let px_x = x as f64 + 0.5;
            let t = ((px_x * wf + py * hf) / len2) as f32;
            let c = frame.sample(t);
            px.copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    });
    premultiply_rgba8_in_place(&mut bytes);
    image_paint(&bytes, w, h)
}

fn vertical_gradient(
    top: Rgba8,
    bottom: Rgba8,
    w: u32,
    h: u32,
) -> SnaptureResult<vello_cpu::Image> {
    let mut bytes = vec![0u8; (w as usize) * (h as usize) * 4];
    let h1 = (h.max(1) - 1) as f32;
    for (y, row) in bytes.chunks_exact_mut(w as usize * 4).enumerate() {
        let t = if h1 <= 0.0 { 0.0 } else { y as f32 / h1 };
        let c = top.lerp(bottom, t);
        for px in row.chunks_exact_mut(4) {
            px.copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }
    premultiply_rgba8_in_place(&mut bytes);
    image_paint(&bytes, w, h)
}

fn image_paint(premul: &[u8], w: u32, h: u32) -> SnaptureResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul(premul, w, h)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_from_premul(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> SnaptureResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SnaptureError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SnaptureError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(SnaptureError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn shape_to_cpu(shape: &impl kurbo::Shape) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in shape.path_elements(0.1) {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_crops_to_slot_aspect() {
        let mut img = image::RgbaImage::from_pixel(40, 10, image::Rgba([0, 0, 0, 255]));
        // Mark the center column band so the crop keeps it.
        for y in 0..10 {
            for x in 15..25 {
                img.put_pixel(x, y, image::Rgba([255, 255, 255, 255]));
            }
        }
        let out = fit_to_slot(&img, 10, 10, PhotoFit::Cover);
        assert_eq!(out.dimensions(), (10, 10));
        assert!(out.pixels().all(|p| p.0 == [255, 255, 255, 255]));

        let stretched = fit_to_slot(&img, 10, 10, PhotoFit::Stretch);
        assert_eq!(stretched.dimensions(), (10, 10));
        assert_eq!(stretched.get_pixel(0, 5).0, [0, 0, 0, 255]);
    }

    #[test]
    fn diagonal_gradient_runs_corner_to_corner() {
        let frame = FrameColor::even_gradient(&[Rgba8::BLACK, Rgba8::WHITE]).unwrap();
        let img = diagonal_gradient(&frame, 20, 30).unwrap();
        let vello_cpu::ImageSource::Pixmap(p) = &img.image else {
            panic!("expected pixmap");
        };
        let bytes = p.data_as_u8_slice();
        let first = &bytes[0..4];
        let last = &bytes[bytes.len() - 4..];
        assert!(first[0] < 10);
        assert!(last[0] > 245);
    }

    #[test]
    fn strip_pixel_bounds() {
        let s = Strip {
            width: 1,
            height: 1,
            rgba8: vec![1, 2, 3, 4],
        };
        assert_eq!(s.pixel(0, 0), Some([1, 2, 3, 4]));
        assert_eq!(s.pixel(1, 0), None);
        let png = s.encode_png().unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }
}
