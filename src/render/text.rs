use std::sync::{Arc, OnceLock};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{SnaptureError, SnaptureResult};

/// DejaVu Sans, used when no footer font is configured. License in `assets/fonts/`.
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Footer font loaded once and shared by every export.
#[derive(Clone)]
pub struct FooterFont {
    bytes: Arc<Vec<u8>>,
    family: Arc<str>,
    font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for FooterFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FooterFont")
            .field("family", &self.family)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl FooterFont {
    pub fn from_bytes(bytes: Vec<u8>) -> SnaptureResult<Self> {
        if bytes.is_empty() {
            return Err(SnaptureError::config("footer font file is empty"));
        }
        let bytes = Arc::new(bytes);
        let mut font_ctx = parley::FontContext::default();
        let family = register(&mut font_ctx, &bytes)
            .map_err(|e| SnaptureError::config(format!("footer font: {e}")))?;
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            0,
        );
        Ok(Self {
            bytes,
            family: family.into(),
            font,
        })
    }

    pub fn load(path: &std::path::Path) -> SnaptureResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| SnaptureError::config(format!("read font '{}': {e}", path.display())))?;
        Self::from_bytes(bytes)
    }

    /// The font compiled into the crate. `None` only if it fails to parse.
    pub fn bundled() -> Option<Self> {
        static BUNDLED: OnceLock<Option<FooterFont>> = OnceLock::new();
        BUNDLED
            .get_or_init(|| match Self::from_bytes(BUNDLED_FONT.to_vec()) {
                Ok(font) => Some(font),
                Err(e) => {
                    tracing::warn!(error = %e, "bundled footer font failed to load");
                    None
                }
            })
            .clone()
    }

    pub fn family(&self) -> &str {
        &self.family
    }
}

/// Register `bytes` with `font_ctx` and return the first family name it provides.
fn register(font_ctx: &mut parley::FontContext, bytes: &[u8]) -> SnaptureResult<String> {
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
    let family_id = families
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| SnaptureError::render("no font families registered from footer font"))?;
    let name = font_ctx
        .collection
        .family_name(family_id)
        .ok_or_else(|| SnaptureError::render("registered font family has no name"))?;
    Ok(name.to_string())
}

/// Parley layout state with one footer font registered.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    family: String,
}

impl TextLayoutEngine {
    pub(crate) fn new(font: &FooterFont) -> SnaptureResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let family = register(&mut font_ctx, &font.bytes)?;
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
        })
    }

    /// Shape a single unwrapped line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        color: Rgba8,
    ) -> SnaptureResult<parley::Layout<Rgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SnaptureError::validation(
                "text size must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(color));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Draw `layout` horizontally centered on `center_x` with its first baseline at `baseline`.
pub(crate) fn fill_centered(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<Rgba8>,
    font: &FooterFont,
    center_x: f64,
    baseline: f64,
) {
    let first_baseline = layout
        .lines()
        .next()
        .map(|l| f64::from(l.metrics().baseline))
        .unwrap_or(0.0);
    let x = center_x - f64::from(layout.width()) / 2.0;
    let y = baseline - first_baseline;
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));

    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&font.font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}
