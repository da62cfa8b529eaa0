use snapture::{
    FilterId, FixedClock, FooterFont, FrameColor, Photo, PhotoFit, SnaptureError, Strip,
    StripCompositor, StripGeometry,
};

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn digest_u64(bytes: &[u8]) -> u64 {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    for chunk in bytes.chunks(8) {
        let mut v = 0u64;
        for (i, &b) in chunk.iter().enumerate() {
            v |= (b as u64) << (i * 8);
        }
        state = mix64(state ^ v);
    }
    state
}

fn solid(w: u32, h: u32, px: [u8; 3]) -> Photo {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([px[0], px[1], px[2], 255]));
    Photo::from_rgba(&img).unwrap()
}

fn clock() -> FixedClock {
    FixedClock::from_unix_millis(1_700_000_000_000).unwrap()
}

fn close(got: [u8; 4], want: [u8; 3], tol: i16) -> bool {
    got.iter()
        .zip(want)
        .all(|(&g, w)| (i16::from(g) - i16::from(w)).abs() <= tol)
}

fn slot_center(strip_photos: usize, scale: f64, i: usize) -> (u32, u32) {
    let layout = StripGeometry::default().layout(strip_photos, scale).unwrap();
    let c = layout.slots[i].center();
    (c.x as u32, c.y as u32)
}

fn px(strip: &Strip, (x, y): (u32, u32)) -> [u8; 4] {
    strip.pixel(x, y).unwrap()
}

#[test]
fn composite_is_deterministic_with_fixed_clock() {
    let photos = vec![
        solid(64, 48, [200, 30, 30]),
        solid(48, 64, [30, 200, 30]),
        solid(32, 32, [30, 30, 200]),
    ];
    let frame = FrameColor::parse("Rainbow").unwrap();
    let c = StripCompositor::new(StripGeometry::default(), 1.0);

    let a = c.composite(&photos, FilterId::Vintage, &frame, &clock()).unwrap();
    let b = c.composite(&photos, FilterId::Vintage, &frame, &clock()).unwrap();
    assert_eq!(digest_u64(&a.rgba8), digest_u64(&b.rgba8));
    assert_eq!(a.encode_png().unwrap(), b.encode_png().unwrap());
}

#[test]
fn slots_follow_input_order_top_to_bottom() {
    let red = [255, 0, 0];
    let green = [0, 255, 0];
    let blue = [0, 0, 255];
    // Larger first image so its decode tends to finish last.
    let photos = vec![solid(1200, 900, red), solid(8, 6, green), solid(16, 12, blue)];
    let c = StripCompositor::default();

    for _ in 0..4 {
        let strip = c
            .composite(&photos, FilterId::None, &FrameColor::default(), &clock())
            .unwrap();
        assert_eq!((strip.width, strip.height), (400, 600));
        assert!(close(px(&strip, slot_center(3, 1.0, 0)), red, 2));
        assert!(close(px(&strip, slot_center(3, 1.0, 1)), green, 2));
        assert!(close(px(&strip, slot_center(3, 1.0, 2)), blue, 2));
    }
}

#[test]
fn decode_failure_names_the_first_bad_photo() {
    let photos = vec![
        solid(8, 8, [1, 2, 3]),
        Photo::from_bytes(b"not an image".to_vec()),
        Photo::from_bytes(Vec::new()),
    ];
    let err = StripCompositor::default()
        .composite(&photos, FilterId::None, &FrameColor::default(), &clock())
        .unwrap_err();
    assert!(matches!(err, SnaptureError::Decode { index: 1, .. }));
    assert!(err.to_string().starts_with("decode error: photo 1"));
}

#[test]
fn solid_frame_card_and_footer() {
    let photos = vec![solid(40, 30, [255, 0, 0])];
    let frame = FrameColor::parse("#000000").unwrap();
    let strip = StripCompositor::default()
        .composite(&photos, FilterId::None, &frame, &clock())
        .unwrap();

    assert!(close(px(&strip, (1, 1)), [0, 0, 0], 0));
    assert!(close(px(&strip, (398, 598)), [0, 0, 0], 0));

    // White backing card two pixels wider than the photo.
    let layout = StripGeometry::default().layout(1, 1.0).unwrap();
    let slot = layout.slots[0];
    let cy = slot.center().y as u32;
    assert!(close(px(&strip, (slot.x0 as u32 - 1, cy)), [255, 255, 255], 2));
    assert!(close(px(&strip, (slot.x1 as u32 + 1, cy)), [255, 255, 255], 2));

    // Footer band starts at the purple end of its gradient.
    let top = (200, layout.footer.y0 as u32 + 1);
    assert!(close(px(&strip, top), [0x8B, 0x5C, 0xF6], 12));
    let bottom = (200, layout.footer.y1 as u32 - 2);
    assert!(close(px(&strip, bottom), [0xEC, 0x48, 0x99], 12));
}

#[test]
fn gradient_frame_runs_corner_to_corner() {
    let photos = vec![solid(10, 10, [9, 9, 9])];
    let frame = FrameColor::parse("linear-gradient(45deg, #000000, #FFFFFF)").unwrap();
    let strip = StripCompositor::default()
        .composite(&photos, FilterId::None, &frame, &clock())
        .unwrap();
    let tl = px(&strip, (0, 0));
    let br = px(&strip, (399, 599));
    assert!(tl[0] < 8, "top-left {tl:?}");
    assert!(br[0] > 247, "bottom-right {br:?}");
    assert_eq!(tl[3], 255);
}

#[test]
fn filter_is_baked_into_photos() {
    let photos = vec![solid(20, 20, [255, 0, 0])];
    let strip = StripCompositor::default()
        .composite(&photos, FilterId::Bw, &FrameColor::default(), &clock())
        .unwrap();
    let p = px(&strip, slot_center(1, 1.0, 0));
    assert!(close(p, [54, 54, 54], 2), "got {p:?}");
}

#[test]
fn export_scale_multiplies_canvas() {
    let photos = vec![solid(20, 20, [0, 0, 255]), solid(20, 20, [0, 255, 0])];
    let strip = StripCompositor::new(StripGeometry::default(), 2.0)
        .with_fit(PhotoFit::Stretch)
        .composite(&photos, FilterId::None, &FrameColor::default(), &clock())
        .unwrap();
    assert_eq!((strip.width, strip.height), (800, 1200));
    assert_eq!(strip.rgba8.len(), 800 * 1200 * 4);
    assert!(close(px(&strip, slot_center(2, 2.0, 1)), [0, 255, 0], 2));
}

#[test]
fn empty_photo_list_is_rejected() {
    let err = StripCompositor::default()
        .composite(&[], FilterId::None, &FrameColor::default(), &clock())
        .unwrap_err();
    assert!(matches!(err, SnaptureError::Validation(_)));
}

const FIXTURE_FONT: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/data/fonts/DejaVuSansMono.ttf"
);

/// Whether any footer row, away from the rounded corners, holds more than one color.
fn footer_has_glyphs(strip: &Strip, photos: usize) -> bool {
    let f = StripGeometry::default().layout(photos, 1.0).unwrap().footer;
    let xs = f.x0 as u32 + 10..f.x1 as u32 - 10;
    (f.y0 as u32 + 2..f.y1 as u32 - 2).any(|y| {
        let first = strip.pixel(xs.start, y);
        xs.clone().any(|x| strip.pixel(x, y) != first)
    })
}

#[test]
fn default_compositor_writes_brand_and_date() {
    let photos = vec![solid(10, 10, [0, 0, 0])];
    let frame = FrameColor::default();
    let plain = StripCompositor::default()
        .with_font(None)
        .composite(&photos, FilterId::None, &frame, &clock())
        .unwrap();
    assert!(!footer_has_glyphs(&plain, 1));

    let strip = StripCompositor::default()
        .composite(&photos, FilterId::None, &frame, &clock())
        .unwrap();
    assert!(footer_has_glyphs(&strip, 1));
}

#[test]
fn footer_text_sits_between_its_baselines() {
    let font = FooterFont::load(std::path::Path::new(FIXTURE_FONT)).unwrap();
    assert_eq!(font.family(), "DejaVu Sans Mono");

    // Capitals and digits only, so neither line descends below its baseline.
    let compositor = StripCompositor::default()
        .with_brand("SNAP")
        .with_timestamp_format("%Y %H%M");
    let photos = vec![solid(10, 10, [0, 0, 0])];
    let frame = FrameColor::default();
    let plain = compositor
        .clone()
        .with_font(None)
        .composite(&photos, FilterId::None, &frame, &clock())
        .unwrap();
    let text = compositor
        .with_font(Some(font))
        .composite(&photos, FilterId::None, &frame, &clock())
        .unwrap();

    let layout = StripGeometry::default().layout(1, 1.0).unwrap();
    let f = layout.footer;
    let mut glyph_rows = Vec::new();
    for y in 0..text.height {
        for x in 0..text.width {
            if plain.pixel(x, y) == text.pixel(x, y) {
                continue;
            }
            let (fx, fy) = (f64::from(x), f64::from(y));
            assert!(f.x0 <= fx && fx < f.x1, "x {x} outside footer");
            assert!(f.y0 <= fy && fy < f.y1, "y {y} outside footer");
            glyph_rows.push(fy);
        }
    }

    let brand = layout.brand_baseline;
    let stamp = layout.stamp_baseline;
    // Digits reach about three quarters of the font size above their baseline.
    let gap = brand + 1.0..stamp - f64::from(layout.stamp_font_size) * 0.75;
    assert!(glyph_rows.iter().any(|&y| y < brand), "no brand glyphs");
    assert!(
        glyph_rows.iter().any(|&y| y > brand + 1.0 && y <= stamp),
        "no timestamp glyphs"
    );
    for &y in &glyph_rows {
        assert!(y <= stamp + 1.0, "row {y} below the stamp baseline");
        assert!(!gap.contains(&y), "row {y} between the two lines");
    }
}
