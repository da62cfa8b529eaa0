use rayon::prelude::*;

use crate::assets::photo::Photo;
use crate::foundation::error::{SnaptureError, SnaptureResult};

/// Decode one photo into straight-alpha RGBA8.
pub fn decode_photo(index: usize, photo: &Photo) -> SnaptureResult<image::RgbaImage> {
    if photo.is_empty() {
        return Err(SnaptureError::decode(index, "photo buffer is empty"));
    }
    let dyn_img = image::load_from_memory(photo.as_bytes())
        .map_err(|e| SnaptureError::decode(index, e.to_string()))?;
    let rgba = dyn_img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(SnaptureError::decode(index, "photo has zero size"));
    }
    Ok(rgba)
}

/// Decode every photo, all or nothing.
///
/// Decodes run in parallel but the result keeps input order. On failure the error names the
/// lowest failing index.
pub fn decode_all(photos: &[Photo]) -> SnaptureResult<Vec<image::RgbaImage>> {
    let results: Vec<SnaptureResult<image::RgbaImage>> = photos
        .par_iter()
        .enumerate()
        .map(|(i, p)| decode_photo(i, p))
        .collect();
    results.into_iter().collect()
}
