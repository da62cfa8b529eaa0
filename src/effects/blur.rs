use rayon::prelude::*;

use crate::foundation::error::{SnaptureError, SnaptureResult};

const Q16_ONE: i64 = 1 << 16;

/// Radius covering three standard deviations, matching what browsers use for CSS `blur()`.
pub fn radius_for_sigma(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

/// Normalized gaussian taps in Q16 fixed point.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Kernel {
    taps: Vec<u32>,
}

impl Kernel {
    fn new(sigma: f32) -> Option<Self> {
        let radius = radius_for_sigma(sigma) as i32;
        if radius == 0 {
            return None;
        }
        let two_s2 = 2.0 * f64::from(sigma) * f64::from(sigma);
        let raw: Vec<f64> = (-radius..=radius)
            .map(|i| (-f64::from(i * i) / two_s2).exp())
            .collect();
        let total: f64 = raw.iter().sum();

        let mut taps: Vec<u32> = raw
            .iter()
            .map(|w| ((w / total) * Q16_ONE as f64).round() as u32)
            .collect();
        // Fold rounding error into the center tap so the taps sum to one.
        let drift = Q16_ONE - taps.iter().map(|&t| i64::from(t)).sum::<i64>();
        let mid = taps.len() / 2;
        taps[mid] = (i64::from(taps[mid]) + drift).clamp(0, Q16_ONE) as u32;
        Some(Self { taps })
    }

    fn radius(&self) -> i64 {
        (self.taps.len() / 2) as i64
    }

    /// Convolve one output pixel; `fetch(offset)` returns the pixel `offset` taps away.
    fn apply(&self, fetch: impl Fn(i64) -> [u8; 4]) -> [u8; 4] {
        let r = self.radius();
        let mut acc = [0u64; 4];
        for (k, &w) in self.taps.iter().enumerate() {
            let px = fetch(k as i64 - r);
            for (a, c) in acc.iter_mut().zip(px) {
                *a += u64::from(w) * u64::from(c);
            }
        }
        acc.map(|a| ((a + (1 << 15)) >> 16).min(255) as u8)
    }
}

/// Separable gaussian blur over a premultiplied RGBA8 buffer. Edges clamp.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    sigma: f32,
) -> SnaptureResult<Vec<u8>> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| SnaptureError::render("blur buffer size overflow"))?;
    if src.len() != len {
        return Err(SnaptureError::render(format!(
            "blur expects {len} bytes for {width}x{height}, got {}",
            src.len()
        )));
    }
    let Some(kernel) = Kernel::new(sigma) else {
        return Ok(src.to_vec());
    };
    if len == 0 {
        return Ok(Vec::new());
    }

    let (w, h) = (i64::from(width), i64::from(height));
    let row = width as usize * 4;
    let pixel = |buf: &[u8], x: i64, y: i64| -> [u8; 4] {
        let i = (y * w + x) as usize * 4;
        [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
    };

    let mut across = vec![0u8; len];
    across.par_chunks_mut(row).enumerate().for_each(|(y, out)| {
        let y = y as i64;
        for (x, dst) in out.chunks_exact_mut(4).enumerate() {
            let x = x as i64;
            let px = kernel.apply(|d| pixel(src, (x + d).clamp(0, w - 1), y));
            dst.copy_from_slice(&px);
        }
    });

    let mut out = vec![0u8; len];
    out.par_chunks_mut(row).enumerate().for_each(|(y, line)| {
        let y = y as i64;
        for (x, dst) in line.chunks_exact_mut(4).enumerate() {
            let x = x as i64;
            let px = kernel.apply(|d| pixel(&across, x, (y + d).clamp(0, h - 1)));
            dst.copy_from_slice(&px);
        }
    });
    Ok(out)
}
