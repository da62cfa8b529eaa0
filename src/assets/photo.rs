use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::SnaptureResult;

/// An encoded still (PNG, JPEG, ...) captured from the camera or uploaded.
///
/// Cloning is cheap; the bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct Photo {
    bytes: Arc<[u8]>,
}

impl std::fmt::Debug for Photo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Photo")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Photo {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn read(path: &Path) -> SnaptureResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read photo '{}'", path.display()))?;
        Ok(Self::from_bytes(bytes))
    }

    /// Encode an in-memory frame as PNG.
    pub fn from_rgba(image: &image::RgbaImage) -> SnaptureResult<Self> {
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode frame as png")?;
        Ok(Self::from_bytes(buf))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
