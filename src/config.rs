//! Booth configuration.
//!
//! Settings are read from a JSON file with defaults for every missing field, then
//! individual values can be overridden from the environment:
//!
//! - `SNAPTURE_EXPORT_SCALE`: export scale factor
//! - `SNAPTURE_FONT`: path to the footer font
//! - `SNAPTURE_OUT_DIR`: directory exported strips are written to

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::clock::validate_timestamp_format;
use crate::foundation::error::{SnaptureError, SnaptureResult};
use crate::render::compositor::{PhotoFit, StripCompositor};
use crate::render::geometry::StripGeometry;
use crate::render::text::FooterFont;
use crate::session::countdown::TimerDuration;

pub const DEFAULT_BRAND: &str = "Snapture";
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y • %I:%M %p";
pub const DEFAULT_EXPORT_SCALE: f64 = 2.0;

const MIN_EXPORT_SCALE: f64 = 0.1;
const MAX_EXPORT_SCALE: f64 = 8.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoothConfig {
    pub brand: String,
    pub export_scale: f64,
    pub geometry: StripGeometry,
    pub fit: PhotoFit,
    pub font: Option<PathBuf>,
    pub timestamp_format: String,
    pub timer: TimerDuration,
    pub out_dir: PathBuf,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            brand: DEFAULT_BRAND.to_string(),
            export_scale: DEFAULT_EXPORT_SCALE,
            geometry: StripGeometry::default(),
            fit: PhotoFit::default(),
            font: None,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            timer: TimerDuration::default(),
            out_dir: PathBuf::from("."),
        }
    }
}

impl BoothConfig {
    pub fn load(path: &Path) -> SnaptureResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| SnaptureError::config(format!("read '{}': {e}", path.display())))?;
        let cfg: Self = serde_json::from_str(&json)
            .map_err(|e| SnaptureError::config(format!("parse '{}': {e}", path.display())))?;
        cfg.validate()?;
        tracing::info!(path = %path.display(), "booth config loaded");
        Ok(cfg)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> SnaptureResult<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `SNAPTURE_*` overrides looked up through `var`.
    pub fn with_env_overrides(
        mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> SnaptureResult<Self> {
        if let Some(raw) = var("SNAPTURE_EXPORT_SCALE") {
            self.export_scale = raw.trim().parse().map_err(|_| {
                SnaptureError::config(format!("SNAPTURE_EXPORT_SCALE is not a number: '{raw}'"))
            })?;
        }
        if let Some(font) = var("SNAPTURE_FONT").filter(|s| !s.trim().is_empty()) {
            self.font = Some(PathBuf::from(font));
        }
        if let Some(dir) = var("SNAPTURE_OUT_DIR").filter(|s| !s.trim().is_empty()) {
            self.out_dir = PathBuf::from(dir);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> SnaptureResult<()> {
        if self.brand.trim().is_empty() {
            return Err(SnaptureError::config("brand must not be empty"));
        }
        if !(MIN_EXPORT_SCALE..=MAX_EXPORT_SCALE).contains(&self.export_scale) {
            return Err(SnaptureError::config(format!(
                "export_scale must be in [{MIN_EXPORT_SCALE}, {MAX_EXPORT_SCALE}], got {}",
                self.export_scale
            )));
        }
        self.geometry
            .validate()
            .map_err(|e| SnaptureError::config(format!("geometry: {e}")))?;
        validate_timestamp_format(&self.timestamp_format)?;
        Ok(())
    }

    /// Build the compositor these settings describe. Without a configured font the footer
    /// uses the bundled one.
    pub fn compositor(&self) -> SnaptureResult<StripCompositor> {
        let font = match &self.font {
            Some(path) => Some(FooterFont::load(path)?),
            None => FooterFont::bundled(),
        };
        Ok(StripCompositor::new(self.geometry, self.export_scale)
            .with_fit(self.fit)
            .with_brand(self.brand.clone())
            .with_timestamp_format(self.timestamp_format.clone())
            .with_font(font))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: BoothConfig = serde_json::from_str(r#"{"brand":"Party","timer":5}"#).unwrap();
        assert_eq!(cfg.brand, "Party");
        assert_eq!(cfg.timer, TimerDuration::Five);
        assert_eq!(cfg.export_scale, DEFAULT_EXPORT_SCALE);
        assert_eq!(cfg.geometry, StripGeometry::default());
        assert_eq!(cfg.fit, PhotoFit::Cover);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<BoothConfig>(r#"{"brnad":"x"}"#).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let cfg = BoothConfig::default()
            .with_env_overrides(|k| match k {
                "SNAPTURE_EXPORT_SCALE" => Some("3".into()),
                "SNAPTURE_OUT_DIR" => Some("/tmp/strips".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(cfg.export_scale, 3.0);
        assert_eq!(cfg.out_dir, PathBuf::from("/tmp/strips"));
        assert!(cfg.font.is_none());
    }

    #[test]
    fn bad_values_are_config_errors() {
        let err = BoothConfig::default()
            .with_env_overrides(|k| (k == "SNAPTURE_EXPORT_SCALE").then(|| "fast".into()))
            .unwrap_err();
        assert!(err.to_string().starts_with("config error:"));

        for cfg in [
            BoothConfig {
                export_scale: 0.0,
                ..BoothConfig::default()
            },
            BoothConfig {
                export_scale: 0.001,
                ..BoothConfig::default()
            },
            BoothConfig {
                export_scale: f64::NAN,
                ..BoothConfig::default()
            },
            BoothConfig {
                brand: "  ".into(),
                ..BoothConfig::default()
            },
            BoothConfig {
                timestamp_format: "%Q".into(),
                ..BoothConfig::default()
            },
        ] {
            assert!(cfg.validate().is_err());
        }
    }

    #[test]
    fn compositor_carries_settings() {
        let cfg = BoothConfig {
            brand: "Party".into(),
            export_scale: 1.5,
            ..BoothConfig::default()
        };
        let c = cfg.compositor().unwrap();
        assert_eq!(c.brand(), "Party");
        assert_eq!(c.scale(), 1.5);
        assert_eq!(c.font().map(|f| f.family()), Some("DejaVu Sans"));
    }

    #[test]
    fn configured_font_replaces_the_bundled_one() {
        let cfg = BoothConfig {
            font: Some(PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/tests/data/fonts/DejaVuSansMono.ttf"
            ))),
            ..BoothConfig::default()
        };
        let c = cfg.compositor().unwrap();
        assert_eq!(c.font().map(|f| f.family()), Some("DejaVu Sans Mono"));
    }
}
