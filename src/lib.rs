//! Photobooth capture sessions and photo strip compositing.
//!
//! A [`SessionController`] walks a [`CaptureSession`] from layout selection through camera
//! capture or upload, frame color choice and export. Export runs the [`StripCompositor`],
//! which lays the photos out top to bottom on a framed canvas with a branded footer and
//! bakes the session filter into every photo.
#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
pub mod effects;
pub mod export;
pub mod foundation;
pub mod render;
pub mod session;

pub use assets::color::{
    FRAME_COLORS, FrameCategory, FrameColor, FrameColorDescriptor, GradientStop,
};
pub use assets::photo::Photo;
pub use config::BoothConfig;
pub use effects::filter::{Adjustment, FILTERS, FilterDescriptor, FilterId, apply_filter, preview};
pub use export::{DirectorySink, ExportSink, MemorySink, suggested_file_name};
pub use foundation::clock::{Clock, FixedClock, SystemClock};
pub use foundation::core::Rgba8;
pub use foundation::error::{CameraError, SnaptureError, SnaptureResult};
pub use render::compositor::{PhotoFit, Strip, StripCompositor};
pub use render::geometry::{StripGeometry, StripLayout};
pub use render::text::FooterFont;
pub use session::camera::{
    AcquireStatus, CameraDevice, CameraState, Facing, StillsCamera, StreamConstraints,
};
pub use session::controller::{CaptureSession, MAX_PHOTOS, SessionController, Stage};
pub use session::countdown::{Countdown, Tick, TimerDuration};
pub use session::layout::{LAYOUT_PRESETS, LayoutPreset};
pub use session::notify::{
    Notice, NoticeLevel, Notifier, NullNotifier, RecordingNotifier, TracingNotifier,
};
