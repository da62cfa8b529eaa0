use std::path::PathBuf;

use crate::assets::color::FrameColor;
use crate::assets::photo::Photo;
use crate::config::BoothConfig;
use crate::effects::filter::FilterId;
use crate::export::{ExportSink, suggested_file_name};
use crate::foundation::clock::{Clock, SystemClock};
use crate::foundation::error::{CameraError, SnaptureError, SnaptureResult};
use crate::render::compositor::{Strip, StripCompositor};
use crate::session::camera::{AcquireStatus, CameraDevice, CameraState, StreamConstraints};
use crate::session::countdown::{Countdown, Tick, TimerDuration};
use crate::session::layout::LayoutPreset;
use crate::session::notify::{Notice, Notifier, NullNotifier};

/// Upper bound on photos per strip.
pub const MAX_PHOTOS: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    #[default]
    Layout,
    Capture,
    FrameSelect,
    Export,
}

/// Everything the booth knows about the strip being built.
///
/// Fields change only through [`SessionController`] transitions.
#[derive(Clone, Debug, Default)]
pub struct CaptureSession {
    layout: Option<String>,
    required_photo_count: usize,
    photos: Vec<Photo>,
    active_filter: FilterId,
    frame_color: Option<FrameColor>,
    stage: Stage,
}

impl CaptureSession {
    pub fn layout(&self) -> Option<&str> {
        self.layout.as_deref()
    }

    pub fn required_photo_count(&self) -> usize {
        self.required_photo_count
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn active_filter(&self) -> FilterId {
        self.active_filter
    }

    pub fn frame_color(&self) -> Option<&FrameColor> {
        self.frame_color.as_ref()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn remaining(&self) -> usize {
        self.required_photo_count.saturating_sub(self.photos.len())
    }

    pub fn is_full(&self) -> bool {
        self.required_photo_count > 0 && self.photos.len() >= self.required_photo_count
    }
}

/// Drives a [`CaptureSession`] through layout, capture, frame selection and export.
pub struct SessionController<C: CameraDevice, N: Notifier = NullNotifier> {
    session: CaptureSession,
    camera: C,
    camera_state: CameraState,
    constraints: StreamConstraints,
    countdown: Countdown,
    timer: TimerDuration,
    compositor: StripCompositor,
    clock: Box<dyn Clock>,
    notifier: N,
}

impl<C: CameraDevice, N: Notifier> SessionController<C, N> {
    pub fn new(camera: C, notifier: N, compositor: StripCompositor) -> Self {
        Self {
            session: CaptureSession::default(),
            camera,
            camera_state: CameraState::Idle,
            constraints: StreamConstraints::default(),
            countdown: Countdown::default(),
            timer: TimerDuration::default(),
            compositor,
            clock: Box::new(SystemClock),
            notifier,
        }
    }

    pub fn from_config(config: &BoothConfig, camera: C, notifier: N) -> SnaptureResult<Self> {
        config.validate()?;
        let mut ctl = Self::new(camera, notifier, config.compositor()?);
        ctl.timer = config.timer;
        Ok(ctl)
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_constraints(mut self, constraints: StreamConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn stage(&self) -> Stage {
        self.session.stage
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_state(&self) -> &CameraState {
        &self.camera_state
    }

    pub fn camera_ready(&self) -> bool {
        self.camera_state == CameraState::Live
    }

    /// User-facing message for the last failed acquisition.
    pub fn camera_error(&self) -> Option<String> {
        match &self.camera_state {
            CameraState::Failed(e) => Some(e.user_message()),
            _ => None,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn timer(&self) -> TimerDuration {
        self.timer
    }

    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown.remaining()
    }

    fn expect_stage(&self, want: Stage, op: &str) -> SnaptureResult<()> {
        if self.session.stage != want {
            return Err(SnaptureError::invalid_stage(format!(
                "{op} requires stage {want:?}, session is in {:?}",
                self.session.stage
            )));
        }
        Ok(())
    }

    pub fn select_layout(&mut self, layout_id: &str, photo_count: usize) -> SnaptureResult<()> {
        self.expect_stage(Stage::Layout, "select_layout")?;
        let layout_id = layout_id.trim();
        if layout_id.is_empty() {
            return Err(SnaptureError::validation("layout id must not be empty"));
        }
        if !(1..=MAX_PHOTOS).contains(&photo_count) {
            return Err(SnaptureError::validation(format!(
                "photo count must be 1..={MAX_PHOTOS}, got {photo_count}"
            )));
        }

        self.session.layout = Some(layout_id.to_string());
        self.session.required_photo_count = photo_count;
        self.session.photos.clear();
        self.session.stage = Stage::Capture;
        tracing::info!(layout = layout_id, photo_count, "layout selected");
        self.notifier.notify(Notice::success(format!(
            "Layout \"{layout_id}\" selected! Get ready to take {photo_count} amazing photos."
        )));
        Ok(())
    }

    pub fn select_layout_preset(&mut self, id: &str) -> SnaptureResult<()> {
        let preset = LayoutPreset::by_id(id)
            .ok_or_else(|| SnaptureError::validation(format!("unknown layout '{id}'")))?;
        self.select_layout(preset.id, preset.photo_count)
    }

    pub fn select_filter(&mut self, filter: FilterId) -> SnaptureResult<()> {
        self.expect_stage(Stage::Capture, "select_filter")?;
        self.session.active_filter = filter;
        tracing::debug!(%filter, "filter selected");
        Ok(())
    }

    /// Open the camera. A no-op while acquisition is pending or the stream is live.
    pub fn start_camera(&mut self) -> SnaptureResult<()> {
        self.expect_stage(Stage::Capture, "start_camera")?;
        if self.camera_state.is_active() {
            return Ok(());
        }
        self.camera_state = CameraState::Acquiring;

        if !self.camera.is_supported() {
            return Err(self.camera_failed(CameraError::Unsupported));
        }
        match self.camera.open(&self.constraints) {
            Ok(AcquireStatus::Live) => {
                self.camera_live();
                Ok(())
            }
            Ok(AcquireStatus::Pending) => {
                tracing::debug!("camera acquisition pending");
                Ok(())
            }
            Err(e) => Err(self.camera_failed(e)),
        }
    }

    /// Advance a pending acquisition. Returns whether the stream is live.
    pub fn poll_camera(&mut self) -> SnaptureResult<bool> {
        match self.camera_state {
            CameraState::Live => Ok(true),
            CameraState::Acquiring => match self.camera.poll_open() {
                Ok(AcquireStatus::Live) => {
                    self.camera_live();
                    Ok(true)
                }
                Ok(AcquireStatus::Pending) => Ok(false),
                Err(e) => Err(self.camera_failed(e)),
            },
            CameraState::Idle | CameraState::Failed(_) => Ok(false),
        }
    }

    /// Tear the stream down, forget the last error and acquire again.
    pub fn retry_camera(&mut self) -> SnaptureResult<()> {
        self.teardown_camera();
        tracing::info!("retrying camera acquisition");
        self.start_camera()
    }

    fn camera_live(&mut self) {
        self.camera_state = CameraState::Live;
        tracing::info!("camera live");
        let notice = Notice::success("Camera ready! Start capturing your photos.");
        self.notifier.notify(notice);
    }

    fn camera_failed(&mut self, err: CameraError) -> SnaptureError {
        self.camera.stop_tracks();
        tracing::warn!(error = %err, "camera acquisition failed");
        self.notifier.notify(Notice::error(err.user_message()));
        self.camera_state = CameraState::Failed(err.clone());
        SnaptureError::Camera(err)
    }

    fn teardown_camera(&mut self) {
        if self.camera_state.is_active() {
            self.camera.stop_tracks();
            tracing::debug!("camera stopped");
        }
        self.camera_state = CameraState::Idle;
    }

    /// Grab one frame from the live camera and append it.
    pub fn capture_photo(&mut self) -> SnaptureResult<()> {
        if self.session.stage != Stage::Capture || !self.camera_ready() {
            tracing::warn!(stage = ?self.session.stage, "capture requested before camera is ready");
            self.notifier.notify(Notice::error("Camera not ready"));
            return Err(SnaptureError::CaptureNotReady);
        }
        let photo = self.camera.grab_frame()?;
        self.session.photos.push(photo);
        tracing::info!(
            captured = self.session.photos.len(),
            required = self.session.required_photo_count,
            "photo captured"
        );

        if !self.complete_if_full("All photos captured! Moving to frame selection.") {
            let left = self.session.remaining();
            self.notifier
                .notify(Notice::success(format!("Photo captured! {left} more to go.")));
        }
        Ok(())
    }

    /// Append uploaded photos up to the remaining slot count; the rest are dropped.
    ///
    /// Returns how many photos were kept.
    pub fn upload_photos(&mut self, photos: Vec<Photo>) -> SnaptureResult<usize> {
        self.expect_stage(Stage::Capture, "upload_photos")?;
        let offered = photos.len();
        let keep = offered.min(self.session.remaining());
        if keep < offered {
            tracing::debug!(offered, keep, "discarding uploads beyond remaining slots");
        }
        if keep == 0 {
            return Ok(0);
        }
        self.session.photos.extend(photos.into_iter().take(keep));

        if !self.complete_if_full("All photos ready! Moving to frame selection.") {
            let left = self.session.remaining();
            self.notifier.notify(Notice::success(format!(
                "{keep} photos uploaded! {left} more needed."
            )));
        }
        Ok(keep)
    }

    fn complete_if_full(&mut self, message: &str) -> bool {
        if self.session.stage != Stage::Capture || !self.session.is_full() {
            return false;
        }
        self.countdown.cancel();
        self.teardown_camera();
        self.session.stage = Stage::FrameSelect;
        tracing::info!(
            photos = self.session.photos.len(),
            filter = %self.session.active_filter,
            "all photos collected"
        );
        self.notifier.notify(Notice::success(message));
        self.notifier.notify(Notice::success(
            "All photos captured successfully! Now choose your frame colour.",
        ));
        true
    }

    pub fn set_timer(&mut self, timer: TimerDuration) {
        self.timer = timer;
    }

    /// Start a countdown of the configured length.
    ///
    /// Returns `false` and changes nothing if a countdown is already running, the session
    /// is not capturing, or every slot is filled.
    pub fn start_countdown(&mut self) -> bool {
        if self.session.stage != Stage::Capture || self.session.is_full() {
            return false;
        }
        let started = self.countdown.start(self.timer);
        if started {
            tracing::debug!(seconds = self.timer.seconds(), "countdown started");
        }
        started
    }

    /// Advance the countdown one second. The tick that reaches zero captures a photo.
    pub fn tick(&mut self) -> SnaptureResult<Tick> {
        let tick = self.countdown.tick();
        if tick == Tick::Fire {
            tracing::debug!("countdown finished");
            match self.capture_photo() {
                Ok(()) | Err(SnaptureError::CaptureNotReady) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(tick)
    }

    pub fn cancel_countdown(&mut self) {
        if self.countdown.is_active() {
            tracing::debug!("countdown cancelled");
        }
        self.countdown.cancel();
    }

    pub fn select_frame_color(&mut self, color: FrameColor) -> SnaptureResult<()> {
        self.expect_stage(Stage::FrameSelect, "select_frame_color")?;
        self.session.frame_color = Some(color);
        self.session.stage = Stage::Export;
        tracing::info!("frame color selected");
        self.notifier.notify(Notice::success(
            "Perfect frame colour selected! Your photo strip is ready!",
        ));
        Ok(())
    }

    /// Composite the current session without exporting it.
    pub fn render_strip(&self) -> SnaptureResult<Strip> {
        self.expect_stage(Stage::Export, "render_strip")?;
        let frame = self.session.frame_color.clone().unwrap_or_default();
        self.compositor.composite(
            &self.session.photos,
            self.session.active_filter,
            &frame,
            self.clock.as_ref(),
        )
    }

    /// Render, encode and hand the strip to `sink`. The session is left as it was, so a
    /// failed export can be retried.
    pub fn export(&mut self, sink: &mut dyn ExportSink) -> SnaptureResult<PathBuf> {
        let result = self.try_export(sink);
        match &result {
            Ok(path) => {
                tracing::info!(path = %path.display(), "strip exported");
                self.notifier
                    .notify(Notice::success("Photo strip downloaded successfully!"));
            }
            Err(e) => {
                tracing::warn!(error = %e, "export failed");
                self.notifier
                    .notify(Notice::error(format!("Could not export photo strip: {e}")));
            }
        }
        result
    }

    fn try_export(&self, sink: &mut dyn ExportSink) -> SnaptureResult<PathBuf> {
        let strip = self.render_strip()?;
        let png = strip.encode_png()?;
        let name = suggested_file_name(self.compositor.brand(), &self.clock.now());
        sink.save(&name, &png)
    }

    /// Return to the layout stage with a clean session.
    pub fn reset(&mut self) {
        self.countdown.cancel();
        self.teardown_camera();
        self.session = CaptureSession::default();
        tracing::info!("session reset");
        let notice = Notice::success("PhotoBooth reset! Start your new photo session.");
        self.notifier.notify(notice);
    }
}

impl<C: CameraDevice, N: Notifier> Drop for SessionController<C, N> {
    fn drop(&mut self) {
        self.teardown_camera();
    }
}
