use std::collections::VecDeque;

use crate::assets::photo::Photo;
use crate::foundation::error::{CameraError, SnaptureError, SnaptureResult};

/// Facing mode requested from the device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    #[default]
    User,
    Environment,
}

/// Resolution and facing constraints for opening a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub min_width: u32,
    pub min_height: u32,
    pub facing: Facing,
    pub audio: bool,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1920,
            ideal_height: 1080,
            min_width: 1280,
            min_height: 720,
            facing: Facing::User,
            audio: false,
        }
    }
}

/// Outcome of a successful `open` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcquireStatus {
    /// Frames can be grabbed right away.
    Live,
    /// The device accepted the request; call `poll_open` until it settles.
    Pending,
}

/// A still-capable video device.
pub trait CameraDevice {
    fn is_supported(&self) -> bool;

    fn open(&mut self, constraints: &StreamConstraints) -> Result<AcquireStatus, CameraError>;

    /// Progress a pending acquisition.
    fn poll_open(&mut self) -> Result<AcquireStatus, CameraError>;

    fn grab_frame(&mut self) -> SnaptureResult<Photo>;

    /// Release every track. Must tolerate being called on a closed device.
    fn stop_tracks(&mut self);
}

/// Lifecycle of the controller-owned camera handle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CameraState {
    #[default]
    Idle,
    Acquiring,
    Live,
    Failed(CameraError),
}

impl CameraState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Acquiring | Self::Live)
    }
}

/// Camera that serves frames from a fixed list of still images, cycling when exhausted.
#[derive(Debug, Default)]
pub struct StillsCamera {
    frames: Vec<Photo>,
    cursor: usize,
    open: bool,
    pending_polls: u32,
    failures: VecDeque<CameraError>,
    supported: bool,
    opens: u32,
    stops: u32,
}

impl StillsCamera {
    pub fn new(frames: Vec<Photo>) -> Self {
        Self {
            frames,
            supported: true,
            ..Self::default()
        }
    }

    /// Report the device as missing camera support.
    pub fn unsupported() -> Self {
        Self::default()
    }

    /// Queue an error for the next `open` call.
    pub fn fail_next_open(mut self, err: CameraError) -> Self {
        self.failures.push_back(err);
        self
    }

    /// Stay pending for `polls` calls to `poll_open` before going live.
    pub fn with_startup_polls(mut self, polls: u32) -> Self {
        self.pending_polls = polls;
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open_calls(&self) -> u32 {
        self.opens
    }

    /// Number of times tracks were actually released.
    pub fn stop_calls(&self) -> u32 {
        self.stops
    }
}

impl CameraDevice for StillsCamera {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn open(&mut self, _constraints: &StreamConstraints) -> Result<AcquireStatus, CameraError> {
        self.opens += 1;
        if let Some(err) = self.failures.pop_front() {
            return Err(err);
        }
        if self.frames.is_empty() {
            return Err(CameraError::NotFound);
        }
        self.open = true;
        if self.pending_polls > 0 {
            Ok(AcquireStatus::Pending)
        } else {
            Ok(AcquireStatus::Live)
        }
    }

    fn poll_open(&mut self) -> Result<AcquireStatus, CameraError> {
        if !self.open {
            return Err(CameraError::Unknown("stream was never opened".into()));
        }
        if self.pending_polls > 0 {
            self.pending_polls -= 1;
        }
        if self.pending_polls == 0 {
            Ok(AcquireStatus::Live)
        } else {
            Ok(AcquireStatus::Pending)
        }
    }

    fn grab_frame(&mut self) -> SnaptureResult<Photo> {
        if !self.open || self.frames.is_empty() {
            return Err(SnaptureError::CaptureNotReady);
        }
        let frame = self.frames[self.cursor % self.frames.len()].clone();
        self.cursor += 1;
        Ok(frame)
    }

    fn stop_tracks(&mut self) {
        if self.open {
            self.open = false;
            self.stops += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still() -> Photo {
        Photo::from_bytes(vec![1u8, 2, 3])
    }

    #[test]
    fn default_constraints() {
        let c = StreamConstraints::default();
        assert_eq!((c.ideal_width, c.ideal_height), (1920, 1080));
        assert_eq!((c.min_width, c.min_height), (1280, 720));
        assert_eq!(c.facing, Facing::User);
        assert!(!c.audio);
    }

    #[test]
    fn frames_cycle_in_order() {
        let a = Photo::from_bytes(vec![1u8]);
        let b = Photo::from_bytes(vec![2u8]);
        let mut cam = StillsCamera::new(vec![a.clone(), b.clone()]);
        assert!(cam.grab_frame().is_err());
        assert_eq!(
            cam.open(&StreamConstraints::default()),
            Ok(AcquireStatus::Live)
        );
        assert_eq!(cam.grab_frame().unwrap().as_bytes(), a.as_bytes());
        assert_eq!(cam.grab_frame().unwrap().as_bytes(), b.as_bytes());
        assert_eq!(cam.grab_frame().unwrap().as_bytes(), a.as_bytes());
    }

    #[test]
    fn queued_failure_then_success() {
        let mut cam = StillsCamera::new(vec![still()]).fail_next_open(CameraError::Busy);
        assert_eq!(
            cam.open(&StreamConstraints::default()),
            Err(CameraError::Busy)
        );
        assert!(!cam.is_open());
        assert_eq!(
            cam.open(&StreamConstraints::default()),
            Ok(AcquireStatus::Live)
        );
        assert_eq!(cam.open_calls(), 2);
    }

    #[test]
    fn pending_until_polled() {
        let mut cam = StillsCamera::new(vec![still()]).with_startup_polls(2);
        assert_eq!(
            cam.open(&StreamConstraints::default()),
            Ok(AcquireStatus::Pending)
        );
        assert_eq!(cam.poll_open(), Ok(AcquireStatus::Pending));
        assert_eq!(cam.poll_open(), Ok(AcquireStatus::Live));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut cam = StillsCamera::new(vec![still()]);
        cam.stop_tracks();
        assert_eq!(cam.stop_calls(), 0);
        cam.open(&StreamConstraints::default()).unwrap();
        cam.stop_tracks();
        cam.stop_tracks();
        assert_eq!(cam.stop_calls(), 1);
    }

    #[test]
    fn empty_device_reports_not_found() {
        let mut cam = StillsCamera::new(Vec::new());
        assert_eq!(
            cam.open(&StreamConstraints::default()),
            Err(CameraError::NotFound)
        );
        assert!(!StillsCamera::unsupported().is_supported());
    }
}
