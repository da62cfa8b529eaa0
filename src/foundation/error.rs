pub type SnaptureResult<T> = Result<T, SnaptureError>;

/// Why the camera stream could not be acquired.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera capture is not supported in this environment")]
    Unsupported,

    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera device found")]
    NotFound,

    #[error("camera is in use by another application")]
    Busy,

    #[error("camera cannot satisfy the requested constraints")]
    ConstraintsUnsatisfiable,

    #[error("camera failure: {0}")]
    Unknown(String),
}

impl CameraError {
    /// Map a platform media error name (`NotAllowedError`, `NotFoundError`, ...) to a
    /// [`CameraError`]. Unrecognized names keep the platform's own message.
    pub fn classify(name: &str, message: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => {
                Self::PermissionDenied
            }
            "NotFoundError" | "DevicesNotFoundError" => Self::NotFound,
            "NotReadableError" | "TrackStartError" | "AbortError" => Self::Busy,
            "OverconstrainedError" | "ConstraintNotSatisfiedError" => {
                Self::ConstraintsUnsatisfiable
            }
            "NotSupportedError" => Self::Unsupported,
            _ => Self::Unknown(message.trim().to_string()),
        }
    }

    /// Message shown to the person in front of the booth.
    pub fn user_message(&self) -> String {
        let detail = match self {
            Self::Unsupported => "Camera access is not supported in this environment.",
            Self::PermissionDenied => "Please allow camera access in your settings and try again.",
            Self::NotFound => "No camera found on this device.",
            Self::Busy => "Camera is already in use by another application.",
            Self::ConstraintsUnsatisfiable => "Camera does not support the required settings.",
            Self::Unknown(msg) if msg.trim().is_empty() => "Please try again.",
            Self::Unknown(msg) => msg.as_str(),
        };
        format!("Unable to access camera. {detail}")
    }

    /// Only `Unsupported` needs a different environment; everything else can be retried.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SnaptureError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid stage: {0}")]
    InvalidStage(String),

    #[error("camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("capture error: camera not ready")]
    CaptureNotReady,

    #[error("decode error: photo {index}: {reason}")]
    Decode { index: usize, reason: String },

    #[error("render error: {0}")]
    Render(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SnaptureError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_stage(msg: impl Into<String>) -> Self {
        Self::InvalidStage(msg.into())
    }

    pub fn decode(index: usize, reason: impl Into<String>) -> Self {
        Self::Decode {
            index,
            reason: reason.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
