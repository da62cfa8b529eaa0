use serde::{Deserialize, Serialize};

use crate::foundation::error::{SnaptureError, SnaptureResult};

/// Countdown length offered before an automatic capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TimerDuration {
    #[default]
    Three,
    Five,
    Ten,
}

impl TimerDuration {
    pub const ALL: [Self; 3] = [Self::Three, Self::Five, Self::Ten];

    pub fn seconds(self) -> u32 {
        match self {
            Self::Three => 3,
            Self::Five => 5,
            Self::Ten => 10,
        }
    }
}

impl TryFrom<u32> for TimerDuration {
    type Error = SnaptureError;

    fn try_from(secs: u32) -> SnaptureResult<Self> {
        match secs {
            3 => Ok(Self::Three),
            5 => Ok(Self::Five),
            10 => Ok(Self::Ten),
            other => Err(SnaptureError::validation(format!(
                "timer must be 3, 5 or 10 seconds, got {other}"
            ))),
        }
    }
}

impl From<TimerDuration> for u32 {
    fn from(t: TimerDuration) -> Self {
        t.seconds()
    }
}

impl std::str::FromStr for TimerDuration {
    type Err = SnaptureError;

    fn from_str(s: &str) -> SnaptureResult<Self> {
        let secs: u32 = s
            .trim()
            .trim_end_matches('s')
            .parse()
            .map_err(|_| SnaptureError::validation(format!("invalid timer '{s}'")))?;
        Self::try_from(secs)
    }
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// No countdown is running.
    Idle,
    /// Seconds left after this tick.
    Remaining(u32),
    /// The countdown reached zero and was cleared.
    Fire,
}

/// One-shot, tick-driven countdown. At most one runs at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: Option<u32>,
}

impl Countdown {
    pub fn is_active(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    /// Returns `false` without touching the running countdown if one is active.
    pub fn start(&mut self, duration: TimerDuration) -> bool {
        if self.is_active() {
            return false;
        }
        self.remaining = Some(duration.seconds());
        true
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn tick(&mut self) -> Tick {
        match self.remaining {
            None => Tick::Idle,
            Some(n) if n <= 1 => {
                self.remaining = None;
                Tick::Fire
            }
            Some(n) => {
                self.remaining = Some(n - 1);
                Tick::Remaining(n - 1)
            }
        }
    }
}
