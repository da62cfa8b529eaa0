use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Short user-facing message raised by a session transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Fire-and-forget notification surface.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&mut self, _notice: Notice) {}
}

/// Forwards notices to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => {
                tracing::info!(level = ?notice.level, "{}", notice.message)
            }
            NoticeLevel::Error => tracing::warn!("{}", notice.message),
        }
    }
}

/// Keeps every notice; clones share the same log.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    log: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notice: Notice) {
        if let Ok(mut log) = self.log.lock() {
            log.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_clones_share_log() {
        let rec = RecordingNotifier::default();
        let mut sender = rec.clone();
        sender.notify(Notice::success("ok"));
        sender.notify(Notice::error("bad"));
        let got = rec.notices();
        assert_eq!(got.len(), 2);
        assert_eq!(got[1].level, NoticeLevel::Error);
    }
}
