use std::fmt;
use tokio::sync::mpsc;

/// Maximum characters of a partial hypothesis shown in the status line
const PREVIEW_CHARS: usize = 30;

/// User-visible session status, last-write-wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Idle and ready to record
    Ready,
    /// Recording with no hypothesis yet
    Recording,
    /// Recording with an in-progress hypothesis preview
    Listening(String),
    /// Stopped, waiting for the drain to type pending text
    Processing,
    /// No usable recognition model was found
    ModelMissing,
    /// Audio stream failed to open or errored mid-stream
    AudioFault,
    /// xdotool is not installed
    InjectionToolMissing,
    /// xdotool ran but typing failed
    InjectionFailed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "Ready"),
            Self::Recording => write!(f, "Recording..."),
            Self::Listening(preview) => write!(f, "Recording: {preview}..."),
            Self::Processing => write!(f, "Processing..."),
            Self::ModelMissing => write!(f, "Model not found"),
            Self::AudioFault => write!(f, "Audio Error"),
            Self::InjectionToolMissing => write!(f, "xdotool Missing"),
            Self::InjectionFailed => write!(f, "Type Error"),
        }
    }
}

/// Thread-safe handle for publishing status updates
///
/// Clonable and sendable into the capture worker; the event loop owns
/// the receiving end and renders updates on its own thread.
#[derive(Clone)]
pub struct StatusSink {
    tx: mpsc::UnboundedSender<Status>,
}

impl StatusSink {
    /// Publish a status update. Dropped silently if the UI is gone.
    pub fn publish(&self, status: Status) {
        if self.tx.send(status).is_err() {
            tracing::debug!("status receiver dropped, update discarded");
        }
    }
}

/// Create a status channel: a sink for producers, a receiver for the event loop
#[must_use]
pub fn channel() -> (StatusSink, mpsc::UnboundedReceiver<Status>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (StatusSink { tx }, rx)
}

/// Truncate a partial hypothesis for the status line (pure, testable)
///
/// Respects UTF-8 char boundaries.
#[must_use]
pub fn preview(text: &str) -> String {
    let mut end = text.len().min(PREVIEW_CHARS);
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short() {
        assert_eq!(preview("hello"), "hello");
        assert_eq!(preview(""), "");
    }

    #[test]
    fn test_preview_exactly_thirty_chars() {
        let text = "a".repeat(30);
        assert_eq!(preview(&text), text);
    }

    #[test]
    fn test_preview_truncates_long() {
        let text = "a".repeat(100);
        assert_eq!(preview(&text), "a".repeat(30));
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        // Each emoji is 4 bytes; byte 30 falls inside the eighth one
        let text = "👋".repeat(10);
        let result = preview(&text);
        assert_eq!(result, "👋".repeat(7));
        assert!(text.starts_with(&result));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(Status::Ready.to_string(), "Ready");
        assert_eq!(Status::Recording.to_string(), "Recording...");
        assert_eq!(
            Status::Listening("turn on the".to_owned()).to_string(),
            "Recording: turn on the..."
        );
        assert_eq!(Status::ModelMissing.to_string(), "Model not found");
        assert_eq!(Status::AudioFault.to_string(), "Audio Error");
        assert_eq!(Status::InjectionToolMissing.to_string(), "xdotool Missing");
        assert_eq!(Status::InjectionFailed.to_string(), "Type Error");
    }

    #[tokio::test]
    async fn test_channel_delivers_in_order() {
        let (sink, mut rx) = channel();
        sink.publish(Status::Recording);
        sink.publish(Status::Processing);
        sink.publish(Status::Ready);
        assert_eq!(rx.recv().await, Some(Status::Recording));
        assert_eq!(rx.recv().await, Some(Status::Processing));
        assert_eq!(rx.recv().await, Some(Status::Ready));
    }

    #[test]
    fn test_publish_without_receiver_does_not_panic() {
        let (sink, rx) = channel();
        drop(rx);
        sink.publish(Status::Ready);
    }
}
