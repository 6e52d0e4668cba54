use std::process::Command;
use thiserror::Error;
use tracing::{info, warn};

use crate::status::preview;

/// Text injection errors
///
/// A missing tool is structural (install xdotool); anything else is a
/// runtime failure of a single injection attempt.
#[derive(Debug, Error)]
pub enum InjectError {
    /// The typing tool is not installed
    #[error("xdotool is not installed")]
    ToolMissing,

    /// The tool ran but typing failed
    #[error("typing failed: {detail}")]
    Failed {
        /// Tool stderr or spawn error text
        detail: String,
    },
}

/// Sends literal keystrokes to whatever window holds focus
#[cfg_attr(test, mockall::automock)]
pub trait TextInjector: Send + Sync {
    /// Type `text` verbatim into the focused window
    ///
    /// # Errors
    /// Returns error if the tool is missing or the typing run fails.
    fn type_text(&self, text: &str) -> Result<(), InjectError>;
}

/// xdotool-backed [`TextInjector`]
pub struct XdotoolTyper {
    program: String,
}

impl XdotoolTyper {
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for XdotoolTyper {
    fn default() -> Self {
        Self::with_program("xdotool")
    }
}

impl TextInjector for XdotoolTyper {
    fn type_text(&self, text: &str) -> Result<(), InjectError> {
        if text.is_empty() {
            warn!("skipping injection of empty text");
            return Ok(());
        }

        // "--" keeps text starting with a dash from being parsed as flags
        let output = Command::new(&self.program)
            .args(["type", "--", text])
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    InjectError::ToolMissing
                } else {
                    InjectError::Failed {
                        detail: e.to_string(),
                    }
                }
            })?;

        if output.status.success() {
            info!(
                text_len = text.len(),
                text_preview = %preview(text),
                "text typed into focused window"
            );
            Ok(())
        } else {
            Err(InjectError::Failed {
                detail: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        }
    }
}
