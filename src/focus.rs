use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// Opaque identifier for the window holding keyboard focus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowHandle(String);

impl WindowHandle {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Focus restoration errors
#[derive(Debug, Error)]
pub enum FocusError {
    /// The focus tool is not installed
    #[error("xdotool is not installed")]
    ToolMissing,

    /// The tool ran but activation failed
    #[error("window activation failed: {detail}")]
    Failed {
        /// Tool stderr or spawn error text
        detail: String,
    },
}

/// Queries and restores the OS-level active window
///
/// Both operations are best-effort: the pipeline logs failures and
/// carries on.
#[cfg_attr(test, mockall::automock)]
pub trait FocusTracker: Send + Sync {
    /// The window currently holding keyboard focus, if determinable
    fn active_window(&self) -> Option<WindowHandle>;

    /// Give keyboard focus back to `window`
    ///
    /// # Errors
    /// Returns error if the tool is missing or activation fails.
    fn activate(&self, window: &WindowHandle) -> Result<(), FocusError>;
}

/// xdotool-backed [`FocusTracker`]
pub struct XdotoolFocus {
    program: String,
}

impl XdotoolFocus {
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for XdotoolFocus {
    fn default() -> Self {
        Self::with_program("xdotool")
    }
}

impl FocusTracker for XdotoolFocus {
    fn active_window(&self) -> Option<WindowHandle> {
        match Command::new(&self.program).arg("getactivewindow").output() {
            Ok(output) if output.status.success() => {
                let id = String::from_utf8_lossy(&output.stdout).trim().to_owned();
                if id.is_empty() {
                    None
                } else {
                    debug!(window = %id, "saved active window");
                    Some(WindowHandle(id))
                }
            }
            Ok(output) => {
                debug!("getactivewindow failed: {}", output.status);
                None
            }
            Err(e) => {
                debug!("could not run {}: {}", self.program, e);
                None
            }
        }
    }

    fn activate(&self, window: &WindowHandle) -> Result<(), FocusError> {
        let output = Command::new(&self.program)
            .args(["windowactivate", window.id()])
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FocusError::ToolMissing
                } else {
                    FocusError::Failed {
                        detail: e.to_string(),
                    }
                }
            })?;

        if output.status.success() {
            debug!(window = %window.id(), "window reactivated");
            Ok(())
        } else {
            Err(FocusError::Failed {
                detail: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        }
    }
}
