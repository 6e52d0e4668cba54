use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;

/// Probe candidate model directories in order; first existing path wins
///
/// Absence of every candidate is a non-fatal condition: recording start
/// will be rejected until a model is installed.
#[must_use]
pub fn locate_model(candidates: &[String]) -> Option<PathBuf> {
    for candidate in candidates {
        match Config::expand_path(candidate) {
            Ok(path) if path.exists() => {
                info!(path = %path.display(), "vosk model found");
                return Some(path);
            }
            Ok(_) => {}
            Err(e) => warn!(candidate, "skipping model candidate: {}", e),
        }
    }

    warn!("no vosk model found in any candidate path");
    warn!("download one with:");
    warn!("  wget https://alphacephei.com/vosk/models/vosk-model-small-en-us-0.15.zip");
    warn!("  unzip vosk-model-small-en-us-0.15.zip -d ./models/");
    None
}
