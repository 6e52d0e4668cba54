use std::path::Path;
use thiserror::Error;
use vosk::{DecodingState, Model, Recognizer};

/// Errors that can occur while loading or feeding the recognizer
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// Failed to load the VOSK model directory
    #[error("failed to load vosk model from {path}")]
    ModelLoad {
        /// Path to the model directory
        path: String,
    },

    /// Failed to create the recognizer for the model
    #[error("failed to create vosk recognizer")]
    RecognizerInit,

    /// The recognizer rejected or failed to decode a waveform
    #[error("recognizer failed on waveform of {len} samples")]
    Waveform {
        /// Samples in the rejected feed
        len: usize,
    },
}

/// One recognition step's outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The fed chunk completed an utterance (text may be empty)
    Final(String),
    /// An in-progress hypothesis, subject to revision (may be empty)
    Partial(String),
}

/// Incremental speech recognizer consumed by the capture worker
///
/// One chunk in, one outcome out; `finalize` flushes whatever audio is
/// still buffered when a session ends and leaves the recognizer clean
/// for the next session.
#[cfg_attr(test, mockall::automock)]
pub trait SpeechEngine: Send {
    /// Feed one PCM chunk and report the decoding outcome
    ///
    /// # Errors
    /// Returns error if the recognizer rejects the waveform or enters a
    /// failed decoding state.
    fn accept(&mut self, samples: &[i16]) -> Result<Outcome, RecognitionError>;

    /// Flush buffered audio into a last final text and reset
    fn finalize(&mut self) -> String;
}

/// VOSK-backed [`SpeechEngine`]
pub struct VoskEngine {
    recognizer: Recognizer,
    // The recognizer retains its own model reference; kept here so the
    // engine owns the whole recognition state.
    _model: Model,
}

impl VoskEngine {
    /// Loads the model directory and creates a recognizer at `sample_rate`
    ///
    /// # Errors
    /// Returns error if the model directory is not a loadable VOSK model
    /// or recognizer creation fails.
    pub fn load(model_dir: &Path, sample_rate: u32) -> Result<Self, RecognitionError> {
        let path_str = model_dir.to_str().ok_or_else(|| RecognitionError::ModelLoad {
            path: model_dir.display().to_string(),
        })?;

        tracing::info!(path = %model_dir.display(), sample_rate, "loading vosk model");

        let model = Model::new(path_str).ok_or_else(|| RecognitionError::ModelLoad {
            path: model_dir.display().to_string(),
        })?;

        #[allow(clippy::cast_precision_loss)] // sample rates are far below f32 precision limits
        let recognizer = Recognizer::new(&model, sample_rate as f32)
            .ok_or(RecognitionError::RecognizerInit)?;

        tracing::info!("vosk model loaded");

        Ok(Self {
            recognizer,
            _model: model,
        })
    }
}

impl SpeechEngine for VoskEngine {
    fn accept(&mut self, samples: &[i16]) -> Result<Outcome, RecognitionError> {
        match self.recognizer.accept_waveform(samples) {
            Ok(DecodingState::Finalized) => {
                let text = self
                    .recognizer
                    .result()
                    .single()
                    .map(|utterance| utterance.text.trim().to_owned())
                    .unwrap_or_default();
                Ok(Outcome::Final(text))
            }
            Ok(DecodingState::Running) => {
                let partial = self.recognizer.partial_result().partial.trim().to_owned();
                Ok(Outcome::Partial(partial))
            }
            Ok(DecodingState::Failed) | Err(_) => Err(RecognitionError::Waveform {
                len: samples.len(),
            }),
        }
    }

    fn finalize(&mut self) -> String {
        let text = self
            .recognizer
            .final_result()
            .single()
            .map(|utterance| utterance.text.trim().to_owned())
            .unwrap_or_default();
        self.recognizer.reset();
        text
    }
}
