/// Model directory discovery
pub mod discovery;
/// VOSK recognizer wrapper
pub mod engine;

pub use discovery::locate_model;
pub use engine::{Outcome, RecognitionError, SpeechEngine, VoskEngine};
