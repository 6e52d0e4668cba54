//! Voicetype - Linux voice-to-text agent
//!
//! Captures microphone audio, recognizes speech locally with VOSK, and
//! types the result into whichever window last held keyboard focus.

/// Audio capture and chunk plumbing
pub mod audio;
/// Configuration management
pub mod config;
/// Active-window query and restoration (xdotool)
pub mod focus;
/// Keystroke injection (xdotool)
pub mod inject;
/// Input handling (global hotkey)
pub mod input;
/// Recording/transcription pipeline
pub mod pipeline;
/// Speech recognition engine and model discovery
pub mod recognition;
/// Status updates for the UI thread
pub mod status;
/// Tracing and crash logging
pub mod telemetry;
