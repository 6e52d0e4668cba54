/// Microphone input stream and chunk plumbing
pub mod capture;

pub use capture::{AudioError, CaptureStream, ChunkBlocker};
