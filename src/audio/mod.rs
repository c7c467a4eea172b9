//! Audio capture
//!
//! The capture device is an external collaborator consumed through the
//! `AudioBackend` trait: start a capture, receive fixed-format PCM frames
//! over a channel, stop the capture. The shipped implementation reads the
//! microphone through cpal.

mod backend;
mod microphone;

pub use backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame};
pub use microphone::MicrophoneBackend;
