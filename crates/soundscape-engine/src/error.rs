//! Error types for the soundscape engine
//!
//! Covers sound asset loading, output device management, and track
//! registry validation. Per-command failures are non-fatal by design:
//! the interactive layer reports them and keeps running.

use thiserror::Error;

/// The main error type for soundscape operations
#[derive(Error, Debug)]
pub enum SoundscapeError {
    /// Sound asset could not be opened or decoded
    #[error("Could not load sound file '{path}': {reason}")]
    AssetLoad {
        /// Path of the asset that failed to load
        path: String,
        /// Backend description of the failure
        reason: String,
    },

    /// Command referenced a track name absent from the registry
    #[error("No such track: {0}")]
    UnknownTrack(String),

    /// Volume outside the accepted range
    #[error("Volume {0} out of range (expected 0.0 to 1.0)")]
    VolumeOutOfRange(f32),

    /// Every mixer channel is already dedicated to a track
    #[error("All {limit} mixer channels are in use")]
    ChannelsExhausted {
        /// Channel capacity of the mixer
        limit: usize,
    },

    /// Error acquiring or using the audio output device
    #[error("Audio device error: {0}")]
    AudioDevice(String),
}

impl SoundscapeError {
    /// Creates an asset load error with path and reason
    pub fn asset_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SoundscapeError::AssetLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an audio device error
    pub fn audio_device(reason: impl Into<String>) -> Self {
        SoundscapeError::AudioDevice(reason.into())
    }
}

/// Type alias for Result using SoundscapeError
pub type Result<T> = std::result::Result<T, SoundscapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_load_message_carries_path() {
        let err = SoundscapeError::asset_load("data/wind.ogg", "unsupported container");
        let message = err.to_string();
        assert!(message.contains("data/wind.ogg"));
        assert!(message.contains("unsupported container"));
    }

    #[test]
    fn unknown_track_message_names_track() {
        let err = SoundscapeError::UnknownTrack("thunder".into());
        assert_eq!(err.to_string(), "No such track: thunder");
    }
}
