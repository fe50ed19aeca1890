//! Decoded sound assets with live-settable gain.
//!
//! A `Sound` is fully decoded at load time so its duration is known up front
//! and playback never touches the filesystem. The gain is stored as f32 bits
//! in an atomic shared with any in-flight playback source, so volume changes
//! land immediately, mid-play included.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// A decoded, fixed-duration audio asset.
///
/// Clones are cheap and share both the sample data and the gain, matching the
/// one-asset-many-plays model of the track scheduler: the gain belongs to the
/// sound, not to any particular playback, so it persists across plays.
#[derive(Clone)]
pub struct Sound {
    samples: Arc<Vec<f32>>,
    channels: u16,
    sample_rate: u32,
    gain: Arc<AtomicU32>,
}

impl Sound {
    /// Build a sound from raw interleaved f32 samples.
    pub fn from_samples(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        Sound {
            samples: Arc::new(samples),
            channels,
            sample_rate,
            gain: Arc::new(AtomicU32::new(1.0f32.to_bits())),
        }
    }

    /// Load and fully decode a sound file (WAV, OGG/Vorbis, FLAC, MP3).
    ///
    /// # Errors
    /// `AssetLoad` when the file cannot be opened, decoded, or contains no
    /// audio frames. Nothing is registered on failure.
    #[cfg(feature = "playback")]
    pub fn load(path: &std::path::Path) -> crate::Result<Self> {
        use crate::SoundscapeError;
        use rodio::Source;

        let file = std::fs::File::open(path)
            .map_err(|e| SoundscapeError::asset_load(path.display().to_string(), e.to_string()))?;
        let decoder = rodio::Decoder::new(std::io::BufReader::new(file))
            .map_err(|e| SoundscapeError::asset_load(path.display().to_string(), e.to_string()))?;

        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<f32> = decoder.convert_samples().collect();

        if samples.is_empty() {
            return Err(SoundscapeError::asset_load(
                path.display().to_string(),
                "no audio frames",
            ));
        }

        Ok(Sound::from_samples(samples, channels, sample_rate))
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Samples per second, per channel.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Asset length, derived from the decoded frame count.
    pub fn duration(&self) -> Duration {
        let frames = self.samples.len() as u64 / self.channels.max(1) as u64;
        Duration::from_secs_f64(frames as f64 / self.sample_rate.max(1) as f64)
    }

    /// Current gain (0.0 to 1.0).
    pub fn gain(&self) -> f32 {
        f32::from_bits(self.gain.load(Ordering::Relaxed))
    }

    /// Set the gain of the sound, absolute rather than relative to the
    /// current gain. Applies to in-flight playback immediately.
    ///
    /// Range validation lives at the controller boundary; the sound stores
    /// the value as given.
    pub fn set_gain(&self, gain: f32) {
        self.gain.store(gain.to_bits(), Ordering::Relaxed);
    }

    /// Shared sample storage, handed to playback sources.
    pub(crate) fn samples(&self) -> Arc<Vec<f32>> {
        Arc::clone(&self.samples)
    }

    /// Shared gain cell, handed to playback sources.
    pub(crate) fn gain_bits(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.gain)
    }
}

impl std::fmt::Debug for Sound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sound")
            .field("samples", &self.samples.len())
            .field("channels", &self.channels)
            .field("sample_rate", &self.sample_rate)
            .field("gain", &self.gain())
            .finish()
    }
}
