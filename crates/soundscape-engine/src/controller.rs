//! Soundscape orchestration.
//!
//! Owns the track registry and the mixer, and drives global begin/start/stop
//! plus the graceful shutdown sequence: fade everything audible, wait for the
//! fades to complete, then terminate and join every decision loop and release
//! the output device.

use std::collections::HashMap;
use std::time::Duration;

use crate::mixer::Mixer;
use crate::sound::Sound;
use crate::track::{TrackScheduler, TrackSettings};
use crate::{Result, SoundscapeError};

/// Fade length applied to every playing track during shutdown.
pub const SHUTDOWN_FADE: Duration = Duration::from_millis(2000);

/// How long shutdown waits for fades to audibly complete before terminating
/// the decision loops. Always longer than [`SHUTDOWN_FADE`].
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(2500);

/// A set of tracks playing together, keyed by name.
pub struct Soundscape {
    tracks: HashMap<String, TrackScheduler>,
    mixer: Option<Box<dyn Mixer>>,
    begun: bool,
}

impl Soundscape {
    /// Create a soundscape over an owned mixer.
    ///
    /// The mixer, and with it the output device, is held until
    /// [`quit`](Self::quit) and released exactly once.
    pub fn new(mixer: Box<dyn Mixer>) -> Self {
        Soundscape {
            tracks: HashMap::new(),
            mixer: Some(mixer),
            begun: false,
        }
    }

    /// Load the sound file at `path` into a track registered under `name`.
    ///
    /// An empty `name` falls back to the path string. See
    /// [`add_track`](Self::add_track) for registration semantics.
    ///
    /// # Errors
    /// `AssetLoad` when the file cannot be decoded; `VolumeOutOfRange` and
    /// `ChannelsExhausted` as in `add_track`. The registry is left unchanged
    /// on failure.
    #[cfg(feature = "playback")]
    pub fn load_track(
        &mut self,
        path: &std::path::Path,
        name: &str,
        settings: TrackSettings,
    ) -> Result<()> {
        let name = if name.is_empty() {
            path.display().to_string()
        } else {
            name.to_string()
        };
        // Validate before decoding so a bad volume costs nothing.
        if !(0.0..=1.0).contains(&settings.volume) {
            return Err(SoundscapeError::VolumeOutOfRange(settings.volume));
        }
        let sound = Sound::load(path)?;
        self.add_track(sound, &name, settings)
    }

    /// Register an already-decoded sound as a track under `name`, on its own
    /// dedicated channel.
    ///
    /// Reloading an existing name first shuts the old scheduler down
    /// (terminated, joined, channel stopped), so no background loop or audio
    /// outlives its registry entry. Tracks registered after
    /// [`begin`](Self::begin) has run stay un-started: `begin` is one-shot
    /// and later calls only re-enable tracks.
    ///
    /// # Errors
    /// `VolumeOutOfRange` for a volume outside [0.0, 1.0];
    /// `ChannelsExhausted` when the mixer is out of channels; `AudioDevice`
    /// after the soundscape has shut down. The registry is left unchanged on
    /// failure.
    pub fn add_track(&mut self, sound: Sound, name: &str, settings: TrackSettings) -> Result<()> {
        if !(0.0..=1.0).contains(&settings.volume) {
            return Err(SoundscapeError::VolumeOutOfRange(settings.volume));
        }
        let mixer = self
            .mixer
            .as_mut()
            .ok_or_else(|| SoundscapeError::audio_device("output device already released"))?;
        let channel = mixer.open_channel()?;
        let scheduler = TrackScheduler::new(channel, sound, name, settings);

        if let Some(mut old) = self.tracks.remove(name) {
            old.shutdown();
        }
        self.tracks.insert(name.to_string(), scheduler);
        Ok(())
    }

    /// First call starts every registered track's decision loop; subsequent
    /// calls behave like [`start`](Self::start) instead, since a loop is
    /// never started twice.
    pub fn begin(&mut self) {
        if !self.begun {
            for track in self.tracks.values_mut() {
                track.start();
            }
            self.begun = true;
        } else {
            self.start();
        }
    }

    /// Whether [`begin`](Self::begin) has run.
    pub fn begun(&self) -> bool {
        self.begun
    }

    /// Enable every track.
    pub fn start(&mut self) {
        for track in self.tracks.values() {
            track.enable();
        }
    }

    /// Disable every track.
    pub fn stop(&mut self) {
        for track in self.tracks.values() {
            track.disable();
        }
    }

    /// Number of registered tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether no tracks are registered.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Registered track names, sorted for stable listing.
    pub fn track_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tracks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of tracks currently producing audio, sorted.
    pub fn playing(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tracks
            .values()
            .filter(|track| track.is_playing())
            .map(|track| track.name().to_string())
            .collect();
        names.sort();
        names
    }

    fn track(&self, name: &str) -> Result<&TrackScheduler> {
        self.tracks
            .get(name)
            .ok_or_else(|| SoundscapeError::UnknownTrack(name.to_string()))
    }

    /// Enable one track; playback resumes on its next tick.
    pub fn enable(&self, name: &str) -> Result<()> {
        self.track(name)?.enable();
        Ok(())
    }

    /// Disable one track; its channel stops on the next tick.
    pub fn disable(&self, name: &str) -> Result<()> {
        self.track(name)?.disable();
        Ok(())
    }

    /// Whether one track is currently producing audio.
    pub fn is_playing(&self, name: &str) -> Result<bool> {
        Ok(self.track(name)?.is_playing())
    }

    /// Fade one track out without disabling it.
    pub fn fade_out(&self, name: &str, duration: Duration) -> Result<()> {
        self.track(name)?.fade_out(duration);
        Ok(())
    }

    /// Set one track's gain. Applies immediately, playing or not.
    ///
    /// # Errors
    /// `VolumeOutOfRange` outside [0.0, 1.0]; `UnknownTrack` for an
    /// unregistered name.
    pub fn set_volume(&self, name: &str, volume: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(SoundscapeError::VolumeOutOfRange(volume));
        }
        self.track(name)?.set_gain(volume);
        Ok(())
    }

    /// One track's current gain.
    pub fn volume(&self, name: &str) -> Result<f32> {
        Ok(self.track(name)?.gain())
    }

    /// Gracefully shut the soundscape down with the standard timings:
    /// a [`SHUTDOWN_FADE`] fade on every playing track, a [`SHUTDOWN_GRACE`]
    /// wait, then terminate + join every decision loop and release the
    /// output device.
    ///
    /// Fading always precedes termination, so no track is cut off abruptly
    /// under normal shutdown.
    pub fn quit(&mut self) {
        self.quit_with_timings(SHUTDOWN_FADE, SHUTDOWN_GRACE);
    }

    /// [`quit`](Self::quit) with explicit fade and grace timings.
    pub fn quit_with_timings(&mut self, fade: Duration, grace: Duration) {
        for track in self.tracks.values() {
            if track.is_playing() {
                track.fade_out(fade);
            }
        }
        std::thread::sleep(grace);

        for track in self.tracks.values() {
            track.terminate();
        }
        for track in self.tracks.values_mut() {
            track.join();
        }

        // Device released here, exactly once; begin/add_track are dead ends
        // from now on.
        self.mixer = None;
    }
}
