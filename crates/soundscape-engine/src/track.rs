//! Per-track playback scheduling.
//!
//! Each track runs a decision loop on its own thread, polled every 200 ms:
//! that interval is the resolution of randomness for the whole soundscape.
//! On every tick the loop decides, from the track's mode, its enabled flag,
//! and the channel's busy-state, whether playback should be (re)started,
//! left alone, or stopped.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::channel::{AudioChannel, PlayMode};
use crate::sound::Sound;

/// Poll interval of the decision loop.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Per-track playback settings.
///
/// Immutable once the track is loaded; only the volume has a live-mutable
/// counterpart (the sound's gain).
#[derive(Clone, Debug, PartialEq)]
pub struct TrackSettings {
    /// Loop continuously while enabled. Randomization is ignored when set.
    pub loop_mode: bool,
    /// Randomized one-shot trigger threshold, used only when not looping.
    /// Each idle tick draws from `[0, randomize]` and triggers on a hit, so
    /// the per-tick probability is 1/(randomize+1). Zero selects the
    /// every-tick one-shot fallback.
    pub randomize: u32,
    /// Initial gain, 0.0 to 1.0.
    pub volume: f32,
    /// Fade-in length as a scale of the asset duration; see
    /// [`fade_in_duration`].
    pub fadein_percent: u32,
}

impl Default for TrackSettings {
    fn default() -> Self {
        TrackSettings {
            loop_mode: true,
            randomize: 1,
            volume: 1.0,
            fadein_percent: 10,
        }
    }
}

/// Fade-in time derived from the asset duration.
///
/// Computed as `seconds * 10 * fadein_percent`, read as milliseconds: a
/// percent of 10 on a 5-second asset yields a 500 ms fade. The scale is kept
/// exactly as-is for compatibility with existing track settings.
pub fn fade_in_duration(asset_duration: Duration, fadein_percent: u32) -> Duration {
    Duration::from_millis((asset_duration.as_secs_f64() * 10.0 * fadein_percent as f64) as u64)
}

/// Flags shared between the controller thread and the decision loop.
struct Flags {
    /// Whether the sound should be playing right now.
    enabled: bool,
    /// Cleared exactly once to request loop termination; never set back.
    alive: bool,
}

struct TrackState {
    flags: Mutex<Flags>,
    wake: Condvar,
}

/// One sound layer with its own dedicated channel, settings, and decision
/// loop.
///
/// Created when a track is loaded, started explicitly (the loop is never
/// started twice), and torn down via [`terminate`](Self::terminate) +
/// [`join`](Self::join) during shutdown or replacement.
pub struct TrackScheduler {
    name: String,
    sound: Sound,
    channel: Arc<dyn AudioChannel>,
    settings: TrackSettings,
    fade_in: Duration,
    state: Arc<TrackState>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl TrackScheduler {
    /// Create a scheduler for a loaded sound on its dedicated channel.
    ///
    /// The sound's gain is synced to `settings.volume` before the first
    /// play. Tracks start enabled.
    pub fn new(
        channel: Arc<dyn AudioChannel>,
        sound: Sound,
        name: impl Into<String>,
        settings: TrackSettings,
    ) -> Self {
        sound.set_gain(settings.volume);
        let fade_in = fade_in_duration(sound.duration(), settings.fadein_percent);
        TrackScheduler {
            name: name.into(),
            sound,
            channel,
            settings,
            fade_in,
            state: Arc::new(TrackState {
                flags: Mutex::new(Flags {
                    enabled: true,
                    alive: true,
                }),
                wake: Condvar::new(),
            }),
            thread: None,
        }
    }

    /// Track display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Settings the track was loaded with.
    pub fn settings(&self) -> &TrackSettings {
        &self.settings
    }

    /// Precomputed fade-in length.
    pub fn fade_in(&self) -> Duration {
        self.fade_in
    }

    /// Spawn the decision loop. Does nothing if it was already started.
    pub fn start(&mut self) {
        if self.thread.is_some() {
            return;
        }
        let runner = Runner {
            sound: self.sound.clone(),
            channel: Arc::clone(&self.channel),
            settings: self.settings.clone(),
            fade_in: self.fade_in,
            state: Arc::clone(&self.state),
        };
        self.thread = Some(std::thread::spawn(move || runner.run()));
    }

    /// Whether the decision loop has been started.
    pub fn started(&self) -> bool {
        self.thread.is_some()
    }

    /// Allow playback from the next tick on.
    pub fn enable(&self) {
        self.state.flags.lock().enabled = true;
    }

    /// Stop playback from the next tick on.
    pub fn disable(&self) {
        self.state.flags.lock().enabled = false;
    }

    /// Whether the track is currently producing audio.
    pub fn is_playing(&self) -> bool {
        self.channel.is_busy()
    }

    /// Ramp the channel down to silence without disabling the track.
    ///
    /// An enabled looping track will start over once the fade completes and
    /// the next tick finds the channel idle.
    pub fn fade_out(&self, duration: Duration) {
        self.channel.fade_out(duration);
    }

    /// Update the sound's gain immediately, playing or not.
    ///
    /// Range validation lives at the controller boundary; the scheduler
    /// applies the value as given.
    pub fn set_gain(&self, gain: f32) {
        self.sound.set_gain(gain);
    }

    /// Current gain.
    pub fn gain(&self) -> f32 {
        self.sound.gain()
    }

    /// Request loop termination; observed at the next poll boundary.
    ///
    /// Audio is not stopped here. Fade out or stop first for a quiet
    /// teardown, as the global shutdown sequence does.
    pub fn terminate(&self) {
        let mut flags = self.state.flags.lock();
        flags.alive = false;
        self.state.wake.notify_all();
    }

    /// Wait for the decision loop to exit. Call [`terminate`](Self::terminate)
    /// first.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    /// Terminate, join, and silence the channel. Used when a registry entry
    /// is replaced so no background loop or audio outlives it.
    pub(crate) fn shutdown(&mut self) {
        self.terminate();
        self.join();
        self.channel.stop();
    }
}

/// Everything the decision loop needs, moved onto its thread.
struct Runner {
    sound: Sound,
    channel: Arc<dyn AudioChannel>,
    settings: TrackSettings,
    fade_in: Duration,
    state: Arc<TrackState>,
}

impl Runner {
    fn run(self) {
        let mut rng = SmallRng::from_os_rng();

        // A looping track starts straight away.
        if self.settings.loop_mode {
            self.channel.play(&self.sound, PlayMode::Loop, self.fade_in);
        }

        loop {
            let enabled = {
                let flags = self.state.flags.lock();
                if !flags.alive {
                    break;
                }
                flags.enabled
            };

            self.tick(enabled, &mut rng);

            let mut flags = self.state.flags.lock();
            if !flags.alive {
                break;
            }
            self.state.wake.wait_for(&mut flags, POLL_INTERVAL);
            if !flags.alive {
                break;
            }
        }
    }

    /// One scheduling decision.
    fn tick(&self, enabled: bool, rng: &mut SmallRng) {
        if self.settings.loop_mode {
            // Looping wins over randomization outright.
            if !enabled {
                self.channel.stop();
            } else if !self.channel.is_busy() {
                self.channel.play(&self.sound, PlayMode::Loop, self.fade_in);
            }
        } else if self.settings.randomize > 0 {
            if enabled && !self.channel.is_busy() {
                let chance = rng.random_range(0..=self.settings.randomize);
                if chance == self.settings.randomize {
                    self.channel.play(&self.sound, PlayMode::Once, self.fade_in);
                }
            } else if !enabled {
                self.channel.stop();
            }
        } else {
            // Neither looping nor randomized: retrigger whenever the channel
            // falls idle. Deliberately not gated on `enabled`.
            if !self.channel.is_busy() {
                self.channel.play(&self.sound, PlayMode::Once, self.fade_in);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_in_scale() {
        // 5 s asset at a fade percent of 10 -> 500 ms
        assert_eq!(
            fade_in_duration(Duration::from_secs(5), 10),
            Duration::from_millis(500)
        );
        assert_eq!(
            fade_in_duration(Duration::from_secs(2), 50),
            Duration::from_millis(1000)
        );
        assert_eq!(fade_in_duration(Duration::from_secs(5), 0), Duration::ZERO);
        // Fractional milliseconds truncate
        assert_eq!(
            fade_in_duration(Duration::from_millis(1234), 1),
            Duration::from_millis(12)
        );
    }

    #[test]
    fn default_settings() {
        let settings = TrackSettings::default();
        assert!(settings.loop_mode);
        assert_eq!(settings.randomize, 1);
        assert_eq!(settings.volume, 1.0);
        assert_eq!(settings.fadein_percent, 10);
    }
}
