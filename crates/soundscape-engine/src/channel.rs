//! Dedicated output channels.
//!
//! Every track owns exactly one channel, so a looping or randomized sound can
//! never overlap itself and the scheduler only ever asks "is my channel
//! busy". `AudioChannel` is the seam between the scheduler and the audio
//! backend; `RodioChannel` is the rodio-backed implementation behind the
//! `playback` feature.

use std::time::Duration;

use crate::sound::Sound;

/// How a playback request should repeat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayMode {
    /// Repeat indefinitely until stopped.
    Loop,
    /// Play through once.
    Once,
}

/// A dedicated output lane for a single track.
///
/// All operations are infallible at this layer: backend failures surface when
/// the output device is opened, not per call. Implementations must be safe to
/// call concurrently from the scheduler thread and the controller thread.
pub trait AudioChannel: Send + Sync + std::fmt::Debug {
    /// Start playback of `sound`, replacing whatever the channel was doing.
    /// A nonzero `fade_in` ramps the new playback up from silence.
    fn play(&self, sound: &Sound, mode: PlayMode, fade_in: Duration);

    /// Stop playback. Idempotent.
    fn stop(&self);

    /// Ramp the current playback down to silence over `duration`, then stop.
    /// No-op if the channel is idle.
    fn fade_out(&self, duration: Duration);

    /// Whether the channel currently has unfinished audio.
    fn is_busy(&self) -> bool;
}

#[cfg(feature = "playback")]
pub use self::rodio_backend::RodioChannel;

#[cfg(feature = "playback")]
mod rodio_backend {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;
    use rodio::{OutputStreamHandle, Sink, Source};

    use super::{AudioChannel, PlayMode};
    use crate::sound::Sound;

    /// Steps in a fade-out ramp.
    const FADE_OUT_STEPS: u32 = 20;

    /// Playback source over a decoded sound.
    ///
    /// Reads the sound's shared gain per sample so volume changes land
    /// mid-play, and wraps around for looping playback.
    struct SoundSource {
        samples: Arc<Vec<f32>>,
        channels: u16,
        sample_rate: u32,
        gain: Arc<AtomicU32>,
        pos: usize,
        looping: bool,
    }

    impl SoundSource {
        fn new(sound: &Sound, mode: PlayMode) -> Self {
            SoundSource {
                samples: sound.samples(),
                channels: sound.channels(),
                sample_rate: sound.sample_rate(),
                gain: sound.gain_bits(),
                pos: 0,
                looping: mode == PlayMode::Loop,
            }
        }
    }

    impl Iterator for SoundSource {
        type Item = f32;

        fn next(&mut self) -> Option<f32> {
            if self.pos >= self.samples.len() {
                if !self.looping || self.samples.is_empty() {
                    return None;
                }
                self.pos = 0;
            }
            let gain = f32::from_bits(self.gain.load(Ordering::Relaxed));
            let sample = self.samples[self.pos] * gain;
            self.pos += 1;
            Some(sample)
        }
    }

    impl Source for SoundSource {
        fn current_frame_len(&self) -> Option<usize> {
            None
        }

        fn channels(&self) -> u16 {
            self.channels
        }

        fn sample_rate(&self) -> u32 {
            self.sample_rate
        }

        fn total_duration(&self) -> Option<Duration> {
            if self.looping {
                None
            } else {
                let frames = self.samples.len() as u64 / self.channels.max(1) as u64;
                Some(Duration::from_secs_f64(
                    frames as f64 / self.sample_rate.max(1) as f64,
                ))
            }
        }
    }

    /// A rodio-backed output lane.
    ///
    /// The sink is recreated on every `play` so a stopped channel can always
    /// be restarted. `fade_epoch` counts ownership changes of the sink; a
    /// fade-out thread holding a stale epoch backs off instead of touching
    /// audio a newer `play` or `stop` now owns.
    pub struct RodioChannel {
        handle: OutputStreamHandle,
        id: usize,
        sink: Mutex<Option<Arc<Sink>>>,
        fade_epoch: Arc<AtomicU64>,
    }

    impl std::fmt::Debug for RodioChannel {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RodioChannel").field("id", &self.id).finish()
        }
    }

    impl RodioChannel {
        pub(crate) fn new(handle: OutputStreamHandle, id: usize) -> Self {
            RodioChannel {
                handle,
                id,
                sink: Mutex::new(None),
                fade_epoch: Arc::new(AtomicU64::new(0)),
            }
        }

        /// Channel id assigned by the mixer.
        pub fn id(&self) -> usize {
            self.id
        }
    }

    impl AudioChannel for RodioChannel {
        fn play(&self, sound: &Sound, mode: PlayMode, fade_in: Duration) {
            let mut slot = self.sink.lock();
            self.fade_epoch.fetch_add(1, Ordering::SeqCst);
            if let Some(old) = slot.take() {
                old.stop();
            }

            // Channel operations are infallible by contract; with a dead
            // output stream the channel simply stays idle.
            let Ok(sink) = Sink::try_new(&self.handle) else {
                return;
            };

            let source = SoundSource::new(sound, mode);
            if fade_in.is_zero() {
                sink.append(source);
            } else {
                sink.append(source.fade_in(fade_in));
            }
            *slot = Some(Arc::new(sink));
        }

        fn stop(&self) {
            let mut slot = self.sink.lock();
            self.fade_epoch.fetch_add(1, Ordering::SeqCst);
            if let Some(sink) = slot.take() {
                sink.stop();
            }
        }

        fn fade_out(&self, duration: Duration) {
            // Claim the token under the lock so it is tied to this sink
            let (sink, token) = {
                let slot = self.sink.lock();
                match slot.as_ref() {
                    Some(sink) if !sink.empty() => (
                        Arc::clone(sink),
                        self.fade_epoch.fetch_add(1, Ordering::SeqCst) + 1,
                    ),
                    _ => return,
                }
            };

            let epoch = Arc::clone(&self.fade_epoch);
            let start_volume = sink.volume();
            let step = duration / FADE_OUT_STEPS;

            std::thread::spawn(move || {
                for i in 1..=FADE_OUT_STEPS {
                    std::thread::sleep(step);
                    if epoch.load(Ordering::SeqCst) != token {
                        // A newer play or stop owns the sink now.
                        return;
                    }
                    let remaining = 1.0 - i as f32 / FADE_OUT_STEPS as f32;
                    sink.set_volume(start_volume * remaining);
                }
                if epoch.load(Ordering::SeqCst) == token {
                    sink.stop();
                }
            });
        }

        fn is_busy(&self) -> bool {
            let slot = self.sink.lock();
            slot.as_ref().map(|sink| !sink.empty()).unwrap_or(false)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn sound_source_applies_gain_per_sample() {
            let sound = Sound::from_samples(vec![1.0, -1.0, 0.5, -0.5], 1, 44100);
            sound.set_gain(0.5);

            let mut source = SoundSource::new(&sound, PlayMode::Once);
            assert_eq!(source.next(), Some(0.5));

            // Gain change lands on the very next sample
            sound.set_gain(1.0);
            assert_eq!(source.next(), Some(-1.0));
        }

        #[test]
        fn sound_source_once_ends_after_samples() {
            let sound = Sound::from_samples(vec![0.1, 0.2], 1, 44100);
            let mut source = SoundSource::new(&sound, PlayMode::Once);
            assert!(source.next().is_some());
            assert!(source.next().is_some());
            assert_eq!(source.next(), None, "one-shot source must end");
        }

        #[test]
        fn sound_source_loop_wraps_around() {
            let sound = Sound::from_samples(vec![0.1, 0.2], 1, 44100);
            let mut source = SoundSource::new(&sound, PlayMode::Loop);
            let first: Vec<_> = (&mut source).take(5).collect();
            assert_eq!(first.len(), 5, "looping source never runs dry");
            assert_eq!(first[0], first[2]);
            assert_eq!(first[1], first[3]);
        }

        #[test]
        fn sound_source_duration_only_for_one_shot() {
            let sound = Sound::from_samples(vec![0.0; 44100], 1, 44100);
            assert!(SoundSource::new(&sound, PlayMode::Loop).total_duration().is_none());
            assert_eq!(
                SoundSource::new(&sound, PlayMode::Once).total_duration(),
                Some(Duration::from_secs(1))
            );
        }
    }
}
