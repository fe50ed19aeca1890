//! Output device ownership and channel allocation.
//!
//! The mixer owns the process-wide audio device for its whole lifetime:
//! acquired once when the soundscape is built, released exactly once when it
//! shuts down, never re-acquired. Each loaded track receives its own
//! dedicated channel, numbered from a monotonically increasing counter.

use std::sync::Arc;

use crate::Result;
use crate::channel::AudioChannel;

/// Default number of output channels a mixer reserves.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 18;

/// Factory for dedicated per-track output channels.
///
/// Implementations own the output device; dropping the mixer releases it and
/// silences everything still routed through its channels.
pub trait Mixer {
    /// Open the next dedicated channel.
    ///
    /// # Errors
    /// `ChannelsExhausted` once the fixed capacity is reached.
    fn open_channel(&mut self) -> Result<Arc<dyn AudioChannel>>;

    /// Number of channels handed out so far.
    fn channels_used(&self) -> usize;
}

#[cfg(feature = "playback")]
pub use self::rodio_backend::RodioMixer;

#[cfg(feature = "playback")]
mod rodio_backend {
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle};

    use super::{DEFAULT_CHANNEL_CAPACITY, Mixer};
    use crate::channel::{AudioChannel, RodioChannel};
    use crate::{Result, SoundscapeError};

    /// Rodio-backed mixer holding the system output stream.
    pub struct RodioMixer {
        // Keeps the device alive; all channel audio dies with it.
        _stream: OutputStream,
        handle: OutputStreamHandle,
        capacity: usize,
        next_channel: usize,
    }

    impl RodioMixer {
        /// Acquire the default output device with the default channel
        /// capacity.
        pub fn new() -> Result<Self> {
            Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
        }

        /// Acquire the default output device with a custom channel capacity.
        pub fn with_capacity(capacity: usize) -> Result<Self> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| SoundscapeError::audio_device(e.to_string()))?;
            Ok(RodioMixer {
                _stream: stream,
                handle,
                capacity,
                next_channel: 0,
            })
        }

        /// Configured channel capacity.
        pub fn capacity(&self) -> usize {
            self.capacity
        }
    }

    impl Mixer for RodioMixer {
        fn open_channel(&mut self) -> Result<Arc<dyn AudioChannel>> {
            if self.next_channel >= self.capacity {
                return Err(SoundscapeError::ChannelsExhausted {
                    limit: self.capacity,
                });
            }
            self.next_channel += 1;
            Ok(Arc::new(RodioChannel::new(
                self.handle.clone(),
                self.next_channel,
            )))
        }

        fn channels_used(&self) -> usize {
            self.next_channel
        }
    }

}
