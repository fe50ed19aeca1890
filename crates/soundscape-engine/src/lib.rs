//! Layered ambient soundscape engine.
//!
//! Plays multiple looping or randomly-triggered sound layers ("tracks")
//! concurrently to build a soundscape. Each track owns a dedicated output
//! channel plus a decision loop on its own thread, polled every 200 ms, that
//! starts, restarts, or stops playback from the track's mode, its enabled
//! flag, and the channel's busy-state.
//!
//! # Architecture
//! - [`Sound`]: a fully decoded asset with a live-settable gain.
//! - [`AudioChannel`]: the dedicated output lane a track plays through;
//!   [`RodioChannel`] is the rodio-backed implementation.
//! - [`Mixer`]: owns the output device and hands out channels;
//!   [`RodioMixer`] is the rodio-backed implementation.
//! - [`TrackScheduler`]: one sound layer and its decision loop.
//! - [`Soundscape`]: the name-keyed registry orchestrating begin/start/stop
//!   and graceful shutdown.
//!
//! # Crate feature flags
//! - `playback` (default): rodio-backed output device, channels, and sound
//!   decoding. Without it the crate still provides the scheduler, the
//!   `AudioChannel`/`Mixer` seams, and in-memory sounds — enough to drive
//!   the engine from tests or an alternative backend.
//!
//! # Quick start
//! ```no_run
//! use soundscape_engine::{RodioMixer, Soundscape, TrackSettings};
//! use std::path::Path;
//!
//! let mixer = RodioMixer::new().expect("audio device");
//! let mut scape = Soundscape::new(Box::new(mixer));
//! scape
//!     .load_track(Path::new("data/wind.ogg"), "wind", TrackSettings::default())
//!     .expect("load track");
//! scape.begin();
//! // ... later
//! scape.quit();
//! ```

#![warn(missing_docs)]

pub mod channel;
pub mod controller;
pub mod error;
pub mod mixer;
pub mod sound;
pub mod track;

#[cfg(feature = "playback")]
pub use channel::RodioChannel;
pub use channel::{AudioChannel, PlayMode};
pub use controller::{SHUTDOWN_FADE, SHUTDOWN_GRACE, Soundscape};
pub use error::{Result, SoundscapeError};
#[cfg(feature = "playback")]
pub use mixer::RodioMixer;
pub use mixer::{DEFAULT_CHANNEL_CAPACITY, Mixer};
pub use sound::Sound;
pub use track::{POLL_INTERVAL, TrackScheduler, TrackSettings, fade_in_duration};
