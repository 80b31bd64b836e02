//! # Playback Module
//!
//! The practice scheduler: key cycling, per-key play counting, random degree
//! selection and the speak / tone / name / wait sequence.
//!
//! ## Sub-modules
//! - `types` - State, PlaySession, PlayedTone, PracticeReport
//! - `engine` - The [`Scheduler`] state machine
//! - `clock` - Sleep seam ([`SystemClock`] for real runs, [`ManualClock`] for dry runs and tests)
//!
//! ## Cycle
//! ```text
//! KeySwitch ──► SelectDegree ──► Speaking ──► Tone ──► Naming ──► Waiting
//!     ▲              │  ▲                                            │
//!     └── complete ──┘  └────────────────────────────────────────────┘
//!                    │
//!                    └── last key complete ──► Done
//! ```
//!
//! ## Timing
//! Each cycle aims at the configured delay. Tone duration and the tone-name
//! delay are counted against it; spoken audio is not. When the counted time
//! already exceeds the delay, Waiting does not sleep at all.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::AtomicBool;
//!
//! use degree_drill::audio::RecordingTonePlayer;
//! use degree_drill::config::{PracticeConfig, RawConfig, TokenList};
//! use degree_drill::playback::{ManualClock, Scheduler};
//! use degree_drill::speech::TranscriptSpeaker;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut config = PracticeConfig::default();
//! config.apply(RawConfig {
//!     elements: Some(TokenList::Csv("1,3,5".to_string())),
//!     keys: Some(TokenList::Csv("C".to_string())),
//!     ..Default::default()
//! });
//!
//! let mut scheduler = Scheduler::from_config(&config, StdRng::seed_from_u64(1)).unwrap();
//! let report = scheduler
//!     .run(
//!         &mut TranscriptSpeaker::default(),
//!         &mut RecordingTonePlayer::default(),
//!         &mut ManualClock::default(),
//!         &AtomicBool::new(false),
//!     )
//!     .unwrap();
//!
//! let mut midi: Vec<i32> = report.tones.iter().map(|t| t.midi_number).collect();
//! midi.sort();
//! assert_eq!(midi, vec![60, 64, 67]);
//! ```

mod clock;
mod engine;
mod types;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::Scheduler;
pub use types::{PlaySession, PlayedTone, PracticeReport, State};
