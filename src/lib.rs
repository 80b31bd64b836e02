pub mod audio;
pub mod config;
pub mod degree;
pub mod error;
pub mod key;
pub mod naming;
pub mod pitch;
pub mod playback;
pub mod speech;

pub use config::PracticeConfig;
pub use degree::{normalize, unique_degrees, Accidental, CanonicalDegree, DegreeId};
pub use error::*;
pub use key::{resolve, KeyContext, Mode};
pub use naming::name;
pub use pitch::{pitch, AbsolutePitch};
pub use playback::{PracticeReport, Scheduler, State};

use std::sync::atomic::AtomicBool;

use rand::rngs::StdRng;
use rand::SeedableRng;

use audio::RecordingTonePlayer;
use playback::ManualClock;
use speech::TranscriptSpeaker;

/// Seeded RNG when `config.seed` is set, entropy-seeded otherwise
pub fn practice_rng(config: &PracticeConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Validate `config` and run the whole drill silently, without sleeping.
/// Returns the report and everything that would have been spoken.
pub fn dry_run(config: &PracticeConfig) -> Result<(PracticeReport, Vec<String>), PracticeError> {
    if config.repeat_keys {
        return Err(PracticeError::ConfigError(
            "a dry run cannot loop over the keys forever".to_string(),
        ));
    }
    let mut scheduler = Scheduler::from_config(config, practice_rng(config))?;
    let mut speaker = TranscriptSpeaker::default();
    let report = scheduler.run(
        &mut speaker,
        &mut RecordingTonePlayer::default(),
        &mut ManualClock::default(),
        &AtomicBool::new(false),
    )?;
    Ok((report, speaker.transcript))
}
