//! Practice scheduler
//!
//! Cycles through the configured keys. For each key it opens a
//! [`PlaySession`], then repeatedly picks a random degree that has not reached
//! its play target, speaks it, plays its tone, speaks the note name and waits
//! out the rest of the cycle delay.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::audio::TonePlayer;
use crate::config::{PracticeConfig, Timing};
use crate::degree::CanonicalDegree;
use crate::error::PracticeError;
use crate::key::KeyContext;
use crate::naming::name;
use crate::pitch::{pitch, AbsolutePitch};
use crate::speech::Speaker;
use super::clock::Clock;
use super::types::{PlaySession, PlayedTone, PracticeReport, State};

/// The cycle in progress
#[derive(Debug, Clone)]
struct Cycle {
    degree: CanonicalDegree,
    pitch: Option<AbsolutePitch>,
    /// Time the cycle has spent in tone playback and the tone-name delay
    accounted: Duration,
}

#[derive(Debug, Clone)]
enum Phase {
    KeySwitch,
    SelectDegree,
    Speaking(Cycle),
    Tone(Cycle),
    Naming(Cycle),
    Waiting(Cycle),
    Done,
}

/// Scheduler state: owns the key list, the active session and the RNG.
pub struct Scheduler<R: Rng> {
    keys: Vec<KeyContext>,
    degrees: Vec<CanonicalDegree>,
    plays_per_key: u32,
    repeat_keys: bool,
    timing: Timing,
    tone_amplitude: f64,
    next_key: usize,
    session: Option<PlaySession>,
    phase: Phase,
    rng: R,
    report: PracticeReport,
}

impl<R: Rng> Scheduler<R> {
    /// Build a scheduler from already validated degrees and keys.
    pub fn new(
        degrees: Vec<CanonicalDegree>,
        keys: Vec<KeyContext>,
        config: &PracticeConfig,
        rng: R,
    ) -> Result<Self, PracticeError> {
        if degrees.is_empty() {
            return Err(PracticeError::ConfigError(
                "no scale degrees given".to_string(),
            ));
        }
        if keys.is_empty() {
            return Err(PracticeError::ConfigError("no keys given".to_string()));
        }
        Ok(Self {
            keys,
            degrees,
            plays_per_key: config.plays_per_key.max(1),
            repeat_keys: config.repeat_keys,
            timing: config.timing(),
            tone_amplitude: config.tone_amplitude,
            next_key: 0,
            session: None,
            phase: Phase::KeySwitch,
            rng,
            report: PracticeReport::default(),
        })
    }

    /// Validate every degree and key in `config`, then build the scheduler.
    pub fn from_config(config: &PracticeConfig, rng: R) -> Result<Self, PracticeError> {
        let degrees = config.degrees()?;
        let keys = config.resolved_keys()?;
        Self::new(degrees, keys, config, rng)
    }

    pub fn state(&self) -> State {
        match self.phase {
            Phase::KeySwitch => State::KeySwitch,
            Phase::SelectDegree => State::SelectDegree,
            Phase::Speaking(_) => State::Speaking,
            Phase::Tone(_) => State::Tone,
            Phase::Naming(_) => State::Naming,
            Phase::Waiting(_) => State::Waiting,
            Phase::Done => State::Done,
        }
    }

    pub fn session(&self) -> Option<&PlaySession> {
        self.session.as_ref()
    }

    pub fn report(&self) -> &PracticeReport {
        &self.report
    }

    pub fn degrees(&self) -> &[CanonicalDegree] {
        &self.degrees
    }

    pub fn keys(&self) -> &[KeyContext] {
        &self.keys
    }

    fn keys_exhausted(&self) -> bool {
        !self.repeat_keys && self.next_key >= self.keys.len()
    }

    /// Perform one state transition and return the new state.
    pub fn step(
        &mut self,
        speaker: &mut dyn Speaker,
        player: &mut dyn TonePlayer,
        clock: &mut dyn Clock,
    ) -> Result<State, PracticeError> {
        let phase = mem::replace(&mut self.phase, Phase::Done);
        self.phase = match phase {
            Phase::KeySwitch => self.switch_key(speaker, clock)?,
            Phase::SelectDegree => self.select_degree(),
            Phase::Speaking(cycle) => {
                speaker.speak(&cycle.degree.speakable())?;
                Phase::Tone(cycle)
            }
            Phase::Tone(cycle) => self.play_tone(cycle, player, clock)?,
            Phase::Naming(cycle) => self.name_note(cycle, speaker)?,
            Phase::Waiting(cycle) => {
                self.wait_out_cycle(&cycle, clock);
                Phase::SelectDegree
            }
            Phase::Done => Phase::Done,
        };
        Ok(self.state())
    }

    /// Step until Done, or until `stop` is set when a cycle boundary is reached.
    pub fn run(
        &mut self,
        speaker: &mut dyn Speaker,
        player: &mut dyn TonePlayer,
        clock: &mut dyn Clock,
        stop: &AtomicBool,
    ) -> Result<PracticeReport, PracticeError> {
        loop {
            match self.state() {
                State::Done => break,
                State::KeySwitch | State::SelectDegree if stop.load(Ordering::SeqCst) => {
                    info!("Practice stopped by user");
                    self.report.interrupted = true;
                    self.phase = Phase::Done;
                    break;
                }
                _ => {
                    self.step(speaker, player, clock)?;
                }
            }
        }
        Ok(self.report.clone())
    }

    fn switch_key(
        &mut self,
        speaker: &mut dyn Speaker,
        clock: &mut dyn Clock,
    ) -> Result<Phase, PracticeError> {
        if self.keys_exhausted() {
            return Ok(Phase::Done);
        }
        if self.next_key >= self.keys.len() {
            self.next_key = 0;
        }
        let key = self.keys[self.next_key].clone();
        self.next_key += 1;

        info!(
            key = %key.name,
            root_midi = key.root_midi(),
            plays_per_key = self.plays_per_key,
            "Activated key"
        );
        speaker.speak(&format!("New key: {}", key.spoken_name()))?;
        clock.sleep(self.timing.announce_delay);

        self.session = Some(PlaySession::new(
            key,
            self.degrees.clone(),
            self.plays_per_key,
        ));
        Ok(Phase::SelectDegree)
    }

    fn select_degree(&mut self) -> Phase {
        let Some(session) = self.session.as_ref() else {
            return Phase::KeySwitch;
        };

        if session.is_complete() {
            info!(key = %session.key.name, "Key session complete");
            self.report.sessions_completed += 1;
            self.session = None;
            return if self.keys_exhausted() {
                Phase::Done
            } else {
                Phase::KeySwitch
            };
        }

        let eligible = session.eligible();
        let degree = match eligible.choose(&mut self.rng) {
            Some(degree) => (*degree).clone(),
            None => return Phase::KeySwitch,
        };
        debug!(
            degree = %degree,
            original = %degree.original_text(),
            key = %session.key.name,
            "Selected degree"
        );
        Phase::Speaking(Cycle {
            degree,
            pitch: None,
            accounted: Duration::ZERO,
        })
    }

    fn play_tone(
        &mut self,
        mut cycle: Cycle,
        player: &mut dyn TonePlayer,
        clock: &mut dyn Clock,
    ) -> Result<Phase, PracticeError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(Phase::KeySwitch);
        };

        let tone = pitch(&cycle.degree, &session.key);
        if !tone.in_midi_range() {
            warn!(
                "Calculated MIDI note {} is out of standard range (0-127)",
                tone.midi_number
            );
        }

        player.play(
            tone.frequency_hz,
            self.timing.tone_duration.as_secs_f64(),
            self.tone_amplitude,
        )?;
        clock.sleep(self.timing.tone_duration);
        session.record(&cycle.degree);
        debug!(
            degree = %cycle.degree,
            count = session.count(&cycle.degree),
            target = session.target_plays,
            "Play count"
        );

        clock.sleep(self.timing.tone_name_delay);
        cycle.accounted += self.timing.tone_duration + self.timing.tone_name_delay;
        cycle.pitch = Some(tone);
        Ok(Phase::Naming(cycle))
    }

    fn name_note(
        &mut self,
        cycle: Cycle,
        speaker: &mut dyn Speaker,
    ) -> Result<Phase, PracticeError> {
        let Some(session) = self.session.as_ref() else {
            return Ok(Phase::KeySwitch);
        };
        let Some(tone) = cycle.pitch else {
            return Ok(Phase::Waiting(cycle));
        };

        let note_name = name(&tone, &cycle.degree, &session.key);
        speaker.speak(&note_name)?;

        info!(
            key = %session.key.name,
            degree = %cycle.degree,
            midi = tone.midi_number,
            frequency = %format!("{:.2}", tone.frequency_hz),
            note = %note_name,
            "Played"
        );
        self.report.tones.push(PlayedTone {
            key: session.key.name.clone(),
            degree: cycle.degree.to_string(),
            midi_number: tone.midi_number,
            frequency_hz: tone.frequency_hz,
            note_name,
        });
        Ok(Phase::Waiting(cycle))
    }

    fn wait_out_cycle(&self, cycle: &Cycle, clock: &mut dyn Clock) {
        let delay = self.timing.cycle_delay;
        if cycle.accounted > delay {
            warn!(
                "Target cycle delay ({:.2}s) is less than time taken for audio events ({:.2}s). Effective delay will be longer.",
                delay.as_secs_f64(),
                cycle.accounted.as_secs_f64()
            );
        }
        let remaining = delay.saturating_sub(cycle.accounted);
        if !remaining.is_zero() {
            clock.sleep(remaining);
        }
    }
}
