use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;
use crate::audio::{RecordingTonePlayer, TonePlayer};
use crate::config::{PracticeConfig, RawConfig, TokenList};
use crate::error::{Capability, PracticeError};
use crate::speech::{Speaker, TranscriptSpeaker};

fn config(elements: &str, keys: &str, plays_per_key: i64) -> PracticeConfig {
    let mut config = PracticeConfig::default();
    config.apply(RawConfig {
        elements: Some(TokenList::Csv(elements.to_string())),
        keys: Some(TokenList::Csv(keys.to_string())),
        plays_per_key: Some(plays_per_key),
        ..Default::default()
    });
    config
}

fn scheduler(config: &PracticeConfig, seed: u64) -> Scheduler<StdRng> {
    Scheduler::from_config(config, StdRng::seed_from_u64(seed)).unwrap()
}

fn run_silently(config: &PracticeConfig, seed: u64) -> (PracticeReport, Vec<String>, ManualClock) {
    let mut scheduler = scheduler(config, seed);
    let mut speaker = TranscriptSpeaker::default();
    let mut clock = ManualClock::default();
    let report = scheduler
        .run(
            &mut speaker,
            &mut RecordingTonePlayer::default(),
            &mut clock,
            &AtomicBool::new(false),
        )
        .unwrap();
    (report, speaker.transcript, clock)
}

#[test]
fn test_one_three_five_in_c() {
    let (report, _, _) = run_silently(&config("1,3,5", "C", 1), 7);

    assert_eq!(report.tones.len(), 3);
    assert_eq!(report.sessions_completed, 1);
    assert!(!report.interrupted);

    let by_midi: HashMap<i32, &str> = report
        .tones
        .iter()
        .map(|t| (t.midi_number, t.note_name.as_str()))
        .collect();
    assert_eq!(by_midi.len(), 3);
    assert_eq!(by_midi[&60], "C");
    assert_eq!(by_midi[&64], "E");
    assert_eq!(by_midi[&67], "G");
}

#[test]
fn test_flat_seven_in_c() {
    let (report, transcript, _) = run_silently(&config("flat 7", "C", 1), 1);

    assert_eq!(report.tones.len(), 1);
    assert_eq!(report.tones[0].midi_number, 58);
    assert_eq!(report.tones[0].note_name, "B flat");
    assert_eq!(report.tones[0].degree, "flat 7");
    assert_eq!(transcript, vec!["New key: C", "flat seven", "B flat"]);
}

#[test]
fn test_session_completes_after_every_degree_reaches_target() {
    let config = config("1,b3,5", "C,F", 2);
    let mut scheduler = scheduler(&config, 42);
    let mut speaker = TranscriptSpeaker::default();
    let mut player = RecordingTonePlayer::default();
    let mut clock = ManualClock::default();

    let mut tones_in_c = 0;
    loop {
        let state = scheduler.step(&mut speaker, &mut player, &mut clock).unwrap();
        if let Some(session) = scheduler.session() {
            for degree in &session.unique_degrees {
                assert!(session.count(degree) <= 2);
            }
            if session.key.name == "F" {
                break;
            }
            if state == State::Naming {
                tones_in_c += 1;
            }
            if session.is_complete() {
                assert!(session
                    .unique_degrees
                    .iter()
                    .all(|d| session.count(d) == 2));
            }
        }
        assert_ne!(state, State::Done);
    }

    assert_eq!(tones_in_c, 6);
    assert_eq!(player.played.len(), 6);
    assert_eq!(scheduler.report().sessions_completed, 1);
}

#[test]
fn test_two_keys_play_each_session_in_order() {
    let (report, transcript, _) = run_silently(&config("1,3,5", "C,F", 2), 3);

    assert_eq!(report.tones.len(), 12);
    assert_eq!(report.sessions_completed, 2);
    assert!(report.tones[..6].iter().all(|t| t.key == "C"));
    assert!(report.tones[6..].iter().all(|t| t.key == "F"));
    assert_eq!(transcript[0], "New key: C");
    assert!(transcript.contains(&"New key: F".to_string()));
}

#[test]
fn test_duplicate_spellings_count_once() {
    let (report, _, _) = run_silently(&config("b3, flat 3, FLAT3", "C", 1), 5);
    assert_eq!(report.tones.len(), 1);
    assert_eq!(report.tones[0].midi_number, 63);
    assert_eq!(report.tones[0].note_name, "E flat");
}

#[test]
fn test_single_cycle_state_sequence() {
    let config = config("3", "F", 1);
    let mut scheduler = scheduler(&config, 0);
    let mut speaker = TranscriptSpeaker::default();
    let mut player = RecordingTonePlayer::default();
    let mut clock = ManualClock::default();

    assert_eq!(scheduler.state(), State::KeySwitch);
    let mut states = Vec::new();
    loop {
        let state = scheduler.step(&mut speaker, &mut player, &mut clock).unwrap();
        states.push(state);
        if state == State::Done {
            break;
        }
    }
    assert_eq!(
        states,
        vec![
            State::SelectDegree,
            State::Speaking,
            State::Tone,
            State::Naming,
            State::Waiting,
            State::SelectDegree,
            State::Done,
        ]
    );
    assert_eq!(speaker.transcript, vec!["New key: F", "three", "A"]);

    // Done is terminal
    assert_eq!(
        scheduler.step(&mut speaker, &mut player, &mut clock).unwrap(),
        State::Done
    );
}

#[test]
fn test_cycle_waits_out_remaining_delay() {
    let (_, _, clock) = run_silently(&config("1", "C", 1), 0);
    // announce, tone, tone-name delay, remainder of the 3s cycle
    assert_eq!(
        clock.sleeps,
        vec![
            Duration::from_secs(2),
            Duration::from_millis(500),
            Duration::from_secs(1),
            Duration::from_millis(1500),
        ]
    );
}

#[test]
fn test_short_delay_clamps_to_no_wait() {
    let mut config = config("1", "C", 1);
    config.apply(RawConfig {
        delay: Some(1.0),
        ..Default::default()
    });
    let (_, _, clock) = run_silently(&config, 0);
    assert_eq!(
        clock.sleeps,
        vec![
            Duration::from_secs(2),
            Duration::from_millis(500),
            Duration::from_secs(1),
        ]
    );
}

#[test]
fn test_tone_requests_use_fixed_duration_and_amplitude() {
    let config = config("5", "A", 1);
    let mut scheduler = scheduler(&config, 0);
    let mut player = RecordingTonePlayer::default();
    scheduler
        .run(
            &mut TranscriptSpeaker::default(),
            &mut player,
            &mut ManualClock::default(),
            &AtomicBool::new(false),
        )
        .unwrap();
    assert_eq!(player.played.len(), 1);
    let tone = player.played[0];
    assert_eq!(tone.duration_sec, 0.5);
    assert_eq!(tone.amplitude, 0.3);
    // E5 = MIDI 76
    assert!((tone.frequency_hz - 659.255).abs() < 1e-3);
}

#[test]
fn test_same_seed_same_order() {
    let config = config("1,2,3,4,5,6,7", "C", 1);
    let (a, _, _) = run_silently(&config, 99);
    let (b, _, _) = run_silently(&config, 99);
    assert_eq!(a, b);
}

#[test]
fn test_stop_before_start() {
    let config = config("1,3,5", "C", 1);
    let mut scheduler = scheduler(&config, 0);
    let mut speaker = TranscriptSpeaker::default();
    let report = scheduler
        .run(
            &mut speaker,
            &mut RecordingTonePlayer::default(),
            &mut ManualClock::default(),
            &AtomicBool::new(true),
        )
        .unwrap();
    assert!(report.interrupted);
    assert!(report.tones.is_empty());
    assert!(speaker.transcript.is_empty());
    assert_eq!(scheduler.state(), State::Done);
}

/// Raises the stop flag once a note name has been spoken
struct StoppingSpeaker {
    stop: Arc<AtomicBool>,
    spoken: usize,
}

impl Speaker for StoppingSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), PracticeError> {
        self.spoken += 1;
        if text == "E" {
            self.stop.store(true, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[test]
fn test_stop_takes_effect_at_cycle_boundary() {
    let config = config("3", "C,D,E", 1);
    let stop = Arc::new(AtomicBool::new(false));
    let mut speaker = StoppingSpeaker {
        stop: Arc::clone(&stop),
        spoken: 0,
    };
    let mut scheduler = scheduler(&config, 0);
    let report = scheduler
        .run(
            &mut speaker,
            &mut RecordingTonePlayer::default(),
            &mut ManualClock::default(),
            &stop,
        )
        .unwrap();
    // the cycle that named "E" finishes, nothing after it starts
    assert!(report.interrupted);
    assert_eq!(report.tones.len(), 1);
    assert_eq!(speaker.spoken, 3);
}

#[test]
fn test_repeat_keys_cycles_back_to_first_key() {
    let mut config = config("1", "C,G", 1);
    config.apply(RawConfig {
        repeat_keys: Some(true),
        ..Default::default()
    });
    let mut scheduler = scheduler(&config, 0);
    let mut speaker = TranscriptSpeaker::default();
    let mut player = RecordingTonePlayer::default();
    let mut clock = ManualClock::default();

    while scheduler.report().tones.len() < 5 {
        let state = scheduler.step(&mut speaker, &mut player, &mut clock).unwrap();
        assert_ne!(state, State::Done);
    }
    let keys: Vec<&str> = scheduler
        .report()
        .tones
        .iter()
        .map(|t| t.key.as_str())
        .collect();
    assert_eq!(keys, vec!["C", "G", "C", "G", "C"]);
}

struct BrokenPlayer;

impl TonePlayer for BrokenPlayer {
    fn play(&mut self, _: f64, _: f64, _: f64) -> Result<(), PracticeError> {
        Err(PracticeError::PlaybackError {
            capability: Capability::Audio,
            message: "device unplugged".to_string(),
        })
    }
}

#[test]
fn test_collaborator_failure_ends_run() {
    let config = config("1", "C", 1);
    let mut scheduler = scheduler(&config, 0);
    let result = scheduler.run(
        &mut TranscriptSpeaker::default(),
        &mut BrokenPlayer,
        &mut ManualClock::default(),
        &AtomicBool::new(false),
    );
    assert!(matches!(
        result,
        Err(PracticeError::PlaybackError {
            capability: Capability::Audio,
            ..
        })
    ));
}

#[test]
fn test_scheduler_rejects_empty_inputs() {
    let config = PracticeConfig::default();
    let result = Scheduler::new(Vec::new(), Vec::new(), &config, StdRng::seed_from_u64(0));
    assert!(matches!(result, Err(PracticeError::ConfigError(_))));
}
