//! Scheduler state and report types

use std::collections::HashMap;

use serde::Serialize;

use crate::degree::{CanonicalDegree, DegreeId};
use crate::key::KeyContext;

/// Scheduler state
///
/// One practice cycle walks SelectDegree → Speaking → Tone → Naming → Waiting
/// and back to SelectDegree. KeySwitch opens a new [`PlaySession`]; Done is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum State {
    KeySwitch,
    SelectDegree,
    Speaking,
    Tone,
    Naming,
    Waiting,
    Done,
}

/// Play counts for the active key.
///
/// Complete exactly when every unique degree has been played `target_plays`
/// times. Counts never exceed the target because only eligible degrees are
/// selected.
#[derive(Debug, Clone)]
pub struct PlaySession {
    pub key: KeyContext,
    pub unique_degrees: Vec<CanonicalDegree>,
    pub play_counts: HashMap<DegreeId, u32>,
    pub target_plays: u32,
}

impl PlaySession {
    pub fn new(key: KeyContext, unique_degrees: Vec<CanonicalDegree>, target_plays: u32) -> Self {
        let play_counts = unique_degrees.iter().map(|d| (d.id(), 0)).collect();
        Self {
            key,
            unique_degrees,
            play_counts,
            target_plays: target_plays.max(1),
        }
    }

    pub fn count(&self, degree: &CanonicalDegree) -> u32 {
        self.play_counts.get(&degree.id()).copied().unwrap_or(0)
    }

    /// Degrees still below the target, in input order
    pub fn eligible(&self) -> Vec<&CanonicalDegree> {
        self.unique_degrees
            .iter()
            .filter(|d| self.count(d) < self.target_plays)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.unique_degrees
            .iter()
            .all(|d| self.count(d) >= self.target_plays)
    }

    pub fn record(&mut self, degree: &CanonicalDegree) {
        *self.play_counts.entry(degree.id()).or_insert(0) += 1;
    }

    /// Total tones played in this session
    pub fn total_plays(&self) -> u32 {
        self.play_counts.values().sum()
    }
}

/// One completed cycle
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayedTone {
    pub key: String,
    pub degree: String,
    pub midi_number: i32,
    pub frequency_hz: f64,
    pub note_name: String,
}

/// Everything a run played
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PracticeReport {
    pub tones: Vec<PlayedTone>,
    pub sessions_completed: usize,
    pub interrupted: bool,
}
