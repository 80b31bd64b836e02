//! # Pitch Calculator
//!
//! Places a scale degree in a key: major-scale step offset, accidental
//! adjustment, octave carry, then MIDI number and equal-tempered frequency.
//!
//! ## Voicing
//! Natural and raised degrees ascend from the root, carrying into the next
//! octave when the offset passes 11 (sharp 7 lands on the root an octave up).
//! Lowered degrees more than a tritone above the root fold down an octave, so
//! flat 7 sits a whole step below the root and flat 1 a half step below.
//!
//! | Key C4 | Offset | MIDI |
//! |--------|--------|------|
//! | 1      | 0      | 60   |
//! | 3      | 4      | 64   |
//! | b3     | 3      | 63   |
//! | #4     | 6      | 66   |
//! | #5     | 8      | 68   |
//! | #7     | 12     | 72   |
//! | b6     | -4     | 56   |
//! | b7     | -2     | 58   |
//! | b1     | -1     | 59   |

use serde::Serialize;

use crate::degree::{Accidental, CanonicalDegree};
use crate::key::KeyContext;

/// Semitones above the root for steps 1-7 of the major scale
pub const MAJOR_SCALE_OFFSETS: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

pub const A4_FREQ: f64 = 440.0;
pub const A4_MIDI_NOTE: i32 = 69;

/// Absolute pitch of a degree in a key
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AbsolutePitch {
    pub midi_number: i32,
    pub frequency_hz: f64,
}

impl AbsolutePitch {
    pub fn from_midi(midi_number: i32) -> Self {
        let frequency_hz = A4_FREQ * 2f64.powf(f64::from(midi_number - A4_MIDI_NOTE) / 12.0);
        Self {
            midi_number,
            frequency_hz,
        }
    }

    /// Pitch class 0-11 (C = 0)
    pub fn pitch_class(&self) -> u8 {
        self.midi_number.rem_euclid(12) as u8
    }

    /// Whether the MIDI number is inside the standard 0-127 range
    pub fn in_midi_range(&self) -> bool {
        (0..=127).contains(&self.midi_number)
    }
}

/// Signed semitone distance from the key's root to the degree
pub fn semitone_offset(degree: &CanonicalDegree) -> i32 {
    let offset =
        MAJOR_SCALE_OFFSETS[degree.scale_index()] + degree.accidental().semitones();
    if degree.accidental() == Accidental::Flat && offset > 6 {
        offset - 12
    } else {
        offset
    }
}

/// Compute the absolute pitch of `degree` in `key`. Total over all valid degrees.
///
/// ```
/// use degree_drill::{normalize, pitch, resolve};
///
/// let key = resolve("A", 4).unwrap();
/// let unison = pitch(&normalize("1").unwrap(), &key);
/// assert_eq!(unison.midi_number, 69);
/// assert_eq!(unison.frequency_hz, 440.0);
/// ```
pub fn pitch(degree: &CanonicalDegree, key: &KeyContext) -> AbsolutePitch {
    let raw = i32::from(key.root_pitch_class) + semitone_offset(degree);
    let octave = key.root_octave + raw.div_euclid(12);
    let pitch_class = raw.rem_euclid(12);
    AbsolutePitch::from_midi(12 * (octave + 1) + pitch_class)
}
