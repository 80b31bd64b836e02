//! # Key Resolver
//!
//! Turns a key token ("C", "Db", "f#", "Bbm") into a [`KeyContext`]: the root
//! pitch class, the octave the root sits in, and whether the key is written
//! with flats or sharps.
//!
//! The spelling bias comes from [`KEY_SPELLINGS`], a hand-written circle of
//! fifths table. It cannot be derived from the pitch class: C# and Db share a
//! pitch class but not a spelling, and F has no accidental in its name yet is a
//! flat key.

use serde::Serialize;

use crate::error::PracticeError;

/// Mode of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

/// One conventional key spelling and its position on the circle of fifths.
/// Positive = sharps, negative = flats. Spellings past seven accidentals are
/// the theoretical keys (G# major, Fb major, Dbm, ...).
#[derive(Debug, Clone, Copy)]
pub struct KeySpelling {
    pub name: &'static str,
    pub mode: Mode,
    pub fifths: i8,
}

const fn major(name: &'static str, fifths: i8) -> KeySpelling {
    KeySpelling { name, mode: Mode::Major, fifths }
}

const fn minor(name: &'static str, fifths: i8) -> KeySpelling {
    KeySpelling { name, mode: Mode::Minor, fifths }
}

pub const KEY_SPELLINGS: &[KeySpelling] = &[
    // Major, sharp side (C has no accidentals and spells with sharps)
    major("C", 0),
    major("G", 1),
    major("D", 2),
    major("A", 3),
    major("E", 4),
    major("B", 5),
    major("F#", 6),
    major("C#", 7),
    major("G#", 8),
    major("D#", 9),
    major("A#", 10),
    major("E#", 11),
    major("B#", 12),
    // Major, flat side
    major("F", -1),
    major("Bb", -2),
    major("Eb", -3),
    major("Ab", -4),
    major("Db", -5),
    major("Gb", -6),
    major("Cb", -7),
    major("Fb", -8),
    // Minor, sharp side (A minor shares C major's signature)
    minor("A", 0),
    minor("E", 1),
    minor("B", 2),
    minor("F#", 3),
    minor("C#", 4),
    minor("G#", 5),
    minor("D#", 6),
    minor("A#", 7),
    minor("E#", 8),
    minor("B#", 9),
    // Minor, flat side
    minor("D", -1),
    minor("G", -2),
    minor("C", -3),
    minor("F", -4),
    minor("Bb", -5),
    minor("Eb", -6),
    minor("Ab", -7),
    minor("Db", -8),
    minor("Gb", -9),
    minor("Cb", -10),
    minor("Fb", -11),
];

/// A resolved key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyContext {
    /// Canonical spelling, e.g. "Bb" or "F#m"
    pub name: String,
    pub mode: Mode,
    pub root_pitch_class: u8,
    pub root_octave: i32,
    pub fifths: i8,
    pub prefers_flats: bool,
}

impl KeyContext {
    /// MIDI number of the key's root in `root_octave` (C4 = 60)
    pub fn root_midi(&self) -> i32 {
        12 * (self.root_octave + 1) + i32::from(self.root_pitch_class)
    }

    /// Name as it should be spoken: "B flat", "F sharp minor"
    pub fn spoken_name(&self) -> String {
        let mut chars = self.name.chars();
        let mut spoken = chars.next().map(String::from).unwrap_or_default();
        match chars.next() {
            Some('#') => spoken.push_str(" sharp"),
            Some('b') => spoken.push_str(" flat"),
            _ => {}
        }
        if self.mode == Mode::Minor {
            spoken.push_str(" minor");
        }
        spoken
    }
}

fn letter_pitch_class(letter: char) -> Option<i32> {
    match letter {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Resolve a key token for the given octave.
///
/// The letter is case-insensitive; the accidental is `#` or `b` (`B` is also
/// accepted after the letter, so "BB" reads as B flat); a trailing `m` selects
/// the minor key.
///
/// ```
/// use degree_drill::resolve;
///
/// let key = resolve("Db", 4).unwrap();
/// assert_eq!(key.root_pitch_class, 1);
/// assert!(key.prefers_flats);
///
/// let key = resolve("c#", 4).unwrap();
/// assert_eq!(key.root_pitch_class, 1);
/// assert!(!key.prefers_flats);
/// ```
pub fn resolve(token: &str, octave: i32) -> Result<KeyContext, PracticeError> {
    let invalid = || PracticeError::InvalidKeyError {
        token: token.to_string(),
    };

    let mut chars = token.trim().chars().peekable();
    let letter = chars
        .next()
        .map(|c| c.to_ascii_uppercase())
        .ok_or_else(invalid)?;
    let base = letter_pitch_class(letter).ok_or_else(invalid)?;

    let (accidental, shift) = match chars.peek() {
        Some('#') => (Some('#'), 1),
        Some('b') | Some('B') => (Some('b'), -1),
        _ => (None, 0),
    };
    if accidental.is_some() {
        chars.next();
    }

    let mode = match chars.next() {
        None => Mode::Major,
        Some('m') => Mode::Minor,
        Some(_) => return Err(invalid()),
    };
    if chars.next().is_some() {
        return Err(invalid());
    }

    let mut name = String::from(letter);
    if let Some(acc) = accidental {
        name.push(acc);
    }

    let spelling = KEY_SPELLINGS
        .iter()
        .find(|s| s.name == name && s.mode == mode)
        .ok_or_else(invalid)?;

    if mode == Mode::Minor {
        name.push('m');
    }

    Ok(KeyContext {
        name,
        mode,
        root_pitch_class: (base + shift).rem_euclid(12) as u8,
        root_octave: octave,
        fifths: spelling.fifths,
        prefers_flats: spelling.fifths < 0,
    })
}
