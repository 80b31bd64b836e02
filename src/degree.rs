//! # Degree Normalizer
//!
//! Turns a raw scale-degree token into a [`CanonicalDegree`].
//!
//! Accepted spellings are case- and whitespace-insensitive, and the accidental
//! may come before or after the number:
//!
//! | Token      | Step | Accidental | Explicit |
//! |------------|------|------------|----------|
//! | `3`        | 3    | natural    | no       |
//! | `b3`       | 3    | flat       | yes      |
//! | `flat 3`   | 3    | flat       | yes      |
//! | `3 FLAT`   | 3    | flat       | yes      |
//! | `#4`       | 4    | sharp      | yes      |
//! | `sharp4`   | 4    | sharp      | yes      |
//!
//! ```
//! use degree_drill::{normalize, Accidental};
//!
//! let degree = normalize("FLAT3").unwrap();
//! assert_eq!(degree.step(), 3);
//! assert_eq!(degree.accidental(), Accidental::Flat);
//! assert!(degree.explicit());
//! assert_eq!(degree.speakable(), "flat three");
//! ```

use std::fmt;

use serde::Serialize;

use crate::error::PracticeError;

/// Accidental applied to a scale step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accidental {
    #[default]
    Natural,
    Flat,
    Sharp,
}

impl Accidental {
    /// Semitone adjustment applied to the major-scale step
    pub fn semitones(self) -> i32 {
        match self {
            Accidental::Natural => 0,
            Accidental::Flat => -1,
            Accidental::Sharp => 1,
        }
    }

    fn word(self) -> Option<&'static str> {
        match self {
            Accidental::Natural => None,
            Accidental::Flat => Some("flat"),
            Accidental::Sharp => Some("sharp"),
        }
    }
}

/// Accidental markers, longest first so whole words win over single characters.
const ACCIDENTAL_MARKERS: &[(&str, Accidental)] = &[
    ("sharp", Accidental::Sharp),
    ("flat", Accidental::Flat),
    ("#", Accidental::Sharp),
    ("b", Accidental::Flat),
];

const STEP_WORDS: [&str; 7] = ["one", "two", "three", "four", "five", "six", "seven"];

/// A normalized scale degree.
///
/// `original_text` is kept for reporting only; two degrees are the same degree
/// when their step and accidental match (see [`CanonicalDegree::id`]).
///
/// Only [`normalize`] builds one, so the step is always 1-7:
///
/// ```compile_fail
/// use degree_drill::{Accidental, CanonicalDegree};
///
/// let degree = CanonicalDegree {
///     step: 0,
///     accidental: Accidental::Natural,
///     explicit: false,
///     original_text: String::new(),
/// };
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalDegree {
    step: u8,
    accidental: Accidental,
    explicit: bool,
    original_text: String,
}

/// Identity of a degree for deduplication and play counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DegreeId {
    pub step: u8,
    pub accidental: Accidental,
}

impl CanonicalDegree {
    /// Scale step, always 1-7
    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn accidental(&self) -> Accidental {
        self.accidental
    }

    /// Whether the token carried an accidental marker
    pub fn explicit(&self) -> bool {
        self.explicit
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    /// Zero-based index into per-step tables
    pub fn scale_index(&self) -> usize {
        usize::from(self.step.clamp(1, 7) - 1)
    }

    pub fn id(&self) -> DegreeId {
        DegreeId {
            step: self.step,
            accidental: self.accidental,
        }
    }

    pub fn same_degree(&self, other: &CanonicalDegree) -> bool {
        self.id() == other.id()
    }

    /// Form handed to the speech engine, e.g. "flat three"
    pub fn speakable(&self) -> String {
        let number = STEP_WORDS[self.scale_index()];
        match self.accidental.word() {
            Some(word) => format!("{} {}", word, number),
            None => number.to_string(),
        }
    }
}

impl fmt::Display for CanonicalDegree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.accidental.word() {
            Some(word) => write!(f, "{} {}", word, self.step),
            None => write!(f, "{}", self.step),
        }
    }
}

/// Normalize a raw degree token.
///
/// Fails with [`PracticeError::ParseError`] when the token holds anything other
/// than one accidental marker and one step number 1-7.
pub fn normalize(token: &str) -> Result<CanonicalDegree, PracticeError> {
    let compact: String = token
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if compact.is_empty() {
        return Err(PracticeError::parse(token, "empty degree"));
    }

    let mut accidental: Option<Accidental> = None;
    let mut number: Option<&str> = None;
    let mut rest = compact.as_str();

    while let Some(c) = rest.chars().next() {
        if let Some((marker, acc)) = ACCIDENTAL_MARKERS
            .iter()
            .find(|(marker, _)| rest.starts_with(marker))
        {
            if accidental.is_some() {
                return Err(PracticeError::parse(token, "more than one accidental"));
            }
            accidental = Some(*acc);
            rest = &rest[marker.len()..];
        } else if c.is_ascii_digit() {
            if number.is_some() {
                return Err(PracticeError::parse(token, "more than one step number"));
            }
            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            number = Some(&rest[..end]);
            rest = &rest[end..];
        } else {
            return Err(PracticeError::parse(
                token,
                format!("unexpected character '{}'", c),
            ));
        }
    }

    let digits = number.ok_or_else(|| PracticeError::parse(token, "no scale step 1-7 found"))?;
    let step = match digits.parse::<u8>() {
        Ok(step @ 1..=7) => step,
        _ => {
            return Err(PracticeError::parse(
                token,
                format!("scale step {} is outside 1-7", digits),
            ))
        }
    };

    Ok(CanonicalDegree {
        step,
        accidental: accidental.unwrap_or_default(),
        explicit: accidental.is_some(),
        original_text: token.trim().to_string(),
    })
}

/// Normalize every token and drop repeats of the same degree, keeping the
/// first spelling seen.
pub fn unique_degrees<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<CanonicalDegree>, PracticeError> {
    let mut unique: Vec<CanonicalDegree> = Vec::new();
    for token in tokens {
        let degree = normalize(token.as_ref())?;
        if !unique.iter().any(|seen| seen.same_degree(&degree)) {
            unique.push(degree);
        }
    }
    Ok(unique)
}
