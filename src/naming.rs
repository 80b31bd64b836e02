//! # Note Namer
//!
//! Picks the letter-name spelling of a pitch. With 12 pitch classes and 7
//! letters, every black-key pitch has a sharp and a flat spelling; which one
//! is used is decided in this order:
//!
//! 1. A degree that states its own accidental keeps that direction ("flat 3"
//!    is always spelled with a flat).
//! 2. Otherwise the key's spelling bias decides.
//! 3. White-key pitches are always the plain letter.

use crate::degree::{Accidental, CanonicalDegree};
use crate::key::KeyContext;
use crate::pitch::AbsolutePitch;

/// Spellings per pitch class: (sharp spelling, flat spelling)
pub const PITCH_CLASS_NAMES: [(&str, &str); 12] = [
    ("C", "C"),
    ("C sharp", "D flat"),
    ("D", "D"),
    ("D sharp", "E flat"),
    ("E", "E"),
    ("F", "F"),
    ("F sharp", "G flat"),
    ("G", "G"),
    ("G sharp", "A flat"),
    ("A", "A"),
    ("A sharp", "B flat"),
    ("B", "B"),
];

/// Whether the degree and key call for a flat spelling
pub fn use_flats(degree: &CanonicalDegree, key: &KeyContext) -> bool {
    match (degree.explicit(), degree.accidental()) {
        (true, Accidental::Flat) => true,
        (true, Accidental::Sharp) => false,
        _ => key.prefers_flats,
    }
}

/// Name the pitch, e.g. "E flat", "F sharp", "C".
///
/// ```
/// use degree_drill::{name, normalize, pitch, resolve};
///
/// let key = resolve("C", 4).unwrap();
/// let degree = normalize("flat 3").unwrap();
/// assert_eq!(name(&pitch(&degree, &key), &degree, &key), "E flat");
/// ```
pub fn name(pitch: &AbsolutePitch, degree: &CanonicalDegree, key: &KeyContext) -> String {
    let (sharp, flat) = PITCH_CLASS_NAMES[usize::from(pitch.pitch_class())];
    if use_flats(degree, key) {
        flat.to_string()
    } else {
        sharp.to_string()
    }
}
