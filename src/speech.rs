//! # Speech
//!
//! The drill speaks through a [`Speaker`]. The real backend runs a system
//! text-to-speech program (`espeak-ng`, `espeak` or macOS `say`) once per
//! utterance and waits for it to exit, so `speak` returns when the text has
//! been spoken.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{Capability, PracticeError};

/// Programs tried, in order, when no speech command is configured
pub const DEFAULT_SPEECH_PROGRAMS: &[&str] = &["espeak-ng", "espeak", "say"];

/// Speech collaborator: blocks until `text` has been spoken
pub trait Speaker {
    fn speak(&mut self, text: &str) -> Result<(), PracticeError>;

    fn shutdown(&mut self) {}
}

/// Rewrite text for a speech engine.
///
/// A lone letter "A" would be read as the article, so it becomes "Ay".
///
/// ```
/// use degree_drill::speech::pronounceable;
///
/// assert_eq!(pronounceable("A flat"), "Ay flat");
/// assert_eq!(pronounceable("New key: A minor"), "New key: Ay minor");
/// assert_eq!(pronounceable("flat three"), "flat three");
/// ```
pub fn pronounceable(text: &str) -> String {
    text.split(' ')
        .map(|word| if word == "A" { "Ay" } else { word })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Locate an executable by name on PATH, or as a path
pub fn find_program(program: &str) -> Option<PathBuf> {
    let direct = Path::new(program);
    if direct.components().count() > 1 {
        return direct.is_file().then(|| direct.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        let exe = candidate.with_extension("exe");
        exe.is_file().then_some(exe)
    })
}

/// Runs a speech program with the text as its last argument
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandSpeaker {
    pub fn new(program: PathBuf, args: Vec<String>) -> Self {
        Self { program, args }
    }

    /// Find a speech program, preferring `requested` when given.
    ///
    /// `requested` may include arguments ("espeak -s 140").
    pub fn detect(requested: Option<&str>) -> Result<Self, PracticeError> {
        if let Some(command) = requested {
            let mut parts = command.split_whitespace();
            let name = parts.next().ok_or_else(|| {
                PracticeError::unavailable(Capability::Speech, "empty speech command")
            })?;
            let program = find_program(name).ok_or_else(|| {
                PracticeError::unavailable(
                    Capability::Speech,
                    format!("speech program '{}' not found", name),
                )
            })?;
            return Ok(Self::new(program, parts.map(String::from).collect()));
        }

        DEFAULT_SPEECH_PROGRAMS
            .iter()
            .find_map(|name| find_program(name))
            .map(|program| Self::new(program, Vec::new()))
            .ok_or_else(|| {
                PracticeError::unavailable(
                    Capability::Speech,
                    format!(
                        "no text-to-speech program found on PATH (tried {})",
                        DEFAULT_SPEECH_PROGRAMS.join(", ")
                    ),
                )
            })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), PracticeError> {
        if text.trim().is_empty() {
            debug!("Skipping empty text for speech");
            return Ok(());
        }
        let spoken = pronounceable(text);
        debug!(program = %self.program.display(), text = %spoken, "speaking");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&spoken)
            .status()
            .map_err(|e| PracticeError::playback(Capability::Speech, e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(PracticeError::playback(
                Capability::Speech,
                format!("{} exited with {}", self.program.display(), status),
            ))
        }
    }
}

/// Keeps what would have been spoken. Used by dry runs and tests.
#[derive(Debug, Default)]
pub struct TranscriptSpeaker {
    pub transcript: Vec<String>,
}

impl Speaker for TranscriptSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), PracticeError> {
        debug!(text, "speaking (silent)");
        self.transcript.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pronounceable_only_touches_lone_a() {
        assert_eq!(pronounceable("A"), "Ay");
        assert_eq!(pronounceable("A sharp"), "Ay sharp");
        assert_eq!(pronounceable("B flat"), "B flat");
        assert_eq!(pronounceable("Ab"), "Ab");
    }

    #[test]
    fn test_missing_requested_program_is_unavailable() {
        let result = CommandSpeaker::detect(Some("definitely-not-a-speech-program-xyz"));
        assert!(matches!(
            result,
            Err(PracticeError::CollaboratorUnavailableError {
                capability: Capability::Speech,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_requested_command_is_unavailable() {
        assert!(CommandSpeaker::detect(Some("   ")).is_err());
    }

    #[test]
    fn test_transcript_speaker_records() {
        let mut speaker = TranscriptSpeaker::default();
        speaker.speak("flat three").unwrap();
        speaker.speak("E flat").unwrap();
        assert_eq!(speaker.transcript, vec!["flat three", "E flat"]);
    }
}
