//! # Tone Output
//!
//! The drill plays tones through a [`TonePlayer`]. [`synthesize_tone`] builds
//! a fixed-amplitude sine buffer; [`CpalTonePlayer`] streams that buffer to the
//! default output device. Playback is fire-and-continue: `play` starts the
//! stream and returns, and the scheduler sleeps for the tone duration.

use std::f64::consts::TAU;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use tracing::{debug, error, info};

use crate::error::{Capability, PracticeError};

/// Audio collaborator
pub trait TonePlayer {
    fn play(&mut self, frequency_hz: f64, duration_sec: f64, amplitude: f64)
        -> Result<(), PracticeError>;

    fn shutdown(&mut self) {}
}

/// Mono sine wave, `duration_sec` long at `sample_rate`, peak `amplitude`
pub fn synthesize_tone(
    frequency_hz: f64,
    duration_sec: f64,
    amplitude: f64,
    sample_rate: u32,
) -> Vec<f32> {
    let rate = f64::from(sample_rate);
    let len = (rate * duration_sec.max(0.0)) as usize;
    (0..len)
        .map(|i| {
            let t = i as f64 / rate;
            (amplitude * (TAU * frequency_hz * t).sin()) as f32
        })
        .collect()
}

/// Plays tones on the default output device
pub struct CpalTonePlayer {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,
    stream: Option<cpal::Stream>,
}

impl CpalTonePlayer {
    /// Open the default output device
    pub fn open() -> Result<Self, PracticeError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| {
            PracticeError::unavailable(Capability::Audio, "no audio output device found")
        })?;
        let config = device
            .default_output_config()
            .map_err(|e| PracticeError::unavailable(Capability::Audio, e.to_string()))?;

        info!(
            "Audio: {} Hz, {} channels, {:?}",
            config.sample_rate().0,
            config.channels(),
            config.sample_format()
        );

        Ok(Self {
            device,
            config,
            stream: None,
        })
    }

    fn build_stream<T>(&self, samples: Vec<f32>) -> Result<cpal::Stream, PracticeError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let config: cpal::StreamConfig = self.config.config();
        let channels = usize::from(config.channels);
        let mut cursor = 0usize;

        let err_fn = |err| error!("Error in output sound stream: {err}");

        self.device
            .build_output_stream(
                &config,
                move |output: &mut [T], _info: &cpal::OutputCallbackInfo| {
                    for frame in output.chunks_mut(channels) {
                        let value = samples.get(cursor).copied().unwrap_or(0.0);
                        cursor += 1;
                        for s in frame.iter_mut() {
                            *s = T::from_sample(value);
                        }
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| PracticeError::playback(Capability::Audio, e.to_string()))
    }
}

impl TonePlayer for CpalTonePlayer {
    fn play(
        &mut self,
        frequency_hz: f64,
        duration_sec: f64,
        amplitude: f64,
    ) -> Result<(), PracticeError> {
        debug!("Playing tone: {:.2} Hz for {}s", frequency_hz, duration_sec);
        let samples = synthesize_tone(
            frequency_hz,
            duration_sec,
            amplitude,
            self.config.sample_rate().0,
        );

        let stream = match self.config.sample_format() {
            cpal::SampleFormat::I8 => self.build_stream::<i8>(samples)?,
            cpal::SampleFormat::I16 => self.build_stream::<i16>(samples)?,
            cpal::SampleFormat::I32 => self.build_stream::<i32>(samples)?,
            cpal::SampleFormat::U16 => self.build_stream::<u16>(samples)?,
            cpal::SampleFormat::F32 => self.build_stream::<f32>(samples)?,
            cpal::SampleFormat::F64 => self.build_stream::<f64>(samples)?,
            other => {
                return Err(PracticeError::playback(
                    Capability::Audio,
                    format!("unsupported sample format: {:?}", other),
                ))
            }
        };
        stream
            .play()
            .map_err(|e| PracticeError::playback(Capability::Audio, e.to_string()))?;

        // Replacing the previous stream stops it
        self.stream = Some(stream);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.stream = None;
    }
}

/// A tone request as seen by [`RecordingTonePlayer`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneRequest {
    pub frequency_hz: f64,
    pub duration_sec: f64,
    pub amplitude: f64,
}

/// Keeps tone requests without making sound. Used by dry runs and tests.
#[derive(Debug, Default)]
pub struct RecordingTonePlayer {
    pub played: Vec<ToneRequest>,
}

impl TonePlayer for RecordingTonePlayer {
    fn play(
        &mut self,
        frequency_hz: f64,
        duration_sec: f64,
        amplitude: f64,
    ) -> Result<(), PracticeError> {
        self.played.push(ToneRequest {
            frequency_hz,
            duration_sec,
            amplitude,
        });
        Ok(())
    }
}
