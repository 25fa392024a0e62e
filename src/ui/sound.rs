/// Feedback sounds: a tap click and the two verdict cues.
///
/// Waveforms are synthesized once at startup and handed to rodio as raw
/// sample buffers, so there are no audio assets to ship. Playback never
/// blocks the screen loop.
///
/// Without the "sound" feature the engine is a no-op with the same API.

/// Which cue to play.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Effect {
    Tap,
    Correct,
    Incorrect,
}

const SAMPLE_RATE: u32 = 22050;

/// Mono samples for `effect`, in [-1, 1].
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn synthesize(effect: Effect) -> Vec<f32> {
    match effect {
        Effect::Tap => click(0.025, 1800.0),
        Effect::Correct => chime(&[(523.25, 0.08), (783.99, 0.16)]),
        Effect::Incorrect => buzz(0.35, 220.0, 110.0),
    }
}

fn seconds(i: usize) -> f32 {
    i as f32 / SAMPLE_RATE as f32
}

fn sample_count(duration: f32) -> usize {
    (SAMPLE_RATE as f32 * duration) as usize
}

/// Short sine blip with a linear fade.
fn click(duration: f32, freq: f32) -> Vec<f32> {
    let n = sample_count(duration);
    (0..n)
        .map(|i| {
            let fade = 1.0 - i as f32 / n as f32;
            (seconds(i) * freq * std::f32::consts::TAU).sin() * fade * 0.2
        })
        .collect()
}

/// Notes in sequence, each a sine plus its octave with a fast decay.
fn chime(notes: &[(f32, f32)]) -> Vec<f32> {
    let mut out = Vec::new();
    for &(freq, duration) in notes {
        let n = sample_count(duration);
        out.extend((0..n).map(|i| {
            let t = seconds(i) * std::f32::consts::TAU;
            let decay = 1.0 - (i as f32 / n as f32).sqrt();
            ((t * freq).sin() * 0.7 + (t * freq * 2.0).sin() * 0.3) * decay * 0.3
        }));
    }
    out
}

/// Square wave sweeping from `from_hz` down to `to_hz`.
fn buzz(duration: f32, from_hz: f32, to_hz: f32) -> Vec<f32> {
    let n = sample_count(duration);
    let mut phase = 0.0_f32;
    (0..n)
        .map(|i| {
            let progress = i as f32 / n as f32;
            let freq = from_hz + (to_hz - from_hz) * progress;
            phase = (phase + freq / SAMPLE_RATE as f32).fract();
            let square = if phase < 0.5 { 1.0 } else { -1.0 };
            square * (1.0 - progress).powf(0.7) * 0.15
        })
        .collect()
}

#[cfg(feature = "sound")]
mod engine {
    use std::sync::Arc;

    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{synthesize, Effect, SAMPLE_RATE};

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        tap: Arc<[f32]>,
        correct: Arc<[f32]>,
        incorrect: Arc<[f32]>,
    }

    impl SoundEngine {
        /// `None` when no output device is available.
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!("audio disabled: {e}");
                    return None;
                }
            };
            Some(SoundEngine {
                _stream: stream,
                handle,
                tap: synthesize(Effect::Tap).into(),
                correct: synthesize(Effect::Correct).into(),
                incorrect: synthesize(Effect::Incorrect).into(),
            })
        }

        pub fn play(&self, effect: Effect) {
            let samples = match effect {
                Effect::Tap => &self.tap,
                Effect::Correct => &self.correct,
                Effect::Incorrect => &self.incorrect,
            };
            match Sink::try_new(&self.handle) {
                Ok(sink) => {
                    sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples.to_vec()));
                    sink.detach();
                }
                Err(e) => tracing::trace!(?effect, "sink unavailable: {e}"),
            }
        }
    }
}

#[cfg(feature = "sound")]
pub use engine::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> {
        Some(SoundEngine)
    }

    pub fn play(&self, _effect: Effect) {}
}
