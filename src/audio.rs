//! Audio: procedurally synthesised cues and music, no sound files.
//!
//! The win/lose cues and the background track are rendered once at startup
//! with fundsp and replayed through rodio. When no output device exists the
//! backend degrades to silence instead of failing startup.

use fundsp::prelude::*;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

const SAMPLE_RATE: u32 = 44_100;

/// Audio operations the scene and player need.
pub trait AudioCues {
    /// True while the background track is still audible.
    fn music_playing(&self) -> bool;

    /// (Re)start the background track. Called whenever the track has run
    /// out; looping is restart-on-end, not a gapless loop.
    fn start_music(&self);

    fn cue_win(&self);

    fn cue_lose(&self);
}

/// Silent backend for `--mute` and for tests.
pub struct NullAudio;

impl AudioCues for NullAudio {
    fn music_playing(&self) -> bool {
        true
    }

    fn start_music(&self) {}

    fn cue_win(&self) {}

    fn cue_lose(&self) {}
}

struct Backend {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    music: Sink,
}

pub struct RodioAudio {
    backend: Option<Backend>,
    track: Vec<f32>,
    win: Vec<f32>,
    lose: Vec<f32>,
}

impl RodioAudio {
    /// Open the default output device. A missing device is not fatal: the
    /// game runs silent with a warning.
    pub fn new() -> Self {
        let backend = match OutputStream::try_default() {
            Ok((stream, handle)) => match Sink::try_new(&handle) {
                Ok(music) => Some(Backend {
                    _stream: stream,
                    handle,
                    music,
                }),
                Err(e) => {
                    log::warn!("audio sink unavailable, running silent: {e}");
                    None
                }
            },
            Err(e) => {
                log::warn!("no audio output device, running silent: {e}");
                None
            }
        };
        Self {
            backend,
            track: music_track(),
            win: win_cue(),
            lose: lose_cue(),
        }
    }

    fn play_oneshot(&self, samples: &[f32]) {
        if let Some(backend) = &self.backend {
            let source = SamplesBuffer::new(1, SAMPLE_RATE, samples.to_vec());
            if let Err(e) = backend.handle.play_raw(source) {
                log::debug!("dropping cue: {e}");
            }
        }
    }
}

impl Default for RodioAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioCues for RodioAudio {
    fn music_playing(&self) -> bool {
        // The silent backend reports "playing" so the scene never spins on
        // restart attempts.
        self.backend.as_ref().is_none_or(|b| !b.music.empty())
    }

    fn start_music(&self) {
        if let Some(backend) = &self.backend {
            backend
                .music
                .append(SamplesBuffer::new(1, SAMPLE_RATE, self.track.clone()));
        }
    }

    fn cue_win(&self) {
        self.play_oneshot(&self.win);
    }

    fn cue_lose(&self) {
        self.play_oneshot(&self.lose);
    }
}

fn render_mono(unit: &mut dyn AudioUnit, seconds: f64) -> Vec<f32> {
    let wave = Wave::render(f64::from(SAMPLE_RATE), seconds, unit);
    wave.channel(0).clone()
}

/// Quick upward chirp.
fn win_cue() -> Vec<f32> {
    let mut unit = (lfo(|t: f32| lerp(523.0, 1046.0, (t / 0.18).min(1.0))) >> triangle())
        * lfo(|t: f32| lerp(0.25, 0.0, (t / 0.25).min(1.0)));
    render_mono(&mut unit, 0.25)
}

/// Sagging saw sweep, 400 Hz down to 80 Hz.
fn lose_cue() -> Vec<f32> {
    let mut unit = (lfo(|t: f32| lerp(400.0, 80.0, (t / 0.4).min(1.0))) >> saw())
        * lfo(|t: f32| lerp(0.15, 0.0, (t / 0.5).min(1.0)));
    render_mono(&mut unit, 0.5)
}

/// One square-wave note with a linear decay.
fn tone(freq: f32, seconds: f64) -> Vec<f32> {
    let len = seconds as f32;
    let mut unit =
        (constant(freq) >> square()) * lfo(move |t: f32| lerp(0.10, 0.0, (t / len).min(1.0)));
    render_mono(&mut unit, seconds)
}

/// A short chiptune round; the scene restarts it whenever it ends.
fn music_track() -> Vec<f32> {
    // C major noodle, one bar of eighths per phrase.
    const C4: f32 = 261.63;
    const D4: f32 = 293.66;
    const E4: f32 = 329.63;
    const G4: f32 = 392.00;
    const A4: f32 = 440.00;
    const C5: f32 = 523.25;
    let phrase = [
        C4, E4, G4, C5, A4, G4, E4, D4, //
        C4, E4, G4, A4, G4, E4, D4, C4,
    ];
    let mut track = Vec::new();
    for freq in phrase {
        track.extend(tone(freq, 0.22));
    }
    track
}
