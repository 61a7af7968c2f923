//! Procedural sound effects.
//!
//! Every effect is synthesised from scratch into a mono [`SoundBuffer`]:
//! oscillators with exponential gain and pitch ramps, shaped white noise, and
//! one-pole filters. Nothing is loaded from disk.
//!
//! Noise-based effects draw from the `Rng` passed to [`SoundFx::render`], so a
//! seeded generator gives repeatable output.

use fastrand::Rng;
use serde::Serialize;
use std::f32::consts::TAU;

/// Floor used for exponential ramps; they cannot reach zero.
const RAMP_FLOOR: f32 = 1e-5;

/// Mono PCM samples in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundBuffer {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl SoundBuffer {
    pub fn silence(sample_rate: u32, seconds: f32) -> Self {
        Self {
            sample_rate,
            samples: vec![0.0; frames(sample_rate, seconds)],
        }
    }

    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    /// Add `other` starting `offset` seconds in, growing the buffer as needed.
    pub fn mix_at(&mut self, other: &SoundBuffer, offset: f32) {
        let start = frames(self.sample_rate, offset);
        let end = start + other.samples.len();
        if self.samples.len() < end {
            self.samples.resize(end, 0.0);
        }
        for (dst, src) in self.samples[start..end].iter_mut().zip(&other.samples) {
            *dst += src;
        }
    }

    /// Multiply by an exponential ramp from `from` to `to` over `seconds`,
    /// holding `to` afterwards.
    pub fn apply_gain_ramp(&mut self, from: f32, to: f32, seconds: f32) {
        let rate = self.sample_rate as f32;
        for (i, s) in self.samples.iter_mut().enumerate() {
            *s *= exp_ramp(from, to, i as f32 / rate, seconds);
        }
    }

    /// One-pole low-pass filter.
    pub fn low_pass(&mut self, cutoff: f32) {
        let alpha = one_pole_alpha(cutoff, self.sample_rate);
        let mut y = 0.0;
        for s in self.samples.iter_mut() {
            y += alpha * (*s - y);
            *s = y;
        }
    }

    /// One-pole high-pass filter (input minus its low-passed copy).
    pub fn high_pass(&mut self, cutoff: f32) {
        let alpha = one_pole_alpha(cutoff, self.sample_rate);
        let mut low = 0.0;
        for s in self.samples.iter_mut() {
            low += alpha * (*s - low);
            *s -= low;
        }
    }

    /// Clamp every sample into `[-1, 1]`.
    pub fn clip(&mut self) {
        for s in self.samples.iter_mut() {
            *s = s.clamp(-1.0, 1.0);
        }
    }
}

fn frames(sample_rate: u32, seconds: f32) -> usize {
    (sample_rate as f32 * seconds.max(0.0)).round() as usize
}

fn one_pole_alpha(cutoff: f32, sample_rate: u32) -> f32 {
    let dt = 1.0 / sample_rate as f32;
    let rc = 1.0 / (TAU * cutoff);
    dt / (rc + dt)
}

/// Exponential interpolation from `from` to `to` reaching `to` at `t = duration`.
pub fn exp_ramp(from: f32, to: f32, t: f32, duration: f32) -> f32 {
    if duration <= 0.0 || t >= duration {
        return to;
    }
    let from = from.max(RAMP_FLOOR);
    let to = to.max(RAMP_FLOOR);
    from * (to / from).powf(t / duration)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// Sample at `phase` in `[0, 1)`.
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (phase * TAU).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

/// Oscillator whose pitch glides exponentially from `f0` to `f1` over
/// `glide` seconds and whose gain falls from `g0` to `g1` over `fade`
/// seconds. The voice stops after `length` seconds.
pub fn voice(
    sample_rate: u32,
    waveform: Waveform,
    (f0, f1, glide): (f32, f32, f32),
    (g0, g1, fade): (f32, f32, f32),
    length: f32,
) -> SoundBuffer {
    let n = frames(sample_rate, length);
    let rate = sample_rate as f32;
    let mut phase = 0.0f32;
    let mut samples = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f32 / rate;
        samples.push(waveform.sample(phase) * exp_ramp(g0, g1, t, fade));
        phase = (phase + exp_ramp(f0, f1, t, glide) / rate).fract();
    }
    SoundBuffer {
        sample_rate,
        samples,
    }
}

/// Fixed-pitch tone decaying from `volume` to silence over `duration`.
pub fn tone(sample_rate: u32, freq: f32, waveform: Waveform, duration: f32, volume: f32) -> SoundBuffer {
    voice(
        sample_rate,
        waveform,
        (freq, freq, 0.0),
        (volume, RAMP_FLOOR, duration),
        duration,
    )
}

/// White noise of `duration` seconds, scaled by `shape(i, n)`.
pub fn noise(
    sample_rate: u32,
    duration: f32,
    rng: &mut Rng,
    shape: impl Fn(usize, usize) -> f32,
) -> SoundBuffer {
    let n = frames(sample_rate, duration);
    let samples = (0..n).map(|i| (rng.f32() * 2.0 - 1.0) * shape(i, n)).collect();
    SoundBuffer {
        sample_rate,
        samples,
    }
}

/// Catalogue of one-shot effects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SoundFx {
    Tone {
        freq: f32,
        waveform: Waveform,
        duration: f32,
        volume: f32,
    },
    Thunder,
    Firework,
    /// Countdown beep; `go` is the final, longer and higher one.
    Count { go: bool },
    Boost,
    RockLand,
    RockBreak,
    Hoof { volume: f32 },
}

impl SoundFx {
    pub const DEFAULT_HOOF_VOLUME: f32 = 0.03;

    pub fn name(&self) -> &'static str {
        match self {
            SoundFx::Tone { .. } => "tone",
            SoundFx::Thunder => "thunder",
            SoundFx::Firework => "firework",
            SoundFx::Count { go: false } => "count",
            SoundFx::Count { go: true } => "go",
            SoundFx::Boost => "boost",
            SoundFx::RockLand => "rock_land",
            SoundFx::RockBreak => "rock_break",
            SoundFx::Hoof { .. } => "hoof",
        }
    }

    pub fn render(&self, sample_rate: u32, rng: &mut Rng) -> SoundBuffer {
        let sr = sample_rate;
        let mut out = match *self {
            SoundFx::Tone {
                freq,
                waveform,
                duration,
                volume,
            } => tone(sr, freq, waveform, duration, volume),
            SoundFx::Thunder => {
                let mut out = tone(sr, 100.0, Waveform::Sawtooth, 0.5, 0.5);
                out.mix_at(&tone(sr, 50.0, Waveform::Square, 0.8, 0.5), 0.0);
                out
            }
            SoundFx::Firework => firework(sr, rng),
            SoundFx::Count { go: true } => tone(sr, 800.0, Waveform::Square, 0.4, 0.4),
            SoundFx::Count { go: false } => tone(sr, 400.0, Waveform::Square, 0.2, 0.3),
            SoundFx::Boost => {
                let mut out = noise(sr, 0.4, rng, |i, n| {
                    let fade = 1.0 - i as f32 / n as f32;
                    0.3 * fade
                });
                let n = out.samples.len();
                for (i, s) in out.samples.iter_mut().enumerate() {
                    let fade = 1.0 - i as f32 / n as f32;
                    *s += (i as f32 * 0.01).sin() * 0.2 * fade;
                }
                out.low_pass(800.0);
                out.apply_gain_ramp(0.35, 0.01, 0.4);
                out
            }
            SoundFx::RockLand => {
                let mut out = voice(
                    sr,
                    Waveform::Sine,
                    (80.0, 30.0, 0.2),
                    (0.4, 0.01, 0.25),
                    0.25,
                );
                let mut dust = noise(sr, 0.15, rng, |i, n| (1.0 - i as f32 / n as f32) * 0.5);
                dust.low_pass(400.0);
                dust.apply_gain_ramp(0.15, 0.01, 0.15);
                out.mix_at(&dust, 0.0);
                out
            }
            SoundFx::RockBreak => {
                let mut out = voice(
                    sr,
                    Waveform::Sine,
                    (150.0, 50.0, 0.1),
                    (0.3, 0.01, 0.15),
                    0.15,
                );
                let mut crack = noise(sr, 0.2, rng, |i, n| {
                    let fade = 1.0 - i as f32 / n as f32;
                    fade * fade
                });
                crack.high_pass(500.0);
                crack.apply_gain_ramp(0.2, 0.01, 0.2);
                out.mix_at(&crack, 0.0);
                out
            }
            SoundFx::Hoof { volume } => {
                let pitch = 80.0 + rng.f32() * 40.0;
                voice(
                    sr,
                    Waveform::Triangle,
                    (pitch, pitch, 0.0),
                    (volume, 0.001, 0.05),
                    0.05,
                )
            }
        };
        out.clip();
        out
    }
}

fn firework(sr: u32, rng: &mut Rng) -> SoundBuffer {
    const BANG_AT: f32 = 0.3;
    let mut out = voice(
        sr,
        Waveform::Sawtooth,
        (200.0, 800.0, 0.3),
        (0.2, 0.01, 0.3),
        0.3,
    );

    let mut bang = noise(sr, 0.3, rng, |i, n| (-(i as f32) / (n as f32 * 0.1)).exp());
    bang.apply_gain_ramp(0.5, 0.01, 0.3);
    out.mix_at(&bang, BANG_AT);

    for j in 0..5 {
        let freq = 1000.0 + rng.f32() * 2000.0;
        out.mix_at(&tone(sr, freq, Waveform::Sine, 0.1, 0.1), BANG_AT + j as f32 * 0.05);
    }
    out
}

/// Drops hoof sounds that come too close together.
#[derive(Debug, Clone, Copy)]
pub struct HoofCooldown {
    cooldown: f32,
    last: Option<f32>,
}

impl HoofCooldown {
    pub fn new(cooldown_secs: f32) -> Self {
        Self {
            cooldown: cooldown_secs,
            last: None,
        }
    }

    /// Accept a hoof at `now` seconds unless the previous accepted one is less
    /// than the cooldown ago.
    pub fn try_accept(&mut self, now: f32) -> bool {
        match self.last {
            Some(last) if now - last < self.cooldown => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 8_000;

    #[test]
    fn waveforms_stay_in_unit_range() {
        for wf in [Waveform::Sine, Waveform::Square, Waveform::Sawtooth, Waveform::Triangle] {
            for i in 0..100 {
                let v = wf.sample(i as f32 / 100.0);
                assert!((-1.0..=1.0).contains(&v), "{:?} out of range", wf);
            }
        }
    }

    #[test]
    fn exp_ramp_hits_endpoints() {
        assert!((exp_ramp(0.5, 0.01, 0.0, 1.0) - 0.5).abs() < 1e-6);
        assert_eq!(exp_ramp(0.5, 0.01, 1.0, 1.0), 0.01);
        let mid = exp_ramp(1.0, 0.01, 0.5, 1.0);
        assert!((mid - 0.1).abs() < 1e-4);
    }

    #[test]
    fn tone_has_requested_length_and_decays() {
        let buf = tone(SR, 400.0, Waveform::Square, 0.2, 0.3);
        assert_eq!(buf.samples.len(), 1600);
        assert!((buf.samples[0] - 0.3).abs() < 1e-6);
        let tail = buf.samples[1500..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(tail < 0.01);
    }

    #[test]
    fn effect_lengths_follow_their_envelopes() {
        let mut rng = Rng::with_seed(1);
        let thunder = SoundFx::Thunder.render(SR, &mut rng);
        assert!((thunder.duration() - 0.8).abs() < 1e-3);
        let firework = SoundFx::Firework.render(SR, &mut rng);
        // sparkles end at 0.3 + 4 * 0.05 + 0.1
        assert!((firework.duration() - 0.6).abs() < 1e-3);
        let go = SoundFx::Count { go: true }.render(SR, &mut rng);
        assert!((go.duration() - 0.4).abs() < 1e-3);
        let hoof = SoundFx::Hoof { volume: 0.03 }.render(SR, &mut rng);
        assert!((hoof.duration() - 0.05).abs() < 1e-3);
        assert!(hoof.peak() <= 0.03 + 1e-6);
    }

    #[test]
    fn rendering_is_repeatable_with_same_seed() {
        for fx in [SoundFx::Boost, SoundFx::RockLand, SoundFx::RockBreak, SoundFx::Firework] {
            let a = fx.render(SR, &mut Rng::with_seed(9));
            let b = fx.render(SR, &mut Rng::with_seed(9));
            assert_eq!(a, b, "{} differs", fx.name());
            assert!(a.peak() <= 1.0);
            assert!(a.peak() > 0.0);
        }
    }

    #[test]
    fn mix_at_extends_buffer() {
        let mut base = SoundBuffer::silence(SR, 0.1);
        let click = SoundBuffer {
            sample_rate: SR,
            samples: vec![0.5; 10],
        };
        base.mix_at(&click, 0.2);
        assert_eq!(base.samples.len(), 1610);
        assert_eq!(base.samples[1600], 0.5);
    }

    #[test]
    fn low_pass_smooths_alternating_signal() {
        let mut buf = SoundBuffer {
            sample_rate: SR,
            samples: (0..400).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect(),
        };
        buf.low_pass(100.0);
        assert!(buf.peak() < 0.2);
    }

    #[test]
    fn high_pass_removes_dc() {
        let mut buf = SoundBuffer {
            sample_rate: SR,
            samples: vec![1.0; 4000],
        };
        buf.high_pass(500.0);
        assert!(buf.samples[3999].abs() < 1e-3);
    }

    #[test]
    fn hoof_cooldown_drops_close_hits() {
        let mut cooldown = HoofCooldown::new(0.08);
        assert!(cooldown.try_accept(1.0));
        assert!(!cooldown.try_accept(1.05));
        assert!(cooldown.try_accept(1.1));
        assert!(!cooldown.try_accept(1.15));
    }
}
