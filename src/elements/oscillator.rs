// Copyright (c) 2024 Mike Tsao

use crate::{prelude::*, LaserharpError};
use derivative::Derivative;
use derive_builder::Builder;
use kahan::KahanSum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, IntoStaticStr};

/// A periodic function of phase. It should be periodic in 2π and stay within
/// [-1.0, 1.0]; anything outside that range is clamped.
pub type WaveFn = fn(Angle) -> f64;

/// Classic oscillator waveforms. Every built-in shape starts its cycle at zero
/// and rises.
#[derive(Clone, Copy, Debug, Default, Display, IntoStaticStr, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Waveform {
    /// Sine wave
    #[default]
    Sine,
    /// Square wave
    Square,
    /// Triangle wave
    Triangle,
    /// Sawtooth wave
    Sawtooth,
    /// Any other periodic function. Not serializable.
    #[serde(skip)]
    Custom(WaveFn),
}
impl Waveform {
    /// The waveform's value at the given phase.
    pub fn value(&self, phase: Angle) -> f64 {
        let position = phase.cycle_position();
        match self {
            Waveform::Sine => phase.0.sin(),
            Waveform::Square => {
                if position < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 4.0 * (position - (0.75 + position).floor() + 0.25).abs() - 1.0,
            Waveform::Sawtooth => 2.0 * (position - (0.5 + position).floor()),
            Waveform::Custom(f) => {
                let value = f(phase);
                if value.is_finite() {
                    value.clamp(-1.0, 1.0)
                } else {
                    0.0
                }
            }
        }
    }
}

/// A signal generator that produces a periodic waveform as a function of time.
///
/// The oscillator remembers where it is in its cycle rather than computing the
/// position from absolute time, so a frequency change takes effect from the
/// current phase and doesn't click. That makes it stateful: it must be asked
/// for [Oscillator::amplitude()] in non-decreasing time order.
#[derive(Clone, Builder, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(
    default,
    build_fn(validate = "Self::validate", error = "LaserharpError")
)]
#[serde(rename_all = "kebab-case")]
pub struct Oscillator {
    /// The fundamental waveform for this oscillator.
    waveform: Waveform,

    /// Hertz. Any non-negative number. 440 = A4
    #[derivative(Default(value = "FrequencyHz(440.0)"))]
    frequency: FrequencyHz,

    /// Where in its cycle the oscillator starts. Two otherwise identical
    /// oscillators a half-turn apart cancel each other out.
    #[serde(default)]
    initial_phase: Angle,

    #[serde(skip)]
    #[builder(setter(skip))]
    e: OscillatorEphemerals,
}
#[derive(Clone, Debug, Default)]
struct OscillatorEphemerals {
    start_time: GlobalTime,

    // Phase accumulated since start_time, in radians. Unbounded; it's summed
    // with Kahan's algorithm so that hours of tiny increments don't drift.
    phase: KahanSum<f64>,

    last_sample_time: LocalTime,
}
impl OscillatorBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(frequency) = self.frequency {
            if !frequency.0.is_finite() || frequency.0 < 0.0 {
                return Err(format!("frequency must be non-negative, not {frequency}"));
            }
        }
        Ok(())
    }
}
impl Oscillator {
    /// A sine oscillator at the given frequency.
    pub fn new_with(frequency: FrequencyHz) -> Self {
        Self {
            frequency,
            ..Default::default()
        }
    }

    /// The waveform value at the given time, advancing phase by however much
    /// time has passed since the previous call.
    pub fn amplitude(&mut self, time: GlobalTime) -> BipolarNormal {
        let local_time = time.since(self.e.start_time);
        debug_assert!(
            local_time.0 >= self.e.last_sample_time.0,
            "oscillator queried backwards in time: {} after {}",
            local_time.0,
            self.e.last_sample_time.0
        );
        let elapsed = Seconds(local_time.0 - self.e.last_sample_time.0);
        self.e.phase += Angle::from_cycles(self.frequency.cycles_in(elapsed)).0;
        self.e.last_sample_time = local_time;
        BipolarNormal::new(self.waveform.value(self.phase()))
    }

    /// Changes frequency without disturbing phase. The next
    /// [Oscillator::amplitude()] continues from the current position in the
    /// cycle.
    pub fn set_frequency(&mut self, frequency: FrequencyHz) {
        self.frequency = frequency;

        // This resets the accumulated error.
        self.e.phase = KahanSum::new_with_value(self.e.phase.sum());
    }

    /// Restarts the oscillator's clock at the given time, returning to its
    /// initial phase.
    pub fn set_start(&mut self, start: GlobalTime) {
        self.e = OscillatorEphemerals {
            start_time: start,
            ..Default::default()
        };
    }

    /// The total phase, including the initial offset.
    pub fn phase(&self) -> Angle {
        Angle(self.initial_phase.0 + self.e.phase.sum())
    }

    #[allow(missing_docs)]
    pub fn start(&self) -> GlobalTime {
        self.e.start_time
    }

    #[allow(missing_docs)]
    pub fn frequency(&self) -> FrequencyHz {
        self.frequency
    }

    #[allow(missing_docs)]
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    #[allow(missing_docs)]
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }
}
