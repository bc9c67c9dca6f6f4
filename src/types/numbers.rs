// Copyright (c) 2024 Mike Tsao

//! Numeric types used throughout the system.

use crate::prelude::*;
use core::{
    f64::consts::TAU,
    fmt::{self, Display},
};
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// The primitive Rust type of a single audio sample.
pub type SampleType = f64;

/// [Sample] represents a single-channel audio sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Sample(pub SampleType);
impl Sample {
    /// The [SampleType] value of silence.
    pub const SILENCE_VALUE: SampleType = 0.0;
    /// A [Sample] that is silent.
    pub const SILENCE: Sample = Sample(Self::SILENCE_VALUE);
    /// The maximum positive [SampleType] value.
    pub const MAX_VALUE: SampleType = 1.0;
    /// A [Sample] having the maximum positive value.
    pub const MAX: Sample = Sample(Self::MAX_VALUE);
    /// The maximum negative [SampleType] value.
    pub const MIN_VALUE: SampleType = -1.0;
    /// A [Sample] having the maximum negative value.
    pub const MIN: Sample = Sample(Self::MIN_VALUE);

    /// Converts to a 16-bit PCM value. Out-of-range values saturate.
    pub fn into_i16(self) -> i16 {
        (self.0.clamp(Self::MIN_VALUE, Self::MAX_VALUE) * i16::MAX as SampleType) as i16
    }
}
impl From<f64> for Sample {
    fn from(value: f64) -> Self {
        Sample(value)
    }
}
impl From<f32> for Sample {
    fn from(value: f32) -> Self {
        Sample(value as SampleType)
    }
}
impl From<BipolarNormal> for Sample {
    fn from(value: BipolarNormal) -> Self {
        Sample(value.0)
    }
}

/// [StereoSample] is a two-channel sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct StereoSample(pub Sample, pub Sample);
impl StereoSample {
    /// Silence (0.0).
    pub const SILENCE: StereoSample = StereoSample(Sample::SILENCE, Sample::SILENCE);
    /// The loudest positive value (1.0).
    pub const MAX: StereoSample = StereoSample(Sample::MAX, Sample::MAX);
    /// The loudest negative value (-1.0).
    pub const MIN: StereoSample = StereoSample(Sample::MIN, Sample::MIN);

    /// Creates a new [StereoSample] from left and right [Sample]s.
    pub fn new(left: Sample, right: Sample) -> Self {
        Self(left, right)
    }

    #[allow(missing_docs)]
    pub fn left(&self) -> Sample {
        self.0
    }

    #[allow(missing_docs)]
    pub fn right(&self) -> Sample {
        self.1
    }

    /// (left, right) as 16-bit PCM.
    pub fn into_i16(self) -> (i16, i16) {
        (self.0.into_i16(), self.1.into_i16())
    }

    /// (left, right) as f32, which is what most audio interfaces want.
    pub fn into_f32(self) -> (f32, f32) {
        (self.0 .0 as f32, self.1 .0 as f32)
    }
}
// The engine mixes in mono, so every frame is the same value on both channels.
impl From<Sample> for StereoSample {
    fn from(value: Sample) -> Self {
        Self(value, value)
    }
}

/// Cycles per second. Zero is legal and means silence; negative isn't.
#[derive(Synonym, Serialize, Deserialize)]
#[synonym(skip(Display))]
#[serde(rename_all = "kebab-case")]
pub struct FrequencyHz(pub f64);
impl FrequencyHz {
    /// How many cycles complete in the given duration at this frequency.
    pub fn cycles_in(&self, duration: Seconds) -> f64 {
        self.0 * duration.0
    }

    /// The frequency `steps` equal divisions of an octave above this one,
    /// where an octave has `steps_per_octave` divisions.
    pub fn transposed(&self, steps: i32, steps_per_octave: u8) -> FrequencyHz {
        FrequencyHz(self.0 * 2.0f64.powf(steps as f64 / steps_per_octave as f64))
    }
}
impl Display for FrequencyHz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:0.2} Hz", self.0))
    }
}

/// A position within a cycle, in radians. Phase accumulators are unbounded, so
/// an [Angle] is not reduced to [0, 2π).
#[derive(Synonym, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Angle(pub f64);
impl Angle {
    /// Half a turn.
    pub const HALF_TURN: Angle = Angle(TAU / 2.0);
    /// A full turn.
    pub const FULL_TURN: Angle = Angle(TAU);

    /// The angle swept by the given number of cycles.
    pub fn from_cycles(cycles: f64) -> Angle {
        Angle(cycles * TAU)
    }

    /// Position within the current cycle, in [0.0, 1.0).
    pub fn cycle_position(&self) -> f64 {
        (self.0 / TAU).rem_euclid(1.0)
    }
}
