// Copyright (c) 2024 Mike Tsao

//! Handles digital-audio time.
//!
//! There are three distinct notions of time here, and they don't convert
//! implicitly into each other:
//!
//! * [GlobalTime] is seconds since the synth's epoch. Every sound shares it.
//! * [LocalTime] is seconds since some particular oscillator or envelope
//!   started. It's always a [GlobalTime] minus that thing's start.
//! * [Seconds] is a plain duration, like an envelope's length.

use core::ops::Add;
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// Represents the [seconds](https://en.wikipedia.org/wiki/Second) unit of
/// time, as a duration.
#[derive(Synonym, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Seconds(pub f64);
impl Seconds {
    /// The length of a note that never ends on its own (a held or repeating
    /// note). One day.
    pub const FOREVER: Seconds = Seconds(86400.0);

    /// Zero seconds.
    pub const fn zero() -> Seconds {
        Seconds(0.0)
    }

    /// Whether this duration is (at least) the [Seconds::FOREVER] sentinel.
    pub fn is_forever(&self) -> bool {
        self.0 >= Self::FOREVER.0
    }
}

/// Seconds since the synth started. Monotonically increasing, shared by all
/// sounds.
#[derive(Synonym, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalTime(pub f64);
impl GlobalTime {
    /// The synth's epoch.
    pub const START: GlobalTime = GlobalTime(0.0);

    /// The time elapsed since `origin`, from the point of view of something
    /// that started at `origin`.
    pub fn since(&self, origin: GlobalTime) -> LocalTime {
        LocalTime(self.0 - origin.0)
    }
}
impl Add<Seconds> for GlobalTime {
    type Output = GlobalTime;

    fn add(self, rhs: Seconds) -> Self::Output {
        GlobalTime(self.0 + rhs.0)
    }
}

/// Seconds since a particular oscillator or envelope started.
#[derive(Synonym, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LocalTime(pub f64);
impl LocalTime {
    /// Reduces this time modulo `period`, which is how repeating envelopes
    /// find their position within the current repetition. The result is in
    /// [0, period).
    pub fn within_period(&self, period: Seconds) -> LocalTime {
        LocalTime(self.0.rem_euclid(period.0))
    }
}

/// Samples per second. Always a positive integer; cannot be zero.
#[derive(Synonym, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[synonym(skip(Default))]
#[serde(rename_all = "kebab-case")]
pub struct SampleRate(#[derivative(Default(value = "44100"))] pub usize);
#[allow(missing_docs)]
impl SampleRate {
    pub const DEFAULT_SAMPLE_RATE: usize = 44100;
    pub const DEFAULT: SampleRate = SampleRate::new(Self::DEFAULT_SAMPLE_RATE);

    pub const fn new(value: usize) -> Self {
        if value != 0 {
            Self(value)
        } else {
            Self(Self::DEFAULT_SAMPLE_RATE)
        }
    }

    /// The time between consecutive frames.
    pub fn tick(&self) -> Seconds {
        Seconds(1.0 / self.0 as f64)
    }

    /// How many whole frames fit in the given duration.
    pub fn frames_in(&self, duration: Seconds) -> usize {
        (self.0 as f64 * duration.0) as usize
    }
}
impl From<SampleRate> for f64 {
    fn from(value: SampleRate) -> Self {
        value.0 as f64
    }
}
impl From<SampleRate> for u32 {
    fn from(value: SampleRate) -> Self {
        value.0 as u32
    }
}
