// Copyright (c) 2024 Mike Tsao

//! Amplitude envelopes. Each one is a function of time that returns a [Normal]
//! gain, and each reports how long it lasts so the synth knows when a sound is
//! finished.

use crate::{prelude::*, LaserharpError};
use core::cell::Cell;
use derivative::Derivative;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;

fn check_duration(name: &str, value: Option<Seconds>) -> Result<(), String> {
    match value {
        Some(seconds) if !seconds.0.is_finite() || seconds.0 < 0.0 => {
            Err(format!("{name} must be a non-negative duration, not {}", seconds.0))
        }
        _ => Ok(()),
    }
}

fn check_period(name: &str, value: Option<Seconds>) -> Result<(), String> {
    match value {
        Some(seconds) if !seconds.0.is_finite() || seconds.0 <= 0.0 => {
            Err(format!("{name} must be positive, not {}", seconds.0))
        }
        _ => Ok(()),
    }
}

/// A classic attack-decay-sustain-release envelope, expressed in seconds.
///
/// Until [Adsr::release()](GeneratesEnvelope::release) is called, the envelope
/// doesn't know when sustain ends, and its length is [Seconds::FOREVER]. Once
/// released, sustain lasts however long it lasted, clamped to
/// `[min_sustain, max_sustain]`, and then the release ramp runs to zero.
///
/// A release that arrives more than `max_sustain` after decay ends lands after
/// the clamped release ramp has already finished. The envelope then drops from
/// the sustain level straight to zero, which clicks. Set `max_sustain` longer
/// than any note is expected to be held.
#[derive(Clone, Builder, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(
    default,
    build_fn(validate = "Self::validate", error = "LaserharpError")
)]
#[serde(rename_all = "kebab-case")]
pub struct Adsr {
    /// Time to ramp from silence to full scale.
    #[derivative(Default(value = "Seconds(0.01)"))]
    attack: Seconds,
    /// Time to fall from full scale to the sustain level.
    #[derivative(Default(value = "Seconds(0.1)"))]
    decay: Seconds,
    /// The level held until release.
    #[derivative(Default(value = "Normal::new(0.7)"))]
    sustain: Normal,
    /// Time to fall from the sustain level to silence.
    #[derivative(Default(value = "Seconds(0.2)"))]
    release: Seconds,
    /// Sustain never lasts less than this, even if released during attack.
    min_sustain: Seconds,
    /// Sustain never lasts longer than this.
    #[derivative(Default(value = "Seconds(30.0)"))]
    max_sustain: Seconds,
    /// When the envelope begins.
    start: GlobalTime,

    #[serde(skip)]
    #[builder(setter(skip))]
    e: AdsrEphemerals,
}
#[derive(Clone, Debug, Default)]
struct AdsrEphemerals {
    release_at: Option<GlobalTime>,

    // Set the first time the envelope is asked about a time past max_sustain
    // without having been released, so that the warning appears once.
    has_warned: Cell<bool>,
}
impl AdsrBuilder {
    /// Returns an [Adsr] that's probably going to sound OK. Good for testing
    /// or lazy development.
    pub fn safe_default() -> Self {
        let mut r = Self::default();
        r.attack(Seconds(0.002))
            .decay(Seconds(0.005))
            .sustain(Normal::new(0.8))
            .release(Seconds(0.01));
        r
    }

    fn validate(&self) -> Result<(), String> {
        check_duration("attack", self.attack)?;
        check_duration("decay", self.decay)?;
        check_duration("release", self.release)?;
        check_duration("min_sustain", self.min_sustain)?;
        check_duration("max_sustain", self.max_sustain)?;
        if let (Some(min), Some(max)) = (self.min_sustain, self.max_sustain) {
            if min.0 > max.0 {
                return Err(format!(
                    "min_sustain ({}) must not exceed max_sustain ({})",
                    min.0, max.0
                ));
            }
        }
        Ok(())
    }
}
impl GeneratesEnvelope for Adsr {
    fn amplitude_at(&self, time: GlobalTime) -> Normal {
        let x = time.since(self.start).0;
        if x < 0.0 {
            return Normal::zero();
        }
        if x < self.attack.0 {
            return Normal::new(x / self.attack.0);
        }
        let decay_end = self.decay_end().0;
        if x < decay_end {
            let progress = (x - self.attack.0) / self.decay.0;
            return Normal::new(1.0 - (1.0 - self.sustain.0) * progress);
        }
        match self.sustain_end() {
            Some(sustain_end) => {
                let sustain_end = sustain_end.0;
                if x < sustain_end {
                    self.sustain
                } else if x < sustain_end + self.release.0 {
                    let progress = (x - sustain_end) / self.release.0;
                    Normal::new(self.sustain.0 * (1.0 - progress))
                } else {
                    Normal::zero()
                }
            }
            None => {
                if x > decay_end + self.max_sustain.0 && !self.e.has_warned.get() {
                    self.e.has_warned.set(true);
                    log::warn!(
                        "ADSR envelope still sustaining {x:.3}s after start without a release; holding at {}",
                        self.sustain
                    );
                }
                self.sustain
            }
        }
    }

    fn length(&self) -> Seconds {
        match self.sustain_end() {
            Some(sustain_end) => Seconds(sustain_end.0 + self.release.0),
            None => Seconds::FOREVER,
        }
    }

    fn start(&self) -> GlobalTime {
        self.start
    }

    fn set_start(&mut self, start: GlobalTime) {
        self.start = start;
        self.e = Default::default();
    }

    fn release(&mut self, time: GlobalTime) {
        if let Some(release_at) = self.e.release_at {
            log::debug!(
                "ignoring release at {}; already released at {}",
                time.0,
                release_at.0
            );
            return;
        }
        self.e.release_at = Some(time);
    }
}
impl Adsr {
    fn decay_end(&self) -> Seconds {
        Seconds(self.attack.0 + self.decay.0)
    }

    // Relative to start. None until released.
    fn sustain_end(&self) -> Option<Seconds> {
        self.e.release_at.map(|release_at| {
            let decay_end = self.decay_end().0;
            let held = (release_at.since(self.start).0 - decay_end)
                .clamp(self.min_sustain.0, self.max_sustain.0);
            Seconds(decay_end + held)
        })
    }

    /// Whether release has been requested.
    pub fn is_released(&self) -> bool {
        self.e.release_at.is_some()
    }

    #[allow(missing_docs)]
    pub fn sustain(&self) -> Normal {
        self.sustain
    }
}

/// A bell curve `exp(-(x-μ)²/2σ²)` that peaks at exactly 1.0 when `x == μ`,
/// optionally repeating every `period`.
#[derive(Clone, Builder, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(
    default,
    build_fn(validate = "Self::validate", error = "LaserharpError")
)]
#[serde(rename_all = "kebab-case")]
pub struct Gaussian {
    /// Where the peak is, measured from start (or from the start of each
    /// repetition).
    #[derivative(Default(value = "Seconds(0.5)"))]
    center: Seconds,
    /// How wide the bell is. Must be positive.
    #[derivative(Default(value = "Seconds(0.1)"))]
    width: Seconds,
    /// If set, the curve repeats with this period.
    #[builder(setter(strip_option))]
    period: Option<Seconds>,
    /// If set, overrides the natural length. Otherwise a one-shot curve lasts
    /// until four widths past its center, and a repeating one lasts forever.
    #[builder(setter(strip_option))]
    length: Option<Seconds>,
    /// When the envelope begins.
    start: GlobalTime,
}
impl GaussianBuilder {
    fn validate(&self) -> Result<(), String> {
        check_duration("center", self.center)?;
        check_period("width", self.width)?;
        check_period("period", self.period.flatten())?;
        check_duration("length", self.length.flatten())
    }
}
impl GeneratesEnvelope for Gaussian {
    fn amplitude_at(&self, time: GlobalTime) -> Normal {
        let mut local_time = time.since(self.start);
        if let Some(period) = self.period {
            local_time = local_time.within_period(period);
        }
        let offset = local_time.0 - self.center.0;
        Normal::new((-offset * offset / (2.0 * self.width.0 * self.width.0)).exp())
    }

    fn length(&self) -> Seconds {
        self.length.unwrap_or(if self.period.is_some() {
            Seconds::FOREVER
        } else {
            Seconds(self.center.0 + 4.0 * self.width.0)
        })
    }

    fn start(&self) -> GlobalTime {
        self.start
    }

    fn set_start(&mut self, start: GlobalTime) {
        self.start = start;
    }
}

/// Ramps linearly from zero to 1.0 over the first half of `period`, then back
/// to zero over the second half, optionally repeating.
#[derive(Clone, Builder, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(
    default,
    build_fn(validate = "Self::validate", error = "LaserharpError")
)]
#[serde(rename_all = "kebab-case")]
pub struct Triangle {
    /// The duration of one rise and fall.
    #[derivative(Default(value = "Seconds(0.2)"))]
    period: Seconds,
    /// Whether the shape repeats.
    repeats: bool,
    /// If set, overrides the natural length, which is one period for a
    /// one-shot and forever for a repeating triangle.
    #[builder(setter(strip_option))]
    length: Option<Seconds>,
    /// When the envelope begins.
    start: GlobalTime,
}
impl TriangleBuilder {
    fn validate(&self) -> Result<(), String> {
        check_period("period", self.period)?;
        check_duration("length", self.length.flatten())
    }
}
impl GeneratesEnvelope for Triangle {
    fn amplitude_at(&self, time: GlobalTime) -> Normal {
        let mut local_time = time.since(self.start);
        if self.repeats {
            local_time = local_time.within_period(self.period);
        }
        Normal::new(self.one_period_amplitude(local_time.0))
    }

    fn length(&self) -> Seconds {
        self.length.unwrap_or(if self.repeats {
            Seconds::FOREVER
        } else {
            self.period
        })
    }

    fn start(&self) -> GlobalTime {
        self.start
    }

    fn set_start(&mut self, start: GlobalTime) {
        self.start = start;
    }
}
impl Triangle {
    fn one_period_amplitude(&self, x: f64) -> f64 {
        let period = self.period.0;
        if x < period / 2.0 {
            2.0 * x / period
        } else {
            2.0 * (period - x) / period
        }
    }
}

/// Any of the envelope shapes. This is what a [Note](crate::composition::Note)
/// holds.
#[derive(Clone, Debug, IntoStaticStr, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Envelope {
    #[allow(missing_docs)]
    Adsr(Adsr),
    #[allow(missing_docs)]
    Gaussian(Gaussian),
    #[allow(missing_docs)]
    Triangle(Triangle),
}
impl Default for Envelope {
    fn default() -> Self {
        Self::Adsr(Adsr::default())
    }
}
impl GeneratesEnvelope for Envelope {
    fn amplitude_at(&self, time: GlobalTime) -> Normal {
        match self {
            Envelope::Adsr(e) => e.amplitude_at(time),
            Envelope::Gaussian(e) => e.amplitude_at(time),
            Envelope::Triangle(e) => e.amplitude_at(time),
        }
    }

    fn length(&self) -> Seconds {
        match self {
            Envelope::Adsr(e) => e.length(),
            Envelope::Gaussian(e) => e.length(),
            Envelope::Triangle(e) => e.length(),
        }
    }

    fn start(&self) -> GlobalTime {
        match self {
            Envelope::Adsr(e) => e.start(),
            Envelope::Gaussian(e) => e.start(),
            Envelope::Triangle(e) => e.start(),
        }
    }

    fn set_start(&mut self, start: GlobalTime) {
        match self {
            Envelope::Adsr(e) => e.set_start(start),
            Envelope::Gaussian(e) => e.set_start(start),
            Envelope::Triangle(e) => e.set_start(start),
        }
    }

    fn release(&mut self, time: GlobalTime) {
        match self {
            Envelope::Adsr(e) => e.release(time),
            Envelope::Gaussian(e) => e.release(time),
            Envelope::Triangle(e) => e.release(time),
        }
    }
}
impl From<Adsr> for Envelope {
    fn from(value: Adsr) -> Self {
        Self::Adsr(value)
    }
}
impl From<Gaussian> for Envelope {
    fn from(value: Gaussian) -> Self {
        Self::Gaussian(value)
    }
}
impl From<Triangle> for Envelope {
    fn from(value: Triangle) -> Self {
        Self::Triangle(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use more_asserts::{assert_ge, assert_gt, assert_le, assert_lt};

    // Walks the envelope from start to start + length (or the first few
    // seconds of an endless one) and checks every value is a valid Normal.
    fn assert_bounded(envelope: &impl GeneratesEnvelope) {
        let length = envelope.length().0.min(5.0);
        let step = 1.0 / 1000.0;
        let mut x = 0.0;
        while x <= length {
            let value = envelope.amplitude_at(envelope.start() + Seconds(x)).0;
            assert_ge!(value, 0.0, "at {x}");
            assert_le!(value, 1.0, "at {x}");
            x += step;
        }
    }

    fn released_adsr(release_at: f64) -> Adsr {
        let mut adsr = AdsrBuilder::default()
            .attack(Seconds(0.1))
            .decay(Seconds(0.2))
            .sustain(Normal::new(0.5))
            .release(Seconds(0.4))
            .min_sustain(Seconds(0.1))
            .max_sustain(Seconds(1.0))
            .build()
            .unwrap();
        adsr.release(GlobalTime(release_at));
        adsr
    }

    #[test]
    fn all_envelopes_stay_normal() {
        assert_bounded(&Adsr::default());
        assert_bounded(&released_adsr(0.7));
        assert_bounded(&AdsrBuilder::safe_default().build().unwrap());
        assert_bounded(&Gaussian::default());
        assert_bounded(
            &GaussianBuilder::default()
                .center(Seconds(0.05))
                .width(Seconds(0.02))
                .period(Seconds(0.1))
                .build()
                .unwrap(),
        );
        assert_bounded(&Triangle::default());
        assert_bounded(
            &TriangleBuilder::default()
                .period(Seconds(0.3))
                .repeats(true)
                .start(GlobalTime(2.0))
                .build()
                .unwrap(),
        );
    }

    #[test]
    fn adsr_stages() {
        let adsr = released_adsr(0.7);
        assert_eq!(adsr.amplitude_at(GlobalTime(0.0)).0, 0.0);
        assert!(approx_eq!(f64, adsr.amplitude_at(GlobalTime(0.05)).0, 0.5, epsilon = 1e-9));
        assert!(approx_eq!(f64, adsr.amplitude_at(GlobalTime(0.1)).0, 1.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, adsr.amplitude_at(GlobalTime(0.2)).0, 0.75, epsilon = 1e-9));
        assert!(approx_eq!(f64, adsr.amplitude_at(GlobalTime(0.5)).0, 0.5, epsilon = 1e-9));
        assert!(approx_eq!(f64, adsr.amplitude_at(GlobalTime(0.9)).0, 0.25, epsilon = 1e-9));
        assert_eq!(adsr.amplitude_at(GlobalTime(1.2)).0, 0.0);
        assert!(approx_eq!(f64, adsr.length().0, 1.1, epsilon = 1e-9));
    }

    #[test]
    fn adsr_release_clamps_sustain() {
        // Released during attack: sustain still lasts min_sustain.
        let adsr = released_adsr(0.05);
        assert!(approx_eq!(f64, adsr.length().0, 0.3 + 0.1 + 0.4, epsilon = 1e-9));
        assert!(approx_eq!(f64, adsr.amplitude_at(GlobalTime(0.35)).0, 0.5, epsilon = 1e-9));

        // Released long after max_sustain: sustain was cut at max_sustain.
        let adsr = released_adsr(10.0);
        assert!(approx_eq!(f64, adsr.length().0, 0.3 + 1.0 + 0.4, epsilon = 1e-9));
        assert_lt!(adsr.amplitude_at(GlobalTime(1.5)).0, 0.5);
    }

    #[test]
    fn adsr_first_release_wins() {
        let mut adsr = released_adsr(0.7);
        adsr.release(GlobalTime(0.9));
        assert!(approx_eq!(f64, adsr.length().0, 1.1, epsilon = 1e-9));
    }

    #[test]
    fn unreleased_adsr_holds_sustain() {
        let adsr = AdsrBuilder::default()
            .sustain(Normal::new(0.6))
            .max_sustain(Seconds(1.0))
            .build()
            .unwrap();
        assert!(!adsr.is_released());
        assert_eq!(adsr.length(), Seconds::FOREVER);
        assert!(!adsr.e.has_warned.get());
        assert_eq!(adsr.amplitude_at(GlobalTime(0.5)), Normal::new(0.6));
        assert!(!adsr.e.has_warned.get());
        assert_eq!(adsr.amplitude_at(GlobalTime(5.0)), Normal::new(0.6));
        assert!(adsr.e.has_warned.get());
        assert_eq!(adsr.amplitude_at(GlobalTime(50.0)), Normal::new(0.6));
    }

    #[test]
    fn late_release_drops_to_zero() {
        let mut adsr = AdsrBuilder::default()
            .attack(Seconds(0.1))
            .decay(Seconds(0.2))
            .sustain(Normal::new(0.5))
            .release(Seconds(0.4))
            .max_sustain(Seconds(1.0))
            .build()
            .unwrap();
        assert_eq!(adsr.amplitude_at(GlobalTime(4.99)), Normal::new(0.5));

        adsr.release(GlobalTime(5.0));
        assert!(approx_eq!(f64, adsr.length().0, 1.7, epsilon = 1e-9));
        assert_eq!(adsr.amplitude_at(GlobalTime(5.0)), Normal::zero());
    }

    #[test]
    fn adsr_rebasing_forgets_release() {
        let mut adsr = released_adsr(0.7);
        adsr.set_start(GlobalTime(3.0));
        assert!(!adsr.is_released());
        assert_eq!(adsr.amplitude_at(GlobalTime(2.0)).0, 0.0);
        assert!(approx_eq!(f64, adsr.amplitude_at(GlobalTime(3.1)).0, 1.0, epsilon = 1e-9));
    }

    #[test]
    fn adsr_validation() {
        assert!(AdsrBuilder::default().attack(Seconds(-1.0)).build().is_err());
        assert!(AdsrBuilder::default()
            .min_sustain(Seconds(2.0))
            .max_sustain(Seconds(1.0))
            .build()
            .is_err());
        let zero_everything = AdsrBuilder::default()
            .attack(Seconds::zero())
            .decay(Seconds::zero())
            .release(Seconds::zero())
            .build();
        assert!(zero_everything.is_ok());
    }

    #[test]
    fn gaussian_peaks_at_center() {
        let gaussian = GaussianBuilder::default()
            .center(Seconds(0.25))
            .width(Seconds(0.05))
            .build()
            .unwrap();
        assert_eq!(gaussian.amplitude_at(GlobalTime(0.25)).0, 1.0);

        let mut previous = 1.0;
        for i in 1..=100 {
            let offset = i as f64 * 0.002;
            let left = gaussian.amplitude_at(GlobalTime(0.25 - offset)).0;
            let right = gaussian.amplitude_at(GlobalTime(0.25 + offset)).0;
            assert_lt!(left, previous);
            assert!(approx_eq!(f64, left, right, epsilon = 1e-12));
            previous = left;
        }
    }

    #[test]
    fn gaussian_repeats_every_period() {
        let gaussian = GaussianBuilder::default()
            .center(Seconds(0.5))
            .width(Seconds(0.1))
            .period(Seconds(1.0))
            .start(GlobalTime(1.0))
            .build()
            .unwrap();
        assert_eq!(gaussian.length(), Seconds::FOREVER);
        assert_eq!(gaussian.amplitude_at(GlobalTime(1.5)).0, 1.0);
        assert_eq!(gaussian.amplitude_at(GlobalTime(4.5)).0, 1.0);
        assert!(approx_eq!(
            f64,
            gaussian.amplitude_at(GlobalTime(1.3)).0,
            gaussian.amplitude_at(GlobalTime(3.3)).0,
            epsilon = 1e-9
        ));
    }

    #[test]
    fn gaussian_length() {
        let gaussian = GaussianBuilder::default()
            .center(Seconds(1.0))
            .width(Seconds(0.25))
            .build()
            .unwrap();
        assert!(approx_eq!(f64, gaussian.length().0, 2.0));
        let gaussian = GaussianBuilder::default()
            .length(Seconds(3.0))
            .build()
            .unwrap();
        assert_eq!(gaussian.length(), Seconds(3.0));
        assert!(GaussianBuilder::default().width(Seconds(0.0)).build().is_err());
        assert!(GaussianBuilder::default().period(Seconds(-1.0)).build().is_err());
    }

    #[test]
    fn triangle_rises_then_falls() {
        let triangle = TriangleBuilder::default()
            .period(Seconds(0.2))
            .build()
            .unwrap();
        assert_eq!(triangle.length(), Seconds(0.2));
        assert_eq!(triangle.amplitude_at(GlobalTime(0.0)).0, 0.0);
        assert!(approx_eq!(f64, triangle.amplitude_at(GlobalTime(0.05)).0, 0.5, epsilon = 1e-12));
        assert!(approx_eq!(f64, triangle.amplitude_at(GlobalTime(0.1)).0, 1.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, triangle.amplitude_at(GlobalTime(0.15)).0, 0.5, epsilon = 1e-12));
        assert!(approx_eq!(f64, triangle.amplitude_at(GlobalTime(0.2)).0, 0.0, epsilon = 1e-12));
    }

    #[test]
    fn triangle_is_symmetric_at_peak() {
        let triangle = Triangle::default();
        let half = triangle.period.0 / 2.0;
        for epsilon in [1e-3, 1e-6, 1e-9] {
            let before = triangle.amplitude_at(GlobalTime(half - epsilon)).0;
            let after = triangle.amplitude_at(GlobalTime(half + epsilon)).0;
            assert!(approx_eq!(f64, before, after, epsilon = 1e-9));
            assert_gt!(before, 1.0 - 2.0 * epsilon / triangle.period.0 - 1e-9);
        }
    }

    #[test]
    fn triangle_repeats() {
        let triangle = TriangleBuilder::default()
            .period(Seconds(0.5))
            .repeats(true)
            .build()
            .unwrap();
        assert_eq!(triangle.length(), Seconds::FOREVER);
        assert!(approx_eq!(
            f64,
            triangle.amplitude_at(GlobalTime(0.1)).0,
            triangle.amplitude_at(GlobalTime(7.6)).0,
            epsilon = 1e-9
        ));
        assert!(TriangleBuilder::default().period(Seconds(0.0)).build().is_err());
    }

    #[test]
    fn envelope_dispatch() {
        let mut envelope = Envelope::from(released_adsr(0.7));
        assert!(approx_eq!(f64, envelope.length().0, 1.1, epsilon = 1e-9));
        envelope.set_start(GlobalTime(1.0));
        assert_eq!(envelope.start(), GlobalTime(1.0));
        assert_eq!(envelope.length(), Seconds::FOREVER);
        envelope.release(GlobalTime(1.7));
        assert!(approx_eq!(f64, envelope.length().0, 1.1, epsilon = 1e-9));

        let mut envelope = Envelope::from(Triangle::default());
        envelope.release(GlobalTime(0.05));
        assert_eq!(envelope.length(), Seconds(0.2));
        let name: &'static str = (&envelope).into();
        assert_eq!(name, "Triangle");
    }
}
