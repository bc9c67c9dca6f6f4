// Copyright (c) 2024 Mike Tsao

use crate::{prelude::*, types::note_frequency, LaserharpError};
use delegate::delegate;
use serde::{Deserialize, Serialize};

/// A [Note] is a single played note: an [Oscillator] shaped by an [Envelope].
/// It owns both. Its amplitude at any moment is the envelope's value times the
/// oscillator's.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Note {
    base_frequency: FrequencyHz,
    envelope: Envelope,
    oscillator: Oscillator,
}
impl Note {
    /// Creates a sine [Note] at the given frequency.
    pub fn new_with(frequency: FrequencyHz, envelope: impl Into<Envelope>) -> Self {
        Self::new_with_oscillator(Oscillator::new_with(frequency), envelope)
    }

    /// Creates a [Note] from an already-configured [Oscillator]. The
    /// oscillator's frequency becomes the note's base frequency.
    pub fn new_with_oscillator(oscillator: Oscillator, envelope: impl Into<Envelope>) -> Self {
        Self {
            base_frequency: oscillator.frequency(),
            envelope: envelope.into(),
            oscillator,
        }
    }

    /// Creates a sine [Note] from a scientific pitch name like "A4".
    pub fn new_with_name(name: &str, envelope: impl Into<Envelope>) -> Result<Self, LaserharpError> {
        Ok(Self::new_with(note_frequency(name)?, envelope))
    }

    /// The note's value at the given time. Advances the oscillator, so calls
    /// must be in non-decreasing time order.
    pub fn amplitude(&mut self, time: GlobalTime) -> BipolarNormal {
        let gain = self.envelope.amplitude_at(time);
        self.oscillator.amplitude(time) * gain
    }

    /// Moves the whole note (envelope and oscillator) to begin at the given
    /// time.
    pub fn schedule_at(&mut self, start: GlobalTime) {
        self.envelope.set_start(start);
        self.oscillator.set_start(start);
    }

    delegate! {
        to self.envelope {
            /// How long the note lasts. See [GeneratesEnvelope::length()].
            pub fn length(&self) -> Seconds;
            /// When the note begins.
            pub fn start(&self) -> GlobalTime;
            /// Lets the note's envelope begin its release.
            pub fn release(&mut self, time: GlobalTime);
        }
        to self.oscillator {
            /// Bends the note. Phase is preserved, so this doesn't click.
            pub fn set_frequency(&mut self, frequency: FrequencyHz);
        }
    }

    /// The frequency the note was created with, regardless of bends.
    pub fn base_frequency(&self) -> FrequencyHz {
        self.base_frequency
    }

    #[allow(missing_docs)]
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    #[allow(missing_docs)]
    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::TAU;
    use float_cmp::approx_eq;

    fn triangle(period: f64) -> Triangle {
        TriangleBuilder::default()
            .period(Seconds(period))
            .build()
            .unwrap()
    }

    #[test]
    fn amplitude_is_envelope_times_oscillator() {
        let mut note = Note::new_with(FrequencyHz(440.0), triangle(0.2));
        let envelope = note.envelope().clone();
        for i in 0..4410 {
            let t = GlobalTime(i as f64 / 44100.0);
            let expected = envelope.amplitude_at(t).0 * (TAU * 440.0 * t.0).sin();
            assert!(approx_eq!(f64, note.amplitude(t).0, expected, epsilon = 1e-9));
        }
    }

    #[test]
    fn length_comes_from_envelope() {
        let note = Note::new_with(FrequencyHz(100.0), triangle(0.35));
        assert_eq!(note.length(), Seconds(0.35));
        let note = Note::new_with(FrequencyHz(100.0), Adsr::default());
        assert_eq!(note.length(), Seconds::FOREVER);
    }

    #[test]
    fn scheduling_moves_envelope_and_oscillator() {
        let mut note = Note::new_with(FrequencyHz(1.0), triangle(1.0));
        note.schedule_at(GlobalTime(2.0));
        assert_eq!(note.start(), GlobalTime(2.0));
        assert_eq!(note.oscillator().start(), GlobalTime(2.0));

        // A quarter cycle and a quarter period in: sin is 1, triangle is 0.5.
        assert!(approx_eq!(f64, note.amplitude(GlobalTime(2.25)).0, 0.5, epsilon = 1e-9));
    }

    #[test]
    fn release_reaches_adsr() {
        let adsr = AdsrBuilder::default()
            .attack(Seconds(0.1))
            .decay(Seconds(0.1))
            .release(Seconds(0.5))
            .build()
            .unwrap();
        let mut note = Note::new_with(FrequencyHz(220.0), adsr);
        note.release(GlobalTime(1.0));
        assert!(approx_eq!(f64, note.length().0, 1.5, epsilon = 1e-9));
    }

    #[test]
    fn named_notes() {
        let note = Note::new_with_name("A4", Triangle::default()).unwrap();
        assert_eq!(note.base_frequency(), note_frequency("A4").unwrap());
        assert!(Note::new_with_name("Q4", Triangle::default()).is_err());
    }

    #[test]
    fn bends_keep_base_frequency() {
        let mut note = Note::new_with(FrequencyHz(440.0), Triangle::default());
        note.set_frequency(FrequencyHz(466.16));
        assert_eq!(note.base_frequency(), FrequencyHz(440.0));
        assert_eq!(note.oscillator().frequency(), FrequencyHz(466.16));
    }
}
