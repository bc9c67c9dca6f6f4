// Copyright (c) 2024 Mike Tsao

//! Structs that hold configuration information about various parts of the
//! system. Intended to be serialized.

use crate::{prelude::*, LaserharpError};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contains persistent synth settings.
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct SynthSettings {
    sample_rate: SampleRate,

    /// How many frames the audio device asks for at a time.
    #[derivative(Default(value = "512"))]
    period_size: usize,

    /// How many simultaneous sounds to make room for up front. More are
    /// allowed; they just cost an allocation.
    #[derivative(Default(value = "64"))]
    voice_capacity: usize,

    is_recording: bool,

    /// How many frames to record. Frames past this are dropped.
    #[derivative(Default(value = "1_000_000"))]
    recording_capacity: usize,

    #[serde(skip)]
    has_been_saved: bool,
}
impl HasSettings for SynthSettings {
    fn has_been_saved(&self) -> bool {
        self.has_been_saved
    }

    fn needs_save(&mut self) {
        self.has_been_saved = false;
    }

    fn mark_clean(&mut self) {
        self.has_been_saved = true;
    }
}
impl SynthSettings {
    /// Reads settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, LaserharpError> {
        let json = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&json)?;
        settings.validate()?;
        settings.mark_clean();
        log::debug!("Loaded settings from {path:?}");
        Ok(settings)
    }

    /// Writes settings to a JSON file.
    pub fn save(&mut self, path: &Path) -> Result<(), LaserharpError> {
        self.validate()?;
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        self.mark_clean();
        log::debug!("Saved settings to {path:?}");
        Ok(())
    }

    /// Checks values that serde alone can't.
    pub fn validate(&self) -> Result<(), LaserharpError> {
        if self.sample_rate.0 == 0 {
            return Err(LaserharpError::InvalidSettings(
                "sample rate must be positive".to_string(),
            ));
        }
        if self.period_size == 0 {
            return Err(LaserharpError::InvalidSettings(
                "period size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the audio sample rate, in Hertz (samples per second).
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Updates the field and marks the struct eligible to save.
    pub fn set_sample_rate(&mut self, sample_rate: SampleRate) {
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.needs_save();
        }
    }

    #[allow(missing_docs)]
    pub fn period_size(&self) -> usize {
        self.period_size
    }

    /// Updates the field and marks the struct eligible to save.
    pub fn set_period_size(&mut self, period_size: usize) {
        if period_size != self.period_size {
            self.period_size = period_size;
            self.needs_save();
        }
    }

    #[allow(missing_docs)]
    pub fn voice_capacity(&self) -> usize {
        self.voice_capacity
    }

    /// Whether the synth keeps a copy of everything it emits.
    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    /// Updates the field and marks the struct eligible to save.
    pub fn set_is_recording(&mut self, is_recording: bool) {
        if is_recording != self.is_recording {
            self.is_recording = is_recording;
            self.needs_save();
        }
    }

    #[allow(missing_docs)]
    pub fn recording_capacity(&self) -> usize {
        self.recording_capacity
    }
}
