// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        Angle, BipolarNormal, FrequencyHz, GlobalTime, LocalTime, Normal, Sample, SampleRate,
        Seconds, SoundId, StereoSample,
    };
}

pub use {
    note::{note_frequency, PitchTable},
    numbers::{Angle, FrequencyHz, Sample, SampleType, StereoSample},
    ranges::{BipolarNormal, Normal, RangedF64},
    time::{GlobalTime, LocalTime, SampleRate, Seconds},
    uid::{IsUid, SoundId, UidFactory},
};

/// Named frequencies for scientific pitch notation.
pub mod pitch {
    pub use super::note::{C0, C1, C2, C3, C4, C5, C6, C7, MIDDLE_C};
}

mod note;
mod numbers;
mod ranges;
mod time;
mod uid;
