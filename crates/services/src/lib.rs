// Copyright (c) 2024 Mike Tsao

//! Connects laserharp to the outside world over crossbeam channels: an audio
//! service that wraps the system's output device, and a driver that feeds it
//! from a [Synth](laserharp::Synth).

#![deny(missing_docs)]

/// The most commonly used imports.
pub mod prelude {
    #[cfg(feature = "audio")]
    pub use super::AudioService;
    pub use super::{
        AudioServiceEvent, AudioServiceInput, ProvidesService, SynthDriver, SynthDriverHandle,
    };
}

#[cfg(feature = "audio")]
pub use audio::AudioService;
pub use driver::{SynthDriver, SynthDriverHandle};
pub use traits::ProvidesService;
pub use types::{AudioSampleType, AudioServiceEvent, AudioServiceInput, AudioStereoSampleType};

#[cfg(feature = "audio")]
mod audio;
mod driver;
mod traits;
mod types;
