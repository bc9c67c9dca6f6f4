// Copyright (c) 2024 Mike Tsao

//! Scheduling, mixing, and rendering sounds.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{Recording, Sound, Synth, SynthControl};
}

pub use {
    recording::Recording,
    synth::{Sound, Synth, SynthControl, SynthInput},
    util::RecordingExporter,
};

mod recording;
mod synth;
mod util;
