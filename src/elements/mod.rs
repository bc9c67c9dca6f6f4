// Copyright (c) 2024 Mike Tsao

//! Building blocks for the rest of the system: oscillators, envelopes, and the
//! clock that drives them.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        Adsr, AdsrBuilder, ClockReader, Envelope, Gaussian, GaussianBuilder, Oscillator,
        OscillatorBuilder, SampleClock, Triangle, TriangleBuilder, Waveform,
    };
}

pub use {
    clock::{ClockReader, SampleClock},
    envelopes::{Adsr, AdsrBuilder, Envelope, Gaussian, GaussianBuilder, Triangle, TriangleBuilder},
    oscillator::{Oscillator, OscillatorBuilder, WaveFn, Waveform},
};

mod clock;
mod envelopes;
mod oscillator;
