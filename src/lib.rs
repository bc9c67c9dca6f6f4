// Copyright (c) 2024 Mike Tsao

#![deny(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Laserharp is a small real-time polyphonic synthesizer.
//!
//! A [Note](composition::Note) pairs an [Oscillator](elements::Oscillator)
//! with an [Envelope](elements::Envelope). The [Synth] schedules notes as
//! [Sound](orchestration::Sound)s on a shared timeline, mixes whatever is
//! sounding into a buffer of [StereoSample](types::StereoSample)s each time the
//! audio driver asks, and throws sounds away once they've finished.
//!
//! * *Offline*: create a [Synth], add sounds, and call
//! [Synth::stream()](orchestration::Synth::stream()) in a loop.
//! * *Live*: hand the [Synth] to an audio driver, and schedule sounds from
//! other threads through the [SynthControl](orchestration::SynthControl)
//! returned by [Synth::control()](orchestration::Synth::control()).

/// A collection of imports that are useful to users of this crate. `use
/// laserharp::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        composition::prelude::*, elements::prelude::*, orchestration::prelude::*,
        traits::prelude::*, types::prelude::*, util::prelude::*,
    };
}

// Fundamental structures that are important enough to re-export at top level.
pub use {error::LaserharpError, orchestration::Synth};

pub mod composition;
pub mod elements;
pub mod orchestration;
pub mod traits;
pub mod types;
pub mod util;

mod error;
