// Copyright (c) 2024 Mike Tsao

//! System utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::SynthSettings;
}

pub use channels::CrossbeamChannel;
pub use settings::SynthSettings;

mod channels;
mod settings;
