// Copyright (c) 2024 Mike Tsao

//! The traits that define many characteristics and relationships among parts of
//! the system.

use crate::prelude::*;

/// Quick import of all important traits.
pub mod prelude {
    pub use super::{Configurable, Generates, GeneratesEnvelope, HasSettings};
}

/// Something that is [Configurable] is interested in staying in sync with
/// global configuration.
pub trait Configurable {
    /// Returns this item's sample rate.
    fn sample_rate(&self) -> SampleRate;
}

/// A [Generates] creates a signal, one buffer at a time. The audio driver pulls
/// from one of these.
pub trait Generates<V: Default + Clone>: Send + core::fmt::Debug + Configurable {
    /// Fills a batch of values with new signal. Returns true if the generator
    /// has more to give. A generator that never ends always returns true.
    fn generate(&mut self, values: &mut [V]) -> bool {
        values.fill(V::default());
        false
    }
}

/// Describes how loud something is over time, as a [Normal] multiplier.
///
/// Implementations must stay within [0.0, 1.0] and be continuous for any time
/// in `[start(), start() + length()]`. Outside that window the value is
/// unspecified.
pub trait GeneratesEnvelope: core::fmt::Debug + Send {
    /// The envelope's value at the given time.
    fn amplitude_at(&self, time: GlobalTime) -> Normal;

    /// How long the envelope lasts, measured from its start. Envelopes that
    /// don't end on their own return [Seconds::FOREVER].
    fn length(&self) -> Seconds;

    /// When the envelope begins.
    fn start(&self) -> GlobalTime;

    /// Moves the envelope to begin at the given time.
    fn set_start(&mut self, start: GlobalTime);

    /// Asks the envelope to begin its final phase at the given time. Envelopes
    /// without a release phase ignore this.
    #[allow(unused_variables)]
    fn release(&mut self, time: GlobalTime) {}
}

/// Each app should have a Settings struct that is composed of subsystems having
/// their own settings. Implementing [HasSettings] helps the composed struct
/// manage its parts.
pub trait HasSettings {
    /// Whether the current state of this struct has been saved to disk.
    fn has_been_saved(&self) -> bool;
    /// Call this whenever the struct changes.
    fn needs_save(&mut self);
    /// Call this after a load() or a save().
    fn mark_clean(&mut self);
}
