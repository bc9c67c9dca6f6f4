// Copyright (c) 2024 Mike Tsao

//! Messages exchanged with the audio service.

use std::sync::Arc;

/// The fundamental type of an audio sample, as the audio interface wants it.
pub type AudioSampleType = f32;
/// (left channel, right channel)
pub type AudioStereoSampleType = (AudioSampleType, AudioSampleType);

/// An [AudioServiceInput] tells the audio service what to do.
#[derive(Debug)]
pub enum AudioServiceInput {
    /// Asks the service to exit.
    Quit,
    /// Provides audio frames for the audio interface. They will be added to the
    /// service's internal ring buffer and consumed as needed.
    Frames(Arc<Vec<AudioStereoSampleType>>),
    /// Starts the underlying audio interface. It's unnecessary to send this for
    /// every new service, because a new service plays automatically upon
    /// creation.
    Play,
    /// Pauses the underlying audio interface.
    Pause,
}

/// An [AudioServiceEvent] informs clients what's going on.
#[derive(Debug, PartialEq)]
pub enum AudioServiceEvent {
    /// The service has initialized. Provides the sample rate and channel
    /// count.
    Reset(usize, u8),
    /// The audio interface needs audio frames ASAP. Provide the specified
    /// number with [AudioServiceInput::Frames].
    FramesNeeded(usize),
    /// Sent when the audio interface asked for more frames than we had
    /// available in the ring buffer.
    Underrun,
}
