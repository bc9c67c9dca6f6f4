// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;

/// A copy of everything a [Synth](crate::orchestration::Synth) emitted, kept
/// for diagnostics. Recording has no effect on what's mixed.
///
/// Room for every frame is reserved up front. Once that's used up, further
/// frames are dropped so that recording never allocates on the audio path.
#[derive(Clone, Debug)]
pub struct Recording {
    left: Vec<Sample>,
    right: Vec<Sample>,
    sound_starts: Vec<GlobalTime>,
    capacity: usize,
    dropped: usize,
}
impl Recording {
    /// Creates an empty [Recording] with room for the given number of frames.
    pub fn new_with_capacity(frames: usize) -> Self {
        Self {
            left: Vec::with_capacity(frames),
            right: Vec::with_capacity(frames),
            sound_starts: Default::default(),
            capacity: frames,
            dropped: 0,
        }
    }

    /// Appends one frame, or drops it if the recording is full.
    pub fn push(&mut self, frame: StereoSample) {
        if self.is_full() {
            if self.dropped == 0 {
                log::warn!(
                    "Recording is full at {} frames; dropping the rest",
                    self.capacity
                );
            }
            self.dropped += 1;
            return;
        }
        self.left.push(frame.left());
        self.right.push(frame.right());
    }

    /// Whether the reserved room is used up.
    pub fn is_full(&self) -> bool {
        self.left.len() >= self.capacity
    }

    /// How many frames arrived after the recording filled up.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Notes that a sound was scheduled to start at the given time.
    pub fn mark_sound_start(&mut self, start: GlobalTime) {
        self.sound_starts.push(start);
    }

    /// The number of recorded frames.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    #[allow(missing_docs)]
    pub fn left(&self) -> &[Sample] {
        &self.left
    }

    #[allow(missing_docs)]
    pub fn right(&self) -> &[Sample] {
        &self.right
    }

    /// Recorded frames in order.
    pub fn frames(&self) -> impl Iterator<Item = StereoSample> + '_ {
        self.left
            .iter()
            .zip(self.right.iter())
            .map(|(left, right)| StereoSample::new(*left, *right))
    }

    /// When each recorded sound was scheduled to start, in the order they were
    /// added.
    pub fn sound_starts(&self) -> &[GlobalTime] {
        &self.sound_starts
    }

    /// How much time the recording covers.
    pub fn duration(&self, sample_rate: SampleRate) -> Seconds {
        Seconds(self.len() as f64 / sample_rate.0 as f64)
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
        self.sound_starts.clear();
        self.dropped = 0;
    }
}
