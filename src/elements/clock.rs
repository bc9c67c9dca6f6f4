// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use core::ops::Range;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// [SampleClock] is the global clock. It counts emitted frames, and the frame
/// count is the only source of truth for the current time: frame `k` happens
/// at `k / sample_rate` seconds.
///
/// The owner advances the clock. Other threads can watch it through a
/// [ClockReader], which sees the frame count as of the last
/// [SampleClock::publish()].
#[derive(Debug)]
pub struct SampleClock {
    sample_rate: SampleRate,
    current_frame: usize,
    published_frame: Arc<AtomicUsize>,
}
impl SampleClock {
    #[allow(missing_docs)]
    pub fn new_with(sample_rate: SampleRate) -> Self {
        Self {
            sample_rate,
            current_frame: Default::default(),
            published_frame: Default::default(),
        }
    }

    /// The frame that will be emitted next.
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// The time of the frame that will be emitted next.
    pub fn now(&self) -> GlobalTime {
        self.time_of(self.current_frame)
    }

    /// The time at which the given frame is emitted.
    pub fn time_of(&self, frame: usize) -> GlobalTime {
        frame_to_time(frame, self.sample_rate)
    }

    /// Moves the clock forward. Returns the frames that were covered.
    pub fn advance(&mut self, frames: usize) -> Range<usize> {
        let range = self.current_frame..self.current_frame + frames;
        self.current_frame = range.end;
        range
    }

    /// Makes the current frame count visible to readers.
    pub fn publish(&self) {
        self.published_frame
            .store(self.current_frame, Ordering::Release);
    }

    /// A handle other threads can use to ask what time it is.
    pub fn reader(&self) -> ClockReader {
        ClockReader {
            sample_rate: self.sample_rate,
            published_frame: Arc::clone(&self.published_frame),
        }
    }

    #[allow(missing_docs)]
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }
}

/// A read-only view of a [SampleClock], safe to send to other threads.
#[derive(Clone, Debug)]
pub struct ClockReader {
    sample_rate: SampleRate,
    published_frame: Arc<AtomicUsize>,
}
impl ClockReader {
    /// The time of the next frame the clock's owner will emit, as of its most
    /// recent publish.
    pub fn now(&self) -> GlobalTime {
        frame_to_time(self.published_frame.load(Ordering::Acquire), self.sample_rate)
    }
}

fn frame_to_time(frame: usize, sample_rate: SampleRate) -> GlobalTime {
    GlobalTime(frame as f64 / sample_rate.0 as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn time_follows_frames() {
        let mut clock = SampleClock::new_with(SampleRate::DEFAULT);
        assert_eq!(clock.now(), GlobalTime::START);

        let range = clock.advance(4410);
        assert_eq!(range, 0..4410);
        assert_eq!(clock.current_frame(), 4410);
        assert!(approx_eq!(f64, clock.now().0, 0.1));
        assert!(approx_eq!(f64, clock.time_of(1).0, SampleRate::DEFAULT.tick().0));
        assert_eq!(clock.advance(10), 4410..4420);
    }

    #[test]
    fn readers_see_published_time_only() {
        let mut clock = SampleClock::new_with(SampleRate::new(1000));
        let reader = clock.reader();
        clock.advance(500);
        assert_eq!(reader.now(), GlobalTime::START);
        clock.publish();
        assert!(approx_eq!(f64, reader.now().0, 0.5));

        let reader = std::thread::spawn(move || reader.now()).join().unwrap();
        assert!(approx_eq!(f64, reader.0, 0.5));
    }
}
