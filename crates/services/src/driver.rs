// Copyright (c) 2024 Mike Tsao

//! Answers the audio service's requests for frames by pulling them from a
//! [Generates] implementation such as [laserharp::Synth].

use crate::{AudioServiceEvent, AudioServiceInput, AudioStereoSampleType};
use crossbeam::channel::{Receiver, Sender};
use laserharp::prelude::*;
use std::{
    sync::{Arc, Mutex},
    thread::JoinHandle,
};

/// Turns [AudioServiceEvent]s into [AudioServiceInput]s.
#[derive(Debug)]
pub struct SynthDriver<G: Generates<StereoSample>> {
    generator: G,
    buffer: Vec<StereoSample>,
    underruns: usize,
}
impl<G: Generates<StereoSample>> SynthDriver<G> {
    #[allow(missing_docs)]
    pub fn new_with(generator: G) -> Self {
        Self {
            generator,
            buffer: Vec::default(),
            underruns: 0,
        }
    }

    /// Reacts to one event from the audio service. Returns the reply that
    /// should go back to it, if any.
    pub fn handle_event(&mut self, event: AudioServiceEvent) -> Option<AudioServiceInput> {
        match event {
            AudioServiceEvent::Reset(sample_rate, channel_count) => {
                let ours = self.generator.sample_rate();
                if ours.0 != sample_rate {
                    log::warn!(
                        "Audio device runs at {sample_rate} Hz but the generator expects {} Hz; pitch will be off",
                        ours.0
                    );
                }
                log::info!("Audio device reset: {sample_rate} Hz, {channel_count} channels");
                None
            }
            AudioServiceEvent::FramesNeeded(count) => {
                self.buffer.resize(count, StereoSample::default());
                self.generator.generate(&mut self.buffer);
                let frames: Vec<AudioStereoSampleType> =
                    self.buffer.iter().map(|frame| frame.into_f32()).collect();
                Some(AudioServiceInput::Frames(Arc::new(frames)))
            }
            AudioServiceEvent::Underrun => {
                self.underruns += 1;
                log::warn!("Audio underrun #{}", self.underruns);
                None
            }
        }
    }

    /// How many times the audio device ran out of frames.
    pub fn underruns(&self) -> usize {
        self.underruns
    }

    #[allow(missing_docs)]
    pub fn generator(&self) -> &G {
        &self.generator
    }

    #[allow(missing_docs)]
    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    /// Moves the driver onto its own thread, where it answers `events` by
    /// sending replies on `inputs` until told to stop or until either
    /// channel disconnects.
    pub fn spawn(
        self,
        events: Receiver<AudioServiceEvent>,
        inputs: Sender<AudioServiceInput>,
    ) -> SynthDriverHandle<G>
    where
        G: 'static,
    {
        let (stop_sender, stop_receiver) = crossbeam::channel::bounded::<()>(1);
        let driver = Arc::new(Mutex::new(self));
        let thread_driver = Arc::clone(&driver);
        let join_handle = std::thread::spawn(move || loop {
            crossbeam::select! {
                recv(stop_receiver) -> _ => break,
                recv(events) -> event => {
                    let Ok(event) = event else {
                        log::debug!("Audio service hung up");
                        break;
                    };
                    let reply = match thread_driver.lock() {
                        Ok(mut driver) => driver.handle_event(event),
                        Err(_) => {
                            log::error!("Driver lock poisoned");
                            break;
                        }
                    };
                    if let Some(reply) = reply {
                        if inputs.send(reply).is_err() {
                            log::debug!("Audio service stopped listening");
                            break;
                        }
                    }
                }
            }
        });
        SynthDriverHandle {
            driver,
            stop: stop_sender,
            join_handle,
        }
    }
}

/// Controls a [SynthDriver] running on its own thread.
#[derive(Debug)]
pub struct SynthDriverHandle<G: Generates<StereoSample>> {
    driver: Arc<Mutex<SynthDriver<G>>>,
    stop: Sender<()>,
    join_handle: JoinHandle<()>,
}
impl<G: Generates<StereoSample>> SynthDriverHandle<G> {
    /// Runs the given function against the driver while the thread is paused
    /// between events.
    pub fn with_driver<R>(&self, f: impl FnOnce(&mut SynthDriver<G>) -> R) -> Option<R> {
        self.driver.lock().ok().map(|mut driver| f(&mut driver))
    }

    /// Asks the thread to exit.
    pub fn stop(&self) {
        let _ = self.stop.try_send(());
    }

    /// Stops the thread and waits for it to finish.
    pub fn join(self) -> anyhow::Result<()> {
        self.stop();
        self.join_handle
            .join()
            .map_err(|_| anyhow::Error::msg("driver thread panicked"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth_with_one_note() -> Synth {
        let mut synth = Synth::new_with(SampleRate::new(1000));
        let envelope = TriangleBuilder::default()
            .period(Seconds(0.5))
            .build()
            .unwrap();
        synth.add_sound(
            Note::new_with(FrequencyHz(100.0), envelope),
            GlobalTime(0.0),
        );
        synth
    }

    #[test]
    fn frames_needed_gets_frames() {
        let mut driver = SynthDriver::new_with(synth_with_one_note());
        let Some(AudioServiceInput::Frames(frames)) =
            driver.handle_event(AudioServiceEvent::FramesNeeded(100))
        else {
            panic!("expected frames");
        };
        assert_eq!(frames.len(), 100);
        assert!(frames.iter().all(|(l, r)| l == r));
        assert!(frames.iter().any(|(l, _)| *l != 0.0));
        assert_eq!(driver.generator().now(), GlobalTime(0.1));
    }

    #[test]
    fn other_events_need_no_reply() {
        let mut driver = SynthDriver::new_with(synth_with_one_note());
        assert!(driver
            .handle_event(AudioServiceEvent::Reset(1000, 2))
            .is_none());
        assert!(driver.handle_event(AudioServiceEvent::Underrun).is_none());
        assert!(driver.handle_event(AudioServiceEvent::Underrun).is_none());
        assert_eq!(driver.underruns(), 2);
        assert_eq!(driver.generator().now(), GlobalTime(0.0));
    }

    #[test]
    fn spawned_driver_answers_until_stopped() {
        let (event_sender, event_receiver) = crossbeam::channel::unbounded();
        let (input_sender, input_receiver) = crossbeam::channel::unbounded();
        let handle =
            SynthDriver::new_with(synth_with_one_note()).spawn(event_receiver, input_sender);

        for _ in 0..3 {
            event_sender
                .send(AudioServiceEvent::FramesNeeded(250))
                .unwrap();
        }
        for _ in 0..3 {
            match input_receiver
                .recv_timeout(std::time::Duration::from_secs(5))
                .unwrap()
            {
                AudioServiceInput::Frames(frames) => assert_eq!(frames.len(), 250),
                other => panic!("unexpected {other:?}"),
            }
        }

        // The note was half a second long, so the synth pruned it.
        assert_eq!(handle.with_driver(|d| d.generator().sound_count()), Some(0));
        handle.join().unwrap();
    }
}
