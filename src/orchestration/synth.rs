// Copyright (c) 2024 Mike Tsao

use crate::{
    orchestration::Recording,
    prelude::*,
    types::UidFactory,
    util::{CrossbeamChannel, SynthSettings},
};
use crossbeam::channel::Sender;
use std::sync::Arc;

/// A [Note] placed on the synth's timeline. It's mixed whenever
/// `start <= t <= end`, and it's discarded by the first prune at or after
/// `end`.
#[derive(Debug)]
pub struct Sound {
    id: SoundId,
    note: Note,
    start: GlobalTime,
    end: GlobalTime,
}
impl Sound {
    /// Schedules the note to begin at `start`. The note's envelope and
    /// oscillator are moved to that start.
    pub fn new_with(id: SoundId, mut note: Note, start: GlobalTime) -> Self {
        note.schedule_at(start);
        let end = start + note.length();
        Self {
            id,
            note,
            start,
            end,
        }
    }

    /// Whether this sound contributes at the given time.
    pub fn is_active_at(&self, time: GlobalTime) -> bool {
        self.start <= time && time <= self.end
    }

    /// Whether this sound has nothing more to contribute at or after the given
    /// time.
    pub fn has_ended_by(&self, time: GlobalTime) -> bool {
        self.end <= time
    }

    #[allow(missing_docs)]
    pub fn amplitude(&mut self, time: GlobalTime) -> BipolarNormal {
        self.note.amplitude(time)
    }

    fn release(&mut self, time: GlobalTime) {
        self.note.release(time);
        self.end = self.start + self.note.length();
    }

    #[allow(missing_docs)]
    pub fn id(&self) -> SoundId {
        self.id
    }

    #[allow(missing_docs)]
    pub fn start(&self) -> GlobalTime {
        self.start
    }

    #[allow(missing_docs)]
    pub fn end(&self) -> GlobalTime {
        self.end
    }

    #[allow(missing_docs)]
    pub fn note(&self) -> &Note {
        &self.note
    }
}

/// Requests from the event path, applied by the [Synth] at the top of each
/// [Synth::stream()].
#[derive(Debug)]
pub enum SynthInput {
    /// Schedule a note.
    AddSound(SoundId, Box<Note>, GlobalTime),
    /// Schedule a note to begin with the first frame of the buffer that picks
    /// up this request.
    AddSoundNow(SoundId, Box<Note>),
    /// Let a sound's envelope begin its release.
    ReleaseSound(SoundId, GlobalTime),
}

/// The mixer and scheduler.
///
/// [Synth] owns the clock and the set of scheduled sounds. Each call to
/// [Synth::stream()] applies any pending [SynthInput]s, mixes one value per
/// frame by summing every active sound, duplicates it to both channels, and
/// then discards sounds that have ended.
///
/// Mixing is a hard limiter: sums beyond ±1.0 are clamped.
#[derive(Debug)]
pub struct Synth {
    clock: SampleClock,
    sounds: Vec<Sound>,
    inputs: CrossbeamChannel<SynthInput>,
    uid_factory: Arc<UidFactory<SoundId>>,
    recording: Option<Recording>,
}
impl Default for Synth {
    fn default() -> Self {
        Self::new_with_settings(&SynthSettings::default())
    }
}
impl Configurable for Synth {
    fn sample_rate(&self) -> SampleRate {
        self.clock.sample_rate()
    }
}
impl Generates<StereoSample> for Synth {
    fn generate(&mut self, values: &mut [StereoSample]) -> bool {
        self.stream(values).1
    }
}
impl Synth {
    /// Creates a [Synth] with default settings at the given sample rate.
    pub fn new_with(sample_rate: SampleRate) -> Self {
        let mut settings = SynthSettings::default();
        settings.set_sample_rate(sample_rate);
        Self::new_with_settings(&settings)
    }

    /// Creates a [Synth] from the given settings. A zero sample rate, which
    /// would leave the clock unable to tell time, is replaced by
    /// [SampleRate::DEFAULT] with a warning.
    pub fn new_with_settings(settings: &SynthSettings) -> Self {
        if let Err(e) = settings.validate() {
            log::warn!("{e}");
        }
        let sample_rate = SampleRate::new(settings.sample_rate().0);
        if sample_rate != settings.sample_rate() {
            log::warn!("Using {} Hz instead", sample_rate.0);
        }
        log::debug!(
            "Creating synth at {} Hz with room for {} sounds",
            sample_rate.0,
            settings.voice_capacity()
        );
        Self {
            clock: SampleClock::new_with(sample_rate),
            sounds: Vec::with_capacity(settings.voice_capacity()),
            inputs: Default::default(),
            uid_factory: Default::default(),
            recording: settings
                .is_recording()
                .then(|| Recording::new_with_capacity(settings.recording_capacity())),
        }
    }

    /// A handle for scheduling sounds from another thread.
    pub fn control(&self) -> SynthControl {
        SynthControl {
            sender: self.inputs.sender.clone(),
            clock: self.clock.reader(),
            uid_factory: Arc::clone(&self.uid_factory),
        }
    }

    /// The time of the next frame to be emitted. A sound added at this time
    /// starts with the next buffer.
    pub fn now(&self) -> GlobalTime {
        self.clock.now()
    }

    /// Schedules a note to begin at `start`.
    pub fn add_sound(&mut self, note: Note, start: GlobalTime) -> SoundId {
        let id = self.uid_factory.mint_next();
        self.insert_sound(id, note, start);
        id
    }

    /// Schedules a note to begin at [Synth::now()].
    pub fn add_sound_now(&mut self, note: Note) -> SoundId {
        self.add_sound(note, self.now())
    }

    /// Asks a sound's envelope to begin its release, which may change when the
    /// sound ends. Sounds whose envelopes don't release are unaffected.
    pub fn release_sound(&mut self, id: SoundId, time: GlobalTime) {
        if let Some(sound) = self.sounds.iter_mut().find(|sound| sound.id == id) {
            sound.release(time);
        } else {
            log::debug!("release_sound: no sound {}", id.0);
        }
    }

    fn insert_sound(&mut self, id: SoundId, note: Note, start: GlobalTime) {
        if let Some(recording) = self.recording.as_mut() {
            recording.mark_sound_start(start);
        }
        self.sounds.push(Sound::new_with(id, note, start));
    }

    /// The mixed value at the given time: the sum of every active sound,
    /// clamped to [-1.0, 1.0]. Exactly zero if nothing is active.
    pub fn amplitude(&mut self, time: GlobalTime) -> Sample {
        let mut sum = 0.0;
        let mut contributors = 0;
        for sound in self.sounds.iter_mut() {
            if sound.is_active_at(time) {
                sum += sound.amplitude(time).0;
                contributors += 1;
            }
        }
        if contributors == 0 {
            Sample::SILENCE
        } else {
            Sample(sum.clamp(Sample::MIN_VALUE, Sample::MAX_VALUE))
        }
    }

    /// Discards every sound that ends at or before `time`. Everything else is
    /// kept, in order.
    pub fn prune_sounds(&mut self, time: GlobalTime) {
        self.sounds.retain(|sound| !sound.has_ended_by(time));
    }

    /// Fills the buffer with the next frames. Always fills all of it, and
    /// always returns true for "more to come."
    pub fn stream(&mut self, buffer: &mut [StereoSample]) -> (usize, bool) {
        self.handle_inputs();

        let frames = self.clock.advance(buffer.len());
        for (frame, value) in frames.clone().zip(buffer.iter_mut()) {
            let time = self.clock.time_of(frame);
            *value = StereoSample::from(self.amplitude(time));
            if let Some(recording) = self.recording.as_mut() {
                recording.push(*value);
            }
        }
        self.clock.publish();

        if !frames.is_empty() {
            self.prune_sounds(self.clock.time_of(frames.end - 1));
        }
        (buffer.len(), true)
    }

    fn handle_inputs(&mut self) {
        while let Ok(input) = self.inputs.receiver.try_recv() {
            match input {
                SynthInput::AddSound(id, note, start) => self.insert_sound(id, *note, start),
                SynthInput::AddSoundNow(id, note) => {
                    let now = self.now();
                    self.insert_sound(id, *note, now);
                }
                SynthInput::ReleaseSound(id, time) => self.release_sound(id, time),
            }
        }
    }

    /// The number of scheduled sounds, including ones that haven't started.
    pub fn sound_count(&self) -> usize {
        self.sounds.len()
    }

    #[allow(missing_docs)]
    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }

    /// The recording so far, if recording is on.
    pub fn recording(&self) -> Option<&Recording> {
        self.recording.as_ref()
    }

    /// Starts recording, discarding anything recorded earlier.
    pub fn start_recording(&mut self, capacity: usize) {
        self.recording = Some(Recording::new_with_capacity(capacity));
    }

    /// Stops recording and hands back what was recorded.
    pub fn take_recording(&mut self) -> Option<Recording> {
        self.recording.take()
    }
}

/// The event path's handle to a [Synth]. Cheap to clone and safe to send to
/// other threads. Requests are queued and take effect at the synth's next
/// buffer.
#[derive(Clone, Debug)]
pub struct SynthControl {
    sender: Sender<SynthInput>,
    clock: ClockReader,
    uid_factory: Arc<UidFactory<SoundId>>,
}
impl SynthControl {
    /// The synth's [Synth::now()] as of its last buffer.
    pub fn now(&self) -> GlobalTime {
        self.clock.now()
    }

    /// Schedules a note to begin at `start`. The returned id is valid
    /// immediately, even though the synth won't see the sound until its next
    /// buffer.
    pub fn add_sound(&self, note: Note, start: GlobalTime) -> SoundId {
        let id = self.uid_factory.mint_next();
        self.send(SynthInput::AddSound(id, Box::new(note), start));
        id
    }

    /// Schedules a note to begin with the synth's next buffer. The start time
    /// is taken by the synth when it picks up the request, so it can't fall
    /// behind the frames already mixed.
    pub fn add_sound_now(&self, note: Note) -> SoundId {
        let id = self.uid_factory.mint_next();
        self.send(SynthInput::AddSoundNow(id, Box::new(note)));
        id
    }

    /// See [Synth::release_sound()].
    pub fn release_sound(&self, id: SoundId, time: GlobalTime) {
        self.send(SynthInput::ReleaseSound(id, time));
    }

    fn send(&self, input: SynthInput) {
        if let Err(e) = self.sender.send(input) {
            log::warn!("synth is gone; dropping {:?}", e.into_inner());
        }
    }
}
