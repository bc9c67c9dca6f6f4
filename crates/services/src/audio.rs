// Copyright (c) 2024 Mike Tsao

//! [AudioService] provides channel-based communication with the
//! [cpal](https://crates.io/crates/cpal) audio interface.

use crate::{
    AudioSampleType, AudioServiceEvent, AudioServiceInput, AudioStereoSampleType,
    ProvidesService,
};
use core::fmt::Debug;
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, FromSample, Sample as CpalSample, SizedSample, Stream, StreamConfig,
    SupportedStreamConfig,
};
use crossbeam::{
    channel::{Receiver, Sender},
    queue::ArrayQueue,
};
use delegate::delegate;
use laserharp::util::CrossbeamChannel;
use std::sync::Arc;

/// A ring buffer of stereo frames that the audio callback drains.
#[derive(Clone)]
struct AudioQueue(Arc<ArrayQueue<AudioStereoSampleType>>);
impl AudioQueue {
    fn new(capacity: usize) -> Self {
        Self(Arc::new(ArrayQueue::new(capacity)))
    }

    /// How many more frames fit before pushes start overwriting.
    fn room(&self) -> usize {
        self.capacity() - self.len()
    }

    delegate! {
        to self.0 {
            fn len(&self) -> usize;
            fn capacity(&self) -> usize;
            fn pop(&self) -> Option<AudioStereoSampleType>;
            fn force_push(&self, frame: AudioStereoSampleType) -> Option<AudioStereoSampleType>;
        }
    }
}

/// Owns the cpal stream's parameters. The stream itself lives on its own
/// thread because it isn't `Send`; see
/// <https://github.com/RustAudio/cpal/issues/818>.
struct WrappedStream {
    queue: AudioQueue,

    sample_rate: usize,
    channel_count: u8,
}
impl Debug for WrappedStream {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WrappedStream")
            .field("queue_len", &self.queue.len())
            .field("sample_rate", &self.sample_rate)
            .field("channel_count", &self.channel_count)
            .finish()
    }
}
impl WrappedStream {
    /// period_size is the size, in frames, of a single group of frames in the
    /// audio buffer. <https://www.alsa-project.org/wiki/FramesPeriods>
    fn new_with(
        period_size: usize,
        sender: &Sender<AudioServiceEvent>,
        receiver: &Receiver<AudioServiceInput>,
    ) -> anyhow::Result<Self> {
        let (device, config) = Self::device_setup()?;

        // Three periods: one being played, one ready, and one being generated.
        let queue = AudioQueue::new(period_size * 3);

        let receiver = receiver.clone();
        let sender = sender.clone();
        let thread_config = config.clone();
        let thread_queue = queue.clone();
        std::thread::spawn(move || {
            let cpal_stream = match Self::stream_setup_for(
                &device,
                thread_config,
                period_size,
                thread_queue.clone(),
                sender,
            ) {
                Ok(cpal_stream) => cpal_stream,
                Err(e) => {
                    log::error!("Failed while setting up audio stream: {e:?}");
                    return;
                }
            };
            while let Ok(input) = receiver.recv() {
                match input {
                    AudioServiceInput::Frames(frames) => {
                        let overwritten = frames
                            .iter()
                            .filter(|frame| thread_queue.force_push(**frame).is_some())
                            .count();
                        if overwritten > 0 {
                            log::warn!("Audio buffer overrun: dropped {overwritten} frames");
                        }
                    }
                    AudioServiceInput::Play => {
                        if let Err(e) = cpal_stream.play() {
                            log::error!("While starting audio stream: {e:?}");
                        }
                    }
                    AudioServiceInput::Pause => {
                        if let Err(e) = cpal_stream.pause() {
                            log::error!("While pausing audio stream: {e:?}");
                        }
                    }
                    AudioServiceInput::Quit => break,
                }
            }
            log::debug!("Audio stream thread exiting");
        });
        Ok(Self {
            queue,
            sample_rate: config.sample_rate().0 as usize,
            channel_count: config.channels() as u8,
        })
    }

    /// Returns the default output device and its preferred config.
    fn device_setup() -> anyhow::Result<(cpal::Device, SupportedStreamConfig)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::Error::msg("Default output device is not available"))?;
        let config = device.default_output_config()?;
        log::info!(
            "Audio output: {} channels at {} Hz ({:?})",
            config.channels(),
            config.sample_rate().0,
            config.sample_format()
        );
        Ok((device, config))
    }

    /// Creates a Stream that drains the supplied [AudioQueue], converting to
    /// whatever sample format the device wants.
    fn stream_setup_for(
        device: &cpal::Device,
        config: SupportedStreamConfig,
        period_size: usize,
        queue: AudioQueue,
        sender: Sender<AudioServiceEvent>,
    ) -> anyhow::Result<Stream> {
        let sample_format = config.sample_format();
        let mut config: StreamConfig = config.into();
        config.buffer_size = BufferSize::Fixed(period_size as u32);

        match sample_format {
            cpal::SampleFormat::I16 => {
                Self::stream_make::<i16>(&config, device, period_size, queue, sender)
            }
            cpal::SampleFormat::I32 => {
                Self::stream_make::<i32>(&config, device, period_size, queue, sender)
            }
            cpal::SampleFormat::U16 => {
                Self::stream_make::<u16>(&config, device, period_size, queue, sender)
            }
            cpal::SampleFormat::F32 => {
                Self::stream_make::<f32>(&config, device, period_size, queue, sender)
            }
            cpal::SampleFormat::F64 => {
                Self::stream_make::<f64>(&config, device, period_size, queue, sender)
            }
            _ => anyhow::bail!("Unsupported sample format {sample_format:?}"),
        }
    }

    fn stream_make<T>(
        config: &cpal::StreamConfig,
        device: &cpal::Device,
        period_size: usize,
        queue: AudioQueue,
        sender: Sender<AudioServiceEvent>,
    ) -> anyhow::Result<Stream>
    where
        T: SizedSample + FromSample<AudioSampleType>,
    {
        let channel_count = config.channels as usize;
        let stream = device.build_output_stream(
            config,
            move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
                Self::on_window(output, channel_count, period_size, &queue, &sender)
            },
            |e| log::error!("Audio output stream error: {e}"),
            None,
        )?;
        Ok(stream)
    }

    /// cpal callback. Copies frames out of the queue, pads with silence if the
    /// queue runs dry, and asks the client for more.
    fn on_window<T>(
        output: &mut [T],
        channel_count: usize,
        period_size: usize,
        queue: &AudioQueue,
        sender: &Sender<AudioServiceEvent>,
    ) where
        T: CpalSample + FromSample<AudioSampleType>,
    {
        let need_len = output.len() / channel_count.max(1);
        let mut ran_dry = false;
        for frame in output.chunks_exact_mut(channel_count) {
            let (left, right) = queue.pop().unwrap_or_else(|| {
                ran_dry = true;
                (0.0, 0.0)
            });
            frame[0] = T::from_sample(left);
            if channel_count > 1 {
                frame[1] = T::from_sample(right);
            }
            for extra in frame.iter_mut().skip(2) {
                *extra = T::EQUILIBRIUM;
            }
        }
        if ran_dry {
            let _ = sender.send(AudioServiceEvent::Underrun);
        }

        let request_len = Self::frames_to_request(queue.len(), need_len, period_size)
            .min(queue.room());
        if request_len > 0 {
            let _ = sender.send(AudioServiceEvent::FramesNeeded(request_len));
        }
    }

    /// How many frames to ask for after a callback that consumed `need_len`,
    /// given that `have_len` are still queued.
    fn frames_to_request(have_len: usize, need_len: usize, period_size: usize) -> usize {
        if have_len < need_len {
            // At risk of underrun. Ask for more than was just consumed.
            need_len * 2
        } else if have_len > need_len * 2 {
            // Well ahead. Replace only half.
            need_len / 2
        } else {
            need_len
        }
        .min(period_size)
    }
}

/// [AudioService] provides channel-based communication with the default cpal
/// audio output. It starts playing as soon as it's created, announces itself
/// with [AudioServiceEvent::Reset], and then asks for frames with
/// [AudioServiceEvent::FramesNeeded].
#[derive(Debug)]
pub struct AudioService {
    inputs: CrossbeamChannel<AudioServiceInput>,
    events: CrossbeamChannel<AudioServiceEvent>,

    #[allow(dead_code)]
    stream: WrappedStream,
}
impl ProvidesService<AudioServiceInput, AudioServiceEvent> for AudioService {
    fn receiver(&self) -> &Receiver<AudioServiceEvent> {
        &self.events.receiver
    }

    fn sender(&self) -> &Sender<AudioServiceInput> {
        &self.inputs.sender
    }
}
impl AudioService {
    /// A reasonable period size. This value is on the upper edge of perceptible
    /// latency for 44.1KHz (512 / 44100 = 11.6 milliseconds).
    pub const SUGGESTED_PERIOD_SIZE: usize = 512;

    /// Opens the default output device with an internal buffer sized from the
    /// given period size.
    pub fn new_with(period_size: Option<usize>) -> anyhow::Result<Self> {
        let inputs: CrossbeamChannel<AudioServiceInput> = Default::default();
        let events: CrossbeamChannel<AudioServiceEvent> = Default::default();
        let period_size = period_size.unwrap_or(Self::SUGGESTED_PERIOD_SIZE);
        let stream = WrappedStream::new_with(period_size, &events.sender, &inputs.receiver)?;
        events.sender.send(AudioServiceEvent::Reset(
            stream.sample_rate,
            stream.channel_count,
        ))?;
        Ok(Self {
            inputs,
            events,
            stream,
        })
    }
}
