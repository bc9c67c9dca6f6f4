// Copyright (c) 2024 Mike Tsao

#[cfg(any(feature = "hound", feature = "image"))]
use crate::{orchestration::Recording, prelude::*};
#[cfg(any(feature = "hound", feature = "image"))]
use std::path::Path;

/// Exports [Recording]s to various formats.
pub struct RecordingExporter {}

#[cfg(feature = "hound")]
impl RecordingExporter {
    /// Writes the recording as a 16-bit stereo WAV file.
    pub fn export_to_wav(
        recording: &Recording,
        sample_rate: SampleRate,
        path: &Path,
    ) -> anyhow::Result<()> {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: sample_rate.into(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for frame in recording.frames() {
            let (left, right) = frame.into_i16();
            writer.write_sample(left)?;
            writer.write_sample(right)?;
        }
        writer.finalize()?;
        log::info!("Wrote {} frames to {path:?}", recording.len());
        Ok(())
    }
}

#[cfg(feature = "image")]
impl RecordingExporter {
    const STRIPE_WIDTH: u32 = 2000;
    const STRIPE_HEIGHT: u32 = 200;
    const MARGIN: u32 = 20;

    const BACKGROUND: image::Rgb<u8> = image::Rgb([255, 255, 255]);
    const AXIS: image::Rgb<u8> = image::Rgb([0, 0, 0]);
    const WAVEFORM: image::Rgb<u8> = image::Rgb([0, 0, 255]);
    const TICK: image::Rgb<u8> = image::Rgb([255, 0, 0]);
    const SOUND_START: image::Rgb<u8> = image::Rgb([0, 160, 0]);

    /// Plots the left channel of the recording, one horizontal stripe per
    /// second of audio. The zero axis is black, the waveform blue, every
    /// tenth of a second gets a red tick, and each sound's start gets a green
    /// line.
    pub fn waveform_image(recording: &Recording, sample_rate: SampleRate) -> image::RgbImage {
        let rate = sample_rate.0;
        let stripes = 1 + recording.len() / rate;
        let width = Self::MARGIN * 2 + Self::STRIPE_WIDTH;
        let height = Self::MARGIN * 2 + stripes as u32 * (Self::STRIPE_HEIGHT + Self::MARGIN);
        let mut canvas = image::RgbImage::from_pixel(width, height, Self::BACKGROUND);

        // The pixel on the zero axis where the given frame goes.
        let position = |frame: usize| -> (u32, i64) {
            let stripe = (frame / rate) as u32;
            let x = Self::MARGIN
                + (Self::STRIPE_WIDTH as f64 * (frame % rate) as f64 / rate as f64) as u32;
            let y = Self::MARGIN + stripe * (Self::STRIPE_HEIGHT + Self::MARGIN)
                + Self::STRIPE_HEIGHT / 2;
            (x, y as i64)
        };
        let plot = |canvas: &mut image::RgbImage, x: u32, y: i64, color: image::Rgb<u8>| {
            if y >= 0 && (y as u32) < canvas.height() && x < canvas.width() {
                canvas.put_pixel(x, y as u32, color);
            }
        };

        let half_height = (Self::STRIPE_HEIGHT / 2) as f64;
        for (frame, sample) in recording.left().iter().enumerate() {
            let (x, y) = position(frame);
            plot(&mut canvas, x, y, Self::AXIS);
            plot(&mut canvas, x, y - (sample.0 * half_height) as i64, Self::WAVEFORM);
        }

        let tick_half_length = (Self::STRIPE_HEIGHT / 8) as i64;
        let tenths = recording.len() * 10 / rate;
        for tenth in 0..=tenths {
            let (x, y) = position(tenth * rate / 10);
            for dy in -tick_half_length..tick_half_length {
                plot(&mut canvas, x, y + dy, Self::TICK);
            }
        }

        let line_half_length = (Self::STRIPE_HEIGHT / 2) as i64;
        for start in recording.sound_starts() {
            if start.0 < 0.0 {
                continue;
            }
            let (x, y) = position(sample_rate.frames_in(Seconds(start.0)));
            for dy in -line_half_length..line_half_length {
                plot(&mut canvas, x, y + dy, Self::SOUND_START);
            }
        }
        canvas
    }

    /// Writes [RecordingExporter::waveform_image()] to a PNG file.
    pub fn render_waveform_png(
        recording: &Recording,
        sample_rate: SampleRate,
        path: &Path,
    ) -> anyhow::Result<()> {
        Self::waveform_image(recording, sample_rate).save_with_format(path, image::ImageFormat::Png)?;
        log::info!("Wrote waveform plot to {path:?}");
        Ok(())
    }
}
