// Copyright (c) 2024 Mike Tsao

//! The `render` example plays a phrase of notes into a WAV file (and, with
//! the `image` feature, a PNG plot of the waveform).

use clap::{Parser, ValueEnum};
use laserharp::{orchestration::RecordingExporter, prelude::*};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum EnvelopeShape {
    #[default]
    Adsr,
    Gaussian,
    Triangle,
}

#[derive(Parser, Debug)]
#[clap(author, about, long_about = None)]
struct Args {
    /// Notes to play, in scientific pitch notation ("A4")
    #[clap(default_values = ["C4", "E4", "G4", "C5", "G4", "E4", "C4"])]
    notes: Vec<String>,

    /// The shape of each note's envelope
    #[clap(short, long, value_enum, default_value_t)]
    envelope: EnvelopeShape,

    /// Seconds between note starts
    #[clap(short = 'g', long, default_value_t = 0.25)]
    gap: f64,

    /// How long each note sounds, in seconds
    #[clap(short = 'l', long, default_value_t = 0.4)]
    length: f64,

    /// Synth settings file (JSON). Defaults apply if omitted.
    #[clap(short, long)]
    settings: Option<PathBuf>,

    /// Where to write the WAV file
    #[clap(short, long, default_value = "laserharp.wav")]
    output: PathBuf,

    /// Also plot the waveform to this PNG file
    #[cfg(feature = "image")]
    #[clap(short, long)]
    png: Option<PathBuf>,

    /// Enable debug logging
    #[clap(short = 'd', long, value_parser)]
    debug: bool,
}

fn make_envelope(shape: EnvelopeShape, length: Seconds) -> anyhow::Result<Envelope> {
    Ok(match shape {
        EnvelopeShape::Adsr => AdsrBuilder::default()
            .attack(Seconds(0.01))
            .decay(Seconds(0.05))
            .sustain(Normal::new(0.6))
            .release(Seconds(length.0 / 4.0))
            .build()?
            .into(),
        EnvelopeShape::Gaussian => GaussianBuilder::default()
            .center(Seconds(length.0 / 2.0))
            .width(Seconds(length.0 / 8.0))
            .build()?
            .into(),
        EnvelopeShape::Triangle => TriangleBuilder::default()
            .period(length)
            .build()?
            .into(),
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.debug { "debug" } else { "info" }),
    )
    .init();

    let mut settings = match &args.settings {
        Some(path) => SynthSettings::load(path)?,
        None => SynthSettings::default(),
    };
    settings.set_is_recording(true);
    let mut synth = Synth::new_with_settings(&settings);
    let sample_rate = settings.sample_rate();

    let length = Seconds(args.length);
    for (i, name) in args.notes.iter().enumerate() {
        let start = GlobalTime(i as f64 * args.gap);
        let note = Note::new_with_name(name, make_envelope(args.envelope, length)?)?;
        let id = synth.add_sound(note, start);
        log::debug!("{name} is sound {} at {:.2}s", id.0, start.0);

        // Hold each key for the note's length minus its release.
        synth.release_sound(id, start + Seconds(length.0 * 0.75));
    }

    let total = Seconds(args.gap * args.notes.len() as f64 + args.length);
    let mut buffer = vec![StereoSample::SILENCE; settings.period_size()];
    while synth.now() < GlobalTime::START + total {
        synth.stream(&mut buffer);
    }
    log::info!(
        "Rendered {:.2}s; {} sounds still scheduled",
        synth.now().0,
        synth.sound_count()
    );

    let Some(recording) = synth.take_recording() else {
        anyhow::bail!("synth wasn't recording");
    };
    RecordingExporter::export_to_wav(&recording, sample_rate, &args.output)?;
    #[cfg(feature = "image")]
    if let Some(png) = &args.png {
        RecordingExporter::render_waveform_png(&recording, sample_rate, png)?;
    }
    Ok(())
}
