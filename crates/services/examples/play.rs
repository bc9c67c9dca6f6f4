// Copyright (c) 2024 Mike Tsao

//! Plays an arpeggio on the default audio device. A separate thread schedules
//! the notes through a [SynthControl] while the driver thread keeps the device
//! fed.

use clap::Parser;
use laserharp::prelude::*;
use laserharp_services::prelude::*;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, about, long_about = None)]
struct Args {
    /// Notes to play, in scientific pitch notation ("A4")
    #[clap(default_values = ["A3", "C4", "E4", "A4", "E4", "C4"])]
    notes: Vec<String>,

    /// Seconds between notes
    #[clap(short = 'g', long, default_value_t = 0.3)]
    gap: f64,

    /// How many times to repeat the phrase
    #[clap(short, long, default_value_t = 2)]
    repeat: usize,

    /// Enable debug logging
    #[clap(short = 'd', long, value_parser)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.debug { "debug" } else { "info" }),
    )
    .init();

    let audio_service = AudioService::new_with(None)?;

    // The synth's clock runs at a fixed rate, so learn the device's first.
    let sample_rate = match audio_service.receiver().recv()? {
        AudioServiceEvent::Reset(sample_rate, _) => SampleRate::new(sample_rate),
        other => anyhow::bail!("Expected Reset from the audio service, got {other:?}"),
    };
    let synth = Synth::new_with(sample_rate);
    let control = synth.control();

    let mut driver = SynthDriver::new_with(synth);
    driver.handle_event(AudioServiceEvent::Reset(sample_rate.0, 2));
    let driver = driver.spawn(
        audio_service.receiver().clone(),
        audio_service.sender().clone(),
    );

    let notes = args.notes.clone();
    let gap = Seconds(args.gap);
    let repeat = args.repeat;
    let player = std::thread::spawn(move || -> anyhow::Result<()> {
        for _ in 0..repeat {
            for name in &notes {
                let envelope = AdsrBuilder::default()
                    .attack(Seconds(0.005))
                    .decay(Seconds(0.1))
                    .sustain(Normal::new(0.5))
                    .release(Seconds(0.4))
                    .build()?;
                let note = Note::new_with_name(name, envelope)?;

                // Schedule slightly ahead so the note doesn't start mid-buffer.
                let start = control.now() + Seconds(0.02);
                let id = control.add_sound(note, start);
                control.release_sound(id, start + gap);
                std::thread::sleep(Duration::from_secs_f64(gap.0));
            }
        }
        Ok(())
    });
    match player.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::error!("Player stopped early: {e:?}"),
        Err(e) => log::error!("Player thread panicked: {e:?}"),
    }

    // Let the last release ring out.
    std::thread::sleep(Duration::from_secs(1));
    if let Some(underruns) = driver.with_driver(|d| d.underruns()) {
        log::info!("Finished with {underruns} underruns");
    }
    audio_service.send_input(AudioServiceInput::Quit);
    driver.join()
}
