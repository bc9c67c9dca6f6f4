// Copyright (c) 2024 Mike Tsao

use core::f64::consts::TAU;
use float_cmp::approx_eq;
use laserharp::{prelude::*, types::note_frequency};
use more_asserts::{assert_gt, assert_le, assert_lt};

// Plays a short phrase the way a score reader would: look up each pitch,
// schedule it, and pull buffers the way an audio driver does.
#[test]
fn phrase_renders_and_cleans_up() {
    let sample_rate = SampleRate::DEFAULT;
    let mut synth = Synth::new_with(sample_rate);

    let names = ["C4", "E4", "G4", "C5"];
    for (i, name) in names.iter().enumerate() {
        let envelope = TriangleBuilder::default()
            .period(Seconds(0.25))
            .build()
            .unwrap();
        let note = Note::new_with_name(name, envelope).unwrap();
        synth.add_sound(note, GlobalTime(i as f64 * 0.2));
    }
    assert_eq!(synth.sound_count(), names.len());

    let mut buffer = [StereoSample::SILENCE; 512];
    let mut peak: f64 = 0.0;
    let mut frames = 0;
    while synth.now() < GlobalTime(1.2) {
        let (count, more) = synth.stream(&mut buffer);
        assert_eq!(count, buffer.len());
        assert!(more);
        frames += count;
        for frame in buffer.iter() {
            assert_le!(frame.left().0.abs(), 1.0);
            assert_eq!(frame.left(), frame.right());
            peak = peak.max(frame.left().0.abs());
        }
    }
    assert_gt!(peak, 0.5);
    assert_eq!(synth.sound_count(), 0, "everything should have been pruned");
    assert!(approx_eq!(
        f64,
        synth.now().0,
        frames as f64 / sample_rate.0 as f64
    ));
}

// Two notes that overlap in time but not in phase: the sum is exactly the sum
// of the parts, up to the limiter.
#[test]
fn overlapping_notes_sum() {
    let sample_rate = SampleRate::new(8000);
    let a4 = note_frequency("A4").unwrap();
    let e5 = note_frequency("E5").unwrap();
    let envelope = GaussianBuilder::default()
        .center(Seconds(0.25))
        .width(Seconds(0.05))
        .build()
        .unwrap();

    let mut together = Synth::new_with(sample_rate);
    together.add_sound(Note::new_with(a4, envelope.clone()), GlobalTime(0.0));
    together.add_sound(Note::new_with(e5, envelope.clone()), GlobalTime(0.0));

    let mut alone_a = Synth::new_with(sample_rate);
    alone_a.add_sound(Note::new_with(a4, envelope.clone()), GlobalTime(0.0));
    let mut alone_e = Synth::new_with(sample_rate);
    alone_e.add_sound(Note::new_with(e5, envelope), GlobalTime(0.0));

    let mut mixed = [StereoSample::SILENCE; 4000];
    let mut part_a = [StereoSample::SILENCE; 4000];
    let mut part_e = [StereoSample::SILENCE; 4000];
    together.stream(&mut mixed);
    alone_a.stream(&mut part_a);
    alone_e.stream(&mut part_e);

    for i in 0..mixed.len() {
        let expected = (part_a[i].left().0 + part_e[i].left().0).clamp(-1.0, 1.0);
        assert!(approx_eq!(
            f64,
            mixed[i].left().0,
            expected,
            epsilon = 1e-12
        ));
    }
}

// A held note keeps sounding until it's released, then fades and is pruned.
#[test]
fn held_note_releases() {
    let sample_rate = SampleRate::new(10000);
    let mut synth = Synth::new_with(sample_rate);
    let adsr = AdsrBuilder::default()
        .attack(Seconds(0.01))
        .decay(Seconds(0.05))
        .sustain(Normal::new(0.5))
        .release(Seconds(0.1))
        .build()
        .unwrap();
    let id = synth.add_sound_now(Note::new_with(FrequencyHz(200.0), adsr));

    let mut buffer = [StereoSample::SILENCE; 1000];
    for _ in 0..5 {
        synth.stream(&mut buffer);
    }
    assert_eq!(synth.sound_count(), 1, "unreleased note should still be held");

    // Still sustaining at half volume.
    let peak = buffer.iter().map(|f| f.left().0.abs()).fold(0.0, f64::max);
    assert!(approx_eq!(f64, peak, 0.5, epsilon = 5e-3));

    let now = synth.now();
    synth.release_sound(id, now);
    assert!(approx_eq!(
        f64,
        synth.sounds()[0].end().0,
        now.0 + 0.1,
        epsilon = 1e-9
    ));
    synth.stream(&mut buffer);
    let tail_peak = buffer[900..]
        .iter()
        .map(|f| f.left().0.abs())
        .fold(0.0, f64::max);
    assert_lt!(tail_peak, 0.1);
    synth.stream(&mut buffer);
    assert_eq!(synth.sound_count(), 0);
    assert!(buffer.iter().all(|f| f.left().0.abs() < 1e-9));
}

// A sine at the sample grid's own rhythm lands on predictable values.
#[test]
fn frames_land_on_the_sample_grid() {
    let sample_rate = SampleRate::new(4000);
    let mut synth = Synth::new_with(sample_rate);
    let adsr = AdsrBuilder::default()
        .attack(Seconds::zero())
        .decay(Seconds::zero())
        .sustain(Normal::maximum())
        .build()
        .unwrap();
    synth.add_sound(Note::new_with(FrequencyHz(1000.0), adsr), GlobalTime(0.0));

    let mut buffer = [StereoSample::SILENCE; 8];
    synth.stream(&mut buffer);
    for (i, frame) in buffer.iter().enumerate() {
        let expected = (TAU * 1000.0 * i as f64 / 4000.0).sin();
        assert!(approx_eq!(f64, frame.left().0, expected, epsilon = 1e-9));
    }
}
