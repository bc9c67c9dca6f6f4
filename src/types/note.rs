// Copyright (c) 2024 Mike Tsao

//! Scientific pitch notation ("A4", "C0", ...) mapped to frequencies.
//!
//! The table covers the seven natural letters `C D E F G A B` in octaves 0
//! through 8. Each octave starts at `C0 × 2^octave`, and the letters within an
//! octave are seven equal steps apart, so letter `n` (C = 0) sits at
//! `octave base × 2^(n/7)`. That heptatonic spacing is a property of this
//! table, not of Western tuning; callers who want twelve-tone pitches can use
//! [FrequencyHz::transposed].

use crate::{prelude::*, LaserharpError};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// The frequency of C0 in Hz.
pub const C0: FrequencyHz = FrequencyHz(16.35160);
#[allow(missing_docs)]
pub const C1: FrequencyHz = FrequencyHz(C0.0 * 2.0);
#[allow(missing_docs)]
pub const C2: FrequencyHz = FrequencyHz(C0.0 * 4.0);
#[allow(missing_docs)]
pub const C3: FrequencyHz = FrequencyHz(C0.0 * 8.0);
#[allow(missing_docs)]
pub const C4: FrequencyHz = FrequencyHz(C0.0 * 16.0);
/// Middle C is C4.
pub const MIDDLE_C: FrequencyHz = C4;
#[allow(missing_docs)]
pub const C5: FrequencyHz = FrequencyHz(C0.0 * 32.0);
#[allow(missing_docs)]
pub const C6: FrequencyHz = FrequencyHz(C0.0 * 64.0);
#[allow(missing_docs)]
pub const C7: FrequencyHz = FrequencyHz(C0.0 * 128.0);

/// A read-only lookup from pitch names to frequencies. Built once; see
/// [PitchTable::global()].
#[derive(Debug)]
pub struct PitchTable {
    frequencies: FxHashMap<String, FrequencyHz>,
}
impl PitchTable {
    const LETTERS: &'static str = "CDEFGAB";
    const OCTAVES: &'static str = "012345678";

    fn new() -> Self {
        let mut frequencies = FxHashMap::default();
        for (octave, octave_char) in Self::OCTAVES.chars().enumerate() {
            let octave_base = FrequencyHz(C0.0 * 2.0f64.powi(octave as i32));
            for (step, letter) in Self::LETTERS.chars().enumerate() {
                frequencies.insert(
                    format!("{letter}{octave_char}"),
                    octave_base.transposed(step as i32, Self::LETTERS.len() as u8),
                );
            }
        }
        log::debug!("Built pitch table with {} entries", frequencies.len());
        Self { frequencies }
    }

    /// The process-wide table, built on first use.
    pub fn global() -> &'static PitchTable {
        static INSTANCE: Lazy<PitchTable> = Lazy::new(PitchTable::new);
        &INSTANCE
    }

    /// Looks up a name like "A4". Names are case-sensitive.
    pub fn get(&self, name: &str) -> Option<FrequencyHz> {
        self.frequencies.get(name).copied()
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// Returns the frequency for a scientific pitch name like "A4".
pub fn note_frequency(name: &str) -> Result<FrequencyHz, LaserharpError> {
    PitchTable::global()
        .get(name)
        .ok_or_else(|| LaserharpError::UnknownNote(name.to_string()))
}
