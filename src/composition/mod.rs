// Copyright (c) 2024 Mike Tsao

//! Notes: what gets played.

/// The most commonly used imports.
pub mod prelude {
    pub use super::Note;
}

pub use note::*;

mod note;
