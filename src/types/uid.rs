// Copyright (c) 2024 Mike Tsao

//! Unique identifiers for scheduled sounds, and the factory that keeps them
//! unique.

use core::sync::atomic::Ordering;
use core::{hash::Hash, marker::PhantomData, sync::atomic::AtomicUsize};
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// Identifies one scheduled [Sound](crate::orchestration::Sound). Ids are
/// never reused, so a stale id simply fails to match anything after its sound
/// has been pruned.
#[derive(Synonym, Serialize, Deserialize, Eq, PartialEq)]
// See
// https://doc.rust-lang.org/stable/std/marker/trait.StructuralPartialEq.html
// for why we derive PartialEq rather than letting Synonym do it.
#[synonym(skip(PartialEq))]
#[serde(rename_all = "kebab-case")]
pub struct SoundId(pub usize);
impl IsUid for SoundId {
    fn as_usize(&self) -> usize {
        self.0
    }
}

/// Anything that can be minted by a [UidFactory].
pub trait IsUid: Eq + Hash + Clone + From<usize> {
    /// Returns the raw uid.
    fn as_usize(&self) -> usize;
}

/// Generates unique uids. Safe to share between threads, which is how the
/// event path can hand out a [SoundId] before the synth has even seen the
/// sound.
#[derive(Debug)]
pub struct UidFactory<U: IsUid> {
    next_uid_value: AtomicUsize,
    _phantom: PhantomData<U>,
}
impl<U: IsUid> Default for UidFactory<U> {
    fn default() -> Self {
        Self::new(1)
    }
}
impl<U: IsUid> UidFactory<U> {
    /// Creates a new [UidFactory] starting with the given value.
    pub fn new(first_uid: usize) -> Self {
        Self {
            next_uid_value: AtomicUsize::new(first_uid),
            _phantom: Default::default(),
        }
    }

    /// Generates the next unique uid.
    pub fn mint_next(&self) -> U {
        let uid_value = self.next_uid_value.fetch_add(1, Ordering::Relaxed);
        U::from(uid_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashSet, sync::Arc};

    #[test]
    fn uid_factory_mints_distinct_ids() {
        let factory = UidFactory::<SoundId>::default();
        let a = factory.mint_next();
        let b = factory.mint_next();
        assert_ne!(a, b);
        assert_eq!(a, SoundId(1));
        assert_eq!(b.as_usize(), 2);
    }

    #[test]
    fn uid_factory_is_thread_safe() {
        let factory = Arc::new(UidFactory::<SoundId>::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let factory = Arc::clone(&factory);
                std::thread::spawn(move || {
                    (0..100).map(|_| factory.mint_next()).collect::<Vec<_>>()
                })
            })
            .collect();
        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "uid minted twice");
            }
        }
        assert_eq!(seen.len(), 400);
    }
}
