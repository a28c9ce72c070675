//! Session-local collection of caught pokemon and the catch roll
//!
//! Catch difficulty scales with base experience: every 5 points of base
//! experience shave one percentage point off the chance of a catch.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use rand::Rng;

use crate::data::Pokemon;

/// Exclusive upper bound of a catch roll
pub const ROLL_RANGE: u32 = 100;

/// A pokemon in the pokedex, with the moment it was caught
#[derive(Debug, Clone)]
pub struct CaughtPokemon {
    pub details: Pokemon,
    pub caught_at: DateTime<Local>,
}

/// Caught pokemon keyed by name
#[derive(Debug, Default)]
pub struct Pokedex {
    caught: BTreeMap<String, CaughtPokemon>,
}

impl Pokedex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a catch
    ///
    /// Returns `false` and keeps the original record if the pokemon was
    /// already caught.
    pub fn insert(&mut self, pokemon: Pokemon) -> bool {
        if self.caught.contains_key(&pokemon.name) {
            return false;
        }
        self.caught.insert(
            pokemon.name.clone(),
            CaughtPokemon {
                details: pokemon,
                caught_at: Local::now(),
            },
        );
        true
    }

    pub fn get(&self, name: &str) -> Option<&CaughtPokemon> {
        self.caught.get(name)
    }

    /// Names of caught pokemon in alphabetical order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.caught.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.caught.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caught.is_empty()
    }
}

/// Highest roll that still counts as a catch
///
/// Pokemon without a base experience value are treated as trivial to catch.
pub fn catch_threshold(base_experience: Option<u32>) -> i64 {
    100 - i64::from(base_experience.unwrap_or(0) / 5)
}

/// Whether `roll` (in `0..ROLL_RANGE`) catches a pokemon
pub fn is_caught(roll: u32, base_experience: Option<u32>) -> bool {
    i64::from(roll) <= catch_threshold(base_experience)
}

/// Rolls for a catch with the thread-local RNG
pub fn roll_catch(base_experience: Option<u32>) -> bool {
    let roll = rand::rng().random_range(0..ROLL_RANGE);
    is_caught(roll, base_experience)
}
