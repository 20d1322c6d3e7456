//! Target recipe selection.
//!
//! The daily puzzle is picked from the calendar date alone, so every player
//! sees the same target on the same day. The day index and the Mulberry32
//! generator below are a compatibility contract: changing either changes
//! which recipe is "today's".

use chrono::{Datelike, NaiveDate};
use craftle_kernel::recipe::Recipe;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Year the day index counts from.
pub const EPOCH_YEAR: i32 = 2000;

/// Mulberry32 state increment.
const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;

/// 2^32, the divisor that maps a u32 onto [0, 1).
const U32_RANGE: f64 = 4_294_967_296.0;

/// How a puzzle's target recipe is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleMode {
    /// Same target for everyone on a given date.
    #[default]
    Daily,
    /// Fresh random target (practice).
    Random,
}

/// Approximate day count since [`EPOCH_YEAR`]:
/// `(year - 2000) * 365 + month0 * 12 + (day - 1)`, with January as month 0.
///
/// This is deliberately not a calendar-accurate day count; it must stay
/// bit-for-bit identical so daily puzzles stay stable.
#[must_use]
pub fn day_index(date: NaiveDate) -> i64 {
    i64::from(date.year() - EPOCH_YEAR) * 365
        + i64::from(date.month0()) * 12
        + i64::from(date.day()) - 1
}

/// Mulberry32: a 32-bit-state multiply-xor-shift generator.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Creates a generator from a 32-bit seed.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Creates a generator seeded with a day index (truncated to 32 bits).
    #[must_use]
    pub const fn from_day_index(day_index: i64) -> Self {
        Self::new(day_index as u32)
    }

    /// Next raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next uniform sample in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / U32_RANGE
    }
}

/// Catalog index of the daily target for `date`, or None for an empty catalog.
#[must_use]
pub fn daily_index(date: NaiveDate, catalog_size: usize) -> Option<usize> {
    if catalog_size == 0 {
        return None;
    }
    let day = day_index(date);
    let sample = Mulberry32::from_day_index(day).next_f64();
    let index = (sample * catalog_size as f64).floor() as usize;
    debug!("Day {} ({}) selects index {}", day, date, index);
    Some(index.min(catalog_size - 1))
}

/// The daily target recipe for `date`.
#[must_use]
pub fn daily_target(date: NaiveDate, recipes: &[Recipe]) -> Option<&Recipe> {
    daily_index(date, recipes.len()).and_then(|index| recipes.get(index))
}

/// A uniformly random target recipe. Not reproducible.
#[must_use]
pub fn random_target(recipes: &[Recipe]) -> Option<&Recipe> {
    if recipes.is_empty() {
        return None;
    }
    recipes.get(fastrand::usize(..recipes.len()))
}

/// Picks a target according to `mode`; `date` is only used in daily mode.
#[must_use]
pub fn select_target(mode: PuzzleMode, date: NaiveDate, recipes: &[Recipe]) -> Option<&Recipe> {
    match mode {
        PuzzleMode::Daily => daily_target(date, recipes),
        PuzzleMode::Random => random_target(recipes),
    }
}
