use chrono::{DateTime, Utc};
use rand::Rng;

use crate::error::{ResolveError, Result};

const MS_PER_DAY: i64 = 86_400_000;

/// How a global verse index is chosen for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Uniform over every verse in the corpus.
    #[default]
    Random,
    /// Same verse for everyone for the current UTC epoch day.
    Daily,
    /// Reproducible from the seed alone.
    Seeded(i64),
}

impl SelectionMode {
    pub fn select(self, total: u64, now: DateTime<Utc>) -> Result<u64> {
        match self {
            SelectionMode::Random => random_index(total),
            SelectionMode::Daily => daily_index(total, now.timestamp_millis()),
            SelectionMode::Seeded(seed) => seeded_index(total, seed),
        }
    }
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionMode::Random => write!(f, "random"),
            SelectionMode::Daily => write!(f, "daily"),
            SelectionMode::Seeded(seed) => write!(f, "seeded({seed})"),
        }
    }
}

fn ensure_nonempty(total: u64) -> Result<()> {
    if total == 0 {
        return Err(ResolveError::InvalidCorpus { total });
    }
    Ok(())
}

/// Uniform draw from the thread-local CSPRNG. `random_range` rejects
/// out-of-zone samples, so there is no modulo bias toward low indices.
pub fn random_index(total: u64) -> Result<u64> {
    ensure_nonempty(total)?;
    Ok(rand::rng().random_range(0..total))
}

/// Index for the epoch day containing `now_ms`. Day boundaries are UTC.
pub fn daily_index(total: u64, now_ms: i64) -> Result<u64> {
    ensure_nonempty(total)?;
    let days = now_ms.div_euclid(MS_PER_DAY);
    Ok(i128::from(days).rem_euclid(i128::from(total)) as u64)
}

pub fn seeded_index(total: u64, seed: i64) -> Result<u64> {
    ensure_nonempty(total)?;
    let draw = Mulberry32::new(seed_to_state(seed)).next_f64();
    Ok(((draw * total as f64).floor() as u64).min(total - 1))
}

/// Absolute value of the seed reduced modulo 2^32.
fn seed_to_state(seed: i64) -> u32 {
    (seed.unsigned_abs() & 0xFFFF_FFFF) as u32
}

/// Mulberry32: a 32-bit state generator whose outputs are fixed by the
/// bit operations below, so the same seed yields the same sequence on
/// every platform.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Mulberry32 { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let t = self.state;
        let mut r = (t ^ (t >> 15)).wrapping_mul(1 | t);
        r ^= r.wrapping_add((r ^ (r >> 7)).wrapping_mul(61 | r));
        r ^ (r >> 14)
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}
