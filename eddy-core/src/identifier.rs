//! Time-ordered identifiers for uploaded videos.
//!
//! Identifiers are 64-bit flakes rendered as decimal strings:
//!
//! ```text
//! | 42 bits: unix millis | 10 bits: machine | 12 bits: sequence |
//! ```
//!
//! Within one generator, values strictly increase in call order. The random
//! machine component keeps separate processes sharing a videos directory from
//! colliding in practice.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};

const TIMESTAMP_BITS: u32 = 42;
const MACHINE_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;

const TIMESTAMP_MASK: u64 = (1 << TIMESTAMP_BITS) - 1;
const MAX_MACHINE_ID: u16 = (1 << MACHINE_BITS) - 1;
const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;

/// Opaque identifier of an uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Wraps an identifier received from a client or the metadata store.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation time encoded in a flake identifier.
    ///
    /// Returns `None` for identifiers that are not decimal flakes.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.0.parse::<u64>().ok()?;
        let millis = raw >> (MACHINE_BITS + SEQUENCE_BITS);
        Utc.timestamp_millis_opt(i64::try_from(millis).ok()?).single()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for VideoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Source of fresh video identifiers.
///
/// Implementations must be callable concurrently and never hand out the same
/// identifier twice.
pub trait IdGenerator: Send + Sync {
    /// Returns a new, unused identifier.
    fn next_id(&self) -> VideoId;
}

#[derive(Debug, Default)]
struct FlakeState {
    last_millis: u64,
    sequence: u64,
}

/// Flake generator combining wall-clock millis, a machine id and a sequence.
#[derive(Debug)]
pub struct FlakeIdGenerator {
    machine_id: u16,
    state: Mutex<FlakeState>,
}

impl FlakeIdGenerator {
    /// Creates a generator with a random machine component.
    pub fn new() -> Self {
        Self::with_machine_id(rand::rng().random_range(0..=MAX_MACHINE_ID))
    }

    /// Creates a generator with a fixed machine component (masked to 10 bits).
    pub fn with_machine_id(machine_id: u16) -> Self {
        Self {
            machine_id: machine_id & MAX_MACHINE_ID,
            state: Mutex::new(FlakeState::default()),
        }
    }

    /// Machine component stamped into every identifier.
    pub fn machine_id(&self) -> u16 {
        self.machine_id
    }

    /// Reserves the next (millis, sequence) pair given the current clock.
    ///
    /// The pair strictly increases across calls even when the clock stalls or
    /// steps backwards; sequence exhaustion borrows the next millisecond.
    fn reserve(&self, now_millis: u64) -> (u64, u64) {
        let mut state = self.state.lock();

        if now_millis > state.last_millis {
            state.last_millis = now_millis;
            state.sequence = 0;
        } else if state.sequence < MAX_SEQUENCE {
            state.sequence += 1;
        } else {
            state.last_millis += 1;
            state.sequence = 0;
        }

        (state.last_millis, state.sequence)
    }

    fn compose(&self, millis: u64, sequence: u64) -> u64 {
        ((millis & TIMESTAMP_MASK) << (MACHINE_BITS + SEQUENCE_BITS))
            | (u64::from(self.machine_id) << SEQUENCE_BITS)
            | sequence
    }
}

impl Default for FlakeIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for FlakeIdGenerator {
    fn next_id(&self) -> VideoId {
        let now_millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let (millis, sequence) = self.reserve(now_millis);
        VideoId(self.compose(millis, sequence).to_string())
    }
}

/// Deterministic generator producing `{prefix}-1`, `{prefix}-2`, ...
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    /// Creates a generator whose identifiers start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> VideoId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        VideoId(format!("{}-{n}", self.prefix))
    }
}
