//! The identifier sequencer value type.
//!
//! Every `(tenant, kind)` pair owns one [`IdSequence`]. The sequence hands
//! out monotonically increasing integer ids and tracks the highest id it has
//! ever handed out or observed, so that an administrative reset can never
//! re-issue an id that exists. Backends load, mutate, and store the value
//! inside a write transaction; the type itself is pure.

use serde::{Deserialize, Serialize};

use crate::error::SequenceError;

/// The state of one identifier sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdSequence {
    /// The id the next mint will return.
    pub current_id: i64,
    /// The highest id ever minted or observed.
    pub highest_observed_id: i64,
}

impl IdSequence {
    /// A fresh sequence: the first mint returns 1, nothing observed yet.
    pub fn new() -> Self {
        Self {
            current_id: 1,
            highest_observed_id: 0,
        }
    }

    /// Restores a sequence from stored state.
    pub fn from_parts(current_id: i64, highest_observed_id: i64) -> Self {
        Self {
            current_id,
            highest_observed_id,
        }
    }

    /// Mints the next id and advances the sequence.
    pub fn advance(&mut self) -> i64 {
        let minted = self.current_id;
        self.current_id += 1;
        if minted > self.highest_observed_id {
            self.highest_observed_id = minted;
        }
        minted
    }

    /// Records an externally supplied id.
    ///
    /// After observing `id`, no future mint can return an id at or below it.
    pub fn observe(&mut self, id: i64) {
        if id > self.highest_observed_id {
            self.highest_observed_id = id;
        }
        if id >= self.current_id {
            self.current_id = id + 1;
        }
    }

    /// Moves the sequence so the next mint returns `next_id`.
    ///
    /// Fails when `next_id` does not lie strictly above the high-water mark.
    pub fn try_set_next(&mut self, next_id: i64) -> Result<(), SequenceError> {
        if next_id <= self.highest_observed_id {
            return Err(SequenceError::BelowHighWater {
                requested: next_id,
                highest_observed: self.highest_observed_id,
            });
        }
        self.current_id = next_id;
        Ok(())
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}
