//! Event cursor — tracks the position of the last applied event.

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// The projection's current position in the chain.
///
/// Events must arrive in canonical order: ascending block number, then
/// ascending log index. The cursor rejects anything at or before the last
/// accepted position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCursor {
    /// Last applied `(block_number, log_index)`; `None` before the first event.
    last: Option<(u64, u32)>,
}

impl EventCursor {
    /// A cursor that has not seen any event.
    pub fn new() -> Self {
        Self::default()
    }

    /// A cursor resuming after a previously applied position.
    pub fn resume_after(block_number: u64, log_index: u32) -> Self {
        Self {
            last: Some((block_number, log_index)),
        }
    }

    /// Last accepted position.
    pub fn position(&self) -> Option<(u64, u32)> {
        self.last
    }

    /// Returns `true` if an event at `next` may be applied now.
    pub fn accepts(&self, next: (u64, u32)) -> bool {
        self.last.map_or(true, |prev| next > prev)
    }

    /// Advance to `next`, or fail with `OutOfOrder`.
    pub fn advance(&mut self, next: (u64, u32)) -> Result<(), ProjectionError> {
        match self.last {
            Some(previous) if next <= previous => Err(ProjectionError::OutOfOrder { previous, next }),
            _ => {
                self.last = Some(next);
                Ok(())
            }
        }
    }
}
