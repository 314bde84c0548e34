//! One-time-passcode entry state: six single-character slots.

use serde::{Deserialize, Serialize};

/// Length of the SMS verification code
pub const CODE_LENGTH: usize = 6;

/// The six ordered slots of the code-entry screen.
///
/// Each slot holds at most one character. The slots are pure values:
/// no cross-slot validation happens here, and digits-only is enforced
/// by the input surface, not by this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntryState {
    slots: [Option<char>; CODE_LENGTH],
}

impl CodeEntryState {
    /// Creates the state with all slots empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces exactly one slot, positions 1 through 6.
    ///
    /// If `input` holds more than one character (a paste), only the last
    /// character is kept, matching the single-key-entry behaviour of the
    /// OTP fields. An empty `input` clears that slot only. Positions
    /// outside 1..=6 are ignored.
    pub fn set_slot(&mut self, position: usize, input: &str) {
        if !(1..=CODE_LENGTH).contains(&position) {
            return;
        }
        self.slots[position - 1] = input.chars().last();
    }

    /// Returns the character currently held by a slot, if any.
    pub fn slot(&self, position: usize) -> Option<char> {
        self.slots.get(position.wrapping_sub(1)).copied().flatten()
    }

    /// True iff all six slots are non-empty, regardless of edit order.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// The concatenated code in position order.
    ///
    /// `Some` only when [`is_complete`](Self::is_complete) holds; a
    /// partial code is never submittable.
    pub fn as_code(&self) -> Option<String> {
        if !self.is_complete() {
            return None;
        }
        Some(self.slots.iter().flatten().collect())
    }

    /// Clears all slots.
    pub fn clear(&mut self) {
        self.slots = Default::default();
    }
}
