//! Body handle with generational index
//!
//! Handles are lightweight (8 bytes) references into the physics world.
//! The generation counter prevents a stale handle from resolving to a body
//! that later reused the same slot.

use std::fmt;

/// Body handle (generation-indexed for safety)
///
/// Format: [32-bit index | 32-bit generation]
/// - Index: Slot in the physics world's body arena
/// - Generation: Incremented when the slot is vacated (prevents use-after-free)
///
/// Example:
/// ```ignore
/// let handle = world.insert(body);
/// world.remove(handle);
/// assert!(world.get(handle).is_none()); // generation mismatch
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Pack into a 64-bit integer (for logs and overlay output)
    pub fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Unpack from a 64-bit integer
    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}
