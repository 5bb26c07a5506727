//! Fixed-capacity ring of timing samples

/// Circular buffer with every slot live from construction.
///
/// Slots start at `T::default()`, so averages taken before the ring has wrapped
/// once include the untouched slots. `push` overwrites the slot under the head
/// and advances it modulo the capacity.
pub struct RingBuffer<T> {
    slots: Vec<T>,
    head: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            slots: vec![T::default(); capacity],
            head: 0,
        }
    }

    pub fn push(&mut self, sample: T) {
        self.slots[self.head] = sample;
        self.head = (self.head + 1) % self.slots.len();
    }

    /// Index of the slot the next `push` will overwrite.
    pub fn head(&self) -> usize {
        self.head
    }

    pub fn slots(&self) -> &[T] {
        &self.slots
    }

}

// Nanosecond samples (common case)
impl RingBuffer<u64> {
    /// Sum over every slot, recomputed on each call.
    pub fn total(&self) -> u64 {
        self.slots.iter().copied().fold(0u64, u64::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_wraps() {
        let mut buffer = RingBuffer::<u64>::new(3);
        assert_eq!(buffer.total(), 0);

        buffer.push(10);
        buffer.push(20);
        buffer.push(30);
        assert_eq!(buffer.head(), 0);
        assert_eq!(buffer.total(), 60);

        // Should wrap around and replace slot 0
        buffer.push(40);
        assert_eq!(buffer.slots(), &[40, 20, 30]);
        assert_eq!(buffer.head(), 1);
        assert_eq!(buffer.total(), 90);
    }

    #[test]
    fn test_unfilled_slots_count_as_zero() {
        let mut buffer = RingBuffer::<u64>::new(4);
        buffer.push(2);
        assert_eq!(buffer.total(), 2);
        assert_eq!(buffer.slots().len(), 4);
    }
}
