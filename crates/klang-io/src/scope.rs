//! Lock-free sample ring for cross-thread scope readout.

use crate::{Error, Result};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Single-producer single-consumer ring buffer of f32 samples.
///
/// The audio thread writes with [`put`](Self::put); a reader thread either
/// drains with [`pop`](Self::pop) or takes a non-destructive window of the
/// most recent samples with [`snapshot_latest`](Self::snapshot_latest).
/// When the ring is full, `put` overwrites the oldest sample rather than
/// blocking, so the audio thread never waits on the reader.
///
/// Samples are stored as their bit patterns in `AtomicU32` slots, and the
/// cursors only ever advance, so neither side can observe a torn sample.
pub struct ScopeBuffer {
    slots: Box<[AtomicU32]>,
    mask: usize,
    /// Total samples written; next write goes to `head & mask`.
    head: AtomicUsize,
    /// Total samples consumed or overwritten.
    tail: AtomicUsize,
}

impl ScopeBuffer {
    /// Create a ring with the given capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScopeCapacity`] unless `capacity` is a non-zero
    /// power of two.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 || !capacity.is_power_of_two() {
            return Err(Error::ScopeCapacity(capacity));
        }
        Ok(Self {
            slots: (0..capacity).map(|_| AtomicU32::new(0)).collect(),
            mask: capacity - 1,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        })
    }

    /// Number of samples the ring can hold.
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Samples currently readable.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail).min(self.capacity())
    }

    /// Whether the ring holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write one sample, overwriting the oldest if the ring is full.
    ///
    /// Producer side only; must be called from a single thread.
    pub fn put(&self, sample: f32) {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if head.wrapping_sub(tail) >= self.capacity() {
            // Full: claim the oldest slot. If the reader advanced tail in
            // the meantime the exchange fails, which also frees a slot.
            let _ = self.tail.compare_exchange(
                tail,
                tail.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Relaxed,
            );
        }

        self.slots[head & self.mask].store(sample.to_bits(), Ordering::Relaxed);
        self.head.store(head.wrapping_add(1), Ordering::Release);
    }

    /// Remove and return the oldest sample, or `None` if the ring is empty.
    ///
    /// Consumer side only; must be called from a single thread.
    pub fn pop(&self) -> Option<f32> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if head == tail {
            return None;
        }

        let bits = self.slots[tail & self.mask].load(Ordering::Relaxed);
        // Advance past the slot whether or not the producer lapped us; a
        // lapped read just returns a newer sample than expected.
        let _ = self.tail.compare_exchange(
            tail,
            tail.wrapping_add(1),
            Ordering::AcqRel,
            Ordering::Relaxed,
        );
        Some(f32::from_bits(bits))
    }

    /// Copy the most recent samples into `out`, oldest first.
    ///
    /// Non-destructive: the read cursor does not move, so `pop` still sees
    /// everything. Returns the number of samples written, which is at most
    /// `min(out.len(), len())`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is larger than the ring capacity; a window that big
    /// is a wiring bug, not a runtime condition.
    pub fn snapshot_latest(&self, out: &mut [f32]) -> usize {
        assert!(
            out.len() <= self.capacity(),
            "snapshot window {} exceeds ring capacity {}",
            out.len(),
            self.capacity()
        );
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        let available = head.wrapping_sub(tail).min(self.capacity());
        let n = available.min(out.len());

        let start = head.wrapping_sub(n);
        for (i, slot) in out.iter_mut().take(n).enumerate() {
            let bits = self.slots[start.wrapping_add(i) & self.mask].load(Ordering::Relaxed);
            *slot = f32::from_bits(bits);
        }
        n
    }
}

impl std::fmt::Debug for ScopeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_non_power_of_two_capacity() {
        assert!(matches!(ScopeBuffer::new(0), Err(Error::ScopeCapacity(0))));
        assert!(matches!(ScopeBuffer::new(7), Err(Error::ScopeCapacity(7))));
        assert!(ScopeBuffer::new(8).is_ok());
        assert!(ScopeBuffer::new(1024).is_ok());
    }

    #[test]
    fn empty_ring_reports_empty() {
        let ring = ScopeBuffer::new(8).unwrap();
        assert!(ring.is_empty());
        assert_eq!(ring.pop(), None);
        let mut out = [0.0; 8];
        assert_eq!(ring.snapshot_latest(&mut out), 0);
    }

    #[test]
    fn pop_returns_samples_in_write_order() {
        let ring = ScopeBuffer::new(8).unwrap();
        for i in 0..5 {
            ring.put(i as f32);
        }
        assert_eq!(ring.len(), 5);
        for i in 0..5 {
            assert_eq!(ring.pop(), Some(i as f32));
        }
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn full_ring_overwrites_oldest() {
        let ring = ScopeBuffer::new(8).unwrap();
        for i in 0..16 {
            ring.put(i as f32);
        }
        assert_eq!(ring.len(), 8);
        // The first 8 samples were overwritten.
        for i in 8..16 {
            assert_eq!(ring.pop(), Some(i as f32), "sample {i}");
        }
        assert_eq!(ring.pop(), None, "ninth pop past capacity must fail");
    }

    #[test]
    fn snapshot_returns_latest_window_oldest_first() {
        let ring = ScopeBuffer::new(16).unwrap();
        for i in 0..10 {
            ring.put(i as f32);
        }

        let mut out = [0.0f32; 4];
        assert_eq!(ring.snapshot_latest(&mut out), 4);
        assert_eq!(out, [6.0, 7.0, 8.0, 9.0]);

        // Snapshot is non-destructive.
        assert_eq!(ring.len(), 10);
        assert_eq!(ring.pop(), Some(0.0));
    }

    #[test]
    fn snapshot_smaller_fill_than_window() {
        let ring = ScopeBuffer::new(16).unwrap();
        ring.put(1.5);
        ring.put(-2.5);

        let mut out = [0.0f32; 8];
        assert_eq!(ring.snapshot_latest(&mut out), 2);
        assert_eq!(&out[..2], &[1.5, -2.5]);
    }

    #[test]
    fn snapshot_spans_wraparound() {
        let ring = ScopeBuffer::new(4).unwrap();
        for i in 0..7 {
            ring.put(i as f32);
        }

        let mut out = [0.0f32; 4];
        assert_eq!(ring.snapshot_latest(&mut out), 4);
        assert_eq!(out, [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    #[should_panic]
    fn snapshot_window_larger_than_capacity_panics() {
        let ring = ScopeBuffer::new(4).unwrap();
        let mut out = [0.0f32; 8];
        let _ = ring.snapshot_latest(&mut out);
    }

    #[test]
    fn interleaved_put_and_pop_keep_fifo_order() {
        let ring = ScopeBuffer::new(4).unwrap();
        ring.put(1.0);
        ring.put(2.0);
        assert_eq!(ring.pop(), Some(1.0));
        ring.put(3.0);
        ring.put(4.0);
        ring.put(5.0);
        assert_eq!(ring.pop(), Some(2.0));
        assert_eq!(ring.pop(), Some(3.0));
        assert_eq!(ring.pop(), Some(4.0));
        assert_eq!(ring.pop(), Some(5.0));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn concurrent_producer_consumer_sees_monotonic_samples() {
        use std::sync::Arc;

        let ring = Arc::new(ScopeBuffer::new(64).unwrap());
        let writer = Arc::clone(&ring);
        let handle = std::thread::spawn(move || {
            for i in 0..10_000 {
                writer.put(i as f32);
            }
        });

        let mut last = -1.0f32;
        let mut seen = 0usize;
        while seen < 1_000 {
            if let Some(sample) = ring.pop() {
                assert!(sample > last, "samples must advance: {last} -> {sample}");
                last = sample;
                seen += 1;
            }
        }
        handle.join().unwrap();
    }
}
