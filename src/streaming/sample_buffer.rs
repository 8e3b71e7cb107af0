//! Shared byte buffer between the capture producer and the analysis loop.
//!
//! A fixed-capacity ring: once full, each append overwrites the oldest
//! bytes so the most recent audio is always retained while memory stays
//! bounded. The storage sits behind a single mutex and is only reachable
//! through [`SampleBuffer::append`] and [`SampleBuffer::snapshot`].

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::defaults::SAMPLE_WIDTH;

/// Bytes copied out of the buffer at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Retained bytes, oldest first.
    pub bytes: Vec<u8>,
    /// Number of appends performed before this snapshot was taken.
    pub generation: u64,
}

/// Counters describing the buffer's history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    pub generation: u64,
    pub total_appended: u64,
    pub overwritten: u64,
    pub retained: usize,
}

#[derive(Debug, Default)]
struct Inner {
    bytes: VecDeque<u8>,
    generation: u64,
    total_appended: u64,
    overwritten: u64,
}

/// Append/snapshot buffer shared by one producer and one consumer.
///
/// Neither operation fails: a poisoned lock is recovered since every
/// mutation leaves the ring in a consistent state.
#[derive(Debug)]
pub struct SampleBuffer {
    inner: Mutex<Inner>,
    capacity: Option<usize>,
}

impl SampleBuffer {
    /// Creates a ring holding at most `capacity` bytes.
    ///
    /// The capacity is rounded down to a whole number of samples (minimum
    /// one) so that eviction never splits an aligned sample.
    pub fn with_capacity(capacity: usize) -> Self {
        let aligned = (capacity / SAMPLE_WIDTH).max(1) * SAMPLE_WIDTH;
        Self {
            inner: Mutex::new(Inner {
                bytes: VecDeque::with_capacity(aligned),
                ..Inner::default()
            }),
            capacity: Some(aligned),
        }
    }

    /// Creates a ring sized for `windows` analysis windows of
    /// `window_size` samples. `windows == 0` means unbounded.
    pub fn for_windows(window_size: usize, windows: usize) -> Self {
        if windows == 0 {
            Self::unbounded()
        } else {
            Self::with_capacity(window_size.saturating_mul(windows).saturating_mul(SAMPLE_WIDTH))
        }
    }

    /// Creates a buffer that never evicts.
    pub fn unbounded() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: None,
        }
    }

    /// Maximum number of retained bytes, `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends newly captured bytes, evicting the oldest ones when full.
    pub fn append(&self, bytes: &[u8]) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.total_appended += bytes.len() as u64;

        let Some(capacity) = self.capacity else {
            inner.bytes.extend(bytes);
            return;
        };

        if bytes.len() >= capacity {
            let evicted = inner.bytes.len() + (bytes.len() - capacity);
            inner.overwritten += evicted as u64;
            inner.bytes.clear();
            inner.bytes.extend(&bytes[bytes.len() - capacity..]);
            return;
        }

        let excess = (inner.bytes.len() + bytes.len()).saturating_sub(capacity);
        if excess > 0 {
            inner.bytes.drain(..excess);
            inner.overwritten += excess as u64;
        }
        inner.bytes.extend(bytes);
    }

    /// Copies out every retained byte, oldest first.
    pub fn snapshot(&self) -> Vec<u8> {
        self.snapshot_with_generation().bytes
    }

    /// Like [`snapshot`](Self::snapshot), tagged with the append generation
    /// so a reader can tell whether anything changed since its last look.
    pub fn snapshot_with_generation(&self) -> Snapshot {
        let inner = self.lock();
        let (front, back) = inner.bytes.as_slices();
        let mut bytes = Vec::with_capacity(front.len() + back.len());
        bytes.extend_from_slice(front);
        bytes.extend_from_slice(back);
        Snapshot {
            bytes,
            generation: inner.generation,
        }
    }

    /// Number of appends so far.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn len(&self) -> usize {
        self.lock().bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().bytes.is_empty()
    }

    pub fn stats(&self) -> BufferStats {
        let inner = self.lock();
        BufferStats {
            generation: inner.generation,
            total_appended: inner.total_appended,
            overwritten: inner.overwritten,
            retained: inner.bytes.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn empty_buffer_snapshots_to_nothing() {
        let buffer = SampleBuffer::with_capacity(16);
        assert!(buffer.snapshot().is_empty());
        assert_eq!(buffer.generation(), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn appends_are_concatenated_in_order() {
        let buffer = SampleBuffer::with_capacity(64);
        buffer.append(&[1, 2, 3]);
        buffer.append(&[4, 5]);

        assert_eq!(buffer.snapshot(), vec![1, 2, 3, 4, 5]);
        assert_eq!(buffer.generation(), 2);
    }

    #[test]
    fn full_ring_overwrites_oldest_bytes() {
        let buffer = SampleBuffer::with_capacity(8);
        buffer.append(&[1, 2, 3, 4, 5, 6]);
        buffer.append(&[7, 8, 9, 10]);

        assert_eq!(buffer.snapshot(), vec![3, 4, 5, 6, 7, 8, 9, 10]);
        let stats = buffer.stats();
        assert_eq!(stats.overwritten, 2);
        assert_eq!(stats.total_appended, 10);
        assert_eq!(stats.retained, 8);
    }

    #[test]
    fn oversized_append_keeps_only_its_tail() {
        let buffer = SampleBuffer::with_capacity(4);
        buffer.append(&[1, 2]);
        buffer.append(&[3, 4, 5, 6, 7, 8]);

        assert_eq!(buffer.snapshot(), vec![5, 6, 7, 8]);
        assert_eq!(buffer.stats().overwritten, 4);
    }

    #[test]
    fn capacity_is_rounded_to_whole_samples() {
        assert_eq!(SampleBuffer::with_capacity(10).capacity(), Some(8));
        assert_eq!(SampleBuffer::with_capacity(1).capacity(), Some(4));
    }

    #[test]
    fn aligned_appends_stay_aligned_after_eviction() {
        let buffer = SampleBuffer::with_capacity(12);
        for i in 0..10u8 {
            buffer.append(&[i; 4]);
        }
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 12);
        assert_eq!(snapshot, vec![7, 7, 7, 7, 8, 8, 8, 8, 9, 9, 9, 9]);
    }

    #[test]
    fn for_windows_sizes_in_samples() {
        let buffer = SampleBuffer::for_windows(48000, 4);
        assert_eq!(buffer.capacity(), Some(48000 * 4 * 4));
        assert_eq!(SampleBuffer::for_windows(48000, 0).capacity(), None);
    }

    #[test]
    fn unbounded_buffer_keeps_everything() {
        let buffer = SampleBuffer::unbounded();
        for _ in 0..100 {
            buffer.append(&[0u8; 1000]);
        }
        assert_eq!(buffer.len(), 100_000);
        assert_eq!(buffer.stats().overwritten, 0);
    }

    #[test]
    fn snapshot_carries_generation() {
        let buffer = SampleBuffer::with_capacity(16);
        buffer.append(&[1]);
        let first = buffer.snapshot_with_generation();
        buffer.append(&[2]);
        let second = buffer.snapshot_with_generation();

        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert_eq!(second.bytes, vec![1, 2]);
    }

    #[test]
    fn concurrent_appends_and_snapshots_never_tear_samples() {
        let buffer = Arc::new(SampleBuffer::with_capacity(4 * 256));
        let producer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                for i in 0..5000u32 {
                    buffer.append(&i.to_le_bytes());
                }
            })
        };

        for _ in 0..200 {
            let snapshot = buffer.snapshot();
            assert_eq!(snapshot.len() % 4, 0);
            let values: Vec<u32> = snapshot
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect();
            assert!(values.windows(2).all(|w| w[1] == w[0] + 1));
        }

        producer.join().unwrap();
        assert_eq!(buffer.generation(), 5000);
        assert_eq!(buffer.len(), 4 * 256);
    }
}
