//! Accumulation of flat-colored triangles or line segments.

use glam::Vec3;
use vermilion_core::Color;

/// Floats per polygon vertex: position xyz + color rgba, interleaved.
pub const VERTEX_FLOATS: usize = 7;

/// Accumulates loose vertices into an interleaved float stream.
///
/// One batch instance serves one topology: the fill batch collects triangle
/// vertices, the stroke batch line-segment endpoints. Capacity is a vertex
/// count per draw submission; when a [`reserve`](PolygonBatch::reserve) would
/// overrun it, the pending vertices are sealed into their own submission so
/// no single upload ever exceeds the underlying buffer, and submission order
/// is preserved.
pub struct PolygonBatch {
    capacity: usize,
    sealed: Vec<Vec<f32>>,
    pending: Vec<f32>,
}

impl PolygonBatch {
    /// Create a batch holding up to `capacity` vertices per submission.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            sealed: Vec::new(),
            pending: Vec::with_capacity(capacity * VERTEX_FLOATS),
        }
    }

    /// Vertex capacity per draw submission.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Vertices in the open (unsealed) submission.
    pub fn pending_vertices(&self) -> usize {
        self.pending.len() / VERTEX_FLOATS
    }

    /// Total vertices accumulated since the last flush.
    pub fn vertex_count(&self) -> usize {
        self.sealed
            .iter()
            .map(|chunk| chunk.len() / VERTEX_FLOATS)
            .sum::<usize>()
            + self.pending_vertices()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.sealed.is_empty() && self.pending.is_empty()
    }

    /// Declare that exactly `n` vertices follow.
    ///
    /// Returns `false` (and batches nothing) when `n` exceeds the total
    /// capacity: a single logical primitive is never split across
    /// submissions, so the request cannot be honored. This is a caller
    /// error, asserted against in debug builds.
    ///
    /// When the pending vertices plus `n` would overrun the capacity, the
    /// pending data is sealed as its own submission first.
    pub fn reserve(&mut self, n: usize) -> bool {
        debug_assert!(
            n <= self.capacity,
            "reserve({}) exceeds batch capacity {}",
            n,
            self.capacity
        );
        if n > self.capacity {
            tracing::warn!(
                "Ignoring reserve({}) beyond batch capacity {}",
                n,
                self.capacity
            );
            return false;
        }

        if self.pending_vertices() + n > self.capacity {
            self.seal();
        }
        true
    }

    /// Append one vertex to the open submission.
    ///
    /// Writes must be covered by a preceding [`reserve`](Self::reserve) in
    /// the same shape submission. Unreserved writes that overrun the
    /// capacity seal the open submission mid-shape, which can split a
    /// primitive across draw calls.
    pub fn batch(&mut self, position: Vec3, color: Color) {
        if self.pending_vertices() >= self.capacity {
            self.seal();
        }
        self.pending.extend_from_slice(&[
            position.x, position.y, position.z, color.r, color.g, color.b, color.a,
        ]);
    }

    /// Drain every pending submission, oldest first.
    ///
    /// Invokes `callback` once per non-empty submission with the interleaved
    /// float stream, clears the batch, and returns the number of submissions
    /// emitted. Flushing an empty batch emits nothing and is idempotent.
    pub fn flush(&mut self, mut callback: impl FnMut(&[f32])) -> usize {
        let mut submissions = 0;
        for chunk in self.sealed.drain(..) {
            if !chunk.is_empty() {
                callback(&chunk);
                submissions += 1;
            }
        }
        if !self.pending.is_empty() {
            callback(&self.pending);
            submissions += 1;
        }
        self.pending.clear();
        submissions
    }

    fn seal(&mut self) {
        if !self.pending.is_empty() {
            let chunk = std::mem::take(&mut self.pending);
            self.sealed.push(chunk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(batch: &mut PolygonBatch, n: usize) {
        assert!(batch.reserve(n));
        for i in 0..n {
            batch.batch(Vec3::new(i as f32, 0.0, 0.0), Color::WHITE);
        }
    }

    #[test]
    fn test_accumulates_interleaved_vertices() {
        let mut batch = PolygonBatch::new(16);
        batch.reserve(1);
        batch.batch(Vec3::new(1.0, 2.0, 3.0), Color::rgba(0.1, 0.2, 0.3, 0.4));

        let mut streams = Vec::new();
        batch.flush(|data| streams.push(data.to_vec()));
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0], vec![1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_never_exceeds_capacity_per_submission() {
        let mut batch = PolygonBatch::new(6);
        // Three quads of 6 vertices: each reserve seals the previous one.
        fill(&mut batch, 6);
        fill(&mut batch, 6);
        fill(&mut batch, 6);

        let mut sizes = Vec::new();
        let submissions = batch.flush(|data| sizes.push(data.len() / VERTEX_FLOATS));
        assert_eq!(submissions, 3);
        assert!(sizes.iter().all(|&n| n <= 6));
    }

    #[test]
    fn test_reserve_seals_pending_before_overrun() {
        let mut batch = PolygonBatch::new(5);
        fill(&mut batch, 3);
        assert_eq!(batch.pending_vertices(), 3);

        // 3 + 3 > 5: the pending 3 become their own submission.
        fill(&mut batch, 3);
        assert_eq!(batch.pending_vertices(), 3);
        assert_eq!(batch.vertex_count(), 6);

        let mut sizes = Vec::new();
        batch.flush(|data| sizes.push(data.len() / VERTEX_FLOATS));
        assert_eq!(sizes, vec![3, 3]);
    }

    #[test]
    fn test_reserve_beyond_capacity_is_rejected() {
        let mut batch = PolygonBatch::new(4);
        // Caller error: a primitive larger than the whole batch.
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            batch.reserve(5)
        }));
        if cfg!(debug_assertions) {
            assert!(result.is_err());
        } else {
            assert_eq!(result.ok(), Some(false));
        }
    }

    #[test]
    fn test_unreserved_writes_split_at_capacity() {
        let mut batch = PolygonBatch::new(2);
        // No reserve: the third vertex overruns and splits the stream.
        batch.batch(Vec3::ZERO, Color::WHITE);
        batch.batch(Vec3::ZERO, Color::WHITE);
        batch.batch(Vec3::ZERO, Color::WHITE);

        let mut sizes = Vec::new();
        batch.flush(|data| sizes.push(data.len() / VERTEX_FLOATS));
        assert_eq!(sizes, vec![2, 1]);
    }

    #[test]
    fn test_empty_flush_is_idempotent() {
        let mut batch = PolygonBatch::new(8);
        assert_eq!(batch.flush(|_| panic!("no submissions expected")), 0);
        assert_eq!(batch.flush(|_| panic!("no submissions expected")), 0);
    }

    #[test]
    fn test_flush_resets_state() {
        let mut batch = PolygonBatch::new(8);
        fill(&mut batch, 4);
        assert_eq!(batch.flush(|_| {}), 1);
        assert!(batch.is_empty());
        assert_eq!(batch.flush(|_| {}), 0);
    }
}
