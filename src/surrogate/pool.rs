//! Circular experience pool of `(features, return)` pairs.

use rand::Rng;

pub struct Pool {
    entries: Vec<(Vec<f32>, f32)>,
    capacity: usize,
    /// Slot the next entry goes to.
    write: usize,
    trajectory_len: usize,
}

impl Pool {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "pool capacity must be positive");
        Self {
            entries: Vec::new(),
            capacity,
            write: 0,
            trajectory_len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries appended since the last `new_trajectory`, capped at capacity.
    pub fn trajectory_len(&self) -> usize {
        self.trajectory_len
    }

    pub fn new_trajectory(&mut self) {
        self.trajectory_len = 0;
    }

    /// Add an entry whose return is unknown until the trajectory finishes.
    pub fn append(&mut self, features: Vec<f32>) {
        if self.entries.len() < self.capacity {
            self.entries.push((features, 0.0));
        } else {
            self.entries[self.write] = (features, 0.0);
        }
        self.write = (self.write + 1) % self.capacity;
        self.trajectory_len = (self.trajectory_len + 1).min(self.capacity);
    }

    /// Write `ret` into every entry of the current trajectory.
    pub fn finish_trajectory(&mut self, ret: f64) {
        for back in 1..=self.trajectory_len {
            let slot = (self.write + self.capacity - back) % self.capacity;
            self.entries[slot].1 = ret as f32;
        }
    }

    /// Draw `n` entries uniformly with replacement.
    ///
    /// Returns the row-major `[n, d]` inputs and the `n` targets.
    pub fn sample_batch<R: Rng>(&self, rng: &mut R, n: usize) -> (Vec<f32>, Vec<f32>) {
        let mut inputs = Vec::new();
        let mut targets = Vec::with_capacity(n);
        if self.is_empty() {
            return (inputs, targets);
        }
        for _ in 0..n {
            let (features, ret) = &self.entries[rng.random_range(0..self.len())];
            inputs.extend_from_slice(features);
            targets.push(*ret);
        }
        (inputs, targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn finish_backfills_only_current_trajectory() {
        let mut pool = Pool::new(8);
        pool.append(vec![1.0]);
        pool.finish_trajectory(5.0);
        pool.new_trajectory();
        pool.append(vec![2.0]);
        pool.append(vec![3.0]);
        pool.finish_trajectory(7.0);
        let returns: Vec<f32> = pool.entries.iter().map(|e| e.1).collect();
        assert_eq!(returns, vec![5.0, 7.0, 7.0]);
        assert_eq!(pool.trajectory_len(), 2);
    }

    #[test]
    fn wraps_at_capacity() {
        let mut pool = Pool::new(3);
        for i in 0..5 {
            pool.append(vec![i as f32]);
        }
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.trajectory_len(), 3);
        let features: Vec<f32> = pool.entries.iter().map(|e| e.0[0]).collect();
        assert_eq!(features, vec![3.0, 4.0, 2.0]);
        pool.finish_trajectory(1.5);
        assert!(pool.entries.iter().all(|e| e.1 == 1.5));
    }

    #[test]
    fn wrapped_trajectory_backfill_stops_at_its_start() {
        let mut pool = Pool::new(4);
        for i in 0..3 {
            pool.append(vec![i as f32]);
        }
        pool.finish_trajectory(1.0);
        pool.new_trajectory();
        pool.append(vec![10.0]);
        pool.append(vec![11.0]);
        pool.finish_trajectory(2.0);
        let returns: Vec<f32> = pool.entries.iter().map(|e| e.1).collect();
        assert_eq!(returns, vec![2.0, 1.0, 1.0, 2.0]);
    }

    #[test]
    fn batch_has_requested_shape() {
        let mut pool = Pool::new(16);
        for i in 0..4 {
            pool.append(vec![i as f32, -(i as f32)]);
        }
        let mut rng = StdRng::seed_from_u64(3);
        let (inputs, targets) = pool.sample_batch(&mut rng, 10);
        assert_eq!(inputs.len(), 20);
        assert_eq!(targets.len(), 10);
        assert!(Pool::new(2).sample_batch(&mut rng, 4).0.is_empty());
    }
}
