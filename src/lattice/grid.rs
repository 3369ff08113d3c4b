//! Dense 3D grids and axis walking.
//!
//! Storage is row-major with `x` slowest and `z` fastest, matching the
//! flat buffer hosts read through `shape()` / `strides()`.

/// Grid coordinate `[x, y, z]`.
pub type Coord = [usize; 3];

/// The six axis directions, paired so that `d ^ 1` is the opposite of `d`
/// and odd indices point toward increasing coordinates.
pub const DIRECTIONS: [[i32; 3]; 6] = [
    [-1, 0, 0],
    [1, 0, 0],
    [0, -1, 0],
    [0, 1, 0],
    [0, 0, -1],
    [0, 0, 1],
];

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid<T> {
    shape: [usize; 3],
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn filled(shape: [usize; 3], value: T) -> Self {
        Self {
            shape,
            data: vec![value; shape[0] * shape[1] * shape[2]],
        }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Grid<T> {
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn strides(&self) -> [usize; 3] {
        [self.shape[1] * self.shape[2], self.shape[2], 1]
    }

    pub fn volume(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn index_of(&self, c: Coord) -> usize {
        debug_assert!(self.contains(c), "coordinate {:?} outside {:?}", c, self.shape);
        (c[0] * self.shape[1] + c[1]) * self.shape[2] + c[2]
    }

    pub fn coord_of(&self, index: usize) -> Coord {
        let z = index % self.shape[2];
        let rest = index / self.shape[2];
        [rest / self.shape[1], rest % self.shape[1], z]
    }

    pub fn contains(&self, c: Coord) -> bool {
        c[0] < self.shape[0] && c[1] < self.shape[1] && c[2] < self.shape[2]
    }

    /// Move `n` steps from `c` along direction `d`.
    ///
    /// Returns `None` once the walk leaves the grid: the casing.
    pub fn step(&self, c: Coord, d: usize, n: usize) -> Option<Coord> {
        let delta = DIRECTIONS[d];
        let mut out = [0usize; 3];
        for axis in 0..3 {
            let v = c[axis] as i64 + delta[axis] as i64 * n as i64;
            if v < 0 || v >= self.shape[axis] as i64 {
                return None;
            }
            out[axis] = v as usize;
        }
        Some(out)
    }

    /// Number of faces of `c` that touch the casing.
    pub fn casing_faces(&self, c: Coord) -> usize {
        (0..6).filter(|&d| self.step(c, d, 1).is_none()).count()
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.data.len()).map(move |i| self.coord_of(i))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl<T> std::ops::Index<Coord> for Grid<T> {
    type Output = T;

    fn index(&self, c: Coord) -> &T {
        let i = self.index_of(c);
        &self.data[i]
    }
}

impl<T> std::ops::IndexMut<Coord> for Grid<T> {
    fn index_mut(&mut self, c: Coord) -> &mut T {
        let i = self.index_of(c);
        &mut self.data[i]
    }
}

/// Reusable "visited" marks shared by the traversals of one evaluation.
///
/// Clearing is O(1): each traversal bumps an epoch and a slot counts as
/// visited only when it carries the current epoch.
#[derive(Clone, Debug)]
pub struct VisitedBuffer {
    marks: Vec<u32>,
    epoch: u32,
}

impl VisitedBuffer {
    pub fn new(volume: usize) -> Self {
        Self {
            marks: vec![0; volume],
            epoch: 1,
        }
    }

    pub fn clear(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            self.marks.fill(0);
            self.epoch = 1;
        }
    }

    /// Mark `index`; returns false if it was already marked.
    pub fn insert(&mut self, index: usize) -> bool {
        if self.marks[index] == self.epoch {
            false
        } else {
            self.marks[index] = self.epoch;
            true
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.marks[index] == self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip_is_row_major() {
        let g = Grid::filled([2, 3, 4], 0u8);
        assert_eq!(g.strides(), [12, 4, 1]);
        assert_eq!(g.index_of([1, 2, 3]), 23);
        assert_eq!(g.coord_of(23), [1, 2, 3]);
        assert_eq!(g.coords().count(), 24);
    }

    #[test]
    fn step_stops_at_casing() {
        let g = Grid::filled([3, 3, 3], 0u8);
        assert_eq!(g.step([0, 1, 1], 0, 1), None);
        assert_eq!(g.step([0, 1, 1], 1, 2), Some([2, 1, 1]));
        assert_eq!(g.step([0, 1, 1], 1, 3), None);
        assert_eq!(g.casing_faces([1, 1, 1]), 0);
        assert_eq!(g.casing_faces([0, 0, 0]), 3);
    }

    #[test]
    fn opposite_directions_pair_up() {
        for d in 0..6 {
            let a = DIRECTIONS[d];
            let b = DIRECTIONS[d ^ 1];
            assert_eq!([a[0] + b[0], a[1] + b[1], a[2] + b[2]], [0, 0, 0]);
        }
    }

    #[test]
    fn visited_buffer_clears_by_epoch() {
        let mut v = VisitedBuffer::new(4);
        assert!(v.insert(2));
        assert!(!v.insert(2));
        assert!(v.contains(2));
        v.clear();
        assert!(!v.contains(2));
        assert!(v.insert(2));
    }
}
