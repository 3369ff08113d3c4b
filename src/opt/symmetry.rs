//! Mirror symmetry over the enabled axes.

use crate::lattice::grid::Coord;
use crate::lattice::tile::TileCode;
use crate::lattice::State;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Symmetry {
    size: [usize; 3],
    axes: [bool; 3],
}

impl Symmetry {
    pub fn new(size: [usize; 3], axes: [bool; 3]) -> Self {
        Self { size, axes }
    }

    fn mirror(&self, c: Coord, axis: usize) -> usize {
        self.size[axis] - 1 - c[axis]
    }

    /// Number of distinct positions in the orbit of `c`: 1, 2, 4 or 8.
    pub fn orbit_size(&self, c: Coord) -> i32 {
        (0..3)
            .filter(|&axis| self.axes[axis] && self.mirror(c, axis) != c[axis])
            .fold(1, |n, _| n * 2)
    }

    /// One representative per orbit: the upper half of every mirrored axis,
    /// in lexicographic order.
    pub fn reduced_coords(&self) -> Vec<Coord> {
        let start = |axis: usize| if self.axes[axis] { self.size[axis] / 2 } else { 0 };
        let mut coords = Vec::new();
        for x in start(0)..self.size[0] {
            for y in start(1)..self.size[1] {
                for z in start(2)..self.size[2] {
                    coords.push([x, y, z]);
                }
            }
        }
        coords
    }

    /// Every image of `c` under the enabled mirrors, `c` included.
    ///
    /// Self-mirrored axes repeat positions; callers treat the list as a set.
    pub fn images(&self, c: Coord) -> impl Iterator<Item = Coord> + '_ {
        (0..8u8)
            .filter(move |mask| (0..3).all(|axis| mask & (1 << axis) == 0 || self.axes[axis]))
            .map(move |mask| {
                let mut image = c;
                for axis in 0..3 {
                    if mask & (1 << axis) != 0 {
                        image[axis] = self.mirror(c, axis);
                    }
                }
                image
            })
    }

    /// Write `code` at `c` and all its mirror images.
    pub fn set(&self, state: &mut State, c: Coord, code: TileCode) {
        for image in self.images(c) {
            state[image] = code;
        }
    }

    pub fn is_symmetric(&self, state: &State) -> bool {
        state
            .coords()
            .all(|c| self.images(c).all(|image| state[image] == state[c]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::grid::Grid;

    #[test]
    fn orbit_sizes_on_odd_and_even_axes() {
        let sym = Symmetry::new([5, 4, 3], [true, true, false]);
        assert_eq!(sym.orbit_size([2, 0, 0]), 2);
        assert_eq!(sym.orbit_size([0, 0, 0]), 4);
        assert_eq!(sym.orbit_size([2, 3, 1]), 2);
        let none = Symmetry::new([5, 4, 3], [false; 3]);
        assert_eq!(none.orbit_size([0, 0, 0]), 1);
    }

    #[test]
    fn reduced_domain_weights_cover_the_grid() {
        for axes in [[false; 3], [true, false, true], [true; 3]] {
            let sym = Symmetry::new([5, 4, 3], axes);
            let covered: i32 = sym.reduced_coords().iter().map(|&c| sym.orbit_size(c)).sum();
            assert_eq!(covered, 60);
        }
    }

    #[test]
    fn set_keeps_state_symmetric() {
        let sym = Symmetry::new([4, 3, 5], [true, false, true]);
        let mut state = Grid::filled([4, 3, 5], 40u16);
        for (i, c) in sym.reduced_coords().into_iter().enumerate() {
            sym.set(&mut state, c, (i % 7) as u16);
        }
        assert!(sym.is_symmetric(&state));
        assert_eq!(state[[0, 1, 0]], state[[3, 1, 4]]);
        state[[0, 0, 0]] = 39;
        assert!(!sym.is_symmetric(&state));
    }
}
