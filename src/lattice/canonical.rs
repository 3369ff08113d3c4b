//! Stripping tiles that do nothing.

use super::tile::AIR;
use super::{Evaluation, Evaluator, State};

impl Evaluator<'_> {
    /// Replace every non-functional tile of `state` with Air.
    ///
    /// Removing one tile can leave another without a purpose, so this
    /// re-evaluates until a pass removes nothing. The returned evaluation
    /// matches the final state, and a canonical state is left untouched.
    pub fn canonicalize(&mut self, state: &mut State) -> Evaluation {
        loop {
            let eval = self.run(state);
            let mut removed = false;
            for (i, tile) in self.tiles.iter().enumerate() {
                if !tile.is_functional() {
                    let c = state.coord_of(i);
                    state[c] = AIR;
                    removed = true;
                }
            }
            if !removed {
                return eval;
            }
        }
    }
}
