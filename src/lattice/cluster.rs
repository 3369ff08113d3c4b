//! Cluster flood fill, per-cluster statistics and the global aggregate.

use super::grid::Coord;
use super::tile::Tile;
use super::{
    ClusterStats, Evaluation, Evaluator, COOLING_LENIENCY, SPARSITY_FLOOR, SPARSITY_THRESHOLD,
};

/// Output and efficiency multiplier for a functional-block density.
pub fn sparsity_mult(density: f64) -> f64 {
    if density >= SPARSITY_THRESHOLD {
        1.0
    } else {
        SPARSITY_FLOOR
            + (1.0 - SPARSITY_FLOOR) * (std::f64::consts::PI * density / (2.0 * SPARSITY_THRESHOLD)).sin()
    }
}

impl Evaluator<'_> {
    /// Label connected members and return each cluster's coordinates.
    ///
    /// Conductors join clusters but never seed one.
    pub(super) fn form_clusters(&mut self) -> Vec<Vec<Coord>> {
        let mut clusters: Vec<Vec<Coord>> = Vec::new();
        self.visited.clear();
        for i in 0..self.tiles.volume() {
            let seed = self.tiles.coord_of(i);
            let tile = &self.tiles[seed];
            if !tile.is_cluster_member() || matches!(tile, Tile::Conductor(_)) {
                continue;
            }
            if !self.visited.insert(i) {
                continue;
            }
            let id = clusters.len();
            let mut members = Vec::new();
            self.stack.clear();
            self.stack.push(seed);
            while let Some(c) = self.stack.pop() {
                self.tiles[c].set_cluster(id);
                members.push(c);
                for d in 0..6 {
                    let Some(next) = self.tiles.step(c, d, 1) else {
                        continue;
                    };
                    if self.tiles[next].is_cluster_member()
                        && self.visited.insert(self.tiles.index_of(next))
                    {
                        self.stack.push(next);
                    }
                }
            }
            clusters.push(members);
        }
        clusters
    }

    fn cluster_stats(&self, members: &[Coord]) -> ClusterStats {
        let mut stats = ClusterStats {
            size: members.len(),
            ..Default::default()
        };
        let mut efficiency_sum = 0.0;
        for &c in members {
            stats.has_casing_connection |= self.tiles.casing_faces(c) > 0;
            match &self.tiles[c] {
                Tile::Cell(cell) => {
                    let heat = self.cell_heat(cell);
                    let efficiency = self.cell_efficiency(cell);
                    stats.n_cells += 1;
                    stats.heat = stats.heat.saturating_add(heat);
                    stats.raw_output += heat as f64 * efficiency;
                    efficiency_sum += efficiency;
                }
                Tile::Shield(shield) => stats.heat = stats.heat.saturating_add(shield.heat),
                Tile::HeatSink(sink) => {
                    stats.cooling = stats.cooling.saturating_add(sink.kind.cooling_rate())
                }
                _ => {}
            }
        }
        stats.net_heat = stats.heat.saturating_sub(stats.cooling);
        stats.cooling_penalty_mult = if stats.cooling == 0 {
            1.0
        } else {
            (stats.heat.saturating_add(COOLING_LENIENCY) as f64 / stats.cooling as f64).min(1.0)
        };
        if stats.n_cells > 0 {
            stats.raw_efficiency = efficiency_sum / stats.n_cells as f64;
        }
        stats.output = stats.raw_output * stats.cooling_penalty_mult;
        stats.efficiency = stats.raw_efficiency * stats.cooling_penalty_mult;
        stats
    }

    pub(super) fn aggregate(&mut self, clusters: Vec<Vec<Coord>>) -> Evaluation {
        let mut eval = Evaluation {
            shield_on: self.shield_on,
            clusters: clusters.iter().map(|m| self.cluster_stats(m)).collect(),
            ..Default::default()
        };

        for tile in self.tiles.iter() {
            match tile {
                Tile::Air => continue,
                Tile::Cell(cell) => {
                    eval.total_raw_flux = eval.total_raw_flux.saturating_add(cell.flux);
                    eval.max_cell_flux = eval.max_cell_flux.max(cell.flux);
                    if cell.active {
                        eval.n_active_cells += 1;
                    }
                }
                Tile::Irradiator(irr) if irr.active => {
                    eval.irradiator_flux = eval.irradiator_flux.saturating_add(irr.flux)
                }
                _ => {}
            }
            if tile.is_functional() {
                eval.n_functional_blocks += 1;
            }
        }
        eval.density = eval.n_functional_blocks as f64 / self.tiles.volume() as f64;
        eval.sparsity_penalty = sparsity_mult(eval.density);

        let mut n_cells = 0;
        let mut raw_efficiency = 0.0;
        let mut efficiency = 0.0;
        for stats in &eval.clusters {
            eval.total_positive_net_heat =
                eval.total_positive_net_heat.saturating_add(stats.net_heat.max(0));
            if !stats.has_casing_connection {
                continue;
            }
            eval.raw_output += stats.raw_output;
            eval.output += stats.output;
            n_cells += stats.n_cells;
            raw_efficiency += stats.raw_efficiency * stats.n_cells as f64;
            efficiency += stats.efficiency * stats.n_cells as f64;
        }
        eval.output *= eval.sparsity_penalty;
        if n_cells > 0 {
            eval.raw_efficiency = raw_efficiency / n_cells as f64;
            eval.efficiency = efficiency / n_cells as f64 * eval.sparsity_penalty;
        }
        eval
    }
}
