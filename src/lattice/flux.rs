//! Neutron sources, flux edges, propagation and activation.

use super::grid::Coord;
use super::tile::{
    FluxEdge, Tile, MODERATOR_EFFICIENCIES, MODERATOR_FLUXES, REFLECTOR_EFFICIENCIES,
    REFLECTOR_FLUX_MULTS, SHIELD_EFFICIENCY, SHIELD_HEAT_PER_FLUX,
};
use super::{Evaluator, NEUTRON_REACH};

impl Evaluator<'_> {
    /// Disable the source of a cell whose line of sight is blocked in all
    /// six directions. A single direction reaching the casing keeps it.
    pub(super) fn resolve_source(&mut self, c: Coord) {
        let has_source = self.tiles[c].as_cell().is_some_and(|cell| cell.source != 0);
        if !has_source {
            return;
        }
        for d in 0..6 {
            let mut n = 1;
            loop {
                let Some(at) = self.tiles.step(c, d, n) else {
                    return;
                };
                let blocks = match &self.tiles[at] {
                    Tile::Reflector(r) => REFLECTOR_FLUX_MULTS[r.kind] >= 1.0,
                    Tile::Irradiator(_) | Tile::Cell(_) => true,
                    _ => false,
                };
                if blocks {
                    break;
                }
                n += 1;
            }
        }
        if let Some(cell) = self.tiles[c].as_cell_mut() {
            cell.source = 0;
            cell.source_blocked = true;
        }
    }

    pub(super) fn build_edges(&mut self, c: Coord) {
        let edges: [Option<FluxEdge>; 6] = std::array::from_fn(|d| self.edge(c, d));
        if let Some(cell) = self.tiles[c].as_cell_mut() {
            cell.edges = edges;
        }
    }

    /// Walk from `c` along `d` over at most `NEUTRON_REACH` passive tiles.
    fn edge(&self, c: Coord, d: usize) -> Option<FluxEdge> {
        let mut edge = FluxEdge::default();
        for n in 0..=NEUTRON_REACH {
            let at = self.tiles.step(c, d, n + 1)?;
            edge.n_moderators = n;
            edge.target = at;
            match &self.tiles[at] {
                Tile::Moderator(m) => {
                    edge.efficiency += MODERATOR_EFFICIENCIES[m.kind];
                    edge.flux += MODERATOR_FLUXES[m.kind];
                }
                Tile::Shield(_) if !self.shield_on => edge.efficiency += SHIELD_EFFICIENCY,
                Tile::Cell(_) if n > 0 => {
                    edge.efficiency /= n as f64;
                    return Some(edge);
                }
                Tile::Irradiator(_) if n > 0 => {
                    edge.efficiency = 0.0;
                    return Some(edge);
                }
                Tile::Reflector(r) if n > 0 && n <= NEUTRON_REACH / 2 => {
                    edge.efficiency = REFLECTOR_EFFICIENCIES[r.kind] * edge.efficiency / n as f64;
                    edge.flux = (2.0 * edge.flux as f64 * REFLECTOR_FLUX_MULTS[r.kind]) as i32;
                    edge.reflected = true;
                    return Some(edge);
                }
                _ => return None,
            }
        }
        None
    }

    /// Propagate flux from the roots until the root set stops shrinking.
    ///
    /// A root that ends a pass below criticality is excluded from every
    /// later pass, so the loop runs at most once per cell plus one.
    pub(super) fn propagate(&mut self) {
        loop {
            self.roots.clear();
            for &c in &self.cells {
                let Some(cell) = self.tiles[c].as_cell_mut() else {
                    continue;
                };
                cell.flux = 0;
                cell.propagated = false;
                let self_priming = self.settings.fuels[cell.fuel].self_priming;
                if !cell.excluded_from_roots && (self_priming || cell.source != 0) {
                    self.roots.push(c);
                }
            }
            for i in 0..self.roots.len() {
                let root = self.roots[i];
                self.propagate_from(root);
            }
            let mut converged = true;
            for i in 0..self.roots.len() {
                let root = self.roots[i];
                let Some(fuel) = self.tiles[root].as_cell().map(|cell| cell.fuel) else {
                    continue;
                };
                let criticality = self.criticality(fuel);
                if let Some(cell) = self.tiles[root].as_cell_mut() {
                    if cell.flux < criticality {
                        cell.excluded_from_roots = true;
                        converged = false;
                    }
                }
            }
            if converged {
                break;
            }
        }
    }

    fn propagate_from(&mut self, root: Coord) {
        self.stack.clear();
        self.stack.push(root);
        while let Some(c) = self.stack.pop() {
            let edges = match self.tiles[c].as_cell_mut() {
                Some(cell) if !cell.propagated => {
                    cell.propagated = true;
                    cell.edges
                }
                _ => continue,
            };
            for edge in edges.iter().flatten() {
                let to = if edge.reflected { c } else { edge.target };
                let Some(fuel) = self.tiles[to].as_cell().map(|cell| cell.fuel) else {
                    continue;
                };
                let criticality = self.criticality(fuel);
                if let Some(target) = self.tiles[to].as_cell_mut() {
                    target.flux = target.flux.saturating_add(edge.flux);
                    if target.flux >= criticality && !target.propagated {
                        self.stack.push(to);
                    }
                }
            }
        }
    }

    /// Mark active cells and everything their live edges cross.
    pub(super) fn activate(&mut self) {
        for i in 0..self.cells.len() {
            let c = self.cells[i];
            let Some(fuel) = self.tiles[c].as_cell().map(|cell| cell.fuel) else {
                continue;
            };
            let criticality = self.criticality(fuel);
            if let Some(cell) = self.tiles[c].as_cell_mut() {
                cell.active = cell.flux >= criticality;
            }
        }

        for i in 0..self.cells.len() {
            let c = self.cells[i];
            let edges = match self.tiles[c].as_cell() {
                Some(cell) if cell.active => cell.edges,
                _ => continue,
            };
            let mut heat_mult = 0;
            let mut efficiency_sum = 0.0;
            for (d, edge) in edges.iter().enumerate() {
                let Some(edge) = edge else {
                    continue;
                };
                let live = match &self.tiles[edge.target] {
                    Tile::Cell(other) => other.active,
                    Tile::Reflector(_) | Tile::Irradiator(_) => true,
                    _ => false,
                };
                if !live {
                    continue;
                }
                heat_mult += 1;
                efficiency_sum += edge.efficiency;
                self.mark_path(c, d, edge);
            }
            if let Some(cell) = self.tiles[c].as_cell_mut() {
                cell.heat_mult = heat_mult;
                cell.positional_efficiency = if heat_mult == 0 {
                    1.0
                } else {
                    efficiency_sum / heat_mult as f64
                };
            }
        }
    }

    fn mark_path(&mut self, c: Coord, d: usize, edge: &FluxEdge) {
        // Cell-to-cell edges exist once from each end; charge one direction.
        let charge_shields = d & 1 == 1 || !matches!(self.tiles[edge.target], Tile::Cell(_));
        let shield_heat = edge.flux.saturating_mul(SHIELD_HEAT_PER_FLUX);
        for n in 1..=edge.n_moderators + 1 {
            let Some(at) = self.tiles.step(c, d, n) else {
                break;
            };
            match &mut self.tiles[at] {
                Tile::Moderator(m) => {
                    if n == 1 {
                        m.active = true;
                    }
                    m.functional = true;
                }
                Tile::Shield(s) => {
                    if charge_shields {
                        s.heat = s.heat.saturating_add(shield_heat);
                    }
                    s.functional = true;
                }
                Tile::Irradiator(irr) => {
                    irr.active = true;
                    irr.flux = irr.flux.saturating_add(edge.flux);
                }
                Tile::Reflector(r) => r.active = true,
                _ => {}
            }
        }
    }
}
