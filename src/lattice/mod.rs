//! Lattice evaluator: turns a grid of tile codes into an [`Evaluation`].
//!
//! Every call to [`Evaluator::run`] rebuilds the tile model from scratch and
//! runs the passes in a fixed order:
//!
//! 1. classify codes into tiles and bucket heat sinks by tier
//! 2. resolve neutron sources whose line of sight is blocked everywhere
//! 3. build flux edges from every cell
//! 4. propagate flux from the roots to a fixed point
//! 5. activate cells and the tiles along their edges
//! 6. activate heat sinks tier by tier
//! 7. flood-fill clusters
//! 8. per-cluster heat, cooling and output
//! 9. global sparsity derate
//! 10. aggregate over casing-connected clusters
//!
//! Evaluation is total: any grid, including codes the settings don't know,
//! produces a well-defined report.

pub mod canonical;
mod cluster;
mod flux;
pub mod grid;
mod sink;
pub mod tile;


use crate::config::Settings;
use grid::{Coord, Grid, VisitedBuffer};
use tile::{Tile, TileCode};

/// A candidate reactor: one tile code per position.
pub type State = Grid<TileCode>;

/// Longest run of passive tiles a flux edge may cross.
pub const NEUTRON_REACH: usize = 4;
pub const SPARSITY_THRESHOLD: f64 = 0.75;
pub const SPARSITY_FLOOR: f64 = 0.5;
pub const COOLING_LENIENCY: i32 = 10;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusterStats {
    pub size: usize,
    pub n_cells: usize,
    pub heat: i32,
    pub cooling: i32,
    pub net_heat: i32,
    pub cooling_penalty_mult: f64,
    pub raw_output: f64,
    pub output: f64,
    pub raw_efficiency: f64,
    pub efficiency: f64,
    pub has_casing_connection: bool,
}

/// Scalar report for one state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Evaluation {
    pub raw_output: f64,
    pub output: f64,
    pub raw_efficiency: f64,
    pub efficiency: f64,
    pub density: f64,
    /// Multiplier applied to output and efficiency, 1 when dense enough.
    pub sparsity_penalty: f64,
    pub n_functional_blocks: usize,
    pub total_positive_net_heat: i32,
    pub irradiator_flux: i32,
    pub n_active_cells: usize,
    pub total_raw_flux: i32,
    pub max_cell_flux: i32,
    pub clusters: Vec<ClusterStats>,
    pub shield_on: bool,
}

/// Reusable evaluator for one settings object.
///
/// Scratch storage (tile grid, coordinate lists, visited marks and the
/// traversal stack) is sized once and reused by every run.
#[derive(Clone, Debug)]
pub struct Evaluator<'a> {
    settings: &'a Settings,
    shield_on: bool,
    tiles: Grid<Tile>,
    cells: Vec<Coord>,
    tiers: [Vec<Coord>; 3],
    roots: Vec<Coord>,
    visited: VisitedBuffer,
    stack: Vec<Coord>,
}

impl<'a> Evaluator<'a> {
    /// With `shield_on`, shields block flux instead of passing it.
    pub fn new(settings: &'a Settings, shield_on: bool) -> Self {
        let tiles = Grid::filled(settings.size, Tile::Air);
        let volume = tiles.volume();
        Self {
            settings,
            shield_on,
            tiles,
            cells: Vec::new(),
            tiers: [Vec::new(), Vec::new(), Vec::new()],
            roots: Vec::new(),
            visited: VisitedBuffer::new(volume),
            stack: Vec::new(),
        }
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    /// Tiles of the latest run.
    pub fn tiles(&self) -> &Grid<Tile> {
        &self.tiles
    }

    pub fn run(&mut self, state: &State) -> Evaluation {
        debug_assert_eq!(state.shape(), self.tiles.shape());
        self.classify(state);
        self.run_classified()
    }

    /// Every pass after classification.
    fn run_classified(&mut self) -> Evaluation {
        for i in 0..self.cells.len() {
            let c = self.cells[i];
            self.resolve_source(c);
            self.build_edges(c);
        }
        self.propagate();
        self.activate();
        for tier in 0..3 {
            for i in 0..self.tiers[tier].len() {
                let c = self.tiers[tier][i];
                let active = sink::is_active(&self.tiles, c);
                if let Tile::HeatSink(h) = &mut self.tiles[c] {
                    h.active = active;
                }
            }
        }
        let clusters = self.form_clusters();
        self.aggregate(clusters)
    }

    fn classify(&mut self, state: &State) {
        self.cells.clear();
        for tier in &mut self.tiers {
            tier.clear();
        }
        for (i, &code) in state.iter().enumerate() {
            let c = state.coord_of(i);
            let tile = Tile::decode(code, &self.settings.cell_types);
            match &tile {
                Tile::Cell(_) => self.cells.push(c),
                Tile::HeatSink(h) => self.tiers[h.kind.tier()].push(c),
                _ => {}
            }
            self.tiles[c] = tile;
        }
    }

    fn criticality(&self, fuel: usize) -> i32 {
        self.settings.fuels[fuel].criticality
    }

    fn cell_efficiency(&self, cell: &tile::Cell) -> f64 {
        let fuel = &self.settings.fuels[cell.fuel];
        let flux_efficiency = if fuel.criticality <= 0 {
            1.0
        } else {
            let x = cell.flux as f64 / fuel.criticality as f64;
            (1.0 + (-2.0f64).exp()) / (1.0 + (2.0 * (x - 2.0)).exp())
        };
        fuel.efficiency * Settings::source_efficiency(cell.source) * cell.positional_efficiency * flux_efficiency
    }

    fn cell_heat(&self, cell: &tile::Cell) -> i32 {
        self.settings.fuels[cell.fuel]
            .heat
            .saturating_mul(cell.heat_mult.max(1))
    }
}
