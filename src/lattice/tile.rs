//! Tile codes and the per-evaluation tile model.

use super::grid::Coord;

/// Integer code of one grid position.
pub type TileCode = u16;

pub const N_HEAT_SINKS: usize = 32;
pub const MODERATOR_BASE: TileCode = 32;
pub const REFLECTOR_BASE: TileCode = 35;
pub const SHIELD: TileCode = 37;
pub const CONDUCTOR: TileCode = 38;
pub const IRRADIATOR: TileCode = 39;
pub const AIR: TileCode = 40;
/// Number of quota-bearing non-cell block kinds (codes `0..AIR`).
pub const N_BLOCKS: usize = AIR as usize;
/// Code of the first fuel cell type.
pub const CELL_BASE: TileCode = 41;

pub const MODERATOR_EFFICIENCIES: [f64; 3] = [1.1, 1.05, 1.0];
pub const MODERATOR_FLUXES: [i32; 3] = [10, 22, 36];
pub const REFLECTOR_EFFICIENCIES: [f64; 2] = [0.5, 0.25];
pub const REFLECTOR_FLUX_MULTS: [f64; 2] = [1.0, 0.5];
/// Efficiency of Cf-252, Po-Be and Ra-Be neutron sources.
pub const SOURCE_EFFICIENCIES: [f64; 3] = [0.9, 0.95, 1.0];
pub const SHIELD_EFFICIENCY: f64 = 0.5;
pub const SHIELD_HEAT_PER_FLUX: i32 = 5;

/// Short block names, indexed by code, as used in settings files and views.
pub const BLOCK_NAMES: [&str; N_BLOCKS] = [
    "Wt", "Fe", "Rs", "Qz", "Ob", "Nr", "Gs", "Lp", "Au", "Pm", "Sm", "En", "Pr", "Dm", "Em",
    "Cu", "Sn", "Pb", "B", "Li", "Mg", "Mn", "Al", "Ag", "Fl", "Vi", "Cb", "As", "N", "He", "Ed",
    "Cr", "M0", "M1", "M2", "R0", "R1", "Shield", "Conductor", "Irradiator",
];

/// Neutron source names, indexed by source variant minus one.
pub const SOURCE_NAMES: [&str; 3] = ["Cf252", "PoBe", "RaBe"];

pub fn block_code(name: &str) -> Option<TileCode> {
    BLOCK_NAMES
        .iter()
        .position(|n| *n == name)
        .map(|i| i as TileCode)
}

/// Heat sink kinds, in tile-code order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Sink {
    Water,
    Iron,
    Redstone,
    Quartz,
    Obsidian,
    NetherBrick,
    Glowstone,
    Lapis,
    Gold,
    Prismarine,
    Slime,
    EndStone,
    Purpur,
    Diamond,
    Emerald,
    Copper,
    Tin,
    Lead,
    Boron,
    Lithium,
    Magnesium,
    Manganese,
    Aluminum,
    Silver,
    Fluorite,
    Villiaumite,
    Carobbiite,
    Arsenic,
    Nitrogen,
    Helium,
    Enderium,
    Cryotheum,
}

impl Sink {
    pub const ALL: [Sink; N_HEAT_SINKS] = [
        Sink::Water,
        Sink::Iron,
        Sink::Redstone,
        Sink::Quartz,
        Sink::Obsidian,
        Sink::NetherBrick,
        Sink::Glowstone,
        Sink::Lapis,
        Sink::Gold,
        Sink::Prismarine,
        Sink::Slime,
        Sink::EndStone,
        Sink::Purpur,
        Sink::Diamond,
        Sink::Emerald,
        Sink::Copper,
        Sink::Tin,
        Sink::Lead,
        Sink::Boron,
        Sink::Lithium,
        Sink::Magnesium,
        Sink::Manganese,
        Sink::Aluminum,
        Sink::Silver,
        Sink::Fluorite,
        Sink::Villiaumite,
        Sink::Carobbiite,
        Sink::Arsenic,
        Sink::Nitrogen,
        Sink::Helium,
        Sink::Enderium,
        Sink::Cryotheum,
    ];

    const COOLING_RATES: [i32; N_HEAT_SINKS] = [
        55, 50, 85, 75, 70, 105, 100, 95, 110, 115, 145, 65, 90, 195, 190, 80, 120, 60, 165, 130,
        125, 150, 185, 170, 175, 160, 140, 135, 180, 200, 155, 205,
    ];

    pub fn from_code(code: TileCode) -> Option<Sink> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> TileCode {
        self as TileCode
    }

    pub fn cooling_rate(self) -> i32 {
        Self::COOLING_RATES[self as usize]
    }

    /// Activation tier: a sink's rule only refers to sinks of lower tiers.
    pub fn tier(self) -> usize {
        use Sink::*;
        match self {
            Water | Iron | Redstone | Glowstone | Lapis | EndStone | Magnesium | Manganese
            | Arsenic | Enderium | Cryotheum => 0,
            Quartz | Obsidian | Gold | Prismarine | Purpur | Copper | Tin | Lead | Villiaumite
            | Helium => 1,
            _ => 2,
        }
    }
}

/// Path descriptor from a cell along one axis direction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FluxEdge {
    /// Tiles traversed between the cell and the edge target.
    pub n_moderators: usize,
    pub flux: i32,
    pub efficiency: f64,
    pub reflected: bool,
    /// Where the flux lands: the far cell, the reflector or the irradiator.
    pub target: Coord,
}

#[derive(Clone, Debug)]
pub struct Cell {
    pub fuel: usize,
    /// 0 for none, 1..=3 for Cf-252, Po-Be, Ra-Be.
    pub source: u8,
    pub edges: [Option<FluxEdge>; 6],
    pub flux: i32,
    pub heat_mult: i32,
    pub positional_efficiency: f64,
    pub efficiency: f64,
    pub source_blocked: bool,
    pub excluded_from_roots: bool,
    pub propagated: bool,
    pub active: bool,
    pub cluster: Option<usize>,
}

impl Cell {
    pub fn new(fuel: usize, source: u8) -> Self {
        Self {
            fuel,
            source,
            edges: [None; 6],
            flux: 0,
            heat_mult: 0,
            positional_efficiency: 0.0,
            efficiency: 0.0,
            source_blocked: false,
            excluded_from_roots: false,
            propagated: false,
            active: false,
            cluster: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Moderator {
    pub kind: usize,
    pub active: bool,
    pub functional: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Reflector {
    pub kind: usize,
    pub active: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Shield {
    pub heat: i32,
    pub functional: bool,
    pub cluster: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct Irradiator {
    pub flux: i32,
    pub active: bool,
    pub cluster: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct Conductor {
    pub cluster: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct HeatSink {
    pub kind: Sink,
    pub active: bool,
    pub cluster: Option<usize>,
}

/// One decoded grid position with its simulation fields.
#[derive(Clone, Debug, Default)]
pub enum Tile {
    #[default]
    Air,
    Cell(Cell),
    Moderator(Moderator),
    Reflector(Reflector),
    Shield(Shield),
    Irradiator(Irradiator),
    Conductor(Conductor),
    HeatSink(HeatSink),
}

impl Tile {
    /// Decode a tile code. Codes past the configured cell types decode to Air.
    pub fn decode(code: TileCode, cell_types: &[(usize, u8)]) -> Tile {
        if let Some(kind) = Sink::from_code(code) {
            return Tile::HeatSink(HeatSink {
                kind,
                active: false,
                cluster: None,
            });
        }
        match code {
            c if (MODERATOR_BASE..REFLECTOR_BASE).contains(&c) => Tile::Moderator(Moderator {
                kind: (c - MODERATOR_BASE) as usize,
                ..Default::default()
            }),
            c if (REFLECTOR_BASE..SHIELD).contains(&c) => Tile::Reflector(Reflector {
                kind: (c - REFLECTOR_BASE) as usize,
                ..Default::default()
            }),
            SHIELD => Tile::Shield(Shield::default()),
            CONDUCTOR => Tile::Conductor(Conductor::default()),
            IRRADIATOR => Tile::Irradiator(Irradiator::default()),
            AIR => Tile::Air,
            c => match cell_types.get((c - CELL_BASE) as usize) {
                Some(&(fuel, source)) => Tile::Cell(Cell::new(fuel, source)),
                None => Tile::Air,
            },
        }
    }

    pub fn as_cell(&self) -> Option<&Cell> {
        match self {
            Tile::Cell(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_cell_mut(&mut self) -> Option<&mut Cell> {
        match self {
            Tile::Cell(cell) => Some(cell),
            _ => None,
        }
    }

    /// Whether the tile does something in the last evaluation.
    ///
    /// Air counts as functional: it is never stripped.
    pub fn is_functional(&self) -> bool {
        match self {
            Tile::Air => true,
            Tile::Cell(c) => c.active,
            Tile::Moderator(m) => m.functional,
            Tile::Reflector(r) => r.active,
            Tile::Shield(s) => s.functional,
            Tile::Irradiator(i) => i.active,
            Tile::Conductor(c) => c.cluster.is_some(),
            Tile::HeatSink(h) => h.active,
        }
    }

    /// Whether the tile takes part in clustering.
    pub fn is_cluster_member(&self) -> bool {
        match self {
            Tile::Cell(c) => c.active,
            Tile::HeatSink(h) => h.active,
            Tile::Shield(s) => s.functional,
            Tile::Irradiator(i) => i.active,
            Tile::Conductor(_) => true,
            _ => false,
        }
    }

    pub fn cluster(&self) -> Option<usize> {
        match self {
            Tile::Cell(c) => c.cluster,
            Tile::HeatSink(h) => h.cluster,
            Tile::Shield(s) => s.cluster,
            Tile::Irradiator(i) => i.cluster,
            Tile::Conductor(c) => c.cluster,
            _ => None,
        }
    }

    pub fn set_cluster(&mut self, id: usize) {
        match self {
            Tile::Cell(c) => c.cluster = Some(id),
            Tile::HeatSink(h) => h.cluster = Some(id),
            Tile::Shield(s) => s.cluster = Some(id),
            Tile::Irradiator(i) => i.cluster = Some(id),
            Tile::Conductor(c) => c.cluster = Some(id),
            _ => {}
        }
    }
}
