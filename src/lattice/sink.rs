//! Heat sink placement rules.

use super::grid::{Coord, Grid};
use super::tile::{Sink, Tile};

fn count(tiles: &Grid<Tile>, c: Coord, pred: impl Fn(&Tile) -> bool) -> usize {
    (0..6)
        .filter_map(|d| tiles.step(c, d, 1))
        .filter(|&at| pred(&tiles[at]))
        .count()
}

/// Both neighbors along some axis satisfy `pred`.
fn axial(tiles: &Grid<Tile>, c: Coord, pred: impl Fn(&Tile) -> bool) -> bool {
    let side = |d| tiles.step(c, d, 1).is_some_and(|at| pred(&tiles[at]));
    (0..3).any(|axis| side(axis * 2) && side(axis * 2 + 1))
}

fn active_cell(t: &Tile) -> bool {
    matches!(t, Tile::Cell(cell) if cell.active)
}

fn active_moderator(t: &Tile) -> bool {
    matches!(t, Tile::Moderator(m) if m.active)
}

fn active_reflector(t: &Tile) -> bool {
    matches!(t, Tile::Reflector(r) if r.active)
}

fn active_sink(kind: Sink) -> impl Fn(&Tile) -> bool {
    move |t| matches!(t, Tile::HeatSink(h) if h.active && h.kind == kind)
}

/// Evaluate the rule of the heat sink at `c` against its neighbors.
///
/// Neighbor sinks count only when already active, so rules must be applied
/// tier by tier.
pub(super) fn is_active(tiles: &Grid<Tile>, c: Coord) -> bool {
    use Sink::*;
    let Tile::HeatSink(sink) = &tiles[c] else {
        return false;
    };
    let cells = || count(tiles, c, active_cell);
    let moderators = || count(tiles, c, active_moderator);
    let sinks = |kind| count(tiles, c, active_sink(kind));
    let casing = || tiles.casing_faces(c) > 0;
    match sink.kind {
        Water => cells() > 0,
        Iron => moderators() > 0,
        Redstone => cells() > 0 && moderators() > 0,
        Quartz => sinks(Redstone) > 0,
        Obsidian => axial(tiles, c, active_sink(Glowstone)),
        NetherBrick => sinks(Obsidian) > 0,
        Glowstone => moderators() >= 2,
        Lapis => cells() > 0 && casing(),
        Gold => sinks(Iron) >= 2,
        Prismarine => sinks(Water) >= 2,
        Slime => sinks(Water) == 1 && sinks(Lead) >= 2,
        EndStone => count(tiles, c, active_reflector) > 0,
        Purpur => sinks(Iron) == 1 && sinks(EndStone) > 0,
        Diamond => sinks(Gold) > 0 && cells() > 0,
        Emerald => sinks(Prismarine) > 0 && moderators() > 0,
        Copper => sinks(Water) > 0,
        Tin => axial(tiles, c, active_sink(Lapis)),
        Lead => sinks(Iron) > 0,
        Boron => sinks(Quartz) == 1 && casing(),
        Lithium => axial(tiles, c, active_sink(Lead)) && sinks(Lead) == 2 && casing(),
        Magnesium => moderators() == 1 && casing(),
        Manganese => cells() >= 2,
        Aluminum => sinks(Quartz) > 0 && sinks(Lapis) > 0,
        Silver => sinks(Glowstone) >= 2 && sinks(Tin) > 0,
        Fluorite => sinks(Gold) > 0 && sinks(Prismarine) > 0,
        Villiaumite => sinks(EndStone) > 0 && sinks(Redstone) > 0,
        Carobbiite => sinks(Copper) > 0 && sinks(EndStone) > 0,
        Arsenic => axial(tiles, c, active_reflector),
        Nitrogen => sinks(Copper) >= 2 && sinks(Purpur) > 0,
        Helium => sinks(Redstone) == 2 && casing(),
        Enderium => moderators() >= 3,
        Cryotheum => cells() >= 3,
    }
}
