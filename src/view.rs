//! Plain-text rendering of layouts and their statistics.
//!
//! Used by `fission-opt run` to print the best layout. Each `x` layer is a
//! block of rows over `y` with one column per `z`.

use std::fmt::Write;

use crate::config::Settings;
use crate::lattice::tile::{TileCode, AIR, BLOCK_NAMES, CELL_BASE, SOURCE_NAMES};
use crate::lattice::State;
use crate::opt::{raw_fitness, Sample};

/// Display name of a tile code: the block name, `fuel` or `fuel+source` for
/// cells, `.` for Air and `?` for codes the settings do not define.
pub fn tile_name(settings: &Settings, code: TileCode) -> String {
    if code < AIR {
        return BLOCK_NAMES[code as usize].to_string();
    }
    if code == AIR {
        return ".".to_string();
    }
    let cell = code
        .checked_sub(CELL_BASE)
        .and_then(|i| settings.cell_types.get(i as usize));
    match cell {
        Some(&(fuel, 0)) => settings.fuels[fuel].name.clone(),
        Some(&(fuel, source)) => format!(
            "{}+{}",
            settings.fuels[fuel].name,
            SOURCE_NAMES[source as usize - 1]
        ),
        None => "?".to_string(),
    }
}

/// Render every `x` layer, columns padded to the widest name.
pub fn render_layers(settings: &Settings, state: &State) -> String {
    let [nx, ny, nz] = state.shape();
    let names: Vec<String> = state.iter().map(|&code| tile_name(settings, code)).collect();
    let width = names.iter().map(|n| n.len()).max().unwrap_or(1);

    let mut out = String::new();
    for x in 0..nx {
        let _ = writeln!(out, "x = {}", x);
        for y in 0..ny {
            let row: Vec<String> = (0..nz)
                .map(|z| format!("{:<width$}", names[state.index_of([x, y, z])], width = width))
                .collect();
            let _ = writeln!(out, "  {}", row.join(" ").trim_end());
        }
    }
    out
}

/// Headline statistics of a sample, one `key: value` per line.
pub fn render_summary(settings: &Settings, sample: &Sample) -> String {
    let value = &sample.value;
    let mut out = String::new();
    let _ = writeln!(out, "goal:              {}", settings.goal.name());
    let _ = writeln!(out, "score:             {:.4}", raw_fitness(settings, value));
    let _ = writeln!(out, "output:            {:.2}", value.output);
    let _ = writeln!(out, "efficiency:        {:.4}", value.efficiency);
    let _ = writeln!(out, "active cells:      {}", value.n_active_cells);
    let _ = writeln!(out, "irradiator flux:   {}", value.irradiator_flux);
    let _ = writeln!(out, "positive net heat: {}", value.total_positive_net_heat);
    let _ = writeln!(out, "clusters:          {}", value.clusters.len());
    let _ = writeln!(out, "density:           {:.3}", value.density);
    let _ = writeln!(out, "feasible:          {}", sample.is_feasible());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Fuel;
    use crate::lattice::grid::Grid;
    use crate::lattice::tile::{block_code, SHIELD};

    fn settings() -> Settings {
        let mut s = Settings::default_for([2, 2, 3]);
        s.fuels = vec![Fuel {
            name: "LEU".to_string(),
            limit: -1,
            criticality: 102,
            heat: 120,
            self_priming: false,
            efficiency: 1.0,
        }];
        s.compute();
        s
    }

    #[test]
    fn names_cover_blocks_cells_and_air() {
        let s = settings();
        assert_eq!(tile_name(&s, 0), "Wt");
        assert_eq!(tile_name(&s, SHIELD), "Shield");
        assert_eq!(tile_name(&s, AIR), ".");
        assert_eq!(tile_name(&s, CELL_BASE), "LEU");
        assert_eq!(tile_name(&s, CELL_BASE + 2), "LEU+PoBe");
        assert_eq!(tile_name(&s, CELL_BASE + 4), "?");
    }

    #[test]
    fn layers_are_padded_and_trimmed() {
        let s = settings();
        let mut state = Grid::filled(s.size, AIR);
        state[[0, 0, 0]] = CELL_BASE;
        state[[0, 0, 1]] = block_code("Cr").unwrap_or(0);
        state[[1, 1, 2]] = SHIELD;
        let text = render_layers(&s, &state);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "x = 0");
        assert_eq!(lines[1], "  LEU    Cr     .");
        assert_eq!(lines[5], "  .      .      Shield");
    }
}
