//! Feature extraction for the surrogate.

use crate::config::Settings;
use crate::lattice::grid::Coord;
use crate::lattice::tile::{
    TileCode, AIR, CELL_BASE, CONDUCTOR, IRRADIATOR, MODERATOR_BASE, REFLECTOR_BASE, SHIELD,
};
use crate::opt::Sample;

pub const N_BLOCK_CLASSES: usize = 7;
pub const N_STATISTICS: usize = 8;

/// Coarse block class of a tile code. Air and unknown codes have none.
pub fn block_class(settings: &Settings, code: TileCode) -> Option<usize> {
    match code {
        c if c < MODERATOR_BASE => Some(0),
        c if c < REFLECTOR_BASE => Some(1),
        c if c < SHIELD => Some(2),
        SHIELD => Some(3),
        IRRADIATOR => Some(4),
        CONDUCTOR => Some(5),
        AIR => None,
        c if ((c - CELL_BASE) as usize) < settings.cell_types.len() => Some(6),
        _ => None,
    }
}

pub fn n_features(n_coords: usize) -> usize {
    n_coords * N_BLOCK_CLASSES + N_STATISTICS
}

/// One-hot block classes over `coords`, then normalized statistics of the
/// sample's evaluation.
pub fn extract(settings: &Settings, coords: &[Coord], sample: &Sample) -> Vec<f32> {
    let mut features = vec![0.0f32; n_features(coords.len())];
    for (i, &c) in coords.iter().enumerate() {
        if let Some(class) = block_class(settings, sample.state[c]) {
            features[i * N_BLOCK_CLASSES + class] = 1.0;
        }
    }

    let value = &sample.value;
    let volume = settings.volume().max(1) as f64;
    let shielded_cells = sample
        .value_with_shield
        .as_ref()
        .map_or(0, |v| v.n_active_cells);
    let statistics = [
        value.output / settings.max_output / volume,
        value.efficiency,
        value.n_active_cells as f64 / volume,
        value.total_positive_net_heat as f64 / settings.min_heat / volume,
        value.irradiator_flux as f64 / settings.min_criticality as f64 / volume,
        value.density,
        value.sparsity_penalty,
        shielded_cells as f64 / volume,
    ];
    let base = coords.len() * N_BLOCK_CLASSES;
    for (slot, stat) in features[base..].iter_mut().zip(statistics) {
        *slot = stat as f32;
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Fuel;
    use crate::lattice::grid::Grid;
    use crate::lattice::Evaluator;
    use crate::opt::Quota;

    #[test]
    fn classes_cover_every_kind() {
        let mut s = Settings::default_for([1, 1, 1]);
        s.fuels = vec![Fuel {
            name: "f".to_string(),
            limit: -1,
            criticality: 0,
            heat: 10,
            self_priming: true,
            efficiency: 1.0,
        }];
        s.compute();
        let classes: Vec<Option<usize>> = [0, 31, 32, 35, SHIELD, IRRADIATOR, CONDUCTOR, AIR, CELL_BASE, CELL_BASE + 1]
            .iter()
            .map(|&code| block_class(&s, code))
            .collect();
        assert_eq!(
            classes,
            vec![Some(0), Some(0), Some(1), Some(2), Some(3), Some(4), Some(5), None, Some(6), None]
        );
    }

    #[test]
    fn extract_lays_out_one_hot_then_statistics() {
        let mut s = Settings::default_for([2, 1, 1]);
        s.fuels = vec![Fuel {
            name: "f".to_string(),
            limit: -1,
            criticality: 0,
            heat: 10,
            self_priming: true,
            efficiency: 1.0,
        }];
        s.compute();
        let mut state = Grid::filled(s.size, AIR);
        state[[1, 0, 0]] = CELL_BASE;
        let value = Evaluator::new(&s, false).run(&state);
        let sample = Sample {
            quota: Quota::for_state(&s, &state),
            state,
            value,
            value_with_shield: None,
        };
        let coords = [[0, 0, 0], [1, 0, 0]];
        let f = extract(&s, &coords, &sample);
        assert_eq!(f.len(), n_features(2));
        assert!(f[..7].iter().all(|&v| v == 0.0));
        assert_eq!(f[7 + 6], 1.0);
        assert_eq!(f[14 + 2], 0.5);
        assert_eq!(f[14 + 3], 0.5);
    }
}
