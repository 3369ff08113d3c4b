use fission::lattice::grid::Grid;
use fission::lattice::tile::{block_code, AIR, CELL_BASE, SHIELD};
use fission::opt::Quota;
use fission::view::{render_layers, render_summary};
use fission::{Evaluator, Fuel, Sample, Settings};

fn fuel(name: &str, heat: i32, efficiency: f64, self_priming: bool) -> Fuel {
    Fuel {
        name: name.to_string(),
        limit: -1,
        criticality: 0,
        heat,
        self_priming,
        efficiency,
    }
}

fn sample(settings: &Settings, tiles: &[([usize; 3], u16)]) -> Sample {
    let mut state = Grid::filled(settings.size, AIR);
    for &(c, code) in tiles {
        state[c] = code;
    }
    Sample {
        quota: Quota::for_state(settings, &state),
        value: Evaluator::new(settings, false).run(&state),
        state,
        value_with_shield: None,
    }
}

#[test]
fn layers_of_a_mixed_layout() {
    let mut settings = Settings::default_for([2, 3, 3]);
    settings.fuels = vec![fuel("LEU", 120, 1.0, false), fuel("TBU", 60, 1.25, true)];
    settings.compute();
    let water = block_code("Wt").unwrap_or(0);
    let s = sample(
        &settings,
        &[
            ([0, 0, 0], CELL_BASE + 1),
            ([0, 0, 1], water),
            ([0, 1, 1], SHIELD),
            ([1, 2, 2], CELL_BASE + 4),
            ([1, 0, 2], block_code("M0").unwrap_or(0)),
        ],
    );
    insta::assert_snapshot!(render_layers(&settings, &s.state), @r"
    x = 0
      LEU+Cf252 Wt        .
      .         Shield    .
      .         .         .
    x = 1
      .         .         M0
      .         .         .
      .         .         TBU
    ");
}

#[test]
fn summary_of_a_lone_cell() {
    let mut settings = Settings::default_for([1, 1, 1]);
    settings.fuels = vec![fuel("TBU", 120, 1.25, true)];
    settings.compute();
    let s = sample(&settings, &[([0, 0, 0], CELL_BASE)]);
    insta::assert_snapshot!(render_summary(&settings, &s), @r"
    goal:              output
    score:             1.0000
    output:            150.00
    efficiency:        1.2500
    active cells:      1
    irradiator flux:   0
    positive net heat: 120
    clusters:          1
    density:           1.000
    feasible:          false
    ");
}

#[test]
fn fingerprint_tracks_content_and_shape() {
    let mut settings = Settings::default_for([2, 2, 2]);
    settings.fuels = vec![fuel("TBU", 60, 1.0, true)];
    settings.compute();
    let a = sample(&settings, &[([0, 0, 0], CELL_BASE)]);
    let b = sample(&settings, &[([0, 0, 0], CELL_BASE)]);
    let c = sample(&settings, &[([1, 0, 0], CELL_BASE)]);
    assert_eq!(fission::fingerprint(&a.state), fission::fingerprint(&b.state));
    assert_ne!(fission::fingerprint(&a.state), fission::fingerprint(&c.state));
    assert_eq!(fission::fingerprint(&a.state).len(), 64);

    let flat = Grid::filled([1, 1, 8], AIR);
    let cube = Grid::filled([2, 2, 2], AIR);
    assert_ne!(fission::fingerprint(&flat), fission::fingerprint(&cube));
}
