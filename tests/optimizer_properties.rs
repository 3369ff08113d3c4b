use fission::opt::{infeasibility, raw_fitness, Quota, Symmetry};
use fission::{parse_settings, Evaluator, Optimizer, Settings};
use rand::rngs::StdRng;
use rand::SeedableRng;

const SMALL: &str = r#"
[reactor]
size = [3, 3, 3]
goal = "output"
symmetry = ["x", "z"]

[limits]
Shield = 0
Irradiator = 0

[fuel.TBU]
efficiency = 1.25
heat = 60
criticality = 34
limit = 5
self_priming = true
"#;

fn settings(source: &str) -> Settings {
    parse_settings(source).unwrap().settings
}

#[test]
fn long_run_keeps_every_invariant() {
    let s = settings(SMALL);
    let symmetry = Symmetry::new(s.size, s.symmetry);
    let mut opt = Optimizer::new(&s, StdRng::seed_from_u64(2024), false);
    let mut best = raw_fitness(&s, &opt.best().value);
    for _ in 0..3000 {
        opt.step();
        let parent = opt.parent();
        assert_eq!(parent.quota, Quota::for_state(&s, &parent.state));
        assert!(parent.quota.fuels[0] >= 0);
        assert!(symmetry.is_symmetric(&parent.state));

        let now = raw_fitness(&s, &opt.best().value);
        assert!(now >= best);
        best = now;
    }
    let best = opt.best();
    assert!(best.is_feasible());
    assert_eq!(infeasibility(&s, best), 0.0);
    // The reported evaluation is exactly what a fresh evaluator computes.
    assert_eq!(Evaluator::new(&s, false).run(&best.state), best.value);
}

#[test]
fn fingerprint_is_reproducible_per_seed() {
    let s = settings(SMALL);
    let run = |seed: u64| {
        let mut opt = Optimizer::new(&s, StdRng::seed_from_u64(seed), false);
        for _ in 0..1500 {
            opt.step();
        }
        fission::fingerprint(&opt.best().state)
    };
    assert_eq!(run(8), run(8));
}

#[test]
fn controllable_best_stays_dark_with_shields_on() {
    let source = SMALL
        .replace("symmetry = [\"x\", \"z\"]", "controllable = true")
        .replace("Shield = 0", "Shield = -1");
    let s = settings(&source);
    let mut opt = Optimizer::new(&s, StdRng::seed_from_u64(5), false);
    for _ in 0..1500 {
        opt.step();
    }
    let best = opt.best();
    let shielded = best.value_with_shield.as_ref().unwrap();
    assert_eq!(shielded.n_active_cells, 0);
    assert!(shielded.shield_on);
}

#[test]
fn host_read_contract() {
    let s = settings(SMALL);
    let opt = Optimizer::new(&s, StdRng::seed_from_u64(1), false);
    let best = opt.best();
    assert_eq!(best.shape(), [3, 3, 3]);
    assert_eq!(best.strides(), [9, 3, 1]);
    assert_eq!(best.data().len(), 27);
    assert!(best.output() >= 0.0);
    assert!(best.efficiency() >= 0.0);
    assert!(best.irradiator_flux() >= 0);
    assert_eq!(best.fuel_use(), best.value.n_active_cells);
}
