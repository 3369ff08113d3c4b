//! Stochastic local search over reactor layouts.
//!
//! Each [`Optimizer::step`] draws a few single-orbit mutations of the
//! parent, re-evaluates them and keeps the fittest if it is at least as good.
//! Infeasible parents are pushed towards feasibility by a penalty that
//! doubles every time the search stagnates; once the parent is feasible (or
//! the penalty gives up) the search restarts from a fresh random layout.
//!
//! With a surrogate attached, every episode runs through [`Stage`]s: a
//! rollout scored by the evaluator, a training stage that fits the surrogate
//! on the rollout's trajectory, and an inference stage scored by the
//! surrogate.

pub mod sample;
pub mod stage;
pub mod symmetry;


pub use sample::{Quota, Sample};
pub use stage::Stage;
pub use symmetry::Symmetry;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{Goal, Settings};
use crate::lattice::grid::{Coord, Grid};
use crate::lattice::tile::{TileCode, AIR, CELL_BASE};
use crate::lattice::{Evaluation, Evaluator, State};
use crate::surrogate::Surrogate;

/// Children drawn per step.
pub const N_CHILDREN: usize = 4;
/// Stagnant steps per grid position before the search reacts.
pub const CONVERGE_PER_VOLUME: usize = 16;
/// Penalty past which an infeasible parent is abandoned.
pub const PENALTY_CEILING: f64 = 1e8;
pub const LOSS_HISTORY: usize = 256;

pub const INTERACTIVE_MIN: usize = 4096;
pub const INTERACTIVE_SCALE: usize = 327680;
pub const INTERACTIVE_TRAIN: usize = 4;
pub const INTERACTIVE_INFER: usize = 64;

/// The goal's objective, normalized so fuels of any size score alike.
pub fn raw_fitness(settings: &Settings, value: &Evaluation) -> f64 {
    match settings.goal {
        Goal::Output => value.output / settings.max_output,
        Goal::FuelUse => value.n_active_cells as f64,
        Goal::Efficiency => value.efficiency,
        Goal::Irradiation => value.irradiator_flux as f64 / settings.min_criticality as f64,
    }
}

/// How far `sample` is from feasible. Zero exactly when it is feasible.
pub fn infeasibility(settings: &Settings, sample: &Sample) -> f64 {
    let heat = sample.value.total_positive_net_heat as f64 / settings.min_heat;
    let shielded = sample
        .value_with_shield
        .as_ref()
        .map_or(0.0, |v| v.n_active_cells as f64);
    heat + shielded
}

pub struct Optimizer<'a, R: Rng> {
    settings: &'a Settings,
    rng: R,
    symmetry: Symmetry,
    /// One representative per symmetry orbit; shuffled on every restart.
    coords: Vec<Coord>,
    allowed: Vec<TileCode>,
    evaluator: Evaluator<'a>,
    /// Forced-shield evaluator, present for controllable settings.
    shielded: Option<Evaluator<'a>>,
    surrogate: Option<Surrogate>,

    parent: Sample,
    parent_fitness: f64,
    best: Sample,

    stage: Stage,
    n_episode: usize,
    n_iteration: usize,
    n_converge: usize,
    max_converge: usize,
    penalty: f64,
    inference_failed: bool,

    best_changed: bool,
    redraw_nagle: usize,
    loss_history: Vec<f64>,
    loss_changed: bool,
}

impl<'a, R: Rng> Optimizer<'a, R> {
    /// `settings` must already be compiled with [`Settings::compute`].
    pub fn new(settings: &'a Settings, mut rng: R, use_surrogate: bool) -> Self {
        let symmetry = Symmetry::new(settings.size, settings.symmetry);
        let coords = symmetry.reduced_coords();
        let surrogate = use_surrogate.then(|| Surrogate::new(coords.clone(), &mut rng));
        let mut evaluator = Evaluator::new(settings, false);
        let mut shielded = settings.controllable.then(|| Evaluator::new(settings, true));

        let empty = Grid::filled(settings.size, AIR);
        let best = Sample {
            quota: Quota::new(settings),
            value: evaluator.run(&empty),
            value_with_shield: shielded.as_mut().map(|e| e.run(&empty)),
            state: empty,
        };

        let mut opt = Self {
            settings,
            rng,
            symmetry,
            coords,
            allowed: Vec::new(),
            evaluator,
            shielded,
            surrogate,
            parent: best.clone(),
            parent_fitness: 0.0,
            best,
            stage: Stage::Rollout,
            n_episode: 0,
            n_iteration: 0,
            n_converge: 0,
            max_converge: settings.volume() * CONVERGE_PER_VOLUME,
            penalty: 0.0,
            inference_failed: false,
            best_changed: true,
            redraw_nagle: 0,
            loss_history: vec![0.0; LOSS_HISTORY],
            loss_changed: false,
        };
        opt.restart();
        if let Some(surrogate) = opt.surrogate.as_mut() {
            let features = surrogate.features(settings, &opt.parent);
            surrogate.append_trajectory(features);
        }
        opt.parent_fitness = opt.fitness(&opt.parent);
        if opt.parent.is_feasible() && opt.raw(&opt.parent) > opt.raw(&opt.best) {
            opt.best = opt.parent.clone();
            opt.canonicalize_best();
        }
        opt
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    /// Best feasible layout seen so far, canonicalized.
    pub fn best(&self) -> &Sample {
        &self.best
    }

    pub fn parent(&self) -> &Sample {
        &self.parent
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn n_stage(&self) -> usize {
        self.stage.index()
    }

    pub fn n_episode(&self) -> usize {
        self.n_episode
    }

    pub fn n_iteration(&self) -> usize {
        self.n_iteration
    }

    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    /// Recent training losses, oldest first.
    pub fn loss_history(&self) -> &[f64] {
        &self.loss_history
    }

    fn raw(&self, sample: &Sample) -> f64 {
        raw_fitness(self.settings, &sample.value)
    }

    fn fitness(&self, sample: &Sample) -> f64 {
        match self.stage {
            Stage::Train => 0.0,
            Stage::Infer => match &self.surrogate {
                Some(surrogate) => surrogate.infer(&surrogate.features(self.settings, sample)),
                None => self.raw(sample),
            },
            Stage::Rollout => {
                let crit = self.settings.min_criticality;
                let value = &sample.value;
                self.raw(sample)
                    + value.total_raw_flux.min(crit) as f64 / crit as f64
                    + value.max_cell_flux.min(crit) as f64 / crit as f64
                    - self.penalty * infeasibility(self.settings, sample)
            }
        }
    }

    /// Fill `allowed` with every code `quota` can place `n` times. Air leads
    /// the list when `with_air` is set.
    fn collect_allowed(&mut self, quota: &Quota, n: i32, with_air: bool) {
        let settings = self.settings;
        let end = CELL_BASE + settings.cell_types.len() as TileCode;
        self.allowed.clear();
        if with_air {
            self.allowed.push(AIR);
        }
        self.allowed
            .extend((0..end).filter(|&code| code != AIR && quota.permits(settings, code, n)));
    }

    fn evaluate(&mut self, quota: Quota, state: State) -> Sample {
        debug_assert!(self.symmetry.is_symmetric(&state), "mirror images diverged");
        let value = self.evaluator.run(&state);
        let value_with_shield = self.shielded.as_mut().map(|e| e.run(&state));
        Sample {
            quota,
            state,
            value,
            value_with_shield,
        }
    }

    /// Replace the parent with a random layout built orbit by orbit in a
    /// shuffled order, each orbit taking a uniformly chosen placeable code.
    fn restart(&mut self) {
        let settings = self.settings;
        self.coords.shuffle(&mut self.rng);
        let mut quota = Quota::new(settings);
        let mut state = Grid::filled(settings.size, AIR);
        for i in 0..self.coords.len() {
            let c = self.coords[i];
            let n = self.symmetry.orbit_size(c);
            self.collect_allowed(&quota, n, false);
            if self.allowed.is_empty() {
                break;
            }
            let code = self.allowed[self.rng.random_range(0..self.allowed.len())];
            quota.consume(settings, code, n);
            self.symmetry.set(&mut state, c, code);
        }
        self.parent = self.evaluate(quota, state);
    }

    /// Re-roll one orbit of `sample`, Air included.
    fn mutate(&mut self, sample: Sample) -> Sample {
        if self.coords.is_empty() {
            return sample;
        }
        let settings = self.settings;
        let Sample {
            mut quota,
            mut state,
            ..
        } = sample;
        let c = self.coords[self.rng.random_range(0..self.coords.len())];
        let n = self.symmetry.orbit_size(c);
        quota.release(settings, state[c], n);
        self.collect_allowed(&quota, n, true);
        let code = self.allowed[self.rng.random_range(0..self.allowed.len())];
        quota.consume(settings, code, n);
        self.symmetry.set(&mut state, c, code);
        self.evaluate(quota, state)
    }

    /// Swap the best for its canonical form when that stays feasible and
    /// scores no worse.
    fn canonicalize_best(&mut self) {
        let mut state = self.best.state.clone();
        let value = self.evaluator.canonicalize(&mut state);
        let value_with_shield = self.shielded.as_mut().map(|e| e.run(&state));
        let canonical = Sample {
            quota: Quota::for_state(self.settings, &state),
            state,
            value,
            value_with_shield,
        };
        if canonical.is_feasible() && self.raw(&canonical) >= self.raw(&self.best) {
            self.best = canonical;
        }
    }

    fn append_parent_features(&mut self) {
        if let Some(surrogate) = self.surrogate.as_mut() {
            let features = surrogate.features(self.settings, &self.parent);
            surrogate.append_trajectory(features);
        }
    }

    /// React to `max_converge` stagnant steps.
    fn on_converged(&mut self) {
        self.n_converge = 0;
        if self.stage == Stage::Infer {
            self.stage = self.stage.next();
            self.n_episode += 1;
            self.n_iteration = 0;
            if self.inference_failed {
                self.restart();
            }
            if let Some(surrogate) = self.surrogate.as_mut() {
                surrogate.new_trajectory();
            }
            self.append_parent_features();
        } else if self.parent.is_feasible() || self.penalty > PENALTY_CEILING {
            self.penalty = 0.0;
            let ret = if self.parent.is_feasible() {
                self.raw(&self.parent)
            } else {
                0.0
            };
            if let Some(surrogate) = self.surrogate.as_mut() {
                surrogate.finish_trajectory(ret);
                self.n_iteration = surrogate.training_iterations();
                self.stage = self.stage.next();
                return;
            }
            self.n_episode += 1;
            self.n_iteration = 0;
            self.restart();
        } else if self.penalty == 0.0 {
            self.penalty = self.rng.random::<f64>();
        } else {
            self.penalty *= 2.0;
        }
        self.parent_fitness = self.fitness(&self.parent);
    }

    fn train_step(&mut self) {
        let loss = match self.surrogate.as_mut() {
            Some(surrogate) => surrogate.train(&mut self.rng),
            None => 0.0,
        };
        self.loss_history.rotate_left(1);
        if let Some(last) = self.loss_history.last_mut() {
            *last = loss;
        }
        self.loss_changed = true;
        self.n_iteration -= 1;
    }

    /// Advance the search by one step. Returns whether the best changed.
    pub fn step(&mut self) -> bool {
        if self.stage == Stage::Train {
            if self.n_iteration > 0 {
                self.train_step();
                return false;
            }
            self.stage = self.stage.next();
            self.n_converge = 0;
            self.inference_failed = true;
            self.restart();
            self.parent_fitness = self.fitness(&self.parent);
        }

        let mut best_changed = false;
        let mut fittest: Option<(f64, Sample)> = None;
        for _ in 0..N_CHILDREN {
            let child = self.mutate(self.parent.clone());
            if child.is_feasible() && self.raw(&child) > self.raw(&self.best) {
                self.best = child.clone();
                best_changed = true;
            }
            let fitness = self.fitness(&child);
            if fittest.as_ref().map_or(true, |(f, _)| fitness > *f) {
                fittest = Some((fitness, child));
            }
        }

        if let Some((fitness, child)) = fittest {
            if fitness >= self.parent_fitness {
                if fitness > self.parent_fitness {
                    self.n_converge = 0;
                    if self.stage == Stage::Infer {
                        self.inference_failed = false;
                    }
                }
                self.parent_fitness = fitness;
                self.parent = child;
                if self.stage != Stage::Infer {
                    self.append_parent_features();
                }
            }
        }
        self.n_converge += 1;
        self.n_iteration += 1;

        if best_changed {
            self.canonicalize_best();
            self.best_changed = true;
        }
        if self.n_converge >= self.max_converge {
            self.on_converged();
        }
        best_changed
    }

    /// Run a batch of steps sized to keep an interactive host responsive.
    pub fn step_interactive(&mut self) {
        let n = match self.stage {
            Stage::Rollout => {
                INTERACTIVE_MIN.min(INTERACTIVE_SCALE.div_ceil(self.settings.volume().max(1)))
            }
            Stage::Train => INTERACTIVE_TRAIN,
            Stage::Infer => INTERACTIVE_INFER,
        };
        for _ in 0..n {
            self.step();
            self.redraw_nagle += 1;
        }
    }

    /// True at most once per `INTERACTIVE_MIN` steps while the best keeps
    /// changing.
    pub fn needs_redraw_best(&mut self) -> bool {
        let result = self.best_changed && self.redraw_nagle >= INTERACTIVE_MIN;
        if result {
            self.best_changed = false;
            self.redraw_nagle = 0;
        }
        result
    }

    pub fn needs_replot_loss(&mut self) -> bool {
        std::mem::take(&mut self.loss_changed)
    }
}
