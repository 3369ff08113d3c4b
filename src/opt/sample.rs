use crate::config::Settings;
use crate::lattice::tile::{TileCode, AIR, CELL_BASE, N_BLOCKS};
use crate::lattice::{Evaluation, State};

/// Remaining placement quota of a candidate. Negative means unlimited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quota {
    pub blocks: [i32; N_BLOCKS],
    pub sources: [i32; 3],
    pub fuels: Vec<i32>,
}

impl Quota {
    /// Full quota of an empty grid.
    pub fn new(settings: &Settings) -> Self {
        Self {
            blocks: settings.limits,
            sources: settings.source_limits,
            fuels: settings.fuels.iter().map(|f| f.limit).collect(),
        }
    }

    /// Quota left after placing every tile of `state`.
    pub fn for_state(settings: &Settings, state: &State) -> Self {
        let mut quota = Self::new(settings);
        for &code in state.iter() {
            quota.consume(settings, code, 1);
        }
        quota
    }

    /// Whether `n` more copies of `code` fit. Air always does.
    pub fn permits(&self, settings: &Settings, code: TileCode, n: i32) -> bool {
        let fits = |left: i32| left < 0 || left >= n;
        if code < AIR {
            return fits(self.blocks[code as usize]);
        }
        match cell_type(settings, code) {
            Some((fuel, source)) => {
                fits(self.fuels[fuel]) && (source == 0 || fits(self.sources[source as usize - 1]))
            }
            None => true,
        }
    }

    pub fn consume(&mut self, settings: &Settings, code: TileCode, n: i32) {
        self.adjust(settings, code, -n);
    }

    pub fn release(&mut self, settings: &Settings, code: TileCode, n: i32) {
        self.adjust(settings, code, n);
    }

    fn adjust(&mut self, settings: &Settings, code: TileCode, delta: i32) {
        fn apply(left: &mut i32, delta: i32) {
            if *left >= 0 {
                *left += delta;
                assert!(*left >= 0, "placement quota went negative");
            }
        }
        if code < AIR {
            apply(&mut self.blocks[code as usize], delta);
        } else if let Some((fuel, source)) = cell_type(settings, code) {
            apply(&mut self.fuels[fuel], delta);
            if source != 0 {
                apply(&mut self.sources[source as usize - 1], delta);
            }
        }
    }
}

fn cell_type(settings: &Settings, code: TileCode) -> Option<(usize, u8)> {
    code.checked_sub(CELL_BASE)
        .and_then(|i| settings.cell_types.get(i as usize))
        .copied()
}

/// One candidate: its grid, remaining quota and evaluation.
///
/// `value` always describes `state`; `value_with_shield` is present only
/// for controllable settings.
#[derive(Clone, Debug)]
pub struct Sample {
    pub quota: Quota,
    pub state: State,
    pub value: Evaluation,
    pub value_with_shield: Option<Evaluation>,
}

impl Sample {
    /// No positive net heat, and no active cell with shields forced on.
    pub fn is_feasible(&self) -> bool {
        self.value.total_positive_net_heat == 0
            && self
                .value_with_shield
                .as_ref()
                .map_or(true, |v| v.n_active_cells == 0)
    }

    /// Flat tile buffer, row-major with `z` fastest.
    pub fn data(&self) -> &[TileCode] {
        self.state.as_slice()
    }

    pub fn shape(&self) -> [usize; 3] {
        self.state.shape()
    }

    pub fn strides(&self) -> [usize; 3] {
        self.state.strides()
    }

    pub fn output(&self) -> f64 {
        self.value.output
    }

    pub fn fuel_use(&self) -> usize {
        self.value.n_active_cells
    }

    pub fn efficiency(&self) -> f64 {
        self.value.efficiency
    }

    pub fn irradiator_flux(&self) -> i32 {
        self.value.irradiator_flux
    }
}
