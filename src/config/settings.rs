use crate::lattice::tile::{N_BLOCKS, SOURCE_EFFICIENCIES};

/// Optimization objective.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Goal {
    #[default]
    Output,
    FuelUse,
    Efficiency,
    Irradiation,
}

impl Goal {
    pub fn parse(name: &str) -> Option<Goal> {
        match name {
            "output" => Some(Goal::Output),
            "fuel_use" => Some(Goal::FuelUse),
            "efficiency" => Some(Goal::Efficiency),
            "irradiation" => Some(Goal::Irradiation),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Goal::Output => "output",
            Goal::FuelUse => "fuel_use",
            Goal::Efficiency => "efficiency",
            Goal::Irradiation => "irradiation",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Fuel {
    pub name: String,
    /// Maximum number of cells of this fuel, −1 for unlimited.
    pub limit: i32,
    pub criticality: i32,
    pub heat: i32,
    pub self_priming: bool,
    pub efficiency: f64,
}

/// Reactor settings, shared read-only by evaluators and the optimizer.
///
/// Call [`Settings::compute`] after editing any field; the derived
/// `cell_types` table and normalizers are stale until then.
#[derive(Clone, Debug)]
pub struct Settings {
    pub size: [usize; 3],
    pub fuels: Vec<Fuel>,
    /// Per block kind placement quota, −1 for unlimited.
    pub limits: [i32; N_BLOCKS],
    /// Cf-252, Po-Be and Ra-Be quotas.
    pub source_limits: [i32; 3],
    pub goal: Goal,
    pub controllable: bool,
    pub symmetry: [bool; 3],

    /// `(fuel index, source variant)` for each cell code, in code order.
    pub cell_types: Vec<(usize, u8)>,
    pub min_heat: f64,
    pub min_criticality: i32,
    pub max_output: f64,
}

impl Settings {
    /// Unlimited quotas, no fuels, output goal, no symmetry.
    pub fn default_for(size: [usize; 3]) -> Self {
        Self {
            size,
            fuels: Vec::new(),
            limits: [-1; N_BLOCKS],
            source_limits: [-1; 3],
            goal: Goal::Output,
            controllable: false,
            symmetry: [false; 3],
            cell_types: Vec::new(),
            min_heat: 1.0,
            min_criticality: 1,
            max_output: 1.0,
        }
    }

    pub fn compute(&mut self) {
        self.cell_types.clear();
        for (i, fuel) in self.fuels.iter().enumerate() {
            self.cell_types.push((i, 0));
            if !fuel.self_priming {
                for source in 1..=3 {
                    self.cell_types.push((i, source));
                }
            }
        }

        self.min_heat = self
            .fuels
            .iter()
            .map(|f| f.heat)
            .min()
            .unwrap_or(1)
            .max(1) as f64;
        self.min_criticality = self
            .fuels
            .iter()
            .map(|f| f.criticality)
            .min()
            .unwrap_or(1)
            .max(1);
        self.max_output = self
            .fuels
            .iter()
            .map(|f| f.heat as f64 * f.efficiency)
            .fold(1.0, f64::max);
    }

    pub fn volume(&self) -> usize {
        self.size[0] * self.size[1] * self.size[2]
    }

    /// Efficiency of a source variant (0 means none).
    pub fn source_efficiency(source: u8) -> f64 {
        match source {
            0 => 1.0,
            s => SOURCE_EFFICIENCIES[(s - 1) as usize],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fuel(name: &str, heat: i32, criticality: i32, self_priming: bool) -> Fuel {
        Fuel {
            name: name.to_string(),
            limit: -1,
            criticality,
            heat,
            self_priming,
            efficiency: 1.25,
        }
    }

    #[test]
    fn compute_expands_sources_for_unprimed_fuels() {
        let mut s = Settings::default_for([3, 3, 3]);
        s.fuels = vec![fuel("a", 120, 102, false), fuel("b", 300, 60, true)];
        s.compute();
        assert_eq!(s.cell_types, vec![(0, 0), (0, 1), (0, 2), (0, 3), (1, 0)]);
        assert_eq!(s.min_heat, 120.0);
        assert_eq!(s.min_criticality, 60);
        assert_eq!(s.max_output, 375.0);
    }

    #[test]
    fn compute_is_repeatable() {
        let mut s = Settings::default_for([2, 2, 2]);
        s.fuels = vec![fuel("a", 10, 0, true)];
        s.compute();
        s.compute();
        assert_eq!(s.cell_types, vec![(0, 0)]);
        assert_eq!(s.min_criticality, 1);
    }

    #[test]
    fn normalizers_clamp_without_fuels() {
        let mut s = Settings::default_for([1, 1, 1]);
        s.compute();
        assert!(s.cell_types.is_empty());
        assert_eq!((s.min_heat, s.min_criticality, s.max_output), (1.0, 1, 1.0));
    }

    #[test]
    fn goal_names_round_trip() {
        for goal in [Goal::Output, Goal::FuelUse, Goal::Efficiency, Goal::Irradiation] {
            assert_eq!(Goal::parse(goal.name()), Some(goal));
        }
        assert_eq!(Goal::parse("speed"), None);
    }
}
