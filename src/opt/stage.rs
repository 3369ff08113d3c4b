/// Control overlay on top of the hill climb.
///
/// Without a surrogate the optimizer stays in `Rollout`. With one, every
/// stage change goes through [`Stage::next`]:
///
/// | from      | to        | when                                           |
/// |-----------|-----------|------------------------------------------------|
/// | `Rollout` | `Train`   | the rollout converged feasible or gave up       |
/// | `Train`   | `Infer`   | the training iterations are spent              |
/// | `Infer`   | `Rollout` | the inference search converged; next episode   |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    /// Search scored by the evaluator.
    #[default]
    Rollout,
    /// Fit the surrogate on the finished trajectory, one minibatch per step.
    Train,
    /// Search scored by the surrogate.
    Infer,
}

impl Stage {
    pub fn next(self) -> Stage {
        match self {
            Stage::Rollout => Stage::Train,
            Stage::Train => Stage::Infer,
            Stage::Infer => Stage::Rollout,
        }
    }

    /// Numeric id reported to hosts.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Rollout => "rollout",
            Stage::Train => "train",
            Stage::Infer => "infer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_returns_to_rollout() {
        let mut stage = Stage::default();
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(stage.index());
            stage = stage.next();
        }
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(stage, Stage::Rollout);
    }
}
