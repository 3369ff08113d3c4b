use std::path::PathBuf;

use clap::Args;
use fission::{fingerprint, view, Optimizer};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::load_settings_or_exit;

/// Steps between progress lines.
const REPORT_EVERY: usize = 10_000;

#[derive(Args)]
pub struct RunArgs {
    /// Settings file (reactor.toml)
    pub input: PathBuf,
    /// Number of optimizer steps
    #[arg(long, default_value_t = 100_000)]
    pub steps: usize,
    /// Seed for the search RNG
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Alternate rollouts with surrogate-scored search
    #[arg(long)]
    pub surrogate: bool,
}

pub fn cmd_run(args: RunArgs) {
    let settings = load_settings_or_exit(&args.input);
    let rng = StdRng::seed_from_u64(args.seed);
    let mut opt = Optimizer::new(&settings, rng, args.surrogate);

    for i in 1..=args.steps {
        if opt.step() {
            eprintln!(
                "step {}: best output {:.2} ({} active cells)",
                i,
                opt.best().output(),
                opt.best().fuel_use()
            );
        }
        if i % REPORT_EVERY == 0 {
            eprintln!(
                "step {}: episode {} stage {} iteration {} penalty {:.3e}",
                i,
                opt.n_episode(),
                opt.stage().name(),
                opt.n_iteration(),
                opt.penalty()
            );
        }
    }

    let best = opt.best();
    print!("{}", view::render_layers(&settings, &best.state));
    print!("{}", view::render_summary(&settings, best));
    println!("fingerprint:       {}", fingerprint(&best.state));
}
