use std::path::PathBuf;

use clap::Args;
use fission::lattice::tile::{TileCode, CELL_BASE};
use fission::view::tile_name;

use super::load_settings_or_exit;

#[derive(Args)]
pub struct CheckArgs {
    /// Settings file (reactor.toml)
    pub input: PathBuf,
}

pub fn cmd_check(args: CheckArgs) {
    let settings = load_settings_or_exit(&args.input);
    let [x, y, z] = settings.size;
    eprintln!("OK: {}", args.input.display());
    println!("size:         {}x{}x{}", x, y, z);
    println!("goal:         {}", settings.goal.name());
    println!("controllable: {}", settings.controllable);
    let axes: Vec<&str> = ["x", "y", "z"]
        .iter()
        .zip(settings.symmetry)
        .filter(|(_, on)| *on)
        .map(|(axis, _)| *axis)
        .collect();
    println!("symmetry:     [{}]", axes.join(", "));
    println!("cell types:");
    for i in 0..settings.cell_types.len() {
        let code = CELL_BASE + i as TileCode;
        println!("  {:>3} {}", code, tile_name(&settings, code));
    }
}
