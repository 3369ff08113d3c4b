pub mod config;
pub mod diagnostic;
pub mod lattice;
pub mod opt;
pub mod span;
pub mod surrogate;
pub mod view;

// Re-exports for drivers
pub use config::{load_settings, parse_settings, Fuel, Goal, Settings};
pub use lattice::{Evaluation, Evaluator, State};
pub use opt::{Optimizer, Sample, Stage};

/// Hex blake3 fingerprint of a layout's tile codes.
pub fn fingerprint(state: &State) -> String {
    let mut hasher = blake3::Hasher::new();
    for code in state.iter() {
        hasher.update(&code.to_le_bytes());
    }
    for extent in state.shape() {
        hasher.update(&(extent as u64).to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
