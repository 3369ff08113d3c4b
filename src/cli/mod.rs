pub mod check;
pub mod run;

use std::path::Path;
use std::process;

use fission::diagnostic::render_diagnostics;
use fission::Settings;

/// Parse a settings file, rendering warnings and exiting on errors.
pub fn load_settings_or_exit(path: &Path) -> Settings {
    let source = match fission::config::read_source(path) {
        Ok(s) => s,
        Err(errors) => {
            for e in &errors {
                eprintln!("error: {}", e.message);
            }
            process::exit(1);
        }
    };
    let filename = path.display().to_string();
    match fission::parse_settings(&source) {
        Ok(file) => {
            render_diagnostics(&file.warnings, &filename, &source);
            file.settings
        }
        Err(errors) => {
            render_diagnostics(&errors, &filename, &source);
            process::exit(1);
        }
    }
}
