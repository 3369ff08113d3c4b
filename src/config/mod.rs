//! Reactor settings and the `reactor.toml` loader.
//!
//! The loader is a section-aware line reader covering the small TOML subset
//! the settings file uses: `[section]` headers, `key = value` pairs, integer,
//! float, boolean, string and flat array values, and `#` comments.

pub mod settings;

pub use settings::{Fuel, Goal, Settings};

use std::path::Path;

use crate::diagnostic::Diagnostic;
use crate::lattice::tile::{block_code, SOURCE_NAMES};
use crate::span::{Span, Spanned};

/// Largest accepted fuel heat per cell.
pub const MAX_FUEL_HEAT: i32 = 100_000;

/// Largest accepted fuel criticality.
pub const MAX_CRITICALITY: i32 = 1_000_000;

/// A parsed settings file with its non-fatal diagnostics.
#[derive(Clone, Debug)]
pub struct SettingsFile {
    pub settings: Settings,
    pub warnings: Vec<Diagnostic>,
}

/// Read, parse and compute settings from a file.
pub fn load_settings(path: &Path) -> Result<Settings, Vec<Diagnostic>> {
    let source = read_source(path)?;
    parse_settings(&source).map(|file| file.settings)
}

/// Read a settings file's text.
pub fn read_source(path: &Path) -> Result<String, Vec<Diagnostic>> {
    std::fs::read_to_string(path).map_err(|e| {
        vec![Diagnostic::error(
            format!("cannot read '{}': {}", path.display(), e),
            Span::dummy(),
        )]
    })
}

struct FuelEntry {
    name: String,
    header: Span,
    efficiency: Option<f64>,
    heat: Option<i32>,
    criticality: Option<i32>,
    limit: i32,
    self_priming: bool,
}

impl FuelEntry {
    fn new(name: String, header: Span) -> Self {
        Self {
            name,
            header,
            efficiency: None,
            heat: None,
            criticality: None,
            limit: -1,
            self_priming: false,
        }
    }
}

enum Section {
    None,
    Reactor,
    Limits,
    Sources,
    Fuel(usize),
    Unknown,
}

/// Parse settings text. The returned settings are already computed.
pub fn parse_settings(source: &str) -> Result<SettingsFile, Vec<Diagnostic>> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut settings = Settings::default_for([0, 0, 0]);
    let mut size: Option<Spanned<[usize; 3]>> = None;
    let mut fuels: Vec<FuelEntry> = Vec::new();
    let mut section = Section::None;

    let mut offset = 0;
    for raw in source.split_inclusive('\n') {
        let line_offset = offset;
        offset += raw.len();
        let line = strip_comment(raw.trim_end_matches(['\n', '\r']));
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let span_of = |part: &str| Span::of_part(line, line_offset, part);

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            let name = trimmed[1..trimmed.len() - 1].trim();
            section = match name {
                "reactor" => Section::Reactor,
                "limits" => Section::Limits,
                "sources" => Section::Sources,
                _ => match name.strip_prefix("fuel.") {
                    Some(fuel) if !fuel.trim().trim_matches('"').is_empty() => {
                        let fuel_name = fuel.trim().trim_matches('"').to_string();
                        if fuels.iter().any(|f| f.name == fuel_name) {
                            errors.push(Diagnostic::error(
                                format!("fuel `{}` is defined twice", fuel_name),
                                span_of(name),
                            ));
                            Section::Unknown
                        } else {
                            fuels.push(FuelEntry::new(fuel_name, span_of(name)));
                            Section::Fuel(fuels.len() - 1)
                        }
                    }
                    _ => {
                        errors.push(
                            Diagnostic::error(format!("unknown section `[{}]`", name), span_of(name))
                                .with_help(
                                    "sections are [reactor], [limits], [sources] and [fuel.NAME]"
                                        .to_string(),
                                ),
                        );
                        Section::Unknown
                    }
                },
            };
            continue;
        }

        let Some((key, value)) = trimmed.split_once('=') else {
            errors.push(Diagnostic::error(
                "expected `key = value`".to_string(),
                span_of(trimmed),
            ));
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        let key_span = span_of(key);
        let value_span = span_of(value);
        let bad_value = |what: &str| {
            Diagnostic::error(
                format!("`{}` must be {}", key.trim_matches('"'), what),
                value_span,
            )
        };
        let key = key.trim_matches('"');

        match section {
            Section::None => errors.push(Diagnostic::error(
                format!("`{}` appears before any section", key),
                key_span,
            )),
            Section::Unknown => {}
            Section::Reactor => match key {
                "size" => match parse_size(value) {
                    Some(s) => size = Some(Spanned::new(s, value_span)),
                    None => errors.push(
                        bad_value("an array of three positive integers")
                            .with_help("e.g. `size = [5, 5, 5]`".to_string()),
                    ),
                },
                "goal" => match parse_string(value).and_then(Goal::parse) {
                    Some(goal) => settings.goal = goal,
                    None => errors.push(
                        bad_value("a known goal").with_help(
                            "use \"output\", \"fuel_use\", \"efficiency\" or \"irradiation\""
                                .to_string(),
                        ),
                    ),
                },
                "controllable" => match parse_bool(value) {
                    Some(b) => settings.controllable = b,
                    None => errors.push(bad_value("true or false")),
                },
                "symmetry" => match parse_array(value) {
                    Some(axes) => {
                        settings.symmetry = [false; 3];
                        for axis in axes {
                            match parse_string(axis) {
                                Some("x") => settings.symmetry[0] = true,
                                Some("y") => settings.symmetry[1] = true,
                                Some("z") => settings.symmetry[2] = true,
                                _ => errors.push(Diagnostic::error(
                                    format!("unknown symmetry axis {}", axis),
                                    span_of(axis),
                                )),
                            }
                        }
                    }
                    None => errors.push(bad_value("an array of axes like [\"x\", \"z\"]")),
                },
                _ => warnings.push(Diagnostic::warning(
                    format!("unknown key `{}` in [reactor]", key),
                    key_span,
                )),
            },
            Section::Limits => match (block_code(key), parse_int(value)) {
                (None, _) => errors.push(
                    Diagnostic::error(format!("unknown block `{}`", key), key_span).with_note(
                        "heat sinks use short names such as Wt, Fe or Cr; other blocks are M0-M2, R0-R1, Shield, Conductor and Irradiator"
                            .to_string(),
                    ),
                ),
                (Some(_), None) => errors.push(bad_value("an integer")),
                (Some(code), Some(limit)) => settings.limits[code as usize] = limit,
            },
            Section::Sources => match (SOURCE_NAMES.iter().position(|n| *n == key), parse_int(value)) {
                (None, _) => errors.push(
                    Diagnostic::error(format!("unknown neutron source `{}`", key), key_span)
                        .with_help("sources are Cf252, PoBe and RaBe".to_string()),
                ),
                (Some(_), None) => errors.push(bad_value("an integer")),
                (Some(i), Some(limit)) => settings.source_limits[i] = limit,
            },
            Section::Fuel(i) => {
                let fuel = &mut fuels[i];
                match key {
                    "efficiency" => match parse_float(value) {
                        Some(v) => fuel.efficiency = Some(v),
                        None => errors.push(bad_value("a number")),
                    },
                    "heat" => match parse_int(value) {
                        Some(v) if (0..=MAX_FUEL_HEAT).contains(&v) => fuel.heat = Some(v),
                        Some(_) => errors.push(bad_value(&format!("between 0 and {}", MAX_FUEL_HEAT))),
                        None => errors.push(bad_value("an integer")),
                    },
                    "criticality" => match parse_int(value) {
                        Some(v) if (0..=MAX_CRITICALITY).contains(&v) => {
                            fuel.criticality = Some(v)
                        }
                        Some(_) => {
                            errors.push(bad_value(&format!("between 0 and {}", MAX_CRITICALITY)))
                        }
                        None => errors.push(bad_value("an integer")),
                    },
                    "limit" => match parse_int(value) {
                        Some(v) => fuel.limit = v,
                        None => errors.push(bad_value("an integer")),
                    },
                    "self_priming" => match parse_bool(value) {
                        Some(v) => fuel.self_priming = v,
                        None => errors.push(bad_value("true or false")),
                    },
                    _ => warnings.push(Diagnostic::warning(
                        format!("unknown key `{}` in [fuel.{}]", key, fuel.name),
                        key_span,
                    )),
                }
            }
        }
    }

    match size {
        Some(s) => settings.size = s.node,
        None => errors.push(
            Diagnostic::error("missing `size` in [reactor]".to_string(), Span::dummy())
                .with_help("add `size = [X, Y, Z]` under [reactor]".to_string()),
        ),
    }

    for entry in fuels {
        let missing: Vec<&str> = [
            ("efficiency", entry.efficiency.is_none()),
            ("heat", entry.heat.is_none()),
            ("criticality", entry.criticality.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| *name)
        .collect();
        if !missing.is_empty() {
            errors.push(Diagnostic::error(
                format!("fuel `{}` is missing {}", entry.name, missing.join(", ")),
                entry.header,
            ));
            continue;
        }
        settings.fuels.push(Fuel {
            name: entry.name,
            limit: entry.limit,
            criticality: entry.criticality.unwrap_or_default(),
            heat: entry.heat.unwrap_or_default(),
            self_priming: entry.self_priming,
            efficiency: entry.efficiency.unwrap_or_default(),
        });
    }
    if settings.fuels.is_empty() && errors.is_empty() {
        warnings.push(
            Diagnostic::warning("no fuels defined".to_string(), Span::dummy())
                .with_help("add a [fuel.NAME] section".to_string()),
        );
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    settings.compute();
    Ok(SettingsFile { settings, warnings })
}

/// Drop a trailing `#` comment that is not inside a string.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_int(s: &str) -> Option<i32> {
    s.replace('_', "").parse().ok()
}

fn parse_float(s: &str) -> Option<f64> {
    s.replace('_', "").parse().ok()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_string(s: &str) -> Option<&str> {
    s.strip_prefix('"')?.strip_suffix('"')
}

/// Items of a flat array, as subslices of `s`.
fn parse_array(s: &str) -> Option<Vec<&str>> {
    let inner = s.strip_prefix('[')?.strip_suffix(']')?;
    Some(
        inner
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect(),
    )
}

fn parse_size(s: &str) -> Option<[usize; 3]> {
    let items = parse_array(s)?;
    if items.len() != 3 {
        return None;
    }
    let mut size = [0; 3];
    for (axis, item) in items.iter().enumerate() {
        size[axis] = item.parse().ok().filter(|&n: &usize| n > 0)?;
    }
    Some(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::tile::SHIELD;

    const SAMPLE: &str = r#"
# a small reactor
[reactor]
size = [5, 4, 3]
goal = "efficiency"   # inline comment
controllable = true
symmetry = ["x", "z"]

[limits]
Cr = 0
Shield = 4

[sources]
Cf252 = 2

[fuel.LEU-235]
efficiency = 1.0
heat = 120
criticality = 102

[fuel."TBU"]
efficiency = 1.25
heat = 60
criticality = 234
limit = 8
self_priming = true
"#;

    #[test]
    fn parses_full_file() {
        let file = parse_settings(SAMPLE).expect("valid settings");
        let s = &file.settings;
        assert!(file.warnings.is_empty());
        assert_eq!(s.size, [5, 4, 3]);
        assert_eq!(s.goal, Goal::Efficiency);
        assert!(s.controllable);
        assert_eq!(s.symmetry, [true, false, true]);
        assert_eq!(s.limits[31], 0);
        assert_eq!(s.limits[SHIELD as usize], 4);
        assert_eq!(s.limits[0], -1);
        assert_eq!(s.source_limits, [2, -1, -1]);
        assert_eq!(s.fuels.len(), 2);
        assert_eq!(s.fuels[0].name, "LEU-235");
        assert_eq!(s.fuels[0].limit, -1);
        assert_eq!(s.fuels[1].name, "TBU");
        assert!(s.fuels[1].self_priming);
        assert_eq!(s.cell_types.len(), 5);
    }

    #[test]
    fn unknown_goal_is_spanned() {
        let src = "[reactor]\nsize = [3, 3, 3]\ngoal = \"speed\"\n";
        let errors = parse_settings(src).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(&src[errors[0].span.range()], "\"speed\"");
    }

    #[test]
    fn malformed_size_is_rejected() {
        for size in ["[3, 3]", "[3, 0, 3]", "3", "[a, b, c]"] {
            let src = format!("[reactor]\nsize = {}\n", size);
            let errors = parse_settings(&src).unwrap_err();
            assert!(errors[0].message.contains("size"), "{}", size);
            assert_eq!(&src[errors[0].span.range()], size);
        }
    }

    #[test]
    fn unknown_block_is_spanned() {
        let src = "[reactor]\nsize = [3, 3, 3]\n[limits]\nXx = 3\n";
        let errors = parse_settings(src).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Xx"));
        assert_eq!(&src[errors[0].span.range()], "Xx");
    }

    #[test]
    fn missing_size_and_fuel_fields() {
        let src = "[fuel.HEU]\nheat = 300\n";
        let errors = parse_settings(src).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.message.contains("missing `size`")));
        let fuel = errors
            .iter()
            .find(|e| e.message.contains("HEU"))
            .expect("fuel error");
        assert!(fuel.message.contains("efficiency, criticality"));
        assert_eq!(&src[fuel.span.range()], "fuel.HEU");
    }

    #[test]
    fn unknown_keys_warn() {
        let src = "[reactor]\nsize = [1, 1, 1]\ncolour = \"red\"\n";
        let file = parse_settings(src).expect("warnings only");
        assert_eq!(file.warnings.len(), 2);
        assert!(file.warnings.iter().all(|w| !w.is_error()));
    }

    #[test]
    fn unknown_section_is_an_error() {
        let src = "[reactor]\nsize = [1, 1, 1]\n[turbine]\nblades = 3\n";
        let errors = parse_settings(src).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(&src[errors[0].span.range()], "turbine");
    }

    #[test]
    fn out_of_range_fuel_values_are_spanned() {
        let src = "[reactor]\nsize = [2, 1, 1]\n[fuel.HOT]\nefficiency = 1.0\nheat = 1500000000\ncriticality = -4\n";
        let errors = parse_settings(src).unwrap_err();
        let heat = errors
            .iter()
            .find(|e| e.message.starts_with("`heat`"))
            .expect("heat error");
        assert_eq!(&src[heat.span.range()], "1500000000");
        let criticality = errors
            .iter()
            .find(|e| e.message.starts_with("`criticality`"))
            .expect("criticality error");
        assert_eq!(&src[criticality.span.range()], "-4");
    }

    #[test]
    fn comment_markers_inside_strings_survive() {
        assert_eq!(strip_comment("goal = \"a#b\" # c"), "goal = \"a#b\" ");
    }
}
