use clap::Parser;
use std::fs;
use std::io::{self, Read};

use crate::error::AppError;
use crate::models::{IonSet, PlotConfig, RawRow, RawTable, Unit};
use crate::stiff::StiffReport;

#[derive(Parser, Debug)]
#[command(author, version, about = "Stiff diagram calculator: mg/L / meq/L normalization and butterfly-plot geometry", long_about = None)]
pub struct Args {
    #[arg(long, help = "Print records, warnings and scene as JSON")]
    pub json: bool,
    #[arg(
        long,
        value_name = "FILE",
        help = "JSON document with rows and optional config; '-' reads from stdin"
    )]
    pub input: Option<String>,
    #[arg(
        long,
        value_name = "JSON",
        help = "Inline JSON array of rows (overrides --input)"
    )]
    pub rows_json: Option<String>,
    #[arg(
        long,
        value_name = "JSON",
        help = "Inline JSON for the plot config (optional, supplements --rows-json)"
    )]
    pub config_json: Option<String>,
    #[arg(long, help = "Use the built-in sample table")]
    pub demo: bool,
    #[arg(long, value_enum, help = "Unit of the Conc column (overrides config)")]
    pub unit: Option<Unit>,
    #[arg(long, value_enum, help = "Supported ion set (overrides config)")]
    pub ions: Option<IonSet>,
    #[arg(long, help = "Diagram title (overrides config)")]
    pub title: Option<String>,
    #[arg(long, value_name = "FILE", help = "Also write the diagram as SVG")]
    pub svg: Option<String>,
    #[arg(short, long, help = "Debug logging on stderr (RUST_LOG takes precedence)")]
    pub verbose: bool,
}

#[derive(serde::Deserialize)]
struct CmdInput {
    rows: Vec<RawRow>,
    #[serde(default)]
    config: Option<PlotConfig>,
}

fn parse_inline_rows(
    rows_json: &str,
    config_json: Option<&String>,
) -> Result<(RawTable, PlotConfig), AppError> {
    let rows: Vec<RawRow> =
        serde_json::from_str(rows_json).map_err(|source| AppError::ParseRowsJson { source })?;

    let config = match config_json {
        Some(s) => serde_json::from_str::<PlotConfig>(s)
            .map_err(|source| AppError::ParseConfigJson { source })?,
        None => PlotConfig::default(),
    };

    Ok((RawTable::new(rows), config))
}

fn parse_cmd_input_doc(doc: &str) -> Result<(RawTable, PlotConfig), AppError> {
    let parsed: CmdInput =
        serde_json::from_str(doc).map_err(|source| AppError::ParseCmdInputJson { source })?;
    Ok((RawTable::new(parsed.rows), parsed.config.unwrap_or_default()))
}

fn apply_overrides(mut config: PlotConfig, args: &Args) -> PlotConfig {
    if let Some(unit) = args.unit {
        config.unit = unit;
    }
    if let Some(ions) = args.ions {
        config.ion_set = ions;
    }
    if let Some(title) = &args.title {
        config.title = title.clone();
    }
    config.normalized()
}

pub fn parse_inputs(args: &Args) -> Result<(RawTable, PlotConfig), AppError> {
    let (table, config) = match (&args.rows_json, &args.input) {
        (Some(rows_json), _) => parse_inline_rows(rows_json, args.config_json.as_ref())?,
        (None, Some(path)) if path == "-" => {
            let mut s = String::new();
            io::stdin()
                .read_to_string(&mut s)
                .map_err(|source| AppError::ReadStdin { source })?;
            parse_cmd_input_doc(&s)?
        }
        (None, Some(path)) => {
            let s = fs::read_to_string(path).map_err(|source| AppError::ReadFile {
                path: path.clone(),
                source,
            })?;
            parse_cmd_input_doc(&s)?
        }
        (None, None) if args.demo => (RawTable::demo(), PlotConfig::default()),
        (None, None) => return Err(AppError::MissingInputData),
    };
    Ok((table, apply_overrides(config, args)))
}

pub fn print_output(out: &StiffReport, config: &PlotConfig, args: &Args) -> Result<(), AppError> {
    if args.json {
        let s = serde_json::to_string_pretty(&out)
            .map_err(|source| AppError::SerializeOutput { source })?;
        println!("{}", s);
    } else {
        println!("{}", config.title);
        println!(
            "{:<6} {:<8} {:>12} {:>12} {:>8} {:>5}",
            "Ion", "Group", "mg/L", "meq/L", "x", "y"
        );
        for r in &out.records {
            let point = out
                .scene
                .points
                .iter()
                .find(|p| p.ion == r.ion && p.side.group() == r.group);
            let (x, y) = match point {
                Some(p) => (format!("{:.3}", p.x), format!("{}", p.y)),
                None => ("-".to_string(), "-".to_string()),
            };
            println!(
                "{:<6} {:<8} {:>12.3} {:>12.4} {:>8} {:>5}",
                r.ion, r.group, r.mg_l, r.meq_l, x, y
            );
        }
        let ticks: Vec<&str> = out.scene.x_ticks.iter().map(|t| t.label.as_str()).collect();
        println!("Ticks (meq/L): {}", ticks.join(" | "));
        for w in &out.warnings {
            println!("Warning: {w}");
        }
    }

    if let Some(path) = &args.svg {
        let svg = crate::adapters::svg::render_svg(&out.scene, &config.title);
        fs::write(path, svg).map_err(|source| AppError::WriteFile {
            path: path.clone(),
            source,
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["stiff_rs"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn flags_override_config_document() {
        let a = args(&[
            "--rows-json",
            "[]",
            "--config-json",
            r#"{"unit":"mg/L","ion_set":"basic","title":"doc"}"#,
            "--unit",
            "meq/L",
            "--ions",
            "extended",
        ]);
        let (_, cfg) = parse_inputs(&a).unwrap();
        assert_eq!(cfg.unit, Unit::Equivalent);
        assert_eq!(cfg.ion_set, IonSet::Extended);
        assert_eq!(cfg.title, "doc");
    }

    #[test]
    fn demo_is_used_only_without_other_input() {
        let (table, _) = parse_inputs(&args(&["--demo"])).unwrap();
        assert_eq!(table, RawTable::demo());
        assert!(matches!(
            parse_inputs(&args(&[])),
            Err(AppError::MissingInputData)
        ));
    }
}
