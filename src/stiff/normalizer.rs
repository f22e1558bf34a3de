use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::chemistry::{IonSpec, Polarity, meq_l_to_mg_l, mg_l_to_meq_l};
use crate::error::AppError;
use crate::models::{CanonicalRecord, Cell, Group, IonSet, RawRow, RawTable, Unit, lookup};

pub const ION_COLUMN: &str = "Ion";
pub const GROUP_COLUMN: &str = "Group";
pub const CONC_COLUMN: &str = "Conc";
/// Accepted in place of `Conc` when the table is already in meq/L.
pub const MEQ_COLUMN: &str = "meqL";

/// Something the normalizer repaired or dropped. Rows are zero-based.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizeWarning {
    MissingIon { row: usize },
    UnsupportedIon { row: usize, ion: String },
    MissingConcentration { row: usize, ion: String },
    UnparseableConcentration { row: usize, ion: String, raw: String },
    NonFiniteConcentration { row: usize, ion: String },
    NegativeConcentration { row: usize, ion: String, value: f64 },
    UnknownGroup { row: usize, ion: String, group: String },
    GroupMismatch { row: usize, ion: String, group: String },
    DuplicateIon { row: usize, ion: String },
}

impl fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIon { row } => write!(f, "row {row}: no ion symbol, row dropped"),
            Self::UnsupportedIon { row, ion } => {
                write!(f, "row {row}: ion '{ion}' is not supported, row dropped")
            }
            Self::MissingConcentration { row, ion } => {
                write!(f, "row {row} ({ion}): concentration missing, using 0")
            }
            Self::UnparseableConcentration { row, ion, raw } => {
                write!(f, "row {row} ({ion}): concentration {raw} is not a number, using 0")
            }
            Self::NonFiniteConcentration { row, ion } => {
                write!(f, "row {row} ({ion}): concentration is not finite, using 0")
            }
            Self::NegativeConcentration { row, ion, value } => {
                write!(f, "row {row} ({ion}): negative concentration {value} clamped to 0")
            }
            Self::UnknownGroup { row, ion, group } => write!(
                f,
                "row {row} ({ion}): group '{group}' is neither cation nor anion, not plotted"
            ),
            Self::GroupMismatch { row, ion, group } => {
                write!(f, "row {row} ({ion}): listed as {group}, not plotted on that side")
            }
            Self::DuplicateIon { row, ion } => write!(f, "row {row}: '{ion}' appears more than once"),
        }
    }
}

/// Output of [`normalize`]: the canonical table plus everything that was repaired.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Normalized {
    pub records: Vec<CanonicalRecord>,
    pub warnings: Vec<NormalizeWarning>,
}

enum Coercion {
    Missing,
    Unparseable(String),
    NonFinite,
    Negative(f64),
}

/// Numeric coercion of one concentration cell. Bad input becomes `0`.
fn coerce(cell: Option<&Cell>) -> (f64, Option<Coercion>) {
    let parsed = match cell {
        None | Some(Cell::Null) => return (0.0, Some(Coercion::Missing)),
        Some(Cell::Number(v)) => *v,
        Some(Cell::Text(s)) if s.trim().is_empty() => return (0.0, Some(Coercion::Missing)),
        Some(Cell::Text(s)) => match s.trim().parse::<f64>() {
            Ok(v) => v,
            Err(_) => return (0.0, Some(Coercion::Unparseable(format!("{s:?}")))),
        },
        Some(other @ Cell::Bool(_)) => return (0.0, Some(Coercion::Unparseable(other.to_string()))),
    };
    if !parsed.is_finite() {
        (0.0, Some(Coercion::NonFinite))
    } else if parsed < 0.0 {
        (0.0, Some(Coercion::Negative(parsed)))
    } else {
        (parsed, None)
    }
}

fn concentration_column(table: &RawTable, unit: Unit) -> Result<&'static str, AppError> {
    if table.has_column(CONC_COLUMN) {
        Ok(CONC_COLUMN)
    } else if unit == Unit::Equivalent && table.has_column(MEQ_COLUMN) {
        Ok(MEQ_COLUMN)
    } else {
        Err(AppError::MissingColumn {
            column: CONC_COLUMN.to_string(),
        })
    }
}

/// Fail fast when a required column is absent from the whole table.
pub fn check_schema(table: &RawTable, unit: Unit) -> Result<&'static str, AppError> {
    for column in [ION_COLUMN, GROUP_COLUMN] {
        if !table.has_column(column) {
            return Err(AppError::MissingColumn {
                column: column.to_string(),
            });
        }
    }
    concentration_column(table, unit)
}

fn ion_symbol(row: &RawRow) -> Option<&str> {
    lookup(row, ION_COLUMN)
        .and_then(Cell::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn group_of(row: &RawRow) -> Group {
    lookup(row, GROUP_COLUMN)
        .and_then(Cell::as_text)
        .map(Group::parse)
        .unwrap_or_else(|| Group::Other(String::new()))
}

fn side_matches(group: &Group, spec: &IonSpec) -> bool {
    matches!(
        (group, spec.polarity),
        (Group::Cation, Polarity::Cation) | (Group::Anion, Polarity::Anion)
    )
}

/// Convert the raw table into canonical records in the selected `unit`.
///
/// One record is produced per row whose ion belongs to `ions`, in input
/// order. Bad concentration cells are replaced by `0` and reported; rows
/// with unknown ions are dropped and reported. The only error is a
/// missing column. An empty table yields an empty result.
pub fn normalize(table: &RawTable, unit: Unit, ions: IonSet) -> Result<Normalized, AppError> {
    let mut out = Normalized::default();
    if table.rows.is_empty() {
        debug!("normalize: empty table");
        return Ok(out);
    }
    let conc_column = check_schema(table, unit)?;

    let mut seen: HashSet<&'static str> = HashSet::new();
    for (row_idx, row) in table.rows.iter().enumerate() {
        let Some(raw_ion) = ion_symbol(row) else {
            out.warnings.push(NormalizeWarning::MissingIon { row: row_idx });
            continue;
        };
        let Some(spec) = ions.lookup(raw_ion) else {
            out.warnings.push(NormalizeWarning::UnsupportedIon {
                row: row_idx,
                ion: raw_ion.to_string(),
            });
            continue;
        };
        let ion = spec.symbol.to_string();

        if !seen.insert(spec.symbol) {
            out.warnings.push(NormalizeWarning::DuplicateIon {
                row: row_idx,
                ion: ion.clone(),
            });
        }

        let group = group_of(row);
        match &group {
            Group::Other(g) => out.warnings.push(NormalizeWarning::UnknownGroup {
                row: row_idx,
                ion: ion.clone(),
                group: g.clone(),
            }),
            g if !side_matches(g, spec) => out.warnings.push(NormalizeWarning::GroupMismatch {
                row: row_idx,
                ion: ion.clone(),
                group: g.to_string(),
            }),
            _ => {}
        }

        let (value, issue) = coerce(lookup(row, conc_column));
        if let Some(issue) = issue {
            let ion = ion.clone();
            out.warnings.push(match issue {
                Coercion::Missing => NormalizeWarning::MissingConcentration { row: row_idx, ion },
                Coercion::Unparseable(raw) => NormalizeWarning::UnparseableConcentration {
                    row: row_idx,
                    ion,
                    raw,
                },
                Coercion::NonFinite => NormalizeWarning::NonFiniteConcentration { row: row_idx, ion },
                Coercion::Negative(value) => NormalizeWarning::NegativeConcentration {
                    row: row_idx,
                    ion,
                    value,
                },
            });
        }

        let (mut mg_l, mut meq_l) = match unit {
            Unit::Mass => (value, mg_l_to_meq_l(value, spec)),
            Unit::Equivalent => (meq_l_to_mg_l(value, spec), value),
        };
        // A finite input can still overflow through the equivalent weight.
        if !(mg_l.is_finite() && meq_l.is_finite()) {
            out.warnings.push(NormalizeWarning::NonFiniteConcentration {
                row: row_idx,
                ion: ion.clone(),
            });
            (mg_l, meq_l) = (0.0, 0.0);
        }
        out.records.push(CanonicalRecord {
            ion,
            group,
            mg_l,
            meq_l,
        });
    }

    for w in &out.warnings {
        warn!("{w}");
    }
    debug!(
        rows = table.rows.len(),
        records = out.records.len(),
        warnings = out.warnings.len(),
        %unit,
        "normalized input table"
    );
    Ok(out)
}
