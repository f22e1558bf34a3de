use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell of the editable input table, as it arrives from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s:?}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Null => f.write_str("null"),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// One row of the input table; column names are matched case-insensitively.
pub type RawRow = BTreeMap<String, Cell>;

/// The raw, user-edited table. Rows are kept in the order they were entered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTable {
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    /// Convenience constructor for the common `Ion` / `Group` / `Conc` layout.
    pub fn from_triples<'a, I>(triples: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, f64)>,
    {
        let rows = triples
            .into_iter()
            .map(|(ion, group, conc)| {
                let mut row = RawRow::new();
                row.insert("Ion".to_string(), Cell::from(ion));
                row.insert("Group".to_string(), Cell::from(group));
                row.insert("Conc".to_string(), Cell::from(conc));
                row
            })
            .collect();
        Self { rows }
    }

    /// Sample brine used by `--demo`, in mg/L.
    pub fn demo() -> Self {
        Self::from_triples([
            ("Na", "cation", 27713.0),
            ("Ca", "cation", 2600.0),
            ("Mg", "cation", 510.0),
            ("Fe", "cation", 2.0),
            ("Cl", "anion", 48521.0),
            ("HCO3", "anion", 854.0),
            ("SO4", "anion", 60.0),
            ("CO3", "anion", 0.0),
        ])
    }

    /// True when at least one row carries `column` (case-insensitive, trimmed).
    pub fn has_column(&self, column: &str) -> bool {
        self.rows.iter().any(|row| lookup(row, column).is_some())
    }
}

/// Case-insensitive column lookup within a row.
pub fn lookup<'a>(row: &'a RawRow, column: &str) -> Option<&'a Cell> {
    row.iter()
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(column.trim()))
        .map(|(_, v)| v)
}

/// Side of the diagram an ion is drawn on.
///
/// Anything other than `cation`/`anion` is preserved verbatim (after
/// trimming and lowercasing) so it can be reported, but it never matches
/// a plotting side.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Group {
    Cation,
    Anion,
    Other(String),
}

impl Group {
    pub fn parse(raw: &str) -> Self {
        let norm = raw.trim().to_lowercase();
        match norm.as_str() {
            "cation" => Group::Cation,
            "anion" => Group::Anion,
            _ => Group::Other(norm),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Group::Cation => "cation",
            Group::Anion => "anion",
            Group::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for Group {
    fn from(s: String) -> Self {
        Group::parse(&s)
    }
}

impl From<Group> for String {
    fn from(g: Group) -> Self {
        g.as_str().to_string()
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Unit of the user-supplied concentration column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Unit {
    /// mg/L
    #[default]
    #[serde(rename = "mg/L", alias = "mass")]
    #[cfg_attr(feature = "cli", value(name = "mg/L", alias = "mass"))]
    Mass,
    /// meq/L
    #[serde(rename = "meq/L", alias = "equivalent")]
    #[cfg_attr(feature = "cli", value(name = "meq/L", alias = "equivalent"))]
    Equivalent,
}

impl Unit {
    pub fn label(self) -> &'static str {
        match self {
            Unit::Mass => "mg/L",
            Unit::Equivalent => "meq/L",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Which reference ion set is supported and plotted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum IonSet {
    /// Na, Ca, Mg, Fe | Cl, HCO3, SO4, CO3
    #[default]
    Basic,
    /// Basic plus K, Sr, Ba | NO3, F
    Extended,
}

/// Per-render configuration: which unit the table is in, which ions are
/// supported, and the diagram title.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub unit: Unit,
    pub ion_set: IonSet,
    pub title: String,
}

pub const DEFAULT_TITLE: &str = "Stiff diagram";

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            unit: Unit::Mass,
            ion_set: IonSet::Basic,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl PlotConfig {
    pub fn normalized(mut self) -> Self {
        let trimmed = self.title.trim();
        if trimmed.is_empty() {
            self.title = DEFAULT_TITLE.to_string();
        } else if trimmed.len() != self.title.len() {
            self.title = trimmed.to_string();
        }
        self
    }
}

/// A sanitized row: one of `mg_l`/`meq_l` is the user's input, the other is
/// derived through the ion's equivalent weight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub ion: String,
    pub group: Group,
    pub mg_l: f64,
    pub meq_l: f64,
}
