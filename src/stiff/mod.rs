pub mod geometry;
pub mod normalizer;
pub mod scale;

use serde::Serialize;

use crate::error::AppError;
use crate::models::{CanonicalRecord, PlotConfig, RawTable};
use geometry::{Scene, StiffLayout};
use normalizer::{NormalizeWarning, normalize};

/// Everything one render action produces.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StiffReport {
    pub records: Vec<CanonicalRecord>,
    pub warnings: Vec<NormalizeWarning>,
    pub scene: Scene,
}

/// Normalize `table` under `config` and lay it out.
///
/// The layout is validated before any row is touched, so a bad ion order
/// is reported even for an empty table. A missing column stops the
/// pipeline before the mapper runs.
pub fn render(table: &RawTable, config: &PlotConfig) -> Result<StiffReport, AppError> {
    let layout = StiffLayout::for_ion_set(config.ion_set)?;
    let normalized = normalize(table, config.unit, config.ion_set)?;
    let scene = layout.layout(&normalized.records);
    Ok(StiffReport {
        records: normalized.records,
        warnings: normalized.warnings,
        scene,
    })
}
