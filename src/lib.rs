pub mod adapters;
pub mod chemistry;
pub mod error;
pub mod models;
pub mod stiff;

pub use crate::error::AppError;
pub use crate::models::{CanonicalRecord, Cell, Group, IonSet, PlotConfig, RawRow, RawTable, Unit};
pub use crate::stiff::geometry::{
    LayoutError, PlotPoint, Scene, Side, StiffLayout, TextAnnotation, Tick, Vertex,
};
pub use crate::stiff::normalizer::{NormalizeWarning, Normalized, normalize};
pub use crate::stiff::{StiffReport, render};
