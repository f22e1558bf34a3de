use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{CanonicalRecord, Group, IonSet};
use crate::stiff::scale;

/// Which wing of the diagram a point belongs to. Cations are drawn left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn group(self) -> Group {
        match self {
            Side::Left => Group::Cation,
            Side::Right => Group::Anion,
        }
    }

    fn sign(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("cation"),
            Side::Right => f.write_str("anion"),
        }
    }
}

/// Inconsistent rank orders. Raised once when the layout is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("the {side} order is empty")]
    EmptyOrder { side: Side },
    #[error("'{ion}' is listed more than once in the {side} order")]
    DuplicateIon { ion: String, side: Side },
    #[error("'{ion}' is listed in both the cation and the anion order")]
    IonOnBothSides { ion: String },
}

/// A plotted ion. `y` is its fixed rank, `x` the signed log-distance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlotPoint {
    pub ion: String,
    pub side: Side,
    pub y: f64,
    pub x: f64,
    pub meq_l: f64,
    pub mg_l: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Hover {
    pub ion: String,
    pub meq_l: f64,
    pub mg_l: f64,
}

/// Polyline vertex; the synthetic center vertex has no hover entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub hover: Option<Hover>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordRef {
    /// 0..1 across the plot area.
    Paper,
    Data,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextAnnotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub x_ref: CoordRef,
    pub y_ref: CoordRef,
    pub anchor: Anchor,
    pub emphasis: bool,
    pub font_size: u32,
}

/// Renderer-agnostic description of one Stiff diagram.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scene {
    pub points: Vec<PlotPoint>,
    pub polyline: Vec<Vertex>,
    pub x_ticks: Vec<Tick>,
    /// Cation labels at their ranks (the left margin).
    pub y_ticks: Vec<Tick>,
    pub x_range: [f64; 2],
    pub x_axis_title: String,
    pub center_line_x: f64,
    pub annotations: Vec<TextAnnotation>,
}

pub const X_AXIS_TITLE: &str = "Concentration (meq/L), decades from center = |log10(meq) + 1|";
const RIGHT_MARGIN_X: f64 = 0.985;
const LEFT_TITLE_X: f64 = 0.02;
const LABEL_FONT_SIZE: u32 = 12;
const TITLE_FONT_SIZE: u32 = 14;

/// Validated rank orders for both wings.
#[derive(Clone, Debug, PartialEq)]
pub struct StiffLayout {
    cations: Vec<String>,
    anions: Vec<String>,
}

fn validate(order: &[String], side: Side) -> Result<(), LayoutError> {
    if order.is_empty() {
        return Err(LayoutError::EmptyOrder { side });
    }
    for (i, ion) in order.iter().enumerate() {
        if order[..i].iter().any(|o| o.eq_ignore_ascii_case(ion)) {
            return Err(LayoutError::DuplicateIon {
                ion: ion.clone(),
                side,
            });
        }
    }
    Ok(())
}

impl StiffLayout {
    /// Build a layout from top-to-bottom rank orders.
    pub fn new<S: AsRef<str>>(cat_order: &[S], ani_order: &[S]) -> Result<Self, LayoutError> {
        let cations: Vec<String> = cat_order.iter().map(|s| s.as_ref().trim().to_string()).collect();
        let anions: Vec<String> = ani_order.iter().map(|s| s.as_ref().trim().to_string()).collect();
        validate(&cations, Side::Left)?;
        validate(&anions, Side::Right)?;
        if let Some(ion) = cations
            .iter()
            .find(|c| anions.iter().any(|a| a.eq_ignore_ascii_case(c)))
        {
            return Err(LayoutError::IonOnBothSides { ion: ion.clone() });
        }
        Ok(Self { cations, anions })
    }

    pub fn for_ion_set(set: IonSet) -> Result<Self, LayoutError> {
        Self::new(set.cation_order(), set.anion_order())
    }

    fn order(&self, side: Side) -> &[String] {
        match side {
            Side::Left => &self.cations,
            Side::Right => &self.anions,
        }
    }

    /// y of the topmost rank; shared by both sides so rows line up.
    pub fn top(&self) -> f64 {
        self.cations.len().max(self.anions.len()) as f64
    }

    fn y_at(&self, rank: usize) -> f64 {
        self.top() - rank as f64
    }

    pub fn rank(&self, side: Side, ion: &str) -> Option<usize> {
        self.order(side)
            .iter()
            .position(|o| o.eq_ignore_ascii_case(ion))
    }

    /// Fixed y of `ion` on `side`, if it is part of that order.
    pub fn rank_y(&self, side: Side, ion: &str) -> Option<f64> {
        self.rank(side, ion).map(|r| self.y_at(r))
    }

    fn side_points(&self, records: &[CanonicalRecord], side: Side) -> Vec<PlotPoint> {
        let group = side.group();
        let mut ranked: Vec<(usize, &CanonicalRecord)> = records
            .iter()
            .filter(|r| r.group == group)
            .filter_map(|r| self.rank(side, &r.ion).map(|rank| (rank, r)))
            .collect();
        ranked.sort_by_key(|(rank, _)| *rank);
        ranked
            .into_iter()
            .map(|(rank, r)| PlotPoint {
                ion: self.order(side)[rank].clone(),
                side,
                y: self.y_at(rank),
                x: side.sign() * scale::distance(r.meq_l),
                meq_l: r.meq_l,
                mg_l: r.mg_l,
            })
            .collect()
    }

    fn center_y(&self, cations: &[PlotPoint], anions: &[PlotPoint]) -> f64 {
        let inner_cation = cations
            .last()
            .map(|p| p.y)
            .unwrap_or_else(|| self.y_at(self.cations.len() - 1));
        let inner_anion = anions.first().map(|p| p.y).unwrap_or_else(|| self.y_at(0));
        (inner_cation + inner_anion) / 2.0
    }

    fn side_span(&self, side: Side) -> (f64, f64) {
        let n = self.order(side).len();
        (self.y_at(0), self.y_at(n - 1))
    }

    fn annotations(&self) -> Vec<TextAnnotation> {
        let mut out: Vec<TextAnnotation> = self
            .anions
            .iter()
            .enumerate()
            .map(|(rank, ion)| TextAnnotation {
                text: ion.clone(),
                x: RIGHT_MARGIN_X,
                y: self.y_at(rank),
                x_ref: CoordRef::Paper,
                y_ref: CoordRef::Data,
                anchor: Anchor::Right,
                emphasis: false,
                font_size: LABEL_FONT_SIZE,
            })
            .collect();

        for (side, text, x, anchor) in [
            (Side::Left, "Cations", LEFT_TITLE_X, Anchor::Left),
            (Side::Right, "Anions", RIGHT_MARGIN_X, Anchor::Right),
        ] {
            let (hi, lo) = self.side_span(side);
            out.push(TextAnnotation {
                text: text.to_string(),
                x,
                y: (hi + lo) / 2.0,
                x_ref: CoordRef::Paper,
                y_ref: CoordRef::Data,
                anchor,
                emphasis: true,
                font_size: TITLE_FONT_SIZE,
            });
        }
        out
    }

    /// Map canonical records to a scene.
    ///
    /// Records whose group does not match a side, or whose ion is not in
    /// that side's order, are skipped. Missing ions leave a gap; they do not
    /// shift the ranks of the others. Never fails.
    pub fn layout(&self, records: &[CanonicalRecord]) -> Scene {
        let cations = self.side_points(records, Side::Left);
        let anions = self.side_points(records, Side::Right);

        let hover_vertex = |p: &PlotPoint| Vertex {
            x: p.x,
            y: p.y,
            hover: Some(Hover {
                ion: p.ion.clone(),
                meq_l: p.meq_l,
                mg_l: p.mg_l,
            }),
        };
        let mut polyline: Vec<Vertex> = cations.iter().map(hover_vertex).collect();
        polyline.push(Vertex {
            x: 0.0,
            y: self.center_y(&cations, &anions),
            hover: None,
        });
        polyline.extend(anions.iter().map(hover_vertex));

        let span = scale::decade_span(cations.iter().chain(&anions).map(|p| p.meq_l));
        let x_ticks = (-span..=span)
            .map(|k| Tick {
                value: f64::from(k),
                label: scale::format_label(scale::concentration_at(k)),
            })
            .collect();
        let y_ticks = self
            .cations
            .iter()
            .enumerate()
            .map(|(rank, ion)| Tick {
                value: self.y_at(rank),
                label: ion.clone(),
            })
            .collect();

        debug!(
            cations = cations.len(),
            anions = anions.len(),
            decades = span,
            "laid out stiff diagram"
        );

        let mut points = cations;
        points.extend(anions);
        Scene {
            points,
            polyline,
            x_ticks,
            y_ticks,
            x_range: [-f64::from(span), f64::from(span)],
            x_axis_title: X_AXIS_TITLE.to_string(),
            center_line_x: 0.0,
            annotations: self.annotations(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(ion: &str, group: Group, meq_l: f64) -> CanonicalRecord {
        CanonicalRecord {
            ion: ion.to_string(),
            group,
            mg_l: meq_l,
            meq_l,
        }
    }

    fn basic() -> StiffLayout {
        StiffLayout::for_ion_set(IonSet::Basic).unwrap()
    }

    #[test]
    fn rejects_inconsistent_orders() {
        assert_eq!(
            StiffLayout::new(&["Na", "Ca", "na"], &["Cl"]),
            Err(LayoutError::DuplicateIon {
                ion: "na".into(),
                side: Side::Left
            })
        );
        assert_eq!(
            StiffLayout::new(&["Na"], &["Cl", "Na"]),
            Err(LayoutError::IonOnBothSides { ion: "Na".into() })
        );
        let empty: [&str; 0] = [];
        assert_eq!(
            StiffLayout::new(&empty, &["Cl"]),
            Err(LayoutError::EmptyOrder { side: Side::Left })
        );
    }

    #[test]
    fn ranks_are_fixed_and_shared_across_sides() {
        let layout = basic();
        assert_eq!(layout.rank_y(Side::Left, "Na"), Some(4.0));
        assert_eq!(layout.rank_y(Side::Left, "Fe"), Some(1.0));
        assert_eq!(layout.rank_y(Side::Right, "Cl"), Some(4.0));
        assert_eq!(layout.rank_y(Side::Right, "CO3"), Some(1.0));
        assert_eq!(layout.rank_y(Side::Left, "Cl"), None);
    }

    #[test]
    fn points_follow_rank_not_input_order() {
        let records = vec![
            rec("Mg", Group::Cation, 10.0),
            rec("Na", Group::Cation, 1.0),
            rec("SO4", Group::Anion, 10.0),
            rec("Cl", Group::Anion, 1.0),
        ];
        let scene = basic().layout(&records);
        let ions: Vec<&str> = scene.points.iter().map(|p| p.ion.as_str()).collect();
        assert_eq!(ions, ["Na", "Mg", "Cl", "SO4"]);
        assert_eq!(scene.points[1].y, 2.0);
        assert!((scene.points[1].x + 2.0).abs() < 1e-12);
        assert!((scene.points[3].x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn wrong_group_and_foreign_ions_are_skipped() {
        let records = vec![
            rec("Na", Group::Anion, 5.0),
            rec("Cl", Group::Other("salt".into()), 5.0),
            rec("K", Group::Cation, 5.0),
            rec("Ca", Group::Cation, 5.0),
        ];
        let scene = basic().layout(&records);
        assert_eq!(scene.points.len(), 1);
        assert_eq!(scene.points[0].ion, "Ca");
        assert_eq!(scene.points[0].y, 3.0);
    }

    #[test]
    fn polyline_has_center_vertex_between_wings() {
        let records = vec![
            rec("Na", Group::Cation, 10.0),
            rec("Fe", Group::Cation, 1.0),
            rec("Cl", Group::Anion, 10.0),
            rec("CO3", Group::Anion, 1.0),
        ];
        let scene = basic().layout(&records);
        assert_eq!(scene.polyline.len(), 5);
        let center = &scene.polyline[2];
        assert_eq!(center.x, 0.0);
        assert!(center.hover.is_none());
        // between Fe (y = 1) and Cl (y = 4)
        assert_eq!(center.y, 2.5);
        assert!(scene.polyline.iter().filter(|v| v.hover.is_some()).count() == 4);
    }

    #[test]
    fn center_falls_back_to_configured_ranks() {
        let scene = basic().layout(&[]);
        assert!(scene.points.is_empty());
        assert_eq!(scene.polyline.len(), 1);
        assert_eq!(scene.polyline[0].y, 2.5);
        assert_eq!(scene.x_range, [-1.0, 1.0]);
    }

    #[test]
    fn ticks_are_symmetric_with_reference_at_center() {
        let scene = basic().layout(&[rec("Na", Group::Cation, 150.0)]);
        let values: Vec<f64> = scene.x_ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, [-4.0, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
        let labels: Vec<&str> = scene.x_ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["1000", "100", "10", "1", "0.1", "1", "10", "100", "1000"]);
    }

    #[test]
    fn annotations_label_anions_and_sides() {
        let scene = basic().layout(&[]);
        assert_eq!(scene.annotations.len(), 6);
        let hco3 = scene.annotations.iter().find(|a| a.text == "HCO3").unwrap();
        assert_eq!(hco3.y, 3.0);
        assert_eq!(hco3.anchor, Anchor::Right);
        let title = scene.annotations.iter().find(|a| a.text == "Cations").unwrap();
        assert!(title.emphasis);
        assert_eq!(title.y, 2.5);
        let y_labels: Vec<&str> = scene.y_ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(y_labels, ["Na", "Ca", "Mg", "Fe"]);
    }

    #[test]
    fn uneven_orders_share_the_same_top() {
        let layout = StiffLayout::for_ion_set(IonSet::Extended).unwrap();
        assert_eq!(layout.top(), 7.0);
        assert_eq!(layout.rank_y(Side::Right, "Cl"), Some(7.0));
        assert_eq!(layout.rank_y(Side::Right, "F"), Some(2.0));
        assert_eq!(layout.rank_y(Side::Left, "Fe"), Some(1.0));
    }
}
