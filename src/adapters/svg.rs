//! Standalone SVG rendering of a [`Scene`].

use crate::stiff::geometry::{Anchor, CoordRef, Scene, TextAnnotation};

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 520.0;
const MARGIN_L: f64 = 90.0;
const MARGIN_R: f64 = 120.0;
const MARGIN_T: f64 = 60.0;
const MARGIN_B: f64 = 50.0;
const LINE_COLOR: &str = "#1f77b4";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Data -> pixel mapping for the plot area.
struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    fn from_scene(scene: &Scene) -> Self {
        let ys = scene
            .y_ticks
            .iter()
            .map(|t| t.value)
            .chain(scene.annotations.iter().filter(|a| a.y_ref == CoordRef::Data).map(|a| a.y))
            .chain(scene.polyline.iter().map(|v| v.y));
        let (lo, hi) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
        let (lo, hi) = if lo.is_finite() { (lo, hi) } else { (0.0, 1.0) };
        let [x_min, x_max] = scene.x_range;
        Self {
            x_min,
            x_max,
            y_min: lo - 0.5,
            y_max: hi + 0.5,
        }
    }

    fn plot_w(&self) -> f64 {
        WIDTH - MARGIN_L - MARGIN_R
    }

    fn plot_h(&self) -> f64 {
        HEIGHT - MARGIN_T - MARGIN_B
    }

    fn px(&self, x: f64) -> f64 {
        MARGIN_L + (x - self.x_min) / (self.x_max - self.x_min) * self.plot_w()
    }

    fn py(&self, y: f64) -> f64 {
        MARGIN_T + (self.y_max - y) / (self.y_max - self.y_min) * self.plot_h()
    }

    fn ax(&self, a: &TextAnnotation) -> f64 {
        match a.x_ref {
            CoordRef::Paper => MARGIN_L + a.x * self.plot_w(),
            CoordRef::Data => self.px(a.x),
        }
    }

    fn ay(&self, a: &TextAnnotation) -> f64 {
        match a.y_ref {
            CoordRef::Paper => MARGIN_T + (1.0 - a.y) * self.plot_h(),
            CoordRef::Data => self.py(a.y),
        }
    }
}

/// Render `scene` as an SVG document with `title` on top.
pub fn render_svg(scene: &Scene, title: &str) -> String {
    let frame = Frame::from_scene(scene);
    let bottom = HEIGHT - MARGIN_B;

    let mut grid = String::new();
    for tick in &scene.x_ticks {
        let x = frame.px(tick.value);
        grid.push_str(&format!(
            r##"  <line x1="{x:.1}" y1="{MARGIN_T:.1}" x2="{x:.1}" y2="{bottom:.1}" stroke="#eee" stroke-width="1"/>
  <text x="{x:.1}" y="{:.1}" text-anchor="middle" font-size="11" fill="#444">{}</text>
"##,
            bottom + 16.0,
            escape(&tick.label)
        ));
    }
    for tick in &scene.y_ticks {
        let y = frame.py(tick.value);
        grid.push_str(&format!(
            r##"  <line x1="{MARGIN_L:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#eee" stroke-width="1"/>
  <text x="{:.1}" y="{:.1}" text-anchor="end" font-size="12" fill="#444">{}</text>
"##,
            WIDTH - MARGIN_R,
            MARGIN_L - 8.0,
            y + 4.0,
            escape(&tick.label)
        ));
    }

    let center_x = frame.px(scene.center_line_x);
    let center_line = format!(
        r##"  <line x1="{center_x:.1}" y1="{MARGIN_T:.1}" x2="{center_x:.1}" y2="{bottom:.1}" stroke="#222" stroke-width="2"/>
"##
    );

    let mut path = String::new();
    let mut markers = String::new();
    for (i, v) in scene.polyline.iter().enumerate() {
        let (x, y) = (frame.px(v.x), frame.py(v.y));
        let cmd = if i == 0 {
            format!("M{x:.1},{y:.1}")
        } else {
            format!(" L{x:.1},{y:.1}")
        };
        path.push_str(&cmd);
        if let Some(h) = &v.hover {
            markers.push_str(&format!(
                r##"  <circle cx="{x:.1}" cy="{y:.1}" r="4.5" fill="{LINE_COLOR}"><title>{}: {:.4} meq/L</title></circle>
"##,
                escape(&h.ion),
                h.meq_l
            ));
        }
    }

    let mut annotations = String::new();
    for a in &scene.annotations {
        let anchor = match a.anchor {
            Anchor::Left => "start",
            Anchor::Right => "end",
        };
        let weight = if a.emphasis { "bold" } else { "normal" };
        annotations.push_str(&format!(
            r##"  <text x="{:.1}" y="{:.1}" text-anchor="{anchor}" font-size="{}" font-weight="{weight}" fill="#222">{}</text>
"##,
            frame.ax(a),
            frame.ay(a) + 4.0,
            a.font_size,
            escape(&a.text)
        ));
    }

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" style="background:white">
  <text x="{:.1}" y="30" text-anchor="middle" font-size="16" font-weight="600" fill="#222">{}</text>
{grid}{center_line}  <path d="{path}" fill="none" stroke="{LINE_COLOR}" stroke-width="3"/>
{markers}{annotations}  <text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="12" fill="#555">{}</text>
</svg>
"##,
        WIDTH / 2.0,
        escape(title),
        MARGIN_L + frame.plot_w() / 2.0,
        HEIGHT - 8.0,
        escape(&scene.x_axis_title)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IonSet;
    use crate::stiff::geometry::StiffLayout;

    #[test]
    fn svg_contains_every_label_and_one_path() {
        let scene = StiffLayout::for_ion_set(IonSet::Basic).unwrap().layout(&[]);
        let svg = render_svg(&scene, "A & B");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("A &amp; B"));
        for label in ["Na", "Fe", "HCO3", "CO3", "Cations", "Anions"] {
            assert!(svg.contains(&format!(">{label}</text>")), "missing {label}");
        }
        assert_eq!(svg.matches("<path").count(), 1);
    }
}
