//! Plotters-powered chart widgets for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! All values come precomputed from `crate::charts`; `render()` only draws.
//!
//! Categorical axes (states, periods, groups) are drawn on an `f64` axis where
//! category `i` is centred on `x = i`.

use plotters::prelude::*;
// ratatui's `Color` below shadows the prelude's trait of the same name.
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::aggregate::PeriodTable;
use crate::charts::{headroom, BoxStats};

/// Series colours, shared with the legend drawn by the TUI.
pub const PALETTE: [(u8, u8, u8); 6] = [
    (0, 255, 255),
    (255, 200, 0),
    (0, 255, 0),
    (255, 80, 80),
    (200, 120, 255),
    (255, 255, 255),
];

pub fn series_color(i: usize) -> RGBColor {
    let (r, g, b) = PALETTE[i % PALETTE.len()];
    RGBColor(r, g, b)
}

pub fn legend_color(i: usize) -> Color {
    let (r, g, b) = PALETTE[i % PALETTE.len()];
    Color::Rgb(r, g, b)
}

/// Grouped vertical bars: one slot per label, one bar per series.
pub struct GroupedBars<'a> {
    pub table: &'a PeriodTable,
    pub y_label: &'a str,
}

/// One line per series over shared categorical x labels.
pub struct CategoryLines<'a> {
    pub labels: &'a [String],
    pub series: Vec<&'a [f64]>,
    pub y_label: &'a str,
}

/// Vertical box plots, one per group.
pub struct BoxPlot<'a> {
    pub boxes: &'a [BoxStats],
    pub y_label: &'a str,
}

impl<'a> Widget for GroupedBars<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if too_small(area, buf) {
            return;
        }
        let n = self.table.labels.len();
        let k = self.table.series.len();
        if n == 0 || k == 0 {
            return;
        }
        let y1 = headroom(self.table.max_value());
        let labels = self.table.labels.clone();

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(n)
                .y_labels(5)
                .x_label_formatter(&|v| category_label(&labels, *v))
                .y_label_formatter(&|v| fmt_compact(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            // Each slot is 0.8 wide, split evenly between series.
            let bar_w = 0.8 / k as f64;
            for (j, s) in self.table.series.iter().enumerate() {
                let color = series_color(j);
                chart.draw_series(s.values.iter().enumerate().map(|(i, &v)| {
                    let x0 = i as f64 - 0.4 + j as f64 * bar_w;
                    Rectangle::new([(x0, 0.0), (x0 + bar_w, v)], color.filled())
                }))?;
            }
            Ok(())
        });

        widget.render(area, buf);
    }
}

impl<'a> Widget for CategoryLines<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if too_small(area, buf) {
            return;
        }
        let n = self.labels.len();
        if n == 0 || self.series.is_empty() {
            return;
        }

        let (mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY);
        for v in self.series.iter().flat_map(|s| s.iter()) {
            y0 = y0.min(*v);
            y1 = y1.max(*v);
        }
        if !(y0.is_finite() && y1.is_finite()) {
            return;
        }
        if y1 <= y0 {
            y0 -= 1.0;
            y1 += 1.0;
        }
        let pad = (y1 - y0) * 0.05;
        let (y0, y1) = (y0 - pad, y1 + pad);
        let x1 = (n as f64 - 1.0).max(1.0);
        let labels = self.labels;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(0.0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(n.min(6))
                .y_labels(5)
                .x_label_formatter(&|v| category_label(labels, *v))
                .y_label_formatter(&|v| fmt_compact(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            for (j, values) in self.series.iter().enumerate() {
                let color = series_color(j);
                chart.draw_series(LineSeries::new(
                    values.iter().enumerate().map(|(i, &v)| (i as f64, v)),
                    &color,
                ))?;
            }
            Ok(())
        });

        widget.render(area, buf);
    }
}

impl<'a> Widget for BoxPlot<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if too_small(area, buf) {
            return;
        }
        let n = self.boxes.len();
        if n == 0 {
            return;
        }

        let mut y0 = f64::INFINITY;
        let mut y1 = f64::NEG_INFINITY;
        for b in self.boxes {
            y0 = b.outliers.iter().copied().fold(y0.min(b.lower_whisker), f64::min);
            y1 = b.outliers.iter().copied().fold(y1.max(b.upper_whisker), f64::max);
        }
        if !(y0.is_finite() && y1.is_finite()) {
            return;
        }
        if y1 <= y0 {
            y0 -= 1.0;
            y1 += 1.0;
        }
        let pad = (y1 - y0) * 0.05;
        let (y0, y1) = (y0 - pad, y1 + pad);
        let labels: Vec<String> = self.boxes.iter().map(|b| b.group.clone()).collect();

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(-0.5..(n as f64 - 0.5), y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(n)
                .y_labels(5)
                .x_label_formatter(&|v| category_label(&labels, *v))
                .y_label_formatter(&|v| fmt_compact(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            for (i, b) in self.boxes.iter().enumerate() {
                let x = i as f64;
                let color = series_color(i);
                chart.draw_series(std::iter::once(Rectangle::new(
                    [(x - 0.3, b.q1), (x + 0.3, b.q3)],
                    color.stroke_width(1),
                )))?;
                chart.draw_series([
                    PathElement::new(vec![(x - 0.3, b.median), (x + 0.3, b.median)], WHITE),
                    PathElement::new(vec![(x, b.q3), (x, b.upper_whisker)], color),
                    PathElement::new(vec![(x, b.q1), (x, b.lower_whisker)], color),
                    PathElement::new(vec![(x - 0.15, b.upper_whisker), (x + 0.15, b.upper_whisker)], color),
                    PathElement::new(vec![(x - 0.15, b.lower_whisker), (x + 0.15, b.lower_whisker)], color),
                ])?;
                // `Circle` radii are mis-scaled by the ratatui backend; a pixel reads fine.
                chart.draw_series(b.outliers.iter().map(|&o| Pixel::new((x, o), color)))?;
            }
            Ok(())
        });

        widget.render(area, buf);
    }
}

fn too_small(area: Rect, buf: &mut Buffer) -> bool {
    // When the available area is too small, Plotters may fail to build a chart.
    if area.width < 20 || area.height < 8 {
        buf.set_string(
            area.x,
            area.y,
            "Chart area too small (resize terminal).",
            Style::default().fg(Color::Yellow),
        );
        return true;
    }
    false
}

/// Label for a categorical tick; blank between categories.
fn category_label(labels: &[String], v: f64) -> String {
    let idx = v.round();
    if (v - idx).abs() > 0.05 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Short tick labels for large sales figures (e.g. `1.2M`, `350k`).
fn fmt_compact(v: f64) -> String {
    let a = v.abs();
    if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.0}k", v / 1e3)
    } else {
        format!("{v:.2}")
    }
}
