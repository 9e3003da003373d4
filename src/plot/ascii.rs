//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - line charts: series markers (`*`, `o`, `+`, ...) joined by `.`
//! - bar charts: horizontal `#` bars, one row per (category, group)
//! - box plots: `|---[==#==]---|` with outliers as `o`

use crate::aggregate::PeriodTable;
use crate::charts::{BoxStats, ChartSet, Dashboard, LineChart};

/// Markers assigned to series in order.
const MARKERS: [char; 6] = ['*', 'o', '+', 'x', '@', '%'];

/// Render every chart of a run, separated by blank lines.
pub fn render_all(charts: &ChartSet, width: usize, height: usize) -> String {
    let mut out = String::new();
    out.push_str(&render_grouped_bars("State-wise Sales by Group", &charts.state_group, width));
    out.push('\n');
    out.push_str(&render_line_chart("Peak Sales Hours", &charts.time_line, width, height));
    out.push('\n');
    out.push_str(&render_box_plot("Sales Distribution by Group", &charts.boxes, width));
    out.push('\n');
    out.push_str(&render_dashboard(&charts.dashboard, width, height));
    out
}

/// The 2×2 panel, stacked top-to-bottom for a plain terminal.
pub fn render_dashboard(d: &Dashboard, width: usize, height: usize) -> String {
    let mut out = String::new();
    out.push_str(&render_multi_line("[1/4] Weekly Sales Trend by Group", &d.weekly, width, height));
    out.push('\n');
    out.push_str(&render_grouped_bars("[2/4] Monthly Sales by Group", &d.monthly, width));
    out.push('\n');
    out.push_str(&render_grouped_bars("[3/4] Quarterly Sales by Group", &d.quarterly, width));
    out.push('\n');
    out.push_str(&render_box_plot("[4/4] Sales Distribution by Group", &d.boxes, width));
    out
}

/// Single-series line chart over categorical x labels.
pub fn render_line_chart(title: &str, chart: &LineChart, width: usize, height: usize) -> String {
    let mut out = render_series(title, &[(&chart.values, MARKERS[0])], width, height);
    out.push_str(&format!("x: {}\n", chart.labels.join(" | ")));
    out
}

/// One line per `Group` over shared period labels, with a legend.
pub fn render_multi_line(title: &str, table: &PeriodTable, width: usize, height: usize) -> String {
    let series: Vec<(&[f64], char)> = table
        .series
        .iter()
        .zip(MARKERS.iter().cycle())
        .map(|(s, &m)| (s.values.as_slice(), m))
        .collect();

    let mut out = render_series(title, &series, width, height);
    if let (Some(first), Some(last)) = (table.labels.first(), table.labels.last()) {
        out.push_str(&format!("x: {first} .. {last} ({} periods)\n", table.labels.len()));
    }
    let legend: Vec<String> = table
        .series
        .iter()
        .zip(MARKERS.iter().cycle())
        .map(|(s, m)| format!("{m} {}", s.group))
        .collect();
    out.push_str(&format!("legend: {}\n", legend.join("  ")));
    out
}

/// Horizontal grouped bars: one block per label, one bar per series.
pub fn render_grouped_bars(title: &str, table: &PeriodTable, width: usize) -> String {
    let label_w = table.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let group_w = table.series.iter().map(|s| s.group.chars().count()).max().unwrap_or(0);
    let bar_w = width.saturating_sub(label_w + group_w + 16).max(10);
    let max = table.max_value();

    let mut out = format!("{title}: max={max:.2}\n");
    for (i, label) in table.labels.iter().enumerate() {
        for (j, s) in table.series.iter().enumerate() {
            let v = s.values.get(i).copied().unwrap_or(0.0);
            let len = if max > 0.0 {
                ((v / max) * bar_w as f64).round() as usize
            } else {
                0
            };
            let shown = if j == 0 { label.as_str() } else { "" };
            let line = format!(
                "{shown:<label_w$} {:<group_w$} |{} {v:.2}",
                s.group,
                "#".repeat(len.min(bar_w))
            );
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
    out
}

/// One horizontal box per group on a shared value axis.
pub fn render_box_plot(title: &str, boxes: &[BoxStats], width: usize) -> String {
    let group_w = boxes.iter().map(|b| b.group.chars().count()).max().unwrap_or(0);
    let plot_w = width.saturating_sub(group_w + 2).max(10);

    let (lo, hi) = box_range(boxes).unwrap_or((0.0, 1.0));
    let mut out = format!("{title}: x=[{lo:.2}, {hi:.2}]\n");

    for b in boxes {
        let mut row = vec![' '; plot_w];
        let x = |v: f64| map_x(v, lo, hi, plot_w);

        fill(&mut row, x(b.lower_whisker), x(b.upper_whisker), '-');
        fill(&mut row, x(b.q1), x(b.q3), '=');
        row[x(b.lower_whisker)] = '|';
        row[x(b.upper_whisker)] = '|';
        row[x(b.q1)] = '[';
        row[x(b.q3)] = ']';
        row[x(b.median)] = '#';
        for &o in &b.outliers {
            row[x(o)] = 'o';
        }

        let line = format!("{:<group_w$} {}", b.group, row.into_iter().collect::<String>());
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn render_series(title: &str, series: &[(&[f64], char)], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw connecting lines first so markers overlay them.
    for &(values, _) in series {
        let n = values.len();
        let points: Vec<(usize, usize)> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (index_x(i, n, width), map_y(v, y_min, y_max, height)))
            .collect();
        for pair in points.windows(2) {
            draw_line(&mut grid, pair[0].0, pair[0].1, pair[1].0, pair[1].1, '.');
        }
    }
    for &(values, marker) in series {
        let n = values.len();
        for (i, &v) in values.iter().enumerate() {
            grid[map_y(v, y_min, y_max, height)][index_x(i, n, width)] = marker;
        }
    }

    let mut out = String::new();
    out.push_str(&format!("{title}: y=[{y_min:.2}, {y_max:.2}]\n"));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn y_range(series: &[(&[f64], char)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (values, _) in series {
        for &v in values.iter() {
            min_y = min_y.min(v);
            max_y = max_y.max(v);
        }
    }
    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        // Flat series: centre it.
        Some((min_y - 1.0, max_y + 1.0))
    }
}

fn box_range(boxes: &[BoxStats]) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for b in boxes {
        lo = b.outliers.iter().copied().fold(lo.min(b.lower_whisker), f64::min);
        hi = b.outliers.iter().copied().fold(hi.max(b.upper_whisker), f64::max);
    }
    if !(lo.is_finite() && hi.is_finite()) {
        return None;
    }
    if hi > lo { Some((lo, hi)) } else { Some((lo - 1.0, hi + 1.0)) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn index_x(i: usize, n: usize, width: usize) -> usize {
    if n < 2 {
        return 0;
    }
    map_x(i as f64, 0.0, (n - 1) as f64, width)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn fill(row: &mut [char], from: usize, to: usize, ch: char) {
    let (a, b) = if from <= to { (from, to) } else { (to, from) };
    for c in row.iter_mut().take(b + 1).skip(a) {
        *c = ch;
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::GroupSeries;

    #[test]
    fn line_chart_golden_snapshot_small() {
        let chart = LineChart {
            labels: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            values: vec![0.0, 5.0, 10.0],
        };
        let txt = render_line_chart("Peak Sales Hours", &chart, 10, 5);
        let expected = concat!(
            "Peak Sales Hours: y=[-0.50, 10.50]\n",
            "        .*\n",
            "      ..\n",
            "    .*\n",
            "  ..\n",
            "*.\n",
            "x: A | B | C\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn grouped_bars_scale_to_largest_value() {
        let table = PeriodTable {
            labels: vec!["VIC".to_string(), "WA".to_string()],
            series: vec![
                GroupSeries { group: "Kids".to_string(), values: vec![10.0, 40.0] },
                GroupSeries { group: "Men".to_string(), values: vec![0.0, 20.0] },
            ],
        };
        let txt = render_grouped_bars("Sales", &table, 40);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Sales: max=40.00");

        let bar_len = |l: &str| l.chars().filter(|&c| c == '#').count();
        // bar width = 40 - (3 + 4 + 16) = 17
        assert_eq!(bar_len(lines[3]), 17);
        assert_eq!(bar_len(lines[2]), 0);
        assert!(lines[1].starts_with("VIC Kids |"));
        assert!(lines[2].starts_with("    Men  |"));
    }

    #[test]
    fn box_plot_orders_markers() {
        let boxes = vec![BoxStats {
            group: "Kids".to_string(),
            count: 6,
            lower_whisker: 1.0,
            q1: 2.25,
            median: 3.5,
            q3: 4.75,
            upper_whisker: 5.0,
            outliers: vec![10.0],
        }];
        let txt = render_box_plot("Box", &boxes, 60);
        let row = txt.lines().nth(1).unwrap();
        let pos = |c: char| row.find(c).unwrap();
        assert!(pos('|') < pos('['));
        assert!(pos('[') <= pos('#'));
        assert!(pos('#') <= pos(']'));
        assert!(row.ends_with('o'));
    }

    #[test]
    fn flat_series_renders_without_panicking() {
        let chart = LineChart {
            labels: vec!["Morning".to_string()],
            values: vec![7.0],
        };
        let txt = render_line_chart("Flat", &chart, 10, 5);
        assert!(txt.contains('*'));
    }
}
