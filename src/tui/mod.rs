//! Ratatui-based chart viewer.
//!
//! One tab per chart (state/group bars, intraday line, box plot, 2×2
//! dashboard). `Tab`/`→` and `Shift-Tab`/`←` switch tabs, `q`/`Esc` quits.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame, Terminal,
};

use crate::aggregate::PeriodTable;
use crate::app::pipeline::RunOutput;
use crate::charts::BoxStats;
use crate::domain::AnalysisConfig;
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::{legend_color, BoxPlot, CategoryLines, GroupedBars};

/// Start the viewer on an already computed run.
pub fn run(run: &RunOutput, config: &AnalysisConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::Terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(run, config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::Terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::Terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartTab {
    StateGroup,
    PeakHours,
    Distribution,
    Dashboard,
}

impl ChartTab {
    const ALL: [ChartTab; 4] = [
        ChartTab::StateGroup,
        ChartTab::PeakHours,
        ChartTab::Distribution,
        ChartTab::Dashboard,
    ];

    fn title(self) -> &'static str {
        match self {
            ChartTab::StateGroup => "State-wise Sales by Group",
            ChartTab::PeakHours => "Peak Sales Hours",
            ChartTab::Distribution => "Sales Distribution by Group",
            ChartTab::Dashboard => "Dashboard",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

struct App<'a> {
    run: &'a RunOutput,
    config: &'a AnalysisConfig,
    tab: ChartTab,
}

impl<'a> App<'a> {
    fn new(run: &'a RunOutput, config: &'a AnalysisConfig) -> Self {
        Self {
            run,
            config,
            tab: ChartTab::StateGroup,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::Terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::Terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::Terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the viewer should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::Right => self.tab = self.tab.next(),
            KeyCode::BackTab | KeyCode::Left => self.tab = self.tab.prev(),
            KeyCode::Char(c @ '1'..='4') => {
                let i = c as usize - '1' as usize;
                self.tab = ChartTab::ALL[i];
            }
            _ => {}
        }
        false
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_tabs(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_tabs(&self, frame: &mut Frame<'_>, area: Rect) {
        let titles: Vec<Line> = ChartTab::ALL.iter().map(|t| Line::from(t.title())).collect();
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .block(Block::default().borders(Borders::ALL).title("sales"))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_body(&self, frame: &mut Frame<'_>, area: Rect) {
        let charts = &self.run.charts;
        match self.tab {
            ChartTab::StateGroup => draw_bars(frame, area, self.tab.title(), &charts.state_group),
            ChartTab::PeakHours => {
                let block = Block::default().title(self.tab.title()).borders(Borders::ALL);
                let inner = block.inner(area);
                frame.render_widget(block, area);
                frame.render_widget(Clear, inner);
                frame.render_widget(
                    CategoryLines {
                        labels: &charts.time_line.labels,
                        series: vec![charts.time_line.values.as_slice()],
                        y_label: "mean sales",
                    },
                    inner,
                );
            }
            ChartTab::Distribution => draw_boxes(frame, area, self.tab.title(), &charts.boxes),
            ChartTab::Dashboard => {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(area);
                let top = split_columns(rows[0]);
                let bottom = split_columns(rows[1]);

                let d = &charts.dashboard;
                draw_trend(frame, top[0], "Weekly Sales Trend by Group", &d.weekly);
                draw_bars(frame, top[1], "Monthly Sales by Group", &d.monthly);
                draw_bars(frame, bottom[0], "Quarterly Sales by Group", &d.quarterly);
                draw_boxes(frame, bottom[1], "Sales Distribution by Group", &d.boxes);
            }
        }
    }

    fn draw_footer(&self, frame: &mut Frame<'_>, area: Rect) {
        let ext = &self.run.extremes;
        let line = Line::from(vec![
            Span::styled("Tab/←/→ switch  1-4 jump  q quit", Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(
                format!(
                    "{} | rows={} | highest={} lowest={}",
                    self.config.csv_path.display(),
                    self.run.table.len(),
                    ext.highest.group,
                    ext.lowest.group
                ),
                Style::default().fg(Color::Yellow),
            ),
        ]);
        frame.render_widget(Paragraph::new(line).block(Block::default().borders(Borders::ALL)), area);
    }
}

fn split_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

/// Bordered chart area with a one-line colour legend under the title.
fn chart_frame(frame: &mut Frame<'_>, area: Rect, title: &str, legend: &[String]) -> Rect {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    if legend.is_empty() || inner.height < 2 {
        return inner;
    }
    let spans: Vec<Span> = legend
        .iter()
        .enumerate()
        .flat_map(|(i, name)| {
            [
                Span::styled("■ ", Style::default().fg(legend_color(i))),
                Span::raw(format!("{name}  ")),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), Rect { height: 1, ..inner });

    Rect {
        y: inner.y + 1,
        height: inner.height - 1,
        ..inner
    }
}

fn series_names(table: &PeriodTable) -> Vec<String> {
    table.series.iter().map(|s| s.group.clone()).collect()
}

fn draw_bars(frame: &mut Frame<'_>, area: Rect, title: &str, table: &PeriodTable) {
    let inner = chart_frame(frame, area, title, &series_names(table));
    frame.render_widget(GroupedBars { table, y_label: "sales" }, inner);
}

fn draw_trend(frame: &mut Frame<'_>, area: Rect, title: &str, table: &PeriodTable) {
    let inner = chart_frame(frame, area, title, &series_names(table));
    let series = table.series.iter().map(|s| s.values.as_slice()).collect();
    frame.render_widget(
        CategoryLines {
            labels: &table.labels,
            series,
            y_label: "sales",
        },
        inner,
    );
}

fn draw_boxes(frame: &mut Frame<'_>, area: Rect, title: &str, boxes: &[BoxStats]) {
    let inner = chart_frame(frame, area, title, &[]);
    frame.render_widget(BoxPlot { boxes, y_label: "sales" }, inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_cycle_both_ways() {
        let mut tab = ChartTab::StateGroup;
        for _ in 0..ChartTab::ALL.len() {
            tab = tab.next();
        }
        assert_eq!(tab, ChartTab::StateGroup);
        assert_eq!(ChartTab::StateGroup.prev(), ChartTab::Dashboard);
        assert_eq!(ChartTab::Dashboard.next(), ChartTab::StateGroup);
    }
}
