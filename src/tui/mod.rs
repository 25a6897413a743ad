//! Ratatui-based terminal dashboard.
//!
//! The left column holds the filter controls (regions, products, date range,
//! horizon, chart series). The right side renders the sales chart with its
//! forecast tails and the per-region / per-product totals. Every control
//! change re-runs the pipeline and replaces the previous result.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::{self, Analysis, PipelineResult};
use crate::domain::{CategoryTotal, CombinedRow, Dataset, FilterSelection, SeriesKind};
use crate::error::AppError;
use crate::report::{fmt_currency, fmt_percent};

mod controls;
mod plotters_chart;

use controls::{Controls, Field};
use plotters_chart::{ACTUAL_COLOR, MOVING_AVERAGE_COLOR, NAIVE_COLOR, SalesPlottersChart};

/// Start the dashboard on an already validated dataset.
pub fn run(dataset: Dataset, selection: FilterSelection, horizon: i64) -> Result<(), AppError> {
    let mut app = App::new(dataset, &selection, horizon);

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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

struct App {
    dataset: Dataset,
    controls: Controls,
    result: Option<PipelineResult>,
    status: String,
}

impl App {
    fn new(dataset: Dataset, selection: &FilterSelection, horizon: i64) -> Self {
        let controls = Controls::new(&dataset, selection, horizon);
        let mut app = Self {
            dataset,
            controls,
            result: None,
            status: String::new(),
        };
        app.rerun();
        app
    }

    /// Run the pipeline for the current controls. Errors end up in the status line.
    fn rerun(&mut self) {
        match pipeline::run(&self.dataset, &self.controls.filter, self.controls.horizon) {
            Ok(result) => {
                self.status = if result.is_empty() {
                    "No data for selected filters".to_string()
                } else {
                    format!("{} row(s) selected", result.filtered.len())
                };
                self.result = Some(result);
            }
            Err(e) => {
                self.status = e.to_string();
                self.result = None;
            }
        }
    }

    fn analysis(&self) -> Option<&Analysis> {
        self.result.as_ref().and_then(|r| r.analysis().ok())
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            let ready = event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?;
            if !ready {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
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

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let changed = match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => {
                self.controls.focus_next();
                false
            }
            KeyCode::BackTab => {
                self.controls.focus_prev();
                false
            }
            KeyCode::Up => {
                self.controls.move_cursor(-1);
                false
            }
            KeyCode::Down => {
                self.controls.move_cursor(1);
                false
            }
            KeyCode::Left => self.controls.adjust(-1),
            KeyCode::Right => self.controls.adjust(1),
            KeyCode::PageDown => self.controls.adjust(-7),
            KeyCode::PageUp => self.controls.adjust(7),
            KeyCode::Char(' ') | KeyCode::Enter => self.controls.toggle(),
            KeyCode::Char('c') => self.controls.reset_filters(),
            _ => false,
        };

        if changed {
            self.rerun();
        }
        false
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let gray = Style::default().fg(Color::Gray);
        let mut lines: Vec<Line> = vec![Line::from(vec![
            Span::styled("sfv", Style::default().fg(Color::Cyan)),
            Span::raw(" - Sales Forecast Visualizer"),
            Span::styled(
                format!("  ({} rows loaded)", self.dataset.len()),
                gray,
            ),
        ])];

        match self.analysis() {
            Some(analysis) => {
                let s = &analysis.summary;
                lines.push(Line::from(Span::styled(
                    format!(
                        "Total: {} | Avg daily: {} | Peak: {} on {} | days={}",
                        fmt_currency(s.total_sales),
                        fmt_currency(s.avg_daily_sales),
                        fmt_currency(s.peak.sales),
                        s.peak.date,
                        s.n_days,
                    ),
                    gray,
                )));
                let metrics = match &analysis.evaluation {
                    Some(e) => format!(
                        "Naive accuracy: MAE {} | RMSE {} | MAPE {}",
                        fmt_currency(e.metrics.mae),
                        fmt_currency(e.metrics.rmse),
                        fmt_percent(e.metrics.mape),
                    ),
                    None => "Naive accuracy: n/a (need at least 2 days)".to_string(),
                };
                lines.push(Line::from(Span::styled(metrics, gray)));
            }
            None => {
                lines.push(Line::from(Span::styled(
                    "No data for selected filters",
                    Style::default().fg(Color::Yellow),
                )));
            }
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(0)])
            .split(area);

        self.draw_controls(frame, columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(10)])
            .split(columns[1]);
        self.draw_chart(frame, right[0]);

        let bars = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(right[1]);
        let empty: &[CategoryTotal] = &[];
        let (by_region, by_product) = self
            .analysis()
            .map(|a| (a.by_region.as_slice(), a.by_product.as_slice()))
            .unwrap_or((empty, empty));
        draw_totals(frame, bars[0], "Sales by Region", by_region);
        draw_totals(frame, bars[1], "Sales by Product", by_product);
    }

    fn draw_controls(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let c = &self.controls;
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(35),
                Constraint::Percentage(35),
                Constraint::Length(5),
                Constraint::Length(5),
            ])
            .split(area);

        draw_checklist(
            frame,
            rows[0],
            "Regions",
            &c.region_options,
            |label| c.filter.regions.contains(label),
            c.region_cursor,
            c.field == Field::Regions,
        );
        draw_checklist(
            frame,
            rows[1],
            "Products",
            &c.product_options,
            |label| c.filter.products.contains(label),
            c.product_cursor,
            c.field == Field::Products,
        );

        let selected = Style::default().fg(Color::Black).bg(Color::White);
        let mark = |field: Field| if c.field == field { selected } else { Style::default() };
        let settings = vec![
            Line::from(Span::styled(
                format!("Start  : {}", c.filter.dates.start),
                mark(Field::Start),
            )),
            Line::from(Span::styled(
                format!("End    : {}", c.filter.dates.end),
                mark(Field::End),
            )),
            Line::from(Span::styled(
                format!("Horizon: {} day(s)", c.horizon),
                mark(Field::Horizon),
            )),
        ];
        frame.render_widget(
            Paragraph::new(settings).block(Block::default().title("Range").borders(Borders::ALL)),
            rows[2],
        );

        let names: Vec<String> = SeriesKind::ALL
            .iter()
            .map(|k| k.display_name().to_string())
            .collect();
        draw_checklist(
            frame,
            rows[3],
            "Series",
            &names,
            |name| c.series.iter().any(|k| k.display_name() == name),
            c.series_cursor,
            c.field == Field::Series,
        );
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = Line::from(vec![
            Span::raw("Daily Sales "),
            legend_span(SeriesKind::Actual, ACTUAL_COLOR),
            legend_span(SeriesKind::Naive, NAIVE_COLOR),
            legend_span(SeriesKind::MovingAverage, MOVING_AVERAGE_COLOR),
        ]);
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(analysis) = self.analysis() else {
            let msg =
                Paragraph::new(self.status.as_str()).style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let series = chart_series(&analysis.combined, &self.controls.series);
        let (chart_rect, insets) = chart_layout(inner);
        let widget = SalesPlottersChart {
            actual: &series.actual,
            naive: &series.naive,
            moving_average: &series.moving_average,
            x_origin: series.origin,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &series);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab focus  ↑/↓ move  Space toggle  ←/→ adjust  PgUp/PgDn ±7  c clear  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn legend_span(kind: SeriesKind, (r, g, b): (u8, u8, u8)) -> Span<'static> {
    Span::styled(format!(" ─ {} ", kind.display_name()), Style::default().fg(Color::Rgb(r, g, b)))
}

/// A bordered list with `[x]` markers. An empty selection means "all".
fn draw_checklist(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    options: &[String],
    is_checked: impl Fn(&str) -> bool,
    cursor: usize,
    focused: bool,
) {
    let any_checked = options.iter().any(|o| is_checked(o.as_str()));
    let items: Vec<ListItem> = options
        .iter()
        .map(|o| ListItem::new(format!("[{}] {o}", if is_checked(o.as_str()) { 'x' } else { ' ' })))
        .collect();

    let title = if any_checked { title.to_string() } else { format!("{title} (all)") };
    let border = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL).border_style(border))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
        .highlight_symbol("» ");

    let mut state = ListState::default();
    if focused && !options.is_empty() {
        state.select(Some(cursor));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_totals(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, rows: &[CategoryTotal]) {
    let bars: Vec<Bar> = rows
        .iter()
        .map(|row| {
            Bar::default()
                .label(Line::from(row.label.clone()))
                // Negative totals render as empty bars.
                .value(row.sales.max(0.0).round() as u64)
                .text_value(fmt_currency(row.sales))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::White))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

/// Chart-ready line series, x = days since `origin`.
struct ChartSeries {
    origin: NaiveDate,
    actual: Vec<(f64, f64)>,
    naive: Vec<(f64, f64)>,
    moving_average: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(rows: &[CombinedRow], enabled: &[SeriesKind]) -> ChartSeries {
    let origin = rows.first().map(|r| r.date).unwrap_or_default();
    let pick = |kind: SeriesKind| -> Vec<(f64, f64)> {
        if !enabled.contains(&kind) {
            return Vec::new();
        }
        rows.iter()
            .filter_map(|r| r.value(kind).map(|v| ((r.date - origin).num_days() as f64, v)))
            .collect()
    };

    let actual = pick(SeriesKind::Actual);
    let naive = pick(SeriesKind::Naive);
    let moving_average = pick(SeriesKind::MovingAverage);

    let x_last = rows.last().map(|r| (r.date - origin).num_days() as f64).unwrap_or(0.0);
    let x_bounds = if x_last > 0.0 { [0.0, x_last] } else { [-1.0, 1.0] };

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in actual.iter().chain(&naive).chain(&moving_average) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1.0);

    ChartSeries {
        origin,
        actual,
        naive,
        moving_average,
        x_bounds,
        y_bounds: [y_min - pad, y_max + pad],
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    series: &ChartSeries,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);
    let [x0, x1] = series.x_bounds;
    let [y0, y1] = series.y_bounds;

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = plotters_chart::fmt_day_offset(series.origin, x0 + u * (x1 - x0));
        if label.is_empty() {
            continue;
        }
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        let width = label.len() as u16;
        let rect = Rect {
            x: start,
            y,
            width,
            height: 1,
        };
        frame.render_widget(Paragraph::new(label).style(style), rect);
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y0 + u * (y1 - y0);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.0}");
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        let width = label.len() as u16;
        let rect = Rect {
            x: start,
            y,
            width,
            height: 1,
        };
        frame.render_widget(Paragraph::new(label).style(style), rect);
    }

    let x_label = Paragraph::new("date")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("sales")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use ratatui::backend::TestBackend;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::new(
            [(1, "North", 100.0), (2, "South", 150.0), (3, "North", 90.0)]
                .iter()
                .map(|&(day, region, sales)| Record {
                    date: d(day),
                    region: region.into(),
                    product: "Widget".into(),
                    sales,
                })
                .collect(),
        )
    }

    #[test]
    fn chart_series_splits_history_and_forecast() {
        let rows = vec![
            CombinedRow { date: d(1), actual: Some(100.0), naive: None, moving_average: None },
            CombinedRow { date: d(3), actual: Some(90.0), naive: None, moving_average: None },
            CombinedRow { date: d(4), actual: None, naive: Some(90.0), moving_average: Some(95.0) },
        ];
        let s = chart_series(&rows, &SeriesKind::ALL);
        assert_eq!(s.origin, d(1));
        assert_eq!(s.actual, vec![(0.0, 100.0), (2.0, 90.0)]);
        assert_eq!(s.naive, vec![(3.0, 90.0)]);
        assert_eq!(s.moving_average, vec![(3.0, 95.0)]);
        assert_eq!(s.x_bounds, [0.0, 3.0]);
        assert!(s.y_bounds[0] < 90.0 && s.y_bounds[1] > 100.0);

        let only_naive = chart_series(&rows, &[SeriesKind::Naive]);
        assert!(only_naive.actual.is_empty());
        assert!(only_naive.moving_average.is_empty());
    }

    #[test]
    fn filter_changes_rerun_the_pipeline() {
        let mut app = App::new(dataset(), &FilterSelection::default(), 7);
        assert_eq!(app.analysis().unwrap().summary.n_records, 3);

        // Regions are sorted: North, South. Select South only.
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char(' '));
        assert_eq!(app.analysis().unwrap().summary.n_records, 1);
        assert_eq!(app.status, "1 row(s) selected");

        app.handle_key(KeyCode::Char('c'));
        assert_eq!(app.analysis().unwrap().summary.n_records, 3);
    }

    #[test]
    fn invalid_horizon_is_reported_and_recoverable() {
        let mut app = App::new(dataset(), &FilterSelection::default(), 0);
        assert!(app.result.is_none());
        assert!(app.status.contains("Invalid forecast horizon 0"));

        for _ in 0..4 {
            app.handle_key(KeyCode::Tab);
        }
        app.handle_key(KeyCode::Right);
        let analysis = app.analysis().unwrap();
        assert_eq!(analysis.forecast.len(), 7);
    }

    #[test]
    fn empty_selection_shows_no_data() {
        let selection = FilterSelection {
            regions: vec!["West".into()],
            ..FilterSelection::default()
        };
        let app = App::new(dataset(), &selection, 30);
        assert!(app.result.as_ref().unwrap().is_empty());
        assert_eq!(app.status, "No data for selected filters");
    }

    #[test]
    fn quit_keys() {
        let mut app = App::new(dataset(), &FilterSelection::default(), 30);
        assert!(!app.handle_key(KeyCode::Tab));
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Esc));
    }

    #[test]
    fn header_and_totals_render() {
        let app = App::new(dataset(), &FilterSelection::default(), 30);
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal
            .draw(|f| {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(5), Constraint::Min(0)])
                    .split(f.area());
                app.draw_header(f, rows[0]);
                let analysis = app.analysis().unwrap();
                draw_totals(f, rows[1], "Sales by Region", &analysis.by_region);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Sales Forecast Visualizer"));
        assert!(text.contains("Total: $340.00"));
        assert!(text.contains("MAE $55.00"));
        assert!(text.contains("Sales by Region"));
    }
}
