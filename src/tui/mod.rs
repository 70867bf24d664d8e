//! Ratatui-based terminal UI.
//!
//! The sidebar holds the page menu (Overview | Forecast), the cascading
//! Category/Sub-Category pickers, the overview column toggles, and the
//! forecast horizon. The model is fitted once per session; moving the years
//! slider only re-predicts.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use plotters::style::{RGBColor, WHITE};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table},
    Terminal,
};
use tracing::{info, warn};

use crate::app::pipeline::{self, ForecastRun, OverviewOutput};
use crate::cli::TuiArgs;
use crate::domain::{
    FittedModel, ForecastConfig, HistoryPoint, SalesTable, Selection, DEFAULT_OVERVIEW_COLUMNS, MAX_FORECAST_YEARS,
    MIN_FORECAST_YEARS,
};
use crate::error::AppError;
use crate::plot::date_x;
use crate::query;
use crate::report::format_money;

mod plotters_chart;

use plotters_chart::{chart_bounds, ChartSeries, LinePlottersChart};

const CYAN: RGBColor = RGBColor(0, 255, 255);
const GREEN: RGBColor = RGBColor(0, 255, 0);
const GREY: RGBColor = RGBColor(128, 128, 128);

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    // Loading may prompt for a CSV, so it happens before raw mode.
    let table = crate::app::load_table(&args.data)?;
    let selection = query::resolve_selection(
        &table,
        args.selection.category.as_deref(),
        args.selection.sub_category.as_deref(),
    )?;
    let mut app = App::new(table, selection, args.model.to_config())?;

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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Overview,
    Forecast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Menu,
    Category,
    SubCategory,
    Columns,
    Years,
}

impl Page {
    fn fields(self) -> &'static [Field] {
        match self {
            Page::Overview => &[Field::Menu, Field::Category, Field::SubCategory, Field::Columns],
            Page::Forecast => &[Field::Menu, Field::Category, Field::SubCategory, Field::Years],
        }
    }

    fn title(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Forecast => "Forecast",
        }
    }

    fn toggle(self) -> Self {
        match self {
            Page::Overview => Page::Forecast,
            Page::Forecast => Page::Overview,
        }
    }
}

struct App {
    table: SalesTable,
    page: Page,
    field: usize,

    categories: Vec<String>,
    category_idx: usize,
    sub_categories: Vec<String>,
    sub_idx: usize,

    /// Every table column with its "shown in the overview" flag.
    columns: Vec<(String, bool)>,
    column_cursor: usize,
    table_offset: usize,

    config: ForecastConfig,
    overview: Option<OverviewOutput>,
    fitted: Option<(Vec<HistoryPoint>, FittedModel)>,
    forecast: Option<ForecastRun>,
    forecast_pending: bool,

    status: String,
}

impl App {
    fn new(table: SalesTable, selection: Selection, config: ForecastConfig) -> Result<Self, AppError> {
        let categories = query::categories(&table);
        let category_idx = categories
            .iter()
            .position(|c| *c == selection.category)
            .unwrap_or(0);
        let sub_categories = query::sub_categories(&table, &selection.category);
        let sub_idx = sub_categories
            .iter()
            .position(|s| *s == selection.sub_category)
            .unwrap_or(0);

        let columns = table
            .columns
            .iter()
            .map(|c| {
                let shown = DEFAULT_OVERVIEW_COLUMNS.iter().any(|d| d.eq_ignore_ascii_case(c));
                (c.clone(), shown)
            })
            .collect();

        let status = format!(
            "Loaded {} row(s) from {}",
            table.rows_used(),
            table.source.display()
        );

        let mut app = Self {
            table,
            page: Page::Overview,
            field: 0,
            categories,
            category_idx,
            sub_categories,
            sub_idx,
            columns,
            column_cursor: 0,
            table_offset: 0,
            config,
            overview: None,
            fitted: None,
            forecast: None,
            forecast_pending: false,
            status,
        };
        app.refresh_overview()?;
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            // The "Fitting..." frame is on screen before the fit blocks.
            if self.forecast_pending {
                self.refresh_forecast();
                needs_redraw = true;
                continue;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
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

    fn current_field(&self) -> Field {
        let fields = self.page.fields();
        fields[self.field.min(fields.len() - 1)]
    }

    fn selection(&self) -> Selection {
        Selection {
            category: self.categories.get(self.category_idx).cloned().unwrap_or_default(),
            sub_category: self.sub_categories.get(self.sub_idx).cloned().unwrap_or_default(),
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up => self.field = self.field.saturating_sub(1),
            KeyCode::Down => {
                if self.field + 1 < self.page.fields().len() {
                    self.field += 1;
                }
            }
            KeyCode::Tab => self.switch_page(),
            KeyCode::Left => self.adjust_field(-1)?,
            KeyCode::Right => self.adjust_field(1)?,
            KeyCode::Char(' ') | KeyCode::Enter => {
                if self.current_field() == Field::Columns {
                    self.toggle_column()?;
                }
            }
            KeyCode::PageDown => self.table_offset = self.table_offset.saturating_add(10),
            KeyCode::PageUp => self.table_offset = self.table_offset.saturating_sub(10),
            _ => {}
        }
        Ok(false)
    }

    fn switch_page(&mut self) {
        self.page = self.page.toggle();
        self.field = 0;
        if self.page == Page::Forecast && self.forecast.is_none() {
            self.request_forecast();
        }
        self.status = format!("page: {}", self.page.title());
    }

    fn adjust_field(&mut self, delta: i32) -> Result<(), AppError> {
        match self.current_field() {
            Field::Menu => self.switch_page(),
            Field::Category => {
                if self.categories.is_empty() {
                    return Ok(());
                }
                self.category_idx = step(self.category_idx, delta, self.categories.len());
                // Cascading reset: the sub-category follows the category.
                self.sub_categories = query::sub_categories(&self.table, &self.categories[self.category_idx]);
                self.sub_idx = 0;
                self.refresh_overview()?;
            }
            Field::SubCategory => {
                if self.sub_categories.is_empty() {
                    return Ok(());
                }
                self.sub_idx = step(self.sub_idx, delta, self.sub_categories.len());
                self.refresh_overview()?;
            }
            Field::Columns => {
                if !self.columns.is_empty() {
                    self.column_cursor = step(self.column_cursor, delta, self.columns.len());
                }
            }
            Field::Years => {
                let next = (self.config.years as i64 + delta as i64)
                    .clamp(MIN_FORECAST_YEARS as i64, MAX_FORECAST_YEARS as i64) as u32;
                if next != self.config.years {
                    self.config.years = next;
                    self.request_forecast();
                }
            }
        }
        Ok(())
    }

    fn toggle_column(&mut self) -> Result<(), AppError> {
        if let Some(col) = self.columns.get_mut(self.column_cursor) {
            col.1 = !col.1;
            self.refresh_overview()?;
        }
        Ok(())
    }

    fn shown_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, shown)| *shown)
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn refresh_overview(&mut self) -> Result<(), AppError> {
        let selection = self.selection();
        let overview = pipeline::run_overview(&self.table, &selection, &self.shown_columns())?;
        self.table_offset = 0;
        self.status = format!(
            "{} / {}: {} row(s)",
            selection.category, selection.sub_category, overview.totals.rows
        );
        self.overview = Some(overview);
        Ok(())
    }

    fn request_forecast(&mut self) {
        self.forecast_pending = true;
        self.status = if self.fitted.is_some() {
            format!("Predicting {} year(s)...", self.config.years)
        } else {
            "Fitting model...".to_string()
        };
    }

    /// Fit on first use, then predict for the current horizon.
    fn refresh_forecast(&mut self) {
        self.forecast_pending = false;

        if self.fitted.is_none() {
            match pipeline::fit_forecast(&self.table, &self.config) {
                Ok(fitted) => self.fitted = Some(fitted),
                Err(err) => {
                    warn!("forecast fit failed: {err}");
                    self.status = format!("Forecast unavailable: {err}");
                    return;
                }
            }
        }

        let Some((history, model)) = &self.fitted else {
            return;
        };
        match pipeline::run_forecast_with_model(history.clone(), model.clone(), &self.config) {
            Ok(run) => {
                info!(years = self.config.years, rows = run.forecast.len(), "forecast ready");
                self.status = format!(
                    "Forecast: {} year(s), RMSE {}",
                    self.config.years,
                    format_money(run.model.rmse)
                );
                self.forecast = Some(run);
            }
            Err(err) => {
                warn!("forecast predict failed: {err}");
                self.status = format!("Forecast unavailable: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(0)])
            .split(rows[0]);

        self.draw_sidebar(frame, cols[0]);
        match self.page {
            Page::Overview => self.draw_overview(frame, cols[1]),
            Page::Forecast => self.draw_forecast(frame, cols[1]),
        }
        self.draw_footer(frame, rows[1]);
    }

    fn draw_sidebar(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let selection = self.selection();
        let items: Vec<ListItem> = self
            .page
            .fields()
            .iter()
            .map(|field| match field {
                Field::Menu => ListItem::new(format!("Menu: {}", self.page.title())),
                Field::Category => ListItem::new(format!("Category: {}", selection.category)),
                Field::SubCategory => ListItem::new(format!("Sub-Category: {}", selection.sub_category)),
                Field::Columns => {
                    let name = self
                        .columns
                        .get(self.column_cursor)
                        .map(|(n, on)| format!("[{}] {n}", if *on { "x" } else { " " }))
                        .unwrap_or_default();
                    ListItem::new(format!("Columns: {name}"))
                }
                Field::Years => ListItem::new(format!(
                    "Years: {} ({MIN_FORECAST_YEARS}-{MAX_FORECAST_YEARS})",
                    self.config.years
                )),
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Sales Dashboard").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_overview(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Percentage(40), Constraint::Min(0)])
            .split(area);

        let Some(overview) = &self.overview else {
            return;
        };

        let boxes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[0]);
        metric_box(frame, boxes[0], "Total Sales", &format_money(overview.totals.sales));
        metric_box(frame, boxes[1], "Total Profit", &format_money(overview.totals.profit));

        self.draw_dataset_table(frame, chunks[1], overview);

        let series = [
            ChartSeries::line(overview.series.iter().map(|d| (date_x(d.date), d.sales)).collect(), CYAN),
            ChartSeries::line(overview.series.iter().map(|d| (date_x(d.date), d.profit)).collect(), GREEN),
        ];
        draw_chart(
            frame,
            chunks[2],
            "Sales and Profit Over Time (cyan: Sales, green: Profit)",
            &series,
            ChartAxes {
                x_label: "Order Date",
                y_label: "$",
                fmt_x: fmt_axis_date,
                fmt_y: fmt_axis_value,
            },
        );
    }

    fn draw_dataset_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect, overview: &OverviewOutput) {
        let block = Block::default()
            .title(format!("Dataset Overview ({} row(s))", overview.table.rows.len()))
            .borders(Borders::ALL);

        if overview.table.headers.is_empty() {
            let msg = Paragraph::new("No columns selected (toggle with Space on Columns).")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        }

        let visible = area.height.saturating_sub(3) as usize;
        let offset = self.table_offset.min(overview.table.rows.len().saturating_sub(visible));
        let rows = overview.table.rows[offset..]
            .iter()
            .take(visible)
            .map(|r| Row::new(r.iter().map(|c| Cell::from(c.as_str()))));

        let widths = vec![Constraint::Ratio(1, overview.table.headers.len() as u32); overview.table.headers.len()];
        let header = Row::new(overview.table.headers.iter().map(|h| Cell::from(h.as_str())))
            .style(Style::default().add_modifier(Modifier::BOLD));

        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, area);
    }

    fn draw_forecast(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(run) = &self.forecast else {
            let msg = Paragraph::new(self.status.as_str())
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().title("Forecast").borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Percentage(50), Constraint::Min(0)])
            .split(area);

        draw_forecast_tail(frame, chunks[0], run);

        let series = [
            ChartSeries::line(run.forecast.iter().map(|r| (date_x(r.ds), r.yhat_lower)).collect(), GREY),
            ChartSeries::line(run.forecast.iter().map(|r| (date_x(r.ds), r.yhat_upper)).collect(), GREY),
            ChartSeries::line(run.forecast.iter().map(|r| (date_x(r.ds), r.yhat)).collect(), CYAN),
            ChartSeries::dots(run.history.iter().map(|h| (date_x(h.ds), h.y)).collect(), WHITE),
        ];
        draw_chart(
            frame,
            chunks[1],
            "Forecast (dots: history, cyan: yhat, grey: interval)",
            &series,
            ChartAxes {
                x_label: "ds",
                y_label: "Sales",
                fmt_x: fmt_axis_date,
                fmt_y: fmt_axis_value,
            },
        );

        self.draw_components(frame, chunks[2], run);
    }

    fn draw_components(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &ForecastRun) {
        let comps = &run.components;
        let panels = 1 + comps.weekly.is_some() as u32 + comps.yearly.is_some() as u32;
        let areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, panels); panels as usize])
            .split(area);
        let mut slot = 0;

        let trend = [
            ChartSeries::line(comps.trend.iter().map(|t| (date_x(t.0), t.2)).collect(), GREY),
            ChartSeries::line(comps.trend.iter().map(|t| (date_x(t.0), t.3)).collect(), GREY),
            ChartSeries::line(comps.trend.iter().map(|t| (date_x(t.0), t.1)).collect(), CYAN),
        ];
        draw_chart(
            frame,
            areas[slot],
            "trend",
            &trend,
            ChartAxes {
                x_label: "ds",
                y_label: "trend",
                fmt_x: fmt_axis_date,
                fmt_y: fmt_axis_value,
            },
        );
        slot += 1;

        if let Some(weekly) = &comps.weekly {
            let series = [ChartSeries::line(
                weekly.iter().enumerate().map(|(i, (_, v))| (i as f64, *v)).collect(),
                CYAN,
            )];
            draw_chart(
                frame,
                areas[slot],
                "weekly",
                &series,
                ChartAxes {
                    x_label: "Day of week",
                    y_label: "weekly",
                    fmt_x: fmt_axis_weekday,
                    fmt_y: fmt_axis_value,
                },
            );
            slot += 1;
        }

        if let Some(yearly) = &comps.yearly {
            let series = [ChartSeries::line(
                yearly.iter().enumerate().map(|(i, (_, v))| (i as f64, *v)).collect(),
                CYAN,
            )];
            draw_chart(
                frame,
                areas[slot],
                "yearly",
                &series,
                ChartAxes {
                    x_label: "Day of year",
                    y_label: "yearly",
                    fmt_x: fmt_axis_day_of_year,
                    fmt_y: fmt_axis_value,
                },
            );
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Space toggle column  Tab page  PgUp/PgDn scroll  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Cyclic step through `len` options.
fn step(idx: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (idx as i64 + delta as i64).rem_euclid(len as i64) as usize
}

fn metric_box(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, value: &str) {
    let p = Paragraph::new(value.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn draw_forecast_tail(frame: &mut ratatui::Frame<'_>, area: Rect, run: &ForecastRun) {
    let header = Row::new(["ds", "yhat", "yhat_lower", "yhat_upper", "trend"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = run.tail(5).iter().map(|r| {
        Row::new([
            r.ds.to_string(),
            format!("{:.2}", r.yhat),
            format!("{:.2}", r.yhat_lower),
            format!("{:.2}", r.yhat_upper),
            format!("{:.2}", r.trend),
        ])
    });
    let table = Table::new(rows, [Constraint::Ratio(1, 5); 5])
        .header(header)
        .block(Block::default().title("Forecast tail").borders(Borders::ALL));
    frame.render_widget(table, area);
}

#[derive(Debug, Clone, Copy)]
struct ChartAxes {
    x_label: &'static str,
    y_label: &'static str,
    fmt_x: fn(f64) -> String,
    fmt_y: fn(f64) -> String,
}

fn draw_chart(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, series: &[ChartSeries], axes: ChartAxes) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    if series.iter().all(|s| s.points.is_empty()) {
        let msg = Paragraph::new("No data.").style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, inner);
        return;
    }

    let (x_bounds, y_bounds) = chart_bounds(series);
    let (chart_rect, insets) = chart_layout(inner);
    let widget = LinePlottersChart {
        series,
        x_bounds,
        y_bounds,
        x_label: axes.x_label,
        y_label: axes.y_label,
        fmt_x: axes.fmt_x,
        fmt_y: axes.fmt_y,
    };

    frame.render_widget(widget, chart_rect);
    if let Some(insets) = insets {
        draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, axes);
    }
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn fmt_axis_weekday(v: f64) -> String {
    const DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
    DAYS.get(v.round().clamp(0.0, 6.0) as usize).copied().unwrap_or("").to_string()
}

fn fmt_axis_day_of_year(v: f64) -> String {
    NaiveDate::from_yo_opt(2017, v.round().clamp(0.0, 364.0) as u32 + 1)
        .map(|d| d.format("%b").to_string())
        .unwrap_or_default()
}

fn fmt_axis_value(v: f64) -> String {
    if v.abs() >= 10_000.0 {
        format!("{:.0}k", v / 1000.0)
    } else {
        format!("{v:.0}")
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
        left: 8,
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
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    axes: ChartAxes,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = (axes.fmt_x)(x_val);
        let label_len = label.chars().count() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = (axes.fmt_y)(y_val);
        let label_len = label.chars().count() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new(axes.x_label)
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

    let y_label = Paragraph::new(axes.y_label)
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
    use crate::query::testing::table;

    fn app() -> App {
        let t = table(&[
            ("Furniture", "Chairs", "2016-01-01", 100.0, 10.0),
            ("Furniture", "Tables", "2016-01-02", 200.0, -20.0),
            ("Technology", "Phones", "2016-01-03", 300.0, 30.0),
            ("Technology", "Copiers", "2016-01-04", 400.0, 40.0),
            ("Technology", "Phones", "2016-01-05", 50.0, 5.0),
        ]);
        let selection = query::resolve_selection(&t, None, None).unwrap();
        let config = ForecastConfig {
            uncertainty_samples: 20,
            ..ForecastConfig::default()
        };
        App::new(t, selection, config).unwrap()
    }

    #[test]
    fn starts_on_first_options_with_default_columns() {
        let app = app();
        assert_eq!(app.selection().category, "Furniture");
        assert_eq!(app.selection().sub_category, "Chairs");
        assert_eq!(
            app.shown_columns(),
            vec!["Category", "Sub-Category", "Sales", "Profit"]
        );
        assert_eq!(app.overview.as_ref().unwrap().totals.sales, 100.0);
    }

    #[test]
    fn changing_category_resets_sub_category() {
        let mut app = app();
        app.field = 2; // Sub-Category
        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.selection().sub_category, "Tables");

        app.field = 1; // Category
        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.selection().category, "Technology");
        assert_eq!(app.selection().sub_category, "Phones");
        assert_eq!(app.overview.as_ref().unwrap().totals.sales, 350.0);
    }

    #[test]
    fn column_toggle_updates_projection() {
        let mut app = app();
        app.field = 3; // Columns, cursor on "Order ID"
        app.handle_key(KeyCode::Char(' ')).unwrap();
        let headers = &app.overview.as_ref().unwrap().table.headers;
        assert_eq!(headers[0], "Order ID");
        assert_eq!(headers.len(), 5);
    }

    #[test]
    fn years_change_repredicts_without_refit() {
        let mut app = app();
        app.handle_key(KeyCode::Tab).unwrap();
        assert!(app.forecast_pending);
        app.refresh_forecast();
        assert_eq!(app.forecast.as_ref().unwrap().forecast.len(), 5 + 365);

        // Mark the cached model; a refit on the same data would overwrite it.
        let marker = -12345.0;
        app.fitted.as_mut().unwrap().1.rmse = marker;

        app.field = 3; // Years
        app.handle_key(KeyCode::Right).unwrap();
        app.refresh_forecast();
        let run = app.forecast.as_ref().unwrap();
        assert_eq!(run.config.years, 2);
        assert_eq!(run.forecast.len(), 5 + 730);
        assert_eq!(run.model.rmse, marker);
        assert_eq!(app.fitted.as_ref().unwrap().1.rmse, marker);

        // The slider stops at its maximum.
        for _ in 0..5 {
            app.handle_key(KeyCode::Right).unwrap();
        }
        assert_eq!(app.config.years, MAX_FORECAST_YEARS);
    }

    #[test]
    fn step_wraps_both_ways() {
        assert_eq!(step(0, -1, 3), 2);
        assert_eq!(step(2, 1, 3), 0);
        assert_eq!(step(0, 1, 0), 0);
    }

    #[test]
    fn axis_formatters() {
        assert_eq!(fmt_axis_weekday(2.0), "Tue");
        assert_eq!(fmt_axis_day_of_year(0.0), "Jan");
        assert_eq!(fmt_axis_day_of_year(364.0), "Dec");
        assert_eq!(fmt_axis_value(25_000.0), "25k");
        let d = NaiveDate::from_ymd_opt(2017, 3, 15).unwrap();
        assert_eq!(fmt_axis_date(date_x(d)), "2017-03");
    }
}
