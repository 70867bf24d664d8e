//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Every chart shares one renderer: a list of series drawn in order, lines
//! only filling blank cells and markers always on top.

use chrono::{Datelike, NaiveDate};

use crate::domain::{DailyTotals, ForecastRow, HistoryPoint};
use crate::forecast::Components;
use crate::report::weekday_label;

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// Connected line.
    Line,
    /// Individual markers.
    Points,
}

/// One plotted series; `x` is on whatever axis the chart uses.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub glyph: char,
    pub mark: Mark,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn line(label: &str, glyph: char, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.to_string(),
            glyph,
            mark: Mark::Line,
            points,
        }
    }

    pub fn points(label: &str, glyph: char, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.to_string(),
            glyph,
            mark: Mark::Points,
            points,
        }
    }
}

/// Date to a numeric x coordinate (whole days).
pub fn date_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_date(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.to_string())
        .unwrap_or_else(|| format!("{x:.0}"))
}

/// "Sales and Profit Over Time" for the selection.
pub fn render_overview_plot(series: &[DailyTotals], width: usize, height: usize) -> String {
    let sales = series.iter().map(|d| (date_x(d.date), d.sales)).collect();
    let profit = series.iter().map(|d| (date_x(d.date), d.profit)).collect();
    render_date_chart(
        "Sales and Profit Over Time",
        &[Series::line("Sales", 's', sales), Series::line("Profit", 'p', profit)],
        width,
        height,
    )
}

/// History points over the forecast line and its interval.
pub fn render_forecast_plot(history: &[HistoryPoint], rows: &[ForecastRow], width: usize, height: usize) -> String {
    let yhat = rows.iter().map(|r| (date_x(r.ds), r.yhat)).collect();
    let lower = rows.iter().map(|r| (date_x(r.ds), r.yhat_lower)).collect();
    let upper = rows.iter().map(|r| (date_x(r.ds), r.yhat_upper)).collect();
    let observed = history.iter().map(|h| (date_x(h.ds), h.y)).collect();
    render_date_chart(
        "Forecast",
        &[
            Series::line("yhat", '-', yhat),
            Series::line("interval", ':', lower),
            Series::line("interval", ':', upper),
            Series::points("history", 'o', observed),
        ],
        width,
        height,
    )
}

/// Trend, weekly, and yearly charts stacked vertically.
pub fn render_components_plot(components: &Components, width: usize, height: usize) -> String {
    let mut out = String::new();

    let trend = components.trend.iter().map(|t| (date_x(t.0), t.1)).collect();
    let trend_lower = components.trend.iter().map(|t| (date_x(t.0), t.2)).collect();
    let trend_upper = components.trend.iter().map(|t| (date_x(t.0), t.3)).collect();
    out.push_str(&render_date_chart(
        "Trend",
        &[
            Series::line("trend", '-', trend),
            Series::line("interval", ':', trend_lower),
            Series::line("interval", ':', trend_upper),
        ],
        width,
        height,
    ));

    if let Some(weekly) = &components.weekly {
        let points: Vec<(f64, f64)> = weekly.iter().enumerate().map(|(i, (_, v))| (i as f64, *v)).collect();
        let first = weekly.first().map(|w| weekday_label(w.0)).unwrap_or("");
        let last = weekly.last().map(|w| weekday_label(w.0)).unwrap_or("");
        out.push('\n');
        out.push_str(&render_chart(
            "Weekly",
            (first.to_string(), last.to_string()),
            &[Series::line("weekly", '-', points)],
            width,
            height,
        ));
    }

    if let Some(yearly) = &components.yearly {
        let points: Vec<(f64, f64)> = yearly.iter().enumerate().map(|(i, (_, v))| (i as f64, *v)).collect();
        let first = yearly.first().map(|y| y.0.format("%b %d").to_string()).unwrap_or_default();
        let last = yearly.last().map(|y| y.0.format("%b %d").to_string()).unwrap_or_default();
        out.push('\n');
        out.push_str(&render_chart(
            "Yearly",
            (first, last),
            &[Series::line("yearly", '-', points)],
            width,
            height,
        ));
    }

    out
}

fn render_date_chart(title: &str, series: &[Series], width: usize, height: usize) -> String {
    let labels = extent(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)))
        .map(|(lo, hi)| (x_date(lo), x_date(hi)))
        .unwrap_or_default();
    render_chart(title, labels, series, width, height)
}

/// Render `series` on one grid with a header and legend.
pub fn render_chart(
    title: &str,
    x_labels: (String, String),
    series: &[Series],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for s in series.iter().filter(|s| s.mark == Mark::Line) {
        draw_series_line(&mut grid, s, x_min, x_max, y_min, y_max);
    }
    for s in series.iter().filter(|s| s.mark == Mark::Points) {
        for &(x, y) in s.points.iter().filter(|p| p.0.is_finite() && p.1.is_finite()) {
            let col = map_x(x, x_min, x_max, width);
            let row = map_y(y, y_min, y_max, height);
            grid[row][col] = s.glyph;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{title}: x=[{}, {}] | y=[{y_min:.2}, {y_max:.2}]\n",
        x_labels.0, x_labels.1
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let mut legend: Vec<String> = Vec::new();
    for s in series {
        let entry = format!("{} {}", s.glyph, s.label);
        if !legend.contains(&entry) {
            legend.push(entry);
        }
    }
    out.push_str(&format!("Legend: {}\n", legend.join("  ")));

    out
}

/// Smallest and largest finite value; equal when there is only one.
fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    (min_v <= max_v).then_some((min_v, max_v))
}

/// A single value gets a unit-wide range centred on it.
fn widen(min: f64, max: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min - 0.5, max + 0.5) }
}

fn x_range(series: &[Series]) -> Option<(f64, f64)> {
    extent(series.iter().flat_map(|s| s.points.iter().map(|p| p.0))).map(|(lo, hi)| widen(lo, hi))
}

fn y_range(series: &[Series]) -> Option<(f64, f64)> {
    extent(series.iter().flat_map(|s| s.points.iter().map(|p| p.1))).map(|(lo, hi)| widen(lo, hi))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series_line(grid: &mut [Vec<char>], series: &Series, x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in series.points.iter().filter(|p| p.0.is_finite() && p.1.is_finite()) {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, series.glyph),
            None => {
                if grid[row][col] == ' ' {
                    grid[row][col] = series.glyph;
                }
            }
        }
        prev = Some((col, row));
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

    #[test]
    fn chart_golden_snapshot_small() {
        let series = [
            Series::line("trend", '-', vec![(0.0, 0.0), (9.0, 10.0)]),
            Series::points("obs", 'o', vec![(0.0, 10.0)]),
        ];
        let txt = render_chart("Test", ("a".to_string(), "b".to_string()), &series, 10, 5);
        let expected = concat!(
            "Test: x=[a, b] | y=[-0.50, 10.50]\n",
            "o       --\n",
            "      --  \n",
            "    --    \n",
            "  --      \n",
            "--        \n",
            "Legend: - trend  o obs\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn overview_plot_labels_dates() {
        let d = |day| NaiveDate::from_ymd_opt(2016, 1, day).unwrap();
        let series = vec![
            DailyTotals { date: d(1), sales: 10.0, profit: 1.0 },
            DailyTotals { date: d(5), sales: 30.0, profit: -2.0 },
        ];
        let txt = render_overview_plot(&series, 20, 6);
        assert!(txt.starts_with("Sales and Profit Over Time: x=[2016-01-01, 2016-01-05]"));
        assert!(txt.ends_with("Legend: s Sales  p Profit\n"));
        assert_eq!(txt.lines().count(), 1 + 6 + 1);
    }

    #[test]
    fn single_day_is_centred() {
        let day = NaiveDate::from_ymd_opt(2016, 11, 8).unwrap();
        let series = vec![DailyTotals { date: day, sales: 731.94, profit: 731.94 }];
        let txt = render_overview_plot(&series, 20, 6);
        let lines: Vec<&str> = txt.lines().collect();
        assert!(lines[0].starts_with("Sales and Profit Over Time: x=[2016-11-08, 2016-11-08] | y=[731.39, 732.49]"));

        let marked: Vec<(usize, usize)> = lines[1..7]
            .iter()
            .enumerate()
            .filter_map(|(row, l)| l.find('s').map(|col| (row, col)))
            .collect();
        assert_eq!(marked.len(), 1);
        let (row, col) = marked[0];
        assert_eq!(col, 10);
        assert!((2..=3).contains(&row));
    }

    #[test]
    fn flat_series_keeps_its_level() {
        let series = [Series::line("y", '-', vec![(0.0, 5.0), (9.0, 5.0)])];
        let txt = render_chart("Flat", ("a".to_string(), "b".to_string()), &series, 10, 5);
        assert!(txt.starts_with("Flat: x=[a, b] | y=[4.45, 5.55]\n"));
        assert_eq!(txt.lines().nth(3), Some("----------"));
    }

    #[test]
    fn degenerate_series_still_renders() {
        let txt = render_chart("Flat", (String::new(), String::new()), &[Series::line("y", '-', vec![(1.0, 5.0)])], 10, 5);
        assert_eq!(txt.lines().count(), 7);
    }
}
