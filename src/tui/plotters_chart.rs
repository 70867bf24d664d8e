//! Plotters-powered line chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Line,
    /// One pixel per observation.
    Dots,
}

/// One series of a chart, already in chart coordinates.
#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
    pub kind: SeriesKind,
}

impl ChartSeries {
    pub fn line(points: Vec<(f64, f64)>, color: RGBColor) -> Self {
        Self {
            points,
            color,
            kind: SeriesKind::Line,
        }
    }

    pub fn dots(points: Vec<(f64, f64)>, color: RGBColor) -> Self {
        Self {
            points,
            color,
            kind: SeriesKind::Dots,
        }
    }
}

/// Bounds covering every finite point, with 5% vertical padding.
///
/// A single value on either axis gets a unit-wide range centred on it; no
/// data at all falls back to `[0, 1]`.
pub fn chart_bounds(series: &[ChartSeries]) -> ([f64; 2], [f64; 2]) {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in series.iter().flat_map(|s| s.points.iter()) {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        let mid = if x_min.is_finite() { x_min } else { 0.5 };
        x_min = mid - 0.5;
        x_max = mid + 0.5;
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        let mid = if y_min.is_finite() { y_min } else { 0.0 };
        y_min = mid - 0.5;
        y_max = mid + 0.5;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    ([x_min, x_max], [y_min - pad, y_max + pad])
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct LinePlottersChart<'a> {
    pub series: &'a [ChartSeries],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for LinePlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for s in self.series {
                match s.kind {
                    SeriesKind::Line => {
                        chart.draw_series(LineSeries::new(s.points.iter().copied(), &s.color))?;
                    }
                    SeriesKind::Dots => {
                        // `Circle` radii are mis-scaled by the ratatui backend; pixels render cleanly.
                        chart.draw_series(s.points.iter().map(|&(x, y)| Pixel::new((x, y), s.color)))?;
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_all_series() {
        let series = [
            ChartSeries::line(vec![(0.0, 1.0), (10.0, 3.0)], RGBColor(0, 255, 255)),
            ChartSeries::dots(vec![(5.0, -1.0), (f64::NAN, 100.0)], WHITE),
        ];
        let (x, y) = chart_bounds(&series);
        assert_eq!(x, [0.0, 10.0]);
        assert!((y[0] - (-1.2)).abs() < 1e-12);
        assert!((y[1] - 3.2).abs() < 1e-12);
    }

    #[test]
    fn single_date_is_inside_x_bounds() {
        let x = 736276.0;
        let series = [
            ChartSeries::line(vec![(x, 731.94)], RGBColor(0, 255, 255)),
            ChartSeries::line(vec![(x, 219.58)], RGBColor(0, 255, 0)),
        ];
        let (xb, yb) = chart_bounds(&series);
        assert_eq!(xb, [x - 0.5, x + 0.5]);
        assert!(yb[0] < 219.58 && yb[1] > 731.94);
    }

    #[test]
    fn empty_series_fall_back_to_unit_box() {
        let (xb, _) = chart_bounds(&[ChartSeries::line(Vec::new(), WHITE)]);
        assert_eq!(xb, [0.0, 1.0]);
    }

    #[test]
    fn flat_series_gets_a_unit_band() {
        let series = [ChartSeries::line(vec![(0.0, 7.0), (1.0, 7.0)], WHITE)];
        let (_, y) = chart_bounds(&series);
        assert!(y[0] < 7.0 && y[1] > 7.0);
    }
}
