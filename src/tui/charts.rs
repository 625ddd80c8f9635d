//! Plotters-powered bar chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `BarChart` widget?
//! - numeric y-axis with tick labels for free
//! - consistent rendering with gaps for missing groups
//! - easy to extend later (stacked series, exportable PNG/SVG backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only bar chart description.
///
/// The widget is intentionally data-driven: labels and values are computed
/// outside the render call, one bar per label. A `None` value leaves a gap in
/// the series instead of drawing a zero-height bar, so "no data" days stay
/// visibly different from "spent nothing" days.
pub struct BarChart<'a> {
    pub labels: &'a [String],
    pub values: &'a [Option<f64>],
    /// Y-axis description (kept simple for terminal rendering).
    pub y_label: &'a str,
    pub color: RGBColor,
    /// Formatting of y tick labels.
    pub fmt_y: fn(f64) -> String,
}

impl Widget for BarChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a
        // chart. In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let n = self.labels.len();
        let y_max = self
            .values
            .iter()
            .flatten()
            .fold(f64::NEG_INFINITY, |a, &b| a.max(b));

        if n == 0 || !y_max.is_finite() {
            buf.set_string(
                area.x,
                area.y,
                "No data for the current selection.",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let y_hi = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                // Small margins keep the chart readable without wasting space.
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(0f64..n as f64, 0f64..y_hi)?;

            // Axes + tick labels.
            //
            // We disable the mesh lines to reduce visual clutter in
            // low-resolution terminal rendering; axes + labels are enough.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(n.min(6))
                .y_labels(5)
                .x_label_formatter(&|v| {
                    let idx = v.floor() as usize;
                    self.labels.get(idx).cloned().unwrap_or_default()
                })
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // One rectangle per present value; missing slots draw nothing.
            let color = self.color;
            chart.draw_series(self.values.iter().enumerate().filter_map(|(i, v)| {
                v.map(|y| {
                    Rectangle::new(
                        [(i as f64 + 0.12, 0.0), (i as f64 + 0.88, y)],
                        color.filled(),
                    )
                })
            }))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
