use super::canvas::{draw_colorbar, tick_label, viridis, Figure};
use super::stats::normalize;
use super::time_series::padded_range;
use crate::config::RenderOptions;
use crate::error::{PulseError, Result};
use crate::table::MonthlyTable;
use plotters::prelude::*;
use std::path::Path;

pub const FILE_NAME: &str = "commits_vs_churn_scatter.png";

/// Commits against churn per month, colored by year.
pub fn render(table: &MonthlyTable, opts: RenderOptions, path: &Path) -> Result<()> {
    let points: Vec<(f64, f64, i32)> = table
        .rows()
        .iter()
        .filter_map(|r| Some((r.commits? as f64, r.churn? as f64, r.year())))
        .collect();
    let years: Vec<f64> = table.rows().iter().map(|r| r.year() as f64).collect();
    let (year_lo, year_hi) = padded_range(&years, 0.0);

    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (x_lo, x_hi) = padded_range(&xs, 1.0);
    let (y_lo, y_hi) = padded_range(&ys, 1.0);
    let (x_pad, y_pad) = ((x_hi - x_lo) * 0.05, (y_hi - y_lo) * 0.05);

    let fig = Figure::new(opts, 10.0, 6.0);
    fig.render(path, |root| {
        let bar_width = fig.px(80.0);
        let (plot_area, bar_area) = root.split_horizontally(fig.width.saturating_sub(bar_width));

        let mut builder = ChartBuilder::on(&plot_area);
        builder
            .margin(fig.px(10.0))
            .margin_right(fig.px(4.0))
            .x_label_area_size(fig.label_area(36.0))
            .y_label_area_size(fig.label_area(52.0));
        if fig.text {
            builder.caption("Commits vs Churn", fig.font(14.0));
        }
        let (x_range, y_range) = ((x_lo - x_pad)..(x_hi + x_pad), (y_lo - y_pad)..(y_hi + y_pad));
        let x_labels = fig.whole_labels(x_range.start, x_range.end, 8);
        let y_labels = fig.whole_labels(y_range.start, y_range.end, 8);
        let mut chart = builder
            .build_cartesian_2d(x_range, y_range)
            .map_err(PulseError::render)?;

        let fmt = |v: &f64| tick_label(*v);
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(x_labels)
            .y_labels(y_labels)
            .x_label_formatter(&fmt)
            .y_label_formatter(&fmt)
            .label_style(fig.font(9.0))
            .bold_line_style(BLACK.mix(0.08))
            .light_line_style(WHITE.mix(0.0));
        if fig.text {
            mesh.x_desc("Commits").y_desc("Churn").axis_desc_style(fig.font(11.0));
        }
        mesh.draw().map_err(PulseError::render)?;

        let radius = fig.px(3.0);
        chart
            .draw_series(points.iter().map(|&(x, y, year)| {
                let color = viridis(normalize(year as f64, year_lo, year_hi));
                Circle::new((x, y), radius, color.mix(0.7).filled())
            }))
            .map_err(PulseError::render)?;

        draw_colorbar(&bar_area, &fig, year_lo, year_hi, Some("Year"))
    })
}
