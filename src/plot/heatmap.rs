use super::canvas::{draw_colorbar, viridis, Figure, GRID_GRAY};
use super::stats::{normalize, pivot_year_month};
use crate::config::RenderOptions;
use crate::error::{PulseError, Result};
use crate::table::MonthlyTable;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

pub const FILE_NAME: &str = "commit_heatmap.png";

/// Year rows (earliest on top) by month-number columns, one cell per summed month.
pub fn render(table: &MonthlyTable, opts: RenderOptions, path: &Path) -> Result<()> {
    let heatmap = pivot_year_month(table.rows());
    let lo = heatmap.min().unwrap_or(0) as f64;
    let hi = heatmap.max().unwrap_or(0) as f64;
    let n_cols = heatmap.months.len().max(1);
    let n_rows = heatmap.years.len().max(1);

    let fig = Figure::new(opts, 14.0, 10.0);
    fig.render(path, |root| {
        let bar_width = fig.px(90.0);
        let (plot_area, bar_area) = root.split_horizontally(fig.width.saturating_sub(bar_width));

        let mut builder = ChartBuilder::on(&plot_area);
        builder
            .margin(fig.px(10.0))
            .margin_right(fig.px(4.0))
            .x_label_area_size(fig.label_area(36.0))
            .y_label_area_size(fig.label_area(44.0));
        if fig.text {
            builder.caption("Heatmap of Monthly Commit Activity", fig.font(14.0));
        }
        let mut chart = builder
            .build_cartesian_2d(axis_range(n_cols), axis_range(n_rows))
            .map_err(PulseError::render)?;

        let month_label = |v: &f64| {
            cell_index(*v, n_cols)
                .and_then(|c| heatmap.months.get(c))
                .map(|m| m.to_string())
                .unwrap_or_default()
        };
        let year_label = |v: &f64| {
            cell_index(*v, n_rows)
                .and_then(|y| heatmap.years.get(n_rows - 1 - y))
                .map(|y| y.to_string())
                .unwrap_or_default()
        };
        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh()
            .x_labels(fig.labels(n_cols))
            .y_labels(fig.labels(n_rows))
            .x_label_formatter(&month_label)
            .y_label_formatter(&year_label)
            .label_style(fig.font(9.0));
        if fig.text {
            mesh.x_desc("Month").y_desc("Year").axis_desc_style(fig.font(11.0));
        }
        mesh.draw().map_err(PulseError::render)?;

        let border = GRID_GRAY.stroke_width(fig.px(0.5));
        let mut cells = Vec::new();
        for (r, row) in heatmap.cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let Some(commits) = cell else { continue };
                let corners = cell_bounds(r, c, n_rows);
                let color = viridis(normalize(*commits as f64, lo, hi));
                cells.push(Rectangle::new(corners, color.filled()));
                cells.push(Rectangle::new(corners, border));
            }
        }
        chart.draw_series(cells).map_err(PulseError::render)?;

        draw_colorbar(&bar_area, &fig, lo, hi, None)
    })
}

/// Axis spanning `n` unit cells centred on `0..n`.
fn axis_range(n: usize) -> Range<f64> {
    -0.5..(n as f64 - 0.5)
}

/// Cell index for a tick sitting on a cell centre.
fn cell_index(v: f64, n: usize) -> Option<usize> {
    let i = v.round();
    if (v - i).abs() > 1e-6 || i < 0.0 || i >= n as f64 {
        return None;
    }
    Some(i as usize)
}

/// Corners of pivot cell (`r`, `c`); row 0 is drawn at the top.
fn cell_bounds(r: usize, c: usize, n_rows: usize) -> [(f64, f64); 2] {
    let (x, y) = (c as f64, (n_rows - 1 - r) as f64);
    [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)]
}
