use super::canvas::{tick_label, Figure, SERIES_BLUE};
use super::stats::{histogram, HISTOGRAM_BINS};
use super::time_series::padded_range;
use crate::config::RenderOptions;
use crate::error::{PulseError, Result};
use crate::table::MonthlyTable;
use plotters::prelude::*;
use std::path::Path;

pub const FILE_NAME: &str = "churn_distribution.png";

pub fn render(table: &MonthlyTable, opts: RenderOptions, path: &Path) -> Result<()> {
    let churn: Vec<f64> = table.rows().iter().filter_map(|r| r.churn).map(|c| c as f64).collect();
    let bins = histogram(&churn, HISTOGRAM_BINS);

    let edges: Vec<f64> = bins.iter().flat_map(|b| [b.lo, b.hi]).collect();
    let (x_lo, x_hi) = padded_range(&edges, 0.5);
    let pad = (x_hi - x_lo) * 0.02;
    let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0);
    let y_hi = (y_max.max(1) as f64) * 1.05;

    let fig = Figure::new(opts, 10.0, 5.0);
    fig.render(path, |root| {
        let mut builder = ChartBuilder::on(root);
        builder
            .margin(fig.px(10.0))
            .x_label_area_size(fig.label_area(36.0))
            .y_label_area_size(fig.label_area(40.0));
        if fig.text {
            builder.caption("Distribution of Monthly Code Churn", fig.font(14.0));
        }
        let x_labels = fig.whole_labels(x_lo - pad, x_hi + pad, 8);
        let y_labels = fig.whole_labels(0.0, y_hi, 6);
        let mut chart = builder
            .build_cartesian_2d((x_lo - pad)..(x_hi + pad), 0.0..y_hi)
            .map_err(PulseError::render)?;

        let fmt = |v: &f64| tick_label(*v);
        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .x_labels(x_labels)
            .y_labels(y_labels)
            .x_label_formatter(&fmt)
            .y_label_formatter(&fmt)
            .label_style(fig.font(9.0))
            .bold_line_style(BLACK.mix(0.08))
            .light_line_style(WHITE.mix(0.0));
        if fig.text {
            mesh.x_desc("Churn").y_desc("Frequency").axis_desc_style(fig.font(11.0));
        }
        mesh.draw().map_err(PulseError::render)?;

        chart
            .draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
                Rectangle::new([(b.lo, 0.0), (b.hi, b.count as f64)], SERIES_BLUE.filled())
            }))
            .map_err(PulseError::render)?;
        Ok(())
    })
}
