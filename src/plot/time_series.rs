use super::canvas::{tick_label, Figure, SERIES_BLUE, SERIES_ORANGE};
use super::stats::{rolling_mean, ROLLING_WINDOW};
use crate::config::RenderOptions;
use crate::error::{PulseError, Result};
use crate::table::MonthlyTable;
use crate::util::{month_ordinal, ordinal_label};
use plotters::prelude::*;
use std::path::Path;

pub const FILE_NAME: &str = "commits_time_series.png";

/// Monthly commits as a line with the trailing rolling average dashed over it.
pub fn render(table: &MonthlyTable, opts: RenderOptions, path: &Path) -> Result<()> {
    let rows = table.rows();
    let xs: Vec<f64> = rows.iter().map(|r| month_ordinal(&r.month) as f64).collect();
    let commits: Vec<Option<f64>> = rows.iter().map(|r| r.commits.map(|c| c as f64)).collect();
    let rolling = rolling_mean(&commits, ROLLING_WINDOW);

    let (x_lo, x_hi) = padded_range(&xs, 1.0);
    let y_max = commits.iter().flatten().copied().fold(0.0, f64::max);
    let y_hi = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    let fig = Figure::new(opts, 12.0, 5.0);
    fig.render(path, |root| {
        let mut builder = ChartBuilder::on(root);
        builder
            .margin(fig.px(10.0))
            .x_label_area_size(fig.label_area(36.0))
            .y_label_area_size(fig.label_area(44.0));
        if fig.text {
            builder.caption("Monthly Number of Commits", fig.font(14.0));
        }
        let mut chart = builder
            .build_cartesian_2d(x_lo..x_hi, 0.0..y_hi)
            .map_err(PulseError::render)?;

        // Month ordinals are whole numbers; ticks between them have no month to name.
        let x_fmt = |x: &f64| {
            if (x - x.round()).abs() < 1e-6 {
                ordinal_label(*x)
            } else {
                String::new()
            }
        };
        let y_fmt = |y: &f64| tick_label(*y);
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(fig.whole_labels(x_lo, x_hi, 10))
            .y_labels(fig.whole_labels(0.0, y_hi, 8))
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .label_style(fig.font(9.0))
            .light_line_style(WHITE.mix(0.0))
            .bold_line_style(BLACK.mix(0.08));
        if fig.text {
            mesh.x_desc("Month").y_desc("Commits").axis_desc_style(fig.font(11.0));
        }
        mesh.draw().map_err(PulseError::render)?;

        let line = SERIES_BLUE.stroke_width(fig.px(1.5));
        let series = chart
            .draw_series(
                segments(&xs, &commits)
                    .into_iter()
                    .map(|points| PathElement::new(points, line)),
            )
            .map_err(PulseError::render)?;
        if fig.text {
            series.label("Monthly commits").legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], line)
            });
        }

        let dash = SERIES_ORANGE.stroke_width(fig.px(1.5));
        let dash_len = fig.px(4.0);
        let mut dashed = Vec::new();
        for points in segments(&xs, &rolling) {
            dashed.extend(DashedLineSeries::new(points, dash_len, dash_len, dash));
        }
        let series = chart
            .draw_series(dashed)
            .map_err(PulseError::render)?;
        if fig.text {
            series
                .label(format!("{ROLLING_WINDOW}-month rolling avg"))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], dash));

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .label_font(fig.font(9.0))
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK.mix(0.3))
                .draw()
                .map_err(PulseError::render)?;
        }
        Ok(())
    })
}

/// Splits a series at missing values so gaps are not bridged by a line.
pub(super) fn segments(xs: &[f64], ys: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (&x, y) in xs.iter().zip(ys) {
        match y {
            Some(y) => current.push((x, *y)),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Min/max of `values`, widened by `pad` on both sides when the span is empty.
pub(super) fn padded_range(values: &[f64], pad: f64) -> (f64, f64) {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if hi > lo {
        (lo, hi)
    } else {
        (lo - pad, hi + pad)
    }
}
