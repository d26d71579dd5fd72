//! Plotter stage: `monthly_activity.csv` in, four PNG charts out.

mod canvas;
pub mod heatmap;
pub mod histogram;
pub mod scatter;
pub mod stats;
pub mod time_series;

use crate::config::{Paths, RenderOptions};
use crate::error::Result;
use crate::output::ensure_dir;
use crate::table::MonthlyTable;
use anyhow::Context;
use console::style;
use std::path::{Path, PathBuf};
use tracing::debug;

type RenderFn = fn(&MonthlyTable, RenderOptions, &Path) -> Result<()>;

const CHARTS: [(&str, RenderFn); 4] = [
    (time_series::FILE_NAME, time_series::render),
    (histogram::FILE_NAME, histogram::render),
    (heatmap::FILE_NAME, heatmap::render),
    (scatter::FILE_NAME, scatter::render),
];

pub fn exec(paths: &Paths) -> anyhow::Result<()> {
    run(paths, RenderOptions::default()).context("Failed to generate plots")?;
    println!("{}", style("All plots generated.").green());
    Ok(())
}

/// Loads and summarises the monthly table, then renders every chart in order.
/// Nothing is written unless the table loads cleanly.
pub fn run(paths: &Paths, opts: RenderOptions) -> Result<Vec<PathBuf>> {
    let table = MonthlyTable::load(&paths.monthly_csv())?;
    table.summary().print();
    ensure_dir(&paths.plots)?;

    let mut saved = Vec::with_capacity(CHARTS.len());
    for (file_name, render) in CHARTS {
        let path = paths.plot(file_name);
        render(&table, opts, &path)?;
        debug!(chart = file_name, rows = table.len(), "rendered chart");
        println!("Saved: {}", style(path.display()).cyan());
        saved.push(path);
    }
    Ok(saved)
}
