use crate::table::MonthRow;
use std::collections::BTreeMap;

pub const ROLLING_WINDOW: usize = 6;
pub const HISTOGRAM_BINS: usize = 50;

/// Trailing mean over `window` points; `None` until the window is full or when any value
/// inside it is missing.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|end| {
            if end + 1 < window {
                return None;
            }
            let slice = &values[end + 1 - window..=end];
            let sum: Option<f64> = slice.iter().copied().sum();
            sum.map(|s| s / window as f64)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

/// Equal-width bins spanning the observed range; the last bin includes its upper edge.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            lo: lo + width * i as f64,
            hi: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

/// Year × month-number grid of summed commits. Only years and months present in the
/// data get a row or column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heatmap {
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub cells: Vec<Vec<Option<u64>>>,
}

impl Heatmap {
    pub fn cell(&self, year: i32, month: u32) -> Option<u64> {
        let row = self.years.iter().position(|&y| y == year)?;
        let col = self.months.iter().position(|&m| m == month)?;
        self.cells[row][col]
    }

    pub fn max(&self) -> Option<u64> {
        self.cells.iter().flatten().flatten().copied().max()
    }

    pub fn min(&self) -> Option<u64> {
        self.cells.iter().flatten().flatten().copied().min()
    }
}

pub fn pivot_year_month(rows: &[MonthRow]) -> Heatmap {
    let mut sums: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for row in rows {
        if let Some(commits) = row.commits {
            *sums.entry((row.year(), row.month_num())).or_insert(0) += commits;
        }
    }

    let mut years: Vec<i32> = sums.keys().map(|&(y, _)| y).collect();
    years.dedup();
    let mut months: Vec<u32> = sums.keys().map(|&(_, m)| m).collect();
    months.sort_unstable();
    months.dedup();

    let cells = years
        .iter()
        .map(|&y| months.iter().map(|&m| sums.get(&(y, m)).copied()).collect())
        .collect();

    Heatmap {
        years,
        months,
        cells,
    }
}

/// Position of `v` in `[lo, hi]` scaled to `0..=1`; a degenerate range maps to 0.
pub fn normalize(v: f64, lo: f64, hi: f64) -> f64 {
    if hi <= lo {
        return 0.0;
    }
    ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
}
