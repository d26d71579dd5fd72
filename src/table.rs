use crate::error::{PulseError, Result};
use crate::model::MONTHLY_COLUMNS;
use crate::util::parse_month;
use chrono::{Datelike, NaiveDate};
use console::style;
use std::collections::HashSet;
use std::path::Path;

/// A monthly-activity row as loaded for charting. Count cells may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonthRow {
    pub month: NaiveDate,
    pub commits: Option<u64>,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub churn: Option<u64>,
}

impl MonthRow {
    pub fn year(&self) -> i32 {
        self.month.year()
    }

    pub fn month_num(&self) -> u32 {
        self.month.month()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummary {
    pub name: &'static str,
    pub missing: usize,
    pub dtype: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub rows: usize,
    pub duplicate_rows: usize,
    pub columns: Vec<ColumnSummary>,
}

impl Summary {
    pub fn print(&self) {
        println!("{}", style("=== Dataset Summary ===").bold());
        println!("Rows: {}", self.rows);
        println!("\n{}", style("Missing values:").bold());
        for col in &self.columns {
            println!("{:<10} {:>6}", col.name, col.missing);
        }
        println!("\nDuplicate rows: {}", self.duplicate_rows);
        println!("\n{}", style("Column types:").bold());
        for col in &self.columns {
            println!("{:<10} {:>8}", col.name, col.dtype);
        }
        println!();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTable {
    rows: Vec<MonthRow>,
}

impl MonthlyTable {
    /// Reads `monthly_activity.csv`, validating the schema and sorting by month.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PulseError::malformed(path, "file not found"));
        }
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| PulseError::malformed(path, e.to_string()))?;

        let headers = reader
            .headers()
            .map_err(|e| PulseError::malformed(path, e.to_string()))?
            .clone();
        let mut index = [0usize; 5];
        for (slot, column) in index.iter_mut().zip(MONTHLY_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| PulseError::malformed(path, format!("missing column '{column}'")))?;
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| PulseError::malformed(path, e.to_string()))?;
            let line = record.position().map_or(0, |p| p.line());
            let cell = |i: usize| record.get(index[i]).unwrap_or("");

            let month = parse_month(cell(0)).ok_or_else(|| {
                PulseError::malformed(
                    path,
                    format!("line {line}: unparseable month '{}'", cell(0)),
                )
            })?;
            let count = |i: usize| -> Result<Option<u64>> {
                let raw = cell(i);
                if raw.is_empty() {
                    return Ok(None);
                }
                raw.parse().map(Some).map_err(|_| {
                    PulseError::malformed(
                        path,
                        format!("line {line}: invalid {} value '{raw}'", MONTHLY_COLUMNS[i]),
                    )
                })
            };

            rows.push(MonthRow {
                month,
                commits: count(1)?,
                additions: count(2)?,
                deletions: count(3)?,
                churn: count(4)?,
            });
        }

        Ok(Self::from_rows(rows))
    }

    pub fn from_rows(mut rows: Vec<MonthRow>) -> Self {
        rows.sort_by_key(|r| r.month);
        Self { rows }
    }

    pub fn rows(&self) -> &[MonthRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> Summary {
        let mut seen = HashSet::new();
        let duplicate_rows = self.rows.iter().filter(|r| !seen.insert(*r)).count();

        let counts: [fn(&MonthRow) -> Option<u64>; 4] = [
            |r| r.commits,
            |r| r.additions,
            |r| r.deletions,
            |r| r.churn,
        ];
        let mut columns = vec![ColumnSummary {
            name: MONTHLY_COLUMNS[0],
            missing: 0,
            dtype: "date",
        }];
        for (&name, get) in MONTHLY_COLUMNS[1..].iter().zip(counts) {
            let missing = self.rows.iter().filter(|r| get(r).is_none()).count();
            columns.push(ColumnSummary {
                name,
                missing,
                dtype: if missing == 0 { "integer" } else { "float" },
            });
        }

        Summary {
            rows: self.rows.len(),
            duplicate_rows,
            columns,
        }
    }
}
