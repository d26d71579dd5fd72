use std::path::{Path, PathBuf};

pub const DEFAULT_REPO: &str = "external/numpy";
pub const DEFAULT_DATA_CLEAN: &str = "data/clean";
pub const DEFAULT_PLOTS: &str = "plots";
pub const MONTHLY_CSV: &str = "monthly_activity.csv";

/// Filesystem locations shared by both stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub repo: PathBuf,
    pub data_clean: PathBuf,
    pub plots: PathBuf,
}

impl Paths {
    pub fn monthly_csv(&self) -> PathBuf {
        self.data_clean.join(MONTHLY_CSV)
    }

    pub fn plot(&self, file_name: &str) -> PathBuf {
        self.plots.join(file_name)
    }

    pub fn with_repo(mut self, repo: impl AsRef<Path>) -> Self {
        self.repo = repo.as_ref().to_path_buf();
        self
    }

    pub fn with_data_clean(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_clean = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_plots(mut self, dir: impl AsRef<Path>) -> Self {
        self.plots = dir.as_ref().to_path_buf();
        self
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            repo: PathBuf::from(DEFAULT_REPO),
            data_clean: PathBuf::from(DEFAULT_DATA_CLEAN),
            plots: PathBuf::from(DEFAULT_PLOTS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub dpi: u32,
}

impl RenderOptions {
    /// Converts inches to pixels at this resolution.
    pub fn pixels(&self, inches: f64) -> u32 {
        (inches * self.dpi as f64).round() as u32
    }

    /// Converts typographic points to pixels at this resolution.
    pub fn points(&self, pt: f64) -> f64 {
        pt * self.dpi as f64 / 72.0
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { dpi: 300 }
    }
}
