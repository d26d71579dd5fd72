use crate::config::{Paths, DEFAULT_DATA_CLEAN, DEFAULT_PLOTS, DEFAULT_REPO};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gcadence")]
#[command(about = "Monthly commit activity extraction and charting for git repositories")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk the repository history and write the monthly activity table
    Extract {
        #[arg(long, help = "Path to git repository", default_value = DEFAULT_REPO)]
        repo: PathBuf,

        #[arg(long, help = "Directory for monthly_activity.csv", default_value = DEFAULT_DATA_CLEAN)]
        data_dir: PathBuf,
    },
    /// Render charts from the monthly activity table
    Plot {
        #[arg(long, help = "Directory holding monthly_activity.csv", default_value = DEFAULT_DATA_CLEAN)]
        data_dir: PathBuf,

        #[arg(long, help = "Directory for rendered charts", default_value = DEFAULT_PLOTS)]
        plots_dir: PathBuf,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Extract { repo, data_dir } => {
                let paths = Paths::default().with_repo(repo).with_data_clean(data_dir);
                crate::extract::exec(&paths)
            }
            Commands::Plot { data_dir, plots_dir } => {
                let paths = Paths::default().with_data_clean(data_dir).with_plots(plots_dir);
                crate::plot::exec(&paths)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn subcommands_default_to_fixed_paths() {
        let cli = Cli::try_parse_from(["gcadence", "extract"]).unwrap();
        match cli.command {
            Commands::Extract { repo, data_dir } => {
                assert_eq!(repo, PathBuf::from(DEFAULT_REPO));
                assert_eq!(data_dir, PathBuf::from(DEFAULT_DATA_CLEAN));
            }
            Commands::Plot { .. } => panic!("expected extract"),
        }
    }
}
