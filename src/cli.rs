//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use us_pls::DatafileType;
use us_pls::config::{DEFAULT_CACHE_DIR, DEFAULT_DATA_DIR};

/// Fetch and query the IMLS Public Libraries Survey.
///
/// Downloads one survey year's datafiles and codebook, extracts the
/// variable definitions, and serves the data with human-readable column
/// names.
#[derive(Parser, Debug)]
#[command(name = "us-pls")]
#[command(author, version, about)]
pub struct Args {
    /// Survey fiscal year to operate on
    #[arg(short, long)]
    pub year: u16,

    /// Directory for downloaded survey artifacts
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Directory for derived artifacts (extracted variable tables)
    #[arg(long, default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,

    /// Destroy and rebuild the derived cache
    #[arg(long)]
    pub overwrite_cache: bool,

    /// Re-scrape the listing page even if URLs are cached
    #[arg(long)]
    pub overwrite_cached_urls: bool,

    /// Keep the raw short-code column names
    #[arg(long)]
    pub no_rename: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download the year's datafiles and codebook
    Download,
    /// Print a dataset as CSV
    Stats {
        /// Which datafile to read
        #[arg(value_enum)]
        kind: KindArg,
        /// Columns to project (all columns when omitted)
        columns: Vec<String>,
    },
    /// Print the codebook documentation for a datafile's variables
    Docs {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Print the variable taxonomy as JSON
    Vars {
        #[arg(value_enum)]
        kind: KindArg,
        /// Include imputation-flag variables
        #[arg(long)]
        with_flags: bool,
    },
}

/// CLI-facing datafile selector.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum KindArg {
    System,
    State,
    Outlet,
}

impl From<KindArg> for DatafileType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::System => DatafileType::SystemData,
            KindArg::State => DatafileType::StateSummary,
            KindArg::Outlet => DatafileType::OutletData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_download_parses() {
        let args = Args::try_parse_from(["us-pls", "--year", "2018", "download"]).unwrap();
        assert_eq!(args.year, 2018);
        assert!(matches!(args.command, Command::Download));
        assert!(!args.no_rename);
        assert_eq!(args.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_cli_stats_with_columns() {
        let args = Args::try_parse_from([
            "us-pls", "--year", "2017", "stats", "state", "Name", "Population",
        ])
        .unwrap();
        let Command::Stats { kind, columns } = args.command else {
            panic!("expected stats subcommand");
        };
        assert!(matches!(kind, KindArg::State));
        assert_eq!(columns, vec!["Name", "Population"]);
    }

    #[test]
    fn test_cli_kind_maps_to_datafile_type() {
        assert_eq!(
            DatafileType::from(KindArg::System),
            DatafileType::SystemData
        );
        assert_eq!(DatafileType::from(KindArg::Outlet), DatafileType::OutletData);
    }

    #[test]
    fn test_cli_year_is_required() {
        let result = Args::try_parse_from(["us-pls", "download"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["us-pls", "--year", "2018", "-vv", "download"]).unwrap();
        assert_eq!(args.verbose, 2);
    }
}
