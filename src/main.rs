//! CLI entry point for the survey tool.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use us_pls::{Config, DatafileType, PublicLibrariesSurvey};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let config = Config::new(args.year)
        .with_data_dir(&args.data_dir)
        .with_cache_dir(&args.cache_dir)
        .overwrite_cache(args.overwrite_cache)
        .overwrite_cached_urls(args.overwrite_cached_urls)
        .rename_columns(!args.no_rename);

    let client = PublicLibrariesSurvey::new(config)?;

    match args.command {
        Command::Download => {
            client.init().await?;
        }
        Command::Stats { kind, columns } => {
            client.init().await?;
            let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
            let table = client.get_stats(kind.into(), &columns)?;
            print!("{table}");
        }
        Command::Docs { kind } => {
            client.init().await?;
            print!("{}", client.read_docs(kind.into())?);
        }
        Command::Vars { kind, with_flags } => {
            client.init().await?;
            let kind: DatafileType = kind.into();
            match client.variables_for(kind)? {
                Some(variables) => {
                    let dict = variables.reorient().to_dict(with_flags);
                    println!("{}", serde_json::to_string_pretty(&dict)?);
                }
                None => println!("no variables are available for {kind}"),
            }
        }
    }

    Ok(())
}
