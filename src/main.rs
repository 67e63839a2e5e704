use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;

use disaster_etl::data::clean::CleanOptions;
use disaster_etl::data::store::DEFAULT_TABLE;
use disaster_etl::etl::{self, EtlConfig};

const USAGE: &str = "Please provide the filepaths of the messages and categories \
datasets as the first and second argument respectively, as \
well as the filepath of the database to save the cleaned data \
to as the third argument. \n\nExample: process-data \
disaster_messages.csv disaster_categories.csv \
DisasterResponse.db";

#[derive(Parser, Debug)]
#[command(
    name = "process-data",
    version,
    about = "Merge, clean and store disaster-response messages"
)]
struct Cli {
    /// Messages file (.csv, .json or .parquet) with an `id` column.
    messages_filepath: PathBuf,

    /// Categories file with `id` and `categories` columns.
    categories_filepath: PathBuf,

    /// SQLite database the cleaned table is written to.
    database_filepath: PathBuf,

    /// Destination table name.
    #[arg(long, default_value = DEFAULT_TABLE)]
    table: String,

    /// Treat category values above 1 as 1 instead of failing.
    #[arg(long)]
    binarize: bool,

    /// Log at debug level regardless of RUST_LOG.
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            println!("{USAGE}");
            return Ok(());
        }
    };

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let config = EtlConfig {
        table_name: cli.table,
        clean: CleanOptions {
            binarize: cli.binarize,
        },
        ..EtlConfig::new(
            cli.messages_filepath,
            cli.categories_filepath,
            cli.database_filepath,
        )
    };

    etl::run_with_progress(&config, |stage| println!("{stage}"))?;
    Ok(())
}
