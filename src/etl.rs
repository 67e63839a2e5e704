use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::clean::{self, CleanOptions};
use crate::data::join::inner_join;
use crate::data::loader::load_file;
use crate::data::model::Table;
use crate::data::store::{self, DEFAULT_TABLE};

/// Column shared by the messages and categories files.
pub const ID_COLUMN: &str = "id";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Everything one pipeline run needs.
#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub messages_path: PathBuf,
    pub categories_path: PathBuf,
    pub database_path: PathBuf,
    /// Destination table, replaced on every run.
    pub table_name: String,
    pub clean: CleanOptions,
}

impl EtlConfig {
    pub fn new(
        messages_path: impl Into<PathBuf>,
        categories_path: impl Into<PathBuf>,
        database_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            messages_path: messages_path.into(),
            categories_path: categories_path.into(),
            database_path: database_path.into(),
            table_name: DEFAULT_TABLE.to_string(),
            clean: CleanOptions::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Load both inputs and inner-join them on `id`.
pub fn load_data(messages_path: &Path, categories_path: &Path) -> Result<Table> {
    let messages = load_file(messages_path)?;
    let categories = load_file(categories_path)?;
    let merged = inner_join(&messages, &categories, ID_COLUMN).with_context(|| {
        format!(
            "merging {} with {}",
            messages_path.display(),
            categories_path.display()
        )
    })?;
    log::info!(
        "merged {} messages with {} category rows into {} rows",
        messages.len(),
        categories.len(),
        merged.len()
    );
    Ok(merged)
}

/// Split categories, drop duplicate rows and one-hot encode genre.
pub fn clean_data(mut table: Table, options: CleanOptions) -> Result<Table> {
    clean::clean(&mut table, options).context("cleaning merged table")?;
    log::info!(
        "cleaned table has {} rows x {} columns",
        table.len(),
        table.width()
    );
    Ok(table)
}

/// Persist the cleaned table, replacing `table_name` if it already exists.
pub fn save_data(table: &Table, database_path: &Path, table_name: &str) -> Result<usize> {
    store::save_table(table, database_path, table_name)
}

/// Progress points reported by [`run_with_progress`].
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Loading {
        messages: PathBuf,
        categories: PathBuf,
    },
    Cleaning,
    Saving {
        database: PathBuf,
    },
    Saved,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Loading {
                messages,
                categories,
            } => write!(
                f,
                "Loading data...\n    MESSAGES: {}\n    CATEGORIES: {}",
                messages.display(),
                categories.display()
            ),
            Stage::Cleaning => write!(f, "Cleaning data..."),
            Stage::Saving { database } => {
                write!(f, "Saving data...\n    DATABASE: {}", database.display())
            }
            Stage::Saved => write!(f, "Cleaned data saved to database!"),
        }
    }
}

/// Run load → clean → save. Returns the number of rows stored.
pub fn run(config: &EtlConfig) -> Result<usize> {
    run_with_progress(config, |_| {})
}

/// Same as [`run`], calling `on_stage` before each stage and once the
/// table is saved.
pub fn run_with_progress(config: &EtlConfig, mut on_stage: impl FnMut(&Stage)) -> Result<usize> {
    on_stage(&Stage::Loading {
        messages: config.messages_path.clone(),
        categories: config.categories_path.clone(),
    });
    let merged = load_data(&config.messages_path, &config.categories_path)?;

    on_stage(&Stage::Cleaning);
    let cleaned = clean_data(merged, config.clean)?;

    on_stage(&Stage::Saving {
        database: config.database_path.clone(),
    });
    let written = save_data(&cleaned, &config.database_path, &config.table_name)?;

    on_stage(&Stage::Saved);
    Ok(written)
}
