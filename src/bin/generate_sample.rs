use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::{Parser, ValueEnum};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const CATEGORIES: [&str; 10] = [
    "related",
    "request",
    "offer",
    "aid_related",
    "medical_help",
    "search_and_rescue",
    "water",
    "food",
    "shelter",
    "weather_related",
];

const GENRES: [&str; 3] = ["direct", "news", "social"];

const PHRASES: [&str; 6] = [
    "We need water and food in the camp",
    "Flooding reported near the river",
    "Is the hurricane over or still coming?",
    "Medical supplies requested at the clinic",
    "Families sleeping outside, need shelter",
    "Roads are blocked after the earthquake",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next_u64() % 100 < percent
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Parquet,
}

#[derive(Parser, Debug)]
#[command(
    name = "generate-sample",
    about = "Write synthetic disaster_messages / disaster_categories inputs"
)]
struct Cli {
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, default_value_t = 200)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, value_enum, default_value = "csv")]
    format: Format,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct MessageRow {
    id: i64,
    message: String,
    original: Option<String>,
    genre: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct CategoryRow {
    id: i64,
    categories: String,
}

fn generate(rows: usize, rng: &mut SimpleRng) -> (Vec<MessageRow>, Vec<CategoryRow>) {
    let mut messages = Vec::with_capacity(rows + 2);
    let mut categories = Vec::with_capacity(rows + 2);

    for i in 0..rows {
        let id = i as i64 + 2;
        let phrase = PHRASES[rng.below(PHRASES.len())];
        let original = rng.chance(40).then(|| format!("[orig] {phrase}"));
        messages.push(MessageRow {
            id,
            message: phrase.to_string(),
            original,
            genre: GENRES[rng.below(GENRES.len())].to_string(),
        });

        let flags: Vec<String> = CATEGORIES
            .iter()
            .map(|name| format!("{name}-{}", rng.chance(30) as u8))
            .collect();
        categories.push(CategoryRow {
            id,
            categories: flags.join(";"),
        });
    }

    // Exact duplicates on both sides, as found in the real exports.
    if let (Some(m), Some(c)) = (messages.first().cloned(), categories.first().cloned()) {
        messages.push(m);
        categories.push(c);
    }

    // One id without categories and one category row without a message.
    let next = rows as i64 + 2;
    messages.push(MessageRow {
        id: next,
        message: "Message without categories".to_string(),
        original: None,
        genre: "direct".to_string(),
    });
    categories.push(CategoryRow {
        id: next + 1,
        categories: CATEGORIES
            .iter()
            .map(|name| format!("{name}-0"))
            .collect::<Vec<_>>()
            .join(";"),
    });

    (messages, categories)
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, schema: Arc<Schema>, columns: Vec<ArrayRef>) -> Result<()> {
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn write_messages_parquet(path: &Path, rows: &[MessageRow]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("message", DataType::Utf8, false),
        Field::new("original", DataType::Utf8, true),
        Field::new("genre", DataType::Utf8, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.id))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.message.as_str()))),
        Arc::new(StringArray::from_iter(rows.iter().map(|r| r.original.as_deref()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.genre.as_str()))),
    ];
    write_parquet(path, schema, columns)
}

fn write_categories_parquet(path: &Path, rows: &[CategoryRow]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("categories", DataType::Utf8, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.id))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.categories.as_str()))),
    ];
    write_parquet(path, schema, columns)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut rng = SimpleRng::new(cli.seed);
    let (messages, categories) = generate(cli.rows, &mut rng);

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;

    let (messages_path, categories_path) = match cli.format {
        Format::Csv => {
            let m = cli.out_dir.join("disaster_messages.csv");
            let c = cli.out_dir.join("disaster_categories.csv");
            write_csv(&m, &messages)?;
            write_csv(&c, &categories)?;
            (m, c)
        }
        Format::Parquet => {
            let m = cli.out_dir.join("disaster_messages.parquet");
            let c = cli.out_dir.join("disaster_categories.parquet");
            write_messages_parquet(&m, &messages)?;
            write_categories_parquet(&c, &categories)?;
            (m, c)
        }
    };
    log::debug!("seed {} produced {} message rows", cli.seed, messages.len());

    println!(
        "Wrote {} messages to {} and {} category rows to {}",
        messages.len(),
        messages_path.display(),
        categories.len(),
        categories_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn duplicate_pairs<T: PartialEq>(rows: &[T]) -> usize {
        (0..rows.len())
            .flat_map(|i| (i + 1..rows.len()).map(move |j| (i, j)))
            .filter(|&(i, j)| rows[i] == rows[j])
            .count()
    }

    #[test]
    fn sample_has_one_duplicate_and_one_orphan_per_side() {
        let (messages, categories) = generate(50, &mut SimpleRng::new(7));
        assert_eq!(messages.len(), 52);
        assert_eq!(categories.len(), 52);
        assert_eq!(duplicate_pairs(&messages), 1);
        assert_eq!(duplicate_pairs(&categories), 1);

        let message_ids: HashSet<i64> = messages.iter().map(|m| m.id).collect();
        let category_ids: HashSet<i64> = categories.iter().map(|c| c.id).collect();
        assert_eq!(message_ids.difference(&category_ids).count(), 1);
        assert_eq!(category_ids.difference(&message_ids).count(), 1);
    }

    #[test]
    fn same_seed_gives_same_sample() {
        let first = generate(20, &mut SimpleRng::new(42));
        let second = generate(20, &mut SimpleRng::new(42));
        assert_eq!(first, second);

        let other = generate(20, &mut SimpleRng::new(43));
        assert_ne!(first, other);
    }
}
