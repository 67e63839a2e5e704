use std::path::Path;

use disaster_etl::data::clean::CleanOptions;
use disaster_etl::etl::{self, EtlConfig, Stage};
use rusqlite::Connection;

const MESSAGES: &str = "\
id,message,original,genre
2,Weather update - a cold front from Cuba,Un front froid se retrouve sur Cuba,direct
7,Is the Hurricane over or is it not over,Cyclone nan fini osinon li pa fini,direct
8,Looking for someone but no name,,social
8,Looking for someone but no name,,social
12,UN reports Leogane 80-90 destroyed,,news
99,No categories for this one,,news
";

const CATEGORIES: &str = "\
id,categories
2,related-1;request-0;water-0;food-0
7,related-1;request-0;water-1;food-0
8,related-1;request-1;water-0;food-1
12,related-1;request-0;water-0;food-1
404,related-0;request-0;water-0;food-0
";

fn write_inputs(dir: &Path) -> EtlConfig {
    let messages = dir.join("disaster_messages.csv");
    let categories = dir.join("disaster_categories.csv");
    std::fs::write(&messages, MESSAGES).unwrap();
    std::fs::write(&categories, CATEGORIES).unwrap();
    EtlConfig::new(messages, categories, dir.join("DisasterResponse.db"))
}

fn query_ints(conn: &Connection, sql: &str) -> Vec<i64> {
    conn.prepare(sql)
        .unwrap()
        .query_map([], |r| r.get(0))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap()
}

#[test]
fn pipeline_writes_clean_table() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_inputs(temp.path());

    let written = etl::run(&config).unwrap();
    assert_eq!(written, 4);

    let conn = Connection::open(&config.database_path).unwrap();
    let columns: Vec<String> = conn
        .prepare("SELECT name FROM pragma_table_info('dftab')")
        .unwrap()
        .query_map([], |r| r.get(0))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();
    assert_eq!(
        columns,
        vec![
            "id", "message", "original", "related", "request", "water", "food", "direct",
            "news", "social"
        ]
    );

    assert_eq!(query_ints(&conn, "SELECT id FROM dftab ORDER BY rowid"), vec![2, 7, 8, 12]);
    assert_eq!(query_ints(&conn, "SELECT water FROM dftab ORDER BY rowid"), vec![0, 1, 0, 0]);
    assert_eq!(
        query_ints(&conn, "SELECT direct + news + social FROM dftab"),
        vec![1, 1, 1, 1]
    );
    assert_eq!(
        query_ints(
            &conn,
            "SELECT COUNT(*) FROM dftab WHERE related NOT IN (0, 1) \
             OR request NOT IN (0, 1) OR water NOT IN (0, 1) OR food NOT IN (0, 1)"
        ),
        vec![0]
    );
}

#[test]
fn rerun_overwrites_instead_of_appending() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_inputs(temp.path());

    etl::run(&config).unwrap();
    etl::run(&config).unwrap();

    let conn = Connection::open(&config.database_path).unwrap();
    assert_eq!(query_ints(&conn, "SELECT COUNT(*) FROM dftab"), vec![4]);
}

#[test]
fn single_message_example() {
    let temp = tempfile::tempdir().unwrap();
    let messages = temp.path().join("m.csv");
    let categories = temp.path().join("c.csv");
    std::fs::write(&messages, "id,message,genre\n1,Help,direct\n").unwrap();
    std::fs::write(&categories, "id,categories\n1,food-1;water-0\n").unwrap();

    let merged = etl::load_data(&messages, &categories).unwrap();
    let cleaned = etl::clean_data(merged, CleanOptions::default()).unwrap();

    assert_eq!(cleaned.columns, vec!["id", "message", "food", "water", "direct"]);
    assert_eq!(cleaned.len(), 1);
    let food = cleaned.column_index("food").unwrap();
    let water = cleaned.column_index("water").unwrap();
    assert_eq!(cleaned.rows[0][food].as_i64(), Some(1));
    assert_eq!(cleaned.rows[0][water].as_i64(), Some(0));
}

#[test]
fn malformed_categories_fail_before_saving() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_inputs(temp.path());
    std::fs::write(&config.categories_path, "id,categories\n2,related;request-0\n").unwrap();

    let err = etl::run(&config).unwrap_err();
    assert!(format!("{err:#}").contains("malformed category 'related'"));
    assert!(!config.database_path.exists());
}

#[test]
fn custom_table_name_and_binarize() {
    let temp = tempfile::tempdir().unwrap();
    let mut config = write_inputs(temp.path());
    std::fs::write(
        &config.categories_path,
        "id,categories\n2,related-2;food-0\n7,related-1;food-1\n",
    )
    .unwrap();

    assert!(etl::run(&config).is_err());

    config.table_name = "messages_clean".to_string();
    config.clean = CleanOptions { binarize: true };
    assert_eq!(etl::run(&config).unwrap(), 2);

    let conn = Connection::open(&config.database_path).unwrap();
    assert_eq!(
        query_ints(&conn, "SELECT related FROM messages_clean ORDER BY rowid"),
        vec![1, 1]
    );
}

#[test]
fn missing_input_file_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let config = EtlConfig::new(
        temp.path().join("nope.csv"),
        temp.path().join("nope_either.csv"),
        temp.path().join("out.db"),
    );
    assert!(etl::run(&config).is_err());
}

#[test]
fn progress_stages_are_reported_in_order() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_inputs(temp.path());

    let mut stages = Vec::new();
    let written = etl::run_with_progress(&config, |stage| stages.push(stage.clone())).unwrap();
    assert_eq!(written, 4);
    assert_eq!(
        stages,
        vec![
            Stage::Loading {
                messages: config.messages_path.clone(),
                categories: config.categories_path.clone(),
            },
            Stage::Cleaning,
            Stage::Saving {
                database: config.database_path.clone(),
            },
            Stage::Saved,
        ]
    );
    assert_eq!(stages[1].to_string(), "Cleaning data...");
    assert_eq!(stages[3].to_string(), "Cleaned data saved to database!");
}

#[test]
fn numeric_looking_text_is_stored_verbatim() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_inputs(temp.path());
    std::fs::write(
        &config.messages_path,
        "id,message,original,genre\n\
         2,Help,hola,direct\n\
         7,007,NaN,direct\n\
         8,1.50,true,social\n\
         12,inf,Infinity,news\n",
    )
    .unwrap();

    etl::run(&config).unwrap();

    let conn = Connection::open(&config.database_path).unwrap();
    let rows: Vec<(String, Option<String>)> = conn
        .prepare("SELECT message, original FROM dftab ORDER BY rowid")
        .unwrap()
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();
    assert_eq!(
        rows,
        vec![
            ("Help".to_string(), Some("hola".to_string())),
            ("007".to_string(), Some("NaN".to_string())),
            ("1.50".to_string(), Some("true".to_string())),
            ("inf".to_string(), Some("Infinity".to_string())),
        ]
    );
}
