//! Merge disaster-response messages with their category labels, reshape the
//! labels into indicator columns and persist the result to SQLite.

pub mod data;
pub mod etl;
