use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Table '{table}' row {row}: expected {expected} columns, found {found}")]
    Table {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Table '{0}' is empty")]
    EmptyTable(String),

    #[error("Invalid range {0}")]
    InvalidRange(String),

    #[error("Unknown group: {0} (expected AB or BA)")]
    UnknownGroup(String),

    #[error("Unknown language: {0} (expected jv or py)")]
    UnknownLanguage(String),

    #[error("Language sequence has {found} entries but there are {expected} tasks")]
    SequenceLength { expected: usize, found: usize },

    #[error("Task join error: {0}")]
    TaskJoin(String),
}

pub type Result<T> = std::result::Result<T, Error>;
