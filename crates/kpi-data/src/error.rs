use std::path::PathBuf;

/// Loader failures. `line` is the 1-based line in the source file (the
/// header is line 1).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{table}: cannot open '{}': {source}", path.display())]
    Open {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{table}: missing required column '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("{table} line {line}: {message}")]
    InvalidRow {
        table: &'static str,
        line: u64,
        message: String,
    },

    #[error("{table} line {line}: duplicate key '{key}'")]
    DuplicateKey {
        table: &'static str,
        line: u64,
        key: String,
    },

    #[error("{table}: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },
}

impl LoadError {
    /// Source line the error points at, when it points at one.
    pub fn line(&self) -> Option<u64> {
        match self {
            LoadError::InvalidRow { line, .. } | LoadError::DuplicateKey { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            LoadError::Open { table, .. }
            | LoadError::MissingColumn { table, .. }
            | LoadError::InvalidRow { table, .. }
            | LoadError::DuplicateKey { table, .. }
            | LoadError::Csv { table, .. } => table,
        }
    }
}
