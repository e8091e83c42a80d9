//! Shared CSV plumbing: header normalization and typed row iteration.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;

use crate::error::LoadError;

const BOM: char = '\u{feff}';

pub(crate) struct Table<R> {
    name: &'static str,
    reader: csv::Reader<R>,
    headers: StringRecord,
}

impl<R: Read> Table<R> {
    pub(crate) fn new(name: &'static str, source: R) -> Result<Self, LoadError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        let raw = reader
            .headers()
            .map_err(|source| LoadError::Csv { table: name, source })?
            .clone();
        let headers: StringRecord = raw
            .iter()
            .map(|h| h.trim_start_matches(BOM).trim().to_ascii_lowercase())
            .collect();
        reader.set_headers(headers.clone());

        Ok(Self {
            name,
            reader,
            headers,
        })
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn has(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub(crate) fn require(&self, columns: &[&'static str]) -> Result<(), LoadError> {
        match columns.iter().find(|c| !self.has(c)) {
            Some(column) => Err(LoadError::MissingColumn {
                table: self.name,
                column: *column,
            }),
            None => Ok(()),
        }
    }

    /// Deserialize every non-blank row into `T`, paired with its line number.
    pub(crate) fn rows<T: DeserializeOwned>(&mut self) -> Result<Vec<(u64, T)>, LoadError> {
        let name = self.name;
        let mut out = Vec::new();
        for result in self.reader.records() {
            let record = result.map_err(|source| LoadError::Csv {
                table: name,
                source,
            })?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line = record.position().map_or(0, |p| p.line());
            let row = record
                .deserialize::<T>(Some(&self.headers))
                .map_err(|e| LoadError::InvalidRow {
                    table: name,
                    line,
                    message: deserialize_message(&e),
                })?;
            out.push((line, row));
        }
        Ok(out)
    }

    pub(crate) fn invalid(&self, line: u64, message: impl Into<String>) -> LoadError {
        LoadError::InvalidRow {
            table: self.name,
            line,
            message: message.into(),
        }
    }

    pub(crate) fn duplicate(&self, line: u64, key: impl Into<String>) -> LoadError {
        LoadError::DuplicateKey {
            table: self.name,
            line,
            key: key.into(),
        }
    }
}

fn deserialize_message(e: &csv::Error) -> String {
    match e.kind() {
        csv::ErrorKind::Deserialize { err, .. } => match err.field() {
            Some(i) => format!("field {}: {}", i + 1, err.kind()),
            None => err.kind().to_string(),
        },
        _ => e.to_string(),
    }
}
