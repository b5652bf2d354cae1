//! Support for the CSV translation table.
//!
//! The header row names the key column (`Key` by default) and one column per language.
//! Every data row then supplies, for each language column, the translation of that row's key.
//! Empty cells are kept in the table; the updater treats them as "no translation available".
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, Read},
    path::Path,
};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Error;

/// Default header of the key column.
pub const DEFAULT_KEY_COLUMN: &str = "Key";

/// A key that appeared on more than one data row. The later row wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub key: String,
    /// 1-based line of the row that first defined the key.
    pub first_line: u64,
    /// 1-based line of the row that overwrote it.
    pub line: u64,
}

/// Language name → (string key → translated text).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    languages: Vec<String>,
    translations: HashMap<String, HashMap<String, String>>,
    key_count: usize,
    duplicates: Vec<DuplicateKey>,
}

impl TranslationTable {
    /// Loads a comma-separated table from `path`.
    pub fn load<P: AsRef<Path>>(path: P, key_column: &str) -> Result<Self, Error> {
        Self::load_with_delimiter(path, key_column, b',')
    }

    /// Loads a table from `path` with an explicit field delimiter.
    ///
    /// A UTF-8 or UTF-16 byte-order mark is honored; input without one is read as UTF-8.
    pub fn load_with_delimiter<P: AsRef<Path>>(
        path: P,
        key_column: &str,
        delimiter: u8,
    ) -> Result<Self, Error> {
        let path = path.as_ref();
        let load = || -> Result<Self, Error> {
            let file = File::open(path)?;
            let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
                .bom_override(true)
                .strip_bom(true)
                .build(file);
            let mut decoded = Vec::new();
            decoder.read_to_end(&mut decoded)?;
            Self::from_reader(decoded.as_slice(), key_column, delimiter)
        };
        let table = load().map_err(|e| Error::read(path, e))?;
        debug!(
            path = %path.display(),
            languages = table.languages.len(),
            keys = table.key_count,
            "loaded translation table"
        );
        Ok(table)
    }

    /// Parses a table from any reader.
    pub fn from_reader<R: BufRead>(
        reader: R,
        key_column: &str,
        delimiter: u8,
    ) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if headers.is_empty() {
            return Err(Error::InvalidTable("missing header row".to_string()));
        }
        let key_index = headers
            .iter()
            .position(|h| h == key_column)
            .ok_or_else(|| {
                Error::InvalidTable(format!("header has no `{}` column", key_column))
            })?;

        let columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != key_index)
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let mut table = TranslationTable {
            languages: columns.iter().map(|(_, lang)| lang.clone()).collect(),
            ..TranslationTable::default()
        };
        for lang in &table.languages {
            table.translations.entry(lang.clone()).or_default();
        }

        let mut first_seen: HashMap<String, u64> = HashMap::new();
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            let Some(key) = record.get(key_index) else {
                // Rows too short to carry a key have nothing to contribute.
                continue;
            };

            match first_seen.get(key) {
                Some(&first_line) => {
                    warn!(key, first_line, line, "duplicate key in translation table, later row wins");
                    table.duplicates.push(DuplicateKey {
                        key: key.to_string(),
                        first_line,
                        line,
                    });
                }
                None => {
                    first_seen.insert(key.to_string(), line);
                }
            }

            for (index, lang) in &columns {
                if let Some(value) = record.get(*index) {
                    table
                        .translations
                        .entry(lang.clone())
                        .or_default()
                        .insert(key.to_string(), value.to_string());
                }
            }
        }
        table.key_count = first_seen.len();

        Ok(table)
    }

    /// Parses a comma-separated table from a string.
    pub fn from_str(s: &str, key_column: &str) -> Result<Self, Error> {
        Self::from_reader(s.as_bytes(), key_column, b',')
    }

    /// Language columns in header order.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// The key → value map of one language, if the table has that column.
    pub fn language(&self, language: &str) -> Option<&HashMap<String, String>> {
        self.translations.get(language)
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.key_count
    }

    /// Number of non-empty translations for `language`.
    pub fn translated_count(&self, language: &str) -> usize {
        self.language(language)
            .map_or(0, |map| map.values().filter(|v| !v.is_empty()).count())
    }

    /// Keys that were defined more than once, in file order.
    pub fn duplicates(&self) -> &[DuplicateKey] {
        &self.duplicates
    }
}
