//! Run configuration.
//!
//! Every path, pattern and mapping the sync needs lives in [`Config`]. The defaults
//! describe the conventional layout: `translation_table.csv` next to a `Resources`
//! directory holding `SharedResource.<code>.resx` files. A TOML file can override
//! any of them.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{error::Error, locale::LocaleMap, table::DEFAULT_KEY_COLUMN};

/// File looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "resxsync.toml";

/// What to do when a single resource file cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Log a warning, record the file as failed and keep going.
    #[default]
    Continue,
    /// Abort the run at the first unparseable file.
    FailFast,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The translation table.
    pub translations: PathBuf,
    /// Header of the key column in the translation table.
    pub key_column: String,
    /// Field delimiter of the translation table. When unset, `.tsv` files are
    /// read tab-separated and everything else comma-separated.
    pub delimiter: Option<char>,
    /// Directory searched (non-recursively) for resource files.
    pub resources_dir: PathBuf,
    /// File name glob matched inside `resources_dir`.
    pub pattern: String,
    pub on_error: ErrorPolicy,
    pub locales: LocaleMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translations: PathBuf::from("translation_table.csv"),
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            delimiter: None,
            resources_dir: PathBuf::from("Resources"),
            pattern: "SharedResource.*.resx".to_string(),
            on_error: ErrorPolicy::default(),
            locales: LocaleMap::default(),
        }
    }
}

impl Config {
    /// Parses a configuration from TOML text. Missing fields keep their defaults.
    pub fn from_toml(s: &str) -> Result<Self, Error> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file. Relative paths inside it are resolved against
    /// the directory containing the file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::config_error(format!("cannot read `{}`: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml(&text)?;
        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.translations = base.join(&config.translations);
            config.resources_dir = base.join(&config.resources_dir);
        }
        Ok(config)
    }

    /// Loads `path` if given, else `resxsync.toml` in the working directory if it
    /// exists, else the defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// The delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8, Error> {
        let Some(delimiter) = self.delimiter else {
            let is_tsv = self
                .translations
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
            return Ok(if is_tsv { b'\t' } else { b',' });
        };
        u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                Error::config_error(format!(
                    "delimiter must be a single ASCII character, got `{}`",
                    delimiter
                ))
            })
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.delimiter_byte()?;
        if self.key_column.is_empty() {
            return Err(Error::config_error("key column name cannot be empty"));
        }
        if self.pattern.is_empty() {
            return Err(Error::config_error("file pattern cannot be empty"));
        }
        if self.pattern.contains('/') || self.pattern.contains('\\') {
            return Err(Error::config_error(
                "file pattern must match file names only; set `resources_dir` for the directory",
            ));
        }
        glob::Pattern::new(&self.pattern)?;
        Ok(())
    }
}
