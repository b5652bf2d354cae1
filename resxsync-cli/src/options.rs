use std::path::PathBuf;

use clap::Args;
use resxsync::{Config, ErrorPolicy, locale::parse_locale_override};

use crate::validation::validate_file_path;

/// Where the translation table and resource files come from.
///
/// Values given here override the config file, which overrides the defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Config file (defaults to ./resxsync.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Translation table (CSV or TSV)
    #[arg(short, long)]
    pub translations: Option<PathBuf>,

    /// Directory containing the .resx files
    #[arg(short, long)]
    pub resources: Option<PathBuf>,

    /// File name glob for resource files, e.g. "SharedResource.*.resx"
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Header of the key column in the translation table
    #[arg(long)]
    pub key_column: Option<String>,

    /// Field delimiter of the translation table (a single character, or "tab")
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<char>,

    /// Map a locale code to a table language, e.g. --locale es-ES=Spanish (repeatable)
    #[arg(long = "locale", value_name = "CODE=LANGUAGE")]
    pub locales: Vec<String>,

    /// Abort at the first resource file that cannot be parsed
    #[arg(long)]
    pub fail_fast: bool,
}

impl SourceArgs {
    /// Builds the effective configuration for this invocation.
    pub fn resolve(&self) -> Result<Config, String> {
        if let Some(path) = &self.config {
            validate_file_path(path)?;
        }
        let mut config = Config::discover(self.config.as_deref()).map_err(|e| e.to_string())?;

        if let Some(translations) = &self.translations {
            config.translations = translations.clone();
        }
        if let Some(resources) = &self.resources {
            config.resources_dir = resources.clone();
        }
        if let Some(pattern) = &self.pattern {
            config.pattern = pattern.clone();
        }
        if let Some(key_column) = &self.key_column {
            config.key_column = key_column.clone();
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = Some(delimiter);
        }
        if self.fail_fast {
            config.on_error = ErrorPolicy::FailFast;
        }
        for entry in &self.locales {
            let (code, language) = parse_locale_override(entry).map_err(|e| e.to_string())?;
            config.locales = config
                .locales
                .with(code, language)
                .map_err(|e| e.to_string())?;
        }

        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

/// Parses a `--delimiter` value.
pub fn parse_delimiter(s: &str) -> Result<char, String> {
    match s {
        "tab" | "\\t" => Ok('\t'),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c),
                _ => Err(format!(
                    "Delimiter must be a single ASCII character or 'tab', got '{}'",
                    s
                )),
            }
        }
    }
}
