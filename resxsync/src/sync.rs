//! The sync run: discover resource files, map their locale codes and update each one.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::{Config, ErrorPolicy},
    error::Error,
    locale::locale_code_from_path,
    table::TranslationTable,
    updater::{EntryChange, update_resource_file},
};

/// Options that change what a run does, as opposed to where it looks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncOptions {
    /// Compute changes without writing any file.
    pub dry_run: bool,
}

/// Why a discovered file was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The file name carries no `.<code>` segment.
    NoLocaleCode,
    /// The locale code is not in the locale map.
    UnknownLocale,
    /// The translation table has no entries for the mapped language.
    NoTranslations,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NoLocaleCode => "no locale code in file name",
            SkipReason::UnknownLocale => "unknown locale code",
            SkipReason::NoTranslations => "no translations for language",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// At least one value changed. `written` is `false` in dry-run mode.
    Updated {
        changes: Vec<EntryChange>,
        written: bool,
    },
    Unchanged,
    Skipped {
        reason: SkipReason,
    },
    /// The file could not be parsed and the error policy allowed the run to go on.
    Failed {
        error: String,
    },
}

impl FileOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, FileOutcome::Updated { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Totals and per-file outcomes of one run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SyncReport {
    pub discovered: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub changed_entries: usize,
    pub files: Vec<FileReport>,
}

impl SyncReport {
    /// Adds one file outcome to the counters.
    pub fn record(&mut self, file: FileReport) {
        match &file.outcome {
            FileOutcome::Updated { changes, .. } => {
                self.updated += 1;
                self.changed_entries += changes.len();
            }
            FileOutcome::Unchanged => self.unchanged += 1,
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
        }
        self.files.push(file);
    }
}

/// Files in `dir` whose name matches `pattern`, sorted by path.
///
/// A missing directory yields no files.
pub fn discover_resource_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, Error> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "resource directory does not exist");
        return Ok(Vec::new());
    }

    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = Path::new(&escaped_dir).join(pattern);

    let mut files = Vec::new();
    for entry in glob::glob(&full_pattern.to_string_lossy())? {
        let path = entry.map_err(|e| Error::Io(e.into()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Locale code and mapped language of a resource file, or why it is skipped.
pub fn resolve_language(
    path: &Path,
    config: &Config,
) -> (Option<String>, Result<String, SkipReason>) {
    let Some(code) = locale_code_from_path(path) else {
        return (None, Err(SkipReason::NoLocaleCode));
    };
    let language = config
        .locales
        .language(&code)
        .map(str::to_string)
        .ok_or(SkipReason::UnknownLocale);
    (Some(code), language)
}

/// Runs the sync over every resource file described by `config`.
///
/// Files are processed one at a time in path order and `on_file` sees each outcome as
/// soon as it is known. Under [`ErrorPolicy::FailFast`] the first parse error aborts the
/// run; otherwise it is recorded as [`FileOutcome::Failed`]. Write errors always abort.
pub fn sync_resources<F>(
    table: &TranslationTable,
    config: &Config,
    options: &SyncOptions,
    mut on_file: F,
) -> Result<SyncReport, Error>
where
    F: FnMut(&FileReport),
{
    let files = discover_resource_files(&config.resources_dir, &config.pattern)?;
    let mut report = SyncReport {
        discovered: files.len(),
        ..SyncReport::default()
    };

    for path in files {
        let (locale, language) = resolve_language(&path, config);
        let outcome = match &language {
            Err(reason) => FileOutcome::Skipped { reason: *reason },
            Ok(language) => match table.language(language).filter(|map| !map.is_empty()) {
                None => FileOutcome::Skipped {
                    reason: SkipReason::NoTranslations,
                },
                Some(translations) => {
                    match update_resource_file(&path, translations, options.dry_run) {
                        Ok(update) if update.is_dirty() => FileOutcome::Updated {
                            changes: update.changes,
                            written: update.written,
                        },
                        Ok(_) => FileOutcome::Unchanged,
                        Err(e) if e.is_parse() && config.on_error == ErrorPolicy::Continue => {
                            warn!(error = %e, "skipping resource file");
                            FileOutcome::Failed {
                                error: e.to_string(),
                            }
                        }
                        Err(e) => return Err(e),
                    }
                }
            },
        };

        match &outcome {
            FileOutcome::Skipped { reason } => {
                debug!(path = %path.display(), reason = reason.as_str(), "skipped")
            }
            FileOutcome::Updated { changes, written } => info!(
                path = %path.display(),
                changes = changes.len(),
                written,
                "updated"
            ),
            FileOutcome::Unchanged => debug!(path = %path.display(), "unchanged"),
            FileOutcome::Failed { .. } => {}
        }

        let file = FileReport {
            path,
            locale,
            language: language.ok(),
            outcome,
        };
        on_file(&file);
        report.record(file);
    }

    Ok(report)
}
