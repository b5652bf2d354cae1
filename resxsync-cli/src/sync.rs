use std::path::{Path, PathBuf};

use resxsync::{
    Config, FileOutcome, FileReport, SyncOptions as LibSyncOptions, SyncReport, TranslationTable,
    discover_resource_files, sync_resources,
};
use serde_json::json;
use tracing::info;

use crate::validation::validate_output_path;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub config: Config,
    pub report_json: Option<PathBuf>,
    pub dry_run: bool,
}

fn print_file(file: &FileReport) {
    let FileOutcome::Updated { changes, written } = &file.outcome else {
        return;
    };
    if *written {
        println!("Updated {}", file.path.display());
    } else {
        println!("Would update {}", file.path.display());
        for change in changes {
            println!("  {}: '{}' -> '{}'", change.key, change.previous, change.current);
        }
    }
}

fn write_report(
    path: &Path,
    opts: &SyncOptions,
    table: &TranslationTable,
    report: &SyncReport,
    error: Option<&str>,
) -> Result<(), String> {
    let payload = json!({
        "translations": opts.config.translations,
        "resources_dir": opts.config.resources_dir,
        "pattern": opts.config.pattern,
        "on_error": opts.config.on_error,
        "dry_run": opts.dry_run,
        "summary": {
            "discovered": report.discovered,
            "updated": report.updated,
            "unchanged": report.unchanged,
            "skipped": report.skipped,
            "failed": report.failed,
            "changed_entries": report.changed_entries
        },
        "duplicate_keys": table.duplicates(),
        "files": report.files,
        "error": error
    });

    let text = serde_json::to_string_pretty(&payload)
        .map_err(|e| format!("Failed to serialize report JSON: {}", e))?;
    std::fs::write(path, text)
        .map_err(|e| format!("Failed to write report JSON '{}': {}", path.display(), e))
}

pub fn run_sync_command(opts: SyncOptions) -> Result<(), String> {
    if let Some(report_path) = &opts.report_json {
        validate_output_path(report_path)?;
    }

    let config = &opts.config;
    let delimiter = config.delimiter_byte().map_err(|e| e.to_string())?;
    let table =
        TranslationTable::load_with_delimiter(&config.translations, &config.key_column, delimiter)
            .map_err(|e| e.to_string())?;
    info!(
        languages = table.languages().len(),
        keys = table.key_count(),
        "loaded translation table"
    );

    // Outcomes seen so far, reported if the run stops early.
    let mut processed = SyncReport::default();
    let result = sync_resources(
        &table,
        config,
        &LibSyncOptions {
            dry_run: opts.dry_run,
        },
        |file| {
            print_file(file);
            processed.record(file.clone());
        },
    );
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            let message = e.to_string();
            if let Some(report_path) = &opts.report_json {
                processed.discovered =
                    discover_resource_files(&config.resources_dir, &config.pattern)
                        .map_or(processed.files.len(), |files| files.len());
                write_report(report_path, &opts, &table, &processed, Some(&message))?;
            }
            return Err(message);
        }
    };

    info!(
        discovered = report.discovered,
        updated = report.updated,
        unchanged = report.unchanged,
        skipped = report.skipped,
        failed = report.failed,
        "sync finished"
    );

    if let Some(report_path) = &opts.report_json {
        write_report(report_path, &opts, &table, &report, None)?;
    }

    if report.failed > 0 {
        return Err(format!("{} resource file(s) could not be parsed", report.failed));
    }
    Ok(())
}
