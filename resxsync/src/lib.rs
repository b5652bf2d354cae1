#![forbid(unsafe_code)]
//! Translation table to `.resx` synchronization toolkit.
//!
//! Reads a CSV table holding one row per string key and one column per language,
//! then pushes changed values into the matching per-language `.resx` files.
//! Resource files are only rewritten when at least one value actually changed.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use resxsync::{Config, SyncOptions, TranslationTable, sync_resources};
//!
//! let config = Config::default();
//! let table = TranslationTable::load(&config.translations, &config.key_column)?;
//! let report = sync_resources(&table, &config, &SyncOptions::default(), |file| {
//!     if file.outcome.is_updated() {
//!         println!("Updated {}", file.path.display());
//!     }
//! })?;
//! assert_eq!(report.failed, 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod formats;
pub mod locale;
pub mod sync;
pub mod table;
pub mod traits;
pub mod updater;

// Re-export most used types for easy consumption
pub use crate::{
    config::{Config, ErrorPolicy},
    error::Error,
    formats::ResxFormat,
    locale::{LocaleMap, locale_code_from_path},
    sync::{
        FileOutcome, FileReport, SkipReason, SyncOptions, SyncReport, discover_resource_files,
        sync_resources,
    },
    table::{DuplicateKey, TranslationTable},
    updater::{EntryChange, FileUpdate, apply_translations, update_resource_file},
};
