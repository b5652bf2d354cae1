use resxsync::{
    Config, SkipReason, TranslationTable, discover_resource_files, sync::resolve_language,
};

/// Prints what a sync would work with, without touching any file.
pub fn run_inspect_command(config: &Config) -> Result<(), String> {
    let delimiter = config.delimiter_byte().map_err(|e| e.to_string())?;
    let table =
        TranslationTable::load_with_delimiter(&config.translations, &config.key_column, delimiter)
            .map_err(|e| e.to_string())?;

    println!("=== Translation table ===");
    println!("File: {}", config.translations.display());
    println!("Keys: {}", table.key_count());
    println!("Languages: {}", table.languages().len());
    for language in table.languages() {
        println!(
            "  {}: {}/{} translated",
            language,
            table.translated_count(language),
            table.key_count()
        );
    }
    if !table.duplicates().is_empty() {
        println!("Duplicate keys (last row wins):");
        for duplicate in table.duplicates() {
            println!(
                "  {} (lines {} and {})",
                duplicate.key, duplicate.first_line, duplicate.line
            );
        }
    }

    let files = discover_resource_files(&config.resources_dir, &config.pattern)
        .map_err(|e| e.to_string())?;
    println!();
    println!("=== Resource files ===");
    println!(
        "Directory: {} ({})",
        config.resources_dir.display(),
        config.pattern
    );
    if files.is_empty() {
        println!("  (none)");
    }
    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let (locale, language) = resolve_language(path, config);
        let language = language.and_then(|language| {
            match table.language(&language).filter(|map| !map.is_empty()) {
                Some(_) => Ok(language),
                None => Err(SkipReason::NoTranslations),
            }
        });
        match language {
            Ok(language) => println!(
                "  {}: {} -> {} ({} translated)",
                name,
                locale.as_deref().unwrap_or_default(),
                language,
                table.translated_count(&language)
            ),
            Err(reason) => println!("  {}: skipped ({})", name, reason.as_str()),
        }
    }

    Ok(())
}
