//! Merging one language's translations into one resource document.

use std::{collections::HashMap, path::Path};

use serde::Serialize;
use tracing::{debug, trace};

use crate::{error::Error, formats::ResxFormat, traits::Parser};

/// One `<value>` that was rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryChange {
    pub key: String,
    pub previous: String,
    pub current: String,
}

/// Result of updating one resource file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FileUpdate {
    pub changes: Vec<EntryChange>,
    /// Whether the file was rewritten. Always `false` in dry-run mode.
    pub written: bool,
}

impl FileUpdate {
    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Applies `translations` to the entries of `document`.
///
/// Rules:
/// - Only entries with a non-empty key that is in `translations` are considered.
/// - Empty translations never overwrite anything.
/// - A value is replaced only when it differs from the current text.
/// - Entries are never added or removed, and entries without `<value>` are left alone.
pub fn apply_translations(
    document: &mut ResxFormat,
    translations: &HashMap<String, String>,
) -> Result<Vec<EntryChange>, Error> {
    let mut changes = Vec::new();

    for mut entry in document.entries_mut() {
        let Some(key) = entry.name().filter(|k| !k.is_empty()).map(str::to_string) else {
            continue;
        };
        let Some(new_value) = translations.get(&key).filter(|v| !v.is_empty()) else {
            continue;
        };
        let Some(previous) = entry.value()? else {
            trace!(key = %key, "entry has no <value> element");
            continue;
        };
        if &previous == new_value {
            continue;
        }

        entry.set_value(new_value);
        changes.push(EntryChange {
            key,
            previous,
            current: new_value.clone(),
        });
    }

    Ok(changes)
}

/// Updates the resource file at `path` in place.
///
/// The file is rewritten only when at least one value changed and `dry_run` is off.
/// Parse failures are reported as [`Error::Parse`], write failures as [`Error::Write`].
pub fn update_resource_file<P: AsRef<Path>>(
    path: P,
    translations: &HashMap<String, String>,
    dry_run: bool,
) -> Result<FileUpdate, Error> {
    let path = path.as_ref();
    let mut document = ResxFormat::read_from(path).map_err(|e| Error::parse(path, e))?;
    let changes = apply_translations(&mut document, translations).map_err(|e| Error::parse(path, e))?;

    for change in &changes {
        debug!(
            path = %path.display(),
            key = %change.key,
            previous = %change.previous,
            current = %change.current,
            "value changed"
        );
    }

    let written = !changes.is_empty() && !dry_run;
    if written {
        document.write_to(path).map_err(|e| Error::write(path, e))?;
    }

    Ok(FileUpdate { changes, written })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::fs;

    const DOCUMENT: &str = indoc! {r#"
        <?xml version="1.0" encoding="utf-8"?>
        <root>
          <data name="greeting" xml:space="preserve">
            <value>Hi</value>
          </data>
          <data name="farewell" xml:space="preserve">
            <value>Bye</value>
          </data>
          <data name="untranslated" xml:space="preserve">
            <value>Keep me</value>
          </data>
        </root>
    "#};

    fn translations(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_apply_changes_only_differing_values() {
        let mut document = ResxFormat::from_str(DOCUMENT).unwrap();
        let map = translations(&[("greeting", "Hallo"), ("farewell", "Bye")]);
        let changes = apply_translations(&mut document, &map).unwrap();
        assert_eq!(
            changes,
            vec![EntryChange {
                key: "greeting".to_string(),
                previous: "Hi".to_string(),
                current: "Hallo".to_string(),
            }]
        );
        assert_eq!(document.value("greeting").unwrap().as_deref(), Some("Hallo"));
        assert_eq!(document.value("farewell").unwrap().as_deref(), Some("Bye"));
        assert_eq!(
            document.value("untranslated").unwrap().as_deref(),
            Some("Keep me")
        );
    }

    #[test]
    fn test_empty_translation_never_overwrites() {
        let mut document = ResxFormat::from_str(DOCUMENT).unwrap();
        let map = translations(&[("greeting", ""), ("farewell", "")]);
        let changes = apply_translations(&mut document, &map).unwrap();
        assert!(changes.is_empty());
        assert_eq!(document.value("greeting").unwrap().as_deref(), Some("Hi"));
    }

    #[test]
    fn test_entries_without_value_are_not_created() {
        let mut document =
            ResxFormat::from_str(r#"<root><data name="a" type="System.Resources.ResXFileRef"/></root>"#)
                .unwrap();
        let changes = apply_translations(&mut document, &translations(&[("a", "x")])).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_commented_value_untouched_by_neighbour_update() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SharedResource.et.resx");
        let original = indoc! {r#"
            <root>
              <data name="a">
                <value>Hi<!-- keep --></value>
              </data>
              <data name="b">
                <value>x</value>
              </data>
            </root>
        "#};
        fs::write(&path, original).unwrap();
        let map = translations(&[("b", "y")]);

        assert!(update_resource_file(&path, &map, false).unwrap().written);
        let document = ResxFormat::read_from(&path).unwrap();
        assert_eq!(document.value("a").unwrap().as_deref(), Some("Hi"));

        let second = update_resource_file(&path, &map, false).unwrap();
        assert!(second.changes.is_empty());
    }

    #[test]
    fn test_entries_with_empty_name_are_ignored() {
        let mut document =
            ResxFormat::from_str(r#"<root><data name=""><value>keep</value></data></root>"#)
                .unwrap();
        let changes = apply_translations(&mut document, &translations(&[("", "x")])).unwrap();
        assert!(changes.is_empty());
        assert_eq!(document.value("").unwrap().as_deref(), Some("keep"));
    }

    #[test]
    fn test_crlf_document_matching_table_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SharedResource.de-DE.resx");
        let original = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\n<root>\r\n  <data name=\"multi\" xml:space=\"preserve\">\r\n    <value>line one\r\nline two</value>\r\n  </data>\r\n</root>\r\n";
        fs::write(&path, original).unwrap();

        let update =
            update_resource_file(&path, &translations(&[("multi", "line one\nline two")]), false)
                .unwrap();
        assert!(update.changes.is_empty());
        assert!(!update.written);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_duplicate_entries_each_considered() {
        let mut document = ResxFormat::from_str(
            r#"<root><data name="a"><value>1</value></data><data name="a"><value>2</value></data></root>"#,
        )
        .unwrap();
        let changes = apply_translations(&mut document, &translations(&[("a", "2")])).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].previous, "1");
    }

    #[test]
    fn test_update_file_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SharedResource.de-DE.resx");
        fs::write(&path, DOCUMENT).unwrap();
        let map = translations(&[("greeting", "Hallo")]);

        let first = update_resource_file(&path, &map, false).unwrap();
        assert!(first.is_dirty());
        assert!(first.written);
        let after_first = fs::read_to_string(&path).unwrap();
        assert_eq!(after_first, DOCUMENT.replace("<value>Hi</value>", "<value>Hallo</value>"));

        let second = update_resource_file(&path, &map, false).unwrap();
        assert!(!second.is_dirty());
        assert!(!second.written);
        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
    }

    #[test]
    fn test_clean_file_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SharedResource.ru.resx");
        // Tabs and a single-quoted declaration would be normalized by any rewrite.
        let original = "<?xml version='1.0'?>\n<root>\n\t<data name=\"a\"><value>A</value></data>\n</root>";
        fs::write(&path, original).unwrap();

        let update = update_resource_file(&path, &translations(&[("a", "A")]), false).unwrap();
        assert!(!update.written);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_dry_run_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SharedResource.de-DE.resx");
        fs::write(&path, DOCUMENT).unwrap();

        let update = update_resource_file(&path, &translations(&[("greeting", "Hallo")]), true).unwrap();
        assert!(update.is_dirty());
        assert!(!update.written);
        assert_eq!(fs::read_to_string(&path).unwrap(), DOCUMENT);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SharedResource.fr-FR.resx");
        fs::write(&path, "<root><data name=\"a\"><value>x</data>").unwrap();

        let err = update_resource_file(&path, &translations(&[("a", "y")]), false).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("SharedResource.fr-FR.resx"));
    }
}
