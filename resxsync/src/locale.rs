//! Locale code → language mapping.
//!
//! Resource files carry a short locale code in their name (`SharedResource.de-DE.resx`),
//! while the translation table names its columns after languages (`German`). A [`LocaleMap`]
//! connects the two and is passed explicitly to the sync driver.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::error::Error;

const DEFAULT_LOCALES: [(&str, &str); 8] = [
    ("ru", "Russian"),
    ("en-US", "English"),
    ("de-DE", "German"),
    ("et", "Estonian"),
    ("fr-FR", "French"),
    ("pl-PL", "Polish"),
    ("tr-TR", "Turkish"),
    ("zh-CN", "ChineseSimplified"),
];

/// Immutable mapping from locale code to the language header used in the translation table.
///
/// Codes are matched exactly as they appear in file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct LocaleMap {
    codes: BTreeMap<String, String>,
}

impl Default for LocaleMap {
    fn default() -> Self {
        Self {
            codes: DEFAULT_LOCALES
                .iter()
                .map(|(code, language)| (code.to_string(), language.to_string()))
                .collect(),
        }
    }
}

impl LocaleMap {
    /// An empty mapping.
    pub fn empty() -> Self {
        Self {
            codes: BTreeMap::new(),
        }
    }

    /// Builds a mapping, validating every code as a BCP 47 identifier.
    pub fn new<I, C, L>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (C, L)>,
        C: Into<String>,
        L: Into<String>,
    {
        let mut map = Self::empty();
        for (code, language) in pairs {
            map = map.with(code, language)?;
        }
        Ok(map)
    }

    /// Returns a copy of this mapping with `code` (re)bound to `language`.
    pub fn with(
        mut self,
        code: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self, Error> {
        let code = code.into();
        let language = language.into();
        validate_code(&code)?;
        if language.is_empty() {
            return Err(Error::config_error(format!(
                "locale `{}` maps to an empty language name",
                code
            )));
        }
        self.codes.insert(code, language);
        Ok(self)
    }

    /// Language for a locale code, if known.
    pub fn language(&self, code: &str) -> Option<&str> {
        self.codes.get(code).map(String::as_str)
    }

    /// Pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.codes.iter().map(|(c, l)| (c.as_str(), l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for LocaleMap {
    type Error = Error;

    fn try_from(value: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        LocaleMap::new(value)
    }
}

impl From<LocaleMap> for BTreeMap<String, String> {
    fn from(value: LocaleMap) -> Self {
        value.codes
    }
}

/// Parses a `CODE=LANGUAGE` override, as given on the command line.
pub fn parse_locale_override(s: &str) -> Result<(String, String), Error> {
    let (code, language) = s.split_once('=').ok_or_else(|| {
        Error::config_error(format!("expected CODE=LANGUAGE, got `{}`", s))
    })?;
    let (code, language) = (code.trim(), language.trim());
    validate_code(code)?;
    Ok((code.to_string(), language.to_string()))
}

/// Extracts the locale code from a resource file name: the last dot-separated
/// segment of the file stem (`SharedResource.de-DE.resx` → `de-DE`).
///
/// Returns `None` when the stem has no dot, so `SharedResource.resx` has no code.
pub fn locale_code_from_path<P: AsRef<Path>>(path: P) -> Option<String> {
    let stem = path.as_ref().file_stem()?.to_str()?;
    let (_, code) = stem.rsplit_once('.')?;
    (!code.is_empty()).then(|| code.to_string())
}

fn validate_code(code: &str) -> Result<(), Error> {
    code.parse::<LanguageIdentifier>().map(|_| ()).map_err(|_| {
        Error::config_error(format!(
            "invalid locale code `{}`: expected a BCP 47 language identifier",
            code
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping() {
        let map = LocaleMap::default();
        assert_eq!(map.len(), 8);
        assert_eq!(map.language("de-DE"), Some("German"));
        assert_eq!(map.language("ru"), Some("Russian"));
        assert_eq!(map.language("zh-CN"), Some("ChineseSimplified"));
        assert_eq!(map.language("xx-XX"), None);
        // Codes are matched exactly.
        assert_eq!(map.language("de-de"), None);
    }

    #[test]
    fn test_with_overrides_and_extends() {
        let map = LocaleMap::default()
            .with("de-DE", "Deutsch")
            .unwrap()
            .with("es-ES", "Spanish")
            .unwrap();
        assert_eq!(map.language("de-DE"), Some("Deutsch"));
        assert_eq!(map.language("es-ES"), Some("Spanish"));
        assert_eq!(map.len(), 9);
    }

    #[test]
    fn test_invalid_code_rejected() {
        assert!(LocaleMap::empty().with("not a code!", "X").is_err());
        assert!(LocaleMap::empty().with("en-US", "").is_err());
    }

    #[test]
    fn test_parse_locale_override() {
        assert_eq!(
            parse_locale_override("es-ES=Spanish").unwrap(),
            ("es-ES".to_string(), "Spanish".to_string())
        );
        assert!(parse_locale_override("es-ES").is_err());
        assert!(parse_locale_override("??=Spanish").is_err());
    }

    #[test]
    fn test_locale_code_from_path() {
        assert_eq!(
            locale_code_from_path("Resources/SharedResource.de-DE.resx").as_deref(),
            Some("de-DE")
        );
        assert_eq!(
            locale_code_from_path("SharedResource.ru.resx").as_deref(),
            Some("ru")
        );
        assert_eq!(
            locale_code_from_path("Views.Home.Index.fr-FR.resx").as_deref(),
            Some("fr-FR")
        );
        assert_eq!(locale_code_from_path("SharedResource.resx"), None);
    }

    #[test]
    fn test_deserialize_validates_codes() {
        let ok: LocaleMap = toml::from_str("ru = \"Russian\"\n\"en-US\" = \"English\"\n").unwrap();
        assert_eq!(ok.language("en-US"), Some("English"));
        let bad: Result<LocaleMap, _> = toml::from_str("\"bad code\" = \"X\"\n");
        assert!(bad.is_err());
    }
}
