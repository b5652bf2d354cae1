use proptest::prelude::*;
use resxsync::{ResxFormat, apply_translations, traits::Parser};
use std::collections::{BTreeMap, HashMap};

fn key_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{0,11}").expect("valid key regex")
}

fn value_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 &<>\"',.!?]{0,16}").expect("valid value regex")
}

/// Current values of a resource file, plus translations that hit some of its keys,
/// some keys it does not have, and some empty cells.
fn dataset_strategy()
-> impl Strategy<Value = (BTreeMap<String, String>, HashMap<String, String>)> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 0..10).prop_flat_map(
        |current| {
            let keys: Vec<String> = current.keys().cloned().collect();
            let known = if keys.is_empty() {
                Just(Vec::new()).boxed()
            } else {
                prop::collection::vec(
                    (prop::sample::select(keys), value_strategy()),
                    0..10,
                )
                .boxed()
            };
            let unknown = prop::collection::vec((key_strategy(), value_strategy()), 0..4);
            (Just(current), known, unknown).prop_map(|(current, known, unknown)| {
                let mut translations: HashMap<String, String> = unknown
                    .into_iter()
                    .filter(|(k, _)| !current.contains_key(k))
                    .collect();
                translations.extend(known);
                (current, translations)
            })
        },
    )
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn build_document(values: &BTreeMap<String, String>) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<root>\n");
    xml.push_str("  <!-- generated -->\n");
    for (key, value) in values {
        xml.push_str(&format!(
            "  <data name=\"{}\" xml:space=\"preserve\">\n    <value>{}</value>\n    <comment>{} comment</comment>\n  </data>\n",
            key,
            escape(value),
            key
        ));
    }
    xml.push_str("</root>\n");
    xml
}

fn render(document: &ResxFormat) -> String {
    let mut out = Vec::new();
    document.to_writer(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_merge_rules_hold((current, translations) in dataset_strategy()) {
        let mut document = ResxFormat::from_str(&build_document(&current)).unwrap();
        let changes = apply_translations(&mut document, &translations).unwrap();

        let mut expected_changes = 0;
        for (key, before) in &current {
            let after = document.value(key).unwrap().unwrap();
            match translations.get(key) {
                Some(new_value) if !new_value.is_empty() => {
                    prop_assert_eq!(&after, new_value);
                    if new_value != before {
                        expected_changes += 1;
                    }
                }
                // Missing or empty translations leave the value alone.
                _ => prop_assert_eq!(&after, before),
            }
        }
        prop_assert_eq!(changes.len(), expected_changes);
        prop_assert_eq!(document.entries().count(), current.len());
    }

    #[test]
    fn prop_second_merge_is_clean((current, translations) in dataset_strategy()) {
        let mut document = ResxFormat::from_str(&build_document(&current)).unwrap();
        apply_translations(&mut document, &translations).unwrap();

        let mut reparsed = ResxFormat::from_str(&render(&document)).unwrap();
        let changes = apply_translations(&mut reparsed, &translations).unwrap();
        prop_assert!(changes.is_empty());
    }

    #[test]
    fn prop_clean_document_renders_identically(current in prop::collection::btree_map(key_strategy(), value_strategy(), 0..10)) {
        let xml = build_document(&current);
        let document = ResxFormat::from_str(&xml).unwrap();
        prop_assert_eq!(render(&document), xml);
    }

    #[test]
    fn prop_written_values_read_back((current, translations) in dataset_strategy()) {
        let mut document = ResxFormat::from_str(&build_document(&current)).unwrap();
        apply_translations(&mut document, &translations).unwrap();
        let reparsed = ResxFormat::from_str(&render(&document)).unwrap();
        for key in current.keys() {
            prop_assert_eq!(reparsed.value(key).unwrap(), document.value(key).unwrap());
        }
    }
}
