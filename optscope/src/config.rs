//! Option declarations and initial values loaded from TOML.
//!
//! ```toml
//! [[option]]
//! name = "scrolloff"
//! abbreviation = "so"
//! scope = "global_or_local_to_window"
//! default = 0
//!
//! [set]
//! scrolloff = 5
//! ```
//!
//! [`OptionsConfig::apply`] declares every `[[option]]` on an [`OptionGroup`] and then
//! writes each `[set]` entry at global scope. `[set]` keys may name options declared
//! elsewhere and may use abbreviations. The whole file is checked against the group
//! first, so a rejected file leaves the group untouched.

use crate::{
    declaration::OptionDeclaration, error::OptionError, group::OptionGroup, scope::AccessScope,
    value::OptionValue,
};
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsConfig {
    #[serde(rename = "option")]
    pub options: Vec<OptionDeclaration>,
    /// Initial global values, applied in key order
    pub set: BTreeMap<String, OptionValue>,
}

impl OptionsConfig {
    /// Read and deserialize a TOML options file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse options file: {}", path.display()))
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse options")
    }

    pub fn apply(&self, group: &OptionGroup) -> Result<(), OptionError> {
        self.validate(group)?;
        for declaration in &self.options {
            group.add_option(declaration.clone())?;
        }
        for (name, value) in &self.set {
            let full = group
                .resolve_name(name)
                .ok_or_else(|| OptionError::UnknownOption(name.clone()))?;
            group.set_value(&full, AccessScope::Global, value.clone())?;
        }
        Ok(())
    }

    /// Check every declaration and `[set]` entry without touching `group`.
    fn validate(&self, group: &OptionGroup) -> Result<(), OptionError> {
        let mut declared: FxHashMap<&str, &OptionDeclaration> = FxHashMap::default();
        for declaration in &self.options {
            let names = std::iter::once(declaration.name.as_str())
                .chain(declaration.abbreviation.as_deref());
            for name in names {
                if group.resolve_name(name).is_some()
                    || declared.insert(name, declaration).is_some()
                {
                    return Err(OptionError::DuplicateOption(name.to_string()));
                }
            }
        }

        for (name, value) in &self.set {
            let (full, expected) = match declared.get(name.as_str()) {
                Some(declaration) => (declaration.name.clone(), declaration.kind()),
                None => {
                    let full = group
                        .resolve_name(name)
                        .ok_or_else(|| OptionError::UnknownOption(name.clone()))?;
                    let expected = group.declaration(&full)?.kind();
                    (full, expected)
                }
            };
            if value.kind() != expected {
                return Err(OptionError::TypeMismatch {
                    name: full,
                    expected,
                    found: value.kind(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scope::DeclaredScope, testing::TestViews};
    use std::sync::Arc;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
        [[option]]
        name = "scrolloff"
        abbreviation = "so"
        scope = "global_or_local_to_window"
        default = 0

        [[option]]
        name = "number"
        scope = "local_to_window"
        default = false

        [[option]]
        name = "fileformat"
        abbreviation = "ff"
        scope = "local_to_buffer"
        default = "unix"

        [set]
        so = 5
        number = true
    "#;

    #[test]
    fn parses_declarations() {
        let config = OptionsConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.options.len(), 3);
        assert_eq!(
            config.options[0],
            OptionDeclaration::new("scrolloff", DeclaredScope::GlobalOrLocalToWindow, 0_i64)
                .with_abbreviation("so")
        );
        assert_eq!(config.options[1].default, OptionValue::Bool(false));
        assert_eq!(config.options[2].scope, DeclaredScope::LocalToBuffer);
        assert_eq!(config.set.get("so"), Some(&OptionValue::Number(5)));
    }

    #[test]
    fn apply_declares_and_sets_globals() {
        let views = Arc::new(TestViews::new());
        let group = OptionGroup::new(views.clone());
        OptionsConfig::from_toml(SAMPLE)
            .unwrap()
            .apply(&group)
            .unwrap();

        let view = views.open("a.txt");
        assert_eq!(
            group.effective_value("scrolloff", view).unwrap(),
            OptionValue::from(5_i64)
        );
        assert_eq!(
            group.effective_value("number", view).unwrap(),
            OptionValue::from(true)
        );
        assert_eq!(
            group.effective_value("fileformat", view).unwrap(),
            OptionValue::from("unix")
        );
    }

    #[test]
    fn apply_rejects_unknown_set_entry() {
        let group = OptionGroup::new(Arc::new(TestViews::new()));
        let config = OptionsConfig::from_toml("[set]\nwrap = true").unwrap();
        assert_eq!(
            config.apply(&group),
            Err(OptionError::UnknownOption("wrap".to_string()))
        );
    }

    #[test]
    fn rejected_file_declares_nothing() {
        let group = OptionGroup::new(Arc::new(TestViews::new()));
        let config = OptionsConfig::from_toml(
            r#"
            [[option]]
            name = "wrap"
            scope = "local_to_window"
            default = true

            [set]
            wrap = true
            textwidth = 80
            "#,
        )
        .unwrap();

        assert_eq!(
            config.apply(&group),
            Err(OptionError::UnknownOption("textwidth".to_string()))
        );
        assert!(!group.contains("wrap"));
    }

    #[test]
    fn rejects_duplicates_and_mistyped_values_up_front() {
        let group = OptionGroup::new(Arc::new(TestViews::new()));
        let duplicate = OptionsConfig::from_toml(
            r#"
            [[option]]
            name = "list"
            scope = "global"
            default = false

            [[option]]
            name = "linebreak"
            abbreviation = "list"
            scope = "global"
            default = false
            "#,
        )
        .unwrap();
        assert_eq!(
            duplicate.apply(&group),
            Err(OptionError::DuplicateOption("list".to_string()))
        );
        assert!(group.option_names().is_empty());

        let source = SAMPLE.replace("so = 5", "so = \"five\"");
        let mistyped = OptionsConfig::from_toml(&source).unwrap();
        assert!(matches!(
            mistyped.apply(&group),
            Err(OptionError::TypeMismatch { .. })
        ));
        assert!(group.option_names().is_empty());
    }

    #[test]
    fn loads_empty_file() {
        let tmp_dir = tempdir().unwrap();
        let path = tmp_dir.path().join("options.toml");
        std::fs::write(&path, "").unwrap();

        let config = OptionsConfig::load(&path).unwrap();
        assert!(config.options.is_empty());
        assert!(config.set.is_empty());
    }

    #[test]
    fn errors_on_unknown_scope() {
        let tmp_dir = tempdir().unwrap();
        let path = tmp_dir.path().join("options.toml");
        std::fs::write(
            &path,
            "[[option]]\nname = \"x\"\nscope = \"per_tab\"\ndefault = 1\n",
        )
        .unwrap();

        let result = OptionsConfig::load(&path);
        assert!(result.unwrap_err().to_string().contains("Failed to parse"));
    }

    #[test]
    fn errors_on_nonexistent_file() {
        let tmp_dir = tempdir().unwrap();
        let result = OptionsConfig::load(&tmp_dir.path().join("missing.toml"));
        assert!(result.unwrap_err().to_string().contains("Failed to read"));
    }
}
