use crate::{
    scope::DeclaredScope,
    value::{OptionKind, OptionValue},
};
use serde::{Deserialize, Serialize};

/// Immutable description of an option: its name, how its value may vary, and the value it
/// starts out with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionDeclaration {
    pub name: String,
    /// Short name accepted by `:set` (e.g. `ts` for `tabstop`)
    #[serde(default)]
    pub abbreviation: Option<String>,
    pub scope: DeclaredScope,
    pub default: OptionValue,
}

impl OptionDeclaration {
    pub fn new(
        name: impl Into<String>,
        scope: DeclaredScope,
        default: impl Into<OptionValue>,
    ) -> Self {
        Self {
            name: name.into(),
            abbreviation: None,
            scope,
            default: default.into(),
        }
    }

    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviation = Some(abbreviation.into());
        self
    }

    pub fn kind(&self) -> OptionKind {
        self.default.kind()
    }
}
