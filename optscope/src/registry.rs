//! Name-indexed storage of declared options.
//!
//! Every entry bundles what exists for one option between [`OptionRegistry::add_option`]
//! and [`OptionRegistry::remove_option`]: its declaration, its [`OptionValueStore`] and its
//! listeners. Removing the option drops all three together.

use crate::{
    declaration::OptionDeclaration,
    error::OptionError,
    listener::{EffectiveValueListener, ListenerId, Listeners},
    store::OptionValueStore,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

pub(crate) struct OptionEntry {
    pub declaration: OptionDeclaration,
    pub store: OptionValueStore,
    pub listeners: Listeners,
}

#[derive(Default)]
pub struct OptionRegistry {
    entries: FxHashMap<String, OptionEntry>,
    /// Abbreviation to full name
    abbreviations: FxHashMap<String, String>,
    next_listener_id: u64,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new option with its default as the initial global value.
    ///
    /// Fails when the name or abbreviation collides with an already registered name or
    /// abbreviation.
    pub fn add_option(&mut self, declaration: OptionDeclaration) -> Result<(), OptionError> {
        if self.resolve_name(&declaration.name).is_some() {
            return Err(OptionError::DuplicateOption(declaration.name));
        }
        if let Some(abbreviation) = &declaration.abbreviation {
            if self.resolve_name(abbreviation).is_some() || *abbreviation == declaration.name {
                return Err(OptionError::DuplicateOption(abbreviation.clone()));
            }
            self.abbreviations
                .insert(abbreviation.clone(), declaration.name.clone());
        }

        tracing::debug!(
            "add_option: name={} scope={:?}",
            declaration.name,
            declaration.scope
        );
        let entry = OptionEntry {
            store: OptionValueStore::new(declaration.default.clone()),
            listeners: Listeners::default(),
            declaration,
        };
        self.entries.insert(entry.declaration.name.clone(), entry);
        Ok(())
    }

    /// Remove an option with its values and listeners. Unknown names are ignored.
    pub fn remove_option(&mut self, name: &str) -> bool {
        let Some(entry) = self.entries.remove(name) else {
            return false;
        };
        if let Some(abbreviation) = &entry.declaration.abbreviation {
            self.abbreviations.remove(abbreviation);
        }
        tracing::debug!("remove_option: name={name}");
        true
    }

    /// Full name of the option called `name`, accepting abbreviations.
    pub fn resolve_name(&self, name: &str) -> Option<&str> {
        if let Some((full, _)) = self.entries.get_key_value(name) {
            return Some(full.as_str());
        }
        self.abbreviations.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn declaration(&self, name: &str) -> Result<&OptionDeclaration, OptionError> {
        self.entry(name).map(|entry| &entry.declaration)
    }

    /// Registered option names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn add_listener(
        &mut self,
        name: &str,
        listener: Arc<dyn EffectiveValueListener>,
    ) -> Result<ListenerId, OptionError> {
        let candidate = ListenerId::new(self.next_listener_id);
        let entry = self.entry_mut(name)?;
        let id = entry.listeners.push(candidate, listener);
        tracing::debug!(
            "add_listener: option={name} id={id:?} total={}",
            entry.listeners.len()
        );
        if id == candidate {
            self.next_listener_id += 1;
        }
        Ok(id)
    }

    pub fn remove_listener(&mut self, name: &str, id: ListenerId) -> bool {
        self.entries
            .get_mut(name)
            .is_some_and(|entry| entry.listeners.remove(id))
    }

    pub(crate) fn entry(&self, name: &str) -> Result<&OptionEntry, OptionError> {
        self.entries
            .get(name)
            .ok_or_else(|| OptionError::UnknownOption(name.to_string()))
    }

    pub(crate) fn entry_mut(&mut self, name: &str) -> Result<&mut OptionEntry, OptionError> {
        self.entries
            .get_mut(name)
            .ok_or_else(|| OptionError::UnknownOption(name.to_string()))
    }
}
