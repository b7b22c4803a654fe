//! The option group: registry, values and notification behind one handle.
//!
//! An [`OptionGroup`] is built explicitly by the host with the [`ViewRegistry`] it should
//! consult, and passed to whoever reads or writes options. There is no process-wide
//! instance.
//!
//! # Writes
//!
//! [`OptionGroup::set_value`] is one logical operation:
//!
//! 1. resolve the [`WriteTarget`] for the requested [`AccessScope`]
//! 2. commit the value
//! 3. compute the affected views from the updated store
//! 4. release the registry lock and call the listeners
//!
//! A re-entrant write gate is held across all four steps, so writes from other threads
//! can not interleave between commit and notification. Listeners run on the writing
//! thread and may read options or issue further writes.

use crate::{
    declaration::OptionDeclaration,
    error::OptionError,
    listener::{EffectiveValueListener, ListenerId},
    notifier::PendingNotification,
    registry::OptionRegistry,
    scope::{self, AccessScope, WriteTarget},
    value::OptionValue,
    view::{ViewHandle, ViewRegistry},
};
use parking_lot::{ReentrantMutex, RwLock};
use std::sync::Arc;

pub struct OptionGroup {
    registry: RwLock<OptionRegistry>,
    views: Arc<dyn ViewRegistry>,
    write_gate: ReentrantMutex<()>,
}

impl OptionGroup {
    pub fn new(views: Arc<dyn ViewRegistry>) -> Self {
        Self {
            registry: RwLock::new(OptionRegistry::new()),
            views,
            write_gate: ReentrantMutex::new(()),
        }
    }

    pub fn add_option(&self, declaration: OptionDeclaration) -> Result<(), OptionError> {
        self.registry.write().add_option(declaration)
    }

    /// Remove an option. Removing an unknown option is a no-op and returns `false`.
    pub fn remove_option(&self, name: &str) -> bool {
        let _gate = self.write_gate.lock();
        self.registry.write().remove_option(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.read().contains(name)
    }

    /// Full name for `name`, which may be an abbreviation.
    pub fn resolve_name(&self, name: &str) -> Option<String> {
        self.registry.read().resolve_name(name).map(str::to_string)
    }

    pub fn declaration(&self, name: &str) -> Result<OptionDeclaration, OptionError> {
        self.registry.read().declaration(name).cloned()
    }

    pub fn option_names(&self) -> Vec<String> {
        self.registry.read().names()
    }

    /// Register `listener` to be told about every view whose effective value of `name`
    /// changes. Listeners fire in registration order.
    ///
    /// Registering the same `Arc` again is a no-op returning the id it was first given.
    pub fn add_effective_option_value_change_listener(
        &self,
        name: &str,
        listener: Arc<dyn EffectiveValueListener>,
    ) -> Result<ListenerId, OptionError> {
        self.registry.write().add_listener(name, listener)
    }

    pub fn remove_effective_option_value_change_listener(
        &self,
        name: &str,
        id: ListenerId,
    ) -> bool {
        self.registry.write().remove_listener(name, id)
    }

    /// Write `value` at `access` and notify every view whose effective value changed.
    ///
    /// Nothing is committed or notified when the option is unknown or the value has the
    /// wrong kind.
    pub fn set_value(
        &self,
        name: &str,
        access: AccessScope,
        value: impl Into<OptionValue>,
    ) -> Result<(), OptionError> {
        let value = value.into();
        let _gate = self.write_gate.lock();
        let live_views = self.views.live_views();

        let pending = {
            let mut registry = self.registry.write();
            let entry = registry.entry_mut(name)?;
            let declared = entry.declaration.scope;
            let expected = entry.declaration.kind();
            if value.kind() != expected {
                return Err(OptionError::TypeMismatch {
                    name: name.to_string(),
                    expected,
                    found: value.kind(),
                });
            }

            let target = scope::resolve_write_target(declared, &access, &entry.store);
            tracing::debug!(
                "set_value: option={name} access={access:?} target={target:?} value={value}"
            );
            entry.store.commit(declared, target, value, &live_views);

            PendingNotification::for_write(
                name,
                declared,
                target,
                &entry.store,
                &live_views,
                entry.listeners.snapshot(),
            )
        };

        pending.dispatch();
        Ok(())
    }

    /// Write the declared default at `scope`.
    pub fn reset_value(&self, name: &str, scope: AccessScope) -> Result<(), OptionError> {
        let default = self.declaration(name)?.default;
        self.set_value(name, scope, default)
    }

    /// Drop the local value `view` has for `name` so it inherits the global value again.
    ///
    /// Notifies the views that shared the removed value: every view on the buffer for
    /// buffer-local options, just `view` for window-local ones. Returns whether a local
    /// value existed; when none did, nothing is notified.
    pub fn unset_local_value(&self, name: &str, view: ViewHandle) -> Result<bool, OptionError> {
        let _gate = self.write_gate.lock();
        let live_views = self.views.live_views();

        let pending = {
            let mut registry = self.registry.write();
            let entry = registry.entry_mut(name)?;
            let declared = entry.declaration.scope;
            let Some(unit) = declared.local_unit() else {
                return Ok(false);
            };

            let target = WriteTarget::local(unit, &view);
            if entry.store.remove_local(target).is_none() {
                return Ok(false);
            }
            tracing::debug!("unset_local_value: option={name} target={target:?}");

            PendingNotification::for_write(
                name,
                declared,
                target,
                &entry.store,
                &live_views,
                entry.listeners.snapshot(),
            )
        };

        pending.dispatch();
        Ok(true)
    }

    pub fn global_value(&self, name: &str) -> Result<OptionValue, OptionError> {
        let registry = self.registry.read();
        Ok(registry.entry(name)?.store.global().clone())
    }

    /// The explicit local value of `view`, or `None` when it inherits the global value.
    pub fn local_value(
        &self,
        name: &str,
        view: ViewHandle,
    ) -> Result<Option<OptionValue>, OptionError> {
        let registry = self.registry.read();
        let entry = registry.entry(name)?;
        Ok(entry
            .declaration
            .scope
            .local_unit()
            .and_then(|unit| entry.store.local(unit, &view))
            .cloned())
    }

    pub fn effective_value(
        &self,
        name: &str,
        view: ViewHandle,
    ) -> Result<OptionValue, OptionError> {
        let registry = self.registry.read();
        let entry = registry.entry(name)?;
        Ok(entry.store.effective(entry.declaration.scope, &view).clone())
    }

    /// Read the value a write at `scope` would address: the global value, the view's local
    /// value (falling back to global), or its effective value.
    pub fn value(&self, name: &str, scope: AccessScope) -> Result<OptionValue, OptionError> {
        match scope {
            AccessScope::Global => self.global_value(name),
            AccessScope::Local(view) => match self.local_value(name, view)? {
                Some(value) => Ok(value),
                None => self.global_value(name),
            },
            AccessScope::Effective(view) => self.effective_value(name, view),
        }
    }
}
