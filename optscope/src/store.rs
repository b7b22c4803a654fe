//! Per-option value storage.
//!
//! Each registered option owns one [`OptionValueStore`]: a global value that always
//! exists, plus sparse buffer and window maps holding explicit local values. A buffer or
//! window missing from its map inherits the global value.
//!
//! Local-only options also remember, per buffer or window, the global value that was
//! current when the global value last changed under it. Those inherited values shape the
//! effective value but are never reported as local values.

use crate::{
    scope::{DeclaredScope, LocalUnit, WriteTarget},
    value::OptionValue,
    view::{BufferId, ViewHandle, WindowId},
};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug)]
pub struct OptionValueStore {
    global: OptionValue,
    buffers: FxHashMap<BufferId, OptionValue>,
    windows: FxHashMap<WindowId, OptionValue>,
    inherited_buffers: FxHashMap<BufferId, OptionValue>,
    inherited_windows: FxHashMap<WindowId, OptionValue>,
}

impl OptionValueStore {
    pub fn new(default: OptionValue) -> Self {
        Self {
            global: default,
            buffers: FxHashMap::default(),
            windows: FxHashMap::default(),
            inherited_buffers: FxHashMap::default(),
            inherited_windows: FxHashMap::default(),
        }
    }

    pub fn global(&self) -> &OptionValue {
        &self.global
    }

    pub fn buffer_value(&self, buffer: BufferId) -> Option<&OptionValue> {
        self.buffers.get(&buffer)
    }

    pub fn window_value(&self, window: WindowId) -> Option<&OptionValue> {
        self.windows.get(&window)
    }

    /// The explicit local value `view` has for `unit`, if any.
    pub fn local(&self, unit: LocalUnit, view: &ViewHandle) -> Option<&OptionValue> {
        match unit {
            LocalUnit::Buffer => self.buffer_value(view.buffer_id()),
            LocalUnit::Window => self.window_value(view.window_id()),
        }
    }

    pub fn has_local(&self, unit: LocalUnit, view: &ViewHandle) -> bool {
        self.local(unit, view).is_some()
    }

    fn inherited(&self, unit: LocalUnit, view: &ViewHandle) -> Option<&OptionValue> {
        match unit {
            LocalUnit::Buffer => self.inherited_buffers.get(&view.buffer_id()),
            LocalUnit::Window => self.inherited_windows.get(&view.window_id()),
        }
    }

    /// The value governing `view`: its local value when it has one, then the value it
    /// inherited before the last global change, else the global value.
    pub fn effective(&self, declared: DeclaredScope, view: &ViewHandle) -> &OptionValue {
        declared
            .local_unit()
            .and_then(|unit| self.local(unit, view).or_else(|| self.inherited(unit, view)))
            .unwrap_or(&self.global)
    }

    /// Store `value` in the slot named by `target`.
    pub fn write(&mut self, target: WriteTarget, value: OptionValue) {
        match target {
            WriteTarget::Global => self.global = value,
            WriteTarget::Buffer(buffer) => {
                self.inherited_buffers.remove(&buffer);
                self.buffers.insert(buffer, value);
            }
            WriteTarget::Window(window) => {
                self.inherited_windows.remove(&window);
                self.windows.insert(window, value);
            }
        }
    }

    /// Commit a resolved write for an option declared with `declared`.
    ///
    /// A global write to a local-only option first records the current global value as
    /// inherited by every live buffer or window without a value of its own, so only views
    /// opened later see the new one.
    pub fn commit(
        &mut self,
        declared: DeclaredScope,
        target: WriteTarget,
        value: OptionValue,
        live_views: &[ViewHandle],
    ) {
        if target == WriteTarget::Global && declared.is_local_only() {
            if let Some(unit) = declared.local_unit() {
                self.pin_locals(unit, live_views);
            }
        }
        self.write(target, value);
    }

    fn pin_locals(&mut self, unit: LocalUnit, live_views: &[ViewHandle]) {
        let global = &self.global;
        for view in live_views {
            match unit {
                LocalUnit::Buffer => {
                    let buffer = view.buffer_id();
                    if !self.buffers.contains_key(&buffer) {
                        self.inherited_buffers
                            .entry(buffer)
                            .or_insert_with(|| global.clone());
                    }
                }
                LocalUnit::Window => {
                    let window = view.window_id();
                    if !self.windows.contains_key(&window) {
                        self.inherited_windows
                            .entry(window)
                            .or_insert_with(|| global.clone());
                    }
                }
            }
        }
    }

    /// Drop the local value in `target`, returning it. The buffer or window then follows
    /// the current global value. Global targets are left untouched.
    pub fn remove_local(&mut self, target: WriteTarget) -> Option<OptionValue> {
        match target {
            WriteTarget::Global => None,
            WriteTarget::Buffer(buffer) => self.buffers.remove(&buffer),
            WriteTarget::Window(window) => self.windows.remove(&window),
        }
    }
}
