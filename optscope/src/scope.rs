//! Option scopes and the rules deciding which views a write reaches.
//!
//! Two independent scopes meet on every write:
//!
//! - [`DeclaredScope`] is fixed per option and says how its value may vary: one global
//!   value, one value per buffer or per window, or a global value a buffer/window may
//!   override.
//! - [`AccessScope`] is chosen per request, mirroring `:setglobal`, `:setlocal` and `:set`.
//!
//! [`resolve_write_target`] turns the pair into the [`WriteTarget`] slot that gets the
//! value. [`affected_views`] then decides, from that same target, whose effective value
//! changed. Both the store and the notifier go through these two functions so the slot
//! written and the views notified can not drift apart.
//!
//! # Resolution
//!
//! Views notified by a write, per declared scope (rows) and access scope (columns):
//!
//! | declared                | `Global`               | `Local(v)` | `Effective(v)`            |
//! |-------------------------|------------------------|------------|---------------------------|
//! | `Global`                | all views              | all views  | all views                 |
//! | `LocalToBuffer`         | none                   | v's buffer | v's buffer                |
//! | `LocalToWindow`         | none                   | v          | v                         |
//! | `GlobalOrLocalToBuffer` | non-overridden buffers | v's buffer | as `Local(v)` or `Global` |
//! | `GlobalOrLocalToWindow` | non-overridden windows | v          | as `Local(v)` or `Global` |
//!
//! "v's buffer" is every view showing the buffer `v` shows. `Effective(v)` on a hybrid
//! option behaves as `Local(v)` when `v` already has an override and as `Global` otherwise.

use crate::{
    store::OptionValueStore,
    view::{BufferId, ViewHandle, WindowId},
};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// How an option's value may vary across views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredScope {
    /// One value shared by every view
    Global,
    /// One value per buffer
    LocalToBuffer,
    /// One value per window
    LocalToWindow,
    /// A global value that a buffer may override
    GlobalOrLocalToBuffer,
    /// A global value that a window may override
    GlobalOrLocalToWindow,
}

/// The unit a local value is stored against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocalUnit {
    Buffer,
    Window,
}

impl DeclaredScope {
    /// The unit local values are kept per, or `None` for purely global options.
    pub fn local_unit(self) -> Option<LocalUnit> {
        match self {
            DeclaredScope::Global => None,
            DeclaredScope::LocalToBuffer | DeclaredScope::GlobalOrLocalToBuffer => {
                Some(LocalUnit::Buffer)
            }
            DeclaredScope::LocalToWindow | DeclaredScope::GlobalOrLocalToWindow => {
                Some(LocalUnit::Window)
            }
        }
    }

    /// Local-only scopes have no global value that views observe directly.
    pub fn is_local_only(self) -> bool {
        matches!(
            self,
            DeclaredScope::LocalToBuffer | DeclaredScope::LocalToWindow
        )
    }
}

/// The scope a single read or write request addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessScope {
    /// The shared global value (`:setglobal`)
    Global,
    /// The buffer or window local value of the view (`:setlocal`)
    Local(ViewHandle),
    /// Whichever value currently governs the view (`:set`)
    Effective(ViewHandle),
}

/// Storage slot a write lands in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WriteTarget {
    Global,
    Buffer(BufferId),
    Window(WindowId),
}

impl WriteTarget {
    /// The local slot of `view` for the given unit.
    pub fn local(unit: LocalUnit, view: &ViewHandle) -> Self {
        match unit {
            LocalUnit::Buffer => WriteTarget::Buffer(view.buffer_id()),
            LocalUnit::Window => WriteTarget::Window(view.window_id()),
        }
    }
}

/// Decide which slot a write for `access` goes to.
///
/// `Local` writes to a purely global option are redirected to the global value, and
/// `Effective` writes to a global-or-local option only go local when the view already has
/// a local value.
pub fn resolve_write_target(
    declared: DeclaredScope,
    access: &AccessScope,
    store: &OptionValueStore,
) -> WriteTarget {
    let Some(unit) = declared.local_unit() else {
        return WriteTarget::Global;
    };

    match access {
        AccessScope::Global => WriteTarget::Global,
        AccessScope::Local(view) => WriteTarget::local(unit, view),
        AccessScope::Effective(view) => {
            if declared.is_local_only() || store.has_local(unit, view) {
                WriteTarget::local(unit, view)
            } else {
                WriteTarget::Global
            }
        }
    }
}

/// Views whose effective value changed after a write to `target`.
///
/// Must be called with the store as it is after the write. The result holds each window at
/// most once, in the order the host listed them.
pub fn affected_views(
    declared: DeclaredScope,
    target: WriteTarget,
    store: &OptionValueStore,
    live_views: &[ViewHandle],
) -> SmallVec<[ViewHandle; 4]> {
    let mut seen = FxHashSet::default();
    live_views
        .iter()
        .filter(|view| seen.insert(view.window_id()))
        .filter(|view| is_affected(declared, target, store, view))
        .copied()
        .collect()
}

fn is_affected(
    declared: DeclaredScope,
    target: WriteTarget,
    store: &OptionValueStore,
    view: &ViewHandle,
) -> bool {
    match target {
        WriteTarget::Global => match declared {
            DeclaredScope::Global => true,
            DeclaredScope::LocalToBuffer | DeclaredScope::LocalToWindow => false,
            DeclaredScope::GlobalOrLocalToBuffer => !store.has_local(LocalUnit::Buffer, view),
            DeclaredScope::GlobalOrLocalToWindow => !store.has_local(LocalUnit::Window, view),
        }
        WriteTarget::Buffer(buffer) => view.buffer_id() == buffer,
        WriteTarget::Window(window) => view.window_id() == window,
    }
}
