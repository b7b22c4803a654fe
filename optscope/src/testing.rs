//! Test doubles for the host side of the option system.
//!
//! [`TestViews`] stands in for the editor's window layout: opening a path creates a window
//! on that path's buffer (reusing the buffer when the path is already open), and
//! [`TestViews::split`] adds another window onto an existing buffer. [`RecordingListener`]
//! remembers every view it was notified about.
//!
//! ```rust
//! use optscope::{
//!     testing::{RecordingListener, TestViews},
//!     AccessScope, DeclaredScope, OptionDeclaration, OptionGroup,
//! };
//! use std::sync::Arc;
//!
//! let views = Arc::new(TestViews::new());
//! let group = OptionGroup::new(views.clone());
//! group
//!     .add_option(OptionDeclaration::new("list", DeclaredScope::GlobalOrLocalToWindow, false))
//!     .unwrap();
//! let listener = RecordingListener::new();
//! group
//!     .add_effective_option_value_change_listener("list", Arc::new(listener.clone()))
//!     .unwrap();
//!
//! let left = views.open("main.rs");
//! let right = views.split(left);
//! group.set_value("list", AccessScope::Local(right), true).unwrap();
//! assert_eq!(listener.notified(), vec![right]);
//! ```

use crate::{
    listener::EffectiveValueListener,
    view::{BufferId, ViewHandle, ViewRegistry, WindowId},
};
use parking_lot::Mutex;
use std::{num::NonZeroU64, sync::Arc};

#[derive(Default)]
struct Layout {
    views: Vec<ViewHandle>,
    buffers: Vec<(String, BufferId)>,
    allocated: u64,
}

impl Layout {
    fn allocate(&mut self) -> NonZeroU64 {
        let id = NonZeroU64::MIN.saturating_add(self.allocated);
        self.allocated += 1;
        id
    }

    fn buffer_for(&mut self, path: &str) -> BufferId {
        if let Some((_, id)) = self.buffers.iter().find(|(open, _)| open == path) {
            return *id;
        }
        let id = BufferId::new(self.allocate());
        self.buffers.push((path.to_string(), id));
        id
    }

    fn add_window(&mut self, buffer: BufferId) -> ViewHandle {
        let view = ViewHandle::new(WindowId::new(self.allocate()), buffer);
        self.views.push(view);
        view
    }
}

/// In-memory window layout implementing [`ViewRegistry`].
#[derive(Default)]
pub struct TestViews {
    layout: Mutex<Layout>,
}

impl TestViews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `path` in a new window. Paths already open share their buffer.
    pub fn open(&self, path: &str) -> ViewHandle {
        let mut layout = self.layout.lock();
        let buffer = layout.buffer_for(path);
        layout.add_window(buffer)
    }

    /// Open a new window onto the buffer shown by `view`.
    pub fn split(&self, view: ViewHandle) -> ViewHandle {
        self.layout.lock().add_window(view.buffer_id())
    }

    pub fn close(&self, view: ViewHandle) {
        self.layout.lock().views.retain(|open| *open != view);
    }
}

impl ViewRegistry for TestViews {
    fn live_views(&self) -> Vec<ViewHandle> {
        self.layout.lock().views.clone()
    }
}

/// Listener recording notified views in order. Clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingListener {
    notified: Arc<Mutex<Vec<ViewHandle>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notified(&self) -> Vec<ViewHandle> {
        self.notified.lock().clone()
    }

    pub fn count_for(&self, view: ViewHandle) -> usize {
        self.notified.lock().iter().filter(|seen| **seen == view).count()
    }

    pub fn clear(&self) {
        self.notified.lock().clear();
    }
}

impl EffectiveValueListener for RecordingListener {
    fn on_effective_value_changed(&self, view: ViewHandle) {
        self.notified.lock().push(view);
    }
}
