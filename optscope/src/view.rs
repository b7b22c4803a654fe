//! Identity of the editor views an option system is attached to.
//!
//! Views are owned by the host editor. The option core only needs to know which buffer a
//! view shows and which window it lives in, so a view is reduced to a [`ViewHandle`]: a
//! copyable pair of [`WindowId`] and [`BufferId`]. Two handles with the same buffer are
//! splits onto the same buffer and observe the same buffer-local values.
//!
//! The host exposes its open views through [`ViewRegistry`], which is queried at
//! notification time.

use std::{fmt, num::NonZeroU64};

/// Stable identity of a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(NonZeroU64);

impl BufferId {
    pub const fn new(id: NonZeroU64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> NonZeroU64 {
        self.0
    }
}

impl From<NonZeroU64> for BufferId {
    fn from(value: NonZeroU64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

/// Stable identity of a window. Every window holds exactly one view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(NonZeroU64);

impl WindowId {
    pub const fn new(id: NonZeroU64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> NonZeroU64 {
        self.0
    }
}

impl From<NonZeroU64> for WindowId {
    fn from(value: NonZeroU64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// One open editor view, as seen by the option system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewHandle {
    window: WindowId,
    buffer: BufferId,
}

impl ViewHandle {
    pub const fn new(window: WindowId, buffer: BufferId) -> Self {
        Self { window, buffer }
    }

    pub const fn window_id(&self) -> WindowId {
        self.window
    }

    pub const fn buffer_id(&self) -> BufferId {
        self.buffer
    }

    /// Whether both views show the same buffer.
    pub fn shares_buffer_with(&self, other: &ViewHandle) -> bool {
        self.buffer == other.buffer
    }
}

impl fmt::Display for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.window, self.buffer)
    }
}

/// Host collaborator enumerating the views that are currently open.
///
/// Called once per write, after the value has been committed. Returning the same window
/// twice is tolerated; the notifier de-duplicates by window.
pub trait ViewRegistry: Send + Sync {
    fn live_views(&self) -> Vec<ViewHandle>;
}

/// A fixed set of views. Handy for hosts that build the list up front.
impl ViewRegistry for Vec<ViewHandle> {
    fn live_views(&self) -> Vec<ViewHandle> {
        self.clone()
    }
}
