//! Delivery of effective value changes to listeners.
//!
//! A write produces a [`PendingNotification`] while the registry is locked: the affected
//! views (from [`scope::affected_views`]) and a snapshot of the option's listeners. It is
//! dispatched after the lock is released so listeners can read the new value.

use crate::{
    listener::ListenerSnapshot,
    scope::{self, DeclaredScope, WriteTarget},
    store::OptionValueStore,
    view::ViewHandle,
};
use smallvec::SmallVec;

#[must_use = "a pending notification does nothing until dispatched"]
pub(crate) struct PendingNotification {
    option: String,
    views: SmallVec<[ViewHandle; 4]>,
    listeners: ListenerSnapshot,
}

impl PendingNotification {
    /// Compute the notification for a write to `target` that was just committed to `store`.
    pub fn for_write(
        option: &str,
        declared: DeclaredScope,
        target: WriteTarget,
        store: &OptionValueStore,
        live_views: &[ViewHandle],
        listeners: ListenerSnapshot,
    ) -> Self {
        Self {
            option: option.to_string(),
            views: scope::affected_views(declared, target, store, live_views),
            listeners,
        }
    }

    /// Invoke every listener once per affected view, views first, listeners in
    /// registration order.
    pub fn dispatch(self) {
        tracing::trace!(
            "notify: option={} views={} listeners={}",
            self.option,
            self.views.len(),
            self.listeners.len()
        );
        for view in &self.views {
            for listener in &self.listeners {
                tracing::trace!("notify: option={} view={view}", self.option);
                listener.on_effective_value_changed(*view);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        listener::EffectiveValueListener,
        value::OptionValue,
        view::{BufferId, WindowId},
    };
    use parking_lot::Mutex;
    use std::{num::NonZeroU64, sync::Arc};

    fn view(window: u64, buffer: u64) -> ViewHandle {
        ViewHandle::new(
            WindowId::new(NonZeroU64::new(window).unwrap()),
            BufferId::new(NonZeroU64::new(buffer).unwrap()),
        )
    }

    #[test]
    fn each_listener_sees_each_view_once() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let listeners: ListenerSnapshot = (0..2)
            .map(|index| {
                let calls = Arc::clone(&calls);
                Arc::new(move |view: ViewHandle| calls.lock().push((index, view)))
                    as Arc<dyn EffectiveValueListener>
            })
            .collect();

        let store = OptionValueStore::new(OptionValue::from(1_i64));
        let views = [view(1, 1), view(2, 1), view(1, 1)];
        let pending = PendingNotification::for_write(
            "scrolloff",
            DeclaredScope::Global,
            WriteTarget::Global,
            &store,
            &views,
            listeners,
        );
        pending.dispatch();

        assert_eq!(
            *calls.lock(),
            vec![(0, views[0]), (1, views[0]), (0, views[1]), (1, views[1])]
        );
    }
}
