use crate::view::ViewHandle;
use smallvec::SmallVec;
use std::sync::Arc;

/// Callback told that a view's effective value of an option changed.
///
/// Invoked synchronously after the new value is committed, so reading the option from the
/// callback already observes it. Any closure `Fn(ViewHandle)` is a listener.
pub trait EffectiveValueListener: Send + Sync {
    fn on_effective_value_changed(&self, view: ViewHandle);
}

impl<F> EffectiveValueListener for F
where
    F: Fn(ViewHandle) + Send + Sync,
{
    fn on_effective_value_changed(&self, view: ViewHandle) {
        self(view)
    }
}

/// Handle returned on registration, used to remove the listener again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

pub(crate) type ListenerSnapshot = SmallVec<[Arc<dyn EffectiveValueListener>; 2]>;

/// Listeners of one option, in registration order and without repeats.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: SmallVec<[(ListenerId, Arc<dyn EffectiveValueListener>); 2]>,
}

impl Listeners {
    /// Append `listener` under `id`. A listener already present keeps its place and its
    /// original id, which is returned instead.
    pub fn push(
        &mut self,
        id: ListenerId,
        listener: Arc<dyn EffectiveValueListener>,
    ) -> ListenerId {
        if let Some((existing, _)) = self
            .entries
            .iter()
            .find(|(_, registered)| Arc::ptr_eq(registered, &listener))
        {
            return *existing;
        }
        self.entries.push((id, listener));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Clones the current list so it can be invoked without holding the registry lock.
    pub fn snapshot(&self) -> ListenerSnapshot {
        self.entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}
