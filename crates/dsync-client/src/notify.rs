//! Notification handler slots

use dsync_core::{Alarm, ResourceRef, ResourceStore};

pub type ReadyFn = Box<dyn FnMut(&ResourceStore) + Send>;
pub type AddFn = Box<dyn FnMut(&ResourceStore, ResourceRef<'_>) + Send>;
pub type DeleteFn = Box<dyn FnMut(&ResourceStore, ResourceRef<'_>) + Send>;
pub type ChangeFn = Box<dyn FnMut(&ResourceStore, ResourceRef<'_>, ResourceRef<'_>) + Send>;
pub type AlarmFn = Box<dyn FnMut(&ResourceStore, &Alarm) + Send>;

/// A callback for one event category.
///
/// Every callback runs on the read loop and receives the store so it can
/// look up related records. A slow callback delays every later frame.
pub enum Handler {
    /// Bulk load finished; fires once per session
    Ready(ReadyFn),
    /// A record was added after ready
    Add(AddFn),
    /// A record is about to be removed; it is still in the store
    Delete(DeleteFn),
    /// A record was replaced by one that differs (old, new)
    Change(ChangeFn),
    /// A clip or silence detector changed state
    Alarm(AlarmFn),
}

impl Handler {
    pub fn ready<F>(f: F) -> Self
    where
        F: FnMut(&ResourceStore) + Send + 'static,
    {
        Handler::Ready(Box::new(f))
    }

    pub fn add<F>(f: F) -> Self
    where
        F: FnMut(&ResourceStore, ResourceRef<'_>) + Send + 'static,
    {
        Handler::Add(Box::new(f))
    }

    pub fn delete<F>(f: F) -> Self
    where
        F: FnMut(&ResourceStore, ResourceRef<'_>) + Send + 'static,
    {
        Handler::Delete(Box::new(f))
    }

    pub fn change<F>(f: F) -> Self
    where
        F: FnMut(&ResourceStore, ResourceRef<'_>, ResourceRef<'_>) + Send + 'static,
    {
        Handler::Change(Box::new(f))
    }

    pub fn alarm<F>(f: F) -> Self
    where
        F: FnMut(&ResourceStore, &Alarm) + Send + 'static,
    {
        Handler::Alarm(Box::new(f))
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let category = match self {
            Handler::Ready(_) => "Ready",
            Handler::Add(_) => "Add",
            Handler::Delete(_) => "Delete",
            Handler::Change(_) => "Change",
            Handler::Alarm(_) => "Alarm",
        };
        write!(f, "Handler::{}", category)
    }
}

/// One optional slot per category. Setting a slot replaces its handler.
#[derive(Default)]
pub struct Handlers {
    ready: Option<ReadyFn>,
    add: Option<AddFn>,
    delete: Option<DeleteFn>,
    change: Option<ChangeFn>,
    alarm: Option<AlarmFn>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, handler: Handler) {
        match handler {
            Handler::Ready(f) => self.ready = Some(f),
            Handler::Add(f) => self.add = Some(f),
            Handler::Delete(f) => self.delete = Some(f),
            Handler::Change(f) => self.change = Some(f),
            Handler::Alarm(f) => self.alarm = Some(f),
        }
    }

    pub(crate) fn ready(&mut self, store: &ResourceStore) {
        if let Some(f) = self.ready.as_mut() {
            f(store);
        }
    }

    pub(crate) fn added(&mut self, store: &ResourceStore, record: ResourceRef<'_>) {
        if let Some(f) = self.add.as_mut() {
            f(store, record);
        }
    }

    pub(crate) fn deleted(&mut self, store: &ResourceStore, record: ResourceRef<'_>) {
        if let Some(f) = self.delete.as_mut() {
            f(store, record);
        }
    }

    pub(crate) fn changed(&mut self, store: &ResourceStore, old: ResourceRef<'_>, new: ResourceRef<'_>) {
        if let Some(f) = self.change.as_mut() {
            f(store, old, new);
        }
    }

    pub(crate) fn alarm(&mut self, store: &ResourceStore, alarm: &Alarm) {
        if let Some(f) = self.alarm.as_mut() {
            f(store, alarm);
        }
    }
}
