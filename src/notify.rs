use std::{cell::RefCell, rc::Rc, sync::atomic::AtomicU64};

use downcast_rs::{impl_downcast, Downcast};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Handler invoked with the name of the property that changed.
pub type ChangeHandler = Rc<dyn Fn(&str)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// A stable identifier for a registered change handler.
pub struct HandlerId(u64);

impl HandlerId {
    fn next() -> HandlerId {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        HandlerId(COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
    }
}

/// The change-notification capability: anything that can tell its observers
/// "this named property changed". Every hop of an observed path except the
/// final one must point at a value implementing this trait.
pub trait Notifiable: Downcast {
    /// Register a handler; it runs on every property change of this
    /// instance, with the changed property's name.
    fn on_change(&self, handler: ChangeHandler) -> HandlerId;

    /// Remove a previously registered handler.
    fn off_change(&self, id: HandlerId);
}
impl_downcast!(Notifiable);

/// A named-property change event. Model types embed one and raise it from
/// their setters; handler registration and delivery live here so that
/// implementing [`Notifiable`] is a two-line forward (or one line via
/// [`HasNotifier`]).
#[derive(Default)]
pub struct ChangeNotifier {
    handlers: RefCell<FxHashMap<HandlerId, ChangeHandler>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: ChangeHandler) -> HandlerId {
        let id = HandlerId::next();
        self.handlers.borrow_mut().insert(id, handler);
        id
    }

    pub fn unsubscribe(&self, id: HandlerId) {
        self.handlers.borrow_mut().remove(&id);
    }

    /// Deliver a change of `property` to every registered handler.
    /// Handlers may subscribe or unsubscribe while delivery is running;
    /// the sweep iterates a snapshot of the registry.
    pub fn notify(&self, property: &str) {
        let snapshot: SmallVec<[ChangeHandler; 4]> =
            self.handlers.borrow().values().cloned().collect();
        for handler in snapshot {
            handler(property);
        }
    }
}

/// Exposes the embedded [`ChangeNotifier`] of a model type. Implementing
/// this gives the type [`Notifiable`] for free.
pub trait HasNotifier {
    fn notifier(&self) -> &ChangeNotifier;
}

impl<T: HasNotifier + 'static> Notifiable for T {
    fn on_change(&self, handler: ChangeHandler) -> HandlerId {
        self.notifier().subscribe(handler)
    }

    fn off_change(&self, id: HandlerId) {
        self.notifier().unsubscribe(id)
    }
}
