use std::{cell::RefCell, rc::Rc};

use crate::{
    chain::{Chain, OldNewSink, TerminalSink},
    compile::CompiledPath,
    error::PathError,
    expr::PathExpr,
    notify::Notifiable,
};

/// The disposable token returned when a listener is built. Sole owner of
/// the chain; dropping the handle disposes it.
pub struct ListenerHandle {
    chain: Rc<Chain>,
}

impl ListenerHandle {
    /// Tear down every subscription held by the chain. Idempotent; no
    /// callback runs during or after disposal, even if the observed
    /// objects keep mutating.
    pub fn dispose(&self) {
        self.chain.dispose();
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.chain.dispose();
    }
}

impl CompiledPath {
    /// Attach a change-only listener over this path. The callback runs on
    /// every notification of the terminal property and on every
    /// intermediate replacement; it never runs at build time.
    pub fn listen(
        &self,
        root: Rc<dyn Notifiable>,
        on_change: impl Fn() + 'static,
    ) -> ListenerHandle {
        ListenerHandle {
            chain: Chain::build(Some(root), self, TerminalSink::ChangeOnly(Rc::new(on_change))),
        }
    }

    /// Attach an old/new listener over this path. The callback receives
    /// `(old, new)` and is suppressed when the transition is a no-op under
    /// value equality; `None` stands for an absent value.
    pub fn listen_old_new<T, F>(&self, root: Rc<dyn Notifiable>, on_change: F) -> ListenerHandle
    where
        T: Clone + PartialEq + 'static,
        F: Fn(Option<&T>, Option<&T>) + 'static,
    {
        let sink = TerminalSink::OldNew(Box::new(OldNewSink::<T, _>::new(on_change)));
        ListenerHandle {
            chain: Chain::build(Some(root), self, sink),
        }
    }
}

/// Compile `expr` and attach a change-only listener rooted at `root`.
pub fn listen(
    root: Rc<dyn Notifiable>,
    expr: &PathExpr,
    on_change: impl Fn() + 'static,
) -> Result<ListenerHandle, PathError> {
    Ok(CompiledPath::compile(expr)?.listen(root, on_change))
}

/// Compile `expr` and attach an old/new listener rooted at `root`.
pub fn listen_old_new<T, F>(
    root: Rc<dyn Notifiable>,
    expr: &PathExpr,
    on_change: F,
) -> Result<ListenerHandle, PathError>
where
    T: Clone + PartialEq + 'static,
    F: Fn(Option<&T>, Option<&T>) + 'static,
{
    Ok(CompiledPath::compile(expr)?.listen_old_new(root, on_change))
}

/// Owns the handles of several listeners and disposes them together.
#[derive(Default)]
pub struct ListenerSet {
    handles: RefCell<Vec<ListenerHandle>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, handle: ListenerHandle) {
        self.handles.borrow_mut().push(handle);
    }

    /// Dispose every listener added so far.
    pub fn dispose_all(&self) {
        self.handles.borrow_mut().clear();
    }
}
