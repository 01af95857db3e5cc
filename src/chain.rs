use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use tracing::{debug, trace};

use crate::{
    compile::CompiledPath,
    descriptor::PropertyDescriptor,
    notify::{ChangeHandler, HandlerId, Notifiable},
    value::PropertyValue,
};

/// The listener chain: one node per path hop, addressed by index. The
/// topology is fixed at build time; node `i + 1` observes the value of
/// node `i`'s property, and only the observed instances vary over the
/// chain's lifetime. The chain never forms a cycle.
pub(crate) struct Chain {
    nodes: Vec<ChainNode>,
}

pub(crate) enum ChainNode {
    Middle(MiddleNode),
    Terminal(TerminalNode),
}

pub(crate) struct MiddleNode {
    descriptor: PropertyDescriptor,
    observed: RefCell<Option<Rc<dyn Notifiable>>>,
    subscription: Cell<Option<HandlerId>>,
}

pub(crate) struct TerminalNode {
    descriptor: PropertyDescriptor,
    observed: RefCell<Option<Rc<dyn Notifiable>>>,
    subscription: Cell<Option<HandlerId>>,
    sink: TerminalSink,
}

/// The two callback shapes a terminal node can carry.
pub(crate) enum TerminalSink {
    /// Runs on every matching notification and every reattachment,
    /// regardless of the value read.
    ChangeOnly(Rc<dyn Fn()>),
    /// Diffs the terminal value against a cache and runs with
    /// `(old, new)`, suppressing no-op transitions.
    OldNew(Box<dyn DiffSink>),
}

/// Erases the terminal value type behind the old/new diffing protocol.
pub(crate) trait DiffSink {
    /// Cache the value without firing. Runs once, at build time.
    fn prime(&self, value: PropertyValue, property: &str);

    /// Diff `value` against the cache; unless the transition is a no-op,
    /// update the cache and run the callback.
    fn apply(&self, value: PropertyValue, property: &str);
}

pub(crate) struct OldNewSink<T, F> {
    last: RefCell<Option<T>>,
    callback: F,
}

impl<T, F> OldNewSink<T, F> {
    pub(crate) fn new(callback: F) -> Self {
        OldNewSink {
            last: RefCell::new(None),
            callback,
        }
    }
}

impl<T, F> DiffSink for OldNewSink<T, F>
where
    T: Clone + PartialEq + 'static,
    F: Fn(Option<&T>, Option<&T>),
{
    fn prime(&self, value: PropertyValue, property: &str) {
        *self.last.borrow_mut() = value.into_value::<T>(property);
    }

    fn apply(&self, value: PropertyValue, property: &str) {
        let new = value.into_value::<T>(property);
        let old = self.last.borrow().clone();
        let unchanged = match (&old, &new) {
            (None, None) => true,
            (Some(old), Some(new)) => old == new,
            _ => false,
        };
        if unchanged {
            return;
        }
        // cache before invoking, so a re-entrant read sees the new value
        *self.last.borrow_mut() = new.clone();
        (self.callback)(old.as_ref(), new.as_ref());
    }
}

impl ChainNode {
    fn descriptor(&self) -> &PropertyDescriptor {
        match self {
            ChainNode::Middle(node) => &node.descriptor,
            ChainNode::Terminal(node) => &node.descriptor,
        }
    }

    fn observed(&self) -> &RefCell<Option<Rc<dyn Notifiable>>> {
        match self {
            ChainNode::Middle(node) => &node.observed,
            ChainNode::Terminal(node) => &node.observed,
        }
    }

    fn subscription(&self) -> &Cell<Option<HandlerId>> {
        match self {
            ChainNode::Middle(node) => &node.subscription,
            ChainNode::Terminal(node) => &node.subscription,
        }
    }
}

impl MiddleNode {
    /// Read the current value of the observed property as the next link.
    /// A non-null value that cannot notify is a contract violation.
    fn read_link(&self) -> Option<Rc<dyn Notifiable>> {
        let observed = self.observed.borrow().clone();
        observed.and_then(|instance| {
            self.descriptor
                .read(&*instance)
                .into_link(self.descriptor.name())
        })
    }
}

impl TerminalNode {
    fn read_value(&self) -> PropertyValue {
        let observed = self.observed.borrow().clone();
        match observed {
            Some(instance) => self.descriptor.read(&*instance),
            None => PropertyValue::Absent,
        }
    }

    /// Snapshot the current value silently. A fresh listener observes
    /// without firing until the first real change.
    fn prime(&self) {
        if let TerminalSink::OldNew(sink) = &self.sink {
            sink.prime(self.read_value(), self.descriptor.name());
        }
    }

    /// The terminal property changed, or an ancestor link was replaced.
    fn fire(&self) {
        match &self.sink {
            TerminalSink::ChangeOnly(callback) => callback(),
            TerminalSink::OldNew(sink) => sink.apply(self.read_value(), self.descriptor.name()),
        }
    }
}

impl Chain {
    /// Build a chain over `path` rooted at `root` and attach every node.
    /// All `next` links exist before the first subscription is made, and
    /// the terminal primes its cache without firing.
    pub(crate) fn build(
        root: Option<Rc<dyn Notifiable>>,
        path: &CompiledPath,
        sink: TerminalSink,
    ) -> Rc<Chain> {
        let descriptors = path.descriptors();
        let (last, intermediate) = descriptors
            .split_last()
            .expect("a path must have at least one segment");

        // walk root to leaf, recording the instance each node will observe
        let mut nodes = Vec::with_capacity(descriptors.len());
        let mut instances = Vec::with_capacity(descriptors.len());
        let mut instance = root;
        for descriptor in intermediate {
            instances.push(instance.clone());
            nodes.push(ChainNode::Middle(MiddleNode {
                descriptor: descriptor.clone(),
                observed: RefCell::new(None),
                subscription: Cell::new(None),
            }));
            instance = instance
                .and_then(|current| descriptor.read(&*current).into_link(descriptor.name()));
        }
        instances.push(instance);
        nodes.push(ChainNode::Terminal(TerminalNode {
            descriptor: last.clone(),
            observed: RefCell::new(None),
            subscription: Cell::new(None),
            sink,
        }));

        debug!(depth = nodes.len(), "building listener chain");

        let chain = Rc::new(Chain { nodes });
        // attach leaf first, mirroring the build recursion
        for index in (0..chain.nodes.len()).rev() {
            chain.attach(index, instances[index].clone());
        }
        if let ChainNode::Terminal(terminal) = chain.node(chain.nodes.len() - 1) {
            terminal.prime();
        }
        chain
    }

    fn node(&self, index: usize) -> &ChainNode {
        &self.nodes[index]
    }

    /// Point node `index` at `instance`: drop the subscription to the
    /// previously observed instance, then subscribe to the new one. A node
    /// holds a live subscription iff it observes an instance.
    fn attach(self: &Rc<Self>, index: usize, instance: Option<Rc<dyn Notifiable>>) {
        let node = self.node(index);
        let previous = node.observed().borrow_mut().take();
        if let Some(previous) = previous {
            if let Some(id) = node.subscription().take() {
                previous.off_change(id);
            }
        }
        if let Some(instance) = &instance {
            trace!(property = node.descriptor().name(), "subscribing");
            let handler = self.change_handler(index);
            node.subscription().set(Some(instance.on_change(handler)));
        }
        *node.observed().borrow_mut() = instance;
    }

    /// Re-point node `index`, and transitively the whole suffix of the
    /// chain, at a replacement instance. An absent branch propagates down
    /// to the terminal so it can report the transition.
    fn reattach(self: &Rc<Self>, index: usize, instance: Option<Rc<dyn Notifiable>>) {
        self.attach(index, instance);
        match self.node(index) {
            ChainNode::Middle(node) => {
                let next = node.read_link();
                self.reattach(index + 1, next);
            }
            ChainNode::Terminal(node) => node.fire(),
        }
    }

    fn change_handler(self: &Rc<Self>, index: usize) -> ChangeHandler {
        let chain = Rc::downgrade(self);
        Rc::new(move |property: &str| {
            if let Some(chain) = Weak::upgrade(&chain) {
                chain.property_changed(index, property);
            }
        })
    }

    /// A change notification arrived at node `index`.
    fn property_changed(self: &Rc<Self>, index: usize, property: &str) {
        if property != self.node(index).descriptor().name() {
            return;
        }
        trace!(property, "observed property changed");
        match self.node(index) {
            ChainNode::Middle(node) => {
                let next = node.read_link();
                self.reattach(index + 1, next);
            }
            ChainNode::Terminal(node) => node.fire(),
        }
    }

    /// Tear down every subscription, root to leaf. Idempotent; no callback
    /// runs during or after disposal.
    pub(crate) fn dispose(&self) {
        for node in &self.nodes {
            let observed = node.observed().borrow_mut().take();
            if let Some(observed) = observed {
                if let Some(id) = node.subscription().take() {
                    observed.off_change(id);
                }
            }
        }
        trace!(depth = self.nodes.len(), "listener chain disposed");
    }
}
