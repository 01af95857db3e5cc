use std::{any::Any, fmt, rc::Rc};

use crate::{
    notify::Notifiable,
    value::{PropertyValue, ValueKind},
};

/// Reads one property off an erased instance.
pub type Getter = Rc<dyn Fn(&dyn Notifiable) -> PropertyValue>;

/// One hop of a path: a named property access over some observable source
/// type. Immutable and cheap to clone; every listener built from the same
/// compiled path shares the same descriptors.
#[derive(Clone)]
pub struct PropertyDescriptor {
    name: Rc<str>,
    kind: ValueKind,
    read: Getter,
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("PropertyDescriptor");
        s.field("name", &self.name);
        s.field("kind", &self.kind);
        s.finish()
    }
}

impl PropertyDescriptor {
    /// A descriptor with a raw getter. The getter must return values
    /// matching `kind`; a mismatch surfaces as a panic when the chain
    /// reads the property.
    pub fn new(
        name: impl Into<Rc<str>>,
        kind: ValueKind,
        read: impl Fn(&dyn Notifiable) -> PropertyValue + 'static,
    ) -> Self {
        PropertyDescriptor {
            name: name.into(),
            kind,
            read: Rc::new(read),
        }
    }

    /// A property whose value is itself observable.
    pub fn notifying<S: Notifiable>(
        name: impl Into<Rc<str>>,
        get: impl Fn(&S) -> Option<Rc<dyn Notifiable>> + 'static,
    ) -> Self {
        let name: Rc<str> = name.into();
        let property = name.clone();
        let read = move |instance: &dyn Notifiable| {
            PropertyValue::notifying(get(downcast_source::<S>(instance, &property)))
        };
        PropertyDescriptor {
            name,
            kind: ValueKind::Notifying,
            read: Rc::new(read),
        }
    }

    /// A property carrying a plain value; valid only as the final hop of a
    /// path.
    pub fn plain<S: Notifiable, T: Any>(
        name: impl Into<Rc<str>>,
        get: impl Fn(&S) -> Option<T> + 'static,
    ) -> Self {
        let name: Rc<str> = name.into();
        let property = name.clone();
        let read = move |instance: &dyn Notifiable| {
            PropertyValue::plain(get(downcast_source::<S>(instance, &property)))
        };
        PropertyDescriptor {
            name,
            kind: ValueKind::Plain,
            read: Rc::new(read),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub(crate) fn read(&self, instance: &dyn Notifiable) -> PropertyValue {
        (self.read)(instance)
    }
}

fn downcast_source<'a, S: Notifiable>(instance: &'a dyn Notifiable, property: &str) -> &'a S {
    instance.downcast_ref::<S>().unwrap_or_else(|| {
        panic!(
            "property `{property}` read from an unexpected instance type, expected {}",
            std::any::type_name::<S>()
        )
    })
}
