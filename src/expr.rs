use crate::descriptor::PropertyDescriptor;

/// A selector expression over a root object: the sequence of access steps a
/// language binding or a hand-written literal produces, leaf-outward. Only
/// property accesses survive compilation (casts are transparent); the other
/// shapes exist so the compiler can reject them by name.
#[derive(Debug)]
pub enum PathExpr {
    Root,
    /// A genuine property access.
    Property {
        base: Box<PathExpr>,
        descriptor: PropertyDescriptor,
    },
    /// A raw field access; not observable.
    Field { base: Box<PathExpr>, name: String },
    /// A method call; not observable.
    MethodCall { base: Box<PathExpr>, name: String },
    /// A type-narrowing cast; transparent to chain construction.
    Cast { base: Box<PathExpr>, target: String },
}

impl PathExpr {
    pub fn root() -> Self {
        PathExpr::Root
    }

    pub fn property(self, descriptor: PropertyDescriptor) -> Self {
        PathExpr::Property {
            base: Box::new(self),
            descriptor,
        }
    }

    pub fn field(self, name: impl Into<String>) -> Self {
        PathExpr::Field {
            base: Box::new(self),
            name: name.into(),
        }
    }

    pub fn method(self, name: impl Into<String>) -> Self {
        PathExpr::MethodCall {
            base: Box::new(self),
            name: name.into(),
        }
    }

    pub fn cast(self, target: impl Into<String>) -> Self {
        PathExpr::Cast {
            base: Box::new(self),
            target: target.into(),
        }
    }
}
