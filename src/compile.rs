use std::rc::Rc;

use smallvec::SmallVec;

use crate::{
    descriptor::PropertyDescriptor, error::PathError, expr::PathExpr, value::ValueKind,
};

/// An ordered, validated sequence of property descriptors, root to leaf.
/// Only compilation produces one, so a `CompiledPath` is guaranteed
/// non-empty and rule-checked. Shared read-only by every listener built
/// from it.
#[derive(Clone, Debug)]
pub struct CompiledPath {
    descriptors: Rc<[PropertyDescriptor]>,
}

impl CompiledPath {
    /// Compile a selector expression into the descriptor sequence the chain
    /// builder consumes.
    ///
    /// Two rules are enforced: every step must be a property access (casts
    /// are transparent, anything else is rejected), and every hop except
    /// the final one must resolve to an observable value type.
    pub fn compile(expr: &PathExpr) -> Result<CompiledPath, PathError> {
        let mut hops: SmallVec<[PropertyDescriptor; 4]> = SmallVec::new();
        collect(expr, &mut hops)?;

        if hops.is_empty() {
            return Err(PathError::UnsupportedExpression(
                "the expression contains no property access".into(),
            ));
        }
        for hop in &hops[..hops.len() - 1] {
            if hop.kind() != ValueKind::Notifying {
                return Err(PathError::UnsupportedLink(hop.name().to_string()));
            }
        }

        Ok(CompiledPath {
            descriptors: hops.into_vec().into(),
        })
    }

    pub(crate) fn descriptors(&self) -> &[PropertyDescriptor] {
        &self.descriptors
    }
}

fn collect(
    expr: &PathExpr,
    hops: &mut SmallVec<[PropertyDescriptor; 4]>,
) -> Result<(), PathError> {
    match expr {
        PathExpr::Root => Ok(()),
        PathExpr::Property { base, descriptor } => {
            collect(base, hops)?;
            hops.push(descriptor.clone());
            Ok(())
        }
        PathExpr::Cast { base, .. } => collect(base, hops),
        PathExpr::Field { name, .. } => Err(PathError::UnsupportedExpression(format!(
            "field access `{name}`"
        ))),
        PathExpr::MethodCall { name, .. } => Err(PathError::UnsupportedExpression(format!(
            "method call `{name}`"
        ))),
    }
}
