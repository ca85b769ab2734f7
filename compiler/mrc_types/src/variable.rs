//! Variables and scopes.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::Type;

const PRINT_MARKER: &str = "$print";

/// An immutable `(name, type)` pair. Unique within its scope.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Variable {
    name: Arc<str>,
    ty: Type,
}

impl Variable {
    pub fn new(name: impl Into<Arc<str>>, ty: Type) -> Self {
        Variable {
            name: name.into(),
            ty,
        }
    }

    /// Synthetic output variable of the `index`-th statement, marking its
    /// result for printing. The `$` keeps it out of the user's namespace.
    pub fn print_marker(index: usize, ty: Type) -> Self {
        Variable::new(format!("{PRINT_MARKER}{index}"), ty)
    }

    pub fn is_print_marker(&self) -> bool {
        self.name.starts_with(PRINT_MARKER)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> Type {
        self.ty
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// A name to variable mapping.
///
/// Scopes never chain. A lambda gets a brand new scope holding only its
/// parameters, which is what keeps lambdas from capturing.
#[derive(Clone, Default, Debug)]
pub struct Scope {
    vars: FxHashMap<Arc<str>, Variable>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable. On a name clash the scope is left unchanged and the
    /// existing variable is returned.
    pub fn define(&mut self, var: Variable) -> Result<(), Variable> {
        if let Some(existing) = self.vars.get(var.name()) {
            return Err(existing.clone());
        }
        self.vars.insert(Arc::clone(&var.name), var);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redefinition_is_rejected() {
        let mut scope = Scope::new();
        assert!(scope.define(Variable::new("x", Type::INTEGER)).is_ok());
        let clash = scope.define(Variable::new("x", Type::FLOAT));
        assert_eq!(clash, Err(Variable::new("x", Type::INTEGER)));
        assert_eq!(scope.lookup("x").map(Variable::ty), Some(Type::INTEGER));
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn print_markers_are_recognized() {
        let marker = Variable::print_marker(3, Type::FLOAT);
        assert_eq!(marker.name(), "$print3");
        assert!(marker.is_print_marker());
        assert!(!Variable::new("printer", Type::FLOAT).is_print_marker());
    }
}
