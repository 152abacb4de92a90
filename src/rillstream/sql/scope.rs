//! Parent-chained symbol tables.
//!
//! One scope is created per compiled (sub)query. Lookups search the current
//! scope first and then walk outward through the parent chain; insertions
//! only ever touch the current scope. That asymmetry lets a nested query
//! introduce local names without leaking them upward, while still seeing
//! everything visible to its enclosing query.

use std::sync::Arc;

use crate::rillstream::sql::error::{SqlError, SqlResult};
use crate::rillstream::sql::schema::TypedField;

/// A name-to-symbol mapping local to one compiled query region.
///
/// Symbols are kept in insertion order: a non-root query's output scope must
/// expose its selected fields in their declared order, and iteration order
/// is part of that contract.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<TypedField>,
    parent: Option<Arc<SymbolTable>>,
}

impl SymbolTable {
    /// Create a root scope with no parent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a child scope layered on the given parent.
    pub fn with_parent(parent: Arc<SymbolTable>) -> Self {
        Self {
            symbols: Vec::new(),
            parent: Some(parent),
        }
    }

    /// Insert a symbol into this scope only. A symbol with the same name
    /// already present locally is replaced; ancestors are never mutated,
    /// so a local symbol shadows any ancestor of the same name.
    pub fn add_symbol(&mut self, symbol: TypedField) {
        if let Some(existing) = self.symbols.iter_mut().find(|s| s.name == symbol.name) {
            *existing = symbol;
        } else {
            self.symbols.push(symbol);
        }
    }

    /// Resolve a name against this scope, then each ancestor outward.
    /// Returns the first match, or [`SqlError::UnresolvedField`] if the
    /// chain is exhausted.
    pub fn resolve(&self, name: &str) -> SqlResult<TypedField> {
        if let Some(symbol) = self.symbols.iter().find(|s| s.name == name) {
            return Ok(symbol.clone());
        }
        match &self.parent {
            Some(parent) => parent.resolve(name),
            None => Err(SqlError::unresolved_field(name)),
        }
    }

    /// Symbols defined directly in this scope, in insertion order.
    pub fn local_symbols(&self) -> &[TypedField] {
        &self.symbols
    }

    /// The parent scope, if any.
    pub fn parent(&self) -> Option<&Arc<SymbolTable>> {
        self.parent.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rillstream::sql::schema::FieldType;

    #[test]
    fn test_resolve_local() {
        let mut scope = SymbolTable::new();
        scope.add_symbol(TypedField::new("id", FieldType::Integer));

        let symbol = scope.resolve("id").unwrap();
        assert_eq!(symbol.field_type, FieldType::Integer);
    }

    #[test]
    fn test_resolve_walks_parent_chain() {
        let mut root = SymbolTable::new();
        root.add_symbol(TypedField::new("outer", FieldType::String));
        let child = SymbolTable::with_parent(Arc::new(root));

        assert!(child.resolve("outer").is_ok());
        assert!(child.resolve("missing").is_err());
    }

    #[test]
    fn test_child_shadows_without_mutating_parent() {
        let mut root = SymbolTable::new();
        root.add_symbol(TypedField::new("x", FieldType::Integer));
        let root = Arc::new(root);

        let mut child = SymbolTable::with_parent(Arc::clone(&root));
        child.add_symbol(TypedField::new("x", FieldType::String));

        assert_eq!(child.resolve("x").unwrap().field_type, FieldType::String);
        assert_eq!(root.resolve("x").unwrap().field_type, FieldType::Integer);
    }

    #[test]
    fn test_local_symbols_preserve_insertion_order() {
        let mut scope = SymbolTable::new();
        scope.add_symbol(TypedField::new("b", FieldType::Integer));
        scope.add_symbol(TypedField::new("a", FieldType::Integer));

        let names: Vec<&str> = scope.local_symbols().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
