//! Lexical scopes for name binding during tree construction.
//!
//! A [`SymbolTable`] is a stack of named scopes. Lookups walk from the
//! innermost scope outwards, so inner bindings shadow outer ones. The root
//! scope always exists.
//!
//! Prefer [`SymbolTable::enter_scope`] or [`SymbolTable::scoped`] over
//! manual `push_scope`/`pop_scope` pairs: both pop the scope even when the
//! caller returns early or unwinds, and a guarded scope cannot be popped by
//! hand.

use crate::error::ScopeError;
use crate::node::NodeId;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

/// Name of the scope every table starts with.
pub const ROOT_SCOPE: &str = "root";

/// One level of the scope stack.
#[derive(Debug, Clone)]
pub struct Scope {
    name: String,
    bindings: HashMap<String, NodeId>,
}

impl Scope {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lookup within this scope only.
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.bindings.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    // Never empty: index 0 is the root scope.
    scopes: Vec<Scope>,
    // Scopes below this depth are owned by the root or a live guard and
    // cannot be popped manually.
    floor: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ROOT_SCOPE)],
            floor: 1,
        }
    }

    fn innermost(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 1]
    }

    fn innermost_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Bind `name` in the innermost scope.
    pub fn define(&mut self, name: impl Into<String>, node: NodeId) -> Result<(), ScopeError> {
        let name = name.into();
        let scope = self.innermost_mut();
        if scope.bindings.contains_key(&name) {
            return Err(ScopeError::DuplicateBinding {
                name,
                scope: scope.name.clone(),
            });
        }
        tracing::trace!(name = %name, scope = %scope.name, "define");
        scope.bindings.insert(name, node);
        Ok(())
    }

    /// Rebind a visible name in the scope where it is found.
    pub fn update(&mut self, name: &str, node: NodeId) -> Result<(), ScopeError> {
        let scope = self
            .scopes
            .iter_mut()
            .rev()
            .find(|s| s.bindings.contains_key(name))
            .ok_or_else(|| ScopeError::UnboundName(name.to_string()))?;
        tracing::trace!(name, scope = %scope.name, "update");
        scope.bindings.insert(name.to_string(), node);
        Ok(())
    }

    /// Innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> Result<NodeId, ScopeError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|s| s.get(name))
            .ok_or_else(|| ScopeError::UnboundName(name.to_string()))
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.innermost().bindings.contains_key(name)
    }

    pub fn push_scope(&mut self, name: impl Into<String>) {
        let scope = Scope::new(name);
        tracing::trace!(scope = %scope.name, depth = self.scopes.len() + 1, "push scope");
        self.scopes.push(scope);
    }

    /// Discard the innermost scope and its bindings.
    ///
    /// Fails for the root scope and for a scope held by a [`ScopeGuard`].
    pub fn pop_scope(&mut self) -> Result<Scope, ScopeError> {
        if self.scopes.len() == 1 {
            return Err(ScopeError::RootScope);
        }
        if self.scopes.len() <= self.floor {
            return Err(ScopeError::GuardedScope(self.innermost().name.clone()));
        }
        let scope = self.scopes.pop().ok_or(ScopeError::RootScope)?;
        tracing::trace!(scope = %scope.name, depth = self.scopes.len(), "pop scope");
        Ok(scope)
    }

    /// Push a scope that is popped when the returned guard drops.
    ///
    /// While the guard lives its scope cannot be popped manually. Scopes
    /// pushed on top of it and left open are popped along with it.
    pub fn enter_scope(&mut self, name: impl Into<String>) -> ScopeGuard<'_> {
        let outer_floor = self.floor;
        self.push_scope(name);
        self.floor = self.scopes.len();
        ScopeGuard {
            table: self,
            outer_floor,
        }
    }

    /// Run `f` inside a fresh scope.
    pub fn scoped<R>(&mut self, name: impl Into<String>, f: impl FnOnce(&mut Self) -> R) -> R {
        let mut guard = self.enter_scope(name);
        f(&mut guard)
    }

    /// Number of scopes, including the root.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn current_scope_name(&self) -> &str {
        &self.innermost().name
    }

    /// Scopes from the root inwards.
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Scope pushed by [`SymbolTable::enter_scope`]; pops it on drop.
pub struct ScopeGuard<'a> {
    table: &'a mut SymbolTable,
    outer_floor: usize,
}

impl Deref for ScopeGuard<'_> {
    type Target = SymbolTable;

    fn deref(&self) -> &SymbolTable {
        self.table
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut SymbolTable {
        self.table
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        let table = &mut *self.table;
        // `floor` is the depth right after this guard's push.
        let keep = table.floor - 1;
        while table.scopes.len() > keep {
            if let Some(scope) = table.scopes.pop() {
                tracing::trace!(scope = %scope.name, depth = table.scopes.len(), "pop scope");
            }
        }
        table.floor = self.outer_floor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Ast;
    use crate::types::Type;

    fn ids(n: usize) -> Vec<NodeId> {
        let mut ast = Ast::new();
        (0..n).map(|i| ast.int32(i as i32)).collect()
    }

    #[test]
    fn test_define_and_lookup() {
        let n = ids(1);
        let mut table = SymbolTable::new();
        table.define("x", n[0]).unwrap();
        assert_eq!(table.lookup("x").unwrap(), n[0]);
        assert_eq!(
            table.lookup("y").unwrap_err(),
            ScopeError::UnboundName("y".into())
        );
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let n = ids(2);
        let mut table = SymbolTable::new();
        table.define("x", n[0]).unwrap();
        assert_eq!(
            table.define("x", n[1]).unwrap_err(),
            ScopeError::DuplicateBinding {
                name: "x".into(),
                scope: ROOT_SCOPE.into()
            }
        );
        assert_eq!(table.lookup("x").unwrap(), n[0]);
    }

    #[test]
    fn test_shadowing() {
        let n = ids(2);
        let mut table = SymbolTable::new();
        table.define("x", n[0]).unwrap();
        table.push_scope("inner");
        table.define("x", n[1]).unwrap();
        assert_eq!(table.lookup("x").unwrap(), n[1]);
        table.pop_scope().unwrap();
        assert_eq!(table.lookup("x").unwrap(), n[0]);
    }

    #[test]
    fn test_update_rebinds_where_found() {
        let n = ids(2);
        let mut table = SymbolTable::new();
        table.define("x", n[0]).unwrap();
        table.push_scope("inner");
        table.update("x", n[1]).unwrap();
        assert!(!table.contains_local("x"));
        table.pop_scope().unwrap();
        assert_eq!(table.lookup("x").unwrap(), n[1]);

        assert_eq!(
            table.update("missing", n[0]).unwrap_err(),
            ScopeError::UnboundName("missing".into())
        );
    }

    #[test]
    fn test_root_cannot_be_popped() {
        let mut table = SymbolTable::new();
        assert_eq!(table.pop_scope().unwrap_err(), ScopeError::RootScope);
        assert_eq!(table.depth(), 1);
        assert_eq!(table.current_scope_name(), ROOT_SCOPE);
    }

    #[test]
    fn test_guard_pops_on_drop() {
        let n = ids(1);
        let mut table = SymbolTable::new();
        {
            let mut guard = table.enter_scope("fn");
            guard.define("local", n[0]).unwrap();
            assert_eq!(guard.depth(), 2);
            assert_eq!(guard.current_scope_name(), "fn");
        }
        assert_eq!(table.depth(), 1);
        assert!(table.lookup("local").is_err());
    }

    #[test]
    fn test_guard_pops_on_early_return() {
        fn bind_twice(table: &mut SymbolTable, id: NodeId) -> Result<(), ScopeError> {
            let mut guard = table.enter_scope("body");
            guard.define("x", id)?;
            guard.define("x", id)?;
            Ok(())
        }

        let n = ids(1);
        let mut table = SymbolTable::new();
        assert!(bind_twice(&mut table, n[0]).is_err());
        assert_eq!(table.depth(), 1);
    }

    #[test]
    fn test_guarded_scope_cannot_be_popped() {
        let n = ids(1);
        let mut table = SymbolTable::new();
        table.push_scope("outer");
        table.define("keep", n[0]).unwrap();
        {
            let mut guard = table.enter_scope("inner");
            assert_eq!(
                guard.pop_scope().unwrap_err(),
                ScopeError::GuardedScope("inner".into())
            );
            assert_eq!(guard.depth(), 3);
        }
        assert_eq!(table.depth(), 2);
        assert_eq!(table.current_scope_name(), "outer");
        assert_eq!(table.lookup("keep").unwrap(), n[0]);
        table.pop_scope().unwrap();
        assert_eq!(table.depth(), 1);
    }

    #[test]
    fn test_guard_pops_scopes_left_open() {
        let mut table = SymbolTable::new();
        {
            let mut guard = table.enter_scope("fn");
            guard.push_scope("a");
            guard.push_scope("b");
            guard.pop_scope().unwrap();
            assert_eq!(guard.current_scope_name(), "a");
        }
        assert_eq!(table.depth(), 1);
        assert_eq!(table.current_scope_name(), ROOT_SCOPE);
    }

    #[test]
    fn test_nested_guards_restore_floor() {
        let mut table = SymbolTable::new();
        {
            let mut outer = table.enter_scope("outer");
            {
                let mut inner = outer.enter_scope("inner");
                assert!(inner.pop_scope().is_err());
            }
            assert_eq!(outer.depth(), 2);
            assert_eq!(
                outer.pop_scope().unwrap_err(),
                ScopeError::GuardedScope("outer".into())
            );
            outer.push_scope("manual");
            outer.pop_scope().unwrap();
        }
        table.push_scope("free");
        table.pop_scope().unwrap();
        assert_eq!(table.depth(), 1);
    }

    #[test]
    fn test_scoped_closure() {
        let n = ids(2);
        let mut table = SymbolTable::new();
        let found = table.scoped("outer", |t| {
            t.define("a", n[0]).unwrap();
            t.scoped("inner", |t| {
                t.define("b", n[1]).unwrap();
                (t.depth(), t.lookup("a").unwrap())
            })
        });
        assert_eq!(found, (3, n[0]));
        assert_eq!(table.depth(), 1);
    }

    #[test]
    fn test_guard_pops_on_panic() {
        let n = ids(1);
        let mut table = SymbolTable::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            table.scoped("doomed", |t| {
                t.define("x", n[0]).unwrap();
                panic!("boom");
            })
        }));
        assert!(result.is_err());
        assert_eq!(table.depth(), 1);
    }

    #[test]
    fn test_table_holds_ids_not_nodes() {
        let mut ast = Ast::new();
        let decl = ast
            .declare(crate::node::VariableDeclaration::new("x", Type::INT32))
            .unwrap();
        let mut table = SymbolTable::new();
        table.define("x", decl).unwrap();
        let _block = ast.block("b", vec![decl]).unwrap();
        assert!(ast.parent(table.lookup("x").unwrap()).unwrap().is_some());
    }
}
