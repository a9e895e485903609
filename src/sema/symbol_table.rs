// src/sema/symbol_table.rs
//
// Scope tree, symbol declarations, and lexical resolution.
//
// One table per compilation unit. Scopes form a tree; a separate LIFO
// stack tracks the currently active lexical path. Mis-pairing push and
// pop is a bug in the caller, not a user diagnostic, and panics.

use crate::ast::NodeId;
use crate::intern::Symbol;
use crate::sema::scope::{Scope, ScopeId, ScopeKind};
use crate::span::Span;

/// Handle to a declared symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of item a symbol names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Variable,
    Parameter,
    Constant,
    StructType,
    Module,
}

/// Access boundary attached to a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    ModuleLocal,
    Public,
}

/// Module identity used for visibility checks. `module` is the module
/// instance, `group` the package/module group it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleRef {
    pub module: u32,
    pub group: u32,
}

/// A declared symbol. Immutable after declaration; lives for the
/// compilation unit.
#[derive(Debug)]
pub struct SymbolData {
    pub name: Symbol,
    pub kind: SymbolKind,
    pub node: NodeId,
    pub span: Span,
    pub visibility: Visibility,
    pub scope: ScopeId,
}

/// Declaration failure: the name already exists in the target scope.
/// Carries the existing symbol so the caller can point at the first
/// declaration site.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateDeclaration {
    pub existing: SymbolId,
}

/// Running counters exposed for diagnostics and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymbolTableStatistics {
    pub symbols: usize,
    pub scopes: usize,
    pub bindings: usize,
}

#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<SymbolData>,
    stack: Vec<ScopeId>,
    bindings: usize,
}

impl SymbolTable {
    /// Create a table with the global scope created and active
    pub fn new() -> Self {
        let mut table = Self {
            scopes: Vec::new(),
            symbols: Vec::new(),
            stack: Vec::new(),
            bindings: 0,
        };
        let global = table.create_scope(None, ScopeKind::Global);
        debug_assert_eq!(global, ScopeId::GLOBAL);
        table.stack.push(global);
        table
    }

    // ------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------

    pub fn create_scope(&mut self, parent: Option<ScopeId>, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(id, parent, kind));
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Top of the active scope stack
    pub fn current_scope(&self) -> ScopeId {
        *self
            .stack
            .last()
            .expect("scope stack is never empty while a unit is live")
    }

    pub fn push_scope(&mut self, scope: ScopeId) {
        debug_assert!(
            !self.stack.contains(&scope),
            "scope {:?} is already active",
            scope
        );
        debug_assert!(
            self.scopes[scope.index()].parent == Some(self.current_scope()),
            "pushed scope must be a child of the current scope"
        );
        self.stack.push(scope);
    }

    /// Pop the current scope. Popping the global scope or a scope that
    /// is not on top is a programmer error and panics.
    pub fn pop_scope(&mut self, scope: ScopeId) {
        if self.stack.len() <= 1 {
            panic!("cannot pop the global scope");
        }
        let top = self.stack.pop().expect("checked above");
        if top != scope {
            panic!(
                "scope stack corrupted: popped {:?} while {:?} was on top",
                scope, top
            );
        }
    }

    /// Depth of the active scope stack (global scope counts as 1)
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    // ------------------------------------------------------------------
    // Declarations and resolution
    // ------------------------------------------------------------------

    /// Declare a symbol in the current scope. Fails if the same name is
    /// already declared there; distinct scopes may reuse a name
    /// (shadowing).
    pub fn declare_symbol(
        &mut self,
        name: Symbol,
        kind: SymbolKind,
        node: NodeId,
        span: Span,
        visibility: Visibility,
    ) -> Result<SymbolId, DuplicateDeclaration> {
        let scope = self.current_scope();
        if let Some(existing) = self.scopes[scope.index()].get(name) {
            return Err(DuplicateDeclaration { existing });
        }

        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(SymbolData {
            name,
            kind,
            node,
            span,
            visibility,
            scope,
        });
        self.scopes[scope.index()].insert(name, id);
        Ok(id)
    }

    pub fn symbol(&self, id: SymbolId) -> &SymbolData {
        &self.symbols[id.index()]
    }

    /// Resolve a name by walking the scope chain from `scope_hint`
    /// outward, returning the innermost match.
    pub fn resolve_identifier_from(&self, name: Symbol, scope_hint: ScopeId) -> Option<SymbolId> {
        let mut current = Some(scope_hint);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            if let Some(symbol) = scope.get(name) {
                return Some(symbol);
            }
            current = scope.parent;
        }
        None
    }

    /// Resolve a name against the currently active scope chain
    pub fn resolve_identifier(&self, name: Symbol) -> Option<SymbolId> {
        self.resolve_identifier_from(name, self.current_scope())
    }

    /// Record one identifier-to-symbol binding (statistics only; the
    /// binding itself lives on the tree node)
    pub fn record_binding(&mut self) {
        self.bindings += 1;
    }

    /// All names visible from the active scope chain, innermost first.
    /// Feeds spelling suggestions for undefined symbols.
    pub fn visible_names(&self) -> Vec<Symbol> {
        let mut names = Vec::new();
        let mut current = Some(self.current_scope());
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            names.extend(scope.names());
            current = scope.parent;
        }
        names
    }

    /// Visibility enforcement for cross-module references: private
    /// requires the same module instance, module-local the same group,
    /// public is always accessible.
    pub fn is_symbol_accessible(
        from_module: ModuleRef,
        visibility: Visibility,
        symbol_module: ModuleRef,
    ) -> bool {
        match visibility {
            Visibility::Private => from_module.module == symbol_module.module,
            Visibility::ModuleLocal => from_module.group == symbol_module.group,
            Visibility::Public => true,
        }
    }

    pub fn statistics(&self) -> SymbolTableStatistics {
        SymbolTableStatistics {
            symbols: self.symbols.len(),
            scopes: self.scopes.len(),
            bindings: self.bindings,
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 1, 1, 1)
    }

    fn declare(table: &mut SymbolTable, name: Symbol) -> Result<SymbolId, DuplicateDeclaration> {
        table.declare_symbol(
            name,
            SymbolKind::Variable,
            NodeId(0),
            span(),
            Visibility::Private,
        )
    }

    #[test]
    fn duplicate_in_same_scope_fails() {
        let mut table = SymbolTable::new();
        let name = Symbol(0);
        let first = declare(&mut table, name).unwrap();
        let err = declare(&mut table, name).unwrap_err();
        assert_eq!(err.existing, first);
    }

    #[test]
    fn same_name_in_nested_scope_shadows() {
        let mut table = SymbolTable::new();
        let name = Symbol(0);
        let outer = declare(&mut table, name).unwrap();

        let inner_scope = table.create_scope(Some(ScopeId::GLOBAL), ScopeKind::Block);
        table.push_scope(inner_scope);
        let inner = declare(&mut table, name).unwrap();

        assert_ne!(outer, inner);
        assert_eq!(table.resolve_identifier(name), Some(inner));

        table.pop_scope(inner_scope);
        assert_eq!(table.resolve_identifier(name), Some(outer));
    }

    #[test]
    fn resolution_walks_three_levels() {
        let mut table = SymbolTable::new();
        let name = Symbol(0);
        let global = declare(&mut table, name).unwrap();

        let func_scope = table.create_scope(Some(ScopeId::GLOBAL), ScopeKind::Function);
        table.push_scope(func_scope);
        let func = declare(&mut table, name).unwrap();

        let block_scope = table.create_scope(Some(func_scope), ScopeKind::Block);
        table.push_scope(block_scope);
        let block = declare(&mut table, name).unwrap();

        assert_eq!(table.resolve_identifier(name), Some(block));
        table.pop_scope(block_scope);
        assert_eq!(table.resolve_identifier(name), Some(func));
        table.pop_scope(func_scope);
        assert_eq!(table.resolve_identifier(name), Some(global));
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        let mut table = SymbolTable::new();
        declare(&mut table, Symbol(0)).unwrap();
        assert_eq!(table.resolve_identifier(Symbol(99)), None);
    }

    #[test]
    #[should_panic(expected = "scope stack corrupted")]
    fn popping_wrong_scope_panics() {
        let mut table = SymbolTable::new();
        let a = table.create_scope(Some(ScopeId::GLOBAL), ScopeKind::Block);
        let b = table.create_scope(Some(ScopeId::GLOBAL), ScopeKind::Block);
        table.push_scope(a);
        table.pop_scope(b);
    }

    #[test]
    #[should_panic(expected = "already active")]
    fn repushing_an_active_scope_panics() {
        let mut table = SymbolTable::new();
        let a = table.create_scope(Some(ScopeId::GLOBAL), ScopeKind::Block);
        table.push_scope(a);
        table.push_scope(a);
    }

    #[test]
    #[should_panic(expected = "cannot pop the global scope")]
    fn popping_global_scope_panics() {
        let mut table = SymbolTable::new();
        table.pop_scope(ScopeId::GLOBAL);
    }

    #[test]
    fn visibility_rules() {
        let here = ModuleRef { module: 1, group: 1 };
        let same_group = ModuleRef { module: 2, group: 1 };
        let elsewhere = ModuleRef { module: 3, group: 2 };

        assert!(SymbolTable::is_symbol_accessible(
            here,
            Visibility::Private,
            here
        ));
        assert!(!SymbolTable::is_symbol_accessible(
            same_group,
            Visibility::Private,
            here
        ));
        assert!(SymbolTable::is_symbol_accessible(
            same_group,
            Visibility::ModuleLocal,
            here
        ));
        assert!(!SymbolTable::is_symbol_accessible(
            elsewhere,
            Visibility::ModuleLocal,
            here
        ));
        assert!(SymbolTable::is_symbol_accessible(
            elsewhere,
            Visibility::Public,
            here
        ));
    }

    #[test]
    fn statistics_track_declarations_and_scopes() {
        let mut table = SymbolTable::new();
        declare(&mut table, Symbol(0)).unwrap();
        declare(&mut table, Symbol(1)).unwrap();
        table.create_scope(Some(ScopeId::GLOBAL), ScopeKind::Block);
        table.record_binding();

        let stats = table.statistics();
        assert_eq!(stats.symbols, 2);
        assert_eq!(stats.scopes, 2);
        assert_eq!(stats.bindings, 1);
    }
}
