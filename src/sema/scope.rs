// src/sema/scope.rs

use crate::intern::Symbol;
use crate::sema::symbol_table::SymbolId;
use rustc_hash::FxHashMap;

/// Handle to a scope in the symbol table's scope tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    /// The global scope is always the first scope created
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of lexical region a scope covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
}

/// One node in the scope tree. Scopes own the symbols declared directly
/// in them; lookup walks the parent chain.
#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    symbols: FxHashMap<Symbol, SymbolId>,
}

impl Scope {
    pub(crate) fn new(id: ScopeId, parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            id,
            parent,
            kind,
            symbols: FxHashMap::default(),
        }
    }

    /// Symbol declared directly in this scope under `name`, if any
    pub fn get(&self, name: Symbol) -> Option<SymbolId> {
        self.symbols.get(&name).copied()
    }

    pub(crate) fn insert(&mut self, name: Symbol, symbol: SymbolId) {
        self.symbols.insert(name, symbol);
    }

    /// Names declared directly in this scope
    pub fn names(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
