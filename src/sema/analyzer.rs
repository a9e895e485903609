// src/sema/analyzer.rs
//
// Analysis driver: runs resolution, inference, and validation over one
// compilation unit, in that order, against shared component instances.
//
// Passes after resolution assume bindings are in place; each phase
// boundary checks the sink's error ceiling and stops early once it
// trips.

use crate::ast::{NodeId, NodeKind, SyntaxTree};
use crate::errors::{Diagnostic, DiagnosticSink, Severity, SinkStatistics};
use crate::intern::Interner;
use crate::sema::infer::{InferenceEngine, InferenceStatistics};
use crate::sema::profile::Profile;
use crate::sema::resolve::{Resolution, Resolver};
use crate::sema::symbol_table::{SymbolTable, SymbolTableStatistics};
use crate::sema::type_arena::{TypeArena, TypeArenaStatistics, TypeId};
use crate::sema::validator::{SemanticValidator, ValidatorStatistics};

/// Aggregated counters from every component, for logging and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisStatistics {
    pub symbols: SymbolTableStatistics,
    pub types: TypeArenaStatistics,
    pub inference: InferenceStatistics,
    pub validator: ValidatorStatistics,
    pub diagnostics: SinkStatistics,
}

/// One semantic analysis run over one compilation unit.
pub struct Analyzer {
    pub table: SymbolTable,
    pub arena: TypeArena,
    pub engine: InferenceEngine,
    pub validator: SemanticValidator,
    pub sink: DiagnosticSink,
    resolution: Resolution,
}

impl Analyzer {
    pub fn new(file: impl Into<String>, profile: Profile) -> Self {
        Self {
            table: SymbolTable::new(),
            arena: TypeArena::new(),
            engine: InferenceEngine::new(),
            validator: SemanticValidator::new(profile),
            sink: DiagnosticSink::new(file),
            resolution: Resolution::default(),
        }
    }

    pub fn with_max_errors(file: impl Into<String>, profile: Profile, max_errors: usize) -> Self {
        let file = file.into();
        let mut analyzer = Self::new(file.clone(), profile);
        analyzer.sink = DiagnosticSink::with_max_errors(file, max_errors);
        analyzer
    }

    /// Run all passes over the tree. The tree is mutated only to record
    /// symbol bindings on nodes.
    #[tracing::instrument(skip_all, fields(file = %tree.file()))]
    pub fn analyze(&mut self, tree: &mut SyntaxTree, interner: &Interner) {
        self.resolution = Resolver::new(
            tree,
            &mut self.table,
            &mut self.arena,
            interner,
            &mut self.sink,
        )
        .run();
        if self.sink.should_stop_compilation() {
            return;
        }

        self.engine.generate(
            tree,
            &mut self.arena,
            &self.resolution,
            interner,
            &mut self.sink,
        );
        self.engine
            .solve_constraints(&mut self.arena, interner, &mut self.sink);
        if self.sink.should_stop_compilation() {
            return;
        }

        self.validate(tree, interner);

        let stats = self.statistics();
        tracing::debug!(
            symbols = stats.symbols.symbols,
            types = stats.types.types_interned,
            constraints = stats.inference.constraints_solved,
            errors = stats.diagnostics.errors,
            "analysis complete"
        );
    }

    fn validate(&mut self, tree: &SyntaxTree, interner: &Interner) {
        let Some(root) = tree.root() else {
            return;
        };
        let mut functions = Vec::new();
        self.validate_node(tree, root, interner, &mut functions);
        for func in functions {
            self.validator
                .analyze_function_control_flow(tree, func, interner, &mut self.sink);
        }
        self.validator.analyze_control_flow(tree, root);
    }

    /// Source-order walk feeding the validator: reads before the
    /// statement that consumes them, declarations and assignments after
    /// their right-hand sides
    fn validate_node(
        &mut self,
        tree: &SyntaxTree,
        node: NodeId,
        interner: &Interner,
        functions: &mut Vec<NodeId>,
    ) {
        match tree.kind(node) {
            NodeKind::Function { .. } => {
                functions.push(node);
                for &child in tree.children(node) {
                    self.validate_node(tree, child, interner, functions);
                }
            }
            NodeKind::VarDecl { .. } => {
                if let Some(init) = tree.var_initializer(node) {
                    self.validate_node(tree, init, interner, functions);
                }
                self.validator.analyze_variable_declaration(tree, node);
            }
            NodeKind::Assignment => {
                if let Some(value) = tree.assignment_value(node) {
                    self.validate_node(tree, value, interner, functions);
                }
                // A bare identifier target is a write, not a read; any
                // other target shape reads its operands
                if let Some(target) = tree.assignment_target(node) {
                    if !matches!(tree.kind(target), NodeKind::Identifier(_)) {
                        self.validate_node(tree, target, interner, functions);
                    }
                }
                self.validator.analyze_assignment(tree, node);
            }
            NodeKind::Identifier(_) => {
                self.validator.analyze_identifier_usage(
                    tree,
                    node,
                    &self.table,
                    interner,
                    &mut self.sink,
                );
            }
            NodeKind::Return => {
                for &child in tree.children(node) {
                    self.validate_node(tree, child, interner, functions);
                }
                self.validator.analyze_return_statement(node);
            }
            _ => {
                for &child in tree.children(node) {
                    self.validate_node(tree, child, interner, functions);
                }
            }
        }
    }

    /// Resolved type of a node after analysis
    pub fn node_type(&self, node: NodeId) -> Option<TypeId> {
        self.engine.resolved_node_type(&self.arena, node)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.sink.diagnostics()
    }

    /// Error-severity diagnostics only
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.sink
            .diagnostics()
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.sink.has_errors()
    }

    pub fn statistics(&self) -> AnalysisStatistics {
        AnalysisStatistics {
            symbols: self.table.statistics(),
            types: self.arena.statistics(),
            inference: self.engine.statistics(),
            validator: self.validator.statistics(),
            diagnostics: self.sink.statistics(),
        }
    }
}
