// src/sema/validator.rs
//
// Semantic validation rules beyond typing: feature gating by profile,
// definite assignment, return-path checking, and reachability marking.
//
// Definite assignment is deliberately path-insensitive: one state per
// variable, flipped by any assignment. A read while the state says
// unassigned reports every time it happens; an assignment anywhere
// (even inside a branch) counts as initializing.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::{NodeId, NodeKind, SyntaxTree, TypeAnnotation};
use crate::errors::{DiagnosticSink, SemanticError, Suggestion};
use crate::intern::Interner;
use crate::sema::profile::{has_feature, lowest_profile_with, Feature, Profile};
use crate::sema::symbol_table::{SymbolId, SymbolTable};
use crate::span::Span;

/// Per-variable assignment state, a single flag by design
#[derive(Debug, Clone, Copy)]
pub struct AssignmentState {
    pub initialized: bool,
}

/// Running counters exposed for diagnostics and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidatorStatistics {
    pub declarations_tracked: usize,
    pub assignments_seen: usize,
    pub functions_checked: usize,
    pub reachable_nodes: usize,
}

#[derive(Debug)]
pub struct SemanticValidator {
    profile: Profile,
    assignment: FxHashMap<SymbolId, AssignmentState>,
    return_paths: Vec<NodeId>,
    reachable: FxHashSet<NodeId>,
    stats: ValidatorStatistics,
}

impl SemanticValidator {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            assignment: FxHashMap::default(),
            return_paths: Vec::new(),
            reachable: FxHashSet::default(),
            stats: ValidatorStatistics::default(),
        }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    // ------------------------------------------------------------------
    // Feature gating
    // ------------------------------------------------------------------

    /// Check that a feature is granted by the active profile, reporting
    /// a violation with the lowest granting profile if it is not
    pub fn validate_feature(
        &mut self,
        feature: Feature,
        span: Span,
        sink: &mut DiagnosticSink,
    ) -> bool {
        if has_feature(self.profile, feature) {
            return true;
        }
        self.report_profile_violation(feature, span, sink);
        false
    }

    pub fn report_profile_violation(
        &mut self,
        feature: Feature,
        span: Span,
        sink: &mut DiagnosticSink,
    ) {
        let granting = lowest_profile_with(feature);
        sink.report_with_suggestions(
            SemanticError::ProfileViolation {
                feature: feature.name().to_string(),
                profile: self.profile.name().to_string(),
                span: span.into(),
            },
            span,
            vec![Suggestion::text(
                format!("'{}' is available from profile '{}'", feature, granting),
                1.0,
            )],
        );
    }

    // ------------------------------------------------------------------
    // Definite assignment
    // ------------------------------------------------------------------

    /// Start tracking a declared variable; one with an initializer is
    /// born assigned
    pub fn analyze_variable_declaration(&mut self, tree: &SyntaxTree, decl: NodeId) {
        let Some(symbol) = tree.binding(decl) else {
            return;
        };
        let initialized = tree.var_initializer(decl).is_some();
        self.assignment.insert(symbol, AssignmentState { initialized });
        self.stats.declarations_tracked += 1;
    }

    /// A read of an identifier. Only variables this validator has seen
    /// declared are checked; parameters and functions are always
    /// initialized by construction.
    pub fn analyze_identifier_usage(
        &mut self,
        tree: &SyntaxTree,
        node: NodeId,
        table: &SymbolTable,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) {
        let Some(symbol) = tree.binding(node) else {
            return;
        };
        let Some(state) = self.assignment.get(&symbol) else {
            return;
        };
        if state.initialized {
            return;
        }
        let span = tree.span(node);
        let name = interner.resolve(table.symbol(symbol).name).to_string();
        sink.report_with_suggestions(
            SemanticError::UseBeforeDefinition {
                name: name.clone(),
                span: span.into(),
            },
            span,
            vec![Suggestion::text(
                format!("assign '{}' before this point", name),
                0.8,
            )],
        );
    }

    /// An assignment statement. A tracked target becomes initialized
    /// from here on (strong update).
    pub fn analyze_assignment(&mut self, tree: &SyntaxTree, assign: NodeId) {
        self.stats.assignments_seen += 1;
        let Some(target) = tree.assignment_target(assign) else {
            return;
        };
        if !matches!(tree.kind(target), NodeKind::Identifier(_)) {
            return;
        }
        let Some(symbol) = tree.binding(target) else {
            return;
        };
        if let Some(state) = self.assignment.get_mut(&symbol) {
            state.initialized = true;
        }
    }

    // ------------------------------------------------------------------
    // Return paths and reachability
    // ------------------------------------------------------------------

    pub fn analyze_return_statement(&mut self, ret: NodeId) {
        self.return_paths.push(ret);
    }

    pub fn return_path_count(&self) -> usize {
        self.return_paths.len()
    }

    /// A function whose declared return type is non-void must contain at
    /// least one return statement
    pub fn analyze_function_control_flow(
        &mut self,
        tree: &SyntaxTree,
        func: NodeId,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) {
        self.stats.functions_checked += 1;
        let NodeKind::Function { name, .. } = tree.kind(func) else {
            return;
        };
        let needs_return = match tree.function_return_type(func) {
            Some(TypeAnnotation::Void) | None => false,
            Some(_) => true,
        };
        if !needs_return {
            return;
        }
        let has_path = self
            .return_paths
            .iter()
            .any(|&ret| is_within(tree, ret, func));
        if has_path {
            return;
        }
        let span = tree.span(func);
        sink.report(
            SemanticError::MissingReturn {
                name: interner.resolve(*name).to_string(),
                span: span.into(),
            },
            span,
        );
    }

    /// Mark the reachable subtree. Statements in a block after a return
    /// statement are not marked.
    pub fn analyze_control_flow(&mut self, tree: &SyntaxTree, node: NodeId) {
        self.reachable.insert(node);
        match tree.kind(node) {
            NodeKind::Block => {
                for &child in tree.children(node) {
                    self.analyze_control_flow(tree, child);
                    if matches!(tree.kind(child), NodeKind::Return) {
                        break;
                    }
                }
            }
            _ => {
                for &child in tree.children(node) {
                    self.analyze_control_flow(tree, child);
                }
            }
        }
    }

    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.reachable.contains(&node)
    }

    pub fn statistics(&self) -> ValidatorStatistics {
        ValidatorStatistics {
            reachable_nodes: self.reachable.len(),
            ..self.stats
        }
    }
}

/// Walk the parent chain to test ancestry
fn is_within(tree: &SyntaxTree, node: NodeId, ancestor: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(n) = current {
        if n == ancestor {
            return true;
        }
        current = tree.parent(n);
    }
    false
}
