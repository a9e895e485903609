// src/sema/infer.rs
//
// Constraint-based type inference over syntax-tree nodes.
//
// Generation walks the tree, assigns every expression node a TypeId
// (concrete or a placeholder wrapping an inference variable), and queues
// typing constraints. Solving drains the queue monotonically: variables
// are only ever bound, never rebound to an incompatible type, and a
// failed constraint reports through the sink without stopping the
// solving of independent constraints.
//
// Numeric literals carry a default (i32 for integers, f64 for floats)
// on their inference variable; a constraint from the enclosing context
// may narrow the variable first, and the default applies only if the
// variable is still unbound when solving finishes. Variables without a
// default that survive solving are ambiguous-type errors.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::ast::{BinaryOp, NodeId, NodeKind, SyntaxTree};
use crate::errors::{DiagnosticSink, SemanticError, Suggestion};
use crate::intern::{Interner, Symbol};
use crate::sema::compatibility::{
    is_assignable, is_comparable_type, is_numeric_type, promote_arithmetic_types,
};
use crate::sema::resolve::{resolve_annotation, spelling_suggestion, Resolution};
use crate::sema::symbol_table::SymbolId;
use crate::sema::type_arena::{SemaType, TypeArena, TypeId, TypeIdVec};
use crate::span::Span;

/// Handle to an inference variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InferVarId(pub u32);

impl InferVarId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A typing fact queued for later resolution
#[derive(Debug, Clone)]
pub enum Constraint {
    Equality {
        a: TypeId,
        b: TypeId,
        span: Span,
    },
    Subtype {
        sub: TypeId,
        sup: TypeId,
        span: Span,
    },
    Numeric {
        ty: TypeId,
        span: Span,
    },
    Comparable {
        ty: TypeId,
        span: Span,
    },
    FunctionCall {
        func: TypeId,
        args: TypeIdVec,
        result: TypeId,
        span: Span,
    },
    ArrayAccess {
        array: TypeId,
        index: TypeId,
        element: TypeId,
        span: Span,
    },
    FieldAccess {
        object: TypeId,
        field: Symbol,
        result: TypeId,
        span: Span,
    },
}

/// Running counters exposed for diagnostics and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InferenceStatistics {
    pub vars_created: usize,
    pub constraints_generated: usize,
    pub constraints_solved: usize,
    pub nodes_typed: usize,
}

#[derive(Debug)]
pub struct InferenceEngine {
    /// Binding per variable, indexed by InferVarId; None = unbound
    bindings: Vec<Option<TypeId>>,
    /// Literal default per variable, applied only if still unbound after
    /// solving
    defaults: Vec<Option<TypeId>>,
    /// Creation span per variable, for ambiguity reporting
    var_spans: Vec<Span>,
    node_types: FxHashMap<NodeId, TypeId>,
    /// Declared/inferred type per symbol, derived from declaration nodes
    symbol_types: FxHashMap<SymbolId, TypeId>,
    queue: VecDeque<Constraint>,
    /// Declared return type of the enclosing function during generation
    return_types: Vec<TypeId>,
    stats: InferenceStatistics,
}

impl InferenceEngine {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            defaults: Vec::new(),
            var_spans: Vec::new(),
            node_types: FxHashMap::default(),
            symbol_types: FxHashMap::default(),
            queue: VecDeque::new(),
            return_types: Vec::new(),
            stats: InferenceStatistics::default(),
        }
    }

    // ------------------------------------------------------------------
    // Variables and node types
    // ------------------------------------------------------------------

    pub fn create_inference_var(&mut self, span: Span) -> InferVarId {
        let var = InferVarId(self.bindings.len() as u32);
        self.bindings.push(None);
        self.defaults.push(None);
        self.var_spans.push(span);
        self.stats.vars_created += 1;
        var
    }

    fn create_var_with_default(&mut self, span: Span, default: TypeId) -> InferVarId {
        let var = self.create_inference_var(span);
        self.defaults[var.index()] = Some(default);
        var
    }

    /// Placeholder type usable anywhere a TypeId is expected
    pub fn create_inferred_type(&mut self, arena: &mut TypeArena, span: Span) -> TypeId {
        let var = self.create_inference_var(span);
        arena.inferred_type(var)
    }

    /// Associate exactly one TypeId with a processed node
    pub fn set_node_type(&mut self, node: NodeId, ty: TypeId) {
        let previous = self.node_types.insert(node, ty);
        debug_assert!(previous.is_none(), "node {:?} typed twice", node);
        self.stats.nodes_typed += 1;
    }

    pub fn get_node_type(&self, node: NodeId) -> Option<TypeId> {
        self.node_types.get(&node).copied()
    }

    /// Node type with inference variables chased through their bindings
    pub fn resolved_node_type(&self, arena: &TypeArena, node: NodeId) -> Option<TypeId> {
        self.get_node_type(node).map(|ty| self.resolve(arena, ty))
    }

    pub fn symbol_type(&self, symbol: SymbolId) -> Option<TypeId> {
        self.symbol_types.get(&symbol).copied()
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.stats.constraints_generated += 1;
        self.queue.push_back(constraint);
    }

    pub fn statistics(&self) -> InferenceStatistics {
        self.stats
    }

    /// Chase a type through variable bindings to its current
    /// representative
    pub fn resolve(&self, arena: &TypeArena, ty: TypeId) -> TypeId {
        let mut current = ty;
        loop {
            match arena.get(current) {
                SemaType::Inferred(var) => match self.bindings[var.index()] {
                    Some(next) if next != current => current = next,
                    _ => return current,
                },
                _ => return current,
            }
        }
    }

    fn unbound_var(&self, arena: &TypeArena, ty: TypeId) -> Option<InferVarId> {
        match arena.get(ty) {
            SemaType::Inferred(var) if self.bindings[var.index()].is_none() => Some(*var),
            _ => None,
        }
    }

    /// Bind a variable, verifying compatibility if it is already bound.
    /// Bindings are monotonic: an established concrete binding is never
    /// replaced.
    fn bind(
        &mut self,
        arena: &TypeArena,
        var: InferVarId,
        ty: TypeId,
        span: Span,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) {
        let target = self.resolve(arena, ty);
        if let SemaType::Inferred(v) = arena.get(target) {
            if *v == var {
                return;
            }
        }

        match self.bindings[var.index()] {
            None => self.bindings[var.index()] = Some(target),
            Some(existing) => {
                let existing = self.resolve(arena, existing);
                if let Some(inner) = self.unbound_var(arena, existing) {
                    self.bind(arena, inner, target, span, interner, sink);
                } else if let Some(other) = self.unbound_var(arena, target) {
                    self.bind(arena, other, existing, span, interner, sink);
                } else if !is_assignable(arena, existing, target)
                    && !is_assignable(arena, target, existing)
                {
                    sink.report(
                        SemanticError::TypeMismatch {
                            expected: arena.display(existing, interner),
                            found: arena.display(target, interner),
                            span: span.into(),
                        },
                        span,
                    );
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Constraint generation
    // ------------------------------------------------------------------

    /// Walk a resolved tree, typing nodes and queuing constraints.
    /// Function signatures across the module are registered first so
    /// calls can precede definitions in source order.
    pub fn generate(
        &mut self,
        tree: &SyntaxTree,
        arena: &mut TypeArena,
        resolution: &Resolution,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) {
        let Some(root) = tree.root() else {
            return;
        };

        for &child in tree.children(root) {
            if let NodeKind::Function {
                return_type,
                is_pure,
                ..
            } = tree.kind(child)
            {
                let mut params = TypeIdVec::new();
                for param in tree.function_params(child) {
                    let ty = self.param_type(tree, param, arena, resolution, interner, sink);
                    params.push(ty);
                }
                let ret = return_type
                    .as_ref()
                    .map(|ann| {
                        resolve_annotation(arena, resolution, interner, ann, tree.span(child), sink)
                    })
                    .unwrap_or(TypeId::VOID);
                let fn_ty = arena.function_type(params, ret, *is_pure);
                self.set_node_type(child, fn_ty);
                if let Some(symbol) = tree.binding(child) {
                    self.symbol_types.insert(symbol, fn_ty);
                }
            }
        }

        let children: Vec<NodeId> = tree.children(root).to_vec();
        for child in children {
            if matches!(tree.kind(child), NodeKind::Function { .. }) {
                self.infer_function(tree, child, arena, resolution, interner, sink);
            }
        }
    }

    fn param_type(
        &mut self,
        tree: &SyntaxTree,
        param: NodeId,
        arena: &mut TypeArena,
        resolution: &Resolution,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> TypeId {
        if let Some(existing) = self.get_node_type(param) {
            return existing;
        }
        let ty = match tree.kind(param) {
            NodeKind::Param { ty, .. } => {
                resolve_annotation(arena, resolution, interner, ty, tree.span(param), sink)
            }
            _ => TypeId::INVALID,
        };
        self.set_node_type(param, ty);
        if let Some(symbol) = tree.binding(param) {
            self.symbol_types.insert(symbol, ty);
        }
        ty
    }

    fn infer_function(
        &mut self,
        tree: &SyntaxTree,
        func: NodeId,
        arena: &mut TypeArena,
        resolution: &Resolution,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) {
        for param in tree.function_params(func).collect::<Vec<_>>() {
            self.param_type(tree, param, arena, resolution, interner, sink);
        }
        let ret = tree
            .function_return_type(func)
            .map(|ann| resolve_annotation(arena, resolution, interner, ann, tree.span(func), sink))
            .unwrap_or(TypeId::VOID);

        self.return_types.push(ret);
        if let Some(body) = tree.function_body(func) {
            self.infer_stmt(tree, body, arena, resolution, interner, sink);
        }
        self.return_types.pop();
    }

    fn infer_stmt(
        &mut self,
        tree: &SyntaxTree,
        node: NodeId,
        arena: &mut TypeArena,
        resolution: &Resolution,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) {
        let span = tree.span(node);
        match tree.kind(node) {
            NodeKind::Block => {
                for &child in tree.children(node) {
                    self.infer_stmt(tree, child, arena, resolution, interner, sink);
                }
            }
            NodeKind::VarDecl { ty, .. } => {
                let declared = ty.as_ref().map(|ann| {
                    resolve_annotation(arena, resolution, interner, ann, span, sink)
                });
                let init = tree
                    .var_initializer(node)
                    .map(|expr| self.infer_expr(tree, expr, arena, resolution, interner, sink));

                let var_ty = match (declared, init) {
                    (Some(declared), Some(init)) => {
                        self.add_constraint(Constraint::Subtype {
                            sub: init,
                            sup: declared,
                            span,
                        });
                        declared
                    }
                    (Some(declared), None) => declared,
                    (None, Some(init)) => init,
                    // Neither annotation nor initializer: the type stays
                    // open until an assignment or usage narrows it
                    (None, None) => self.create_inferred_type(arena, span),
                };
                self.set_node_type(node, var_ty);
                if let Some(symbol) = tree.binding(node) {
                    self.symbol_types.insert(symbol, var_ty);
                }
            }
            NodeKind::Assignment => {
                let target = tree.assignment_target(node);
                let value = tree.assignment_value(node);
                if let (Some(target), Some(value)) = (target, value) {
                    let target_ty =
                        self.infer_expr(tree, target, arena, resolution, interner, sink);
                    let value_ty = self.infer_expr(tree, value, arena, resolution, interner, sink);
                    self.add_constraint(Constraint::Subtype {
                        sub: value_ty,
                        sup: target_ty,
                        span,
                    });
                }
                self.set_node_type(node, TypeId::VOID);
            }
            NodeKind::Return => {
                let declared = self.return_types.last().copied().unwrap_or(TypeId::VOID);
                let value_ty = match tree.return_value(node) {
                    Some(value) => self.infer_expr(tree, value, arena, resolution, interner, sink),
                    None => TypeId::VOID,
                };
                self.add_constraint(Constraint::Subtype {
                    sub: value_ty,
                    sup: declared,
                    span,
                });
                self.set_node_type(node, TypeId::VOID);
            }
            NodeKind::If | NodeKind::While => {
                let children: Vec<NodeId> = tree.children(node).to_vec();
                if let Some(&cond) = children.first() {
                    let cond_ty = self.infer_expr(tree, cond, arena, resolution, interner, sink);
                    self.add_constraint(Constraint::Equality {
                        a: cond_ty,
                        b: TypeId::BOOL,
                        span: tree.span(cond),
                    });
                }
                for &child in children.iter().skip(1) {
                    self.infer_stmt(tree, child, arena, resolution, interner, sink);
                }
                self.set_node_type(node, TypeId::VOID);
            }
            // An expression in statement position
            _ => {
                self.infer_expr(tree, node, arena, resolution, interner, sink);
            }
        }
    }

    fn infer_expr(
        &mut self,
        tree: &SyntaxTree,
        node: NodeId,
        arena: &mut TypeArena,
        resolution: &Resolution,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> TypeId {
        if let Some(existing) = self.get_node_type(node) {
            return existing;
        }
        let span = tree.span(node);
        let ty = match tree.kind(node) {
            NodeKind::IntLiteral(_) => {
                let var = self.create_var_with_default(span, TypeId::I32);
                arena.inferred_type(var)
            }
            NodeKind::FloatLiteral(_) => {
                let var = self.create_var_with_default(span, TypeId::F64);
                arena.inferred_type(var)
            }
            NodeKind::StringLiteral(_) => TypeId::STRING,
            NodeKind::BoolLiteral(_) => TypeId::BOOL,
            NodeKind::Identifier(_) => match tree.binding(node) {
                Some(symbol) => self.symbol_types.get(&symbol).copied().unwrap_or_else(|| {
                    // Declared but never typed (e.g. a struct name used
                    // as a value); recovery type
                    TypeId::INVALID
                }),
                // Unresolved; the resolver already reported it
                None => TypeId::INVALID,
            },
            NodeKind::Binary(op) => {
                let op = *op;
                let children: Vec<NodeId> = tree.children(node).to_vec();
                let lhs = children
                    .first()
                    .map(|&c| self.infer_expr(tree, c, arena, resolution, interner, sink))
                    .unwrap_or(TypeId::INVALID);
                let rhs = children
                    .get(1)
                    .map(|&c| self.infer_expr(tree, c, arena, resolution, interner, sink))
                    .unwrap_or(TypeId::INVALID);
                self.infer_binary(op, lhs, rhs, span, arena, interner, sink)
            }
            NodeKind::Call => {
                let children: Vec<NodeId> = tree.children(node).to_vec();
                let func = children
                    .first()
                    .map(|&c| self.infer_expr(tree, c, arena, resolution, interner, sink))
                    .unwrap_or(TypeId::INVALID);
                let mut args = TypeIdVec::new();
                for &arg in children.iter().skip(1) {
                    args.push(self.infer_expr(tree, arg, arena, resolution, interner, sink));
                }
                let result = self.create_inferred_type(arena, span);
                self.add_constraint(Constraint::FunctionCall {
                    func,
                    args,
                    result,
                    span,
                });
                result
            }
            NodeKind::Index => {
                let children: Vec<NodeId> = tree.children(node).to_vec();
                let array = children
                    .first()
                    .map(|&c| self.infer_expr(tree, c, arena, resolution, interner, sink))
                    .unwrap_or(TypeId::INVALID);
                let index = children
                    .get(1)
                    .map(|&c| self.infer_expr(tree, c, arena, resolution, interner, sink))
                    .unwrap_or(TypeId::INVALID);
                self.add_constraint(Constraint::Numeric { ty: index, span });
                let element = self.create_inferred_type(arena, span);
                self.add_constraint(Constraint::ArrayAccess {
                    array,
                    index,
                    element,
                    span,
                });
                element
            }
            NodeKind::FieldAccess(field) => {
                let field = *field;
                let object = tree
                    .child(node, 0)
                    .map(|c| self.infer_expr(tree, c, arena, resolution, interner, sink))
                    .unwrap_or(TypeId::INVALID);
                let result = self.create_inferred_type(arena, span);
                self.add_constraint(Constraint::FieldAccess {
                    object,
                    field,
                    result,
                    span,
                });
                result
            }
            // Declarations and statements have no expression type
            _ => TypeId::VOID,
        };
        self.set_node_type(node, ty);
        ty
    }

    fn infer_binary(
        &mut self,
        op: BinaryOp,
        lhs: TypeId,
        rhs: TypeId,
        span: Span,
        arena: &mut TypeArena,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> TypeId {
        if op.is_arithmetic() {
            self.add_constraint(Constraint::Numeric { ty: lhs, span });
            self.add_constraint(Constraint::Numeric { ty: rhs, span });

            let lhs_res = self.resolve(arena, lhs);
            let rhs_res = self.resolve(arena, rhs);
            let both_concrete = self.unbound_var(arena, lhs_res).is_none()
                && self.unbound_var(arena, rhs_res).is_none();
            if both_concrete {
                match promote_arithmetic_types(arena, lhs_res, rhs_res) {
                    Some(result) => return result,
                    None => {
                        sink.report(
                            SemanticError::TypeMismatch {
                                expected: arena.display(lhs_res, interner),
                                found: arena.display(rhs_res, interner),
                                span: span.into(),
                            },
                            span,
                        );
                        return TypeId::INVALID;
                    }
                }
            }
            // One side still open: force the operands together and give
            // the result the same type
            self.add_constraint(Constraint::Equality {
                a: lhs,
                b: rhs,
                span,
            });
            let result = self.create_inferred_type(arena, span);
            self.add_constraint(Constraint::Equality {
                a: result,
                b: lhs,
                span,
            });
            result
        } else if op.is_comparison() {
            self.add_constraint(Constraint::Comparable { ty: lhs, span });
            self.add_constraint(Constraint::Equality {
                a: lhs,
                b: rhs,
                span,
            });
            TypeId::BOOL
        } else {
            // Logical operators work on bool and produce bool
            self.add_constraint(Constraint::Equality {
                a: lhs,
                b: TypeId::BOOL,
                span,
            });
            self.add_constraint(Constraint::Equality {
                a: rhs,
                b: TypeId::BOOL,
                span,
            });
            TypeId::BOOL
        }
    }

    // ------------------------------------------------------------------
    // Constraint solving
    // ------------------------------------------------------------------

    /// Drain the constraint queue. Failures report through the sink and
    /// do not abort solving of independent constraints. Afterwards,
    /// literal defaults are applied and any variable still unbound is an
    /// ambiguous-type error.
    pub fn solve_constraints(
        &mut self,
        arena: &mut TypeArena,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) {
        while let Some(constraint) = self.queue.pop_front() {
            self.stats.constraints_solved += 1;
            self.solve_one(constraint, arena, interner, sink);
        }
        self.apply_defaults(arena, interner, sink);
        self.report_unbound(arena, sink);
    }

    fn solve_one(
        &mut self,
        constraint: Constraint,
        arena: &mut TypeArena,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) {
        match constraint {
            Constraint::Equality { a, b, span } => {
                let ra = self.resolve(arena, a);
                let rb = self.resolve(arena, b);
                if ra == rb {
                    return;
                }
                if let Some(var) = self.unbound_var(arena, ra) {
                    self.bind(arena, var, rb, span, interner, sink);
                } else if let Some(var) = self.unbound_var(arena, rb) {
                    self.bind(arena, var, ra, span, interner, sink);
                } else if !is_assignable(arena, ra, rb) && !is_assignable(arena, rb, ra) {
                    sink.report(
                        SemanticError::TypeMismatch {
                            expected: arena.display(ra, interner),
                            found: arena.display(rb, interner),
                            span: span.into(),
                        },
                        span,
                    );
                }
            }
            Constraint::Subtype { sub, sup, span } => {
                let sub = self.resolve(arena, sub);
                let sup = self.resolve(arena, sup);
                if let Some(var) = self.unbound_var(arena, sub) {
                    // Narrowing: the open side adopts the context's type
                    self.bind(arena, var, sup, span, interner, sink);
                } else if let Some(var) = self.unbound_var(arena, sup) {
                    self.bind(arena, var, sub, span, interner, sink);
                } else if !is_assignable(arena, sub, sup) {
                    let expected = arena.display(sup, interner);
                    let found = arena.display(sub, interner);
                    let suggestion = conversion_hint(arena, sub, sup, &expected);
                    sink.report_with_suggestions(
                        SemanticError::TypeMismatch {
                            expected,
                            found,
                            span: span.into(),
                        },
                        span,
                        suggestion,
                    );
                }
            }
            Constraint::Numeric { ty, span } => {
                let ty = self.resolve(arena, ty);
                if self.unbound_var(arena, ty).is_some() {
                    // Still open; defaults or later ambiguity handle it
                    return;
                }
                if !is_numeric_type(arena, ty) {
                    sink.report(
                        SemanticError::TypeMismatch {
                            expected: "a numeric type".to_string(),
                            found: arena.display(ty, interner),
                            span: span.into(),
                        },
                        span,
                    );
                }
            }
            Constraint::Comparable { ty, span } => {
                let ty = self.resolve(arena, ty);
                if self.unbound_var(arena, ty).is_some() {
                    return;
                }
                if !is_comparable_type(arena, ty) {
                    sink.report(
                        SemanticError::TypeMismatch {
                            expected: "a comparable type".to_string(),
                            found: arena.display(ty, interner),
                            span: span.into(),
                        },
                        span,
                    );
                }
            }
            Constraint::FunctionCall {
                func,
                args,
                result,
                span,
            } => {
                self.solve_call(func, &args, result, span, arena, interner, sink);
            }
            Constraint::ArrayAccess {
                array,
                index,
                element,
                span,
            } => {
                self.solve_index(array, index, element, span, arena, interner, sink);
            }
            Constraint::FieldAccess {
                object,
                field,
                result,
                span,
            } => {
                self.solve_field(object, field, result, span, arena, interner, sink);
            }
        }
    }

    fn solve_call(
        &mut self,
        func: TypeId,
        args: &[TypeId],
        result: TypeId,
        span: Span,
        arena: &TypeArena,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) {
        let func = self.resolve(arena, func);
        if func.is_invalid() || self.unbound_var(arena, func).is_some() {
            self.bind_result(arena, result, TypeId::INVALID, span, interner, sink);
            return;
        }
        let (params, ret) = match arena.get(func) {
            SemaType::Function { params, ret, .. } => (params.clone(), *ret),
            _ => {
                sink.report(
                    SemanticError::NotCallable {
                        ty: arena.display(func, interner),
                        span: span.into(),
                    },
                    span,
                );
                self.bind_result(arena, result, TypeId::INVALID, span, interner, sink);
                return;
            }
        };

        if args.len() != params.len() {
            sink.report(
                SemanticError::WrongArgumentCount {
                    expected: params.len(),
                    found: args.len(),
                    span: span.into(),
                },
                span,
            );
        } else {
            for (&arg, &param) in args.iter().zip(params.iter()) {
                let arg = self.resolve(arena, arg);
                if let Some(var) = self.unbound_var(arena, arg) {
                    self.bind(arena, var, param, span, interner, sink);
                } else if !is_assignable(arena, arg, param) {
                    let expected = arena.display(param, interner);
                    let found = arena.display(arg, interner);
                    let suggestion = conversion_hint(arena, arg, param, &expected);
                    sink.report_with_suggestions(
                        SemanticError::TypeMismatch {
                            expected,
                            found,
                            span: span.into(),
                        },
                        span,
                        suggestion,
                    );
                }
            }
        }
        self.bind_result(arena, result, ret, span, interner, sink);
    }

    fn solve_index(
        &mut self,
        array: TypeId,
        index: TypeId,
        element: TypeId,
        span: Span,
        arena: &TypeArena,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) {
        let array = self.resolve(arena, array);
        if array.is_invalid() || self.unbound_var(arena, array).is_some() {
            self.bind_result(arena, element, TypeId::INVALID, span, interner, sink);
            return;
        }
        match arena.get(array) {
            SemaType::Array { element: elem, .. } => {
                let elem = *elem;
                let index = self.resolve(arena, index);
                if self.unbound_var(arena, index).is_none() && !is_numeric_type(arena, index) {
                    sink.report(
                        SemanticError::TypeMismatch {
                            expected: "a numeric index".to_string(),
                            found: arena.display(index, interner),
                            span: span.into(),
                        },
                        span,
                    );
                }
                self.bind_result(arena, element, elem, span, interner, sink);
            }
            _ => {
                sink.report(
                    SemanticError::NotIndexable {
                        ty: arena.display(array, interner),
                        span: span.into(),
                    },
                    span,
                );
                self.bind_result(arena, element, TypeId::INVALID, span, interner, sink);
            }
        }
    }

    fn solve_field(
        &mut self,
        object: TypeId,
        field: Symbol,
        result: TypeId,
        span: Span,
        arena: &TypeArena,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) {
        let mut object = self.resolve(arena, object);
        // One level of pointer auto-deref
        if let SemaType::Pointer { pointee, .. } = arena.get(object) {
            object = self.resolve(arena, *pointee);
        }
        if object.is_invalid() || self.unbound_var(arena, object).is_some() {
            self.bind_result(arena, result, TypeId::INVALID, span, interner, sink);
            return;
        }
        match arena.get(object) {
            SemaType::Struct { .. } => match arena.struct_field(object, field) {
                Some(field_ty) => {
                    self.bind_result(arena, result, field_ty, span, interner, sink);
                }
                None => {
                    let field_name = interner.resolve(field);
                    let names = arena.struct_field_names(object);
                    let candidates = names.iter().map(|&s| interner.resolve(s));
                    let suggestions = spelling_suggestion(field_name, candidates)
                        .map(|(candidate, confidence)| {
                            vec![Suggestion::replace(
                                format!("did you mean '{}'?", candidate),
                                span,
                                candidate,
                                confidence,
                            )]
                        })
                        .unwrap_or_default();
                    sink.report_with_suggestions(
                        SemanticError::UnknownField {
                            ty: arena.display(object, interner),
                            field: field_name.to_string(),
                            span: span.into(),
                        },
                        span,
                        suggestions,
                    );
                    self.bind_result(arena, result, TypeId::INVALID, span, interner, sink);
                }
            },
            _ => {
                sink.report(
                    SemanticError::UnknownField {
                        ty: arena.display(object, interner),
                        field: interner.resolve(field).to_string(),
                        span: span.into(),
                    },
                    span,
                );
                self.bind_result(arena, result, TypeId::INVALID, span, interner, sink);
            }
        }
    }

    /// Bind the fresh result variable a call/index/field constraint
    /// carries
    fn bind_result(
        &mut self,
        arena: &TypeArena,
        result: TypeId,
        ty: TypeId,
        span: Span,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) {
        let resolved = self.resolve(arena, result);
        if let Some(var) = self.unbound_var(arena, resolved) {
            self.bind(arena, var, ty, span, interner, sink);
        }
    }

    /// Chase a variable through its binding chain: a concrete type, or
    /// the root unbound variable of the chain
    fn resolve_var(&self, arena: &TypeArena, var: InferVarId) -> Result<TypeId, InferVarId> {
        let mut current = var;
        loop {
            match self.bindings[current.index()] {
                None => return Err(current),
                Some(ty) => match arena.get(ty) {
                    SemaType::Inferred(next) if *next != current => current = *next,
                    SemaType::Inferred(_) => return Err(current),
                    _ => return Ok(ty),
                },
            }
        }
    }

    /// Literal defaults apply only to variables still unbound after the
    /// queue has drained. Unifying two defaulted literals lets the first
    /// default win the binding, so a second pass checks every defaulted
    /// variable against what its chain actually resolved to; a literal
    /// whose default has no join with that type is a type error, not a
    /// silent rebind.
    fn apply_defaults(
        &mut self,
        arena: &TypeArena,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) {
        for index in 0..self.bindings.len() {
            let Some(default) = self.defaults[index] else {
                continue;
            };
            if let Err(root) = self.resolve_var(arena, InferVarId(index as u32)) {
                self.bindings[root.index()] = Some(default);
            }
        }

        for index in 0..self.bindings.len() {
            let Some(default) = self.defaults[index] else {
                continue;
            };
            let Ok(resolved) = self.resolve_var(arena, InferVarId(index as u32)) else {
                continue;
            };
            if !is_assignable(arena, resolved, default) && !is_assignable(arena, default, resolved)
            {
                let span = self.var_spans[index];
                sink.report(
                    SemanticError::TypeMismatch {
                        expected: arena.display(default, interner),
                        found: arena.display(resolved, interner),
                        span: span.into(),
                    },
                    span,
                );
            }
        }
    }

    /// Variables with no binding and no default are ambiguous, reported
    /// rather than silently defaulted
    fn report_unbound(&mut self, arena: &TypeArena, sink: &mut DiagnosticSink) {
        let mut reported: Vec<InferVarId> = Vec::new();
        for index in 0..self.bindings.len() {
            if let Err(root) = self.resolve_var(arena, InferVarId(index as u32)) {
                if reported.contains(&root) {
                    continue;
                }
                reported.push(root);
                let span = self.var_spans[index];
                sink.report(
                    SemanticError::AmbiguousInference { span: span.into() },
                    span,
                );
            }
        }
    }
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Conversion hint for a failed subtype check, when the reverse
/// direction would have worked (i.e. an explicit narrowing cast exists)
fn conversion_hint(
    arena: &TypeArena,
    from: TypeId,
    to: TypeId,
    expected: &str,
) -> Vec<Suggestion> {
    if is_assignable(arena, to, from) {
        vec![Suggestion::text(
            format!("an explicit conversion to {} would narrow the value", expected),
            0.6,
        )]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DiagnosticKind;

    fn setup() -> (TypeArena, InferenceEngine, DiagnosticSink, Interner) {
        (
            TypeArena::new(),
            InferenceEngine::new(),
            DiagnosticSink::new("test.janus"),
            Interner::new(),
        )
    }

    fn span_at(start: usize) -> Span {
        Span::new(start, start + 1, 1, 1)
    }

    #[test]
    fn equality_binds_unresolved_var() {
        let (mut arena, mut engine, mut sink, interner) = setup();
        let ty = engine.create_inferred_type(&mut arena, span_at(0));
        engine.add_constraint(Constraint::Equality {
            a: ty,
            b: TypeId::I64,
            span: span_at(0),
        });
        engine.solve_constraints(&mut arena, &interner, &mut sink);

        assert_eq!(engine.resolve(&arena, ty), TypeId::I64);
        assert!(!sink.has_errors());
    }

    #[test]
    fn bound_var_is_not_rebound_incompatibly() {
        let (mut arena, mut engine, mut sink, interner) = setup();
        let ty = engine.create_inferred_type(&mut arena, span_at(0));
        engine.add_constraint(Constraint::Equality {
            a: ty,
            b: TypeId::STRING,
            span: span_at(0),
        });
        engine.add_constraint(Constraint::Equality {
            a: ty,
            b: TypeId::BOOL,
            span: span_at(100),
        });
        engine.solve_constraints(&mut arena, &interner, &mut sink);

        assert_eq!(engine.resolve(&arena, ty), TypeId::STRING);
        assert_eq!(sink.of_kind(DiagnosticKind::TypeMismatch).count(), 1);
    }

    #[test]
    fn subtype_failure_reports_mismatch() {
        let (mut arena, mut engine, mut sink, interner) = setup();
        engine.add_constraint(Constraint::Subtype {
            sub: TypeId::I64,
            sup: TypeId::I16,
            span: span_at(0),
        });
        engine.solve_constraints(&mut arena, &interner, &mut sink);
        assert_eq!(sink.of_kind(DiagnosticKind::TypeMismatch).count(), 1);
    }

    #[test]
    fn numeric_constraint_rejects_bool() {
        let (mut arena, mut engine, mut sink, interner) = setup();
        engine.add_constraint(Constraint::Numeric {
            ty: TypeId::BOOL,
            span: span_at(0),
        });
        engine.solve_constraints(&mut arena, &interner, &mut sink);
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn call_binds_result_and_checks_args() {
        let (mut arena, mut engine, mut sink, interner) = setup();
        let params: TypeIdVec = [TypeId::I32].into_iter().collect();
        let fn_ty = arena.function_type(params, TypeId::BOOL, false);
        let result = engine.create_inferred_type(&mut arena, span_at(0));
        let args: TypeIdVec = [TypeId::I16].into_iter().collect();
        engine.add_constraint(Constraint::FunctionCall {
            func: fn_ty,
            args,
            result,
            span: span_at(0),
        });
        engine.solve_constraints(&mut arena, &interner, &mut sink);

        assert_eq!(engine.resolve(&arena, result), TypeId::BOOL);
        assert!(!sink.has_errors(), "i16 widens into i32");
    }

    #[test]
    fn call_with_wrong_arity_reports() {
        let (mut arena, mut engine, mut sink, interner) = setup();
        let params: TypeIdVec = [TypeId::I32].into_iter().collect();
        let fn_ty = arena.function_type(params, TypeId::VOID, false);
        let result = engine.create_inferred_type(&mut arena, span_at(0));
        engine.add_constraint(Constraint::FunctionCall {
            func: fn_ty,
            args: TypeIdVec::new(),
            result,
            span: span_at(0),
        });
        engine.solve_constraints(&mut arena, &interner, &mut sink);
        assert_eq!(sink.of_kind(DiagnosticKind::WrongArgumentCount).count(), 1);
    }

    #[test]
    fn calling_non_function_reports_not_callable() {
        let (mut arena, mut engine, mut sink, interner) = setup();
        let result = engine.create_inferred_type(&mut arena, span_at(0));
        engine.add_constraint(Constraint::FunctionCall {
            func: TypeId::I32,
            args: TypeIdVec::new(),
            result,
            span: span_at(0),
        });
        engine.solve_constraints(&mut arena, &interner, &mut sink);
        assert_eq!(sink.of_kind(DiagnosticKind::NotCallable).count(), 1);
        assert_eq!(engine.resolve(&arena, result), TypeId::INVALID);
    }

    #[test]
    fn array_access_binds_element_type() {
        let (mut arena, mut engine, mut sink, interner) = setup();
        let arr = arena.array_type(TypeId::STRING, crate::sema::type_arena::ArraySize::Dynamic);
        let element = engine.create_inferred_type(&mut arena, span_at(0));
        engine.add_constraint(Constraint::ArrayAccess {
            array: arr,
            index: TypeId::I32,
            element,
            span: span_at(0),
        });
        engine.solve_constraints(&mut arena, &interner, &mut sink);
        assert_eq!(engine.resolve(&arena, element), TypeId::STRING);
        assert!(!sink.has_errors());
    }

    #[test]
    fn indexing_non_array_reports() {
        let (mut arena, mut engine, mut sink, interner) = setup();
        let element = engine.create_inferred_type(&mut arena, span_at(0));
        engine.add_constraint(Constraint::ArrayAccess {
            array: TypeId::BOOL,
            index: TypeId::I32,
            element,
            span: span_at(0),
        });
        engine.solve_constraints(&mut arena, &interner, &mut sink);
        assert_eq!(sink.of_kind(DiagnosticKind::NotIndexable).count(), 1);
    }

    #[test]
    fn field_access_resolves_through_field_table() {
        let (mut arena, mut engine, mut sink, mut interner) = setup();
        let point = interner.intern("Point");
        let x = interner.intern("x");
        let st = arena.struct_type(point);
        arena.set_struct_fields(
            st,
            crate::sema::type_arena::StructFields {
                fields: [(x, TypeId::F64)].into_iter().collect(),
            },
        );
        let result = engine.create_inferred_type(&mut arena, span_at(0));
        engine.add_constraint(Constraint::FieldAccess {
            object: st,
            field: x,
            result,
            span: span_at(0),
        });
        engine.solve_constraints(&mut arena, &interner, &mut sink);
        assert_eq!(engine.resolve(&arena, result), TypeId::F64);
    }

    #[test]
    fn unknown_field_reports_with_spelling_suggestion() {
        let (mut arena, mut engine, mut sink, mut interner) = setup();
        let point = interner.intern("Point");
        let length = interner.intern("length");
        let lenth = interner.intern("lenth");
        let st = arena.struct_type(point);
        arena.set_struct_fields(
            st,
            crate::sema::type_arena::StructFields {
                fields: [(length, TypeId::I64)].into_iter().collect(),
            },
        );
        let result = engine.create_inferred_type(&mut arena, span_at(0));
        engine.add_constraint(Constraint::FieldAccess {
            object: st,
            field: lenth,
            result,
            span: span_at(0),
        });
        engine.solve_constraints(&mut arena, &interner, &mut sink);

        let diags: Vec<_> = sink.of_kind(DiagnosticKind::UnknownField).collect();
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].suggestions.is_empty());
        assert!(diags[0].suggestions[0].message.contains("length"));
    }

    #[test]
    fn unbound_var_without_default_is_ambiguous() {
        let (mut arena, mut engine, mut sink, interner) = setup();
        let _ty = engine.create_inferred_type(&mut arena, span_at(0));
        engine.solve_constraints(&mut arena, &interner, &mut sink);
        assert_eq!(sink.of_kind(DiagnosticKind::AmbiguousInference).count(), 1);
    }

    #[test]
    fn literal_default_applies_when_unconstrained() {
        let (mut arena, mut engine, mut sink, interner) = setup();
        let var = engine.create_var_with_default(span_at(0), TypeId::I32);
        let ty = arena.inferred_type(var);
        engine.solve_constraints(&mut arena, &interner, &mut sink);
        assert_eq!(engine.resolve(&arena, ty), TypeId::I32);
        assert!(!sink.has_errors());
    }

    #[test]
    fn unified_int_and_float_defaults_report_mismatch() {
        let (mut arena, mut engine, mut sink, interner) = setup();
        let int_var = engine.create_var_with_default(span_at(0), TypeId::I32);
        let int_ty = arena.inferred_type(int_var);
        let float_var = engine.create_var_with_default(span_at(100), TypeId::F64);
        let float_ty = arena.inferred_type(float_var);
        engine.add_constraint(Constraint::Equality {
            a: int_ty,
            b: float_ty,
            span: span_at(0),
        });
        engine.solve_constraints(&mut arena, &interner, &mut sink);

        // The chain root takes the first default; the float literal's own
        // default has no join with it and must not be dropped silently
        assert_eq!(sink.of_kind(DiagnosticKind::TypeMismatch).count(), 1);
    }

    #[test]
    fn context_narrows_literal_before_default() {
        let (mut arena, mut engine, mut sink, interner) = setup();
        let var = engine.create_var_with_default(span_at(0), TypeId::I32);
        let ty = arena.inferred_type(var);
        engine.add_constraint(Constraint::Subtype {
            sub: ty,
            sup: TypeId::I16,
            span: span_at(0),
        });
        engine.solve_constraints(&mut arena, &interner, &mut sink);
        assert_eq!(engine.resolve(&arena, ty), TypeId::I16);
        assert!(!sink.has_errors());
    }
}
