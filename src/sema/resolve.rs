// src/sema/resolve.rs
//
// Name resolution pass.
//
// Walks the tree once, building the scope tree as it goes: top-level
// functions and structs are hoisted first so uses can precede their
// definitions in source order, then struct field tables are attached,
// then function bodies are walked. Every identifier either gets a
// symbol binding recorded on its node or an undefined-symbol
// diagnostic, with a spelling suggestion when a visible name is close.

use rustc_hash::FxHashMap;

use crate::ast::{NodeId, NodeKind, SyntaxTree, TypeAnnotation};
use crate::errors::{DiagnosticSink, SemanticError, Suggestion};
use crate::intern::{Interner, Symbol};
use crate::sema::scope::ScopeKind;
use crate::sema::symbol_table::{
    DuplicateDeclaration, SymbolId, SymbolKind, SymbolTable, Visibility,
};
use crate::sema::type_arena::{ArraySize, StructFields, TypeArena, TypeId, TypeIdVec};
use crate::span::Span;

/// Names resolvable in type annotations, produced by the resolver and
/// consumed by inference
#[derive(Debug, Default)]
pub struct Resolution {
    pub struct_types: FxHashMap<Symbol, TypeId>,
}

pub struct Resolver<'a> {
    tree: &'a mut SyntaxTree,
    table: &'a mut SymbolTable,
    arena: &'a mut TypeArena,
    interner: &'a Interner,
    sink: &'a mut DiagnosticSink,
    resolution: Resolution,
}

impl<'a> Resolver<'a> {
    pub fn new(
        tree: &'a mut SyntaxTree,
        table: &'a mut SymbolTable,
        arena: &'a mut TypeArena,
        interner: &'a Interner,
        sink: &'a mut DiagnosticSink,
    ) -> Self {
        Self {
            tree,
            table,
            arena,
            interner,
            sink,
            resolution: Resolution::default(),
        }
    }

    pub fn run(mut self) -> Resolution {
        let Some(root) = self.tree.root() else {
            return self.resolution;
        };
        let top_level: Vec<NodeId> = self.tree.children(root).to_vec();

        // Hoist top-level declarations so order does not matter between
        // them
        for &node in &top_level {
            match self.tree.kind(node) {
                NodeKind::Function { name, .. } => {
                    let name = *name;
                    let _ = self.declare(name, SymbolKind::Function, node, Visibility::Public);
                }
                NodeKind::StructDecl { name } => {
                    let name = *name;
                    if self
                        .declare(name, SymbolKind::StructType, node, Visibility::Public)
                        .is_some()
                    {
                        let ty = self.arena.struct_type(name);
                        self.resolution.struct_types.insert(name, ty);
                    }
                }
                _ => {}
            }
        }

        // Field tables, now that every struct name is known
        for &node in &top_level {
            if matches!(self.tree.kind(node), NodeKind::StructDecl { .. }) {
                self.attach_struct_fields(node);
            }
        }

        for &node in &top_level {
            match self.tree.kind(node) {
                NodeKind::Function { .. } => self.resolve_function(node),
                NodeKind::StructDecl { .. } => {}
                _ => self.walk(node),
            }
        }
        self.resolution
    }

    fn attach_struct_fields(&mut self, decl: NodeId) {
        let NodeKind::StructDecl { name } = self.tree.kind(decl) else {
            return;
        };
        let name = *name;
        let Some(&ty) = self.resolution.struct_types.get(&name) else {
            // Declaration failed (duplicate); nothing to attach
            return;
        };

        let mut fields = StructFields::default();
        for &child in self.tree.children(decl) {
            if let NodeKind::FieldDecl {
                name: field_name,
                ty: annotation,
            } = self.tree.kind(child)
            {
                let field_ty = resolve_annotation(
                    self.arena,
                    &self.resolution,
                    self.interner,
                    annotation,
                    self.tree.span(child),
                    self.sink,
                );
                fields.fields.push((*field_name, field_ty));
            }
        }
        self.arena.set_struct_fields(ty, fields);
    }

    fn resolve_function(&mut self, func: NodeId) {
        let scope = self
            .table
            .create_scope(Some(self.table.current_scope()), ScopeKind::Function);
        self.table.push_scope(scope);

        let params: Vec<NodeId> = self.tree.function_params(func).collect();
        for param in params {
            if let NodeKind::Param { name, .. } = self.tree.kind(param) {
                let name = *name;
                let _ = self.declare(name, SymbolKind::Parameter, param, Visibility::Private);
            }
        }
        if let Some(body) = self.tree.function_body(func) {
            self.walk(body);
        }

        self.table.pop_scope(scope);
    }

    fn walk(&mut self, node: NodeId) {
        match self.tree.kind(node) {
            NodeKind::Block => {
                let scope = self
                    .table
                    .create_scope(Some(self.table.current_scope()), ScopeKind::Block);
                self.table.push_scope(scope);
                let children: Vec<NodeId> = self.tree.children(node).to_vec();
                for child in children {
                    self.walk(child);
                }
                self.table.pop_scope(scope);
            }
            NodeKind::VarDecl { name, mutable, .. } => {
                let name = *name;
                let mutable = *mutable;
                // The initializer resolves against the enclosing scope;
                // `let x = x` refers to an outer x, not the new one
                if let Some(init) = self.tree.var_initializer(node) {
                    self.walk(init);
                }
                let kind = if mutable {
                    SymbolKind::Variable
                } else {
                    SymbolKind::Constant
                };
                let _ = self.declare(name, kind, node, Visibility::Private);
            }
            NodeKind::Identifier(name) => {
                let name = *name;
                self.resolve_identifier(node, name);
            }
            // The field name is resolved later against the object's
            // struct type, not the lexical scope
            NodeKind::FieldAccess(_) => {
                if let Some(object) = self.tree.child(node, 0) {
                    self.walk(object);
                }
            }
            _ => {
                let children: Vec<NodeId> = self.tree.children(node).to_vec();
                for child in children {
                    self.walk(child);
                }
            }
        }
    }

    fn resolve_identifier(&mut self, node: NodeId, name: Symbol) {
        match self.table.resolve_identifier(name) {
            Some(symbol) => {
                self.tree.set_binding(node, symbol);
                self.table.record_binding();
            }
            None => {
                let span = self.tree.span(node);
                let text = self.interner.resolve(name);
                let visible = self.table.visible_names();
                let candidates = visible.iter().map(|&s| self.interner.resolve(s));
                let suggestions = spelling_suggestion(text, candidates)
                    .map(|(candidate, confidence)| {
                        vec![Suggestion::replace(
                            format!("did you mean '{}'?", candidate),
                            span,
                            candidate,
                            confidence,
                        )]
                    })
                    .unwrap_or_default();
                self.sink.report_with_suggestions(
                    SemanticError::UndefinedSymbol {
                        name: text.to_string(),
                        span: span.into(),
                    },
                    span,
                    suggestions,
                );
            }
        }
    }

    fn declare(
        &mut self,
        name: Symbol,
        kind: SymbolKind,
        node: NodeId,
        visibility: Visibility,
    ) -> Option<SymbolId> {
        let span = self.tree.span(node);
        match self.table.declare_symbol(name, kind, node, span, visibility) {
            Ok(symbol) => {
                self.tree.set_binding(node, symbol);
                Some(symbol)
            }
            Err(DuplicateDeclaration { existing }) => {
                let previous = self.table.symbol(existing).span;
                self.sink.report(
                    SemanticError::DuplicateDeclaration {
                        name: self.interner.resolve(name).to_string(),
                        span: span.into(),
                        previous: previous.into(),
                    },
                    span,
                );
                None
            }
        }
    }
}

const PRIMITIVE_NAMES: [(&str, TypeId); 13] = [
    ("void", TypeId::VOID),
    ("bool", TypeId::BOOL),
    ("i8", TypeId::I8),
    ("i16", TypeId::I16),
    ("i32", TypeId::I32),
    ("i64", TypeId::I64),
    ("u8", TypeId::U8),
    ("u16", TypeId::U16),
    ("u32", TypeId::U32),
    ("u64", TypeId::U64),
    ("f32", TypeId::F32),
    ("f64", TypeId::F64),
    ("string", TypeId::STRING),
];

fn primitive_by_name(name: &str) -> Option<TypeId> {
    PRIMITIVE_NAMES
        .iter()
        .find(|(text, _)| *text == name)
        .map(|&(_, ty)| ty)
}

/// Resolve a surface annotation to a canonical TypeId. Unknown type
/// names report through the sink and resolve to the recovery type.
pub(crate) fn resolve_annotation(
    arena: &mut TypeArena,
    resolution: &Resolution,
    interner: &Interner,
    annotation: &TypeAnnotation,
    span: Span,
    sink: &mut DiagnosticSink,
) -> TypeId {
    match annotation {
        TypeAnnotation::Void => TypeId::VOID,
        TypeAnnotation::Named(name) => {
            let text = interner.resolve(*name);
            if let Some(primitive) = primitive_by_name(text) {
                return primitive;
            }
            if let Some(&ty) = resolution.struct_types.get(name) {
                return ty;
            }
            let candidates = PRIMITIVE_NAMES
                .iter()
                .map(|&(text, _)| text)
                .chain(resolution.struct_types.keys().map(|&s| interner.resolve(s)));
            let suggestions = spelling_suggestion(text, candidates)
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
                SemanticError::UndefinedSymbol {
                    name: text.to_string(),
                    span: span.into(),
                },
                span,
                suggestions,
            );
            TypeId::INVALID
        }
        TypeAnnotation::Array { element, size } => {
            let element = resolve_annotation(arena, resolution, interner, element, span, sink);
            let size = size.map(ArraySize::Fixed).unwrap_or(ArraySize::Dynamic);
            arena.array_type(element, size)
        }
        TypeAnnotation::Pointer {
            pointee,
            mutable,
            nullable,
        } => {
            let pointee = resolve_annotation(arena, resolution, interner, pointee, span, sink);
            arena.pointer_type(pointee, *mutable, *nullable)
        }
        TypeAnnotation::Optional(inner) => {
            let inner = resolve_annotation(arena, resolution, interner, inner, span, sink);
            arena.optional_type(inner)
        }
        TypeAnnotation::Function { params, ret, pure } => {
            let params: TypeIdVec = params
                .iter()
                .map(|p| resolve_annotation(arena, resolution, interner, p, span, sink))
                .collect();
            let ret = resolve_annotation(arena, resolution, interner, ret, span, sink);
            arena.function_type(params, ret, *pure)
        }
    }
}

/// Two-row Levenshtein distance over chars
pub(crate) fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Closest candidate within the tolerated distance for a misspelled
/// name, with a confidence that drops as the distance grows
pub(crate) fn spelling_suggestion<'c>(
    name: &str,
    candidates: impl IntoIterator<Item = &'c str>,
) -> Option<(String, f32)> {
    let tolerance = (name.chars().count() / 3).max(1);
    let mut best: Option<(usize, &str)> = None;
    for candidate in candidates {
        if candidate == name {
            continue;
        }
        let distance = edit_distance(name, candidate);
        if distance <= tolerance && best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, candidate));
        }
    }
    best.map(|(distance, candidate)| {
        let confidence = (1.0 - distance as f32 * 0.25).max(0.1);
        (candidate.to_string(), confidence)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DiagnosticKind;

    fn span() -> Span {
        Span::new(0, 1, 1, 1)
    }

    fn setup(file: &str) -> (SyntaxTree, SymbolTable, TypeArena, DiagnosticSink) {
        (
            SyntaxTree::new(file),
            SymbolTable::new(),
            TypeArena::new(),
            DiagnosticSink::new(file),
        )
    }

    fn run(
        tree: &mut SyntaxTree,
        table: &mut SymbolTable,
        arena: &mut TypeArena,
        interner: &Interner,
        sink: &mut DiagnosticSink,
    ) -> Resolution {
        Resolver::new(tree, table, arena, interner, sink).run()
    }

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", "abc"), 0);
        assert_eq!(edit_distance("lenth", "length"), 1);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn spelling_suggestion_picks_closest() {
        let candidates = ["count", "counter", "total"];
        let (best, confidence) = spelling_suggestion("cout", candidates).unwrap();
        assert_eq!(best, "count");
        assert!(confidence > 0.5);

        assert!(spelling_suggestion("xyz", candidates).is_none());
    }

    #[test]
    fn identifier_binds_to_declaration() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let (mut tree, mut table, mut arena, mut sink) = setup("test.janus");

        let init = tree.add_node(NodeKind::IntLiteral(1), span(), &[]);
        let decl = tree.add_node(
            NodeKind::VarDecl {
                name: x,
                ty: None,
                mutable: true,
            },
            span(),
            &[init],
        );
        let usage = tree.add_node(NodeKind::Identifier(x), span(), &[]);
        let ret = tree.add_node(NodeKind::Return, span(), &[usage]);
        let body = tree.add_node(NodeKind::Block, span(), &[decl, ret]);
        let func = tree.add_node(
            NodeKind::Function {
                name: interner.intern("main"),
                return_type: None,
                is_pure: false,
            },
            span(),
            &[body],
        );
        let root = tree.add_node(NodeKind::Module, span(), &[func]);
        tree.set_root(root);

        run(&mut tree, &mut table, &mut arena, &interner, &mut sink);

        assert!(!sink.has_errors());
        assert_eq!(tree.binding(usage), tree.binding(decl));
        assert!(tree.binding(usage).is_some());
    }

    #[test]
    fn undefined_identifier_gets_spelling_suggestion() {
        let mut interner = Interner::new();
        let counter = interner.intern("counter");
        let countr = interner.intern("countr");
        let (mut tree, mut table, mut arena, mut sink) = setup("test.janus");

        let init = tree.add_node(NodeKind::IntLiteral(0), span(), &[]);
        let decl = tree.add_node(
            NodeKind::VarDecl {
                name: counter,
                ty: None,
                mutable: true,
            },
            Span::new(0, 7, 1, 1),
            &[init],
        );
        let usage = tree.add_node(NodeKind::Identifier(countr), Span::new(20, 26, 2, 1), &[]);
        let body = tree.add_node(NodeKind::Block, span(), &[decl, usage]);
        let func = tree.add_node(
            NodeKind::Function {
                name: interner.intern("main"),
                return_type: None,
                is_pure: false,
            },
            span(),
            &[body],
        );
        let root = tree.add_node(NodeKind::Module, span(), &[func]);
        tree.set_root(root);

        run(&mut tree, &mut table, &mut arena, &interner, &mut sink);

        let diags: Vec<_> = sink.of_kind(DiagnosticKind::UndefinedSymbol).collect();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].suggestions[0].message.contains("counter"));
        assert_eq!(tree.binding(usage), None);
    }

    #[test]
    fn duplicate_declaration_points_at_first_site() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let (mut tree, mut table, mut arena, mut sink) = setup("test.janus");

        let first = tree.add_node(
            NodeKind::VarDecl {
                name: x,
                ty: None,
                mutable: true,
            },
            Span::new(0, 5, 1, 1),
            &[],
        );
        let second = tree.add_node(
            NodeKind::VarDecl {
                name: x,
                ty: None,
                mutable: true,
            },
            Span::new(20, 25, 2, 1),
            &[],
        );
        let body = tree.add_node(NodeKind::Block, span(), &[first, second]);
        let func = tree.add_node(
            NodeKind::Function {
                name: interner.intern("main"),
                return_type: None,
                is_pure: false,
            },
            span(),
            &[body],
        );
        let root = tree.add_node(NodeKind::Module, span(), &[func]);
        tree.set_root(root);

        run(&mut tree, &mut table, &mut arena, &interner, &mut sink);

        let diags: Vec<_> = sink.of_kind(DiagnosticKind::DuplicateDeclaration).collect();
        assert_eq!(diags.len(), 1);
        assert_eq!(tree.binding(second), None);
    }

    #[test]
    fn struct_fields_attach_through_resolution() {
        let mut interner = Interner::new();
        let point = interner.intern("Point");
        let x = interner.intern("x");
        let f64_name = interner.intern("f64");
        let (mut tree, mut table, mut arena, mut sink) = setup("test.janus");

        let field = tree.add_node(
            NodeKind::FieldDecl {
                name: x,
                ty: TypeAnnotation::Named(f64_name),
            },
            span(),
            &[],
        );
        let decl = tree.add_node(NodeKind::StructDecl { name: point }, span(), &[field]);
        let root = tree.add_node(NodeKind::Module, span(), &[decl]);
        tree.set_root(root);

        let resolution = run(&mut tree, &mut table, &mut arena, &interner, &mut sink);

        assert!(!sink.has_errors());
        let ty = resolution.struct_types[&point];
        assert_eq!(arena.struct_field(ty, x), Some(TypeId::F64));
    }

    #[test]
    fn unknown_type_name_reports_and_recovers() {
        let mut interner = Interner::new();
        let bogus = interner.intern("Pointt");
        let mut arena = TypeArena::new();
        let mut sink = DiagnosticSink::new("test.janus");
        let mut resolution = Resolution::default();
        let point = interner.intern("Point");
        resolution
            .struct_types
            .insert(point, arena.struct_type(point));

        let ty = resolve_annotation(
            &mut arena,
            &resolution,
            &interner,
            &TypeAnnotation::Named(bogus),
            span(),
            &mut sink,
        );

        assert_eq!(ty, TypeId::INVALID);
        let diags: Vec<_> = sink.of_kind(DiagnosticKind::UndefinedSymbol).collect();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].suggestions[0].message.contains("Point"));
    }

    #[test]
    fn composite_annotations_resolve_recursively() {
        let interner = Interner::new();
        let mut arena = TypeArena::new();
        let mut sink = DiagnosticSink::new("test.janus");
        let resolution = Resolution::default();

        let annotation = TypeAnnotation::Array {
            element: Box::new(TypeAnnotation::Optional(Box::new(TypeAnnotation::Void))),
            size: Some(4),
        };
        // void? is a degenerate but well-formed composite
        let ty = resolve_annotation(
            &mut arena,
            &resolution,
            &interner,
            &annotation,
            span(),
            &mut sink,
        );
        let opt_void = arena.optional_type(TypeId::VOID);
        assert_eq!(ty, arena.array_type(opt_void, ArraySize::Fixed(4)));
        assert!(!sink.has_errors());
    }
}
