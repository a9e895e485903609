// src/ast.rs
//
// Node-accessor interface over a parsed syntax tree.
//
// The semantic core consumes trees through this interface and never
// builds or rewrites them itself; the parser (an external collaborator)
// produces the tree, and the builder methods here are its hand-off
// surface. Nodes live in an arena and are referenced by NodeId, the
// same arena-and-index layout used for types and symbols.

use crate::intern::Symbol;
use crate::sema::SymbolId;
use crate::span::Span;

/// Handle to a node in the syntax tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Binary operators, grouped by the constraint family they generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

/// Surface type annotation as written in source.
///
/// Resolved to a canonical TypeId by the analyzer; `Named` covers both
/// primitive names ("i32", "bool", ...) and user struct names.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotation {
    Void,
    Named(Symbol),
    Array {
        element: Box<TypeAnnotation>,
        size: Option<u64>,
    },
    Pointer {
        pointee: Box<TypeAnnotation>,
        mutable: bool,
        nullable: bool,
    },
    Optional(Box<TypeAnnotation>),
    Function {
        params: Vec<TypeAnnotation>,
        ret: Box<TypeAnnotation>,
        pure: bool,
    },
}

/// Kind and payload of a syntax tree node.
///
/// Child layout conventions:
/// - `Function`: params, then the body block as the last child
/// - `VarDecl`: at most one child, the initializer expression
/// - `Assignment`: target, value
/// - `Call`: callee, then arguments
/// - `Index`: array, index
/// - `If`: condition, then-block, optional else-block
/// - `While`: condition, body
/// - `Return`: optional value expression
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Module,
    Function {
        name: Symbol,
        return_type: Option<TypeAnnotation>,
        is_pure: bool,
    },
    Param {
        name: Symbol,
        ty: TypeAnnotation,
    },
    StructDecl {
        name: Symbol,
    },
    FieldDecl {
        name: Symbol,
        ty: TypeAnnotation,
    },
    VarDecl {
        name: Symbol,
        ty: Option<TypeAnnotation>,
        mutable: bool,
    },
    Block,
    If,
    While,
    Return,
    Assignment,
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(Symbol),
    BoolLiteral(bool),
    Identifier(Symbol),
    Binary(BinaryOp),
    Call,
    Index,
    FieldAccess(Symbol),
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    span: Span,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    binding: Option<SymbolId>,
}

/// Arena-backed syntax tree with the accessors the semantic core needs.
#[derive(Debug)]
pub struct SyntaxTree {
    file: String,
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl SyntaxTree {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Source file path this tree was parsed from
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Add a node with the given children (builder surface for the parser)
    pub fn add_node(&mut self, kind: NodeKind, span: Span, children: &[NodeId]) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
            children: children.to_vec(),
            binding: None,
        });
        for &child in children {
            self.nodes[child.index()].parent = Some(id);
        }
        id
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ------------------------------------------------------------------
    // Node accessors
    // ------------------------------------------------------------------

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.index()].kind
    }

    pub fn span(&self, node: NodeId) -> Span {
        self.nodes[node.index()].span
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.index()].children
    }

    pub fn child(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[node.index()].children.get(index).copied()
    }

    /// Next sibling under the same parent, if any
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&n| n == node)?;
        siblings.get(pos + 1).copied()
    }

    /// Symbol bound to this node during resolution
    pub fn binding(&self, node: NodeId) -> Option<SymbolId> {
        self.nodes[node.index()].binding
    }

    /// Bind a resolved symbol to this node (the one tree mutation the
    /// resolver is allowed)
    pub fn set_binding(&mut self, node: NodeId, symbol: SymbolId) {
        self.nodes[node.index()].binding = Some(symbol);
    }

    // ------------------------------------------------------------------
    // Shape accessors for specific node kinds
    // ------------------------------------------------------------------

    /// Body block of a function node (its last child)
    pub fn function_body(&self, func: NodeId) -> Option<NodeId> {
        if !matches!(self.kind(func), NodeKind::Function { .. }) {
            return None;
        }
        let body = *self.children(func).last()?;
        matches!(self.kind(body), NodeKind::Block).then_some(body)
    }

    /// Declared return type of a function node
    pub fn function_return_type(&self, func: NodeId) -> Option<&TypeAnnotation> {
        match self.kind(func) {
            NodeKind::Function { return_type, .. } => return_type.as_ref(),
            _ => None,
        }
    }

    /// Parameter nodes of a function, in declaration order
    pub fn function_params(&self, func: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(func)
            .iter()
            .copied()
            .filter(|&c| matches!(self.kind(c), NodeKind::Param { .. }))
    }

    /// Target expression of an assignment node
    pub fn assignment_target(&self, assign: NodeId) -> Option<NodeId> {
        matches!(self.kind(assign), NodeKind::Assignment)
            .then(|| self.child(assign, 0))
            .flatten()
    }

    /// Value expression of an assignment node
    pub fn assignment_value(&self, assign: NodeId) -> Option<NodeId> {
        matches!(self.kind(assign), NodeKind::Assignment)
            .then(|| self.child(assign, 1))
            .flatten()
    }

    /// Initializer expression of a variable declaration, if present
    pub fn var_initializer(&self, decl: NodeId) -> Option<NodeId> {
        matches!(self.kind(decl), NodeKind::VarDecl { .. })
            .then(|| self.child(decl, 0))
            .flatten()
    }

    /// Value expression of a return statement, if present
    pub fn return_value(&self, ret: NodeId) -> Option<NodeId> {
        matches!(self.kind(ret), NodeKind::Return)
            .then(|| self.child(ret, 0))
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 1, 1, 1)
    }

    #[test]
    fn add_node_sets_parent_links() {
        let mut tree = SyntaxTree::new("test.janus");
        let lit = tree.add_node(NodeKind::IntLiteral(1), span(), &[]);
        let ret = tree.add_node(NodeKind::Return, span(), &[lit]);

        assert_eq!(tree.parent(lit), Some(ret));
        assert_eq!(tree.parent(ret), None);
        assert_eq!(tree.children(ret), &[lit]);
    }

    #[test]
    fn function_body_is_last_block_child() {
        let mut tree = SyntaxTree::new("test.janus");
        let param = tree.add_node(
            NodeKind::Param {
                name: Symbol(0),
                ty: TypeAnnotation::Named(Symbol(1)),
            },
            span(),
            &[],
        );
        let body = tree.add_node(NodeKind::Block, span(), &[]);
        let func = tree.add_node(
            NodeKind::Function {
                name: Symbol(2),
                return_type: None,
                is_pure: false,
            },
            span(),
            &[param, body],
        );

        assert_eq!(tree.function_body(func), Some(body));
        assert_eq!(tree.function_params(func).collect::<Vec<_>>(), vec![param]);
    }

    #[test]
    fn assignment_accessors() {
        let mut tree = SyntaxTree::new("test.janus");
        let target = tree.add_node(NodeKind::Identifier(Symbol(0)), span(), &[]);
        let value = tree.add_node(NodeKind::IntLiteral(7), span(), &[]);
        let assign = tree.add_node(NodeKind::Assignment, span(), &[target, value]);

        assert_eq!(tree.assignment_target(assign), Some(target));
        assert_eq!(tree.assignment_value(assign), Some(value));
        assert_eq!(tree.assignment_target(value), None);
    }

    #[test]
    fn next_sibling_walks_in_order() {
        let mut tree = SyntaxTree::new("test.janus");
        let a = tree.add_node(NodeKind::IntLiteral(1), span(), &[]);
        let b = tree.add_node(NodeKind::IntLiteral(2), span(), &[]);
        let block = tree.add_node(NodeKind::Block, span(), &[a, b]);

        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.next_sibling(b), None);
        assert_eq!(tree.next_sibling(block), None);
    }
}
