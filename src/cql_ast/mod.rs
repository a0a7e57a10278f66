//! CQL abstract syntax tree.
//!
//! The parser hands the compiler a flat arena of nodes: every node lives in
//! `Ast::nodes` and children are referenced by `NodeId` (the arena index).
//! Sharing a child between two parents is legal, the compiler translates a
//! shared node once.
//!
//! ```text
//! price > 5 and name like 'foo%'
//!
//! #0 Attribute price      #3 Attribute name
//! #1 Literal   Number 5   #4 Literal   Text foo%
//! #2 Comparison Gt #0 #1  #5 Like Like #3 #4
//! #6 And #2 #5            (root)
//! ```

pub mod errors;
pub mod literal;
pub mod property_path;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use errors::LiteralError;
pub use literal::{CalendarDuration, LiteralValue};
pub use property_path::PropertyPath;

/// Index of a node in its `Ast` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Neq,
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Eq => "=",
            ComparisonOp::Neq => "<>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeKind {
    Like,
    Ilike,
    NotLike,
    NotIlike,
}

impl LikeKind {
    pub fn is_case_insensitive(self) -> bool {
        matches!(self, LikeKind::Ilike | LikeKind::NotIlike)
    }

    pub fn is_negated(self) -> bool {
        matches!(self, LikeKind::NotLike | LikeKind::NotIlike)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistenceKind {
    Exists,
    DoesNotExist,
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalKind {
    Before,
    After,
}

/// The three syntactic forms of a `during` timespan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum TimespanForm {
    /// `from X to Y`
    FromTo { from: NodeId, to: NodeId },
    /// `from X duration D`
    FromDuration { from: NodeId, duration: NodeId },
    /// `duration D to Y`
    DurationTo { duration: NodeId, to: NodeId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    And {
        left: NodeId,
        right: NodeId,
    },
    Or {
        left: NodeId,
        right: NodeId,
    },
    Not {
        inner: NodeId,
    },
    Comparison {
        op: ComparisonOp,
        attr: NodeId,
        literal: NodeId,
    },
    Like {
        like: LikeKind,
        attr: NodeId,
        literal: NodeId,
    },
    Existence {
        check: ExistenceKind,
        attr: NodeId,
    },
    Temporal {
        temporal: TemporalKind,
        attr: NodeId,
        instant: NodeId,
    },
    During {
        attr: NodeId,
        timespan: NodeId,
    },
    Attribute {
        path: PropertyPath,
    },
    Literal {
        value: LiteralValue,
    },
    Timespan {
        #[serde(flatten)]
        form: TimespanForm,
    },
}

impl Node {
    /// Child node ids in left-to-right order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Node::And { left, right } | Node::Or { left, right } => vec![*left, *right],
            Node::Not { inner } => vec![*inner],
            Node::Comparison { attr, literal, .. } | Node::Like { attr, literal, .. } => {
                vec![*attr, *literal]
            }
            Node::Existence { attr, .. } => vec![*attr],
            Node::Temporal { attr, instant, .. } => vec![*attr, *instant],
            Node::During { attr, timespan } => vec![*attr, *timespan],
            Node::Attribute { .. } | Node::Literal { .. } => Vec::new(),
            Node::Timespan { form } => match *form {
                TimespanForm::FromTo { from, to } => vec![from, to],
                TimespanForm::FromDuration { from, duration } => vec![from, duration],
                TimespanForm::DurationTo { duration, to } => vec![duration, to],
            },
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::And { .. } => "and",
            Node::Or { .. } => "or",
            Node::Not { .. } => "not",
            Node::Comparison { .. } => "comparison",
            Node::Like { .. } => "like",
            Node::Existence { .. } => "existence",
            Node::Temporal { .. } => "temporal",
            Node::During { .. } => "during",
            Node::Attribute { .. } => "attribute",
            Node::Literal { .. } => "literal",
            Node::Timespan { .. } => "timespan",
        }
    }
}

/// A parsed CQL expression: node arena plus root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    /// Build an AST from raw parts, checking that every reference points
    /// inside the arena.
    pub fn from_parts(nodes: Vec<Node>, root: NodeId) -> Result<Self, LiteralError> {
        let ast = Self { nodes, root };
        ast.check_references()?;
        Ok(ast)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn check_references(&self) -> Result<(), LiteralError> {
        let len = self.nodes.len();
        // The root has no parent; report it against itself.
        if self.root.0 >= len {
            return Err(LiteralError::DanglingNode {
                id: self.root.0,
                parent: self.root.0,
                len,
            });
        }
        for (parent, node) in self.nodes() {
            if let Some(child) = node.children().into_iter().find(|c| c.0 >= len) {
                return Err(LiteralError::DanglingNode {
                    id: child.0,
                    parent: parent.0,
                    len,
                });
            }
        }
        Ok(())
    }
}

/// Incremental AST construction, mostly for parsers and tests.
#[derive(Debug, Default)]
pub struct AstBuilder {
    nodes: Vec<Node>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn attribute(&mut self, path: &str) -> Result<NodeId, LiteralError> {
        let path = path.parse()?;
        Ok(self.push(Node::Attribute { path }))
    }

    pub fn literal(&mut self, value: LiteralValue) -> NodeId {
        self.push(Node::Literal { value })
    }

    pub fn text(&mut self, text: &str) -> NodeId {
        self.literal(LiteralValue::Text(text.to_string()))
    }

    pub fn number(&mut self, lexeme: &str) -> NodeId {
        self.literal(LiteralValue::Number(lexeme.to_string()))
    }

    pub fn date_time(&mut self, lexeme: &str) -> NodeId {
        self.literal(LiteralValue::DateTime(lexeme.to_string()))
    }

    pub fn duration(&mut self, iso: &str) -> Result<NodeId, LiteralError> {
        let duration = iso.parse()?;
        Ok(self.literal(LiteralValue::Duration(duration)))
    }

    pub fn and(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.push(Node::And { left, right })
    }

    pub fn or(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.push(Node::Or { left, right })
    }

    pub fn not(&mut self, inner: NodeId) -> NodeId {
        self.push(Node::Not { inner })
    }

    pub fn compare(&mut self, op: ComparisonOp, path: &str, literal: NodeId) -> Result<NodeId, LiteralError> {
        let attr = self.attribute(path)?;
        Ok(self.push(Node::Comparison { op, attr, literal }))
    }

    pub fn like(&mut self, like: LikeKind, path: &str, pattern: &str) -> Result<NodeId, LiteralError> {
        let attr = self.attribute(path)?;
        let literal = self.text(pattern);
        Ok(self.push(Node::Like { like, attr, literal }))
    }

    pub fn existence(&mut self, check: ExistenceKind, path: &str) -> Result<NodeId, LiteralError> {
        let attr = self.attribute(path)?;
        Ok(self.push(Node::Existence { check, attr }))
    }

    pub fn temporal(&mut self, temporal: TemporalKind, path: &str, instant: &str) -> Result<NodeId, LiteralError> {
        let attr = self.attribute(path)?;
        let instant = self.date_time(instant);
        Ok(self.push(Node::Temporal {
            temporal,
            attr,
            instant,
        }))
    }

    pub fn during(&mut self, path: &str, form: TimespanForm) -> Result<NodeId, LiteralError> {
        let attr = self.attribute(path)?;
        let timespan = self.push(Node::Timespan { form });
        Ok(self.push(Node::During { attr, timespan }))
    }

    pub fn finish(self, root: NodeId) -> Result<Ast, LiteralError> {
        Ast::from_parts(self.nodes, root)
    }
}
