//! Body node types: keyword calls and nestable control blocks.

use serde::{Deserialize, Serialize};

/// One entry in a test body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyNode {
    Keyword(KeywordCall),
    Control(ControlBlock),
}

impl BodyNode {
    /// Returns the contained keyword call, if this node is one.
    pub fn as_keyword(&self) -> Option<&KeywordCall> {
        match self {
            BodyNode::Keyword(kw) => Some(kw),
            BodyNode::Control(_) => None,
        }
    }
}

/// A keyword invocation with its arguments, assignment targets, and tags.
///
/// `timeout` and `lineno` are carried verbatim through expansion; the other
/// string fields are subject to variable substitution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordCall {
    pub name: String,
    pub args: Vec<String>,
    pub assign: Vec<String>,
    pub tags: Vec<String>,
    pub timeout: Option<String>,
    pub lineno: Option<usize>,
}

impl KeywordCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            assign: Vec::new(),
            tags: Vec::new(),
            timeout: None,
            lineno: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_assign<I, S>(mut self, assign: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assign = assign.into_iter().map(Into::into).collect();
        self
    }
}

/// The flavor of a control block. The expansion engine does not interpret
/// control flow; the kind only tags the node so hosts can compile it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    For,
    If,
    While,
}

/// A control-flow block with an optional condition, optional loop values,
/// and a nested body. Blocks nest arbitrarily deep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlBlock {
    pub kind: ControlKind,
    /// Condition text for `If`/`While` blocks.
    pub condition: Option<String>,
    /// Loop value list for `For` blocks.
    pub values: Vec<String>,
    pub body: Vec<BodyNode>,
}

impl ControlBlock {
    pub fn new(kind: ControlKind) -> Self {
        Self {
            kind,
            condition: None,
            values: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_body(mut self, body: Vec<BodyNode>) -> Self {
        self.body = body;
        self
    }
}
