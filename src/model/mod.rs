//! # Test Tree Model
//!
//! The owned suite/test/body structures that expansion operates on. A
//! [`Suite`] exclusively owns its test list and child suites; the expansion
//! orchestrator is the only component that replaces a suite's test list.
//!
//! Body nodes are a tagged variant ([`BodyNode`]) so that "is this the
//! `Examples:` pseudo-call" is a single well-typed predicate rather than
//! attribute probing over heterogeneous node types.

mod body;

pub use body::{BodyNode, ControlBlock, ControlKind, KeywordCall};

use serde::{Deserialize, Serialize};

/// A suite of test cases, possibly with nested child suites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suite {
    pub name: String,
    pub tests: Vec<TestCase>,
    pub suites: Vec<Suite>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
            suites: Vec::new(),
        }
    }

    /// Total number of tests in this suite and all child suites.
    pub fn test_count(&self) -> usize {
        self.tests.len() + self.suites.iter().map(Suite::test_count).sum::<usize>()
    }
}

/// A single test case: either an authored template (its body contains the
/// `Examples:` pseudo-call) or a concrete, runnable case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub tags: Vec<String>,
    pub setup: Option<KeywordCall>,
    pub teardown: Option<KeywordCall>,
    pub body: Vec<BodyNode>,
    pub lineno: Option<usize>,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            setup: None,
            teardown: None,
            body: Vec::new(),
            lineno: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Append a node to the test body.
    pub fn push(&mut self, node: BodyNode) {
        self.body.push(node);
    }
}
