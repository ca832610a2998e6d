//! The discovered test tree.
//!
//! Discovery produces a rooted tree of [`TestNode`]s: a synthetic root, one
//! suite node per constructible suite (possibly nested), one test node per
//! reported test name, and one failed-init node per suite that could not be
//! constructed. Nodes are linked once, top-down, during discovery; execution
//! only reads the tree. Each node carries a unique identifier derived from
//! its position, formatted as bracketed segments joined by `/`, e.g.
//! `[engine:suitebridge]/[suite:tests.MathSpec]/[test:adds numbers]`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use im::HashSet;

use crate::diagnostics::Cause;
use crate::suite::SuiteRef;

/// A string label attached to a suite type or an individual test.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(String);

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Tag(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position-derived unique identifier of a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(String);

impl NodeId {
    /// Root identifier for a discovery run under the given engine name.
    pub fn engine(engine_name: &str) -> Self {
        NodeId(format!("[engine:{}]", engine_name))
    }

    /// Identifier of a child segment below this node.
    pub fn child(&self, segment: &str, value: &str) -> Self {
        NodeId(format!("{}/[{}:{}]", self.0, segment, value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four node variants of the discovered tree.
pub enum NodeKind {
    /// Synthetic top-level container, one per discovery run.
    Root,
    /// A constructible suite, holding the live foreign instance.
    Suite {
        suite: SuiteRef,
        suite_id: String,
        suite_name: String,
    },
    /// One runnable test inside its parent suite.
    Test { test_name: String },
    /// Stands in for a suite that could not be constructed.
    FailedInit { cause: Cause, class_name: String },
}

impl NodeKind {
    fn label(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Suite { .. } => "suite",
            NodeKind::Test { .. } => "test",
            NodeKind::FailedInit { .. } => "failed-init",
        }
    }
}

/// One node of the discovered test tree.
pub struct TestNode {
    id: NodeId,
    display_name: String,
    tags: HashSet<Tag>,
    kind: NodeKind,
    parent: RefCell<Weak<TestNode>>,
    children: RefCell<Vec<Rc<TestNode>>>,
}

impl TestNode {
    /// Creates the synthetic root of a discovery run.
    pub fn new_root(engine_name: &str) -> Rc<TestNode> {
        Rc::new(TestNode {
            id: NodeId::engine(engine_name),
            display_name: engine_name.to_string(),
            tags: HashSet::new(),
            kind: NodeKind::Root,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        })
    }

    /// Creates a suite node and links it under `parent`.
    pub fn new_suite(
        parent: &Rc<TestNode>,
        suite: SuiteRef,
        suite_id: String,
        suite_name: String,
        tags: HashSet<Tag>,
    ) -> Rc<TestNode> {
        let node = TestNode {
            id: parent.id.child("suite", &suite_id),
            display_name: suite_name.clone(),
            tags,
            kind: NodeKind::Suite {
                suite,
                suite_id,
                suite_name,
            },
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        };
        Self::link(parent, node)
    }

    /// Creates a test node and links it under its containing suite.
    pub fn new_test(parent: &Rc<TestNode>, test_name: String, tags: HashSet<Tag>) -> Rc<TestNode> {
        let node = TestNode {
            id: parent.id.child("test", &test_name),
            display_name: test_name.clone(),
            tags,
            kind: NodeKind::Test { test_name },
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        };
        Self::link(parent, node)
    }

    /// Creates a failed-init node and links it under `parent`.
    pub fn new_failed_init(
        parent: &Rc<TestNode>,
        cause: Cause,
        class_name: String,
        tags: HashSet<Tag>,
    ) -> Rc<TestNode> {
        let node = TestNode {
            id: parent.id.child("failed", &class_name),
            display_name: class_name.clone(),
            tags,
            kind: NodeKind::FailedInit { cause, class_name },
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        };
        Self::link(parent, node)
    }

    fn link(parent: &Rc<TestNode>, child: TestNode) -> Rc<TestNode> {
        let child = Rc::new(child);
        *child.parent.borrow_mut() = Rc::downgrade(parent);
        parent.children.borrow_mut().push(Rc::clone(&child));
        child
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn tags(&self) -> &HashSet<Tag> {
        &self.tags
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<Rc<TestNode>> {
        self.parent.borrow().upgrade()
    }

    /// Snapshot of the node's children, in insertion order.
    pub fn children(&self) -> Vec<Rc<TestNode>> {
        self.children.borrow().clone()
    }

    pub fn is_test(&self) -> bool {
        matches!(self.kind, NodeKind::Test { .. })
    }

    pub fn is_suite(&self) -> bool {
        matches!(self.kind, NodeKind::Suite { .. })
    }

    /// The live foreign instance, for suite nodes.
    pub fn suite(&self) -> Option<SuiteRef> {
        match &self.kind {
            NodeKind::Suite { suite, .. } => Some(Rc::clone(suite)),
            _ => None,
        }
    }

    /// The raw framework-reported test name, for test nodes.
    pub fn test_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Test { test_name } => Some(test_name),
            _ => None,
        }
    }

    /// The suite node owning this test node.
    pub fn containing_suite(&self) -> Option<Rc<TestNode>> {
        self.parent().filter(|p| p.is_suite())
    }
}

impl fmt::Debug for TestNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestNode")
            .field("id", &self.id.as_str())
            .field("kind", &self.kind.label())
            .field("display_name", &self.display_name)
            .field("children", &self.children.borrow().len())
            .finish()
    }
}

/// Orders sibling nodes deterministically before execution.
pub fn sort_by_display_name(nodes: &mut [Rc<TestNode>]) {
    nodes.sort_by(|a, b| a.display_name().cmp(b.display_name()));
}
