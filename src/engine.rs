//! Engine facade tying discovery and execution together.
//!
//! The harness interacts with one [`BridgeEngine`]: `discover` builds the
//! tree for a list of suite classes, `execute` walks it against a listener.
//! Each execution run gets a fresh executor, so the first-failure flag and
//! the abort ordinal sequence never leak between runs.

use std::rc::Rc;

use crate::config::EngineConfig;
use crate::diagnostics::BridgeError;
use crate::discovery::TreeBuilder;
use crate::executor::Executor;
use crate::listener::ExecutionListener;
use crate::loader::SuiteLoader;
use crate::tree::TestNode;

pub struct BridgeEngine {
    config: EngineConfig,
}

impl BridgeEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Discovery phase: builds the test tree for `classes`.
    pub fn discover(&self, classes: &[String], loader: &dyn SuiteLoader) -> Rc<TestNode> {
        let root = TestNode::new_root(&self.config.engine_name);
        TreeBuilder::discover(root, classes, loader)
    }

    /// Execution phase: walks `tree` and reports each node to `listener`.
    pub fn execute(
        &self,
        tree: &Rc<TestNode>,
        listener: &mut dyn ExecutionListener,
    ) -> Result<(), BridgeError> {
        let executor = Executor::with_policy(self.config.abort_after_failure);
        executor.execute(tree, listener)
    }
}
