//! Reporter adapter: native events to listener calls.
//!
//! One adapter is built per batch test run. It indexes the batch's test
//! nodes by raw and decoded name, resolves each native event to the right
//! node, and forwards the outcome to the generic listener. Failures and
//! aborts are also written into the shared first-failure slot consulted by
//! the abort-after-failure policy. Events naming tests outside the batch
//! have nothing to report against and are dropped.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::diagnostics::Cause;
use crate::listener::{ExecutionListener, ExecutionResult};
use crate::naming;
use crate::suite::{SuiteEvent, SuiteReporter};
use crate::tree::TestNode;

/// The first failure cause recorded during an execution run, if any.
/// Set at most once; all later aborted results reuse the same cause.
pub type FailureSlot = Rc<RefCell<Option<Cause>>>;

/// Records `cause` into `slot` unless an earlier failure is already there.
pub fn record_first_failure(slot: &FailureSlot, cause: &Cause) {
    let mut recorded = slot.borrow_mut();
    if recorded.is_none() {
        *recorded = Some(cause.clone());
    }
}

/// Translates one suite's native event stream for the generic listener.
pub struct ReporterAdapter<'a> {
    listener: &'a mut dyn ExecutionListener,
    suite_node: Rc<TestNode>,
    tests_by_name: HashMap<String, Rc<TestNode>>,
    first_failure: FailureSlot,
}

impl<'a> ReporterAdapter<'a> {
    pub fn new(
        suite_node: Rc<TestNode>,
        tests: &[Rc<TestNode>],
        listener: &'a mut dyn ExecutionListener,
        first_failure: FailureSlot,
    ) -> Self {
        let mut tests_by_name = HashMap::new();
        for test in tests {
            if let Some(name) = test.test_name() {
                tests_by_name.insert(name.to_string(), Rc::clone(test));
                let decoded = naming::decode(name);
                if decoded != name {
                    tests_by_name
                        .entry(decoded)
                        .or_insert_with(|| Rc::clone(test));
                }
            }
        }
        Self {
            listener,
            suite_node,
            tests_by_name,
            first_failure,
        }
    }

    fn lookup(&self, test_name: &str) -> Option<Rc<TestNode>> {
        self.tests_by_name
            .get(test_name)
            .or_else(|| self.tests_by_name.get(&naming::decode(test_name)))
            .cloned()
    }
}

impl SuiteReporter for ReporterAdapter<'_> {
    fn apply(&mut self, event: SuiteEvent) {
        match event {
            SuiteEvent::TestStarting { test_name } => {
                if let Some(node) = self.lookup(&test_name) {
                    self.listener.started(&node);
                }
            }
            SuiteEvent::TestSucceeded { test_name } => {
                if let Some(node) = self.lookup(&test_name) {
                    self.listener.finished(&node, ExecutionResult::Successful);
                }
            }
            SuiteEvent::TestFailed { test_name, cause } => {
                if let Some(node) = self.lookup(&test_name) {
                    record_first_failure(&self.first_failure, &cause);
                    self.listener.finished(&node, ExecutionResult::Failed(cause));
                }
            }
            SuiteEvent::TestCanceled { test_name, cause } => {
                if let Some(node) = self.lookup(&test_name) {
                    record_first_failure(&self.first_failure, &cause);
                    self.listener
                        .finished(&node, ExecutionResult::Aborted(cause));
                }
            }
            SuiteEvent::SuiteAborted(aborted) => {
                record_first_failure(&self.first_failure, &aborted.cause);
                self.listener
                    .finished(&self.suite_node, ExecutionResult::Aborted(aborted.cause));
            }
        }
    }
}
