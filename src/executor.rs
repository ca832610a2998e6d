//! Execution engine: the depth-first tree walk.
//!
//! The executor visits one node at a time, synchronously. Suite and root
//! nodes recurse into their children (sub-suites first, then one batch run
//! for the leaf tests); failed-init nodes are terminal; a childless suite is
//! handed to the framework's unreported run entry point. Failures are
//! contained at the narrowest node boundary: anything unhandled becomes that
//! node's `failed` result, and only the fatal category escapes the engine,
//! re-raised after it has been reported.
//!
//! Shared mutable state is limited to the first-failure slot and the abort
//! ordinal counter, both owned by the executor instance. Both would need
//! synchronization if sibling suites ever ran concurrently.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::Utc;

use crate::diagnostics::{BridgeError, Cause, ErrorType};
use crate::listener::{ExecutionListener, ExecutionResult};
use crate::naming;
use crate::reporter::{record_first_failure, FailureSlot, ReporterAdapter};
use crate::selection::SelectionFilter;
use crate::suite::{SuiteAbortedEvent, SuiteEvent, SuiteFailure, SuiteReporter};
use crate::tree::{self, NodeKind, TestNode};

/// Walks a discovered tree and reports every node's outcome to a listener.
pub struct Executor {
    abort_after_failure: bool,
    first_failure: FailureSlot,
    ordinal: Cell<u64>,
    abort_reports: RefCell<Vec<SuiteAbortedEvent>>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    pub fn new() -> Self {
        Self::with_policy(false)
    }

    /// `abort_after_failure` enables the skip behavior: once any failure is
    /// recorded, every not-yet-started node is reported as aborted with the
    /// recorded cause.
    pub fn with_policy(abort_after_failure: bool) -> Self {
        Self {
            abort_after_failure,
            first_failure: Rc::new(RefCell::new(None)),
            ordinal: Cell::new(0),
            abort_reports: RefCell::new(Vec::new()),
        }
    }

    /// Executes `node` and its subtree.
    ///
    /// Returns `Err` only for fatal failures, which are re-raised after
    /// being reported; every other failure is converted into the affected
    /// node's terminal result.
    pub fn execute(
        &self,
        node: &Rc<TestNode>,
        listener: &mut dyn ExecutionListener,
    ) -> Result<(), BridgeError> {
        match self.execute_node(node, listener) {
            Ok(()) => Ok(()),
            Err(error) if error.is_fatal() => Err(error),
            Err(error) => {
                let cause = Cause::from(&error);
                record_first_failure(&self.first_failure, &cause);
                listener.finished(node, ExecutionResult::Failed(cause));
                Ok(())
            }
        }
    }

    /// Abort reports emitted so far, in ordinal order.
    pub fn abort_reports(&self) -> Vec<SuiteAbortedEvent> {
        self.abort_reports.borrow().clone()
    }

    fn execute_node(
        &self,
        node: &Rc<TestNode>,
        listener: &mut dyn ExecutionListener,
    ) -> Result<(), BridgeError> {
        if self.abort_after_failure {
            if let Some(cause) = self.first_failure.borrow().clone() {
                listener.started(node);
                listener.finished(node, ExecutionResult::Aborted(cause));
                return Ok(());
            }
        }

        match node.kind() {
            NodeKind::FailedInit { cause, .. } => {
                listener.started(node);
                let cause = cause.clone();
                record_first_failure(&self.first_failure, &cause);
                listener.finished(node, ExecutionResult::Failed(cause));
                Ok(())
            }
            NodeKind::Suite { suite, suite_name, .. } => {
                if node.children().is_empty() {
                    // Nothing was discovered to report against; hand the
                    // whole suite to the framework's unreported entry point.
                    suite
                        .run_unreported()
                        .map_err(|failure| self.run_error(suite_name, failure))
                } else {
                    self.execute_container(node, listener)
                }
            }
            NodeKind::Root => self.execute_container(node, listener),
            NodeKind::Test { .. } => {
                // Tests are normally batched per suite; reaching one directly
                // runs it as a one-element batch against its containing suite.
                let suite_node = node.containing_suite().ok_or_else(|| BridgeError::Internal {
                    message: format!("test node '{}' has no containing suite", node.id()),
                })?;
                self.run_selected(&suite_node, std::slice::from_ref(node), listener)?;
                Ok(())
            }
        }
    }

    fn execute_container(
        &self,
        node: &Rc<TestNode>,
        listener: &mut dyn ExecutionListener,
    ) -> Result<(), BridgeError> {
        listener.started(node);

        let (mut tests, mut sub_suites): (Vec<_>, Vec<_>) =
            node.children().into_iter().partition(|child| child.is_test());
        tree::sort_by_display_name(&mut sub_suites);
        tree::sort_by_display_name(&mut tests);

        for child in &sub_suites {
            self.execute(child, &mut *listener)?;
        }

        let mut executed_ok = true;
        if !tests.is_empty() {
            executed_ok = self.run_selected(node, &tests, listener)?;
        }

        // A suite-level error during the batch run already produced the
        // suite's terminal event; reporting success on top would be wrong.
        if executed_ok {
            listener.finished(node, ExecutionResult::Successful);
        }
        Ok(())
    }

    /// Runs exactly `tests` through the suite's native run entry point.
    ///
    /// Returns whether the suite itself executed cleanly. Failures raised by
    /// the native call are classified, reported as suite-level aborts, and
    /// collapse the return value to `false`; the fatal category additionally
    /// yields an `Err` after reporting.
    fn run_selected(
        &self,
        suite_node: &Rc<TestNode>,
        tests: &[Rc<TestNode>],
        listener: &mut dyn ExecutionListener,
    ) -> Result<bool, BridgeError> {
        let suite = suite_node.suite().ok_or_else(|| BridgeError::Internal {
            message: format!("node '{}' owns tests but is not a suite", suite_node.id()),
        })?;
        let suite_id = suite.suite_id();
        let suite_name = suite.suite_name();

        let reported = suite
            .test_names()
            .map_err(|failure| self.run_error(&suite_name, failure))?;
        let desired: Vec<String> = reported
            .into_iter()
            .filter(|name| {
                let decoded = naming::decode(name);
                tests
                    .iter()
                    .filter_map(|test| test.test_name())
                    .any(|requested| requested == name.as_str() || requested == decoded)
            })
            .collect();
        let filter = SelectionFilter::for_tests(suite_id.clone(), desired);

        let mut adapter = ReporterAdapter::new(
            Rc::clone(suite_node),
            tests,
            listener,
            Rc::clone(&self.first_failure),
        );

        match suite.run(Some(&filter), &mut adapter) {
            Ok(status) => {
                status.wait_until_completed();
                Ok(true)
            }
            Err(failure) => {
                let fatal = failure.is_fatal();
                let aborted = self.classify(failure, &suite_name, &suite_id);
                let message = aborted.message.clone();
                self.abort_reports.borrow_mut().push(aborted.clone());
                adapter.apply(SuiteEvent::SuiteAborted(aborted));
                if fatal {
                    return Err(BridgeError::Fatal {
                        suite_name,
                        message,
                    });
                }
                Ok(false)
            }
        }
    }

    /// Turns a native-run failure into a suite-level abort report.
    fn classify(
        &self,
        failure: SuiteFailure,
        suite_name: &str,
        suite_id: &str,
    ) -> SuiteAbortedEvent {
        let (message, cause) = match failure {
            SuiteFailure::Construction { message } => (
                format!("cannot instantiate suite: {}", message),
                Cause::new(ErrorType::Construction, message),
            ),
            SuiteFailure::Assertion { message, cause } => (
                format!("an exception caused the suite run to abort: {}", message),
                cause.unwrap_or_else(|| Cause::new(ErrorType::Assertion, message)),
            ),
            SuiteFailure::MissingDependency { class_name } => (
                format!("cannot load class: {}", class_name),
                Cause::new(ErrorType::MissingDependency, class_name),
            ),
            SuiteFailure::Fatal { message } => (
                format!("an exception caused the suite run to abort: {}", message),
                Cause::new(ErrorType::Fatal, message),
            ),
            SuiteFailure::Other { message } => (
                format!("an exception caused the suite run to abort: {}", message),
                Cause::new(ErrorType::Execution, message),
            ),
        };
        SuiteAbortedEvent {
            ordinal: self.next_ordinal(),
            message,
            suite_name: suite_name.to_string(),
            suite_id: suite_id.to_string(),
            cause,
            thread_name: std::thread::current().name().unwrap_or("unnamed").to_string(),
            timestamp: Utc::now(),
        }
    }

    fn run_error(&self, suite_name: &str, failure: SuiteFailure) -> BridgeError {
        if failure.is_fatal() {
            BridgeError::Fatal {
                suite_name: suite_name.to_string(),
                message: failure.message(),
            }
        } else {
            BridgeError::Run {
                suite_name: suite_name.to_string(),
                message: failure.to_string(),
            }
        }
    }

    fn next_ordinal(&self) -> u64 {
        let next = self.ordinal.get() + 1;
        self.ordinal.set(next);
        next
    }
}
