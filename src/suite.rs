//! The foreign-framework surface consumed by the bridge.
//!
//! Everything the bridge needs from a suite-oriented test framework is
//! expressed by the [`Suite`] trait: identity, test names and per-test tags,
//! nested suite instances, and two run entry points (a selective, reported
//! run and an unreported direct run). During a reported run the framework
//! feeds its own event stream into a [`SuiteReporter`]; the bridge supplies
//! an adapter that translates those events into the generic listener
//! protocol.
//!
//! Introspection methods are fallible: the foreign side may fault while
//! enumerating tests or nested suites, and discovery turns such faults into
//! failed-init nodes instead of aborting the pass.

use std::fmt;
use std::rc::Rc;
use std::sync::mpsc::Receiver;

use chrono::{DateTime, Utc};
use im::{HashMap, HashSet};

use crate::diagnostics::Cause;
use crate::selection::SelectionFilter;

/// Shared handle to a live foreign-suite instance.
///
/// One instance is constructed per suite class during discovery and reused
/// for all of its tests during execution.
pub type SuiteRef = Rc<dyn Suite>;

/// A suite of the foreign test framework.
pub trait Suite {
    /// Foreign-assigned suite identifier (stable across discovery and runs).
    fn suite_id(&self) -> String;

    /// Human-readable suite name.
    fn suite_name(&self) -> String;

    /// The concrete type name of this suite, used for declared-tag lookup
    /// and for naming failed-init nodes of nested suites.
    fn type_name(&self) -> String;

    /// Names of all tests owned by this suite, in the framework's raw
    /// (possibly operator-encoded) form.
    fn test_names(&self) -> Result<Vec<String>, SuiteFailure>;

    /// The framework's own test-name to tag-set mapping.
    fn test_tags(&self) -> Result<HashMap<String, HashSet<String>>, SuiteFailure>;

    /// Already-constructed nested suite instances, if any.
    fn nested_suites(&self) -> Result<Vec<SuiteRef>, SuiteFailure>;

    /// Runs the suite natively, restricted by `filter`, reporting per-test
    /// events through `reporter`. Returns an awaitable completion status.
    fn run(
        &self,
        filter: Option<&SelectionFilter>,
        reporter: &mut dyn SuiteReporter,
    ) -> Result<RunStatus, SuiteFailure>;

    /// Runs the suite natively without any reporting. Used for suites whose
    /// structure could not be fully discovered.
    fn run_unreported(&self) -> Result<(), SuiteFailure>;
}

/// One-shot completion signal of a native run, awaited synchronously.
pub enum RunStatus {
    /// The run finished before the entry point returned.
    Completed,
    /// The run completes later; the receiver fires (or disconnects) when done.
    Pending(Receiver<()>),
}

impl RunStatus {
    /// Blocks until the native run signals completion.
    pub fn wait_until_completed(self) {
        if let RunStatus::Pending(signal) = self {
            // A dropped sender counts as completion.
            let _ = signal.recv();
        }
    }
}

/// A failure raised by the foreign framework's run or introspection calls.
#[derive(Debug, Clone, PartialEq)]
pub enum SuiteFailure {
    /// The framework could not construct or access the suite.
    Construction { message: String },
    /// A failed-assertion style error escaped the run, optionally carrying
    /// the assertion's own recorded cause.
    Assertion {
        message: String,
        cause: Option<Cause>,
    },
    /// A runtime component was missing when the run needed it.
    MissingDependency { class_name: String },
    /// Unrecoverable failure category reserved by the runtime.
    Fatal { message: String },
    /// Any other failure.
    Other { message: String },
}

impl SuiteFailure {
    pub fn is_fatal(&self) -> bool {
        matches!(self, SuiteFailure::Fatal { .. })
    }

    pub fn message(&self) -> String {
        match self {
            SuiteFailure::Construction { message } => message.clone(),
            SuiteFailure::Assertion { message, .. } => message.clone(),
            SuiteFailure::MissingDependency { class_name } => class_name.clone(),
            SuiteFailure::Fatal { message } => message.clone(),
            SuiteFailure::Other { message } => message.clone(),
        }
    }
}

impl fmt::Display for SuiteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuiteFailure::Construction { message } => {
                write!(f, "suite could not be constructed: {}", message)
            }
            SuiteFailure::Assertion { message, .. } => {
                write!(f, "assertion escaped the run: {}", message)
            }
            SuiteFailure::MissingDependency { class_name } => {
                write!(f, "missing runtime dependency: {}", class_name)
            }
            SuiteFailure::Fatal { message } => write!(f, "fatal: {}", message),
            SuiteFailure::Other { message } => write!(f, "{}", message),
        }
    }
}

/// Events emitted by the foreign framework during a reported run.
#[derive(Debug, Clone)]
pub enum SuiteEvent {
    TestStarting { test_name: String },
    TestSucceeded { test_name: String },
    TestFailed { test_name: String, cause: Cause },
    TestCanceled { test_name: String, cause: Cause },
    SuiteAborted(SuiteAbortedEvent),
}

/// A suite-level abort report.
///
/// Ordinals form one global, monotonically increasing sequence per
/// execution run.
#[derive(Debug, Clone)]
pub struct SuiteAbortedEvent {
    pub ordinal: u64,
    pub message: String,
    pub suite_name: String,
    pub suite_id: String,
    pub cause: Cause,
    pub thread_name: String,
    pub timestamp: DateTime<Utc>,
}

/// Consumer of the native event stream.
pub trait SuiteReporter {
    fn apply(&mut self, event: SuiteEvent);
}
