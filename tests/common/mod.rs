//! Shared helpers for the integration suites: scripted fake suites, a
//! recording listener, and registry builders.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use im::{HashMap, HashSet};
use suitebridge::diagnostics::{BridgeError, Cause, ErrorType};
use suitebridge::listener::{ExecutionListener, ExecutionResult};
use suitebridge::loader::SuiteRegistry;
use suitebridge::naming;
use suitebridge::selection::SelectionFilter;
use suitebridge::suite::{RunStatus, Suite, SuiteEvent, SuiteFailure, SuiteReporter, SuiteRef};
use suitebridge::tree::{Tag, TestNode};

/// What a scripted test does when the native run reaches it.
#[derive(Debug, Clone)]
pub enum TestScript {
    Pass,
    Fail(&'static str),
    Cancel(&'static str),
}

/// A scripted stand-in for a foreign-framework suite.
///
/// Behavior is configured up front: tests and their outcomes, nested suite
/// instances, and optional failures raised before any test runs (a
/// setup-before-all stand-in) or after all tests ran (teardown-after-all).
#[derive(Clone)]
pub struct ScriptedSuite {
    id: String,
    name: String,
    type_name: String,
    tests: Vec<(String, TestScript)>,
    tags: HashMap<String, HashSet<String>>,
    nested: Vec<SuiteRef>,
    before_failure: Option<SuiteFailure>,
    after_failure: Option<SuiteFailure>,
    introspection_failure: bool,
    report_decoded_names: bool,
    async_completion: bool,
    run_log: Rc<RefCell<Vec<String>>>,
    unreported_runs: Rc<RefCell<u32>>,
}

impl ScriptedSuite {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            type_name: id.to_string(),
            tests: Vec::new(),
            tags: HashMap::new(),
            nested: Vec::new(),
            before_failure: None,
            after_failure: None,
            introspection_failure: false,
            report_decoded_names: false,
            async_completion: false,
            run_log: Rc::new(RefCell::new(Vec::new())),
            unreported_runs: Rc::new(RefCell::new(0)),
        }
    }

    pub fn with_test(mut self, name: &str, script: TestScript) -> Self {
        self.tests.push((name.to_string(), script));
        self
    }

    pub fn with_tag(mut self, test_name: &str, tag: &str) -> Self {
        let tags = self
            .tags
            .entry(test_name.to_string())
            .or_insert_with(HashSet::new);
        tags.insert(tag.to_string());
        self
    }

    pub fn with_nested(mut self, nested: SuiteRef) -> Self {
        self.nested.push(nested);
        self
    }

    pub fn with_before_failure(mut self, failure: SuiteFailure) -> Self {
        self.before_failure = Some(failure);
        self
    }

    pub fn with_after_failure(mut self, failure: SuiteFailure) -> Self {
        self.after_failure = Some(failure);
        self
    }

    pub fn with_failing_introspection(mut self) -> Self {
        self.introspection_failure = true;
        self
    }

    /// Makes the native run report events with decoded test names, the way
    /// a framework that stores encoded names surfaces them.
    pub fn reporting_decoded_names(mut self) -> Self {
        self.report_decoded_names = true;
        self
    }

    /// Makes the native run signal completion through a pending receiver
    /// instead of returning an already-completed status.
    pub fn completing_asynchronously(mut self) -> Self {
        self.async_completion = true;
        self
    }

    /// Handle onto the names of tests the native run actually executed.
    pub fn run_log(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.run_log)
    }

    /// Handle onto the count of unreported direct runs.
    pub fn unreported_runs(&self) -> Rc<RefCell<u32>> {
        Rc::clone(&self.unreported_runs)
    }

    pub fn into_ref(self) -> SuiteRef {
        Rc::new(self)
    }
}

impl Suite for ScriptedSuite {
    fn suite_id(&self) -> String {
        self.id.clone()
    }

    fn suite_name(&self) -> String {
        self.name.clone()
    }

    fn type_name(&self) -> String {
        self.type_name.clone()
    }

    fn test_names(&self) -> Result<Vec<String>, SuiteFailure> {
        if self.introspection_failure {
            return Err(SuiteFailure::Other {
                message: "introspection refused".to_string(),
            });
        }
        Ok(self.tests.iter().map(|(name, _)| name.clone()).collect())
    }

    fn test_tags(&self) -> Result<HashMap<String, HashSet<String>>, SuiteFailure> {
        Ok(self.tags.clone())
    }

    fn nested_suites(&self) -> Result<Vec<SuiteRef>, SuiteFailure> {
        Ok(self.nested.clone())
    }

    fn run(
        &self,
        filter: Option<&SelectionFilter>,
        reporter: &mut dyn SuiteReporter,
    ) -> Result<RunStatus, SuiteFailure> {
        if let Some(failure) = &self.before_failure {
            return Err(failure.clone());
        }
        for (name, script) in &self.tests {
            if !filter.map_or(true, |f| f.is_selected(name)) {
                continue;
            }
            self.run_log.borrow_mut().push(name.clone());
            let reported = if self.report_decoded_names {
                naming::decode(name)
            } else {
                name.clone()
            };
            reporter.apply(SuiteEvent::TestStarting {
                test_name: reported.clone(),
            });
            match script {
                TestScript::Pass => reporter.apply(SuiteEvent::TestSucceeded {
                    test_name: reported,
                }),
                TestScript::Fail(message) => reporter.apply(SuiteEvent::TestFailed {
                    test_name: reported,
                    cause: Cause::new(ErrorType::Assertion, *message),
                }),
                TestScript::Cancel(message) => reporter.apply(SuiteEvent::TestCanceled {
                    test_name: reported,
                    cause: Cause::new(ErrorType::Execution, *message),
                }),
            }
        }
        if let Some(failure) = &self.after_failure {
            return Err(failure.clone());
        }
        if self.async_completion {
            let (sender, receiver) = std::sync::mpsc::channel();
            sender.send(()).ok();
            return Ok(RunStatus::Pending(receiver));
        }
        Ok(RunStatus::Completed)
    }

    fn run_unreported(&self) -> Result<(), SuiteFailure> {
        *self.unreported_runs.borrow_mut() += 1;
        Ok(())
    }
}

/// Registers a scripted suite under `class_name`; each instantiation clones
/// the template (shared run logs survive the clone).
pub fn register_suite(registry: &mut SuiteRegistry, class_name: &str, suite: ScriptedSuite) {
    registry.register(class_name, move || Ok(suite.clone().into_ref()));
}

/// Registers a scripted suite together with class-level declared tags.
pub fn register_suite_with_tags(
    registry: &mut SuiteRegistry,
    class_name: &str,
    tags: Vec<Tag>,
    suite: ScriptedSuite,
) {
    registry.register_with_tags(class_name, tags, move || Ok(suite.clone().into_ref()));
}

/// Registers a class whose construction always fails.
pub fn register_broken(registry: &mut SuiteRegistry, class_name: &str, message: &str) {
    let class_name_owned = class_name.to_string();
    let message = message.to_string();
    registry.register(class_name, move || {
        Err(BridgeError::Instantiate {
            class_name: class_name_owned.clone(),
            message: message.clone(),
        })
    });
}

pub fn classes(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// One listener event, flattened to node id for easy assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenerEvent {
    Started { id: String },
    Finished { id: String, result: ExecutionResult },
}

/// Listener that records every event in order.
#[derive(Default)]
pub struct RecordingListener {
    pub events: Vec<ListenerEvent>,
}

impl ExecutionListener for RecordingListener {
    fn started(&mut self, node: &TestNode) {
        self.events.push(ListenerEvent::Started {
            id: node.id().to_string(),
        });
    }

    fn finished(&mut self, node: &TestNode, result: ExecutionResult) {
        self.events.push(ListenerEvent::Finished {
            id: node.id().to_string(),
            result,
        });
    }
}

impl RecordingListener {
    /// The terminal result of the node whose id ends with `id_suffix`.
    pub fn result_for(&self, id_suffix: &str) -> Option<&ExecutionResult> {
        self.events.iter().find_map(|event| match event {
            ListenerEvent::Finished { id, result } if id.ends_with(id_suffix) => Some(result),
            _ => None,
        })
    }

    /// Whether a `started` event was recorded for the matching node.
    pub fn was_started(&self, id_suffix: &str) -> bool {
        self.events.iter().any(
            |event| matches!(event, ListenerEvent::Started { id } if id.ends_with(id_suffix)),
        )
    }

    /// Position of the matching node's `finished` event in the stream.
    pub fn finished_index(&self, id_suffix: &str) -> Option<usize> {
        self.events.iter().position(
            |event| matches!(event, ListenerEvent::Finished { id, .. } if id.ends_with(id_suffix)),
        )
    }

    /// Position of the matching node's `started` event in the stream.
    pub fn started_index(&self, id_suffix: &str) -> Option<usize> {
        self.events.iter().position(
            |event| matches!(event, ListenerEvent::Started { id } if id.ends_with(id_suffix)),
        )
    }

    /// Count of `finished` events for the matching node.
    pub fn finished_count(&self, id_suffix: &str) -> usize {
        self.events
            .iter()
            .filter(
                |event| matches!(event, ListenerEvent::Finished { id, .. } if id.ends_with(id_suffix)),
            )
            .count()
    }

    /// All terminal results, in emission order.
    pub fn finished_events(&self) -> Vec<(&str, &ExecutionResult)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ListenerEvent::Finished { id, result } => Some((id.as_str(), result)),
                _ => None,
            })
            .collect()
    }
}
