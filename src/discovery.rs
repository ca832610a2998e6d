//! Tree builder: the discovery phase.
//!
//! Discovery turns a list of suite class names into the node tree executed
//! later. Failures are contained per class: a class that cannot be loaded,
//! constructed, or introspected yields exactly one failed-init node under
//! its requested parent, and discovery continues with the remaining
//! classes. Nested suite instances are walked with the same guarantee, one
//! failed-init fallback per nested suite.

use std::rc::Rc;

use im::HashSet;

use crate::diagnostics::{Cause, ErrorType};
use crate::loader::SuiteLoader;
use crate::suite::{SuiteFailure, SuiteRef};
use crate::tree::{Tag, TestNode};

/// Builds the test tree for one discovery run.
pub struct TreeBuilder;

impl TreeBuilder {
    /// Discovers `classes` under `root`, resolving them through `loader`.
    ///
    /// Every class in the list yields exactly one child of `root`: a suite
    /// node on success, a failed-init node on any failure.
    pub fn discover(
        root: Rc<TestNode>,
        classes: &[String],
        loader: &dyn SuiteLoader,
    ) -> Rc<TestNode> {
        for class_name in classes {
            match Self::load_and_instantiate(class_name, loader) {
                Ok(suite) => {
                    if let Err(cause) = Self::add_suite(&suite, &root, loader) {
                        Self::add_failed_init(cause, class_name, &root, loader);
                    }
                }
                Err(cause) => Self::add_failed_init(cause, class_name, &root, loader),
            }
        }
        root
    }

    fn load_and_instantiate(
        class_name: &str,
        loader: &dyn SuiteLoader,
    ) -> Result<SuiteRef, Cause> {
        let factory = loader
            .load_class(class_name)
            .map_err(|error| Cause::from(&error))?;
        factory.instantiate().map_err(|error| Cause::from(&error))
    }

    fn add_failed_init(
        cause: Cause,
        class_name: &str,
        parent: &Rc<TestNode>,
        loader: &dyn SuiteLoader,
    ) {
        let tags = loader.declared_tags(class_name);
        TestNode::new_failed_init(parent, cause, class_name.to_string(), tags);
    }

    /// Adds one suite subtree. Introspection runs before any node is linked,
    /// so a faulting suite leaves no partial subtree behind.
    fn add_suite(
        suite: &SuiteRef,
        parent: &Rc<TestNode>,
        loader: &dyn SuiteLoader,
    ) -> Result<(), Cause> {
        let test_names = suite
            .test_names()
            .map_err(|failure| Self::introspection_cause(suite, failure))?;
        let test_tags = suite
            .test_tags()
            .map_err(|failure| Self::introspection_cause(suite, failure))?;
        let nested = suite
            .nested_suites()
            .map_err(|failure| Self::introspection_cause(suite, failure))?;

        let declared = loader.declared_tags(&suite.type_name());
        let node = TestNode::new_suite(
            parent,
            Rc::clone(suite),
            suite.suite_id(),
            suite.suite_name(),
            declared,
        );

        for test_name in test_names {
            let tags: HashSet<Tag> = test_tags
                .get(&test_name)
                .map(|set| set.iter().map(|tag| Tag::new(tag.as_str())).collect())
                .unwrap_or_default();
            TestNode::new_test(&node, test_name, tags);
        }

        for nested_suite in nested {
            // Nested instances are reused as-is, never re-instantiated.
            if let Err(cause) = Self::add_suite(&nested_suite, &node, loader) {
                Self::add_failed_init(cause, &nested_suite.type_name(), &node, loader);
            }
        }

        Ok(())
    }

    fn introspection_cause(suite: &SuiteRef, failure: SuiteFailure) -> Cause {
        Cause::new(
            ErrorType::Construction,
            format!("suite '{}' failed during discovery: {}", suite.suite_name(), failure),
        )
    }
}
