//! Suite loading and the declared-tag registry.
//!
//! The bridge never scans types at runtime. Suite classes are registered up
//! front with a construction closure and an optional set of class-level
//! tags; discovery resolves class names through the [`SuiteLoader`]
//! capability and queries declared tags by exact type name. Declared tags
//! remain available even when construction fails, which is what failed-init
//! nodes are tagged with.

use std::collections::HashMap;

use im::HashSet;

use crate::diagnostics::BridgeError;
use crate::suite::SuiteRef;
use crate::tree::Tag;

/// Constructs one suite instance per call.
pub trait SuiteFactory: std::fmt::Debug {
    fn instantiate(&self) -> Result<SuiteRef, BridgeError>;
}

/// The class-loading capability consumed by discovery.
///
/// Both steps may fail; discovery catches every failure and records it as a
/// failed-init node, never aborting the pass.
pub trait SuiteLoader {
    /// Resolves a class name to an instantiable factory.
    fn load_class(&self, class_name: &str) -> Result<&dyn SuiteFactory, BridgeError>;

    /// Class-level tags declared for a type, by exact type name.
    /// Unknown types have no declared tags.
    fn declared_tags(&self, class_name: &str) -> HashSet<Tag>;
}

type ConstructFn = Box<dyn Fn() -> Result<SuiteRef, BridgeError>>;

struct FnFactory {
    construct: ConstructFn,
}

impl std::fmt::Debug for FnFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFactory").finish_non_exhaustive()
    }
}

impl SuiteFactory for FnFactory {
    fn instantiate(&self) -> Result<SuiteRef, BridgeError> {
        (self.construct)()
    }
}

struct RegistryEntry {
    factory: FnFactory,
    declared_tags: HashSet<Tag>,
}

/// In-process suite registry: the crate-provided [`SuiteLoader`].
///
/// Suite types register a constructor and their class-level tags once, at
/// startup; lookups are by exact class name.
#[derive(Default)]
pub struct SuiteRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl SuiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a suite class with no declared tags.
    pub fn register<F>(&mut self, class_name: impl Into<String>, construct: F)
    where
        F: Fn() -> Result<SuiteRef, BridgeError> + 'static,
    {
        self.register_with_tags(class_name, Vec::new(), construct);
    }

    /// Registers a suite class together with its class-level tags.
    pub fn register_with_tags<F>(
        &mut self,
        class_name: impl Into<String>,
        tags: impl IntoIterator<Item = Tag>,
        construct: F,
    ) where
        F: Fn() -> Result<SuiteRef, BridgeError> + 'static,
    {
        self.entries.insert(
            class_name.into(),
            RegistryEntry {
                factory: FnFactory {
                    construct: Box::new(construct),
                },
                declared_tags: tags.into_iter().collect(),
            },
        );
    }

    /// Names of all registered suite classes.
    pub fn class_names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

impl SuiteLoader for SuiteRegistry {
    fn load_class(&self, class_name: &str) -> Result<&dyn SuiteFactory, BridgeError> {
        self.entries
            .get(class_name)
            .map(|entry| &entry.factory as &dyn SuiteFactory)
            .ok_or_else(|| BridgeError::Load {
                class_name: class_name.to_string(),
                message: "class is not registered".to_string(),
            })
    }

    fn declared_tags(&self, class_name: &str) -> HashSet<Tag> {
        self.entries
            .get(class_name)
            .map(|entry| entry.declared_tags.clone())
            .unwrap_or_default()
    }
}
