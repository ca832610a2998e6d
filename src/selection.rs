//! Exact-name test selection.
//!
//! A [`SelectionFilter`] names exactly the tests a native run is allowed to
//! execute, scoped to one suite identifier. Each selected name carries the
//! reserved [`SELECTED_TAG`] marker, so frameworks whose only selection
//! mechanism is tag-based can honor the filter without any new semantics;
//! no other filtering criteria are ever applied.

use im::{HashMap, HashSet};

use crate::naming;
use crate::tree::Tag;

/// Marker tag attached to every selected test name.
pub const SELECTED_TAG: &str = "selected";

/// A run-time restriction of a native suite run to a specific set of tests.
#[derive(Debug, Clone)]
pub struct SelectionFilter {
    suite_id: String,
    tagged: HashMap<String, HashSet<Tag>>,
}

impl SelectionFilter {
    /// Builds a filter selecting exactly `test_names` within the suite
    /// identified by `suite_id`.
    pub fn for_tests(
        suite_id: impl Into<String>,
        test_names: impl IntoIterator<Item = String>,
    ) -> Self {
        let marker: HashSet<Tag> = HashSet::unit(Tag::new(SELECTED_TAG));
        let tagged = test_names
            .into_iter()
            .map(|name| (name, marker.clone()))
            .collect();
        Self {
            suite_id: suite_id.into(),
            tagged,
        }
    }

    pub fn suite_id(&self) -> &str {
        &self.suite_id
    }

    /// Whether `test_name` is selected, checking the raw form and its
    /// decoded counterpart.
    pub fn is_selected(&self, test_name: &str) -> bool {
        self.tagged.contains_key(test_name) || self.tagged.contains_key(&naming::decode(test_name))
    }

    /// Marker tags for a selected test name, if any.
    pub fn marker_tags(&self, test_name: &str) -> Option<&HashSet<Tag>> {
        self.tagged.get(test_name)
    }

    pub fn is_empty(&self) -> bool {
        self.tagged.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tagged.len()
    }
}
