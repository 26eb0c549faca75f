//! Named custom assertions.

use crate::harness::Harness;
use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;

/// Signature of a custom assertion. It receives the harness it runs on, so it
/// can call the built-in assertions, along with the caller's arguments.
pub type CustomAssertion<W> = dyn Fn(&mut Harness<W>, &[Value]);

/// Mapping from assertion name to callback.
pub(crate) struct AssertionRegistry<W> {
    entries: HashMap<String, Rc<CustomAssertion<W>>>,
}

impl<W> Default for AssertionRegistry<W> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<W> AssertionRegistry<W> {
    /// Installs `assertion` under `name`, returning whether an earlier entry was
    /// replaced.
    pub fn insert(&mut self, name: String, assertion: Rc<CustomAssertion<W>>) -> bool {
        self.entries.insert(name, assertion).is_some()
    }

    /// Looks up an assertion. The returned handle is independent of the
    /// registry, so the harness can be borrowed mutably while it runs.
    pub fn get(&self, name: &str) -> Option<Rc<CustomAssertion<W>>> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
