//! The `registry` module provides the table of named mutation operators.

use crate::error::{MutatrixError, Result};
use crate::mutator::Mutator;
use crate::mutators;
use std::collections::BTreeMap;

/// Factory function producing one operator instance.
pub type MutatorFactory = fn() -> Box<dyn Mutator>;

/// The table of available mutation operators, keyed by name.
///
/// Names follow the `category/operator` convention, e.g. `branch/case` or
/// `arithmetic/bitwise`.  The table iterates in lexicographic name order, which fixes
/// the order in which the walker applies operators and keeps `list` output stable
/// across runs.
pub struct MutatorRegistry {
    mutators: BTreeMap<String, MutatorFactory>,
}

impl MutatorRegistry {
    /// Create an empty registry.
    pub fn new() -> MutatorRegistry {
        MutatorRegistry {
            mutators: BTreeMap::new(),
        }
    }

    /// Create a registry holding every operator shipped with the library.
    pub fn builtin() -> MutatorRegistry {
        let mut registry = MutatorRegistry::new();

        // The shipped operator set registers under fixed names; a collision here is
        // a programming error, not a user error.
        mutators::register_builtin(&mut registry)
            .expect("builtin mutator names collide");

        registry
    }

    /// Register an operator under `name`.
    ///
    /// Registering the same name twice is a fatal configuration error.
    ///
    /// # Arguments
    ///
    /// * `name` - The `category/operator` name to register under.
    /// * `factory` - Function producing the operator.
    pub fn register(&mut self, name: &str, factory: MutatorFactory) -> Result<()> {
        if self.mutators.contains_key(name) {
            return Err(MutatrixError::DuplicateMutator(name.to_string()));
        }

        self.mutators.insert(name.to_string(), factory);

        Ok(())
    }

    /// Return the registered names in lexicographic order.
    pub fn list(&self) -> Vec<String> {
        self.mutators.keys().cloned().collect()
    }

    /// Instantiate the operator registered under `name`.
    pub fn new_mutator(&self, name: &str) -> Result<Box<dyn Mutator>> {
        match self.mutators.get(name) {
            Some(factory) => Ok(factory()),
            None => Err(MutatrixError::UnknownMutator(name.to_string())),
        }
    }

    /// Instantiate every registered operator whose name survives the `disabled`
    /// patterns, in registry order.
    ///
    /// A pattern with a trailing `*` disables every operator sharing the prefix;
    /// any other pattern disables the exact name.
    pub fn enabled_mutators(&self, disabled: &[String]) -> Vec<(String, Box<dyn Mutator>)> {
        self.mutators
            .iter()
            .filter(|(name, _)| !disabled.iter().any(|d| pattern_matches(d, name)))
            .map(|(name, factory)| (name.clone(), factory()))
            .collect()
    }
}

impl Default for MutatorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Return true if `pattern` selects the operator `name`.  A trailing `*` makes the
/// pattern a prefix match.
pub fn pattern_matches(pattern: &str, name: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => name == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutator::{NodeMut, NodeRef};
    use crate::types::TypeIndex;

    struct NullMutator;

    impl Mutator for NullMutator {
        fn matches(&self, _node: NodeRef<'_>) -> bool {
            false
        }

        fn mutation_count(&self, _types: &TypeIndex, _node: NodeRef<'_>) -> usize {
            0
        }

        fn mutate(&self, _types: &TypeIndex, _node: NodeMut<'_>, _variant: usize) -> Result<()> {
            Ok(())
        }
    }

    fn null_mutator() -> Box<dyn Mutator> {
        Box::new(NullMutator)
    }

    #[test]
    fn test_registry_list_is_sorted() {
        let mut registry = MutatorRegistry::new();
        registry.register("zeta/one", null_mutator).unwrap();
        registry.register("alpha/two", null_mutator).unwrap();
        registry.register("alpha/one", null_mutator).unwrap();

        assert_eq!(registry.list(), vec!["alpha/one", "alpha/two", "zeta/one"]);
    }

    #[test]
    fn test_registry_duplicate_name_is_error() {
        let mut registry = MutatorRegistry::new();
        registry.register("branch/if", null_mutator).unwrap();

        match registry.register("branch/if", null_mutator) {
            Err(MutatrixError::DuplicateMutator(name)) => assert_eq!(name, "branch/if"),
            other => panic!("expected duplicate error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_registry_unknown_name_is_error() {
        let registry = MutatorRegistry::new();
        assert!(matches!(
            registry.new_mutator("nope/nothing"),
            Err(MutatrixError::UnknownMutator(_))
        ));
    }

    #[test]
    fn test_registry_builtin_names() {
        let registry = MutatorRegistry::builtin();
        let names = registry.list();

        // Every name in the shipped set, and nothing twice.
        for expected in [
            "arithmetic/assign_invert",
            "arithmetic/assignment",
            "arithmetic/base",
            "arithmetic/bitwise",
            "arithmetic/invert",
            "branch/case",
            "branch/else",
            "branch/if",
            "conditional/negated",
            "expression/remove",
            "loop/break",
            "loop/range_break",
            "numbers/decrementer",
            "numbers/incrementer",
            "statement/remove",
        ] {
            assert!(names.contains(&expected.to_string()), "missing {}", expected);
        }
        assert_eq!(names.len(), 15);

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_registry_disable_patterns() {
        let registry = MutatorRegistry::builtin();

        let disabled = vec!["arithmetic/*".to_string(), "branch/if".to_string()];
        let enabled = registry.enabled_mutators(&disabled);
        let names: Vec<&str> = enabled.iter().map(|(n, _)| n.as_str()).collect();

        assert!(!names.iter().any(|n| n.starts_with("arithmetic/")));
        assert!(!names.contains(&"branch/if"));
        assert!(names.contains(&"branch/else"));
        assert!(names.contains(&"conditional/negated"));
    }

    #[test]
    fn test_registry_pattern_matches() {
        assert!(pattern_matches("branch/if", "branch/if"));
        assert!(!pattern_matches("branch/if", "branch/else"));
        assert!(pattern_matches("branch/*", "branch/else"));
        assert!(pattern_matches("*", "anything/at_all"));
        assert!(!pattern_matches("loop/*", "branch/else"));
    }
}
