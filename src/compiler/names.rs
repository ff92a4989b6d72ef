//! Hygienic name generation
//!
//! One [`NameGenerator`] serves one compilation unit. It is seeded with every
//! identifier that occurs in the unit, so a generated name can never shadow
//! or be shadowed by a user-visible one.

use crate::ast::visit::{self, Visitor};
use crate::ast::{Identifier, Program, Span};
use rustc_hash::{FxHashMap, FxHashSet};

/// Produces identifiers unique within one compilation unit
#[derive(Debug, Default)]
pub struct NameGenerator {
    /// Every name seen in the unit or handed out so far
    used: FxHashSet<String>,
    /// Next suffix to try per hint
    counters: FxHashMap<String, u32>,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator that avoids every identifier occurring in `program`
    pub fn seed_from_program(program: &Program) -> Self {
        let mut collector = NameCollector::default();
        visit::walk_program(&mut collector, program);
        Self {
            used: collector.names,
            counters: FxHashMap::default(),
        }
    }

    /// Mark a name as taken
    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Return a fresh identifier derived from `hint`: `_hint`, `_hint2`, `_hint3`, ...
    pub fn fresh(&mut self, hint: &str) -> Identifier {
        let base = format!("_{}", hint.trim_start_matches('_'));
        let counter = self.counters.entry(base.clone()).or_insert(1);

        loop {
            let candidate = if *counter <= 1 {
                base.clone()
            } else {
                format!("{}{}", base, counter)
            };
            *counter += 1;

            if self.used.insert(candidate.clone()) {
                return Identifier::new(candidate, Span::default());
            }
        }
    }
}

#[derive(Default)]
struct NameCollector {
    names: FxHashSet<String>,
}

impl Visitor for NameCollector {
    fn visit_name(&mut self, name: &str) {
        if !self.names.contains(name) {
            self.names.insert(name.to_string());
        }
    }
}
