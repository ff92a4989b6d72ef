//! Pattern compiler
//!
//! Turns a pattern tree and the [`Place`] it is tested at into a boolean
//! [`Test`] plus the [`Binding`]s that run once the test has passed. The
//! walk is functional: each call returns its own pair and the caller
//! concatenates, keeping conjuncts and bindings in left-to-right source
//! order.
//!
//! Bindings are never interleaved with tests. A binding for a later sibling
//! may exist even though an earlier sibling's test fails at runtime; that is
//! sound because the clause scope only executes bindings after the whole
//! test held.
//!
//! A computed key `[expr]` is evaluated exactly once per branch attempt: a
//! [`Test::KeyTemp`] conjunct stores it in a fresh temporary just before the
//! property's `HasOwn` test, and every later read, binding, and rest filter
//! refers to that temporary.

use super::{LowerOptions, NameGenerator};
use crate::ast::{
    ArrayMatchPattern, Identifier, MatchPattern, ObjectMatchPattern, PropertyKey,
    PropertyMatchPattern,
};
use crate::error::{Error, Result};
use crate::ir::{Binding, Place, PropertyName, Test};
use tracing::trace;

/// The name that makes a root capture an array test
const ARRAY_TYPE_NAME: &str = "Array";

/// Output of compiling one pattern node
#[derive(Debug, Clone, Default)]
pub struct CompiledPattern {
    /// `None` when the pattern matches unconditionally
    pub test: Option<Test>,
    /// Declarations to run, in order, after the test passed
    pub bindings: Vec<Binding>,
    /// The key of a compiled object property, for the enclosing rest filter
    key: Option<PropertyName>,
}

impl CompiledPattern {
    fn test(test: Test) -> Self {
        Self {
            test: Some(test),
            ..Self::default()
        }
    }

    /// Conjoin `other` after `self`, appending its bindings
    fn and(mut self, other: CompiledPattern) -> Self {
        self.test = Test::and(self.test, other.test);
        self.bindings.extend(other.bindings);
        self
    }

    fn and_test(mut self, test: Test) -> Self {
        self.test = Test::and(self.test, Some(test));
        self
    }

    fn with_key(mut self, key: PropertyName) -> Self {
        self.key = Some(key);
        self
    }
}

/// Compiles pattern trees for one clause at a time
pub struct PatternCompiler<'a> {
    names: &'a mut NameGenerator,
    options: &'a LowerOptions,
}

impl<'a> PatternCompiler<'a> {
    pub fn new(names: &'a mut NameGenerator, options: &'a LowerOptions) -> Self {
        Self { names, options }
    }

    /// Compile `pattern` against the value at `place`. `is_root` is true for a
    /// clause's outermost pattern.
    pub fn compile_test(
        &mut self,
        place: &Place,
        pattern: &MatchPattern,
        is_root: bool,
    ) -> Result<CompiledPattern> {
        match pattern {
            MatchPattern::Literal { value, .. } => {
                trace!(%place, literal = %value, "literal pattern");
                Ok(CompiledPattern::test(Test::StrictEq {
                    place: place.clone(),
                    literal: value.clone(),
                }))
            }
            MatchPattern::Array(arr) => self.compile_array(place, arr),
            MatchPattern::Object(obj) => self.compile_object(place, obj),
            MatchPattern::Capture(id) if is_root => Ok(self.compile_root_capture(place, id)),
            MatchPattern::Capture(id) => {
                trace!(%place, name = %id.name, "capture");
                Ok(CompiledPattern {
                    test: Some(Test::NotUndefined(place.clone())),
                    bindings: vec![Binding::Const {
                        name: id.clone(),
                        init: place.clone(),
                    }],
                    key: None,
                })
            }
            MatchPattern::Wildcard(_) if is_root => Ok(CompiledPattern::default()),
            MatchPattern::Wildcard(span) => Err(Error::compile_invariant(format!(
                "'else' pattern nested at {} under {}",
                span.start, place
            ))),
        }
    }

    fn compile_array(&mut self, place: &Place, arr: &ArrayMatchPattern) -> Result<CompiledPattern> {
        let count = arr.elements.len();
        trace!(%place, count, rest = arr.has_rest(), "array pattern");

        let mut compiled = CompiledPattern::test(Test::IsArray(place.clone()));

        match &arr.rest {
            None => {
                compiled = compiled.and_test(Test::LengthEq {
                    place: place.clone(),
                    length: count,
                });
            }
            Some(rest) => {
                if let Some(name) = &rest.binding {
                    compiled.bindings.push(Binding::Slice {
                        name: name.clone(),
                        source: place.clone(),
                        start: count,
                    });
                }
            }
        }

        for (index, element) in arr.elements.iter().enumerate() {
            let sub = self.compile_test(&place.index(index), element, false)?;
            compiled = compiled.and(sub);
        }

        Ok(compiled)
    }

    fn compile_object(&mut self, place: &Place, obj: &ObjectMatchPattern) -> Result<CompiledPattern> {
        trace!(%place, properties = obj.properties.len(), rest = obj.rest.is_some(), "object pattern");

        let mut compiled = CompiledPattern::test(Test::TypeOf {
            place: place.clone(),
            type_name: "object".to_string(),
        });

        let mut keys = Vec::with_capacity(obj.properties.len());
        for property in &obj.properties {
            let sub = self.compile_property(place, property)?;
            keys.extend(sub.key.clone());
            compiled = compiled.and(sub);
        }

        if let Some(rest) = &obj.rest {
            let binding = self.compile_object_rest(place, keys, rest)?;
            compiled.bindings.push(binding);
        }

        Ok(compiled)
    }

    fn compile_property(
        &mut self,
        place: &Place,
        property: &PropertyMatchPattern,
    ) -> Result<CompiledPattern> {
        let (key, compiled) = match &property.key {
            PropertyKey::Computed(expr) => {
                let temp = self.names.fresh(&self.options.computed_key_hint);
                trace!(%place, temp = %temp.name, "computed key");
                let compiled = CompiledPattern::test(Test::KeyTemp {
                    name: temp.clone(),
                    init: expr.clone(),
                });
                (PropertyName::Computed(temp), compiled)
            }
            static_key => (
                PropertyName::Static(static_key.static_name().unwrap_or_default()),
                CompiledPattern::default(),
            ),
        };
        let compiled = compiled.and_test(Test::HasOwn {
            place: place.clone(),
            key: key.clone(),
        });
        let value = self.compile_test(&place.member(key.clone()), &property.value, false)?;
        Ok(compiled.and(value).with_key(key))
    }

    fn compile_object_rest(
        &mut self,
        place: &Place,
        excluded: Vec<PropertyName>,
        rest: &Identifier,
    ) -> Result<Binding> {
        if excluded.is_empty() {
            return Ok(Binding::CopyAll {
                name: rest.clone(),
                source: place.clone(),
            });
        }

        let key = self.names.fresh(&self.options.key_hint);
        Binding::copy_filtered(rest.clone(), place.clone(), key, excluded)
    }

    /// A capture at the root is a shape test, not a binding
    fn compile_root_capture(&mut self, place: &Place, id: &Identifier) -> CompiledPattern {
        trace!(%place, matcher = %id.name, "root type test");
        if id.name == ARRAY_TYPE_NAME {
            CompiledPattern::test(Test::IsArray(place.clone()))
        } else {
            CompiledPattern::test(Test::Protocol {
                place: place.clone(),
                matcher: id.clone(),
            })
        }
    }
}
