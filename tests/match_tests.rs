//! Integration tests for match expressions

mod common;
use common::{run, run_display, string};
use pretty_assertions::assert_eq;
use quickmatch::{Error, Value};

mod scenarios {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal_clause() {
        let result = run(r#"match (5) { 5: "five", else: "other" }"#).unwrap();
        assert_eq!(result, string("five"));
    }

    #[test]
    fn test_array_rest() {
        assert_eq!(run_display("match ([1, 2, 3]) { [a, ...rest]: rest }"), "[2, 3]");
    }

    #[test]
    fn test_object_property() {
        let result = run("match ({a: 1, b: 2}) { {a}: a }").unwrap();
        assert_eq!(result, Value::Number(1.0));
    }

    #[test]
    fn test_object_rest() {
        assert_eq!(
            run_display("match ({a: 1, b: 2, c: 3}) { {a, ...rest}: rest }"),
            "{ b: 2, c: 3 }"
        );
    }

    #[test]
    fn test_length_mismatch_falls_through() {
        let result = run(r#"match ([1, 2]) { [a, b, c]: "three", else: "no" }"#).unwrap();
        assert_eq!(result, string("no"));
    }

    #[test]
    fn test_no_clause_matches() {
        let err = run(r#"match (7) { 1: "a", 2: "b" }"#).unwrap_err();
        assert!(err.is_match_failure());
        match err {
            Error::MatchFailure { message, location } => {
                assert_eq!(message, "No patterns are matched");
                assert_eq!((location.line, location.column), (1, 1));
            }
            other => panic!("Expected match failure, got {}", other),
        }
    }
}

mod literals {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_implicit_coercion() {
        let result = run(r#"match ("1") { 1: "number", "1": "string" }"#).unwrap();
        assert_eq!(result, string("string"));

        let result = run("match (0) { false: 'bool', null: 'null', 0: 'zero' }").unwrap();
        assert_eq!(result, string("zero"));
    }

    #[test]
    fn test_negative_number() {
        let result = run("match (-1) { 1: 'positive', -1: 'negative' }").unwrap();
        assert_eq!(result, string("negative"));
    }

    #[test]
    fn test_bigint_is_not_a_number() {
        let result = run("match (10n) { 10: 'number', 10n: 'bigint' }").unwrap();
        assert_eq!(result, string("bigint"));
    }

    #[test]
    fn test_zero_matches_negative_zero() {
        let result = run("match (-0) { 0: 'zero', else: 'other' }").unwrap();
        assert_eq!(result, string("zero"));
    }

    #[test]
    fn test_string_keys_and_values() {
        let result = run(r#"match ({"kind": "circle", r: 2}) { {kind: "square"}: 0, {kind: "circle", r}: r * r }"#)
            .unwrap();
        assert_eq!(result, Value::Number(4.0));
    }
}

mod arrays {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_exact_length_without_rest() {
        let result = run("match ([1, 2, 3]) { [a, b]: 'two', [a, b, c]: 'three' }").unwrap();
        assert_eq!(result, string("three"));
    }

    #[test]
    fn test_rest_may_be_empty() {
        let result = run("match ([1]) { [a, ...rest]: rest.length }").unwrap();
        assert_eq!(result, Value::Number(0.0));
    }

    #[test]
    fn test_rest_requires_leading_elements() {
        let result = run("match ([]) { [a, ...rest]: 'some', [...rest]: 'any' }").unwrap();
        assert_eq!(result, string("any"));
    }

    #[test]
    fn test_anonymous_rest() {
        let result = run("match ([1, 2, 3]) { [first, ...]: first }").unwrap();
        assert_eq!(result, Value::Number(1.0));
    }

    #[test]
    fn test_non_array_rejected() {
        let result = run("match ({length: 0}) { []: 'array', else: 'object' }").unwrap();
        assert_eq!(result, string("object"));
    }

    #[test]
    fn test_nested_arrays() {
        let result = run("match ([1, [2, [3]]]) { [a, [b, [c]]]: a + b + c }").unwrap();
        assert_eq!(result, Value::Number(6.0));
    }

    #[test]
    fn test_capture_rejects_undefined() {
        let result = run("match ([undefined]) { [x]: 'bound', else: 'skipped' }").unwrap();
        assert_eq!(result, string("skipped"));

        let result = run("match ([null]) { [x]: x }").unwrap();
        assert_eq!(result, Value::Null);
    }
}

mod objects {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_property_fails() {
        let result = run("match ({a: 1}) { {a, b}: 'both', {a}: 'one' }").unwrap();
        assert_eq!(result, string("one"));
    }

    #[test]
    fn test_own_property_with_undefined_value() {
        let result = run("match ({a: undefined}) { {a}: 'captured', {}: 'empty' }").unwrap();
        assert_eq!(result, string("empty"));
    }

    #[test]
    fn test_empty_pattern_accepts_any_object() {
        assert_eq!(run("match ([]) { {}: 'object' }").unwrap(), string("object"));
        assert_eq!(run("match (null) { {}: 'object' }").unwrap(), string("object"));
        assert_eq!(run("match ('s') { {}: 'object', else: 'string' }").unwrap(), string("string"));
    }

    #[test]
    fn test_rest_copies_remaining_keys_in_order() {
        let result = run(
            "match ({z: 1, a: 2, m: 3}) { {a, ...rest}: Object.keys(rest).join(',') }",
        )
        .unwrap();
        assert_eq!(result, string("z,m"));
    }

    #[test]
    fn test_rest_without_properties_is_a_copy() {
        let result = run(
            "let source = {a: 1};
             let copy = match (source) { {...all}: all };
             copy.a = 2;
             source.a",
        )
        .unwrap();
        assert_eq!(result, Value::Number(1.0));
    }

    #[test]
    fn test_computed_key() {
        let result = run(
            "const key = 'dynamic';
             match ({dynamic: 'yes'}) { {[key]: v}: v }",
        )
        .unwrap();
        assert_eq!(result, string("yes"));
    }

    #[test]
    fn test_rest_excludes_computed_key() {
        let result = run(
            "const key = 'b';
             match ({a: 1, b: 2}) { {[key]: v, ...rest}: Object.keys(rest).join(',') }",
        )
        .unwrap();
        assert_eq!(result, string("a"));
    }

    #[test]
    fn test_rest_lists_integer_keys_first() {
        let result = run(
            "match ({b: 1, 2: 3, a: 4, 1: 5}) { {a, ...rest}: Object.keys(rest).join(',') }",
        )
        .unwrap();
        assert_eq!(result, string("1,2,b"));
    }

    #[test]
    fn test_computed_key_ignores_capture_of_the_same_name() {
        let result = run(
            "const k = 'a';
             match ({b: 'zzz', a: 1}) { {b: k, [k]: v}: v }",
        )
        .unwrap();
        assert_eq!(result, Value::Number(1.0));
    }

    #[test]
    fn test_rest_filter_uses_the_tested_key() {
        let result = run(
            "const k = 'a';
             match ({a: 1, b: 'c', c: 3}) { {[k]: x, b: k, ...rest}: Object.keys(rest).join(',') }",
        )
        .unwrap();
        assert_eq!(result, string("c"));
    }

    #[test]
    fn test_computed_key_evaluated_once() {
        let result = run(
            "let calls = 0;
             function key() { calls += 1; return 'a'; }
             const found = match ({a: {b: 2}, z: 0}) { {[key()]: {b}, ...rest}: b };
             [found, calls]",
        )
        .unwrap();
        assert_eq!(result.to_display_string(), "[2, 1]");
    }

    #[test]
    fn test_computed_key_reevaluated_per_clause() {
        let result = run(
            "let calls = 0;
             function key() { calls += 1; return 'a'; }
             (match ({a: 1}) { {[key()]: 2}: 'two', {[key()]: 1}: 'one' }) + calls",
        )
        .unwrap();
        assert_eq!(result, string("one2"));
    }

    #[test]
    fn test_property_test_on_null_does_not_throw() {
        assert_eq!(run("match (null) { {a}: 1, else: 2 }").unwrap(), Value::Number(2.0));
        assert_eq!(run("match ([null]) { [{a}]: 1, [n]: n }").unwrap(), Value::Null);
    }

    #[test]
    fn test_nested_objects_and_arrays() {
        let result = run(
            "const event = {type: 'move', to: {x: 3, y: [4, 5]}};
             match (event) {
                 {type: 'click'}: 0,
                 {type: 'move', to: {x, y: [y1, y2]}}: x + y1 + y2,
             }",
        )
        .unwrap();
        assert_eq!(result, Value::Number(12.0));
    }
}

mod clauses {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_matching_clause_wins() {
        let result = run("match ([1]) { [a]: 'first', [b]: 'second' }").unwrap();
        assert_eq!(result, string("first"));
    }

    #[test]
    fn test_guards_run_after_bindings() {
        let code = |n: i32| {
            format!(
                "match ([{}]) {{ [x] if x > 10: 'big', [x] if x > 3: 'medium', else: 'small' }}",
                n
            )
        };
        assert_eq!(run(&code(50)).unwrap(), string("big"));
        assert_eq!(run(&code(5)).unwrap(), string("medium"));
        assert_eq!(run(&code(1)).unwrap(), string("small"));
    }

    #[test]
    fn test_guarded_else_falls_through() {
        let result = run("match (1) { else if false: 'never', else: 'fallback' }").unwrap();
        assert_eq!(result, string("fallback"));
    }

    #[test]
    fn test_clauses_after_else_are_unreachable() {
        let result = run("match (1) { else: 'else', 1: 'one' }").unwrap();
        assert_eq!(result, string("else"));
    }

    #[test]
    fn test_block_body_returns_from_clause_only() {
        let result = run(
            "function f(x) {
                 let r = match (x) { [a]: { let doubled = a * 2; return doubled; } };
                 return r + 1;
             }
             f([4])",
        )
        .unwrap();
        assert_eq!(result, Value::Number(9.0));
    }

    #[test]
    fn test_block_body_without_return_is_undefined() {
        let result = run("match (1) { 1: { let unused = 2; } }").unwrap();
        assert_eq!(result, Value::Undefined);
    }

    #[test]
    fn test_clause_bindings_do_not_leak() {
        let err = run("match ([1]) { [leaked]: leaked }; leaked").unwrap_err();
        assert_eq!(err.to_string(), "ReferenceError: leaked is not defined");
    }

    #[test]
    fn test_bindings_are_const() {
        let err = run("match ([1]) { [a]: { a = 2; return a; } }").unwrap_err();
        assert_eq!(err.to_string(), "TypeError: Assignment to constant variable");
    }

    #[test]
    fn test_nested_match_in_body() {
        let result = run(
            "match ([1, [2, 3]]) {
                 [a, inner]: match (inner) { [b, c]: a + b + c },
             }",
        )
        .unwrap();
        assert_eq!(result, Value::Number(6.0));
    }

    #[test]
    fn test_match_in_guard() {
        let result = run(
            "match ([2]) {
                 [n] if match (n) { 1: false, else: true }: 'not one',
                 else: 'one',
             }",
        )
        .unwrap();
        assert_eq!(result, string("not one"));
    }
}

mod evaluation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scrutinee_evaluated_once() {
        let result = run(
            "let calls = 0;
             function next() { calls += 1; return [1, 2]; }
             let shape = match (next()) { [x]: 'one', {length: 3}: 'three', [x, y]: 'two', else: 'many' };
             [calls, shape]",
        )
        .unwrap();
        assert_eq!(result.to_display_string(), "[1, 'two']");
    }

    #[test]
    fn test_conjunctions_short_circuit() {
        let result = run(
            "let calls = 0;
             function key() { calls += 1; return 'b'; }
             match ({a: 1, b: 2}) { {a: 9, [key()]: v}: 'first', {a}: 'second' };
             calls",
        )
        .unwrap();
        assert_eq!(result, Value::Number(0.0));

        let result = run(
            "let calls = 0;
             function key() { calls += 1; return 'b'; }
             match ({a: 1, b: 2}) { {a: 1, [key()]: 3}: 'first', {a}: 'second' };
             calls",
        )
        .unwrap();
        assert_eq!(result, Value::Number(1.0));
    }

    #[test]
    fn test_later_clauses_do_not_run() {
        let result = run(
            "let hits = [];
             function mark(name) { hits.push(name); return true; }
             match ([1]) { [a] if mark('first'): 1, [b] if mark('second'): 2 };
             hits.join(',')",
        )
        .unwrap();
        assert_eq!(result, string("first"));
    }

    #[test]
    fn test_capture_may_shadow_scrutinee() {
        let result = run("let v = [1, [2]]; match (v) { [v, [w]]: v + w }").unwrap();
        assert_eq!(result, Value::Number(3.0));
    }

    #[test]
    fn test_generated_names_avoid_user_names() {
        let result = run(
            "let _match_expr = 'user';
             match ([1]) { [a]: _match_expr }",
        )
        .unwrap();
        assert_eq!(result, string("user"));
    }

    #[test]
    fn test_match_failure_is_catchable() {
        let result = run(
            "let caught = 'none';
             try {
                 match (7) { 1: 'a' }
             } catch (e) {
                 caught = e.name + ': ' + e.message;
             }
             caught",
        )
        .unwrap();
        assert_eq!(result, string("MatchError: No patterns are matched"));
    }

    #[test]
    fn test_match_failure_brand() {
        let result = run(
            "function attempt(v) {
                 try {
                     return match (v) { 1: 'one' };
                 } catch (e) {
                     return match (e) { MatchError: 'unmatched', else: 'other' };
                 }
             }
             [attempt(1), attempt(2)]",
        )
        .unwrap();
        assert_eq!(result.to_display_string(), "['one', 'unmatched']");
    }
}

mod type_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_array_root_capture() {
        let result = run("match ([1]) { Array: 'array', else: 'other' }").unwrap();
        assert_eq!(result, string("array"));
    }

    #[test]
    fn test_constructor_root_capture() {
        let result = run(
            "function Point(x, y) { this.x = x; this.y = y; }
             function Size(w, h) { this.w = w; this.h = h; }
             const describe = (v) => match (v) { Size: 'size', Point: 'point', else: 'other' };
             [describe(new Point(1, 2)), describe(new Size(3, 4)), describe({x: 1})]",
        )
        .unwrap();
        assert_eq!(result.to_display_string(), "['point', 'size', 'other']");
    }

    #[test]
    fn test_builtin_brands() {
        let result = run(
            "const kind = (v) => match (v) { TypeError: 'type error', Error: 'error', Function: 'function', Object: 'object', else: 'primitive' };
             [kind(TypeError('x')), kind(Error('y')), kind(kind), kind({}), kind(1)]",
        )
        .unwrap();
        assert_eq!(
            result.to_display_string(),
            "['type error', 'error', 'function', 'object', 'primitive']"
        );
    }

    #[test]
    fn test_custom_matcher() {
        let result = run(
            "const Even = { [Symbol.match]: (n) => n % 2 === 0 ? n : null };
             const parity = (n) => match (n) { Even: 'even', else: 'odd' };
             [parity(2), parity(3)]",
        )
        .unwrap();
        assert_eq!(result.to_display_string(), "['even', 'odd']");
    }

    #[test]
    fn test_matcher_receives_this() {
        let result = run(
            "const Range = { lo: 1, hi: 5, [Symbol.match]: function (n) { return n >= this.lo && n <= this.hi ? n : null; } };
             const check = (n) => match (n) { Range: 'in range', else: 'out' };
             [check(3), check(7)]",
        )
        .unwrap();
        assert_eq!(result.to_display_string(), "['in range', 'out']");
    }

    #[test]
    fn test_nested_capture_binds_instead_of_testing() {
        let result = run(
            "function Point() {}
             match ([5]) { [Point]: Point }",
        )
        .unwrap();
        assert_eq!(result, Value::Number(5.0));
    }

    #[test]
    fn test_undefined_matcher_is_reference_error() {
        let err = run("match (1) { Missing: 'x' }").unwrap_err();
        assert_eq!(err.to_string(), "ReferenceError: Missing is not defined");
    }
}
