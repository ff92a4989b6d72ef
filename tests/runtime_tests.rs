//! Integration tests for the host language evaluator

mod common;
use common::{run, run_display, string};
use pretty_assertions::assert_eq;
use quickmatch::{Error, ErrorKind, Runtime, RuntimeConfig, Value};

mod core_language {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arithmetic_and_precedence() {
        assert_eq!(run("1 + 2 * 3 - 4 / 2").unwrap(), Value::Number(5.0));
        assert_eq!(run("(1 + 2) * 3 % 4").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(run("'a' + 1 + 2").unwrap(), string("a12"));
        assert_eq!(run("1 + 2 + 'a'").unwrap(), string("3a"));
    }

    #[test]
    fn test_closures_capture_environment() {
        let result = run(
            "function counter() {
                 let n = 0;
                 return () => { n += 1; return n; };
             }
             const next = counter();
             next();
             next()",
        )
        .unwrap();
        assert_eq!(result, Value::Number(2.0));
    }

    #[test]
    fn test_while_with_break_and_continue() {
        let result = run(
            "let i = 0;
             let sum = 0;
             while (true) {
                 i += 1;
                 if (i > 10) break;
                 if (i % 2 === 0) continue;
                 sum += i;
             }
             sum",
        )
        .unwrap();
        assert_eq!(result, Value::Number(25.0));
    }

    #[test]
    fn test_function_hoisting() {
        assert_eq!(run("later(); function later() { return 7; }").unwrap(), Value::Number(7.0));
    }

    #[test]
    fn test_rest_parameters_and_spread() {
        let result = run(
            "function collect(first, ...others) { return others; }
             collect(...[1, 2, 3])",
        )
        .unwrap();
        assert_eq!(result.to_display_string(), "[2, 3]");
    }

    #[test]
    fn test_object_spread_and_methods() {
        let result = run(
            "const base = {a: 1, b: 2};
             const merged = {...base, b: 3, sum() { return this.a + this.b; }};
             merged.sum()",
        )
        .unwrap();
        assert_eq!(result, Value::Number(4.0));
    }

    #[test]
    fn test_typeof_undeclared() {
        assert_eq!(run("typeof missing").unwrap(), string("undefined"));
        assert_eq!(run("typeof null").unwrap(), string("object"));
        assert_eq!(run("typeof (() => 1)").unwrap(), string("function"));
    }

    #[test]
    fn test_logical_operators() {
        assert_eq!(run("null ?? 'fallback'").unwrap(), string("fallback"));
        assert_eq!(run("0 || 'x'").unwrap(), string("x"));
        assert_eq!(run("0 && missing()").unwrap(), Value::Number(0.0));
    }
}

mod builtins {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_array_methods() {
        assert_eq!(
            run_display("[1, 2, 3, 4].filter((n) => n % 2 === 0).map((n) => n * 10)"),
            "[20, 40]"
        );
        assert_eq!(
            run("[1, 2, 3].reduce((acc, n) => acc + n, 0)").unwrap(),
            Value::Number(6.0)
        );
        assert_eq!(run("[1, 2].concat([3], 4).join('-')").unwrap(), string("1-2-3-4"));
    }

    #[test]
    fn test_string_methods() {
        assert_eq!(run("'Hello'.toUpperCase()").unwrap(), string("HELLO"));
        assert_eq!(run("'a,b,c'.split(',').length").unwrap(), Value::Number(3.0));
        assert_eq!(run("'  pad  '.trim().slice(1, -1)").unwrap(), string("a"));
    }

    #[test]
    fn test_object_statics() {
        assert_eq!(
            run("Object.keys({x: 1, y: 2}).join(',')").unwrap(),
            string("x,y")
        );
        assert_eq!(
            run_display("Object.assign({a: 1}, {b: 2})"),
            "{ a: 1, b: 2 }"
        );
        assert_eq!(run("Array.isArray([])").unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_instanceof() {
        let result = run(
            "function Animal(name) { this.name = name; }
             const pet = new Animal('rex');
             [pet instanceof Animal, pet instanceof Object, [] instanceof Array, pet.name]",
        )
        .unwrap();
        assert_eq!(result.to_display_string(), "[true, true, true, 'rex']");
    }
}

mod errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_catch_runtime_error_as_value() {
        let result = run(
            "let message = '';
             try { null.field; } catch (e) { message = e.name; }
             message",
        )
        .unwrap();
        assert_eq!(result, string("TypeError"));
    }

    #[test]
    fn test_thrown_values_are_preserved() {
        let result = run(
            "let caught;
             try { throw {code: 42}; } catch (e) { caught = e.code; }
             caught",
        )
        .unwrap();
        assert_eq!(result, Value::Number(42.0));
    }

    #[test]
    fn test_finally_runs_after_catch() {
        let result = run(
            "let log = [];
             try { throw 'x'; } catch (e) { log.push('catch'); } finally { log.push('finally'); }
             log.join(',')",
        )
        .unwrap();
        assert_eq!(result, string("catch,finally"));
    }

    #[test]
    fn test_uncaught_throw() {
        match run("throw 'boom'") {
            Err(Error::Thrown(value)) => assert_eq!(value, string("boom")),
            other => panic!("Expected thrown value, got {:?}", other.map(|v| v.to_display_string())),
        }
    }

    #[test]
    fn test_redeclaration() {
        match run("let a = 1; let a = 2;") {
            Err(Error::RuntimeError { kind, message }) => {
                assert_eq!(kind, ErrorKind::SyntaxError);
                assert_eq!(message, "Identifier 'a' has already been declared");
            }
            other => panic!("Expected SyntaxError, got {:?}", other.map(|v| v.to_display_string())),
        }
        assert_eq!(run("var a = 1; var a = 2; a").unwrap(), Value::Number(2.0));
    }

    #[test]
    fn test_not_a_function() {
        let err = run("const o = {}; o.missing()").unwrap_err();
        assert_eq!(err.to_string(), "TypeError: o.missing is not a function");
    }

    #[test]
    fn test_bigint_mixing() {
        let err = run("1n + 1").unwrap_err();
        assert!(err.to_string().starts_with("TypeError: Cannot mix BigInt"));
        assert_eq!(run_display("2n * 21n"), "42n");
    }

    #[test]
    fn test_syntax_error_location() {
        match run("let x = ;") {
            Err(Error::ParseError { location, .. }) => {
                assert_eq!((location.line, location.column), (1, 9));
            }
            other => panic!("Expected parse error, got {:?}", other.map(|v| v.to_display_string())),
        }
    }

    #[test]
    fn test_deep_recursion_is_range_error() {
        let mut runtime = Runtime::with_config(RuntimeConfig::default().with_max_call_depth(32));
        match runtime.eval("function down(n) { return down(n + 1); } down(0)") {
            Err(Error::RuntimeError { kind, .. }) => assert_eq!(kind, ErrorKind::RangeError),
            other => panic!("Expected RangeError, got {:?}", other.map(|v| v.to_display_string())),
        }
    }
}
