//! Integration tests for match lowering and the IR it produces

use pretty_assertions::assert_eq;
use quickmatch::ast::ExprKind;
use quickmatch::compiler::{lower_match, lower_program_with, LowerOptions, NameGenerator};
use quickmatch::ir::{lowered_matches, Binding, Fallback, LoweredMatch, ScrutineeBinding};
use quickmatch::parser::{parse, parse_expression};
use quickmatch::{lower_program, Error};

fn lower(source: &str) -> Vec<LoweredMatch> {
    let program = lower_program(parse(source).unwrap()).unwrap();
    lowered_matches(&program)
}

fn binding_names(m: &LoweredMatch, branch: usize) -> Vec<String> {
    m.chain.branches[branch]
        .scope
        .bindings
        .iter()
        .map(|b| b.name().name.clone())
        .collect()
}

#[test]
fn test_every_match_is_replaced() {
    let matches = lower(
        "const a = match (x) { 1: 'one' };
         function f(y) { return match (y) { else: 0 }; }",
    );
    assert_eq!(matches.len(), 2);
}

#[test]
fn test_identifier_scrutinee_is_reused() {
    let matches = lower("match (value) { 1: 'one' }");
    match &matches[0].scrutinee {
        ScrutineeBinding::Reuse(id) => assert_eq!(id.name, "value"),
        other => panic!("Expected reuse, got {:?}", other),
    }
}

#[test]
fn test_temporary_avoids_program_names() {
    let matches = lower(
        "let _match_expr = 0;
         match (compute()) { 1: 'one' }",
    );
    assert_eq!(matches[0].scrutinee.name().name, "_match_expr2");
}

#[test]
fn test_binding_order() {
    let matches = lower("match (x) { [a, [b, ...inner], ...outer]: 0 }");
    assert_eq!(binding_names(&matches[0], 0), vec!["outer", "a", "inner", "b"]);

    let matches = lower("match (x) { {a, b: {c, ...deep}, ...rest}: 0 }");
    assert_eq!(binding_names(&matches[0], 0), vec!["a", "c", "deep", "rest"]);
}

#[test]
fn test_object_rest_shapes() {
    let matches = lower("match (x) { {...all}: 0, {a, ...rest}: 1 }");
    let chain = &matches[0].chain;
    assert!(matches!(
        chain.branches[0].scope.bindings[0],
        Binding::CopyAll { .. }
    ));
    match &chain.branches[1].scope.bindings[1] {
        Binding::CopyFiltered { key, .. } => assert_eq!(key.name, "_key"),
        other => panic!("Expected filtered copy, got {:?}", other),
    }
}

#[test]
fn test_fallback_kinds() {
    let matches = lower("match (x) { 1: 'one', else: 'other', 2: 'two' }");
    assert_eq!(matches[0].chain.branches.len(), 1);
    assert!(matches!(matches[0].chain.fallback, Fallback::Clause(_)));

    let matches = lower("match (x) { 1: 'one', else if ready: 'maybe' }");
    assert_eq!(matches[0].chain.branches.len(), 2);
    assert!(matches[0].chain.branches[1].test.is_none());
    assert!(matches!(matches[0].chain.fallback, Fallback::Fail { .. }));
}

#[test]
fn test_custom_options() {
    let options = LowerOptions::default()
        .with_scrutinee_hint("subject")
        .with_key_hint("k")
        .with_failure_message("unhandled");
    let program = lower_program_with(
        parse("match (f()) { {a, ...rest}: rest }").unwrap(),
        &options,
    )
    .unwrap();
    let matches = lowered_matches(&program);

    assert_eq!(matches[0].scrutinee.name().name, "_subject");
    match &matches[0].chain.branches[0].scope.bindings[1] {
        Binding::CopyFiltered { key, .. } => assert_eq!(key.name, "_k"),
        other => panic!("Expected filtered copy, got {:?}", other),
    }
    match &matches[0].chain.fallback {
        Fallback::Fail { message, .. } => assert_eq!(message, "unhandled"),
        other => panic!("Expected failure fallback, got {:?}", other),
    }
}

#[test]
fn test_lower_single_match_shares_name_generator() {
    let ExprKind::Match(m) = parse_expression("match (f()) { [a]: a }").unwrap().kind else {
        panic!("Expected match expression");
    };
    let mut names = NameGenerator::new();
    let first = lower_match(&m, &mut names).unwrap();
    let second = lower_match(&m, &mut names).unwrap();
    assert_eq!(first.scrutinee.name().name, "_match_expr");
    assert_eq!(second.scrutinee.name().name, "_match_expr2");
}

#[test]
fn test_ir_serializes_to_json() {
    let matches = lower("match (f()) { [a, ...rest] if a: rest, else: null }");
    let json = serde_json::to_value(&matches).unwrap();
    let first = &json[0];
    assert!(first["scrutinee"]["Temp"].is_object());
    assert!(first["chain"]["fallback"]["Clause"].is_object());
    assert_eq!(first["chain"]["branches"].as_array().map(Vec::len), Some(1));
}

#[test]
fn test_parse_errors_surface_before_lowering() {
    match parse("match (x) { [a b]: 1 }") {
        Err(Error::ParseError { .. }) => {}
        other => panic!("Expected parse error, got {:?}", other.map(|p| p.body.len())),
    }
}
