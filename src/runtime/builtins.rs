//! Built-in functions and objects
//!
//! This module provides the globals host programs can reach (`console`,
//! `Array`, `Object`, the error constructors, `Symbol.match`) and the
//! methods looked up on arrays, strings, and objects.

use super::interp::{Env, Interpreter, Scope};
use super::value::{ObjectKind, PropertyMap, Value, SYMBOL_MATCH_KEY};
use crate::error::{Error, Result};
use rustc_hash::FxHashMap as HashMap;

type Method = fn(&mut Interpreter, &Value, &[Value]) -> Result<Value>;

/// Error constructors installed as globals; each brands the errors it makes
const ERROR_CONSTRUCTORS: &[&str] = &[
    "Error",
    "TypeError",
    "RangeError",
    "ReferenceError",
    "SyntaxError",
    "MatchError",
];

/// Methods shared by every value of a kind
pub(crate) struct Intrinsics {
    array: HashMap<&'static str, Value>,
    string: HashMap<&'static str, Value>,
    object: HashMap<&'static str, Value>,
}

impl Intrinsics {
    pub(crate) fn new() -> Self {
        Self {
            array: method_table(&[
                ("push", array_push),
                ("pop", array_pop),
                ("slice", array_slice),
                ("join", array_join),
                ("indexOf", array_index_of),
                ("includes", array_includes),
                ("concat", array_concat),
                ("map", array_map),
                ("filter", array_filter),
                ("forEach", array_for_each),
                ("reduce", array_reduce),
            ]),
            string: method_table(&[
                ("toUpperCase", string_to_upper_case),
                ("toLowerCase", string_to_lower_case),
                ("slice", string_slice),
                ("startsWith", string_starts_with),
                ("includes", string_includes),
                ("split", string_split),
                ("trim", string_trim),
            ]),
            object: method_table(&[
                ("hasOwnProperty", object_has_own_property),
                ("toString", object_to_string),
            ]),
        }
    }

    /// Find the built-in method `key` for `target`
    pub(crate) fn lookup(&self, target: &Value, key: &str) -> Option<Value> {
        let kind_table = match target {
            Value::String(_) => Some(&self.string),
            _ if target.is_array() => Some(&self.array),
            _ => None,
        };
        kind_table
            .and_then(|table| table.get(key))
            .or_else(|| self.object.get(key))
            .cloned()
    }
}

fn method_table(methods: &[(&'static str, Method)]) -> HashMap<&'static str, Value> {
    methods
        .iter()
        .map(|&(name, method)| (name, Value::new_native(name, method)))
        .collect()
}

/// Register all built-in globals
pub(crate) fn register_globals(global: &Env) {
    Scope::define(global, "undefined", Value::Undefined);
    Scope::define(global, "NaN", Value::Number(f64::NAN));
    Scope::define(global, "Infinity", Value::Number(f64::INFINITY));

    register_console(global);
    register_array(global);
    register_object(global);
    register_conversions(global);
    register_errors(global);
    register_symbol(global);
}

/// Whether `value` carries the brand of the native constructor `name`,
/// which is how `instanceof` treats built-ins
pub(crate) fn has_brand(value: &Value, name: &str) -> bool {
    let Value::Object(obj) = value else {
        return false;
    };
    let obj = obj.borrow();
    match name {
        "Object" => true,
        "Array" => matches!(obj.kind, ObjectKind::Array(_)),
        "Function" => matches!(obj.kind, ObjectKind::Closure(_) | ObjectKind::Native { .. }),
        "Error" => matches!(obj.kind, ObjectKind::Error),
        _ if ERROR_CONSTRUCTORS.contains(&name) => {
            matches!(obj.kind, ObjectKind::Error)
                && obj.properties.get("name").is_some_and(|n| n.to_js_string() == name)
        }
        _ => false,
    }
}

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Undefined)
}

fn namespace(methods: &[(&'static str, Method)]) -> Value {
    Value::new_object_with_properties(
        methods
            .iter()
            .map(|&(name, method)| (name.to_string(), Value::new_native(name, method)))
            .collect(),
    )
}

/// Install a callable global that also carries static methods
fn define_constructor(global: &Env, name: &str, call: Method, statics: &[(&'static str, Method)]) {
    let ctor = Value::new_native(name, call);
    for &(method, func) in statics {
        // Natives are always objects, so this cannot fail
        let _ = ctor.set_property(method, Value::new_native(method, func));
    }
    Scope::define(global, name, ctor);
}

// ========== console ==========

fn console_line(args: &[Value]) -> String {
    args.iter()
        .map(|v| match v {
            Value::BigInt(n) => format!("{}n", n),
            other => other.to_display_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn register_console(global: &Env) {
    fn log(_: &mut Interpreter, _: &Value, args: &[Value]) -> Result<Value> {
        let line = console_line(args);
        tracing::info!(target: "quickmatch::console", %line, "console.log");
        println!("{}", line);
        Ok(Value::Undefined)
    }

    fn error(_: &mut Interpreter, _: &Value, args: &[Value]) -> Result<Value> {
        let line = console_line(args);
        tracing::trace!(target: "quickmatch::console", %line, "console.error");
        eprintln!("{}", line);
        Ok(Value::Undefined)
    }

    Scope::define(global, "console", namespace(&[("log", log), ("error", error)]));
}

// ========== Array ==========

fn register_array(global: &Env) {
    fn construct(_: &mut Interpreter, _: &Value, args: &[Value]) -> Result<Value> {
        match args {
            [Value::Number(n)] => {
                if *n < 0.0 || n.fract() != 0.0 {
                    return Err(Error::range_error("Invalid array length"));
                }
                Ok(Value::new_array(vec![Value::Undefined; *n as usize]))
            }
            _ => Ok(Value::new_array(args.to_vec())),
        }
    }

    fn is_array(_: &mut Interpreter, _: &Value, args: &[Value]) -> Result<Value> {
        Ok(Value::Boolean(arg(args, 0).is_array()))
    }

    define_constructor(global, "Array", construct, &[("isArray", is_array)]);
}

fn with_array<R>(this: &Value, method: &str, f: impl FnOnce(&mut Vec<Value>) -> R) -> Result<R> {
    if let Value::Object(obj) = this {
        if let ObjectKind::Array(elements) = &mut obj.borrow_mut().kind {
            return Ok(f(elements));
        }
    }
    Err(non_array(method))
}

fn elements_of(this: &Value, method: &str) -> Result<Vec<Value>> {
    this.array_elements().ok_or_else(|| non_array(method))
}

fn non_array(method: &str) -> Error {
    Error::type_error(format!("Array.prototype.{} called on a non-array", method))
}

/// Resolve a possibly negative `slice` bound against `len`
fn relative_index(value: Option<&Value>, len: usize, default: usize) -> usize {
    let n = match value {
        None | Some(Value::Undefined) => return default,
        Some(v) => v.to_number(),
    };
    if n.is_nan() {
        0
    } else if n < 0.0 {
        (len as f64 + n.trunc()).max(0.0) as usize
    } else {
        n.trunc().min(len as f64) as usize
    }
}

fn callback(args: &[Value], method: &str) -> Result<Value> {
    let f = arg(args, 0);
    if f.is_callable() {
        Ok(f)
    } else {
        Err(Error::type_error(format!(
            "{} is not a function (in Array.prototype.{})",
            f.to_display_string(),
            method
        )))
    }
}

fn array_push(_: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    with_array(this, "push", |elements| {
        elements.extend(args.iter().cloned());
        Value::Number(elements.len() as f64)
    })
}

fn array_pop(_: &mut Interpreter, this: &Value, _: &[Value]) -> Result<Value> {
    with_array(this, "pop", |elements| elements.pop().unwrap_or(Value::Undefined))
}

fn array_slice(_: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    let elements = elements_of(this, "slice")?;
    let len = elements.len();
    let start = relative_index(args.first(), len, 0);
    let end = relative_index(args.get(1), len, len);
    Ok(Value::new_array(
        elements.get(start..end.max(start)).unwrap_or_default().to_vec(),
    ))
}

fn array_join(_: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    let elements = elements_of(this, "join")?;
    let separator = match arg(args, 0) {
        Value::Undefined => ",".to_string(),
        sep => sep.to_js_string(),
    };
    let parts: Vec<String> = elements
        .iter()
        .map(|v| if v.is_nullish() { String::new() } else { v.to_js_string() })
        .collect();
    Ok(Value::String(parts.join(&separator)))
}

fn array_index_of(_: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    let needle = arg(args, 0);
    let position = elements_of(this, "indexOf")?
        .iter()
        .position(|v| v.strict_equals(&needle));
    Ok(Value::Number(position.map_or(-1.0, |i| i as f64)))
}

fn array_includes(_: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    let needle = arg(args, 0);
    let same_value_zero = |v: &Value| match (v, &needle) {
        (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
        _ => v.strict_equals(&needle),
    };
    Ok(Value::Boolean(
        elements_of(this, "includes")?.iter().any(same_value_zero),
    ))
}

fn array_concat(_: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    let mut result = elements_of(this, "concat")?;
    for item in args {
        match item.array_elements() {
            Some(elements) => result.extend(elements),
            None => result.push(item.clone()),
        }
    }
    Ok(Value::new_array(result))
}

fn array_map(interp: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    let f = callback(args, "map")?;
    let elements = elements_of(this, "map")?;
    let mut mapped = Vec::with_capacity(elements.len());
    for (i, item) in elements.into_iter().enumerate() {
        mapped.push(interp.call(&f, Value::Undefined, &[item, Value::Number(i as f64), this.clone()])?);
    }
    Ok(Value::new_array(mapped))
}

fn array_filter(interp: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    let f = callback(args, "filter")?;
    let mut kept = Vec::new();
    for (i, item) in elements_of(this, "filter")?.into_iter().enumerate() {
        let keep = interp.call(&f, Value::Undefined, &[item.clone(), Value::Number(i as f64), this.clone()])?;
        if keep.to_boolean() {
            kept.push(item);
        }
    }
    Ok(Value::new_array(kept))
}

fn array_for_each(interp: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    let f = callback(args, "forEach")?;
    for (i, item) in elements_of(this, "forEach")?.into_iter().enumerate() {
        interp.call(&f, Value::Undefined, &[item, Value::Number(i as f64), this.clone()])?;
    }
    Ok(Value::Undefined)
}

fn array_reduce(interp: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    let f = callback(args, "reduce")?;
    let mut items = elements_of(this, "reduce")?.into_iter().enumerate();
    let mut acc = match args.get(1) {
        Some(initial) => initial.clone(),
        None => match items.next() {
            Some((_, first)) => first,
            None => return Err(Error::type_error("Reduce of empty array with no initial value")),
        },
    };
    for (i, item) in items {
        acc = interp.call(&f, Value::Undefined, &[acc, item, Value::Number(i as f64), this.clone()])?;
    }
    Ok(acc)
}

// ========== String ==========

fn this_string(this: &Value, method: &str) -> Result<String> {
    match this {
        Value::String(s) => Ok(s.clone()),
        _ => Err(Error::type_error(format!(
            "String.prototype.{} called on a non-string",
            method
        ))),
    }
}

fn string_to_upper_case(_: &mut Interpreter, this: &Value, _: &[Value]) -> Result<Value> {
    Ok(Value::String(this_string(this, "toUpperCase")?.to_uppercase()))
}

fn string_to_lower_case(_: &mut Interpreter, this: &Value, _: &[Value]) -> Result<Value> {
    Ok(Value::String(this_string(this, "toLowerCase")?.to_lowercase()))
}

fn string_slice(_: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    let chars: Vec<char> = this_string(this, "slice")?.chars().collect();
    let len = chars.len();
    let start = relative_index(args.first(), len, 0);
    let end = relative_index(args.get(1), len, len).max(start);
    Ok(Value::String(chars[start..end].iter().collect()))
}

fn string_starts_with(_: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    let s = this_string(this, "startsWith")?;
    Ok(Value::Boolean(s.starts_with(&arg(args, 0).to_js_string())))
}

fn string_includes(_: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    let s = this_string(this, "includes")?;
    Ok(Value::Boolean(s.contains(&arg(args, 0).to_js_string())))
}

fn string_split(_: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    let s = this_string(this, "split")?;
    let parts = match arg(args, 0) {
        Value::Undefined => vec![Value::String(s)],
        sep => {
            let sep = sep.to_js_string();
            if sep.is_empty() {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                s.split(sep.as_str()).map(|p| Value::String(p.to_string())).collect()
            }
        }
    };
    Ok(Value::new_array(parts))
}

fn string_trim(_: &mut Interpreter, this: &Value, _: &[Value]) -> Result<Value> {
    Ok(Value::String(this_string(this, "trim")?.trim().to_string()))
}

// ========== Object ==========

fn object_has_own_property(_: &mut Interpreter, this: &Value, args: &[Value]) -> Result<Value> {
    Ok(Value::Boolean(
        this.has_own_property(&arg(args, 0).to_property_key()),
    ))
}

fn object_to_string(_: &mut Interpreter, this: &Value, _: &[Value]) -> Result<Value> {
    Ok(Value::String(this.to_js_string()))
}

fn register_object(global: &Env) {
    fn construct(_: &mut Interpreter, _: &Value, args: &[Value]) -> Result<Value> {
        match arg(args, 0) {
            value @ Value::Object(_) => Ok(value),
            _ => Ok(Value::new_object()),
        }
    }

    fn keys(_: &mut Interpreter, _: &Value, args: &[Value]) -> Result<Value> {
        let keys = arg(args, 0).own_keys().into_iter().map(Value::String).collect();
        Ok(Value::new_array(keys))
    }

    fn values(interp: &mut Interpreter, _: &Value, args: &[Value]) -> Result<Value> {
        let source = arg(args, 0);
        let mut values = Vec::new();
        for key in source.own_keys() {
            values.push(interp.get_member(&source, &key)?);
        }
        Ok(Value::new_array(values))
    }

    fn assign(interp: &mut Interpreter, _: &Value, args: &[Value]) -> Result<Value> {
        let target = arg(args, 0);
        if target.is_nullish() {
            return Err(Error::type_error("Cannot convert undefined or null to object"));
        }
        for source in args.iter().skip(1) {
            for key in source.own_keys() {
                target.set_property(&key, interp.get_member(source, &key)?)?;
            }
        }
        Ok(target)
    }

    define_constructor(
        global,
        "Object",
        construct,
        &[("keys", keys), ("values", values), ("assign", assign)],
    );
}

// ========== Conversions ==========

fn register_conversions(global: &Env) {
    fn number(_: &mut Interpreter, _: &Value, args: &[Value]) -> Result<Value> {
        Ok(Value::Number(match args.first() {
            None => 0.0,
            Some(v) => v.to_number(),
        }))
    }

    fn is_integer(_: &mut Interpreter, _: &Value, args: &[Value]) -> Result<Value> {
        Ok(Value::Boolean(matches!(
            arg(args, 0),
            Value::Number(n) if n.is_finite() && n.fract() == 0.0
        )))
    }

    fn string(_: &mut Interpreter, _: &Value, args: &[Value]) -> Result<Value> {
        Ok(Value::String(match args.first() {
            None => String::new(),
            Some(v) => v.to_js_string(),
        }))
    }

    fn boolean(_: &mut Interpreter, _: &Value, args: &[Value]) -> Result<Value> {
        Ok(Value::Boolean(arg(args, 0).to_boolean()))
    }

    fn function(_: &mut Interpreter, _: &Value, _: &[Value]) -> Result<Value> {
        Err(Error::type_error("Function constructor is not supported"))
    }

    define_constructor(global, "Number", number, &[("isInteger", is_integer)]);
    define_constructor(global, "String", string, &[]);
    define_constructor(global, "Boolean", boolean, &[]);
    define_constructor(global, "Function", function, &[]);
}

// ========== Errors ==========

fn register_errors(global: &Env) {
    for &name in ERROR_CONSTRUCTORS {
        let ctor = Value::new_native(name, move |_, _, args| {
            let message = match arg(args, 0) {
                Value::Undefined => String::new(),
                m => m.to_js_string(),
            };
            Ok(Value::new_error(name, &message))
        });
        Scope::define(global, name, ctor);
    }
}

// ========== Symbol ==========

fn register_symbol(global: &Env) {
    let mut symbol = PropertyMap::new();
    symbol.insert("match", Value::String(SYMBOL_MATCH_KEY.to_string()));
    Scope::define(global, "Symbol", Value::new_object_with_properties(symbol));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(method: Method, this: Value, args: &[Value]) -> Value {
        let mut interp = Interpreter::new(64);
        method(&mut interp, &this, args).unwrap()
    }

    fn numbers(values: &[f64]) -> Value {
        Value::new_array(values.iter().map(|&n| Value::Number(n)).collect())
    }

    #[test]
    fn test_slice_handles_negative_bounds() {
        let result = call(array_slice, numbers(&[1.0, 2.0, 3.0, 4.0]), &[Value::Number(-2.0)]);
        assert_eq!(result.to_js_string(), "3,4");

        let result = call(array_slice, numbers(&[1.0, 2.0, 3.0]), &[Value::Number(2.0), Value::Number(1.0)]);
        assert_eq!(result.array_elements().unwrap().len(), 0);
    }

    #[test]
    fn test_push_mutates_in_place() {
        let array = numbers(&[1.0]);
        let len = call(array_push, array.clone(), &[Value::Number(2.0), Value::Number(3.0)]);
        assert_eq!(len, Value::Number(3.0));
        assert_eq!(array.to_js_string(), "1,2,3");
    }

    #[test]
    fn test_includes_finds_nan() {
        let array = numbers(&[f64::NAN]);
        assert_eq!(call(array_includes, array.clone(), &[Value::Number(f64::NAN)]), Value::Boolean(true));
        assert_eq!(call(array_index_of, array, &[Value::Number(f64::NAN)]), Value::Number(-1.0));
    }

    #[test]
    fn test_error_brands() {
        let type_error = Value::new_error("TypeError", "bad");
        assert!(has_brand(&type_error, "Error"));
        assert!(has_brand(&type_error, "TypeError"));
        assert!(!has_brand(&type_error, "RangeError"));
        assert!(!has_brand(&Value::Number(1.0), "Object"));
        assert!(has_brand(&numbers(&[]), "Object"));
    }

    #[test]
    fn test_lookup_falls_back_to_object_methods() {
        let intrinsics = Intrinsics::new();
        assert!(intrinsics.lookup(&numbers(&[]), "map").is_some());
        assert!(intrinsics.lookup(&numbers(&[]), "hasOwnProperty").is_some());
        assert!(intrinsics.lookup(&Value::String("a".into()), "map").is_none());
        assert!(intrinsics.lookup(&Value::new_object(), "push").is_none());
    }
}
