//! Runtime values
//!
//! Primitives are stored inline; objects, arrays, and functions are shared
//! through `Rc<RefCell<Object>>` and compare by identity.

use super::interp::{Env, Interpreter};
use crate::ast::Function;
use crate::error::{Error, Result};
use num_bigint::BigInt;
use rustc_hash::FxHashMap as HashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Type alias for native function implementations: `(interpreter, this, args)`
pub type NativeFn = Rc<dyn Fn(&mut Interpreter, &Value, &[Value]) -> Result<Value>>;

/// Property key the `Symbol.match` well-known symbol stands for
pub const SYMBOL_MATCH_KEY: &str = "@@match";

/// Nesting depth at which [`Value::to_display_string`] stops descending
const DISPLAY_DEPTH: usize = 4;

#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    BigInt(BigInt),
    String(String),
    /// Ordinary objects, arrays, functions, and errors
    Object(Rc<RefCell<Object>>),
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `null` or `undefined`
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    fn object_kind_is(&self, pred: impl Fn(&ObjectKind) -> bool) -> bool {
        matches!(self, Value::Object(obj) if pred(&obj.borrow().kind))
    }

    /// What the `Array.isArray` test of an array pattern checks
    pub fn is_array(&self) -> bool {
        self.object_kind_is(|kind| matches!(kind, ObjectKind::Array(_)))
    }

    pub fn is_callable(&self) -> bool {
        self.object_kind_is(|kind| matches!(kind, ObjectKind::Closure(_) | ObjectKind::Native { .. }))
    }

    /// Truthiness, as guards and `if` conditions see it
    pub fn to_boolean(&self) -> bool {
        use num_traits::Zero;
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => !(*n == 0.0 || n.is_nan()),
            Value::BigInt(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// Numeric conversion used by arithmetic and relational operators
    pub fn to_number(&self) -> f64 {
        use num_traits::ToPrimitive;
        match self {
            Value::Undefined => f64::NAN,
            Value::Null | Value::Boolean(false) => 0.0,
            Value::Boolean(true) => 1.0,
            Value::Number(n) => *n,
            Value::BigInt(n) => n.to_f64().unwrap_or(f64::INFINITY),
            Value::String(s) => match s.trim() {
                "" => 0.0,
                digits => lexical_core::parse::<f64>(digits.as_bytes()).unwrap_or(f64::NAN),
            },
            Value::Object(_) => Value::String(self.to_js_string()).to_number(),
        }
    }

    /// String conversion used by `+`, template-free concatenation, and keys
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".into(),
            Value::Null => "null".into(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::BigInt(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Object(obj) => {
                let obj = obj.borrow();
                match &obj.kind {
                    ObjectKind::Array(items) => {
                        let parts: Vec<String> = items
                            .iter()
                            .map(|v| if v.is_nullish() { String::new() } else { v.to_js_string() })
                            .collect();
                        parts.join(",")
                    }
                    ObjectKind::Closure(_) | ObjectKind::Native { .. } => {
                        format!("function {}() {{ [code] }}", obj.function_name())
                    }
                    ObjectKind::Error => {
                        let name = obj.get_string("name").unwrap_or_else(|| "Error".to_string());
                        match obj.get_string("message") {
                            Some(message) if !message.is_empty() => format!("{}: {}", name, message),
                            _ => name,
                        }
                    }
                    ObjectKind::Ordinary => "[object Object]".to_string(),
                }
            }
        }
    }

    /// Render the value for REPL output and uncaught-error reports
    pub fn to_display_string(&self) -> String {
        self.display_at_depth(0, true)
    }

    fn display_at_depth(&self, depth: usize, top: bool) -> String {
        match self {
            Value::String(s) if top => s.clone(),
            Value::String(s) => format!("'{}'", s),
            Value::BigInt(n) => format!("{}n", n),
            Value::Object(obj) => {
                let obj = obj.borrow();
                let nested = |v: &Value| v.display_at_depth(depth + 1, false);
                match &obj.kind {
                    ObjectKind::Array(_) if depth >= DISPLAY_DEPTH => "[Array]".to_string(),
                    ObjectKind::Array(items) => {
                        format!("[{}]", items.iter().map(nested).collect::<Vec<_>>().join(", "))
                    }
                    ObjectKind::Closure(_) | ObjectKind::Native { .. } => {
                        match obj.function_name() {
                            "" => "[Function (anonymous)]".to_string(),
                            name => format!("[Function: {}]", name),
                        }
                    }
                    ObjectKind::Error => self.to_js_string(),
                    ObjectKind::Ordinary if depth >= DISPLAY_DEPTH => "[Object]".to_string(),
                    ObjectKind::Ordinary if obj.properties.is_empty() => "{}".to_string(),
                    ObjectKind::Ordinary => {
                        let entries: Vec<String> =
                            obj.properties.iter().map(|(k, v)| format!("{}: {}", k, nested(v))).collect();
                        format!("{{ {} }}", entries.join(", "))
                    }
                }
            }
            other => other.to_js_string(),
        }
    }

    /// Result of `typeof`, which `TypeOf` tests compare against
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Object(obj) => match obj.borrow().kind {
                ObjectKind::Closure(_) | ObjectKind::Native { .. } => "function",
                _ => "object",
            },
        }
    }

    /// `===`, the comparison literal patterns use
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            // NaN !== NaN and 0 === -0 fall out of IEEE-754 comparison
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `==`
    pub fn equals(&self, other: &Value) -> bool {
        use num_traits::ToPrimitive;
        match (self, other) {
            (Value::Null | Value::Undefined, Value::Null | Value::Undefined) => true,
            (Value::Null | Value::Undefined, _) | (_, Value::Null | Value::Undefined) => false,

            (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
                self.to_number() == other.to_number()
            }

            (Value::BigInt(n), Value::Number(m)) | (Value::Number(m), Value::BigInt(n)) => {
                m.fract() == 0.0 && n.to_f64().map(|x| x == *m).unwrap_or(false)
            }

            (Value::Boolean(_), _) => Value::Number(self.to_number()).equals(other),
            (_, Value::Boolean(_)) => self.equals(&Value::Number(other.to_number())),

            (Value::Object(_), Value::Number(_) | Value::String(_)) => {
                Value::String(self.to_js_string()).equals(other)
            }
            (Value::Number(_) | Value::String(_), Value::Object(_)) => {
                self.equals(&Value::String(other.to_js_string()))
            }

            _ => self.strict_equals(other),
        }
    }

    /// BigInt from decimal digits with an optional leading `-`
    pub fn new_bigint(digits: &str) -> Option<Value> {
        digits.parse().ok().map(Value::BigInt)
    }

    pub fn new_object() -> Value {
        Value::from_object(Object::new(ObjectKind::Ordinary))
    }

    pub fn new_object_with_properties(properties: PropertyMap) -> Value {
        let mut obj = Object::new(ObjectKind::Ordinary);
        obj.properties = properties;
        Value::from_object(obj)
    }

    pub fn new_array(elements: Vec<Value>) -> Value {
        Value::from_object(Object::new(ObjectKind::Array(elements)))
    }

    /// Error object as host `catch` clauses receive it
    pub fn new_error(name: &str, message: &str) -> Value {
        let mut obj = Object::new(ObjectKind::Error);
        obj.properties.insert("name", Value::String(name.into()));
        obj.properties.insert("message", Value::String(message.into()));
        Value::from_object(obj)
    }

    pub fn new_native(
        name: &str,
        func: impl Fn(&mut Interpreter, &Value, &[Value]) -> Result<Value> + 'static,
    ) -> Value {
        let func: NativeFn = Rc::new(func);
        Value::from_object(Object::new(ObjectKind::Native { name: name.into(), func }))
    }

    /// Closure over `env`
    pub fn new_closure(function: Rc<Function>, env: Env) -> Value {
        Value::from_object(Object::new(ObjectKind::Closure(Rc::new(Closure { function, env }))))
    }

    fn from_object(obj: Object) -> Value {
        Value::Object(Rc::new(RefCell::new(obj)))
    }

    /// Read an own property (array elements, `length`, string characters)
    pub fn get_own(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(obj) => obj.borrow().get_own(key),
            Value::String(s) => {
                if key == "length" {
                    return Some(Value::Number(s.chars().count() as f64));
                }
                array_index(key)
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| Value::String(c.to_string()))
            }
            _ => None,
        }
    }

    /// Write a property; primitives other than null/undefined ignore writes
    pub fn set_property(&self, key: &str, value: Value) -> Result<()> {
        match self {
            Value::Object(obj) => {
                obj.borrow_mut().set_property(key, value);
                Ok(())
            }
            Value::Undefined | Value::Null => Err(Error::type_error(format!(
                "Cannot set properties of {} (setting '{}')",
                self.to_js_string(),
                key
            ))),
            _ => Ok(()),
        }
    }

    /// `hasOwnProperty`; false for null and undefined
    pub fn has_own_property(&self, key: &str) -> bool {
        match self {
            Value::Object(obj) => obj.borrow().has_own_property(key),
            Value::String(_) => self.get_own(key).is_some(),
            _ => false,
        }
    }

    /// Own enumerable keys in enumeration order
    pub fn own_keys(&self) -> Vec<String> {
        match self {
            Value::Object(obj) => obj.borrow().own_keys(),
            Value::String(s) => (0..s.chars().count()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    /// Convert to a property key
    pub fn to_property_key(&self) -> String {
        self.to_js_string()
    }

    /// Elements of an array value
    pub fn array_elements(&self) -> Option<Vec<Value>> {
        match self {
            Value::Object(obj) => match &obj.borrow().kind {
                ObjectKind::Array(arr) => Some(arr.clone()),
                _ => None,
            },
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_at_depth(0, false))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_js_string())
    }
}

/// Format a number the way the host's `String(n)` does
pub fn number_to_string(n: f64) -> String {
    match n {
        _ if n.is_nan() => "NaN".into(),
        _ if n.is_infinite() => if n > 0.0 { "Infinity" } else { "-Infinity" }.into(),
        _ if n == 0.0 => "0".into(),
        _ if (1e-6..1e21).contains(&n.abs()) => n.to_string(),
        _ => {
            let scientific = format!("{:e}", n);
            match scientific.split_once('e') {
                Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
                _ => scientific,
            }
        }
    }
}

/// Parse a canonical array index ("0", "17", not "01")
pub(crate) fn array_index(key: &str) -> Option<usize> {
    let idx = key.parse::<usize>().ok()?;
    (idx.to_string() == key).then_some(idx)
}

/// Index keys below 2^32 - 1 enumerate first, in ascending order
fn integer_key(key: &str) -> Option<usize> {
    array_index(key).filter(|&i| i < u32::MAX as usize)
}

/// Own properties in enumeration order: integer keys ascending, then the
/// rest in insertion order
#[derive(Clone, Default)]
pub struct PropertyMap {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl PropertyMap {
    pub fn new() -> Self {
        PropertyMap::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or overwrite; a new key goes last
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    fn enumeration_order(&self) -> Vec<usize> {
        let (mut order, named): (Vec<usize>, Vec<usize>) =
            (0..self.entries.len()).partition(|&i| integer_key(&self.entries[i].0).is_some());
        order.sort_by_key(|&i| integer_key(&self.entries[i].0));
        order.extend(named);
        order
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.enumeration_order()
            .into_iter()
            .map(move |i| self.entries[i].0.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.enumeration_order().into_iter().map(move |i| {
            let (k, v) = &self.entries[i];
            (k.as_str(), v)
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(String, Value)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Heap object behind [`Value::Object`]
#[derive(Clone)]
pub struct Object {
    pub kind: ObjectKind,
    /// Own properties, in insertion order
    pub properties: PropertyMap,
    /// The user function `new` constructed this object with
    pub constructor: Option<Rc<RefCell<Object>>>,
}

impl Object {
    pub fn new(kind: ObjectKind) -> Self {
        Object { kind, properties: PropertyMap::new(), constructor: None }
    }

    /// Own property, including array elements and `length`
    pub fn get_own(&self, key: &str) -> Option<Value> {
        match (&self.kind, key) {
            (ObjectKind::Array(items), "length") => Some(Value::Number(items.len() as f64)),
            (ObjectKind::Array(items), _) if array_index(key).is_some() => {
                array_index(key).and_then(|i| items.get(i).cloned())
            }
            _ => self.properties.get(key).cloned(),
        }
    }

    /// Writing past the end of an array grows it with `undefined`
    pub fn set_property(&mut self, key: &str, value: Value) {
        let ObjectKind::Array(items) = &mut self.kind else {
            self.properties.insert(key, value);
            return;
        };
        if let Some(i) = array_index(key) {
            if i >= items.len() {
                items.resize(i + 1, Value::Undefined);
            }
            items[i] = value;
        } else if key == "length" {
            let len = value.to_number();
            if len >= 0.0 && len.fract() == 0.0 {
                items.resize(len as usize, Value::Undefined);
            }
        } else {
            self.properties.insert(key, value);
        }
    }

    pub fn has_own_property(&self, key: &str) -> bool {
        let element = match &self.kind {
            ObjectKind::Array(items) => key == "length" || array_index(key).is_some_and(|i| i < items.len()),
            _ => false,
        };
        element || self.properties.contains_key(key)
    }

    /// Own enumerable keys: array indices first, then properties in enumeration order
    pub fn own_keys(&self) -> Vec<String> {
        let indices = match &self.kind {
            ObjectKind::Array(items) => 0..items.len(),
            _ => 0..0,
        };
        indices
            .map(|i| i.to_string())
            .chain(self.properties.keys().map(str::to_string))
            .collect()
    }

    /// Function name for display; empty when anonymous or not a function
    pub fn function_name(&self) -> &str {
        match &self.kind {
            ObjectKind::Closure(c) => c.function.name.as_ref().map_or("", |id| id.name.as_str()),
            ObjectKind::Native { name, .. } => name,
            _ => "",
        }
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.properties.get(key).map(Value::to_js_string)
    }
}

#[derive(Clone)]
pub enum ObjectKind {
    Ordinary,
    /// Dense elements; other properties live in [`Object::properties`]
    Array(Vec<Value>),
    /// User function
    Closure(Rc<Closure>),
    /// Built-in function
    Native { name: String, func: NativeFn },
    /// Error object; `name` and `message` are ordinary properties
    Error,
}

/// A user function plus the environment it closes over
pub struct Closure {
    pub function: Rc<Function>,
    pub env: Env,
}
