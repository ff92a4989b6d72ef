//! Tree-walking evaluator
//!
//! Evaluates the host AST directly, including the lowered match IR. Match
//! places are resolved against the scrutinee value captured when the match
//! starts, so clause captures that shadow the scrutinee's name cannot
//! redirect later bindings.

use super::builtins::{self, Intrinsics};
use super::value::{Closure, Object, ObjectKind, Value, SYMBOL_MATCH_KEY};
use crate::ast::*;
use crate::error::{messages, Error, Result};
use crate::ir::{
    Binding, ClauseScope, Fallback, LoweredMatch, Place, PropertyName, ScrutineeBinding, Test,
};
use rustc_hash::FxHashMap as HashMap;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;
use tracing::{debug, trace};

/// A shared lexical environment
pub type Env = Rc<RefCell<Scope>>;

/// Name under which each function scope stores its receiver
const THIS_BINDING: &str = "this";

#[derive(Clone)]
struct Variable {
    value: Value,
    kind: DeclKind,
}

/// One lexical scope
pub struct Scope {
    vars: HashMap<String, Variable>,
    parent: Option<Env>,
}

impl Scope {
    /// Create a root scope
    pub fn new_global() -> Env {
        Rc::new(RefCell::new(Scope {
            vars: HashMap::default(),
            parent: None,
        }))
    }

    /// Create a scope nested in `parent`
    pub fn child(parent: &Env) -> Env {
        Rc::new(RefCell::new(Scope {
            vars: HashMap::default(),
            parent: Some(parent.clone()),
        }))
    }

    /// Declare a name in this scope. Only `var` may redeclare a `var`.
    pub fn declare(env: &Env, name: &str, value: Value, kind: DeclKind) -> Result<()> {
        let mut scope = env.borrow_mut();
        if let Some(existing) = scope.vars.get(name) {
            if kind != DeclKind::Var || existing.kind != DeclKind::Var {
                return Err(Error::syntax_error(messages::already_declared(name)));
            }
        }
        scope.vars.insert(name.to_string(), Variable { value, kind });
        Ok(())
    }

    /// Define or overwrite a name without redeclaration checks
    pub fn define(env: &Env, name: &str, value: Value) {
        env.borrow_mut().vars.insert(
            name.to_string(),
            Variable {
                value,
                kind: DeclKind::Var,
            },
        );
    }

    /// Whether `name` is declared directly in this scope
    pub fn has_own(env: &Env, name: &str) -> bool {
        env.borrow().vars.contains_key(name)
    }

    /// Resolve a name through the scope chain
    pub fn lookup(env: &Env, name: &str) -> Option<Value> {
        let mut current = env.clone();
        loop {
            let next = {
                let scope = current.borrow();
                if let Some(var) = scope.vars.get(name) {
                    return Some(var.value.clone());
                }
                scope.parent.clone()?
            };
            current = next;
        }
    }

    /// Assign to an existing binding
    pub fn assign(env: &Env, name: &str, value: Value) -> Result<()> {
        let mut current = env.clone();
        loop {
            let next = {
                let mut scope = current.borrow_mut();
                if let Some(var) = scope.vars.get_mut(name) {
                    if var.kind == DeclKind::Const {
                        return Err(Error::type_error(messages::ASSIGNMENT_TO_CONSTANT));
                    }
                    var.value = value;
                    return Ok(());
                }
                scope.parent.clone()
            };
            match next {
                Some(parent) => current = parent,
                None => return Err(Error::reference_error(messages::not_defined(name))),
            }
        }
    }
}

/// How a statement finished
#[derive(Debug)]
pub enum Completion {
    Normal,
    Return(Value),
    Break,
    Continue,
}

/// A resolved call target
enum Callee {
    Closure(Rc<Closure>),
    Native(super::value::NativeFn),
}

/// The evaluator
pub struct Interpreter {
    global: Env,
    intrinsics: Intrinsics,
    call_depth: usize,
    max_call_depth: usize,
}

impl Interpreter {
    /// Create an interpreter with the built-in globals installed
    pub fn new(max_call_depth: usize) -> Self {
        let global = Scope::new_global();
        Scope::define(&global, THIS_BINDING, Value::Undefined);
        builtins::register_globals(&global);
        Self {
            global,
            intrinsics: Intrinsics::new(),
            call_depth: 0,
            max_call_depth,
        }
    }

    /// The global scope
    pub fn global(&self) -> &Env {
        &self.global
    }

    /// Run a lowered program; the result is the value of the last
    /// top-level expression statement
    pub fn run_program(&mut self, program: &Program) -> Result<Value> {
        let global = self.global.clone();
        self.hoist_functions(&program.body, &global)?;

        let mut last = Value::Undefined;
        for stmt in &program.body {
            match &stmt.kind {
                StmtKind::Expr(e) => last = self.evaluate(e, &global)?,
                _ => {
                    self.execute(stmt, &global)?;
                }
            }
        }
        Ok(last)
    }

    // Statements

    fn hoist_functions(&mut self, stmts: &[Stmt], env: &Env) -> Result<()> {
        for stmt in stmts {
            if let StmtKind::Function(func) = &stmt.kind {
                if let Some(name) = &func.name {
                    let closure = Value::new_closure(Rc::new((**func).clone()), env.clone());
                    Scope::declare(env, &name.name, closure, DeclKind::Var)?;
                }
            }
        }
        Ok(())
    }

    fn execute_block(&mut self, stmts: &[Stmt], env: &Env) -> Result<Completion> {
        self.hoist_functions(stmts, env)?;
        for stmt in stmts {
            match self.execute(stmt, env)? {
                Completion::Normal => {}
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal)
    }

    fn execute(&mut self, stmt: &Stmt, env: &Env) -> Result<Completion> {
        match &stmt.kind {
            StmtKind::Block(b) => self.execute_block(&b.stmts, &Scope::child(env)),
            StmtKind::Empty | StmtKind::Function(_) => Ok(Completion::Normal),
            StmtKind::Expr(e) => {
                self.evaluate(e, env)?;
                Ok(Completion::Normal)
            }
            StmtKind::If { cond, then, otherwise } => {
                if self.evaluate(cond, env)?.to_boolean() {
                    self.execute(then, env)
                } else if let Some(otherwise) = otherwise {
                    self.execute(otherwise, env)
                } else {
                    Ok(Completion::Normal)
                }
            }
            StmtKind::While { cond, body } => {
                while self.evaluate(cond, env)?.to_boolean() {
                    match self.execute(body, env)? {
                        Completion::Break => break,
                        Completion::Return(v) => return Ok(Completion::Return(v)),
                        Completion::Normal | Completion::Continue => {}
                    }
                }
                Ok(Completion::Normal)
            }
            StmtKind::Break => Ok(Completion::Break),
            StmtKind::Continue => Ok(Completion::Continue),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(e) => self.evaluate(e, env)?,
                    None => Value::Undefined,
                };
                Ok(Completion::Return(value))
            }
            StmtKind::Throw(e) => Err(Error::Thrown(self.evaluate(e, env)?)),
            StmtKind::Try { body, catch, finally } => {
                self.execute_try(body, catch.as_ref(), finally.as_ref(), env)
            }
            StmtKind::Decl { kind, declarators } => {
                for d in declarators {
                    let value = match &d.init {
                        Some(init) => self.evaluate(init, env)?,
                        // `var x;` keeps an existing value
                        None if *kind == DeclKind::Var && Scope::has_own(env, &d.name.name) => continue,
                        None => Value::Undefined,
                    };
                    Scope::declare(env, &d.name.name, value, *kind)?;
                }
                Ok(Completion::Normal)
            }
        }
    }

    fn execute_try(
        &mut self,
        body: &Block,
        catch: Option<&CatchClause>,
        finally: Option<&Block>,
        env: &Env,
    ) -> Result<Completion> {
        let result = match (self.execute_block(&body.stmts, &Scope::child(env)), catch) {
            (Err(e), Some(catch)) if e.is_catchable() => {
                let scope = Scope::child(env);
                if let Some(param) = &catch.param {
                    Scope::declare(&scope, &param.name, error_to_value(e), DeclKind::Let)?;
                }
                self.execute_block(&catch.body.stmts, &scope)
            }
            (other, _) => other,
        };

        if let Some(finally) = finally {
            match self.execute_block(&finally.stmts, &Scope::child(env))? {
                Completion::Normal => {}
                abrupt => return Ok(abrupt),
            }
        }
        result
    }

    // Expressions

    pub fn evaluate(&mut self, expr: &Expr, env: &Env) -> Result<Value> {
        match &expr.kind {
            ExprKind::Ident(name) => self.resolve(name, env),
            ExprKind::Literal(lit) => literal_value(lit),
            ExprKind::Array(items) => Ok(Value::new_array(self.evaluate_list(items, env)?)),
            ExprKind::Object(members) => self.evaluate_object(members, env),
            ExprKind::Function(f) => Ok(Value::new_closure(Rc::new((**f).clone()), env.clone())),
            ExprKind::This => Ok(Scope::lookup(env, THIS_BINDING).unwrap_or(Value::Undefined)),
            ExprKind::Member { .. } | ExprKind::Index { .. } => {
                let (object, key) = self.member_target(expr, env)?;
                self.get_member(&object, &key)
            }
            ExprKind::Call { callee, args } => self.evaluate_call(callee, args, env),
            ExprKind::New { callee, args } => self.evaluate_new(callee, args, env),
            ExprKind::Unary { op, operand } => self.evaluate_unary(*op, operand, env),
            ExprKind::Binary { op, left, right } if op.is_short_circuit() => {
                let left = self.evaluate(left, env)?;
                let decided = match op {
                    BinaryOp::And => !left.to_boolean(),
                    BinaryOp::Or => left.to_boolean(),
                    _ => !left.is_nullish(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.evaluate(right, env)
                }
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.evaluate(left, env)?;
                let right = self.evaluate(right, env)?;
                self.binary(*op, &left, &right)
            }
            ExprKind::Assign { op, target, value } => self.evaluate_assign(*op, target, value, env),
            ExprKind::Conditional { cond, then, otherwise } => {
                if self.evaluate(cond, env)?.to_boolean() {
                    self.evaluate(then, env)
                } else {
                    self.evaluate(otherwise, env)
                }
            }
            ExprKind::Spread(_) => Err(Error::syntax_error("Unexpected spread element")),
            ExprKind::Match(_) => Err(Error::InternalError(
                "match expression reached the evaluator without being lowered".to_string(),
            )),
            ExprKind::Lowered(m) => self.evaluate_match(m, env),
            ExprKind::Paren(inner) => self.evaluate(inner, env),
        }
    }

    fn resolve(&self, name: &str, env: &Env) -> Result<Value> {
        Scope::lookup(env, name).ok_or_else(|| Error::reference_error(messages::not_defined(name)))
    }

    /// Array elements or call arguments, with spreads expanded
    fn evaluate_list(&mut self, items: &[Expr], env: &Env) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            match &item.kind {
                ExprKind::Spread(inner) => {
                    let spread = self.evaluate(inner, env)?;
                    values.extend(spread_values(&spread)?);
                }
                _ => values.push(self.evaluate(item, env)?),
            }
        }
        Ok(values)
    }

    fn evaluate_object(&mut self, members: &[ObjectMember], env: &Env) -> Result<Value> {
        let result = Value::new_object();
        for member in members {
            match member {
                ObjectMember::Property { key, value, .. } => {
                    let key = self.property_key(key, env)?;
                    let value = self.evaluate(value, env)?;
                    result.set_property(&key, value)?;
                }
                ObjectMember::Spread(source) => {
                    let source = self.evaluate(source, env)?;
                    for key in source.own_keys() {
                        let value = self.get_member(&source, &key)?;
                        result.set_property(&key, value)?;
                    }
                }
            }
        }
        Ok(result)
    }

    fn property_key(&mut self, key: &PropertyKey, env: &Env) -> Result<String> {
        match key {
            PropertyKey::Computed(e) => Ok(self.evaluate(e, env)?.to_property_key()),
            static_key => Ok(static_key.static_name().unwrap_or_default()),
        }
    }

    /// Object and key of a `.name` or `[index]` access
    fn member_target(&mut self, expr: &Expr, env: &Env) -> Result<(Value, String)> {
        match &expr.unparenthesized().kind {
            ExprKind::Member { object, property } => Ok((self.evaluate(object, env)?, property.name.clone())),
            ExprKind::Index { object, index } => {
                let object = self.evaluate(object, env)?;
                let key = self.evaluate(index, env)?.to_property_key();
                Ok((object, key))
            }
            _ => Err(Error::compile_invariant("member access expected")),
        }
    }

    /// Read `object[key]`, falling back to the built-in methods of its kind
    pub fn get_member(&self, object: &Value, key: &str) -> Result<Value> {
        if object.is_nullish() {
            return Err(Error::type_error(messages::cannot_read_property(
                key,
                &object.to_js_string(),
            )));
        }
        if let Some(value) = object.get_own(key) {
            return Ok(value);
        }
        Ok(self.intrinsics.lookup(object, key).unwrap_or(Value::Undefined))
    }

    fn evaluate_call(&mut self, callee: &Expr, args: &[Expr], env: &Env) -> Result<Value> {
        let (function, this) = match &callee.unparenthesized().kind {
            ExprKind::Member { .. } | ExprKind::Index { .. } => {
                let (object, key) = self.member_target(callee, env)?;
                (self.get_member(&object, &key)?, object)
            }
            _ => (self.evaluate(callee, env)?, Value::Undefined),
        };
        let args = self.evaluate_list(args, env)?;

        if !function.is_callable() {
            return Err(Error::type_error(messages::not_a_function(&describe(callee))));
        }
        self.call(&function, this, &args)
    }

    fn evaluate_new(&mut self, callee: &Expr, args: &[Expr], env: &Env) -> Result<Value> {
        let ctor_value = self.evaluate(callee, env)?;
        let args = self.evaluate_list(args, env)?;
        let not_a_constructor = || Error::type_error(messages::not_a_constructor(&describe(callee)));

        let Value::Object(ctor) = &ctor_value else {
            return Err(not_a_constructor());
        };
        match resolve_callee(&ctor_value) {
            Some(Callee::Closure(closure)) if !closure.function.is_arrow => {
                let mut instance = Object::new(ObjectKind::Ordinary);
                instance.constructor = Some(ctor.clone());
                let this = Value::Object(Rc::new(RefCell::new(instance)));
                let result = self.call_closure(&closure, this.clone(), &args)?;
                Ok(match result {
                    Value::Object(_) => result,
                    _ => this,
                })
            }
            Some(Callee::Native(func)) => func(self, &Value::Undefined, &args),
            _ => Err(not_a_constructor()),
        }
    }

    /// Call a function value with an explicit receiver
    pub fn call(&mut self, callee: &Value, this: Value, args: &[Value]) -> Result<Value> {
        match resolve_callee(callee) {
            Some(Callee::Closure(closure)) => self.call_closure(&closure, this, args),
            Some(Callee::Native(func)) => func(self, &this, args),
            None => Err(Error::type_error(messages::not_a_function(
                &callee.to_display_string(),
            ))),
        }
    }

    fn call_closure(&mut self, closure: &Closure, this: Value, args: &[Value]) -> Result<Value> {
        if self.call_depth >= self.max_call_depth {
            return Err(Error::range_error(messages::MAXIMUM_CALL_STACK));
        }

        let func = &closure.function;
        let scope = Scope::child(&closure.env);
        if !func.is_arrow {
            Scope::define(&scope, THIS_BINDING, this);
        }
        for (i, param) in func.params.iter().enumerate() {
            let value = args.get(i).cloned().unwrap_or(Value::Undefined);
            Scope::declare(&scope, &param.name, value, DeclKind::Var)?;
        }
        if let Some(rest) = &func.rest {
            let rest_values = args.get(func.params.len()..).unwrap_or_default().to_vec();
            Scope::declare(&scope, &rest.name, Value::new_array(rest_values), DeclKind::Var)?;
        }

        self.call_depth += 1;
        let result = match &func.body {
            FunctionBody::Block(b) => match self.execute_block(&b.stmts, &scope) {
                Ok(Completion::Return(v)) => Ok(v),
                Ok(_) => Ok(Value::Undefined),
                Err(e) => Err(e),
            },
            FunctionBody::Expr(e) => self.evaluate(e, &scope),
        };
        self.call_depth -= 1;
        result
    }

    fn evaluate_unary(&mut self, op: UnaryOp, operand: &Expr, env: &Env) -> Result<Value> {
        // typeof tolerates undeclared names
        if let (UnaryOp::TypeOf, Some(name)) = (op, operand.as_ident()) {
            let value = Scope::lookup(env, name).unwrap_or(Value::Undefined);
            return Ok(Value::String(value.type_of().to_string()));
        }

        let value = self.evaluate(operand, env)?;
        match op {
            UnaryOp::Neg => Ok(match value {
                Value::BigInt(n) => Value::BigInt(-n),
                other => Value::Number(-other.to_number()),
            }),
            UnaryOp::Plus => match value {
                Value::BigInt(_) => Err(Error::type_error("Cannot convert a BigInt value to a number")),
                other => Ok(Value::Number(other.to_number())),
            },
            UnaryOp::Not => Ok(Value::Boolean(!value.to_boolean())),
            UnaryOp::TypeOf => Ok(Value::String(value.type_of().to_string())),
            UnaryOp::Void => Ok(Value::Undefined),
        }
    }

    /// Operators that evaluate both operands
    fn binary(&mut self, op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
        use BinaryOp::*;
        match op {
            Add => {
                let stringy = |v: &Value| matches!(v, Value::String(_) | Value::Object(_));
                if stringy(left) || stringy(right) {
                    return Ok(Value::String(left.to_js_string() + &right.to_js_string()));
                }
                arithmetic(op, left, right)
            }
            Sub | Mul | Div | Mod => arithmetic(op, left, right),
            LooseEq => Ok(Value::Boolean(left.equals(right))),
            LooseNotEq => Ok(Value::Boolean(!left.equals(right))),
            StrictEq => Ok(Value::Boolean(left.strict_equals(right))),
            StrictNotEq => Ok(Value::Boolean(!left.strict_equals(right))),
            Lt => Ok(Value::Boolean(compare(left, right) == Some(Ordering::Less))),
            LtEq => Ok(Value::Boolean(matches!(
                compare(left, right),
                Some(Ordering::Less | Ordering::Equal)
            ))),
            Gt => Ok(Value::Boolean(compare(left, right) == Some(Ordering::Greater))),
            GtEq => Ok(Value::Boolean(matches!(
                compare(left, right),
                Some(Ordering::Greater | Ordering::Equal)
            ))),
            In => {
                if !matches!(right, Value::Object(_)) {
                    return Err(Error::type_error(format!(
                        "Cannot use 'in' operator to search for '{}' in {}",
                        left.to_js_string(),
                        right.to_js_string()
                    )));
                }
                Ok(Value::Boolean(right.has_own_property(&left.to_property_key())))
            }
            InstanceOf => Ok(Value::Boolean(self.instance_of(left, right)?)),
            And | Or | Coalesce => Err(Error::compile_invariant(format!(
                "{} must short-circuit",
                op.as_symbol()
            ))),
        }
    }

    /// `value instanceof ctor`
    pub fn instance_of(&self, value: &Value, ctor: &Value) -> Result<bool> {
        let not_callable = || Error::type_error("Right-hand side of 'instanceof' is not callable");
        let Value::Object(ctor_obj) = ctor else {
            return Err(not_callable());
        };
        let Value::Object(obj) = value else {
            return Ok(false);
        };

        let ctor_ref = ctor_obj.borrow();
        match &ctor_ref.kind {
            ObjectKind::Closure(_) => Ok(obj
                .borrow()
                .constructor
                .as_ref()
                .is_some_and(|c| Rc::ptr_eq(c, ctor_obj))),
            ObjectKind::Native { name, .. } => Ok(builtins::has_brand(value, name)),
            _ => Err(not_callable()),
        }
    }

    fn evaluate_assign(&mut self, op: AssignOp, target: &Expr, value: &Expr, env: &Env) -> Result<Value> {
        if let Some(name) = target.as_ident() {
            let value = match op.binary() {
                None => self.evaluate(value, env)?,
                Some(bin) => {
                    let current = self.resolve(name, env)?;
                    let rhs = self.evaluate(value, env)?;
                    self.binary(bin, &current, &rhs)?
                }
            };
            Scope::assign(env, name, value.clone())?;
            return Ok(value);
        }

        let (object, key) = self.member_target(target, env)?;
        let value = match op.binary() {
            None => self.evaluate(value, env)?,
            Some(bin) => {
                let current = self.get_member(&object, &key)?;
                let rhs = self.evaluate(value, env)?;
                self.binary(bin, &current, &rhs)?
            }
        };
        object.set_property(&key, value.clone())?;
        Ok(value)
    }

    // Lowered matches

    fn evaluate_match(&mut self, m: &LoweredMatch, env: &Env) -> Result<Value> {
        let (root, match_env) = match &m.scrutinee {
            ScrutineeBinding::Reuse(id) => (self.resolve(&id.name, env)?, env.clone()),
            ScrutineeBinding::Temp { name, init } => {
                let value = self.evaluate(init, env)?;
                let scope = Scope::child(env);
                Scope::declare(&scope, &name.name, value.clone(), DeclKind::Const)?;
                (value, scope)
            }
        };

        for (index, branch) in m.chain.branches.iter().enumerate() {
            // Holds this attempt's computed-key temporaries
            let branch_env = Scope::child(&match_env);
            let passed = match &branch.test {
                Some(test) => self.test(test, &root, &branch_env)?,
                None => true,
            };
            if !passed {
                continue;
            }
            if let Some(value) = self.run_clause(&branch.scope, &root, &branch_env)? {
                trace!(clause = index, "match clause taken");
                return Ok(value);
            }
            trace!(clause = index, "guard rejected clause");
        }

        match &m.chain.fallback {
            Fallback::Clause(scope) => self
                .run_clause(scope, &root, &match_env)?
                .ok_or_else(|| Error::compile_invariant("fallback clause rejected by a guard")),
            Fallback::Fail { message, location } => {
                debug!(%location, scrutinee = %root.to_display_string(), "no clause matched");
                Err(Error::match_failure(message.clone(), *location))
            }
        }
    }

    /// Run bindings, guard, and body in a fresh scope. `None` when the guard
    /// rejects the clause.
    fn run_clause(&mut self, clause: &ClauseScope, root: &Value, match_env: &Env) -> Result<Option<Value>> {
        let env = Scope::child(match_env);
        for binding in &clause.bindings {
            self.bind(binding, root, &env)?;
        }

        if let Some(guard) = &clause.guard {
            if !self.evaluate(guard, &env)?.to_boolean() {
                return Ok(None);
            }
        }

        let value = match &clause.body {
            ClauseBody::Expr(e) => self.evaluate(e, &env)?,
            ClauseBody::Block(b) => match self.execute_block(&b.stmts, &env)? {
                Completion::Return(v) => v,
                _ => Value::Undefined,
            },
        };
        Ok(Some(value))
    }

    fn place_value(&mut self, place: &Place, root: &Value, env: &Env) -> Result<Value> {
        match place {
            Place::Local(_) => Ok(root.clone()),
            Place::Index(base, index) => {
                let base = self.place_value(base, root, env)?;
                self.get_member(&base, &index.to_string())
            }
            Place::Member(base, name) => {
                let base = self.place_value(base, root, env)?;
                let key = self.property_name(name, env)?;
                self.get_member(&base, &key)
            }
        }
    }

    fn property_name(&mut self, name: &PropertyName, env: &Env) -> Result<String> {
        match name {
            PropertyName::Static(s) => Ok(s.clone()),
            PropertyName::Computed(temp) => Ok(self.resolve(&temp.name, env)?.to_property_key()),
        }
    }

    fn test(&mut self, test: &Test, root: &Value, env: &Env) -> Result<bool> {
        Ok(match test {
            Test::StrictEq { place, literal } => {
                let value = self.place_value(place, root, env)?;
                value.strict_equals(&literal_value(literal)?)
            }
            Test::IsArray(place) => self.place_value(place, root, env)?.is_array(),
            Test::LengthEq { place, length } => {
                let value = self.place_value(place, root, env)?;
                self.get_member(&value, "length")?
                    .strict_equals(&Value::Number(*length as f64))
            }
            Test::TypeOf { place, type_name } => {
                self.place_value(place, root, env)?.type_of() == type_name
            }
            Test::HasOwn { place, key } => {
                let value = self.place_value(place, root, env)?;
                let key = self.property_name(key, env)?;
                value.has_own_property(&key)
            }
            Test::NotUndefined(place) => !self.place_value(place, root, env)?.is_undefined(),
            Test::Protocol { place, matcher } => {
                let value = self.place_value(place, root, env)?;
                let matcher = self.resolve(&matcher.name, env)?;
                self.match_protocol(&matcher, &value)?
            }
            Test::KeyTemp { name, init } => {
                let key = Value::String(self.evaluate(init, env)?.to_property_key());
                Scope::declare(env, &name.name, key, DeclKind::Const)?;
                true
            }
            Test::KeyNe { key, name } => {
                let current = self.resolve(&key.name, env)?;
                let name = self.property_name(name, env)?;
                !current.strict_equals(&Value::String(name))
            }
            Test::And(left, right) => self.test(left, root, env)? && self.test(right, root, env)?,
        })
    }

    /// `(M[Symbol.match] && M[Symbol.match](v) !== null) || (typeof M === "function" && v instanceof M)`
    fn match_protocol(&mut self, matcher: &Value, value: &Value) -> Result<bool> {
        let custom = self.get_member(matcher, SYMBOL_MATCH_KEY)?;
        if custom.to_boolean() {
            let result = self.call(&custom, matcher.clone(), std::slice::from_ref(value))?;
            if !result.is_null() {
                return Ok(true);
            }
        }
        Ok(matcher.type_of() == "function" && self.instance_of(value, matcher)?)
    }

    fn bind(&mut self, binding: &Binding, root: &Value, env: &Env) -> Result<()> {
        match binding {
            Binding::Const { name, init } => {
                let value = self.place_value(init, root, env)?;
                Scope::declare(env, &name.name, value, DeclKind::Const)
            }
            Binding::Slice {
                name,
                source,
                start,
            } => {
                let value = self.place_value(source, root, env)?;
                let elements = value
                    .array_elements()
                    .ok_or_else(|| Error::type_error(format!("{}.slice is not a function", source)))?;
                let rest = elements.get(*start..).unwrap_or_default().to_vec();
                Scope::declare(env, &name.name, Value::new_array(rest), DeclKind::Var)
            }
            Binding::CopyAll { name, source } => {
                let value = self.place_value(source, root, env)?;
                let copy = Value::new_object();
                for key in value.own_keys() {
                    copy.set_property(&key, self.get_member(&value, &key)?)?;
                }
                Scope::declare(env, &name.name, copy, DeclKind::Var)
            }
            Binding::CopyFiltered {
                name,
                source,
                key,
                filter,
            } => {
                let value = self.place_value(source, root, env)?;
                let rest = Value::new_object();
                Scope::declare(env, &name.name, rest.clone(), DeclKind::Var)?;
                Scope::declare(env, &key.name, Value::Undefined, DeclKind::Var)?;
                for k in value.own_keys() {
                    Scope::assign(env, &key.name, Value::String(k.clone()))?;
                    if self.test(filter, root, env)? {
                        rest.set_property(&k, self.get_member(&value, &k)?)?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn resolve_callee(value: &Value) -> Option<Callee> {
    let Value::Object(obj) = value else {
        return None;
    };
    match &obj.borrow().kind {
        ObjectKind::Closure(c) => Some(Callee::Closure(c.clone())),
        ObjectKind::Native { func, .. } => Some(Callee::Native(func.clone())),
        _ => None,
    }
}

/// Convert a literal to its runtime value
pub(crate) fn literal_value(lit: &Literal) -> Result<Value> {
    Ok(match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Boolean(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::String(s.clone()),
        Literal::BigInt(digits) => Value::new_bigint(digits)
            .ok_or_else(|| Error::InternalError(format!("invalid BigInt literal {}", digits)))?,
    })
}

/// The value a host `catch` clause receives for `error`
pub fn error_to_value(error: Error) -> Value {
    match error {
        Error::Thrown(value) => value,
        Error::RuntimeError { kind, message } => Value::new_error(&kind.to_string(), &message),
        Error::MatchFailure { message, .. } => Value::new_error("MatchError", &message),
        other => Value::new_error("Error", &other.to_string()),
    }
}

/// Elements produced by spreading `value`
pub(crate) fn spread_values(value: &Value) -> Result<Vec<Value>> {
    if let Some(elements) = value.array_elements() {
        return Ok(elements);
    }
    match value {
        Value::String(s) => Ok(s.chars().map(|c| Value::String(c.to_string())).collect()),
        other => Err(Error::type_error(format!(
            "{} is not iterable",
            other.to_display_string()
        ))),
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    use num_traits::Zero;
    match (left, right) {
        (Value::BigInt(a), Value::BigInt(b)) => {
            if matches!(op, BinaryOp::Div | BinaryOp::Mod) && b.is_zero() {
                return Err(Error::range_error("Division by zero"));
            }
            Ok(Value::BigInt(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a % b,
            }))
        }
        (Value::BigInt(_), _) | (_, Value::BigInt(_)) => Err(Error::type_error(
            "Cannot mix BigInt and other types, use explicit conversions",
        )),
        _ => {
            let (a, b) = (left.to_number(), right.to_number());
            Ok(Value::Number(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a % b,
            }))
        }
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}

/// Source-ish name of a callee for error messages
fn describe(expr: &Expr) -> String {
    match &expr.unparenthesized().kind {
        ExprKind::Ident(name) => name.clone(),
        ExprKind::Member { object, property } => format!("{}.{}", describe(object), property.name),
        ExprKind::Index { object, .. } => format!("{}[...]", describe(object)),
        ExprKind::This => "this".to_string(),
        _ => "expression".to_string(),
    }
}
