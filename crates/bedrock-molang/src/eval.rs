//! Lazy evaluation of a parsed expression.

use std::collections::HashMap;

use crate::ast::{BinaryOp, Expr, UnaryOp, Value};

/// Named inputs for an evaluation. Names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    numbers: HashMap<String, f64>,
    booleans: HashMap<String, bool>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from caller-owned maps.
    pub fn from_maps(numbers: &HashMap<String, f64>, booleans: &HashMap<String, bool>) -> Self {
        let mut vars = Self::new();
        for (name, value) in numbers {
            vars.set_number(name, *value);
        }
        for (name, value) in booleans {
            vars.set_boolean(name, *value);
        }
        vars
    }

    pub fn with_number(mut self, name: &str, value: f64) -> Self {
        self.set_number(name, value);
        self
    }

    pub fn with_boolean(mut self, name: &str, value: bool) -> Self {
        self.set_boolean(name, value);
        self
    }

    pub fn set_number(&mut self, name: &str, value: f64) {
        self.numbers.insert(name.to_ascii_lowercase(), value);
    }

    pub fn set_boolean(&mut self, name: &str, value: bool) {
        self.booleans.insert(name.to_ascii_lowercase(), value);
    }

    /// Booleans shadow numbers of the same name.
    fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(b) = self.booleans.get(name) {
            return Some(Value::Bool(*b));
        }
        self.numbers.get(name).map(|n| Value::Number(*n))
    }
}

impl Expr {
    /// Evaluate against `vars`. Never fails: unknown names read as 0.
    pub fn eval(&self, vars: &Variables) -> Value {
        match self {
            Expr::Number(n) => Value::Number(*n),
            Expr::Bool(b) => Value::Bool(*b),
            Expr::Ident(name) => vars.lookup(name).unwrap_or(Value::Number(0.0)),
            Expr::Call { name, args } => Value::Number(call_builtin(name, args, vars)),
            Expr::Unary { op, expr } => {
                let value = expr.eval(vars);
                match op {
                    UnaryOp::Plus => value,
                    UnaryOp::Neg => Value::Number(-value.as_number()),
                    UnaryOp::Not => Value::Bool(!value.as_bool()),
                }
            }
            Expr::Binary { left, op, right } => eval_binary(left, *op, right, vars),
            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                if condition.eval(vars).as_bool() {
                    then_branch.eval(vars)
                } else {
                    else_branch.eval(vars)
                }
            }
        }
    }
}

fn eval_binary(left: &Expr, op: BinaryOp, right: &Expr, vars: &Variables) -> Value {
    // Logical operators short-circuit, so the right side may never run.
    match op {
        BinaryOp::And => {
            return Value::Bool(left.eval(vars).as_bool() && right.eval(vars).as_bool())
        }
        BinaryOp::Or => {
            return Value::Bool(left.eval(vars).as_bool() || right.eval(vars).as_bool())
        }
        _ => {}
    }

    let lhs = left.eval(vars).as_number();
    let rhs = right.eval(vars).as_number();
    match op {
        BinaryOp::Add => Value::Number(lhs + rhs),
        BinaryOp::Sub => Value::Number(lhs - rhs),
        BinaryOp::Mul => Value::Number(lhs * rhs),
        BinaryOp::Div => Value::Number(if rhs == 0.0 { 0.0 } else { lhs / rhs }),
        BinaryOp::Mod => Value::Number(if rhs == 0.0 { 0.0 } else { lhs % rhs }),
        BinaryOp::Eq => Value::Bool(lhs == rhs),
        BinaryOp::Ne => Value::Bool(lhs != rhs),
        BinaryOp::Lt => Value::Bool(lhs < rhs),
        BinaryOp::Le => Value::Bool(lhs <= rhs),
        BinaryOp::Gt => Value::Bool(lhs > rhs),
        BinaryOp::Ge => Value::Bool(lhs >= rhs),
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

/// Built-in function table. Unknown functions evaluate to 0.
fn call_builtin(name: &str, args: &[Expr], vars: &Variables) -> f64 {
    let n = |i: usize| args.get(i).map(|a| a.eval(vars).as_number()).unwrap_or(0.0);
    let name = name.strip_prefix("math.").unwrap_or(name);
    match name {
        "sin" => n(0).sin(),
        "cos" => n(0).cos(),
        "sqrt" => n(0).max(0.0).sqrt(),
        "abs" => n(0).abs(),
        "pow" => n(0).powf(n(1)),
        "min" => n(0).min(n(1)),
        "max" => n(0).max(n(1)),
        "mod" => {
            let divisor = n(1);
            if divisor == 0.0 {
                0.0
            } else {
                n(0) % divisor
            }
        }
        "lerp" => {
            let (a, b, t) = (n(0), n(1), n(2));
            a + (b - a) * t
        }
        _ => 0.0,
    }
}
