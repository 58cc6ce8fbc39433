//! Tree-walking evaluator.
//!
//! Each block executes in a fresh environment chained to its enclosing
//! block. A function call builds its frame on top of the function's
//! *defining* environment, so free variables resolve lexically. `return`
//! short-circuits outward through nested blocks until the enclosing call
//! (or the program itself) consumes it.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::ScriptError;
use crate::ast::{BinOp, Expr, ExprKind, Stmt, StmtKind};
use crate::env::{Env, EnvRef};
use crate::value::{Closure, Value};

/// What the interpreter does with `print` output and `exec` commands.
pub trait ScriptHost {
    fn print(&mut self, text: &str);
    fn exec(&mut self, command: &str);
}

enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter<'h> {
    host: &'h mut dyn ScriptHost,
}

fn err(line: u32, message: String) -> ScriptError {
    ScriptError { line, message }
}

impl<'h> Interpreter<'h> {
    pub fn new(host: &'h mut dyn ScriptHost) -> Self {
        Interpreter { host }
    }

    /// Runs a program in a fresh global scope. A top-level `return`
    /// terminates execution early.
    pub fn run(&mut self, program: &[Stmt]) -> Result<(), ScriptError> {
        let globals = Env::new(None);
        self.exec_stmts(&globals, program)?;
        Ok(())
    }

    fn exec_stmts(&mut self, env: &EnvRef, stmts: &[Stmt]) -> Result<Flow, ScriptError> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec_stmt(env, stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, env: &EnvRef, stmt: &Stmt) -> Result<Flow, ScriptError> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval_expr(env, expr)?;
                Ok(Flow::Normal)
            }
            StmtKind::Declare { name } => {
                self.check_redefinition(env, name, stmt.line)?;
                env.borrow_mut().define(name, Value::Null);
                Ok(Flow::Normal)
            }
            StmtKind::Define { name, value } => {
                self.check_redefinition(env, name, stmt.line)?;
                let value = self.eval_expr(env, value)?;
                env.borrow_mut().define(name, value);
                Ok(Flow::Normal)
            }
            StmtKind::Assign { name, value } => {
                match Env::get(env, name) {
                    None => {
                        return Err(err(stmt.line, format!("Undefined \"{name}\"")));
                    }
                    Some(Value::Function(_)) => {
                        return Err(err(
                            stmt.line,
                            String::from("Cannot assign values to a function"),
                        ));
                    }
                    Some(_) => {}
                }

                let value = self.eval_expr(env, value)?;
                Env::assign(env, name, value);
                Ok(Flow::Normal)
            }
            StmtKind::Block(body) => {
                let scope = Env::new(Some(env.clone()));
                self.exec_stmts(&scope, body)
            }
            StmtKind::Function(func) => {
                self.check_redefinition(env, &func.name, stmt.line)?;
                let closure = Closure {
                    func: func.clone(),
                    env: env.clone(),
                };
                env.borrow_mut().define(&func.name, Value::Function(closure));
                Ok(Flow::Normal)
            }
            StmtKind::Return(expr) => {
                let value = self.eval_expr(env, expr)?;
                Ok(Flow::Return(value))
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(env, cond)?.is_truthy() {
                    self.exec_stmt(env, then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(env, else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
        }
    }

    fn check_redefinition(
        &self,
        env: &EnvRef,
        name: &str,
        line: u32,
    ) -> Result<(), ScriptError> {
        if !env.borrow().has_local(name) {
            return Ok(());
        }
        let message = match Env::get(env, name) {
            Some(Value::Function(_)) => {
                "Function with the same name already defined in this scope"
            }
            _ => "Variable already defined in this scope",
        };
        Err(err(line, String::from(message)))
    }

    fn eval_expr(&mut self, env: &EnvRef, expr: &Expr) -> Result<Value, ScriptError> {
        match &expr.kind {
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Bool(value) => Ok(Value::Bool(*value)),
            ExprKind::Int(value) => Ok(Value::Int(*value)),
            ExprKind::Float(value) => Ok(Value::Float(*value)),
            ExprKind::Str(value) => Ok(Value::Str(value.clone())),
            ExprKind::Ident(name) => Env::get(env, name)
                .ok_or_else(|| err(expr.line, format!("Undefined \"{name}\""))),
            ExprKind::Binary { op, left, right } => {
                let left = self.eval_expr(env, left)?;
                let right = self.eval_expr(env, right)?;
                eval_binary(*op, left, right, expr.line)
            }
            ExprKind::Call { callee, args } => self.eval_call(env, callee, args, expr.line),
        }
    }

    fn eval_call(
        &mut self,
        env: &EnvRef,
        callee: &Expr,
        args: &[Expr],
        line: u32,
    ) -> Result<Value, ScriptError> {
        let ExprKind::Ident(name) = &callee.kind else {
            return Err(err(line, String::from("Expression is not callable")));
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(env, arg)?);
        }

        // built-ins shadow user definitions
        match name.as_str() {
            "print" => return self.builtin_print(&values, false),
            "println" => return self.builtin_print(&values, true),
            "exec" => return self.builtin_exec(&values, line),
            "as_str" => return builtin_as_str(&values, line),
            "as_int" => return builtin_as_int(&values, line),
            "as_float" => return builtin_as_float(&values, line),
            "type_name" => return builtin_type_name(&values, line),
            _ => {}
        }

        let closure = match Env::get(env, name) {
            None => return Err(err(line, format!("Undefined call \"{name}\""))),
            Some(Value::Function(closure)) => closure,
            Some(_) => {
                return Err(err(line, format!("Variable \"{name}\" is not callable")));
            }
        };

        if values.len() < closure.func.params.len() {
            return Err(err(
                line,
                format!(
                    "Function \"{}\" takes {} argument(s), got {}",
                    name,
                    closure.func.params.len(),
                    values.len()
                ),
            ));
        }

        // excess arguments are ignored
        let frame = Env::new(Some(closure.env.clone()));
        for (param, value) in closure.func.params.iter().zip(values) {
            frame.borrow_mut().define(param, value);
        }

        match self.exec_stmts(&frame, &closure.func.body)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
        }
    }

    fn builtin_print(&mut self, args: &[Value], newline: bool) -> Result<Value, ScriptError> {
        for arg in args {
            let text = arg.display();
            self.host.print(&text);
        }
        if newline {
            self.host.print("\n");
        }
        Ok(Value::Null)
    }

    fn builtin_exec(&mut self, args: &[Value], line: u32) -> Result<Value, ScriptError> {
        expect_one(args, "exec", line)?;
        match &args[0] {
            Value::Str(command) => {
                self.host.exec(command);
                Ok(Value::Null)
            }
            _ => Err(err(
                line,
                String::from("Function exec() expects string argument"),
            )),
        }
    }
}

fn expect_one(args: &[Value], name: &str, line: u32) -> Result<(), ScriptError> {
    if args.len() != 1 {
        return Err(err(
            line,
            format!("Function {name}() takes 1 argument, got {}", args.len()),
        ));
    }
    Ok(())
}

fn builtin_as_str(args: &[Value], line: u32) -> Result<Value, ScriptError> {
    expect_one(args, "as_str", line)?;
    match &args[0] {
        Value::Function(_) => Err(err(line, String::from("Unsupported type"))),
        value => Ok(Value::Str(value.display())),
    }
}

fn builtin_as_int(args: &[Value], line: u32) -> Result<Value, ScriptError> {
    expect_one(args, "as_int", line)?;
    let value = match &args[0] {
        Value::Int(value) => *value,
        Value::Bool(value) => *value as i32,
        Value::Float(value) => *value as i32,
        Value::Null => 0,
        // parsed as a double, then truncated
        Value::Str(text) => text.trim().parse::<f64>().unwrap_or(0.0) as i32,
        Value::Function(_) => return Err(err(line, String::from("Unsupported type"))),
    };
    Ok(Value::Int(value))
}

fn builtin_as_float(args: &[Value], line: u32) -> Result<Value, ScriptError> {
    expect_one(args, "as_float", line)?;
    let value = match &args[0] {
        Value::Float(value) => *value,
        Value::Int(value) => *value as f64,
        Value::Bool(value) => *value as i32 as f64,
        Value::Null => 0.0,
        Value::Str(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        Value::Function(_) => return Err(err(line, String::from("Unsupported type"))),
    };
    Ok(Value::Float(value))
}

fn builtin_type_name(args: &[Value], line: u32) -> Result<Value, ScriptError> {
    expect_one(args, "type_name", line)?;
    Ok(Value::Str(String::from(args[0].type_name())))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Int(value) => Some(*value as f64),
        Value::Float(value) => Some(*value as f64),
        _ => None,
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Str(l), Value::Str(r)) => l == r,
        _ => match (as_number(left), as_number(right)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        },
    }
}

fn eval_binary(op: BinOp, left: Value, right: Value, line: u32) -> Result<Value, ScriptError> {
    let unsupported = || err(line, String::from("Unsupported operation"));

    match op {
        BinOp::Eq => return Ok(Value::Bool(values_equal(&left, &right))),
        BinOp::Ne => return Ok(Value::Bool(!values_equal(&left, &right))),
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
            let (Some(l), Some(r)) = (as_number(&left), as_number(&right)) else {
                return Err(unsupported());
            };
            let result = match op {
                BinOp::Lt => l < r,
                BinOp::Gt => l > r,
                BinOp::Le => l <= r,
                _ => l >= r,
            };
            return Ok(Value::Bool(result));
        }
        _ => {}
    }

    match op {
        BinOp::Add => match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l.wrapping_add(*r))),
            (Value::Str(l), Value::Str(r)) => {
                let mut out = l.clone();
                out.push_str(r);
                Ok(Value::Str(out))
            }
            _ => {
                let (Some(l), Some(r)) = (as_number(&left), as_number(&right)) else {
                    return Err(unsupported());
                };
                Ok(Value::Float(l + r))
            }
        },
        BinOp::Sub => match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l.wrapping_sub(*r))),
            _ => {
                let (Some(l), Some(r)) = (as_number(&left), as_number(&right)) else {
                    return Err(unsupported());
                };
                Ok(Value::Float(l - r))
            }
        },
        BinOp::Mul => match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l.wrapping_mul(*r))),
            (Value::Int(count), Value::Str(text)) | (Value::Str(text), Value::Int(count)) => {
                // negative counts clamp to the empty string
                Ok(Value::Str(text.repeat((*count).max(0) as usize)))
            }
            _ => {
                let (Some(l), Some(r)) = (as_number(&left), as_number(&right)) else {
                    return Err(unsupported());
                };
                Ok(Value::Float(l * r))
            }
        },
        BinOp::Div => {
            let (Some(l), Some(r)) = (as_number(&left), as_number(&right)) else {
                return Err(unsupported());
            };
            if r == 0.0 {
                return Err(err(line, String::from("Zero division")));
            }
            Ok(Value::Float(l / r))
        }
        BinOp::Mod => {
            let (Some(l), Some(r)) = (as_number(&left), as_number(&right)) else {
                return Err(unsupported());
            };
            let (l, r) = (l as i32, r as i32);
            if r == 0 {
                return Err(err(line, String::from("Modulo by zero")));
            }
            Ok(Value::Int(l.wrapping_rem(r)))
        }
        // comparisons were handled above
        _ => Err(unsupported()),
    }
}
