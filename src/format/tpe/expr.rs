//! The subset of Python that hyperopt search-space modules are written in.
//!
//! Modules are evaluated, never executed: bindings are folded into
//! [`Value`]s, numeric helpers (`np.log`, `math.exp`, ...) are applied
//! eagerly, and every other call stays symbolic as a [`Value::Apply`] for the
//! space walk to interpret.

use std::collections::HashMap;

use pest::Parser;
use pest::iterators::Pair;

use crate::error::{Error, Result};
use crate::format::{grammar_error, line_of, next_child};
use crate::naming::parse_number;

mod grammar {
    #![allow(unreachable_pub, clippy::all, clippy::pedantic, clippy::std_instead_of_core)]

    use pest_derive::Parser;

    #[derive(Parser)]
    #[grammar = "format/tpe/pyll.pest"]
    pub(super) struct PyllGrammar;
}

use grammar::{PyllGrammar, Rule};

/// Namespaces whose numeric helpers are evaluated eagerly.
const NUMERIC_MODULES: [&str; 3] = ["np", "numpy", "math"];

/// A folded Python expression.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Value {
    None,
    Bool(bool),
    Number(f64),
    Str(String),
    /// Lists and tuples.
    List(Vec<Value>),
    /// Dict entries in source order.
    Dict(Vec<(Value, Value)>),
    /// An unbound dotted name such as `hp.uniform`.
    Path(Vec<String>),
    /// A symbolic call or operator.
    Apply {
        func: String,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    },
}

impl Value {
    pub(crate) fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub(crate) fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    fn apply(func: impl Into<String>, args: Vec<Value>) -> Self {
        Value::Apply {
            func: func.into(),
            args,
            kwargs: Vec::new(),
        }
    }
}

/// Evaluates a module into its top-level bindings.
pub(crate) fn evaluate_module(text: &str) -> Result<HashMap<String, Value>> {
    let file = PyllGrammar::parse(Rule::file, text).map_err(|err| grammar_error(&err))?;
    let mut evaluator = Evaluator::default();
    for statement in file.flat_map(Pair::into_inner) {
        if statement.as_rule() != Rule::binding {
            continue;
        }
        let line = line_of(&statement);
        let mut inner = statement.into_inner();
        let name = next_child(&mut inner, line)?.as_str().to_owned();
        let value = evaluator.eval(next_child(&mut inner, line)?)?;
        evaluator.env.insert(name, value);
    }
    Ok(evaluator.env)
}

/// Evaluates a single expression.
#[cfg(test)]
pub(crate) fn evaluate(text: &str) -> Result<Value> {
    let mut pairs =
        PyllGrammar::parse(Rule::expression, text).map_err(|err| grammar_error(&err))?;
    let expression = next_child(&mut pairs, 1)?;
    let expr = next_child(&mut expression.into_inner(), 1)?;
    Evaluator::default().eval(expr)
}

/// Folds grammar nodes into values against the bindings seen so far.
#[derive(Default)]
struct Evaluator {
    env: HashMap<String, Value>,
}

impl Evaluator {
    fn eval(&self, pair: Pair<'_, Rule>) -> Result<Value> {
        let line = line_of(&pair);
        match pair.as_rule() {
            Rule::expr | Rule::term => {
                let mut inner = pair.into_inner();
                let mut left = self.eval(next_child(&mut inner, line)?)?;
                while let Some(op) = inner.next() {
                    let right = self.eval(next_child(&mut inner, line)?)?;
                    let op = match op.as_str() {
                        "+" => "add",
                        "-" => "sub",
                        "*" => "mul",
                        _ => "truediv",
                    };
                    left = binary(op, left, right, line)?;
                }
                Ok(left)
            }
            Rule::unary => {
                let mut negations = 0;
                let mut value = Value::None;
                for child in pair.into_inner() {
                    match child.as_rule() {
                        Rule::sign => negations += usize::from(child.as_str() == "-"),
                        _ => value = self.eval(child)?,
                    }
                }
                for _ in 0..negations {
                    value = match value {
                        Value::Number(n) => Value::Number(-n),
                        other => Value::apply("operator.neg", vec![other]),
                    };
                }
                Ok(value)
            }
            Rule::power => {
                let mut inner = pair.into_inner();
                let base = self.eval(next_child(&mut inner, line)?)?;
                match inner.next() {
                    Some(exponent) => binary("pow", base, self.eval(exponent)?, line),
                    None => Ok(base),
                }
            }
            Rule::postfix => {
                let mut inner = pair.into_inner();
                let mut value = self.eval(next_child(&mut inner, line)?)?;
                for suffix in inner {
                    let line = line_of(&suffix);
                    value = match (suffix.as_rule(), value) {
                        (Rule::attribute, Value::Path(mut path)) => {
                            let attr = next_child(&mut suffix.into_inner(), line)?;
                            path.push(attr.as_str().to_owned());
                            Value::Path(path)
                        }
                        (Rule::attribute, _) => {
                            let message =
                                format!("attribute {} on a computed value", suffix.as_str());
                            return Err(Error::parse(line, message));
                        }
                        (_, func) => self.call(func, suffix, line)?,
                    };
                }
                Ok(value)
            }
            Rule::number => {
                let literal = pair.as_str().replace('_', "");
                parse_number(&literal)
                    .map(Value::Number)
                    .ok_or_else(|| Error::parse(line, format!("invalid number '{literal}'")))
            }
            Rule::strings => Ok(Value::Str(
                pair.into_inner()
                    .filter_map(|string| string.into_inner().next())
                    .map(|text| unescape(text.as_str()))
                    .collect(),
            )),
            Rule::identifier => Ok(match pair.as_str() {
                "None" => Value::None,
                "True" => Value::Bool(true),
                "False" => Value::Bool(false),
                name => self
                    .env
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| Value::Path(vec![name.to_owned()])),
            }),
            Rule::group => self.eval(next_child(&mut pair.into_inner(), line)?),
            Rule::tuple | Rule::list => Ok(Value::List(
                pair.into_inner()
                    .map(|item| self.eval(item))
                    .collect::<Result<_>>()?,
            )),
            Rule::dict => {
                let mut entries = Vec::new();
                for entry in pair.into_inner() {
                    let mut inner = entry.into_inner();
                    let key = self.eval(next_child(&mut inner, line)?)?;
                    let value = self.eval(next_child(&mut inner, line)?)?;
                    entries.push((key, value));
                }
                Ok(Value::Dict(entries))
            }
            other => Err(Error::parse(line, format!("unexpected {other:?}"))),
        }
    }

    fn call(&self, func: Value, arguments: Pair<'_, Rule>, line: usize) -> Result<Value> {
        let Value::Path(path) = func else {
            return Err(Error::parse(line, "only named functions can be called"));
        };
        let mut args = Vec::new();
        let mut kwargs = Vec::new();
        for argument in arguments.into_inner() {
            if argument.as_rule() == Rule::kwarg {
                let mut inner = argument.into_inner();
                let name = next_child(&mut inner, line)?.as_str().to_owned();
                kwargs.push((name, self.eval(next_child(&mut inner, line)?)?));
            } else if kwargs.is_empty() {
                args.push(self.eval(argument)?);
            } else {
                return Err(Error::parse(
                    line,
                    "positional argument follows keyword argument",
                ));
            }
        }
        if kwargs.is_empty()
            && let Some(number) = eager(&path, &args, line)?
        {
            return Ok(Value::Number(number));
        }
        Ok(Value::Apply {
            func: path.join("."),
            args,
            kwargs,
        })
    }
}

fn binary(op: &str, left: Value, right: Value, line: usize) -> Result<Value> {
    if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
        let value = match op {
            "add" => a + b,
            "sub" => a - b,
            "mul" => a * b,
            "truediv" => a / b,
            _ => a.powf(b),
        };
        if !value.is_finite() {
            return Err(Error::parse(line, format!("{op} of {a} and {b} is not finite")));
        }
        return Ok(Value::Number(value));
    }
    if let (Value::Str(a), Value::Str(b), "add") = (&left, &right, op) {
        return Ok(Value::Str(format!("{a}{b}")));
    }
    Ok(Value::apply(format!("operator.{op}"), vec![left, right]))
}

/// Applies numeric helpers to numeric arguments.
fn eager(path: &[String], args: &[Value], line: usize) -> Result<Option<f64>> {
    let numbers: Option<Vec<f64>> = args.iter().map(Value::as_number).collect();
    let Some(numbers) = numbers else {
        return Ok(None);
    };
    let func = match path {
        [module, func] if NUMERIC_MODULES.contains(&module.as_str()) => func.as_str(),
        [func] if func == "float" || func == "int" => func.as_str(),
        _ => return Ok(None),
    };
    let value = match (func, numbers.as_slice()) {
        ("log", [x]) => x.ln(),
        ("log", [x, base]) => x.ln() / base.ln(),
        ("log2", [x]) => x.log2(),
        ("log10", [x]) => x.log10(),
        ("exp", [x]) => x.exp(),
        ("sqrt", [x]) => x.sqrt(),
        ("float", [x]) => *x,
        ("int", [x]) => x.trunc(),
        _ => return Ok(None),
    };
    if value.is_finite() {
        Ok(Some(value))
    } else {
        Err(Error::parse(line, format!("{}(..) is not finite", path.join("."))))
    }
}

/// Resolves backslash escapes; an escaped newline continues the line.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\n') | None => {}
            Some(other) => out.push(other),
        }
    }
    out
}
