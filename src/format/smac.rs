//! SMAC parameter configuration space (`.pcs`) files.
//!
//! ```text
//! classifier {svm, nn} [svm]
//! LOG2_C [-5.0, 15.0] [5.0]
//! neurons [16, 1024] [128]il
//!
//! LOG2_C | classifier in {svm}
//! neurons | classifier in {nn}
//! ```
//!
//! SMAC understands base-10 log scales (`l`) and integers (`i`) natively.
//! Everything else travels through `LOG<b>_` / `Q<q>_` name prefixes.

use std::collections::HashMap;

use pest::Parser;
use pest::iterators::Pair;

use crate::condition::{Clause, Condition};
use crate::diagnostics::{Diagnostics, Warning};
use crate::domain::{Domain, LogBase, NumericDomain};
use crate::error::{Error, Result};
use crate::format::{
    FormatKind, SpaceFormat, fmt_float, fmt_int, grammar_error, line_of, next_child,
};
use crate::naming::{
    EncodePolicy, decode_numeric, encode_numeric, encoded_name, parse_name, parse_number,
};
use crate::parameter::Parameter;
use crate::space::Searchspace;

mod grammar {
    #![allow(unreachable_pub, clippy::all, clippy::pedantic, clippy::std_instead_of_core)]

    use pest_derive::Parser;

    #[derive(Parser)]
    #[grammar = "format/pcs.pest"]
    pub(super) struct PcsGrammar;
}

use grammar::{PcsGrammar, Rule};

/// Characters that cannot appear in a categorical choice.
const RESERVED: [char; 4] = [',', '{', '}', '#'];

/// Reader and writer for SMAC PCS files.
///
/// # Example
///
/// ```
/// use hpo_convert::diagnostics::Diagnostics;
/// use hpo_convert::format::{SmacFormat, SpaceFormat};
///
/// let pcs = "x [-5, 10] [2.5]\ny [0, 15] [7.5]";
/// let mut diag = Diagnostics::new();
/// let space = SmacFormat::new().read(pcs, &mut diag).unwrap();
/// assert_eq!(space.len(), 2);
///
/// let written = SmacFormat::new().write(&space, &mut diag).unwrap();
/// assert_eq!(written, "x [-5.0, 10.0] [2.5]\ny [0.0, 15.0] [7.5]");
/// ```
#[derive(Clone, Debug)]
pub struct SmacFormat {
    native_log10: bool,
}

impl Default for SmacFormat {
    fn default() -> Self {
        Self { native_log10: true }
    }
}

impl SmacFormat {
    /// Creates a SMAC format that writes base-10 logs with the `l` flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether base-10 log scales are written with the native `l` flag
    /// (default) or as a `LOG10_` prefix over log-space bounds.
    #[must_use]
    pub fn native_log10(mut self, enabled: bool) -> Self {
        self.native_log10 = enabled;
        self
    }

    fn policy(&self) -> EncodePolicy {
        EncodePolicy {
            native_log: self.native_log10.then_some(LogBase::Integer(10)),
            native_q: false,
        }
    }
}

impl SpaceFormat for SmacFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Smac
    }

    fn read(&self, text: &str, diag: &mut Diagnostics) -> Result<Searchspace> {
        let text = text.replace(['"', '\''], "");
        let file = PcsGrammar::parse(Rule::file, &text).map_err(|err| grammar_error(&err))?;
        let mut space = Searchspace::new();
        let mut conditions: Vec<(usize, String, Condition)> = Vec::new();

        for line in file.flat_map(Pair::into_inner) {
            let line_no = line_of(&line);
            match line.as_rule() {
                Rule::forbidden => diag.push(Warning::SkippedForbiddenClause {
                    clause: line.as_str().to_owned(),
                }),
                Rule::condition => {
                    let (child, condition) = read_condition(line, line_no)?;
                    conditions.push((line_no, child, condition));
                }
                Rule::categorical => space.insert(read_categorical(line, line_no, diag)?)?,
                Rule::numeric => space.insert(read_numeric(line, line_no)?)?,
                _ => {}
            }
        }

        // All conditions on one child form a single conjunction.
        let mut clauses: HashMap<String, Clause> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for (line_no, child, mut condition) in conditions {
            let child = resolve_name(&space, &child)?;
            condition.parent = resolve_name(&space, &condition.parent)?;
            if !space.contains(&child) {
                return Err(Error::parse(
                    line_no,
                    format!("condition on undefined parameter '{child}'"),
                ));
            }
            if let Some(Domain::Categorical { choices }) =
                space.get(&condition.parent).map(Parameter::domain)
                && let Some(bad) = condition.values.iter().find(|v| !choices.contains(v))
            {
                return Err(Error::parse(
                    line_no,
                    format!("'{bad}' is not a choice of {}", condition.parent),
                ));
            }
            if !clauses.contains_key(&child) {
                order.push(child.clone());
            }
            clauses.entry(child).or_default().push(condition);
        }
        for child in order {
            if let (Some(clause), Some(param)) = (clauses.remove(&child), space.get_mut(&child)) {
                *param.clauses_mut() = vec![clause];
            }
        }
        space.validate_conditions()?;

        trace_debug!(
            n_params = space.len(),
            n_conditional = space.n_conditional(),
            "read SMAC space"
        );
        Ok(space)
    }

    fn write(&self, space: &Searchspace, diag: &mut Diagnostics) -> Result<String> {
        let policy = self.policy();
        let mut param_lines = Vec::with_capacity(space.len());
        let mut condition_lines = Vec::new();

        for param in space {
            param_lines.push(build_param(param, policy)?);

            match param.clauses() {
                [] => {}
                [clause] => {
                    let child = encoded_name(param.name(), param.domain(), policy);
                    for condition in clause.conditions() {
                        let parent = space.get(&condition.parent).map_or_else(
                            || condition.parent.clone(),
                            |p| encoded_name(p.name(), p.domain(), policy),
                        );
                        condition_lines.push(format!(
                            "{child} | {parent} in {{{}}}",
                            condition.values.join(", ")
                        ));
                    }
                }
                clauses => {
                    let condition = clauses
                        .iter()
                        .map(|c| format!("({c})"))
                        .collect::<Vec<_>>()
                        .join(" || ");
                    diag.push(Warning::DroppedCondition {
                        name: param.name().to_owned(),
                        condition,
                        reason: "SMAC cannot express OR conditions".to_owned(),
                    });
                }
            }
        }

        let mut out = param_lines.join("\n");
        if !condition_lines.is_empty() {
            out.push_str("\n\n");
            out.push_str(&condition_lines.join("\n"));
        }
        Ok(out)
    }
}

/// Maps a name used in a condition to the parameter it refers to. A name
/// that is already defined is taken as is, so a categorical called
/// `LOG_level` is not mistaken for a transformed numeric.
fn resolve_name(space: &Searchspace, raw: &str) -> Result<String> {
    if space.contains(raw) {
        Ok(raw.to_owned())
    } else {
        Ok(parse_name(raw)?.name)
    }
}

fn read_condition(pair: Pair<'_, Rule>, line: usize) -> Result<(String, Condition)> {
    let mut inner = pair.into_inner();
    let child = next_child(&mut inner, line)?.as_str().to_owned();
    let parent = next_child(&mut inner, line)?.as_str();
    let test = next_child(&mut inner, line)?;
    if test.as_rule() == Rule::comparison {
        return Err(Error::UnsupportedCondition {
            name: child,
            condition: format!("{parent} {}", test.as_str().trim()),
        });
    }
    let values: Vec<&str> = test.into_inner().map(|v| v.as_str()).collect();
    Ok((child, Condition::one_of(parent, values)))
}

fn read_categorical(
    pair: Pair<'_, Rule>,
    line: usize,
    diag: &mut Diagnostics,
) -> Result<Parameter> {
    let mut inner = pair.into_inner();
    let name = next_child(&mut inner, line)?.as_str();
    let mut choices: Vec<String> = inner.map(|v| v.as_str().to_owned()).collect();
    let default = choices
        .pop()
        .ok_or_else(|| Error::parse(line, format!("missing default for {name}")))?;

    if choices.first().is_some_and(|first| *first != default) {
        if !choices.contains(&default) {
            return Err(Error::parse(
                line,
                format!("default '{default}' of {name} is not one of its choices"),
            ));
        }
        diag.push(Warning::IgnoredDefault {
            name: name.to_owned(),
            default,
        });
    }
    Ok(Parameter::new(name, Domain::Categorical { choices }))
}

fn read_numeric(pair: Pair<'_, Rule>, line: usize) -> Result<Parameter> {
    let mut inner = pair.into_inner();
    let raw_name = next_child(&mut inner, line)?.as_str();
    let lower = number(&next_child(&mut inner, line)?)?;
    let upper = number(&next_child(&mut inner, line)?)?;
    number(&next_child(&mut inner, line)?)?;
    let flags = inner.next().map_or("", |f| f.as_str());

    let mut domain = NumericDomain::new(lower, upper);
    if flags.contains('l') {
        domain.base = Some(LogBase::Integer(10));
    }
    let (name, domain) = decode_numeric(raw_name, domain)?;
    let domain = if flags.contains('i') {
        Domain::Integer(domain)
    } else {
        Domain::Float(domain)
    };
    Ok(Parameter::new(name, domain))
}

fn number(pair: &Pair<'_, Rule>) -> Result<f64> {
    let text = pair.as_str();
    parse_number(text)
        .ok_or_else(|| Error::parse(line_of(pair), format!("'{text}' is not a number")))
}

fn build_param(param: &Parameter, policy: EncodePolicy) -> Result<String> {
    let (numeric, integer) = match param.domain() {
        Domain::Categorical { choices } => return build_categorical(param.name(), choices),
        Domain::Integer(n) => (n, true),
        Domain::Float(n) => (n, false),
    };
    let encoded = encode_numeric(param.name(), numeric, integer, policy);
    let default = encoded.default_value()?;
    let log_flag = if encoded.native_log.is_some() { "l" } else { "" };
    Ok(if encoded.integer {
        format!(
            "{} [{}, {}] [{}]i{log_flag}",
            encoded.name,
            fmt_int(encoded.lower),
            fmt_int(encoded.upper),
            fmt_int(default)
        )
    } else {
        format!(
            "{} [{}, {}] [{}]{log_flag}",
            encoded.name,
            fmt_float(encoded.lower),
            fmt_float(encoded.upper),
            fmt_float(default)
        )
    })
}

fn build_categorical(name: &str, choices: &[String]) -> Result<String> {
    if let Some(bad) = choices
        .iter()
        .find(|c| c.contains(char::is_whitespace) || c.contains(RESERVED))
    {
        return Err(Error::unsupported(
            name,
            format!("choice '{bad}' cannot be written to a PCS file"),
        ));
    }
    let default = choices.first().map_or("", String::as_str);
    Ok(format!("{name} {{{}}} [{default}]", choices.join(", ")))
}
