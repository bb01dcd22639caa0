//! TPE / hyperopt search spaces written as Python modules (`space.py`).
//!
//! ```text
//! from hyperopt import hp
//! import hyperopt.pyll as pyll
//!
//! LOG2_C = hp.uniform("LOG2_C", -5.0, 15.0)
//! neurons = pyll.scope.int(hp.quniform("neurons", 16.0, 1024.0, 16.0))
//! classifier = hp.choice("classifier", [
//!     {"classifier": "svm", "LOG2_C": LOG2_C, },
//!     {"classifier": "nn", "neurons": neurons, },
//!     ])
//!
//! space = {"classifier": classifier}
//! ```
//!
//! hyperopt has natural-log and quantized distributions built in. Conditions
//! are not declared but expressed by nesting a parameter inside the branch
//! of the choice it depends on. Reading walks the nesting back into clauses,
//! the way hyperopt itself collects labels from a space.

mod expr;

use std::collections::{HashMap, HashSet};

use crate::condition::{Clause, Condition, merge_clauses};
use crate::diagnostics::{Diagnostics, Warning};
use crate::domain::{Domain, LogBase, NumericDomain, tidy};
use crate::error::{Error, Result};
use crate::format::{FormatKind, SpaceFormat, fmt_float, fmt_int};
use crate::naming::{EncodePolicy, decode_numeric, encode_numeric, encoded_name};
use crate::parameter::Parameter;
use crate::space::Searchspace;

use self::expr::{Value, evaluate_module};

const HEADER: &str = "from hyperopt import hp\nimport hyperopt.pyll as pyll\n\n";

const POLICY: EncodePolicy = EncodePolicy {
    native_log: Some(LogBase::Natural),
    native_q: true,
};

/// Widest `hp.randint` range still read as a categorical of its integers.
/// Wider ranges (e.g. `hp.randint("seed", 2**31)`) become an integer domain.
const RANDINT_MAX_CHOICES: f64 = 1000.0;

const PYTHON_KEYWORDS: [&str; 35] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Reader and writer for hyperopt search-space modules.
///
/// # Example
///
/// ```
/// use hpo_convert::diagnostics::Diagnostics;
/// use hpo_convert::format::{SpaceFormat, TpeFormat};
/// use hpo_convert::{Parameter, Searchspace};
///
/// let space = Searchspace::from_parameters([
///     Parameter::float("a", 0.0, 1.0),
///     Parameter::float("b", 0.0, 3.0).quantized(0.1),
/// ])
/// .unwrap();
/// let text = TpeFormat::new().write(&space, &mut Diagnostics::new()).unwrap();
/// assert_eq!(
///     text,
///     "from hyperopt import hp\nimport hyperopt.pyll as pyll\n\n\
///      a = hp.uniform(\"a\", 0.0, 1.0)\n\
///      b = hp.quniform(\"b\", 0.0, 3.0, 0.1)\n\n\
///      space = {\"a\": a, \"b\": b}\n"
/// );
/// ```
#[derive(Clone, Debug)]
pub struct TpeFormat {
    space_name: String,
}

impl Default for TpeFormat {
    fn default() -> Self {
        Self {
            space_name: "space".to_owned(),
        }
    }
}

impl TpeFormat {
    /// Creates a format whose space lives in the `space` binding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the module-level binding that holds the space.
    #[must_use]
    pub fn space_name(mut self, name: impl Into<String>) -> Self {
        self.space_name = name.into();
        self
    }
}

impl SpaceFormat for TpeFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Tpe
    }

    fn read(&self, text: &str, diag: &mut Diagnostics) -> Result<Searchspace> {
        let env = evaluate_module(text)?;
        let root = env.get(&self.space_name).ok_or_else(|| {
            Error::parse(
                text.lines().count().max(1),
                format!("module has no '{}' binding", self.space_name),
            )
        })?;

        let mut collector = Collector::default();
        collector.walk(root, &Clause::new(), diag)?;
        let space = collector.finish()?;

        trace_debug!(
            n_params = space.len(),
            n_conditional = space.n_conditional(),
            "read TPE space"
        );
        Ok(space)
    }

    fn write(&self, space: &Searchspace, diag: &mut Diagnostics) -> Result<String> {
        let nesting = Nesting::plan(space, diag)?;
        let vars = python_names(space, &self.space_name);
        let labels: HashMap<&str, String> = space
            .iter()
            .map(|p| (p.name(), encoded_name(p.name(), p.domain(), POLICY)))
            .collect();

        let mut writer = BindingWriter {
            space,
            nesting: &nesting,
            vars: &vars,
            labels: &labels,
            emitted: HashSet::new(),
            lines: Vec::with_capacity(space.len()),
        };
        let mut roots = Vec::new();
        for param in space {
            if nesting.is_root(param.name()) {
                writer.emit(param);
                roots.push(format!(
                    "{}: {}",
                    py_str(&labels[param.name()]),
                    vars[param.name()]
                ));
            }
        }

        let mut out = String::from(HEADER);
        for line in &writer.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&format!("{} = {{{}}}\n", self.space_name, roots.join(", ")));
        Ok(out)
    }
}

/// Where parameters are nested in the written module.
struct Nesting {
    /// Per nested parameter: `(parent, branch values)` placements.
    placements: HashMap<String, Vec<(String, Vec<String>)>>,
    /// Children per `(parent, choice)` branch, in space order.
    children: HashMap<(String, String), Vec<String>>,
}

impl Nesting {
    fn plan(space: &Searchspace, diag: &mut Diagnostics) -> Result<Self> {
        let mut expressible: HashMap<&str, Vec<Vec<Condition>>> = HashMap::new();
        for param in space {
            if param.is_conditional() {
                let clauses = param
                    .clauses()
                    .iter()
                    .map(|clause| expressible_conjuncts(space, param.name(), clause, diag))
                    .collect();
                expressible.insert(param.name(), clauses);
            }
        }

        let mut placements: HashMap<String, Vec<(String, Vec<String>)>> = HashMap::new();
        let mut depth: HashMap<String, usize> = HashMap::new();
        for name in topological_order(space, &expressible)? {
            let Some(clauses) = expressible.get(name) else {
                continue;
            };
            // A clause with nothing left to nest on makes the parameter top-level.
            if clauses.iter().any(Vec::is_empty) {
                continue;
            }

            let mut placed: Vec<(String, Vec<String>)> = Vec::new();
            for clause in clauses {
                let Some(deepest) = clause
                    .iter()
                    .rev()
                    .max_by_key(|c| depth.get(&c.parent).copied().unwrap_or(0))
                else {
                    continue;
                };
                for other in clause {
                    if other.parent != deepest.parent
                        && !implied(&placements, &deepest.parent, &other.parent, &other.values)
                    {
                        diag.push(Warning::DroppedCondition {
                            name: name.to_owned(),
                            condition: other.to_string(),
                            reason: format!(
                                "TPE nesting under {} cannot express it",
                                deepest.parent
                            ),
                        });
                    }
                }
                match placed.iter_mut().find(|(p, _)| *p == deepest.parent) {
                    Some((_, values)) => {
                        for value in &deepest.values {
                            if !values.contains(value) {
                                values.push(value.clone());
                            }
                        }
                    }
                    None => placed.push((deepest.parent.clone(), deepest.values.clone())),
                }
            }

            let level = 1 + placed
                .iter()
                .map(|(p, _)| depth.get(p).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            depth.insert(name.to_owned(), level);
            placements.insert(name.to_owned(), placed);
        }

        let mut children: HashMap<(String, String), Vec<String>> = HashMap::new();
        for param in space {
            for (parent, values) in placements.get(param.name()).into_iter().flatten() {
                for value in values {
                    children
                        .entry((parent.clone(), value.clone()))
                        .or_default()
                        .push(param.name().to_owned());
                }
            }
        }
        Ok(Self {
            placements,
            children,
        })
    }

    fn is_root(&self, name: &str) -> bool {
        !self.placements.contains_key(name)
    }

    fn children(&self, parent: &str, choice: &str) -> &[String] {
        self.children
            .get(&(parent.to_owned(), choice.to_owned()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Keeps the conjuncts of `clause` that nesting can express, warning about
/// the rest.
fn expressible_conjuncts(
    space: &Searchspace,
    name: &str,
    clause: &Clause,
    diag: &mut Diagnostics,
) -> Vec<Condition> {
    let mut kept = Vec::new();
    for condition in clause.conditions() {
        let choices = space
            .get(&condition.parent)
            .and_then(|p| p.domain().choices());
        let Some(choices) = choices else {
            diag.push(Warning::DroppedCondition {
                name: name.to_owned(),
                condition: condition.to_string(),
                reason: format!(
                    "TPE can only nest under categorical parents, {} is not",
                    condition.parent
                ),
            });
            continue;
        };
        let (known, unknown): (Vec<String>, Vec<String>) = condition
            .values
            .iter()
            .cloned()
            .partition(|v| choices.contains(v));
        if !unknown.is_empty() {
            diag.push(Warning::DroppedCondition {
                name: name.to_owned(),
                condition: Condition::one_of(&condition.parent, unknown).to_string(),
                reason: format!("not a choice of {}", condition.parent),
            });
        }
        if !known.is_empty() {
            kept.push(Condition::one_of(&condition.parent, known));
        }
    }
    kept
}

/// Orders conditional parameters so parents come before their children.
fn topological_order<'a>(
    space: &'a Searchspace,
    expressible: &HashMap<&str, Vec<Vec<Condition>>>,
) -> Result<Vec<&'a str>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit<'a>(
        name: &'a str,
        space: &'a Searchspace,
        expressible: &HashMap<&str, Vec<Vec<Condition>>>,
        marks: &mut HashMap<&'a str, Mark>,
        order: &mut Vec<&'a str>,
    ) -> Result<()> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                return Err(Error::unsupported(name, "cyclic conditions"));
            }
            None => {}
        }
        marks.insert(name, Mark::Visiting);
        for clause in expressible.get(name).into_iter().flatten() {
            for condition in clause {
                if let Some(parent) = space.get(&condition.parent) {
                    visit(parent.name(), space, expressible, marks, order)?;
                }
            }
        }
        marks.insert(name, Mark::Done);
        order.push(name);
        Ok(())
    }

    let mut marks = HashMap::new();
    let mut order = Vec::with_capacity(space.len());
    for param in space {
        visit(param.name(), space, expressible, &mut marks, &mut order)?;
    }
    Ok(order)
}

/// Whether every nesting path of `start` passes through `parent` in one of
/// `values`.
fn implied(
    placements: &HashMap<String, Vec<(String, Vec<String>)>>,
    start: &str,
    parent: &str,
    values: &[String],
) -> bool {
    placements.get(start).is_some_and(|placed| {
        !placed.is_empty()
            && placed.iter().all(|(p, branch)| {
                if p == parent {
                    branch.iter().all(|v| values.contains(v))
                } else {
                    implied(placements, p, parent, values)
                }
            })
    })
}

/// Python variable names for every parameter. Labels that are not valid
/// identifiers become `param_<n>`.
fn python_names(space: &Searchspace, space_name: &str) -> HashMap<String, String> {
    let mut used: HashSet<String> = ["hp", "pyll", space_name]
        .into_iter()
        .map(str::to_owned)
        .collect();
    let mut names = HashMap::with_capacity(space.len());
    for (n, param) in space.iter().enumerate() {
        let label = encoded_name(param.name(), param.domain(), POLICY);
        let mut var = if is_identifier(&label) {
            label
        } else {
            format!("param_{n}")
        };
        let mut k = 0;
        while used.contains(&var) {
            k += 1;
            var = format!("param_{n}_{k}");
        }
        used.insert(var.clone());
        names.insert(param.name().to_owned(), var);
    }
    names
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !PYTHON_KEYWORDS.contains(&name)
}

/// Quotes a Python string literal.
fn py_str(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

struct BindingWriter<'a> {
    space: &'a Searchspace,
    nesting: &'a Nesting,
    vars: &'a HashMap<String, String>,
    labels: &'a HashMap<&'a str, String>,
    emitted: HashSet<String>,
    lines: Vec<String>,
}

impl BindingWriter<'_> {
    /// Emits `param` after everything nested inside it.
    fn emit(&mut self, param: &Parameter) {
        if !self.emitted.insert(param.name().to_owned()) {
            return;
        }
        let (space, nesting, vars) = (self.space, self.nesting, self.vars);
        let var = &vars[param.name()];
        let line = match param.domain() {
            Domain::Categorical { choices } => {
                for choice in choices {
                    for child in nesting.children(param.name(), choice) {
                        if let Some(child) = space.get(child) {
                            self.emit(child);
                        }
                    }
                }
                self.choice_binding(var, param.name(), choices)
            }
            Domain::Integer(n) => numeric_binding(var, param.name(), n, true),
            Domain::Float(n) => numeric_binding(var, param.name(), n, false),
        };
        self.lines.push(line);
    }

    fn choice_binding(&self, var: &str, name: &str, choices: &[String]) -> String {
        let label = py_str(&self.labels[name]);
        let mut out = format!("{var} = hp.choice({label}, [\n");
        for choice in choices {
            out.push_str(&format!("    {{{label}: {}, ", py_str(choice)));
            for child in self.nesting.children(name, choice) {
                out.push_str(&format!(
                    "{}: {}, ",
                    py_str(&self.labels[child.as_str()]),
                    self.vars[child]
                ));
            }
            out.push_str("},\n");
        }
        out.push_str("    ])");
        out
    }
}

fn numeric_binding(var: &str, name: &str, domain: &NumericDomain, integer: bool) -> String {
    let encoded = encode_numeric(name, domain, integer, POLICY);
    let label = py_str(&encoded.name);
    let (lower, upper) = match encoded.native_log {
        Some(base) => (base.log(encoded.lower), base.log(encoded.upper)),
        None => (encoded.lower, encoded.upper),
    };
    let (lower, upper) = (fmt_float(lower), fmt_float(upper));
    let log = if encoded.native_log.is_some() { "log" } else { "" };

    let call = if encoded.integer {
        let q = fmt_float(encoded.native_q.unwrap_or(1.0));
        format!("pyll.scope.int(hp.q{log}uniform({label}, {lower}, {upper}, {q}))")
    } else if let Some(q) = encoded.native_q {
        format!("hp.q{log}uniform({label}, {lower}, {upper}, {})", fmt_float(q))
    } else {
        format!("hp.{log}uniform({label}, {lower}, {upper})")
    };
    format!("{var} = {call}")
}

/// A label found while walking the space.
struct Found {
    name: String,
    node: Value,
    domain: Domain,
    clauses: Vec<Clause>,
}

/// Collects hyperparameters from an evaluated space, in discovery order.
#[derive(Default)]
struct Collector {
    found: Vec<Found>,
    index: HashMap<String, usize>,
}

impl Collector {
    fn walk(&mut self, value: &Value, path: &Clause, diag: &mut Diagnostics) -> Result<()> {
        match value {
            Value::List(items) => {
                for item in items {
                    self.walk(item, path, diag)?;
                }
                Ok(())
            }
            Value::Dict(entries) => {
                for (_, item) in entries {
                    self.walk(item, path, diag)?;
                }
                Ok(())
            }
            Value::Apply { func, args, kwargs } => {
                let call = Call { func, args, kwargs };
                if let Some(dist) = hp_function(func) {
                    return self.hyperparameter(value, dist, &call, false, path, diag);
                }
                if func.ends_with("scope.int")
                    && let Some(Value::Apply { func, args, kwargs }) = args.first()
                    && let Some(dist) = hp_function(func)
                    && !matches!(dist, "choice" | "pchoice" | "randint")
                {
                    let call = Call { func, args, kwargs };
                    return self.hyperparameter(value, dist, &call, true, path, diag);
                }
                for item in args.iter().chain(kwargs.iter().map(|(_, v)| v)) {
                    self.walk(item, path, diag)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn hyperparameter(
        &mut self,
        node: &Value,
        dist: &str,
        call: &Call<'_>,
        integer: bool,
        path: &Clause,
        diag: &mut Diagnostics,
    ) -> Result<()> {
        let label = call.label()?;
        match dist {
            "choice" | "pchoice" => {
                let options = call.options(&label, dist)?;
                let choices: Vec<String> = options
                    .iter()
                    .enumerate()
                    .map(|(i, option)| option_name(&label, i, option))
                    .collect();
                let domain = Domain::Categorical {
                    choices: choices.clone(),
                };
                self.register(&label, label.clone(), node, domain, path, None, diag)?;
                for (option, choice) in options.iter().zip(choices) {
                    let branch = path.clone().and(Condition::equals(&label, choice));
                    self.walk(option, &branch, diag)?;
                }
                Ok(())
            }
            "randint" => {
                let bounds = (
                    call.number(1, "low", &label),
                    call.number(2, "high", &label),
                );
                let (low, high) = match bounds {
                    (Ok(low), Ok(high)) => (low, high),
                    _ => (0.0, call.number(1, "upper", &label)?),
                };
                if low.fract() != 0.0 || high.fract() != 0.0 || high <= low {
                    return Err(Error::unsupported(
                        &label,
                        format!("hp.randint bounds {low}, {high}"),
                    ));
                }
                let domain = if high - low > RANDINT_MAX_CHOICES {
                    Domain::Integer(NumericDomain::new(low, high - 1.0))
                } else {
                    #[allow(clippy::cast_possible_truncation)]
                    let choices = (low as i64..high as i64).map(|i| i.to_string()).collect();
                    Domain::Categorical { choices }
                };
                self.register(&label, label.clone(), node, domain, path, None, diag)
            }
            _ => {
                let (domain, approximated) = numeric_domain(dist, call, &label)?;
                let (name, mut domain) = decode_numeric(&label, domain)?;
                let warning = approximated.then(|| Warning::ApproximatedDistribution {
                    name: name.clone(),
                    distribution: format!("hp.{dist}"),
                    lower: domain.lower,
                    upper: domain.upper,
                });
                let domain = if integer || dist == "uniformint" {
                    domain.lower = tidy(domain.lower).ceil();
                    domain.upper = tidy(domain.upper).floor();
                    if domain.q.is_some_and(|q| (q - 1.0).abs() < f64::EPSILON) {
                        domain.q = None;
                    }
                    Domain::Integer(domain)
                } else {
                    Domain::Float(domain)
                };
                self.register(&label, name, node, domain, path, warning, diag)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn register(
        &mut self,
        label: &str,
        name: String,
        node: &Value,
        domain: Domain,
        path: &Clause,
        warning: Option<Warning>,
        diag: &mut Diagnostics,
    ) -> Result<()> {
        if let Some(&i) = self.index.get(label) {
            let found = &mut self.found[i];
            if found.node != *node {
                return Err(Error::unsupported(
                    name,
                    format!("label '{label}' is bound to two different distributions"),
                ));
            }
            found.clauses.push(path.clone());
            return Ok(());
        }
        if let Some(warning) = warning {
            diag.push(warning);
        }
        self.index.insert(label.to_owned(), self.found.len());
        self.found.push(Found {
            name,
            node: node.clone(),
            domain,
            clauses: vec![path.clone()],
        });
        Ok(())
    }

    fn finish(self) -> Result<Searchspace> {
        Searchspace::from_parameters(
            self.found
                .into_iter()
                .map(|f| Parameter::new(f.name, f.domain).with_clauses(merge_clauses(f.clauses))),
        )
    }
}

/// The `hp.<dist>` a call refers to, if any.
fn hp_function(func: &str) -> Option<&str> {
    let (namespace, dist) = func.rsplit_once('.')?;
    (namespace == "hp" || namespace.ends_with(".hp")).then_some(dist)
}

/// Positional and keyword arguments of an `hp` call.
struct Call<'a> {
    func: &'a str,
    args: &'a [Value],
    kwargs: &'a [(String, Value)],
}

impl Call<'_> {
    fn get(&self, index: usize, keyword: &str) -> Option<&Value> {
        self.kwargs
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, v)| v)
            .or_else(|| self.args.get(index))
    }

    fn label(&self) -> Result<String> {
        self.get(0, "label")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| Error::unsupported(self.func, "call without a string label"))
    }

    fn number(&self, index: usize, keyword: &str, label: &str) -> Result<f64> {
        self.get(index, keyword)
            .and_then(Value::as_number)
            .ok_or_else(|| {
                Error::unsupported(label, format!("{} needs a numeric '{keyword}'", self.func))
            })
    }

    fn options(&self, label: &str, dist: &str) -> Result<Vec<&Value>> {
        let Some(Value::List(items)) = self.get(1, "options") else {
            return Err(Error::unsupported(label, format!("{} without an option list", self.func)));
        };
        if dist == "choice" {
            return Ok(items.iter().collect());
        }
        // pchoice options are (probability, option) pairs.
        items
            .iter()
            .map(|item| match item {
                Value::List(pair) if pair.len() == 2 => Ok(&pair[1]),
                _ => Err(Error::unsupported(label, "hp.pchoice option is not a (p, option) pair")),
            })
            .collect()
    }
}

/// Names option `index` of choice `label`: by its self-label key, by its
/// literal value, or by its position.
fn option_name(label: &str, index: usize, option: &Value) -> String {
    let literal = |value: &Value| match value {
        Value::Str(s) => Some(s.clone()),
        Value::Number(n) if n.fract() == 0.0 => Some(fmt_int(*n)),
        Value::Number(n) => Some(fmt_float(*n)),
        Value::Bool(true) => Some("True".to_owned()),
        Value::Bool(false) => Some("False".to_owned()),
        Value::None => Some("None".to_owned()),
        _ => None,
    };
    match option {
        Value::Dict(entries) => entries
            .iter()
            .find(|(key, _)| key.as_str() == Some(label))
            .and_then(|(_, value)| literal(value)),
        other => literal(other),
    }
    .unwrap_or_else(|| index.to_string())
}

/// The value-space domain of a numeric `hp` distribution, and whether it
/// had to be truncated to get bounds.
fn numeric_domain(dist: &str, call: &Call<'_>, label: &str) -> Result<(NumericDomain, bool)> {
    let natural = LogBase::Natural;
    let q = |index| call.number(index, "q", label);
    match dist {
        "uniform" | "quniform" | "uniformint" | "loguniform" | "qloguniform" => {
            let low = call.number(1, "low", label)?;
            let high = call.number(2, "high", label)?;
            let mut domain = if dist.ends_with("loguniform") {
                NumericDomain::new(natural.exp(low), natural.exp(high)).log(natural)
            } else {
                NumericDomain::new(low, high)
            };
            if dist.starts_with('q') {
                domain.q = Some(q(3)?);
            } else if dist == "uniformint" {
                domain.q = call.number(3, "q", label).ok();
            }
            Ok((domain, false))
        }
        "normal" | "qnormal" | "lognormal" | "qlognormal" => {
            let mu = call.number(1, "mu", label)?;
            let sigma = call.number(2, "sigma", label)?;
            let (low, high) = (mu - 3.0 * sigma, mu + 3.0 * sigma);
            let mut domain = if dist.ends_with("lognormal") {
                NumericDomain::new(natural.exp(low), natural.exp(high)).log(natural)
            } else {
                NumericDomain::new(low, high)
            };
            if dist.starts_with('q') {
                domain.q = Some(q(3)?);
            }
            Ok((domain, true))
        }
        other => Err(Error::unsupported(label, format!("hp.{other}"))),
    }
}
