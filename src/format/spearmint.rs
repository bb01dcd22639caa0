//! Spearmint experiment configuration in protobuf text format (`config.pb`).
//!
//! ```text
//! language: PYTHON
//! name: "HPOlib.cv"
//! variable {
//!   name: "LOG2_C"
//!   size: 1
//!   type: FLOAT
//!   min: -5.0
//!   max: 15.0
//! }
//! ```
//!
//! Spearmint has no conditions and no native log or step: both transforms
//! travel in the name, and conditions are dropped with a warning.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use pest::Parser;
use pest::iterators::Pair;

use crate::diagnostics::{Diagnostics, Warning};
use crate::domain::{Domain, NumericDomain};
use crate::error::{Error, Result};
use crate::format::{
    FormatKind, SpaceFormat, fmt_float, fmt_int, grammar_error, line_of, next_child,
};
use crate::naming::{EncodePolicy, decode_numeric, encode_numeric, parse_number};
use crate::parameter::Parameter;
use crate::space::Searchspace;

mod grammar {
    #![allow(unreachable_pub, clippy::all, clippy::pedantic, clippy::std_instead_of_core)]

    use pest_derive::Parser;

    #[derive(Parser)]
    #[grammar = "format/protobuf_text.pest"]
    pub(super) struct ProtobufText;
}

use grammar::{ProtobufText, Rule};

const POLICY: EncodePolicy = EncodePolicy {
    native_log: None,
    native_q: false,
};

/// Language of the objective Spearmint launches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Language {
    /// A Python module (the objective wrapper).
    #[default]
    Python,
    /// A MATLAB function.
    Matlab,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Python => f.write_str("PYTHON"),
            Language::Matlab => f.write_str("MATLAB"),
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PYTHON" => Ok(Language::Python),
            "MATLAB" => Ok(Language::Matlab),
            _ => Err(Error::unsupported("language", s)),
        }
    }
}

/// Reader and writer for Spearmint `config.pb` files.
///
/// # Example
///
/// ```
/// use hpo_convert::format::spearmint::{Language, SpearmintFormat};
///
/// let format = SpearmintFormat::new()
///     .experiment_name("branin")
///     .language(Language::Matlab);
/// assert_eq!(format.name(), "branin");
/// ```
#[derive(Clone, Debug)]
pub struct SpearmintFormat {
    experiment_name: String,
    language: Language,
}

impl Default for SpearmintFormat {
    fn default() -> Self {
        Self {
            experiment_name: "HPOlib.cv".to_owned(),
            language: Language::Python,
        }
    }
}

impl SpearmintFormat {
    /// Creates a format writing a Python experiment named `HPOlib.cv`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the experiment (module) name written to the `name` field.
    #[must_use]
    pub fn experiment_name(mut self, name: impl Into<String>) -> Self {
        self.experiment_name = name.into();
        self
    }

    /// Sets the experiment language.
    #[must_use]
    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// The configured experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.experiment_name
    }
}

impl SpaceFormat for SpearmintFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Spearmint
    }

    fn read(&self, text: &str, _diag: &mut Diagnostics) -> Result<Searchspace> {
        let file = ProtobufText::parse(Rule::file, text).map_err(|err| grammar_error(&err))?;
        let mut space = Searchspace::new();

        for item in file.flat_map(Pair::into_inner) {
            let line = line_of(&item);
            match item.as_rule() {
                Rule::variable => {
                    let spec = VariableSpec::from_block(item, line)?;
                    space.insert(spec.into_parameter()?)?;
                }
                Rule::field => match read_field(item, line)? {
                    ("language", value) => {
                        if value.parse::<Language>().is_err() {
                            let message = format!("unknown language '{value}'");
                            return Err(Error::parse(line, message));
                        }
                    }
                    ("name", _) => {}
                    (other, _) => {
                        return Err(Error::parse(line, format!("unknown field '{other}'")));
                    }
                },
                _ => {}
            }
        }

        trace_debug!(n_params = space.len(), "read SPEARMINT space");
        Ok(space)
    }

    fn write(&self, space: &Searchspace, diag: &mut Diagnostics) -> Result<String> {
        let mut out = format!(
            "language: {}\nname: {}\n",
            self.language,
            quote(&self.experiment_name)
        );

        for param in space {
            if param.is_conditional() {
                let condition = param
                    .clauses()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" || ");
                diag.push(Warning::DroppedCondition {
                    name: param.name().to_owned(),
                    condition,
                    reason: "SPEARMINT has no conditions".to_owned(),
                });
            }

            out.push_str("variable {\n");
            match param.domain() {
                Domain::Categorical { choices } => {
                    out.push_str(&format!("  name: {}\n", quote(param.name())));
                    out.push_str("  size: 1\n  type: ENUM\n");
                    for choice in choices {
                        out.push_str(&format!("  options: {}\n", quote(choice)));
                    }
                }
                Domain::Integer(n) | Domain::Float(n) => {
                    let integer = param.domain().is_integer();
                    let encoded = encode_numeric(param.name(), n, integer, POLICY);
                    let (kind, min, max) = if encoded.integer {
                        ("INT", fmt_int(encoded.lower), fmt_int(encoded.upper))
                    } else {
                        ("FLOAT", fmt_float(encoded.lower), fmt_float(encoded.upper))
                    };
                    out.push_str(&format!("  name: {}\n", quote(&encoded.name)));
                    out.push_str(&format!("  size: 1\n  type: {kind}\n"));
                    out.push_str(&format!("  min: {min}\n  max: {max}\n"));
                }
            }
            out.push_str("}\n");
        }
        Ok(out)
    }
}

/// Fields of one `variable { ... }` block.
#[derive(Debug, Default)]
struct VariableSpec {
    line: usize,
    name: Option<String>,
    size: Option<String>,
    kind: Option<String>,
    options: Vec<String>,
    min: Option<f64>,
    max: Option<f64>,
}

impl VariableSpec {
    fn from_block(pair: Pair<'_, Rule>, line: usize) -> Result<Self> {
        let mut spec = Self {
            line,
            ..Self::default()
        };
        for entry in pair.into_inner() {
            let field_line = line_of(&entry);
            match read_field(entry, field_line)? {
                ("name", value) => spec.name = Some(value),
                ("size", value) => spec.size = Some(value),
                ("type", value) => spec.kind = Some(value),
                ("options", value) => spec.options.push(value),
                ("min", value) => spec.min = Some(number(&value, field_line, "min")?),
                ("max", value) => spec.max = Some(number(&value, field_line, "max")?),
                (other, _) => {
                    return Err(Error::parse(
                        field_line,
                        format!("unknown variable field '{other}'"),
                    ));
                }
            }
        }
        Ok(spec)
    }

    fn into_parameter(self) -> Result<Parameter> {
        let line = self.line;
        let name = self
            .name
            .ok_or_else(|| Error::parse(line, "variable without a name"))?;
        let size = self
            .size
            .ok_or_else(|| Error::parse(line, format!("{name} has no size")))?;
        if size != "1" {
            return Err(Error::unsupported(
                &name,
                format!("size {size}, only size 1 can be converted"),
            ));
        }
        let kind = self
            .kind
            .ok_or_else(|| Error::parse(line, format!("{name} has no type")))?;

        match kind.as_str() {
            "ENUM" => {
                if self.options.is_empty() {
                    return Err(Error::parse(line, format!("ENUM {name} has no options")));
                }
                Ok(Parameter::new(
                    name,
                    Domain::Categorical {
                        choices: self.options,
                    },
                ))
            }
            "INT" | "FLOAT" => {
                let min = self
                    .min
                    .ok_or_else(|| Error::parse(line, format!("{name} has no min")))?;
                let max = self
                    .max
                    .ok_or_else(|| Error::parse(line, format!("{name} has no max")))?;
                let (bare, numeric) =
                    decode_numeric(&name, NumericDomain::new(min, max))?;
                let domain = if kind == "INT" && numeric.base.is_none() {
                    Domain::Integer(numeric)
                } else {
                    Domain::Float(numeric)
                };
                Ok(Parameter::new(bare, domain))
            }
            other => Err(Error::unsupported(name, format!("type {other}"))),
        }
    }
}

/// Splits a `name: value` field, unescaping quoted values.
fn read_field<'i>(pair: Pair<'i, Rule>, line: usize) -> Result<(&'i str, String)> {
    let mut inner = pair.into_inner();
    let name = next_child(&mut inner, line)?.as_str();
    let value = next_child(&mut inner, line)?;
    let value = match value.as_rule() {
        Rule::string => value
            .into_inner()
            .next()
            .map(|text| unescape(text.as_str()))
            .unwrap_or_default(),
        _ => value.as_str().to_owned(),
    };
    Ok((name, value))
}

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
            Some(escaped) => out.push(escaped),
            None => {}
        }
    }
    out
}

fn number(value: &str, line: usize, field: &str) -> Result<f64> {
    parse_number(value)
        .ok_or_else(|| Error::parse(line, format!("{field}: '{value}' is not a number")))
}

/// Quotes a string for protobuf text.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::domain::LogBase;

    const BRANIN: &str = "language: PYTHON\nname: \"HPOlib.cv\"\nvariable {\n  name: \"x\"\n  size: 1\n  type: FLOAT\n  min: -5.0\n  max: 10.0\n}\nvariable {\n  name: \"y\"\n  size: 1\n  type: FLOAT\n  min: 0.0\n  max: 15.0\n}\n";

    fn write(space: &Searchspace) -> (String, Diagnostics) {
        let mut diag = Diagnostics::new();
        let text = SpearmintFormat::new().write(space, &mut diag).unwrap();
        (text, diag)
    }

    fn read(text: &str) -> Result<Searchspace> {
        SpearmintFormat::new().read(text, &mut Diagnostics::new())
    }

    #[test]
    fn write_branin() {
        let space = Searchspace::from_parameters([
            Parameter::float("x", -5.0, 10.0),
            Parameter::float("y", 0.0, 15.0),
        ])
        .unwrap();
        assert_eq!(write(&space).0, BRANIN);
    }

    #[test]
    fn read_branin() {
        let space = read(BRANIN).unwrap();
        assert_eq!(space.get("x").unwrap().domain(), &Domain::float(-5.0, 10.0));
        assert_eq!(space.get("y").unwrap().domain(), &Domain::float(0.0, 15.0));
    }

    #[test]
    fn write_enum_and_int() {
        let space = Searchspace::from_parameters([
            Parameter::categorical("kernel", ["rbf", "poly"]),
            Parameter::integer("depth", 1, 8),
        ])
        .unwrap();
        let (text, _) = write(&space);
        assert!(text.contains(
            "variable {\n  name: \"kernel\"\n  size: 1\n  type: ENUM\n  options: \"rbf\"\n  options: \"poly\"\n}\n"
        ));
        assert!(text.contains("  type: INT\n  min: 1\n  max: 8\n"));
    }

    #[test]
    fn write_moves_transforms_into_name() {
        let space = Searchspace::from_parameters([
            Parameter::float("x", 1.0, 1000.0).log(LogBase::Integer(10)),
            Parameter::integer("n", 0, 100).quantized(5.0),
        ])
        .unwrap();
        let (text, _) = write(&space);
        assert!(text.contains("  name: \"LOG10_x\"\n  size: 1\n  type: FLOAT\n  min: 0.0\n  max: 3.0\n"));
        assert!(text.contains("  name: \"Q5_n\"\n  size: 1\n  type: INT\n"));
    }

    #[test]
    fn write_drops_conditions_loudly() {
        let space = Searchspace::from_parameters([
            Parameter::categorical("c", ["a", "b"]),
            Parameter::float("x", 0.0, 1.0).when(Condition::equals("c", "a")),
        ])
        .unwrap();
        let (_, diag) = write(&space);
        assert!(matches!(
            diag.warnings(),
            [Warning::DroppedCondition { name, .. }] if name == "x"
        ));
    }

    #[test]
    fn write_configured_header() {
        let text = SpearmintFormat::new()
            .experiment_name("svm \"rbf\"")
            .language(Language::Matlab)
            .write(&Searchspace::new(), &mut Diagnostics::new())
            .unwrap();
        assert_eq!(text, "language: MATLAB\nname: \"svm \\\"rbf\\\"\"\n");
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn read_prefixes_and_comments() {
        let text = "# generated\nlanguage: PYTHON\nname: \"x\"\nvariable {\n  name: \"Q5_LOG10_x\" # log\n  size: 1\n  type: FLOAT\n  min: 0\n  max: 3\n}\n";
        let space = read(text).unwrap();
        let x = space.get("x").unwrap().domain().numeric().unwrap();
        assert_eq!(
            x,
            &NumericDomain::new(1.0, 1000.0)
                .log(LogBase::Integer(10))
                .quantized(5.0)
        );
    }

    #[test]
    fn read_escaped_option() {
        let text = "variable { name: \"c\" size: 1 type: ENUM options: \"a\\\"b\" options: 'c' }";
        let space = read(text).unwrap();
        assert_eq!(
            space.get("c").unwrap().domain(),
            &Domain::categorical(["a\"b", "c"])
        );
    }

    #[test]
    fn read_rejects_size_other_than_one() {
        let text = "variable {\n name: \"x\"\n size: 2\n type: FLOAT\n min: 0\n max: 1\n}";
        let err = read(text).unwrap_err();
        assert!(matches!(err, Error::UnsupportedConstruct { name, .. } if name == "x"));
    }

    #[test]
    fn read_rejects_unknown_type() {
        let text = "variable { name: \"x\" size: 1 type: BOOL }";
        assert!(matches!(
            read(text),
            Err(Error::UnsupportedConstruct { .. })
        ));
    }

    #[test]
    fn read_reports_missing_fields() {
        let text = "variable {\n  name: \"x\"\n  size: 1\n  type: FLOAT\n  min: 0\n}";
        assert!(matches!(read(text), Err(Error::Parse { line: 1, .. })));
        assert!(matches!(
            read("variable { size: 1 type: INT }"),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn read_unknown_variable_field_reports_its_line() {
        let text = "variable {\n  name: \"x\"\n  scale: log\n}";
        assert!(matches!(read(text), Err(Error::Parse { line: 3, .. })));
    }

    #[test]
    fn read_grammar_error_reports_its_line() {
        let text = "language: PYTHON\nname: \"x\"\nvariable {\n  name: \"y\n}";
        assert!(matches!(read(text), Err(Error::Parse { line: 4, .. })));
    }

    #[test]
    fn read_escapes_and_separators() {
        let text = "variable: { name: 'c'; size: 1, type: ENUM options: \"a\\\\b\" options: \"t\\tn\\n\" }";
        let space = read(text).unwrap();
        assert_eq!(
            space.get("c").unwrap().domain(),
            &Domain::categorical(["a\\b", "t\tn\n"])
        );
    }

    #[test]
    fn read_rejects_unterminated_block() {
        assert!(matches!(
            read("variable {\n name: \"x\"\n"),
            Err(Error::Parse { .. })
        ));
    }
}
