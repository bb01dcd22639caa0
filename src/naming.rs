//! The `LOG<b>_` / `Q<q>_` naming convention shared with the objective wrapper.
//!
//! When a target format cannot express a log scale or a quantization step
//! itself, the writer moves the transform into the parameter name and hands
//! the optimizer log-space bounds. The objective wrapper reverses this before
//! calling the objective function: it strips the prefixes, exponentiates and
//! snaps. The name is the only channel the transform survives in, so both
//! sides must agree on it exactly.
//!
//! Prefixes are written in one canonical order, quantization outermost:
//! `Q<q>_LOG<b>_<name>`. Readers accept either order.
//!
//! ```
//! use hpo_convert::domain::LogBase;
//! use hpo_convert::naming::{decode_value, encode_name, parse_name, ParamValue};
//!
//! let name = encode_name("x", Some(LogBase::Integer(10)), Some(5.0));
//! assert_eq!(name, "Q5_LOG10_x");
//!
//! let parsed = parse_name(&name).unwrap();
//! assert_eq!(parsed.name, "x");
//! assert_eq!(parsed.q, Some(5.0));
//!
//! // The optimizer proposes 1.4 in log space; the wrapper sees 25.
//! let (name, value) = decode_value("Q5_LOG10_x", "1.4").unwrap();
//! assert_eq!(name, "x");
//! assert_eq!(value, ParamValue::Number(25.0));
//! ```

use core::fmt;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::domain::{Domain, LogBase, NumericDomain, tidy};
use crate::error::{Error, Result};

/// A parameter name with its transform prefixes separated out.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedName {
    /// The bare name.
    pub name: String,
    /// The base of a `LOG` prefix.
    pub base: Option<LogBase>,
    /// The step of a `Q` prefix.
    pub q: Option<f64>,
}

impl ParsedName {
    /// Whether any prefix was present.
    #[must_use]
    pub fn is_tagged(&self) -> bool {
        self.base.is_some() || self.q.is_some()
    }
}

/// Splits stacked leading `LOG<b>_` and `Q<q>_` prefixes off `raw`.
///
/// # Errors
///
/// Returns [`Error::NonIntegerBase`] for a fractional `LOG` base,
/// [`Error::InvalidLogBase`] for a base below 2, [`Error::InvalidStep`] for a
/// non-positive step, and [`Error::UnsupportedConstruct`] for a repeated
/// prefix of the same kind.
pub fn parse_name(raw: &str) -> Result<ParsedName> {
    let mut rest = raw;
    let mut base = None;
    let mut q = None;

    loop {
        if let Some((number, tail)) = split_prefix(rest, "LOG") {
            if base.is_some() {
                return Err(Error::unsupported(raw, "stacked LOG prefixes"));
            }
            base = Some(if number.is_empty() {
                LogBase::Natural
            } else {
                let value: f64 = number
                    .parse()
                    .map_err(|_| Error::unsupported(raw, format!("LOG base '{number}'")))?;
                LogBase::from_value(raw, value)?
            });
            rest = tail;
        } else if let Some((number, tail)) = split_prefix(rest, "Q") {
            if number.is_empty() {
                break;
            }
            if q.is_some() {
                return Err(Error::unsupported(raw, "stacked Q prefixes"));
            }
            let step: f64 = number
                .parse()
                .map_err(|_| Error::unsupported(raw, format!("Q step '{number}'")))?;
            if step <= 0.0 {
                return Err(Error::InvalidStep {
                    name: raw.to_owned(),
                    q: step,
                });
            }
            q = Some(step);
            rest = tail;
        } else {
            break;
        }
    }

    Ok(ParsedName {
        name: rest.to_owned(),
        base,
        q,
    })
}

/// Splits `<tag><number>_` off the front of `text`, returning the number text
/// and the remainder. The remainder must be non-empty.
fn split_prefix<'a>(text: &'a str, tag: &str) -> Option<(&'a str, &'a str)> {
    let after = text.strip_prefix(tag)?;
    let end = after.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
    let (number, tail) = after.split_at(end);
    let tail = tail.strip_prefix('_')?;
    if tail.is_empty() {
        return None;
    }
    Some((number, tail))
}

/// Formats a quantization step the way it appears in a `Q` prefix.
#[must_use]
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
pub fn format_step(q: f64) -> String {
    if q.fract() == 0.0 && q.abs() < 1e15 {
        format!("{}", q as i64)
    } else {
        format!("{q}")
    }
}

/// Prefixes `name` with its transforms in canonical order (`Q` outermost).
#[must_use]
pub fn encode_name(name: &str, base: Option<LogBase>, q: Option<f64>) -> String {
    let mut out = String::new();
    if let Some(q) = q {
        out.push('Q');
        out.push_str(&format_step(q));
        out.push('_');
    }
    if let Some(base) = base {
        out.push_str(&base.prefix());
    }
    out.push_str(name);
    out
}

/// What a target format can express natively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodePolicy {
    /// The log base the format's own grammar understands.
    pub native_log: Option<LogBase>,
    /// Whether the format's grammar carries a quantization step.
    pub native_q: bool,
}

/// A numeric parameter as a particular format will see it.
#[derive(Clone, Debug, PartialEq)]
pub struct Encoded {
    /// Name including any `Q`/`LOG` prefixes.
    pub name: String,
    /// Whether the format should declare an integer.
    pub integer: bool,
    /// Emitted lower bound.
    pub lower: f64,
    /// Emitted upper bound.
    pub upper: f64,
    /// The log base the format applies natively, if any.
    pub native_log: Option<LogBase>,
    /// The step the format applies natively, if any.
    pub native_q: Option<f64>,
}

impl Encoded {
    /// The default value of the emitted parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UndefinedDefault`] if no default fits strictly
    /// between the bounds.
    pub fn default_value(&self) -> Result<f64> {
        crate::domain::default_value(
            &self.name,
            self.lower,
            self.upper,
            self.native_log,
            self.integer,
        )
    }
}

/// Re-tags a numeric parameter for a format. Pure: the parameter is not
/// touched.
///
/// Transforms the format cannot express move into the name and the bounds
/// become log-space. An integer with a name-encoded log scale is emitted as
/// a float carrying a `Q` prefix (step 1 unless it had one), so the wrapper
/// snaps it back onto the integers.
#[must_use]
pub fn encode_numeric(
    name: &str,
    domain: &NumericDomain,
    integer: bool,
    policy: EncodePolicy,
) -> Encoded {
    let log_is_native = domain.base.is_some() && domain.base == policy.native_log;
    let prefix_base = if log_is_native { None } else { domain.base };

    let (lower, upper) = match prefix_base {
        Some(base) => (base.log(domain.lower), base.log(domain.upper)),
        None => (domain.lower, domain.upper),
    };
    let snaps_to_int = integer && prefix_base.is_some();
    let q = if snaps_to_int && domain.q.is_none() {
        Some(1.0)
    } else {
        domain.q
    };
    let integer = integer && prefix_base.is_none();

    let q_is_native = policy.native_q && prefix_base.is_none();
    let prefix_q = if q_is_native { None } else { q };

    Encoded {
        name: encode_name(name, prefix_base, prefix_q),
        integer,
        lower,
        upper,
        native_log: if log_is_native { domain.base } else { None },
        native_q: if q_is_native { q } else { None },
    }
}

/// Encodes the name a parameter of `domain` is emitted under.
#[must_use]
pub fn encoded_name(name: &str, domain: &Domain, policy: EncodePolicy) -> String {
    match domain {
        Domain::Categorical { .. } => name.to_owned(),
        Domain::Integer(n) => encode_numeric(name, n, true, policy).name,
        Domain::Float(n) => encode_numeric(name, n, false, policy).name,
    }
}

/// Moves prefix-encoded transforms from a read name back onto its domain.
///
/// `domain` holds the bounds as written next to `raw_name`; if the name
/// carries a `LOG` prefix they are log-space and get exponentiated. Returns
/// the bare name and the value-space domain.
///
/// # Errors
///
/// Returns an error if the prefix is malformed, or if it conflicts with a
/// transform the grammar already declared.
pub fn decode_numeric(
    raw_name: &str,
    mut domain: NumericDomain,
) -> Result<(String, NumericDomain)> {
    let parsed = parse_name(raw_name)?;
    if let Some(base) = parsed.base {
        if domain.base.is_some() {
            return Err(Error::unsupported(
                &parsed.name,
                format!("{} prefix on a parameter that is already logarithmic", base.prefix()),
            ));
        }
        domain.lower = base.exp(domain.lower);
        domain.upper = base.exp(domain.upper);
        domain.base = Some(base);
    }
    if let Some(q) = parsed.q {
        match domain.q {
            Some(existing) if (existing - q).abs() > f64::EPSILON * q.abs().max(1.0) => {
                return Err(Error::unsupported(
                    &parsed.name,
                    format!("Q{}_ prefix conflicts with step {existing}", format_step(q)),
                ));
            }
            _ => domain.q = Some(q),
        }
    }
    Ok((parsed.name, domain))
}

/// A parameter value handed to the objective function.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParamValue {
    /// A numeric value (after any transform).
    Number(f64),
    /// A non-numeric value, e.g. a categorical choice.
    Text(String),
}

impl ParamValue {
    /// Interprets the value as a number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the text does not parse as a finite number.
    pub fn as_f64(&self, name: &str) -> Result<f64> {
        match self {
            ParamValue::Number(v) => Ok(*v),
            ParamValue::Text(text) => parse_number(text).ok_or_else(|| Error::InvalidValue {
                name: name.to_owned(),
                value: text.clone(),
            }),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{v}"),
            ParamValue::Text(t) => write!(f, "{t}"),
        }
    }
}

/// Parses a finite number, accepting forms such as `.5E-2`, `+1` and `4.3e+6`.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || (text.chars().any(char::is_alphabetic) && !is_exponent_form(text)) {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_exponent_form(text: &str) -> bool {
    text.chars().filter(|c| c.is_alphabetic()).all(|c| c == 'e' || c == 'E')
}

/// Decodes one optimizer-side assignment into what the objective receives.
///
/// Surrounding quotes are stripped. A `LOG` prefix exponentiates the value,
/// then a `Q` prefix snaps it to `round(v / q) * q`. Unprefixed values are
/// passed through as text.
///
/// # Errors
///
/// Returns an error for malformed prefixes, or [`Error::InvalidValue`] when a
/// transform is applied to a non-numeric value.
pub fn decode_value(raw_name: &str, raw_value: &str) -> Result<(String, ParamValue)> {
    let value = raw_value
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .to_owned();
    let parsed = parse_name(raw_name)?;
    if !parsed.is_tagged() {
        return Ok((parsed.name, ParamValue::Text(value)));
    }

    let mut number = parse_number(&value).ok_or_else(|| Error::InvalidValue {
        name: raw_name.to_owned(),
        value: value.clone(),
    })?;
    if let Some(base) = parsed.base {
        number = base.exp(number);
    }
    if let Some(q) = parsed.q {
        number = tidy((number / q).round() * q);
    }
    Ok((parsed.name, ParamValue::Number(number)))
}

/// Decodes a whole assignment, e.g. the `-name value` pairs an optimizer
/// passes to the wrapper.
///
/// # Errors
///
/// Returns any [`decode_value`] error, or [`Error::DuplicateParameter`] when
/// two raw names decode to the same bare name.
pub fn decode_params<I, K, V>(params: I) -> Result<BTreeMap<String, ParamValue>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut decoded = BTreeMap::new();
    for (name, value) in params {
        let (bare, value) = decode_value(name.as_ref(), value.as_ref())?;
        if decoded.contains_key(&bare) {
            return Err(Error::DuplicateParameter(bare));
        }
        decoded.insert(bare, value);
    }
    Ok(decoded)
}
