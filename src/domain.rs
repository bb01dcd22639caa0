//! Parameter domain types.
//!
//! A [`Domain`] is the type and range of a single parameter. Numeric bounds
//! are always kept in value space, i.e. the values the objective function
//! sees; the log-space view is derived by the writers that need it.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Relative tolerance under which a transformed value snaps to an integer.
const SNAP_TOLERANCE: f64 = 1e-12;

/// Snaps `value` to the nearest integer if it is within floating noise of it.
pub(crate) fn tidy(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() <= SNAP_TOLERANCE * value.abs().max(1.0) {
        rounded
    } else {
        value
    }
}

/// Base of a logarithmic transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LogBase {
    /// Natural logarithm, tagged `LOG_`.
    Natural,
    /// Integer base of at least 2, tagged `LOG<b>_`.
    Integer(u32),
}

impl LogBase {
    /// Interprets a floating-point base.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonIntegerBase`] for a base that is neither `e` nor an
    /// integer, and [`Error::InvalidLogBase`] for integer bases below 2.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::float_cmp
    )]
    pub fn from_value(name: &str, base: f64) -> Result<Self> {
        if (base - core::f64::consts::E).abs() < 1e-7 {
            return Ok(LogBase::Natural);
        }
        if !base.is_finite() || base.fract() != 0.0 {
            return Err(Error::NonIntegerBase {
                name: name.to_owned(),
                base: base.to_string(),
            });
        }
        if base < 2.0 || base > f64::from(u32::MAX) {
            return Err(Error::InvalidLogBase {
                name: name.to_owned(),
                base,
            });
        }
        Ok(LogBase::Integer(base as u32))
    }

    /// The numeric value of the base.
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            LogBase::Natural => core::f64::consts::E,
            LogBase::Integer(b) => f64::from(b),
        }
    }

    /// Maps a value-space number into log space.
    #[must_use]
    pub fn log(self, x: f64) -> f64 {
        let y = match self {
            LogBase::Natural => x.ln(),
            LogBase::Integer(2) => x.log2(),
            LogBase::Integer(10) => x.log10(),
            LogBase::Integer(b) => x.log10() / f64::from(b).log10(),
        };
        tidy(y)
    }

    /// Maps a log-space number back into value space.
    #[must_use]
    pub fn exp(self, y: f64) -> f64 {
        let x = match self {
            LogBase::Natural => y.exp(),
            LogBase::Integer(2) => y.exp2(),
            LogBase::Integer(b) => f64::from(b).powf(y),
        };
        tidy(x)
    }

    /// The name prefix that signals this transform to the objective wrapper.
    #[must_use]
    pub fn prefix(self) -> String {
        match self {
            LogBase::Natural => "LOG_".to_owned(),
            LogBase::Integer(b) => format!("LOG{b}_"),
        }
    }
}

impl fmt::Display for LogBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogBase::Natural => write!(f, "e"),
            LogBase::Integer(b) => write!(f, "{b}"),
        }
    }
}

/// Range of an integer or float parameter, with optional log base and step.
///
/// # Example
///
/// ```
/// use hpo_convert::domain::{LogBase, NumericDomain};
///
/// let lr = NumericDomain::new(1e-4, 1.0).log(LogBase::Integer(10));
/// let units = NumericDomain::new(16.0, 1024.0).quantized(16.0);
/// assert_eq!(lr.base, Some(LogBase::Integer(10)));
/// assert_eq!(units.q, Some(16.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NumericDomain {
    /// Lower bound (inclusive), in value space.
    pub lower: f64,
    /// Upper bound (inclusive), in value space.
    pub upper: f64,
    /// Logarithmic base, if the parameter is searched on a log scale.
    pub base: Option<LogBase>,
    /// Quantization step, if values snap to multiples of it.
    pub q: Option<f64>,
}

impl NumericDomain {
    /// Creates a linear, unquantized range.
    #[must_use]
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            base: None,
            q: None,
        }
    }

    /// Searches the range on a log scale with the given base.
    #[must_use]
    pub fn log(mut self, base: LogBase) -> Self {
        self.base = Some(base);
        self
    }

    /// Snaps values to multiples of `q`.
    #[must_use]
    pub fn quantized(mut self, q: f64) -> Self {
        self.q = Some(q);
        self
    }

    /// The bounds in the space the optimizer searches: log space for
    /// logarithmic domains, value space otherwise.
    #[must_use]
    pub fn search_bounds(&self) -> (f64, f64) {
        match self.base {
            Some(base) => (base.log(self.lower), base.log(self.upper)),
            None => (self.lower, self.upper),
        }
    }

    fn validate(&self, name: &str, integer: bool) -> Result<()> {
        if !self.lower.is_finite() || !self.upper.is_finite() {
            return Err(Error::NonFiniteBound {
                name: name.to_owned(),
            });
        }
        if self.lower > self.upper {
            return Err(Error::InvalidBounds {
                name: name.to_owned(),
                lower: self.lower,
                upper: self.upper,
            });
        }
        if integer {
            for value in [self.lower, self.upper] {
                if value.fract() != 0.0 {
                    return Err(Error::NonIntegralBound {
                        name: name.to_owned(),
                        value,
                    });
                }
            }
        }
        if self.base.is_some() && self.lower <= 0.0 {
            return Err(Error::InvalidLogBounds {
                name: name.to_owned(),
            });
        }
        if let Some(q) = self.q {
            let width = self.upper - self.lower;
            if !q.is_finite() || q <= 0.0 || (width > 0.0 && q > width) {
                return Err(Error::InvalidStep {
                    name: name.to_owned(),
                    q,
                });
            }
        }
        Ok(())
    }

    fn approx_eq(&self, other: &Self, rel_tol: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= rel_tol * a.abs().max(b.abs()).max(1.0);
        close(self.lower, other.lower)
            && close(self.upper, other.upper)
            && self.base == other.base
            && match (self.q, other.q) {
                (Some(a), Some(b)) => close(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

/// The type and range of a single parameter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Domain {
    /// An ordered list of choices; the first one is the default.
    Categorical {
        /// The choices in declaration order.
        choices: Vec<String>,
    },
    /// An integer range.
    Integer(NumericDomain),
    /// A floating-point range.
    Float(NumericDomain),
}

impl Domain {
    /// Creates a float domain.
    #[must_use]
    pub fn float(lower: f64, upper: f64) -> Self {
        Domain::Float(NumericDomain::new(lower, upper))
    }

    /// Creates an integer domain.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn integer(lower: i64, upper: i64) -> Self {
        Domain::Integer(NumericDomain::new(lower as f64, upper as f64))
    }

    /// Creates a categorical domain.
    #[must_use]
    pub fn categorical<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Domain::Categorical {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    /// The numeric range, if this is an integer or float domain.
    #[must_use]
    pub fn numeric(&self) -> Option<&NumericDomain> {
        match self {
            Domain::Integer(n) | Domain::Float(n) => Some(n),
            Domain::Categorical { .. } => None,
        }
    }

    pub(crate) fn numeric_mut(&mut self) -> Option<&mut NumericDomain> {
        match self {
            Domain::Integer(n) | Domain::Float(n) => Some(n),
            Domain::Categorical { .. } => None,
        }
    }

    /// The choices, if this is a categorical domain.
    #[must_use]
    pub fn choices(&self) -> Option<&[String]> {
        match self {
            Domain::Categorical { choices } => Some(choices),
            _ => None,
        }
    }

    /// The default choice of a categorical domain (its first choice).
    #[must_use]
    pub fn default_choice(&self) -> Option<&str> {
        self.choices()
            .and_then(|choices| choices.first())
            .map(String::as_str)
    }

    /// Whether this is an integer domain.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, Domain::Integer(_))
    }

    /// A short name of the domain type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Domain::Categorical { .. } => "categorical",
            Domain::Integer(_) => "int",
            Domain::Float(_) => "float",
        }
    }

    /// Validates the domain of the parameter called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error for empty or repeated choices, non-finite or
    /// inverted bounds, fractional integer bounds, non-positive log bounds,
    /// and steps that are not positive or wider than the range.
    pub fn validate(&self, name: &str) -> Result<()> {
        match self {
            Domain::Categorical { choices } => {
                if choices.is_empty() {
                    return Err(Error::EmptyChoices {
                        name: name.to_owned(),
                    });
                }
                for (i, choice) in choices.iter().enumerate() {
                    if choices[..i].contains(choice) {
                        return Err(Error::DuplicateChoice {
                            name: name.to_owned(),
                            choice: choice.clone(),
                        });
                    }
                }
                Ok(())
            }
            Domain::Integer(n) => n.validate(name, true),
            Domain::Float(n) => n.validate(name, false),
        }
    }

    /// Compares two domains, allowing bounds and steps to differ by a
    /// relative `rel_tol`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, rel_tol: f64) -> bool {
        match (self, other) {
            (Domain::Categorical { choices: a }, Domain::Categorical { choices: b }) => a == b,
            (Domain::Integer(a), Domain::Integer(b)) | (Domain::Float(a), Domain::Float(b)) => {
                a.approx_eq(b, rel_tol)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Categorical { choices } => write!(f, "categorical {{{}}}", choices.join(", ")),
            Domain::Integer(n) | Domain::Float(n) => {
                write!(f, "{} [{}, {}]", self.type_name(), n.lower, n.upper)?;
                if let Some(base) = n.base {
                    write!(f, " base={base}")?;
                }
                if let Some(q) = n.q {
                    write!(f, " q={q}")?;
                }
                Ok(())
            }
        }
    }
}

/// Computes the default value written next to a numeric parameter.
///
/// `lower`/`upper` are the bounds as they will be emitted. With
/// `native_log` set, the format applies the log transform itself, so the
/// midpoint is taken in log space and mapped back (a geometric mean).
/// Integer defaults truncate toward zero.
///
/// # Errors
///
/// Returns [`Error::UndefinedDefault`] unless the midpoint lies strictly
/// between the bounds.
pub fn default_value(
    name: &str,
    lower: f64,
    upper: f64,
    native_log: Option<LogBase>,
    integer: bool,
) -> Result<f64> {
    let mid = match native_log {
        Some(base) => base.exp(f64::midpoint(base.log(lower), base.log(upper))),
        None => f64::midpoint(lower, upper),
    };
    if !(mid > lower && mid < upper) {
        return Err(Error::UndefinedDefault {
            name: name.to_owned(),
            lower,
            upper,
        });
    }
    Ok(if integer { mid.trunc() } else { mid })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_base_from_value() {
        assert_eq!(
            LogBase::from_value("x", 10.0).unwrap(),
            LogBase::Integer(10)
        );
        assert_eq!(
            LogBase::from_value("x", core::f64::consts::E).unwrap(),
            LogBase::Natural
        );
        assert!(matches!(
            LogBase::from_value("x", 2.5),
            Err(Error::NonIntegerBase { .. })
        ));
        assert!(matches!(
            LogBase::from_value("x", 1.0),
            Err(Error::InvalidLogBase { .. })
        ));
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn log_transform_round_trips_exactly() {
        let base = LogBase::Integer(10);
        assert_eq!(base.log(1.0), 0.0);
        assert_eq!(base.log(1000.0), 3.0);
        assert_eq!(base.exp(0.0), 1.0);
        assert_eq!(base.exp(3.0), 1000.0);

        let base = LogBase::Integer(23);
        assert_eq!(base.log(23.0_f64.powi(5)), 5.0);
    }

    #[test]
    fn log_prefix() {
        assert_eq!(LogBase::Natural.prefix(), "LOG_");
        assert_eq!(LogBase::Integer(2).prefix(), "LOG2_");
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn search_bounds_in_log_space() {
        let domain = NumericDomain::new(1.0, 1000.0).log(LogBase::Integer(10));
        assert_eq!(domain.search_bounds(), (0.0, 3.0));
        assert_eq!(NumericDomain::new(-5.0, 10.0).search_bounds(), (-5.0, 10.0));
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let domain = Domain::float(1.0, 0.0);
        assert!(matches!(
            domain.validate("x"),
            Err(Error::InvalidBounds { .. })
        ));
    }

    #[test]
    fn validate_accepts_degenerate_bounds() {
        assert!(Domain::float(10.0, 10.0).validate("x").is_ok());
    }

    #[test]
    fn validate_rejects_non_positive_log_bounds() {
        let domain = Domain::Float(NumericDomain::new(-1.0, 1.0).log(LogBase::Integer(10)));
        assert!(matches!(
            domain.validate("x"),
            Err(Error::InvalidLogBounds { .. })
        ));
    }

    #[test]
    fn validate_rejects_fractional_integer_bounds() {
        let domain = Domain::Integer(NumericDomain::new(0.5, 4.0));
        assert!(matches!(
            domain.validate("n"),
            Err(Error::NonIntegralBound { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_steps() {
        let zero = Domain::Float(NumericDomain::new(0.0, 1.0).quantized(0.0));
        assert!(matches!(zero.validate("x"), Err(Error::InvalidStep { .. })));

        let too_wide = Domain::Float(NumericDomain::new(0.0, 1.0).quantized(5.0));
        assert!(matches!(
            too_wide.validate("x"),
            Err(Error::InvalidStep { .. })
        ));
    }

    #[test]
    fn validate_categorical() {
        assert!(matches!(
            Domain::categorical(Vec::<String>::new()).validate("c"),
            Err(Error::EmptyChoices { .. })
        ));
        assert!(matches!(
            Domain::categorical(["a", "b", "a"]).validate("c"),
            Err(Error::DuplicateChoice { .. })
        ));
        assert!(Domain::categorical(["a", "b"]).validate("c").is_ok());
    }

    #[test]
    fn default_choice_is_first() {
        let domain = Domain::categorical(["a", "b", "c"]);
        assert_eq!(domain.default_choice(), Some("a"));
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn default_is_midpoint() {
        assert_eq!(default_value("x", 0.0, 10.0, None, false).unwrap(), 5.0);
        assert_eq!(default_value("n", -1.0, 6.0, None, true).unwrap(), 2.0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn default_with_native_log_is_geometric_mean() {
        let base = Some(LogBase::Integer(10));
        assert_eq!(default_value("x", 10.0, 1000.0, base, false).unwrap(), 100.0);
        assert_eq!(default_value("n", 1.0, 6.0, base, true).unwrap(), 2.0);
    }

    #[test]
    fn degenerate_default_is_fatal() {
        assert!(matches!(
            default_value("x", 10.0, 10.0, None, false),
            Err(Error::UndefinedDefault { .. })
        ));
    }

    #[test]
    fn approx_eq_tolerates_rounding() {
        let a = Domain::Float(NumericDomain::new(1e-4, 1.0).log(LogBase::Natural));
        let b = Domain::Float(
            NumericDomain::new(1.000_000_000_000_1e-4, 1.0).log(LogBase::Natural),
        );
        assert!(a.approx_eq(&b, 1e-9));
        assert!(!a.approx_eq(&Domain::float(1e-4, 1.0), 1e-9));
    }
}
