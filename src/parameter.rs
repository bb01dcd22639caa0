//! A named parameter: its domain plus the clauses that gate it.
//!
//! # Example
//!
//! ```
//! use hpo_convert::condition::Condition;
//! use hpo_convert::domain::LogBase;
//! use hpo_convert::parameter::Parameter;
//!
//! let classifier = Parameter::categorical("classifier", ["svm", "nn"]);
//! let c = Parameter::float("C", 0.03125, 32768.0)
//!     .log(LogBase::Integer(2))
//!     .when(Condition::equals("classifier", "svm"));
//! let neurons = Parameter::integer("neurons", 16, 1024)
//!     .quantized(16.0)
//!     .when(Condition::equals("classifier", "nn"));
//!
//! assert!(!classifier.is_conditional());
//! assert!(c.is_conditional());
//! assert_eq!(neurons.domain().numeric().unwrap().q, Some(16.0));
//! ```

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::condition::{Clause, merge_clauses};
use crate::domain::{Domain, LogBase};
use crate::error::Result;

/// A single hyperparameter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Parameter {
    name: String,
    domain: Domain,
    #[cfg_attr(feature = "serde", serde(default))]
    clauses: Vec<Clause>,
}

impl Parameter {
    /// Creates an unconditional parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, domain: Domain) -> Self {
        Self {
            name: name.into(),
            domain,
            clauses: Vec::new(),
        }
    }

    /// Creates a float parameter.
    #[must_use]
    pub fn float(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self::new(name, Domain::float(lower, upper))
    }

    /// Creates an integer parameter.
    #[must_use]
    pub fn integer(name: impl Into<String>, lower: i64, upper: i64) -> Self {
        Self::new(name, Domain::integer(lower, upper))
    }

    /// Creates a categorical parameter; the first choice is the default.
    #[must_use]
    pub fn categorical<I, S>(name: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, Domain::categorical(choices))
    }

    /// Searches a numeric parameter on a log scale. No effect on categoricals.
    #[must_use]
    pub fn log(mut self, base: LogBase) -> Self {
        if let Some(numeric) = self.domain.numeric_mut() {
            numeric.base = Some(base);
        }
        self
    }

    /// Quantizes a numeric parameter to multiples of `q`. No effect on categoricals.
    #[must_use]
    pub fn quantized(mut self, q: f64) -> Self {
        if let Some(numeric) = self.domain.numeric_mut() {
            numeric.q = Some(q);
        }
        self
    }

    /// Adds a clause; the parameter is active when any of its clauses holds.
    #[must_use]
    pub fn when(mut self, clause: impl Into<Clause>) -> Self {
        self.clauses.push(clause.into());
        self
    }

    /// Replaces all clauses.
    #[must_use]
    pub fn with_clauses(mut self, clauses: Vec<Clause>) -> Self {
        self.clauses = clauses;
        self
    }

    /// The parameter name, free of any `LOG`/`Q` prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter domain.
    #[must_use]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The disjunction of clauses gating this parameter.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Whether any clause gates this parameter.
    #[must_use]
    pub fn is_conditional(&self) -> bool {
        !self.clauses.is_empty()
    }

    /// Validates the domain.
    ///
    /// # Errors
    ///
    /// See [`Domain::validate`].
    pub fn validate(&self) -> Result<()> {
        self.domain.validate(&self.name)
    }

    /// Compares two parameters, allowing bounds to differ by a relative `rel_tol`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, rel_tol: f64) -> bool {
        self.name == other.name
            && self.domain.approx_eq(&other.domain, rel_tol)
            && merge_clauses(self.clauses.clone()) == merge_clauses(other.clauses.clone())
    }

    pub(crate) fn clauses_mut(&mut self) -> &mut Vec<Clause> {
        &mut self.clauses
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.domain)?;
        if !self.clauses.is_empty() {
            let clauses: Vec<String> = self.clauses.iter().map(|c| format!("({c})")).collect();
            write!(f, " | {}", clauses.join(" || "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::domain::NumericDomain;

    #[test]
    fn float_parameter_domain() {
        let param = Parameter::float("x", -5.0, 10.0);
        assert_eq!(param.domain(), &Domain::float(-5.0, 10.0));
        assert!(!param.is_conditional());
    }

    #[test]
    fn log_and_step_builders() {
        let param = Parameter::float("lr", 1e-4, 1.0)
            .log(LogBase::Integer(10))
            .quantized(0.5);
        assert_eq!(
            param.domain(),
            &Domain::Float(NumericDomain {
                lower: 1e-4,
                upper: 1.0,
                base: Some(LogBase::Integer(10)),
                q: Some(0.5),
            })
        );
    }

    #[test]
    fn numeric_builders_ignore_categoricals() {
        let param = Parameter::categorical("c", ["a", "b"])
            .log(LogBase::Natural)
            .quantized(2.0);
        assert_eq!(param.domain(), &Domain::categorical(["a", "b"]));
    }

    #[test]
    fn when_appends_disjuncts() {
        let param = Parameter::float("e", 0.0, 5.0)
            .when(Condition::equals("a_or_b", "a"))
            .when(Condition::equals("a_or_b", "b"));
        assert_eq!(param.clauses().len(), 2);
    }

    #[test]
    fn validate_delegates_to_domain() {
        assert!(Parameter::float("x", 1.0, 0.0).validate().is_err());
        assert!(Parameter::integer("n", 0, 10).validate().is_ok());
    }

    #[test]
    fn approx_eq_ignores_equivalent_clause_shapes() {
        let a = Parameter::float("e", 0.0, 5.0)
            .when(Condition::equals("p", "a"))
            .when(Condition::equals("p", "b"));
        let b = Parameter::float("e", 0.0, 5.0).when(Condition::one_of("p", ["a", "b"]));
        assert!(a.approx_eq(&b, 1e-12));
        assert_ne!(a, b);
    }

    #[test]
    fn display() {
        let param = Parameter::integer("n", 1, 4).when(Condition::equals("c", "x"));
        assert_eq!(param.to_string(), "n: int [1, 4] | (c == x)");
    }
}
