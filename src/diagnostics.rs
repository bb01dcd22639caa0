//! Warnings for information lost or approximated during a conversion.
//!
//! Conversions are lossy in a few well-defined places. None of them fail
//! silently: each is recorded as a [`Warning`] on the [`Diagnostics`]
//! collector threaded through readers and writers, and also emitted as a
//! `tracing` event when the `tracing` feature is enabled.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::format::FormatKind;

/// A lossy step taken during a conversion.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Warning {
    /// A condition could not be expressed in the target format.
    DroppedCondition {
        /// The gated parameter.
        name: String,
        /// The condition as it was modeled.
        condition: String,
        /// Why the target could not carry it.
        reason: String,
    },
    /// A forbidden-combination clause was read but is not modeled.
    SkippedForbiddenClause {
        /// The clause as written.
        clause: String,
    },
    /// A distribution without a bounded counterpart was truncated.
    ApproximatedDistribution {
        /// The parameter name.
        name: String,
        /// The source distribution.
        distribution: String,
        /// The bounded range used instead.
        lower: f64,
        /// Upper end of the bounded range.
        upper: f64,
    },
    /// A declared default was replaced by the model's default rule.
    IgnoredDefault {
        /// The parameter name.
        name: String,
        /// The default as written.
        default: String,
    },
    /// Source and target format are the same; the input was passed through.
    SameFormat(FormatKind),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DroppedCondition {
                name,
                condition,
                reason,
            } => write!(f, "dropped condition '{condition}' on {name}: {reason}"),
            Warning::SkippedForbiddenClause { clause } => {
                write!(f, "forbidden clauses are not supported, skipped {clause}")
            }
            Warning::ApproximatedDistribution {
                name,
                distribution,
                lower,
                upper,
            } => write!(
                f,
                "{name}: {distribution} has no bounded counterpart, using [{lower}, {upper}]"
            ),
            Warning::IgnoredDefault { name, default } => write!(
                f,
                "{name}: default {default} is ignored, the first choice becomes the default"
            ),
            Warning::SameFormat(kind) => write!(
                f,
                "converting from {kind} to {kind} makes no sense, passing input through"
            ),
        }
    }
}

/// Collects [`Warning`]s for one conversion.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning.
    pub fn push(&mut self, warning: Warning) {
        trace_warn!(%warning, "lossy conversion step");
        self.warnings.push(warning);
    }

    /// The warnings recorded so far.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Consumes the collector.
    #[must_use]
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
