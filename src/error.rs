use crate::format::FormatKind;

/// Errors returned by readers, writers, the dispatcher and the benchmarks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the lower bound is greater than the upper bound.
    #[error(
        "invalid bounds for '{name}': lower ({lower}) must be less than or equal to upper ({upper})"
    )]
    InvalidBounds {
        /// The parameter name.
        name: String,
        /// The lower bound value.
        lower: f64,
        /// The upper bound value.
        upper: f64,
    },

    /// Returned when a bound is NaN or infinite.
    #[error("non-finite bound for '{name}'")]
    NonFiniteBound {
        /// The parameter name.
        name: String,
    },

    /// Returned when a logarithmic domain has a non-positive bound.
    #[error("this is no log domain: {name} (bounds must be positive)")]
    InvalidLogBounds {
        /// The parameter name.
        name: String,
    },

    /// Returned when a logarithmic base is not an integer.
    #[error("cannot handle non-integer log base {base} ({name})")]
    NonIntegerBase {
        /// The parameter name.
        name: String,
        /// The offending base as written.
        base: String,
    },

    /// Returned when an integer logarithmic base is smaller than 2.
    #[error("invalid log base {base} for '{name}': base must be at least 2")]
    InvalidLogBase {
        /// The parameter name.
        name: String,
        /// The offending base.
        base: f64,
    },

    /// Returned when a quantization step is not positive or too wide for the bounds.
    #[error("invalid quantization step {q} for '{name}'")]
    InvalidStep {
        /// The parameter name.
        name: String,
        /// The offending step.
        q: f64,
    },

    /// Returned when an integer parameter has a fractional bound.
    #[error("{value} is no int: {name}")]
    NonIntegralBound {
        /// The parameter name.
        name: String,
        /// The offending bound.
        value: f64,
    },

    /// Returned when categorical choices are empty.
    #[error("categorical parameter '{name}' has no choices")]
    EmptyChoices {
        /// The parameter name.
        name: String,
    },

    /// Returned when a categorical parameter lists the same choice twice.
    #[error("categorical parameter '{name}' lists choice '{choice}' more than once")]
    DuplicateChoice {
        /// The parameter name.
        name: String,
        /// The repeated choice.
        choice: String,
    },

    /// Returned when two parameters share a name.
    #[error("duplicate parameter '{0}'")]
    DuplicateParameter(String),

    /// Returned when a condition or lookup references an unknown parameter.
    #[error("'{0}' is not defined in the search space")]
    UndefinedParameter(String),

    /// Returned when no default value lies strictly between the bounds.
    #[error("cannot find mean for {name}: bounds [{lower}, {upper}] leave no room for a default")]
    UndefinedDefault {
        /// The parameter name.
        name: String,
        /// The lower bound the default was computed from.
        lower: f64,
        /// The upper bound the default was computed from.
        upper: f64,
    },

    /// Returned when a condition uses anything but equality or set membership.
    #[error("condition not implemented: {condition} ({name})")]
    UnsupportedCondition {
        /// The parameter the condition is attached to (or its parent when unknown).
        name: String,
        /// The condition as written.
        condition: String,
    },

    /// Returned when a construct exists in the source grammar but not in the model.
    #[error("unsupported construct for '{name}': {construct}")]
    UnsupportedConstruct {
        /// The parameter name.
        name: String,
        /// A description of the construct.
        construct: String,
    },

    /// Returned when input text does not follow the format grammar.
    #[error("could not parse line {line}: {message}")]
    Parse {
        /// The 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Returned when the dispatcher has no route for a pair of formats.
    #[error("conversion from {from} to {to} is not yet implemented")]
    UnsupportedConversion {
        /// The source format.
        from: FormatKind,
        /// The target format.
        to: FormatKind,
    },

    /// Returned when a format name is not recognized.
    #[error("unknown format '{0}', expected one of SMAC, SPEARMINT, TPE (or hyperopt)")]
    UnknownFormat(String),

    /// Returned when a benchmark is evaluated outside its domain.
    #[error("{name} value {value} not in between {lower} and {upper}")]
    OutOfDomain {
        /// The parameter name.
        name: String,
        /// The offending value.
        value: f64,
        /// The lower bound.
        lower: f64,
        /// The upper bound.
        upper: f64,
    },

    /// Returned when a benchmark is evaluated without one of its parameters.
    #[error("no value found for parameter '{0}'")]
    MissingParameter(String),

    /// Returned when a parameter value cannot be interpreted.
    #[error("invalid value '{value}' for '{name}'")]
    InvalidValue {
        /// The parameter name.
        name: String,
        /// The raw value.
        value: String,
    },

    /// Returned when reading an input file fails.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(name: impl Into<String>, construct: impl Into<String>) -> Self {
        Error::UnsupportedConstruct {
            name: name.into(),
            construct: construct.into(),
        }
    }
}
