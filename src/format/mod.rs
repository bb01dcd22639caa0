//! Readers and writers for the supported search-space formats.
//!
//! Every format implements [`SpaceFormat`]: `read` parses text into a
//! [`Searchspace`], `write` renders one back. Lossy steps on either side are
//! reported through [`Diagnostics`] rather than dropped silently.
//!
//! | Format | Type | Native log | Native step | Conditions |
//! |--------|------|------------|-------------|------------|
//! | [`SMAC`](smac::SmacFormat) | PCS text | base 10 (`l` flag) | no | yes |
//! | [`SPEARMINT`](spearmint::SpearmintFormat) | protobuf text | no | no | no |
//! | [`TPE`](tpe::TpeFormat) | hyperopt Python | natural | yes | by nesting |

pub mod smac;
pub mod spearmint;
pub mod tpe;

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use pest::RuleType;
use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::space::Searchspace;

pub use smac::SmacFormat;
pub use spearmint::SpearmintFormat;
pub use tpe::TpeFormat;

/// Identifies a search-space format.
///
/// Names parse case-insensitively; `hyperopt` is an alias for [`FormatKind::Tpe`].
///
/// ```
/// use hpo_convert::format::FormatKind;
///
/// assert_eq!("smac".parse::<FormatKind>().unwrap(), FormatKind::Smac);
/// assert_eq!("HyperOpt".parse::<FormatKind>().unwrap(), FormatKind::Tpe);
/// assert!("grid".parse::<FormatKind>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FormatKind {
    /// SMAC parameter configuration space (`.pcs`).
    Smac,
    /// Spearmint protobuf text (`config.pb`).
    Spearmint,
    /// TPE / hyperopt Python search space (`space.py`).
    Tpe,
}

impl FormatKind {
    /// All formats.
    pub const ALL: [FormatKind; 3] = [FormatKind::Smac, FormatKind::Spearmint, FormatKind::Tpe];

    /// The file name the optimizer expects a space of this format in.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            FormatKind::Smac => "params.pcs",
            FormatKind::Spearmint => "config.pb",
            FormatKind::Tpe => "space.py",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatKind::Smac => "SMAC",
            FormatKind::Spearmint => "SPEARMINT",
            FormatKind::Tpe => "TPE",
        };
        f.write_str(name)
    }
}

impl FromStr for FormatKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smac" => Ok(FormatKind::Smac),
            "spearmint" => Ok(FormatKind::Spearmint),
            "tpe" | "hyperopt" => Ok(FormatKind::Tpe),
            _ => Err(Error::UnknownFormat(s.to_owned())),
        }
    }
}

/// A search-space file format.
pub trait SpaceFormat: Send + Sync {
    /// Which format this is.
    fn kind(&self) -> FormatKind;

    /// Parses `text` into a search space.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not follow the grammar or describes
    /// something the model cannot hold.
    fn read(&self, text: &str, diag: &mut Diagnostics) -> Result<Searchspace>;

    /// Renders `space` in this format.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter cannot be expressed, e.g. when no
    /// default fits between its bounds.
    fn write(&self, space: &Searchspace, diag: &mut Diagnostics) -> Result<String>;
}

/// Maps a grammar error onto [`Error::Parse`] at the line it occurred on.
pub(crate) fn grammar_error<R: RuleType>(err: &pest::error::Error<R>) -> Error {
    let line = match err.line_col {
        LineColLocation::Pos((line, _)) | LineColLocation::Span((line, _), _) => line,
    };
    Error::parse(line, err.variant.message())
}

/// The 1-based line a grammar node starts on.
pub(crate) fn line_of<R: RuleType>(pair: &Pair<'_, R>) -> usize {
    pair.as_span().start_pos().line_col().0
}

/// Takes the next child of a grammar node whose shape the grammar fixes.
pub(crate) fn next_child<'i, R: RuleType>(
    pairs: &mut Pairs<'i, R>,
    line: usize,
) -> Result<Pair<'i, R>> {
    pairs
        .next()
        .ok_or_else(|| Error::parse(line, "incomplete statement"))
}

/// Formats a float the way Python's `repr` does: shortest round-trip digits,
/// a trailing `.0` on integral values, and a signed two-digit exponent.
pub(crate) fn fmt_float(value: f64) -> String {
    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

/// Formats an integral value without a fractional part.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn fmt_int(value: f64) -> String {
    format!("{}", value.trunc() as i64)
}
