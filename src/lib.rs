#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Conversion of hyperparameter search spaces between optimizer formats, so
//! one benchmark definition can drive SMAC, Spearmint and TPE/hyperopt.
//!
//! # Getting Started
//!
//! ```
//! use hpo_convert::prelude::*;
//!
//! let pcs = "\
//! classifier {svm, rf} [svm]
//! C [0.001, 1000.0] [1.0]l
//! trees [10, 500] [255]i
//!
//! C | classifier in {svm}
//! trees | classifier in {rf}";
//!
//! let out = Converter::new()
//!     .convert(FormatKind::Smac, FormatKind::Tpe, pcs)
//!     .unwrap();
//! assert!(out.text.contains("classifier = hp.choice(\"classifier\", ["));
//! assert!(out.warnings.is_empty());
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Searchspace`] | Ordered, validated set of parameters; every format reads into and writes from it. |
//! | [`Parameter`] | A name, a [`Domain`] and the clauses under which it is active. |
//! | [`Domain`] | Categorical choices, or an integer/float range with optional log base and step. Bounds are in value space. |
//! | [`Clause`] | A conjunction of [`Condition`]s; a parameter's clauses are OR-ed. |
//! | [`SpaceFormat`] | Reader and writer for one format: [`SmacFormat`](format::SmacFormat), [`SpearmintFormat`](format::SpearmintFormat), [`TpeFormat`](format::TpeFormat). |
//! | [`Converter`] | Dispatches a `(from, to)` pair through its route table. |
//! | [`Diagnostics`] | Collects a [`Warning`] for every construct a conversion had to drop. |
//!
//! # Objective Wrapper Contract
//!
//! Formats without a native log scale or step get them through name
//! prefixes: `LOG10_lr` is searched in log space and `Q16_units` is snapped
//! to multiples of 16. The [`naming`] module decodes optimizer-side values
//! back into what the objective expects, and [`benchmarks`] shows the full
//! round trip.
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on the model and on warnings | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) for reads, writes and every lossy step | off |
//! | `cli` | The `hpo-convert` binary (enables `tracing`) | on |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

pub mod benchmarks;
pub mod condition;
pub mod convert;
pub mod diagnostics;
pub mod domain;
mod error;
pub mod format;
pub mod naming;
pub mod parameter;
pub mod space;

pub use condition::{Clause, Condition};
pub use convert::{Conversion, Converter, ConverterBuilder, Route};
pub use diagnostics::{Diagnostics, Warning};
pub use domain::{Domain, LogBase, NumericDomain};
pub use error::{Error, Result};
pub use format::{FormatKind, SpaceFormat};
pub use parameter::Parameter;
pub use space::Searchspace;

/// Convenient wildcard import for the most common types.
///
/// ```
/// use hpo_convert::prelude::*;
/// ```
pub mod prelude {
    pub use crate::benchmarks::{Benchmark, Branin, Camelback, Hartmann6, Michalewicz};
    pub use crate::condition::{Clause, Condition};
    pub use crate::convert::{Conversion, Converter, Route};
    pub use crate::diagnostics::{Diagnostics, Warning};
    pub use crate::domain::{Domain, LogBase, NumericDomain};
    pub use crate::error::{Error, Result};
    pub use crate::format::{FormatKind, SmacFormat, SpaceFormat, SpearmintFormat, TpeFormat};
    pub use crate::naming::{ParamValue, decode_params};
    pub use crate::parameter::Parameter;
    pub use crate::space::Searchspace;
}
