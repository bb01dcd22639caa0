//! Dispatch between formats.
//!
//! A [`Converter`] owns one configured instance of each format and a route
//! table naming which `(from, to)` pairs it will convert. Every conversion
//! reads into a [`Searchspace`] and writes it back out, possibly through an
//! intermediate format when a route asks for it.

use std::collections::BTreeMap;
use std::path::Path;

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::format::{FormatKind, SmacFormat, SpaceFormat, SpearmintFormat, TpeFormat};
use crate::space::Searchspace;

/// How a `(from, to)` pair is converted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Read `from`, write `to`.
    Direct,
    /// Convert to the given format first, then from it to the target.
    Via(FormatKind),
}

/// The result of a conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    /// The converted search space.
    pub text: String,
    /// Everything the conversion could not carry over.
    pub warnings: Vec<Warning>,
}

/// Converts search spaces between formats.
///
/// # Examples
///
/// ```
/// use hpo_convert::convert::Converter;
/// use hpo_convert::format::FormatKind;
///
/// let converter = Converter::new();
/// let out = converter
///     .convert(FormatKind::Smac, FormatKind::Tpe, "x [-5, 10] [2.5]\n")
///     .unwrap();
/// assert!(out.text.contains("x = hp.uniform(\"x\", -5.0, 10.0)"));
/// assert!(out.warnings.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct Converter {
    smac: SmacFormat,
    spearmint: SpearmintFormat,
    tpe: TpeFormat,
    routes: BTreeMap<(FormatKind, FormatKind), Route>,
}

impl Default for Converter {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Converter {
    /// Creates a converter with default formats and every pair routed directly.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a builder for configuring formats and routes.
    #[must_use]
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }

    /// The format instance used for `kind`.
    #[must_use]
    pub fn format(&self, kind: FormatKind) -> &dyn SpaceFormat {
        match kind {
            FormatKind::Smac => &self.smac,
            FormatKind::Spearmint => &self.spearmint,
            FormatKind::Tpe => &self.tpe,
        }
    }

    /// The route for a pair, if it is supported.
    #[must_use]
    pub fn route(&self, from: FormatKind, to: FormatKind) -> Option<Route> {
        self.routes.get(&(from, to)).copied()
    }

    /// Parses `text` as `kind`.
    ///
    /// # Errors
    ///
    /// Returns the reader's error.
    pub fn read(&self, kind: FormatKind, text: &str) -> Result<(Searchspace, Vec<Warning>)> {
        let mut diag = Diagnostics::new();
        let space = self.format(kind).read(text, &mut diag)?;
        Ok((space, diag.into_warnings()))
    }

    /// Renders `space` as `kind`.
    ///
    /// # Errors
    ///
    /// Returns the writer's error.
    pub fn write(&self, kind: FormatKind, space: &Searchspace) -> Result<Conversion> {
        let mut diag = Diagnostics::new();
        let text = self.format(kind).write(space, &mut diag)?;
        Ok(Conversion {
            text,
            warnings: diag.into_warnings(),
        })
    }

    /// Converts `text` from one format to another.
    ///
    /// Converting a format to itself returns the input unchanged with a
    /// [`Warning::SameFormat`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedConversion`] for a pair without a route,
    /// or the first reader or writer error.
    pub fn convert(&self, from: FormatKind, to: FormatKind, text: &str) -> Result<Conversion> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("convert", %from, %to).entered();

        if from == to {
            let mut diag = Diagnostics::new();
            diag.push(Warning::SameFormat(from));
            return Ok(Conversion {
                text: text.to_owned(),
                warnings: diag.into_warnings(),
            });
        }

        let mut diag = Diagnostics::new();
        let text = match self.route(from, to) {
            Some(Route::Direct) => self.hop(from, to, text, &mut diag)?,
            Some(Route::Via(mid)) if mid != from && mid != to => {
                trace_info!(%mid, "converting through an intermediate format");
                let staged = self.hop(from, mid, text, &mut diag)?;
                self.hop(mid, to, &staged, &mut diag)?
            }
            _ => return Err(Error::UnsupportedConversion { from, to }),
        };
        Ok(Conversion {
            text,
            warnings: diag.into_warnings(),
        })
    }

    /// Reads the file at `path` and converts it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as
    /// [`convert`](Self::convert).
    pub fn convert_file(
        &self,
        from: FormatKind,
        to: FormatKind,
        path: impl AsRef<Path>,
    ) -> Result<Conversion> {
        let text = std::fs::read_to_string(path.as_ref())?;
        self.convert(from, to, &text)
    }

    fn hop(
        &self,
        from: FormatKind,
        to: FormatKind,
        text: &str,
        diag: &mut Diagnostics,
    ) -> Result<String> {
        let space = self.format(from).read(text, diag)?;
        trace_info!(
            n_params = space.len(),
            n_conditional = space.n_conditional(),
            "read {from} space"
        );
        let out = self.format(to).write(&space, diag)?;
        trace_info!(n_warnings = diag.warnings().len(), "wrote {to} space");
        Ok(out)
    }
}

/// A builder for [`Converter`].
///
/// # Defaults
///
/// - Formats: [`SmacFormat::new`], [`SpearmintFormat::new`], [`TpeFormat::new`]
/// - Routes: every ordered pair of distinct formats, [`Route::Direct`]
///
/// # Examples
///
/// ```
/// use hpo_convert::convert::{Converter, Route};
/// use hpo_convert::format::{FormatKind, TpeFormat};
///
/// let converter = Converter::builder()
///     .tpe(TpeFormat::new().space_name("config"))
///     .route(FormatKind::Spearmint, FormatKind::Tpe, Route::Via(FormatKind::Smac))
///     .remove_route(FormatKind::Tpe, FormatKind::Spearmint)
///     .build();
///
/// assert_eq!(
///     converter.route(FormatKind::Spearmint, FormatKind::Tpe),
///     Some(Route::Via(FormatKind::Smac))
/// );
/// assert_eq!(converter.route(FormatKind::Tpe, FormatKind::Spearmint), None);
/// ```
#[derive(Clone, Debug)]
pub struct ConverterBuilder {
    smac: SmacFormat,
    spearmint: SpearmintFormat,
    tpe: TpeFormat,
    routes: BTreeMap<(FormatKind, FormatKind), Route>,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        let mut routes = BTreeMap::new();
        for from in FormatKind::ALL {
            for to in FormatKind::ALL {
                if from != to {
                    routes.insert((from, to), Route::Direct);
                }
            }
        }
        Self {
            smac: SmacFormat::new(),
            spearmint: SpearmintFormat::new(),
            tpe: TpeFormat::new(),
            routes,
        }
    }

    /// Sets the SMAC reader/writer.
    #[must_use]
    pub fn smac(mut self, format: SmacFormat) -> Self {
        self.smac = format;
        self
    }

    /// Sets the Spearmint reader/writer.
    #[must_use]
    pub fn spearmint(mut self, format: SpearmintFormat) -> Self {
        self.spearmint = format;
        self
    }

    /// Sets the TPE reader/writer.
    #[must_use]
    pub fn tpe(mut self, format: TpeFormat) -> Self {
        self.tpe = format;
        self
    }

    /// Declares or replaces the route for a pair.
    #[must_use]
    pub fn route(mut self, from: FormatKind, to: FormatKind, route: Route) -> Self {
        self.routes.insert((from, to), route);
        self
    }

    /// Removes a pair, making it unsupported.
    #[must_use]
    pub fn remove_route(mut self, from: FormatKind, to: FormatKind) -> Self {
        self.routes.remove(&(from, to));
        self
    }

    /// Builds the [`Converter`].
    #[must_use]
    pub fn build(self) -> Converter {
        Converter {
            smac: self.smac,
            spearmint: self.spearmint,
            tpe: self.tpe,
            routes: self.routes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::Parameter;

    #[test]
    fn default_routes_cover_all_pairs() {
        let converter = Converter::new();
        for from in FormatKind::ALL {
            for to in FormatKind::ALL {
                let expected = (from != to).then_some(Route::Direct);
                assert_eq!(converter.route(from, to), expected);
            }
        }
    }

    #[test]
    fn same_format_passes_through() {
        let out = Converter::new()
            .convert(FormatKind::Smac, FormatKind::Smac, "not even pcs")
            .unwrap();
        assert_eq!(out.text, "not even pcs");
        assert_eq!(out.warnings, [Warning::SameFormat(FormatKind::Smac)]);
    }

    #[test]
    fn removed_route_is_unsupported() {
        let converter = Converter::builder()
            .remove_route(FormatKind::Smac, FormatKind::Tpe)
            .build();
        let err = converter
            .convert(FormatKind::Smac, FormatKind::Tpe, "x [0, 1] [0.5]")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedConversion {
                from: FormatKind::Smac,
                to: FormatKind::Tpe
            }
        ));
        assert_eq!(
            err.to_string(),
            "conversion from SMAC to TPE is not yet implemented"
        );
    }

    #[test]
    fn via_route_through_an_endpoint_is_unsupported() {
        let converter = Converter::builder()
            .route(FormatKind::Smac, FormatKind::Tpe, Route::Via(FormatKind::Tpe))
            .build();
        assert!(matches!(
            converter.convert(FormatKind::Smac, FormatKind::Tpe, "x [0, 1] [0.5]"),
            Err(Error::UnsupportedConversion { .. })
        ));
    }

    #[test]
    fn via_route_collects_both_hops() {
        let converter = Converter::builder()
            .route(
                FormatKind::Smac,
                FormatKind::Tpe,
                Route::Via(FormatKind::Spearmint),
            )
            .build();
        let pcs = "a {x, y} [x]\nb [0, 1] [0.5]\n\nb | a in {x}";
        let out = converter
            .convert(FormatKind::Smac, FormatKind::Tpe, pcs)
            .unwrap();
        // Spearmint drops the condition, so b comes out top-level.
        assert!(out.text.contains("space = {\"a\": a, \"b\": b}"));
        assert!(matches!(
            out.warnings.as_slice(),
            [Warning::DroppedCondition { .. }]
        ));
    }

    #[test]
    fn read_and_write_single_hops() {
        let converter = Converter::new();
        let (space, warnings) = converter
            .read(FormatKind::Smac, "x [0, 1] [0.5]\n")
            .unwrap();
        assert!(warnings.is_empty());
        assert_eq!(space.get("x"), Some(&Parameter::float("x", 0.0, 1.0)));

        let out = converter.write(FormatKind::Spearmint, &space).unwrap();
        assert!(out.text.contains("type: FLOAT"));
    }

    #[test]
    fn convert_file_reports_missing_input() {
        let err = Converter::new()
            .convert_file(FormatKind::Smac, FormatKind::Tpe, "/nonexistent/params.pcs")
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
