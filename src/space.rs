//! The [`Searchspace`]: every parameter of an optimization problem.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parameter::Parameter;

/// An ordered collection of uniquely named parameters.
///
/// Insertion order decides the order of emitted lines, but it is not part of
/// equality: two spaces are equal when they hold the same parameters.
///
/// ```
/// use hpo_convert::{Parameter, Searchspace};
///
/// let space = Searchspace::from_parameters([
///     Parameter::float("x", -5.0, 10.0),
///     Parameter::float("y", 0.0, 15.0),
/// ])
/// .unwrap();
/// assert_eq!(space.names().collect::<Vec<_>>(), ["x", "y"]);
/// ```
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<Parameter>", into = "Vec<Parameter>")
)]
pub struct Searchspace {
    params: Vec<Parameter>,
    index: HashMap<String, usize>,
}

impl Searchspace {
    /// Creates an empty space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a space from parameters and checks its conditions.
    ///
    /// # Errors
    ///
    /// Returns an error if a name repeats, a domain is invalid or a clause
    /// references an undefined parameter.
    pub fn from_parameters(params: impl IntoIterator<Item = Parameter>) -> Result<Self> {
        let mut space = Self::new();
        for param in params {
            space.insert(param)?;
        }
        space.validate_conditions()?;
        Ok(space)
    }

    /// Builds a space from parameters known to be valid.
    pub(crate) fn from_trusted(params: Vec<Parameter>) -> Self {
        let index = params
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name().to_owned(), i))
            .collect();
        Self { params, index }
    }

    /// Appends a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateParameter`] if the name is taken, or the
    /// domain validation error.
    pub fn insert(&mut self, param: Parameter) -> Result<()> {
        if self.index.contains_key(param.name()) {
            return Err(Error::DuplicateParameter(param.name().to_owned()));
        }
        param.validate()?;
        self.index.insert(param.name().to_owned(), self.params.len());
        self.params.push(param);
        Ok(())
    }

    /// Checks that every clause references a defined parameter other than
    /// its own.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UndefinedParameter`] for an unknown parent and
    /// [`Error::UnsupportedCondition`] for a self-reference.
    pub fn validate_conditions(&self) -> Result<()> {
        for param in &self.params {
            for clause in param.clauses() {
                for condition in clause.conditions() {
                    if condition.parent == param.name() {
                        return Err(Error::UnsupportedCondition {
                            name: param.name().to_owned(),
                            condition: condition.to_string(),
                        });
                    }
                    if !self.contains(&condition.parent) {
                        return Err(Error::UndefinedParameter(condition.parent.clone()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.index.get(name).map(|&i| &self.params[i])
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.index.get(name).map(|&i| &mut self.params[i])
    }

    /// Whether a parameter with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterates parameters in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    /// Iterates parameter names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(Parameter::name)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the space has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of parameters gated by at least one clause.
    #[must_use]
    pub fn n_conditional(&self) -> usize {
        self.params.iter().filter(|p| p.is_conditional()).count()
    }

    /// Compares two spaces parameter by parameter, allowing bounds to differ
    /// by a relative `rel_tol` and ignoring insertion order.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, rel_tol: f64) -> bool {
        self.len() == other.len()
            && self.params.iter().all(|p| {
                other
                    .get(p.name())
                    .is_some_and(|theirs| p.approx_eq(theirs, rel_tol))
            })
    }
}

impl PartialEq for Searchspace {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .params
                .iter()
                .all(|p| other.get(p.name()).is_some_and(|theirs| p == theirs))
    }
}

impl<'a> IntoIterator for &'a Searchspace {
    type Item = &'a Parameter;
    type IntoIter = core::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl TryFrom<Vec<Parameter>> for Searchspace {
    type Error = Error;

    fn try_from(params: Vec<Parameter>) -> Result<Self> {
        Self::from_parameters(params)
    }
}

impl From<Searchspace> for Vec<Parameter> {
    fn from(space: Searchspace) -> Self {
        space.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;

    fn branin_space() -> Searchspace {
        Searchspace::from_parameters([
            Parameter::float("x", -5.0, 10.0),
            Parameter::float("y", 0.0, 15.0),
        ])
        .unwrap()
    }

    #[test]
    fn insert_and_lookup() {
        let space = branin_space();
        assert_eq!(space.len(), 2);
        assert!(space.contains("x"));
        assert_eq!(space.get("y").unwrap().name(), "y");
        assert!(space.get("z").is_none());
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut space = branin_space();
        let err = space.insert(Parameter::float("x", 0.0, 1.0)).unwrap_err();
        assert!(matches!(err, Error::DuplicateParameter(name) if name == "x"));
    }

    #[test]
    fn invalid_domain_rejected() {
        let mut space = Searchspace::new();
        assert!(space.insert(Parameter::float("x", 2.0, 1.0)).is_err());
        assert!(space.is_empty());
    }

    #[test]
    fn undefined_parent_rejected() {
        let result = Searchspace::from_parameters([
            Parameter::float("x", 0.0, 1.0).when(Condition::equals("missing", "a")),
        ]);
        assert!(matches!(result, Err(Error::UndefinedParameter(name)) if name == "missing"));
    }

    #[test]
    fn self_reference_rejected() {
        let result = Searchspace::from_parameters([
            Parameter::categorical("c", ["a", "b"]).when(Condition::equals("c", "a")),
        ]);
        assert!(matches!(result, Err(Error::UnsupportedCondition { .. })));
    }

    #[test]
    fn equality_ignores_order() {
        let reversed = Searchspace::from_parameters([
            Parameter::float("y", 0.0, 15.0),
            Parameter::float("x", -5.0, 10.0),
        ])
        .unwrap();
        assert_eq!(branin_space(), reversed);
    }

    #[test]
    fn counts_conditional_parameters() {
        let space = Searchspace::from_parameters([
            Parameter::categorical("c", ["a", "b"]),
            Parameter::float("x", 0.0, 1.0).when(Condition::equals("c", "a")),
        ])
        .unwrap();
        assert_eq!(space.n_conditional(), 1);
    }
}
