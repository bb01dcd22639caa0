//! Conditional clauses that gate a parameter on the value of another.
//!
//! A parameter carries a list of [`Clause`]s. The parameter is active when any
//! clause holds (OR), and a clause holds when all of its [`Condition`]s hold
//! (AND). Only membership tests against a literal set are representable:
//!
//! ```
//! use hpo_convert::condition::Condition;
//!
//! let cond: Condition = "classifier in {svm, nn}".parse().unwrap();
//! assert!(cond.matches("svm"));
//!
//! // Comparisons other than equality are rejected, never dropped.
//! assert!("layers > 3".parse::<Condition>().is_err());
//! ```

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Operators that look like conditions but cannot be represented.
const UNSUPPORTED_OPERATORS: [&str; 6] = ["!=", "<>", "<=", ">=", "<", ">"];

/// "`parent` takes one of `values`".
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Condition {
    /// The name of the parameter this condition tests.
    pub parent: String,
    /// The accepted parent values.
    pub values: Vec<String>,
}

impl Condition {
    /// `parent == value`.
    #[must_use]
    pub fn equals(parent: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            values: vec![value.into()],
        }
    }

    /// `parent in {values}`.
    #[must_use]
    pub fn one_of<I, S>(parent: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parent: parent.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a parent value satisfies this condition.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    fn union(&mut self, other: &Condition) {
        for value in &other.values {
            if !self.values.contains(value) {
                self.values.push(value.clone());
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [value] = self.values.as_slice() {
            write!(f, "{} == {value}", self.parent)
        } else {
            write!(f, "{} in {{{}}}", self.parent, self.values.join(","))
        }
    }
}

impl FromStr for Condition {
    type Err = Error;

    /// Parses `parent == v`, `parent = v`, `parent in {a, b}` or `parent in [a, b]`.
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let unsupported = |name: &str| Error::UnsupportedCondition {
            name: name.to_owned(),
            condition: text.to_owned(),
        };

        if let Some((parent, rest)) = split_keyword(text, "in") {
            let rest = rest.trim();
            let inner = rest
                .strip_prefix('{')
                .and_then(|r| r.strip_suffix('}'))
                .or_else(|| rest.strip_prefix('[').and_then(|r| r.strip_suffix(']')))
                .ok_or_else(|| unsupported(parent))?;
            let values: Vec<String> = inner
                .split(',')
                .map(|v| v.trim().trim_matches(|c| c == '"' || c == '\'').to_owned())
                .filter(|v| !v.is_empty())
                .collect();
            if parent.is_empty() || values.is_empty() {
                return Err(unsupported(parent));
            }
            return Ok(Condition::one_of(parent, values));
        }

        if let Some(op) = UNSUPPORTED_OPERATORS.iter().find(|op| text.contains(**op)) {
            let parent = text.split(*op).next().unwrap_or_default().trim();
            return Err(unsupported(parent));
        }

        let (parent, value) = text
            .split_once("==")
            .or_else(|| text.split_once('='))
            .ok_or_else(|| unsupported(text))?;
        let parent = parent.trim();
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        if parent.is_empty() || value.is_empty() || parent.contains(char::is_whitespace) {
            return Err(unsupported(parent));
        }
        Ok(Condition::equals(parent, value))
    }
}

/// Splits `text` around a whitespace-delimited keyword.
fn split_keyword<'a>(text: &'a str, keyword: &str) -> Option<(&'a str, &'a str)> {
    let mut words = text.splitn(2, char::is_whitespace);
    let first = words.next()?;
    let rest = words.next()?.trim_start();
    let after = rest.strip_prefix(keyword)?;
    if after.starts_with(|c: char| c.is_whitespace() || c == '{' || c == '[') {
        Some((first, after))
    } else {
        None
    }
}

/// A conjunction of conditions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Clause {
    conditions: Vec<Condition>,
}

impl Clause {
    /// Creates an empty clause (always true).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a conjunct.
    #[must_use]
    pub fn and(mut self, condition: Condition) -> Self {
        self.push(condition);
        self
    }

    /// Adds a conjunct in place. A second condition on the same parent
    /// intersects with the first.
    pub fn push(&mut self, condition: Condition) {
        if let Some(existing) = self
            .conditions
            .iter_mut()
            .find(|c| c.parent == condition.parent)
        {
            existing.values.retain(|v| condition.values.contains(v));
        } else {
            self.conditions.push(condition);
        }
    }

    /// The conjuncts in insertion order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Whether the clause has no conjuncts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The conjunct on `parent`, if any.
    #[must_use]
    pub fn get(&self, parent: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.parent == parent)
    }

    fn same_parents(&self, other: &Clause) -> bool {
        self.conditions.len() == other.conditions.len()
            && self
                .conditions
                .iter()
                .all(|c| other.get(&c.parent).is_some())
    }

    /// Merges `other` into `self` if the two differ only in the values of a
    /// single parent.
    fn try_absorb(&mut self, other: &Clause) -> bool {
        if !self.same_parents(other) {
            return false;
        }
        let differing: Vec<usize> = self
            .conditions
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                let theirs = other.get(&c.parent).map(|o| &o.values);
                !theirs.is_some_and(|values| same_set(&c.values, values))
            })
            .map(|(i, _)| i)
            .collect();
        match differing.as_slice() {
            [] => true,
            [i] => {
                let parent = self.conditions[*i].parent.clone();
                if let Some(theirs) = other.get(&parent) {
                    self.conditions[*i].union(theirs);
                }
                true
            }
            _ => false,
        }
    }
}

impl From<Condition> for Clause {
    fn from(condition: Condition) -> Self {
        Clause::new().and(condition)
    }
}

impl FromIterator<Condition> for Clause {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        let mut clause = Clause::new();
        for condition in iter {
            clause.push(condition);
        }
        clause
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.conditions.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" && "))
    }
}

fn same_set(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().all(|v| b.contains(v))
}

/// Simplifies a disjunction of clauses.
///
/// Any empty clause makes the whole disjunction true, which is returned as an
/// empty list. Duplicates are removed, and clauses over the same parents
/// that differ in exactly one parent's values are unioned, so
/// `[a == x] OR [a == y]` becomes `[a in {x, y}]`.
#[must_use]
pub fn merge_clauses(clauses: Vec<Clause>) -> Vec<Clause> {
    if clauses.iter().any(Clause::is_empty) {
        return Vec::new();
    }
    let mut merged: Vec<Clause> = Vec::with_capacity(clauses.len());
    for clause in clauses {
        if !merged.iter_mut().any(|m| m.try_absorb(&clause)) {
            merged.push(clause);
        }
    }
    // A union can make two earlier clauses mergeable.
    loop {
        let mut changed = false;
        let mut i = 0;
        while i < merged.len() {
            let mut j = i + 1;
            while j < merged.len() {
                let other = merged[j].clone();
                if merged[i].try_absorb(&other) {
                    merged.remove(j);
                    changed = true;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        if !changed {
            return merged;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_equality() {
        let cond: Condition = "classifier == svm".parse().unwrap();
        assert_eq!(cond, Condition::equals("classifier", "svm"));
        let cond: Condition = "kernel=rbf".parse().unwrap();
        assert_eq!(cond, Condition::equals("kernel", "rbf"));
    }

    #[test]
    fn parse_membership() {
        let cond: Condition = "a_or_b in {a,b}".parse().unwrap();
        assert_eq!(cond, Condition::one_of("a_or_b", ["a", "b"]));
        let cond: Condition = "x in [\"1\", '2']".parse().unwrap();
        assert_eq!(cond, Condition::one_of("x", ["1", "2"]));
    }

    #[test]
    fn parse_rejects_comparisons() {
        for text in ["layers > 3", "layers < 3", "layers >= 3", "layers != 3"] {
            let err = text.parse::<Condition>().unwrap_err();
            assert!(
                matches!(&err, Error::UnsupportedCondition { name, .. } if name == "layers"),
                "{text}: {err}"
            );
            assert!(err.to_string().contains("not implemented"));
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("just words".parse::<Condition>().is_err());
        assert!("x in {}".parse::<Condition>().is_err());
        assert!("x in svm".parse::<Condition>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for text in ["classifier == svm", "a in {x,y}"] {
            let cond: Condition = text.parse().unwrap();
            assert_eq!(cond.to_string(), text);
        }
    }

    #[test]
    fn clause_push_intersects_same_parent() {
        let clause = Clause::new()
            .and(Condition::one_of("a", ["x", "y"]))
            .and(Condition::equals("a", "y"));
        assert_eq!(clause.conditions(), &[Condition::equals("a", "y")]);
    }

    #[test]
    fn merge_unions_single_difference() {
        let merged = merge_clauses(vec![
            Condition::equals("a", "x").into(),
            Condition::equals("a", "y").into(),
        ]);
        assert_eq!(merged, vec![Clause::from(Condition::one_of("a", ["x", "y"]))]);
    }

    #[test]
    fn merge_keeps_unrelated_clauses() {
        let merged = merge_clauses(vec![
            Condition::equals("a", "x").into(),
            Condition::equals("b", "y").into(),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merge_with_unconditional_clause_is_unconditional() {
        let merged = merge_clauses(vec![Condition::equals("a", "x").into(), Clause::new()]);
        assert!(merged.is_empty());
    }

    #[test]
    fn merge_multi_parent_clauses() {
        let merged = merge_clauses(vec![
            Clause::new()
                .and(Condition::equals("a", "x"))
                .and(Condition::equals("b", "1")),
            Clause::new()
                .and(Condition::equals("a", "x"))
                .and(Condition::equals("b", "2")),
            Clause::new()
                .and(Condition::equals("a", "x"))
                .and(Condition::equals("b", "1")),
        ]);
        assert_eq!(
            merged,
            vec![
                Clause::new()
                    .and(Condition::equals("a", "x"))
                    .and(Condition::one_of("b", ["1", "2"]))
            ]
        );
    }
}
