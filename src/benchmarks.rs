//! Closed-form benchmark functions and their search spaces.
//!
//! A [`Benchmark`] pairs an objective with the [`Searchspace`] it is defined
//! on, so the same definition can be converted into every optimizer format
//! and then evaluated on whatever those optimizers propose.
//!
//! ```
//! use hpo_convert::benchmarks::{Benchmark, Branin};
//!
//! // SMAC hands out `-x` and `-y`; a TPE run on a log-encoded space would
//! // hand out prefixed names, which decode the same way.
//! let value = Branin
//!     .evaluate_encoded([("x", "3.141592653589793"), ("y", "2.275")])
//!     .unwrap();
//! assert!((value - 0.397887).abs() < 1e-5);
//! ```

use std::collections::BTreeMap;

use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::naming::{ParamValue, decode_params};
use crate::parameter::Parameter;
use crate::space::Searchspace;

const HARTMANN6_ALPHA: [f64; 4] = [1.0, 1.2, 3.0, 3.2];

const HARTMANN6_A: [[f64; 6]; 4] = [
    [10.0, 3.0, 17.0, 3.5, 1.7, 8.0],
    [0.05, 10.0, 17.0, 0.1, 8.0, 14.0],
    [3.0, 3.5, 1.7, 10.0, 17.0, 8.0],
    [17.0, 8.0, 0.05, 10.0, 0.1, 14.0],
];

const HARTMANN6_P: [[f64; 6]; 4] = [
    [0.1312, 0.1696, 0.5569, 0.0124, 0.8283, 0.5886],
    [0.2329, 0.4135, 0.8307, 0.3736, 0.1004, 0.9991],
    [0.2348, 0.1451, 0.3522, 0.2883, 0.3047, 0.6650],
    [0.4047, 0.8828, 0.8732, 0.5743, 0.1091, 0.0381],
];

/// Branin function. Three global minima with f* ≈ 0.397887, at
/// `(-π, 12.275)`, `(π, 2.275)` and `(9.42478, 2.475)`.
#[must_use]
pub fn branin(x: f64, y: f64) -> f64 {
    let pi = core::f64::consts::PI;
    let b = 5.1 / (4.0 * pi * pi);
    let c = 5.0 / pi;
    let t = 1.0 / (8.0 * pi);
    (y - b * x * x + c * x - 6.0).powi(2) + 10.0 * (1.0 - t) * x.cos() + 10.0
}

/// Hartmann 6D function. Global minimum f* ≈ -3.32237 at
/// `(0.20169, 0.150011, 0.476874, 0.275332, 0.311652, 0.6573)`.
#[must_use]
pub fn hartmann6(x: &[f64; 6]) -> f64 {
    let mut result = 0.0;
    for ((alpha, a), p) in HARTMANN6_ALPHA.iter().zip(&HARTMANN6_A).zip(&HARTMANN6_P) {
        let inner: f64 = x
            .iter()
            .zip(a.iter().zip(p))
            .map(|(xj, (aj, pj))| aj * (xj - pj).powi(2))
            .sum();
        result -= alpha * (-inner).exp();
    }
    result
}

/// Michalewicz function with steepness `m` (usually 10) on `[0, π]^d`.
/// In two dimensions f* ≈ -1.8013 at `(2.20, 1.57)`; in ten, f* ≈ -9.66015.
#[must_use]
pub fn michalewicz(x: &[f64], m: i32) -> f64 {
    let pi = core::f64::consts::PI;
    -x.iter()
        .zip(1u32..)
        .map(|(xi, i)| xi.sin() * (f64::from(i) * xi * xi / pi).sin().powi(2 * m))
        .sum::<f64>()
}

/// Six-hump camelback function. Two global minima with f* ≈ -1.031628, at
/// `(0.0898, -0.7126)` and `(-0.0898, 0.7126)`.
#[must_use]
pub fn camelback(x: f64, y: f64) -> f64 {
    let x2 = x * x;
    (4.0 - 2.1 * x2 + x2 * x2 / 3.0) * x2 + x * y + (-4.0 + 4.0 * y * y) * y * y
}

/// An objective function together with its search space.
pub trait Benchmark {
    /// Short name of the benchmark.
    fn name(&self) -> &'static str;

    /// The search space the function is defined on.
    fn searchspace(&self) -> Searchspace;

    /// Evaluates the function on decoded parameter values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameter`], [`Error::InvalidValue`] or
    /// [`Error::OutOfDomain`].
    fn evaluate(&self, params: &BTreeMap<String, ParamValue>) -> Result<f64>;

    /// Decodes optimizer-side `(name, value)` pairs, undoing any `LOG`/`Q`
    /// prefixes, and evaluates the function on the result.
    ///
    /// # Errors
    ///
    /// Returns a decoding error, or any error of [`evaluate`](Self::evaluate).
    fn evaluate_encoded<I, K, V>(&self, params: I) -> Result<f64>
    where
        Self: Sized,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let decoded = decode_params(params)?;
        self.evaluate(&decoded)
    }
}

/// Looks up `name` and checks it against its bounds in `space`.
fn bounded(
    space: &Searchspace,
    params: &BTreeMap<String, ParamValue>,
    name: &str,
) -> Result<f64> {
    let value = params
        .get(name)
        .ok_or_else(|| Error::MissingParameter(name.to_owned()))?
        .as_f64(name)?;
    if let Some(Domain::Float(domain) | Domain::Integer(domain)) =
        space.get(name).map(Parameter::domain)
        && !(domain.lower..=domain.upper).contains(&value)
    {
        return Err(Error::OutOfDomain {
            name: name.to_owned(),
            value,
            lower: domain.lower,
            upper: domain.upper,
        });
    }
    Ok(value)
}

/// The Branin function on `x ∈ [-5, 10]`, `y ∈ [0, 15]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Branin;

impl Benchmark for Branin {
    fn name(&self) -> &'static str {
        "branin"
    }

    fn searchspace(&self) -> Searchspace {
        Searchspace::from_trusted(vec![
            Parameter::float("x", -5.0, 10.0),
            Parameter::float("y", 0.0, 15.0),
        ])
    }

    fn evaluate(&self, params: &BTreeMap<String, ParamValue>) -> Result<f64> {
        let space = self.searchspace();
        let x = bounded(&space, params, "x")?;
        let y = bounded(&space, params, "y")?;
        Ok(branin(x, y))
    }
}

/// The 6D Hartmann function on the unit cube, over parameters
/// `x, y, z, a, b, c`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hartmann6;

impl Hartmann6 {
    const PARAMS: [&'static str; 6] = ["x", "y", "z", "a", "b", "c"];
}

impl Benchmark for Hartmann6 {
    fn name(&self) -> &'static str {
        "hartmann6"
    }

    fn searchspace(&self) -> Searchspace {
        Searchspace::from_trusted(
            Self::PARAMS
                .iter()
                .map(|name| Parameter::float(*name, 0.0, 1.0))
                .collect(),
        )
    }

    fn evaluate(&self, params: &BTreeMap<String, ParamValue>) -> Result<f64> {
        let space = self.searchspace();
        let mut x = [0.0; 6];
        for (xi, name) in x.iter_mut().zip(Self::PARAMS) {
            *xi = bounded(&space, params, name)?;
        }
        Ok(hartmann6(&x))
    }
}

/// The 10D Michalewicz function with `m = 10`, over parameters
/// `x1, ..., x10` in `[0, π]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Michalewicz;

impl Michalewicz {
    const PARAMS: [&'static str; 10] = [
        "x1", "x2", "x3", "x4", "x5", "x6", "x7", "x8", "x9", "x10",
    ];
    const M: i32 = 10;
}

impl Benchmark for Michalewicz {
    fn name(&self) -> &'static str {
        "michalewicz"
    }

    fn searchspace(&self) -> Searchspace {
        Searchspace::from_trusted(
            Self::PARAMS
                .iter()
                .map(|name| Parameter::float(*name, 0.0, core::f64::consts::PI))
                .collect(),
        )
    }

    fn evaluate(&self, params: &BTreeMap<String, ParamValue>) -> Result<f64> {
        let space = self.searchspace();
        let x = Self::PARAMS
            .iter()
            .map(|name| bounded(&space, params, name))
            .collect::<Result<Vec<_>>>()?;
        Ok(michalewicz(&x, Self::M))
    }
}

/// The six-hump camelback function on `x ∈ [-2, 2]`, `y ∈ [-1, 1]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Camelback;

impl Benchmark for Camelback {
    fn name(&self) -> &'static str {
        "camelback"
    }

    fn searchspace(&self) -> Searchspace {
        Searchspace::from_trusted(vec![
            Parameter::float("x", -2.0, 2.0),
            Parameter::float("y", -1.0, 1.0),
        ])
    }

    fn evaluate(&self, params: &BTreeMap<String, ParamValue>) -> Result<f64> {
        let space = self.searchspace();
        let x = bounded(&space, params, "x")?;
        let y = bounded(&space, params, "y")?;
        Ok(camelback(x, y))
    }
}
