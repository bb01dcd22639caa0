use hpo_convert::diagnostics::Diagnostics;
use hpo_convert::format::{SpaceFormat, TpeFormat};
use hpo_convert::{Clause, Condition, Domain, Error, LogBase, NumericDomain, Parameter, Searchspace};

const HEADER: &str = "from hyperopt import hp\nimport hyperopt.pyll as pyll\n\n";

fn write(space: &Searchspace) -> String {
    TpeFormat::new()
        .write(space, &mut Diagnostics::new())
        .unwrap()
}

fn read(text: &str) -> Searchspace {
    TpeFormat::new()
        .read(text, &mut Diagnostics::new())
        .unwrap()
}

fn complex_space() -> Searchspace {
    Searchspace::from_parameters([
        Parameter::float("C", 0.03125, 32768.0)
            .log(LogBase::Integer(2))
            .when(Condition::equals("classifier", "svm")),
        Parameter::float("gamma", 2f64.powi(-15), 8.0)
            .log(LogBase::Integer(2))
            .when(Condition::equals("kernel", "rbf")),
        Parameter::categorical("kernel", ["linear", "rbf"])
            .when(Condition::equals("classifier", "svm")),
        Parameter::float("lr", 0.0001, 1.0).when(Condition::equals("classifier", "nn")),
        Parameter::integer("neurons", 16, 1024)
            .quantized(16.0)
            .when(Condition::equals("classifier", "nn")),
        Parameter::categorical("classifier", ["nn", "svm"]),
        Parameter::categorical("preprocessing", ["None", "pca"]),
    ])
    .unwrap()
}

#[test]
fn write_plain_space() {
    let space = Searchspace::from_parameters([
        Parameter::float("a", 0.0, 1.0),
        Parameter::float("b", 0.0, 3.0).quantized(0.1),
    ])
    .unwrap();
    let expected = format!(
        "{HEADER}a = hp.uniform(\"a\", 0.0, 1.0)\n\
         b = hp.quniform(\"b\", 0.0, 3.0, 0.1)\n\n\
         space = {{\"a\": a, \"b\": b}}\n"
    );
    assert_eq!(write(&space), expected);
}

#[test]
fn write_complex_space() {
    let expected = format!(
        "{HEADER}\
lr = hp.uniform(\"lr\", 0.0001, 1.0)
neurons = pyll.scope.int(hp.quniform(\"neurons\", 16.0, 1024.0, 16.0))
LOG2_C = hp.uniform(\"LOG2_C\", -5.0, 15.0)
LOG2_gamma = hp.uniform(\"LOG2_gamma\", -15.0, 3.0)
kernel = hp.choice(\"kernel\", [
    {{\"kernel\": \"linear\", }},
    {{\"kernel\": \"rbf\", \"LOG2_gamma\": LOG2_gamma, }},
    ])
classifier = hp.choice(\"classifier\", [
    {{\"classifier\": \"nn\", \"lr\": lr, \"neurons\": neurons, }},
    {{\"classifier\": \"svm\", \"LOG2_C\": LOG2_C, \"kernel\": kernel, }},
    ])
preprocessing = hp.choice(\"preprocessing\", [
    {{\"preprocessing\": \"None\", }},
    {{\"preprocessing\": \"pca\", }},
    ])

space = {{\"classifier\": classifier, \"preprocessing\": preprocessing}}
"
    );
    assert_eq!(write(&complex_space()), expected);
}

#[test]
fn written_space_reads_back() {
    let back = read(&write(&complex_space()));
    assert_eq!(back.len(), 7);

    let c = back.get("C").unwrap();
    assert!(c.domain().approx_eq(
        &Domain::Float(NumericDomain::new(0.03125, 32768.0).log(LogBase::Integer(2))),
        1e-12
    ));
    assert_eq!(
        c.clauses(),
        &[Clause::from(Condition::equals("classifier", "svm"))]
    );

    let neurons = back.get("neurons").unwrap();
    assert_eq!(
        neurons.domain(),
        &Domain::Integer(NumericDomain::new(16.0, 1024.0).quantized(16.0))
    );

    let gamma = back.get("gamma").unwrap();
    assert_eq!(
        gamma.clauses(),
        &[Clause::new()
            .and(Condition::equals("classifier", "svm"))
            .and(Condition::equals("kernel", "rbf"))]
    );
    assert!(!back.get("preprocessing").unwrap().is_conditional());
}

#[test]
fn read_hand_written_module() {
    let text = r#"
import numpy as np
from hyperopt import hp
import hyperopt.pyll as pyll

# learning rate on a natural log scale
lr = hp.loguniform("lr", np.log(1e-4), np.log(1.0))
units = pyll.scope.int(hp.quniform("units", 32, 512, 32))

layers = hp.choice("layers", [
    {"layers": "one", "units_1": units},
    {"layers": "two", "units_1": units, "dropout": hp.uniform("dropout", 0.0, 0.5)},
])

space = {"lr": lr, "arch": layers}
"#;
    let space = read(text);
    assert_eq!(space.names().collect::<Vec<_>>(), ["lr", "layers", "units", "dropout"]);

    let lr = space.get("lr").unwrap().domain().numeric().unwrap();
    assert!((lr.lower - 1e-4).abs() < 1e-15);
    assert!((lr.upper - 1.0).abs() < f64::EPSILON);
    assert_eq!(lr.base, Some(LogBase::Natural));

    assert_eq!(
        space.get("units").unwrap().clauses(),
        &[Clause::from(Condition::one_of("layers", ["one", "two"]))]
    );
    assert_eq!(
        space.get("dropout").unwrap().clauses(),
        &[Clause::from(Condition::equals("layers", "two"))]
    );
}

#[test]
fn read_pchoice_and_positional_options() {
    let space = read(
        "space = hp.pchoice('opt', [(0.7, 'adam'), (0.3, {'opt': 'sgd', 'm': hp.uniform('m', 0, 1)})])",
    );
    assert_eq!(
        space.get("opt").unwrap().domain(),
        &Domain::categorical(["adam", "sgd"])
    );
    assert_eq!(
        space.get("m").unwrap().clauses(),
        &[Clause::from(Condition::equals("opt", "sgd"))]
    );
}

#[test]
fn read_keyword_arguments() {
    let space = read("space = {'x': hp.quniform(label='x', low=0, high=10, q=2)}");
    assert_eq!(
        space.get("x").unwrap().domain(),
        &Domain::Float(NumericDomain::new(0.0, 10.0).quantized(2.0))
    );
}

#[test]
fn read_rejects_unknown_distribution() {
    let err = TpeFormat::new()
        .read(
            "space = {'x': hp.beta('x', 1, 2)}",
            &mut Diagnostics::new(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedConstruct { name, .. } if name == "x"));
}

#[test]
fn read_rejects_statements() {
    let err = TpeFormat::new()
        .read(
            "def f():\n    return 1\nspace = {}\n",
            &mut Diagnostics::new(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedConstruct { .. } | Error::Parse { .. }));
}
