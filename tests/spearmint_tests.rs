use hpo_convert::diagnostics::Diagnostics;
use hpo_convert::format::spearmint::Language;
use hpo_convert::format::{SpaceFormat, SpearmintFormat};
use hpo_convert::{Domain, Error, LogBase, NumericDomain, Parameter, Searchspace};

const CONFIG: &str = r#"language: PYTHON
name: "HPOlib.cv"

variable {
 name: "LOG10_lr"
 type: FLOAT
 size: 1
 min: -5
 max: -1
}

variable {
 name: "Q16_units"
 type: INT
 size: 1
 min: 16
 max: 512
}

variable {
 name: "activation"
 type: ENUM
 size: 1
 options: "relu"
 options: "tanh"
}
"#;

#[test]
fn read_config() {
    let space = SpearmintFormat::new()
        .read(CONFIG, &mut Diagnostics::new())
        .unwrap();
    assert_eq!(
        space.names().collect::<Vec<_>>(),
        ["lr", "units", "activation"]
    );
    assert!(space.get("lr").unwrap().domain().approx_eq(
        &Domain::Float(NumericDomain::new(1e-5, 0.1).log(LogBase::Integer(10))),
        1e-12
    ));
    assert_eq!(
        space.get("units").unwrap().domain(),
        &Domain::Integer(NumericDomain::new(16.0, 512.0).quantized(16.0))
    );
    assert_eq!(
        space.get("activation").unwrap().domain(),
        &Domain::categorical(["relu", "tanh"])
    );
}

#[test]
fn config_round_trips() {
    let format = SpearmintFormat::new();
    let space = format.read(CONFIG, &mut Diagnostics::new()).unwrap();
    let text = format.write(&space, &mut Diagnostics::new()).unwrap();
    let back = format.read(&text, &mut Diagnostics::new()).unwrap();
    assert!(back.approx_eq(&space, 1e-12));
}

#[test]
fn integer_log_is_written_as_snapped_float() {
    let space = Searchspace::from_parameters([
        Parameter::integer("n", 1, 100).log(LogBase::Integer(10)),
    ])
    .unwrap();
    let format = SpearmintFormat::new();
    let text = format.write(&space, &mut Diagnostics::new()).unwrap();
    assert!(text.contains(
        "  name: \"Q1_LOG10_n\"\n  size: 1\n  type: FLOAT\n  min: 0.0\n  max: 2.0\n"
    ));

    // The wrapper snaps values back onto the integers; the model keeps a
    // float with step 1.
    let back = format.read(&text, &mut Diagnostics::new()).unwrap();
    assert_eq!(
        back.get("n").unwrap().domain(),
        &Domain::Float(
            NumericDomain::new(1.0, 100.0)
                .log(LogBase::Integer(10))
                .quantized(1.0)
        )
    );
}

#[test]
fn language_names() {
    assert_eq!("python".parse::<Language>().unwrap(), Language::Python);
    assert_eq!("MATLAB".parse::<Language>().unwrap(), Language::Matlab);
    assert!(matches!(
        "fortran".parse::<Language>(),
        Err(Error::UnsupportedConstruct { .. })
    ));
}

#[test]
fn read_rejects_unknown_field() {
    let err = SpearmintFormat::new()
        .read("language: PYTHON\nseed: 3\n", &mut Diagnostics::new())
        .unwrap_err();
    assert!(matches!(err, Error::Parse { line: 2, .. }));
}
