#![cfg(feature = "serde")]

use hpo_convert::prelude::*;

fn sample_space() -> Searchspace {
    Searchspace::from_parameters([
        Parameter::categorical("classifier", ["svm", "nn"]),
        Parameter::float("C", 0.03125, 32768.0)
            .log(LogBase::Integer(2))
            .when(Condition::equals("classifier", "svm")),
        Parameter::integer("neurons", 16, 1024)
            .quantized(16.0)
            .when(Condition::one_of("classifier", ["nn"])),
    ])
    .unwrap()
}

#[test]
fn searchspace_round_trips_through_json() {
    let space = sample_space();
    let json = serde_json::to_string(&space).unwrap();
    let back: Searchspace = serde_json::from_str(&json).unwrap();
    assert_eq!(back, space);
}

#[test]
fn searchspace_serializes_as_parameter_list() {
    let json = serde_json::to_value(sample_space()).unwrap();
    let params = json.as_array().unwrap();
    assert_eq!(params.len(), 3);
    assert_eq!(params[0]["name"], "classifier");
}

#[test]
fn deserializing_revalidates() {
    let mut json = serde_json::to_value(sample_space()).unwrap();
    let first = json[0].clone();
    json.as_array_mut().unwrap().push(first);
    let result: core::result::Result<Searchspace, serde_json::Error> =
        serde_json::from_value(json);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("classifier"), "{err}");
}

#[test]
fn unconditional_parameter_may_omit_clauses() {
    let json = serde_json::to_value(vec![Parameter::float("x", 0.0, 1.0)]).unwrap();
    let mut param = json[0].clone();
    param.as_object_mut().unwrap().remove("clauses");
    let back: Parameter = serde_json::from_value(param).unwrap();
    assert_eq!(back, Parameter::float("x", 0.0, 1.0));
}

#[test]
fn warnings_serialize() {
    let out = Converter::new()
        .convert(
            FormatKind::Smac,
            FormatKind::Spearmint,
            "a {x, y} [x]\nb [0, 1] [0.5]\n\nb | a in {x}",
        )
        .unwrap();
    let json = serde_json::to_string(&out.warnings).unwrap();
    let back: Vec<Warning> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, out.warnings);
}

#[test]
fn format_kind_serializes() {
    let json = serde_json::to_string(&FormatKind::Tpe).unwrap();
    let back: FormatKind = serde_json::from_str(&json).unwrap();
    assert_eq!(back, FormatKind::Tpe);
}
