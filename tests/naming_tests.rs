use hpo_convert::naming::{ParamValue, decode_params, decode_value, encode_name, parse_name};
use hpo_convert::{Error, LogBase};

#[test]
fn names_that_only_look_like_prefixes() {
    for raw in ["Quality", "LOGISTIC_x", "Q5_", "LOG_", "Qx_y", "log10_x"] {
        let parsed = parse_name(raw).unwrap();
        assert_eq!(parsed.name, raw);
        assert!(!parsed.is_tagged(), "{raw}");
    }
}

#[test]
fn natural_and_integer_bases() {
    assert_eq!(parse_name("LOG_x").unwrap().base, Some(LogBase::Natural));
    assert_eq!(parse_name("LOG2_x").unwrap().base, Some(LogBase::Integer(2)));
    assert!(matches!(
        parse_name("LOG2.5_x"),
        Err(Error::NonIntegerBase { .. })
    ));
    assert!(matches!(
        parse_name("LOG1_x"),
        Err(Error::InvalidLogBase { .. })
    ));
}

#[test]
fn steps() {
    assert_eq!(parse_name("Q16_units").unwrap().q, Some(16.0));
    assert_eq!(parse_name("Q0.5_x").unwrap().q, Some(0.5));
    assert!(matches!(parse_name("Q0_x"), Err(Error::InvalidStep { .. })));
    assert!(matches!(
        parse_name("Q2_Q4_x"),
        Err(Error::UnsupportedConstruct { .. })
    ));
}

#[test]
fn encoding_is_canonical() {
    assert_eq!(
        encode_name("x", Some(LogBase::Integer(10)), Some(5.0)),
        "Q5_LOG10_x"
    );
    assert_eq!(encode_name("x", Some(LogBase::Natural), None), "LOG_x");
    assert_eq!(encode_name("x", None, Some(0.25)), "Q0.25_x");
    assert_eq!(encode_name("x", None, None), "x");

    let parsed = parse_name(&encode_name("lr", Some(LogBase::Integer(2)), Some(0.5))).unwrap();
    assert_eq!(parsed.name, "lr");
    assert_eq!(parsed.base, Some(LogBase::Integer(2)));
    assert_eq!(parsed.q, Some(0.5));
}

#[test]
fn decode_wrapper_arguments() {
    let decoded = decode_params([
        ("LOG10_lr", "'-3'"),
        ("Q16_units", "130.0"),
        ("Q1_LOG2_batch", "5.2"),
        ("activation", "\"relu\""),
    ])
    .unwrap();

    assert!(matches!(decoded["lr"], ParamValue::Number(v) if (v - 0.001).abs() < 1e-15));
    assert_eq!(decoded["units"], ParamValue::Number(128.0));
    // 2^5.2 = 36.76..., snapped onto the integers.
    assert_eq!(decoded["batch"], ParamValue::Number(37.0));
    assert_eq!(decoded["activation"], ParamValue::Text("relu".to_owned()));
}

#[test]
fn decode_rejects_collisions_and_text() {
    assert!(matches!(
        decode_params([("x", "1"), ("LOG10_x", "0")]),
        Err(Error::DuplicateParameter(name)) if name == "x"
    ));
    assert!(matches!(
        decode_value("LOG10_x", "abc"),
        Err(Error::InvalidValue { .. })
    ));
}
