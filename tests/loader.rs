//! 재료 설명 파일 로드 테스트.
use std::path::PathBuf;

use engineering_materials::config::Config;
use engineering_materials::loader::{self, LoadError, MaterialDocument};
use engineering_materials::{InterpMethod, MaterialError, ModelArgs, Representation, State};

fn assert_close(label: &str, actual: f64, expected: f64, rel_tol: f64) {
    let denom = expected.abs().max(1.0);
    let diff = (actual - expected).abs();
    assert!(
        diff <= rel_tol * denom,
        "{label} expected {expected:.6} got {actual:.6} (diff {diff:.6}, tol {rel_tol})"
    );
}

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("materials_data")
}

fn test_config() -> Config {
    Config {
        database_dir: Some(data_dir()),
        ..Config::default()
    }
}

const TEST_MATERIAL: &str = r#"
name: Test Metal
category: metal
references: ["@misc{test_ref, title={Test}}"]
forms:
  sheet:
    conditions:
      annealed:
        properties:
          density:
            default_value: 1000.0
            units: kg/m^3
            reference: test_ref
          conductivity:
            default_value: 2.0
            units: W/(m K)
            reference: test_ref
            variations_with_state:
              squares:
                representation: table
                state_vars: [temperature]
                state_vars_units: {temperature: K}
                value_type: multiplier
                reference: test_ref
                temperature: [3, 0, 2, 1]
                values: [9, 0, 4, 1]
              exposure:
                representation: table
                state_vars: [exposure_time, temperature]
                state_vars_units: {exposure_time: h, temperature: K}
                value_type: multiplier
                reference: test_ref
                exposure_time:
                  0.0:
                    temperature: [0, 1, 2, 3]
                    values: [0, 1, 4, 9]
                  "0.1":
                    temperature: [0, 1, 2, 3]
                    values: [0.01, 1.21, 4.41, 9.61]
              fit:
                representation: equation
                state_vars: [temperature]
                state_vars_units: {temperature: K}
                value_type: multiplier
                reference: test_ref
                expression: "value = temperature**2"
                state_domain:
                  temperature: [0, 1000]
"#;

fn variation_yaml(body: &str) -> String {
    format!(
        r#"
name: Broken
forms:
  f:
    conditions:
      c:
        properties:
          k:
            default_value: 1.0
            units: W/(m K)
            reference: r
            variations_with_state:
              m:
{body}
"#
    )
}

fn broken(body: &str) -> MaterialError {
    let doc = MaterialDocument::from_yaml_str(&variation_yaml(body)).expect("yaml");
    doc.material("f", "c").unwrap_err()
}

#[test]
fn parses_inline_document() {
    let doc = MaterialDocument::from_yaml_str(TEST_MATERIAL).unwrap();
    assert_eq!(doc.forms().collect::<Vec<_>>(), ["sheet"]);
    assert_eq!(doc.conditions("sheet").unwrap(), ["annealed"]);

    let material = doc.material("sheet", "annealed").unwrap();
    assert_eq!(material.name, "Test Metal");
    assert_eq!(material.category.as_deref(), Some("metal"));

    let k = material.property("conductivity").unwrap();
    let sd = k.as_state_dependent().expect("state dependent");
    assert_eq!(sd.default_state_model(), "squares");
    let names: Vec<&String> = sd.variations_with_state().keys().collect();
    assert_eq!(names, ["squares", "exposure", "fit"]);

    let t2 = State::new().with("temperature", 2.0);
    assert_eq!(k.query_value_at(&t2, None, None).unwrap().as_scalar(), Some(8.0));
    assert_eq!(k.query_value_at(&t2, Some("fit"), None).unwrap().as_scalar(), Some(8.0));

    let state = State::new().with("exposure_time", 0.1).with("temperature", 3.0);
    let v = k.query_value_at(&state, Some("exposure"), None).unwrap();
    assert_close("19.22", v.as_scalar().unwrap(), 19.22, 1e-12);

    assert!(matches!(
        sd.variation("fit").unwrap().representation(),
        Representation::Equation(_)
    ));
    assert!(k.as_state_dependent().is_some());
    assert!(material.property("density").unwrap().as_state_dependent().is_none());
}

#[test]
fn missing_form_or_condition_lists_valid_names() {
    let doc = MaterialDocument::from_yaml_str(TEST_MATERIAL).unwrap();
    match doc.material("plate", "annealed").unwrap_err() {
        MaterialError::NotFound { kind, valid, .. } => {
            assert_eq!(kind, "form");
            assert_eq!(valid, ["sheet"]);
        }
        other => panic!("unexpected error {other:?}"),
    }
    match doc.material("sheet", "T6").unwrap_err() {
        MaterialError::NotFound { kind, valid, .. } => {
            assert_eq!(kind, "condition");
            assert_eq!(valid, ["annealed"]);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn construction_errors() {
    let unknown_repr = broken(
        "                representation: spline
                state_vars: [temperature]
                state_vars_units: {temperature: K}
                value_type: override
                reference: r",
    );
    assert!(matches!(unknown_repr, MaterialError::Construction(_)), "{unknown_repr:?}");

    let three_vars = broken(
        "                representation: table
                state_vars: [a, b, c]
                state_vars_units: {a: K, b: K, c: K}
                value_type: override
                reference: r",
    );
    assert!(matches!(three_vars, MaterialError::Construction(_)));

    let bad_value_type = broken(
        "                representation: table
                state_vars: [temperature]
                state_vars_units: {temperature: K}
                value_type: additive
                reference: r
                temperature: [0, 1]
                values: [0, 1]",
    );
    assert!(matches!(bad_value_type, MaterialError::Construction(_)));

    let missing_unit = broken(
        "                representation: table
                state_vars: [temperature]
                state_vars_units: {}
                value_type: override
                reference: r
                temperature: [0, 1]
                values: [0, 1]",
    );
    assert!(matches!(missing_unit, MaterialError::Construction(_)));

    let missing_field = broken(
        "                representation: table
                state_vars: [temperature]
                state_vars_units: {temperature: K}
                value_type: override
                temperature: [0, 1]
                values: [0, 1]",
    );
    assert!(matches!(missing_field, MaterialError::Construction(_)));

    let unsafe_expression = broken(
        "                representation: equation
                state_vars: [temperature]
                state_vars_units: {temperature: K}
                value_type: override
                reference: r
                expression: \"value = 1; import os\"
                state_domain: {temperature: [0, 1]}",
    );
    assert!(matches!(unsafe_expression, MaterialError::UnsafeExpression(_)));
}

#[test]
fn malformed_yaml_is_a_yaml_error() {
    let err = MaterialDocument::from_yaml_str("name: [unclosed").unwrap_err();
    assert!(matches!(err, LoadError::Yaml(_)));
}

#[test]
fn copper_from_database() {
    let material = loader::load(&test_config(), "copper", "wire", "annealed").unwrap();
    let k = material.property("thermal_conductivity").unwrap();
    let at_300 = k
        .query_value_at(&State::new().with("temperature", 300.0), None, None)
        .unwrap();
    assert_eq!(at_300.as_scalar(), Some(401.0));

    let cryo = k
        .query_value_at(
            &State::new().with("temperature", 4.0),
            Some("cryogenic_rrr50"),
            None,
        )
        .unwrap();
    assert_close("k(4 K)", cryo.as_scalar().unwrap(), 630.0, 1e-9);

    let sd = k.as_state_dependent().unwrap();
    let (lo, hi) = sd.variation("cryogenic_rrr50").unwrap().get_state_domain()["temperature"];
    assert_close("lo", lo, 4.0, 1e-12);
    assert_close("hi", hi, 300.0, 1e-12);

    let rho = material.property("electrical_resistivity").unwrap();
    let v = rho
        .query_value_at(&State::new().with("temperature", 293.15), None, None)
        .unwrap();
    assert_close("rho(20 C)", v.as_scalar().unwrap(), 1.724e-8, 1e-12);
}

#[test]
fn al6061_two_d_tables() {
    let path = data_dir().join("Al_6061.yaml");
    let material = loader::load_from_yaml(&path, "plate", "T6").unwrap();
    let ys = material.property("yield_strength").unwrap();

    let state = State::new().with("exposure_time", 10.0).with("temperature", 477.0);
    let v = ys.query_value_at(&state, None, None).unwrap();
    assert_close("ys", v.as_scalar().unwrap(), 276.0e6 * 0.62, 1e-9);

    let logged = ys
        .query_value_at(&state, Some("post_exposure"), None)
        .unwrap();
    assert_close("post", logged.as_scalar().unwrap(), 276.0e6 * 0.88, 1e-9);

    let nearest = ModelArgs::with_method(InterpMethod::Nearest);
    let far = State::new().with("exposure_time", 5000.0).with("temperature", 600.0);
    let v = ys.query_value_at(&far, None, Some(&nearest)).unwrap();
    assert_close("nearest", v.as_scalar().unwrap(), 276.0e6 * 0.12, 1e-9);
    assert!(ys.query_value_at(&far, None, None).unwrap().as_scalar().unwrap().is_nan());

    let o = loader::load_from_yaml(&path, "plate", "O").unwrap();
    assert_eq!(o.property("yield_strength").unwrap().query_value(), 55.0e6);
}

#[test]
fn missing_file_is_io_error() {
    let err = loader::load(&test_config(), "unobtainium", "bar", "raw").unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }), "{err:?}");
}

#[test]
fn resolves_names_and_paths() {
    let cfg = test_config();
    assert_eq!(
        loader::resolve_material_path(&cfg, "copper"),
        data_dir().join("copper.yaml")
    );
    let direct = data_dir().join("Al_6061.yaml");
    let direct_str = direct.to_string_lossy().into_owned();
    assert_eq!(loader::resolve_material_path(&cfg, &direct_str), direct);
}
