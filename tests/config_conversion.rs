//! 설정 파일과 CSV 표 변환 테스트.
use std::path::PathBuf;

use engineering_materials::config::{self, Config};
use engineering_materials::conversion::{self, ConversionError, CsvOptions};
use engineering_materials::units::TemperatureUnit;
use engineering_materials::InterpMethod;

fn assert_close(label: &str, actual: f64, expected: f64, rel_tol: f64) {
    let denom = expected.abs().max(1.0);
    let diff = (actual - expected).abs();
    assert!(
        diff <= rel_tol * denom,
        "{label} expected {expected:.6} got {actual:.6} (diff {diff:.6}, tol {rel_tol})"
    );
}

fn tmp_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name)
}

#[test]
fn config_parses_partial_toml() {
    let cfg = Config::from_toml_str(
        r#"
database_dir = "/srv/materials"
[interpolation]
method = "nearest"
"#,
    )
    .unwrap();
    assert_eq!(cfg.database_dir(), PathBuf::from("/srv/materials"));
    assert_eq!(cfg.interpolation.method, InterpMethod::Nearest);
    assert!(cfg.interpolation.rescale);

    let args = cfg.model_args();
    assert_eq!(args.method, InterpMethod::Nearest);
    assert!(args.fill_value.is_nan());
}

#[test]
fn config_rejects_unknown_method() {
    assert!(Config::from_toml_str("[interpolation]\nmethod = \"spline\"\n").is_err());
}

#[test]
fn missing_config_is_created_with_defaults() {
    let path = tmp_path("config_roundtrip.toml");
    let _ = std::fs::remove_file(&path);
    let cfg = config::load_or_default_from(&path).unwrap();
    assert_eq!(cfg, Config::default());
    assert!(path.exists());

    let mut changed = cfg.clone();
    changed.interpolation.method = InterpMethod::Cubic;
    changed.save_to(&path).unwrap();
    assert_eq!(config::load_or_default_from(&path).unwrap(), changed);
}

#[test]
fn default_database_dir_ships_with_crate() {
    assert!(config::default_database_dir().join("copper.yaml").is_file());
}

#[test]
fn csv_fahrenheit_and_scale() {
    let csv = "temperature_F,k\n# 측정값\n32, 1.0\n212, 2.0\n";
    let options = CsvOptions {
        coord_unit: TemperatureUnit::Fahrenheit,
        scale: 10.0,
    };
    let fragment = conversion::parse_csv(csv, "temperature", options).unwrap();
    assert_close("0 C", fragment.coordinates[0], 273.15, 1e-12);
    assert_close("100 C", fragment.coordinates[1], 373.15, 1e-12);
    assert_eq!(fragment.values, vec![10.0, 20.0]);

    let yaml = fragment.to_yaml().unwrap();
    let parsed: indexmap::IndexMap<String, Vec<f64>> = serde_yaml::from_str(&yaml).unwrap();
    let keys: Vec<&String> = parsed.keys().collect();
    assert_eq!(keys, ["temperature", "values"]);
    assert_eq!(parsed["values"], vec![10.0, 20.0]);
}

#[test]
fn csv_whitespace_separated_without_header() {
    let fragment =
        conversion::parse_csv("1 2\n3\t4\n", "dose", CsvOptions::default()).unwrap();
    assert_eq!(fragment.coordinates, vec![1.0, 3.0]);
    assert_eq!(fragment.values, vec![2.0, 4.0]);
}

#[test]
fn csv_errors() {
    let err = conversion::parse_csv("1,2\nx,y\n", "t", CsvOptions::default()).unwrap_err();
    assert!(matches!(err, ConversionError::BadLine { line: 2, .. }), "{err:?}");

    let err = conversion::parse_csv("1,2,3\n", "t", CsvOptions::default()).unwrap_err();
    assert!(matches!(err, ConversionError::BadLine { line: 1, .. }));

    let err = conversion::parse_csv("# only comments\n", "t", CsvOptions::default()).unwrap_err();
    assert!(matches!(err, ConversionError::Empty));

    assert!(matches!(
        conversion::parse_temperature_unit("furlong"),
        Err(ConversionError::UnknownUnit(_))
    ));
    assert_eq!(
        conversion::parse_temperature_unit("F").unwrap(),
        TemperatureUnit::Fahrenheit
    );
}

#[test]
fn csv_file_round_trip() {
    let path = tmp_path("conductivity.csv");
    std::fs::write(&path, "T,k\n100,482\n300,401\n").unwrap();
    let yaml = conversion::csv_file_to_yaml(&path, "temperature", CsvOptions::default()).unwrap();
    assert!(yaml.contains("temperature:"));
    assert!(yaml.contains("values:"));
}
