//! 2열 숫자 표(좌표, 값)를 재료 설명 파일의 표 조각으로 변환한다.

use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

use crate::units::{to_kelvin, TemperatureUnit};

/// 표 변환 시 발생 가능한 오류.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// 알 수 없는 단위 문자열
    #[error("알 수 없는 단위: {0}")]
    UnknownUnit(String),
    /// 숫자 2개로 읽을 수 없는 행
    #[error("{line}행을 읽을 수 없습니다: {reason}")]
    BadLine { line: usize, reason: String },
    /// 데이터 행이 하나도 없음
    #[error("변환할 데이터 행이 없습니다")]
    Empty,
    #[error("파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML 직렬화 오류: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// 변환 옵션. 좌표는 켈빈으로 바꾸고 값에는 배율을 곱한다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsvOptions {
    /// 입력 좌표의 온도 단위
    pub coord_unit: TemperatureUnit,
    /// 값 열에 곱할 배율
    pub scale: f64,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            coord_unit: TemperatureUnit::Kelvin,
            scale: 1.0,
        }
    }
}

/// `{<상태 변수>: [좌표...], values: [값...]}` 형태의 표 조각.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFragment {
    pub state_var: String,
    pub coordinates: Vec<f64>,
    pub values: Vec<f64>,
}

impl TableFragment {
    /// 1차원 표 표현에 그대로 붙여 넣을 수 있는 YAML을 만든다.
    pub fn to_yaml(&self) -> Result<String, ConversionError> {
        let mut doc: IndexMap<&str, &[f64]> = IndexMap::with_capacity(2);
        doc.insert(self.state_var.as_str(), &self.coordinates);
        doc.insert("values", &self.values);
        Ok(serde_yaml::to_string(&doc)?)
    }
}

/// 문자열로 전달된 온도 단위명을 enum으로 변환한다.
pub fn parse_temperature_unit(s: &str) -> Result<TemperatureUnit, ConversionError> {
    match s.trim().to_lowercase().as_str() {
        "k" | "kelvin" => Ok(TemperatureUnit::Kelvin),
        "c" | "celsius" | "°c" | "degc" => Ok(TemperatureUnit::Celsius),
        "f" | "fahrenheit" | "°f" | "degf" => Ok(TemperatureUnit::Fahrenheit),
        "r" | "rankine" | "degr" => Ok(TemperatureUnit::Rankine),
        _ => Err(ConversionError::UnknownUnit(s.to_string())),
    }
}

/// CSV 텍스트를 표 조각으로 변환한다.
///
/// 빈 행과 `#` 주석 행은 건너뛰고, 첫 데이터 행이 숫자가 아니면 머리글로 본다.
/// 구분자는 쉼표, 세미콜론, 공백을 모두 허용한다.
pub fn parse_csv(
    text: &str,
    state_var: &str,
    options: CsvOptions,
) -> Result<TableFragment, ConversionError> {
    let mut coordinates = Vec::new();
    let mut values = Vec::new();
    let mut header_allowed = true;
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        let parsed: Result<Vec<f64>, _> = fields.iter().map(|f| f.parse::<f64>()).collect();
        let row = match parsed {
            Ok(row) => row,
            Err(_) if header_allowed => {
                log::debug!("머리글 행 건너뜀: {line}");
                header_allowed = false;
                continue;
            }
            Err(e) => {
                return Err(ConversionError::BadLine {
                    line: idx + 1,
                    reason: e.to_string(),
                })
            }
        };
        header_allowed = false;
        if row.len() != 2 {
            return Err(ConversionError::BadLine {
                line: idx + 1,
                reason: format!("열이 2개여야 합니다 ({}개)", row.len()),
            });
        }
        coordinates.push(to_kelvin(row[0], options.coord_unit));
        values.push(row[1] * options.scale);
    }
    if coordinates.is_empty() {
        return Err(ConversionError::Empty);
    }
    Ok(TableFragment {
        state_var: state_var.to_string(),
        coordinates,
        values,
    })
}

/// CSV 파일을 읽어 YAML 표 조각 문자열로 변환한다.
pub fn csv_file_to_yaml(
    path: &Path,
    state_var: &str,
    options: CsvOptions,
) -> Result<String, ConversionError> {
    let text = std::fs::read_to_string(path)?;
    parse_csv(&text, state_var, options)?.to_yaml()
}
