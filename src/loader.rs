//! YAML 재료 설명 파일을 읽어 [`Material`]을 만든다.
//!
//! 파일 구조: `name`, `category`, `references`, `forms.<form>.conditions.<condition>.properties`.
//! 물성에 `variations_with_state`가 있으면 상태 의존 물성으로 만든다. 2차원 표의
//! "표의 표" 구조는 여기서 단면 목록([`TableData::TwoD`])으로 평탄화한다.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;
use crate::error::{MaterialError, MaterialResult};
use crate::expression::EquationModel;
use crate::interp::{AxisScale, ScatterTable, TableData, TableSlice, MAX_STATE_VARS};
use crate::material::Material;
use crate::property::{MaterialProperty, Property, StateDependentProperty};
use crate::variation::{Representation, ValueType, VariationWithState};

/// 재료 파일 로드 중 발생 가능한 오류.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("재료 파일을 읽을 수 없습니다 ({path}): {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML 파싱 오류: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Material(#[from] MaterialError),
}

/// 재료 설명 파일 전체.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialDocument {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,
    pub forms: IndexMap<String, FormDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormDocument {
    pub conditions: IndexMap<String, ConditionDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionDocument {
    #[serde(default)]
    pub properties: IndexMap<String, PropertyDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyDocument {
    pub default_value: Option<f64>,
    pub units: Option<String>,
    pub reference: Option<String>,
    /// 없으면 처음 선언된 모델이 기본
    #[serde(default)]
    pub default_state_model: Option<String>,
    #[serde(default)]
    pub variations_with_state: Option<IndexMap<String, VariationDocument>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariationDocument {
    pub representation: Option<String>,
    pub state_vars: Option<Vec<String>>,
    #[serde(default)]
    pub state_vars_units: IndexMap<String, String>,
    pub value_type: Option<String>,
    pub reference: Option<String>,
    #[serde(default)]
    pub state_vars_interp_scales: Vec<AxisScale>,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default)]
    pub state_domain: IndexMap<String, (f64, f64)>,
    #[serde(default)]
    pub values: Option<Vec<f64>>,
    /// 상태 변수 이름을 키로 하는 표 좌표(1차원) 또는 단면 매핑(2차원)
    #[serde(flatten)]
    pub columns: IndexMap<String, serde_yaml::Value>,
}

impl MaterialDocument {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("재료 파일 읽기: {}", path.display());
        Self::from_yaml_str(&content)
    }

    /// 선언 순서대로의 형태 이름.
    pub fn forms(&self) -> impl Iterator<Item = &str> {
        self.forms.keys().map(String::as_str)
    }

    pub fn conditions(&self, form: &str) -> MaterialResult<Vec<&str>> {
        Ok(self.form(form)?.conditions.keys().map(String::as_str).collect())
    }

    fn form(&self, form: &str) -> MaterialResult<&FormDocument> {
        self.forms
            .get(form)
            .ok_or_else(|| MaterialError::not_found("form", form, self.forms.keys()))
    }

    /// 형태/조건을 골라 재료를 만든다. 없는 형태/조건은 not-found 오류.
    pub fn material(&self, form: &str, condition: &str) -> MaterialResult<Material> {
        let form_doc = self.form(form)?;
        let condition_doc = form_doc.conditions.get(condition).ok_or_else(|| {
            MaterialError::not_found("condition", condition, form_doc.conditions.keys())
        })?;
        let properties = build_properties(&condition_doc.properties)?;
        Ok(Material::new(
            self.name.clone(),
            form,
            condition,
            self.category.clone(),
            self.subcategory.clone(),
            self.references.clone(),
            properties,
        ))
    }
}

/// 파일에서 지정한 형태/조건의 재료를 읽는다.
pub fn load_from_yaml(
    path: impl AsRef<Path>,
    form: &str,
    condition: &str,
) -> Result<Material, LoadError> {
    let doc = MaterialDocument::open(path)?;
    Ok(doc.material(form, condition)?)
}

/// 경로 또는 데이터베이스 디렉터리 안의 재료 이름(`<이름>.yaml`)을 파일 경로로 바꾼다.
pub fn resolve_material_path(config: &Config, name_or_path: &str) -> PathBuf {
    let direct = PathBuf::from(name_or_path);
    if direct.is_file() {
        return direct;
    }
    let file_name = if direct.extension().is_some() {
        name_or_path.to_string()
    } else {
        format!("{name_or_path}.yaml")
    };
    config.database_dir().join(file_name)
}

/// 데이터베이스 디렉터리에서 재료를 찾아 읽는다.
pub fn load(
    config: &Config,
    name_or_path: &str,
    form: &str,
    condition: &str,
) -> Result<Material, LoadError> {
    load_from_yaml(resolve_material_path(config, name_or_path), form, condition)
}

pub fn build_properties(
    docs: &IndexMap<String, PropertyDocument>,
) -> MaterialResult<IndexMap<String, MaterialProperty>> {
    docs.iter()
        .map(|(name, doc)| Ok((name.clone(), build_property(name, doc)?)))
        .collect()
}

pub fn build_property(name: &str, doc: &PropertyDocument) -> MaterialResult<MaterialProperty> {
    let base = Property::new(
        name,
        required(doc.default_value, name, "default_value")?,
        required(doc.units.clone(), name, "units")?,
        required(doc.reference.clone(), name, "reference")?,
    );
    let Some(variation_docs) = &doc.variations_with_state else {
        return Ok(MaterialProperty::Simple(base));
    };
    let mut variations = IndexMap::with_capacity(variation_docs.len());
    for (model_name, vdoc) in variation_docs {
        let model = build_variation(model_name, vdoc).map_err(|e| match e {
            MaterialError::Construction(msg) => {
                MaterialError::Construction(format!("{name}.{model_name}: {msg}"))
            }
            other => other,
        })?;
        variations.insert(model_name.clone(), model);
    }
    if doc.default_state_model.is_none() && variations.len() > 1 {
        log::warn!(
            "'{name}'에 기본 모델이 지정되지 않아 처음 선언된 모델을 사용합니다"
        );
    }
    Ok(MaterialProperty::StateDependent(StateDependentProperty::new(
        base,
        variations,
        doc.default_state_model.clone(),
    )?))
}

pub fn build_variation(name: &str, doc: &VariationDocument) -> MaterialResult<VariationWithState> {
    let state_vars = required(doc.state_vars.clone(), name, "state_vars")?;
    let value_type: ValueType = required(doc.value_type.clone(), name, "value_type")?.parse()?;
    let reference = required(doc.reference.clone(), name, "reference")?;
    let representation = required(doc.representation.clone(), name, "representation")?;
    if state_vars.is_empty() || state_vars.len() > MAX_STATE_VARS {
        return Err(MaterialError::Construction(format!(
            "상태 변수는 1개 또는 {MAX_STATE_VARS}개까지만 지원합니다 (요청: {}개)",
            state_vars.len()
        )));
    }

    let representation = match representation.as_str() {
        "table" => {
            let data = table_data(doc, &state_vars)?;
            Representation::Table(ScatterTable::new(
                state_vars.clone(),
                data,
                doc.state_vars_interp_scales.clone(),
            )?)
        }
        "equation" => {
            let expression = required(doc.expression.clone(), name, "expression")?;
            Representation::Equation(EquationModel::new(
                state_vars.clone(),
                &expression,
                doc.state_domain.clone(),
            )?)
        }
        other => {
            return Err(MaterialError::Construction(format!(
                "알 수 없는 표현 방식 '{other}' (table, equation 중 선택)"
            )))
        }
    };
    VariationWithState::new(
        state_vars,
        doc.state_vars_units.clone(),
        value_type,
        reference,
        representation,
    )
}

fn required<T>(value: Option<T>, owner: &str, field: &str) -> MaterialResult<T> {
    value.ok_or_else(|| {
        MaterialError::Construction(format!("'{owner}'에 필수 필드 '{field}'가 없습니다"))
    })
}

fn table_data(doc: &VariationDocument, state_vars: &[String]) -> MaterialResult<TableData> {
    let first = &state_vars[0];
    let column = doc.columns.get(first).ok_or_else(|| {
        MaterialError::Construction(format!("표에 상태 변수 '{first}' 좌표가 없습니다"))
    })?;
    if state_vars.len() == 1 {
        let values = doc
            .values
            .clone()
            .ok_or_else(|| MaterialError::Construction("표에 'values'가 없습니다".into()))?;
        return Ok(TableData::OneD {
            coords: number_list(column, first)?,
            values,
        });
    }

    let second = &state_vars[1];
    let mapping = column.as_mapping().ok_or_else(|| {
        MaterialError::Construction(format!(
            "2차원 표의 '{first}'는 값별 단면 매핑이어야 합니다"
        ))
    })?;
    let mut slices = Vec::with_capacity(mapping.len());
    for (key, slice) in mapping {
        let key = number_key(key, first)?;
        let coords = slice.get(second.as_str()).ok_or_else(|| {
            MaterialError::Construction(format!("'{first}'={key} 단면에 '{second}' 좌표가 없습니다"))
        })?;
        let values = slice.get("values").ok_or_else(|| {
            MaterialError::Construction(format!("'{first}'={key} 단면에 'values'가 없습니다"))
        })?;
        slices.push(TableSlice {
            key,
            coords: number_list(coords, second)?,
            values: number_list(values, "values")?,
        });
    }
    Ok(TableData::TwoD(slices))
}

fn number_list(value: &serde_yaml::Value, label: &str) -> MaterialResult<Vec<f64>> {
    serde_yaml::from_value(value.clone()).map_err(|e| {
        MaterialError::Construction(format!("'{label}'는 숫자 목록이어야 합니다: {e}"))
    })
}

fn number_key(key: &serde_yaml::Value, label: &str) -> MaterialResult<f64> {
    let parsed = match key {
        serde_yaml::Value::Number(n) => n.as_f64(),
        serde_yaml::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        MaterialError::Construction(format!("'{label}' 단면 키 {key:?}는 숫자가 아닙니다"))
    })
}
