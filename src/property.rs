//! 재료 물성(기본값 + 선택적 상태 의존 모델).

use std::fmt;

use indexmap::IndexMap;

use crate::error::{MaterialError, MaterialResult};
use crate::state::{QueryValue, State};
use crate::variation::{fmt_g, ModelArgs, VariationWithState};

/// 상태 정보 없이 기본값만 갖는 물성.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub default_value: f64,
    pub units: String,
    /// 출처(bibtex 태그 등)
    pub reference: String,
}

impl Property {
    pub fn new(
        name: impl Into<String>,
        default_value: f64,
        units: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            default_value,
            units: units.into(),
            reference: reference.into(),
        }
    }

    pub fn query_value(&self) -> f64 {
        self.default_value
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} {} [Data from {}]",
            self.name,
            fmt_g(self.default_value),
            self.units,
            self.reference
        )
    }
}

/// 상태(온도 등)에 따라 값이 달라지는 물성.
#[derive(Debug, Clone)]
pub struct StateDependentProperty {
    base: Property,
    variations_with_state: IndexMap<String, VariationWithState>,
    default_state_model: String,
}

impl StateDependentProperty {
    /// `default_state_model`이 `None`이면 처음 선언된 모델을 기본으로 쓴다.
    pub fn new(
        base: Property,
        variations_with_state: IndexMap<String, VariationWithState>,
        default_state_model: Option<String>,
    ) -> MaterialResult<Self> {
        let default_state_model = match default_state_model {
            Some(name) if variations_with_state.contains_key(&name) => name,
            Some(name) => {
                return Err(MaterialError::Construction(format!(
                    "기본 모델 '{name}'이(가) '{}'의 variations_with_state에 없습니다 (사용 가능: {})",
                    base.name,
                    join_keys(&variations_with_state)
                )))
            }
            None => variations_with_state
                .keys()
                .next()
                .cloned()
                .ok_or_else(|| {
                    MaterialError::Construction(format!(
                        "'{}'에 상태 의존 모델이 하나도 없습니다",
                        base.name
                    ))
                })?,
        };
        log::debug!(
            "상태 의존 물성 '{}' 생성: 모델 {}개, 기본 모델 '{}'",
            base.name,
            variations_with_state.len(),
            default_state_model
        );
        Ok(Self {
            base,
            variations_with_state,
            default_state_model,
        })
    }

    pub fn base(&self) -> &Property {
        &self.base
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }

    pub fn default_value(&self) -> f64 {
        self.base.default_value
    }

    pub fn units(&self) -> &str {
        &self.base.units
    }

    pub fn default_state_model(&self) -> &str {
        &self.default_state_model
    }

    pub fn variations_with_state(&self) -> &IndexMap<String, VariationWithState> {
        &self.variations_with_state
    }

    /// 이름으로 모델을 찾는다. 없으면 사용 가능한 이름을 담은 오류.
    pub fn variation(&self, model_name: &str) -> MaterialResult<&VariationWithState> {
        self.variations_with_state.get(model_name).ok_or_else(|| {
            MaterialError::not_found(
                "variation-with-state 모델",
                model_name,
                self.variations_with_state.keys(),
            )
        })
    }

    /// 상태에서 물성값을 계산한다. 모델 출력에 multiplier/override 규칙을 적용한다.
    pub fn query_value(
        &self,
        state: &State,
        model_name: Option<&str>,
        model_args: Option<&ModelArgs>,
    ) -> MaterialResult<QueryValue> {
        let model_name = model_name.unwrap_or(self.default_state_model.as_str());
        let model = self.variation(model_name)?;
        let default_args = ModelArgs::default();
        let raw = model.query_value(state, model_args.unwrap_or(&default_args))?;
        Ok(model.value_type().combine(self.base.default_value, raw))
    }
}

impl fmt::Display for StateDependentProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, a state-dependent property with a default value of {} {}",
            self.base.name,
            fmt_g(self.base.default_value),
            self.base.units
        )?;
        write!(f, "\n\tand with the following variation-with-state models:")?;
        for (name, model) in &self.variations_with_state {
            write!(f, "\n - {name}: {model}")?;
        }
        Ok(())
    }
}

/// 재료가 보유하는 물성. 단순 물성과 상태 의존 물성 중 하나.
#[derive(Debug, Clone)]
pub enum MaterialProperty {
    Simple(Property),
    StateDependent(StateDependentProperty),
}

impl MaterialProperty {
    pub fn base(&self) -> &Property {
        match self {
            MaterialProperty::Simple(p) => p,
            MaterialProperty::StateDependent(p) => p.base(),
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn units(&self) -> &str {
        &self.base().units
    }

    pub fn reference(&self) -> &str {
        &self.base().reference
    }

    /// 상태 정보가 없을 때의 값 (항상 기본값).
    pub fn query_value(&self) -> f64 {
        self.base().default_value
    }

    pub fn as_state_dependent(&self) -> Option<&StateDependentProperty> {
        match self {
            MaterialProperty::Simple(_) => None,
            MaterialProperty::StateDependent(p) => Some(p),
        }
    }

    /// 상태 의존 물성이면 상태에서 조회한다. 단순 물성은 상태를 받을 수 없다.
    pub fn query_value_at(
        &self,
        state: &State,
        model_name: Option<&str>,
        model_args: Option<&ModelArgs>,
    ) -> MaterialResult<QueryValue> {
        match self {
            MaterialProperty::StateDependent(p) => p.query_value(state, model_name, model_args),
            MaterialProperty::Simple(p) => Err(MaterialError::InvalidQuery(format!(
                "'{}'은(는) 상태에 따라 변하지 않는 물성입니다",
                p.name
            ))),
        }
    }
}

impl fmt::Display for MaterialProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialProperty::Simple(p) => fmt::Display::fmt(p, f),
            MaterialProperty::StateDependent(p) => fmt::Display::fmt(p, f),
        }
    }
}

fn join_keys<V>(map: &IndexMap<String, V>) -> String {
    map.keys().cloned().collect::<Vec<_>>().join(", ")
}
