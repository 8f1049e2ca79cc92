//! 물성값의 상태 의존 변화 모델(표/수식)과 표현 방식별 분기.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::{MaterialError, MaterialResult};
use crate::expression::{self, EquationModel};
use crate::interp::{ScatterTable, MAX_STATE_VARS};
use crate::state::{QueryValue, State};

pub use crate::interp::ModelArgs;

/// 모델 출력값을 기본값과 결합하는 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// 최종값 = 기본값 × 모델 출력
    Multiplier,
    /// 최종값 = 모델 출력
    Override,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Multiplier => "multiplier",
            ValueType::Override => "override",
        }
    }

    /// 모델 원시 출력에 결합 규칙을 적용한다.
    pub fn combine(self, default_value: f64, raw: QueryValue) -> QueryValue {
        match self {
            ValueType::Multiplier => raw.map(|v| default_value * v),
            ValueType::Override => raw,
        }
    }
}

impl FromStr for ValueType {
    type Err = MaterialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiplier" => Ok(ValueType::Multiplier),
            "override" => Ok(ValueType::Override),
            other => Err(MaterialError::Construction(format!(
                "value_type \"{other}\"은(는) 허용되지 않습니다 (허용: multiplier, override)"
            ))),
        }
    }
}

/// 모델의 표현 방식. 새 방식은 변형과 엔진을 추가하는 것으로 확장한다.
#[derive(Debug, Clone)]
pub enum Representation {
    Table(ScatterTable),
    Equation(EquationModel),
}

impl Representation {
    pub fn name(&self) -> &'static str {
        match self {
            Representation::Table(_) => "table",
            Representation::Equation(_) => "equation",
        }
    }
}

/// 이름 붙은 상태 의존 변화 모델.
#[derive(Debug, Clone)]
pub struct VariationWithState {
    state_vars: Vec<String>,
    state_vars_units: IndexMap<String, String>,
    value_type: ValueType,
    reference: String,
    representation: Representation,
}

impl VariationWithState {
    /// 상태 변수 수(1~2), 중복, 단위 누락을 검사한 뒤 모델을 만든다.
    pub fn new(
        state_vars: Vec<String>,
        state_vars_units: IndexMap<String, String>,
        value_type: ValueType,
        reference: impl Into<String>,
        representation: Representation,
    ) -> MaterialResult<Self> {
        if state_vars.is_empty() || state_vars.len() > MAX_STATE_VARS {
            return Err(MaterialError::Construction(format!(
                "상태 변수는 1개 또는 {MAX_STATE_VARS}개까지만 지원합니다 (요청: {}개)",
                state_vars.len()
            )));
        }
        for (i, sv) in state_vars.iter().enumerate() {
            if state_vars[..i].contains(sv) {
                return Err(MaterialError::Construction(format!(
                    "상태 변수 '{sv}'이(가) 중복되었습니다"
                )));
            }
            if !state_vars_units.contains_key(sv) {
                return Err(MaterialError::Construction(format!(
                    "'{sv}'의 단위가 없습니다"
                )));
            }
        }
        let engine_vars: &[String] = match &representation {
            Representation::Table(table) => table.state_vars(),
            Representation::Equation(equation) => equation.state_vars(),
        };
        if engine_vars != state_vars.as_slice() {
            return Err(MaterialError::Construction(format!(
                "{} 엔진의 상태 변수 {engine_vars:?}가 모델의 {state_vars:?}와 다릅니다",
                representation.name()
            )));
        }
        Ok(Self {
            state_vars,
            state_vars_units,
            value_type,
            reference: reference.into(),
            representation,
        })
    }

    pub fn state_vars(&self) -> &[String] {
        &self.state_vars
    }

    pub fn state_vars_units(&self) -> &IndexMap<String, String> {
        &self.state_vars_units
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn representation(&self) -> &Representation {
        &self.representation
    }

    /// 표현 방식에 맞는 엔진으로 조회를 넘긴다. 결합 규칙은 적용하지 않는다.
    pub fn query_value(&self, state: &State, model_args: &ModelArgs) -> MaterialResult<QueryValue> {
        log::trace!(
            "{} 모델 조회: {:?}",
            self.representation.name(),
            state.names().collect::<Vec<_>>()
        );
        match &self.representation {
            Representation::Table(table) => table.query_value(state, model_args),
            Representation::Equation(equation) => equation.query_value(state),
        }
    }

    /// 모델이 유효한 상태 영역. 표는 표본 범위, 수식은 선언된 범위.
    pub fn get_state_domain(&self) -> IndexMap<String, (f64, f64)> {
        match &self.representation {
            Representation::Table(table) => table.get_state_domain(),
            Representation::Equation(equation) => equation.get_state_domain(),
        }
    }

    /// 상태가 유효 영역 안에 있는지 판정한다. 조회 결과에는 영향을 주지 않는다.
    pub fn is_state_in_domain(&self, state: &State) -> bool {
        match &self.representation {
            Representation::Table(table) => {
                expression::domain_contains(&table.get_state_domain(), state)
            }
            Representation::Equation(equation) => equation.is_state_in_domain(state),
        }
    }
}

impl fmt::Display for VariationWithState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let domain = self.get_state_domain();
        let ranges: Vec<String> = self
            .state_vars
            .iter()
            .map(|name| {
                let (lo, hi) = domain.get(name).copied().unwrap_or((f64::NAN, f64::NAN));
                let unit = self.state_vars_units.get(name).map(String::as_str).unwrap_or("");
                format!("{} to {} {unit}", fmt_g(lo), fmt_g(hi))
            })
            .collect();
        write!(
            f,
            "Variation with {} over {}, represented as a {}. [Data from {}]",
            self.state_vars.join(", "),
            ranges.join(", "),
            self.representation.name(),
            self.reference
        )
    }
}

/// 유효숫자 4자리 정도로 짧게 표시한다.
pub(crate) fn fmt_g(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{v}");
    }
    let magnitude = v.abs().log10().floor() as i32;
    if !(-4..6).contains(&magnitude) {
        return format!("{v:.3e}");
    }
    let decimals = (3 - magnitude).max(0) as usize;
    let s = format!("{v:.decimals$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
