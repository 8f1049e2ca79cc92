//! 안전한 수식 평가기.
//!
//! 설명 파일의 `expression`은 신뢰할 수 없는 입력으로 취급한다. 허용되는 것은
//! 사칙연산, `**`, 숫자, 선언된 상태 변수, 정해진 수학 함수뿐이며, 그 밖의
//! 문법은 파싱 단계에서 거부되어 한 번도 평가되지 않는다.

pub mod lexer;
pub mod parser;

use indexmap::IndexMap;

use crate::error::{MaterialError, MaterialResult};
use crate::state::{QueryValue, State};
use parser::Node;

/// 검증이 끝난 `value = ...` 수식.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    rhs: Node,
}

impl Expression {
    /// 수식을 파싱한다. 허용 문법을 벗어나면 [`MaterialError::UnsafeExpression`].
    pub fn parse(source: &str, state_vars: &[String]) -> MaterialResult<Self> {
        let tokens = lexer::tokenize(source)?;
        let rhs = parser::parse_assignment(&tokens, state_vars)?;
        Ok(Self {
            source: source.to_string(),
            rhs,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// 상태 변수 순서대로 놓인 값 `vars`에서 수식을 평가한다.
    pub fn evaluate(&self, vars: &[f64]) -> MaterialResult<f64> {
        let value = self.rhs.eval(vars)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(MaterialError::NumericEvaluation(format!(
                "'{}'의 결과가 정의되지 않습니다 (상태 {vars:?})",
                self.source
            )))
        }
    }
}

/// 수식으로 표현된 상태 의존 변화 모델.
#[derive(Debug, Clone)]
pub struct EquationModel {
    state_vars: Vec<String>,
    expression: Expression,
    state_domain: IndexMap<String, (f64, f64)>,
}

impl EquationModel {
    pub fn new(
        state_vars: Vec<String>,
        expression: &str,
        state_domain: IndexMap<String, (f64, f64)>,
    ) -> MaterialResult<Self> {
        let mut domain = IndexMap::with_capacity(state_vars.len());
        for var in &state_vars {
            let (lo, hi) = *state_domain.get(var).ok_or_else(|| {
                MaterialError::Construction(format!("state_domain에 '{var}' 범위가 없습니다"))
            })?;
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(MaterialError::Construction(format!(
                    "'{var}'의 범위 ({lo}, {hi})가 올바르지 않습니다"
                )));
            }
            domain.insert(var.clone(), (lo, hi));
        }
        let expression = Expression::parse(expression, &state_vars)?;
        log::debug!("수식 모델 생성: {}", expression.source());
        Ok(Self {
            state_vars,
            expression,
            state_domain: domain,
        })
    }

    pub fn state_vars(&self) -> &[String] {
        &self.state_vars
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// 상태 변수별로 값을 묶어 수식을 원소 단위로 평가한다.
    pub fn query_value(&self, state: &State) -> MaterialResult<QueryValue> {
        let columns = state.columns(&self.state_vars)?;
        let values = (0..columns.rows)
            .map(|i| self.expression.evaluate(&columns.point(i)))
            .collect::<MaterialResult<Vec<f64>>>()?;
        Ok(QueryValue::from_rows(values, columns.scalar))
    }

    /// 모든 상태 값이 선언된 닫힌 구간 안에 있으면 `true`. 오류를 내지 않는다.
    pub fn is_state_in_domain(&self, state: &State) -> bool {
        domain_contains(&self.state_domain, state)
    }

    pub fn get_state_domain(&self) -> IndexMap<String, (f64, f64)> {
        self.state_domain.clone()
    }
}

/// 영역 판정. 상태에 없는 변수나 NaN은 영역 밖으로 본다.
pub(crate) fn domain_contains(domain: &IndexMap<String, (f64, f64)>, state: &State) -> bool {
    domain.iter().all(|(name, (lo, hi))| match state.get(name) {
        Some(value) => value.iter().all(|v| v >= *lo && v <= *hi),
        None => false,
    })
}
