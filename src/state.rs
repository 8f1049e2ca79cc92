//! 상태(온도, 노출 시간, 조사량 등) 입력과 조회 결과 표현.

use indexmap::IndexMap;

use crate::error::{MaterialError, MaterialResult};

/// 상태 변수 하나의 조회 값. 스칼라 또는 같은 길이의 배열.
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Scalar(f64),
    Array(Vec<f64>),
}

impl StateValue {
    /// 배열이면 길이를, 스칼라면 `None`을 반환한다.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            StateValue::Scalar(_) => None,
            StateValue::Array(v) => Some(v.len()),
        }
    }

    /// 모든 원소를 순회한다. 스칼라는 원소 하나로 취급한다.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let slice: &[f64] = match self {
            StateValue::Scalar(v) => std::slice::from_ref(v),
            StateValue::Array(v) => v,
        };
        slice.iter().copied()
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        StateValue::Scalar(value)
    }
}

impl From<Vec<f64>> for StateValue {
    fn from(value: Vec<f64>) -> Self {
        StateValue::Array(value)
    }
}

impl From<&[f64]> for StateValue {
    fn from(value: &[f64]) -> Self {
        StateValue::Array(value.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for StateValue {
    fn from(value: [f64; N]) -> Self {
        StateValue::Array(value.to_vec())
    }
}

/// 상태 변수 이름 → 조회 값 매핑. 호출자가 소유하며 조회 중 변경되지 않는다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    values: IndexMap<String, StateValue>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// 빌더 형태로 상태 변수를 추가한다.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<StateValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<StateValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&StateValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// `vars` 순서대로 열(column) 배열을 만든다.
    ///
    /// 스칼라와 배열이 섞이면 스칼라를 배열 길이만큼 복제한다. 원본 상태는
    /// 건드리지 않고 새 배열을 할당한다.
    pub(crate) fn columns(&self, vars: &[String]) -> MaterialResult<Columns> {
        let mut picked = Vec::with_capacity(vars.len());
        for var in vars {
            let value = self.values.get(var).ok_or_else(|| {
                MaterialError::InvalidQuery(format!("상태 변수 '{var}' 값이 조회에 없습니다"))
            })?;
            picked.push((var, value));
        }

        let mut rows: Option<usize> = None;
        for (var, value) in &picked {
            if let Some(len) = value.array_len() {
                match rows {
                    Some(n) if n != len => {
                        return Err(MaterialError::InvalidQuery(format!(
                            "상태 배열 길이가 일치하지 않습니다: '{var}' 길이 {len}, 기대 {n}"
                        )))
                    }
                    _ => rows = Some(len),
                }
            }
        }

        let scalar = rows.is_none();
        let rows = rows.unwrap_or(1);
        let columns = picked
            .into_iter()
            .map(|(_, value)| match value {
                StateValue::Scalar(v) => vec![*v; rows],
                StateValue::Array(v) => v.clone(),
            })
            .collect();
        Ok(Columns {
            rows,
            scalar,
            columns,
        })
    }
}

impl<K, V> FromIterator<(K, V)> for State
where
    K: Into<String>,
    V: Into<StateValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut state = State::new();
        for (k, v) in iter {
            state.insert(k, v);
        }
        state
    }
}

/// 브로드캐스트가 끝난 조회 지점 묶음.
#[derive(Debug, Clone)]
pub(crate) struct Columns {
    pub rows: usize,
    /// 모든 입력이 스칼라였는지 여부. 결과 형태를 결정한다.
    pub scalar: bool,
    pub columns: Vec<Vec<f64>>,
}

impl Columns {
    /// i번째 조회 지점의 좌표.
    pub fn point(&self, i: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[i]).collect()
    }
}

/// 조회 결과. 입력 형태(스칼라/배열)를 그대로 따른다.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Scalar(f64),
    Array(Vec<f64>),
}

impl QueryValue {
    pub(crate) fn from_rows(values: Vec<f64>, scalar: bool) -> Self {
        if scalar {
            QueryValue::Scalar(values.first().copied().unwrap_or(f64::NAN))
        } else {
            QueryValue::Array(values)
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            QueryValue::Scalar(v) => Some(*v),
            QueryValue::Array(_) => None,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        match self {
            QueryValue::Scalar(v) => std::slice::from_ref(v),
            QueryValue::Array(v) => v,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// 원소별로 함수를 적용한 새 결과를 만든다.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            QueryValue::Scalar(v) => QueryValue::Scalar(f(v)),
            QueryValue::Array(v) => QueryValue::Array(v.into_iter().map(f).collect()),
        }
    }
}

impl std::fmt::Display for QueryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryValue::Scalar(v) => write!(f, "{v:.6}"),
            QueryValue::Array(values) => {
                let parts: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}
