//! 산점(scattered) 데이터 보간 엔진. 1차원은 정렬된 매듭 위의 구간 보간,
//! 2차원은 Delaunay 삼각분할 위의 무게중심 보간을 사용한다.

pub mod delaunay;
pub mod linear1d;

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{MaterialError, MaterialResult};
use crate::state::{QueryValue, State};
use delaunay::Triangulation;
use linear1d::Curve;

/// 지원하는 최대 상태 변수 수.
pub const MAX_STATE_VARS: usize = 2;

/// 축별 보간 스케일.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    #[default]
    Linear,
    /// 자연로그 공간에서 보간한다.
    Log,
}

/// 보간 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpMethod {
    #[default]
    Linear,
    Nearest,
    Cubic,
}

impl FromStr for InterpMethod {
    type Err = MaterialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(InterpMethod::Linear),
            "nearest" => Ok(InterpMethod::Nearest),
            "cubic" => Ok(InterpMethod::Cubic),
            other => Err(MaterialError::InvalidQuery(format!(
                "알 수 없는 보간 방식: {other} (linear, nearest, cubic 중 선택)"
            ))),
        }
    }
}

/// 표현 방식별 조회 옵션. 수식 모델은 이 값을 무시한다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelArgs {
    pub method: InterpMethod,
    /// 볼록 껍질(1차원은 매듭 범위) 밖 조회 시 반환할 값
    pub fill_value: f64,
    /// 2차원 보간 전에 각 축을 [0, 1]로 정규화할지 여부
    pub rescale: bool,
}

impl Default for ModelArgs {
    fn default() -> Self {
        Self {
            method: InterpMethod::Linear,
            fill_value: f64::NAN,
            rescale: true,
        }
    }
}

impl ModelArgs {
    pub fn with_method(method: InterpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }
}

/// 2차원 표에서 첫 번째 상태 변수 값 하나에 대응하는 단면.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSlice {
    /// 첫 번째 상태 변수 값
    pub key: f64,
    /// 두 번째 상태 변수 좌표
    pub coords: Vec<f64>,
    pub values: Vec<f64>,
}

/// 로더가 넘겨주는 표 데이터. 2차원은 "표의 표" 구조를 단면 목록으로 담는다.
#[derive(Debug, Clone, PartialEq)]
pub enum TableData {
    OneD { coords: Vec<f64>, values: Vec<f64> },
    TwoD(Vec<TableSlice>),
}

impl TableData {
    fn dims(&self) -> usize {
        match self {
            TableData::OneD { .. } => 1,
            TableData::TwoD(_) => 2,
        }
    }
}

#[derive(Debug, Clone)]
enum Engine {
    OneD(Curve),
    TwoD(Scatter),
}

#[derive(Debug, Clone)]
struct Scatter {
    /// 로그 변환이 적용된 저장 좌표
    points: Vec<(f64, f64)>,
    values: Vec<f64>,
    /// 정규화용 축별 최소값과 범위
    offset: (f64, f64),
    span: (f64, f64),
    raw: Triangulation,
    rescaled: Triangulation,
}

impl Scatter {
    fn new(points: Vec<(f64, f64)>, values: Vec<f64>) -> MaterialResult<Self> {
        let (min0, max0) = extent(points.iter().map(|p| p.0));
        let (min1, max1) = extent(points.iter().map(|p| p.1));
        let span_of = |lo: f64, hi: f64| if hi > lo { hi - lo } else { 1.0 };
        let offset = (min0, min1);
        let span = (span_of(min0, max0), span_of(min1, max1));

        let raw = Triangulation::new(&points);
        let normalized: Vec<(f64, f64)> = points
            .iter()
            .map(|p| normalize(*p, offset, span))
            .collect();
        let rescaled = Triangulation::new(&normalized);
        if raw.is_empty() || rescaled.is_empty() {
            return Err(MaterialError::Construction(
                "2차원 표는 한 직선 위에 있지 않은 점이 3개 이상 필요합니다".into(),
            ));
        }
        Ok(Self {
            points,
            values,
            offset,
            span,
            raw,
            rescaled,
        })
    }

    fn evaluate(&self, p: (f64, f64), args: &ModelArgs) -> f64 {
        let (tri, q) = if args.rescale {
            (&self.rescaled, normalize(p, self.offset, self.span))
        } else {
            (&self.raw, p)
        };
        match args.method {
            InterpMethod::Nearest => {
                if p.0.is_nan() || p.1.is_nan() {
                    return args.fill_value;
                }
                tri.nearest(q)
                    .map(|i| self.values[i])
                    .unwrap_or(args.fill_value)
            }
            _ => tri.interpolate(&self.values, q).unwrap_or(args.fill_value),
        }
    }
}

fn normalize(p: (f64, f64), offset: (f64, f64), span: (f64, f64)) -> (f64, f64) {
    ((p.0 - offset.0) / span.0, (p.1 - offset.1) / span.1)
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// 표로 표현된 상태 의존 변화 모델의 보간 엔진.
///
/// 생성 시 입력을 정렬하고 로그 축을 변환해 평탄화된 점/값 배열로 저장한다.
/// 이후로는 읽기 전용이며, 조회는 입력의 복사본만 다룬다.
#[derive(Debug, Clone)]
pub struct ScatterTable {
    state_vars: Vec<String>,
    scales: Vec<AxisScale>,
    engine: Engine,
}

impl ScatterTable {
    /// `scales`가 비어 있으면 모든 축을 선형으로 본다.
    pub fn new(
        state_vars: Vec<String>,
        data: TableData,
        scales: Vec<AxisScale>,
    ) -> MaterialResult<Self> {
        if state_vars.is_empty() || state_vars.len() > MAX_STATE_VARS {
            return Err(MaterialError::Construction(format!(
                "상태 변수는 1개 또는 {MAX_STATE_VARS}개까지만 지원합니다 (요청: {}개)",
                state_vars.len()
            )));
        }
        if data.dims() != state_vars.len() {
            return Err(MaterialError::Construction(format!(
                "{}차원 표 데이터가 상태 변수 {}개와 맞지 않습니다",
                data.dims(),
                state_vars.len()
            )));
        }
        let scales = if scales.is_empty() {
            vec![AxisScale::Linear; state_vars.len()]
        } else {
            scales
        };
        if scales.len() != state_vars.len() {
            return Err(MaterialError::Construction(format!(
                "보간 스케일 {}개가 상태 변수 {}개와 맞지 않습니다",
                scales.len(),
                state_vars.len()
            )));
        }

        let engine = match data {
            TableData::OneD { coords, values } => {
                Engine::OneD(build_curve(&state_vars[0], coords, values, scales[0])?)
            }
            TableData::TwoD(slices) => Engine::TwoD(build_scatter(&state_vars, slices, &scales)?),
        };
        log::debug!(
            "보간 표 생성: 상태 변수 {:?}, 스케일 {:?}",
            state_vars,
            scales
        );
        Ok(Self {
            state_vars,
            scales,
            engine,
        })
    }

    pub fn state_vars(&self) -> &[String] {
        &self.state_vars
    }

    pub fn scales(&self) -> &[AxisScale] {
        &self.scales
    }

    pub fn sample_count(&self) -> usize {
        self.sample_values().len()
    }

    /// 저장된 표본 좌표(로그 축은 로그 값). 각 원소는 상태 변수 순서를 따른다.
    pub fn sample_points(&self) -> Vec<Vec<f64>> {
        match &self.engine {
            Engine::OneD(curve) => curve.knots().iter().map(|k| vec![*k]).collect(),
            Engine::TwoD(scatter) => scatter.points.iter().map(|p| vec![p.0, p.1]).collect(),
        }
    }

    pub fn sample_values(&self) -> &[f64] {
        match &self.engine {
            Engine::OneD(curve) => curve.values(),
            Engine::TwoD(scatter) => &scatter.values,
        }
    }

    /// 주어진 상태에서 값을 보간한다. 볼록 껍질 밖은 `args.fill_value`.
    pub fn query_value(&self, state: &State, args: &ModelArgs) -> MaterialResult<QueryValue> {
        let mut columns = state.columns(&self.state_vars)?;
        for (column, scale) in columns.columns.iter_mut().zip(&self.scales) {
            if *scale == AxisScale::Log {
                column.iter_mut().for_each(|v| *v = v.ln());
            }
        }

        let values = match &self.engine {
            Engine::OneD(curve) => columns.columns[0]
                .iter()
                .map(|x| curve.evaluate(*x, args.method, args.fill_value))
                .collect(),
            Engine::TwoD(scatter) => {
                if args.method == InterpMethod::Cubic {
                    return Err(MaterialError::InvalidQuery(
                        "cubic 보간은 1차원 표에서만 지원합니다".into(),
                    ));
                }
                (0..columns.rows)
                    .map(|i| scatter.evaluate((columns.columns[0][i], columns.columns[1][i]), args))
                    .collect()
            }
        };
        Ok(QueryValue::from_rows(values, columns.scalar))
    }

    /// 상태 변수별 표본 좌표 범위 (로그 축은 원래 스케일로 되돌린 값).
    pub fn get_state_domain(&self) -> IndexMap<String, (f64, f64)> {
        let extents: Vec<(f64, f64)> = match &self.engine {
            Engine::OneD(curve) => {
                let knots = curve.knots();
                vec![(knots[0], knots[knots.len() - 1])]
            }
            Engine::TwoD(scatter) => vec![
                extent(scatter.points.iter().map(|p| p.0)),
                extent(scatter.points.iter().map(|p| p.1)),
            ],
        };
        self.state_vars
            .iter()
            .zip(extents)
            .zip(&self.scales)
            .map(|((name, (lo, hi)), scale)| {
                let bounds = match scale {
                    AxisScale::Linear => (lo, hi),
                    AxisScale::Log => (lo.exp(), hi.exp()),
                };
                (name.clone(), bounds)
            })
            .collect()
    }
}

fn check_axis(name: &str, coords: &[f64], scale: AxisScale) -> MaterialResult<()> {
    if let Some(bad) = coords.iter().find(|c| !c.is_finite()) {
        return Err(MaterialError::Construction(format!(
            "'{name}' 좌표에 유한하지 않은 값 {bad}이(가) 있습니다"
        )));
    }
    if scale == AxisScale::Log {
        if let Some(bad) = coords.iter().find(|c| **c <= 0.0) {
            return Err(MaterialError::Construction(format!(
                "로그 스케일 축 '{name}'의 좌표는 양수여야 합니다 (값: {bad})"
            )));
        }
    }
    Ok(())
}

fn transform(v: f64, scale: AxisScale) -> f64 {
    match scale {
        AxisScale::Linear => v,
        AxisScale::Log => v.ln(),
    }
}

/// (좌표, 값) 쌍을 좌표 오름차순으로 정렬한다. 중복 좌표는 거부한다.
fn sorted_pairs(name: &str, coords: Vec<f64>, values: Vec<f64>) -> MaterialResult<Vec<(f64, f64)>> {
    if coords.len() != values.len() {
        return Err(MaterialError::Construction(format!(
            "'{name}' 좌표 {}개와 values {}개의 길이가 다릅니다",
            coords.len(),
            values.len()
        )));
    }
    if coords.is_empty() {
        return Err(MaterialError::Construction(format!("'{name}' 표가 비어 있습니다")));
    }
    let mut pairs: Vec<(f64, f64)> = coords.into_iter().zip(values).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    if let Some(w) = pairs.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(MaterialError::Construction(format!(
            "'{name}' 좌표 {}이(가) 중복되었습니다",
            w[0].0
        )));
    }
    Ok(pairs)
}

fn build_curve(
    name: &str,
    coords: Vec<f64>,
    values: Vec<f64>,
    scale: AxisScale,
) -> MaterialResult<Curve> {
    check_axis(name, &coords, scale)?;
    let pairs = sorted_pairs(name, coords, values)?;
    let (knots, values): (Vec<f64>, Vec<f64>) =
        pairs.into_iter().map(|(x, y)| (transform(x, scale), y)).unzip();
    Ok(Curve::new(knots, values))
}

fn build_scatter(
    state_vars: &[String],
    mut slices: Vec<TableSlice>,
    scales: &[AxisScale],
) -> MaterialResult<Scatter> {
    let keys: Vec<f64> = slices.iter().map(|s| s.key).collect();
    check_axis(&state_vars[0], &keys, scales[0])?;
    slices.sort_by(|a, b| a.key.total_cmp(&b.key));
    if let Some(w) = slices.windows(2).find(|w| w[0].key == w[1].key) {
        return Err(MaterialError::Construction(format!(
            "'{}' 값 {}이(가) 중복되었습니다",
            state_vars[0], w[0].key
        )));
    }

    let mut points = Vec::new();
    let mut values = Vec::new();
    for slice in slices {
        check_axis(&state_vars[1], &slice.coords, scales[1])?;
        let label = format!("{}={}", state_vars[0], slice.key);
        let x0 = transform(slice.key, scales[0]);
        for (x1, v) in sorted_pairs(&label, slice.coords, slice.values)? {
            points.push((x0, transform(x1, scales[1])));
            values.push(v);
        }
    }
    Scatter::new(points, values)
}
