use thiserror::Error;

/// 재료 물성 모델의 생성/조회 중 발생 가능한 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MaterialError {
    /// 잘못되었거나 지원하지 않는 설명(표현 방식, 상태 변수 수, 누락 필드 등)
    #[error("모델 생성 오류: {0}")]
    Construction(String),
    /// 상태 변수 누락 또는 배열 길이 불일치
    #[error("잘못된 조회: {0}")]
    InvalidQuery(String),
    /// 이름으로 찾는 항목이 없음. `valid`에 사용 가능한 이름을 담는다.
    #[error("{kind} '{name}' 없음 (사용 가능: {})", .valid.join(", "))]
    NotFound {
        kind: &'static str,
        name: String,
        valid: Vec<String>,
    },
    /// 허용된 산술 문법을 벗어난 수식. 평가를 시도하지 않는다.
    #[error("안전하지 않은 수식: {0}")]
    UnsafeExpression(String),
    /// 조회 지점에서 수식이 수학적으로 정의되지 않음
    #[error("수치 계산 오류: {0}")]
    NumericEvaluation(String),
}

impl MaterialError {
    pub(crate) fn not_found<'a, I>(kind: &'static str, name: &str, valid: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        MaterialError::NotFound {
            kind,
            name: name.to_string(),
            valid: valid.into_iter().cloned().collect(),
        }
    }
}

pub type MaterialResult<T> = Result<T, MaterialError>;
