//! 명령행 인자 정의.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::interp::InterpMethod;
use crate::state::StateValue;

#[derive(Parser, Debug)]
#[command(name = "engineering_materials", version, about = "공학 재료 물성 조회 도구")]
pub struct Cli {
    /// 설정 파일 경로
    #[arg(long, default_value = crate::config::CONFIG_FILE)]
    pub config: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 재료 파일의 형태와 조건을 나열한다
    Forms {
        /// 재료 파일 경로 또는 데이터베이스 안의 재료 이름
        material: String,
    },
    /// 재료 요약(물성, 상태 의존 모델, 유효 영역)을 출력한다
    Summary {
        material: String,
        #[arg(long)]
        form: String,
        #[arg(long)]
        condition: String,
    },
    /// 상태에서 물성값을 조회한다
    Query {
        material: String,
        #[arg(long)]
        form: String,
        #[arg(long)]
        condition: String,
        #[arg(long)]
        property: String,
        /// 사용할 상태 의존 모델 (기본: 물성의 기본 모델)
        #[arg(long)]
        model: Option<String>,
        /// 표 보간 방식 (기본: 설정값)
        #[arg(long)]
        method: Option<InterpMethod>,
        /// 표 영역 밖에서 돌려줄 값 (기본: NaN)
        #[arg(long, allow_negative_numbers = true)]
        fill_value: Option<f64>,
        /// `이름=값[,값...]` 형식의 상태 변수. 여러 번 줄 수 있다.
        #[arg(long = "state", value_parser = parse_state_arg)]
        states: Vec<(String, StateValue)>,
    },
    /// 2열 CSV(좌표, 값)를 1차원 표 YAML 조각으로 변환한다
    CsvToYaml {
        csv: PathBuf,
        #[arg(long, default_value = "temperature")]
        state_var: String,
        /// 좌표 열이 화씨이면 켈빈으로 변환한다
        #[arg(long)]
        fahrenheit: bool,
        /// 좌표 열의 온도 단위 (K, C, F, R). `--fahrenheit`보다 우선한다.
        #[arg(long)]
        unit: Option<String>,
        /// 값 열에 곱할 배율
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
    },
}

/// `temperature=300` 또는 `temperature=300,400,500`을 읽는다.
pub fn parse_state_arg(arg: &str) -> Result<(String, StateValue), String> {
    let (name, raw) = arg
        .split_once('=')
        .ok_or_else(|| format!("'{arg}': 이름=값 형식이어야 합니다"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("'{arg}': 상태 변수 이름이 비었습니다"));
    }
    let values = raw
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| format!("'{name}' 값 '{v}'을(를) 읽을 수 없습니다: {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let value = match values.as_slice() {
        [single] => StateValue::Scalar(*single),
        _ => StateValue::Array(values),
    };
    Ok((name.to_string(), value))
}
