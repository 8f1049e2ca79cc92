use thiserror::Error;

use crate::cli::{Cli, Command};
use crate::config::{self, Config, ConfigError};
use crate::conversion::{self, ConversionError, CsvOptions};
use crate::error::MaterialError;
use crate::loader::{self, LoadError, MaterialDocument};
use crate::state::State;
use crate::units::TemperatureUnit;

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 설정 저장/로드 오류
    #[error("설정 오류: {0}")]
    Config(#[from] ConfigError),
    /// 재료 파일 로드 오류
    #[error("재료 로드 오류: {0}")]
    Load(#[from] LoadError),
    /// 물성 조회 오류
    #[error("물성 조회 오류: {0}")]
    Material(#[from] MaterialError),
    /// 표 변환 오류
    #[error("표 변환 오류: {0}")]
    Conversion(#[from] ConversionError),
}

/// 파싱된 명령행으로 설정을 로드하고 하위 명령을 실행한다.
pub fn run(cli: Cli) -> Result<(), AppError> {
    let cfg = config::load_or_default_from(&cli.config)?;
    execute(&cfg, cli.command)
}

/// 하위 명령 하나를 실행하고 결과를 표준 출력에 쓴다.
pub fn execute(cfg: &Config, command: Command) -> Result<(), AppError> {
    match command {
        Command::Forms { material } => {
            let path = loader::resolve_material_path(cfg, &material);
            let doc = MaterialDocument::open(&path)?;
            println!("{}", doc.name);
            for form in doc.forms() {
                println!("  {form}: {}", doc.conditions(form)?.join(", "));
            }
        }
        Command::Summary {
            material,
            form,
            condition,
        } => {
            let material = loader::load(cfg, &material, &form, &condition)?;
            print!("{}", material.summary());
        }
        Command::Query {
            material,
            form,
            condition,
            property,
            model,
            method,
            fill_value,
            states,
        } => {
            let material = loader::load(cfg, &material, &form, &condition)?;
            let property = material.property(&property)?;
            let mut args = cfg.model_args();
            if let Some(method) = method {
                args.method = method;
            }
            if let Some(fill) = fill_value {
                args.fill_value = fill;
            }
            if states.is_empty() {
                println!("{} = {} {}", property.name(), property.query_value(), property.units());
                return Ok(());
            }
            let state: State = states.into_iter().collect();
            let value = property.query_value_at(&state, model.as_deref(), Some(&args))?;
            println!("{} = {value} {}", property.name(), property.units());
            if let Some(sd) = property.as_state_dependent() {
                let model_name = model.as_deref().unwrap_or(sd.default_state_model());
                if !sd.variation(model_name)?.is_state_in_domain(&state) {
                    eprintln!("경고: 상태가 '{model_name}' 모델의 유효 영역을 벗어났습니다");
                }
            }
        }
        Command::CsvToYaml {
            csv,
            state_var,
            fahrenheit,
            unit,
            scale,
        } => {
            let coord_unit = match unit {
                Some(u) => conversion::parse_temperature_unit(&u)?,
                None if fahrenheit => TemperatureUnit::Fahrenheit,
                None => TemperatureUnit::Kelvin,
            };
            let options = CsvOptions { coord_unit, scale };
            print!("{}", conversion::csv_file_to_yaml(&csv, &state_var, options)?);
        }
    }
    Ok(())
}
