use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::interp::{InterpMethod, ModelArgs};

/// 기본 설정 파일 이름.
pub const CONFIG_FILE: &str = "config.toml";
/// 데이터베이스 디렉터리를 지정하는 환경 변수.
pub const DATABASE_DIR_ENV: &str = "MATERIALS_DATABASE_DIR";

/// 보간 조회 기본값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationDefaults {
    pub method: InterpMethod,
    /// 2차원 표 보간 전 축 정규화 여부
    pub rescale: bool,
}

impl Default for InterpolationDefaults {
    fn default() -> Self {
        Self {
            method: InterpMethod::Linear,
            rescale: true,
        }
    }
}

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 재료 설명(YAML) 파일이 있는 디렉터리. 없으면 환경 변수/기본 위치를 쓴다.
    pub database_dir: Option<PathBuf>,
    pub interpolation: InterpolationDefaults,
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 파일 입출력 오류
    #[error("파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    /// TOML 역직렬화 오류
    #[error("설정 파싱 오류: {0}")]
    Serde(#[from] toml::de::Error),
    /// TOML 직렬화 오류
    #[error("설정 직렬화 오류: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// config.toml을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default() -> Result<Config, ConfigError> {
    load_or_default_from(Path::new(CONFIG_FILE))
}

/// 지정한 경로의 설정을 로드한다. 파일이 없으면 기본값을 저장한 뒤 반환한다.
pub fn load_or_default_from(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let cfg = Config::from_toml_str(&content)?;
        log::debug!("설정 로드: {}", path.display());
        Ok(cfg)
    } else {
        let cfg = Config::default();
        cfg.save_to(path)?;
        log::info!("기본 설정 생성: {}", path.display());
        Ok(cfg)
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// 설정을 config.toml에 저장한다.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Path::new(CONFIG_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 재료 설명 파일 디렉터리: 설정값 → 환경 변수 → 크레이트의 `materials_data/`.
    pub fn database_dir(&self) -> PathBuf {
        if let Some(dir) = &self.database_dir {
            return dir.clone();
        }
        if let Some(dir) = std::env::var_os(DATABASE_DIR_ENV) {
            return PathBuf::from(dir);
        }
        default_database_dir()
    }

    /// 설정된 보간 기본값으로 조회 옵션을 만든다.
    pub fn model_args(&self) -> ModelArgs {
        ModelArgs {
            method: self.interpolation.method,
            rescale: self.interpolation.rescale,
            ..ModelArgs::default()
        }
    }
}

/// 크레이트와 함께 배포되는 재료 데이터 디렉터리.
pub fn default_database_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("materials_data")
}
