//! 공학 재료 물성 라이브러리.
//!
//! 재료는 형태/조건별 물성 집합이고, 물성은 기본값과 선택적인 상태 의존 모델
//! (산점 표 보간 또는 안전한 산술 수식)을 가진다. 재료 설명 파일은 [`loader`]가 읽는다.

pub mod app;
pub mod cli;
pub mod config;
pub mod conversion;
pub mod error;
pub mod expression;
pub mod interp;
pub mod loader;
pub mod material;
pub mod property;
pub mod state;
pub mod units;
pub mod variation;

pub use error::{MaterialError, MaterialResult};
pub use interp::{AxisScale, InterpMethod, ModelArgs, ScatterTable, TableData, TableSlice};
pub use expression::{EquationModel, Expression};
pub use material::Material;
pub use property::{MaterialProperty, Property, StateDependentProperty};
pub use state::{QueryValue, State, StateValue};
pub use variation::{Representation, ValueType, VariationWithState};
