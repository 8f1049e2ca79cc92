//! 표 좌표 변환에 쓰는 단위 정의.

pub mod temperature;

pub use temperature::{convert_temperature, from_kelvin, to_kelvin, TemperatureUnit};
