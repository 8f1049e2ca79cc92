//! 형태와 조건이 정해진 재료, 물성 조회와 요약 출력.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{MaterialError, MaterialResult};
use crate::property::MaterialProperty;
use crate::variation::fmt_g;

/// 특정 형태(form)와 조건(condition)의 공학 재료. 생성 후 읽기 전용이다.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    /// 제조사/규격이 정의하는 형태 (예: "sheet", "wire")
    pub form: String,
    /// 열처리/조질 상태 (예: "annealed", "T6")
    pub condition: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub references: Vec<String>,
    properties: IndexMap<String, MaterialProperty>,
}

impl Material {
    pub fn new(
        name: impl Into<String>,
        form: impl Into<String>,
        condition: impl Into<String>,
        category: Option<String>,
        subcategory: Option<String>,
        references: Vec<String>,
        properties: IndexMap<String, MaterialProperty>,
    ) -> Self {
        let material = Self {
            name: name.into(),
            form: form.into(),
            condition: condition.into(),
            category,
            subcategory,
            references,
            properties,
        };
        log::debug!(
            "재료 생성: {} ({}, {}), 물성 {}개",
            material.name,
            material.form,
            material.condition,
            material.properties.len()
        );
        material
    }

    /// 이름으로 물성을 찾는다. 없으면 사용 가능한 물성 이름을 담은 오류.
    pub fn property(&self, name: &str) -> MaterialResult<&MaterialProperty> {
        self.properties
            .get(name)
            .ok_or_else(|| MaterialError::not_found("물성", name, self.properties.keys()))
    }

    pub fn properties(&self) -> &IndexMap<String, MaterialProperty> {
        &self.properties
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// 모든 물성과 상태 의존 모델(유효 영역 포함)을 나열한 요약.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.name, self.form, self.condition)?;
        match (&self.category, &self.subcategory) {
            (Some(c), Some(s)) => write!(f, " [{c} / {s}]")?,
            (Some(c), None) => write!(f, " [{c}]")?,
            (None, Some(s)) => write!(f, " [{s}]")?,
            (None, None) => {}
        }
        writeln!(f)?;
        writeln!(f, "Properties:")?;
        for property in self.properties.values() {
            match property {
                MaterialProperty::Simple(p) => writeln!(f, "* {p}")?,
                MaterialProperty::StateDependent(p) => {
                    writeln!(
                        f,
                        "* {} = {} {} [Data from {}], varies with state:",
                        p.name(),
                        fmt_g(p.default_value()),
                        p.units(),
                        p.base().reference
                    )?;
                    for (name, model) in p.variations_with_state() {
                        let marker = if name == p.default_state_model() {
                            " (default)"
                        } else {
                            ""
                        };
                        writeln!(f, "    - {name}{marker}: {model}")?;
                    }
                }
            }
        }
        if !self.references.is_empty() {
            writeln!(f, "References: {}", self.references.len())?;
        }
        Ok(())
    }
}
