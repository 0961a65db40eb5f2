use url::Url;

use crate::{Identifier, ModelError};

/// Result page every lookup is issued against.
pub const DEFAULT_LOOKUP_BASE: &str = "https://beu-bih.ac.in/result-three";

/// Static examination parameters interpolated into every lookup URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamConfig {
    /// Semester ordinal used in the exam title (`"6th"`).
    pub ordinal_sem: String,
    /// Semester as a roman numeral (`"VI"`).
    pub roman_sem: String,
    /// Session year (`"2025"`).
    pub session: String,
    pub held_month: String,
    pub held_year: String,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            ordinal_sem: "6th".to_string(),
            roman_sem: "VI".to_string(),
            session: "2025".to_string(),
            held_month: "November".to_string(),
            held_year: "2025".to_string(),
        }
    }
}

impl ExamConfig {
    pub fn exam_name(&self) -> String {
        format!(
            "B.Tech. {} Semester Examination, {}",
            self.ordinal_sem, self.session
        )
    }

    pub fn exam_held(&self) -> String {
        format!("{}/{}", self.held_month, self.held_year)
    }
}

/// Builds the per-identifier lookup URL from a validated base and exam parameters.
#[derive(Debug, Clone)]
pub struct LookupUrl {
    base: Url,
    exam: ExamConfig,
}

impl LookupUrl {
    pub fn new(base: &str, exam: ExamConfig) -> Result<Self, ModelError> {
        let base = Url::parse(base)?;
        if base.cannot_be_a_base() {
            return Err(ModelError::NotABase(base.to_string()));
        }
        Ok(Self { base, exam })
    }

    /// Lookup URL for one identifier; any query already on the base is replaced.
    pub fn for_identifier(&self, id: &Identifier) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("name", &self.exam.exam_name())
            .append_pair("semester", &self.exam.roman_sem)
            .append_pair("session", &self.exam.session)
            .append_pair("regNo", id.as_str())
            .append_pair("exam_held", &self.exam.exam_held());
        url
    }
}
