//! Data models for survey analytics.
//!
//! This module contains the survey record as loaded from a document
//! source, the normalised field value type, and the report container
//! that wraps analysis results for rendering.

use crate::analysis::AnalysisOutput;
use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

/// Sentinel the survey export uses for an unanswered question.
pub const MISSING_SENTINEL: &str = "NA";

/// A single non-missing survey answer.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Free text or a categorical answer.
    Text(String),
    /// A numeric answer.
    Number(f64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            FieldValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A survey field that may be missing.
///
/// Absent keys, JSON `null` and the `"NA"` sentinel all normalise to a
/// missing field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Field(Option<FieldValue>);

impl Field {
    /// A missing field.
    pub fn missing() -> Self {
        Self(None)
    }

    /// A text field. The `"NA"` sentinel yields a missing field.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value == MISSING_SENTINEL {
            Self(None)
        } else {
            Self(Some(FieldValue::Text(value)))
        }
    }

    /// A numeric field.
    pub fn number(value: f64) -> Self {
        Self(Some(FieldValue::Number(value)))
    }

    pub fn value(&self) -> Option<&FieldValue> {
        self.0.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// Borrow the answer when it is text.
    pub fn as_text(&self) -> Option<&str> {
        match &self.0 {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// The answer rendered as a string, whatever its type.
    pub fn as_str(&self) -> Option<Cow<'_, str>> {
        match &self.0 {
            Some(FieldValue::Text(s)) => Some(Cow::Borrowed(s)),
            Some(number) => Some(Cow::Owned(number.to_string())),
            None => None,
        }
    }

    /// Owned string form, used for grouping keys.
    pub fn to_key(&self) -> Option<String> {
        self.as_str().map(Cow::into_owned)
    }

    /// Numeric view of the answer. Numeric text is parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match &self.0 {
            Some(FieldValue::Number(n)) => Some(*n),
            Some(FieldValue::Text(s)) => s.trim().parse().ok(),
            None => None,
        }
    }

    /// True when the answer is exactly the given text.
    pub fn is(&self, expected: &str) -> bool {
        self.as_text() == Some(expected)
    }

    /// True when the answer is one of the given texts.
    pub fn is_one_of(&self, expected: &[&str]) -> bool {
        self.as_text().is_some_and(|s| expected.contains(&s))
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        match raw {
            serde_json::Value::Null => Ok(Field::missing()),
            serde_json::Value::String(s) => Ok(Field::text(s)),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Field::number)
                .ok_or_else(|| de::Error::custom(format!("number {} is out of range", n))),
            serde_json::Value::Bool(b) => Ok(Field::text(b.to_string())),
            serde_json::Value::Array(_) => {
                Err(de::Error::custom("expected a scalar survey answer, found an array"))
            }
            serde_json::Value::Object(_) => {
                Err(de::Error::custom("expected a scalar survey answer, found an object"))
            }
        }
    }
}

impl Serialize for Field {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.0 {
            Some(FieldValue::Text(s)) => serializer.serialize_str(s),
            Some(FieldValue::Number(n)) => serializer.serialize_f64(*n),
            None => serializer.serialize_none(),
        }
    }
}

/// One survey response.
///
/// Keys follow the survey export's column names. Columns not listed here
/// are ignored when loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SurveyRecord {
    pub response_id: Field,
    pub main_branch: Field,
    pub employment: Field,
    pub remote_work: Field,
    pub coding_activities: Field,
    pub ed_level: Field,
    pub learn_code: Field,
    pub years_code_pro: Field,
    pub dev_type: Field,
    pub org_size: Field,
    pub purchase_influence: Field,
    pub country: Field,
    pub comp_total: Field,
    pub comp_freq: Field,
    pub language_have_worked_with: Field,
    pub webframe_have_worked_with: Field,
    pub converted_comp_yearly: Field,
    pub age: Field,
    pub gender: Field,
    pub ethnicity: Field,
    pub mental_health: Field,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Where the collection was loaded from (credentials stripped).
    pub source: String,
    pub database: String,
    pub collection: String,
    /// Number of records in the loaded snapshot.
    pub record_count: usize,
    pub generated_at: DateTime<Utc>,
    /// Load plus pipeline time in seconds.
    pub duration_seconds: f64,
}

/// The complete analytics report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// One section per analysis, in the order they were run.
    pub sections: Vec<AnalysisOutput>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_sentinels() {
        let record: SurveyRecord = serde_json::from_value(json!({
            "Country": "NA",
            "Age": null,
        }))
        .unwrap();

        assert!(!record.country.is_present());
        assert!(!record.age.is_present());
        assert!(!record.gender.is_present());
    }

    #[test]
    fn test_field_types() {
        let record: SurveyRecord = serde_json::from_value(json!({
            "Country": "India",
            "OrgSize": 50,
            "YearsCodePro": "7",
            "CompTotal": 120000.5,
            "Unrelated": {"nested": true},
        }))
        .unwrap();

        assert!(record.country.is("India"));
        assert_eq!(record.org_size.as_f64(), Some(50.0));
        assert_eq!(record.org_size.as_text(), None);
        assert_eq!(record.org_size.to_key().as_deref(), Some("50"));
        assert_eq!(record.years_code_pro.as_f64(), Some(7.0));
        assert_eq!(record.comp_total.as_f64(), Some(120000.5));
    }

    #[test]
    fn test_non_numeric_text() {
        let field = Field::text("Less than 1 year");
        assert!(field.is_present());
        assert_eq!(field.as_f64(), None);
    }

    #[test]
    fn test_rejects_nested_values() {
        let result: Result<SurveyRecord, _> =
            serde_json::from_value(json!({ "Country": ["India"] }));
        assert!(result.is_err());
    }

    #[test]
    fn test_is_one_of() {
        let field = Field::text("Hybrid (some remote, some in-person)");
        assert!(field.is_one_of(&["Fully remote", "Hybrid (some remote, some in-person)"]));
        assert!(!Field::missing().is_one_of(&["Fully remote"]));
    }
}
