use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One course document as found in the source archive. Any key may be absent
/// and values are taken as-is; the accessors supply the defaults.
#[derive(Debug, Clone, Default)]
pub struct RawCourse {
    fields: Map<String, Value>,
}

impl RawCourse {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn scalar(&self, key: &str) -> Value {
        self.fields.get(key).cloned().unwrap_or(Value::Null)
    }

    pub fn list(&self, key: &str) -> Vec<Value> {
        self.fields
            .get(key)
            .cloned()
            .map(list_from_value)
            .unwrap_or_default()
    }
}

/// `null` is an empty list and a lone value is a one-element list.
pub fn list_from_value(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(list_from_value)
}

/// Entries that are not `{day, period}` pairs are dropped.
fn lenient_search_times<'de, D>(deserializer: D) -> Result<Vec<SearchTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Value::deserialize(deserializer).map(list_from_value)?;

    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTime {
    pub day: String,
    pub period: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseRecord {
    #[serde(rename = "lectureCode")]
    pub lecture_code: Value,
    #[serde(rename = "courseName")]
    pub course_name: Value,
    #[serde(deserialize_with = "lenient_list")]
    pub lecturer: Vec<Value>,
    #[serde(rename = "regularOrIntensive")]
    pub regular_or_intensive: Value,
    #[serde(rename = "courseType")]
    pub course_type: Value,
    #[serde(rename = "courseStart")]
    pub course_start: Value,
    #[serde(rename = "classPeriod")]
    #[serde(deserialize_with = "lenient_list")]
    pub class_period: Vec<Value>,
    #[serde(rename = "targetDepartment")]
    pub target_department: Value,
    #[serde(rename = "targetGrade")]
    #[serde(deserialize_with = "lenient_list")]
    pub target_grade: Vec<Value>,
    #[serde(rename = "numberOfCredits")]
    pub number_of_credits: Value,
    #[serde(deserialize_with = "lenient_list")]
    pub classroom: Vec<Value>,
    #[serde(rename = "updateAt")]
    pub update_at: Value,
    #[serde(deserialize_with = "lenient_search_times")]
    pub search_times: Vec<SearchTime>,
}

impl CourseRecord {
    pub fn course_start_text(&self) -> &str {
        self.course_start.as_str().unwrap_or("")
    }

    pub fn intensity(&self) -> Option<&str> {
        self.regular_or_intensive.as_str()
    }

    /// Target grades rendered as tokens; numeric grades are accepted too.
    pub fn grade_tokens(&self) -> Vec<String> {
        self.target_grade
            .iter()
            .filter_map(|value| match value {
                Value::String(text) => Some(text.clone()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentSummary {
    pub code: String,
    pub count: usize,
    #[serde(rename = "regularOrIntensive", default)]
    pub regular_or_intensive: Vec<String>,
}

/// campus -> level -> department summaries, as written to `departments.json`.
pub type DepartmentMetadata = BTreeMap<String, BTreeMap<String, Vec<DepartmentSummary>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    Initial,
    Incremental,
    Retained,
}

impl MergeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Incremental => "incremental",
            Self::Retained => "retained",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentRunStats {
    pub code: String,
    pub campus: String,
    pub level: String,
    pub mode: MergeMode,
    pub old_kept: usize,
    pub fresh_taken: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub source: String,
    pub archive_sha256: String,
    pub member_count: usize,
    pub indexed_count: usize,
    pub skipped_count: usize,
    pub latest_year: Option<String>,
    pub years: Vec<String>,
    pub total_records: usize,
    pub departments: Vec<DepartmentRunStats>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn saved_record_tolerates_null_and_scalar_lists() {
        let record: CourseRecord = serde_json::from_value(json!({
            "lectureCode": "CS1",
            "lecturer": null,
            "targetGrade": "1年",
            "classPeriod": ["月1"],
            "search_times": null
        }))
        .expect("lenient record deserializes");

        assert!(record.lecturer.is_empty());
        assert_eq!(record.target_grade, vec![json!("1年")]);
        assert_eq!(record.class_period, vec![json!("月1")]);
        assert!(record.classroom.is_empty());
        assert!(record.search_times.is_empty());
    }

    #[test]
    fn saved_search_times_skip_malformed_entries() {
        let record: CourseRecord = serde_json::from_value(json!({
            "search_times": [{ "day": "火", "period": 2 }, { "day": "水" }, 7]
        }))
        .expect("lenient record deserializes");

        assert_eq!(
            record.search_times,
            vec![SearchTime {
                day: "火".to_string(),
                period: 2
            }]
        );
    }

    #[test]
    fn saved_state_that_is_not_json_still_fails() {
        assert!(serde_json::from_str::<Vec<CourseRecord>>("[{ broken").is_err());
    }
}
