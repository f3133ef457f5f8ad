use super::*;

/// Projects raw course documents onto the fixed search record shape.
pub(super) struct CourseNormalizer {
    meeting_time: Regex,
}

impl CourseNormalizer {
    pub(super) fn new() -> Result<Self> {
        let meeting_time = Regex::new(r"^([月火水木金土日])(\d+)")
            .context("failed to compile meeting-time regex")?;

        Ok(Self { meeting_time })
    }

    pub(super) fn normalize(&self, raw: &RawCourse) -> CourseRecord {
        let class_period = raw.list("classPeriod");
        let search_times = self.search_times(&class_period);

        CourseRecord {
            lecture_code: raw.scalar("lectureCode"),
            course_name: raw.scalar("courseName"),
            lecturer: raw.list("lecturer"),
            regular_or_intensive: raw.scalar("regularOrIntensive"),
            course_type: raw.scalar("courseType"),
            course_start: raw.scalar("courseStart"),
            class_period,
            target_department: raw.scalar("targetDepartment"),
            target_grade: raw.list("targetGrade"),
            number_of_credits: raw.scalar("numberOfCredits"),
            classroom: raw.list("classroom"),
            update_at: raw.scalar("updateAt"),
            search_times,
        }
    }

    /// One entry per matching meeting-time string, first match only. Compressed
    /// forms such as `月3,4` yield just the leading period.
    pub(super) fn search_times(&self, class_period: &[Value]) -> Vec<SearchTime> {
        class_period
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|text| self.parse_meeting_time(text))
            .collect()
    }

    fn parse_meeting_time(&self, text: &str) -> Option<SearchTime> {
        let captures = self.meeting_time.captures(text)?;
        let day = captures.get(1)?.as_str().to_string();
        let digits = captures.get(2)?.as_str();
        let Ok(period) = digits.parse::<u64>() else {
            warn!(meeting_time = %text, "meeting-time period out of range");
            return None;
        };

        Some(SearchTime { day, period })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(value: Value) -> RawCourse {
        match value {
            Value::Object(fields) => RawCourse::new(fields),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn empty_document_gets_every_field_with_defaults() {
        let normalizer = CourseNormalizer::new().expect("regex compiles");
        let record = normalizer.normalize(&raw(json!({})));

        assert_eq!(record.lecture_code, Value::Null);
        assert_eq!(record.course_start, Value::Null);
        assert!(record.lecturer.is_empty());
        assert!(record.class_period.is_empty());
        assert!(record.target_grade.is_empty());
        assert!(record.classroom.is_empty());
        assert!(record.search_times.is_empty());

        let rendered = serde_json::to_value(&record).expect("record serializes");
        let keys: Vec<&str> = rendered
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys.len(), 13);
        assert!(keys.contains(&"lectureCode"));
        assert!(keys.contains(&"search_times"));
    }

    #[test]
    fn non_matching_meeting_times_stay_in_raw_field_only() {
        let normalizer = CourseNormalizer::new().expect("regex compiles");
        let record = normalizer.normalize(&raw(json!({
            "classPeriod": ["月1", "集中", "木10", "other", 3]
        })));

        assert_eq!(record.class_period.len(), 5);
        assert_eq!(
            record.search_times,
            vec![
                SearchTime {
                    day: "月".to_string(),
                    period: 1
                },
                SearchTime {
                    day: "木".to_string(),
                    period: 10
                },
            ]
        );
    }

    #[test]
    fn compressed_periods_take_first_match_only() {
        let normalizer = CourseNormalizer::new().expect("regex compiles");
        let times = normalizer.search_times(&[json!("火3,4")]);

        assert_eq!(
            times,
            vec![SearchTime {
                day: "火".to_string(),
                period: 3
            }]
        );
    }

    #[test]
    fn long_period_numbers_are_kept() {
        let normalizer = CourseNormalizer::new().expect("regex compiles");
        let times = normalizer.search_times(&[json!("月99999999999"), json!("金99999999999999999999999")]);

        assert_eq!(
            times,
            vec![SearchTime {
                day: "月".to_string(),
                period: 99_999_999_999
            }]
        );
    }

    #[test]
    fn scalar_list_fields_are_wrapped() {
        let normalizer = CourseNormalizer::new().expect("regex compiles");
        let record = normalizer.normalize(&raw(json!({
            "lecturer": "山田 太郎",
            "targetGrade": null,
            "numberOfCredits": 2
        })));

        assert_eq!(record.lecturer, vec![json!("山田 太郎")]);
        assert!(record.target_grade.is_empty());
        assert_eq!(record.number_of_credits, json!(2));
    }
}
