use super::*;

#[derive(Debug)]
pub(super) struct MergeOutcome {
    pub(super) records: Vec<CourseRecord>,
    pub(super) mode: MergeMode,
    pub(super) old_kept: usize,
    pub(super) fresh_taken: usize,
}

pub(super) fn observed_years(pool: &[CourseRecord], parser: &PeriodParser) -> BTreeSet<String> {
    pool.iter()
        .filter_map(|record| parser.record_year(record))
        .collect()
}

/// Watermark for the run: the greatest year token, compared as strings.
pub(super) fn latest_year(years: &BTreeSet<String>) -> Option<String> {
    years.iter().next_back().cloned()
}

/// Keeps every persisted record outside `latest_year` and takes the
/// `latest_year` records from the fresh fetch. With nothing persisted the
/// fresh set is taken whole; with no watermark the persisted set is kept.
pub(super) fn merge_department(
    existing: Vec<CourseRecord>,
    fresh: Vec<CourseRecord>,
    latest_year: Option<&str>,
    parser: &PeriodParser,
) -> MergeOutcome {
    if existing.is_empty() {
        let fresh_taken = fresh.len();
        return MergeOutcome {
            records: fresh,
            mode: MergeMode::Initial,
            old_kept: 0,
            fresh_taken,
        };
    }

    let Some(latest_year) = latest_year else {
        let old_kept = existing.len();
        return MergeOutcome {
            records: existing,
            mode: MergeMode::Retained,
            old_kept,
            fresh_taken: 0,
        };
    };

    let in_latest_year =
        |record: &CourseRecord| parser.record_year(record).as_deref() == Some(latest_year);

    let mut records: Vec<CourseRecord> = existing
        .into_iter()
        .filter(|record| !in_latest_year(record))
        .collect();
    let old_kept = records.len();

    records.extend(fresh.into_iter().filter(|record| in_latest_year(record)));
    let fresh_taken = records.len() - old_kept;

    MergeOutcome {
        records,
        mode: MergeMode::Incremental,
        old_kept,
        fresh_taken,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn course(code: &str, start: &str) -> CourseRecord {
        CourseRecord {
            lecture_code: json!(code),
            course_start: json!(start),
            ..CourseRecord::default()
        }
    }

    fn codes(records: &[CourseRecord]) -> Vec<&str> {
        records
            .iter()
            .filter_map(|record| record.lecture_code.as_str())
            .collect()
    }

    #[test]
    fn empty_existing_takes_fresh_verbatim() {
        let parser = PeriodParser::new().expect("regex compiles");
        let fresh = vec![course("A", "2023年度前期"), course("B", "2025年度後期")];

        let outcome = merge_department(Vec::new(), fresh.clone(), Some("2025"), &parser);
        assert_eq!(outcome.records, fresh);
        assert_eq!(outcome.mode, MergeMode::Initial);

        let outcome = merge_department(Vec::new(), fresh.clone(), None, &parser);
        assert_eq!(outcome.records, fresh);
    }

    #[test]
    fn latest_year_replaced_from_fresh_and_older_years_kept() {
        let parser = PeriodParser::new().expect("regex compiles");
        let existing = vec![
            course("OLD-23a", "2023年度前期"),
            course("OLD-24", "2024年度前期"),
            course("OLD-23b", "2023年度後期"),
        ];
        let fresh = vec![course("NEW-24a", "2024年度前期"), course("NEW-24b", "2024年度後期")];

        let outcome = merge_department(existing, fresh, Some("2024"), &parser);
        assert_eq!(
            codes(&outcome.records),
            vec!["OLD-23a", "OLD-23b", "NEW-24a", "NEW-24b"]
        );
        assert_eq!(outcome.old_kept, 2);
        assert_eq!(outcome.fresh_taken, 2);
        assert_eq!(outcome.mode, MergeMode::Incremental);
    }

    #[test]
    fn fresh_records_outside_latest_year_are_ignored() {
        let parser = PeriodParser::new().expect("regex compiles");
        let existing = vec![course("OLD-23", "2023年度前期")];
        let fresh = vec![course("NEW-23", "2023年度前期"), course("NEW-25", "2025年度前期")];

        let outcome = merge_department(existing, fresh, Some("2025"), &parser);
        assert_eq!(codes(&outcome.records), vec!["OLD-23", "NEW-25"]);
    }

    #[test]
    fn missing_watermark_keeps_existing_unchanged() {
        let parser = PeriodParser::new().expect("regex compiles");
        let existing = vec![course("OLD-23", "2023年度前期"), course("UNDATED", "")];
        let fresh = vec![course("NEW", "不明")];

        let outcome = merge_department(existing.clone(), fresh, None, &parser);
        assert_eq!(outcome.records, existing);
        assert_eq!(outcome.mode, MergeMode::Retained);
        assert_eq!(outcome.fresh_taken, 0);
    }

    #[test]
    fn undated_existing_records_survive_incremental_merge() {
        let parser = PeriodParser::new().expect("regex compiles");
        let existing = vec![course("UNDATED", "集中")];

        let outcome = merge_department(existing, Vec::new(), Some("2025"), &parser);
        assert_eq!(codes(&outcome.records), vec!["UNDATED"]);
    }

    #[test]
    fn duplicates_are_preserved() {
        let parser = PeriodParser::new().expect("regex compiles");
        let existing = vec![course("X", "2023年度前期"), course("X", "2023年度前期")];
        let fresh = vec![course("X", "2024年度前期"), course("X", "2024年度前期")];

        let outcome = merge_department(existing, fresh, Some("2024"), &parser);
        assert_eq!(outcome.records.len(), 4);
    }

    #[test]
    fn latest_year_is_string_maximum() {
        let parser = PeriodParser::new().expect("regex compiles");
        let pool = vec![
            course("A", "2023年度前期"),
            course("B", "2025年度後期"),
            course("C", "2024年度前期"),
            course("D", "未定"),
        ];

        let years = observed_years(&pool, &parser);
        assert_eq!(years.len(), 3);
        assert_eq!(latest_year(&years).as_deref(), Some("2025"));
        assert_eq!(latest_year(&BTreeSet::new()), None);
    }
}
